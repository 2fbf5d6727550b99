mod cmd;
mod output;
mod root;

use clap::{Parser, Subcommand};
use cmd::config::ConfigSubcommand;
use provision_core::Platform;
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "provision",
    about = "Idempotent, fail-fast environment bootstrap: OCR engine, Python venv, pinned dependencies",
    version,
    propagate_version = true
)]
struct Cli {
    /// Project root (default: auto-detect from provision.yaml or .git/)
    #[arg(long, global = true, env = "PROVISION_ROOT")]
    root: Option<PathBuf>,

    /// Output as JSON
    #[arg(long, global = true, short = 'j')]
    json: bool,

    /// Verbose logging (debug level)
    #[arg(long, global = true, short = 'v')]
    verbose: bool,

    /// Override platform detection (linux, macos, windows, unknown)
    #[arg(long, global = true)]
    platform: Option<Platform>,

    /// Evaluate preconditions only; perform no actions
    #[arg(long)]
    dry_run: bool,

    /// Skip OS-level package installs (e.g. containers that already ship them)
    #[arg(long, global = true)]
    skip_system_packages: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// List the steps the current configuration would run
    Steps,

    /// Inspect and validate provision.yaml
    Config {
        #[command(subcommand)]
        subcommand: ConfigSubcommand,
    },
}

fn main() {
    let cli = Cli::parse();

    let default_level = if cli.verbose {
        tracing::Level::DEBUG
    } else {
        match &cli.command {
            None => tracing::Level::INFO,
            Some(_) => tracing::Level::WARN,
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(default_level.into()),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let root = root::resolve_root(cli.root.as_deref());
    let platform = cli.platform.unwrap_or_else(Platform::detect);

    let result = match cli.command {
        None => cmd::run::run(
            &root,
            platform,
            cmd::run::RunFlags {
                dry_run: cli.dry_run,
                skip_system_packages: cli.skip_system_packages,
            },
            cli.json,
        ),
        Some(Commands::Steps) => {
            cmd::steps::run(&root, platform, cli.skip_system_packages, cli.json)
        }
        Some(Commands::Config { subcommand }) => cmd::config::run(&root, subcommand, cli.json),
    };

    if let Err(e) = result {
        // Print the full error chain (anyhow's alternate Display)
        eprintln!("error: {e:#}");
        std::process::exit(1);
    }
}
