//! OS package manager invocation.
//!
//! One manager per supported platform. Install failures are classified by
//! their stderr into privilege problems and everything else; nothing is
//! retried.

use crate::error::{ProvisionError, Result};
use crate::platform::Platform;
use crate::runner::{display_command, probe, CommandOutput, CommandRunner};

const PRIVILEGE_MARKERS: &[&str] = &[
    "permission denied",
    "are you root",
    "access is denied",
    "a password is required",
    "administrator",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PackageManager {
    Apt,
    Homebrew,
    Winget,
}

impl PackageManager {
    pub fn for_platform(platform: Platform) -> Option<PackageManager> {
        match platform {
            Platform::Linux => Some(PackageManager::Apt),
            Platform::MacOs => Some(PackageManager::Homebrew),
            Platform::Windows => Some(PackageManager::Winget),
            Platform::Unknown => None,
        }
    }

    pub fn program(self) -> &'static str {
        match self {
            PackageManager::Apt => "apt-get",
            PackageManager::Homebrew => "brew",
            PackageManager::Winget => "winget",
        }
    }

    fn install_args(self, package: &str) -> Vec<&str> {
        match self {
            PackageManager::Apt => vec!["install", "-y", package],
            PackageManager::Homebrew => vec!["install", package],
            PackageManager::Winget => vec![
                "install",
                "--id",
                package,
                "-e",
                "--accept-source-agreements",
                "--accept-package-agreements",
            ],
        }
    }

    /// The command a user would type to install `package`, without any
    /// privilege prefix.
    pub fn install_command(self, package: &str) -> String {
        display_command(self.program(), &self.install_args(package))
    }

    /// Install `packages` in order, stopping at the first failure.
    pub fn install(self, runner: &dyn CommandRunner, packages: &[&str]) -> Result<()> {
        if probe(runner, self.program(), "--version").is_none() {
            return Err(ProvisionError::ToolNotFound {
                tool: self.program().to_string(),
            });
        }

        let elevate = match self {
            PackageManager::Apt => apt_elevation(runner, packages)?,
            _ => false,
        };

        if self == PackageManager::Apt {
            run_install(runner, elevate, self.program(), &["update"])?;
        }

        for package in packages {
            tracing::info!(manager = self.program(), package, "installing system package");
            run_install(runner, elevate, self.program(), &self.install_args(package))?;
        }
        Ok(())
    }
}

/// apt needs root. Returns whether commands must go through `sudo -n`.
fn apt_elevation(runner: &dyn CommandRunner, packages: &[&str]) -> Result<bool> {
    let is_root = runner
        .run("id", &["-u"])
        .map(|out| out.success && out.stdout.trim() == "0")
        .unwrap_or(false);
    if is_root {
        return Ok(false);
    }
    if probe(runner, "sudo", "--version").is_some() {
        return Ok(true);
    }
    Err(ProvisionError::PrivilegeRequired {
        command: display_command("apt-get", &["install", "-y", &packages.join(" ")]),
    })
}

fn run_install(
    runner: &dyn CommandRunner,
    elevate: bool,
    program: &str,
    args: &[&str],
) -> Result<()> {
    let command = display_command(program, args);
    let result = if elevate {
        let mut sudo_args = vec!["-n", program];
        sudo_args.extend_from_slice(args);
        runner.run("sudo", &sudo_args)
    } else {
        runner.run(program, args)
    };
    match result {
        Ok(out) if out.success => Ok(()),
        Ok(out) => Err(classify_failure(&command, &out)),
        Err(e) => Err(ProvisionError::NetworkOrPackageManagerFailure {
            command,
            detail: e.to_string(),
        }),
    }
}

/// Map a failed package-manager invocation onto the error taxonomy.
pub fn classify_failure(command: &str, out: &CommandOutput) -> ProvisionError {
    let stderr = out.stderr.to_lowercase();
    if PRIVILEGE_MARKERS.iter().any(|m| stderr.contains(m)) {
        return ProvisionError::PrivilegeRequired {
            command: command.to_string(),
        };
    }
    let detail = match out.text() {
        "" => format!("exit code {:?}", out.code),
        text => text.lines().last().unwrap_or(text).to_string(),
    };
    ProvisionError::NetworkOrPackageManagerFailure {
        command: command.to_string(),
        detail,
    }
}
