//! Subprocess seam.
//!
//! Every external program (package managers, interpreters, pip) is invoked
//! through [`CommandRunner`] so the orchestrator can be driven by a scripted
//! fake in tests. [`SystemRunner`] is the real implementation.

use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutput {
    pub success: bool,
    pub code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl CommandOutput {
    pub fn ok(stdout: impl Into<String>) -> Self {
        Self {
            success: true,
            code: Some(0),
            stdout: stdout.into(),
            stderr: String::new(),
        }
    }

    pub fn failed(code: i32, stderr: impl Into<String>) -> Self {
        Self {
            success: false,
            code: Some(code),
            stdout: String::new(),
            stderr: stderr.into(),
        }
    }

    /// Stdout, falling back to stderr. Older interpreters print their
    /// version banner on stderr.
    pub fn text(&self) -> &str {
        if self.stdout.trim().is_empty() {
            self.stderr.trim()
        } else {
            self.stdout.trim()
        }
    }
}

pub trait CommandRunner {
    /// Run `program` to completion and capture its output. An `Err` means
    /// the process could not be spawned at all.
    fn run(&self, program: &str, args: &[&str]) -> std::io::Result<CommandOutput>;

    /// Whether `program` resolves on PATH. Diagnostic only: presence is
    /// proven by [`probe`], never by this.
    fn on_path(&self, program: &str) -> bool;
}

// ---------------------------------------------------------------------------
// SystemRunner
// ---------------------------------------------------------------------------

pub struct SystemRunner {
    cwd: PathBuf,
}

impl SystemRunner {
    pub fn new(cwd: &Path) -> Self {
        Self {
            cwd: cwd.to_path_buf(),
        }
    }
}

impl CommandRunner for SystemRunner {
    fn run(&self, program: &str, args: &[&str]) -> std::io::Result<CommandOutput> {
        tracing::debug!(command = %display_command(program, args), "spawning");
        let output = Command::new(program)
            .args(args)
            .current_dir(&self.cwd)
            .stdin(Stdio::null())
            .output()?;
        Ok(CommandOutput {
            success: output.status.success(),
            code: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }

    fn on_path(&self, program: &str) -> bool {
        which::which(program).is_ok()
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Capability check: run `program version_arg` and require a zero exit.
/// Returns the trimmed version text on success.
pub fn probe(runner: &dyn CommandRunner, program: &str, version_arg: &str) -> Option<String> {
    match runner.run(program, &[version_arg]) {
        Ok(out) if out.success => Some(out.text().to_string()),
        Ok(out) => {
            tracing::debug!(program, code = ?out.code, "probe exited unsuccessfully");
            None
        }
        Err(e) => {
            if runner.on_path(program) {
                tracing::warn!(program, error = %e, "on PATH but failed to run");
            } else {
                tracing::debug!(program, "not on PATH");
            }
            None
        }
    }
}

pub fn display_command(program: &str, args: &[&str]) -> String {
    if args.is_empty() {
        program.to_string()
    } else {
        format!("{} {}", program, args.join(" "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::FakeRunner;

    #[test]
    fn text_prefers_stdout() {
        let out = CommandOutput {
            success: true,
            code: Some(0),
            stdout: "Python 3.12.1\n".to_string(),
            stderr: "noise".to_string(),
        };
        assert_eq!(out.text(), "Python 3.12.1");
        let out = CommandOutput {
            stdout: String::new(),
            stderr: "Python 2.7.18\n".to_string(),
            ..out
        };
        assert_eq!(out.text(), "Python 2.7.18");
    }

    #[test]
    fn probe_requires_successful_exit() {
        let runner = FakeRunner::new();
        runner.respond("tesseract --version", CommandOutput::ok("tesseract 5.3.4"));
        runner.respond("broken --version", CommandOutput::failed(127, "bad interpreter"));
        assert_eq!(
            probe(&runner, "tesseract", "--version").as_deref(),
            Some("tesseract 5.3.4")
        );
        assert_eq!(probe(&runner, "broken", "--version"), None);
        assert_eq!(probe(&runner, "absent", "--version"), None);
    }

    #[test]
    fn probe_does_not_trust_path_alone() {
        let runner = FakeRunner::new();
        runner.put_on_path("tesseract");
        assert_eq!(probe(&runner, "tesseract", "--version"), None);
    }

    #[test]
    fn display_command_joins_args() {
        assert_eq!(
            display_command("apt-get", &["install", "-y", "tesseract-ocr"]),
            "apt-get install -y tesseract-ocr"
        );
        assert_eq!(display_command("brew", &[]), "brew");
    }
}
