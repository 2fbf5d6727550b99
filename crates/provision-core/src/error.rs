use crate::platform::Platform;
use thiserror::Error;

/// Manual setup steps shown when the host platform cannot be provisioned
/// automatically.
pub const MANUAL_INSTRUCTIONS: &str = "install manually: \
1) Tesseract OCR (https://tesseract-ocr.github.io/tessdoc/Installation.html), \
2) Python 3.8+ (https://www.python.org/downloads/), \
3) python -m venv .venv, \
4) .venv/bin/python -m pip install -r requirements.txt";

#[derive(Debug, Error)]
pub enum ProvisionError {
    #[error("unsupported platform: {platform}")]
    PlatformUnsupported { platform: String },

    #[error("python {found} is too old: {required} or newer is required")]
    InterpreterTooOld { found: String, required: String },

    #[error("elevated privileges required to run '{command}'")]
    PrivilegeRequired { command: String },

    #[error("required tool not found or not runnable: {tool}")]
    ToolNotFound { tool: String },

    #[error("'{command}' failed: {detail}")]
    NetworkOrPackageManagerFailure { command: String, detail: String },

    #[error("dependency install failed: {0}")]
    ManifestInstallFailure(String),

    #[error("failed to import '{package}': {detail}")]
    ImportVerificationFailure { package: String, detail: String },

    #[error("manifest line {line} is not an exact 'name==version' pin: {content}")]
    ManifestParse { line: usize, content: String },

    #[error("step '{step}' did not verify after running")]
    StepUnverified { step: String },

    #[error("invalid version string: {0}")]
    InvalidVersion(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl ProvisionError {
    /// A documentation link or corrective command for the user.
    pub fn remediation(&self, platform: Platform) -> String {
        match self {
            ProvisionError::PlatformUnsupported { .. } => MANUAL_INSTRUCTIONS.to_string(),
            ProvisionError::InterpreterTooOld { required, .. } => match platform {
                Platform::MacOs => format!("brew install python (need {required}+)"),
                Platform::Windows => format!(
                    "winget install --id Python.Python.3.12 -e (need {required}+), or https://www.python.org/downloads/windows/"
                ),
                _ => format!(
                    "install python {required}+ from your distribution or https://www.python.org/downloads/"
                ),
            },
            ProvisionError::PrivilegeRequired { command } => match platform {
                Platform::Windows => format!("re-run from an Administrator prompt: {command}"),
                _ => format!("re-run with sudo, or run manually: sudo {command}"),
            },
            ProvisionError::ToolNotFound { tool } => match (platform, tool.as_str()) {
                (Platform::MacOs, "brew") => "install Homebrew: https://brew.sh".to_string(),
                (Platform::Windows, "winget") => {
                    "install App Installer: https://learn.microsoft.com/windows/package-manager/winget/".to_string()
                }
                (_, "tesseract") => {
                    "see https://tesseract-ocr.github.io/tessdoc/Installation.html and make sure tesseract is on PATH".to_string()
                }
                _ => format!("install '{tool}' and make sure it is on PATH"),
            },
            ProvisionError::NetworkOrPackageManagerFailure { command, .. } => {
                format!("check network access and package manager state, then re-run: {command}")
            }
            ProvisionError::ManifestInstallFailure(_) => format!(
                "inspect pip output: {} -m pip install -r requirements.txt",
                venv_python_hint(platform)
            ),
            ProvisionError::ImportVerificationFailure { package, .. } => format!(
                "reinstall the package: {} -m pip install --force-reinstall {package}",
                venv_python_hint(platform)
            ),
            ProvisionError::ManifestParse { .. } => {
                "pin every dependency as name==version, one per line".to_string()
            }
            ProvisionError::StepUnverified { .. } => {
                "re-run with -v to see the commands that were executed".to_string()
            }
            ProvisionError::InvalidVersion(_) => {
                "use a dotted numeric version such as 3.8 in provision.yaml".to_string()
            }
            ProvisionError::Io(_) | ProvisionError::Yaml(_) | ProvisionError::Json(_) => {
                "check file permissions and the contents of provision.yaml".to_string()
            }
        }
    }
}

fn venv_python_hint(platform: Platform) -> &'static str {
    match platform {
        Platform::Windows => r".venv\Scripts\python.exe",
        _ => ".venv/bin/python",
    }
}

pub type Result<T> = std::result::Result<T, ProvisionError>;
