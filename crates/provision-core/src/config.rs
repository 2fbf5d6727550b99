use crate::error::Result;
use crate::manifest::normalize_name;
use crate::paths;
use crate::platform::Platform;
use crate::version::InterpreterVersion;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

// ---------------------------------------------------------------------------
// ConfigWarning / WarnLevel
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigWarning {
    pub level: WarnLevel,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WarnLevel {
    Warning,
    Error,
}

// ---------------------------------------------------------------------------
// PerPlatform
// ---------------------------------------------------------------------------

/// One value per supported platform. `Unknown` never has an entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PerPlatform<T> {
    pub linux: T,
    pub macos: T,
    pub windows: T,
}

impl<T> PerPlatform<T> {
    pub fn get(&self, platform: Platform) -> Option<&T> {
        match platform {
            Platform::Linux => Some(&self.linux),
            Platform::MacOs => Some(&self.macos),
            Platform::Windows => Some(&self.windows),
            Platform::Unknown => None,
        }
    }

    fn entries(&self) -> [(Platform, &T); 3] {
        [
            (Platform::Linux, &self.linux),
            (Platform::MacOs, &self.macos),
            (Platform::Windows, &self.windows),
        ]
    }
}

// ---------------------------------------------------------------------------
// SystemPackage
// ---------------------------------------------------------------------------

/// An OS-level package and the executable that proves it is installed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SystemPackage {
    /// Name passed to the package manager.
    pub name: String,
    /// Executable probed before and after install.
    pub tool: String,
    #[serde(default = "default_version_arg")]
    pub version_arg: String,
}

fn default_version_arg() -> String {
    "--version".to_string()
}

impl SystemPackage {
    pub fn new(name: impl Into<String>, tool: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            tool: tool.into(),
            version_arg: default_version_arg(),
        }
    }
}

// ---------------------------------------------------------------------------
// Config
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_min_python")]
    pub min_python: String,
    #[serde(default = "default_venv_dir")]
    pub venv_dir: PathBuf,
    #[serde(default = "default_manifest")]
    pub manifest: PathBuf,
    #[serde(default = "default_python")]
    pub python: PerPlatform<Vec<String>>,
    /// Packages installed when no interpreter is found at all.
    #[serde(default = "default_python_packages")]
    pub python_packages: PerPlatform<Vec<String>>,
    #[serde(default = "default_system_packages")]
    pub system_packages: PerPlatform<Vec<SystemPackage>>,
    /// Distribution name → import name, for packages where they differ.
    #[serde(default = "default_import_aliases")]
    pub import_aliases: BTreeMap<String, String>,
}

fn default_min_python() -> String {
    "3.8".to_string()
}

fn default_venv_dir() -> PathBuf {
    PathBuf::from(paths::DEFAULT_VENV_DIR)
}

fn default_manifest() -> PathBuf {
    PathBuf::from(paths::DEFAULT_MANIFEST_FILE)
}

fn default_python() -> PerPlatform<Vec<String>> {
    let posix = || vec!["python3".to_string(), "python".to_string()];
    PerPlatform {
        linux: posix(),
        macos: posix(),
        windows: vec!["py".to_string(), "python".to_string()],
    }
}

fn default_python_packages() -> PerPlatform<Vec<String>> {
    PerPlatform {
        linux: vec![
            "python3".to_string(),
            "python3-venv".to_string(),
            "python3-pip".to_string(),
        ],
        macos: vec!["python@3.12".to_string()],
        windows: vec!["Python.Python.3.12".to_string()],
    }
}

fn default_system_packages() -> PerPlatform<Vec<SystemPackage>> {
    PerPlatform {
        linux: vec![SystemPackage::new("tesseract-ocr", "tesseract")],
        macos: vec![SystemPackage::new("tesseract", "tesseract")],
        windows: vec![SystemPackage::new("UB-Mannheim.TesseractOCR", "tesseract")],
    }
}

fn default_import_aliases() -> BTreeMap<String, String> {
    [
        ("Flask", "flask"),
        ("PyMuPDF", "fitz"),
        ("Pillow", "PIL"),
        ("python-docx", "docx"),
    ]
    .into_iter()
    .map(|(k, v)| (k.to_string(), v.to_string()))
    .collect()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            min_python: default_min_python(),
            venv_dir: default_venv_dir(),
            manifest: default_manifest(),
            python: default_python(),
            python_packages: default_python_packages(),
            system_packages: default_system_packages(),
            import_aliases: default_import_aliases(),
        }
    }
}

impl Config {
    /// Load `provision.yaml` from `root`, or the built-in defaults when the
    /// file does not exist.
    pub fn load(root: &Path) -> Result<Self> {
        let path = paths::config_path(root);
        if !path.exists() {
            tracing::debug!(path = %path.display(), "no config file, using defaults");
            return Ok(Self::default());
        }
        let data = std::fs::read_to_string(&path)?;
        let cfg: Config = serde_yaml::from_str(&data)?;
        Ok(cfg)
    }

    pub fn min_python_version(&self) -> Result<InterpreterVersion> {
        InterpreterVersion::parse(&self.min_python)
    }

    pub fn venv_path(&self, root: &Path) -> PathBuf {
        root.join(&self.venv_dir)
    }

    pub fn manifest_path(&self, root: &Path) -> PathBuf {
        root.join(&self.manifest)
    }

    pub fn python_candidates(&self, platform: Platform) -> &[String] {
        self.python
            .get(platform)
            .map(|v| v.as_slice())
            .unwrap_or(&[])
    }

    pub fn python_packages_for(&self, platform: Platform) -> &[String] {
        self.python_packages
            .get(platform)
            .map(|v| v.as_slice())
            .unwrap_or(&[])
    }

    pub fn system_packages_for(&self, platform: Platform) -> &[SystemPackage] {
        self.system_packages
            .get(platform)
            .map(|v| v.as_slice())
            .unwrap_or(&[])
    }

    /// Module name to import for a distribution. Alias keys are matched by
    /// pip's normalised name, so `zope.interface` finds `zope-interface`.
    pub fn import_name(&self, distribution: &str) -> String {
        let wanted = normalize_name(distribution);
        self.import_aliases
            .iter()
            .find(|(dist, _)| normalize_name(dist) == wanted)
            .map(|(_, module)| module.clone())
            .unwrap_or_else(|| distribution.to_lowercase().replace('-', "_"))
    }

    // -----------------------------------------------------------------------
    // Validation
    // -----------------------------------------------------------------------

    pub fn validate(&self) -> Vec<ConfigWarning> {
        let mut warnings = Vec::new();

        if let Err(e) = self.min_python_version() {
            warnings.push(ConfigWarning {
                level: WarnLevel::Error,
                message: format!("min_python: {e}"),
            });
        }

        for (platform, candidates) in self.python.entries() {
            if candidates.is_empty() {
                warnings.push(ConfigWarning {
                    level: WarnLevel::Error,
                    message: format!("python.{platform} lists no interpreter candidates"),
                });
            }
        }

        if self.venv_dir.as_os_str().is_empty() {
            warnings.push(ConfigWarning {
                level: WarnLevel::Warning,
                message: "venv_dir is empty; the project root itself would become the venv"
                    .to_string(),
            });
        }

        if self.manifest.as_os_str().is_empty() {
            warnings.push(ConfigWarning {
                level: WarnLevel::Warning,
                message: "manifest path is empty".to_string(),
            });
        }

        for (platform, packages) in self.system_packages.entries() {
            for pkg in packages {
                if pkg.tool.trim().is_empty() {
                    warnings.push(ConfigWarning {
                        level: WarnLevel::Warning,
                        message: format!(
                            "system_packages.{platform}: '{}' has no tool to verify it",
                            pkg.name
                        ),
                    });
                }
            }
        }

        warnings
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
