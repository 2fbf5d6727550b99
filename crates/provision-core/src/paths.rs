use crate::platform::Platform;
use std::path::{Path, PathBuf};

// ---------------------------------------------------------------------------
// File and directory names
// ---------------------------------------------------------------------------

pub const CONFIG_FILE: &str = "provision.yaml";
pub const DEFAULT_VENV_DIR: &str = ".venv";
pub const DEFAULT_MANIFEST_FILE: &str = "requirements.txt";

// ---------------------------------------------------------------------------
// Path helpers
// ---------------------------------------------------------------------------

pub fn config_path(root: &Path) -> PathBuf {
    root.join(CONFIG_FILE)
}

/// Interpreter inside a virtual environment. The layout differs between
/// Windows (`Scripts\python.exe`) and everything else (`bin/python`).
pub fn venv_python(venv_dir: &Path, platform: Platform) -> PathBuf {
    match platform {
        Platform::Windows => venv_dir.join("Scripts").join("python.exe"),
        _ => venv_dir.join("bin").join("python"),
    }
}
