use provision_core::paths::CONFIG_FILE;
use std::path::{Path, PathBuf};

/// Resolve the project root.
///
/// Priority:
/// 1. `--root` flag / `PROVISION_ROOT` env var (passed in as `explicit`)
/// 2. Walk upward from `cwd` looking for `provision.yaml`
/// 3. Walk upward from `cwd` looking for `.git/`
/// 4. Fall back to `cwd`
pub fn resolve_root(explicit: Option<&Path>) -> PathBuf {
    if let Some(p) = explicit {
        return p.to_path_buf();
    }

    let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));

    if let Some(dir) = find_upward(&cwd, |d| d.join(CONFIG_FILE).is_file()) {
        return dir;
    }
    if let Some(dir) = find_upward(&cwd, |d| d.join(".git").is_dir()) {
        return dir;
    }
    cwd
}

fn find_upward(start: &Path, found: impl Fn(&Path) -> bool) -> Option<PathBuf> {
    start
        .ancestors()
        .find(|dir| found(*dir))
        .map(Path::to_path_buf)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn explicit_root_wins() {
        let dir = TempDir::new().unwrap();
        let result = resolve_root(Some(dir.path()));
        assert_eq!(result, dir.path());
    }

    #[test]
    fn finds_config_in_ancestor() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join(CONFIG_FILE), "min_python: \"3.9\"\n").unwrap();
        let subdir = dir.path().join("resume_parser/templates");
        std::fs::create_dir_all(&subdir).unwrap();

        let found = find_upward(&subdir, |d| d.join(CONFIG_FILE).is_file());
        assert_eq!(found.as_deref(), Some(dir.path()));
    }

    #[test]
    fn no_marker_yields_none() {
        let dir = TempDir::new().unwrap();
        let found = find_upward(dir.path(), |d| d.join("definitely-not-here.marker").exists());
        assert!(found.is_none());
    }
}
