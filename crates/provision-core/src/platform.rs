use serde::{Deserialize, Serialize};
use std::fmt;

// ---------------------------------------------------------------------------
// Platform
// ---------------------------------------------------------------------------

/// Host operating system family. Selected once at startup; every
/// platform-specific difference downstream is looked up from this tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Platform {
    Linux,
    #[serde(rename = "macos")]
    MacOs,
    Windows,
    Unknown,
}

impl Platform {
    pub fn all() -> &'static [Platform] {
        &[
            Platform::Linux,
            Platform::MacOs,
            Platform::Windows,
            Platform::Unknown,
        ]
    }

    /// Detect the platform this binary was compiled for.
    pub fn detect() -> Platform {
        Platform::from_os(std::env::consts::OS)
    }

    /// Map a `std::env::consts::OS` value onto the closed set.
    pub fn from_os(os: &str) -> Platform {
        match os {
            "linux" => Platform::Linux,
            "macos" => Platform::MacOs,
            "windows" => Platform::Windows,
            _ => Platform::Unknown,
        }
    }

    pub fn is_supported(self) -> bool {
        !matches!(self, Platform::Unknown)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Platform::Linux => "linux",
            Platform::MacOs => "macos",
            Platform::Windows => "windows",
            Platform::Unknown => "unknown",
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Platform {
    type Err = crate::error::ProvisionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "linux" => Ok(Platform::Linux),
            "macos" | "darwin" => Ok(Platform::MacOs),
            "windows" => Ok(Platform::Windows),
            "unknown" => Ok(Platform::Unknown),
            other => Err(crate::error::ProvisionError::PlatformUnsupported {
                platform: other.to_string(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_os_maps_known_values() {
        assert_eq!(Platform::from_os("linux"), Platform::Linux);
        assert_eq!(Platform::from_os("macos"), Platform::MacOs);
        assert_eq!(Platform::from_os("windows"), Platform::Windows);
        assert_eq!(Platform::from_os("freebsd"), Platform::Unknown);
    }

    #[test]
    fn parse_roundtrips_as_str() {
        for p in Platform::all() {
            assert_eq!(p.as_str().parse::<Platform>().unwrap(), *p);
        }
        assert!("solaris".parse::<Platform>().is_err());
    }

    #[test]
    fn only_unknown_is_unsupported() {
        assert!(Platform::Linux.is_supported());
        assert!(!Platform::Unknown.is_supported());
    }

    #[test]
    fn serde_uses_lowercase_names() {
        let yaml = serde_yaml::to_string(&Platform::MacOs).unwrap();
        assert_eq!(yaml.trim(), "macos");
    }
}
