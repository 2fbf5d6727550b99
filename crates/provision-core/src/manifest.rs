//! Pinned dependency manifest (`name==version`, one per line).

use crate::error::{ProvisionError, Result};
use crate::io;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::sync::OnceLock;

/// Pins synthesized when no manifest exists. Covers every third-party
/// import of the resume parser and its web front end.
pub const DEFAULT_REQUIREMENTS: &[(&str, &str)] = &[
    ("Flask", "3.0.3"),
    ("pdfplumber", "0.11.4"),
    ("python-docx", "1.1.2"),
    ("pytesseract", "0.3.13"),
    ("PyMuPDF", "1.24.10"),
    ("Pillow", "10.4.0"),
];

// ---------------------------------------------------------------------------
// Requirement
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Requirement {
    pub name: String,
    pub version: String,
}

static PIN_RE: OnceLock<Regex> = OnceLock::new();

fn pin_re() -> &'static Regex {
    PIN_RE.get_or_init(|| {
        Regex::new(r"^([A-Za-z0-9][A-Za-z0-9._\-]*)\s*==\s*([0-9][A-Za-z0-9.+\-]*)$").unwrap()
    })
}

impl Requirement {
    pub fn new(name: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version: version.into(),
        }
    }

    /// Parse one `name==version` pin. Returns `None` for anything else.
    pub fn parse(line: &str) -> Option<Self> {
        let caps = pin_re().captures(line.trim())?;
        Some(Self::new(&caps[1], &caps[2]))
    }

    /// Name normalised the way pip compares distributions.
    pub fn key(&self) -> String {
        normalize_name(&self.name)
    }
}

impl fmt::Display for Requirement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}=={}", self.name, self.version)
    }
}

/// Distribution name as pip compares it: case-insensitive, with `_` and `.`
/// equivalent to `-`.
pub fn normalize_name(name: &str) -> String {
    name.to_lowercase().replace(['_', '.'], "-")
}

static RELEASE_RE: OnceLock<Regex> = OnceLock::new();

fn release_re() -> &'static Regex {
    RELEASE_RE.get_or_init(|| Regex::new(r"^(\d+(?:\.\d+)*)(.*)$").unwrap())
}

/// Split a version into its release numbers, trailing zeros dropped, and
/// the lowercased remainder (`rc1`, `.post1`, `+local`).
fn release_parts(version: &str) -> Option<(Vec<u64>, String)> {
    let caps = release_re().captures(version.trim())?;
    let mut release = caps[1]
        .split('.')
        .map(str::parse)
        .collect::<std::result::Result<Vec<u64>, _>>()
        .ok()?;
    while release.len() > 1 && release.last() == Some(&0) {
        release.pop();
    }
    Some((release, caps[2].to_lowercase()))
}

/// Whether two versions name the same release. Release segments are padded
/// with zeros, so `3.0` and `3.0.0` match while `3.0` and `3.0.1` do not.
pub fn same_version(a: &str, b: &str) -> bool {
    match (release_parts(a), release_parts(b)) {
        (Some(a), Some(b)) => a == b,
        _ => a.trim().eq_ignore_ascii_case(b.trim()),
    }
}

// ---------------------------------------------------------------------------
// Manifest
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Manifest {
    pub requirements: Vec<Requirement>,
}

impl Manifest {
    pub fn defaults() -> Self {
        Self {
            requirements: DEFAULT_REQUIREMENTS
                .iter()
                .map(|(name, version)| Requirement::new(*name, *version))
                .collect(),
        }
    }

    /// Parse manifest text. Blank lines and `#` comments are skipped; any
    /// other line must be an exact pin.
    pub fn parse(text: &str) -> Result<Self> {
        let mut requirements = Vec::new();
        for (idx, raw) in text.lines().enumerate() {
            let line = match raw.split_once('#') {
                Some((before, _)) => before.trim(),
                None => raw.trim(),
            };
            if line.is_empty() {
                continue;
            }
            let req = Requirement::parse(line).ok_or_else(|| ProvisionError::ManifestParse {
                line: idx + 1,
                content: raw.trim().to_string(),
            })?;
            requirements.push(req);
        }
        Ok(Self { requirements })
    }

    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::parse(&text)
    }

    pub fn render(&self) -> String {
        let mut out = String::new();
        for req in &self.requirements {
            out.push_str(&req.to_string());
            out.push('\n');
        }
        out
    }

    /// Write the default pins to `path` unless a manifest is already there.
    /// Returns true if the file was written.
    pub fn ensure(path: &Path) -> Result<bool> {
        let written = io::write_if_missing(path, Self::defaults().render().as_bytes())?;
        if written {
            tracing::info!(path = %path.display(), "wrote default dependency manifest");
        }
        Ok(written)
    }

    pub fn is_empty(&self) -> bool {
        self.requirements.is_empty()
    }

    /// Requirements not present at their pinned version in `installed`
    /// (output of `pip freeze`).
    pub fn missing_from(&self, installed: &str) -> Vec<&Requirement> {
        let have: Vec<Requirement> = installed.lines().filter_map(Requirement::parse).collect();
        self.requirements
            .iter()
            .filter(|want| {
                !have
                    .iter()
                    .any(|h| h.key() == want.key() && same_version(&h.version, &want.version))
            })
            .collect()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
