//! Interpreter version parsing and comparison.
//!
//! Versions are compared as `(major, minor, patch)` tuples so that `3.10`
//! sorts after `3.8`. A missing component counts as zero.

use crate::error::{ProvisionError, Result};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::OnceLock;

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct InterpreterVersion {
    pub major: u32,
    pub minor: u32,
    pub patch: u32,
}

static VERSION_RE: OnceLock<Regex> = OnceLock::new();

fn version_re() -> &'static Regex {
    VERSION_RE.get_or_init(|| Regex::new(r"(\d+)\.(\d+)(?:\.(\d+))?").unwrap())
}

impl InterpreterVersion {
    pub fn new(major: u32, minor: u32, patch: u32) -> Self {
        Self {
            major,
            minor,
            patch,
        }
    }

    /// Parse the first dotted version found in `s`.
    ///
    /// Accepts bare versions (`3.10`, `3.8.18`) as well as interpreter
    /// banners (`Python 3.12.1`, `Python 3.13.0rc1`).
    pub fn parse(s: &str) -> Result<Self> {
        let caps = version_re()
            .captures(s)
            .ok_or_else(|| ProvisionError::InvalidVersion(s.trim().to_string()))?;
        let num = |i: usize| -> Result<u32> {
            match caps.get(i) {
                Some(m) => m
                    .as_str()
                    .parse()
                    .map_err(|_| ProvisionError::InvalidVersion(s.trim().to_string())),
                None => Ok(0),
            }
        };
        Ok(Self::new(num(1)?, num(2)?, num(3)?))
    }

    pub fn satisfies(&self, minimum: &InterpreterVersion) -> bool {
        self >= minimum
    }
}

impl fmt::Display for InterpreterVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
    }
}

impl std::str::FromStr for InterpreterVersion {
    type Err = ProvisionError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}
