use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use clap::ValueEnum;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::SasbdbError;

static RECORD_CODE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9_-]+$").expect("record code pattern is valid"));

/// Accession code of one SASBDB entry, e.g. `SASDA52`.
///
/// Every remote URL and every local file name for an entry is derived from
/// it, so only characters that are safe inside a file name are accepted.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct RecordCode(String);

impl RecordCode {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RecordCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for RecordCode {
    type Err = SasbdbError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let trimmed = value.trim();
        if !RECORD_CODE_RE.is_match(trimmed) {
            return Err(SasbdbError::InvalidRecordCode(value.to_string()));
        }
        Ok(Self(trimmed.to_string()))
    }
}

impl TryFrom<String> for RecordCode {
    type Error = SasbdbError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<RecordCode> for String {
    fn from(code: RecordCode) -> Self {
        code.0
    }
}

/// How a fetched payload is written to disk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Serialization {
    /// Parsed JSON re-emitted with 4-space indentation.
    PrettyJson,
    /// Decoded text written as received.
    Verbatim,
}

/// How a response body is turned into text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextDecoding {
    /// Charset from `Content-Type`, UTF-8 when none is declared.
    Declared,
    /// Always UTF-8, whatever the server declares.
    Utf8,
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, ValueEnum,
)]
#[serde(rename_all = "kebab-case")]
pub enum ResourceKind {
    Summary,
    Intensity,
    RealSpace,
    Annotation,
}

impl ResourceKind {
    /// All kinds in the order they are fetched for each entry.
    pub const ALL: [ResourceKind; 4] = [
        ResourceKind::Summary,
        ResourceKind::Intensity,
        ResourceKind::RealSpace,
        ResourceKind::Annotation,
    ];

    pub fn remote_suffix(self) -> &'static str {
        match self {
            ResourceKind::Summary => "/",
            ResourceKind::Intensity => ".dat",
            ResourceKind::RealSpace => ".out",
            ResourceKind::Annotation => ".sascif",
        }
    }

    pub fn local_suffix(self) -> &'static str {
        match self {
            ResourceKind::Summary => "_summary.json",
            ResourceKind::Intensity => ".dat",
            ResourceKind::RealSpace => ".out",
            ResourceKind::Annotation => ".sascif",
        }
    }

    pub fn serialization(self) -> Serialization {
        match self {
            ResourceKind::Summary => Serialization::PrettyJson,
            ResourceKind::Intensity | ResourceKind::RealSpace | ResourceKind::Annotation => {
                Serialization::Verbatim
            }
        }
    }

    /// sasCIF files are not always served with the right charset.
    pub fn decoding(self) -> TextDecoding {
        match self {
            ResourceKind::Annotation => TextDecoding::Utf8,
            ResourceKind::Summary | ResourceKind::Intensity | ResourceKind::RealSpace => {
                TextDecoding::Declared
            }
        }
    }

    /// Human readable name used in log lines.
    pub fn label(self) -> &'static str {
        match self {
            ResourceKind::Summary => "summary",
            ResourceKind::Intensity => ".dat file",
            ResourceKind::RealSpace => "real space file",
            ResourceKind::Annotation => "SAS CIF file",
        }
    }

    /// Sorts and de-duplicates a selection so it follows the fetch order of [`ResourceKind::ALL`].
    pub fn canonical(kinds: &[ResourceKind]) -> Vec<ResourceKind> {
        let mut kinds = kinds.to_vec();
        kinds.sort();
        kinds.dedup();
        kinds
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResourceKind::Summary => write!(f, "summary"),
            ResourceKind::Intensity => write!(f, "intensity"),
            ResourceKind::RealSpace => write!(f, "real-space"),
            ResourceKind::Annotation => write!(f, "annotation"),
        }
    }
}

impl FromStr for ResourceKind {
    type Err = SasbdbError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "summary" | "json" => Ok(ResourceKind::Summary),
            "intensity" | "dat" => Ok(ResourceKind::Intensity),
            "real-space" | "realspace" | "out" => Ok(ResourceKind::RealSpace),
            "annotation" | "sascif" | "cif" => Ok(ResourceKind::Annotation),
            _ => Err(SasbdbError::InvalidResourceKind(value.to_string())),
        }
    }
}
