use serde::{Deserialize, Serialize};

use crate::domain::{RecordCode, ResourceKind};

pub const DEFAULT_LISTING_URL: &str = "https://www.sasbdb.org/rest-api/entry/codes/all/";
pub const DEFAULT_SUMMARY_BASE: &str = "https://www.sasbdb.org/rest-api/entry/summary/";
pub const DEFAULT_INTENSITY_BASE: &str = "https://www.sasbdb.org/media/intensities_files/";
pub const DEFAULT_REAL_SPACE_BASE: &str = "https://www.sasbdb.org/media/p_of_R_files/";
pub const DEFAULT_ANNOTATION_BASE: &str = "https://www.sasbdb.org/media/sascif/sascif_files/";

/// Base URLs of the SASBDB endpoints. Resource URLs are built by plain
/// concatenation of `base + code + suffix`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Endpoints {
    pub listing_url: String,
    pub summary_base: String,
    pub intensity_base: String,
    pub real_space_base: String,
    pub annotation_base: String,
}

impl Default for Endpoints {
    fn default() -> Self {
        Self {
            listing_url: DEFAULT_LISTING_URL.to_string(),
            summary_base: DEFAULT_SUMMARY_BASE.to_string(),
            intensity_base: DEFAULT_INTENSITY_BASE.to_string(),
            real_space_base: DEFAULT_REAL_SPACE_BASE.to_string(),
            annotation_base: DEFAULT_ANNOTATION_BASE.to_string(),
        }
    }
}

impl Endpoints {
    pub fn base_url(&self, kind: ResourceKind) -> &str {
        match kind {
            ResourceKind::Summary => &self.summary_base,
            ResourceKind::Intensity => &self.intensity_base,
            ResourceKind::RealSpace => &self.real_space_base,
            ResourceKind::Annotation => &self.annotation_base,
        }
    }

    pub fn resource_url(&self, code: &RecordCode, kind: ResourceKind) -> String {
        format!(
            "{}{}{}",
            self.base_url(kind),
            code.as_str(),
            kind.remote_suffix()
        )
    }
}
