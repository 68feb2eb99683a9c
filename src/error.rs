use std::path::PathBuf;

use miette::Diagnostic;
use thiserror::Error;

#[derive(Debug, Error, Diagnostic)]
pub enum SasbdbError {
    #[error("invalid SASBDB code: {0}")]
    InvalidRecordCode(String),

    #[error("invalid resource kind: {0}")]
    InvalidResourceKind(String),

    #[error("SASBDB request failed: {0}")]
    SasbdbHttp(String),

    #[error("SASBDB returned status {status} for {url}")]
    #[diagnostic(help("the SASBDB API may have changed; the run was stopped before any further request"))]
    SasbdbStatus { status: u16, url: String },

    #[error("SASBDB code listing is not available at {0}")]
    ListingUnavailable(String),

    #[error("failed to parse SASBDB code listing: {0}")]
    MalformedListing(String),

    #[error("failed to parse summary for {code}: {message}")]
    MalformedSummary { code: String, message: String },

    #[error("data directory does not exist: {0}")]
    #[diagnostic(help("create the output directory before starting a run"))]
    DataDirMissing(PathBuf),

    #[error("filesystem error: {0}")]
    Filesystem(String),

    #[error("failed to read config file at {0}")]
    ConfigRead(PathBuf),

    #[error("failed to parse JSON config: {0}")]
    ConfigParse(String),
}
