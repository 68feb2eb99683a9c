use std::fs;
use std::io::Write;

use camino::{Utf8Path, Utf8PathBuf};
use chrono::{DateTime, TimeZone};
use serde::Serialize;
use serde_json::Value;
use serde_json::ser::PrettyFormatter;
use tempfile::Builder;

use crate::domain::{RecordCode, ResourceKind, Serialization};
use crate::error::SasbdbError;
use crate::sasbdb::Payload;

pub const MANIFEST_FILE_NAME: &str = "list_SASBDB_codes.txt";
pub const MANIFEST_TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Local data directory. Every persisted file is a direct child of it and
/// its name depends only on the entry code and the resource kind.
#[derive(Debug, Clone)]
pub struct Store {
    data_dir: Utf8PathBuf,
}

impl Store {
    pub fn new(data_dir: impl Into<Utf8PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }

    pub fn data_dir(&self) -> &Utf8Path {
        &self.data_dir
    }

    /// The directory is never created here; it has to exist before a run.
    pub fn ensure_data_dir(&self) -> Result<(), SasbdbError> {
        if self.data_dir.as_std_path().is_dir() {
            Ok(())
        } else {
            Err(SasbdbError::DataDirMissing(
                self.data_dir.clone().into_std_path_buf(),
            ))
        }
    }

    pub fn resource_path(&self, code: &RecordCode, kind: ResourceKind) -> Utf8PathBuf {
        self.data_dir
            .join(format!("{}{}", code.as_str(), kind.local_suffix()))
    }

    pub fn manifest_path(&self) -> Utf8PathBuf {
        self.data_dir.join(MANIFEST_FILE_NAME)
    }

    pub fn write_resource(
        &self,
        code: &RecordCode,
        kind: ResourceKind,
        payload: &Payload,
    ) -> Result<Utf8PathBuf, SasbdbError> {
        let path = self.resource_path(code, kind);
        let content = match kind.serialization() {
            Serialization::PrettyJson => {
                let value = payload
                    .json()
                    .map_err(|err| SasbdbError::MalformedSummary {
                        code: code.to_string(),
                        message: err.to_string(),
                    })?;
                to_json_4_spaces(code, &value)?
            }
            Serialization::Verbatim => payload.text().as_bytes().to_vec(),
        };
        self.write_bytes_atomic(&path, &content)?;
        Ok(path)
    }

    pub fn write_manifest<Tz>(
        &self,
        codes: &[RecordCode],
        retrieved_at: &DateTime<Tz>,
    ) -> Result<Utf8PathBuf, SasbdbError>
    where
        Tz: TimeZone,
        Tz::Offset: std::fmt::Display,
    {
        let path = self.manifest_path();
        let content = render_manifest(codes, retrieved_at);
        self.write_bytes_atomic(&path, content.as_bytes())?;
        Ok(path)
    }

    /// Reads one top-level field of a persisted summary, e.g. `guinier_rg`.
    pub fn read_summary_field(
        &self,
        code: &RecordCode,
        field: &str,
    ) -> Result<Option<Value>, SasbdbError> {
        let path = self.resource_path(code, ResourceKind::Summary);
        let content = fs::read_to_string(path.as_std_path())
            .map_err(|err| SasbdbError::Filesystem(format!("read {path}: {err}")))?;
        let value: Value =
            serde_json::from_str(&content).map_err(|err| SasbdbError::MalformedSummary {
                code: code.to_string(),
                message: err.to_string(),
            })?;
        Ok(value.get(field).cloned())
    }

    fn write_bytes_atomic(&self, path: &Utf8Path, content: &[u8]) -> Result<(), SasbdbError> {
        let mut temp = Builder::new()
            .prefix(".sasbdb-fetch")
            .tempfile_in(self.data_dir.as_std_path())
            .map_err(|err| SasbdbError::Filesystem(format!("{}: {err}", self.data_dir)))?;
        temp.write_all(content)
            .map_err(|err| SasbdbError::Filesystem(err.to_string()))?;
        temp.persist(path.as_std_path())
            .map_err(|err| SasbdbError::Filesystem(format!("{path}: {err}")))?;
        Ok(())
    }
}

pub fn render_manifest<Tz>(codes: &[RecordCode], retrieved_at: &DateTime<Tz>) -> String
where
    Tz: TimeZone,
    Tz::Offset: std::fmt::Display,
{
    let mut content = format!(
        "# SASBDB codes retrieved on {}\n",
        retrieved_at.format(MANIFEST_TIMESTAMP_FORMAT)
    );
    for code in codes {
        content.push_str(code.as_str());
        content.push('\n');
    }
    content
}

fn to_json_4_spaces<T: Serialize>(code: &RecordCode, value: &T) -> Result<Vec<u8>, SasbdbError> {
    let mut buffer = Vec::new();
    let mut serializer =
        serde_json::Serializer::with_formatter(&mut buffer, PrettyFormatter::with_indent(b"    "));
    value
        .serialize(&mut serializer)
        .map_err(|err| SasbdbError::MalformedSummary {
            code: code.to_string(),
            message: err.to_string(),
        })?;
    Ok(buffer)
}
