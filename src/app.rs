use std::time::{Duration, Instant};

use camino::Utf8PathBuf;
use chrono::Local;
use serde::Serialize;
use tracing::{error, info, warn};

use crate::domain::{RecordCode, ResourceKind};
use crate::endpoints::Endpoints;
use crate::error::SasbdbError;
use crate::pacing::{DEFAULT_DELAY, Pacer};
use crate::sasbdb::{FetchOutcome, SasbdbClient, list_all_codes};
use crate::store::Store;

/// What a run fetches. The three historical scripts (summary-only,
/// everything, sasCIF-only) are all expressible with this.
#[derive(Debug, Clone)]
pub struct PipelineOptions {
    pub kinds: Vec<ResourceKind>,
    pub write_manifest: bool,
    pub delay: Duration,
}

impl Default for PipelineOptions {
    fn default() -> Self {
        Self {
            kinds: ResourceKind::ALL.to_vec(),
            write_manifest: true,
            delay: DEFAULT_DELAY,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase", tag = "status", content = "path")]
pub enum ResourceStatus {
    Written(Utf8PathBuf),
    Absent,
}

#[derive(Debug, Clone, Serialize)]
pub struct CodeReport {
    pub code: RecordCode,
    pub written: Vec<ResourceKind>,
    pub absent: Vec<ResourceKind>,
}

#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub codes: usize,
    pub written: usize,
    pub absent: usize,
    pub manifest_path: Option<Utf8PathBuf>,
    pub reports: Vec<CodeReport>,
}

#[derive(Debug, Clone)]
pub struct ProgressEvent {
    pub message: String,
    pub elapsed: Option<Duration>,
}

pub trait ProgressSink {
    fn event(&self, event: ProgressEvent);
}

pub struct App<C: SasbdbClient, P: Pacer> {
    store: Store,
    client: C,
    pacer: P,
    endpoints: Endpoints,
}

impl<C: SasbdbClient, P: Pacer> App<C, P> {
    pub fn new(store: Store, client: C, pacer: P, endpoints: Endpoints) -> Self {
        Self {
            store,
            client,
            pacer,
            endpoints,
        }
    }

    pub fn store(&self) -> &Store {
        &self.store
    }

    pub fn run(
        &self,
        options: &PipelineOptions,
        sink: &dyn ProgressSink,
    ) -> Result<RunSummary, SasbdbError> {
        self.store.ensure_data_dir()?;
        let kinds = ResourceKind::canonical(&options.kinds);

        sink.event(ProgressEvent {
            message: "phase=Resolve; listing SASBDB codes".to_string(),
            elapsed: None,
        });
        let codes = self.list_codes()?;

        let manifest_path = if options.write_manifest {
            Some(self.write_manifest(&codes)?)
        } else {
            None
        };

        let mut reports = Vec::with_capacity(codes.len());
        for (index, code) in codes.iter().enumerate() {
            sink.event(ProgressEvent {
                message: format!("phase=Fetch; {code} ({}/{})", index + 1, codes.len()),
                elapsed: None,
            });
            reports.push(self.fetch_code(code, &kinds, sink)?);
            self.pacer.pause(options.delay);
        }

        let written: usize = reports.iter().map(|report| report.written.len()).sum();
        let absent: usize = reports.iter().map(|report| report.absent.len()).sum();
        info!(codes = reports.len(), written, absent, "finished acquiring SASBDB data");
        Ok(RunSummary {
            codes: reports.len(),
            written,
            absent,
            manifest_path,
            reports,
        })
    }

    pub fn list_codes(&self) -> Result<Vec<RecordCode>, SasbdbError> {
        list_all_codes(&self.client, &self.endpoints).inspect_err(|err| {
            error!("the program will now exit: {err}");
        })
    }

    pub fn write_manifest(&self, codes: &[RecordCode]) -> Result<Utf8PathBuf, SasbdbError> {
        let path = self.store.write_manifest(codes, &Local::now())?;
        info!("saved the list of {} SASBDB codes to {path}", codes.len());
        Ok(path)
    }

    /// Fetches every requested kind for one entry, in the given order. An
    /// absent resource never stops the remaining kinds.
    pub fn fetch_code(
        &self,
        code: &RecordCode,
        kinds: &[ResourceKind],
        sink: &dyn ProgressSink,
    ) -> Result<CodeReport, SasbdbError> {
        info!("---------------------------------------");
        info!("starting acquiring data for {code} from the SASBDB");
        let start = Instant::now();
        let mut report = CodeReport {
            code: code.clone(),
            written: Vec::new(),
            absent: Vec::new(),
        };
        for &kind in kinds {
            match self.fetch_resource(code, kind)? {
                ResourceStatus::Written(_) => report.written.push(kind),
                ResourceStatus::Absent => report.absent.push(kind),
            }
        }
        sink.event(ProgressEvent {
            message: format!(
                "phase=Store; {code} written={} absent={}",
                report.written.len(),
                report.absent.len()
            ),
            elapsed: Some(start.elapsed()),
        });
        info!("done for {code}");
        Ok(report)
    }

    pub fn fetch_resource(
        &self,
        code: &RecordCode,
        kind: ResourceKind,
    ) -> Result<ResourceStatus, SasbdbError> {
        let url = self.endpoints.resource_url(code, kind);
        info!("downloading the {} for {code}", kind.label());
        let outcome = self.client.get(&url, kind.decoding()).inspect_err(|err| {
            error!("error making the request for the {} of {code}: {err}", kind.label());
            error!("the program will now exit");
        })?;
        match outcome {
            FetchOutcome::Found(payload) => {
                let path = self.store.write_resource(code, kind, &payload)?;
                info!("saved the {} for {code} to {path}", kind.label());
                Ok(ResourceStatus::Written(path))
            }
            FetchOutcome::Absent => {
                warn!("no {} available for {code}", kind.label());
                Ok(ResourceStatus::Absent)
            }
        }
    }
}
