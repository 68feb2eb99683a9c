use reqwest::StatusCode;
use reqwest::blocking::{Client, Response};
use reqwest::header::{HeaderMap, HeaderValue, USER_AGENT};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, error, info};

use crate::domain::{RecordCode, TextDecoding};
use crate::endpoints::Endpoints;
use crate::error::SasbdbError;

/// Full body of a successful response, already decoded to text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Payload {
    text: String,
}

impl Payload {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn json(&self) -> Result<Value, serde_json::Error> {
        serde_json::from_str(&self.text)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchOutcome {
    Found(Payload),
    /// The server answered 404: the resource does not exist for this entry.
    Absent,
}

/// One item of the listing endpoint. Only `code` is required.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListingEntry {
    pub code: String,
    #[serde(default)]
    pub id: Option<Value>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub cif_file_url: Option<String>,
}

pub trait SasbdbClient: Send + Sync {
    /// Issues one GET. `Ok(Absent)` for 404, `Err` for every other non-200
    /// status and for transport failures.
    fn get(&self, url: &str, decoding: TextDecoding) -> Result<FetchOutcome, SasbdbError>;
}

#[derive(Clone)]
pub struct SasbdbHttpClient {
    client: Client,
}

impl SasbdbHttpClient {
    pub fn new() -> Result<Self, SasbdbError> {
        let mut headers = HeaderMap::new();
        headers.insert(
            USER_AGENT,
            HeaderValue::from_str(&format!("sasbdb-fetch/{}", env!("CARGO_PKG_VERSION")))
                .map_err(|err| SasbdbError::SasbdbHttp(err.to_string()))?,
        );
        let client = Client::builder()
            .default_headers(headers)
            .build()
            .map_err(|err| SasbdbError::SasbdbHttp(err.to_string()))?;
        Ok(Self::from_client(client))
    }

    pub fn from_client(client: Client) -> Self {
        Self { client }
    }
}

impl SasbdbClient for SasbdbHttpClient {
    fn get(&self, url: &str, decoding: TextDecoding) -> Result<FetchOutcome, SasbdbError> {
        info!("making the request to {url}");
        let response = self.client.get(url).send().map_err(|err| {
            error!("error reaching the address {url}: {err}");
            SasbdbError::SasbdbHttp(format!("{url}: {err}"))
        })?;
        if !is_found(response.status(), url)? {
            return Ok(FetchOutcome::Absent);
        }
        let text = decode_body(response, decoding).map_err(|err| {
            error!("failed to read the response body from {url}: {err}");
            SasbdbError::SasbdbHttp(format!("{url}: {err}"))
        })?;
        debug!(bytes = text.len(), "GET request successfully done");
        Ok(FetchOutcome::Found(Payload::new(text)))
    }
}

fn decode_body(response: Response, decoding: TextDecoding) -> Result<String, reqwest::Error> {
    match decoding {
        TextDecoding::Declared => response.text(),
        TextDecoding::Utf8 => {
            let bytes = response.bytes()?;
            Ok(String::from_utf8_lossy(&bytes).into_owned())
        }
    }
}

/// Maps a response status onto the fetch contract: `Ok(true)` for 200,
/// `Ok(false)` for 404 and an error for anything else.
pub fn is_found(status: StatusCode, url: &str) -> Result<bool, SasbdbError> {
    match status {
        StatusCode::OK => Ok(true),
        StatusCode::NOT_FOUND => {
            debug!("GET request could not reach the address {url}");
            Ok(false)
        }
        other => {
            error!(status = other.as_u16(), "unexpected status from {url}");
            Err(SasbdbError::SasbdbStatus {
                status: other.as_u16(),
                url: url.to_string(),
            })
        }
    }
}

/// Enumerates every entry code from the listing endpoint, in server order.
pub fn list_all_codes<C: SasbdbClient + ?Sized>(
    client: &C,
    endpoints: &Endpoints,
) -> Result<Vec<RecordCode>, SasbdbError> {
    info!("parsing the entries for their SASBDB code");
    let payload = match client.get(&endpoints.listing_url, TextDecoding::Declared)? {
        FetchOutcome::Found(payload) => payload,
        FetchOutcome::Absent => {
            error!("the code listing at {} is not available", endpoints.listing_url);
            return Err(SasbdbError::ListingUnavailable(
                endpoints.listing_url.clone(),
            ));
        }
    };
    let entries: Vec<ListingEntry> = serde_json::from_str(payload.text())
        .map_err(|err| SasbdbError::MalformedListing(err.to_string()))?;
    let codes = entries
        .into_iter()
        .map(|entry| entry.code.parse())
        .collect::<Result<Vec<RecordCode>, SasbdbError>>()?;
    info!("{} SASBDB codes were retrieved", codes.len());
    Ok(codes)
}
