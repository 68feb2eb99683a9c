use std::io::{Read, Write};
use std::net::TcpListener;
use std::sync::Mutex;
use std::thread;

use assert_matches::assert_matches;
use reqwest::blocking::Client;

use sasbdb_fetcher::domain::TextDecoding;
use sasbdb_fetcher::endpoints::Endpoints;
use sasbdb_fetcher::error::SasbdbError;
use sasbdb_fetcher::sasbdb::{
    FetchOutcome, Payload, SasbdbClient, SasbdbHttpClient, list_all_codes,
};

struct ListingOnly {
    body: Option<&'static str>,
    calls: Mutex<usize>,
}

impl ListingOnly {
    fn new(body: Option<&'static str>) -> Self {
        Self {
            body,
            calls: Mutex::new(0),
        }
    }
}

impl SasbdbClient for ListingOnly {
    fn get(&self, _url: &str, _decoding: TextDecoding) -> Result<FetchOutcome, SasbdbError> {
        *self.calls.lock().unwrap() += 1;
        Ok(match self.body {
            Some(body) => FetchOutcome::Found(Payload::new(body)),
            None => FetchOutcome::Absent,
        })
    }
}

#[test]
fn codes_keep_server_order() {
    let client = ListingOnly::new(Some(
        r#"[{"code":"SASDE48","id":1,"title":"x","cif_file_url":null,"extra":true},{"code":"SASDA1"}]"#,
    ));

    let codes = list_all_codes(&client, &Endpoints::default()).unwrap();

    let codes: Vec<&str> = codes.iter().map(|code| code.as_str()).collect();
    assert_eq!(codes, vec!["SASDE48", "SASDA1"]);
    assert_eq!(*client.calls.lock().unwrap(), 1);
}

#[test]
fn listing_without_code_field_is_malformed() {
    let client = ListingOnly::new(Some(r#"[{"id":1}]"#));
    let err = list_all_codes(&client, &Endpoints::default()).unwrap_err();
    assert_matches!(err, SasbdbError::MalformedListing(_));
}

#[test]
fn listing_not_found_is_fatal() {
    let client = ListingOnly::new(None);
    let err = list_all_codes(&client, &Endpoints::default()).unwrap_err();
    assert_matches!(err, SasbdbError::ListingUnavailable(_));
}

#[test]
fn empty_listing_yields_no_codes() {
    let client = ListingOnly::new(Some("[]"));
    assert!(list_all_codes(&client, &Endpoints::default()).unwrap().is_empty());
}

/// Answers a single request on a loopback port with `head` and `body`.
fn serve_once(head: &str, body: &'static [u8]) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    let head = format!(
        "{head}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
        body.len()
    );
    thread::spawn(move || {
        let (mut stream, _) = listener.accept().unwrap();
        let mut request = Vec::new();
        let mut buf = [0u8; 1024];
        while !request.windows(4).any(|window| window == b"\r\n\r\n") {
            let read = stream.read(&mut buf).unwrap();
            if read == 0 {
                break;
            }
            request.extend_from_slice(&buf[..read]);
        }
        stream.write_all(head.as_bytes()).unwrap();
        stream.write_all(body).unwrap();
    });
    format!("http://{addr}/media/SASDA1")
}

fn http_client() -> SasbdbHttpClient {
    SasbdbHttpClient::from_client(Client::builder().no_proxy().build().unwrap())
}

#[test]
fn http_client_honours_declared_charset() {
    let url = serve_once(
        "HTTP/1.1 200 OK\r\nContent-Type: text/plain; charset=iso-8859-1",
        b"# \xC5ngstrom\n",
    );

    let outcome = http_client().get(&url, TextDecoding::Declared).unwrap();

    let payload = assert_matches!(outcome, FetchOutcome::Found(payload) => payload);
    assert_eq!(payload.text(), "# Ångstrom\n");
}

#[test]
fn http_client_forces_utf8_for_sascif() {
    let url = serve_once(
        "HTTP/1.1 200 OK\r\nContent-Type: text/plain; charset=iso-8859-1",
        "data_SASDA1\n_sas_sample.name 'Å'\n".as_bytes(),
    );

    let outcome = http_client().get(&url, TextDecoding::Utf8).unwrap();

    let payload = assert_matches!(outcome, FetchOutcome::Found(payload) => payload);
    assert_eq!(payload.text(), "data_SASDA1\n_sas_sample.name 'Å'\n");
}

#[test]
fn http_client_defaults_to_utf8_without_charset() {
    let url = serve_once(
        "HTTP/1.1 200 OK\r\nContent-Type: application/json",
        r#"{"title":"Lysozyme à 4 °C"}"#.as_bytes(),
    );

    let outcome = http_client().get(&url, TextDecoding::Declared).unwrap();

    let payload = assert_matches!(outcome, FetchOutcome::Found(payload) => payload);
    assert_eq!(payload.json().unwrap()["title"], "Lysozyme à 4 °C");
}

#[test]
fn http_client_maps_404_to_absent() {
    let url = serve_once("HTTP/1.1 404 Not Found", b"");
    let outcome = http_client().get(&url, TextDecoding::Declared).unwrap();
    assert_eq!(outcome, FetchOutcome::Absent);
}

#[test]
fn http_client_fails_on_server_error() {
    let url = serve_once("HTTP/1.1 500 Internal Server Error", b"boom");
    let err = http_client().get(&url, TextDecoding::Declared).unwrap_err();
    assert_matches!(err, SasbdbError::SasbdbStatus { status: 500, .. });
}

#[test]
fn http_client_fails_when_nothing_listens() {
    let port = {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap().port()
    };
    let url = format!("http://127.0.0.1:{port}/media/SASDA1.dat");

    let err = http_client().get(&url, TextDecoding::Declared).unwrap_err();

    assert_matches!(err, SasbdbError::SasbdbHttp(_));
}
