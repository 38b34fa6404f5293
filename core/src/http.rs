//! HTTP transport types for the host-does-IO pattern.
//!
//! # Design
//! These types describe HTTP exchanges with the query service as plain data.
//! The core builds `HttpRequest` values and parses `HttpResponse` values
//! without touching the network; the host executes the actual I/O and feeds
//! the outcome back into the store.
//!
//! The query service exposes a single endpoint, so every request is a `POST`
//! with a JSON body. Fields use owned types so values can move freely between
//! the event loop and the tasks that perform the I/O.

/// A `POST` request to the query service described as plain data.
///
/// Built by `QueryClient::build_*` methods. The host sends it and reports the
/// result back as an `HttpResponse` (or a transport failure).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpRequest {
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub body: String,
}

impl HttpRequest {
    /// Look up a header by case-insensitive name.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

/// An HTTP response described as plain data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

impl HttpResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// What the host reports after attempting to execute an `HttpRequest`.
///
/// `Err` carries the transport failure message (connection refused, DNS,
/// TLS, ...); HTTP error statuses are a successful exchange and arrive as
/// `Ok` with the status set.
pub type HttpOutcome = Result<HttpResponse, String>;
