//! The wire seam: one blocking request/response pair per round trip.
//!
//! The protocol engine builds [`WireRequest`]s and interprets
//! [`WireResponse`]s; everything below that line (connection pooling,
//! TLS trust, retry of idempotent methods, credentials) belongs to the
//! [`Transport`] implementation, not to the engine.

use crate::error::{DavError, Result};
use bytes::Bytes;
use std::time::Duration;

/// A single protocol request, ready to execute.
#[derive(Debug, Clone)]
pub struct WireRequest {
    pub method: &'static str,
    /// Absolute path on the server (already percent-encoded).
    pub target: String,
    pub headers: Vec<(&'static str, String)>,
    pub body: Option<Bytes>,
}

impl WireRequest {
    pub fn new(method: &'static str, target: impl Into<String>) -> Self {
        WireRequest {
            method,
            target: target.into(),
            headers: Vec::new(),
            body: None,
        }
    }

    pub fn header(mut self, name: &'static str, value: impl Into<String>) -> Self {
        self.headers.push((name, value.into()));
        self
    }

    pub fn xml_body(mut self, xml: String) -> Self {
        self.headers
            .push(("Content-Type", "text/xml; charset=\"utf-8\"".to_string()));
        self.body = Some(Bytes::from(xml));
        self
    }

    pub fn raw_body(mut self, body: Bytes) -> Self {
        self.body = Some(body);
        self
    }
}

/// A completed response.
#[derive(Debug, Clone)]
pub struct WireResponse {
    pub status: u16,
    headers: Vec<(String, String)>,
    pub body: Bytes,
}

impl WireResponse {
    pub fn new(status: u16, headers: Vec<(String, String)>, body: Bytes) -> Self {
        WireResponse {
            status,
            headers,
            body,
        }
    }

    /// Case-insensitive header lookup.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    pub fn body_str(&self) -> std::borrow::Cow<'_, str> {
        String::from_utf8_lossy(&self.body)
    }

    /// Fault unless the status is in the accepted set.
    pub fn expect(&self, method: &'static str, target: &str, accepted: &[u16]) -> Result<()> {
        if accepted.contains(&self.status) {
            Ok(())
        } else {
            Err(DavError::UnexpectedStatus {
                method,
                target: target.to_string(),
                status: self.status,
                expected: accepted.to_vec(),
            })
        }
    }
}

/// Executes one request and blocks until the server answers.
///
/// Implementations own connection reuse, TLS policy and authentication.
/// The engine never retries through this trait.
pub trait Transport: Send + Sync {
    fn execute(&self, req: WireRequest) -> Result<WireResponse>;
}

/// Default transport on `reqwest::blocking` with optional basic auth.
pub struct HttpTransport {
    client: reqwest::blocking::Client,
    base_url: String,
    username: Option<String>,
    password: Option<String>,
}

impl HttpTransport {
    /// Create a transport targeting `base_url` (e.g. `http://server:8080`).
    pub fn new(base_url: &str) -> Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(300))
            .build()
            .map_err(|e| DavError::Transport(format!("failed to create HTTP client: {e}")))?;
        Ok(HttpTransport {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            username: None,
            password: None,
        })
    }

    /// Attach basic-auth credentials to every request.
    pub fn with_credentials(mut self, username: &str, password: &str) -> Self {
        self.username = Some(username.to_string());
        self.password = Some(password.to_string());
        self
    }
}

impl Transport for HttpTransport {
    fn execute(&self, req: WireRequest) -> Result<WireResponse> {
        let method = reqwest::Method::from_bytes(req.method.as_bytes())
            .map_err(|e| DavError::Transport(format!("invalid method {}: {e}", req.method)))?;
        let url = format!("{}{}", self.base_url, req.target);
        tracing::debug!("{} {}", req.method, url);

        let mut builder = self.client.request(method, &url);
        if let Some(user) = &self.username {
            builder = builder.basic_auth(user, self.password.as_deref());
        }
        for (name, value) in &req.headers {
            builder = builder.header(*name, value);
        }
        if let Some(body) = req.body {
            builder = builder.body(body.to_vec());
        }

        let resp = builder
            .send()
            .map_err(|e| DavError::Transport(format!("{} {url} failed: {e}", req.method)))?;

        let status = resp.status().as_u16();
        let headers = resp
            .headers()
            .iter()
            .map(|(n, v)| {
                (
                    n.as_str().to_string(),
                    String::from_utf8_lossy(v.as_bytes()).into_owned(),
                )
            })
            .collect();
        let body = resp
            .bytes()
            .map_err(|e| DavError::Transport(format!("failed to read response body: {e}")))?;

        tracing::debug!("{} {} -> {}", req.method, url, status);
        Ok(WireResponse::new(status, headers, Bytes::from(body)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_header_lookup_is_case_insensitive() {
        let resp = WireResponse::new(
            200,
            vec![("SVN-Youngest-Rev".to_string(), "12".to_string())],
            Bytes::new(),
        );
        assert_eq!(resp.header("svn-youngest-rev"), Some("12"));
        assert_eq!(resp.header("missing"), None);
    }

    #[test]
    fn test_expect_status() {
        let resp = WireResponse::new(404, vec![], Bytes::new());
        assert!(resp.expect("PROPFIND", "/x", &[207]).is_err());
        let resp = WireResponse::new(207, vec![], Bytes::new());
        assert!(resp.expect("PROPFIND", "/x", &[207]).is_ok());
    }

    #[test]
    fn test_xml_body_sets_content_type() {
        let req = WireRequest::new("PROPFIND", "/x").xml_body("<a/>".to_string());
        assert!(
            req.headers
                .iter()
                .any(|(n, v)| *n == "Content-Type" && v.starts_with("text/xml"))
        );
        assert_eq!(req.body.unwrap(), Bytes::from("<a/>"));
    }
}
