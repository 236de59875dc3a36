//! Scripted in-memory transport for driving the client without a server.
//!
//! A test declares the exact exchange sequence it expects; the transport
//! asserts each request against the script in order and answers with the
//! canned response. `*` in an expected target matches any substring, which
//! covers client-generated transaction ids.

#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use bytes::Bytes;
use davsvn::{Dialect, Session, SessionConfig, Transport, WireRequest, WireResponse};

pub struct Exchange {
    pub method: &'static str,
    pub target: String,
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: String,
}

impl Exchange {
    pub fn new(method: &'static str, target: &str, status: u16) -> Self {
        Exchange {
            method,
            target: target.to_string(),
            status,
            headers: Vec::new(),
            body: String::new(),
        }
    }

    pub fn header(mut self, name: &str, value: &str) -> Self {
        self.headers.push((name.to_string(), value.to_string()));
        self
    }

    pub fn body(mut self, body: impl Into<String>) -> Self {
        self.body = body.into();
        self
    }
}

/// One request as the client sent it.
#[derive(Debug, Clone)]
pub struct Recorded {
    pub method: String,
    pub target: String,
    pub headers: Vec<(String, String)>,
    pub body: String,
}

impl Recorded {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

pub struct ScriptedTransport {
    script: Mutex<VecDeque<Exchange>>,
    requests: Mutex<Vec<Recorded>>,
}

impl ScriptedTransport {
    pub fn new(script: Vec<Exchange>) -> Self {
        ScriptedTransport {
            script: Mutex::new(script.into()),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Every recorded request, in order.
    pub fn requests(&self) -> Vec<Recorded> {
        self.requests.lock().unwrap().clone()
    }

    /// The recorded request sent for script position `index`.
    pub fn request(&self, index: usize) -> Recorded {
        self.requests.lock().unwrap()[index].clone()
    }

    pub fn assert_exhausted(&self) {
        let script = self.script.lock().unwrap();
        assert!(
            script.is_empty(),
            "script has {} unconsumed exchanges, next: {} {}",
            script.len(),
            script[0].method,
            script[0].target
        );
    }
}

impl Transport for ScriptedTransport {
    fn execute(&self, req: WireRequest) -> davsvn::Result<WireResponse> {
        self.requests.lock().unwrap().push(Recorded {
            method: req.method.to_string(),
            target: req.target.clone(),
            headers: req
                .headers
                .iter()
                .map(|(n, v)| (n.to_string(), v.clone()))
                .collect(),
            body: req
                .body
                .as_ref()
                .map(|b| String::from_utf8_lossy(b).into_owned())
                .unwrap_or_default(),
        });

        let exchange = self
            .script
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| panic!("unexpected request: {} {}", req.method, req.target));
        assert_eq!(
            req.method, exchange.method,
            "wrong method for {}",
            exchange.target
        );
        assert!(
            glob_match(&exchange.target, &req.target),
            "target {} does not match expected {}",
            req.target,
            exchange.target
        );
        Ok(WireResponse::new(
            exchange.status,
            exchange.headers,
            Bytes::from(exchange.body),
        ))
    }
}

/// Match `target` against `pattern`, where `*` spans any substring.
fn glob_match(pattern: &str, target: &str) -> bool {
    let parts: Vec<&str> = pattern.split('*').collect();
    if parts.len() == 1 {
        return pattern == target;
    }
    let mut rest = match target.strip_prefix(parts[0]) {
        Some(rest) => rest,
        None => return false,
    };
    for part in &parts[1..parts.len() - 1] {
        match rest.find(part) {
            Some(i) => rest = &rest[i + part.len()..],
            None => return false,
        }
    }
    rest.ends_with(parts[parts.len() - 1])
}

/// A session over a scripted transport, prefix `/svn`.
pub fn scripted_session(dialect: Dialect, script: Vec<Exchange>) -> (Session, Arc<ScriptedTransport>) {
    let transport = Arc::new(ScriptedTransport::new(script));
    let config = SessionConfig::new("http://test", "/svn", dialect);
    let session = Session::with_transport(&config, transport.clone());
    (session, transport)
}

/// The OPTIONS exchange answering head discovery for the v2 dialect.
pub fn options_head(head: u64, uuid: &str) -> Exchange {
    Exchange::new("OPTIONS", "/svn/", 200)
        .header("SVN-Youngest-Rev", &head.to_string())
        .header("SVN-Repository-UUID", uuid)
}

/// PROPFIND answer for a resource that does not exist.
pub fn absent(target: &str) -> Exchange {
    Exchange::new("PROPFIND", target, 404)
}

pub fn multistatus(entries: &[String]) -> String {
    format!(
        "<?xml version=\"1.0\" encoding=\"utf-8\"?>\n\
         <D:multistatus xmlns:D=\"DAV:\" xmlns:lp3=\"http://subversion.tigris.org/xmlns/dav/\">{}</D:multistatus>",
        entries.concat()
    )
}

/// One multistatus entry for a file.
pub fn file_entry(href: &str, revision: u64, lock: Option<(&str, &str)>) -> String {
    let lockdiscovery = lock
        .map(|(token, owner)| {
            format!(
                "<D:lockdiscovery><D:activelock>\
                 <D:locktoken><D:href>{token}</D:href></D:locktoken>\
                 <D:owner>{owner}</D:owner>\
                 </D:activelock></D:lockdiscovery>"
            )
        })
        .unwrap_or_default();
    format!(
        "<D:response><D:href>{href}</D:href><D:propstat><D:prop>\
         <D:resourcetype/>\
         <D:version-name>{revision}</D:version-name>\
         <D:creationdate>2024-01-01T00:00:00.000000Z</D:creationdate>\
         {lockdiscovery}\
         </D:prop><D:status>HTTP/1.1 200 OK</D:status></D:propstat></D:response>"
    )
}

/// One multistatus entry for a directory.
pub fn dir_entry(href: &str, revision: u64) -> String {
    format!(
        "<D:response><D:href>{href}</D:href><D:propstat><D:prop>\
         <D:resourcetype><D:collection/></D:resourcetype>\
         <D:version-name>{revision}</D:version-name>\
         </D:prop><D:status>HTTP/1.1 200 OK</D:status></D:propstat></D:response>"
    )
}

/// MERGE response announcing the committed revision.
pub fn merge_response(revision: u64) -> String {
    format!(
        "<?xml version=\"1.0\" encoding=\"utf-8\"?>\n\
         <D:merge-response xmlns:D=\"DAV:\"><D:updated-set><D:response>\
         <D:href>/svn/!svn/vcc/default</D:href>\
         <D:propstat><D:prop>\
         <D:resourcetype><D:baseline/></D:resourcetype>\
         <D:version-name>{revision}</D:version-name>\
         <D:creationdate>2024-06-01T00:00:00.000000Z</D:creationdate>\
         <D:creator-displayname>tester</D:creator-displayname>\
         </D:prop><D:status>HTTP/1.1 200 OK</D:status></D:propstat>\
         </D:response></D:updated-set></D:merge-response>"
    )
}
