//! Session setup and head discovery.
//!
//! A [`Session`] owns the transport and the repository addressing facts
//! (prefix, dialect). Reads go through a [`View`], a `(uuid, head)`
//! snapshot taken at creation time; writes go through
//! [`Txn`](crate::txn::Txn) via [`Session::begin`].

use std::sync::Arc;

use crate::error::{DavError, Result};
use crate::mapper::Dialect;
use crate::resource::{Depth, PropertyKind, Resource};
use crate::transport::{HttpTransport, Transport, WireRequest};
use crate::xml::{builder, parser};

/// Caller-supplied session parameters. The dialect is configured, not
/// probed; pointing a session at the wrong dialect surfaces as unexpected
/// statuses on the first round trip.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Scheme and authority, e.g. `http://svn.example.com:8080`.
    pub base_url: String,
    /// Repository location on the server, e.g. `/svn/project`.
    pub prefix: String,
    pub dialect: Dialect,
    pub username: Option<String>,
    pub password: Option<String>,
}

impl SessionConfig {
    pub fn new(base_url: impl Into<String>, prefix: &str, dialect: Dialect) -> Self {
        SessionConfig {
            base_url: base_url.into(),
            prefix: normalize_prefix(prefix),
            dialect,
            username: None,
            password: None,
        }
    }

    pub fn with_credentials(mut self, username: &str, password: &str) -> Self {
        self.username = Some(username.to_string());
        self.password = Some(password.to_string());
        self
    }
}

/// Leading slash, no trailing slash. An empty prefix means the repository
/// sits at the server root.
fn normalize_prefix(prefix: &str) -> String {
    let trimmed = prefix.trim_matches('/');
    if trimmed.is_empty() {
        String::new()
    } else {
        format!("/{trimmed}")
    }
}

/// Shared by every view and transaction spawned from one session.
pub(crate) struct SessionInner {
    pub(crate) transport: Arc<dyn Transport>,
    pub(crate) prefix: String,
    pub(crate) dialect: Dialect,
}

impl SessionInner {
    /// The live (unprefixed) wire address of a resource.
    pub(crate) fn live_path(&self, resource: &Resource) -> String {
        format!("{}{}", self.prefix, resource.encoded())
    }

    pub(crate) fn execute(&self, req: WireRequest) -> Result<crate::transport::WireResponse> {
        self.transport.execute(req)
    }
}

/// A connection to one repository.
#[derive(Clone)]
pub struct Session {
    pub(crate) inner: Arc<SessionInner>,
}

impl Session {
    /// Open a session over the default HTTP transport.
    pub fn open(config: SessionConfig) -> Result<Session> {
        let mut transport = HttpTransport::new(&config.base_url)?;
        if let (Some(user), Some(pass)) = (&config.username, &config.password) {
            transport = transport.with_credentials(user, pass);
        }
        Ok(Self::with_transport(&config, Arc::new(transport)))
    }

    /// Open a session over a caller-supplied transport.
    pub fn with_transport(config: &SessionConfig, transport: Arc<dyn Transport>) -> Session {
        Session {
            inner: Arc::new(SessionInner {
                transport,
                prefix: config.prefix.clone(),
                dialect: config.dialect,
            }),
        }
    }

    /// Snapshot the repository into a read-only [`View`] at the current
    /// head revision.
    pub fn view(&self) -> Result<View> {
        let (uuid, head) = discover_head(&self.inner)?;
        tracing::debug!("view opened at r{head} (uuid {uuid})");
        Ok(View {
            inner: Arc::clone(&self.inner),
            uuid,
            head,
        })
    }

    /// The repository's current head revision.
    pub fn latest_revision(&self) -> Result<u64> {
        discover_head(&self.inner).map(|(_, head)| head)
    }
}

/// Read-only snapshot of the repository at one head revision.
///
/// All reads against a view are answered relative to its head; the view
/// stays coherent even as the repository advances underneath it.
pub struct View {
    pub(crate) inner: Arc<SessionInner>,
    uuid: String,
    head: u64,
}

impl View {
    pub fn repository_uuid(&self) -> &str {
        &self.uuid
    }

    pub fn head(&self) -> u64 {
        self.head
    }
}

/// Discover `(repository uuid, head revision)` for the configured dialect.
fn discover_head(inner: &SessionInner) -> Result<(String, u64)> {
    match inner.dialect {
        Dialect::HttpV2 => discover_head_v2(inner),
        Dialect::Classic => discover_head_classic(inner),
    }
}

/// One OPTIONS round trip; the server answers with dedicated headers.
fn discover_head_v2(inner: &SessionInner) -> Result<(String, u64)> {
    let target = format!("{}/", inner.prefix);
    let req = WireRequest::new("OPTIONS", &target).xml_body(builder::options());
    let resp = inner.execute(req)?;
    resp.expect("OPTIONS", &target, &[200])?;

    let head = resp
        .header("SVN-Youngest-Rev")
        .and_then(|v| v.parse().ok())
        .ok_or_else(|| {
            DavError::MalformedResponse("OPTIONS response carries no SVN-Youngest-Rev".to_string())
        })?;
    let uuid = resp
        .header("SVN-Repository-UUID")
        .ok_or_else(|| {
            DavError::MalformedResponse(
                "OPTIONS response carries no SVN-Repository-UUID".to_string(),
            )
        })?
        .to_string();
    Ok((uuid, head))
}

/// Classic discovery walks the baseline chain: the version-controlled
/// configuration names the current baseline, whose version-name is the
/// head revision. The uuid comes from the repository root.
fn discover_head_classic(inner: &SessionInner) -> Result<(String, u64)> {
    let vcc = inner
        .dialect
        .register_transaction_resource(&inner.prefix)
        .wire_path();
    let baseline_href = propfind_single(inner, &vcc, PropertyKind::Dav, "checked-in")?
        .ok_or_else(|| {
            DavError::MalformedResponse(
                "version-controlled configuration has no baseline".to_string(),
            )
        })?;

    let head = propfind_single(inner, &baseline_href, PropertyKind::Dav, "version-name")?
        .and_then(|v| v.parse().ok())
        .ok_or_else(|| {
            DavError::MalformedResponse("baseline carries no version-name".to_string())
        })?;

    let root = format!("{}/", inner.prefix);
    let uuid = propfind_single(inner, &root, PropertyKind::Base, "repository-uuid")?
        .ok_or_else(|| {
            DavError::MalformedResponse("repository root carries no repository-uuid".to_string())
        })?;

    Ok((uuid, head))
}

/// Depth 0 PROPFIND for one named property.
fn propfind_single(
    inner: &SessionInner,
    target: &str,
    kind: PropertyKind,
    name: &str,
) -> Result<Option<String>> {
    let req = WireRequest::new("PROPFIND", target)
        .header("Depth", Depth::Zero.as_str())
        .xml_body(builder::propfind(Some(&[(kind, name)])));
    let resp = inner.execute(req)?;
    resp.expect("PROPFIND", target, &[207])?;
    let ms = parser::parse_multistatus(&resp.body_str())?;
    let entry = ms.single()?;
    Ok(entry.prop(name)?.map(str::to_string))
}
