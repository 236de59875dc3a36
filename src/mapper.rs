//! Per-dialect address templates.
//!
//! The two supported server generations expose the same operations under
//! different `!svn/` stubs. Everything here is a pure function of
//! `(prefix, id-or-revision, resource)`; no behavioral difference leaks
//! into callers.

use crate::error::{DavError, Result};
use crate::resource::{QualifiedResource, Resource, Revision};

/// The wire dialect spoken by the server, selected once per session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dialect {
    /// Activity-based addressing: `!svn/act`, `!svn/wrk`, `!svn/bc`,
    /// `!svn/wbl`, `!svn/vcc`.
    Classic,
    /// Transaction-stub addressing: `!svn/txn`, `!svn/txr`, `!svn/rvr`,
    /// `!svn/me`.
    HttpV2,
}

impl Dialect {
    /// The server-side handle of an in-progress transaction.
    pub fn transaction_resource(&self, prefix: &str, txn_id: &str) -> QualifiedResource {
        match self {
            Dialect::Classic => QualifiedResource::new(format!("{prefix}/!svn/act"), format!("/{txn_id}")),
            Dialect::HttpV2 => QualifiedResource::new(format!("{prefix}/!svn/txn"), format!("/{txn_id}")),
        }
    }

    /// Where a resource's pending mutation is staged before merge.
    pub fn working_resource(
        &self,
        prefix: &str,
        txn_id: &str,
        resource: &Resource,
    ) -> QualifiedResource {
        let stub = match self {
            Dialect::Classic => "wrk",
            Dialect::HttpV2 => "txr",
        };
        QualifiedResource::new(
            format!("{prefix}/!svn/{stub}/{txn_id}"),
            resource.as_str().to_string(),
        )
    }

    /// The read-only historical address of a resource at a concrete
    /// revision. HEAD has no versioned address.
    pub fn versioned_resource(
        &self,
        prefix: &str,
        resource: &Resource,
        revision: Revision,
    ) -> Result<QualifiedResource> {
        let rev = revision.number().ok_or_else(|| {
            DavError::Addressing("versioned address requires a concrete revision, got HEAD".to_string())
        })?;
        let stub = match self {
            Dialect::Classic => "bc",
            Dialect::HttpV2 => "rvr",
        };
        Ok(QualifiedResource::new(
            format!("{prefix}/!svn/{stub}/{rev}"),
            resource.as_str().to_string(),
        ))
    }

    /// Where the pending commit message is attached before merge.
    pub fn commit_message_resource(
        &self,
        prefix: &str,
        txn_id: &str,
        revision: u64,
    ) -> QualifiedResource {
        match self {
            Dialect::Classic => QualifiedResource::new(
                format!("{prefix}/!svn/wbl"),
                format!("/{txn_id}/{revision}"),
            ),
            // The message lives on the transaction stub itself.
            Dialect::HttpV2 => self.transaction_resource(prefix, txn_id),
        }
    }

    /// The well-known resource checked out to seed a new transaction.
    pub fn register_transaction_resource(&self, prefix: &str) -> QualifiedResource {
        match self {
            Dialect::Classic => QualifiedResource::new(format!("{prefix}/!svn/vcc"), "/default"),
            Dialect::HttpV2 => QualifiedResource::new(format!("{prefix}/!svn"), "/me"),
        }
    }
}
