//! Lock acquisition and release.
//!
//! Tokens are never cached: every operation that needs one re-reads the
//! resource's live lock state immediately before use.

use crate::error::{DavError, Result};
use crate::resolve::sparse_info;
use crate::resource::{LockInfo, Resource};
use crate::session::Session;
use crate::transport::WireRequest;
use crate::xml::builder;

impl Session {
    /// Take an exclusive write lock on a live resource.
    ///
    /// `steal` forcibly overtakes a foreign lock; whether that is allowed
    /// is the server's decision, not arbitrated here.
    pub fn lock(
        &self,
        resource: &Resource,
        comment: Option<&str>,
        steal: bool,
    ) -> Result<LockInfo> {
        let target = self.inner.live_path(resource);
        let mut req = WireRequest::new("LOCK", &target)
            .header("Depth", "0")
            .header("Timeout", "Infinite")
            .xml_body(builder::lockinfo(comment));
        if steal {
            req = req.header("X-SVN-Options", "lock-steal");
        }
        let resp = self.inner.execute(req)?;
        resp.expect("LOCK", &target, &[200])?;

        let token = resp
            .header("Lock-Token")
            .map(|t| t.trim_matches(['<', '>']).to_string())
            .ok_or_else(|| {
                DavError::MalformedResponse("LOCK response carries no Lock-Token".to_string())
            })?;
        let owner = resp
            .header("X-SVN-Lock-Owner")
            .map(str::to_string)
            .or_else(|| comment.map(str::to_string));
        tracing::debug!("locked {resource} with {token}");
        Ok(LockInfo { token, owner })
    }

    /// Release the lock on a live resource.
    ///
    /// The current token is re-read first; an unlocked resource is a
    /// no-op. `force` breaks a lock held by someone else.
    pub fn unlock(&self, resource: &Resource, force: bool) -> Result<()> {
        let Some(token) = sparse_info(&self.inner, resource)?.and_then(|i| i.lock_token) else {
            tracing::warn!("unlock of {resource}: not locked, nothing to do");
            return Ok(());
        };

        let target = self.inner.live_path(resource);
        let mut req =
            WireRequest::new("UNLOCK", &target).header("Lock-Token", format!("<{token}>"));
        if force {
            req = req.header("X-SVN-Options", "lock-break");
        }
        let resp = self.inner.execute(req)?;
        resp.expect("UNLOCK", &target, &[204])?;
        tracing::debug!("unlocked {resource}");
        Ok(())
    }
}
