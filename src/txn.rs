//! The commit state machine.
//!
//! A [`Txn`] stages mutations against a server-side activity and folds
//! them into a new head revision with MERGE. Until then nothing is
//! visible to other sessions; a failed merge leaves the transaction
//! active so the caller can still roll back.

use std::collections::BTreeMap;
use std::sync::Arc;

use bytes::Bytes;
use uuid::Uuid;

use crate::error::{DavError, Result};
use crate::resolve::sparse_info_at;
use crate::resource::{CommitInfo, Info, Resource, ResourceProperty, Revision};
use crate::session::{Session, SessionInner, View};
use crate::transport::WireRequest;
use crate::xml::{builder, parser};

/// What a transaction has recorded about one path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeStatus {
    Added,
    Modified,
    Deleted,
    /// Registered into the working set without being changed (ancestors
    /// of actual changes).
    Exists,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lifecycle {
    Active,
    Committed,
    RolledBack,
}

/// Result of [`Txn::commit`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommitOutcome {
    Committed(CommitInfo),
    /// The change set was empty; the transaction was rolled back without
    /// a merge and no revision was created.
    Unchanged,
}

/// One read-write transaction against the repository.
///
/// Mutations take `&mut self`; callers serialize use of one transaction.
/// Both commit and rollback are terminal. Callers are expected to run
/// [`Txn::rollback_if_not_committed`] after every use.
pub struct Txn {
    inner: Arc<SessionInner>,
    view: View,
    id: String,
    change_set: BTreeMap<Resource, ChangeStatus>,
    lifecycle: Lifecycle,
}

impl Session {
    /// Start a transaction at the current head.
    ///
    /// Allocates a server-side activity, snapshots the head into a view,
    /// and checks out the well-known default resource into the activity.
    /// That seed checkout is what makes later registrations acceptable to
    /// the server.
    pub fn begin(&self) -> Result<Txn> {
        let id = Uuid::new_v4().to_string();
        let inner = &self.inner;

        let activity = inner
            .dialect
            .transaction_resource(&inner.prefix, &id)
            .wire_path();
        let resp = inner.execute(WireRequest::new("MKACTIVITY", &activity))?;
        resp.expect("MKACTIVITY", &activity, &[201])?;

        let view = self.view()?;

        let register = inner
            .dialect
            .register_transaction_resource(&inner.prefix)
            .wire_path();
        let resp = inner.execute(
            WireRequest::new("CHECKOUT", &register).xml_body(builder::checkout(&activity)),
        )?;
        resp.expect("CHECKOUT", &register, &[201])?;

        tracing::info!("transaction {id} opened at r{}", view.head());
        Ok(Txn {
            inner: Arc::clone(inner),
            view,
            id,
            change_set: BTreeMap::new(),
            lifecycle: Lifecycle::Active,
        })
    }
}

impl Txn {
    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn lifecycle(&self) -> Lifecycle {
        self.lifecycle
    }

    /// The head snapshot this transaction was opened against.
    pub fn view(&self) -> &View {
        &self.view
    }

    /// Paths touched so far and what was recorded for each.
    pub fn change_set(&self) -> &BTreeMap<Resource, ChangeStatus> {
        &self.change_set
    }

    fn ensure_active(&self) -> Result<()> {
        match self.lifecycle {
            Lifecycle::Active => Ok(()),
            _ => Err(DavError::TransactionInactive),
        }
    }

    fn activity_path(&self) -> String {
        self.inner
            .dialect
            .transaction_resource(&self.inner.prefix, &self.id)
            .wire_path()
    }

    fn working_path(&self, resource: &Resource) -> String {
        self.inner
            .dialect
            .working_resource(&self.inner.prefix, &self.id, resource)
            .wire_path()
    }

    /// Pull a resource's head snapshot into the working set.
    ///
    /// Walks parent-first to the root so every ancestor of a touched path
    /// carries at least an `Exists` entry. Paths already in the change
    /// set are skipped; the working set grows exactly along the paths
    /// actually touched.
    fn register(&mut self, resource: &Resource) -> Result<()> {
        if self.change_set.contains_key(resource) {
            return Ok(());
        }
        if !resource.is_root() {
            self.register(&resource.parent())?;
        }

        let target = self
            .inner
            .dialect
            .versioned_resource(&self.inner.prefix, resource, Revision::Number(self.view.head()))?
            .wire_path();
        let resp = self.inner.execute(
            WireRequest::new("CHECKOUT", &target)
                .xml_body(builder::checkout(&self.activity_path())),
        )?;
        resp.expect("CHECKOUT", &target, &[201])?;

        self.change_set
            .insert(resource.clone(), ChangeStatus::Exists);
        Ok(())
    }

    /// Sparse pre-mutation read, pinned at the transaction's head so a
    /// head advance mid-transaction cannot change what this observes.
    fn target_info(&self, resource: &Resource) -> Result<Option<Info>> {
        let target = self
            .inner
            .dialect
            .versioned_resource(&self.inner.prefix, resource, Revision::Number(self.view.head()))?
            .wire_path();
        sparse_info_at(&self.inner, &target, resource)
    }

    /// Conditional header proving lock ownership to the server.
    fn if_locked(&self, resource: &Resource, info: Option<&Info>) -> Option<String> {
        info.and_then(|i| i.lock_token.as_deref())
            .map(|token| format!("<{}> (<{token}>)", self.inner.live_path(resource)))
    }

    /// Make sure the parent directory exists, creating it when asked.
    fn ensure_parent(&mut self, resource: &Resource, create_parents: bool) -> Result<()> {
        let parent = resource.parent();
        if parent.is_root() || self.change_set.get(&parent).is_some_and(|s| {
            matches!(s, ChangeStatus::Added | ChangeStatus::Modified | ChangeStatus::Exists)
        }) {
            return Ok(());
        }
        if self.target_info(&parent)?.is_some() {
            return Ok(());
        }
        if !create_parents {
            return Err(DavError::Structural(format!(
                "parent {parent} of {resource} does not exist"
            )));
        }
        self.mkdir(&parent, true)
    }

    /// Create or replace a file's content.
    pub fn add_file(
        &mut self,
        resource: &Resource,
        content: Bytes,
        create_parents: bool,
    ) -> Result<()> {
        self.ensure_active()?;
        let info = self.target_info(resource)?;
        if info.as_ref().is_some_and(|i| i.is_directory) {
            return Err(DavError::Structural(format!(
                "{resource} is a directory, cannot write file content"
            )));
        }
        let status = if info.is_some() {
            ChangeStatus::Modified
        } else {
            ChangeStatus::Added
        };
        self.ensure_parent(resource, create_parents)?;
        // An existing file must itself be in the working set before PUT;
        // a new file only needs its parent there.
        if info.is_some() {
            self.register(resource)?;
        } else {
            self.register(&resource.parent())?;
        }

        let target = self.working_path(resource);
        let mut req = WireRequest::new("PUT", &target).raw_body(content);
        if let Some(cond) = self.if_locked(resource, info.as_ref()) {
            req = req.header("If", cond);
        }
        let resp = self.inner.execute(req)?;
        resp.expect("PUT", &target, &[201, 204])?;

        self.change_set.insert(resource.clone(), status);
        Ok(())
    }

    /// Create a directory.
    pub fn mkdir(&mut self, resource: &Resource, create_parents: bool) -> Result<()> {
        self.ensure_active()?;
        if self.target_info(resource)?.is_some() {
            return Err(DavError::Structural(format!("{resource} already exists")));
        }
        self.ensure_parent(resource, create_parents)?;
        self.register(&resource.parent())?;

        let target = self.working_path(resource);
        let resp = self.inner.execute(WireRequest::new("MKCOL", &target))?;
        resp.expect("MKCOL", &target, &[201])?;

        self.change_set.insert(resource.clone(), ChangeStatus::Added);
        Ok(())
    }

    /// Delete a file or directory.
    pub fn delete(&mut self, resource: &Resource) -> Result<()> {
        self.ensure_active()?;
        let info = self
            .target_info(resource)?
            .ok_or_else(|| DavError::Structural(format!("{resource} does not exist")))?;
        self.register(resource)?;

        let target = self.working_path(resource);
        let mut req = WireRequest::new("DELETE", &target);
        if let Some(cond) = self.if_locked(resource, Some(&info)) {
            req = req.header("If", cond);
        }
        let resp = self.inner.execute(req)?;
        resp.expect("DELETE", &target, &[204])?;

        self.change_set
            .insert(resource.clone(), ChangeStatus::Deleted);
        Ok(())
    }

    /// Copy a resource, pinned at the transaction's head snapshot. An
    /// existing destination is overwritten and recorded as modified.
    pub fn copy(&mut self, src: &Resource, dst: &Resource, create_parents: bool) -> Result<()> {
        self.ensure_active()?;
        let (_, status) = self.copy_pinned(src, dst, create_parents)?;
        self.change_set.insert(dst.clone(), status);
        Ok(())
    }

    /// Move a resource: copy-then-delete inside the same transaction.
    /// The wire protocol has no atomic move at this layer.
    pub fn mv(&mut self, src: &Resource, dst: &Resource, create_parents: bool) -> Result<()> {
        self.ensure_active()?;
        let (info, status) = self.copy_pinned(src, dst, create_parents)?;
        self.register(src)?;

        let target = self.working_path(src);
        let mut req = WireRequest::new("DELETE", &target);
        if let Some(cond) = self.if_locked(src, Some(&info)) {
            req = req.header("If", cond);
        }
        let resp = self.inner.execute(req)?;
        resp.expect("DELETE", &target, &[204])?;

        self.change_set.insert(dst.clone(), status);
        self.change_set.insert(src.clone(), ChangeStatus::Deleted);
        Ok(())
    }

    /// The shared half of copy and move: COPY the source's versioned
    /// snapshot onto the destination's working address. Returns the
    /// source's pre-mutation info and the status to record for the
    /// destination.
    fn copy_pinned(
        &mut self,
        src: &Resource,
        dst: &Resource,
        create_parents: bool,
    ) -> Result<(Info, ChangeStatus)> {
        let info = self
            .target_info(src)?
            .ok_or_else(|| DavError::Structural(format!("{src} does not exist")))?;
        let dst_info = self.target_info(dst)?;
        let status = if dst_info.is_some() {
            ChangeStatus::Modified
        } else {
            ChangeStatus::Added
        };
        // An overwriting copy mutates the destination node itself; a copy
        // onto a fresh path only needs the parent in the working set.
        if dst_info.is_some() {
            self.register(dst)?;
        } else {
            self.ensure_parent(dst, create_parents)?;
            self.register(&dst.parent())?;
        }

        let source = self
            .inner
            .dialect
            .versioned_resource(&self.inner.prefix, src, Revision::Number(self.view.head()))?
            .wire_path();
        let mut req = WireRequest::new("COPY", &source)
            .header("Destination", self.working_path(dst))
            .header("Depth", "infinity");
        if dst_info.is_some() {
            req = req.header("Overwrite", "T");
        }
        if let Some(cond) = self.if_locked(dst, dst_info.as_ref()) {
            req = req.header("If", cond);
        }
        let resp = self.inner.execute(req)?;
        resp.expect("COPY", &source, &[201, 204])?;
        Ok((info, status))
    }

    /// Set custom or `svn:` properties on a resource.
    pub fn set_properties(&mut self, resource: &Resource, props: &[ResourceProperty]) -> Result<()> {
        self.proppatch(resource, props, &[])
    }

    /// Remove custom or `svn:` properties from a resource.
    pub fn delete_properties(
        &mut self,
        resource: &Resource,
        props: &[ResourceProperty],
    ) -> Result<()> {
        self.proppatch(resource, &[], props)
    }

    fn proppatch(
        &mut self,
        resource: &Resource,
        set: &[ResourceProperty],
        remove: &[ResourceProperty],
    ) -> Result<()> {
        self.ensure_active()?;
        if let Some(prop) = set.iter().chain(remove).find(|p| !p.kind.is_writable()) {
            return Err(DavError::Structural(format!(
                "property {} is read-only",
                prop.name
            )));
        }
        if self.change_set.get(resource) == Some(&ChangeStatus::Deleted) {
            return Err(DavError::Structural(format!(
                "{resource} was deleted in this transaction"
            )));
        }
        let info = self
            .target_info(resource)?
            .ok_or_else(|| DavError::Structural(format!("{resource} does not exist")))?;
        self.register(resource)?;

        let target = self.working_path(resource);
        let mut req = WireRequest::new("PROPPATCH", &target)
            .xml_body(builder::propertyupdate(set, remove));
        if let Some(cond) = self.if_locked(resource, Some(&info)) {
            req = req.header("If", cond);
        }
        let resp = self.inner.execute(req)?;
        resp.expect("PROPPATCH", &target, &[207])?;

        // Keep a stronger status if one was already recorded.
        let status = match self.change_set.get(resource) {
            Some(ChangeStatus::Added) => ChangeStatus::Added,
            _ => ChangeStatus::Modified,
        };
        self.change_set.insert(resource.clone(), status);
        Ok(())
    }

    /// Fold the staged changes into a new head revision.
    ///
    /// An empty change set rolls the transaction back instead; the
    /// server-side activity must be released either way. The transition
    /// to `Committed` happens only after a successful MERGE, so a failed
    /// merge leaves rollback possible.
    pub fn commit(&mut self, message: &str, release_locks: bool) -> Result<CommitOutcome> {
        self.ensure_active()?;
        if !self
            .change_set
            .values()
            .any(|s| *s != ChangeStatus::Exists)
        {
            tracing::info!("transaction {} has no changes, rolling back", self.id);
            self.rollback()?;
            return Ok(CommitOutcome::Unchanged);
        }

        let msg_target = self
            .inner
            .dialect
            .commit_message_resource(&self.inner.prefix, &self.id, self.view.head())
            .wire_path();
        let body = builder::propertyupdate(&[ResourceProperty::svn("svn:log", message)], &[]);
        let resp = self
            .inner
            .execute(WireRequest::new("PROPPATCH", &msg_target).xml_body(body))?;
        resp.expect("PROPPATCH", &msg_target, &[207])?;

        // Pre-existing changed resources may be locked; surface their
        // current tokens so the server recognizes us as the holder.
        let mut lock_tokens = Vec::new();
        for (resource, status) in &self.change_set {
            if matches!(status, ChangeStatus::Added | ChangeStatus::Exists) {
                continue;
            }
            if let Some(token) = self.target_info(resource)?.and_then(|i| i.lock_token) {
                lock_tokens.push((self.inner.live_path(resource), token));
            }
        }

        let merge_target = format!("{}/", self.inner.prefix);
        let mut req = WireRequest::new("MERGE", &merge_target)
            .xml_body(builder::merge(&self.activity_path(), &lock_tokens));
        if release_locks {
            req = req.header("X-SVN-Options", "release-locks");
        }
        let resp = self.inner.execute(req)?;
        resp.expect("MERGE", &merge_target, &[200])?;
        let commit = parser::parse_merge_response(&resp.body_str())?;

        self.lifecycle = Lifecycle::Committed;
        tracing::info!("transaction {} committed as r{}", self.id, commit.revision);
        Ok(CommitOutcome::Committed(commit))
    }

    /// Release the server-side activity and retire this transaction.
    ///
    /// The transition to `RolledBack` happens even when the DELETE fails;
    /// the in-memory object must not be reusable either way.
    pub fn rollback(&mut self) -> Result<()> {
        self.ensure_active()?;
        self.lifecycle = Lifecycle::RolledBack;

        let target = self.activity_path();
        let result = self
            .inner
            .execute(WireRequest::new("DELETE", &target))
            .and_then(|resp| resp.expect("DELETE", &target, &[204]));
        tracing::info!("transaction {} rolled back", self.id);
        result
    }

    /// Guaranteed-cleanup idiom: roll back unless already terminal.
    pub fn rollback_if_not_committed(&mut self) -> Result<()> {
        match self.lifecycle {
            Lifecycle::Active => self.rollback(),
            _ => Ok(()),
        }
    }
}
