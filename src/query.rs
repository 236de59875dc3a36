//! Read operations on a [`View`]: info, listing, history, download.

use std::collections::BTreeMap;

use bytes::Bytes;

use crate::error::{DavError, Result};
use crate::resolve::resolve;
use crate::resource::{Depth, Info, LogEntry, QualifiedResource, Resource, Revision, decode_href};
use crate::session::View;
use crate::transport::WireRequest;
use crate::xml::{builder, parser};

impl View {
    /// Snapshot one resource at a revision. Absence is `None`.
    pub fn info(&self, resource: &Resource, revision: Revision) -> Result<Option<Info>> {
        let target = resolve(self, resource, revision, false)?.wire_path();
        let req = WireRequest::new("PROPFIND", &target)
            .header("Depth", Depth::Zero.as_str())
            .xml_body(builder::propfind(None));
        let resp = self.inner.execute(req)?;
        if resp.status == 404 {
            return Ok(None);
        }
        resp.expect("PROPFIND", &target, &[207])?;

        let ms = parser::parse_multistatus(&resp.body_str())?;
        let entry = ms.single()?;
        Ok(Some(parser::build_info(
            resource.clone(),
            entry.ok_props()?,
        )))
    }

    pub fn exists(&self, resource: &Resource, revision: Revision) -> Result<bool> {
        Ok(self.info(resource, revision)?.is_some())
    }

    /// List the children of a directory.
    ///
    /// Recursive listing is repeated one-level round trips into each
    /// discovered directory; the wire protocol's own infinite depth is
    /// unreliable across servers. Results are deduplicated and ordered by
    /// `(revision, path)`.
    pub fn list(
        &self,
        resource: &Resource,
        revision: Revision,
        recursive: bool,
    ) -> Result<Vec<Info>> {
        let mut acc: BTreeMap<Resource, Info> = BTreeMap::new();
        self.list_level(resource, revision, recursive, &mut acc)?;
        let mut infos: Vec<Info> = acc.into_values().collect();
        infos.sort_by(|a, b| {
            a.revision
                .cmp(&b.revision)
                .then_with(|| a.path.cmp(&b.path))
        });
        Ok(infos)
    }

    fn list_level(
        &self,
        resource: &Resource,
        revision: Revision,
        recursive: bool,
        acc: &mut BTreeMap<Resource, Info>,
    ) -> Result<()> {
        let qr = resolve(self, resource, revision, false)?;
        let target = qr.wire_path();
        let req = WireRequest::new("PROPFIND", &target)
            .header("Depth", Depth::One.as_str())
            .xml_body(builder::propfind(None));
        let resp = self.inner.execute(req)?;
        if resp.status == 404 {
            return Err(DavError::Structural(format!(
                "{resource} does not exist at {revision}"
            )));
        }
        resp.expect("PROPFIND", &target, &[207])?;

        let ms = parser::parse_multistatus(&resp.body_str())?;
        let mut subdirs = Vec::new();
        for entry in &ms.responses {
            let Some(path) = logical_path(&qr, resource, &entry.href) else {
                continue;
            };
            if path == *resource {
                continue;
            }
            let info = parser::build_info(path.clone(), entry.ok_props()?);
            if info.is_directory {
                subdirs.push(path.clone());
            }
            acc.entry(path).or_insert(info);
        }
        if recursive {
            for dir in subdirs {
                self.list_level(&dir, revision, true, acc)?;
            }
        }
        Ok(())
    }

    /// Revision history of a resource, bounded by `(start, end, limit)`.
    pub fn log(
        &self,
        resource: &Resource,
        start: u64,
        end: u64,
        limit: Option<u64>,
        stop_on_copy: bool,
    ) -> Result<Vec<LogEntry>> {
        let peg = start.max(end);
        let target = resolve(self, resource, Revision::Number(peg), false)?.wire_path();
        let body = builder::log_report(start, end, limit, true, stop_on_copy);
        let resp = self
            .inner
            .execute(WireRequest::new("REPORT", &target).xml_body(body))?;
        resp.expect("REPORT", &target, &[200])?;
        parser::parse_log_report(&resp.body_str())
    }

    /// Fetch file content at a revision.
    ///
    /// The address is always revision-pinned, so the bytes returned match
    /// the requested revision even if the head advances mid-call.
    pub fn download(&self, resource: &Resource, revision: Revision) -> Result<Bytes> {
        let target = resolve(self, resource, revision, true)?.wire_path();
        let resp = self.inner.execute(WireRequest::new("GET", &target))?;
        resp.expect("GET", &target, &[200])?;
        Ok(resp.body)
    }
}

/// Map a multistatus href back to the logical path it names, relative to
/// the address the request was resolved against.
fn logical_path(qr: &QualifiedResource, logical_base: &Resource, href: &str) -> Option<Resource> {
    let decoded = decode_href(href);
    let trimmed = if decoded.len() > 1 {
        decoded.trim_end_matches('/')
    } else {
        &decoded
    };
    let under = trimmed.strip_prefix(qr.base())?;
    let suffix = qr.suffix().trim_end_matches('/');
    let rel = under.strip_prefix(suffix)?;
    if rel.is_empty() {
        Some(logical_base.clone())
    } else {
        Some(Resource::new(&format!("{logical_base}{rel}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_logical_path_live_address() {
        let qr = QualifiedResource::new("/svn", "/a");
        let base = Resource::new("/a");
        assert_eq!(
            logical_path(&qr, &base, "/svn/a/b.txt"),
            Some(Resource::new("/a/b.txt"))
        );
        assert_eq!(logical_path(&qr, &base, "/svn/a/"), Some(base.clone()));
        assert_eq!(logical_path(&qr, &base, "/other/x"), None);
    }

    #[test]
    fn test_logical_path_versioned_address() {
        let qr = QualifiedResource::new("/svn/!svn/bc/7", "/old/name");
        let base = Resource::new("/new/name");
        assert_eq!(
            logical_path(&qr, &base, "/svn/!svn/bc/7/old/name/child"),
            Some(Resource::new("/new/name/child"))
        );
    }

    #[test]
    fn test_logical_path_decodes_escapes() {
        let qr = QualifiedResource::new("/svn", "/");
        let base = Resource::root();
        assert_eq!(
            logical_path(&qr, &base, "/svn/a%20b"),
            Some(Resource::new("/a b"))
        );
    }
}
