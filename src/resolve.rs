//! Address resolution: logical `(resource, revision)` to wire address.
//!
//! Path history is not invertible from the path alone. A path valid at the
//! view's head may have named a different object, or nothing at all, at an
//! older revision; resolving an old revision therefore consults the server
//! with a get-locations report pegged at the head.

use crate::error::{DavError, Result};
use crate::resource::{Depth, Info, PropertyKind, QualifiedResource, Resource, Revision};
use crate::session::{SessionInner, View};
use crate::transport::WireRequest;
use crate::xml::{builder, parser};

/// Resolve a logical address against a view.
///
/// HEAD resolves to the live address, except when the caller needs an
/// address that stays valid as the head advances (`for_download`), in
/// which case the view's head is pinned explicitly. A concrete revision
/// resolves to the versioned address, rewritten through location tracing
/// when the path may have moved since then.
pub(crate) fn resolve(
    view: &View,
    resource: &Resource,
    revision: Revision,
    for_download: bool,
) -> Result<QualifiedResource> {
    let inner = &view.inner;
    match revision {
        Revision::Head if !for_download => Ok(QualifiedResource::new(
            inner.prefix.clone(),
            resource.as_str().to_string(),
        )),
        Revision::Head => inner.dialect.versioned_resource(
            &inner.prefix,
            resource,
            Revision::Number(view.head()),
        ),
        Revision::Number(r) => {
            if r > view.head() {
                return Err(DavError::RevisionTooNew {
                    requested: r,
                    head: view.head(),
                });
            }
            let located = if r < view.head() {
                trace_location(view, resource, r)?
            } else {
                resource.clone()
            };
            inner
                .dialect
                .versioned_resource(&inner.prefix, &located, Revision::Number(r))
        }
    }
}

/// Discover where `resource` (as named at the view's head) lived at an
/// older revision.
fn trace_location(view: &View, resource: &Resource, revision: u64) -> Result<Resource> {
    let inner = &view.inner;
    let target = inner
        .dialect
        .versioned_resource(&inner.prefix, resource, Revision::Number(view.head()))?
        .wire_path();
    let body = builder::get_locations(resource.as_str(), view.head(), revision);
    let resp = inner.execute(WireRequest::new("REPORT", &target).xml_body(body))?;
    resp.expect("REPORT", &target, &[200])?;

    let locations = parser::parse_get_locations(&resp.body_str())?;
    let located = locations
        .into_iter()
        .find(|(rev, _)| *rev == revision)
        .map(|(_, path)| Resource::new(&path))
        .ok_or_else(|| {
            DavError::Structural(format!(
                "{resource} has no location at revision {revision}"
            ))
        })?;
    tracing::debug!("{resource} at r{revision} was {located}");
    Ok(located)
}

/// The property set a mutation needs before touching a resource.
const SPARSE_PROPS: &[(PropertyKind, &str)] = &[
    (PropertyKind::Dav, "version-name"),
    (PropertyKind::Dav, "resourcetype"),
    (PropertyKind::Dav, "lockdiscovery"),
];

/// Fetch the minimal [`Info`] of a resource at its live address. Absence
/// is `None`, not an error. Lock operations read live state on purpose.
pub(crate) fn sparse_info(inner: &SessionInner, resource: &Resource) -> Result<Option<Info>> {
    sparse_info_at(inner, &inner.live_path(resource), resource)
}

/// Fetch the minimal [`Info`] at an explicit wire address. Transactions
/// pass their pinned-head address so a head advance mid-transaction never
/// leaks into the pre-mutation read.
pub(crate) fn sparse_info_at(
    inner: &SessionInner,
    target: &str,
    resource: &Resource,
) -> Result<Option<Info>> {
    let req = WireRequest::new("PROPFIND", target)
        .header("Depth", Depth::Zero.as_str())
        .xml_body(builder::propfind(Some(SPARSE_PROPS)));
    let resp = inner.execute(req)?;
    if resp.status == 404 {
        return Ok(None);
    }
    resp.expect("PROPFIND", target, &[207])?;

    let ms = parser::parse_multistatus(&resp.body_str())?;
    let entry = ms.single()?;
    Ok(Some(parser::build_info(
        resource.clone(),
        entry.ok_props()?,
    )))
}
