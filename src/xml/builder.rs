//! Request-body builders, one per protocol method.
//!
//! Every builder returns a UTF-8 XML document with `DAV:` as the `D:`
//! namespace; the `svn:`/custom namespaces are declared only when an
//! element actually references them.

use super::{BASE_PROP_NS, CUSTOM_PROP_NS, DAV_NS, SVN_PROP_NS, escape_xml};
use crate::resource::{PropertyKind, ResourceProperty};

const XML_DECL: &str = "<?xml version=\"1.0\" encoding=\"utf-8\"?>";

fn prop_prefix(kind: PropertyKind) -> &'static str {
    match kind {
        PropertyKind::Dav => "D",
        PropertyKind::Svn => "S",
        PropertyKind::Custom => "C",
        PropertyKind::Base => "V",
    }
}

/// Namespace declarations for the kinds actually present in `kinds`.
fn extra_ns_decls(kinds: impl Iterator<Item = PropertyKind>) -> String {
    let mut svn = false;
    let mut custom = false;
    let mut base = false;
    for kind in kinds {
        match kind {
            PropertyKind::Svn => svn = true,
            PropertyKind::Custom => custom = true,
            PropertyKind::Base => base = true,
            PropertyKind::Dav => {}
        }
    }
    let mut out = String::new();
    if svn {
        out.push_str(&format!(" xmlns:S=\"{SVN_PROP_NS}\""));
    }
    if custom {
        out.push_str(&format!(" xmlns:C=\"{CUSTOM_PROP_NS}\""));
    }
    if base {
        out.push_str(&format!(" xmlns:V=\"{BASE_PROP_NS}\""));
    }
    out
}

/// PROPFIND body: all properties, or an explicit property-key set.
pub fn propfind(props: Option<&[(PropertyKind, &str)]>) -> String {
    match props {
        None => format!("{XML_DECL}\n<D:propfind xmlns:D=\"{DAV_NS}\"><D:allprop/></D:propfind>"),
        Some(keys) => {
            let ns = extra_ns_decls(keys.iter().map(|(k, _)| *k));
            let mut body = format!("{XML_DECL}\n<D:propfind xmlns:D=\"{DAV_NS}\"{ns}>\n<D:prop>\n");
            for (kind, name) in keys {
                body.push_str(&format!("<{}:{}/>\n", prop_prefix(*kind), name));
            }
            body.push_str("</D:prop>\n</D:propfind>");
            body
        }
    }
}

/// PROPPATCH body: a `<D:set>` block per property to set, a `<D:remove>`
/// block per property to delete.
pub fn propertyupdate(set: &[ResourceProperty], remove: &[ResourceProperty]) -> String {
    let ns = extra_ns_decls(set.iter().chain(remove).map(|p| p.kind));
    let mut body = format!("{XML_DECL}\n<D:propertyupdate xmlns:D=\"{DAV_NS}\"{ns}>\n");
    if !set.is_empty() {
        body.push_str("<D:set>\n<D:prop>\n");
        for prop in set {
            let prefix = prop_prefix(prop.kind);
            // The S: prefix already carries the svn: namespace.
            let local = prop.name.strip_prefix("svn:").unwrap_or(&prop.name);
            body.push_str(&format!(
                "<{prefix}:{local}>{}</{prefix}:{local}>\n",
                escape_xml(&prop.value)
            ));
        }
        body.push_str("</D:prop>\n</D:set>\n");
    }
    if !remove.is_empty() {
        body.push_str("<D:remove>\n<D:prop>\n");
        for prop in remove {
            let prefix = prop_prefix(prop.kind);
            let local = prop.name.strip_prefix("svn:").unwrap_or(&prop.name);
            body.push_str(&format!("<{prefix}:{local}/>\n"));
        }
        body.push_str("</D:prop>\n</D:remove>\n");
    }
    body.push_str("</D:propertyupdate>");
    body
}

/// CHECKOUT body binding a versioned resource into an activity.
pub fn checkout(activity_href: &str) -> String {
    format!(
        "{XML_DECL}\n<D:checkout xmlns:D=\"{DAV_NS}\">\
         <D:activity-set><D:href>{}</D:href></D:activity-set>\
         <D:apply-to-version/></D:checkout>",
        escape_xml(activity_href)
    )
}

/// LOCK body: exclusive write lock, with an optional owner note.
pub fn lockinfo(owner: Option<&str>) -> String {
    let owner_block = owner
        .map(|o| format!("<D:owner>{}</D:owner>", escape_xml(o)))
        .unwrap_or_default();
    format!(
        "{XML_DECL}\n<D:lockinfo xmlns:D=\"{DAV_NS}\">\
         <D:lockscope><D:exclusive/></D:lockscope>\
         <D:locktype><D:write/></D:locktype>{owner_block}</D:lockinfo>"
    )
}

/// MERGE body finalizing a transaction.
///
/// `lock_tokens` is the set of `(path, token)` pairs surfaced to the
/// server so it recognizes the client as the holder of each lock.
pub fn merge(source_href: &str, lock_tokens: &[(String, String)]) -> String {
    let mut body = format!(
        "{XML_DECL}\n<D:merge xmlns:D=\"{DAV_NS}\">\n\
         <D:source><D:href>{}</D:href></D:source>\n\
         <D:no-auto-merge/><D:no-checkout/>\n\
         <D:prop>\n\
         <D:checked-in/><D:version-name/><D:resourcetype/>\n\
         <D:creationdate/><D:creator-displayname/>\n\
         </D:prop>\n",
        escape_xml(source_href)
    );
    if !lock_tokens.is_empty() {
        body.push_str("<S:lock-token-list xmlns:S=\"svn:\">\n");
        for (path, token) in lock_tokens {
            body.push_str(&format!(
                "<S:lock>\n<S:lock-path>{}</S:lock-path>\n<S:lock-token>{}</S:lock-token>\n</S:lock>\n",
                escape_xml(path),
                escape_xml(token)
            ));
        }
        body.push_str("</S:lock-token-list>\n");
    }
    body.push_str("</D:merge>");
    body
}

/// REPORT body for log retrieval.
pub fn log_report(
    start: u64,
    end: u64,
    limit: Option<u64>,
    discover_changed_paths: bool,
    stop_on_copy: bool,
) -> String {
    let mut body = format!(
        "{XML_DECL}\n<S:log-report xmlns:S=\"svn:\">\n\
         <S:start-revision>{start}</S:start-revision>\n\
         <S:end-revision>{end}</S:end-revision>\n"
    );
    if let Some(limit) = limit {
        body.push_str(&format!("<S:limit>{limit}</S:limit>\n"));
    }
    if discover_changed_paths {
        body.push_str("<S:discover-changed-paths/>\n");
    }
    if stop_on_copy {
        body.push_str("<S:strict-node-history/>\n");
    }
    body.push_str(
        "<S:revprop>svn:author</S:revprop>\n\
         <S:revprop>svn:date</S:revprop>\n\
         <S:revprop>svn:log</S:revprop>\n\
         <S:path></S:path>\n\
         </S:log-report>",
    );
    body
}

/// REPORT body for peg-revision path resolution.
pub fn get_locations(path: &str, peg_revision: u64, location_revision: u64) -> String {
    format!(
        "{XML_DECL}\n<S:get-locations xmlns:S=\"svn:\" xmlns:D=\"{DAV_NS}\">\n\
         <S:path>{}</S:path>\n\
         <S:peg-revision>{peg_revision}</S:peg-revision>\n\
         <S:location-revision>{location_revision}</S:location-revision>\n\
         </S:get-locations>",
        escape_xml(path)
    )
}

/// OPTIONS body probing for the activity collection.
pub fn options() -> String {
    format!("{XML_DECL}\n<D:options xmlns:D=\"{DAV_NS}\"><D:activity-collection-set/></D:options>")
}
