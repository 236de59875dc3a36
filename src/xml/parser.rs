//! Response parsers: streaming event loops over the protocol's XML bodies.
//!
//! Parsers are tolerant of namespace prefixes (servers answer with `D:`,
//! `lp1:`, `ns0:` or no prefix at all) and ignore unknown elements. A
//! structurally missing required element is a
//! [`DavError::MalformedResponse`].

use crate::error::{DavError, Result};
use crate::resource::{
    ChangedPath, CommitInfo, Info, LogEntry, PathAction, PropertyKind, Resource, ResourceProperty,
};
use chrono::{DateTime, Utc};
use quick_xml::Reader;
use quick_xml::events::Event;

/// One parsed property: kind, caller-facing name, flattened text value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WireProp {
    pub kind: PropertyKind,
    pub name: String,
    pub value: String,
}

/// One `<D:propstat>` block.
#[derive(Debug, Clone)]
pub struct PropStat {
    pub status: String,
    pub props: Vec<WireProp>,
}

/// One `<D:response>` entry of a multistatus body.
#[derive(Debug, Clone)]
pub struct PropEntry {
    pub href: String,
    pub propstats: Vec<PropStat>,
}

impl PropEntry {
    /// The property set of the `200 OK` propstat.
    ///
    /// A per-entry status outside the success line is a malformed
    /// response for that entry; the caller decides whether a whole-request
    /// 404 means "absent" before parsing gets here.
    pub fn ok_props(&self) -> Result<&[WireProp]> {
        for propstat in &self.propstats {
            if propstat.status.contains(" 200 ") {
                return Ok(&propstat.props);
            }
        }
        Err(DavError::MalformedResponse(format!(
            "no successful propstat for {} (statuses: {:?})",
            self.href,
            self.propstats
                .iter()
                .map(|p| p.status.as_str())
                .collect::<Vec<_>>()
        )))
    }

    /// Value of a named property in the successful propstat.
    pub fn prop(&self, name: &str) -> Result<Option<&str>> {
        Ok(self
            .ok_props()?
            .iter()
            .find(|p| p.name == name)
            .map(|p| p.value.as_str()))
    }
}

/// A 207 Multi-Status envelope.
#[derive(Debug, Clone)]
pub struct Multistatus {
    pub responses: Vec<PropEntry>,
}

impl Multistatus {
    /// The single entry of a Depth 0 response.
    pub fn single(&self) -> Result<&PropEntry> {
        self.responses
            .first()
            .ok_or_else(|| DavError::MalformedResponse("empty multistatus".to_string()))
    }
}

/// Map a possibly-prefixed tag to its local name.
fn local_name(tag: &str) -> &str {
    tag.rsplit(':').next().unwrap_or(tag)
}

/// Map a property element tag to its kind and caller-facing name.
///
/// Servers answer with a zoo of prefixes; the stable part is which
/// namespace family each prefix is bound to.
fn classify_prop(tag: &str) -> (PropertyKind, String) {
    match tag.split_once(':') {
        Some((prefix, lp)) => match prefix {
            "S" | "ns1" => (PropertyKind::Svn, format!("svn:{lp}")),
            "C" | "ns2" => (PropertyKind::Custom, lp.to_string()),
            "V" | "lp3" | "ns3" => (PropertyKind::Base, lp.to_string()),
            _ => (PropertyKind::Dav, lp.to_string()),
        },
        None => (PropertyKind::Dav, tag.to_string()),
    }
}

fn malformed(e: impl std::fmt::Display) -> DavError {
    DavError::MalformedResponse(e.to_string())
}

/// Best-effort parse of the date formats the protocol carries.
pub(crate) fn parse_dav_date(s: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(dt) = DateTime::parse_from_rfc2822(s) {
        return Some(dt.with_timezone(&Utc));
    }
    chrono::NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.fZ")
        .ok()
        .map(|naive| naive.and_utc())
}

/// Which sub-element of `<D:lockdiscovery>` text is currently routed to.
#[derive(PartialEq)]
enum LockField {
    None,
    Token,
    Owner,
}

/// Parse a WebDAV multistatus response.
pub fn parse_multistatus(xml: &str) -> Result<Multistatus> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut multistatus = Multistatus { responses: Vec::new() };
    let mut current_response: Option<PropEntry> = None;
    let mut current_propstat: Option<PropStat> = None;
    let mut in_prop = false;
    let mut in_href = false;
    let mut in_status = false;

    // State of the property element currently being flattened.
    let mut current_prop: Option<(PropertyKind, String)> = None;
    let mut prop_value = String::new();
    let mut prop_depth = 0usize;
    let mut lock_field = LockField::None;
    let mut lock_token = String::new();
    let mut lock_owner = String::new();

    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(ref e)) => {
                let tag = String::from_utf8_lossy(e.name().as_ref()).into_owned();
                let lp = local_name(&tag);
                if in_prop {
                    if current_prop.is_none() {
                        current_prop = Some(classify_prop(&tag));
                        prop_value.clear();
                        prop_depth = 0;
                        lock_field = LockField::None;
                        lock_token.clear();
                        lock_owner.clear();
                    } else {
                        prop_depth += 1;
                        match lp {
                            "locktoken" => lock_field = LockField::Token,
                            "owner" => lock_field = LockField::Owner,
                            _ => {}
                        }
                    }
                } else {
                    match lp {
                        "response" => {
                            current_response = Some(PropEntry {
                                href: String::new(),
                                propstats: Vec::new(),
                            });
                        }
                        "propstat" => {
                            current_propstat = Some(PropStat {
                                status: String::new(),
                                props: Vec::new(),
                            });
                        }
                        "prop" => in_prop = true,
                        "href" => in_href = true,
                        "status" => in_status = true,
                        _ => {}
                    }
                }
            }
            Ok(Event::Empty(ref e)) => {
                let tag = String::from_utf8_lossy(e.name().as_ref()).into_owned();
                let lp = local_name(&tag);
                if in_prop {
                    if let Some((_, ref name)) = current_prop {
                        if name == "resourcetype" && lp == "collection" {
                            prop_value = "collection".to_string();
                        }
                    } else {
                        // Empty-element property with no value.
                        let (kind, name) = classify_prop(&tag);
                        if let Some(ref mut propstat) = current_propstat {
                            propstat.props.push(WireProp {
                                kind,
                                name,
                                value: String::new(),
                            });
                        }
                    }
                }
            }
            Ok(Event::Text(ref t)) => {
                let text = t.unescape().map_err(malformed)?;
                if current_prop.is_some() {
                    match lock_field {
                        LockField::Token => lock_token.push_str(&text),
                        LockField::Owner => lock_owner.push_str(&text),
                        LockField::None => prop_value.push_str(&text),
                    }
                } else if in_href {
                    if let Some(ref mut resp) = current_response {
                        resp.href.push_str(&text);
                    }
                } else if in_status {
                    if let Some(ref mut propstat) = current_propstat {
                        propstat.status.push_str(&text);
                    }
                }
            }
            Ok(Event::End(ref e)) => {
                let tag = String::from_utf8_lossy(e.name().as_ref()).into_owned();
                let lp = local_name(&tag);
                if current_prop.is_some() {
                    if prop_depth > 0 {
                        if lp == "locktoken" || lp == "owner" {
                            lock_field = LockField::None;
                        }
                        prop_depth -= 1;
                    } else {
                        let (kind, name) = current_prop.take().expect("checked above");
                        if let Some(ref mut propstat) = current_propstat {
                            if name == "lockdiscovery" {
                                if !lock_token.is_empty() {
                                    propstat.props.push(WireProp {
                                        kind: PropertyKind::Dav,
                                        name: "lock-token".to_string(),
                                        value: lock_token.trim().to_string(),
                                    });
                                }
                                if !lock_owner.is_empty() {
                                    propstat.props.push(WireProp {
                                        kind: PropertyKind::Dav,
                                        name: "lock-owner".to_string(),
                                        value: lock_owner.trim().to_string(),
                                    });
                                }
                            } else {
                                propstat.props.push(WireProp {
                                    kind,
                                    name,
                                    value: prop_value.trim().to_string(),
                                });
                            }
                        }
                    }
                } else {
                    match lp {
                        "response" => {
                            if let Some(resp) = current_response.take() {
                                multistatus.responses.push(resp);
                            }
                        }
                        "propstat" => {
                            if let Some(propstat) = current_propstat.take() {
                                if let Some(ref mut resp) = current_response {
                                    resp.propstats.push(propstat);
                                }
                            }
                        }
                        "prop" => in_prop = false,
                        "href" => in_href = false,
                        "status" => in_status = false,
                        _ => {}
                    }
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(malformed(e)),
            _ => {}
        }
        buf.clear();
    }

    Ok(multistatus)
}

/// Build an [`Info`] snapshot from one multistatus entry's properties.
pub(crate) fn build_info(path: Resource, props: &[WireProp]) -> Info {
    let find = |name: &str| {
        props
            .iter()
            .find(|p| p.name == name)
            .map(|p| p.value.as_str())
    };
    Info {
        path,
        revision: find("version-name")
            .and_then(|v| v.parse().ok())
            .unwrap_or(0),
        is_directory: find("resourcetype") == Some("collection"),
        md5: find("md5-checksum").map(str::to_string),
        creation_date: find("creationdate").and_then(parse_dav_date),
        last_modified: find("getlastmodified").and_then(parse_dav_date),
        lock_token: find("lock-token").map(str::to_string),
        lock_owner: find("lock-owner").map(str::to_string),
        repository_uuid: find("repository-uuid").map(str::to_string),
        properties: props
            .iter()
            .filter(|p| p.kind.is_writable())
            .map(|p| ResourceProperty::new(p.kind, p.name.clone(), p.value.clone()))
            .collect(),
    }
}

/// Parse a log REPORT response into log entries.
pub fn parse_log_report(xml: &str) -> Result<Vec<LogEntry>> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut entries = Vec::new();
    let mut current: Option<LogEntry> = None;
    let mut revision: Option<u64> = None;
    let mut field: Option<String> = None;
    let mut text = String::new();

    let mut buf = Vec::new();
    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(ref e)) => {
                let tag = String::from_utf8_lossy(e.name().as_ref()).into_owned();
                match local_name(&tag) {
                    "log-item" => {
                        current = Some(LogEntry {
                            revision: 0,
                            author: None,
                            date: None,
                            message: String::new(),
                            changed_paths: Vec::new(),
                        });
                        revision = None;
                    }
                    lp @ ("version-name" | "creator-displayname" | "date" | "comment"
                    | "added-path" | "modified-path" | "deleted-path" | "replaced-path") => {
                        if current.is_some() {
                            field = Some(lp.to_string());
                            text.clear();
                        }
                    }
                    _ => {}
                }
            }
            Ok(Event::Text(ref t)) => {
                if field.is_some() {
                    text.push_str(&t.unescape().map_err(malformed)?);
                }
            }
            Ok(Event::End(ref e)) => {
                let tag = String::from_utf8_lossy(e.name().as_ref()).into_owned();
                let lp = local_name(&tag);
                if field.as_deref() == Some(lp) {
                    if let Some(ref mut entry) = current {
                        match lp {
                            "version-name" => {
                                revision = text.trim().parse().ok();
                            }
                            "creator-displayname" => entry.author = Some(text.clone()),
                            "date" => entry.date = parse_dav_date(text.trim()),
                            "comment" => entry.message = text.clone(),
                            "added-path" => entry.changed_paths.push(ChangedPath {
                                path: text.clone(),
                                action: PathAction::Added,
                            }),
                            "modified-path" => entry.changed_paths.push(ChangedPath {
                                path: text.clone(),
                                action: PathAction::Modified,
                            }),
                            "deleted-path" => entry.changed_paths.push(ChangedPath {
                                path: text.clone(),
                                action: PathAction::Deleted,
                            }),
                            "replaced-path" => entry.changed_paths.push(ChangedPath {
                                path: text.clone(),
                                action: PathAction::Replaced,
                            }),
                            _ => {}
                        }
                    }
                    field = None;
                } else if lp == "log-item" {
                    let mut entry = current.take().ok_or_else(|| {
                        malformed("log-item close without matching open")
                    })?;
                    entry.revision = revision.take().ok_or_else(|| {
                        malformed("log-item is missing its version-name")
                    })?;
                    entries.push(entry);
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(malformed(e)),
            _ => {}
        }
        buf.clear();
    }

    Ok(entries)
}

/// Parse a get-locations REPORT into `(revision, path)` pairs.
pub fn parse_get_locations(xml: &str) -> Result<Vec<(u64, String)>> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut locations = Vec::new();
    let mut buf = Vec::new();
    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(ref e)) | Ok(Event::Empty(ref e)) => {
                let tag = String::from_utf8_lossy(e.name().as_ref()).into_owned();
                if local_name(&tag) == "location" {
                    let mut rev: Option<u64> = None;
                    let mut path: Option<String> = None;
                    for attr in e.attributes() {
                        let attr = attr.map_err(malformed)?;
                        let value = attr.unescape_value().map_err(malformed)?;
                        match attr.key.as_ref() {
                            b"rev" => rev = value.parse().ok(),
                            b"path" => path = Some(value.into_owned()),
                            _ => {}
                        }
                    }
                    match (rev, path) {
                        (Some(rev), Some(path)) => locations.push((rev, path)),
                        _ => {
                            return Err(malformed("location element missing rev or path"));
                        }
                    }
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(malformed(e)),
            _ => {}
        }
        buf.clear();
    }

    Ok(locations)
}

/// Parse an OPTIONS response body into the activity collection href.
pub fn parse_options_response(xml: &str) -> Result<String> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut in_collection_set = false;
    let mut in_href = false;
    let mut href = String::new();

    let mut buf = Vec::new();
    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(ref e)) => {
                let tag = String::from_utf8_lossy(e.name().as_ref()).into_owned();
                match local_name(&tag) {
                    "activity-collection-set" => in_collection_set = true,
                    "href" if in_collection_set => in_href = true,
                    _ => {}
                }
            }
            Ok(Event::Text(ref t)) => {
                if in_href {
                    href.push_str(&t.unescape().map_err(malformed)?);
                }
            }
            Ok(Event::End(ref e)) => {
                let tag = String::from_utf8_lossy(e.name().as_ref()).into_owned();
                match local_name(&tag) {
                    "activity-collection-set" => in_collection_set = false,
                    "href" => in_href = false,
                    _ => {}
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(malformed(e)),
            _ => {}
        }
        buf.clear();
    }

    if href.is_empty() {
        Err(malformed(
            "options response carries no activity-collection-set href",
        ))
    } else {
        Ok(href)
    }
}

/// Parse a MERGE response into the committed revision identity.
pub fn parse_merge_response(xml: &str) -> Result<CommitInfo> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut revision: Option<u64> = None;
    let mut date: Option<DateTime<Utc>> = None;
    let mut author: Option<String> = None;
    let mut field: Option<String> = None;
    let mut text = String::new();

    let mut buf = Vec::new();
    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(ref e)) => {
                let tag = String::from_utf8_lossy(e.name().as_ref()).into_owned();
                if let lp @ ("version-name" | "creationdate" | "creator-displayname") =
                    local_name(&tag)
                {
                    field = Some(lp.to_string());
                    text.clear();
                }
            }
            Ok(Event::Text(ref t)) => {
                if field.is_some() {
                    text.push_str(&t.unescape().map_err(malformed)?);
                }
            }
            Ok(Event::End(ref e)) => {
                let tag = String::from_utf8_lossy(e.name().as_ref()).into_owned();
                let lp = local_name(&tag);
                if field.as_deref() == Some(lp) {
                    match lp {
                        "version-name" => {
                            if revision.is_none() {
                                revision = text.trim().parse().ok();
                            }
                        }
                        "creationdate" => {
                            if date.is_none() {
                                date = parse_dav_date(text.trim());
                            }
                        }
                        "creator-displayname" => {
                            if author.is_none() {
                                author = Some(text.clone());
                            }
                        }
                        _ => {}
                    }
                    field = None;
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(malformed(e)),
            _ => {}
        }
        buf.clear();
    }

    let revision = revision
        .ok_or_else(|| malformed("merge response carries no committed version-name"))?;
    Ok(CommitInfo {
        revision,
        date,
        author,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const MULTISTATUS: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<D:multistatus xmlns:D="DAV:" xmlns:lp1="DAV:" xmlns:lp3="http://subversion.tigris.org/xmlns/dav/">
<D:response>
<D:href>/svn/a/b.txt</D:href>
<D:propstat>
<D:prop>
<lp1:resourcetype/>
<lp1:version-name>7</lp1:version-name>
<lp1:creationdate>2024-01-01T12:00:00.000000Z</lp1:creationdate>
<lp1:getlastmodified>Mon, 01 Jan 2024 12:00:00 GMT</lp1:getlastmodified>
<lp1:checked-in><D:href>/svn/!svn/ver/7/a/b.txt</D:href></lp1:checked-in>
<lp3:repository-uuid>uuid-1</lp3:repository-uuid>
<lp3:md5-checksum>d41d8cd98f00b204e9800998ecf8427e</lp3:md5-checksum>
<D:lockdiscovery>
<D:activelock>
<D:locktoken><D:href>opaquelocktoken:abc</D:href></D:locktoken>
<D:owner>alice</D:owner>
</D:activelock>
</D:lockdiscovery>
</D:prop>
<D:status>HTTP/1.1 200 OK</D:status>
</D:propstat>
</D:response>
</D:multistatus>"#;

    #[test]
    fn test_parse_multistatus_props() {
        let ms = parse_multistatus(MULTISTATUS).unwrap();
        assert_eq!(ms.responses.len(), 1);
        let entry = ms.single().unwrap();
        assert_eq!(entry.href, "/svn/a/b.txt");
        assert_eq!(entry.prop("version-name").unwrap(), Some("7"));
        assert_eq!(
            entry.prop("checked-in").unwrap(),
            Some("/svn/!svn/ver/7/a/b.txt")
        );
        assert_eq!(entry.prop("repository-uuid").unwrap(), Some("uuid-1"));
        assert_eq!(entry.prop("lock-token").unwrap(), Some("opaquelocktoken:abc"));
        assert_eq!(entry.prop("lock-owner").unwrap(), Some("alice"));
    }

    #[test]
    fn test_build_info_from_entry() {
        let ms = parse_multistatus(MULTISTATUS).unwrap();
        let entry = ms.single().unwrap();
        let info = build_info(Resource::new("/a/b.txt"), entry.ok_props().unwrap());
        assert_eq!(info.revision, 7);
        assert!(!info.is_directory);
        assert_eq!(info.md5.as_deref(), Some("d41d8cd98f00b204e9800998ecf8427e"));
        assert_eq!(info.lock_token.as_deref(), Some("opaquelocktoken:abc"));
        assert!(info.creation_date.is_some());
        assert!(info.last_modified.is_some());
    }

    #[test]
    fn test_collection_flag() {
        let xml = r#"<D:multistatus xmlns:D="DAV:"><D:response>
<D:href>/svn/dir/</D:href>
<D:propstat><D:prop>
<D:resourcetype><D:collection/></D:resourcetype>
<D:version-name>3</D:version-name>
</D:prop><D:status>HTTP/1.1 200 OK</D:status></D:propstat>
</D:response></D:multistatus>"#;
        let ms = parse_multistatus(xml).unwrap();
        let entry = ms.single().unwrap();
        let info = build_info(Resource::new("/dir"), entry.ok_props().unwrap());
        assert!(info.is_directory);
        assert_eq!(info.revision, 3);
    }

    #[test]
    fn test_non_success_propstat_is_malformed() {
        let xml = r#"<D:multistatus xmlns:D="DAV:"><D:response>
<D:href>/svn/x</D:href>
<D:propstat><D:prop><D:version-name/></D:prop>
<D:status>HTTP/1.1 404 Not Found</D:status></D:propstat>
</D:response></D:multistatus>"#;
        let ms = parse_multistatus(xml).unwrap();
        let err = ms.single().unwrap().ok_props().unwrap_err();
        assert!(matches!(err, DavError::MalformedResponse(_)));
    }

    #[test]
    fn test_unparseable_xml_is_malformed() {
        assert!(matches!(
            parse_multistatus("<D:multistatus><broken"),
            Err(DavError::MalformedResponse(_))
        ));
    }

    #[test]
    fn test_parse_log_report() {
        let xml = r#"<?xml version="1.0" encoding="utf-8"?>
<S:log-report xmlns:S="svn:" xmlns:D="DAV:">
<S:log-item>
<D:version-name>4</D:version-name>
<D:creator-displayname>alice</D:creator-displayname>
<S:date>2024-02-03T04:05:06.000000Z</S:date>
<D:comment>fix &amp; polish</D:comment>
<S:added-path node-kind="file">/a/new.txt</S:added-path>
<S:deleted-path node-kind="file">/a/old.txt</S:deleted-path>
</S:log-item>
<S:log-item>
<D:version-name>3</D:version-name>
<D:comment>earlier</D:comment>
</S:log-item>
</S:log-report>"#;
        let entries = parse_log_report(xml).unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].revision, 4);
        assert_eq!(entries[0].author.as_deref(), Some("alice"));
        assert_eq!(entries[0].message, "fix & polish");
        assert_eq!(
            entries[0].changed_paths,
            vec![
                ChangedPath {
                    path: "/a/new.txt".to_string(),
                    action: PathAction::Added
                },
                ChangedPath {
                    path: "/a/old.txt".to_string(),
                    action: PathAction::Deleted
                },
            ]
        );
        assert_eq!(entries[1].revision, 3);
        assert!(entries[1].author.is_none());
    }

    #[test]
    fn test_log_item_without_revision_is_malformed() {
        let xml = r#"<S:log-report xmlns:S="svn:"><S:log-item>
<D:comment xmlns:D="DAV:">no revision</D:comment>
</S:log-item></S:log-report>"#;
        assert!(matches!(
            parse_log_report(xml),
            Err(DavError::MalformedResponse(_))
        ));
    }

    #[test]
    fn test_parse_get_locations() {
        let xml = r#"<?xml version="1.0" encoding="utf-8"?>
<S:get-locations-report xmlns:S="svn:">
<S:location rev="3" path="/old/name.txt"/>
</S:get-locations-report>"#;
        let locations = parse_get_locations(xml).unwrap();
        assert_eq!(locations, vec![(3, "/old/name.txt".to_string())]);
    }

    #[test]
    fn test_parse_options_response() {
        let xml = r#"<?xml version="1.0" encoding="utf-8"?>
<D:options-response xmlns:D="DAV:">
<D:activity-collection-set><D:href>/svn/!svn/act/</D:href></D:activity-collection-set>
</D:options-response>"#;
        assert_eq!(parse_options_response(xml).unwrap(), "/svn/!svn/act/");
        assert!(parse_options_response("<D:options-response xmlns:D=\"DAV:\"/>").is_err());
    }

    #[test]
    fn test_parse_merge_response() {
        let xml = r#"<?xml version="1.0" encoding="utf-8"?>
<D:merge-response xmlns:D="DAV:">
<D:updated-set>
<D:response>
<D:href>/svn/!svn/vcc/default</D:href>
<D:propstat><D:prop>
<D:resourcetype><D:baseline/></D:resourcetype>
<D:version-name>9</D:version-name>
<D:creationdate>2024-05-06T07:08:09.000000Z</D:creationdate>
<D:creator-displayname>bob</D:creator-displayname>
</D:prop>
<D:status>HTTP/1.1 200 OK</D:status>
</D:propstat>
</D:response>
</D:updated-set>
</D:merge-response>"#;
        let info = parse_merge_response(xml).unwrap();
        assert_eq!(info.revision, 9);
        assert_eq!(info.author.as_deref(), Some("bob"));
        assert!(info.date.is_some());
    }

    #[test]
    fn test_merge_response_without_revision_is_malformed() {
        assert!(matches!(
            parse_merge_response("<D:merge-response xmlns:D=\"DAV:\"/>"),
            Err(DavError::MalformedResponse(_))
        ));
    }

    #[test]
    fn test_dav_date_formats() {
        assert!(parse_dav_date("2024-01-01T12:00:00.000000Z").is_some());
        assert!(parse_dav_date("Mon, 01 Jan 2024 12:00:00 GMT").is_some());
        assert!(parse_dav_date("not a date").is_none());
    }
}
