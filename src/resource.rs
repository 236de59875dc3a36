//! Value types: paths, wire addresses, revisions and properties.
//!
//! Everything here is a plain value. Wire round trips and protocol state
//! live in the other modules; these types only carry identity.

use chrono::{DateTime, Utc};
use percent_encoding::{AsciiSet, CONTROLS, percent_decode_str, utf8_percent_encode};

/// Characters escaped inside a wire path segment. `/` and `!` stay raw so
/// the `!svn/` stubs pass through untouched.
const WIRE_PATH: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'{')
    .add(b'}')
    .add(b'|')
    .add(b'\\')
    .add(b'^')
    .add(b'`');

/// A normalized absolute repository path.
///
/// Always starts with `/`, contains no empty segments, and carries no
/// trailing slash except for the root `/` itself. Equality and ordering
/// are lexical on the normalized string.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Resource(String);

impl Resource {
    /// The repository root `/`.
    pub fn root() -> Self {
        Resource("/".to_string())
    }

    /// Normalize any string into a `Resource`.
    ///
    /// Splits on `/`, drops empty segments, rejoins with a single leading
    /// `/`. Empty input and `/` both yield the root. Never fails; any
    /// string is accepted as a segment sequence.
    pub fn new(raw: &str) -> Self {
        let segments: Vec<&str> = raw.split('/').filter(|s| !s.is_empty()).collect();
        if segments.is_empty() {
            Self::root()
        } else {
            Resource(format!("/{}", segments.join("/")))
        }
    }

    /// The normalized path string.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_root(&self) -> bool {
        self.0 == "/"
    }

    /// The parent path. The parent of the root is the root.
    pub fn parent(&self) -> Resource {
        match self.0.rfind('/') {
            Some(0) | None => Self::root(),
            Some(pos) => Resource(self.0[..pos].to_string()),
        }
    }

    /// The final segment, or `""` for the root.
    pub fn name(&self) -> &str {
        self.0.rsplit('/').next().unwrap_or("")
    }

    /// Append one segment (itself normalized).
    pub fn join(&self, segment: &str) -> Resource {
        Resource::new(&format!("{}/{}", self.0, segment))
    }

    /// Path segments, root yielding none.
    pub fn segments(&self) -> impl Iterator<Item = &str> {
        self.0.split('/').filter(|s| !s.is_empty())
    }

    /// Percent-encoded form suitable for a request target.
    pub fn encoded(&self) -> String {
        utf8_percent_encode(&self.0, WIRE_PATH).to_string()
    }
}

impl std::fmt::Display for Resource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Percent-decode a multistatus href back into a raw path string.
pub(crate) fn decode_href(href: &str) -> String {
    percent_decode_str(href).decode_utf8_lossy().into_owned()
}

/// A `(base, suffix)` wire address.
///
/// The base is a protocol-internal stub (repository prefix plus any
/// `!svn/` address template); the suffix is the logical path under it.
/// The request target is their concatenation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QualifiedResource {
    base: String,
    suffix: String,
}

impl QualifiedResource {
    pub fn new(base: impl Into<String>, suffix: impl Into<String>) -> Self {
        QualifiedResource {
            base: base.into(),
            suffix: suffix.into(),
        }
    }

    pub fn base(&self) -> &str {
        &self.base
    }

    pub fn suffix(&self) -> &str {
        &self.suffix
    }

    /// The concatenated, percent-encoded request target.
    pub fn wire_path(&self) -> String {
        format!(
            "{}{}",
            self.base,
            utf8_percent_encode(&self.suffix, WIRE_PATH)
        )
    }
}

impl std::fmt::Display for QualifiedResource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.wire_path())
    }
}

/// A revision: either the HEAD sentinel or a concrete number.
///
/// HEAD is only meaningful relative to a [`crate::View`]; comparisons
/// against a concrete revision require resolving HEAD against that view's
/// head first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Revision {
    Head,
    Number(u64),
}

impl Revision {
    pub fn is_head(&self) -> bool {
        matches!(self, Revision::Head)
    }

    pub fn number(&self) -> Option<u64> {
        match self {
            Revision::Head => None,
            Revision::Number(n) => Some(*n),
        }
    }
}

impl std::fmt::Display for Revision {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Revision::Head => f.write_str("HEAD"),
            Revision::Number(n) => write!(f, "{n}"),
        }
    }
}

/// PROPFIND depth.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Depth {
    Zero,
    One,
    Infinity,
}

impl Depth {
    pub fn as_str(&self) -> &'static str {
        match self {
            Depth::Zero => "0",
            Depth::One => "1",
            Depth::Infinity => "infinity",
        }
    }
}

/// Namespace family of a resource property.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PropertyKind {
    /// Caller-defined properties.
    Custom,
    /// `svn:`-prefixed properties (`svn:mime-type`, `svn:log`, ...).
    Svn,
    /// Plain WebDAV properties, server-computed.
    Dav,
    /// Base protocol properties (`repository-uuid`, `md5-checksum`, ...),
    /// server-computed.
    Base,
}

impl PropertyKind {
    /// Whether a caller may set or delete properties of this kind.
    pub fn is_writable(&self) -> bool {
        matches!(self, PropertyKind::Custom | PropertyKind::Svn)
    }

    /// Classify a caller-supplied property name.
    pub fn of(name: &str) -> PropertyKind {
        if name.starts_with("svn:") {
            PropertyKind::Svn
        } else {
            PropertyKind::Custom
        }
    }
}

/// A named property on one resource.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceProperty {
    pub kind: PropertyKind,
    pub name: String,
    pub value: String,
}

impl ResourceProperty {
    pub fn new(kind: PropertyKind, name: impl Into<String>, value: impl Into<String>) -> Self {
        ResourceProperty {
            kind,
            name: name.into(),
            value: value.into(),
        }
    }

    pub fn custom(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self::new(PropertyKind::Custom, name, value)
    }

    pub fn svn(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self::new(PropertyKind::Svn, name, value)
    }
}

/// Point-in-time snapshot of one resource, as reported by a PROPFIND.
#[derive(Debug, Clone)]
pub struct Info {
    pub path: Resource,
    pub revision: u64,
    pub is_directory: bool,
    /// MD5 of the content, files only, as reported by the server.
    pub md5: Option<String>,
    pub creation_date: Option<DateTime<Utc>>,
    pub last_modified: Option<DateTime<Utc>>,
    pub lock_token: Option<String>,
    pub lock_owner: Option<String>,
    pub repository_uuid: Option<String>,
    /// Custom and `svn:` properties carried by the resource.
    pub properties: Vec<ResourceProperty>,
}

/// What happened to a path inside one committed revision.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathAction {
    Added,
    Modified,
    Deleted,
    Replaced,
}

/// One changed path inside a log entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangedPath {
    pub path: String,
    pub action: PathAction,
}

/// One revision in a log report.
#[derive(Debug, Clone)]
pub struct LogEntry {
    pub revision: u64,
    pub author: Option<String>,
    pub date: Option<DateTime<Utc>>,
    pub message: String,
    pub changed_paths: Vec<ChangedPath>,
}

/// The server-assigned identity of a successful commit, parsed from the
/// MERGE response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitInfo {
    /// The new head revision created by the commit.
    pub revision: u64,
    pub date: Option<DateTime<Utc>>,
    pub author: Option<String>,
}

/// A held lock, as reported by a LOCK response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LockInfo {
    /// Opaque server-issued token.
    pub token: String,
    pub owner: Option<String>,
}
