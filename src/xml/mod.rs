//! The XML wire codec: request-body builders and response parsers.

pub mod builder;
pub mod parser;

/// WebDAV XML namespace.
pub const DAV_NS: &str = "DAV:";

/// Report namespace used by log and get-locations reports.
pub const SVN_NS: &str = "svn:";

/// Namespace of `svn:`-prefixed resource properties.
pub const SVN_PROP_NS: &str = "http://subversion.tigris.org/xmlns/svn/";

/// Namespace of caller-defined resource properties.
pub const CUSTOM_PROP_NS: &str = "http://subversion.tigris.org/xmlns/custom/";

/// Namespace of base protocol properties (repository-uuid, md5-checksum...).
pub const BASE_PROP_NS: &str = "http://subversion.tigris.org/xmlns/dav/";

/// Escape XML special characters in text content and attribute values.
pub(crate) fn escape_xml(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_xml() {
        assert_eq!(escape_xml("a<b"), "a&lt;b");
        assert_eq!(escape_xml("a&b"), "a&amp;b");
        assert_eq!(escape_xml("a\"b"), "a&quot;b");
    }
}
