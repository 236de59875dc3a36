//! Lock acquisition and release over a scripted transport.

mod support;

use davsvn::{DavError, Dialect, Resource};
use support::*;

#[test]
fn test_lock_captures_the_server_token() {
    let (session, transport) = scripted_session(
        Dialect::HttpV2,
        vec![
            Exchange::new("LOCK", "/svn/x.txt", 200)
                .header("Lock-Token", "<opaquelocktoken:t1>")
                .header("X-SVN-Lock-Owner", "alice"),
        ],
    );
    let lock = session
        .lock(&Resource::new("/x.txt"), Some("editing"), false)
        .unwrap();
    assert_eq!(lock.token, "opaquelocktoken:t1");
    assert_eq!(lock.owner.as_deref(), Some("alice"));

    let req = transport.request(0);
    assert_eq!(req.header("Depth"), Some("0"));
    assert!(req.body.contains("<D:lockscope><D:exclusive/></D:lockscope>"));
    assert!(req.header("X-SVN-Options").is_none());
    transport.assert_exhausted();
}

#[test]
fn test_lock_steal_is_surfaced_to_the_server() {
    let (session, transport) = scripted_session(
        Dialect::HttpV2,
        vec![
            Exchange::new("LOCK", "/svn/x.txt", 200)
                .header("Lock-Token", "<opaquelocktoken:t2>"),
        ],
    );
    session
        .lock(&Resource::new("/x.txt"), None, true)
        .unwrap();
    assert_eq!(
        transport.request(0).header("X-SVN-Options"),
        Some("lock-steal")
    );
    transport.assert_exhausted();
}

#[test]
fn test_lock_conflict_is_an_unexpected_status() {
    let (session, transport) = scripted_session(
        Dialect::HttpV2,
        vec![Exchange::new("LOCK", "/svn/x.txt", 423)],
    );
    let err = session
        .lock(&Resource::new("/x.txt"), None, false)
        .unwrap_err();
    assert!(matches!(
        err,
        DavError::UnexpectedStatus { status: 423, .. }
    ));
    transport.assert_exhausted();
}

#[test]
fn test_unlock_rereads_the_current_token() {
    let (session, transport) = scripted_session(
        Dialect::HttpV2,
        vec![
            Exchange::new("PROPFIND", "/svn/x.txt", 207).body(multistatus(&[file_entry(
                "/svn/x.txt",
                3,
                Some(("opaquelocktoken:t3", "alice")),
            )])),
            Exchange::new("UNLOCK", "/svn/x.txt", 204),
        ],
    );
    session.unlock(&Resource::new("/x.txt"), false).unwrap();
    assert_eq!(
        transport.request(1).header("Lock-Token"),
        Some("<opaquelocktoken:t3>")
    );
    transport.assert_exhausted();
}

#[test]
fn test_unlock_of_unlocked_resource_is_a_noop() {
    let (session, transport) = scripted_session(
        Dialect::HttpV2,
        vec![
            Exchange::new("PROPFIND", "/svn/x.txt", 207)
                .body(multistatus(&[file_entry("/svn/x.txt", 3, None)])),
        ],
    );
    session.unlock(&Resource::new("/x.txt"), false).unwrap();
    transport.assert_exhausted();
}

#[test]
fn test_forced_unlock_breaks_the_lock() {
    let (session, transport) = scripted_session(
        Dialect::HttpV2,
        vec![
            Exchange::new("PROPFIND", "/svn/x.txt", 207).body(multistatus(&[file_entry(
                "/svn/x.txt",
                3,
                Some(("opaquelocktoken:t4", "bob")),
            )])),
            Exchange::new("UNLOCK", "/svn/x.txt", 204),
        ],
    );
    session.unlock(&Resource::new("/x.txt"), true).unwrap();
    assert_eq!(
        transport.request(1).header("X-SVN-Options"),
        Some("lock-break")
    );
    transport.assert_exhausted();
}
