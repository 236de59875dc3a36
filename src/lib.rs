//! Synchronous client for the Subversion WebDAV/DeltaV wire protocol.
//!
//! Browses, reads, and transactionally mutates a remote versioned tree
//! without a local working copy. Two server generations are supported
//! through a configured [`Dialect`]; the addressing difference never
//! leaks past the session.
//!
//! Reads go through a [`View`], a coherent `(uuid, head)` snapshot:
//!
//! ```no_run
//! use davsvn::{Dialect, Resource, Revision, Session, SessionConfig};
//!
//! # fn main() -> davsvn::Result<()> {
//! let session = Session::open(SessionConfig::new(
//!     "http://svn.example.com:8080",
//!     "/svn/project",
//!     Dialect::HttpV2,
//! ))?;
//! let view = session.view()?;
//! let content = view.download(&Resource::new("/trunk/README"), Revision::Head)?;
//! # Ok(())
//! # }
//! ```
//!
//! Writes go through a [`Txn`]; nothing is visible until commit:
//!
//! ```no_run
//! # use davsvn::{Dialect, Resource, Session, SessionConfig};
//! # fn main() -> davsvn::Result<()> {
//! # let session = Session::open(SessionConfig::new("http://h", "/svn", Dialect::HttpV2))?;
//! let mut txn = session.begin()?;
//! txn.add_file(&Resource::new("/trunk/new.txt"), "hello".into(), true)?;
//! let outcome = txn.commit("add new.txt", true);
//! txn.rollback_if_not_committed()?;
//! outcome?;
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod mapper;
pub mod resource;
pub mod session;
pub mod transport;
pub mod xml;

mod lock;
mod query;
mod resolve;
mod txn;

pub use error::{DavError, Result};
pub use mapper::Dialect;
pub use resource::{
    ChangedPath, CommitInfo, Depth, Info, LockInfo, LogEntry, PathAction, PropertyKind,
    QualifiedResource, Resource, ResourceProperty, Revision,
};
pub use session::{Session, SessionConfig, View};
pub use transport::{HttpTransport, Transport, WireRequest, WireResponse};
pub use txn::{ChangeStatus, CommitOutcome, Lifecycle, Txn};
