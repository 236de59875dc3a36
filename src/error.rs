//! Fault taxonomy for the protocol engine.
//!
//! Every public operation either completes with its documented result or
//! surfaces exactly one of these fault kinds. Nothing is swallowed except
//! the defined no-ops (unlocking an unlocked resource, rolling back an
//! already-terminal transaction).

use thiserror::Error;

/// Errors surfaced by this crate.
#[derive(Debug, Error)]
pub enum DavError {
    /// The underlying wire call could not be completed (network, TLS).
    /// Retry policy belongs to the transport, not to this crate.
    #[error("transport error: {0}")]
    Transport(String),

    /// The response status code was outside the operation's accepted set.
    #[error("{method} {target} returned {status}, expected one of {expected:?}")]
    UnexpectedStatus {
        method: &'static str,
        target: String,
        status: u16,
        expected: Vec<u16>,
    },

    /// The response body could not be parsed into the expected structure.
    #[error("malformed response: {0}")]
    MalformedResponse(String),

    /// An internal addressing invariant was violated (for example HEAD
    /// passed where a concrete revision is required).
    #[error("addressing violation: {0}")]
    Addressing(String),

    /// A requested revision exceeds the view's head revision.
    #[error("revision {requested} is newer than the view head {head}")]
    RevisionTooNew { requested: u64, head: u64 },

    /// An operation was attempted on a committed or rolled-back transaction.
    #[error("transaction is no longer active")]
    TransactionInactive,

    /// A structural conflict: creating over an existing resource, mutating
    /// a missing one, or touching a read-only property kind.
    #[error("structural conflict: {0}")]
    Structural(String),
}

/// Crate-wide result alias.
pub type Result<T> = std::result::Result<T, DavError>;
