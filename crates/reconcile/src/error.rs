//! Error types for reconciliation.
//!
//! A 404 on read is not in here: it is the expected "deleted out-of-band"
//! outcome and the pipeline turns it into an absent observed state.

use thiserror::Error;

/// Result type alias for reconcile operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while reconciling one resource instance.
#[derive(Debug, Error)]
pub enum Error {
    /// Fetch failed for any reason other than "not found".
    #[error("failed to read {kind} '{name}': {source}")]
    RemoteRead {
        kind: &'static str,
        name: String,
        #[source]
        source: stingray::Error,
    },

    /// Upsert failed.
    #[error("failed to write {kind} '{name}': {source}")]
    RemoteWrite {
        kind: &'static str,
        name: String,
        #[source]
        source: stingray::Error,
    },

    /// Delete failed, including deleting an object that no longer exists.
    #[error("failed to delete {kind} '{name}': {source}")]
    RemoteDelete {
        kind: &'static str,
        name: String,
        #[source]
        source: stingray::Error,
    },

    /// A freshly read object lacks an attribute the field table requires.
    #[error("{kind} '{name}' has no value for '{field}' in the remote response")]
    MissingField {
        kind: &'static str,
        name: String,
        field: &'static str,
    },

    /// The field table of `kind` has no field with this name.
    #[error("unknown field '{field}' for {kind}")]
    UnknownField { kind: &'static str, field: String },

    /// A record value does not have the field's declared type.
    #[error("field '{field}' of {kind} expects {expected}, got {found}")]
    TypeMismatch {
        kind: &'static str,
        field: String,
        expected: &'static str,
        found: &'static str,
    },

    /// A desired record has no `name`.
    #[error("{kind} record has no name")]
    MissingName { kind: &'static str },

    /// An update tried to rename the object behind a handle.
    #[error("cannot rename {kind} '{from}' to '{to}' in place; delete and recreate it")]
    NameChanged {
        kind: &'static str,
        from: String,
        to: String,
    },

    /// The worker pool for a parallel batch could not be started.
    #[error("failed to start worker pool: {0}")]
    WorkerPool(#[from] rayon::ThreadPoolBuildError),
}

impl Error {
    /// The transport error behind a remote failure, if any.
    #[must_use]
    pub fn remote(&self) -> Option<&stingray::Error> {
        match self {
            Self::RemoteRead { source, .. }
            | Self::RemoteWrite { source, .. }
            | Self::RemoteDelete { source, .. } => Some(source),
            _ => None,
        }
    }
}
