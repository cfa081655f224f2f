/// All errors that can be returned by a ViewStore implementation.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// The conditional write or delete lost an optimistic-concurrency
    /// race: the stored version no longer matches the token the writer
    /// read, or a create found a document already in place. Recovered by
    /// re-reading and retrying; never an end state.
    #[error("version conflict on view {user_id}")]
    VersionConflict { user_id: String },

    /// Conditional delete of a view document that is not stored.
    ///
    /// Only deletes report this; a read of an absent view returns
    /// `Ok(None)` because an absent view is a normal branch, not a fault.
    #[error("view not found: {user_id}")]
    NotFound { user_id: String },

    /// A backend-specific storage fault (connection loss, throttling,
    /// serialization). Not retried by the materializer; it propagates to
    /// the event source's redelivery mechanism.
    #[error("storage backend error: {0}")]
    Backend(String),
}
