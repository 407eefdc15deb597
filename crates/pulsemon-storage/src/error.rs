/// Errors surfaced by the storage layer.
///
/// Callers translate these into wire responses; nothing is retried
/// internally. `Db` covers transaction and connectivity failures and is
/// opaque to API clients (logged with full context server-side).
///
/// # Examples
///
/// ```rust
/// use pulsemon_storage::StoreError;
///
/// let err = StoreError::TargetLimitExceeded { current: 10, limit: 10 };
/// assert!(err.to_string().contains("10"));
/// ```
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// No target holds the presented API key. Deliberately carries no
    /// detail about what was wrong.
    #[error("unknown API key")]
    CredentialUnknown,

    /// A target lookup by ID found nothing.
    #[error("target not found (id={0})")]
    TargetNotFound(String),

    /// An owner attempted to register more targets than the policy allows.
    #[error("target limit reached ({current}/{limit})")]
    TargetLimitExceeded { current: u64, limit: u64 },

    /// An insert reported success but the row could not be read back, which
    /// should be unreachable under normal conditions.
    #[error("insert of {entity} succeeded but the row could not be read back")]
    InsertReadback { entity: &'static str },

    /// An underlying database error.
    #[error("database error: {0}")]
    Db(#[from] sea_orm::DbErr),
}

/// Convenience `Result` alias for storage operations.
pub type Result<T> = std::result::Result<T, StoreError>;
