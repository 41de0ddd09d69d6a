use rusqlite::ErrorCode;
use thiserror::Error;

pub(crate) type Result<T> = std::result::Result<T, LedgerError>;

/// Failure of a ledger operation.
///
/// Exactly two kinds exist: the storage engine failed (`Storage`), or the
/// operation was refused because it would break a constraint (`Rejected`).
/// Callers show a specific message for the latter and a generic
/// "try again" for the former.
#[derive(Debug, Error)]
pub(crate) enum LedgerError {
    #[error("{context}: {source}")]
    Storage {
        context: String,
        #[source]
        source: rusqlite::Error,
    },
    #[error(transparent)]
    Rejected(#[from] Rejection),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub(crate) enum Rejection {
    #[error("category {category_id} is still in use by {entries} entries")]
    CategoryInUse { category_id: i64, entries: i64 },
    #[error("a {kind} named '{name}' already exists")]
    DuplicateName { kind: &'static str, name: String },
    #[error("{kind} {id} does not exist")]
    MissingReference { kind: &'static str, id: i64 },
    #[error("{kind} {id} not found")]
    NotFound { kind: &'static str, id: i64 },
    #[error("amount {0} is out of range")]
    InvalidAmount(String),
    #[error("backup target already exists: {0}")]
    BackupTargetExists(String),
    #[error("{path} is not a usable backup: {reason}")]
    InvalidBackup { path: String, reason: String },
    #[error("constraint violated: {0}")]
    Constraint(String),
}

impl LedgerError {
    pub(crate) fn is_rejection(&self) -> bool {
        matches!(self, Self::Rejected(_))
    }

    pub(crate) fn rejection(&self) -> Option<&Rejection> {
        match self {
            Self::Rejected(r) => Some(r),
            Self::Storage { .. } => None,
        }
    }
}

/// Attach context to a rusqlite result, classifying constraint failures
/// as rejections.
pub(crate) trait StorageContext<T> {
    fn storage(self, context: &str) -> Result<T>;
}

impl<T> StorageContext<T> for std::result::Result<T, rusqlite::Error> {
    fn storage(self, context: &str) -> Result<T> {
        self.map_err(|e| classify(e, context))
    }
}

pub(crate) fn classify(err: rusqlite::Error, context: &str) -> LedgerError {
    if let rusqlite::Error::SqliteFailure(ref code, ref msg) = err {
        if code.code == ErrorCode::ConstraintViolation {
            let detail = msg.clone().unwrap_or_else(|| code.to_string());
            return LedgerError::Rejected(Rejection::Constraint(detail));
        }
    }
    LedgerError::Storage {
        context: context.to_string(),
        source: err,
    }
}

/// Name of the column a UNIQUE failure message refers to, e.g. "banks.name".
pub(crate) fn unique_violation_column(err: &rusqlite::Error) -> Option<&str> {
    match err {
        rusqlite::Error::SqliteFailure(code, Some(msg))
            if code.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE =>
        {
            msg.strip_prefix("UNIQUE constraint failed: ")
        }
        _ => None,
    }
}

pub(crate) fn is_foreign_key_violation(err: &rusqlite::Error) -> bool {
    matches!(
        err,
        rusqlite::Error::SqliteFailure(code, _)
            if code.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_FOREIGNKEY
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn constraint_failure(extended: i32, msg: &str) -> rusqlite::Error {
        rusqlite::Error::SqliteFailure(
            rusqlite::ffi::Error::new(extended),
            Some(msg.to_string()),
        )
    }

    #[test]
    fn test_constraint_failure_is_rejection() {
        let err = classify(
            constraint_failure(
                rusqlite::ffi::SQLITE_CONSTRAINT_FOREIGNKEY,
                "FOREIGN KEY constraint failed",
            ),
            "delete category",
        );
        assert!(err.is_rejection());
        assert_eq!(
            err.rejection(),
            Some(&Rejection::Constraint("FOREIGN KEY constraint failed".into()))
        );
    }

    #[test]
    fn test_other_failure_is_storage() {
        let err = classify(rusqlite::Error::InvalidQuery, "load entries");
        assert!(!err.is_rejection());
        assert!(err.to_string().starts_with("load entries: "));
    }

    #[test]
    fn test_unique_violation_column() {
        let err = constraint_failure(
            rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE,
            "UNIQUE constraint failed: banks.name",
        );
        assert_eq!(unique_violation_column(&err), Some("banks.name"));
        assert!(!is_foreign_key_violation(&err));
    }

    #[test]
    fn test_rejection_messages() {
        let r = Rejection::CategoryInUse {
            category_id: 3,
            entries: 2,
        };
        assert_eq!(r.to_string(), "category 3 is still in use by 2 entries");
    }
}
