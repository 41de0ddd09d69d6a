mod attachments;
mod banks;
mod categories;
mod entries;
mod parties;
mod query;
mod records;
mod schema;
mod summary;

use rusqlite::backup::Backup;
use rusqlite::{params, Connection, OpenFlags};
use std::path::Path;
use std::time::Duration;

use crate::error::{
    classify, unique_violation_column, LedgerError, Rejection, Result, StorageContext,
};

/// Handle to the ledger database. Owns a single connection; all calls are
/// synchronous. Move it to a worker thread for background use.
pub(crate) struct Database {
    conn: Connection,
}

impl Database {
    pub(crate) fn open(path: &Path) -> Result<Self> {
        let conn = Connection::open(path)
            .storage(&format!("Failed to open database: {}", path.display()))?;
        conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA foreign_keys=ON;")
            .storage("Failed to set database pragmas")?;
        let mut db = Self { conn };
        db.migrate()?;
        Ok(db)
    }

    #[cfg(test)]
    pub(crate) fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().storage("open in-memory database")?;
        conn.execute_batch("PRAGMA foreign_keys=ON;")
            .storage("Failed to set database pragmas")?;
        let mut db = Self { conn };
        db.migrate()?;
        Ok(db)
    }

    /// Test hook: wrap an existing connection (e.g. one holding an older
    /// schema) and bring it up to date.
    #[cfg(test)]
    pub(crate) fn from_connection(conn: Connection) -> Result<Self> {
        conn.execute_batch("PRAGMA foreign_keys=ON;")
            .storage("Failed to set database pragmas")?;
        let mut db = Self { conn };
        db.migrate()?;
        Ok(db)
    }

    fn migrate(&mut self) -> Result<()> {
        let has_version_table: bool = self
            .conn
            .query_row(
                "SELECT EXISTS(SELECT 1 FROM sqlite_master WHERE type='table' AND name='schema_version')",
                [],
                |row| row.get(0),
            )
            .storage("read schema metadata")?;

        if !has_version_table {
            log::debug!("creating schema v{}", schema::BASE_VERSION);
            let tx = self.conn.transaction().storage("begin schema")?;
            tx.execute_batch(schema::SCHEMA_V1)
                .storage("create base schema")?;
            tx.execute(
                "INSERT INTO schema_version (version) VALUES (?1)",
                params![schema::BASE_VERSION],
            )
            .storage("record schema version")?;
            tx.commit().storage("commit schema")?;
        }

        let mut current = self.schema_version()?;
        for &(from_version, sql) in schema::MIGRATIONS {
            if current != from_version {
                continue;
            }
            log::debug!("migrating schema v{} -> v{}", from_version, from_version + 1);
            let tx = self.conn.transaction().storage("begin migration")?;
            tx.execute_batch(sql)
                .storage(&format!("migration from v{from_version}"))?;
            tx.execute(
                "UPDATE schema_version SET version = ?1",
                params![from_version + 1],
            )
            .storage("record schema version")?;
            tx.commit().storage("commit migration")?;
            current = from_version + 1;
        }

        if current != schema::CURRENT_VERSION {
            log::warn!(
                "schema version {} differs from expected {}",
                current,
                schema::CURRENT_VERSION
            );
        }
        Ok(())
    }

    pub(crate) fn schema_version(&self) -> Result<i32> {
        self.conn
            .query_row("SELECT version FROM schema_version LIMIT 1", [], |row| {
                row.get(0)
            })
            .storage("read schema version")
    }

    /// Write a self-contained copy of the database to `path`. An existing
    /// file is never overwritten.
    pub(crate) fn backup_to(&self, path: &Path) -> Result<()> {
        if path.exists() {
            return Err(LedgerError::Rejected(Rejection::BackupTargetExists(
                path.display().to_string(),
            )));
        }
        self.conn
            .query_row("PRAGMA wal_checkpoint(TRUNCATE)", [], |_| Ok(()))
            .storage("checkpoint before backup")?;
        self.conn
            .execute("VACUUM INTO ?1", params![path.to_string_lossy().to_string()])
            .storage(&format!("backup to {}", path.display()))?;
        log::info!("backed up database to {}", path.display());
        Ok(())
    }

    /// Replace the whole ledger with the contents of a backup written by
    /// `backup_to`, then bring the restored schema up to date.
    pub(crate) fn restore_from(&mut self, path: &Path) -> Result<()> {
        if !path.is_file() {
            return Err(invalid_backup(path, "file does not exist"));
        }
        let source = Connection::open_with_flags(path, OpenFlags::SQLITE_OPEN_READ_ONLY)
            .map_err(|e| invalid_backup(path, &e.to_string()))?;
        let version: i32 = source
            .query_row("SELECT version FROM schema_version LIMIT 1", [], |row| {
                row.get(0)
            })
            .map_err(|e| invalid_backup(path, &format!("no schema version ({e})")))?;
        if version > schema::CURRENT_VERSION {
            return Err(invalid_backup(
                path,
                &format!("schema v{version} is newer than v{}", schema::CURRENT_VERSION),
            ));
        }

        Backup::new(&source, &mut self.conn)
            .and_then(|backup| backup.run_to_completion(256, Duration::ZERO, None))
            .storage(&format!("restore from {}", path.display()))?;
        log::info!("restored database from {} (schema v{version})", path.display());
        self.migrate()
    }
}

fn invalid_backup(path: &Path, reason: &str) -> LedgerError {
    LedgerError::Rejected(Rejection::InvalidBackup {
        path: path.display().to_string(),
        reason: reason.to_string(),
    })
}

/// Map a UNIQUE(name) failure to a duplicate-name rejection; everything
/// else is classified as usual.
fn name_conflict(err: rusqlite::Error, kind: &'static str, name: &str, context: &str) -> LedgerError {
    let duplicate = unique_violation_column(&err).is_some_and(|column| column.ends_with(".name"));
    if duplicate {
        LedgerError::Rejected(Rejection::DuplicateName {
            kind,
            name: name.to_string(),
        })
    } else {
        classify(err, context)
    }
}

fn not_found(kind: &'static str, id: Option<i64>) -> LedgerError {
    LedgerError::Rejected(Rejection::NotFound {
        kind,
        id: id.unwrap_or_default(),
    })
}
