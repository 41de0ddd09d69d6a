pub(crate) const SCHEMA_V1: &str = r#"
CREATE TABLE IF NOT EXISTS schema_version (
    version INTEGER NOT NULL
);

CREATE TABLE IF NOT EXISTS parties (
    party_id        INTEGER PRIMARY KEY AUTOINCREMENT,
    name            TEXT NOT NULL,
    contact_number  TEXT,
    description     TEXT,
    address         TEXT,
    created_at      INTEGER NOT NULL,
    updated_at      INTEGER NOT NULL
);

CREATE TABLE IF NOT EXISTS categories (
    category_id  INTEGER PRIMARY KEY AUTOINCREMENT,
    name         TEXT NOT NULL UNIQUE,
    description  TEXT,
    created_at   INTEGER NOT NULL,
    updated_at   INTEGER NOT NULL
);

CREATE TABLE IF NOT EXISTS account_entries (
    entry_id          INTEGER PRIMARY KEY AUTOINCREMENT,
    title             TEXT NOT NULL,
    description       TEXT,
    amount            INTEGER NOT NULL, -- hundredths
    entry_type        TEXT NOT NULL,
    transaction_type  TEXT NOT NULL,
    transaction_date  INTEGER NOT NULL,
    fk_party_id       INTEGER REFERENCES parties(party_id) ON DELETE SET NULL,
    fk_category_id    INTEGER NOT NULL REFERENCES categories(category_id) ON DELETE RESTRICT,
    created_at        INTEGER NOT NULL,
    updated_at        INTEGER NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_entries_party ON account_entries(fk_party_id);
CREATE INDEX IF NOT EXISTS idx_entries_category ON account_entries(fk_category_id);
CREATE INDEX IF NOT EXISTS idx_entries_date ON account_entries(transaction_date);
CREATE INDEX IF NOT EXISTS idx_entries_entry_type ON account_entries(entry_type);
CREATE INDEX IF NOT EXISTS idx_entries_transaction_type ON account_entries(transaction_type);

CREATE TABLE IF NOT EXISTS attachments (
    attachment_id  INTEGER PRIMARY KEY AUTOINCREMENT,
    fk_entry_id    INTEGER NOT NULL REFERENCES account_entries(entry_id) ON DELETE CASCADE,
    file_path      TEXT NOT NULL,
    file_name      TEXT,
    mime_type      TEXT,
    uploaded_at    INTEGER,
    created_at     INTEGER NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_attachments_entry ON attachments(fk_entry_id);

CREATE VIRTUAL TABLE IF NOT EXISTS account_entries_fts USING fts5(
    title,
    description,
    content='account_entries',
    content_rowid='entry_id'
);

CREATE TRIGGER IF NOT EXISTS account_entries_fts_ai AFTER INSERT ON account_entries BEGIN
    INSERT INTO account_entries_fts(rowid, title, description)
    VALUES (new.entry_id, new.title, new.description);
END;

CREATE TRIGGER IF NOT EXISTS account_entries_fts_ad AFTER DELETE ON account_entries BEGIN
    INSERT INTO account_entries_fts(account_entries_fts, rowid, title, description)
    VALUES ('delete', old.entry_id, old.title, old.description);
END;

CREATE TRIGGER IF NOT EXISTS account_entries_fts_au AFTER UPDATE OF title, description ON account_entries BEGIN
    INSERT INTO account_entries_fts(account_entries_fts, rowid, title, description)
    VALUES ('delete', old.entry_id, old.title, old.description);
    INSERT INTO account_entries_fts(rowid, title, description)
    VALUES (new.entry_id, new.title, new.description);
END;
"#;

pub(crate) const BASE_VERSION: i32 = 1;
pub(crate) const CURRENT_VERSION: i32 = 3;

/// Migrations from version N to N+1.
/// Each entry is (from_version, sql).
pub(crate) const MIGRATIONS: &[(i32, &str)] = &[
    (
        1,
        r#"
CREATE TABLE IF NOT EXISTS banks (
    bank_id      INTEGER PRIMARY KEY AUTOINCREMENT,
    name         TEXT NOT NULL UNIQUE,
    description  TEXT,
    created_at   INTEGER NOT NULL,
    updated_at   INTEGER NOT NULL
);
ALTER TABLE account_entries
    ADD COLUMN fk_bank_id INTEGER DEFAULT NULL REFERENCES banks(bank_id) ON DELETE SET NULL;
CREATE INDEX IF NOT EXISTS idx_entries_bank ON account_entries(fk_bank_id);
"#,
    ),
    (
        2,
        "ALTER TABLE categories ADD COLUMN transaction_type TEXT DEFAULT NULL;",
    ),
];
