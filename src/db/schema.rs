//! Database schema and migrations for DriveClone.
//!
//! Migrations are applied in order when the database is opened.
//! The schema_version table tracks which migrations have been applied.

/// Database migrations.
pub const MIGRATIONS: &[&str] = &[
    // v1: users
    r#"
CREATE TABLE users (
    id                       INTEGER PRIMARY KEY AUTOINCREMENT,
    email                    TEXT NOT NULL UNIQUE,      -- stored lowercase
    first_name               TEXT NOT NULL,
    last_name                TEXT NOT NULL,
    password                 TEXT NOT NULL,             -- Argon2 hash
    is_active                INTEGER NOT NULL DEFAULT 0,
    activation_token         TEXT,                      -- SHA-256 hex
    activation_token_expires TEXT,
    reset_token              TEXT,                      -- SHA-256 hex
    reset_token_expires      TEXT,
    storage_used             INTEGER NOT NULL DEFAULT 0 CHECK (storage_used >= 0),
    storage_limit            INTEGER NOT NULL CHECK (storage_limit > 0),
    created_at               TEXT NOT NULL DEFAULT (datetime('now'))
);

CREATE INDEX idx_users_activation_token ON users(activation_token);
CREATE INDEX idx_users_reset_token ON users(reset_token);
"#,
    // v2: folders
    r#"
CREATE TABLE folders (
    id          INTEGER PRIMARY KEY AUTOINCREMENT,
    user_id     INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
    parent_id   INTEGER REFERENCES folders(id),
    name        TEXT NOT NULL,
    path        TEXT NOT NULL,
    created_at  TEXT NOT NULL DEFAULT (datetime('now'))
);

CREATE INDEX idx_folders_user_parent ON folders(user_id, parent_id);
-- Sibling names are unique per user; root siblings share parent 0
CREATE UNIQUE INDEX idx_folders_unique_name ON folders(user_id, IFNULL(parent_id, 0), name);
"#,
    // v3: files
    r#"
CREATE TABLE files (
    id          INTEGER PRIMARY KEY AUTOINCREMENT,
    user_id     INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
    parent_id   INTEGER REFERENCES folders(id),
    name        TEXT NOT NULL,
    storage_key TEXT NOT NULL UNIQUE,
    url         TEXT NOT NULL,
    size        INTEGER NOT NULL CHECK (size >= 0),
    mime_type   TEXT NOT NULL,
    created_at  TEXT NOT NULL DEFAULT (datetime('now'))
);

CREATE INDEX idx_files_user_parent ON files(user_id, parent_id);
"#,
];
