// Credential persistence in a SQLite key/value table

use anyhow::{Context, Result};
use rusqlite::{Connection, OptionalExtension};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

use super::session::SessionStore;

/// Session store backed by a `session_kv` table in SQLite
pub struct SqliteSessionStore {
    conn: Mutex<Connection>,
    path: Option<PathBuf>,
}

impl SqliteSessionStore {
    /// Open (or create) the session database at `path`
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create session directory: {}", parent.display())
            })?;
        }

        let conn = Connection::open(path)
            .with_context(|| format!("Failed to open SQLite database: {}", path.display()))?;
        init_schema(&conn)?;

        tracing::debug!("Session store opened at {}", path.display());

        Ok(Self {
            conn: Mutex::new(conn),
            path: Some(path.to_path_buf()),
        })
    }

    /// Throwaway database that lives as long as the store
    pub fn in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().context("Failed to open in-memory SQLite")?;
        init_schema(&conn)?;

        Ok(Self {
            conn: Mutex::new(conn),
            path: None,
        })
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    fn conn(&self) -> MutexGuard<'_, Connection> {
        self.conn.lock().unwrap_or_else(|e| e.into_inner())
    }
}

fn init_schema(conn: &Connection) -> Result<()> {
    conn.execute(
        "CREATE TABLE IF NOT EXISTS session_kv (
            key   TEXT PRIMARY KEY,
            value TEXT NOT NULL
        )",
        [],
    )
    .context("Failed to create session_kv table")?;
    Ok(())
}

impl SessionStore for SqliteSessionStore {
    fn get(&self, key: &str) -> Option<String> {
        let result = self
            .conn()
            .query_row(
                "SELECT value FROM session_kv WHERE key = ?",
                [key],
                |row| row.get::<_, String>(0),
            )
            .optional();

        match result {
            Ok(value) => value,
            Err(e) => {
                tracing::warn!(key = key, error = %e, "Failed to read session entry");
                None
            }
        }
    }

    fn set(&self, key: &str, value: &str) {
        let result = self.conn().execute(
            "INSERT INTO session_kv (key, value) VALUES (?1, ?2)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value",
            [key, value],
        );

        if let Err(e) = result {
            tracing::warn!(key = key, error = %e, "Failed to write session entry");
        }
    }

    fn remove(&self, key: &str) {
        if let Err(e) = self
            .conn()
            .execute("DELETE FROM session_kv WHERE key = ?", [key])
        {
            tracing::warn!(key = key, error = %e, "Failed to delete session entry");
        }
    }
}
