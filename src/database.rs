use crate::dlog;
use crate::kv::KvStore;
use anyhow::{Context, Result};
use rusqlite::{Connection, OptionalExtension, params};
use std::fs;
use std::path::{Path, PathBuf};

const TABLE: &str = "local_storage";

/// Flat key-value store kept in a single SQLite table.
pub struct SqliteKv {
    conn: Connection,
    path: Option<PathBuf>,
}

impl SqliteKv {
    /// Opens (creating if needed) the database file and its table.
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent)
                .with_context(|| format!("creating dir: {}", parent.display()))?;
        }

        let shown = path.display();
        let conn =
            Connection::open(path).with_context(|| format!("Opening SQLite DB: {shown}"))?;
        let kv = Self {
            conn,
            path: Some(path.to_path_buf()),
        };
        kv.ensure_schema()?;
        tracing::info!(path = %shown, "opened workout storage");
        Ok(kv)
    }

    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().context("Opening in-memory SQLite DB")?;
        let kv = Self { conn, path: None };
        kv.ensure_schema()?;
        Ok(kv)
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    fn ensure_schema(&self) -> Result<()> {
        if table_exists(&self.conn, TABLE)? {
            return Ok(());
        }
        dlog!("creating table {TABLE}");
        self.conn
            .execute_batch(
                r"
                CREATE TABLE IF NOT EXISTS local_storage (
                  seq    INTEGER PRIMARY KEY AUTOINCREMENT,
                  key    TEXT NOT NULL UNIQUE,
                  value  TEXT NOT NULL
                );
                ",
            )
            .context("Ensuring SQLite schema")?;
        Ok(())
    }
}

impl KvStore for SqliteKv {
    fn get(&self, key: &str) -> Result<Option<String>> {
        self.conn
            .query_row(
                "SELECT value FROM local_storage WHERE key = ?1",
                [key],
                |row| row.get(0),
            )
            .optional()
            .with_context(|| format!("Reading key {key:?}"))
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        self.conn
            .execute(
                r"
                INSERT INTO local_storage (key, value) VALUES (?1, ?2)
                ON CONFLICT (key) DO UPDATE SET value = EXCLUDED.value
                ",
                params![key, value],
            )
            .with_context(|| format!("Writing key {key:?}"))?;
        Ok(())
    }

    fn delete(&mut self, key: &str) -> Result<()> {
        self.conn
            .execute("DELETE FROM local_storage WHERE key = ?1", [key])
            .with_context(|| format!("Deleting key {key:?}"))?;
        Ok(())
    }

    fn keys(&self) -> Result<Vec<String>> {
        let mut stmt = self
            .conn
            .prepare("SELECT key FROM local_storage ORDER BY seq")?;
        let mut rows = stmt.query([])?;

        let mut out = Vec::new();
        while let Some(row) = rows.next()? {
            out.push(row.get(0)?);
        }
        Ok(out)
    }

    fn clear(&mut self) -> Result<()> {
        let n = self
            .conn
            .execute("DELETE FROM local_storage", [])
            .context("Clearing local_storage")?;
        dlog!("cleared {n} keys");
        Ok(())
    }
}

fn table_exists(conn: &Connection, table: &str) -> Result<bool> {
    let mut stmt =
        conn.prepare("SELECT 1 FROM sqlite_master WHERE type='table' AND name=?1 LIMIT 1")?;
    let mut rows = stmt.query([table])?;
    Ok(rows.next()?.is_some())
}
