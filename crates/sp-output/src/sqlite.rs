//! SQLite output backend (feature `sqlite`).
//!
//! One flat `responses` table whose columns mirror the CSV header, all
//! stored as TEXT.  Each batch is inserted in one transaction, so a
//! submission is either fully visible or not at all.

use std::path::Path;
use std::sync::{Mutex, MutexGuard, PoisonError};

use rusqlite::{Connection, params_from_iter};
use tracing::info;

use crate::writer::ResponseSink;
use crate::{OutputResult, RecordLayout, ResponseRecord};

/// Writes responses to an SQLite database.
pub struct SqliteSink {
    conn:   Mutex<Connection>,
    layout: RecordLayout,
    insert: String,
}

impl SqliteSink {
    /// Open (or create) the database at `path`.  The schema is created by
    /// [`ResponseSink::init`].
    pub fn open(path: &Path, layout: RecordLayout) -> OutputResult<Self> {
        let conn = Connection::open(path)?;
        conn.execute_batch(
            "PRAGMA journal_mode = WAL;
             PRAGMA synchronous  = FULL;",
        )?;

        let header = layout.header();
        let columns = header.iter().map(|c| quote(c)).collect::<Vec<_>>().join(", ");
        let placeholders = (1..=header.len()).map(|i| format!("?{i}")).collect::<Vec<_>>().join(", ");
        let insert = format!("INSERT INTO responses ({columns}) VALUES ({placeholders})");

        Ok(Self { conn: Mutex::new(conn), layout, insert })
    }

    fn conn(&self) -> MutexGuard<'_, Connection> {
        self.conn.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl ResponseSink for SqliteSink {
    fn layout(&self) -> &RecordLayout {
        &self.layout
    }

    fn init(&self) -> OutputResult<()> {
        let columns = self
            .layout
            .header()
            .iter()
            .map(|c| format!("{} TEXT NOT NULL", quote(c)))
            .collect::<Vec<_>>()
            .join(",\n    ");
        self.conn()
            .execute_batch(&format!("CREATE TABLE IF NOT EXISTS responses (\n    {columns}\n);"))?;
        Ok(())
    }

    fn append_batch(&self, records: &[ResponseRecord]) -> OutputResult<()> {
        if records.is_empty() {
            return Ok(());
        }
        let mut conn = self.conn();
        let tx = conn.transaction()?;
        {
            let mut stmt = tx.prepare_cached(&self.insert)?;
            for record in records {
                stmt.execute(params_from_iter(self.layout.cells(record)))?;
            }
        }
        tx.commit()?;
        info!(rows = records.len(), "response batch inserted");
        Ok(())
    }
}

fn quote(ident: &str) -> String {
    format!("\"{}\"", ident.replace('"', "\"\""))
}
