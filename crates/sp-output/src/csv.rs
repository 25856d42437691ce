//! CSV output backend.
//!
//! A single append-only file with a fixed header row.  Each batch is encoded
//! in memory first and then written with one `write_all` + `sync_data` while
//! holding both an in-process mutex and an exclusive advisory file lock, so
//! concurrent respondents (threads or processes) never interleave rows.

use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, PoisonError};

use csv::{Reader, Writer};
use fs2::FileExt;
use tracing::{debug, error, info, warn};

use crate::writer::ResponseSink;
use crate::{OutputError, OutputResult, RecordLayout, ResponseRecord};

/// Append-only CSV response file.
pub struct CsvSink {
    path:   PathBuf,
    layout: RecordLayout,
    lock:   Mutex<()>,
}

impl CsvSink {
    /// Sink writing to `path`.  Nothing is touched until [`ResponseSink::init`]
    /// or the first append.
    pub fn new(path: impl Into<PathBuf>, layout: RecordLayout) -> Self {
        Self { path: path.into(), layout, lock: Mutex::new(()) }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Copy the raw file to `out` (the download endpoint's pass-through).
    ///
    /// Holds a shared file lock so a concurrent append is never half-read.
    /// Returns the number of bytes copied, or [`OutputError::NoData`] if no
    /// response has been recorded yet.
    pub fn export<W: Write>(&self, out: &mut W) -> OutputResult<u64> {
        let _guard = self.guard();
        let mut file = match File::open(&self.path) {
            Ok(f) => f,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Err(OutputError::NoData),
            Err(e) => return Err(e.into()),
        };
        FileExt::lock_shared(&file)?;
        let copied = io::copy(&mut file, out);
        FileExt::unlock(&file)?;
        Ok(copied?)
    }

    fn guard(&self) -> MutexGuard<'_, ()> {
        self.lock.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn open_append(&self) -> OutputResult<File> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        Ok(OpenOptions::new().create(true).append(true).open(&self.path)?)
    }

    /// Write `bytes` (plus the header if the file is still empty) under an
    /// exclusive file lock.
    fn locked_append(&self, bytes: &[u8]) -> OutputResult<()> {
        let file = self.open_append()?;
        FileExt::lock_exclusive(&file)?;
        let result = self.append_locked_file(&file, bytes);
        FileExt::unlock(&file)?;
        result
    }

    fn append_locked_file(&self, file: &File, bytes: &[u8]) -> OutputResult<()> {
        let start = file.metadata()?.len();
        let payload = if start == 0 {
            let mut out = encode([self.layout.header()])?;
            out.extend_from_slice(bytes);
            debug!(path = %self.path.display(), "response file initialised");
            out
        } else {
            bytes.to_vec()
        };
        write_or_rollback(file, start, |mut f| {
            f.write_all(&payload)?;
            f.sync_data()
        })
    }

    fn check_header(&self) -> OutputResult<()> {
        let file = File::open(&self.path)?;
        FileExt::lock_shared(&file)?;
        let found = read_header(&file);
        FileExt::unlock(&file)?;
        let found = found?;
        let expected = self.layout.header();
        if found != expected {
            return Err(OutputError::HeaderMismatch { path: self.path.clone(), expected, found });
        }
        Ok(())
    }
}

fn read_header(file: &File) -> OutputResult<Vec<String>> {
    let mut reader = Reader::from_reader(file);
    Ok(reader.headers()?.iter().map(str::to_owned).collect())
}

/// Run `write` against `file`, which held `start` bytes before it.  If the
/// write fails the file is cut back to `start`, so a failed batch leaves no
/// partial rows behind and a retry appends to a clean row boundary.
pub(crate) fn write_or_rollback<F>(file: &File, start: u64, write: F) -> OutputResult<()>
where
    F: FnOnce(&File) -> io::Result<()>,
{
    if let Err(e) = write(file) {
        match file.set_len(start).and_then(|()| file.sync_data()) {
            Ok(()) => warn!(len = start, error = %e, "partial batch rolled back"),
            Err(rollback) => error!(len = start, error = %rollback, "could not roll back partial batch"),
        }
        return Err(e.into());
    }
    Ok(())
}

impl ResponseSink for CsvSink {
    fn layout(&self) -> &RecordLayout {
        &self.layout
    }

    /// Write the header if the file is absent or empty; otherwise verify that
    /// the existing header matches this sink's layout.
    fn init(&self) -> OutputResult<()> {
        let _guard = self.guard();
        let is_empty = match std::fs::metadata(&self.path) {
            Ok(meta) => meta.len() == 0,
            Err(e) if e.kind() == io::ErrorKind::NotFound => true,
            Err(e) => return Err(e.into()),
        };
        if is_empty {
            self.locked_append(&[])
        } else {
            self.check_header()
        }
    }

    fn append_batch(&self, records: &[ResponseRecord]) -> OutputResult<()> {
        if records.is_empty() {
            return Ok(());
        }
        let bytes = encode(records.iter().map(|r| self.layout.cells(r)))?;

        let _guard = self.guard();
        self.locked_append(&bytes)?;
        info!(path = %self.path.display(), rows = records.len(), "response batch appended");
        Ok(())
    }
}

/// Encode rows into CSV bytes.
fn encode<I>(rows: I) -> OutputResult<Vec<u8>>
where
    I: IntoIterator<Item = Vec<String>>,
{
    let mut writer = Writer::from_writer(Vec::new());
    for row in rows {
        writer.write_record(&row)?;
    }
    writer.into_inner().map_err(|e| OutputError::Io(e.into_error()))
}
