//! `sp-output` — turning a completed session into long-format rows.
//!
//! One completed session becomes exactly N [`ResponseRecord`]s (one per
//! scenario), all sharing a fresh respondent id and one timestamp.  The
//! [`ResponseRecorder`] builds them and appends them to a [`ResponseSink`]
//! as a single batch.
//!
//! | Feature   | Backend     | Files created                 |
//! |-----------|-------------|-------------------------------|
//! | *(none)*  | CSV         | `responses.csv` (configured)  |
//! | `sqlite`  | SQLite      | `responses` table             |
//!
//! Every backend serialises batch appends: rows of two respondents finishing
//! at the same time are never interleaved.
//!
//! # Usage
//!
//! ```rust,ignore
//! use sp_output::{CsvSink, RecordLayout, ResponseRecorder};
//!
//! let layout = RecordLayout::new(&catalog, &design.labels());
//! let sink = CsvSink::new("data/responses.csv", layout);
//! let recorder = ResponseRecorder::new(sink);
//! let receipt = recorder.record(&session, &design)?;
//! ```

pub mod csv;
pub mod error;
pub mod memory;
pub mod recorder;
pub mod row;
pub mod writer;

#[cfg(feature = "sqlite")]
pub mod sqlite;


pub use csv::CsvSink;
pub use error::{OutputError, OutputResult};
pub use memory::MemorySink;
pub use recorder::{RecordReceipt, ResponseRecorder};
pub use row::{RecordLayout, ResponseRecord};
pub use writer::ResponseSink;

#[cfg(feature = "sqlite")]
pub use sqlite::SqliteSink;
