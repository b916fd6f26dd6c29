//! `hidwire`: a HID report-descriptor parser and report decoder.
//!
//! A HID device announces the shape of its reports in a *report descriptor*,
//! a compact byte string of stateful items. hidwire parses that descriptor
//! into a [`ReportModel`] (every report the device can emit, as an ordered
//! list of bit-addressed field specs) and then decodes each raw report
//! against it into named, signed usage values.
//!
//! The crate is purely computational: a parse is a function from bytes to a
//! model, a decode is a function from `(model, payload)` to values. The only
//! I/O is loading usage-name tables from disk and reading recording files on
//! behalf of the demos.
//!
//! # Quick start
//! ```no_run
//! use hidwire::{ReportModel, UsageTables};
//!
//! let rdesc: Vec<u8> = std::fs::read("rdesc.bin")?;
//! let model = ReportModel::parse(&rdesc)?;
//! let tables = UsageTables::global();
//!
//! for report in model.reports() {
//!     println!("report {:?}: {} bytes", report.id, report.byte_len);
//! }
//! if let Some(decoded) = model.decode(&[0x01, 0x0a, 0xf6], tables) {
//!     println!("{}", decoded.event_line("0.000000"));
//! }
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! # Modules
//! - [`item`] — the raw item stream (tags, incremental decoding)
//! - [`hut`] — usage name tables and the [`UsageLookup`] seam
//! - [`report`] — the parsed report model and field specs
//! - [`decode`] — payload decoding and event-line rendering
//! - [`render`] — descriptor listings (raw bytes + human form)
//! - [`recording`] — the `R:`/`E:`/`N:`/`I:` recording line format
//! - [`metadata`] — recorded-device metadata
//!
//! ## Threading
//! A [`ReportModel`] and loaded [`UsageTables`] are read-only after
//! construction and safe to share; parses and decodes on disjoint inputs
//! need no coordination. [`UsageTables::global`] initializes exactly once.

pub mod decode;
pub mod hut;
pub mod item;
pub mod metadata;
mod parser;
pub mod recording;
pub mod render;
pub mod report;

/// Error and Result types for the crate.
pub mod error {
    //! Error and result types used across hidwire.
    //!
    //! Parse errors are fatal for the whole descriptor and carry the byte
    //! offset of the offending item. Decode problems are deliberately *not*
    //! here: an unresolvable or truncated event is per-event and surfaces as
    //! an empty result plus a logged diagnostic, never as an `Err`.

    /// Crate-wide error type.
    #[derive(thiserror::Error, Debug)]
    pub enum Error {
        /// A prefix byte outside the short-item tag table.
        #[error("unknown item tag 0x{byte:02x} at offset {offset}")]
        UnknownTag { byte: u8, offset: usize },

        /// The descriptor ended in the middle of an item payload.
        #[error("descriptor truncated inside the item at offset {offset} ({missing} payload byte(s) missing)")]
        TruncatedItem { offset: usize, missing: usize },

        /// A Pop item with no Push left to restore.
        #[error("Pop without a matching Push at offset {offset}")]
        UnbalancedPop { offset: usize },

        /// A malformed usage-table file.
        #[error("{origin}:{line}: {reason}")]
        UsageTable {
            origin: String,
            line: usize,
            reason: String,
        },

        /// A malformed recording line.
        #[error("recording line {line}: {reason}")]
        Recording { line: usize, reason: String },

        /// File I/O while loading tables or recordings.
        #[error(transparent)]
        Io(#[from] std::io::Error),
    }

    /// Convenient crate-wide result alias.
    pub type Result<T> = core::result::Result<T, Error>;
}

pub use error::{Error, Result};

// ---- Re-exports (convenience) ----
pub use decode::{DecodedField, DecodedReport, SlotValue};
pub use hut::{UsageLookup, UsageTables};
pub use metadata::DeviceMeta;
pub use report::{FieldSpec, MainFlags, Report, ReportModel};

// A tiny prelude for downstreams.
pub mod prelude {
    pub use crate::decode::{DecodedField, DecodedReport, SlotValue};
    pub use crate::hut::{UsageLookup, UsageTables};
    pub use crate::item::{Item, ItemClass, ItemTag, ItemValue};
    pub use crate::metadata::DeviceMeta;
    pub use crate::recording::{Line, Recording, ReplaySession, ReportEvent};
    pub use crate::report::{FieldSpec, MainFlags, Report, ReportModel};
}
