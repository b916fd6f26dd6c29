//! The report model: everything a descriptor declares about report shapes.
//!
//! [`ReportModel::parse`] is the single entry point from descriptor bytes.
//! The result is read-only: a map from report ID to [`Report`] (ordered
//! [`FieldSpec`]s plus the payload byte size), the retained item stream for
//! pretty-printing, and the two multitouch markers the replay ecosystem
//! cares about (the Win8 certification usage and the report carrying
//! Digitizer Contact Count).
//!
//! Report IDs are `Option<u8>`: `None` is the unnumbered report of devices
//! that never emit a Report ID item.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::item::{decode_items, Item};
use crate::parser::Parser;
use crate::Result;

/// The flag byte of an Input/Output/Feature item.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct MainFlags(pub u32);

impl MainFlags {
    pub fn is_constant(&self) -> bool {
        self.0 & (1 << 0) != 0
    }

    pub fn is_variable(&self) -> bool {
        self.0 & (1 << 1) != 0
    }

    pub fn is_relative(&self) -> bool {
        self.0 & (1 << 2) != 0
    }

    pub fn wraps(&self) -> bool {
        self.0 & (1 << 3) != 0
    }

    pub fn is_nonlinear(&self) -> bool {
        self.0 & (1 << 4) != 0
    }

    pub fn no_preferred(&self) -> bool {
        self.0 & (1 << 5) != 0
    }

    pub fn has_null_state(&self) -> bool {
        self.0 & (1 << 6) != 0
    }

    pub fn is_volatile(&self) -> bool {
        self.0 & (1 << 7) != 0
    }

    pub fn is_buffered_bytes(&self) -> bool {
        self.0 & (1 << 8) != 0
    }

    /// The `Data,Var,Abs[,…]` form used in descriptor listings.
    pub fn describe(&self) -> String {
        let mut s = String::new();
        s.push_str(if self.is_constant() { "Cnst," } else { "Data," });
        s.push_str(if self.is_variable() { "Var," } else { "Arr," });
        s.push_str(if self.is_relative() { "Rel" } else { "Abs" });
        if self.wraps() {
            s.push_str(",Wrap");
        }
        if self.is_nonlinear() {
            s.push_str(",NonLin");
        }
        if self.no_preferred() {
            s.push_str(",NoPref");
        }
        if self.has_null_state() {
            s.push_str(",Null");
        }
        if self.is_volatile() {
            s.push_str(",Vol");
        }
        if self.is_buffered_bytes() {
            s.push_str(",Buff");
        }
        s
    }
}

/// Padding bits. Adjacent `Report Size × Report Count` collapse into one
/// spec; the decoder skips `bits` and renders a single `#`.
#[derive(Clone, Debug, Serialize)]
pub struct ConstantField {
    pub bits: u32,
    pub flags: MainFlags,
}

/// One control with one usage (the parser expands `Report Count` groups into
/// individual variable fields).
#[derive(Clone, Debug, Serialize)]
pub struct VariableField {
    /// Combined 32-bit usage (`page << 16 | id`).
    pub usage: u32,
    pub usage_page: u16,
    pub bits: u32,
    pub logical_min: i64,
    pub logical_max: i64,
    pub flags: MainFlags,
}

/// An array slot group: the report carries `count` values of `bits` bits,
/// each an index into `usages`.
#[derive(Clone, Debug, Serialize)]
pub struct ArrayField {
    /// Combined usages ordered by index value.
    pub usages: Vec<u32>,
    pub usage_page: u16,
    pub bits: u32,
    pub count: u32,
    pub logical_min: i64,
    pub logical_max: i64,
    pub flags: MainFlags,
}

/// One decoded slot of a report.
#[derive(Clone, Debug, Serialize)]
pub enum FieldSpec {
    Constant(ConstantField),
    Variable(VariableField),
    Array(ArrayField),
}

impl FieldSpec {
    /// Total bits this spec occupies in the payload.
    pub fn bit_len(&self) -> u32 {
        match self {
            FieldSpec::Constant(c) => c.bits,
            FieldSpec::Variable(v) => v.bits,
            FieldSpec::Array(a) => a.bits * a.count,
        }
    }

    pub fn flags(&self) -> MainFlags {
        match self {
            FieldSpec::Constant(c) => c.flags,
            FieldSpec::Variable(v) => v.flags,
            FieldSpec::Array(a) => a.flags,
        }
    }
}

/// One report shape: its ID, payload byte size, and ordered fields.
#[derive(Clone, Debug, Serialize)]
pub struct Report {
    /// `None` for the unnumbered report.
    pub id: Option<u8>,
    /// Payload size in bytes, including the ID prefix byte when numbered.
    pub byte_len: u32,
    pub fields: Vec<FieldSpec>,
}

impl Report {
    /// Declared bit length: the field bits plus the 8-bit ID prefix when
    /// numbered.
    pub fn bit_len(&self) -> u32 {
        let prefix = if self.id.is_some() { 8 } else { 0 };
        prefix + self.fields.iter().map(FieldSpec::bit_len).sum::<u32>()
    }
}

/// Parsed descriptor: report shapes plus the retained item stream.
#[derive(Debug)]
pub struct ReportModel {
    pub(crate) reports: BTreeMap<Option<u8>, Report>,
    pub(crate) items: Vec<Item>,
    pub(crate) win8: bool,
    pub(crate) multitouch_report_id: Option<u8>,
}

impl ReportModel {
    /// Parse a report descriptor.
    ///
    /// `bytes` is the raw descriptor blob (no length prefix; recording
    /// loaders strip the `R:` line's length token before calling this).
    pub fn parse(bytes: &[u8]) -> Result<ReportModel> {
        let mut items = decode_items(bytes)?;
        let mut parser = Parser::new();
        for item in items.iter_mut() {
            parser.step(item)?;
        }
        Ok(parser.finish(items))
    }

    /// Iterate the declared reports, unnumbered first, then ascending IDs.
    pub fn reports(&self) -> impl Iterator<Item = &Report> {
        self.reports.values()
    }

    /// The report declared for an exact ID, if any.
    pub fn get(&self, id: Option<u8>) -> Option<&Report> {
        self.reports.get(&id)
    }

    /// Whether an unnumbered report was declared.
    pub fn has_unnumbered(&self) -> bool {
        self.reports.contains_key(&None)
    }

    /// Lenient report lookup for an inbound payload.
    ///
    /// `first_byte` is the payload's first byte (the candidate report ID),
    /// `payload_len` the full payload size. The returned flag says whether
    /// the payload is numbered, i.e. whether decoding starts past the ID
    /// byte.
    ///
    /// Match order:
    /// 1. exact `(id, size)`;
    /// 2. the unnumbered report with that exact size (devices without
    ///    report IDs put data in the first byte);
    /// 3. the largest report with that ID whose declared size does not
    ///    exceed the payload (devices that pad trailing bytes).
    pub fn lookup(&self, first_byte: u8, payload_len: usize) -> Option<(&Report, bool)> {
        let len = payload_len as u32;
        if let Some(r) = self.reports.get(&Some(first_byte)) {
            if r.byte_len == len {
                return Some((r, true));
            }
        }
        if let Some(r) = self.reports.get(&None) {
            if r.byte_len == len {
                return Some((r, false));
            }
        }
        let mut best: Option<&Report> = None;
        for r in self.reports.values() {
            if r.id == Some(first_byte)
                && r.byte_len <= len
                && best.map_or(true, |b| r.byte_len > b.byte_len)
            {
                best = Some(r);
            }
        }
        best.map(|r| (r, true))
    }

    /// The descriptor's item stream, in order, annotated with the usage page
    /// in effect at each item.
    pub fn items(&self) -> &[Item] {
        &self.items
    }

    /// True when the descriptor carries the Win8 touchscreen certification
    /// marker (a Feature whose last usage is the vendor usage `0xff0000c5`).
    pub fn win8(&self) -> bool {
        self.win8
    }

    /// Report ID of the collection that declared Digitizer Contact Count
    /// (`0x000d0051`), if any.
    pub fn multitouch_report_id(&self) -> Option<u8> {
        self.multitouch_report_id
    }

    /// Re-emit the descriptor bytes from the item stream.
    ///
    /// Equals the parsed input, minus the one optional trailing `0x00`.
    pub fn rdesc_bytes(&self) -> Vec<u8> {
        self.items.iter().flat_map(|i| i.bytes()).collect()
    }
}
