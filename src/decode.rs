//! Report decoding: from a packed payload to named usage values.
//!
//! Fields sit at arbitrary bit offsets, so extraction works on a byte slice
//! around the field, assembles a little-endian integer, shifts the low bit
//! of the field down to bit 0 and masks. Sign extension applies only when
//! the field's logical minimum is negative and the field is wider than one
//! bit.
//!
//! A payload shorter than the declared report is decoded against zeroed
//! trailing bytes; a field lying entirely past the end becomes the `<.>`
//! placeholder instead of a number. Neither case aborts the event stream.

use std::collections::HashSet;

use serde::Serialize;

use crate::hut::UsageLookup;
use crate::report::{FieldSpec, MainFlags, Report, ReportModel};

/// Extract `bits` bits starting `bit_offset` bits into `payload`, as an
/// unsigned little-endian value.
///
/// Returns `None` only when the field starts past the end of the payload;
/// a field that merely runs over the end reads the missing bytes as zero.
pub fn extract_bits(payload: &[u8], bit_offset: u32, bits: u32) -> Option<u64> {
    let start = (bit_offset / 8) as usize;
    if start >= payload.len() {
        return None;
    }
    let end = (((bit_offset + bits) / 8) as usize + 1).min(payload.len());
    let mut value: u64 = 0;
    // Eight bytes saturate the accumulator; wider fields are clamped.
    for (i, &byte) in payload[start..end].iter().take(8).enumerate() {
        value |= (byte as u64) << (8 * i);
    }
    value >>= bit_offset % 8;
    if bits < 64 {
        value &= (1u64 << bits) - 1;
    }
    Some(value)
}

/// Sign-extend the low `bits` bits of `value` into an `i64`.
pub fn sign_extend64(value: u64, bits: u32) -> i64 {
    if bits == 0 || bits >= 64 {
        return value as i64;
    }
    let masked = value & ((1u64 << bits) - 1);
    if masked & (1u64 << (bits - 1)) != 0 {
        masked as i64 - (1i64 << bits)
    } else {
        masked as i64
    }
}

/// A variable field's decoded value.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum SlotValue {
    Int(i64),
    /// The field starts past the end of the payload.
    Truncated,
}

/// One decoded field of a report.
#[derive(Clone, Debug, Serialize)]
pub enum DecodedField {
    /// Padding; renders as `#`.
    Constant { bits: u32 },
    Variable {
        usage_page: u16,
        usage: u32,
        /// Display label: a usage name, `B<n>` on the Button page, or the
        /// hex usage code.
        label: String,
        value: SlotValue,
        bits: u32,
        flags: MainFlags,
    },
    Array {
        /// Usage page name, or `Array` when the page is unnamed.
        page_label: String,
        /// Rendered slots; empty strings are null slots.
        slots: Vec<String>,
    },
}

/// A fully decoded report event.
#[derive(Clone, Debug, Serialize)]
pub struct DecodedReport {
    /// The leading ID byte, when the payload is numbered.
    pub report_id: Option<u8>,
    pub fields: Vec<DecodedField>,
}

fn usage_label(usage: u32, tables: &impl UsageLookup) -> String {
    let page = (usage >> 16) as u16;
    if tables.page_name(page) == Some("Button") {
        return format!("B{}", usage & 0xff);
    }
    match tables.usage_name(usage) {
        Some(name) => name.to_string(),
        None => format!("0x{usage:04x}"),
    }
}

/// Decode one payload against a known report shape.
///
/// `numbered` selects whether decoding starts past an 8-bit ID prefix;
/// [`ReportModel::decode`] passes the flag from its lookup. Calling this
/// directly is useful when the shape is chosen by other means (editors
/// decoding against a report under construction).
pub fn decode_report(
    report: &Report,
    payload: &[u8],
    numbered: bool,
    tables: &impl UsageLookup,
) -> DecodedReport {
    let mut offset: u32 = if numbered { 8 } else { 0 };
    let mut fields = Vec::with_capacity(report.fields.len());

    for spec in &report.fields {
        match spec {
            FieldSpec::Constant(c) => {
                fields.push(DecodedField::Constant { bits: c.bits });
                offset += c.bits;
            }
            FieldSpec::Variable(v) => {
                let value = match extract_bits(payload, offset, v.bits) {
                    None => SlotValue::Truncated,
                    Some(raw) => {
                        if v.logical_min < 0 && v.bits > 1 {
                            SlotValue::Int(sign_extend64(raw, v.bits))
                        } else {
                            SlotValue::Int(raw as i64)
                        }
                    }
                };
                offset += v.bits;
                fields.push(DecodedField::Variable {
                    usage_page: v.usage_page,
                    usage: v.usage,
                    label: usage_label(v.usage, tables),
                    value,
                    bits: v.bits,
                    flags: v.flags,
                });
            }
            FieldSpec::Array(a) => {
                let page_name = tables.page_name(a.usage_page).unwrap_or("");
                let vendor_page = page_name.to_lowercase().contains("vendor");
                let mut slots = Vec::with_capacity(a.count as usize);
                for _ in 0..a.count {
                    let value = match extract_bits(payload, offset, a.bits) {
                        None => SlotValue::Truncated,
                        Some(raw) => {
                            if a.logical_min < 0 && a.bits > 1 {
                                SlotValue::Int(sign_extend64(raw, a.bits))
                            } else {
                                SlotValue::Int(raw as i64)
                            }
                        }
                    };
                    offset += a.bits;
                    slots.push(render_slot(value, a.logical_min, a.logical_max, &a.usages, vendor_page, tables));
                }
                let page_label = if page_name.is_empty() {
                    "Array".to_string()
                } else {
                    page_name.to_string()
                };
                fields.push(DecodedField::Array { page_label, slots });
            }
        }
    }

    DecodedReport {
        report_id: if numbered { payload.first().copied() } else { None },
        fields,
    }
}

/// Render one array slot.
///
/// Out-of-range values are null slots (no key pressed) and render empty;
/// in-range values render as two hex digits unless they index into the
/// usage list of a non-vendor page, in which case the usage's name is used
/// ("no event indicated" is suppressed like a null slot).
fn render_slot(
    value: SlotValue,
    logical_min: i64,
    logical_max: i64,
    usages: &[u32],
    vendor_page: bool,
    tables: &impl UsageLookup,
) -> String {
    let v = match value {
        SlotValue::Truncated => return "<.>".to_string(),
        SlotValue::Int(v) => v,
    };
    if v < logical_min || v > logical_max {
        return String::new();
    }
    if !vendor_page && v > 0 && (v as usize) < usages.len() {
        let name = usage_label(usages[v as usize], tables);
        if name.to_lowercase().contains("no event indicated") {
            return String::new();
        }
        return name;
    }
    format!("{v:02x}")
}

impl DecodedReport {
    /// Render the event in the replay line format.
    ///
    /// `time` is the event timestamp string, right-aligned to ten columns.
    /// Constants render as `#`, consecutive fields with the same flags and
    /// usage merge with `,`, and a usage label repeating later in the report
    /// starts a continuation line aligned to the data column.
    pub fn event_line(&self, time: &str) -> String {
        let mut out = format!("{time:>10} ");
        let mut sep = "";
        if let Some(id) = self.report_id {
            out.push_str(&format!("ReportID: {id} "));
            sep = "/";
        }
        let indent = out.len();
        let mut printed: HashSet<String> = HashSet::new();
        let mut prev: Option<(MainFlags, u32)> = None;

        for field in &self.fields {
            match field {
                DecodedField::Constant { .. } => {
                    out.push_str(sep);
                    out.push_str(" # ");
                    prev = None;
                }
                DecodedField::Variable {
                    usage,
                    label,
                    value,
                    bits,
                    flags,
                    ..
                } => {
                    let mut label = format!(" {label}:");
                    // A usage seen again in the same report means the next
                    // logical group (e.g. the next touch contact): break the
                    // line and restart the duplicate tracking.
                    if printed.contains(&label) {
                        printed.clear();
                        out.push('\n');
                        out.push_str(&" ".repeat(indent));
                    }
                    printed.insert(label.clone());

                    let mut sep_here = sep;
                    if prev == Some((*flags, *usage)) {
                        sep_here = ",";
                        label.clear();
                    }
                    let rendered = match value {
                        SlotValue::Truncated => "<.>".to_string(),
                        SlotValue::Int(v) => {
                            if *bits > 1 {
                                // Column width: enough for the field's
                                // maximum magnitude plus a sign position.
                                let width = (1u64 << (*bits).min(63)).to_string().len() + 1;
                                format!("{v:>width$}")
                            } else {
                                format!("{v}")
                            }
                        }
                    };
                    out.push_str(sep_here);
                    out.push_str(&label);
                    out.push(' ');
                    out.push_str(&rendered);
                    out.push(' ');
                    prev = Some((*flags, *usage));
                }
                DecodedField::Array { page_label, slots } => {
                    out.push_str(sep);
                    out.push_str(page_label);
                    out.push_str(" [");
                    out.push_str(&slots.join(", "));
                    out.push_str("] ");
                    prev = None;
                }
            }
            sep = "|";
        }
        out
    }
}

impl ReportModel {
    /// Decode one report payload.
    ///
    /// Resolves the report shape with [`lookup`](ReportModel::lookup);
    /// an unresolvable payload logs a diagnostic and yields `None`; the
    /// stream carries on with the next event.
    pub fn decode(&self, payload: &[u8], tables: &impl UsageLookup) -> Option<DecodedReport> {
        if payload.is_empty() {
            log::warn!("empty report payload");
            return None;
        }
        match self.lookup(payload[0], payload.len()) {
            Some((report, numbered)) => Some(decode_report(report, payload, numbered, tables)),
            None => {
                log::warn!(
                    "no declared report matches id {} with {} byte(s)",
                    payload[0],
                    payload.len()
                );
                None
            }
        }
    }
}
