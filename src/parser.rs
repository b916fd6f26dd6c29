//! Descriptor parse state.
//!
//! One [`Parser`] walks the item stream once. Global state persists across
//! main items and is stacked by Push/Pop; local state (the usage list and
//! usage range) is cleared after every Input/Output/Feature/Collection and
//! on a Usage Page change. Input items drain the accumulated state into
//! [`FieldSpec`]s; a Report ID item closes the report being accumulated and
//! opens the next.

use std::collections::BTreeMap;

use crate::item::{Item, ItemTag};
use crate::report::{
    ArrayField, ConstantField, FieldSpec, MainFlags, Report, ReportModel, VariableField,
};
use crate::{Error, Result};

/// Vendor feature usage Microsoft requires on Win8-certified touchscreens.
const WIN8_CERT_USAGE: u32 = 0xff00_00c5;

/// Digitizer / Contact Count: marks the multitouch report.
const CONTACT_COUNT_USAGE: u32 = 0x000d_0051;

#[derive(Clone, Copy, Debug, Default)]
struct Globals {
    /// Current page, pre-shifted (`page << 16`).
    usage_page: u32,
    logical_min: i64,
    /// Maximum as read (unsigned); signedness is decided at emission time
    /// against the running minimum, so the payload width is kept.
    logical_max: u32,
    logical_max_width: u8,
    report_size: u32,
    report_count: u32,
}

impl Globals {
    /// Resolve the maximum: unsigned unless the running minimum exceeds it,
    /// in which case the descriptor meant two's-complement (a negative
    /// maximum encoded in an unsigned-looking byte).
    fn resolve_max(min: i64, raw: u32, width: u8) -> i64 {
        if min > raw as i64 {
            crate::item::sign_extend(raw, width as u32 * 8) as i64
        } else {
            raw as i64
        }
    }

    fn logical_max_resolved(&self) -> i64 {
        Self::resolve_max(self.logical_min, self.logical_max, self.logical_max_width)
    }
}

#[derive(Clone, Debug, Default)]
struct Locals {
    usages: Vec<u32>,
    usage_min: Option<u32>,
    usage_max: Option<u32>,
}

#[derive(Debug, Default)]
struct Accumulator {
    fields: Vec<FieldSpec>,
    bits: u32,
}

pub(crate) struct Parser {
    globals: Globals,
    stack: Vec<Globals>,
    locals: Locals,
    current: Accumulator,
    report_id: Option<u8>,
    reports: BTreeMap<Option<u8>, Report>,
    win8: bool,
    multitouch_report_id: Option<u8>,
}

impl Parser {
    pub fn new() -> Self {
        Parser {
            globals: Globals::default(),
            stack: Vec::new(),
            locals: Locals::default(),
            current: Accumulator::default(),
            report_id: None,
            reports: BTreeMap::new(),
            win8: false,
            multitouch_report_id: None,
        }
    }

    /// Consume one item, annotating it with the usage page in effect.
    pub fn step(&mut self, item: &mut Item) -> Result<()> {
        item.set_usage_page(self.globals.usage_page);
        let value = item.raw_value();

        match item.tag() {
            ItemTag::UsagePage => {
                self.globals.usage_page = value << 16;
                self.locals = Locals::default();
            }
            ItemTag::Usage => {
                let usage = self.combine(item);
                if usage == CONTACT_COUNT_USAGE {
                    self.multitouch_report_id = self.report_id;
                }
                self.locals.usages.push(usage);
            }
            ItemTag::UsageMinimum => self.locals.usage_min = Some(self.combine(item)),
            ItemTag::UsageMaximum => self.locals.usage_max = Some(self.combine(item)),
            ItemTag::LogicalMinimum => self.globals.logical_min = item.signed() as i64,
            ItemTag::LogicalMaximum => {
                self.globals.logical_max = value;
                self.globals.logical_max_width = item.payload_len();
            }
            ItemTag::ReportSize => self.globals.report_size = value,
            ItemTag::ReportCount => self.globals.report_count = value,
            ItemTag::ReportId => {
                self.flush();
                self.report_id = Some(value as u8);
                // Seed with the 8-bit ID prefix so byte sizes match what the
                // device actually sends.
                self.current.bits = 8;
            }
            ItemTag::Push => self.stack.push(self.globals),
            ItemTag::Pop => {
                self.globals = self.stack.pop().ok_or(Error::UnbalancedPop {
                    offset: item.offset(),
                })?;
            }
            ItemTag::Collection | ItemTag::EndCollection => self.locals = Locals::default(),
            ItemTag::Input => {
                self.emit(MainFlags(value));
                self.locals = Locals::default();
            }
            ItemTag::Output => self.locals = Locals::default(),
            ItemTag::Feature => {
                if self.locals.usages.last() == Some(&WIN8_CERT_USAGE) {
                    self.win8 = true;
                }
                self.locals = Locals::default();
            }
            // Physical range and Unit values only matter for the listing,
            // which reads them straight off the items. Designator/string
            // locals have no consumer either.
            ItemTag::PhysicalMinimum
            | ItemTag::PhysicalMaximum
            | ItemTag::UnitExponent
            | ItemTag::Unit
            | ItemTag::DesignatorIndex
            | ItemTag::DesignatorMinimum
            | ItemTag::DesignatorMaximum
            | ItemTag::StringIndex
            | ItemTag::StringMinimum
            | ItemTag::StringMaximum
            | ItemTag::Delimiter => {}
        }
        Ok(())
    }

    /// Combine an item's value with the current usage page. Four-byte usages
    /// already carry their page inline.
    fn combine(&self, item: &Item) -> u32 {
        if item.payload_len() == 4 {
            item.raw_value()
        } else {
            item.raw_value() | self.globals.usage_page
        }
    }

    /// Drain the local/global state into field specs for one Input item.
    fn emit(&mut self, flags: MainFlags) {
        let size = self.globals.report_size;
        // Reports top out at a few KiB; a count beyond that is a garbage
        // descriptor, not a bigger report.
        let count = self.globals.report_count.min(0x1000);
        let usage_page = (self.globals.usage_page >> 16) as u16;
        let logical_min = self.globals.logical_min;
        let logical_max = self.globals.logical_max_resolved();

        if flags.is_constant() {
            // Padding: collapse the whole group into a single spec.
            let bits = size.saturating_mul(count);
            self.current.fields.push(FieldSpec::Constant(ConstantField { bits, flags }));
            self.current.bits = self.current.bits.saturating_add(bits);
        } else if flags.is_variable() {
            let push = |usage: u32, this: &mut Self| {
                this.current.fields.push(FieldSpec::Variable(VariableField {
                    usage,
                    usage_page,
                    bits: size,
                    logical_min,
                    logical_max,
                    flags,
                }));
                this.current.bits = this.current.bits.saturating_add(size);
            };
            match (self.locals.usage_min, self.locals.usage_max) {
                (Some(min), Some(max)) => {
                    // Walk the declared range, clamping when the count
                    // overruns it.
                    let mut usage = min;
                    for _ in 0..count {
                        push(usage, self);
                        if usage < max {
                            usage += 1;
                        }
                    }
                }
                _ => {
                    for i in 0..count as usize {
                        let usage = self
                            .locals
                            .usages
                            .get(i)
                            .or(self.locals.usages.last())
                            .copied()
                            .unwrap_or(0);
                        push(usage, self);
                    }
                }
            }
        } else {
            let usages = match (self.locals.usage_min, self.locals.usage_max) {
                (Some(min), Some(max)) => {
                    if min <= max {
                        let span = (max - min).min(0xffff);
                        (min..=min + span).collect()
                    } else {
                        Vec::new()
                    }
                }
                _ => self.locals.usages.clone(),
            };
            self.current.fields.push(FieldSpec::Array(ArrayField {
                usages,
                usage_page,
                bits: size,
                count,
                logical_min,
                logical_max,
                flags,
            }));
            self.current.bits = self.current.bits.saturating_add(size.saturating_mul(count));
        }
    }

    /// Close the report being accumulated. Anything of 8 bits or fewer is
    /// the empty shell before the first Input of a numbered report and is
    /// discarded.
    fn flush(&mut self) {
        let acc = std::mem::take(&mut self.current);
        if acc.bits > 8 {
            self.reports.insert(
                self.report_id,
                Report {
                    id: self.report_id,
                    byte_len: (acc.bits + 7) / 8,
                    fields: acc.fields,
                },
            );
        }
    }

    pub fn finish(mut self, items: Vec<Item>) -> ReportModel {
        self.flush();
        ReportModel {
            reports: self.reports,
            items,
            win8: self.win8,
            multitouch_report_id: self.multitouch_report_id,
        }
    }
}
