//! Raw descriptor items.
//!
//! A HID report descriptor is a stream of *short items*: one prefix byte
//! followed by 0, 1, 2 or 4 little-endian payload bytes. The prefix encodes
//! the payload size in its low two bits (`0b11` meaning four bytes) and the
//! item tag in the remaining six.
//!
//! [`ItemDecoder`] consumes the stream one byte at a time, which is what the
//! editor-style callers need: a half-typed descriptor is "incomplete", not
//! broken. [`decode_items`] is the batch wrapper used by the descriptor
//! parser.
//!
//! Signedness is a property of the tag, so it is resolved here, at
//! construction: Logical/Physical Minimum payloads are always
//! two's-complement, a Unit Exponent is a signed nibble, and everything else
//! is unsigned. The one contextual case (a Maximum that only makes sense as
//! signed once the running Minimum is known) stays with the descriptor
//! parser, which calls [`Item::signed`] for the reinterpretation.

use serde::Serialize;

use crate::{Error, Result};

/// Item class from the prefix type bits: Main items emit report structure,
/// Global items persist across main items, Local items are transient.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum ItemClass {
    Main,
    Global,
    Local,
}

/// The 27 short-item tags of HID 1.11 §6.2.2.4.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub enum ItemTag {
    // Main
    Input,
    Output,
    Feature,
    Collection,
    EndCollection,
    // Global
    UsagePage,
    LogicalMinimum,
    LogicalMaximum,
    PhysicalMinimum,
    PhysicalMaximum,
    UnitExponent,
    Unit,
    ReportSize,
    ReportId,
    ReportCount,
    Push,
    Pop,
    // Local
    Usage,
    UsageMinimum,
    UsageMaximum,
    DesignatorIndex,
    DesignatorMinimum,
    DesignatorMaximum,
    StringIndex,
    StringMinimum,
    StringMaximum,
    Delimiter,
}

impl ItemTag {
    /// Look up a tag from the prefix byte (size bits ignored).
    ///
    /// Returns `None` for reserved or long-item prefixes; the decoder turns
    /// that into a fatal [`Error::UnknownTag`].
    pub fn from_prefix(prefix: u8) -> Option<ItemTag> {
        use ItemTag::*;
        Some(match prefix & 0xfc {
            0x80 => Input,
            0x90 => Output,
            0xb0 => Feature,
            0xa0 => Collection,
            0xc0 => EndCollection,
            0x04 => UsagePage,
            0x14 => LogicalMinimum,
            0x24 => LogicalMaximum,
            0x34 => PhysicalMinimum,
            0x44 => PhysicalMaximum,
            0x54 => UnitExponent,
            0x64 => Unit,
            0x74 => ReportSize,
            0x84 => ReportId,
            0x94 => ReportCount,
            0xa4 => Push,
            0xb4 => Pop,
            0x08 => Usage,
            0x18 => UsageMinimum,
            0x28 => UsageMaximum,
            0x38 => DesignatorIndex,
            0x48 => DesignatorMinimum,
            0x58 => DesignatorMaximum,
            0x78 => StringIndex,
            0x88 => StringMinimum,
            0x98 => StringMaximum,
            0xa8 => Delimiter,
            _ => return None,
        })
    }

    /// The prefix byte for this tag with zeroed size bits.
    pub fn prefix(&self) -> u8 {
        use ItemTag::*;
        match self {
            Input => 0x80,
            Output => 0x90,
            Feature => 0xb0,
            Collection => 0xa0,
            EndCollection => 0xc0,
            UsagePage => 0x04,
            LogicalMinimum => 0x14,
            LogicalMaximum => 0x24,
            PhysicalMinimum => 0x34,
            PhysicalMaximum => 0x44,
            UnitExponent => 0x54,
            Unit => 0x64,
            ReportSize => 0x74,
            ReportId => 0x84,
            ReportCount => 0x94,
            Push => 0xa4,
            Pop => 0xb4,
            Usage => 0x08,
            UsageMinimum => 0x18,
            UsageMaximum => 0x28,
            DesignatorIndex => 0x38,
            DesignatorMinimum => 0x48,
            DesignatorMaximum => 0x58,
            StringIndex => 0x78,
            StringMinimum => 0x88,
            StringMaximum => 0x98,
            Delimiter => 0xa8,
        }
    }

    pub fn class(&self) -> ItemClass {
        use ItemTag::*;
        match self {
            Input | Output | Feature | Collection | EndCollection => ItemClass::Main,
            Usage | UsageMinimum | UsageMaximum | DesignatorIndex | DesignatorMinimum
            | DesignatorMaximum | StringIndex | StringMinimum | StringMaximum | Delimiter => {
                ItemClass::Local
            }
            _ => ItemClass::Global,
        }
    }

    /// Display name as it appears in descriptor listings.
    pub fn name(&self) -> &'static str {
        use ItemTag::*;
        match self {
            Input => "Input",
            Output => "Output",
            Feature => "Feature",
            Collection => "Collection",
            EndCollection => "End Collection",
            UsagePage => "Usage Page",
            LogicalMinimum => "Logical Minimum",
            LogicalMaximum => "Logical Maximum",
            PhysicalMinimum => "Physical Minimum",
            PhysicalMaximum => "Physical Maximum",
            UnitExponent => "Unit Exponent",
            Unit => "Unit",
            ReportSize => "Report Size",
            ReportId => "Report ID",
            ReportCount => "Report Count",
            Push => "Push",
            Pop => "Pop",
            Usage => "Usage",
            UsageMinimum => "Usage Minimum",
            UsageMaximum => "Usage Maximum",
            DesignatorIndex => "Designator Index",
            DesignatorMinimum => "Designator Minimum",
            DesignatorMaximum => "Designator Maximum",
            StringIndex => "String Index",
            StringMinimum => "String Minimum",
            StringMaximum => "String Maximum",
            Delimiter => "Delimiter",
        }
    }
}

/// An item payload with its signedness already resolved.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum ItemValue {
    /// Zero-size payload.
    None,
    Unsigned(u32),
    Signed(i32),
}

/// Sign-extend the low `bits` bits of `value`.
///
/// `bits` of 0 or ≥ 32 return the value reinterpreted as-is.
pub fn sign_extend(value: u32, bits: u32) -> i32 {
    if bits == 0 || bits >= 32 {
        return value as i32;
    }
    let masked = value & ((1 << bits) - 1);
    if masked & (1 << (bits - 1)) != 0 {
        (masked as i64 - (1i64 << bits)) as i32
    } else {
        masked as i32
    }
}

/// One decoded short item.
#[derive(Clone, Debug, Serialize)]
pub struct Item {
    tag: ItemTag,
    payload_len: u8,
    raw: u32,
    value: ItemValue,
    offset: usize,
    usage_page: u32,
}

impl Item {
    fn new(tag: ItemTag, payload_len: u8, raw: u32, offset: usize) -> Self {
        let value = match tag {
            _ if payload_len == 0 => ItemValue::None,
            ItemTag::LogicalMinimum | ItemTag::PhysicalMinimum => {
                ItemValue::Signed(sign_extend(raw, payload_len as u32 * 8))
            }
            // 4-bit signed nibble: 8..15 map to -8..-1.
            ItemTag::UnitExponent => ItemValue::Signed(sign_extend(raw, 4)),
            _ => ItemValue::Unsigned(raw),
        };
        Item {
            tag,
            payload_len,
            raw,
            value,
            offset,
            usage_page: 0,
        }
    }

    pub fn tag(&self) -> ItemTag {
        self.tag
    }

    pub fn class(&self) -> ItemClass {
        self.tag.class()
    }

    /// Payload size in bytes (0, 1, 2 or 4).
    pub fn payload_len(&self) -> u8 {
        self.payload_len
    }

    /// The unsigned little-endian payload, zero for empty payloads.
    pub fn raw_value(&self) -> u32 {
        self.raw
    }

    /// The payload with tag-determined signedness applied.
    pub fn value(&self) -> ItemValue {
        self.value
    }

    /// Two's-complement reinterpretation of the payload at its own width.
    ///
    /// Used by the descriptor parser when a Maximum turns out to be signed in
    /// context (its running Minimum exceeds it as unsigned).
    pub fn signed(&self) -> i32 {
        sign_extend(self.raw, self.payload_len as u32 * 8)
    }

    /// Byte offset of the prefix byte within the descriptor.
    pub fn offset(&self) -> usize {
        self.offset
    }

    /// The usage page in effect when this item was parsed (`page << 16`).
    ///
    /// Annotated by the descriptor parser; zero until then.
    pub fn usage_page(&self) -> u32 {
        self.usage_page
    }

    pub(crate) fn set_usage_page(&mut self, usage_page: u32) {
        self.usage_page = usage_page;
    }

    /// Re-emit the item as descriptor bytes: prefix, then the payload as
    /// stored (little-endian).
    pub fn bytes(&self) -> Vec<u8> {
        let size_bits = match self.payload_len {
            4 => 3,
            n => n,
        };
        let mut bytes = vec![self.tag.prefix() | size_bits];
        for i in 0..self.payload_len {
            bytes.push((self.raw >> (8 * i)) as u8);
        }
        bytes
    }
}

#[derive(Debug)]
struct Pending {
    tag: ItemTag,
    payload_len: u8,
    got: u8,
    raw: u32,
    offset: usize,
}

/// Incremental item decoder.
///
/// Feed descriptor bytes one at a time with [`push`](ItemDecoder::push);
/// every completed item is returned as it closes. While a payload is still
/// being collected, [`is_mid_item`](ItemDecoder::is_mid_item) reports true:
/// callers working on partial or freshly-edited descriptors treat that as
/// "incomplete", batch callers turn it into [`Error::TruncatedItem`] via
/// [`finish`](ItemDecoder::finish).
#[derive(Debug, Default)]
pub struct ItemDecoder {
    pending: Option<Pending>,
    offset: usize,
}

impl ItemDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Consume one descriptor byte.
    ///
    /// Returns `Ok(Some(item))` when the byte completes an item, `Ok(None)`
    /// when more payload bytes are expected, and [`Error::UnknownTag`] for a
    /// prefix byte outside the short-item tag table.
    pub fn push(&mut self, byte: u8) -> Result<Option<Item>> {
        let offset = self.offset;
        self.offset += 1;

        match self.pending.take() {
            None => {
                let tag = ItemTag::from_prefix(byte).ok_or(Error::UnknownTag { byte, offset })?;
                let payload_len = match byte & 0x3 {
                    3 => 4,
                    n => n,
                };
                if payload_len == 0 {
                    return Ok(Some(Item::new(tag, 0, 0, offset)));
                }
                self.pending = Some(Pending {
                    tag,
                    payload_len,
                    got: 0,
                    raw: 0,
                    offset,
                });
                Ok(None)
            }
            Some(mut p) => {
                p.raw |= (byte as u32) << (8 * p.got);
                p.got += 1;
                if p.got == p.payload_len {
                    Ok(Some(Item::new(p.tag, p.payload_len, p.raw, p.offset)))
                } else {
                    self.pending = Some(p);
                    Ok(None)
                }
            }
        }
    }

    /// True while an item header has been seen but its payload is not
    /// complete.
    pub fn is_mid_item(&self) -> bool {
        self.pending.is_some()
    }

    /// Check that no item is left half-read at end of input.
    pub fn finish(&self) -> Result<()> {
        match &self.pending {
            None => Ok(()),
            Some(p) => Err(Error::TruncatedItem {
                offset: p.offset,
                missing: (p.payload_len - p.got) as usize,
            }),
        }
    }
}

/// Decode a whole descriptor into items.
///
/// A final lone `0x00` byte is silently dropped when it would begin a new
/// item; some devices append one past the last real item. A zero byte that
/// completes a pending payload is consumed normally.
pub fn decode_items(bytes: &[u8]) -> Result<Vec<Item>> {
    let mut decoder = ItemDecoder::new();
    let mut items = Vec::new();
    for (i, &byte) in bytes.iter().enumerate() {
        if byte == 0 && i == bytes.len() - 1 && !decoder.is_mid_item() {
            break;
        }
        if let Some(item) = decoder.push(byte)? {
            items.push(item);
        }
    }
    decoder.finish()?;
    Ok(items)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prefix_round_trip() {
        for prefix in 0u8..=0xff {
            if let Some(tag) = ItemTag::from_prefix(prefix) {
                assert_eq!(tag.prefix(), prefix & 0xfc);
            }
        }
    }

    #[test]
    fn incremental_matches_batch() {
        let bytes = [0x05, 0x01, 0x15, 0x81, 0x26, 0xff, 0x00, 0xc0];
        let items = decode_items(&bytes).unwrap();
        assert_eq!(items.len(), 4);
        assert_eq!(items[0].tag(), ItemTag::UsagePage);
        assert_eq!(items[1].value(), ItemValue::Signed(-127));
        assert_eq!(items[2].raw_value(), 0xff);
        assert_eq!(items[3].tag(), ItemTag::EndCollection);

        let mut decoder = ItemDecoder::new();
        let mut count = 0;
        for &b in &bytes {
            if decoder.push(b).unwrap().is_some() {
                count += 1;
            }
        }
        assert_eq!(count, items.len());
        assert!(!decoder.is_mid_item());
    }

    #[test]
    fn unit_exponent_nibble() {
        // 0x0e encodes -2.
        let items = decode_items(&[0x55, 0x0e]).unwrap();
        assert_eq!(items[0].value(), ItemValue::Signed(-2));
    }
}
