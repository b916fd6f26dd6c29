//! Descriptor listings: raw bytes next to a human-readable form.
//!
//! Every item renders twice. The raw form is the bytes as stored,
//! comma-separated (`0x05, 0x01,`); the human form is the tag name with a
//! parenthesized argument, indented two spaces per open collection. The two
//! run side by side in [`dump_rdesc`], which is what the recording decoder
//! and the demos print above the event stream.

use crate::hut::UsageLookup;
use crate::item::{Item, ItemTag, ItemValue};
use crate::report::{MainFlags, ReportModel};

/// Sensor usage page number (HUT 0x20): usages there carry data-modifier
/// bits in the high nibble.
const SENSOR_PAGE: u16 = 0x20;

/// One listed item.
#[derive(Clone, Debug)]
pub struct RenderedItem {
    /// `0x05, 0x01,` — prefix byte, then payload bytes as stored.
    pub raw: String,
    /// Indented tag name with its argument.
    pub human: String,
    /// Byte offset of the item in the descriptor.
    pub offset: usize,
}

/// Render the item stream of a parsed descriptor.
pub fn render_items(model: &ReportModel, tables: &impl UsageLookup) -> Vec<RenderedItem> {
    let mut depth: usize = 0;
    model
        .items()
        .iter()
        .map(|item| {
            if item.tag() == ItemTag::EndCollection {
                depth = depth.saturating_sub(1);
            }
            let human = format!("{}{}", "  ".repeat(depth), describe_item(item, tables));
            if item.tag() == ItemTag::Collection {
                depth += 1;
            }
            RenderedItem {
                raw: raw_bytes(item),
                human,
                offset: item.offset(),
            }
        })
        .collect()
}

/// Two-column descriptor dump with byte offsets, one line per item.
pub fn dump_rdesc(model: &ReportModel, tables: &impl UsageLookup) -> String {
    let mut out = String::new();
    for line in render_items(model, tables) {
        out.push_str(&format!(
            "{:<30} // {:<35} {}\n",
            line.raw, line.human, line.offset
        ));
    }
    out
}

fn raw_bytes(item: &Item) -> String {
    let bytes: Vec<String> = item.bytes().iter().map(|b| format!("0x{b:02x}")).collect();
    format!("{},", bytes.join(", "))
}

fn numeric(item: &Item) -> String {
    match item.value() {
        ItemValue::None => "0".to_string(),
        ItemValue::Unsigned(v) => v.to_string(),
        ItemValue::Signed(v) => v.to_string(),
    }
}

fn describe_item(item: &Item, tables: &impl UsageLookup) -> String {
    let name = item.tag().name();
    let value = item.raw_value();
    match item.tag() {
        ItemTag::ReportId
        | ItemTag::ReportSize
        | ItemTag::ReportCount
        | ItemTag::LogicalMinimum
        | ItemTag::LogicalMaximum
        | ItemTag::PhysicalMinimum
        | ItemTag::PhysicalMaximum
        | ItemTag::UnitExponent
        | ItemTag::UsageMinimum
        | ItemTag::UsageMaximum => format!("{name} ({})", numeric(item)),
        ItemTag::Collection => format!("{name} ({})", collection_name(value)),
        ItemTag::UsagePage => match tables.page_name(value as u16) {
            Some(page) => format!("{name} ({page})"),
            None => format!("{name} (Vendor Usage Page 0x{value:02x})"),
        },
        ItemTag::Usage => format!("{name} ({})", usage_argument(item, tables)),
        ItemTag::Input | ItemTag::Output | ItemTag::Feature => {
            format!("{name} ({})", MainFlags(value).describe())
        }
        ItemTag::Unit => format!("{name} ({})", unit_argument(value)),
        _ => name.to_string(),
    }
}

fn collection_name(value: u32) -> &'static str {
    match value {
        0x00 => "Physical",
        0x01 => "Application",
        0x02 => "Logical",
        0x03 => "Report",
        0x04 => "NamedArray",
        0x05 => "UsageSwitch",
        0x06 => "UsageModifier",
        0x80..=0xff => "VendorDefined",
        _ => "Reserved",
    }
}

fn usage_argument(item: &Item, tables: &impl UsageLookup) -> String {
    let value = item.raw_value();
    let usage = if item.payload_len() == 4 {
        value
    } else {
        value | item.usage_page()
    };
    if let Some(name) = tables.usage_name(usage) {
        return name.to_string();
    }
    // Sensor usages fold a data modifier into the high nibble; strip it and
    // name the two halves separately.
    if (usage >> 16) as u16 == SENSOR_PAGE {
        let modifier = (usage & 0xf000) >> 12;
        let base = usage & !0xf000;
        if let (Some(name), Some(modifier)) = (tables.usage_name(base), sensor_modifier(modifier)) {
            return format!("{name} | {modifier}");
        }
    }
    format!("Vendor Usage 0x{value:02x}")
}

fn sensor_modifier(nibble: u32) -> Option<&'static str> {
    Some(match nibble {
        0x1 => "Change Sensitivity Absolute",
        0x2 => "Maximum",
        0x3 => "Minimum",
        0x4 => "Accuracy",
        0x5 => "Resolution",
        0x6 => "Threshold High",
        0x7 => "Threshold Low",
        0x8 => "Calibration Offset",
        0x9 => "Calibration Multiplier",
        0xa => "Report Interval",
        0xb => "Frequency Max",
        0xc => "Period Max",
        0xd => "Change Sensitivity Percent of Range",
        0xe => "Change Sensitivity Percent Relative",
        0xf => "Vendor Reserved",
        _ => return None,
    })
}

const UNIT_SYSTEMS: [&str; 5] = ["None", "SILinear", "SIRotation", "EngLinear", "EngRotation"];

/// Dimension names per system, in nibble order: length, mass, time,
/// temperature, current, luminous intensity.
const UNIT_DIMENSIONS: [[&str; 5]; 6] = [
    ["None", "Centimeter", "Radians", "Inch", "Degrees"],
    ["None", "Gram", "Gram", "Slug", "Slug"],
    ["None", "Seconds", "Seconds", "Seconds", "Seconds"],
    ["None", "Kelvin", "Kelvin", "Fahrenheit", "Fahrenheit"],
    ["None", "Ampere", "Ampere", "Ampere", "Ampere"],
    ["None", "Candela", "Candela", "Candela", "Candela"],
];

fn unit_argument(value: u32) -> String {
    let system = (value & 0xf) as usize;
    if system >= UNIT_SYSTEMS.len() {
        return "Reserved".to_string();
    }
    let mut out = String::new();
    for (dim, names) in UNIT_DIMENSIONS.iter().enumerate() {
        let nibble = (value >> ((dim + 1) * 4)) & 0xf;
        let exponent = crate::item::sign_extend(nibble, 4);
        if exponent != 0 {
            out.push_str(names[system]);
            if exponent != 1 {
                out.push_str(&format!("^{exponent}"));
            }
            out.push(',');
        }
    }
    out.push_str(UNIT_SYSTEMS[system]);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hut::UsageTables;

    #[test]
    fn unit_rendering_orders_dimensions_low_to_high() {
        // SILinear, length^1: centimeters.
        assert_eq!(unit_argument(0x11), "Centimeter,SILinear");
        // SILinear, length^2: square centimeters.
        assert_eq!(unit_argument(0x21), "Centimeter^2,SILinear");
        // EngLinear, length^1, time^-3: two dimensions, low nibble first.
        assert_eq!(unit_argument(0xd013), "Inch,Seconds^-3,EngLinear");
        assert_eq!(unit_argument(0x0), "None");
    }

    #[test]
    fn raw_form_matches_storage_order() {
        let model = ReportModel::parse(&[0x26, 0xff, 0x00]).unwrap();
        let lines = render_items(&model, &UsageTables::new());
        assert_eq!(lines[0].raw, "0x26, 0xff, 0x00,");
        assert_eq!(lines[0].human, "Logical Maximum (255)");
    }
}
