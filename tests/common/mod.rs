//! Shared fixtures: descriptors of well-known devices and a small inline
//! usage table, so tests stay independent of the bundled data files.
#![allow(dead_code)] // not every test binary uses every fixture

use hidwire::UsageTables;

/// Two-button (plus middle) boot mouse: three 1-bit buttons, 5 padding
/// bits, signed relative X/Y bytes. Unnumbered, 3 bytes.
pub const MOUSE_RDESC: &[u8] = &[
    0x05, 0x01, // Usage Page (Generic Desktop)
    0x09, 0x02, // Usage (Mouse)
    0xa1, 0x01, // Collection (Application)
    0x09, 0x01, //   Usage (Pointer)
    0xa1, 0x00, //   Collection (Physical)
    0x05, 0x09, //     Usage Page (Button)
    0x19, 0x01, //     Usage Minimum (1)
    0x29, 0x03, //     Usage Maximum (3)
    0x15, 0x00, //     Logical Minimum (0)
    0x25, 0x01, //     Logical Maximum (1)
    0x95, 0x03, //     Report Count (3)
    0x75, 0x01, //     Report Size (1)
    0x81, 0x02, //     Input (Data,Var,Abs)
    0x95, 0x01, //     Report Count (1)
    0x75, 0x05, //     Report Size (5)
    0x81, 0x03, //     Input (Cnst,Var,Abs)
    0x05, 0x01, //     Usage Page (Generic Desktop)
    0x09, 0x30, //     Usage (X)
    0x09, 0x31, //     Usage (Y)
    0x15, 0x81, //     Logical Minimum (-127)
    0x25, 0x7f, //     Logical Maximum (127)
    0x75, 0x08, //     Report Size (8)
    0x95, 0x02, //     Report Count (2)
    0x81, 0x06, //     Input (Data,Var,Rel)
    0xc0, //   End Collection
    0xc0, // End Collection
];

/// Numbered keyboard-ish report 2: two constant bytes then a six-slot key
/// array over the Keyboard page. 9 bytes with the ID prefix.
pub const KEYBOARD_RDESC: &[u8] = &[
    0x05, 0x07, // Usage Page (Keyboard)
    0x85, 0x02, // Report ID (2)
    0x75, 0x08, // Report Size (8)
    0x95, 0x02, // Report Count (2)
    0x81, 0x01, // Input (Cnst,Arr,Abs)
    0x15, 0x00, // Logical Minimum (0)
    0x26, 0xff, 0x00, // Logical Maximum (255)
    0x19, 0x00, // Usage Minimum (0)
    0x29, 0xff, // Usage Maximum (255)
    0x95, 0x06, // Report Count (6)
    0x81, 0x00, // Input (Data,Arr,Abs)
];

/// Multitouch digitizer: report 5 carries Contact Count, and a vendor
/// Feature carries the Win8 certification usage.
pub const MT_RDESC: &[u8] = &[
    0x05, 0x0d, // Usage Page (Digitizers)
    0x09, 0x04, // Usage (Touch Screen)
    0xa1, 0x01, // Collection (Application)
    0x85, 0x05, //   Report ID (5)
    0x09, 0x22, //   Usage (Finger)
    0xa1, 0x02, //   Collection (Logical)
    0x09, 0x51, //     Usage (Contact Id)
    0x75, 0x08, //     Report Size (8)
    0x95, 0x01, //     Report Count (1)
    0x15, 0x00, //     Logical Minimum (0)
    0x25, 0x7f, //     Logical Maximum (127)
    0x81, 0x02, //     Input (Data,Var,Abs)
    0xc0, //   End Collection
    0x06, 0x00, 0xff, //   Usage Page (Vendor 0xff00)
    0x09, 0xc5, //   Usage (0xff0000c5)
    0xb1, 0x02, //   Feature (Data,Var,Abs)
    0xc0, // End Collection
];

/// Inline tables covering what the fixtures reference.
pub fn tables() -> UsageTables {
    let mut t = UsageTables::new();
    t.add_page(
        "(1)\tGeneric Desktop\n01\tPointer\n02\tMouse\n30\tX\n31\tY\n38\tWheel\n",
        "generic_desktop.hut",
    )
    .unwrap();
    t.add_page("(9)\tButton\n01\tButton 1\n02\tButton 2\n03\tButton 3\n", "button.hut")
        .unwrap();
    t.add_page(
        "(7)\tKeyboard\n00\tNo event indicated\n04\tKeyboard A\n05\tKeyboard B\n",
        "keyboard.hut",
    )
    .unwrap();
    t.add_page(
        "(13)\tDigitizers\n04\tTouch Screen\n22\tFinger\n51\tContact Id\n54\tContact Count\n",
        "digitizers.hut",
    )
    .unwrap();
    t
}
