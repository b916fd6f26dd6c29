//! Device metadata carried by recordings.
//!
//! [`DeviceMeta`] is a lightweight, cloneable description of the recorded
//! device, filled from the `N:` (name) and `I:` (identity) lines of a
//! recording. All fields are optional; recordings captured by older tools
//! may carry neither line.
//!
//! # Conventions
//! - `bus` is the kernel bus number (3 = USB, 5 = Bluetooth).
//! - `vid`/`pid` are the USB vendor/product IDs.
//! - `name` is the kernel-reported device name, free-form.

use serde::{Deserialize, Serialize};

/// Snapshot of metadata describing the recorded device.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceMeta {
    /// Kernel device name, if the recording carried an `N:` line.
    pub name: Option<String>,

    /// Bus number from the `I:` line.
    pub bus: Option<u16>,

    /// USB Vendor ID (VID), if known.
    pub vid: Option<u16>,

    /// USB Product ID (PID), if known.
    pub pid: Option<u16>,
}
