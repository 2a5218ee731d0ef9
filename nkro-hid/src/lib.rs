#![cfg_attr(not(test), no_std)]
//! NKRO keyboard and mouse HID reports for `usb-device` firmware.
//!
//! [`keyboard::Keyboard`] keeps the pressed state and only sends what the host
//! doesn't already have, [`mouse::Mouse`] sends button and movement reports,
//! [`hid::usb_hiddev::UsbHiddev`] puts both on the wire through one HID interface.

pub mod hid;
pub mod keyboard;
pub mod mouse;
pub mod quirks;
pub mod shared;
pub mod transmit;

pub use nkro_hid_lib::keycode::{KeyCode, UnrecognizedKey};
pub use nkro_hid_lib::leds::Leds;
pub use nkro_hid_lib::mouse::MouseButtons;
pub use nkro_hid_lib::report::KeyReport;
