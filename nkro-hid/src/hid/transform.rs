//! Boot protocol rendering. Nothing here is sent on its own, firmware that
//! exposes a boot keyboard interface calls [`boot_report`] and pushes the result itself.

use heapless::Vec;
use nkro_hid_lib::keycode::KeyCode;
use nkro_hid_lib::report::KeyReport;
use usbd_hid::descriptor::KeyboardReport;

const BOOT_KEYS: usize = 6;

/// Render the NKRO state as a 6KRO boot protocol report, for hosts (BIOS/UEFI)
/// that don't parse the report descriptor.
/// More than six keys down fills every slot with `ErrorRollOver`.
#[must_use]
pub fn boot_report(report: &KeyReport) -> KeyboardReport {
    let mut keycodes = [0u8; BOOT_KEYS];
    let mut pressed: Vec<u8, BOOT_KEYS> = Vec::new();
    // Usages below A are error codes, never keys
    let overflowed = report
        .pressed_keys()
        .filter(|code| *code >= KeyCode::A)
        .any(|code| pressed.push(code.byte()).is_err());
    if overflowed {
        keycodes = [KeyCode::ERROR_ROLL_OVER.byte(); BOOT_KEYS];
    } else {
        keycodes[..pressed.len()].copy_from_slice(&pressed);
    }
    KeyboardReport {
        modifier: report.modifiers(),
        reserved: 0,
        leds: 0,
        keycodes,
    }
}
