use core::cell::RefCell;
use critical_section::Mutex;

/// A value that a USB interrupt and the main loop can both reach, e.g.
/// `static KEYBOARD: Shared<Keyboard<Delay>> = Shared::new();`.
/// Every access runs inside a critical section.
pub struct Shared<T>(Mutex<RefCell<Option<T>>>);

impl<T> Shared<T> {
    pub const fn new() -> Self {
        Self(Mutex::new(RefCell::new(None)))
    }

    /// Replaces whatever was there before.
    pub fn init(&self, val: T) {
        critical_section::with(|cs| {
            self.0.borrow_ref_mut(cs).replace(val);
        });
    }

    pub fn take(&self) -> Option<T> {
        critical_section::with(|cs| self.0.borrow_ref_mut(cs).take())
    }

    /// Run `func` on the value, `None` if it hasn't been initialized.
    /// # Panics
    /// Re-entrant use from within `func`
    pub fn with<R, F: FnOnce(&mut T) -> R>(&self, func: F) -> Option<R> {
        critical_section::with(|cs| self.0.borrow_ref_mut(cs).as_mut().map(func))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keyboard::tests::{RecordedDelay, Recorder};
    use crate::keyboard::Keyboard;
    use crate::quirks::Quirks;
    use crate::transmit::SendOutcome;
    use nkro_hid_lib::keycode::KeyCode;

    static KEYBOARD: Shared<Keyboard<RecordedDelay>> = Shared::new();

    #[test]
    fn shares_keyboard() {
        assert!(KEYBOARD.with(|kbd| kbd.release_all()).is_none());
        KEYBOARD.init(Keyboard::new(RecordedDelay::default(), Quirks::PREPASS));
        KEYBOARD.with(|kbd| kbd.press(KeyCode::A)).unwrap().unwrap();
        let mut rec = Recorder::default();
        let sent = KEYBOARD.with(|kbd| kbd.send_report(&mut rec)).unwrap();
        assert_eq!(Ok(SendOutcome::Sent), sent);
        assert_eq!(1, rec.sent.len());
        let kbd = KEYBOARD.take().unwrap();
        assert!(kbd.last_sent().is_pressed(KeyCode::A));
        assert!(KEYBOARD.take().is_none());
    }
}
