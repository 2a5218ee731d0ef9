use nkro_hid_lib::mouse::{MouseButtons, MouseReport};

use crate::transmit::{ReportId, Transmit};

/// Relative mouse. Unlike the keyboard there's no history, every call that
/// changes something sends straight away. The held buttons only change when
/// the host took the report, a rejected press or release can simply be retried.
pub struct Mouse {
    buttons: MouseButtons,
}

impl Mouse {
    pub const fn new() -> Self {
        Self {
            buttons: MouseButtons::NONE,
        }
    }

    /// # Errors
    /// The report was rejected
    pub fn begin<T: Transmit>(&mut self, sink: &mut T) -> Result<(), T::Error> {
        self.end(sink)
    }

    /// Release every button and tell the host.
    /// # Errors
    /// The report was rejected
    pub fn end<T: Transmit>(&mut self, sink: &mut T) -> Result<(), T::Error> {
        self.buttons = MouseButtons::NONE;
        self.move_by(sink, 0, 0, 0)
    }

    /// Press and release `buttons`.
    /// # Errors
    /// One of the two reports was rejected
    pub fn click<T: Transmit>(
        &mut self,
        sink: &mut T,
        buttons: MouseButtons,
    ) -> Result<(), T::Error> {
        self.send_buttons(sink, buttons)?;
        self.buttons = MouseButtons::NONE;
        self.move_by(sink, 0, 0, 0)
    }

    /// # Errors
    /// The report was rejected
    pub fn move_by<T: Transmit>(
        &mut self,
        sink: &mut T,
        x: i8,
        y: i8,
        wheel: i8,
    ) -> Result<(), T::Error> {
        let report = MouseReport {
            buttons: self.buttons,
            x,
            y,
            wheel,
        };
        sink.transmit(ReportId::Mouse, &report.to_bytes())
    }

    /// Replace the held set, sends only if it changed.
    /// # Errors
    /// The report was rejected
    pub fn set_buttons<T: Transmit>(
        &mut self,
        sink: &mut T,
        buttons: MouseButtons,
    ) -> Result<(), T::Error> {
        if buttons == self.buttons {
            return Ok(());
        }
        self.send_buttons(sink, buttons)
    }

    /// Held set only changes once the host took the report.
    fn send_buttons<T: Transmit>(
        &mut self,
        sink: &mut T,
        buttons: MouseButtons,
    ) -> Result<(), T::Error> {
        let report = MouseReport {
            buttons,
            x: 0,
            y: 0,
            wheel: 0,
        };
        sink.transmit(ReportId::Mouse, &report.to_bytes())?;
        self.buttons = buttons;
        Ok(())
    }

    /// # Errors
    /// The report was rejected
    pub fn press<T: Transmit>(
        &mut self,
        sink: &mut T,
        buttons: MouseButtons,
    ) -> Result<(), T::Error> {
        self.set_buttons(sink, self.buttons.union(buttons))
    }

    /// # Errors
    /// The report was rejected
    pub fn release<T: Transmit>(
        &mut self,
        sink: &mut T,
        buttons: MouseButtons,
    ) -> Result<(), T::Error> {
        self.set_buttons(sink, self.buttons.difference(buttons))
    }

    /// True if any of `buttons` is held.
    #[inline]
    #[must_use]
    pub const fn is_pressed(&self, buttons: MouseButtons) -> bool {
        self.buttons.intersects(buttons)
    }

    #[inline]
    #[must_use]
    pub const fn buttons(&self) -> MouseButtons {
        self.buttons
    }
}
