use embedded_hal::delay::DelayNs;
use nkro_hid_lib::keycode::{KeyCode, UnrecognizedKey};
use nkro_hid_lib::report::KeyReport;

use crate::quirks::Quirks;
use crate::transmit::{ReportId, SendOutcome, Stage, Transmit, TransmitError};

/// NKRO keyboard report state for one endpoint.
///
/// `current` is what the caller wants the host to see, `last_sent` is what the host
/// is known to have. `last_sent` only moves after the transport accepted a report,
/// so a rejected send is retried by simply calling [`Keyboard::send_report`] again.
pub struct Keyboard<D> {
    current: KeyReport,
    last_sent: KeyReport,
    quirks: Quirks,
    delay: D,
}

impl<D: DelayNs> Keyboard<D> {
    pub const fn new(delay: D, quirks: Quirks) -> Self {
        Self {
            current: KeyReport::EMPTY,
            last_sent: KeyReport::EMPTY,
            quirks,
            delay,
        }
    }

    /// Clear all keys and tell the host, whatever it thought it had.
    /// Matters for bridges where the host side stays up while this side resets.
    /// # Errors
    /// The empty report was rejected, `last_sent` keeps its old value
    pub fn begin<T: Transmit>(&mut self, sink: &mut T) -> Result<(), T::Error> {
        self.release_all();
        self.send_report_unchecked(sink)
    }

    /// # Errors
    /// The empty report was rejected, `last_sent` keeps its old value
    pub fn end<T: Transmit>(&mut self, sink: &mut T) -> Result<(), T::Error> {
        self.release_all();
        self.send_report_unchecked(sink)
    }

    /// # Errors
    /// The code has no bit in the report
    #[inline]
    pub fn press(&mut self, code: KeyCode) -> Result<(), UnrecognizedKey> {
        self.current.press(code)
    }

    /// # Errors
    /// The code has no bit in the report
    #[inline]
    pub fn release(&mut self, code: KeyCode) -> Result<(), UnrecognizedKey> {
        self.current.release(code)
    }

    #[inline]
    pub fn release_all(&mut self) {
        self.current.release_all();
    }

    /// Whether `code` is a modifier held in the report that will go out next.
    #[inline]
    #[must_use]
    pub const fn is_modifier_active(&self, code: KeyCode) -> bool {
        self.current.is_modifier_active(code)
    }

    /// Whether `code` is a modifier held in the report the host last accepted.
    #[inline]
    #[must_use]
    pub const fn was_modifier_active(&self, code: KeyCode) -> bool {
        self.last_sent.is_modifier_active(code)
    }

    #[inline]
    #[must_use]
    pub const fn current(&self) -> &KeyReport {
        &self.current
    }

    #[inline]
    #[must_use]
    pub const fn last_sent(&self) -> &KeyReport {
        &self.last_sent
    }

    #[inline]
    #[must_use]
    pub const fn quirks(&self) -> Quirks {
        self.quirks
    }

    #[inline]
    pub fn set_quirks(&mut self, quirks: Quirks) {
        self.quirks = quirks;
    }

    /// Bring the host up to date with `current`, sending nothing if it already is.
    ///
    /// When the modifiers changed, a report with the old keys and the new modifiers
    /// goes out first, followed by the full report if the keys changed too.
    /// A modifier-only change is fully delivered by that first report, which still
    /// counts as [`SendOutcome::Sent`].
    /// # Errors
    /// One of the reports was rejected, the [`Stage`] says which. Nothing from the
    /// failed report is committed to `last_sent`.
    pub fn send_report<T: Transmit>(
        &mut self,
        sink: &mut T,
    ) -> Result<SendOutcome, TransmitError<T::Error>> {
        let mut outcome = SendOutcome::Unchanged;
        if self.quirks.modifier_prepass && self.current.modifiers() != self.last_sent.modifiers()
        {
            self.send_modifier_prepass(sink)?;
            outcome = SendOutcome::Sent;
        }
        // Guard so that calling this in a tight loop doesn't spam the host
        if self.current == self.last_sent {
            return Ok(outcome);
        }
        let report = self.current;
        transmit_report(sink, &report).map_err(|cause| {
            #[cfg(feature = "defmt")]
            defmt::debug!("Keyboard report rejected");
            TransmitError {
                stage: Stage::FullReport,
                cause,
            }
        })?;
        self.last_sent = report;
        Ok(SendOutcome::Sent)
    }

    /// Send `current` as is, regardless of what the host has.
    /// # Errors
    /// The report was rejected, `last_sent` keeps its old value
    pub fn send_report_unchecked<T: Transmit>(&mut self, sink: &mut T) -> Result<(), T::Error> {
        let report = self.current;
        transmit_report(sink, &report)?;
        self.last_sent = report;
        Ok(())
    }

    fn send_modifier_prepass<T: Transmit>(
        &mut self,
        sink: &mut T,
    ) -> Result<(), TransmitError<T::Error>> {
        let keys_changed = !self.current.same_keys(&self.last_sent);
        let intermediate = self.last_sent.with_modifiers(self.current.modifiers());
        transmit_report(sink, &intermediate).map_err(|cause| {
            #[cfg(feature = "defmt")]
            defmt::debug!("Modifier report rejected");
            TransmitError {
                stage: Stage::ModifierPrepass,
                cause,
            }
        })?;
        self.last_sent = intermediate;
        if let Some(delay) = self.quirks.modifier_delay {
            if delay.applies(keys_changed) {
                self.delay.delay_us(delay.duration.to_micros());
            }
        }
        Ok(())
    }
}

#[inline]
fn transmit_report<T: Transmit>(sink: &mut T, report: &KeyReport) -> Result<(), T::Error> {
    sink.transmit(ReportId::NkroKeyboard, &report.to_bytes())
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::quirks::{DelayTrigger, ModifierDelay};
    use fugit::MicrosDurationU32;
    use nkro_hid_lib::report::REPORT_LEN;

    #[derive(Default)]
    pub(crate) struct Recorder {
        pub(crate) sent: Vec<(ReportId, Vec<u8>)>,
        /// Reject the n:th transmission (0-indexed)
        pub(crate) reject: Option<usize>,
        attempts: usize,
    }

    impl Recorder {
        pub(crate) fn rejecting(nth: usize) -> Self {
            Self {
                reject: Some(nth),
                ..Self::default()
            }
        }

        fn keyboard(&self, ind: usize) -> KeyReport {
            let (id, bytes) = &self.sent[ind];
            assert_eq!(ReportId::NkroKeyboard, *id);
            let bytes: [u8; REPORT_LEN] = bytes.as_slice().try_into().unwrap();
            KeyReport::from_bytes(&bytes)
        }
    }

    impl Transmit for Recorder {
        type Error = &'static str;

        fn transmit(&mut self, report_id: ReportId, payload: &[u8]) -> Result<(), Self::Error> {
            let attempt = self.attempts;
            self.attempts += 1;
            if self.reject == Some(attempt) {
                return Err("busy");
            }
            self.sent.push((report_id, payload.to_vec()));
            Ok(())
        }
    }

    #[derive(Default)]
    pub(crate) struct RecordedDelay {
        pub(crate) nanos: u64,
        pub(crate) calls: usize,
    }

    impl DelayNs for RecordedDelay {
        fn delay_ns(&mut self, ns: u32) {
            self.nanos += u64::from(ns);
            self.calls += 1;
        }
    }

    fn keyboard(quirks: Quirks) -> Keyboard<RecordedDelay> {
        Keyboard::new(RecordedDelay::default(), quirks)
    }

    #[test]
    fn dedups_repeated_sends() {
        let mut kbd = keyboard(Quirks::PREPASS);
        let mut rec = Recorder::default();
        assert_eq!(Ok(SendOutcome::Unchanged), kbd.send_report(&mut rec));
        kbd.press(KeyCode::A).unwrap();
        assert_eq!(Ok(SendOutcome::Sent), kbd.send_report(&mut rec));
        assert_eq!(Ok(SendOutcome::Unchanged), kbd.send_report(&mut rec));
        assert_eq!(Ok(SendOutcome::Unchanged), kbd.send_report(&mut rec));
        assert_eq!(1, rec.sent.len());
        assert!(rec.keyboard(0).is_pressed(KeyCode::A));
        assert_eq!(kbd.current(), kbd.last_sent());
    }

    #[test]
    fn modifier_change_goes_out_first() {
        let mut kbd = keyboard(Quirks::PREPASS);
        let mut rec = Recorder::default();
        kbd.press(KeyCode::LEFT_SHIFT).unwrap();
        kbd.press(KeyCode::LEFT_BRACKET).unwrap();
        assert_eq!(Ok(SendOutcome::Sent), kbd.send_report(&mut rec));
        assert_eq!(2, rec.sent.len());

        let first = rec.keyboard(0);
        assert!(first.is_modifier_active(KeyCode::LEFT_SHIFT));
        assert!(!first.is_pressed(KeyCode::LEFT_BRACKET));
        assert!(first.same_keys(&KeyReport::EMPTY));

        let second = rec.keyboard(1);
        assert_eq!(*kbd.current(), second);
        assert_eq!(*kbd.last_sent(), second);
        assert!(kbd.was_modifier_active(KeyCode::LEFT_SHIFT));
    }

    #[test]
    fn modifier_only_change_sends_once() {
        let mut kbd = keyboard(Quirks::PREPASS);
        let mut rec = Recorder::default();
        kbd.press(KeyCode::Z).unwrap();
        kbd.send_report(&mut rec).unwrap();
        kbd.press(KeyCode::RIGHT_CTRL).unwrap();
        assert_eq!(Ok(SendOutcome::Sent), kbd.send_report(&mut rec));
        assert_eq!(2, rec.sent.len());
        assert_eq!(*kbd.current(), rec.keyboard(1));
        assert_eq!(Ok(SendOutcome::Unchanged), kbd.send_report(&mut rec));
    }

    #[test]
    fn modifier_release_goes_out_first() {
        let mut kbd = keyboard(Quirks::PREPASS);
        let mut rec = Recorder::default();
        kbd.press(KeyCode::LEFT_SHIFT).unwrap();
        kbd.press(KeyCode::N1).unwrap();
        kbd.send_report(&mut rec).unwrap();
        kbd.release_all();
        kbd.send_report(&mut rec).unwrap();
        assert_eq!(4, rec.sent.len());
        let unshifted = rec.keyboard(2);
        assert_eq!(0, unshifted.modifiers());
        assert!(unshifted.is_pressed(KeyCode::N1));
        assert!(rec.keyboard(3).is_empty());
    }

    #[test]
    fn without_prepass_sends_combined() {
        let mut kbd = keyboard(Quirks::NONE);
        let mut rec = Recorder::default();
        kbd.press(KeyCode::LEFT_SHIFT).unwrap();
        kbd.press(KeyCode::LEFT_BRACKET).unwrap();
        assert_eq!(Ok(SendOutcome::Sent), kbd.send_report(&mut rec));
        assert_eq!(1, rec.sent.len());
        assert_eq!(*kbd.current(), rec.keyboard(0));
    }

    #[test]
    fn failed_prepass_commits_nothing() {
        let mut kbd = keyboard(Quirks::PREPASS);
        let mut rec = Recorder::rejecting(0);
        kbd.press(KeyCode::LEFT_SHIFT).unwrap();
        kbd.press(KeyCode::LEFT_BRACKET).unwrap();
        assert_eq!(
            Err(TransmitError {
                stage: Stage::ModifierPrepass,
                cause: "busy"
            }),
            kbd.send_report(&mut rec)
        );
        assert!(rec.sent.is_empty());
        assert_eq!(0, kbd.last_sent().modifiers());
        assert!(!kbd.was_modifier_active(KeyCode::LEFT_SHIFT));
        assert!(kbd.last_sent().is_empty());

        // Next cycle retries the whole delta
        assert_eq!(Ok(SendOutcome::Sent), kbd.send_report(&mut rec));
        assert_eq!(2, rec.sent.len());
        assert!(rec.keyboard(0).same_keys(&KeyReport::EMPTY));
        assert_eq!(*kbd.current(), rec.keyboard(1));
    }

    #[test]
    fn failed_full_report_keeps_prepass() {
        let mut kbd = keyboard(Quirks::PREPASS);
        let mut rec = Recorder::rejecting(1);
        kbd.press(KeyCode::LEFT_SHIFT).unwrap();
        kbd.press(KeyCode::LEFT_BRACKET).unwrap();
        assert_eq!(
            Err(TransmitError {
                stage: Stage::FullReport,
                cause: "busy"
            }),
            kbd.send_report(&mut rec)
        );
        // The host did get the modifier
        assert!(kbd.was_modifier_active(KeyCode::LEFT_SHIFT));
        assert!(!kbd.last_sent().is_pressed(KeyCode::LEFT_BRACKET));
        assert_eq!(Ok(SendOutcome::Sent), kbd.send_report(&mut rec));
        assert_eq!(2, rec.sent.len());
        assert_eq!(*kbd.current(), rec.keyboard(1));
    }

    #[test]
    fn failed_send_is_retried() {
        let mut kbd = keyboard(Quirks::PREPASS);
        let mut rec = Recorder::rejecting(0);
        kbd.press(KeyCode::SPACE).unwrap();
        assert!(kbd.send_report(&mut rec).is_err());
        assert!(kbd.last_sent().is_empty());
        assert_eq!(Ok(SendOutcome::Sent), kbd.send_report(&mut rec));
        assert_eq!(*kbd.current(), *kbd.last_sent());
    }

    #[test]
    fn delays_between_modifier_and_keys() {
        let quirks = Quirks {
            modifier_prepass: true,
            modifier_delay: Some(ModifierDelay {
                duration: MicrosDurationU32::millis(5),
                trigger: DelayTrigger::KeysChanged,
            }),
        };
        let mut kbd = keyboard(quirks);
        let mut rec = Recorder::default();
        kbd.press(KeyCode::LEFT_SHIFT).unwrap();
        kbd.send_report(&mut rec).unwrap();
        assert_eq!(0, kbd.delay.calls, "Only modifiers changed");

        kbd.press(KeyCode::RIGHT_ALT).unwrap();
        kbd.press(KeyCode::A).unwrap();
        kbd.send_report(&mut rec).unwrap();
        assert_eq!(5_000_000, kbd.delay.nanos);

        // Keys only, no prepass and no wait
        kbd.release(KeyCode::A).unwrap();
        kbd.send_report(&mut rec).unwrap();
        assert_eq!(5_000_000, kbd.delay.nanos);
        assert_eq!(4, rec.sent.len());
    }

    #[test]
    fn always_delay() {
        let quirks = Quirks {
            modifier_prepass: true,
            modifier_delay: Some(ModifierDelay {
                duration: MicrosDurationU32::micros(300),
                trigger: DelayTrigger::Always,
            }),
        };
        let mut kbd = keyboard(quirks);
        let mut rec = Recorder::default();
        kbd.press(KeyCode::LEFT_GUI).unwrap();
        kbd.send_report(&mut rec).unwrap();
        assert_eq!(300_000, kbd.delay.nanos);
    }

    #[test]
    fn no_delay_after_rejected_prepass() {
        let mut kbd = keyboard(Quirks::REMOTE_DESKTOP);
        let mut rec = Recorder::rejecting(0);
        kbd.press(KeyCode::LEFT_SHIFT).unwrap();
        kbd.press(KeyCode::A).unwrap();
        assert!(kbd.send_report(&mut rec).is_err());
        assert_eq!(0, kbd.delay.calls);
    }

    #[test]
    fn begin_and_end_reset() {
        let mut kbd = keyboard(Quirks::PREPASS);
        let mut rec = Recorder::default();
        kbd.press(KeyCode::A).unwrap();
        kbd.press(KeyCode::LEFT_CTRL).unwrap();
        kbd.send_report(&mut rec).unwrap();
        kbd.press(KeyCode::Z).unwrap();

        kbd.end(&mut rec).unwrap();
        assert!(rec.keyboard(rec.sent.len() - 1).is_empty());
        assert!(kbd.current().is_empty());
        assert!(kbd.last_sent().is_empty());

        let sent = rec.sent.len();
        kbd.begin(&mut rec).unwrap();
        assert_eq!(sent + 1, rec.sent.len(), "Sent even though nothing changed");
        assert!(rec.keyboard(sent).is_empty());
        assert!(kbd.current().is_empty());
        assert!(kbd.last_sent().is_empty());
    }

    #[test]
    fn failed_begin_keeps_history() {
        let mut kbd = keyboard(Quirks::PREPASS);
        let mut rec = Recorder::rejecting(1);
        kbd.press(KeyCode::ENTER).unwrap();
        kbd.send_report(&mut rec).unwrap();
        assert_eq!(Err("busy"), kbd.begin(&mut rec));
        assert!(kbd.current().is_empty());
        assert!(kbd.last_sent().is_pressed(KeyCode::ENTER));
        assert_eq!(Ok(SendOutcome::Sent), kbd.send_report(&mut rec));
        assert!(rec.keyboard(1).is_empty());
    }

    #[test]
    fn unchecked_ignores_history() {
        let mut kbd = keyboard(Quirks::PREPASS);
        let mut rec = Recorder::default();
        kbd.send_report_unchecked(&mut rec).unwrap();
        kbd.send_report_unchecked(&mut rec).unwrap();
        assert_eq!(2, rec.sent.len());
        assert_eq!(REPORT_LEN, rec.sent[0].1.len());
    }

    #[test]
    fn unrecognized_press_changes_nothing() {
        let mut kbd = keyboard(Quirks::PREPASS);
        let mut rec = Recorder::default();
        assert_eq!(Err(UnrecognizedKey(KeyCode(0xF0))), kbd.press(KeyCode(0xF0)));
        assert_eq!(Err(UnrecognizedKey(KeyCode(0xDE))), kbd.release(KeyCode(0xDE)));
        assert_eq!(Ok(SendOutcome::Unchanged), kbd.send_report(&mut rec));
        assert!(rec.sent.is_empty());
    }

    #[test]
    fn modifier_queries() {
        let mut kbd = keyboard(Quirks::PREPASS);
        let mut rec = Recorder::default();
        kbd.press(KeyCode::RIGHT_SHIFT).unwrap();
        assert!(kbd.is_modifier_active(KeyCode::RIGHT_SHIFT));
        assert!(!kbd.was_modifier_active(KeyCode::RIGHT_SHIFT));
        assert!(!kbd.is_modifier_active(KeyCode::A));
        kbd.send_report(&mut rec).unwrap();
        assert!(kbd.was_modifier_active(KeyCode::RIGHT_SHIFT));
        assert!(!kbd.was_modifier_active(KeyCode(0xFF)));
    }
}
