use core::fmt;

/// Report ids of the composite descriptor.
#[repr(u8)]
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ReportId {
    Mouse = 1,
    NkroKeyboard = 8,
}

impl ReportId {
    #[inline]
    #[must_use]
    pub const fn byte(self) -> u8 {
        self as u8
    }
}

/// Moves one report to the host. `Ok` means the endpoint accepted it,
/// the error carries whatever the transport wants to say about why it didn't.
pub trait Transmit {
    type Error;

    /// # Errors
    /// The report was not accepted
    fn transmit(&mut self, report_id: ReportId, payload: &[u8]) -> Result<(), Self::Error>;
}

impl<T: Transmit + ?Sized> Transmit for &mut T {
    type Error = T::Error;

    #[inline]
    fn transmit(&mut self, report_id: ReportId, payload: &[u8]) -> Result<(), Self::Error> {
        (**self).transmit(report_id, payload)
    }
}

/// Which of the keyboard's transmissions failed.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Stage {
    ModifierPrepass,
    FullReport,
}

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct TransmitError<E> {
    pub stage: Stage,
    pub cause: E,
}

impl<E: fmt::Debug> fmt::Display for TransmitError<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.stage {
            Stage::ModifierPrepass => write!(f, "Modifier report rejected: {:?}", self.cause),
            Stage::FullReport => write!(f, "Keyboard report rejected: {:?}", self.cause),
        }
    }
}

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SendOutcome {
    /// At least one report went out and the host is now in sync.
    Sent,
    /// The host already has this state, nothing was transmitted.
    Unchanged,
}

impl SendOutcome {
    #[inline]
    #[must_use]
    pub const fn is_sent(self) -> bool {
        matches!(self, Self::Sent)
    }
}
