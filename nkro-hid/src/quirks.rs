use fugit::MicrosDurationU32;

/// Host workarounds applied by [`crate::keyboard::Keyboard::send_report`].
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct Quirks {
    /// Send a modifier-only report ahead of a report that changes modifiers.
    /// Some ChromeOS versions drop the modifier when it arrives together with the
    /// key, so `shift` + `[` doesn't produce `{`.
    pub modifier_prepass: bool,
    /// Wait after the modifier-only report, only consulted when the prepass is on.
    pub modifier_delay: Option<ModifierDelay>,
}

impl Quirks {
    pub const NONE: Self = Self {
        modifier_prepass: false,
        modifier_delay: None,
    };

    pub const PREPASS: Self = Self {
        modifier_prepass: true,
        modifier_delay: None,
    };

    /// Prepass plus the delay needed by Windows Remote Desktop, which merges
    /// reports that arrive within the same frame.
    pub const REMOTE_DESKTOP: Self = Self {
        modifier_prepass: true,
        modifier_delay: Some(ModifierDelay::REMOTE_DESKTOP),
    };
}

impl Default for Quirks {
    #[inline]
    fn default() -> Self {
        Self::PREPASS
    }
}

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum DelayTrigger {
    /// Only when the key bits change in the same report as the modifiers.
    KeysChanged,
    /// After every modifier-only report.
    Always,
}

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct ModifierDelay {
    pub duration: MicrosDurationU32,
    pub trigger: DelayTrigger,
}

impl ModifierDelay {
    pub const REMOTE_DESKTOP: Self = Self {
        duration: MicrosDurationU32::millis(25),
        trigger: DelayTrigger::KeysChanged,
    };

    #[inline]
    #[must_use]
    pub const fn applies(&self, keys_changed: bool) -> bool {
        match self.trigger {
            DelayTrigger::KeysChanged => keys_changed,
            DelayTrigger::Always => true,
        }
    }
}
