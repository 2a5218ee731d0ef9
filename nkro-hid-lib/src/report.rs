use crate::keycode::{KeyCode, KeySlot, UnrecognizedKey, FIRST_MODIFIER, KEY_BYTES, LAST_KEY};

/// Size of a serialized [`KeyReport`], excluding the report id.
pub const REPORT_LEN: usize = 1 + KEY_BYTES;

/// NKRO keyboard report body, modifier byte followed by one bit per keycode.
/// The layout has to match the keyboard collection of the report descriptor bit for bit.
#[repr(C)]
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct KeyReport {
    modifiers: u8,
    keys: [u8; KEY_BYTES],
}

impl Default for KeyReport {
    #[inline]
    fn default() -> Self {
        Self::EMPTY
    }
}

impl KeyReport {
    pub const EMPTY: Self = Self {
        modifiers: 0,
        keys: [0u8; KEY_BYTES],
    };

    #[inline]
    #[must_use]
    pub const fn new() -> Self {
        Self::EMPTY
    }

    /// Set the bit for `code`.
    /// # Errors
    /// The code has no bit in the report, the report is left untouched
    #[inline]
    pub fn press(&mut self, code: KeyCode) -> Result<(), UnrecognizedKey> {
        match code.slot() {
            Some(KeySlot::Key { byte, mask }) => self.keys[byte] |= mask,
            Some(KeySlot::Modifier(mask)) => self.modifiers |= mask,
            None => return Err(UnrecognizedKey(code)),
        }
        Ok(())
    }

    /// Clear the bit for `code`.
    /// # Errors
    /// The code has no bit in the report, the report is left untouched
    #[inline]
    pub fn release(&mut self, code: KeyCode) -> Result<(), UnrecognizedKey> {
        match code.slot() {
            Some(KeySlot::Key { byte, mask }) => self.keys[byte] &= !mask,
            Some(KeySlot::Modifier(mask)) => self.modifiers &= !mask,
            None => return Err(UnrecognizedKey(code)),
        }
        Ok(())
    }

    #[inline]
    pub fn release_all(&mut self) {
        *self = Self::EMPTY;
    }

    #[inline]
    #[must_use]
    pub fn is_pressed(&self, code: KeyCode) -> bool {
        match code.slot() {
            Some(KeySlot::Key { byte, mask }) => self.keys[byte] & mask != 0,
            Some(KeySlot::Modifier(mask)) => self.modifiers & mask != 0,
            None => false,
        }
    }

    /// False for anything that isn't a modifier.
    #[inline]
    #[must_use]
    pub const fn is_modifier_active(&self, code: KeyCode) -> bool {
        match code.modifier_mask() {
            Some(mask) => self.modifiers & mask != 0,
            None => false,
        }
    }

    #[inline]
    #[must_use]
    pub const fn modifiers(&self) -> u8 {
        self.modifiers
    }

    #[inline]
    #[must_use]
    pub const fn keys(&self) -> &[u8; KEY_BYTES] {
        &self.keys
    }

    /// Same key bits, modifier byte replaced.
    #[inline]
    #[must_use]
    pub const fn with_modifiers(self, modifiers: u8) -> Self {
        Self {
            modifiers,
            keys: self.keys,
        }
    }

    #[inline]
    #[must_use]
    pub fn same_keys(&self, other: &Self) -> bool {
        self.keys == other.keys
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        *self == Self::EMPTY
    }

    /// Pressed non-modifier keycodes in ascending order.
    pub fn pressed_keys(&self) -> impl Iterator<Item = KeyCode> + '_ {
        (0..=LAST_KEY)
            .map(KeyCode)
            .filter(|code| self.is_pressed(*code))
    }

    /// Pressed modifier keycodes in ascending order.
    pub fn pressed_modifiers(&self) -> impl Iterator<Item = KeyCode> + '_ {
        (0..8u8)
            .filter(|bit| self.modifiers & (1u8 << bit) != 0)
            .map(|bit| KeyCode(FIRST_MODIFIER + bit))
    }

    #[must_use]
    pub fn to_bytes(&self) -> [u8; REPORT_LEN] {
        let mut out = [0u8; REPORT_LEN];
        out[0] = self.modifiers;
        out[1..].copy_from_slice(&self.keys);
        out
    }

    #[must_use]
    pub fn from_bytes(bytes: &[u8; REPORT_LEN]) -> Self {
        let mut keys = [0u8; KEY_BYTES];
        keys.copy_from_slice(&bytes[1..]);
        Self {
            modifiers: bytes[0],
            keys,
        }
    }
}
