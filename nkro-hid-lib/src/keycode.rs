use core::fmt;

/// Highest keycode that has a bit in the NKRO bitmap (Keypad Hexadecimal).
pub const LAST_KEY: u8 = 0xDD;
pub const FIRST_MODIFIER: u8 = 0xE0;
pub const LAST_MODIFIER: u8 = 0xE7;

/// Bytes needed to hold one bit per keycode in `0..=LAST_KEY`, plus the
/// trailing descriptor padding that rounds it up to a whole byte.
pub const KEY_BYTES: usize = 28;

const _BITMAP_FITS: () = assert!(
    (LAST_KEY as usize) < KEY_BYTES * 8,
    "Last key doesn't fit in the bitmap"
);

/// A usage id on the HID keyboard/keypad page.
#[repr(transparent)]
#[derive(Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct KeyCode(pub u8);

impl KeyCode {
    pub const ERROR_ROLL_OVER: Self = Self(0x01);
    pub const A: Self = Self(0x04);
    pub const Z: Self = Self(0x1D);
    pub const N1: Self = Self(0x1E);
    pub const ENTER: Self = Self(0x28);
    pub const ESCAPE: Self = Self(0x29);
    pub const SPACE: Self = Self(0x2C);
    pub const LEFT_BRACKET: Self = Self(0x2F);
    pub const RIGHT_BRACKET: Self = Self(0x30);
    pub const BACKSLASH: Self = Self(0x31);
    /// Declared as padding, some Linux drivers choke on it.
    pub const NON_US_POUND: Self = Self(0x32);
    pub const SEMICOLON: Self = Self(0x33);
    pub const CANCEL: Self = Self(0x9B);
    /// Declared as padding, some Linux drivers choke on it.
    pub const CLEAR: Self = Self(0x9C);
    pub const PRIOR: Self = Self(0x9D);
    pub const KEYPAD_HEXADECIMAL: Self = Self(LAST_KEY);

    pub const LEFT_CTRL: Self = Self(0xE0);
    pub const LEFT_SHIFT: Self = Self(0xE1);
    pub const LEFT_ALT: Self = Self(0xE2);
    pub const LEFT_GUI: Self = Self(0xE3);
    pub const RIGHT_CTRL: Self = Self(0xE4);
    pub const RIGHT_SHIFT: Self = Self(0xE5);
    pub const RIGHT_ALT: Self = Self(0xE6);
    pub const RIGHT_GUI: Self = Self(0xE7);

    #[inline]
    #[must_use]
    pub const fn byte(self) -> u8 {
        self.0
    }

    #[inline]
    #[must_use]
    pub const fn is_modifier(self) -> bool {
        self.0 >= FIRST_MODIFIER && self.0 <= LAST_MODIFIER
    }

    /// The modifier byte mask for this code, `None` if it isn't a modifier.
    #[inline]
    #[must_use]
    pub const fn modifier_mask(self) -> Option<u8> {
        if self.is_modifier() {
            Some(1 << (self.0 - FIRST_MODIFIER))
        } else {
            None
        }
    }

    /// Where this code lives in a report, `None` for codes the report can't carry.
    #[inline]
    #[must_use]
    pub const fn slot(self) -> Option<KeySlot> {
        if self.0 <= LAST_KEY {
            Some(KeySlot::Key {
                byte: (self.0 / 8) as usize,
                mask: 1 << (self.0 % 8),
            })
        } else if let Some(mask) = self.modifier_mask() {
            Some(KeySlot::Modifier(mask))
        } else {
            None
        }
    }
}

impl From<u8> for KeyCode {
    #[inline]
    fn from(value: u8) -> Self {
        Self(value)
    }
}

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum KeySlot {
    Key { byte: usize, mask: u8 },
    Modifier(u8),
}

/// The code is neither in the bitmap range nor a modifier.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct UnrecognizedKey(pub KeyCode);

impl fmt::Display for UnrecognizedKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Unrecognized key code {:#04x}", self.0 .0)
    }
}
