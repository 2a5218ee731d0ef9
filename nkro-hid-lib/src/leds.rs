/// Keyboard LED state as written by the host in the keyboard output report.
#[repr(transparent)]
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Leds(u8);

impl Leds {
    pub const NUM_LOCK: Self = Self(1 << 0);
    pub const CAPS_LOCK: Self = Self(1 << 1);
    pub const SCROLL_LOCK: Self = Self(1 << 2);
    pub const COMPOSE: Self = Self(1 << 3);
    pub const KANA: Self = Self(1 << 4);
    pub const POWER: Self = Self(1 << 5);
    pub const SHIFT: Self = Self(1 << 6);
    pub const DO_NOT_DISTURB: Self = Self(1 << 7);

    #[inline]
    #[must_use]
    pub const fn from_bits(bits: u8) -> Self {
        Self(bits)
    }

    #[inline]
    #[must_use]
    pub const fn bits(self) -> u8 {
        self.0
    }

    #[inline]
    #[must_use]
    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    /// Parse a `[report_id, leds]` output report, `None` if it's addressed elsewhere or truncated.
    #[must_use]
    pub fn from_output_report(data: &[u8], report_id: u8) -> Option<Self> {
        match data {
            [id, leds, ..] if *id == report_id => Some(Self(*leds)),
            _ => None,
        }
    }
}

impl core::ops::BitOr for Leds {
    type Output = Self;

    #[inline]
    fn bitor(self, rhs: Self) -> Self::Output {
        Self(self.0 | rhs.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_output_report() {
        let leds = Leds::from_output_report(&[8, 0b0000_0011], 8).unwrap();
        assert!(leds.contains(Leds::NUM_LOCK));
        assert!(leds.contains(Leds::CAPS_LOCK));
        assert!(leds.contains(Leds::NUM_LOCK | Leds::CAPS_LOCK));
        assert!(!leds.contains(Leds::SCROLL_LOCK));
        assert_eq!(None, Leds::from_output_report(&[2, 0b0000_0011], 8));
        assert_eq!(None, Leds::from_output_report(&[8], 8));
        assert_eq!(None, Leds::from_output_report(&[], 8));
    }
}
