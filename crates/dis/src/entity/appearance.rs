use bitflags::bitflags;
use serde::{Deserialize, Serialize};

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct AppearanceFlags: u32 {
        const DECK_LIGHTS = 1 << 2;
    }
}

/// 32-bit Entity Appearance record as used on the EMSN.
///
/// Besides the deck-lights flag the EMSN packs two 3-bit enumerations into
/// the record: navigation lights (bits 13-15) and navigation shapes
/// (bits 5-7).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "u32", into = "u32")]
pub struct Appearance(u32);

impl Appearance {
    const NAV_LIGHTS_SHIFT: u32 = 13;
    const NAV_SHAPES_SHIFT: u32 = 5;
    const FIELD_MASK: u32 = 0b111;

    pub const fn from_bits(bits: u32) -> Self {
        Self(bits)
    }

    pub const fn bits(self) -> u32 {
        self.0
    }

    pub fn flags(self) -> AppearanceFlags {
        AppearanceFlags::from_bits_truncate(self.0)
    }

    pub fn deck_lights(self) -> bool {
        self.flags().contains(AppearanceFlags::DECK_LIGHTS)
    }

    pub fn set_deck_lights(&mut self, on: bool) {
        if on {
            self.0 |= AppearanceFlags::DECK_LIGHTS.bits();
        } else {
            self.0 &= !AppearanceFlags::DECK_LIGHTS.bits();
        }
    }

    pub fn navigation_lights(self) -> u8 {
        self.field(Self::NAV_LIGHTS_SHIFT)
    }

    /// Values above 7 are masked to the low three bits.
    pub fn set_navigation_lights(&mut self, value: u8) {
        self.set_field(Self::NAV_LIGHTS_SHIFT, value);
    }

    pub fn navigation_shapes(self) -> u8 {
        self.field(Self::NAV_SHAPES_SHIFT)
    }

    pub fn set_navigation_shapes(&mut self, value: u8) {
        self.set_field(Self::NAV_SHAPES_SHIFT, value);
    }

    pub fn with_deck_lights(mut self, on: bool) -> Self {
        self.set_deck_lights(on);
        self
    }

    pub fn with_navigation_lights(mut self, value: u8) -> Self {
        self.set_navigation_lights(value);
        self
    }

    pub fn with_navigation_shapes(mut self, value: u8) -> Self {
        self.set_navigation_shapes(value);
        self
    }

    fn field(self, shift: u32) -> u8 {
        ((self.0 >> shift) & Self::FIELD_MASK) as u8
    }

    fn set_field(&mut self, shift: u32, value: u8) {
        self.0 &= !(Self::FIELD_MASK << shift);
        self.0 |= (u32::from(value) & Self::FIELD_MASK) << shift;
    }
}

impl From<u32> for Appearance {
    fn from(bits: u32) -> Self {
        Self(bits)
    }
}

impl From<Appearance> for u32 {
    fn from(appearance: Appearance) -> Self {
        appearance.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_all_zero() {
        assert_eq!(Appearance::default().bits(), 0);
    }

    #[test]
    fn lights_and_shapes_layout() {
        let appearance = Appearance::default()
            .with_deck_lights(true)
            .with_navigation_lights(1)
            .with_navigation_shapes(3);

        // MSB-first rendering used by the EMSN interface description.
        let rendered = format!("{:032b}", appearance.bits());
        let mut expected = ['0'; 32];
        expected[29] = '1';
        expected[16..19].copy_from_slice(&['0', '0', '1']);
        expected[24..27].copy_from_slice(&['0', '1', '1']);
        assert_eq!(rendered, expected.iter().collect::<String>());

        assert!(appearance.deck_lights());
        assert_eq!(appearance.navigation_lights(), 1);
        assert_eq!(appearance.navigation_shapes(), 3);
    }

    #[test]
    fn fields_do_not_bleed() {
        let mut appearance = Appearance::from_bits(u32::MAX);
        appearance.set_navigation_lights(0);
        assert_eq!(appearance.navigation_lights(), 0);
        assert_eq!(appearance.navigation_shapes(), 7);
        assert!(appearance.deck_lights());

        appearance.set_navigation_shapes(9);
        assert_eq!(appearance.navigation_shapes(), 1);
    }
}
