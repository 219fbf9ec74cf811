use crate::utils::bit_ops::{get_bits, set_bits};

pub const REVERSE_SOLUTION: u32 = 1;

pub const STRICTLY_SIMPLE: u32 = 2;

pub const PRESERVE_COLLINEAR: u32 = 4;

const CONFIG_OFFSETS: [u8; 3] = [0, 1, 2];

const CONFIG_BITS: [u8; 3] = [1, 1, 1];

/// Engine options, packable into the classic `InitOptions` bit set.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ClipperConfig {
    pub reverse_solution: bool,
    pub strictly_simple: bool,
    pub preserve_collinear: bool,
}

impl ClipperConfig {
    pub fn new() -> ClipperConfig {
        ClipperConfig::default()
    }

    pub fn deserialize(&mut self, packed: u32) {
        self.reverse_solution = get_bits(packed, CONFIG_OFFSETS[0], CONFIG_BITS[0]) != 0;
        self.strictly_simple = get_bits(packed, CONFIG_OFFSETS[1], CONFIG_BITS[1]) != 0;
        self.preserve_collinear = get_bits(packed, CONFIG_OFFSETS[2], CONFIG_BITS[2]) != 0;
    }

    pub fn serialize(&self) -> u32 {
        let mut result: u32 = 0;

        result = set_bits(
            result,
            self.reverse_solution as u16,
            CONFIG_OFFSETS[0],
            CONFIG_BITS[0],
        );
        result = set_bits(
            result,
            self.strictly_simple as u16,
            CONFIG_OFFSETS[1],
            CONFIG_BITS[1],
        );
        result = set_bits(
            result,
            self.preserve_collinear as u16,
            CONFIG_OFFSETS[2],
            CONFIG_BITS[2],
        );

        result
    }
}

impl From<u32> for ClipperConfig {
    fn from(packed: u32) -> Self {
        let mut config = ClipperConfig::new();
        config.deserialize(packed);
        config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flags_match_init_options() {
        let config = ClipperConfig::from(REVERSE_SOLUTION | PRESERVE_COLLINEAR);
        assert!(config.reverse_solution);
        assert!(!config.strictly_simple);
        assert!(config.preserve_collinear);
        assert_eq!(config.serialize(), 5);
    }

    #[test]
    fn serialize_round_trips_every_combination() {
        for packed in 0..8u32 {
            assert_eq!(ClipperConfig::from(packed).serialize(), packed);
        }
    }
}
