#[inline(always)]
fn get_mask(bit_count: u8, offset: u8) -> u32 {
    ((1u32 << bit_count) - 1) << offset
}

#[inline(always)]
pub fn set_bits(source: u32, value: u16, index: u8, bit_count: u8) -> u32 {
    let mask = get_mask(bit_count, index);
    (source & !mask) | (((value as u32) << index) & mask)
}

#[inline(always)]
pub fn get_bits(source: u32, index: u8, num_bits: u8) -> u16 {
    ((source >> index) & get_mask(num_bits, 0)) as u16
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_then_get_single_flags() {
        let mut packed = 0;
        packed = set_bits(packed, 1, 0, 1);
        packed = set_bits(packed, 1, 2, 1);
        assert_eq!(packed, 0b101);
        assert_eq!(get_bits(packed, 0, 1), 1);
        assert_eq!(get_bits(packed, 1, 1), 0);
        assert_eq!(get_bits(packed, 2, 1), 1);
    }

    #[test]
    fn set_bits_overwrites_only_its_field() {
        let packed = set_bits(0xFFFF_FFFF, 0, 4, 4);
        assert_eq!(packed, 0xFFFF_FF0F);
        assert_eq!(get_bits(packed, 4, 4), 0);
        assert_eq!(get_bits(packed, 8, 8), 0xFF);
    }
}
