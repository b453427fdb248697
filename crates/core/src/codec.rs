// Regen - Register File Generator
// Copyright (C) 2026 Andrii Shylenko
//
// This software is released under the MIT License.
// See the LICENSE file in the project root for full license information.

//! Pure conversions between register words and field values.

use regen_ir::width_mask;

/// Places `field_value` at bits `[offset, offset + width)` of a zero word of `register_width` bits.
pub fn field_value_to_register_value(
    register_width: u32,
    field_value: u64,
    offset: u32,
    width: u32,
) -> u64 {
    let placed = (field_value & width_mask(width))
        .checked_shl(offset)
        .unwrap_or(0);
    placed & width_mask(register_width)
}

/// Extracts bits `[offset, offset + width)` of `register_value`.
pub fn register_value_to_field_value(register_value: u64, offset: u32, width: u32) -> u64 {
    register_value.checked_shr(offset).unwrap_or(0) & width_mask(width)
}

/// Bit mask selected by a byte strobe: byte `i` of the result is `0xff` when strobe bit `i` is set.
pub fn strobe_to_bit_mask(strobe: u64, lanes: u32) -> u64 {
    (0..lanes.min(8))
        .filter(|lane| strobe & (1 << lane) != 0)
        .fold(0, |mask, lane| mask | (0xff << (lane * 8)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_to_register() {
        assert_eq!(field_value_to_register_value(32, 0b101, 4, 3), 0b1010000);
        assert_eq!(field_value_to_register_value(32, 0xff, 0, 4), 0xf);
        assert_eq!(field_value_to_register_value(8, 0b11, 7, 2), 0x80);
        assert_eq!(field_value_to_register_value(64, 1, 63, 1), 1 << 63);
        assert_eq!(field_value_to_register_value(64, 1, 64, 1), 0);
    }

    #[test]
    fn test_register_to_field() {
        assert_eq!(register_value_to_field_value(0b1010000, 4, 3), 0b101);
        assert_eq!(register_value_to_field_value(0xdead_beef, 16, 16), 0xdead);
        assert_eq!(register_value_to_field_value(u64::MAX, 0, 64), u64::MAX);
        assert_eq!(register_value_to_field_value(u64::MAX, 64, 4), 0);
    }

    #[test]
    fn test_strobe_mask() {
        assert_eq!(strobe_to_bit_mask(0b0001, 4), 0x0000_00ff);
        assert_eq!(strobe_to_bit_mask(0b1010, 4), 0xff00_ff00);
        assert_eq!(strobe_to_bit_mask(0b1111_0000, 4), 0);
        assert_eq!(strobe_to_bit_mask(0xff, 8), u64::MAX);
    }
}
