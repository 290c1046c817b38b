//! Common types and utilities for the PPU
//!
//! This module defines type aliases matching Game Boy hardware specifications
//! and provides bit manipulation utilities.

/// 8-bit unsigned integer (Game Boy byte)
pub type Byte = u8;

/// 16-bit unsigned integer (Game Boy word)
pub type Word = u16;

/// Check if a specific bit is set in a byte value
///
/// # Arguments
/// * `value` - The byte value to check
/// * `n` - The bit position (0-7)
#[inline]
pub fn bit(value: Byte, n: u8) -> bool {
    (value & (1 << n)) != 0
}

/// Set or clear a specific bit in a byte value
#[inline]
pub fn bit_set(value: &mut Byte, n: u8, on: bool) {
    if on {
        *value |= 1 << n;
    } else {
        *value &= !(1 << n);
    }
}

/// Check if a value is within a range (inclusive)
#[inline]
pub fn between(value: Word, low: Word, high: Word) -> bool {
    value >= low && value <= high
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bit() {
        assert!(bit(0b00000001, 0));
        assert!(!bit(0b00000001, 1));
        assert!(bit(0b10000000, 7));
        assert!(!bit(0b01111111, 7));
    }

    #[test]
    fn test_bit_set() {
        let mut value: Byte = 0;

        bit_set(&mut value, 2, true);
        assert_eq!(value, 0b00000100);

        bit_set(&mut value, 7, true);
        assert_eq!(value, 0b10000100);

        bit_set(&mut value, 2, false);
        assert_eq!(value, 0b10000000);
    }

    #[test]
    fn test_between() {
        assert!(between(0x8000, 0x8000, 0x9FFF));
        assert!(between(0x9FFF, 0x8000, 0x9FFF));
        assert!(!between(0xA000, 0x8000, 0x9FFF));
        assert!(!between(0x7FFF, 0x8000, 0x9FFF));
    }
}
