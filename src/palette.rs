//! Palettes
//!
//! Game Boy Color palette RAM and colour conversion.
//!
//! CGB palette registers:
//! - BCPS (0xFF68): BG palette index (bits 0-5) + auto-increment (bit 7)
//! - BCPD (0xFF69): BG palette data at the current index
//! - OCPS (0xFF6A): OBJ palette index
//! - OCPD (0xFF6B): OBJ palette data

use crate::common::{bit, Byte};

/// Auto-increment flag of BCPS/OCPS
const AUTO_INCREMENT: Byte = 0x80;

/// Index bits of BCPS/OCPS
const INDEX_MASK: Byte = 0x3F;

/// Eight palettes of four RGB555 colours
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CgbPalettes {
    colors: [[u16; 4]; 8],
}

impl Default for CgbPalettes {
    fn default() -> Self {
        Self::new()
    }
}

impl CgbPalettes {
    /// Palette RAM powers up white
    pub fn new() -> Self {
        Self {
            colors: [[0x7FFF; 4]; 8],
        }
    }

    /// RGB555 value of `color` in `palette`
    pub fn color(&self, palette: u8, color: u8) -> u16 {
        self.colors[(palette & 0x07) as usize][(color & 0x03) as usize]
    }

    /// ARGB8888 value of `color` in `palette`
    pub fn argb(&self, palette: u8, color: u8) -> u32 {
        rgb555_to_argb(self.color(palette, color))
    }

    /// Read the palette RAM byte selected by a 6-bit index
    pub fn read(&self, index_reg: Byte) -> Byte {
        let index = index_reg & INDEX_MASK;
        let value = self.colors[(index >> 3) as usize][((index >> 1) & 0x03) as usize];
        if bit(index, 0) {
            (value >> 8) as Byte & 0x7F
        } else {
            value as Byte
        }
    }

    /// Write one byte of palette RAM through an index register.
    ///
    /// Even indices hold the low byte of a colour, odd indices the high byte.
    /// With auto-increment set, the index register advances after the write,
    /// wrapping within six bits.
    pub fn update(&mut self, index_reg: &mut Byte, data: Byte) {
        let index = *index_reg & INDEX_MASK;
        let slot = &mut self.colors[(index >> 3) as usize][((index >> 1) & 0x03) as usize];

        *slot = if bit(index, 0) {
            (*slot & 0x00FF) | (((data & 0x7F) as u16) << 8)
        } else {
            (*slot & 0x7F00) | data as u16
        };

        if *index_reg & AUTO_INCREMENT != 0 {
            *index_reg = (*index_reg & AUTO_INCREMENT) | (index.wrapping_add(1) & INDEX_MASK);
        }
    }

    /// Raw palette RAM in hardware byte order (64 bytes)
    pub fn to_bytes(&self) -> [Byte; 64] {
        let mut bytes = [0; 64];
        for (i, byte) in bytes.iter_mut().enumerate() {
            *byte = self.read(i as Byte);
        }
        bytes
    }

    /// Load palette RAM from hardware byte order
    pub fn load_bytes(&mut self, bytes: &[Byte]) {
        for (i, &byte) in bytes.iter().take(64).enumerate() {
            let mut index = i as Byte;
            self.update(&mut index, byte);
        }
    }
}

/// Convert an RGB555 colour (bits 0-4 red, 5-9 green, 10-14 blue) to ARGB8888
pub fn rgb555_to_argb(rgb555: u16) -> u32 {
    let expand = |c: u16| -> u32 {
        let c = (c & 0x1F) as u32;
        (c << 3) | (c >> 2)
    };
    let r = expand(rgb555);
    let g = expand(rgb555 >> 5);
    let b = expand(rgb555 >> 10);
    0xFF000000 | (r << 16) | (g << 8) | b
}

/// Look up the shade a monochrome palette register assigns to a colour index
#[inline]
pub fn dmg_shade(palette: Byte, color_id: u8) -> u8 {
    (palette >> ((color_id & 0x03) * 2)) & 0x03
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_palettes_start_white() {
        let palettes = CgbPalettes::new();
        assert_eq!(palettes.color(0, 0), 0x7FFF);
        assert_eq!(palettes.argb(7, 3), 0xFFFFFFFF);
    }

    #[test]
    fn test_update_round_trip_with_auto_increment() {
        let mut palettes = CgbPalettes::new();
        let mut bcps = 0x80 | 0x0A; // palette 1, colour 1, low byte

        palettes.update(&mut bcps, 0x34);
        palettes.update(&mut bcps, 0x12);

        assert_eq!(bcps, 0x80 | 0x0C);
        assert_eq!(palettes.color(1, 1), 0x1234);
        assert_eq!(palettes.read(0x0A), 0x34);
        assert_eq!(palettes.read(0x0B), 0x12);
    }

    #[test]
    fn test_update_without_auto_increment_keeps_index() {
        let mut palettes = CgbPalettes::new();
        let mut index = 0x01;

        palettes.update(&mut index, 0xFF);
        assert_eq!(index, 0x01);
        // Bit 15 does not exist
        assert_eq!(palettes.color(0, 0), 0x7FFF);
        assert_eq!(palettes.read(0x01), 0x7F);
    }

    #[test]
    fn test_auto_increment_wraps_in_six_bits() {
        let mut palettes = CgbPalettes::new();
        let mut index = 0x80 | 0x3F;

        palettes.update(&mut index, 0x00);
        assert_eq!(index, 0x80);
        assert_eq!(palettes.color(7, 3), 0x00FF);
    }

    #[test]
    fn test_bytes_round_trip() {
        let mut palettes = CgbPalettes::new();
        let mut bytes = [0u8; 64];
        for (i, b) in bytes.iter_mut().enumerate() {
            *b = (i as u8) & 0x7F;
        }
        palettes.load_bytes(&bytes);
        assert_eq!(palettes.to_bytes(), bytes);
    }

    #[test]
    fn test_rgb555_to_argb() {
        assert_eq!(rgb555_to_argb(0x0000), 0xFF000000);
        assert_eq!(rgb555_to_argb(0x7FFF), 0xFFFFFFFF);
        assert_eq!(rgb555_to_argb(0x001F), 0xFFFF0000);
        assert_eq!(rgb555_to_argb(0x03E0), 0xFF00FF00);
        assert_eq!(rgb555_to_argb(0x7C00), 0xFF0000FF);
    }

    #[test]
    fn test_dmg_shade() {
        let palette = 0b11_10_01_00;
        assert_eq!(dmg_shade(palette, 0), 0);
        assert_eq!(dmg_shade(palette, 1), 1);
        assert_eq!(dmg_shade(palette, 2), 2);
        assert_eq!(dmg_shade(palette, 3), 3);
        assert_eq!(dmg_shade(0xFC, 1), 3);
    }
}
