//! LCD Control
//!
//! This module implements the PPU register bank.
//!
//! LCD Registers:
//! - LCDC (0xFF40): LCD Control
//! - STAT (0xFF41): LCD Status (bits 0-2 read-only)
//! - SCY (0xFF42): Scroll Y
//! - SCX (0xFF43): Scroll X
//! - LY (0xFF44): Current scanline (writing resets it to 0)
//! - LYC (0xFF45): LY Compare
//! - BGP (0xFF47): Background Palette
//! - OBP0 (0xFF48): Object Palette 0
//! - OBP1 (0xFF49): Object Palette 1
//! - WY (0xFF4A): Window Y Position
//! - WX (0xFF4B): Window X Position (plus 7)
//!
//! CGB only:
//! - BCPS/BCPD (0xFF68/0xFF69): BG palette index/data
//! - OCPS/OCPD (0xFF6A/0xFF6B): OBJ palette index/data

use crate::common::{bit, bit_set, Byte, Word};
use crate::interrupts::StatSource;
use crate::palette::{dmg_shade, CgbPalettes};

/// PPU modes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PpuMode {
    HBlank = 0,
    VBlank = 1,
    OamScan = 2,
    Transfer = 3,
}

impl From<u8> for PpuMode {
    fn from(value: u8) -> Self {
        match value & 0x03 {
            0 => PpuMode::HBlank,
            1 => PpuMode::VBlank,
            2 => PpuMode::OamScan,
            _ => PpuMode::Transfer,
        }
    }
}

/// LCD register bank
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Lcd {
    /// LCDC - LCD Control (0xFF40)
    pub lcdc: Byte,
    /// STAT - LCD Status (0xFF41)
    pub stat: Byte,
    /// SCY - Scroll Y (0xFF42)
    pub scy: Byte,
    /// SCX - Scroll X (0xFF43)
    pub scx: Byte,
    /// LY - Current scanline (0xFF44)
    pub ly: Byte,
    /// LYC - LY Compare (0xFF45)
    pub lyc: Byte,
    /// BGP - Background Palette (0xFF47)
    pub bgp: Byte,
    /// OBP0 - Object Palette 0 (0xFF48)
    pub obp0: Byte,
    /// OBP1 - Object Palette 1 (0xFF49)
    pub obp1: Byte,
    /// WY - Window Y Position (0xFF4A)
    pub wy: Byte,
    /// WX - Window X Position (0xFF4B)
    pub wx: Byte,
    /// BCPS - BG palette index (0xFF68)
    pub bcps: Byte,
    /// OCPS - OBJ palette index (0xFF6A)
    pub ocps: Byte,
    /// CGB background palettes
    pub bg_palettes: CgbPalettes,
    /// CGB object palettes
    pub obj_palettes: CgbPalettes,
}

impl Default for Lcd {
    fn default() -> Self {
        Self::new()
    }
}

impl Lcd {
    /// Create the register bank in its post-boot state
    pub fn new() -> Self {
        let mut lcd = Self {
            lcdc: 0x91, // LCD enabled, BG enabled, 0x8000 tile data
            stat: 0x02, // Start in OAM scan mode (mode 2)
            scy: 0,
            scx: 0,
            ly: 0,
            lyc: 0,
            bgp: 0xFC,
            obp0: 0xFF,
            obp1: 0xFF,
            wy: 0,
            wx: 0,
            bcps: 0,
            ocps: 0,
            bg_palettes: CgbPalettes::new(),
            obj_palettes: CgbPalettes::new(),
        };
        lcd.check_lyc();
        lcd
    }

    /// Read LCD register
    pub fn read(&self, address: Word) -> Byte {
        match address {
            0xFF40 => self.lcdc,
            0xFF41 => self.stat | 0x80, // Bit 7 always reads as 1
            0xFF42 => self.scy,
            0xFF43 => self.scx,
            0xFF44 => self.ly,
            0xFF45 => self.lyc,
            0xFF47 => self.bgp,
            0xFF48 => self.obp0,
            0xFF49 => self.obp1,
            0xFF4A => self.wy,
            0xFF4B => self.wx,
            0xFF68 => self.bcps | 0x40, // Bit 6 unused
            0xFF69 => self.bg_palettes.read(self.bcps),
            0xFF6A => self.ocps | 0x40,
            0xFF6B => self.obj_palettes.read(self.ocps),
            _ => 0xFF,
        }
    }

    /// Write LCD register
    ///
    /// LCDC side effects on the mode sequencer are handled by the PPU.
    pub fn write(&mut self, address: Word, value: Byte) {
        match address {
            0xFF40 => self.lcdc = value,
            0xFF41 => {
                // Lower 3 bits are read-only (mode and LYC flag)
                self.stat = (self.stat & 0x07) | (value & 0x78);
            }
            0xFF42 => self.scy = value,
            0xFF43 => self.scx = value,
            0xFF44 => {
                // Any write resets LY
                self.ly = 0;
                self.check_lyc();
            }
            0xFF45 => {
                self.lyc = value;
                self.check_lyc();
            }
            0xFF47 => self.bgp = value,
            0xFF48 => self.obp0 = value,
            0xFF49 => self.obp1 = value,
            0xFF4A => self.wy = value,
            0xFF4B => self.wx = value,
            0xFF68 => self.bcps = value & 0xBF,
            0xFF69 => self.bg_palettes.update(&mut self.bcps, value),
            0xFF6A => self.ocps = value & 0xBF,
            0xFF6B => self.obj_palettes.update(&mut self.ocps, value),
            _ => {}
        }
    }

    // ========== LCDC Bit Accessors ==========

    /// LCD Display Enable (bit 7)
    pub fn lcd_enabled(&self) -> bool {
        bit(self.lcdc, 7)
    }

    /// Window Tile Map Select (bit 6)
    /// false = 0x9800-0x9BFF, true = 0x9C00-0x9FFF
    pub fn window_tile_map(&self) -> Word {
        if bit(self.lcdc, 6) { 0x9C00 } else { 0x9800 }
    }

    /// Window Enable (bit 5)
    pub fn window_enabled(&self) -> bool {
        bit(self.lcdc, 5)
    }

    /// BG & Window Tile Data Select (bit 4)
    /// true = unsigned indices from 0x8000, false = signed indices around 0x9000
    pub fn unsigned_tile_data(&self) -> bool {
        bit(self.lcdc, 4)
    }

    /// BG Tile Map Select (bit 3)
    pub fn bg_tile_map(&self) -> Word {
        if bit(self.lcdc, 3) { 0x9C00 } else { 0x9800 }
    }

    /// Sprite Size (bit 2)
    /// false = 8x8, true = 8x16
    pub fn sprite_height(&self) -> u8 {
        if bit(self.lcdc, 2) { 16 } else { 8 }
    }

    /// Sprite Enable (bit 1)
    pub fn sprites_enabled(&self) -> bool {
        bit(self.lcdc, 1)
    }

    /// BG & Window Enable (bit 0)
    pub fn bg_window_enabled(&self) -> bool {
        bit(self.lcdc, 0)
    }

    /// Address of the tile data for a BG/window tile index
    pub fn bg_tile_address(&self, tile_index: Byte) -> Word {
        if self.unsigned_tile_data() {
            0x8000 + (tile_index as Word) * 16
        } else {
            // Signed addressing (tile 0 at 0x9000)
            0x9000u16.wrapping_add_signed((tile_index as i8 as i16) * 16)
        }
    }

    /// Window left edge on screen (WX - 7)
    pub fn window_x(&self) -> i16 {
        self.wx as i16 - 7
    }

    // ========== STAT Bit Accessors ==========

    /// Get current PPU mode (bits 0-1)
    pub fn mode(&self) -> PpuMode {
        PpuMode::from(self.stat & 0x03)
    }

    /// Set current PPU mode (bits 0-1)
    pub fn set_mode(&mut self, mode: PpuMode) {
        self.stat = (self.stat & 0xFC) | (mode as u8);
    }

    /// LYC=LY Coincidence Flag (bit 2)
    pub fn lyc_flag(&self) -> bool {
        bit(self.stat, 2)
    }

    /// Check whether a STAT interrupt source is enabled (bits 3-6)
    pub fn stat_int_enabled(&self, source: StatSource) -> bool {
        match source {
            StatSource::HBlank => bit(self.stat, 3),
            StatSource::VBlank => bit(self.stat, 4),
            StatSource::Oam => bit(self.stat, 5),
            StatSource::Lyc => bit(self.stat, 6),
        }
    }

    // ========== LY/LYC Handling ==========

    /// Recompute the coincidence flag.
    ///
    /// Returns `true` when LY == LYC and the LYC STAT interrupt is enabled.
    pub fn check_lyc(&mut self) -> bool {
        let coincidence = self.ly == self.lyc;
        bit_set(&mut self.stat, 2, coincidence);
        coincidence && self.stat_int_enabled(StatSource::Lyc)
    }

    // ========== Palette Helpers ==========

    /// Get shade from background palette
    pub fn bg_color(&self, color_id: u8) -> u8 {
        dmg_shade(self.bgp, color_id)
    }

    /// Get shade from sprite palette 0
    pub fn sprite_color_0(&self, color_id: u8) -> u8 {
        dmg_shade(self.obp0, color_id)
    }

    /// Get shade from sprite palette 1
    pub fn sprite_color_1(&self, color_id: u8) -> u8 {
        dmg_shade(self.obp1, color_id)
    }
}
