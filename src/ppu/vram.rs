//! Video Memory
//!
//! Tile data and tile maps (0x8000-0x9FFF, two banks on CGB) and the sprite
//! attribute table (0xFE00-0xFE9F).

use crate::common::{bit, Byte, Word};

/// Size of one VRAM bank
pub const VRAM_BANK_SIZE: usize = 0x2000;
/// Number of OAM entries
pub const OAM_ENTRIES: usize = 40;
/// OAM size in bytes
pub const OAM_SIZE: usize = OAM_ENTRIES * 4;

/// OAM Entry (sprite attributes)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[repr(C)]
pub struct OamEntry {
    /// Y position (plus 16)
    pub y: Byte,
    /// X position (plus 8)
    pub x: Byte,
    /// Tile index
    pub tile: Byte,
    /// Flags (priority, flip, palette)
    pub flags: Byte,
}

impl OamEntry {
    /// CGB palette number (bits 0-2)
    pub fn cgb_palette(&self) -> Byte {
        self.flags & 0x07
    }

    /// CGB VRAM bank (bit 3)
    pub fn cgb_vram_bank(&self) -> bool {
        bit(self.flags, 3)
    }

    /// DMG palette number (bit 4)
    pub fn palette_number(&self) -> bool {
        bit(self.flags, 4)
    }

    /// X flip (bit 5)
    pub fn x_flip(&self) -> bool {
        bit(self.flags, 5)
    }

    /// Y flip (bit 6)
    pub fn y_flip(&self) -> bool {
        bit(self.flags, 6)
    }

    /// BG/Window over OBJ priority (bit 7)
    pub fn bg_priority(&self) -> bool {
        bit(self.flags, 7)
    }
}

/// CGB background map attribute byte (stored in bank 1 at the map address)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TileAttributes(pub Byte);

impl TileAttributes {
    /// BG palette number (bits 0-2)
    pub fn palette(&self) -> Byte {
        self.0 & 0x07
    }

    /// Tile data bank (bit 3)
    pub fn bank(&self) -> u8 {
        (self.0 >> 3) & 0x01
    }

    /// X flip (bit 5)
    pub fn x_flip(&self) -> bool {
        bit(self.0, 5)
    }

    /// Y flip (bit 6)
    pub fn y_flip(&self) -> bool {
        bit(self.0, 6)
    }

    /// BG-to-OAM priority (bit 7)
    pub fn priority(&self) -> bool {
        bit(self.0, 7)
    }
}

/// VRAM and OAM
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VideoMemory {
    /// Two 8KB banks, bank 1 at offset 0x2000
    vram: Box<[Byte; VRAM_BANK_SIZE * 2]>,
    /// Object Attribute Memory (40 sprites * 4 bytes)
    oam: [Byte; OAM_SIZE],
    /// Bank selected for bus accesses (0xFF4F)
    bank: u8,
    /// Bank 1 is reachable
    cgb: bool,
}

impl VideoMemory {
    /// Create zeroed video memory
    pub fn new(cgb: bool) -> Self {
        Self {
            vram: Box::new([0; VRAM_BANK_SIZE * 2]),
            oam: [0; OAM_SIZE],
            bank: 0,
            cgb,
        }
    }

    #[inline]
    fn offset(bank: u8, address: Word) -> usize {
        ((bank as usize & 0x01) << 13) | (address as usize & 0x1FFF)
    }

    /// Read VRAM from an explicit bank; the address is masked into 0x8000-0x9FFF
    #[inline]
    pub fn read_banked(&self, bank: u8, address: Word) -> Byte {
        self.vram[Self::offset(bank, address)]
    }

    /// Write VRAM in an explicit bank
    #[inline]
    pub fn write_banked(&mut self, bank: u8, address: Word, value: Byte) {
        self.vram[Self::offset(bank, address)] = value;
    }

    /// Read VRAM through the selected bank
    pub fn vram_read(&self, address: Word) -> Byte {
        self.read_banked(self.bank, address)
    }

    /// Write VRAM through the selected bank
    pub fn vram_write(&mut self, address: Word, value: Byte) {
        self.write_banked(self.bank, address, value);
    }

    /// Currently selected bank
    pub fn bank(&self) -> u8 {
        self.bank
    }

    /// Select the bank for bus accesses (ignored outside CGB mode)
    pub fn select_bank(&mut self, value: Byte) {
        if self.cgb {
            self.bank = value & 0x01;
        }
    }

    /// Read from OAM (0xFE00-0xFE9F), 0xFF past the end of the table
    pub fn oam_read(&self, address: Word) -> Byte {
        let offset = address.wrapping_sub(0xFE00) as usize;
        self.oam.get(offset).copied().unwrap_or(0xFF)
    }

    /// Write to OAM (0xFE00-0xFE9F)
    pub fn oam_write(&mut self, address: Word, value: Byte) {
        let offset = address.wrapping_sub(0xFE00) as usize;
        if let Some(slot) = self.oam.get_mut(offset) {
            *slot = value;
        }
    }

    /// Get OAM entry at index
    pub fn oam_entry(&self, index: usize) -> OamEntry {
        if index >= OAM_ENTRIES {
            return OamEntry::default();
        }
        let offset = index * 4;
        OamEntry {
            y: self.oam[offset],
            x: self.oam[offset + 1],
            tile: self.oam[offset + 2],
            flags: self.oam[offset + 3],
        }
    }

    /// Store an OAM entry
    pub fn set_oam_entry(&mut self, index: usize, entry: OamEntry) {
        if index >= OAM_ENTRIES {
            return;
        }
        let offset = index * 4;
        self.oam[offset..offset + 4].copy_from_slice(&[entry.y, entry.x, entry.tile, entry.flags]);
    }

    /// Fetch one row of a tile as its (low, high) bit planes
    #[inline]
    pub fn tile_row(&self, bank: u8, tile_address: Word, row: u8) -> (Byte, Byte) {
        let address = tile_address.wrapping_add(row as Word * 2);
        (
            self.read_banked(bank, address),
            self.read_banked(bank, address.wrapping_add(1)),
        )
    }

    /// Raw bank contents
    pub fn bank_bytes(&self, bank: u8) -> &[Byte] {
        let start = (bank as usize & 0x01) * VRAM_BANK_SIZE;
        &self.vram[start..start + VRAM_BANK_SIZE]
    }

    /// Replace a bank's contents (shorter slices leave the rest untouched)
    pub fn load_bank(&mut self, bank: u8, data: &[Byte]) {
        let start = (bank as usize & 0x01) * VRAM_BANK_SIZE;
        let len = data.len().min(VRAM_BANK_SIZE);
        self.vram[start..start + len].copy_from_slice(&data[..len]);
    }

    /// Replace OAM contents
    pub fn load_oam(&mut self, data: &[Byte]) {
        let len = data.len().min(OAM_SIZE);
        self.oam[..len].copy_from_slice(&data[..len]);
    }
}

/// Extract the 2-bit colour index of pixel `x` (0 = leftmost) from a tile row
#[inline]
pub fn color_index(lo: Byte, hi: Byte, x: u8) -> u8 {
    let shift = 7 - (x & 0x07);
    (((hi >> shift) & 1) << 1) | ((lo >> shift) & 1)
}
