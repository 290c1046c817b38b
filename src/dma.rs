//! DMA Transfer
//!
//! OAM DMA (0xFF46): copies 160 bytes from `value << 8` to OAM (0xFE00-0xFE9F),
//! one byte per machine cycle after a one machine cycle start delay.
//!
//! CGB VRAM DMA (0xFF51-0xFF55): copies 16-byte blocks into VRAM, either all
//! at once (general purpose) or one block per HBlank.

use std::ops::Range;

use crate::common::{bit, Byte, Word};

/// Dots per machine cycle
const DOTS_PER_BYTE: u32 = 4;
/// Bytes copied by an OAM DMA transfer
const OAM_DMA_LENGTH: u8 = 160;
/// Bytes per VRAM DMA block
pub const HDMA_BLOCK: Word = 16;

/// OAM DMA Transfer Controller
#[derive(Debug, Clone, Default)]
pub struct OamDma {
    /// DMA is currently active
    active: bool,
    /// Next byte to transfer (0-159)
    byte: u8,
    /// Source address high byte (value written to 0xFF46)
    value: Byte,
    /// Start delay left, in dots
    delay: u32,
    /// Dots not yet turned into transferred bytes
    dots: u32,
}

impl OamDma {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start DMA transfer
    ///
    /// Called when writing to 0xFF46
    pub fn start(&mut self, value: Byte) {
        log::debug!("OAM DMA from {:04X}", (value as Word) << 8);
        self.value = value;
        self.active = true;
        self.byte = 0;
        self.delay = DOTS_PER_BYTE;
        self.dots = 0;
    }

    /// Source address of byte `index`
    pub fn source_address(&self, index: u8) -> Word {
        (self.value as Word) << 8 | index as Word
    }

    /// Destination address of byte `index`
    pub fn dest_address(&self, index: u8) -> Word {
        0xFE00 + index as Word
    }

    /// Advance by `dots`; returns the byte indices to copy now
    pub fn advance(&mut self, dots: u32) -> Range<u8> {
        if !self.active {
            return 0..0;
        }

        self.dots = self.dots.saturating_add(dots);
        let waited = self.delay.min(self.dots);
        self.delay -= waited;
        self.dots -= waited;

        let start = self.byte;
        let count = (self.dots / DOTS_PER_BYTE).min((OAM_DMA_LENGTH - self.byte) as u32) as u8;
        self.byte += count;
        self.dots -= count as u32 * DOTS_PER_BYTE;

        // Check if transfer is complete
        if self.byte >= OAM_DMA_LENGTH {
            self.active = false;
            self.dots = 0;
        }

        start..self.byte
    }

    /// Check if OAM is owned by the DMA
    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Read DMA register (returns last written value)
    pub fn read(&self) -> Byte {
        self.value
    }
}

/// VRAM DMA transfer mode chosen by a write to HDMA5
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HdmaMode {
    /// Copy every block immediately
    General,
    /// Copy one block per HBlank
    HBlank,
}

/// CGB VRAM DMA controller
#[derive(Debug, Clone, Default)]
pub struct Hdma {
    /// Next source address
    source: Word,
    /// Next destination address (0x8000-0x9FF0)
    dest: Word,
    /// Blocks left to copy
    remaining: u8,
    /// An HBlank transfer is armed
    hblank: bool,
}

impl Hdma {
    pub fn new() -> Self {
        Self::default()
    }

    /// Read HDMA register; only HDMA5 is readable
    pub fn read(&self, address: Word) -> Byte {
        match address {
            0xFF55 => {
                if self.hblank {
                    self.remaining.wrapping_sub(1) & 0x7F
                } else {
                    0xFF
                }
            }
            _ => 0xFF,
        }
    }

    /// Write HDMA register.
    ///
    /// Returns the mode of a transfer started by this write.
    pub fn write(&mut self, address: Word, value: Byte) -> Option<HdmaMode> {
        match address {
            0xFF51 => self.source = (self.source & 0x00FF) | (value as Word) << 8,
            0xFF52 => self.source = (self.source & 0xFF00) | (value & 0xF0) as Word,
            0xFF53 => self.dest = (self.dest & 0x00FF) | ((value & 0x1F) as Word) << 8,
            0xFF54 => self.dest = (self.dest & 0xFF00) | (value & 0xF0) as Word,
            0xFF55 => {
                if !bit(value, 7) && self.hblank {
                    log::debug!("HDMA cancelled with {} blocks left", self.remaining);
                    self.hblank = false;
                    return None;
                }

                self.remaining = (value & 0x7F) + 1;
                if bit(value, 7) {
                    log::debug!("HDMA armed: {} blocks to {:04X}", self.remaining, self.dest_address());
                    self.hblank = true;
                    return Some(HdmaMode::HBlank);
                }
                return Some(HdmaMode::General);
            }
            _ => {}
        }
        None
    }

    pub fn source_address(&self) -> Word {
        self.source
    }

    pub fn dest_address(&self) -> Word {
        0x8000 | (self.dest & 0x1FF0)
    }

    /// An HBlank transfer is waiting for the next HBlank
    pub fn hblank_armed(&self) -> bool {
        self.hblank
    }

    /// Take the next block as (source, destination) and advance the addresses
    pub fn next_block(&mut self) -> Option<(Word, Word)> {
        if self.remaining == 0 {
            return None;
        }

        let block = (self.source, self.dest_address());
        self.source = self.source.wrapping_add(HDMA_BLOCK);
        self.dest = (self.dest + HDMA_BLOCK) & 0x1FF0;
        self.remaining -= 1;

        if self.remaining == 0 {
            if self.hblank {
                log::debug!("HDMA complete");
            }
            self.hblank = false;
        }
        Some(block)
    }

    /// Take the block due in this HBlank, if a transfer is armed
    pub fn next_hblank_block(&mut self) -> Option<(Word, Word)> {
        if self.hblank {
            self.next_block()
        } else {
            None
        }
    }
}
