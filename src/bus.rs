//! Memory Bus
//!
//! This module implements the slice of the Game Boy memory map the PPU
//! needs, routing accesses to the PPU, work RAM and the DMA engines.

use crate::common::{Byte, Word};

/// Memory bus trait for reading and writing memory
pub trait MemoryBus {
    /// Read a byte from the given address
    fn read(&self, address: Word) -> Byte;

    /// Write a byte to the given address
    fn write(&mut self, address: Word, value: Byte);

    /// Read a 16-bit word from the given address (little-endian)
    fn read16(&self, address: Word) -> Word {
        let lo = self.read(address) as Word;
        let hi = self.read(address.wrapping_add(1)) as Word;
        lo | (hi << 8)
    }

    /// Write a 16-bit word to the given address (little-endian)
    fn write16(&mut self, address: Word, value: Word) {
        self.write(address, (value & 0xFF) as Byte);
        self.write(address.wrapping_add(1), ((value >> 8) & 0xFF) as Byte);
    }
}

use crate::config::PpuConfig;
use crate::dma::{Hdma, HdmaMode, OamDma, HDMA_BLOCK};
use crate::interrupts::{Interrupt, InterruptFlags, PpuHost};
#[cfg(test)]
use crate::interrupts::StatSource;
use crate::ppu::vram::VideoMemory;
use crate::ppu::{Ppu, PpuEvents};

const WRAM_SIZE: usize = 0x2000;

/// Everything on the bus the PPU calls back into
///
/// Kept apart from the PPU so `Ppu::advance` can borrow it as its host.
#[derive(Debug, Clone)]
pub struct Peripherals {
    /// Work RAM (0xC000-0xDFFF)
    pub wram: Box<[Byte; WRAM_SIZE]>,
    /// Interrupt flags register (0xFF0F)
    pub int_flags: InterruptFlags,
    /// CGB VRAM DMA (0xFF51-0xFF55)
    pub hdma: Hdma,
}

impl Peripherals {
    fn new() -> Self {
        Self {
            wram: Box::new([0; WRAM_SIZE]),
            int_flags: InterruptFlags::new(),
            hdma: Hdma::new(),
        }
    }

    /// Read work RAM (echo included); every other source reads 0xFF
    pub fn wram_read(&self, address: Word) -> Byte {
        match address {
            0xC000..=0xDFFF => self.wram[(address - 0xC000) as usize],
            0xE000..=0xFDFF => self.wram[(address - 0xE000) as usize],
            _ => 0xFF,
        }
    }

    pub fn wram_write(&mut self, address: Word, value: Byte) {
        match address {
            0xC000..=0xDFFF => self.wram[(address - 0xC000) as usize] = value,
            0xE000..=0xFDFF => self.wram[(address - 0xE000) as usize] = value,
            _ => {}
        }
    }

    /// Copy one 16-byte block into the selected VRAM bank
    fn copy_block(&self, vram: &mut VideoMemory, source: Word, dest: Word) {
        for i in 0..HDMA_BLOCK {
            let value = self.wram_read(source.wrapping_add(i));
            vram.vram_write(dest + i, value);
        }
    }
}

impl PpuHost for Peripherals {
    fn request_interrupt(&mut self, interrupt: Interrupt) {
        self.int_flags.request_interrupt(interrupt);
    }

    fn hblank_chunk(&mut self, vram: &mut VideoMemory) {
        if let Some((source, dest)) = self.hdma.next_hblank_block() {
            self.copy_block(vram, source, dest);
        }
    }
}

/// PPU-side memory bus
///
/// Routes memory accesses to the appropriate hardware components:
/// - 0x8000-0x9FFF: PPU VRAM
/// - 0xC000-0xDFFF: WRAM
/// - 0xE000-0xFDFF: Echo RAM (mirror of WRAM)
/// - 0xFE00-0xFE9F: PPU OAM (0xFF while OAM DMA runs)
/// - 0xFF0F: Interrupt flags
/// - 0xFF40-0xFF4B, 0xFF4F, 0xFF68-0xFF6B: PPU registers
/// - 0xFF46: OAM DMA
/// - 0xFF51-0xFF55: CGB VRAM DMA
///
/// Everything else reads 0xFF and ignores writes.
#[derive(Debug, Clone)]
pub struct Bus {
    pub ppu: Ppu,
    pub peripherals: Peripherals,
    pub oam_dma: OamDma,
}

impl Default for Bus {
    fn default() -> Self {
        Self::new(PpuConfig::default())
    }
}

impl Bus {
    pub fn new(config: PpuConfig) -> Self {
        Self {
            ppu: Ppu::new(config),
            peripherals: Peripherals::new(),
            oam_dma: OamDma::new(),
        }
    }

    fn cgb(&self) -> bool {
        self.ppu.config().model.is_cgb()
    }

    /// Advance the PPU and OAM DMA by `dots`
    pub fn tick(&mut self, dots: u32) -> PpuEvents {
        for index in self.oam_dma.advance(dots) {
            let value = self.dma_source(self.oam_dma.source_address(index));
            self.ppu.vram.oam_write(self.oam_dma.dest_address(index), value);
        }

        self.ppu.advance(dots, &mut self.peripherals)
    }

    /// Byte seen by the OAM DMA engine at `address`
    fn dma_source(&self, address: Word) -> Byte {
        match address {
            0x8000..=0x9FFF => self.ppu.vram.vram_read(address),
            _ => self.peripherals.wram_read(address),
        }
    }

    /// Run a general purpose VRAM DMA to completion
    fn run_general_dma(&mut self) {
        while let Some((source, dest)) = self.peripherals.hdma.next_block() {
            self.peripherals.copy_block(&mut self.ppu.vram, source, dest);
        }
    }
}

impl MemoryBus for Bus {
    fn read(&self, address: Word) -> Byte {
        match address {
            // OAM (0xFE00-0xFE9F)
            0xFE00..=0xFE9F if self.oam_dma.is_active() => 0xFF,
            // WRAM and echo (0xC000-0xFDFF)
            0xC000..=0xFDFF => self.peripherals.wram_read(address),
            // Interrupt flags
            0xFF0F => self.peripherals.int_flags.read(),
            // OAM DMA register
            0xFF46 => self.oam_dma.read(),
            // VRAM DMA registers
            0xFF51..=0xFF55 if self.cgb() => self.peripherals.hdma.read(address),
            _ if self.ppu.owns(address) => self.ppu.read(address),
            _ => 0xFF,
        }
    }

    fn write(&mut self, address: Word, value: Byte) {
        match address {
            // OAM (0xFE00-0xFE9F) - dropped during OAM DMA
            0xFE00..=0xFE9F if self.oam_dma.is_active() => {}
            0xC000..=0xFDFF => self.peripherals.wram_write(address, value),
            0xFF0F => self.peripherals.int_flags.write(value),
            0xFF46 => self.oam_dma.start(value),
            0xFF51..=0xFF55 if self.cgb() => {
                if self.peripherals.hdma.write(address, value) == Some(HdmaMode::General) {
                    self.run_general_dma();
                }
            }
            _ if self.ppu.owns(address) => {
                self.ppu.write(address, value);
                self.ppu.deliver_requests(&mut self.peripherals);
            }
            _ => {}
        }
    }
}
