//! Interrupts
//!
//! Interrupt requests raised by the PPU and the capability interface through
//! which the PPU talks to the rest of the machine.
//!
//! IF register bits used by the PPU:
//!   - VBlank:   0x01 (vector 0x0040)
//!   - LCD STAT: 0x02 (vector 0x0048)

use crate::common::{Byte, Word};
use crate::ppu::vram::VideoMemory;

/// STAT interrupt sources (STAT bits 3-6)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StatSource {
    /// Mode 0 entered (STAT bit 3)
    HBlank,
    /// Mode 1 entered (STAT bit 4)
    VBlank,
    /// Mode 2 entered (STAT bit 5)
    Oam,
    /// LY == LYC (STAT bit 6)
    Lyc,
}

/// Interrupt requested by the PPU
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Interrupt {
    /// Hardware VBlank interrupt, raised unconditionally on entering line 144
    VBlank,
    /// LCD STAT interrupt and the source that triggered it
    Stat(StatSource),
}

impl Interrupt {
    /// Bit position for this interrupt in the IE/IF registers
    pub fn bit(&self) -> Byte {
        match self {
            Interrupt::VBlank => 0x01,
            Interrupt::Stat(_) => 0x02,
        }
    }

    /// Interrupt vector address
    pub fn vector(&self) -> Word {
        match self {
            Interrupt::VBlank => 0x0040,
            Interrupt::Stat(_) => 0x0048,
        }
    }
}

/// What the PPU needs from the machine around it
pub trait PpuHost {
    /// Raise an interrupt request
    fn request_interrupt(&mut self, interrupt: Interrupt);

    /// Called once on every mode 3 -> mode 0 transition.
    ///
    /// A host with an armed HBlank VRAM-DMA transfer copies one 16-byte block
    /// into `vram` here; everyone else ignores it.
    fn hblank_chunk(&mut self, _vram: &mut VideoMemory) {}
}

/// Host that drops every request
impl PpuHost for () {
    fn request_interrupt(&mut self, _interrupt: Interrupt) {}
}

/// Interrupt Flag register (0xFF0F)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InterruptFlags {
    flags: Byte,
}

impl InterruptFlags {
    pub fn new() -> Self {
        Self::default()
    }

    /// Read IF; the upper three bits are unused and read as 1
    pub fn read(&self) -> Byte {
        self.flags | 0xE0
    }

    pub fn write(&mut self, value: Byte) {
        self.flags = value & 0x1F;
    }

    /// Check whether `interrupt` is pending
    pub fn is_requested(&self, interrupt: Interrupt) -> bool {
        self.flags & interrupt.bit() != 0
    }

    /// Acknowledge an interrupt
    pub fn clear(&mut self, interrupt: Interrupt) {
        self.flags &= !interrupt.bit();
    }
}

impl PpuHost for InterruptFlags {
    fn request_interrupt(&mut self, interrupt: Interrupt) {
        self.flags |= interrupt.bit();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_interrupt_bits() {
        assert_eq!(Interrupt::VBlank.bit(), 0x01);
        assert_eq!(Interrupt::Stat(StatSource::Lyc).bit(), 0x02);
        assert_eq!(Interrupt::Stat(StatSource::HBlank).vector(), 0x0048);
        assert_eq!(Interrupt::VBlank.vector(), 0x0040);
    }

    #[test]
    fn test_interrupt_flags() {
        let mut flags = InterruptFlags::new();
        assert_eq!(flags.read(), 0xE0);

        flags.request_interrupt(Interrupt::VBlank);
        flags.request_interrupt(Interrupt::Stat(StatSource::Oam));
        assert_eq!(flags.read(), 0xE3);
        assert!(flags.is_requested(Interrupt::VBlank));

        flags.clear(Interrupt::VBlank);
        assert!(!flags.is_requested(Interrupt::VBlank));
        assert!(flags.is_requested(Interrupt::Stat(StatSource::Lyc)));

        flags.write(0xFF);
        assert_eq!(flags.read(), 0xFF);
    }
}
