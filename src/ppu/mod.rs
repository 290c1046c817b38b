//! PPU Module
//!
//! This module implements the Pixel Processing Unit (PPU) for the Game Boy
//! and Game Boy Color: the mode sequencer, the scanline compositor, video
//! memory and the frame store.

pub mod frame;
pub mod modes;
pub mod pipeline;
pub mod vram;

use crate::common::{between, Byte, Word};
use crate::config::PpuConfig;
use crate::interrupts::{Interrupt, PpuHost, StatSource};
use crate::lcd::{Lcd, PpuMode};

use frame::FrameBuffer;
use pipeline::Compositor;
use vram::{VideoMemory, OAM_ENTRIES};

pub use modes::PpuEvents;

/// Screen dimensions
pub const SCREEN_WIDTH: usize = 160;
pub const SCREEN_HEIGHT: usize = 144;
pub const LINES_PER_FRAME: u8 = 154;
/// Sprites the OAM search keeps per line
pub const MAX_SPRITES_PER_LINE: usize = 10;

/// Pixel Processing Unit
#[derive(Debug, Clone)]
pub struct Ppu {
    /// Register bank
    pub lcd: Lcd,
    /// VRAM banks and OAM
    pub vram: VideoMemory,
    config: PpuConfig,
    /// Dots delivered but not yet consumed by a mode transition
    dots: u32,
    /// Window internal line counter
    window_line: u8,
    /// OAM indices of the sprites on the current line
    line_sprites: [u8; MAX_SPRITES_PER_LINE],
    /// Number of valid entries in `line_sprites`
    sprite_count: usize,
    compositor: Compositor,
    frame: FrameBuffer,
    /// LYC STAT interrupt raised by a register write, not yet delivered
    lyc_request: bool,
}

impl Default for Ppu {
    fn default() -> Self {
        Self::new(PpuConfig::default())
    }
}

impl Ppu {
    /// Create a PPU in its post-boot state (display on, mode 2, LY 0)
    pub fn new(config: PpuConfig) -> Self {
        Self {
            lcd: Lcd::new(),
            vram: VideoMemory::new(config.model.is_cgb()),
            config,
            dots: 0,
            window_line: 0,
            line_sprites: [0; MAX_SPRITES_PER_LINE],
            sprite_count: 0,
            compositor: Compositor::new(),
            frame: FrameBuffer::new(config.shades.argb(0)),
            lyc_request: false,
        }
    }

    pub fn config(&self) -> &PpuConfig {
        &self.config
    }

    fn cgb(&self) -> bool {
        self.config.model.is_cgb()
    }

    // ========== Bus Interface ==========

    /// Read a PPU-owned address; anything unmapped reads 0xFF
    pub fn read(&self, address: Word) -> Byte {
        match address {
            0x8000..=0x9FFF => {
                if self.vram_locked() {
                    0xFF
                } else {
                    self.vram.vram_read(address)
                }
            }
            0xFE00..=0xFE9F => {
                if self.oam_locked() {
                    0xFF
                } else {
                    self.vram.oam_read(address)
                }
            }
            0xFF46 => 0xFF, // OAM DMA lives on the bus
            0xFF40..=0xFF4B => self.lcd.read(address),
            0xFF4F if self.cgb() => 0xFE | self.vram.bank(),
            0xFF68..=0xFF6B if self.cgb() => self.lcd.read(address),
            _ => 0xFF,
        }
    }

    /// Write a PPU-owned address; anything unmapped is ignored
    pub fn write(&mut self, address: Word, value: Byte) {
        match address {
            0x8000..=0x9FFF => {
                if !self.vram_locked() {
                    self.vram.vram_write(address, value);
                }
            }
            0xFE00..=0xFE9F => {
                if !self.oam_locked() {
                    self.vram.oam_write(address, value);
                }
            }
            0xFF40 => {
                let was_enabled = self.lcd.lcd_enabled();
                self.lcd.write(address, value);
                match (was_enabled, self.lcd.lcd_enabled()) {
                    (true, false) => self.disable_display(),
                    (false, true) => self.enable_display(),
                    _ => {}
                }
            }
            0xFF44 => {
                self.write_ly_lyc(address, value);
                self.window_line = 0;
            }
            0xFF45 => self.write_ly_lyc(address, value),
            0xFF46 => {}
            0xFF41..=0xFF4B => self.lcd.write(address, value),
            0xFF4F if self.cgb() => self.vram.select_bank(value),
            0xFF68..=0xFF6B if self.cgb() => self.lcd.write(address, value),
            _ => {}
        }
    }

    /// LY/LYC write; a new coincidence latches the LYC interrupt for the host
    fn write_ly_lyc(&mut self, address: Word, value: Byte) {
        let was_coincident = self.lcd.lyc_flag();
        self.lcd.write(address, value);
        if self.lcd.lcd_enabled() && !was_coincident && self.lcd.check_lyc() {
            self.lyc_request = true;
        }
    }

    /// Hand interrupts raised by register writes to the host
    pub fn deliver_requests<H: PpuHost + ?Sized>(&mut self, host: &mut H) {
        if std::mem::take(&mut self.lyc_request) {
            host.request_interrupt(Interrupt::Stat(StatSource::Lyc));
        }
    }

    /// Check if an address is decoded by the PPU
    pub fn owns(&self, address: Word) -> bool {
        between(address, 0x8000, 0x9FFF)
            || between(address, 0xFE00, 0xFE9F)
            || (between(address, 0xFF40, 0xFF4B) && address != 0xFF46)
            || address == 0xFF4F
            || between(address, 0xFF68, 0xFF6B)
    }

    fn vram_locked(&self) -> bool {
        self.config.access_locking
            && self.lcd.lcd_enabled()
            && self.lcd.mode() == PpuMode::Transfer
    }

    fn oam_locked(&self) -> bool {
        self.config.access_locking
            && self.lcd.lcd_enabled()
            && matches!(self.lcd.mode(), PpuMode::OamScan | PpuMode::Transfer)
    }

    fn disable_display(&mut self) {
        log::debug!("LCD disabled at LY={} mode={:?}", self.lcd.ly, self.lcd.mode());
        self.lcd.ly = 0;
        self.lcd.check_lyc();
        self.lcd.set_mode(PpuMode::HBlank);
        self.window_line = 0;
        self.dots = 0;
        self.sprite_count = 0;
        self.lyc_request = false;
        self.frame.fill(self.config.shades.argb(0));
    }

    fn enable_display(&mut self) {
        log::debug!("LCD enabled");
        self.lcd.check_lyc();
        self.lcd.set_mode(PpuMode::OamScan);
        self.dots = 0;
    }

    // ========== Rendering ==========

    /// Render line `ly` into the frame store from the current state.
    ///
    /// Runs a fresh OAM search for `ly` first; the sequencer's sprite list for
    /// its current line is kept. Rendering the same line twice with unchanged
    /// state produces the same pixels; the window line counter is only
    /// advanced by the mode sequencer.
    pub fn render_line(&mut self, ly: u8) {
        let sequenced = (self.line_sprites, self.sprite_count);
        self.search_oam(ly);
        self.compose_line(ly);
        (self.line_sprites, self.sprite_count) = sequenced;
    }

    /// Compose `ly` with the sprites from the last OAM search; returns whether
    /// the window was drawn
    fn compose_line(&mut self, ly: u8) -> bool {
        if ly as usize >= SCREEN_HEIGHT {
            return false;
        }
        let drawn = self.compositor.render_line(
            ly,
            &self.lcd,
            &self.vram,
            &self.line_sprites[..self.sprite_count],
            self.window_line,
            &self.config,
        );
        self.frame.write_row(ly as usize, self.compositor.line());
        drawn
    }

    /// Select up to 10 sprites overlapping line `ly`, in OAM order
    pub fn search_oam(&mut self, ly: u8) {
        self.sprite_count = 0;

        let ly = ly as i16;
        let sprite_height = self.lcd.sprite_height() as i16;

        for i in 0..OAM_ENTRIES {
            if self.sprite_count >= MAX_SPRITES_PER_LINE {
                break;
            }

            let top = self.vram.oam_entry(i).y as i16 - 16;
            if ly >= top && ly < top + sprite_height {
                self.line_sprites[self.sprite_count] = i as u8;
                self.sprite_count += 1;
            }
        }
    }

    // ========== Accessors ==========

    /// OAM indices selected by the last OAM search
    pub fn visible_sprites(&self) -> &[u8] {
        &self.line_sprites[..self.sprite_count]
    }

    pub fn mode(&self) -> PpuMode {
        self.lcd.mode()
    }

    pub fn ly(&self) -> u8 {
        self.lcd.ly
    }

    pub fn window_line(&self) -> u8 {
        self.window_line
    }

    /// Dots carried over to the next `advance` call
    pub fn dot_carry(&self) -> u32 {
        self.dots
    }

    /// Frame store contents (160x144 ARGB8888)
    pub fn video_buffer(&self) -> &[u32] {
        self.frame.pixels()
    }

    pub fn frame(&self) -> &FrameBuffer {
        &self.frame
    }

    /// Frames completed since power on
    pub fn current_frame(&self) -> u64 {
        self.frame.frame_count()
    }

    /// Returns `true` once after each completed frame
    pub fn take_frame_ready(&mut self) -> bool {
        self.frame.take_ready()
    }

    /// Scratch buffers of the last composed line
    pub fn compositor(&self) -> &Compositor {
        &self.compositor
    }
}
