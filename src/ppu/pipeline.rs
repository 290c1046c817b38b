//! Scanline Compositor
//!
//! Builds one 160-pixel line from the background, window and sprite layers.
//! Mode 3 has a fixed length here, so a whole line is composed at once when
//! the sequencer leaves pixel transfer.

use super::vram::{color_index, OamEntry, TileAttributes, VideoMemory};
use super::SCREEN_WIDTH;
use crate::common::Byte;
use crate::config::PpuConfig;
use crate::lcd::Lcd;

/// One resolved BG/window pixel
#[derive(Debug, Clone, Copy)]
struct TilePixel {
    /// Raw 2-bit colour index (before the palette)
    index: u8,
    /// CGB map attribute bit 7
    priority: bool,
    argb: u32,
}

/// Line compositor and its per-line scratch buffers
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Compositor {
    /// Output colours of the line being built
    line: [u32; SCREEN_WIDTH],
    /// BG/window colour index per column, consumed by the sprite pass
    bg_index: [u8; SCREEN_WIDTH],
    /// CGB BG-to-OAM priority per column
    bg_priority: [bool; SCREEN_WIDTH],
}

impl Default for Compositor {
    fn default() -> Self {
        Self::new()
    }
}

impl Compositor {
    pub fn new() -> Self {
        Self {
            line: [0; SCREEN_WIDTH],
            bg_index: [0; SCREEN_WIDTH],
            bg_priority: [false; SCREEN_WIDTH],
        }
    }

    /// The most recently composed line
    pub fn line(&self) -> &[u32; SCREEN_WIDTH] {
        &self.line
    }

    /// BG colour indices of the most recently composed line
    pub fn bg_indices(&self) -> &[u8; SCREEN_WIDTH] {
        &self.bg_index
    }

    /// CGB BG priority flags of the most recently composed line
    pub fn bg_priorities(&self) -> &[bool; SCREEN_WIDTH] {
        &self.bg_priority
    }

    /// Compose line `ly`.
    ///
    /// `sprites` holds the OAM indices selected for this line (at most 10, in
    /// OAM order) and `window_line` the window's internal line counter.
    /// Returns `true` when the window covered part of the line.
    pub fn render_line(
        &mut self,
        ly: u8,
        lcd: &Lcd,
        vram: &VideoMemory,
        sprites: &[u8],
        window_line: u8,
        config: &PpuConfig,
    ) -> bool {
        let blank = config.shades.argb(0);

        if !lcd.lcd_enabled() {
            self.line.fill(blank);
            self.bg_index.fill(0);
            self.bg_priority.fill(false);
            return false;
        }

        let mut window_drawn = false;
        if lcd.bg_window_enabled() {
            self.render_background(ly, lcd, vram, config);
            if lcd.window_enabled() {
                window_drawn = self.render_window(ly, lcd, vram, window_line, config);
            }
        } else {
            self.line.fill(blank);
            self.bg_index.fill(0);
            self.bg_priority.fill(false);
        }

        if lcd.sprites_enabled() {
            self.render_sprites(ly, lcd, vram, sprites, config);
        }

        window_drawn
    }

    fn render_background(&mut self, ly: u8, lcd: &Lcd, vram: &VideoMemory, config: &PpuConfig) {
        let y = lcd.scy.wrapping_add(ly);
        let map = lcd.bg_tile_map();

        for x in 0..SCREEN_WIDTH {
            let scroll_x = lcd.scx.wrapping_add(x as u8);
            let pixel = fetch_tile_pixel(lcd, vram, map, scroll_x, y, config);
            self.put_tile_pixel(x, pixel);
        }
    }

    fn render_window(
        &mut self,
        ly: u8,
        lcd: &Lcd,
        vram: &VideoMemory,
        window_line: u8,
        config: &PpuConfig,
    ) -> bool {
        let left = lcd.window_x();
        if ly < lcd.wy || left >= SCREEN_WIDTH as i16 {
            return false;
        }

        let map = lcd.window_tile_map();
        for x in left.max(0) as usize..SCREEN_WIDTH {
            let win_x = (x as i16 - left) as u8;
            let pixel = fetch_tile_pixel(lcd, vram, map, win_x, window_line, config);
            self.put_tile_pixel(x, pixel);
        }
        true
    }

    #[inline]
    fn put_tile_pixel(&mut self, x: usize, pixel: TilePixel) {
        self.line[x] = pixel.argb;
        self.bg_index[x] = pixel.index;
        self.bg_priority[x] = pixel.priority;
    }

    fn render_sprites(
        &mut self,
        ly: u8,
        lcd: &Lcd,
        vram: &VideoMemory,
        sprites: &[u8],
        config: &PpuConfig,
    ) {
        let cgb = config.model.is_cgb();
        let height = lcd.sprite_height() as i16;

        // Highest priority first
        let mut ordered: Vec<(u8, OamEntry)> = sprites
            .iter()
            .take(super::MAX_SPRITES_PER_LINE)
            .map(|&i| (i, vram.oam_entry(i as usize)))
            .collect();
        if !cgb {
            // Lower X wins, OAM index breaks ties
            ordered.sort_by_key(|&(index, entry)| (entry.x, index));
        }

        // Draw lowest priority first so better sprites overwrite it
        for &(_, sprite) in ordered.iter().rev() {
            let row = ly as i16 - (sprite.y as i16 - 16);
            if row < 0 || row >= height {
                continue;
            }
            let mut row = row as u8;
            if sprite.y_flip() {
                row = height as u8 - 1 - row;
            }

            // Bit 0 of the tile index is ignored for 8x16 sprites
            let tile = if height == 16 { sprite.tile & 0xFE } else { sprite.tile };
            let bank = u8::from(cgb && sprite.cgb_vram_bank());
            let (lo, hi) = vram.tile_row(bank, 0x8000 + tile as u16 * 16, row);

            let left = sprite.x as i16 - 8;
            for px in 0..8u8 {
                let x = left + px as i16;
                if !(0..SCREEN_WIDTH as i16).contains(&x) {
                    continue;
                }
                let x = x as usize;

                let col = if sprite.x_flip() { 7 - px } else { px };
                let index = color_index(lo, hi, col);
                // Color 0 is transparent for sprites
                if index == 0 {
                    continue;
                }

                let bg_opaque = self.bg_index[x] != 0;
                let hidden = if cgb {
                    (self.bg_priority[x] && bg_opaque) || sprite.bg_priority()
                } else {
                    bg_opaque && sprite.bg_priority()
                };
                if hidden {
                    continue;
                }

                self.line[x] = if cgb {
                    lcd.obj_palettes.argb(sprite.cgb_palette(), index)
                } else if sprite.palette_number() {
                    config.shades.argb(lcd.sprite_color_1(index))
                } else {
                    config.shades.argb(lcd.sprite_color_0(index))
                };
            }
        }
    }
}

/// Resolve the BG/window pixel at (x, y) of the 256x256 map at `map`
fn fetch_tile_pixel(
    lcd: &Lcd,
    vram: &VideoMemory,
    map: u16,
    x: Byte,
    y: Byte,
    config: &PpuConfig,
) -> TilePixel {
    let cgb = config.model.is_cgb();
    let map_addr = map + (y as u16 / 8) * 32 + (x as u16 / 8);
    let tile_index = vram.read_banked(0, map_addr);
    let attrs = if cgb {
        TileAttributes(vram.read_banked(1, map_addr))
    } else {
        TileAttributes::default()
    };

    let mut row = y % 8;
    if attrs.y_flip() {
        row = 7 - row;
    }
    let mut col = x % 8;
    if attrs.x_flip() {
        col = 7 - col;
    }

    let (lo, hi) = vram.tile_row(attrs.bank(), lcd.bg_tile_address(tile_index), row);
    let index = color_index(lo, hi, col);

    let argb = if cgb {
        lcd.bg_palettes.argb(attrs.palette(), index)
    } else {
        config.shades.argb(lcd.bg_color(index))
    };

    TilePixel {
        index,
        priority: attrs.priority(),
        argb,
    }
}
