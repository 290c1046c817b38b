//! Demo Scene
//!
//! A small built-in scene for the viewer: a checkerboard background, a
//! window strip along the bottom and a few bouncing sprites.

use crate::bus::{Bus, MemoryBus};
use crate::common::Byte;
use crate::ppu::modes::DOTS_PER_LINE;
use crate::ppu::{PpuEvents, LINES_PER_FRAME};

const CHECKER_TILE: u8 = 1;
const SOLID_TILE: u8 = 2;
const BALL_TILE: u8 = 3;
const BALL_COUNT: u8 = 4;

const BALL: [Byte; 8] = [0x3C, 0x7E, 0xFF, 0xFF, 0xFF, 0xFF, 0x7E, 0x3C];

fn write_tile(bus: &mut Bus, tile: u8, rows: impl Fn(usize) -> (Byte, Byte)) {
    let base = 0x8000 + tile as u16 * 16;
    for row in 0..8 {
        let (lo, hi) = rows(row);
        bus.write(base + row as u16 * 2, lo);
        bus.write(base + row as u16 * 2 + 1, hi);
    }
}

/// Load the demo tiles, maps, palettes and sprites into `bus`
pub fn build_demo(bus: &mut Bus) {
    write_tile(bus, CHECKER_TILE, |_| (0xF0, 0x0F));
    write_tile(bus, SOLID_TILE, |_| (0xFF, 0xFF));
    write_tile(bus, BALL_TILE, |row| (BALL[row], BALL[row] & 0x3C));

    // Background map at 0x9800, window map at 0x9C00
    for y in 0..32u16 {
        for x in 0..32u16 {
            let tile = if (x + y) % 2 == 0 { CHECKER_TILE } else { 0 };
            bus.write(0x9800 + y * 32 + x, tile);
            bus.write(0x9C00 + y * 32 + x, SOLID_TILE);
        }
    }

    bus.write(0xFF47, 0xE4); // BGP
    bus.write(0xFF48, 0xD2); // OBP0
    bus.write(0xFF4A, 128); // WY
    bus.write(0xFF4B, 7); // WX

    if bus.ppu.config().model.is_cgb() {
        // Background palette 0: white, teal, navy, black
        bus.write(0xFF68, 0x80);
        for color in [0x7FFFu16, 0x5A80, 0x4000, 0x0000] {
            bus.write(0xFF69, color as Byte);
            bus.write(0xFF69, (color >> 8) as Byte);
        }
        // Object palette 0: unused, red, orange, dark red
        bus.write(0xFF6A, 0x80);
        for color in [0x0000u16, 0x001F, 0x021F, 0x000F] {
            bus.write(0xFF6B, color as Byte);
            bus.write(0xFF6B, (color >> 8) as Byte);
        }
    }

    for i in 0..BALL_COUNT {
        let oam = 0xFE00 + i as u16 * 4;
        bus.write(oam, 16 + 24 * i + 8);
        bus.write(oam + 1, 8 + 40 * i);
        bus.write(oam + 2, BALL_TILE);
        bus.write(oam + 3, 0);
    }

    // Display on, window map 0x9C00, window on, unsigned tiles, sprites on, BG on
    bus.write(0xFF40, 0xF3);
}

/// Move the demo for frame number `frame`
pub fn animate(bus: &mut Bus, frame: u64) {
    bus.write(0xFF43, frame as u8); // SCX
    bus.write(0xFF42, (frame / 2) as u8); // SCY

    for i in 0..BALL_COUNT {
        let x = 8 + (frame as u16 + i as u16 * 40) % 168;
        bus.write(0xFE00 + i as u16 * 4 + 1, x as u8);
    }
}

/// Run the bus until the next frame completes.
///
/// Gives up after one frame's worth of dots if the display is off.
pub fn run_frame(bus: &mut Bus) -> PpuEvents {
    let mut total = PpuEvents::default();
    for _ in 0..LINES_PER_FRAME {
        let events = bus.tick(DOTS_PER_LINE);
        total.lines_rendered += events.lines_rendered;
        total.frames_completed += events.frames_completed;
        if events.frame_ready() {
            break;
        }
    }
    total
}

/// FNV-1a hash of a frame
pub fn checksum(pixels: &[u32]) -> u64 {
    pixels
        .iter()
        .flat_map(|p| p.to_le_bytes())
        .fold(0xcbf29ce484222325, |hash, byte| {
            (hash ^ byte as u64).wrapping_mul(0x100000001b3)
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PpuConfig;
    use crate::ppu::SCREEN_HEIGHT;

    #[test]
    fn test_demo_frame() {
        let mut bus = Bus::default();
        build_demo(&mut bus);

        let events = run_frame(&mut bus);
        assert!(events.frame_ready());
        assert_eq!(events.lines_rendered, SCREEN_HEIGHT as u32);

        // Window strip is solid colour 3 (black with BGP 0xE4)
        let frame = bus.ppu.frame();
        assert!(frame.row(140).iter().all(|&p| p == 0xFF000000));
        // Checker tile: colour 1 then colour 2
        assert_eq!(frame.pixel(0, 0), 0xFFAAAAAA);
        assert_eq!(frame.pixel(4, 0), 0xFF555555);
        assert_eq!(frame.pixel(8, 0), 0xFFFFFFFF);
    }

    #[test]
    fn test_animation_changes_frame() {
        let mut bus = Bus::default();
        build_demo(&mut bus);
        run_frame(&mut bus);
        let first = checksum(bus.ppu.video_buffer());

        animate(&mut bus, 3);
        run_frame(&mut bus);
        assert_ne!(checksum(bus.ppu.video_buffer()), first);
        assert_eq!(bus.ppu.lcd.scx, 3);
    }

    #[test]
    fn test_cgb_demo_uses_colour_palettes() {
        let mut bus = Bus::new(PpuConfig::cgb());
        build_demo(&mut bus);
        run_frame(&mut bus);

        assert_eq!(bus.ppu.lcd.bg_palettes.color(0, 1), 0x5A80);
        assert_eq!(bus.ppu.frame().pixel(8, 0), 0xFFFFFFFF);
    }

    #[test]
    fn test_run_frame_with_display_off() {
        let mut bus = Bus::default();
        bus.write(0xFF40, 0x00);
        assert_eq!(run_frame(&mut bus), PpuEvents::default());
    }

    #[test]
    fn test_checksum() {
        assert_eq!(checksum(&[]), 0xcbf29ce484222325);
        assert_ne!(checksum(&[0xFF000000]), checksum(&[0xFFFFFFFF]));
    }
}
