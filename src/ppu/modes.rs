//! PPU Modes
//!
//! The mode sequencer. Time is counted in dots (4 dots per machine cycle):
//!   - OAM Search (mode 2): 80 dots
//!   - Pixel Transfer (mode 3): 172 dots (fixed length)
//!   - HBlank (mode 0): 204 dots
//!   - VBlank (mode 1): 456 dots per line, lines 144-153

use super::{Ppu, SCREEN_HEIGHT};
use crate::interrupts::{Interrupt, PpuHost, StatSource};
use crate::lcd::PpuMode;

pub const OAM_SCAN_DOTS: u32 = 80;
pub const TRANSFER_DOTS: u32 = 172;
pub const HBLANK_DOTS: u32 = 204;
pub const DOTS_PER_LINE: u32 = 456;
pub const DOTS_PER_FRAME: u32 = DOTS_PER_LINE * super::LINES_PER_FRAME as u32;

/// Last line of VBlank
const LAST_LINE: u8 = super::LINES_PER_FRAME - 1;

impl PpuMode {
    /// Dots spent in this mode (per line for VBlank)
    pub fn duration(self) -> u32 {
        match self {
            PpuMode::OamScan => OAM_SCAN_DOTS,
            PpuMode::Transfer => TRANSFER_DOTS,
            PpuMode::HBlank => HBLANK_DOTS,
            PpuMode::VBlank => DOTS_PER_LINE,
        }
    }
}

/// What happened during one `advance` call
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PpuEvents {
    /// Scanlines composed into the frame store
    pub lines_rendered: u32,
    /// VBlank entries (completed frames)
    pub frames_completed: u32,
}

impl PpuEvents {
    pub fn frame_ready(&self) -> bool {
        self.frames_completed > 0
    }
}

impl Ppu {
    /// Advance the sequencer by `dots`.
    ///
    /// Any number of mode boundaries may be crossed in one call; dots left
    /// over after the last transition are carried to the next call. Does
    /// nothing while the display is off.
    pub fn advance<H: PpuHost + ?Sized>(&mut self, dots: u32, host: &mut H) -> PpuEvents {
        let mut events = PpuEvents::default();
        self.deliver_requests(host);
        if !self.lcd.lcd_enabled() {
            return events;
        }

        self.dots = self.dots.saturating_add(dots);
        loop {
            let duration = self.lcd.mode().duration();
            if self.dots < duration {
                break;
            }
            self.dots -= duration;
            self.step_mode(host, &mut events);
        }
        events
    }

    /// Leave the current mode
    fn step_mode<H: PpuHost + ?Sized>(&mut self, host: &mut H, events: &mut PpuEvents) {
        match self.lcd.mode() {
            PpuMode::OamScan => {
                self.search_oam(self.lcd.ly);
                self.lcd.set_mode(PpuMode::Transfer);
            }
            PpuMode::Transfer => {
                if self.compose_line(self.lcd.ly) {
                    self.window_line = self.window_line.wrapping_add(1);
                }
                events.lines_rendered += 1;

                self.lcd.set_mode(PpuMode::HBlank);
                self.request_stat(host, StatSource::HBlank);
                host.hblank_chunk(&mut self.vram);
            }
            PpuMode::HBlank => {
                self.next_line(host);

                if (self.lcd.ly as usize) < SCREEN_HEIGHT {
                    self.lcd.set_mode(PpuMode::OamScan);
                    self.request_stat(host, StatSource::Oam);
                } else {
                    // Enter VBlank
                    self.lcd.set_mode(PpuMode::VBlank);
                    self.request_stat(host, StatSource::VBlank);
                    host.request_interrupt(Interrupt::VBlank);
                    self.frame.finish_frame();
                    events.frames_completed += 1;
                    log::trace!("frame {} complete", self.frame.frame_count());
                }
            }
            PpuMode::VBlank => {
                self.next_line(host);

                if self.lcd.ly == 0 {
                    self.window_line = 0;
                    self.lcd.set_mode(PpuMode::OamScan);
                    self.request_stat(host, StatSource::Oam);
                }
            }
        }
    }

    /// Move LY to the next line (wrapping after 153) and run the LYC check
    fn next_line<H: PpuHost + ?Sized>(&mut self, host: &mut H) {
        self.lcd.ly = if self.lcd.ly >= LAST_LINE { 0 } else { self.lcd.ly + 1 };
        if self.lcd.check_lyc() {
            host.request_interrupt(Interrupt::Stat(StatSource::Lyc));
        }
    }

    fn request_stat<H: PpuHost + ?Sized>(&self, host: &mut H, source: StatSource) {
        if self.lcd.stat_int_enabled(source) {
            host.request_interrupt(Interrupt::Stat(source));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ppu::vram::VideoMemory;
    use proptest::prelude::*;

    /// Host fake recording every request in order
    #[derive(Debug, Default, Clone, PartialEq, Eq)]
    struct Recorder {
        interrupts: Vec<Interrupt>,
        hblank_chunks: u32,
    }

    impl PpuHost for Recorder {
        fn request_interrupt(&mut self, interrupt: Interrupt) {
            self.interrupts.push(interrupt);
        }

        fn hblank_chunk(&mut self, _vram: &mut VideoMemory) {
            self.hblank_chunks += 1;
        }
    }

    impl Recorder {
        fn count(&self, interrupt: Interrupt) -> usize {
            self.interrupts.iter().filter(|&&i| i == interrupt).count()
        }
    }

    #[test]
    fn test_mode_durations() {
        let mut ppu = Ppu::default();
        let mut host = Recorder::default();

        ppu.advance(79, &mut host);
        assert_eq!(ppu.mode(), PpuMode::OamScan);
        ppu.advance(1, &mut host);
        assert_eq!(ppu.mode(), PpuMode::Transfer);
        ppu.advance(171, &mut host);
        assert_eq!(ppu.mode(), PpuMode::Transfer);
        ppu.advance(1, &mut host);
        assert_eq!(ppu.mode(), PpuMode::HBlank);
        assert_eq!(host.hblank_chunks, 1);
        ppu.advance(203, &mut host);
        assert_eq!(ppu.mode(), PpuMode::HBlank);
        ppu.advance(1, &mut host);
        assert_eq!(ppu.mode(), PpuMode::OamScan);
        assert_eq!(ppu.ly(), 1);
        assert_eq!(ppu.dot_carry(), 0);
    }

    #[test]
    fn test_one_line_per_456_dots() {
        let mut ppu = Ppu::default();
        for line in 1..=143u8 {
            let events = ppu.advance(DOTS_PER_LINE, &mut ());
            assert_eq!(events.lines_rendered, 1);
            assert_eq!(ppu.ly(), line);
            assert_eq!(ppu.mode(), PpuMode::OamScan);
        }

        let events = ppu.advance(DOTS_PER_LINE, &mut ());
        assert_eq!(ppu.ly(), 144);
        assert_eq!(ppu.mode(), PpuMode::VBlank);
        assert!(events.frame_ready());
    }

    #[test]
    fn test_large_burst_keeps_remainder() {
        let mut ppu = Ppu::default();
        let events = ppu.advance(DOTS_PER_LINE * 3 + 100, &mut ());

        assert_eq!(events.lines_rendered, 3);
        assert_eq!(ppu.ly(), 3);
        assert_eq!(ppu.mode(), PpuMode::Transfer);
        assert_eq!(ppu.dot_carry(), 20);
    }

    #[test]
    fn test_full_frame() {
        let mut ppu = Ppu::default();
        let mut host = Recorder::default();

        let events = ppu.advance(DOTS_PER_FRAME, &mut host);
        assert_eq!(events.lines_rendered, 144);
        assert_eq!(events.frames_completed, 1);
        assert_eq!(ppu.ly(), 0);
        assert_eq!(ppu.mode(), PpuMode::OamScan);
        assert_eq!(ppu.current_frame(), 1);
        assert!(ppu.take_frame_ready());
        assert_eq!(host.count(Interrupt::VBlank), 1);
        assert_eq!(host.hblank_chunks, 144);
    }

    #[test]
    fn test_vblank_requested_once_across_calls() {
        let mut ppu = Ppu::default();
        let mut host = Recorder::default();

        // Deliver two frames in awkward chunks
        let mut remaining = DOTS_PER_FRAME * 2;
        while remaining > 0 {
            let step = remaining.min(333);
            ppu.advance(step, &mut host);
            remaining -= step;
        }
        assert_eq!(host.count(Interrupt::VBlank), 2);
        assert_eq!(ppu.current_frame(), 2);
    }

    #[test]
    fn test_vblank_lines() {
        let mut ppu = Ppu::default();
        ppu.advance(DOTS_PER_LINE * 144, &mut ());
        assert_eq!(ppu.ly(), 144);

        for line in 145..=153u8 {
            ppu.advance(DOTS_PER_LINE, &mut ());
            assert_eq!(ppu.ly(), line);
            assert_eq!(ppu.mode(), PpuMode::VBlank);
        }

        ppu.advance(DOTS_PER_LINE, &mut ());
        assert_eq!(ppu.ly(), 0);
        assert_eq!(ppu.mode(), PpuMode::OamScan);
    }

    #[test]
    fn test_stat_interrupt_sources() {
        let mut ppu = Ppu::default();
        let mut host = Recorder::default();
        ppu.write(0xFF41, 0x08 | 0x10 | 0x20);

        ppu.advance(DOTS_PER_FRAME, &mut host);
        assert_eq!(host.count(Interrupt::Stat(StatSource::HBlank)), 144);
        // Lines 1-143 from HBlank plus line 0 after VBlank
        assert_eq!(host.count(Interrupt::Stat(StatSource::Oam)), 144);
        assert_eq!(host.count(Interrupt::Stat(StatSource::VBlank)), 1);
        assert_eq!(host.count(Interrupt::Stat(StatSource::Lyc)), 0);
    }

    #[test]
    fn test_stat_interrupts_disabled_by_default() {
        let mut ppu = Ppu::default();
        let mut host = Recorder::default();

        ppu.advance(DOTS_PER_FRAME, &mut host);
        assert_eq!(host.interrupts, vec![Interrupt::VBlank]);
    }

    #[test]
    fn test_lyc_interrupt() {
        let mut ppu = Ppu::default();
        let mut host = Recorder::default();
        ppu.write(0xFF45, 42);
        ppu.write(0xFF41, 0x40);
        assert!(!ppu.lcd.lyc_flag());

        ppu.advance(DOTS_PER_LINE * 42, &mut host);
        assert_eq!(ppu.ly(), 42);
        assert!(ppu.lcd.lyc_flag());
        assert_eq!(host.count(Interrupt::Stat(StatSource::Lyc)), 1);

        ppu.advance(DOTS_PER_LINE, &mut host);
        assert!(!ppu.lcd.lyc_flag());
        assert_eq!(host.count(Interrupt::Stat(StatSource::Lyc)), 1);
    }

    #[test]
    fn test_lyc_matches_vblank_lines_and_wrap() {
        let mut ppu = Ppu::default();
        let mut host = Recorder::default();
        ppu.write(0xFF41, 0x40);

        ppu.write(0xFF45, 153);
        ppu.advance(DOTS_PER_LINE * 153, &mut host);
        assert!(ppu.lcd.lyc_flag());

        // LYC = 0 matches again after the wrap
        ppu.write(0xFF45, 0);
        ppu.advance(DOTS_PER_LINE, &mut host);
        assert_eq!(ppu.ly(), 0);
        assert!(ppu.lcd.lyc_flag());
        assert_eq!(host.count(Interrupt::Stat(StatSource::Lyc)), 2);
    }

    #[test]
    fn test_ly_write_resets_line() {
        let mut ppu = Ppu::default();
        ppu.advance(DOTS_PER_LINE * 10 + 5, &mut ());
        assert_eq!(ppu.ly(), 10);

        ppu.write(0xFF44, 0x99);
        assert_eq!(ppu.ly(), 0);
        assert_eq!(ppu.window_line(), 0);
        // The carry is untouched; the next natural increment continues from 0
        assert_eq!(ppu.dot_carry(), 5);
        ppu.advance(DOTS_PER_LINE, &mut ());
        assert_eq!(ppu.ly(), 1);
    }

    #[test]
    fn test_ly_write_raises_lyc_interrupt() {
        let mut ppu = Ppu::default();
        let mut host = Recorder::default();
        ppu.write(0xFF45, 0);
        ppu.advance(DOTS_PER_LINE * 5, &mut host);
        ppu.write(0xFF41, 0x40);
        assert!(host.interrupts.is_empty());

        ppu.write(0xFF44, 0x00);
        assert!(ppu.lcd.lyc_flag());
        ppu.advance(0, &mut host);
        assert_eq!(host.interrupts, vec![Interrupt::Stat(StatSource::Lyc)]);

        // Delivered once
        ppu.advance(10, &mut host);
        assert_eq!(host.count(Interrupt::Stat(StatSource::Lyc)), 1);
    }

    #[test]
    fn test_lyc_write_raises_only_on_new_match() {
        let mut ppu = Ppu::default();
        let mut host = Recorder::default();
        ppu.advance(DOTS_PER_LINE * 3, &mut host);
        ppu.write(0xFF41, 0x40);

        ppu.write(0xFF45, 3);
        ppu.write(0xFF45, 3);
        ppu.advance(0, &mut host);
        assert_eq!(host.count(Interrupt::Stat(StatSource::Lyc)), 1);

        // No request without the STAT enable bit
        ppu.write(0xFF41, 0x00);
        ppu.write(0xFF45, 9);
        ppu.write(0xFF45, 3);
        ppu.advance(0, &mut host);
        assert_eq!(host.count(Interrupt::Stat(StatSource::Lyc)), 1);
    }

    #[test]
    fn test_display_off_halts_sequencer() {
        let mut ppu = Ppu::default();
        let mut host = Recorder::default();
        ppu.advance(DOTS_PER_LINE * 20 + 100, &mut host);

        ppu.write(0xFF40, 0x11);
        assert_eq!(ppu.ly(), 0);
        assert_eq!(ppu.mode(), PpuMode::HBlank);
        assert_eq!(ppu.dot_carry(), 0);

        let events = ppu.advance(DOTS_PER_FRAME, &mut host);
        assert_eq!(events, PpuEvents::default());
        assert_eq!(ppu.ly(), 0);
        assert!(ppu.video_buffer().iter().all(|&p| p == 0xFFFFFFFF));

        ppu.write(0xFF40, 0x91);
        assert_eq!(ppu.mode(), PpuMode::OamScan);
        ppu.advance(DOTS_PER_LINE, &mut host);
        assert_eq!(ppu.ly(), 1);
    }

    #[test]
    fn test_window_line_counter_advances_only_when_drawn() {
        let mut ppu = Ppu::default();
        ppu.write(0xFF40, 0x91 | 0x20);
        ppu.write(0xFF4A, 5);
        ppu.write(0xFF4B, 7);

        ppu.advance(DOTS_PER_LINE * 5, &mut ());
        assert_eq!(ppu.window_line(), 0);
        ppu.advance(DOTS_PER_LINE * 3, &mut ());
        assert_eq!(ppu.window_line(), 3);

        // Window pushed off screen: counter freezes
        ppu.write(0xFF4B, 200);
        ppu.advance(DOTS_PER_LINE * 4, &mut ());
        assert_eq!(ppu.window_line(), 3);

        ppu.write(0xFF4B, 7);
        ppu.advance(DOTS_PER_LINE, &mut ());
        assert_eq!(ppu.window_line(), 4);

        // New frame starts from 0
        ppu.advance(DOTS_PER_FRAME, &mut ());
        assert_eq!(ppu.ly(), 13);
        assert_eq!(ppu.window_line(), 8);
    }

    #[test]
    fn test_carry_matches_single_call_small() {
        let mut split = Ppu::default();
        let mut whole = Ppu::default();
        for _ in 0..1000 {
            split.advance(77, &mut ());
        }
        whole.advance(77_000, &mut ());
        assert_eq!(split.ly(), whole.ly());
        assert_eq!(split.mode(), whole.mode());
        assert_eq!(split.dot_carry(), whole.dot_carry());
    }

    fn snapshot(ppu: &Ppu) -> (u8, PpuMode, u8, u32, u8, u64, Vec<u32>) {
        (
            ppu.ly(),
            ppu.mode(),
            ppu.lcd.stat,
            ppu.dot_carry(),
            ppu.window_line(),
            ppu.current_frame(),
            ppu.video_buffer().to_vec(),
        )
    }

    fn scene(ppu: &mut Ppu) {
        ppu.write(0xFF40, 0x91 | 0x02 | 0x20);
        ppu.write(0xFF41, 0x78);
        ppu.write(0xFF45, 77);
        ppu.write(0xFF4A, 40);
        ppu.write(0xFF4B, 60);
        for i in 0..16u16 {
            ppu.write(0x8010 + i, 0x5A ^ i as u8);
        }
        for i in 0..0x400u16 {
            ppu.write(0x9800 + i, (i % 3) as u8);
        }
        ppu.write(0xFE00, 30);
        ppu.write(0xFE01, 50);
        ppu.write(0xFE02, 1);
    }

    proptest! {
        #[test]
        fn prop_split_advance_matches_single_call(
            chunks in proptest::collection::vec(0u32..2000, 1..200)
        ) {
            let mut split = Ppu::default();
            let mut whole = Ppu::default();
            scene(&mut split);
            scene(&mut whole);
            let mut split_host = Recorder::default();
            let mut whole_host = Recorder::default();

            let mut total = 0;
            for &chunk in &chunks {
                split.advance(chunk, &mut split_host);
                total += chunk;
            }
            whole.advance(total, &mut whole_host);

            prop_assert_eq!(snapshot(&split), snapshot(&whole));
            prop_assert_eq!(split_host, whole_host);
        }

        #[test]
        fn prop_coincidence_flag_tracks_ly(lyc in 0u8..=255, lines in 0u32..400) {
            let mut ppu = Ppu::default();
            ppu.write(0xFF45, lyc);
            ppu.advance(lines * DOTS_PER_LINE, &mut ());
            prop_assert_eq!(ppu.lcd.lyc_flag(), ppu.ly() == lyc);
        }
    }
}
