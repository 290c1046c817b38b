//! Frame Store
//!
//! Accumulates composited scanlines into a 160x144 ARGB8888 frame.

use super::{SCREEN_HEIGHT, SCREEN_WIDTH};

/// Completed and in-progress pixels for one frame
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameBuffer {
    pixels: Vec<u32>,
    /// Frames completed since power on
    frame_count: u64,
    /// Set at VBlank entry, cleared by the presenter
    ready: bool,
}

impl FrameBuffer {
    pub fn new(fill: u32) -> Self {
        Self {
            pixels: vec![fill; SCREEN_WIDTH * SCREEN_HEIGHT],
            frame_count: 0,
            ready: false,
        }
    }

    /// Copy one composited line into row `ly`; lines past the screen are ignored
    pub fn write_row(&mut self, ly: usize, row: &[u32; SCREEN_WIDTH]) {
        if ly < SCREEN_HEIGHT {
            self.pixels[ly * SCREEN_WIDTH..(ly + 1) * SCREEN_WIDTH].copy_from_slice(row);
        }
    }

    /// Fill every pixel with one colour
    pub fn fill(&mut self, color: u32) {
        self.pixels.fill(color);
    }

    /// Mark the frame complete
    pub fn finish_frame(&mut self) {
        self.frame_count += 1;
        self.ready = true;
    }

    /// Consume the ready event
    pub fn take_ready(&mut self) -> bool {
        std::mem::take(&mut self.ready)
    }

    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    pub fn pixels(&self) -> &[u32] {
        &self.pixels
    }

    /// One row of pixels
    pub fn row(&self, ly: usize) -> &[u32] {
        let ly = ly.min(SCREEN_HEIGHT - 1);
        &self.pixels[ly * SCREEN_WIDTH..(ly + 1) * SCREEN_WIDTH]
    }

    /// Pixel at (x, y), clamped to the screen
    pub fn pixel(&self, x: usize, y: usize) -> u32 {
        let x = x.min(SCREEN_WIDTH - 1);
        let y = y.min(SCREEN_HEIGHT - 1);
        self.pixels[y * SCREEN_WIDTH + x]
    }
}
