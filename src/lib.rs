//! Game Boy PPU Library
//!
//! This library provides a cycle-accurate Game Boy / Game Boy Color Pixel
//! Processing Unit: mode sequencer, scanline compositor, register bank,
//! video memory, frame store and CGB palettes, plus the DMA engines and a
//! minimal bus to drive them.

pub mod common;
pub mod config;
pub mod error;
pub mod interrupts;
pub mod lcd;
pub mod palette;
pub mod ppu;
pub mod dma;
pub mod bus;
pub mod snapshot;
pub mod scene;
#[cfg(feature = "sdl")]
pub mod ui;
