//! SDL2 User Interface
//!
//! This module presents the PPU frame store in an SDL2 window.

use sdl2::event::Event;
use sdl2::keyboard::Keycode;
use sdl2::pixels::PixelFormatEnum;
use sdl2::render::{Canvas, TextureCreator};
use sdl2::video::{Window, WindowContext};
use sdl2::EventPump;
use std::time::{Duration, Instant};

use crate::bus::Bus;
use crate::ppu::{SCREEN_HEIGHT, SCREEN_WIDTH};
use crate::scene;

/// SDL2 UI wrapper
pub struct Ui {
    canvas: Canvas<Window>,
    event_pump: EventPump,
    texture_creator: TextureCreator<WindowContext>,
}

impl Ui {
    /// Create a new UI instance
    pub fn new(scale: u32) -> Result<Self, String> {
        let sdl_context = sdl2::init()?;
        let video_subsystem = sdl_context.video()?;

        let window = video_subsystem
            .window(
                "gbppu - Game Boy PPU Viewer",
                SCREEN_WIDTH as u32 * scale,
                SCREEN_HEIGHT as u32 * scale,
            )
            .position_centered()
            .build()
            .map_err(|e| e.to_string())?;

        let canvas = window
            .into_canvas()
            .software()
            .build()
            .map_err(|e| e.to_string())?;

        let texture_creator = canvas.texture_creator();
        let event_pump = sdl_context.event_pump()?;

        Ok(Self {
            canvas,
            event_pump,
            texture_creator,
        })
    }

    /// Run the bus frame by frame until the window closes.
    ///
    /// `on_frame` is called before each frame with the frame number.
    pub fn run<F>(&mut self, bus: &mut Bus, mut on_frame: F) -> Result<(), String>
    where
        F: FnMut(&mut Bus, u64),
    {
        let mut texture = self
            .texture_creator
            .create_texture_streaming(
                PixelFormatEnum::ARGB8888,
                SCREEN_WIDTH as u32,
                SCREEN_HEIGHT as u32,
            )
            .map_err(|e| e.to_string())?;

        let frame_duration = Duration::from_secs_f64(1.0 / 60.0);
        let mut frame = 0u64;
        let mut bytes = Vec::with_capacity(SCREEN_WIDTH * SCREEN_HEIGHT * 4);

        'running: loop {
            let frame_start = Instant::now();

            // Handle events
            for event in self.event_pump.poll_iter() {
                match event {
                    Event::Quit { .. }
                    | Event::KeyDown {
                        keycode: Some(Keycode::Escape),
                        ..
                    } => break 'running,
                    _ => {}
                }
            }

            on_frame(bus, frame);
            scene::run_frame(bus);
            frame += 1;

            // Update texture with video buffer
            bytes.clear();
            bytes.extend(bus.ppu.video_buffer().iter().flat_map(|p| p.to_ne_bytes()));
            texture
                .update(None, &bytes, SCREEN_WIDTH * 4)
                .map_err(|e| e.to_string())?;

            // Render
            self.canvas.clear();
            self.canvas.copy(&texture, None, None)?;
            self.canvas.present();

            // Frame timing
            let elapsed = frame_start.elapsed();
            if elapsed < frame_duration {
                std::thread::sleep(frame_duration - elapsed);
            }
        }

        Ok(())
    }
}
