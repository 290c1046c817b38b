//! Game Boy PPU Viewer - Entry Point
//!
//! Shows a video snapshot, or the built-in demo scene when none is given.
//!
//! Usage: gbppu-view [snapshot] [scale]

use gbppu::bus::Bus;
use gbppu::config::PpuConfig;
use gbppu::scene;
use gbppu::snapshot::Snapshot;
use std::env;
use std::process;

/// Window scale factor when none is given
const DEFAULT_SCALE: u32 = 4;

#[cfg(not(feature = "sdl"))]
const HEADLESS_FRAMES: u64 = 60;

fn main() {
    let args: Vec<String> = env::args().collect();

    let snapshot = match args.get(1) {
        Some(path) => match Snapshot::load(path) {
            Ok(snapshot) => Some(snapshot),
            Err(e) => {
                eprintln!("Failed to load snapshot: {}", e);
                process::exit(1);
            }
        },
        None => None,
    };

    let scale = match args.get(2).map(|s| s.parse::<u32>()) {
        Some(Ok(scale)) if scale > 0 => scale,
        Some(_) => {
            eprintln!("Usage: {} [snapshot] [scale]", args[0]);
            process::exit(1);
        }
        None => DEFAULT_SCALE,
    };

    let mut bus = match &snapshot {
        Some(snapshot) => {
            println!("Snapshot: {:?}", snapshot.model());
            let mut bus = Bus::new(PpuConfig {
                model: snapshot.model(),
                ..PpuConfig::default()
            });
            snapshot.apply(&mut bus);
            bus
        }
        None => {
            println!("No snapshot given, showing demo scene");
            let mut bus = Bus::default();
            scene::build_demo(&mut bus);
            bus
        }
    };
    let animated = snapshot.is_none();

    if let Err(e) = run(&mut bus, scale, animated) {
        eprintln!("Viewer error: {}", e);
        process::exit(1);
    }
}

#[cfg(feature = "sdl")]
fn run(bus: &mut Bus, scale: u32, animated: bool) -> Result<(), String> {
    let mut ui = gbppu::ui::Ui::new(scale)?;
    ui.run(bus, |bus, frame| {
        if animated {
            scene::animate(bus, frame);
        }
    })
}

#[cfg(not(feature = "sdl"))]
fn run(bus: &mut Bus, _scale: u32, animated: bool) -> Result<(), String> {
    for frame in 0..HEADLESS_FRAMES {
        if animated {
            scene::animate(bus, frame);
        }
        scene::run_frame(bus);
    }

    println!(
        "Ran {} frames, checksum {:016x}",
        bus.ppu.current_frame(),
        scene::checksum(bus.ppu.video_buffer())
    );
    Ok(())
}
