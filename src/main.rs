// Allow unused code for designed-but-not-yet-used APIs
// Remove these as the codebase matures
#![allow(dead_code)]

#[cfg(feature = "chime")]
mod chime;
mod clock;
mod config;
mod display;
mod geometry;
#[cfg(windows)]
mod host;
mod render_loop;
mod util;

use clock::ClockFace;
use config::OverlayConfig;
use display::{
    AttachOptions, BlendDescriptor, HeadlessPlatform, LayeredDisplay, WindowHandle, DEFAULT_HEIGHT,
    DEFAULT_WIDTH,
};
use render_loop::{RenderLoop, FRAME_INTERVAL};
use util::ManualClock;

const DEFAULT_CONFIG_PATH: &str = "overlay.json";

struct Options {
    resolution: Option<(u32, u32)>,
    headless: Option<u64>,
    config_path: String,
    show_fps: bool,
}

/// Parse command line arguments
fn parse_args() -> Options {
    let args: Vec<String> = std::env::args().collect();
    let mut opts = Options {
        resolution: None,
        headless: None,
        config_path: DEFAULT_CONFIG_PATH.to_string(),
        show_fps: false,
    };

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--show-fps" | "-f" => opts.show_fps = true,
            "--resolution" | "-r" => {
                if i + 1 < args.len() {
                    // Parse WxH format (e.g., 520x520)
                    let parts: Vec<&str> = args[i + 1].split('x').collect();
                    if parts.len() == 2 {
                        if let (Ok(w), Ok(h)) = (parts[0].parse::<u32>(), parts[1].parse::<u32>()) {
                            opts.resolution = Some((w, h));
                        }
                    }
                    i += 1;
                }
            },
            "--headless" => {
                if i + 1 < args.len() {
                    if let Ok(frames) = args[i + 1].parse::<u64>() {
                        opts.headless = Some(frames);
                    }
                    i += 1;
                }
            },
            "--config" | "-c" => {
                if i + 1 < args.len() {
                    opts.config_path = args[i + 1].clone();
                    i += 1;
                }
            },
            "--help" => {
                println!("Usage: glasspane [OPTIONS]");
                println!();
                println!("Options:");
                println!(
                    "  --resolution WxH, -r WxH  Overlay size (default: {}x{})",
                    DEFAULT_WIDTH, DEFAULT_HEIGHT
                );
                println!("  --headless N          Render N frames without a window and exit");
                println!(
                    "  --config PATH, -c PATH    Config file (default: {})",
                    DEFAULT_CONFIG_PATH
                );
                println!("  --show-fps, -f        Draw the FPS readout");
                println!("  --help                Show this help message");
                std::process::exit(0);
            },
            _ => {},
        }
        i += 1;
    }

    opts
}

fn attach_options(config: &OverlayConfig) -> AttachOptions {
    AttachOptions {
        input_transparent: config.click_through,
        blend: BlendDescriptor {
            source_constant_alpha: config.opacity,
            per_pixel_alpha: true,
        },
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let opts = parse_args();
    let mut config = OverlayConfig::load_or_default(&opts.config_path);
    if let Some((w, h)) = opts.resolution {
        config.width = w;
        config.height = h;
    }
    if opts.show_fps {
        config.show_fps = true;
    }

    println!("=== glasspane ===");
    println!("Overlay: {}x{} at ({}, {})", config.width, config.height, config.x, config.y);
    println!(
        "Opacity: {}  Click-through: {}",
        config.opacity, config.click_through
    );
    println!("Use --help for command line options.");

    #[cfg(feature = "chime")]
    let _chime = if config.chime {
        Some(chime::Chime::start())
    } else {
        None
    };

    match opts.headless {
        Some(frames) => run_headless(&config, frames),
        None => run_overlay(&config),
    }
}

/// Drive the full pipeline against the headless backend at simulated 60 Hz
fn run_headless(config: &OverlayConfig, frames: u64) -> Result<(), Box<dyn std::error::Error>> {
    let clock = ManualClock::new();
    let mut display = LayeredDisplay::attach(
        HeadlessPlatform::new(),
        WindowHandle(1),
        config.width,
        config.height,
        attach_options(config),
    )?;
    let mut looper = RenderLoop::new(clock.clone());
    let mut face = ClockFace::new(config.show_fps);

    for _ in 0..frames {
        clock.advance(FRAME_INTERVAL);
        looper.tick(&mut display, &mut face);
    }

    println!(
        "Headless run: {} frames over {:.2}s simulated, {} presents, {} fps",
        looper.frames(),
        (frames as f64) * FRAME_INTERVAL.as_secs_f64(),
        display.platform().updates(),
        looper.fps()
    );
    Ok(())
}

#[cfg(windows)]
fn run_overlay(config: &OverlayConfig) -> Result<(), Box<dyn std::error::Error>> {
    use display::Win32Platform;
    use render_loop::LoopControl;
    use util::SystemClock;

    let window = host::HostWindow::create(config.x, config.y, config.width, config.height)?;
    let mut display = LayeredDisplay::attach(
        Win32Platform::new(),
        window.handle(),
        config.width,
        config.height,
        attach_options(config),
    )?;
    let mut looper = RenderLoop::new(SystemClock::new());
    let mut face = ClockFace::new(config.show_fps);

    looper.run(&mut display, &mut face, |looper| {
        if !window.pump() {
            return LoopControl::Quit;
        }
        looper.set_enabled(!window.minimized());
        LoopControl::Continue
    });

    display.dispose();
    Ok(())
}

#[cfg(not(windows))]
fn run_overlay(config: &OverlayConfig) -> Result<(), Box<dyn std::error::Error>> {
    println!("Layered windows need Windows; running the headless demo instead.");
    run_headless(config, 600)
}
