//! Fixed-cadence render driver.
//!
//! One timer tick = one frame: the registered app paints into the
//! compositor's surface, then the frame is presented. A failed present skips
//! that frame's visual update and the loop keeps ticking.

use std::time::Duration;

use crate::display::{LayeredDisplay, Platform, Surface};
use crate::util::{Clock, FpsCounter};

/// Default frame interval, 60 ticks per second
pub const FRAME_INTERVAL: Duration = Duration::from_micros(16_667);

/// Extension points the application layer fills in. The core invokes them;
/// it knows nothing about what gets drawn.
pub trait OverlayApp {
    /// Called once against the surface before the first frame
    fn init(&mut self, _surface: &mut Surface) {}

    /// Called once per tick to paint the frame
    fn draw(&mut self, surface: &mut Surface, frame: &FrameInfo);
}

/// Per-frame readout handed to the draw callback
#[derive(Debug, Clone, Copy)]
pub struct FrameInfo {
    /// Most recently published frames-per-second
    pub fps: u32,
    /// Frames delivered since the loop started
    pub frame: u64,
    /// Clock time of this tick
    pub elapsed: Duration,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopControl {
    Continue,
    Quit,
}

pub struct RenderLoop<C: Clock> {
    clock: C,
    interval: Duration,
    fps: FpsCounter,
    enabled: bool,
    initialized: bool,
}

impl<C: Clock> RenderLoop<C> {
    pub fn new(clock: C) -> Self {
        Self::with_interval(clock, FRAME_INTERVAL)
    }

    pub fn with_interval(clock: C, interval: Duration) -> Self {
        Self {
            clock,
            interval,
            fps: FpsCounter::new(),
            enabled: true,
            initialized: false,
        }
    }

    /// Tracks host-window visibility: a minimized overlay stops rendering
    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn fps(&self) -> u32 {
        self.fps.fps()
    }

    pub fn frames(&self) -> u64 {
        self.fps.total_frames()
    }

    pub fn seconds_sampled(&self) -> u64 {
        self.fps.seconds_sampled()
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Run one frame: draw, count, present
    pub fn tick<P: Platform>(
        &mut self,
        display: &mut LayeredDisplay<P>,
        app: &mut dyn OverlayApp,
    ) {
        if !self.enabled {
            return;
        }
        if !self.initialized {
            app.init(display.surface());
            self.initialized = true;
        }

        let now = self.clock.now();
        let fps = self.fps.frame(now);
        let info = FrameInfo {
            fps,
            frame: self.fps.total_frames(),
            elapsed: now,
        };
        app.draw(display.surface(), &info);

        if let Err(e) = display.present() {
            log::warn!("present failed, skipping frame: {e}");
        }
    }

    /// Drive frames at the fixed interval until `host` asks to quit. The
    /// host callback runs between frames; it is where the window's message
    /// pump lives and where visibility flips the enabled flag.
    pub fn run<P: Platform, F>(
        &mut self,
        display: &mut LayeredDisplay<P>,
        app: &mut dyn OverlayApp,
        mut host: F,
    ) where
        F: FnMut(&mut Self) -> LoopControl,
    {
        let mut next = self.clock.now();
        loop {
            if host(self) == LoopControl::Quit {
                break;
            }
            self.tick(display, app);

            next += self.interval;
            let now = self.clock.now();
            if next > now {
                std::thread::sleep(next - now);
            } else {
                // Fell behind; don't try to catch up with a burst
                next = now;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::display::{AttachOptions, Color, HeadlessPlatform, WindowHandle};
    use crate::util::ManualClock;

    struct CountingApp {
        inits: u32,
        draws: u32,
        last_fps: u32,
    }

    impl CountingApp {
        fn new() -> Self {
            Self {
                inits: 0,
                draws: 0,
                last_fps: 0,
            }
        }
    }

    impl OverlayApp for CountingApp {
        fn init(&mut self, surface: &mut Surface) {
            self.inits += 1;
            surface.clear(Color::TRANSPARENT);
        }

        fn draw(&mut self, surface: &mut Surface, frame: &FrameInfo) {
            self.draws += 1;
            self.last_fps = frame.fps;
            surface.set_pixel(0, 0, Color::WHITE);
        }
    }

    fn attach_headless() -> LayeredDisplay<HeadlessPlatform> {
        LayeredDisplay::attach(
            HeadlessPlatform::new(),
            WindowHandle(3),
            32,
            32,
            AttachOptions::default(),
        )
        .unwrap()
    }

    #[test]
    fn test_init_runs_once_before_first_draw() {
        let clock = ManualClock::new();
        let mut looper = RenderLoop::new(clock);
        let mut display = attach_headless();
        let mut app = CountingApp::new();

        looper.tick(&mut display, &mut app);
        looper.tick(&mut display, &mut app);
        assert_eq!(app.inits, 1);
        assert_eq!(app.draws, 2);
    }

    #[test]
    fn test_three_simulated_seconds_at_sixty_hz() {
        let clock = ManualClock::new();
        let mut looper = RenderLoop::new(clock.clone());
        let mut display = attach_headless();
        let mut app = CountingApp::new();

        // 180 ticks spread over exactly three simulated seconds
        for _ in 0..180 {
            clock.advance(FRAME_INTERVAL);
            looper.tick(&mut display, &mut app);
        }

        // One FPS snapshot per elapsed wall-clock second, and every tick
        // delivered exactly one frame
        assert_eq!(looper.seconds_sampled(), 3);
        assert_eq!(looper.frames(), 180);
        assert_eq!(app.draws, 180);
        assert_eq!(display.platform().updates(), 180);
        assert_eq!(app.last_fps, 60);
    }

    #[test]
    fn test_disabled_loop_renders_nothing() {
        let clock = ManualClock::new();
        let mut looper = RenderLoop::new(clock.clone());
        let mut display = attach_headless();
        let mut app = CountingApp::new();

        looper.set_enabled(false);
        for _ in 0..10 {
            clock.advance(FRAME_INTERVAL);
            looper.tick(&mut display, &mut app);
        }
        assert_eq!(app.draws, 0);
        assert_eq!(display.platform().updates(), 0);

        looper.set_enabled(true);
        looper.tick(&mut display, &mut app);
        assert_eq!(app.draws, 1);
    }

    #[test]
    fn test_failed_present_keeps_loop_alive() {
        let clock = ManualClock::new();
        let mut looper = RenderLoop::new(clock.clone());
        let mut display = attach_headless();
        let mut app = CountingApp::new();

        display.platform().fail_updates(true);
        for _ in 0..3 {
            clock.advance(FRAME_INTERVAL);
            looper.tick(&mut display, &mut app);
        }
        // Frames were drawn and counted even though no update went out
        assert_eq!(app.draws, 3);
        assert_eq!(display.platform().updates(), 0);
        assert_eq!(display.platform().outstanding_bitmaps(), 0);

        display.platform().fail_updates(false);
        clock.advance(FRAME_INTERVAL);
        looper.tick(&mut display, &mut app);
        assert_eq!(display.platform().updates(), 1);
    }

    #[test]
    fn test_run_quits_on_host_request() {
        let clock = ManualClock::new();
        let mut looper = RenderLoop::new(clock.clone());
        let mut display = attach_headless();
        let mut app = CountingApp::new();

        let mut remaining = 5;
        looper.run(&mut display, &mut app, |_| {
            if remaining == 0 {
                LoopControl::Quit
            } else {
                remaining -= 1;
                clock.advance(FRAME_INTERVAL);
                LoopControl::Continue
            }
        });
        assert_eq!(app.draws, 5);
    }
}
