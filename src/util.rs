//! Shared utilities

use std::cell::Cell;
use std::rc::Rc;
use std::time::{Duration, Instant};

// ============================================================================
// Clocks
// ============================================================================

/// Source of elapsed time for the render loop. Abstracted so tests can run
/// simulated seconds without sleeping.
pub trait Clock {
    /// Time since an arbitrary fixed epoch
    fn now(&self) -> Duration;
}

/// Monotonic wall clock
pub struct SystemClock {
    start: Instant,
}

impl SystemClock {
    pub fn new() -> Self {
        Self {
            start: Instant::now(),
        }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SystemClock {
    fn now(&self) -> Duration {
        self.start.elapsed()
    }
}

/// Hand-stepped clock for deterministic runs. Clones share the same time,
/// so a copy can be handed to the render loop while the caller advances it.
#[derive(Clone, Default)]
pub struct ManualClock {
    now: Rc<Cell<Duration>>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn advance(&self, by: Duration) {
        self.now.set(self.now.get() + by);
    }

    pub fn set(&self, to: Duration) {
        self.now.set(to);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Duration {
        self.now.get()
    }
}

// ============================================================================
// FPS Counter
// ============================================================================

/// Per-second frame counter: frames accumulate until the wall-clock second
/// changes, then the total is published as the current FPS and the counter
/// starts over.
pub struct FpsCounter {
    frames: u32,
    second: u64,
    fps: u32,
    total_frames: u64,
    seconds_sampled: u64,
}

impl FpsCounter {
    pub fn new() -> Self {
        Self {
            frames: 0,
            second: 0,
            fps: 0,
            total_frames: 0,
            seconds_sampled: 0,
        }
    }

    /// Record one frame at time `now`; returns the published FPS
    pub fn frame(&mut self, now: Duration) -> u32 {
        self.frames += 1;
        self.total_frames += 1;
        let second = now.as_secs();
        if second != self.second {
            self.second = second;
            self.fps = self.frames;
            self.frames = 0;
            self.seconds_sampled += 1;
        }
        self.fps
    }

    /// Most recently published frames-per-second
    pub fn fps(&self) -> u32 {
        self.fps
    }

    /// Frames recorded since creation
    pub fn total_frames(&self) -> u64 {
        self.total_frames
    }

    /// Number of second boundaries that have published a sample
    pub fn seconds_sampled(&self) -> u64 {
        self.seconds_sampled
    }
}

impl Default for FpsCounter {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fps_publishes_on_second_change() {
        let mut fps = FpsCounter::new();
        // 60 frames inside second 0: nothing published yet
        for i in 1..=60 {
            let t = Duration::from_micros(16_667 * i);
            fps.frame(t);
        }
        assert_eq!(fps.seconds_sampled(), 1);
        assert_eq!(fps.fps(), 60);
    }

    #[test]
    fn test_fps_counts_total_frames() {
        let mut fps = FpsCounter::new();
        for i in 0..90 {
            fps.frame(Duration::from_millis(10 * i));
        }
        assert_eq!(fps.total_frames(), 90);
    }

    #[test]
    fn test_manual_clock_clones_share_time() {
        let clock = ManualClock::new();
        let copy = clock.clone();
        clock.advance(Duration::from_secs(2));
        assert_eq!(copy.now(), Duration::from_secs(2));
    }
}
