// src/fps.rs

//! Frame-rate accounting for the benchmark loop.
//!
//! `FpsCounter` keeps two figures: a windowed rate that refreshes once per
//! recalc interval (cheap enough to overlay every frame), and a running
//! average over everything since the last `reset_total` (the number a
//! benchmark actually reports). `FrameTimer` measures single frame deltas.
//!
//! All arithmetic is driven by explicit `Instant`s internally so the math is
//! testable without sleeping; the public methods sample the real clock.

use std::time::{Duration, Instant};

/// Frames-per-second counter. Call `on_frame` once per rendered frame.
#[derive(Debug, Clone)]
pub struct FpsCounter {
    fps: f64,
    frames_in_window: u32,
    window_start: Instant,
    recalc_interval: Duration,
    total_frames: u64,
    total_start: Instant,
}

impl FpsCounter {
    pub fn new() -> Self {
        let now = Instant::now();
        Self {
            fps: 0.0,
            frames_in_window: 0,
            window_start: now,
            recalc_interval: Duration::ZERO,
            total_frames: 0,
            total_start: now,
        }
    }

    /// Sets how often the windowed figure refreshes. Zero refreshes every
    /// frame.
    pub fn set_recalc_interval(&mut self, interval: Duration) {
        self.recalc_interval = interval;
    }

    /// Records one frame.
    pub fn on_frame(&mut self) {
        self.on_frame_at(Instant::now());
    }

    fn on_frame_at(&mut self, now: Instant) {
        self.frames_in_window += 1;
        self.total_frames += 1;
        let elapsed = now.saturating_duration_since(self.window_start);
        if elapsed > self.recalc_interval {
            self.fps = self.frames_in_window as f64 / elapsed.as_secs_f64().max(f64::MIN_POSITIVE);
            self.frames_in_window = 0;
            self.window_start = now;
        }
    }

    /// Restarts the running average, e.g. when the benchmark switches tests.
    pub fn reset_total(&mut self) {
        self.reset_total_at(Instant::now());
    }

    fn reset_total_at(&mut self, now: Instant) {
        self.total_frames = 0;
        self.total_start = now;
    }

    /// Windowed rate as of the last recalc.
    pub fn fps(&self) -> f64 {
        self.fps
    }

    /// Average rate since the last `reset_total`.
    pub fn avg_fps(&self) -> f64 {
        self.avg_fps_at(Instant::now())
    }

    fn avg_fps_at(&self, now: Instant) -> f64 {
        let elapsed = now.saturating_duration_since(self.total_start).as_secs_f64();
        if elapsed <= 0.0 {
            return 0.0;
        }
        self.total_frames as f64 / elapsed
    }

    /// Frames counted since the last `reset_total`.
    pub fn total_frames(&self) -> u64 {
        self.total_frames
    }

    /// Windowed rate formatted for overlay display, e.g. `"59.94"`.
    pub fn fps_string(&self) -> String {
        format!("{:.2}", self.fps())
    }

    /// Average rate formatted for reports.
    pub fn avg_fps_string(&self) -> String {
        format!("{:.2}", self.avg_fps())
    }
}

impl Default for FpsCounter {
    fn default() -> Self {
        Self::new()
    }
}

/// Measures the delta between consecutive `tick` calls.
#[derive(Debug, Clone)]
pub struct FrameTimer {
    last_tick: Option<Instant>,
    delta: Duration,
}

impl FrameTimer {
    pub fn new() -> Self {
        Self {
            last_tick: None,
            delta: Duration::ZERO,
        }
    }

    /// Marks the end of a frame and returns the time since the previous
    /// tick. The first tick returns zero.
    pub fn tick(&mut self) -> Duration {
        self.tick_at(Instant::now())
    }

    fn tick_at(&mut self, now: Instant) -> Duration {
        if let Some(last) = self.last_tick {
            self.delta = now.saturating_duration_since(last);
        }
        self.last_tick = Some(now);
        self.delta
    }

    /// Delta recorded by the most recent tick.
    pub fn last_delta(&self) -> Duration {
        self.delta
    }
}

impl Default for FrameTimer {
    fn default() -> Self {
        Self::new()
    }
}
