// src/bench.rs

//! The benchmark harness: runs each rasterization strategy in a frame loop
//! against the in-memory surface and reports frame rates.
//!
//! Per frame the harness clears the surface to black and draws one shape
//! sized from the surface, exactly as the original demo did per message-loop
//! idle pass: outer radius `min(w, h) / 2 - 3`, inner radius a third of
//! that; circles use the inner radius, donuts the ring between them.
//! Surfaces of 10x10 or smaller skip the shape and only measure the clear.

use crate::color::{ColorSpec, RgbPixel, CS_RGB, DEFAULT_MANAGER};
use crate::config::Config;
use crate::fps::{FpsCounter, FrameTimer};
use crate::geom::{self, RasterTarget};
use crate::surface::{Surface, SurfaceError};

use anyhow::anyhow;
use log::{debug, info};
use std::fmt;
use std::str::FromStr;
use std::time::{Duration, Instant};

/// Numerator/denominator of the translucent stroke the demo draws with.
const STROKE_MIX: (u32, u32) = (2, 10);

/// The rasterization strategies under test.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TestId {
    /// Clear-only baseline.
    Fill,
    /// Aliased scanline filled circle.
    FilledCircle,
    /// Anti-aliased filled circle.
    FilledCircleAa,
    /// Aliased donut.
    Donut,
    /// Anti-aliased donut.
    DonutAa,
}

impl TestId {
    /// Every test, in suite order.
    pub fn all() -> [TestId; 5] {
        [
            TestId::Fill,
            TestId::FilledCircle,
            TestId::FilledCircleAa,
            TestId::Donut,
            TestId::DonutAa,
        ]
    }

    pub fn name(&self) -> &'static str {
        match self {
            TestId::Fill => "fill",
            TestId::FilledCircle => "circle",
            TestId::FilledCircleAa => "circle-aa",
            TestId::Donut => "donut",
            TestId::DonutAa => "donut-aa",
        }
    }
}

impl fmt::Display for TestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for TestId {
    type Err = anyhow::Error;

    /// Parses a test name, or the digit the demo bound it to.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "fill" | "0" => Ok(TestId::Fill),
            "circle" | "3" => Ok(TestId::FilledCircle),
            "circle-aa" | "4" => Ok(TestId::FilledCircleAa),
            "donut" | "5" => Ok(TestId::Donut),
            "donut-aa" | "6" => Ok(TestId::DonutAa),
            other => Err(anyhow!("unknown test '{}'", other)),
        }
    }
}

/// Result of one benchmarked test.
#[derive(Debug, Clone)]
pub struct BenchReport {
    pub test: TestId,
    pub frames: u64,
    pub elapsed: Duration,
    pub avg_fps: f64,
    /// Longest single frame observed, for stutter hunting.
    pub worst_frame: Duration,
}

impl fmt::Display for BenchReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:<10} {:>8} frames in {:>6.2}s  {:>10.2} fps  (worst frame {:.3}ms)",
            self.test,
            self.frames,
            self.elapsed.as_secs_f64(),
            self.avg_fps,
            self.worst_frame.as_secs_f64() * 1000.0
        )
    }
}

/// Draws spans and edge pixels into a surface with the demo's translucent
/// stroke: interior pixels mix `fill` at 2/10, edge pixels mix `edge` by
/// their actual coverage.
struct MixPainter<'a> {
    surface: &'a mut Surface,
    fill: RgbPixel,
    edge: RgbPixel,
}

impl RasterTarget for MixPainter<'_> {
    fn hline(&mut self, x1: i32, x2: i32, y: i32) {
        let (f, f_max) = STROKE_MIX;
        for x in x1.min(x2)..=x1.max(x2) {
            self.surface.mix_pixel(x, y, f, f_max, self.fill);
        }
    }

    fn coverage(&mut self, x: i32, y: i32, f: i32, f_max: i32) {
        self.surface
            .mix_pixel(x, y, f as u32, f_max as u32, self.edge);
    }
}

/// Owns the surface and fps counter and runs tests against them.
pub struct BenchRunner {
    surface: Surface,
    fps: FpsCounter,
    budget: Duration,
    max_frames: u64,
    warmup_frames: u32,
    background: RgbPixel,
    fill: RgbPixel,
    edge: RgbPixel,
}

impl BenchRunner {
    /// Builds a runner from the configuration. The draw palette is resolved
    /// through the colorspace registry.
    pub fn new(config: &Config) -> Result<Self, SurfaceError> {
        let surface = Surface::new(config.surface.width, config.surface.height)?;
        let mut fps = FpsCounter::new();
        fps.set_recalc_interval(Duration::from_secs_f64(
            config.bench.recalc_interval_ms.max(0.0) / 1000.0,
        ));
        Ok(Self {
            surface,
            fps,
            budget: Duration::from_secs_f64(config.bench.seconds_per_test.max(0.0)),
            max_frames: config.bench.max_frames,
            warmup_frames: config.bench.warmup_frames,
            background: rgb_spec(0.0, 0.0, 0.0),
            fill: rgb_spec(1.0, 1.0, 1.0),
            edge: rgb_spec(1.0, 0.0, 0.0),
        })
    }

    /// Runs a single test to its frame or time budget and reports.
    pub fn run_test(&mut self, test: TestId) -> BenchReport {
        debug!(
            "running test '{}' on {}x{} surface",
            test,
            self.surface.width(),
            self.surface.height()
        );
        for _ in 0..self.warmup_frames {
            self.draw_frame(test);
        }

        self.fps.reset_total();
        let started = Instant::now();
        let mut timer = FrameTimer::new();
        timer.tick();
        let mut frames: u64 = 0;
        let mut worst_frame = Duration::ZERO;
        loop {
            self.draw_frame(test);
            self.fps.on_frame();
            worst_frame = worst_frame.max(timer.tick());
            frames += 1;
            if self.max_frames > 0 && frames >= self.max_frames {
                break;
            }
            if self.max_frames == 0 && started.elapsed() >= self.budget {
                break;
            }
        }
        let elapsed = started.elapsed();
        BenchReport {
            test,
            frames,
            elapsed,
            avg_fps: self.fps.avg_fps(),
            worst_frame,
        }
    }

    /// Runs the given tests in order, logging each report.
    pub fn run_suite(&mut self, tests: &[TestId]) -> Vec<BenchReport> {
        let mut reports = Vec::with_capacity(tests.len());
        for &test in tests {
            let report = self.run_test(test);
            info!("{}", report);
            reports.push(report);
        }
        reports
    }

    /// The windowed fps overlay string, as the demo displayed each frame.
    pub fn overlay(&self, test: TestId) -> String {
        format!("{}fps\n{}", self.fps.fps_string(), test)
    }

    /// Read access for assertions and overlay consumers.
    pub fn surface(&self) -> &Surface {
        &self.surface
    }

    fn draw_frame(&mut self, test: TestId) {
        self.surface.fill(self.background);

        let w = self.surface.width();
        let h = self.surface.height();
        if w <= 10 || h <= 10 {
            return;
        }
        let r_out = w.min(h) / 2 - 3;
        let r_in = r_out / 3;
        let cx = w / 2;
        let cy = h / 2;

        let mut painter = MixPainter {
            surface: &mut self.surface,
            fill: self.fill,
            edge: self.edge,
        };
        match test {
            TestId::Fill => {}
            TestId::FilledCircle => geom::filled_circle(cx, cy, r_in, &mut painter),
            TestId::FilledCircleAa => geom::filled_circle_aa(cx, cy, r_in, &mut painter),
            TestId::Donut => geom::donut(cx, cy, r_in, r_out - r_in, &mut painter),
            TestId::DonutAa => geom::donut_aa(cx, cy, r_in, r_out - r_in, &mut painter),
        }
    }
}

/// Resolves an RGB triple through the registry into a pixel.
fn rgb_spec(r: f32, g: f32, b: f32) -> RgbPixel {
    let mut spec = ColorSpec::new(&DEFAULT_MANAGER);
    spec.init_new(CS_RGB)
        .expect("RGB colorspace is registered in the default manager");
    spec.set_colorant(0, r);
    spec.set_colorant(1, g);
    spec.set_colorant(2, b);
    spec.to_rgb_fast()
}

/// Parses the configured test filter into an ordered suite; an empty filter
/// selects every test.
pub fn select_tests(filter: &[String]) -> anyhow::Result<Vec<TestId>> {
    if filter.is_empty() {
        return Ok(TestId::all().to_vec());
    }
    filter.iter().map(|name| name.parse()).collect()
}
