// src/main.rs

// Declare modules
pub mod bench;
pub mod blob;
pub mod color;
pub mod config;
pub mod fps;
pub mod geom;
pub mod surface;

use crate::bench::{select_tests, BenchRunner};
use crate::config::Config;

use anyhow::Context;
use log::info;
use std::path::PathBuf;

/// Main entry point for the `geombench` rasterization benchmark.
fn main() -> anyhow::Result<()> {
    // Initialize the logger. Default filter is "info" if RUST_LOG is not set.
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_micros()
        .init();

    let config_path: Option<PathBuf> = std::env::args().nth(1).map(PathBuf::from);
    let config = Config::load(config_path.as_deref()).context("failed to load configuration")?;
    info!(
        "surface {}x{}, {:.1}s per test",
        config.surface.width, config.surface.height, config.bench.seconds_per_test
    );

    let tests = select_tests(&config.bench.tests).context("invalid test selection")?;
    let mut runner =
        BenchRunner::new(&config).context("failed to build benchmark runner")?;

    let reports = runner.run_suite(&tests);

    println!("test         frames   elapsed      avg fps");
    for report in &reports {
        println!("{}", report);
    }

    Ok(())
}
