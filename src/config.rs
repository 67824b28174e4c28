// src/config.rs

//! Run configuration for the benchmark.
//!
//! Deserialized from an optional JSON file; every field has a default so a
//! partial file (or none at all) works. Defaults follow the original demo:
//! a 400x400 surface and a 0.2 second fps recalc interval.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use anyhow::Context;

/// Complete benchmark configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    /// Dimensions of the render surface.
    pub surface: SurfaceConfig,
    /// Benchmark loop settings.
    pub bench: BenchConfig,
}

/// Render surface dimensions.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SurfaceConfig {
    pub width: i32,
    pub height: i32,
}

impl Default for SurfaceConfig {
    fn default() -> Self {
        SurfaceConfig {
            width: 400,
            height: 400,
        }
    }
}

/// Benchmark loop settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BenchConfig {
    /// Wall-clock budget per test, in seconds.
    pub seconds_per_test: f64,
    /// Hard frame cap per test; 0 means the time budget alone decides.
    pub max_frames: u64,
    /// Frames rendered before measurement starts, to warm caches.
    pub warmup_frames: u32,
    /// Refresh interval of the windowed fps figure, in milliseconds.
    pub recalc_interval_ms: f64,
    /// Test names to run; empty runs the full suite. Accepts the same names
    /// and digit shorthands as `TestId::from_str`.
    pub tests: Vec<String>,
}

impl Default for BenchConfig {
    fn default() -> Self {
        BenchConfig {
            seconds_per_test: 2.0,
            max_frames: 0,
            warmup_frames: 8,
            recalc_interval_ms: 200.0,
            tests: Vec::new(),
        }
    }
}

impl Config {
    /// Loads configuration from a JSON file, or the defaults when no path is
    /// given.
    pub fn load(path: Option<&Path>) -> anyhow::Result<Self> {
        match path {
            None => Ok(Config::default()),
            Some(path) => {
                let text = fs::read_to_string(path)
                    .with_context(|| format!("failed to read config file {}", path.display()))?;
                serde_json::from_str(&text)
                    .with_context(|| format!("failed to parse config file {}", path.display()))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_the_demo_constants() {
        let config = Config::default();
        assert_eq!(config.surface.width, 400);
        assert_eq!(config.surface.height, 400);
        assert_eq!(config.bench.recalc_interval_ms, 200.0);
        assert_eq!(config.bench.max_frames, 0);
        assert!(config.bench.tests.is_empty());
    }

    #[test]
    fn partial_json_overrides_only_named_fields() {
        let config: Config = serde_json::from_str(
            r#"{ "surface": { "width": 128 }, "bench": { "max_frames": 50 } }"#,
        )
        .unwrap();
        assert_eq!(config.surface.width, 128);
        assert_eq!(config.surface.height, 400);
        assert_eq!(config.bench.max_frames, 50);
        assert_eq!(config.bench.seconds_per_test, 2.0);
    }

    #[test]
    fn missing_config_path_yields_defaults() {
        let config = Config::load(None).unwrap();
        assert_eq!(config.surface.width, 400);
    }
}
