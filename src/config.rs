use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use tracing::warn;

use crate::core::hexgrid::HexGridParams;
use crate::core::point_id::Point;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GridConfig {
    #[serde(default = "GridConfig::default_a_limit")]
    pub a_limit: f64,
    #[serde(default = "GridConfig::default_row_height")]
    pub row_height: f64,
    /// Load this point graph instead of building the hexagonal grid.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub points_path: Option<String>,
}

impl GridConfig {
    fn default_a_limit() -> f64 {
        24.0
    }
    fn default_row_height() -> f64 {
        4.75
    }

    pub fn hex_params(&self) -> HexGridParams {
        HexGridParams {
            a_limit: self.a_limit,
            row_height: self.row_height,
        }
    }
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            a_limit: Self::default_a_limit(),
            row_height: Self::default_row_height(),
            points_path: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SamplerConfig {
    #[serde(default = "SamplerConfig::default_batch_size")]
    pub batch_size: usize,
    /// Keep a location active after a seen refinement trial (threshold is
    /// recorded, priority is not cleared).
    #[serde(default)]
    pub legacy_half_step: bool,
    /// Point the first anchor is chosen nearest to; `(a_limit/2, a_limit/2)`
    /// when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub anchor_target: Option<Point>,
}

impl SamplerConfig {
    fn default_batch_size() -> usize {
        8
    }
}

impl Default for SamplerConfig {
    fn default() -> Self {
        Self {
            batch_size: Self::default_batch_size(),
            legacy_half_step: false,
            anchor_target: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ObserverConfig {
    /// Fixed RNG seed; fresh entropy when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
    /// Exclusive upper bound on the number of field defects.
    #[serde(default = "ObserverConfig::default_max_defects")]
    pub max_defects: usize,
    /// Confidence is `min(gain * U(0,1), 1)`.
    #[serde(default = "ObserverConfig::default_confidence_gain")]
    pub confidence_gain: f64,
}

impl ObserverConfig {
    fn default_max_defects() -> usize {
        3
    }
    fn default_confidence_gain() -> f64 {
        5.0
    }
}

impl Default for ObserverConfig {
    fn default() -> Self {
        Self {
            seed: None,
            max_defects: Self::default_max_defects(),
            confidence_gain: Self::default_confidence_gain(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RunConfig {
    #[serde(default = "RunConfig::default_max_rounds")]
    pub max_rounds: usize,
}

impl RunConfig {
    fn default_max_rounds() -> usize {
        10_000
    }
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            max_rounds: Self::default_max_rounds(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct AppConfig {
    #[serde(default)]
    pub grid: GridConfig,
    #[serde(default)]
    pub sampler: SamplerConfig,
    #[serde(default)]
    pub observer: ObserverConfig,
    #[serde(default)]
    pub run: RunConfig,
}

impl AppConfig {
    /// Default config with every key commented out; section headers stay live.
    fn commented_defaults(text: &str) -> String {
        let mut out = String::with_capacity(text.len() + 64);
        for line in text.lines() {
            let trimmed = line.trim();
            if !trimmed.is_empty() && !trimmed.starts_with('[') {
                out.push_str("# ");
            }
            out.push_str(line);
            out.push('\n');
        }
        out
    }

    /// Values the sampler cannot run with fall back to their defaults.
    fn sanitized(mut self) -> Self {
        if self.sampler.batch_size == 0 {
            let fallback = SamplerConfig::default_batch_size();
            warn!("sampler.batch_size must be at least 1; using {fallback}");
            self.sampler.batch_size = fallback;
        }
        self
    }

    fn read(path: &str) -> Option<Self> {
        let contents = fs::read_to_string(path)
            .map_err(|err| warn!("Failed to read config {path}: {err}. Using defaults."))
            .ok()?;
        toml::from_str(&contents)
            .map_err(|err| warn!("Failed to parse config {path}: {err}. Using defaults."))
            .ok()
    }

    pub fn load_or_default(path: &str) -> Self {
        if Path::new(path).exists() {
            return Self::read(path).map(Self::sanitized).unwrap_or_default();
        }

        // First run: leave a commented template behind.
        let defaults = Self::default();
        match toml::to_string_pretty(&defaults) {
            Ok(text) => {
                if let Err(err) = fs::write(path, Self::commented_defaults(&text)) {
                    warn!("Failed to write default config to {path}: {err}");
                }
            }
            Err(err) => warn!("Failed to serialize default config: {err}"),
        }
        defaults
    }
}
