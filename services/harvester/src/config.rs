//! Configuration loading for harvest runs.
//!
//! Regions and tuning knobs come from a single YAML file (see
//! `config/regions.yaml`). Everything except the region list has defaults.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use serde::Deserialize;
use streetview_common::Region;
use thiserror::Error;
use tracing::{debug, info, warn};

/// Root configuration loaded from a regions YAML file.
#[derive(Debug, Clone, Deserialize)]
pub struct HarvestConfig {
    /// Root directory; each region gets a sub-directory.
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
    #[serde(default)]
    pub sampling: SamplingConfig,
    #[serde(default)]
    pub imagery: ImageryConfig,
    #[serde(default)]
    pub pacing: PacingConfig,
    pub regions: Vec<Region>,
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("images")
}

/// How many points to place per region and how far apart.
#[derive(Debug, Clone, Deserialize)]
pub struct SamplingConfig {
    /// Points kept along the major axis
    #[serde(default = "default_num_points_major")]
    pub num_points_major: usize,
    /// Stride over the raw step sequence (1 = every step)
    #[serde(default = "default_sample_interval")]
    pub sample_interval: usize,
}

fn default_num_points_major() -> usize {
    75
}

fn default_sample_interval() -> usize {
    2
}

impl Default for SamplingConfig {
    fn default() -> Self {
        Self {
            num_points_major: default_num_points_major(),
            sample_interval: default_sample_interval(),
        }
    }
}

/// Imagery API request parameters.
#[derive(Debug, Clone, Deserialize)]
pub struct ImageryConfig {
    /// Base URL; metadata lives at `{endpoint}/metadata`
    #[serde(default = "default_endpoint")]
    pub endpoint: String,
    #[serde(default = "default_size")]
    pub size: String,
    #[serde(default)]
    pub pitch: i32,
    /// `outdoor` restricts results to official outdoor imagery
    #[serde(default = "default_source")]
    pub source: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_endpoint() -> String {
    "https://maps.googleapis.com/maps/api/streetview".to_string()
}

fn default_size() -> String {
    "640x640".to_string()
}

fn default_source() -> String {
    "outdoor".to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

impl Default for ImageryConfig {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            size: default_size(),
            pitch: 0,
            source: default_source(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl ImageryConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Request pacing: token bucket plus adaptive back-off.
#[derive(Debug, Clone, Deserialize)]
pub struct PacingConfig {
    #[serde(default = "default_requests_per_second")]
    pub requests_per_second: f64,
    #[serde(default = "default_burst")]
    pub burst: u32,
    #[serde(default = "default_max_backoff_secs")]
    pub max_backoff_secs: u64,
}

fn default_requests_per_second() -> f64 {
    1.0
}

fn default_burst() -> u32 {
    1
}

fn default_max_backoff_secs() -> u64 {
    60
}

impl Default for PacingConfig {
    fn default() -> Self {
        Self {
            requests_per_second: default_requests_per_second(),
            burst: default_burst(),
            max_backoff_secs: default_max_backoff_secs(),
        }
    }
}

/// Validation failures for a loaded configuration.
#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("num_points_major must be at least 2, got {0}")]
    TooFewPoints(usize),

    #[error("Invalid pacing: {0}")]
    InvalidPacing(String),

    #[error("Invalid imagery settings: {0}")]
    InvalidImagery(String),

    #[error("Invalid region: {0}")]
    InvalidRegion(String),

    #[error("No region named '{0}' in configuration")]
    UnknownRegion(String),

    #[error("No enabled regions in configuration")]
    NoRegions,
}

impl HarvestConfig {
    /// Load and validate a configuration file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config = Self::from_yaml(&content)
            .with_context(|| format!("Invalid config file: {}", path.display()))?;

        info!(
            path = %path.display(),
            regions = config.regions.len(),
            "Loaded harvest configuration"
        );
        Ok(config)
    }

    /// Parse and validate configuration text.
    pub fn from_yaml(content: &str) -> Result<Self> {
        let config: HarvestConfig =
            serde_yaml::from_str(content).context("Failed to parse YAML")?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.sampling.num_points_major < 2 {
            return Err(ConfigError::TooFewPoints(self.sampling.num_points_major));
        }
        if self.sampling.sample_interval == 0 {
            warn!("sample_interval is 0, every region will produce an empty grid");
        }

        let rps = self.pacing.requests_per_second;
        if !rps.is_finite() || rps <= 0.0 {
            return Err(ConfigError::InvalidPacing(format!(
                "requests_per_second must be positive, got {}",
                rps
            )));
        }
        if Duration::try_from_secs_f64(1.0 / rps).is_err() {
            return Err(ConfigError::InvalidPacing(format!(
                "requests_per_second {} is too small to schedule",
                rps
            )));
        }
        if self.pacing.burst == 0 {
            return Err(ConfigError::InvalidPacing(
                "burst must be at least 1".to_string(),
            ));
        }

        if self.imagery.endpoint.trim().is_empty() {
            return Err(ConfigError::InvalidImagery("endpoint is empty".to_string()));
        }

        for region in &self.regions {
            if region.name.trim().is_empty() {
                return Err(ConfigError::InvalidRegion("region name is empty".to_string()));
            }
            let folder = region.folder_name();
            if folder.is_empty() || folder == "." || folder == ".." {
                return Err(ConfigError::InvalidRegion(format!(
                    "region name '{}' does not produce a usable folder name",
                    region.name
                )));
            }
            region
                .validate()
                .map_err(|e| ConfigError::InvalidRegion(e.to_string()))?;
        }

        Ok(())
    }

    /// Enabled regions in file order, optionally narrowed to one name.
    ///
    /// `only` matches either the region name or its folder name.
    pub fn select_regions(&self, only: Option<&str>) -> Result<Vec<Region>, ConfigError> {
        let selected: Vec<Region> = match only {
            Some(wanted) => {
                let found: Vec<Region> = self
                    .regions
                    .iter()
                    .filter(|r| r.name == wanted || r.folder_name() == wanted)
                    .cloned()
                    .collect();
                if found.is_empty() {
                    return Err(ConfigError::UnknownRegion(wanted.to_string()));
                }
                found
            }
            None => self
                .regions
                .iter()
                .filter(|r| {
                    if !r.enabled {
                        debug!(region = %r.name, "Skipping disabled region");
                    }
                    r.enabled
                })
                .cloned()
                .collect(),
        };

        if selected.is_empty() {
            return Err(ConfigError::NoRegions);
        }
        Ok(selected)
    }
}
