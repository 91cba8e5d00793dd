//! Tunables for the review queue and the swipe gesture
//!
//! Defaults are compiled in. An optional `.config/sift-rs.json` overrides any
//! subset of them:
//!
//! ```json
//! { "review": { "batch_size": 50 }, "gesture": { "commit_threshold": 150.0 } }
//! ```

use std::path::Path;
use std::time::Duration;

use anyhow::Result;
use serde::Deserialize;

const CONFIG_FILE: &str = ".config/sift-rs.json";

/// Paging of a review session
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct ReviewConfig {
    /// Tracks requested per page
    pub batch_size: u32,
    /// Remaining buffered tracks at which the next page is requested
    pub preload_threshold: usize,
}

impl Default for ReviewConfig {
    fn default() -> Self {
        Self {
            batch_size: 25,
            preload_threshold: 5,
        }
    }
}

/// Thresholds and timings of the swipe gesture, in pixels and milliseconds
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct GestureConfig {
    /// Movement before a drag is treated as a swipe
    pub start_slop: f32,
    /// Horizontal distance that shows the keep/remove preview
    pub activation_threshold: f32,
    /// Horizontal distance past which a release commits
    pub commit_threshold: f32,
    /// Where the card flies to after a commit
    pub fling_target: f32,
    pub fling_duration_ms: u64,
    pub settle_duration_ms: u64,
    /// Horizontal distance mapped to `max_rotation_deg`
    pub rotation_range: f32,
    pub max_rotation_deg: f32,
}

impl Default for GestureConfig {
    fn default() -> Self {
        Self {
            start_slop: 20.0,
            activation_threshold: 50.0,
            commit_threshold: 120.0,
            fling_target: 500.0,
            fling_duration_ms: 300,
            settle_duration_ms: 250,
            rotation_range: 200.0,
            max_rotation_deg: 30.0,
        }
    }
}

impl GestureConfig {
    pub fn fling_duration(&self) -> Duration {
        Duration::from_millis(self.fling_duration_ms)
    }

    pub fn settle_duration(&self) -> Duration {
        Duration::from_millis(self.settle_duration_ms)
    }
}

#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub review: ReviewConfig,
    pub gesture: GestureConfig,
}

impl AppConfig {
    /// Load the config file, falling back to defaults when it is missing or broken
    pub fn load() -> Self {
        match Self::load_from(Path::new(CONFIG_FILE)) {
            Ok(Some(config)) => {
                tracing::info!(path = CONFIG_FILE, "Loaded configuration");
                config
            }
            Ok(None) => Self::default(),
            Err(e) => {
                tracing::warn!(path = CONFIG_FILE, error = %e, "Ignoring unreadable configuration");
                Self::default()
            }
        }
    }

    fn load_from(path: &Path) -> Result<Option<Self>> {
        if !path.exists() {
            return Ok(None);
        }
        let content = std::fs::read_to_string(path)?;
        Ok(Some(Self::parse(&content)?))
    }

    pub fn parse(content: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(content)?;
        if config.review.batch_size == 0 {
            anyhow::bail!("review.batch_size must be positive");
        }
        Ok(config)
    }
}
