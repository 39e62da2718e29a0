//! Configuration for map behavior.
//!
//! Every section has sensible defaults, so a JSON document only needs to name
//! the values it changes. Animation settings also come as presets through
//! [`AnimationProfile`].

use crate::animation::interpolation::AnimationType;
use crate::core::constants::{
    ANIMATION_DURATION_DEFAULT, ANIMATION_DURATION_LONG, ANIMATION_DURATION_SHORT,
    ANIMATION_SMOOTHNESS_DEFAULT, ANIMATION_SMOOTHNESS_HIGH, ANIMATION_SMOOTHNESS_LOW,
    DEFAULT_CACHE_CAPACITY,
};
use crate::layers::loading::LoadingTileConfig;
use crate::Result;
use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MapConfig {
    /// Treat the world as cyclic instead of bounded
    pub wrap_map: bool,
    pub loading: LoadingTileConfig,
    pub animation: AnimationConfig,
    /// Capacity of the bundled in-memory tile cache
    pub cache_capacity: usize,
}

impl Default for MapConfig {
    fn default() -> Self {
        Self {
            wrap_map: false,
            loading: LoadingTileConfig::default(),
            animation: AnimationConfig::default(),
            cache_capacity: DEFAULT_CACHE_CAPACITY,
        }
    }
}

impl MapConfig {
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn with_animation_profile(mut self, profile: AnimationProfile) -> Self {
        self.animation = profile.resolve();
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnimationConfig {
    /// Number of discrete steps per pan
    pub smoothness: u32,
    /// Total pan duration
    pub duration_ms: u64,
    /// How long a discrete zoom in/out stays pending
    pub zoom_duration_ms: u64,
    pub default_type: AnimationType,
    /// Jump to the target of a pan that gets replaced by a new one
    pub snap_interrupted: bool,
}

impl AnimationConfig {
    pub fn duration(&self) -> Duration {
        Duration::from_millis(self.duration_ms)
    }

    pub fn zoom_duration(&self) -> Duration {
        Duration::from_millis(self.zoom_duration_ms)
    }
}

impl Default for AnimationConfig {
    fn default() -> Self {
        AnimationProfile::Balanced.resolve()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum AnimationProfile {
    #[default]
    Balanced,
    /// Few steps, short duration
    Fast,
    /// Many steps, long decelerating pans
    Smooth,
    Custom(AnimationConfig),
}

impl AnimationProfile {
    pub fn resolve(&self) -> AnimationConfig {
        match self {
            Self::Balanced => AnimationConfig {
                smoothness: ANIMATION_SMOOTHNESS_DEFAULT,
                duration_ms: ANIMATION_DURATION_DEFAULT,
                zoom_duration_ms: ANIMATION_DURATION_SHORT,
                default_type: AnimationType::Linear,
                snap_interrupted: false,
            },
            Self::Fast => AnimationConfig {
                smoothness: ANIMATION_SMOOTHNESS_LOW,
                duration_ms: ANIMATION_DURATION_SHORT,
                zoom_duration_ms: ANIMATION_DURATION_SHORT,
                default_type: AnimationType::Linear,
                snap_interrupted: true,
            },
            Self::Smooth => AnimationConfig {
                smoothness: ANIMATION_SMOOTHNESS_HIGH,
                duration_ms: ANIMATION_DURATION_LONG,
                zoom_duration_ms: ANIMATION_DURATION_DEFAULT,
                default_type: AnimationType::HalfCosine,
                snap_interrupted: false,
            },
            Self::Custom(config) => *config,
        }
    }
}
