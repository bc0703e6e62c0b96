use crate::scene::Vec3Data;
use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::Path;

fn default_gravity() -> Vec3Data {
    Vec3Data { x: 0.0, y: -9.81, z: 0.0 }
}

fn default_fixed_timestep() -> f32 {
    1.0 / 60.0
}

const fn default_history_capacity() -> usize {
    50
}

const fn default_duplicate_offset() -> f32 {
    1.1
}

const fn default_collider_epsilon() -> f32 {
    1e-3
}

#[derive(Debug, Clone, Deserialize)]
pub struct EngineConfig {
    #[serde(default = "default_gravity")]
    pub gravity: Vec3Data,
    #[serde(default = "default_fixed_timestep")]
    pub fixed_timestep: f32,
    #[serde(default = "default_history_capacity")]
    pub history_capacity: usize,
    /// Single-axis offset applied to duplicated objects so the copy does not
    /// spawn inside the original.
    #[serde(default = "default_duplicate_offset")]
    pub duplicate_offset: f32,
    /// Minimum collider half-extent. Zero-volume scales are clamped to this
    /// so a degenerate collider never reaches the solver.
    #[serde(default = "default_collider_epsilon")]
    pub collider_epsilon: f32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            gravity: default_gravity(),
            fixed_timestep: default_fixed_timestep(),
            history_capacity: default_history_capacity(),
            duplicate_offset: default_duplicate_offset(),
            collider_epsilon: default_collider_epsilon(),
        }
    }
}

impl EngineConfig {
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let bytes =
            fs::read(path).with_context(|| format!("Failed to read config file {}", path.display()))?;
        let cfg = serde_json::from_slice(&bytes)
            .with_context(|| format!("Failed to parse config file {}", path.display()))?;
        Ok(cfg)
    }

    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        match Self::load(path) {
            Ok(cfg) => cfg,
            Err(err) => {
                log::warn!("config load error: {err:?}; falling back to defaults");
                Self::default()
            }
        }
    }
}
