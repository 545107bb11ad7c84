//! LOD generation settings with JSON persistence

use crate::thresholds::plan_thresholds;
use lodcrate_core::{Error, Result};
use lodcrate_simplification::{
    DecimationMode, EdgeCollapseDecimator, MatchPriority, DEFAULT_REBUILD_INTERVAL,
    DEFAULT_WELD_EPSILON,
};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Tunables shared by every per-material decimator
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DecimatorSettings {
    /// Collapses between full rebuilds of the sorted edge array
    pub rebuild_interval: usize,
    /// Grid cell size for treating unwelded vertices as one location
    pub weld_epsilon: f32,
    /// Which adjacency test wins when both find a candidate
    pub match_priority: MatchPriority,
}

impl Default for DecimatorSettings {
    fn default() -> Self {
        Self {
            rebuild_interval: DEFAULT_REBUILD_INTERVAL,
            weld_epsilon: DEFAULT_WELD_EPSILON,
            match_priority: MatchPriority::Nearest,
        }
    }
}

impl DecimatorSettings {
    /// Build a decimator running in `mode` with these tunables
    pub fn decimator(&self, mode: DecimationMode) -> EdgeCollapseDecimator {
        EdgeCollapseDecimator::with_params(
            mode,
            self.rebuild_interval,
            self.weld_epsilon,
            self.match_priority,
        )
    }
}

/// Complete LOD generation configuration.
///
/// `decimation_ratios` holds `levels` ratios per material, sliced
/// contiguously: material `i` owns `[i * levels, (i + 1) * levels)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LodConfig {
    /// Flat per-material, per-level decimation ratios in [0, 1]
    pub decimation_ratios: Vec<f32>,
    /// One traversal mode per material (`0` or `1`)
    pub decimation_modes: Vec<DecimationMode>,
    /// Threshold of the most detailed level
    pub transition_start: f32,
    /// Threshold below which the object is culled
    pub culled: f32,
    /// Decimator tunables
    pub decimator: DecimatorSettings,
}

impl Default for LodConfig {
    fn default() -> Self {
        Self {
            decimation_ratios: vec![0.5, 0.8],
            decimation_modes: vec![DecimationMode::SmallestFirst],
            transition_start: 0.6,
            culled: 0.02,
            decimator: DecimatorSettings::default(),
        }
    }
}

impl LodConfig {
    /// Single-mode configuration applying the same ratios to every material
    pub fn uniform(
        material_count: usize,
        level_ratios: &[f32],
        mode: DecimationMode,
        transition_start: f32,
        culled: f32,
    ) -> Self {
        Self {
            decimation_ratios: level_ratios.repeat(material_count),
            decimation_modes: vec![mode; material_count],
            transition_start,
            culled,
            decimator: DecimatorSettings::default(),
        }
    }

    /// Decimated levels per material (level 0, the originals, not counted)
    pub fn level_count(&self, material_count: usize) -> Result<usize> {
        if material_count == 0 {
            return Err(Error::InvalidConfiguration(
                "At least one material group is required".to_string(),
            ));
        }
        if self.decimation_ratios.len() % material_count != 0 {
            return Err(Error::InvalidConfiguration(format!(
                "{} decimation ratios cannot be split evenly across {} materials",
                self.decimation_ratios.len(),
                material_count
            )));
        }
        Ok(self.decimation_ratios.len() / material_count)
    }

    /// Check every rule that does not depend on the model.
    pub fn validate(&self) -> Result<()> {
        if let Some(bad) = self
            .decimation_ratios
            .iter()
            .find(|r| !(0.0..=1.0).contains(*r))
        {
            return Err(Error::InvalidConfiguration(format!(
                "Decimation ratio must be between 0.0 and 1.0, got {}",
                bad
            )));
        }
        for (name, value) in [("transition_start", self.transition_start), ("culled", self.culled)] {
            if !(0.0..=1.0).contains(&value) {
                return Err(Error::InvalidConfiguration(format!(
                    "{} must be between 0.0 and 1.0, got {}",
                    name, value
                )));
            }
        }
        if self.transition_start <= self.culled {
            return Err(Error::InvalidConfiguration(format!(
                "transition_start ({}) must be greater than culled ({})",
                self.transition_start, self.culled
            )));
        }
        self.decimator.decimator(DecimationMode::default()).validate()
    }

    /// Check every rule, including those tied to the number of materials.
    pub fn validate_for(&self, material_count: usize) -> Result<()> {
        self.validate()?;
        let levels = self.level_count(material_count)?;
        plan_thresholds(self.transition_start, self.culled, levels + 1)?;
        if self.decimation_modes.len() != material_count {
            return Err(Error::InvalidConfiguration(format!(
                "Expected {} decimation modes (one per material), got {}",
                material_count,
                self.decimation_modes.len()
            )));
        }
        Ok(())
    }

    pub fn from_json_str(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| Error::Serialization(e.to_string()))
    }

    pub fn to_json_string(&self) -> Result<String> {
        serde_json::to_string_pretty(self).map_err(|e| Error::Serialization(e.to_string()))
    }

    /// Load a configuration from a JSON file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    /// Write the configuration as pretty-printed JSON
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        std::fs::write(path, self.to_json_string()?)?;
        Ok(())
    }
}
