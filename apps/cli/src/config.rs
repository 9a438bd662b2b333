//! Scenario files and command-line overrides.

use anyhow::{Context, Result};
use circ_core::{HousingVolumes, MaterialConstants, PolicyInput};
use circ_engine::SimulationEngine;
use serde::Deserialize;
use std::fs;
use std::path::Path;
use tracing::info;

/// Scenario B defaults from the comparison panel.
pub fn default_scenario_b() -> PolicyInput {
    PolicyInput::new(0.6, 0.3, 0.5)
}

/// YAML scenario file. Every section is optional.
#[derive(Debug, Default, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ScenarioFile {
    #[serde(default)]
    pub volumes: Option<HousingVolumes>,
    #[serde(default)]
    pub policy: Option<PolicyInput>,
    #[serde(default)]
    pub scenario_a: Option<PolicyInput>,
    #[serde(default)]
    pub scenario_b: Option<PolicyInput>,
    #[serde(default)]
    pub constants: Option<MaterialConstants>,
}

impl ScenarioFile {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path)
            .with_context(|| format!("failed to read scenario file {}", path.display()))?;
        let file = Self::from_yaml(&text)
            .with_context(|| format!("failed to parse scenario file {}", path.display()))?;
        info!(path = %path.display(), "loaded scenario file");
        Ok(file)
    }

    pub fn from_yaml(text: &str) -> Result<Self> {
        // An empty document deserializes to unit, not a map.
        if text.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml::from_str(text)?)
    }

    /// Engine over the file's constants (or the default table), validated.
    pub fn engine(&self) -> Result<SimulationEngine> {
        let constants = self.constants.unwrap_or_default();
        SimulationEngine::try_new(constants).context("invalid material constants")
    }

    pub fn policy(&self) -> PolicyInput {
        self.policy.unwrap_or_default()
    }

    pub fn scenario_a(&self) -> PolicyInput {
        self.scenario_a.unwrap_or_default()
    }

    pub fn scenario_b(&self) -> PolicyInput {
        self.scenario_b.unwrap_or_else(default_scenario_b)
    }
}

/// Per-field overrides supplied on the command line.
#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct PolicyOverrides {
    pub concrete_recycle: Option<f64>,
    pub soil_reuse: Option<f64>,
    pub max_rca_permitted: Option<f64>,
}

impl PolicyOverrides {
    pub fn apply(&self, base: PolicyInput) -> PolicyInput {
        PolicyInput {
            concrete_recycle: self.concrete_recycle.unwrap_or(base.concrete_recycle),
            soil_reuse: self.soil_reuse.unwrap_or(base.soil_reuse),
            max_rca_permitted: self.max_rca_permitted.unwrap_or(base.max_rca_permitted),
        }
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct VolumeOverrides {
    pub houses_built: Option<u64>,
    pub houses_demolished: Option<u64>,
}

impl VolumeOverrides {
    pub fn apply(&self, base: HousingVolumes) -> HousingVolumes {
        HousingVolumes {
            houses_built: self.houses_built.unwrap_or(base.houses_built),
            houses_demolished: self.houses_demolished.unwrap_or(base.houses_demolished),
        }
    }
}

/// Flags beat the file, the file beats built-in defaults.
pub fn resolve_volumes(file: &ScenarioFile, overrides: VolumeOverrides) -> HousingVolumes {
    overrides.apply(file.volumes.unwrap_or_default())
}
