#![deny(warnings)]

//! Material-flow and CO₂ simulation for a housing construction/demolition cycle.
//!
//! This crate provides:
//! - [`SimulationEngine`]: one deterministic run from policy levers and volumes
//! - [`compare`]: two independent runs tabulated side by side
//! - [`sweep`]: a one-lever sensitivity grid over [0,1]

use circ_core::{
    validate_constants, validate_policy, Co2Breakdown, HousingVolumes, MaterialConstants,
    PolicyInput, SimulationResult, ValidationError,
};
use std::fmt;
use thiserror::Error;
use tracing::{debug, warn};

mod compare;
mod sweep;

pub use compare::{compare, try_compare, ComparisonResult, ComparisonRow};
pub use sweep::{sweep, SweepPoint, MAX_SWEEP_STEPS};

/// Which side of a comparison an error belongs to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Scenario {
    A,
    B,
}

impl fmt::Display for Scenario {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scenario::A => f.write_str("scenario A"),
            Scenario::B => f.write_str("scenario B"),
        }
    }
}

/// Errors produced by the checked entry points.
#[derive(Debug, Error, PartialEq)]
pub enum SimError {
    /// Policy or constants failed validation.
    #[error("invalid input: {0}")]
    InvalidInput(#[from] ValidationError),
    /// One side of a comparison failed validation.
    #[error("{scenario}: {source}")]
    InvalidScenario {
        scenario: Scenario,
        #[source]
        source: ValidationError,
    },
    /// A sweep needs both endpoints of [0,1] and a bounded grid.
    #[error("sweep needs between 2 and {} steps, got {steps}", MAX_SWEEP_STEPS)]
    InvalidSweep { steps: usize },
}

/// Stateless calculator over an immutable constants table.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct SimulationEngine {
    constants: MaterialConstants,
}

impl SimulationEngine {
    pub fn new(constants: MaterialConstants) -> Self {
        Self { constants }
    }

    /// Build an engine after checking the constants table.
    pub fn try_new(constants: MaterialConstants) -> Result<Self, SimError> {
        validate_constants(&constants)?;
        Ok(Self::new(constants))
    }

    pub fn constants(&self) -> &MaterialConstants {
        &self.constants
    }

    /// Run one simulation.
    ///
    /// Inputs are not range-checked: out-of-range fractions produce
    /// physically meaningless (possibly negative) tonnages rather than an
    /// error. Use [`SimulationEngine::try_simulate`] to reject them.
    ///
    /// Recycled aggregate counted as used is the smaller of the recycled
    /// supply and the regulatory ceiling applied to total demand. Cement
    /// emissions scale with total demand, since recycled aggregate carries
    /// no reusable binder.
    pub fn simulate(&self, policy: &PolicyInput, volumes: HousingVolumes) -> SimulationResult {
        let c = &self.constants;
        let built = volumes.houses_built as f64;
        let demolished = volumes.houses_demolished as f64;

        let concrete_demand = built * c.concrete_per_house;
        let concrete_deconstructed = demolished * c.concrete_per_deconstructed_house;
        let soil_recovered = demolished * c.soil_per_deconstructed_house;

        let recycled = concrete_deconstructed * policy.concrete_recycle;
        let reused_soil = soil_recovered * policy.soil_reuse;

        let used_rca = recycled.min(concrete_demand * policy.max_rca_permitted);
        let virgin = concrete_demand - used_rca;
        let virgin_soil = soil_recovered - reused_soil;

        let co2_breakdown = Co2Breakdown {
            cement_production: concrete_demand * c.cement_content_per_tonne * c.emission_cement,
            virgin_aggregate: virgin * c.emission_aggregate,
            transport_virgin: virgin * c.emission_transport_virgin,
            transport_recycled: used_rca * c.emission_transport_recycled,
            waste_processing: concrete_deconstructed * c.emission_waste_processing,
            virgin_soil: virgin_soil * c.emission_soil,
        };
        let total_co2 = co2_breakdown.total();

        debug!(
            ?policy,
            houses_built = volumes.houses_built,
            houses_demolished = volumes.houses_demolished,
            used_rca,
            total_co2,
            "simulation run"
        );

        SimulationResult {
            total_co2,
            recycled_concrete: recycled,
            virgin_aggregate: virgin,
            reused_soil,
            virgin_soil,
            sand_gravel_saved: used_rca,
            co2_breakdown,
            concrete_demand,
            concrete_deconstructed,
            soil_recovered,
        }
    }

    /// Validate the policy, then run [`SimulationEngine::simulate`].
    pub fn try_simulate(
        &self,
        policy: &PolicyInput,
        volumes: HousingVolumes,
    ) -> Result<SimulationResult, SimError> {
        if let Err(e) = validate_policy(policy) {
            warn!(?policy, error = %e, "rejecting policy");
            return Err(e.into());
        }
        Ok(self.simulate(policy, volumes))
    }
}
