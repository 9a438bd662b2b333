//! One-lever sensitivity sweeps.

use crate::{SimError, SimulationEngine};
use circ_core::{validate_policy, HousingVolumes, PolicyInput, PolicyLever, SimulationResult};
use serde::Serialize;
use tracing::debug;

/// Largest grid accepted by [`sweep`]; points are allocated up front.
pub const MAX_SWEEP_STEPS: usize = 10_001;

/// Result of one grid point.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct SweepPoint {
    pub lever: PolicyLever,
    pub value: f64,
    pub result: SimulationResult,
}

/// Evaluate `steps` evenly spaced values of `lever` across [0,1], endpoints included.
///
/// `steps` must lie in `2..=MAX_SWEEP_STEPS`.
/// The other two levers stay at their `base` values, which must be valid.
/// Points are returned in ascending lever order.
pub fn sweep(
    engine: &SimulationEngine,
    base: &PolicyInput,
    volumes: HousingVolumes,
    lever: PolicyLever,
    steps: usize,
) -> Result<Vec<SweepPoint>, SimError> {
    if !(2..=MAX_SWEEP_STEPS).contains(&steps) {
        return Err(SimError::InvalidSweep { steps });
    }
    validate_policy(base)?;
    let last = (steps - 1) as f64;
    let points: Vec<SweepPoint> = (0..steps)
        .map(|i| {
            let value = i as f64 / last;
            let policy = base.with_lever(lever, value);
            SweepPoint {
                lever,
                value,
                result: engine.simulate(&policy, volumes),
            }
        })
        .collect();
    debug!(?lever, steps, "sweep complete");
    Ok(points)
}
