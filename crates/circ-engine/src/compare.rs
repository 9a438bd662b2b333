//! Side-by-side evaluation of two policy scenarios.

use crate::{Scenario, SimError, SimulationEngine};
use circ_core::{validate_policy, HousingVolumes, Metric, PolicyInput, SimulationResult};
use serde::Serialize;

/// One metric under both scenarios.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct ComparisonRow {
    pub metric: Metric,
    pub scenario_a: f64,
    pub scenario_b: f64,
}

impl ComparisonRow {
    pub fn label(&self) -> &'static str {
        self.metric.label()
    }

    /// B minus A.
    pub fn delta(&self) -> f64 {
        self.scenario_b - self.scenario_a
    }
}

/// Both full results plus the tabulated headline metrics, in [`Metric::ALL`] order.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ComparisonResult {
    pub rows: Vec<ComparisonRow>,
    pub result_a: SimulationResult,
    pub result_b: SimulationResult,
}

impl ComparisonResult {
    fn from_results(result_a: SimulationResult, result_b: SimulationResult) -> Self {
        let rows = Metric::ALL
            .iter()
            .map(|&metric| ComparisonRow {
                metric,
                scenario_a: result_a.metric(metric),
                scenario_b: result_b.metric(metric),
            })
            .collect();
        Self {
            rows,
            result_a,
            result_b,
        }
    }

    pub fn row(&self, metric: Metric) -> Option<&ComparisonRow> {
        self.rows.iter().find(|r| r.metric == metric)
    }
}

/// Run both scenarios independently against the same volumes.
pub fn compare(
    engine: &SimulationEngine,
    scenario_a: &PolicyInput,
    scenario_b: &PolicyInput,
    volumes: HousingVolumes,
) -> ComparisonResult {
    let result_a = engine.simulate(scenario_a, volumes);
    let result_b = engine.simulate(scenario_b, volumes);
    ComparisonResult::from_results(result_a, result_b)
}

/// Validate both scenarios, then [`compare`]. Scenario A is checked first.
pub fn try_compare(
    engine: &SimulationEngine,
    scenario_a: &PolicyInput,
    scenario_b: &PolicyInput,
    volumes: HousingVolumes,
) -> Result<ComparisonResult, SimError> {
    for (scenario, policy) in [(Scenario::A, scenario_a), (Scenario::B, scenario_b)] {
        validate_policy(policy)
            .map_err(|source| SimError::InvalidScenario { scenario, source })?;
    }
    Ok(compare(engine, scenario_a, scenario_b, volumes))
}

#[cfg(test)]
mod tests {
    use super::*;
    use circ_core::ValidationError;
    use proptest::prelude::*;

    fn volumes() -> HousingVolumes {
        HousingVolumes::new(25_000, 1_500)
    }

    #[test]
    fn rows_follow_metric_order() {
        let engine = SimulationEngine::default();
        let cmp = compare(
            &engine,
            &PolicyInput::new(0.3, 0.2, 0.3),
            &PolicyInput::new(0.6, 0.3, 0.5),
            volumes(),
        );
        let labels: Vec<_> = cmp.rows.iter().map(|r| r.label()).collect();
        assert_eq!(
            labels,
            [
                "Total CO2",
                "Recycled Concrete",
                "Virgin Aggregate",
                "Reused Soil",
                "Virgin Soil",
                "Sand & Gravel Saved"
            ]
        );
    }

    #[test]
    fn default_pair_favours_scenario_b() {
        let engine = SimulationEngine::default();
        let cmp = compare(
            &engine,
            &PolicyInput::new(0.3, 0.2, 0.3),
            &PolicyInput::new(0.6, 0.3, 0.5),
            volumes(),
        );
        let total = cmp.row(Metric::TotalCo2).unwrap();
        assert!(total.delta() < 0.0);
        let saved = cmp.row(Metric::SandGravelSaved).unwrap();
        // 67_500 t * 0.6 = 40_500 t, well under the 625_000 t ceiling.
        assert!((saved.scenario_b - 40_500.0).abs() < 1e-6);
        assert!(saved.delta() > 0.0);
    }

    #[test]
    fn identical_scenarios_have_zero_deltas() {
        let engine = SimulationEngine::default();
        let p = PolicyInput::default();
        let cmp = compare(&engine, &p, &p, volumes());
        assert!(cmp.rows.iter().all(|r| r.delta() == 0.0));
        assert_eq!(cmp.result_a, cmp.result_b);
    }

    #[test]
    fn try_compare_reports_failing_side() {
        let engine = SimulationEngine::default();
        let good = PolicyInput::default();
        let bad = PolicyInput::new(0.3, 0.2, 2.0);
        let err = try_compare(&engine, &good, &bad, volumes()).unwrap_err();
        assert_eq!(
            err,
            SimError::InvalidScenario {
                scenario: Scenario::B,
                source: ValidationError::FractionOutOfRange {
                    field: "max_rca_permitted",
                    value: 2.0
                }
            }
        );
        let err = try_compare(&engine, &bad, &bad, volumes()).unwrap_err();
        assert!(matches!(
            err,
            SimError::InvalidScenario {
                scenario: Scenario::A,
                ..
            }
        ));
        assert!(err.to_string().starts_with("scenario A:"));
    }

    #[test]
    fn concurrent_comparisons_match_sequential() {
        let engine = &SimulationEngine::default();
        let pairs: Vec<(PolicyInput, PolicyInput)> = (0..8)
            .map(|i| {
                let f = i as f64 / 8.0;
                (PolicyInput::new(f, 0.2, 0.3), PolicyInput::new(1.0 - f, 0.4, 0.1))
            })
            .collect();
        let parallel: Vec<ComparisonResult> = std::thread::scope(|s| {
            let handles: Vec<_> = pairs
                .iter()
                .map(|(a, b)| s.spawn(move || compare(engine, a, b, volumes())))
                .collect();
            handles
                .into_iter()
                .map(|h| h.join().expect("comparison thread panicked"))
                .collect()
        });
        for ((a, b), got) in pairs.iter().zip(parallel) {
            assert_eq!(got, compare(engine, a, b, volumes()));
        }
    }

    fn fraction() -> impl Strategy<Value = f64> {
        0.0f64..=1.0
    }

    proptest! {
        #[test]
        fn comparison_equals_separate_runs(a1 in fraction(), a2 in fraction(), a3 in fraction(),
                                           b1 in fraction(), b2 in fraction(), b3 in fraction(),
                                           built in 0u64..100_000, demo in 0u64..20_000) {
            let engine = SimulationEngine::default();
            let a = PolicyInput::new(a1, a2, a3);
            let b = PolicyInput::new(b1, b2, b3);
            let v = HousingVolumes::new(built, demo);
            let cmp = compare(&engine, &a, &b, v);
            let ra = engine.simulate(&a, v);
            let rb = engine.simulate(&b, v);
            prop_assert_eq!(cmp.result_a, ra);
            prop_assert_eq!(cmp.result_b, rb);
            for row in &cmp.rows {
                prop_assert_eq!(row.scenario_a, ra.metric(row.metric));
                prop_assert_eq!(row.scenario_b, rb.metric(row.metric));
            }
        }
    }
}
