//! Text and JSON rendering for simulation output.

use circ_core::{Co2Breakdown, HousingVolumes, PolicyInput, SimulationResult};
use circ_engine::{ComparisonResult, SweepPoint};
use rust_decimal::prelude::FromPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::Serialize;
use std::fmt::{self, Write};

const BAR_WIDTH: usize = 40;

/// Round to two decimal places for display, ties to even.
///
/// Values outside the `Decimal` range (including non-finite ones) fall back
/// to plain float formatting.
pub fn display_value(v: f64) -> String {
    match Decimal::from_f64(v) {
        Some(d) => d
            .round_dp_with_strategy(2, RoundingStrategy::MidpointNearestEven)
            .normalize()
            .to_string(),
        None => format!("{v:.2}"),
    }
}

fn bar(value: f64, max: f64) -> String {
    let len = if max > 0.0 && value > 0.0 {
        ((value / max) * BAR_WIDTH as f64).round() as usize
    } else {
        0
    };
    "#".repeat(len.min(BAR_WIDTH))
}

fn write_inputs(out: &mut String, policy: &PolicyInput, volumes: HousingVolumes) -> fmt::Result {
    writeln!(
        out,
        "Inputs | concrete recycle: {} | soil reuse: {} | max RCA: {} | built: {} | demolished: {}",
        policy.concrete_recycle,
        policy.soil_reuse,
        policy.max_rca_permitted,
        volumes.houses_built,
        volumes.houses_demolished
    )
}

/// Horizontal bar chart of the CO₂ breakdown, scaled to the largest source.
pub fn breakdown_chart(breakdown: &Co2Breakdown) -> Result<String, fmt::Error> {
    let mut out = String::new();
    let max = breakdown
        .entries()
        .iter()
        .map(|(_, v)| *v)
        .fold(0.0_f64, f64::max);
    for (source, kg) in breakdown.entries() {
        writeln!(
            out,
            "{:<22} {:<width$} {} kg",
            source.label(),
            bar(kg, max),
            display_value(kg),
            width = BAR_WIDTH
        )?;
    }
    Ok(out)
}

/// Metric listing plus breakdown chart for a single run.
pub fn run_table(
    policy: &PolicyInput,
    volumes: HousingVolumes,
    result: &SimulationResult,
) -> Result<String, fmt::Error> {
    let mut out = String::new();
    write_inputs(&mut out, policy, volumes)?;
    for (metric, value) in result.metrics() {
        writeln!(
            out,
            "{:<22} {:>20} {}",
            metric.label(),
            display_value(value),
            metric.unit()
        )?;
    }
    writeln!(out)?;
    writeln!(out, "CO2 Emissions Breakdown")?;
    out.push_str(&breakdown_chart(&result.co2_breakdown)?);
    writeln!(
        out,
        "Largest source: {}",
        result.co2_breakdown.dominant().label()
    )?;
    Ok(out)
}

/// Metric | Scenario A | Scenario B | Delta table.
pub fn comparison_table(cmp: &ComparisonResult) -> Result<String, fmt::Error> {
    let mut out = String::new();
    writeln!(
        out,
        "{:<22} {:>20} {:>20} {:>20}",
        "Metric", "Scenario A", "Scenario B", "Delta (B-A)"
    )?;
    for row in &cmp.rows {
        writeln!(
            out,
            "{:<22} {:>20} {:>20} {:>20}",
            row.label(),
            display_value(row.scenario_a),
            display_value(row.scenario_b),
            display_value(row.delta())
        )?;
    }
    Ok(out)
}

/// Paired A/B bars per metric, each pair scaled to its larger value.
pub fn comparison_chart(cmp: &ComparisonResult) -> Result<String, fmt::Error> {
    let mut out = String::new();
    for row in &cmp.rows {
        let max = row.scenario_a.max(row.scenario_b);
        writeln!(out, "{} ({})", row.label(), row.metric.unit())?;
        for (side, value) in [("A", row.scenario_a), ("B", row.scenario_b)] {
            writeln!(
                out,
                "  {side} {:<width$} {}",
                bar(value, max),
                display_value(value),
                width = BAR_WIDTH
            )?;
        }
    }
    Ok(out)
}

pub fn sweep_table(points: &[SweepPoint]) -> Result<String, fmt::Error> {
    let mut out = String::new();
    let lever = points
        .first()
        .map(|p| p.lever.field_name())
        .unwrap_or("lever");
    writeln!(
        out,
        "{:<18} {:>20} {:>20} {:>20}",
        lever, "Total CO2 (kg)", "Saved (t)", "Virgin Agg. (t)"
    )?;
    for p in points {
        writeln!(
            out,
            "{:<18} {:>20} {:>20} {:>20}",
            display_value(p.value),
            display_value(p.result.total_co2),
            display_value(p.result.sand_gravel_saved),
            display_value(p.result.virgin_aggregate)
        )?;
    }
    Ok(out)
}

#[derive(Serialize)]
struct LabelledValue {
    label: &'static str,
    value: f64,
}

#[derive(Serialize)]
struct RunReport<'a> {
    policy: &'a PolicyInput,
    volumes: HousingVolumes,
    metrics: Vec<LabelledValue>,
    co2_breakdown: Vec<LabelledValue>,
    result: &'a SimulationResult,
}

fn breakdown_entries(b: &Co2Breakdown) -> Vec<LabelledValue> {
    b.entries()
        .iter()
        .map(|(s, v)| LabelledValue {
            label: s.label(),
            value: *v,
        })
        .collect()
}

pub fn run_json(
    policy: &PolicyInput,
    volumes: HousingVolumes,
    result: &SimulationResult,
) -> serde_json::Result<String> {
    let report = RunReport {
        policy,
        volumes,
        metrics: result
            .metrics()
            .iter()
            .map(|(m, v)| LabelledValue {
                label: m.label(),
                value: *v,
            })
            .collect(),
        co2_breakdown: breakdown_entries(&result.co2_breakdown),
        result,
    };
    serde_json::to_string_pretty(&report)
}

#[derive(Serialize)]
struct CompareRowReport {
    metric: &'static str,
    scenario_a: f64,
    scenario_b: f64,
    delta: f64,
}

#[derive(Serialize)]
struct CompareReport<'a> {
    volumes: HousingVolumes,
    scenario_a: &'a PolicyInput,
    scenario_b: &'a PolicyInput,
    rows: Vec<CompareRowReport>,
    co2_breakdown_a: Vec<LabelledValue>,
    co2_breakdown_b: Vec<LabelledValue>,
}

pub fn comparison_json(
    scenario_a: &PolicyInput,
    scenario_b: &PolicyInput,
    volumes: HousingVolumes,
    cmp: &ComparisonResult,
) -> serde_json::Result<String> {
    let report = CompareReport {
        volumes,
        scenario_a,
        scenario_b,
        rows: cmp
            .rows
            .iter()
            .map(|r| CompareRowReport {
                metric: r.label(),
                scenario_a: r.scenario_a,
                scenario_b: r.scenario_b,
                delta: r.delta(),
            })
            .collect(),
        co2_breakdown_a: breakdown_entries(&cmp.result_a.co2_breakdown),
        co2_breakdown_b: breakdown_entries(&cmp.result_b.co2_breakdown),
    };
    serde_json::to_string_pretty(&report)
}

pub fn sweep_json(points: &[SweepPoint]) -> serde_json::Result<String> {
    serde_json::to_string_pretty(points)
}

#[cfg(test)]
mod tests {
    use super::*;
    use circ_engine::SimulationEngine;

    fn reference() -> (PolicyInput, HousingVolumes, SimulationResult) {
        let policy = PolicyInput::new(0.3, 0.2, 0.3);
        let volumes = HousingVolumes::new(25_000, 1_500);
        let result = SimulationEngine::default().simulate(&policy, volumes);
        (policy, volumes, result)
    }

    #[test]
    fn values_round_to_two_places() {
        assert_eq!(display_value(1234.5678), "1234.57");
        assert_eq!(display_value(20_250.0), "20250");
        assert_eq!(display_value(0.125), "0.12");
        assert_eq!(display_value(0.375), "0.38");
        assert_eq!(display_value(f64::NAN), "NaN");
        assert_eq!(display_value(1e30), format!("{:.2}", 1e30));
        assert!(display_value(1e30).ends_with(".00"));
    }

    #[test]
    fn run_table_lists_metrics_and_sources() {
        let (policy, volumes, result) = reference();
        let text = run_table(&policy, volumes, &result).unwrap();
        for label in [
            "Total CO2",
            "Recycled Concrete",
            "Sand & Gravel Saved",
            "Cement Production",
            "Transport (Recycled)",
        ] {
            assert!(text.contains(label), "missing {label}");
        }
        assert!(text.contains("399010250"));
        assert!(text.contains("Largest source: Cement Production"));
    }

    #[test]
    fn chart_scales_to_largest_source() {
        let (_, _, result) = reference();
        let chart = breakdown_chart(&result.co2_breakdown).unwrap();
        let first = chart.lines().next().unwrap();
        assert!(first.starts_with("Cement Production"));
        assert_eq!(first.matches('#').count(), BAR_WIDTH);
        assert_eq!(chart.lines().count(), 6);
    }

    #[test]
    fn empty_breakdown_draws_no_bars() {
        let chart = breakdown_chart(&Co2Breakdown::default()).unwrap();
        assert!(!chart.contains('#'));
    }

    #[test]
    fn comparison_json_uses_labels() {
        let engine = SimulationEngine::default();
        let a = PolicyInput::new(0.3, 0.2, 0.3);
        let b = PolicyInput::new(0.6, 0.3, 0.5);
        let v = HousingVolumes::new(25_000, 1_500);
        let cmp = circ_engine::compare(&engine, &a, &b, v);
        let json = comparison_json(&a, &b, v, &cmp).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["rows"][0]["metric"], "Total CO2");
        assert_eq!(value["rows"][5]["metric"], "Sand & Gravel Saved");
        assert_eq!(value["co2_breakdown_b"][3]["label"], "Transport (Recycled)");
        let table = comparison_table(&cmp).unwrap();
        assert_eq!(table.lines().count(), 7);
    }

    #[test]
    fn comparison_chart_pairs_bars_per_metric() {
        let engine = SimulationEngine::default();
        let a = PolicyInput::new(0.3, 0.2, 0.3);
        let b = PolicyInput::new(0.6, 0.3, 0.5);
        let cmp = circ_engine::compare(&engine, &a, &b, HousingVolumes::new(25_000, 1_500));
        let chart = comparison_chart(&cmp).unwrap();
        let lines: Vec<&str> = chart.lines().collect();
        assert_eq!(lines.len(), 18);
        assert_eq!(lines.iter().filter(|l| l.starts_with("  A ")).count(), 6);
        assert_eq!(lines.iter().filter(|l| l.starts_with("  B ")).count(), 6);
        assert_eq!(lines[0], "Total CO2 (kg)");
        // Scenario A emits more, so its bar is full width.
        assert_eq!(lines[1].matches('#').count(), BAR_WIDTH);
        // Scenario B recycles twice as much concrete as A.
        assert_eq!(lines[3], "Recycled Concrete (t)");
        assert_eq!(lines[4].matches('#').count(), BAR_WIDTH / 2);
        assert_eq!(lines[5].matches('#').count(), BAR_WIDTH);
        for pair in lines.chunks(3) {
            let a = pair[1].matches('#').count();
            let b = pair[2].matches('#').count();
            assert!(a == BAR_WIDTH || b == BAR_WIDTH || (a == 0 && b == 0));
        }
    }

    #[test]
    fn comparison_chart_handles_all_zero_row() {
        let engine = SimulationEngine::default();
        let p = PolicyInput::new(0.0, 0.0, 0.0);
        let cmp = circ_engine::compare(&engine, &p, &p, HousingVolumes::new(0, 0));
        let chart = comparison_chart(&cmp).unwrap();
        assert!(!chart.contains('#'));
    }

    #[test]
    fn run_json_carries_labels_and_result() {
        let (policy, volumes, result) = reference();
        let json = run_json(&policy, volumes, &result).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["metrics"][0]["label"], "Total CO2");
        assert_eq!(value["co2_breakdown"][0]["label"], "Cement Production");
        let total = value["result"]["total_co2"].as_f64().unwrap();
        assert!((total - result.total_co2).abs() < 1e-3);
        assert_eq!(value["volumes"]["houses_built"], 25_000);
    }
}
