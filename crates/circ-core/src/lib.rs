#![deny(warnings)]

//! Policy levers, housing volumes, material factors and simulation outcomes.
//!
//! Everything here is a plain `Copy` value: the engine reads a
//! [`PolicyInput`] and [`HousingVolumes`] against a [`MaterialConstants`]
//! table and produces a [`SimulationResult`]. The [`Co2Source`] and
//! [`Metric`] labels are what front ends print and chart.
//! [`validate_policy`] and [`validate_constants`] check fraction ranges and
//! factor signs before a checked run.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Circular-economy policy levers for a single simulation run.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PolicyInput {
    /// Share of demolished concrete sent to recycling, in [0,1].
    pub concrete_recycle: f64,
    /// Share of excavated soil reused, in [0,1].
    pub soil_reuse: f64,
    /// Ceiling on recycled aggregate as a share of total concrete demand, in [0,1].
    pub max_rca_permitted: f64,
}

impl PolicyInput {
    pub fn new(concrete_recycle: f64, soil_reuse: f64, max_rca_permitted: f64) -> Self {
        Self {
            concrete_recycle,
            soil_reuse,
            max_rca_permitted,
        }
    }

    /// Copy with every fraction clamped into [0,1]. NaN becomes 0.
    pub fn clamped(&self) -> Self {
        fn clamp01(v: f64) -> f64 {
            if v.is_nan() {
                0.0
            } else {
                v.clamp(0.0, 1.0)
            }
        }
        Self {
            concrete_recycle: clamp01(self.concrete_recycle),
            soil_reuse: clamp01(self.soil_reuse),
            max_rca_permitted: clamp01(self.max_rca_permitted),
        }
    }

    /// Value of a single lever.
    pub fn lever(&self, lever: PolicyLever) -> f64 {
        match lever {
            PolicyLever::ConcreteRecycle => self.concrete_recycle,
            PolicyLever::SoilReuse => self.soil_reuse,
            PolicyLever::MaxRcaPermitted => self.max_rca_permitted,
        }
    }

    /// Copy with one lever replaced.
    pub fn with_lever(&self, lever: PolicyLever, value: f64) -> Self {
        let mut out = *self;
        match lever {
            PolicyLever::ConcreteRecycle => out.concrete_recycle = value,
            PolicyLever::SoilReuse => out.soil_reuse = value,
            PolicyLever::MaxRcaPermitted => out.max_rca_permitted = value,
        }
        out
    }
}

impl Default for PolicyInput {
    fn default() -> Self {
        Self::new(0.3, 0.2, 0.3)
    }
}

/// One of the three policy fractions.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PolicyLever {
    /// Share of demolished concrete recycled.
    ConcreteRecycle,
    /// Share of excavated soil reused.
    SoilReuse,
    /// Recycled aggregate ceiling on concrete demand.
    MaxRcaPermitted,
}

impl PolicyLever {
    pub const ALL: [PolicyLever; 3] = [
        PolicyLever::ConcreteRecycle,
        PolicyLever::SoilReuse,
        PolicyLever::MaxRcaPermitted,
    ];

    /// Field name as used in scenario files.
    pub fn field_name(self) -> &'static str {
        match self {
            PolicyLever::ConcreteRecycle => "concrete_recycle",
            PolicyLever::SoilReuse => "soil_reuse",
            PolicyLever::MaxRcaPermitted => "max_rca_permitted",
        }
    }
}

/// Annual housing construction and demolition counts.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct HousingVolumes {
    /// New houses built per year.
    pub houses_built: u64,
    /// Houses deconstructed per year.
    pub houses_demolished: u64,
}

impl HousingVolumes {
    pub fn new(houses_built: u64, houses_demolished: u64) -> Self {
        Self {
            houses_built,
            houses_demolished,
        }
    }
}

impl Default for HousingVolumes {
    fn default() -> Self {
        Self::new(25_000, 1_500)
    }
}

/// Fixed material and emission factors. Masses in tonnes, emissions in kg CO₂.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MaterialConstants {
    /// Tonnes of concrete demanded per new house.
    pub concrete_per_house: f64,
    /// Tonnes of concrete recovered per deconstructed house.
    pub concrete_per_deconstructed_house: f64,
    /// Tonnes of soil recovered per deconstructed house.
    pub soil_per_deconstructed_house: f64,
    /// Cement fraction of concrete mass, in [0,1].
    pub cement_content_per_tonne: f64,
    /// kg CO₂ per tonne of cement.
    pub emission_cement: f64,
    /// kg CO₂ per tonne of virgin aggregate.
    pub emission_aggregate: f64,
    /// kg CO₂ per tonne of virgin material transported.
    pub emission_transport_virgin: f64,
    /// kg CO₂ per tonne of recycled material transported.
    pub emission_transport_recycled: f64,
    /// kg CO₂ per tonne of deconstructed concrete processed.
    pub emission_waste_processing: f64,
    /// kg CO₂ per tonne of virgin soil.
    pub emission_soil: f64,
}

impl Default for MaterialConstants {
    fn default() -> Self {
        Self {
            concrete_per_house: 50.0,
            concrete_per_deconstructed_house: 45.0,
            soil_per_deconstructed_house: 15.0,
            cement_content_per_tonne: 0.3,
            emission_cement: 698.0,
            emission_aggregate: 9.0,
            emission_transport_virgin: 100.0,
            emission_transport_recycled: 50.0,
            emission_waste_processing: 30.0,
            emission_soil: 10.0,
        }
    }
}

impl MaterialConstants {
    /// Named view over every factor, in declaration order.
    pub fn entries(&self) -> [(&'static str, f64); 10] {
        [
            ("concrete_per_house", self.concrete_per_house),
            (
                "concrete_per_deconstructed_house",
                self.concrete_per_deconstructed_house,
            ),
            (
                "soil_per_deconstructed_house",
                self.soil_per_deconstructed_house,
            ),
            ("cement_content_per_tonne", self.cement_content_per_tonne),
            ("emission_cement", self.emission_cement),
            ("emission_aggregate", self.emission_aggregate),
            ("emission_transport_virgin", self.emission_transport_virgin),
            (
                "emission_transport_recycled",
                self.emission_transport_recycled,
            ),
            ("emission_waste_processing", self.emission_waste_processing),
            ("emission_soil", self.emission_soil),
        ]
    }
}

/// Emission source categories, in computation order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Co2Source {
    /// Cement binder for all new concrete.
    CementProduction,
    /// Extraction of virgin aggregate.
    VirginAggregate,
    /// Hauling virgin material.
    TransportVirgin,
    /// Hauling recycled aggregate.
    TransportRecycled,
    /// Crushing and sorting deconstructed concrete.
    WasteProcessing,
    /// Sourcing virgin soil.
    VirginSoil,
}

impl Co2Source {
    pub const ALL: [Co2Source; 6] = [
        Co2Source::CementProduction,
        Co2Source::VirginAggregate,
        Co2Source::TransportVirgin,
        Co2Source::TransportRecycled,
        Co2Source::WasteProcessing,
        Co2Source::VirginSoil,
    ];

    /// Display label. Front ends bind to these strings.
    pub fn label(self) -> &'static str {
        match self {
            Co2Source::CementProduction => "Cement Production",
            Co2Source::VirginAggregate => "Virgin Aggregate",
            Co2Source::TransportVirgin => "Transport (Virgin)",
            Co2Source::TransportRecycled => "Transport (Recycled)",
            Co2Source::WasteProcessing => "Waste Processing",
            Co2Source::VirginSoil => "Virgin Soil",
        }
    }
}

/// kg CO₂ per emission source.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Co2Breakdown {
    /// kg CO₂ from cement production.
    pub cement_production: f64,
    /// kg CO₂ from virgin aggregate.
    pub virgin_aggregate: f64,
    /// kg CO₂ from virgin material transport.
    pub transport_virgin: f64,
    /// kg CO₂ from recycled material transport.
    pub transport_recycled: f64,
    /// kg CO₂ from waste processing.
    pub waste_processing: f64,
    /// kg CO₂ from virgin soil.
    pub virgin_soil: f64,
}

impl Co2Breakdown {
    pub fn get(&self, source: Co2Source) -> f64 {
        match source {
            Co2Source::CementProduction => self.cement_production,
            Co2Source::VirginAggregate => self.virgin_aggregate,
            Co2Source::TransportVirgin => self.transport_virgin,
            Co2Source::TransportRecycled => self.transport_recycled,
            Co2Source::WasteProcessing => self.waste_processing,
            Co2Source::VirginSoil => self.virgin_soil,
        }
    }

    /// `(source, kg)` pairs in computation order, suitable for charting.
    pub fn entries(&self) -> [(Co2Source, f64); 6] {
        Co2Source::ALL.map(|s| (s, self.get(s)))
    }

    /// Sum of all six sources, added in computation order.
    pub fn total(&self) -> f64 {
        self.entries().iter().fold(0.0, |acc, (_, v)| acc + v)
    }

    /// Source with the largest contribution. Ties resolve to the earliest source.
    pub fn dominant(&self) -> Co2Source {
        let mut best = (Co2Source::CementProduction, self.cement_production);
        for (s, v) in self.entries() {
            if v > best.1 {
                best = (s, v);
            }
        }
        best.0
    }
}

/// Headline metrics reported per scenario.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Metric {
    /// Total emissions (kg CO₂).
    TotalCo2,
    /// Concrete sent to recycling (t).
    RecycledConcrete,
    /// Virgin aggregate still required (t).
    VirginAggregate,
    /// Soil reused (t).
    ReusedSoil,
    /// Virgin soil required (t).
    VirginSoil,
    /// Recycled aggregate substituted for virgin (t).
    SandGravelSaved,
}

impl Metric {
    pub const ALL: [Metric; 6] = [
        Metric::TotalCo2,
        Metric::RecycledConcrete,
        Metric::VirginAggregate,
        Metric::ReusedSoil,
        Metric::VirginSoil,
        Metric::SandGravelSaved,
    ];

    /// Display label. Front ends bind to these strings.
    pub fn label(self) -> &'static str {
        match self {
            Metric::TotalCo2 => "Total CO2",
            Metric::RecycledConcrete => "Recycled Concrete",
            Metric::VirginAggregate => "Virgin Aggregate",
            Metric::ReusedSoil => "Reused Soil",
            Metric::VirginSoil => "Virgin Soil",
            Metric::SandGravelSaved => "Sand & Gravel Saved",
        }
    }

    /// Unit suffix for display.
    pub fn unit(self) -> &'static str {
        match self {
            Metric::TotalCo2 => "kg",
            _ => "t",
        }
    }
}

/// Outcome of one simulation run. Masses in tonnes, emissions in kg CO₂.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct SimulationResult {
    /// Sum of the six breakdown components.
    pub total_co2: f64,
    /// Deconstructed concrete sent to recycling.
    pub recycled_concrete: f64,
    /// Concrete demand still met from virgin material.
    pub virgin_aggregate: f64,
    /// Recovered soil put back to use.
    pub reused_soil: f64,
    /// Recovered soil not reused.
    pub virgin_soil: f64,
    /// Recycled aggregate actually substituted for virgin material.
    pub sand_gravel_saved: f64,
    /// Emissions per source.
    pub co2_breakdown: Co2Breakdown,
    /// Gross concrete demand from new construction.
    pub concrete_demand: f64,
    /// Gross concrete recovered from deconstruction.
    pub concrete_deconstructed: f64,
    /// Gross soil recovered from deconstruction.
    pub soil_recovered: f64,
}

impl SimulationResult {
    pub fn metric(&self, metric: Metric) -> f64 {
        match metric {
            Metric::TotalCo2 => self.total_co2,
            Metric::RecycledConcrete => self.recycled_concrete,
            Metric::VirginAggregate => self.virgin_aggregate,
            Metric::ReusedSoil => self.reused_soil,
            Metric::VirginSoil => self.virgin_soil,
            Metric::SandGravelSaved => self.sand_gravel_saved,
        }
    }

    /// `(metric, value)` pairs in reporting order.
    pub fn metrics(&self) -> [(Metric, f64); 6] {
        Metric::ALL.map(|m| (m, self.metric(m)))
    }
}

/// Validation errors for domain invariants.
#[derive(Debug, Error, PartialEq)]
pub enum ValidationError {
    /// Policy fraction outside [0, 1].
    #[error("{field} must be within [0,1], got {value}")]
    FractionOutOfRange { field: &'static str, value: f64 },
    /// Numeric field must be finite.
    #[error("{field} must be finite")]
    NonFinite { field: &'static str },
    /// Material or emission factor must be non-negative.
    #[error("{field} must be non-negative, got {value}")]
    NegativeConstant { field: &'static str, value: f64 },
}

fn validate_fraction(field: &'static str, value: f64) -> Result<(), ValidationError> {
    if !value.is_finite() {
        return Err(ValidationError::NonFinite { field });
    }
    if !(0.0..=1.0).contains(&value) {
        return Err(ValidationError::FractionOutOfRange { field, value });
    }
    Ok(())
}

/// Validate a policy: every lever finite and within [0,1].
pub fn validate_policy(p: &PolicyInput) -> Result<(), ValidationError> {
    for lever in PolicyLever::ALL {
        validate_fraction(lever.field_name(), p.lever(lever))?;
    }
    Ok(())
}

/// Validate a constants table: every factor finite and non-negative, cement content a fraction.
pub fn validate_constants(c: &MaterialConstants) -> Result<(), ValidationError> {
    for (field, value) in c.entries() {
        if !value.is_finite() {
            return Err(ValidationError::NonFinite { field });
        }
        if value < 0.0 {
            return Err(ValidationError::NegativeConstant { field, value });
        }
    }
    validate_fraction("cement_content_per_tonne", c.cement_content_per_tonne)
}
