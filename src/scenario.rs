//! Scenario comparison and growth sensitivity
//!
//! Builds the loan schedule once, then evaluates any number of
//! (house growth, rent growth) pairs against it.

use log::{info, warn};
use serde::{Deserialize, Serialize};

use crate::assumptions::Assumptions;
use crate::error::{EngineError, EngineResult};
use crate::projection::{NpvEngine, NpvResult};

/// Most growth points a single sensitivity sweep may evaluate
pub const MAX_SWEEP_POINTS: u32 = 10_000;

/// A named pair of growth assumptions
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scenario {
    pub name: String,
    pub house_growth: f64,
    pub rent_growth: f64,
}

impl Scenario {
    pub fn new(name: impl Into<String>, house_growth: f64, rent_growth: f64) -> Self {
        Self {
            name: name.into(),
            house_growth,
            rent_growth,
        }
    }

    /// Scenario shifted from the base growth assumptions by the given deltas
    pub fn shifted(name: impl Into<String>, base: &Assumptions, house_delta: f64, rent_delta: f64) -> Self {
        Self::new(name, base.house_growth + house_delta, base.rent_growth + rent_delta)
    }

    /// Base, Boom (+3pp house, +2pp rent) and Crash (-3pp house, -1pp rent)
    pub fn standard_set(base: &Assumptions) -> Vec<Scenario> {
        vec![
            Scenario::shifted("Base", base, 0.0, 0.0),
            Scenario::shifted("Boom", base, 0.03, 0.02),
            Scenario::shifted("Crash", base, -0.03, -0.01),
        ]
    }
}

/// One row of the comparison table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScenarioResult {
    pub name: String,
    pub house_growth: f64,
    pub rent_growth: f64,
    pub npv_buy: f64,
    pub npv_rent: f64,
    /// Buy minus rent
    pub difference: f64,
}

impl ScenarioResult {
    fn from_npv(scenario: &Scenario, npv: NpvResult) -> Self {
        Self {
            name: scenario.name.clone(),
            house_growth: scenario.house_growth,
            rent_growth: scenario.rent_growth,
            npv_buy: npv.npv_buy,
            npv_rent: npv.npv_rent,
            difference: npv.difference(),
        }
    }
}

/// Comparison rows in the order the scenarios were given
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ScenarioTable {
    pub rows: Vec<ScenarioResult>,
}

impl ScenarioTable {
    /// True when renting wins in at least one scenario
    pub fn renting_wins_somewhere(&self) -> bool {
        self.rows.iter().any(|r| r.difference < 0.0)
    }

    pub fn get(&self, name: &str) -> Option<&ScenarioResult> {
        self.rows.iter().find(|r| r.name == name)
    }
}

/// Pre-built engine for running many scenarios against one parameter set
///
/// # Example
/// ```ignore
/// let runner = ScenarioRunner::new(Assumptions::classroom_defaults())?;
/// let table = runner.run_scenarios(&Scenario::standard_set(runner.assumptions()))?;
/// ```
#[derive(Debug, Clone)]
pub struct ScenarioRunner {
    engine: NpvEngine,
}

impl ScenarioRunner {
    pub fn new(assumptions: Assumptions) -> EngineResult<Self> {
        Ok(Self {
            engine: NpvEngine::new(assumptions)?,
        })
    }

    pub fn with_engine(engine: NpvEngine) -> Self {
        Self { engine }
    }

    pub fn assumptions(&self) -> &Assumptions {
        self.engine.assumptions()
    }

    pub fn engine(&self) -> &NpvEngine {
        &self.engine
    }

    /// Evaluate a single scenario
    pub fn run(&self, scenario: &Scenario) -> EngineResult<ScenarioResult> {
        let npv = self.engine.compute_npv(scenario.house_growth, scenario.rent_growth)?;
        Ok(ScenarioResult::from_npv(scenario, npv))
    }

    /// Evaluate every scenario, one row each, preserving order
    pub fn run_scenarios(&self, scenarios: &[Scenario]) -> EngineResult<ScenarioTable> {
        if scenarios.is_empty() {
            return Err(EngineError::invalid("scenarios", "at least one scenario is required"));
        }

        let rows = scenarios
            .iter()
            .map(|s| self.run(s))
            .collect::<EngineResult<Vec<_>>>()?;
        let table = ScenarioTable { rows };

        info!("Compared {} scenarios", table.rows.len());
        if table.renting_wins_somewhere() {
            warn!("Renting is financially better than buying in at least one scenario");
        }
        Ok(table)
    }

    /// NPVs across house growth values from `from` to `to` (inclusive) at the base rent growth
    pub fn sensitivity_sweep(&self, from: f64, to: f64, step: f64) -> EngineResult<Vec<ScenarioResult>> {
        if !step.is_finite() || step <= 0.0 {
            return Err(EngineError::invalid("step", "must be positive"));
        }
        if !from.is_finite() || !to.is_finite() || to < from {
            return Err(EngineError::invalid("to", "must not be below 'from'"));
        }

        let rent_growth = self.assumptions().rent_growth;
        let steps = ((to - from) / step + 1e-9).floor();
        if steps >= MAX_SWEEP_POINTS as f64 {
            return Err(EngineError::invalid(
                "step",
                format!("sweep would evaluate more than {MAX_SWEEP_POINTS} growth points"),
            ));
        }
        let count = steps as u32 + 1;

        (0..count)
            .map(|i| {
                let house_growth = from + step * i as f64;
                let label = format!("{:.2}%", house_growth * 100.0);
                self.run(&Scenario::new(label, house_growth, rent_growth))
            })
            .collect()
    }
}

/// Compare named scenarios against one parameter set
pub fn compare_scenarios(assumptions: &Assumptions, scenarios: &[Scenario]) -> EngineResult<ScenarioTable> {
    ScenarioRunner::new(assumptions.clone())?.run_scenarios(scenarios)
}

/// Sweep house growth at the base rent growth
pub fn sensitivity_sweep(assumptions: &Assumptions, from: f64, to: f64, step: f64) -> EngineResult<Vec<ScenarioResult>> {
    ScenarioRunner::new(assumptions.clone())?.sensitivity_sweep(from, to, step)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::projection::compute_npv;
    use approx::assert_relative_eq;

    #[test]
    fn test_standard_set() {
        let base = Assumptions::classroom_defaults();
        let set = Scenario::standard_set(&base);
        assert_eq!(set.len(), 3);
        assert_relative_eq!(set[1].house_growth, 0.08);
        assert_relative_eq!(set[1].rent_growth, 0.07);
        assert_relative_eq!(set[2].house_growth, 0.02);
        assert_relative_eq!(set[2].rent_growth, 0.04);
    }

    #[test]
    fn test_one_row_per_scenario_in_order() {
        let base = Assumptions::classroom_defaults();
        let scenarios = vec![
            Scenario::new("Zeta", 0.01, 0.02),
            Scenario::new("Alpha", 0.09, 0.01),
            Scenario::new("Mid", 0.05, 0.05),
            Scenario::new("Alpha", 0.09, 0.01),
        ];
        let table = compare_scenarios(&base, &scenarios).unwrap();
        assert_eq!(table.rows.len(), 4);
        let names: Vec<&str> = table.rows.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["Zeta", "Alpha", "Mid", "Alpha"]);
    }

    #[test]
    fn test_rows_match_direct_npv() {
        let base = Assumptions::monthly_defaults();
        let table = compare_scenarios(&base, &Scenario::standard_set(&base)).unwrap();
        for (row, scenario) in table.rows.iter().zip(Scenario::standard_set(&base)) {
            let direct = compute_npv(&base, scenario.house_growth, scenario.rent_growth).unwrap();
            assert_eq!(row.npv_buy, direct.npv_buy);
            assert_eq!(row.npv_rent, direct.npv_rent);
            assert_relative_eq!(row.difference, row.npv_buy - row.npv_rent);
        }
    }

    #[test]
    fn test_renting_wins_flag() {
        let base = Assumptions::classroom_defaults();
        let scenarios = vec![
            Scenario::new("Stagnant", -0.05, 0.0),
            Scenario::new("Boom", 0.15, 0.10),
        ];
        let table = compare_scenarios(&base, &scenarios).unwrap();
        assert!(table.get("Stagnant").unwrap().difference < 0.0);
        assert!(table.renting_wins_somewhere());

        let only_boom = compare_scenarios(&base, &scenarios[1..]).unwrap();
        assert_eq!(only_boom.renting_wins_somewhere(), only_boom.rows[0].difference < 0.0);
    }

    #[test]
    fn test_empty_scenarios_rejected() {
        let base = Assumptions::classroom_defaults();
        assert!(compare_scenarios(&base, &[]).is_err());
    }

    #[test]
    fn test_sensitivity_sweep_monotone() {
        let base = Assumptions::classroom_defaults();
        let sweep = sensitivity_sweep(&base, -0.05, 0.15, 0.01).unwrap();
        assert_eq!(sweep.len(), 21);
        assert_eq!(sweep[0].name, "-5.00%");
        for pair in sweep.windows(2) {
            assert!(pair[1].npv_buy > pair[0].npv_buy);
            assert_eq!(pair[1].npv_rent, pair[0].npv_rent);
        }
    }

    #[test]
    fn test_sensitivity_sweep_bad_step() {
        let base = Assumptions::classroom_defaults();
        assert!(sensitivity_sweep(&base, 0.0, 0.1, 0.0).is_err());
        assert!(sensitivity_sweep(&base, 0.1, 0.0, 0.01).is_err());
    }

    #[test]
    fn test_sensitivity_sweep_point_limit() {
        let base = Assumptions::classroom_defaults();
        assert!(sensitivity_sweep(&base, -0.5, 1e9, 1e-9).is_err());

        let step = 1.0 / (MAX_SWEEP_POINTS - 1) as f64;
        let sweep = sensitivity_sweep(&base, 0.0, 1.0, step).unwrap();
        assert_eq!(sweep.len(), MAX_SWEEP_POINTS as usize);
    }
}
