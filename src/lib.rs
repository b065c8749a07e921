//! Buy vs Rent - NPV engine for comparing home ownership with renting
//!
//! This library provides:
//! - EMI calculation and mortgage amortization schedules
//! - Buy and rent cash-flow series on a monthly or annual grid
//! - Nominal or real (Fisher) discounting to net present value
//! - Optional home-loan tax relief with annual deduction caps
//! - Scenario tables, growth sensitivity sweeps and Monte Carlo sampling

pub mod error;
pub mod assumptions;
pub mod loan;
pub mod projection;
pub mod scenario;
pub mod monte_carlo;

// Re-export commonly used types
pub use error::{EngineError, EngineResult};
pub use assumptions::{Assumptions, Granularity, OwnershipCost, TaxRelief, TransactionCosts};
pub use loan::{build_amortization, compute_emi, AmortizationRow, AmortizationSchedule};
pub use projection::{breakeven_exit_year, compute_npv, CashflowSeries, NpvEngine, NpvResult};
pub use scenario::{compare_scenarios, sensitivity_sweep, Scenario, ScenarioRunner, ScenarioTable};
pub use monte_carlo::{run_monte_carlo, MonteCarloConfig, MonteCarloResult};
