//! Cash-flow projection and NPV for the buy and rent paths

mod state;
mod engine;
mod cashflows;
mod discount;
mod tax;

pub use state::ProjectionState;
pub use engine::{breakeven_exit_year, compute_npv, NpvEngine};
pub use cashflows::{discount_pair, CashflowRow, CashflowSeries, CashflowSummary, NpvResult};
pub use discount::{annuity_pv, present_value, DiscountRate};
pub use tax::annual_tax_relief;
