//! Mortgage maths: equal installments and the amortization schedule

mod emi;
mod amortization;

pub use emi::{compute_emi, remaining_balance};
pub use amortization::{build_amortization, AmortizationRow, AmortizationSchedule, AnnualTotals};
