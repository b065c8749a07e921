//! Month-by-month amortization schedule

use serde::{Deserialize, Serialize};

use super::emi::check_principal;
use crate::assumptions::check_rate;
use crate::error::{EngineError, EngineResult};

/// Balances below this are treated as fully repaid
const PAYOFF_TOLERANCE: f64 = 1e-6;

/// One period of the schedule
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AmortizationRow {
    /// Period index (1-indexed)
    pub period: u32,
    pub interest: f64,
    pub principal: f64,
    /// Outstanding balance after this period's installment
    pub balance: f64,
    /// Property price less outstanding balance
    pub equity: f64,
}

impl AmortizationRow {
    /// Cash paid to the lender this period
    pub fn installment(&self) -> f64 {
        self.interest + self.principal
    }
}

/// Interest and principal repaid within one 12-period window
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AnnualTotals {
    /// Loan year (1-indexed)
    pub year: u32,
    pub interest: f64,
    pub principal: f64,
}

impl AnnualTotals {
    pub fn installments(&self) -> f64 {
        self.interest + self.principal
    }
}

/// Ordered amortization rows for a projection horizon
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AmortizationSchedule {
    pub rows: Vec<AmortizationRow>,
}

impl AmortizationSchedule {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Row for a 1-indexed period
    pub fn row(&self, period: u32) -> Option<&AmortizationRow> {
        if period == 0 {
            return None;
        }
        self.rows.get(period as usize - 1)
    }

    /// Balance left after the last projected period
    pub fn final_balance(&self) -> Option<f64> {
        self.rows.last().map(|r| r.balance)
    }

    pub fn total_interest(&self) -> f64 {
        self.rows.iter().map(|r| r.interest).sum()
    }

    pub fn total_principal(&self) -> f64 {
        self.rows.iter().map(|r| r.principal).sum()
    }

    /// Split the schedule into consecutive 12-period windows
    ///
    /// Windows never overlap and cover every row; a trailing partial year is
    /// reported as its own window.
    pub fn annual_totals(&self) -> Vec<AnnualTotals> {
        self.rows
            .chunks(12)
            .enumerate()
            .map(|(i, window)| AnnualTotals {
                year: i as u32 + 1,
                interest: window.iter().map(|r| r.interest).sum(),
                principal: window.iter().map(|r| r.principal).sum(),
            })
            .collect()
    }

    /// (years elapsed, equity) points for charting equity build-up
    pub fn equity_curve(&self) -> Vec<(f64, f64)> {
        self.rows
            .iter()
            .map(|r| (r.period as f64 / 12.0, r.equity))
            .collect()
    }
}

/// Project `periods` installments of `emi` against a loan of `principal`
///
/// Each period charges `balance · rate` interest and applies the rest of the
/// installment to principal. The balance is floored at zero: the installment
/// that would overshoot only repays what is left, and later periods record no
/// payments. `price` is used for the equity column.
pub fn build_amortization(
    principal: f64,
    rate: f64,
    emi: f64,
    periods: u32,
    price: f64,
) -> EngineResult<AmortizationSchedule> {
    check_principal(principal)?;
    check_rate("rate", rate)?;
    if periods == 0 {
        return Err(EngineError::invalid("periods", "must be at least 1"));
    }
    if !emi.is_finite() || emi < 0.0 {
        return Err(EngineError::invalid("emi", "must be a non-negative amount"));
    }
    if !price.is_finite() {
        return Err(EngineError::invalid("price", "must be a finite amount"));
    }

    let mut schedule = AmortizationSchedule {
        rows: Vec::with_capacity(periods as usize),
    };
    let mut balance = principal;

    for period in 1..=periods {
        let (interest, principal_paid) = if balance > 0.0 {
            let interest = balance * rate;
            let principal_paid = (emi - interest).min(balance);
            (interest, principal_paid)
        } else {
            (0.0, 0.0)
        };

        if principal_paid < 0.0 {
            return Err(EngineError::invalid(
                "emi",
                format!("installment {emi:.2} does not cover interest {interest:.2} in period {period}"),
            ));
        }

        balance -= principal_paid;
        if balance < PAYOFF_TOLERANCE {
            balance = 0.0;
        }

        schedule.rows.push(AmortizationRow {
            period,
            interest,
            principal: principal_paid,
            balance,
            equity: price - balance,
        });
    }

    Ok(schedule)
}
