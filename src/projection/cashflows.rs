//! Cash-flow output structures for the buy and rent paths

use serde::{Deserialize, Serialize};

use crate::error::{EngineError, EngineResult};

/// Components of one period's buy and rent cash flows
///
/// Outflows are stored as positive amounts; `buy_net` and `rent_net` carry
/// the signed total for the period.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct CashflowRow {
    /// Period index (0 = purchase date)
    pub period: u32,

    // Buy path
    pub upfront: f64,
    pub installment: f64,
    pub ownership_cost: f64,
    pub tax_relief: f64,
    /// Resale proceeds net of commission and remaining loan balance
    pub resale: f64,
    pub buy_net: f64,

    // Rent path
    pub rent: f64,
    /// Down payment grown at the investment return, released at exit
    pub investment: f64,
    pub rent_net: f64,
}

impl CashflowRow {
    pub fn new(period: u32) -> Self {
        Self {
            period,
            ..Default::default()
        }
    }

    /// Fill in the signed net totals from the components
    pub fn settle(&mut self) {
        self.buy_net = -(self.upfront + self.installment + self.ownership_cost)
            + self.tax_relief
            + self.resale;
        self.rent_net = -self.rent + self.investment;
    }
}

/// Buy and rent series on a shared period grid
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CashflowSeries {
    pub rows: Vec<CashflowRow>,
}

impl CashflowSeries {
    pub fn with_capacity(periods: usize) -> Self {
        Self {
            rows: Vec::with_capacity(periods),
        }
    }

    pub fn add_row(&mut self, row: CashflowRow) {
        self.rows.push(row);
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Signed buy-path flows, index = period
    pub fn buy(&self) -> Vec<f64> {
        self.rows.iter().map(|r| r.buy_net).collect()
    }

    /// Signed rent-path flows, index = period
    pub fn rent(&self) -> Vec<f64> {
        self.rows.iter().map(|r| r.rent_net).collect()
    }

    /// Buy minus rent per period
    pub fn differential(&self) -> Vec<f64> {
        self.rows.iter().map(|r| r.buy_net - r.rent_net).collect()
    }

    pub fn summary(&self) -> CashflowSummary {
        CashflowSummary {
            periods: self.rows.len().saturating_sub(1) as u32,
            total_installments: self.rows.iter().map(|r| r.installment).sum(),
            total_ownership_cost: self.rows.iter().map(|r| r.ownership_cost).sum(),
            total_tax_relief: self.rows.iter().map(|r| r.tax_relief).sum(),
            total_rent: self.rows.iter().map(|r| r.rent).sum(),
            resale: self.rows.last().map(|r| r.resale).unwrap_or(0.0),
            investment: self.rows.last().map(|r| r.investment).unwrap_or(0.0),
        }
    }
}

/// Undiscounted totals of a series
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CashflowSummary {
    pub periods: u32,
    pub total_installments: f64,
    pub total_ownership_cost: f64,
    pub total_tax_relief: f64,
    pub total_rent: f64,
    pub resale: f64,
    pub investment: f64,
}

/// Present values of the two paths
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NpvResult {
    pub npv_buy: f64,
    pub npv_rent: f64,
}

impl NpvResult {
    /// Buy minus rent; positive means buying wins
    pub fn difference(&self) -> f64 {
        self.npv_buy - self.npv_rent
    }

    pub fn buying_wins(&self) -> bool {
        self.difference() > 0.0
    }
}

/// Discount a pair of series, rejecting mismatched grids
pub fn discount_pair(rate: f64, buy: &[f64], rent: &[f64]) -> EngineResult<NpvResult> {
    if buy.len() != rent.len() {
        return Err(EngineError::InconsistentSeries {
            buy_len: buy.len(),
            rent_len: rent.len(),
        });
    }
    Ok(NpvResult {
        npv_buy: super::discount::present_value(rate, buy),
        npv_rent: super::discount::present_value(rate, rent),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_settle_signs() {
        let mut row = CashflowRow::new(3);
        row.installment = 1_000.0;
        row.ownership_cost = 100.0;
        row.tax_relief = 250.0;
        row.rent = 800.0;
        row.settle();
        assert_eq!(row.buy_net, -850.0);
        assert_eq!(row.rent_net, -800.0);
    }

    #[test]
    fn test_mismatched_series_rejected() {
        let err = discount_pair(0.01, &[1.0, 2.0, 3.0], &[1.0, 2.0]).unwrap_err();
        assert_eq!(err, EngineError::InconsistentSeries { buy_len: 3, rent_len: 2 });
    }

    #[test]
    fn test_difference() {
        let result = discount_pair(0.0, &[-10.0, 5.0], &[0.0, -2.0]).unwrap();
        assert_eq!(result.npv_buy, -5.0);
        assert_eq!(result.npv_rent, -2.0);
        assert_eq!(result.difference(), -3.0);
        assert!(!result.buying_wins());
    }
}
