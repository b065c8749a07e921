//! Period timing and running rent level during a projection

use crate::assumptions::{Assumptions, Granularity};

/// Position on the cash-flow grid
#[derive(Debug, Clone)]
pub struct ProjectionState {
    /// Current period (0 = purchase date)
    pub period: u32,

    /// Year the current period falls in (1-indexed; 0 at the purchase date)
    pub year: u32,

    /// Period within the year (1..=periods_per_year; 0 at the purchase date)
    pub period_in_year: u32,

    /// Rent payable for the current period
    pub rent: f64,

    /// Rent growth per period
    rent_growth: f64,

    periods_per_year: u32,
}

impl ProjectionState {
    /// State at the purchase date
    ///
    /// Rent starts at one period's rent on the grid (a month's rent, or twelve
    /// months' rent for annual periods) and grows once before each payment.
    pub fn initial(assumptions: &Assumptions, annual_rent_growth: f64) -> Self {
        let granularity = assumptions.granularity;
        let rent = match granularity {
            Granularity::Monthly => assumptions.monthly_rent,
            Granularity::Annual => assumptions.monthly_rent * 12.0,
        };
        Self {
            period: 0,
            year: 0,
            period_in_year: 0,
            rent,
            rent_growth: granularity.period_rate(annual_rent_growth),
            periods_per_year: granularity.periods_per_year(),
        }
    }

    /// Advance to next period
    pub fn advance_period(&mut self) {
        self.period += 1;
        self.year = (self.period - 1) / self.periods_per_year + 1;
        self.period_in_year = (self.period - 1) % self.periods_per_year + 1;
        self.rent *= 1.0 + self.rent_growth;
    }

    /// True in the last period of a year, when annual tax relief is credited
    pub fn closes_year(&self) -> bool {
        self.period > 0 && self.period_in_year == self.periods_per_year
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_monthly_timing() {
        let assumptions = Assumptions::monthly_defaults();
        let mut state = ProjectionState::initial(&assumptions, 0.05);
        for _ in 0..13 {
            state.advance_period();
        }
        assert_eq!(state.period, 13);
        assert_eq!(state.year, 2);
        assert_eq!(state.period_in_year, 1);
        assert!(!state.closes_year());
    }

    #[test]
    fn test_rent_compounds_to_annual_growth() {
        let assumptions = Assumptions::monthly_defaults();
        let mut state = ProjectionState::initial(&assumptions, 0.05);
        for _ in 0..12 {
            state.advance_period();
        }
        assert!(state.closes_year());
        assert_relative_eq!(state.rent, 25_000.0 * 1.05, max_relative = 1e-12);
    }

    #[test]
    fn test_annual_rent_is_twelve_months() {
        let assumptions = Assumptions::classroom_defaults();
        let mut state = ProjectionState::initial(&assumptions, 0.05);
        state.advance_period();
        assert_eq!(state.year, 1);
        assert!(state.closes_year());
        assert_relative_eq!(state.rent, 300_000.0 * 1.05, max_relative = 1e-12);
    }
}
