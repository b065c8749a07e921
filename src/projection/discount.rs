//! Discounting of cash-flow series
//!
//! Supports:
//! - Nominal or inflation-adjusted (Fisher real) annual rates
//! - Conversion to the period rate of the cash-flow grid
//! - Closed-form annuity values for checking level streams

use serde::{Deserialize, Serialize};

use crate::assumptions::{check_rate, real_rate, Assumptions, Granularity};
use crate::error::EngineResult;

/// Discount rate applied to a cash-flow series
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DiscountRate {
    /// Annual effective rate (already real when inflation was supplied)
    pub annual_rate: f64,

    /// Period length of the series being discounted
    pub granularity: Granularity,
}

impl DiscountRate {
    /// Discount at a nominal annual rate
    pub fn nominal(annual_rate: f64, granularity: Granularity) -> EngineResult<Self> {
        check_rate("discount_rate", annual_rate)?;
        Ok(Self { annual_rate, granularity })
    }

    /// Discount at the real rate implied by `nominal` and `inflation`
    pub fn real(nominal: f64, inflation: f64, granularity: Granularity) -> EngineResult<Self> {
        check_rate("discount_rate", nominal)?;
        check_rate("inflation_rate", inflation)?;
        Self::nominal(real_rate(nominal, inflation), granularity)
    }

    /// Rate implied by a parameter set
    pub fn from_assumptions(assumptions: &Assumptions) -> EngineResult<Self> {
        match assumptions.inflation_rate {
            Some(inflation) => Self::real(assumptions.discount_rate, inflation, assumptions.granularity),
            None => Self::nominal(assumptions.discount_rate, assumptions.granularity),
        }
    }

    /// Rate per period of the series
    pub fn period_rate(&self) -> f64 {
        self.granularity.period_rate(self.annual_rate)
    }

    /// Discount factor from `period` back to period 0
    pub fn factor(&self, period: u32) -> f64 {
        (1.0 + self.period_rate()).powi(-(period as i32))
    }

    /// Present value of a series whose index is the period number
    pub fn present_value(&self, cashflows: &[f64]) -> f64 {
        present_value(self.period_rate(), cashflows)
    }
}

/// Σ cf[i] / (1 + rate)^i
pub fn present_value(rate: f64, cashflows: &[f64]) -> f64 {
    let v = 1.0 / (1.0 + rate);
    let mut factor = 1.0;
    let mut pv = 0.0;
    for &cf in cashflows {
        pv += cf * factor;
        factor *= v;
    }
    pv
}

/// PV of `amount` paid at the end of each of `n` periods
pub fn annuity_pv(amount: f64, n: u32, rate: f64) -> f64 {
    if rate.abs() < 1e-12 {
        return amount * n as f64;
    }
    amount * (1.0 - (1.0 + rate).powi(-(n as i32))) / rate
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_zero_rate_is_plain_sum() {
        let cfs = [-100.0, 20.0, 30.0, 70.0];
        assert_relative_eq!(present_value(0.0, &cfs), 20.0);
    }

    #[test]
    fn test_scaling_is_linear() {
        let cfs = [-1_000.0, 150.0, 300.0, -50.0, 900.0];
        let scaled: Vec<f64> = cfs.iter().map(|cf| cf * 3.5).collect();
        assert_relative_eq!(
            present_value(0.07, &scaled),
            3.5 * present_value(0.07, &cfs),
            max_relative = 1e-12
        );
    }

    #[test]
    fn test_period_zero_undiscounted() {
        assert_relative_eq!(present_value(0.5, &[42.0]), 42.0);
    }

    #[test]
    fn test_monthly_factor() {
        let rate = DiscountRate::nominal(0.06, Granularity::Monthly).unwrap();
        assert_relative_eq!(rate.factor(12), 1.0 / 1.06, epsilon = 1e-12);
        assert_relative_eq!(rate.factor(0), 1.0);
    }

    #[test]
    fn test_real_rate_used_with_inflation() {
        let rate = DiscountRate::real(0.08, 0.05, Granularity::Annual).unwrap();
        assert_relative_eq!(rate.period_rate(), 1.08 / 1.05 - 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_annuity_matches_series() {
        // 100/month for 12 months at 0.5%/month: ≈ 1161.89
        let pv = annuity_pv(100.0, 12, 0.005);
        assert!((pv - 1161.89).abs() < 0.01);

        let mut cfs = vec![0.0];
        cfs.extend(vec![100.0; 12]);
        assert_relative_eq!(present_value(0.005, &cfs), pv, max_relative = 1e-12);
    }

    #[test]
    fn test_invalid_rate_rejected() {
        assert!(DiscountRate::nominal(-1.5, Granularity::Annual).is_err());
        assert!(DiscountRate::real(0.08, f64::NAN, Granularity::Annual).is_err());
    }
}
