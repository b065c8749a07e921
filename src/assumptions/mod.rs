//! Buy-vs-rent assumptions: property, loan, rent, market, costs and tax

mod costs;
mod tax;
pub mod loader;

pub use costs::{OwnershipCost, TransactionCosts};
pub use tax::TaxRelief;

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::{EngineError, EngineResult};

/// Period length shared by every cash flow, growth rate and discount factor in a run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Granularity {
    Monthly,
    #[default]
    Annual,
}

impl Granularity {
    pub fn periods_per_year(self) -> u32 {
        match self {
            Granularity::Monthly => 12,
            Granularity::Annual => 1,
        }
    }

    /// Convert an annual effective rate to the equivalent rate per period
    pub fn period_rate(self, annual_rate: f64) -> f64 {
        match self {
            Granularity::Monthly => (1.0 + annual_rate).powf(1.0 / 12.0) - 1.0,
            Granularity::Annual => annual_rate,
        }
    }
}

impl std::str::FromStr for Granularity {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "monthly" | "month" | "m" => Ok(Granularity::Monthly),
            "annual" | "yearly" | "year" | "y" => Ok(Granularity::Annual),
            other => Err(EngineError::invalid(
                "granularity",
                format!("expected 'monthly' or 'annual', got '{other}'"),
            )),
        }
    }
}

/// Immutable parameter set for one computation
///
/// All rates are decimals (0.085 = 8.5%) and annual unless the name says
/// otherwise. `house_growth` and `rent_growth` are the base growth
/// assumptions; scenario and Monte Carlo runs perturb them per call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Assumptions {
    // Property and loan
    pub price: f64,
    pub down_payment_fraction: f64,
    /// Nominal annual loan rate, paid monthly at `loan_rate / 12`
    pub loan_rate: f64,
    pub loan_tenure_years: u32,

    // Rent
    pub monthly_rent: f64,
    pub rent_growth: f64,

    // Market
    pub house_growth: f64,
    /// Return earned by the renter on the down payment they keep
    pub investment_return: f64,
    pub discount_rate: f64,
    /// When set, cash flows are discounted at the Fisher real rate
    pub inflation_rate: Option<f64>,

    // Exit
    pub exit_years: u32,

    // Costs
    pub transaction: TransactionCosts,
    pub ownership_cost: OwnershipCost,

    /// Annual deduction rules; `None` disables tax relief
    pub tax_relief: Option<TaxRelief>,

    pub granularity: Granularity,
}

impl Assumptions {
    /// Inputs of the classroom simulator: annual cash flows, Indian tax relief,
    /// discounting at the real rate
    pub fn classroom_defaults() -> Self {
        Self {
            price: 8_000_000.0,
            down_payment_fraction: 0.20,
            loan_rate: 0.085,
            loan_tenure_years: 20,
            monthly_rent: 25_000.0,
            rent_growth: 0.05,
            house_growth: 0.05,
            investment_return: 0.10,
            discount_rate: 0.08,
            inflation_rate: Some(0.05),
            exit_years: 10,
            transaction: TransactionCosts::default(),
            ownership_cost: OwnershipCost::default(),
            tax_relief: Some(TaxRelief::india_default()),
            granularity: Granularity::Annual,
        }
    }

    /// Monthly-consistent variant: no tax relief, nominal discounting,
    /// every flow on a monthly grid
    pub fn monthly_defaults() -> Self {
        Self {
            inflation_rate: None,
            tax_relief: None,
            granularity: Granularity::Monthly,
            ..Self::classroom_defaults()
        }
    }

    /// Load assumptions from a parameter file (`.csv` or `.json`)
    pub fn from_path(path: &Path) -> EngineResult<Self> {
        loader::load_from(path)
    }

    pub fn down_payment(&self) -> f64 {
        self.price * self.down_payment_fraction
    }

    pub fn loan_amount(&self) -> f64 {
        self.price * (1.0 - self.down_payment_fraction)
    }

    /// Monthly loan rate
    pub fn monthly_loan_rate(&self) -> f64 {
        self.loan_rate / 12.0
    }

    pub fn loan_months(&self) -> u32 {
        self.loan_tenure_years * 12
    }

    pub fn exit_months(&self) -> u32 {
        self.exit_years * 12
    }

    /// Number of cash-flow periods after period 0
    pub fn periods(&self) -> u32 {
        self.exit_years * self.granularity.periods_per_year()
    }

    /// Annual discount rate, converted to a real rate via Fisher when inflation is set
    pub fn annual_discount_rate(&self) -> f64 {
        match self.inflation_rate {
            Some(inflation) => real_rate(self.discount_rate, inflation),
            None => self.discount_rate,
        }
    }

    /// Discount rate per cash-flow period
    pub fn period_discount_rate(&self) -> f64 {
        self.granularity.period_rate(self.annual_discount_rate())
    }

    /// Check every parameter; the engine assumes a validated set
    pub fn validate(&self) -> EngineResult<()> {
        if !self.price.is_finite() || self.price <= 0.0 {
            return Err(EngineError::invalid("price", "must be a positive amount"));
        }
        if !self.down_payment_fraction.is_finite()
            || !(0.0..=1.0).contains(&self.down_payment_fraction)
        {
            return Err(EngineError::invalid("down_payment_fraction", "must be between 0 and 1"));
        }
        if self.loan_tenure_years == 0 {
            return Err(EngineError::invalid("loan_tenure_years", "must be at least 1"));
        }
        if self.exit_years == 0 {
            return Err(EngineError::invalid("exit_years", "must be at least 1"));
        }
        if !self.monthly_rent.is_finite() || self.monthly_rent < 0.0 {
            return Err(EngineError::invalid("monthly_rent", "must be a non-negative amount"));
        }

        check_rate("loan_rate", self.loan_rate)?;
        check_rate("rent_growth", self.rent_growth)?;
        check_rate("house_growth", self.house_growth)?;
        check_rate("investment_return", self.investment_return)?;
        check_rate("discount_rate", self.discount_rate)?;
        if let Some(inflation) = self.inflation_rate {
            check_rate("inflation_rate", inflation)?;
        }

        self.transaction.validate()?;
        self.ownership_cost.validate()?;
        if let Some(relief) = &self.tax_relief {
            relief.validate()?;
        }
        Ok(())
    }
}

impl Default for Assumptions {
    fn default() -> Self {
        Self::classroom_defaults()
    }
}

/// Fisher relation: real = (1 + nominal) / (1 + inflation) - 1
pub fn real_rate(nominal: f64, inflation: f64) -> f64 {
    (1.0 + nominal) / (1.0 + inflation) - 1.0
}

/// A rate must be finite and above -100%, otherwise growth and discount factors break down
pub(crate) fn check_rate(field: &str, rate: f64) -> EngineResult<()> {
    if !rate.is_finite() || rate <= -1.0 {
        return Err(EngineError::invalid(field, "must be a finite rate above -100%"));
    }
    Ok(())
}
