//! Transaction and ownership costs attached to the buy path

use serde::{Deserialize, Serialize};

use crate::error::{EngineError, EngineResult};

/// Recurring cost of owning the house (maintenance, property tax, repairs)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum OwnershipCost {
    /// Annual cost as a fraction of the purchase price (0.01 = 1% per year)
    PercentOfPrice(f64),
    /// Flat annual amount
    FlatAnnual(f64),
}

impl OwnershipCost {
    /// Annual cost in currency for a house bought at `price`
    pub fn annual_amount(&self, price: f64) -> f64 {
        match *self {
            OwnershipCost::PercentOfPrice(rate) => price * rate,
            OwnershipCost::FlatAnnual(amount) => amount,
        }
    }

    pub fn validate(&self) -> EngineResult<()> {
        let (field, value) = match *self {
            OwnershipCost::PercentOfPrice(rate) => ("ownership_cost.percent_of_price", rate),
            OwnershipCost::FlatAnnual(amount) => ("ownership_cost.flat_annual", amount),
        };
        if !value.is_finite() || value < 0.0 {
            return Err(EngineError::invalid(field, "must be a non-negative number"));
        }
        Ok(())
    }
}

impl Default for OwnershipCost {
    fn default() -> Self {
        OwnershipCost::PercentOfPrice(0.01) // 1% of price per year
    }
}

/// One-off costs paid when buying and selling
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TransactionCosts {
    /// Brokerage on purchase, fraction of price
    pub buy_commission: f64,
    /// Brokerage on resale, fraction of resale price
    pub sell_commission: f64,
    /// Flat closing costs at purchase (registration, stamp duty)
    pub closing_costs: f64,
}

impl TransactionCosts {
    /// Total cash paid at purchase on top of the down payment
    pub fn upfront(&self, price: f64) -> f64 {
        price * self.buy_commission + self.closing_costs
    }

    /// Resale proceeds after the selling commission
    pub fn net_resale(&self, sale_price: f64) -> f64 {
        sale_price * (1.0 - self.sell_commission)
    }

    pub fn validate(&self) -> EngineResult<()> {
        if !self.buy_commission.is_finite() || self.buy_commission < 0.0 {
            return Err(EngineError::invalid("buy_commission", "must be a non-negative fraction"));
        }
        if !self.sell_commission.is_finite() || !(0.0..=1.0).contains(&self.sell_commission) {
            return Err(EngineError::invalid("sell_commission", "must be between 0 and 1"));
        }
        if !self.closing_costs.is_finite() || self.closing_costs < 0.0 {
            return Err(EngineError::invalid("closing_costs", "must be a non-negative amount"));
        }
        Ok(())
    }
}

impl Default for TransactionCosts {
    fn default() -> Self {
        Self {
            buy_commission: 0.01,
            sell_commission: 0.01,
            closing_costs: 0.0,
        }
    }
}
