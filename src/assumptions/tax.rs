//! Home-loan tax relief settings
//!
//! Interest and principal repaid in a tax year are deductible up to separate
//! statutory caps; the saving is the capped deduction at the marginal rate.

use serde::{Deserialize, Serialize};

use crate::error::{EngineError, EngineResult};

/// Deduction caps and marginal tax rate for one tax year
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TaxRelief {
    /// Maximum deductible interest per year
    pub interest_cap: f64,
    /// Maximum deductible principal repayment per year
    pub principal_cap: f64,
    /// Marginal income tax rate (0.30 = 30%)
    pub marginal_rate: f64,
}

impl TaxRelief {
    /// Caps used by the classroom simulator (Indian sections 24(b) and 80C)
    pub fn india_default() -> Self {
        Self {
            interest_cap: 200_000.0,
            principal_cap: 150_000.0,
            marginal_rate: 0.30,
        }
    }

    /// Tax saved for a year in which `interest` and `principal` were repaid
    pub fn saving(&self, interest: f64, principal: f64) -> f64 {
        let interest_claim = interest.min(self.interest_cap);
        let principal_claim = principal.min(self.principal_cap);
        (interest_claim + principal_claim) * self.marginal_rate
    }

    pub fn validate(&self) -> EngineResult<()> {
        if !self.interest_cap.is_finite() || self.interest_cap < 0.0 {
            return Err(EngineError::invalid("tax_interest_cap", "must be a non-negative amount"));
        }
        if !self.principal_cap.is_finite() || self.principal_cap < 0.0 {
            return Err(EngineError::invalid("tax_principal_cap", "must be a non-negative amount"));
        }
        if !self.marginal_rate.is_finite() || !(0.0..=1.0).contains(&self.marginal_rate) {
            return Err(EngineError::invalid("tax_rate", "must be between 0 and 1"));
        }
        Ok(())
    }
}
