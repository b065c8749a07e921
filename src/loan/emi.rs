//! Equal periodic installment (EMI) for a fully amortizing loan

use log::debug;

use crate::assumptions::check_rate;
use crate::error::{EngineError, EngineResult};

/// Installment that repays `principal` over `periods` at periodic `rate`
///
/// Standard annuity formula `P·r·(1+r)^n / ((1+r)^n - 1)`. A zero rate, or
/// one too small to move `(1+r)^n` off 1, repays `P / n` each period.
///
/// # Errors
/// `InvalidParameter` when `periods` is zero, the principal is negative or
/// not finite, or the rate is not a finite value above -100%.
pub fn compute_emi(principal: f64, rate: f64, periods: u32) -> EngineResult<f64> {
    check_principal(principal)?;
    check_rate("rate", rate)?;
    if periods == 0 {
        return Err(EngineError::invalid("periods", "must be at least 1"));
    }

    let n = periods as f64;
    let accrual = accrual_factor(rate, n);
    let emi = if accrual == 0.0 {
        principal / n
    } else {
        principal * rate * (1.0 + accrual) / accrual
    };

    if !emi.is_finite() {
        return Err(EngineError::invalid(
            "rate",
            format!("installment is not finite for rate {rate} over {periods} periods"),
        ));
    }

    debug!("EMI on {principal:.2} at {rate:.6}/period over {periods} periods: {emi:.2}");
    Ok(emi)
}

/// Closed-form outstanding balance after `k` installments of `emi`
///
/// `B_k = P(1+r)^k - EMI((1+r)^k - 1) / r`, or `P - k·EMI` when `r = 0`.
/// Not floored at zero.
pub fn remaining_balance(principal: f64, rate: f64, emi: f64, k: u32) -> f64 {
    let accrual = accrual_factor(rate, k as f64);
    if accrual == 0.0 {
        return principal - emi * k as f64;
    }
    principal * (1.0 + accrual) - emi * accrual / rate
}

/// `(1+r)^n - 1` without the cancellation error of subtracting 1 for small `r`
fn accrual_factor(rate: f64, n: f64) -> f64 {
    (n * rate.ln_1p()).exp_m1()
}

pub(crate) fn check_principal(principal: f64) -> EngineResult<()> {
    if !principal.is_finite() || principal < 0.0 {
        return Err(EngineError::invalid("principal", "must be a non-negative amount"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_reference_emi() {
        // 800,000 at 6%/yr (0.5%/month) over 20 years
        let emi = compute_emi(800_000.0, 0.06 / 12.0, 240).unwrap();
        assert_relative_eq!(emi, 5_734.0, max_relative = 0.005);
        assert_relative_eq!(emi, 5_731.45, epsilon = 0.01);
    }

    #[test]
    fn test_zero_rate_is_straight_line() {
        let emi = compute_emi(120_000.0, 0.0, 240).unwrap();
        assert_eq!(emi, 500.0);
    }

    #[test]
    fn test_tiny_rate_matches_straight_line() {
        let emi = compute_emi(800_000.0, 1e-17, 240).unwrap();
        assert_relative_eq!(emi, 800_000.0 / 240.0, max_relative = 1e-12);

        let emi = compute_emi(800_000.0, 1e-12, 240).unwrap();
        assert_relative_eq!(emi, 800_000.0 / 240.0, max_relative = 1e-9);
        assert!(remaining_balance(800_000.0, 1e-12, emi, 240).abs() < 1e-4);
    }

    #[test]
    fn test_zero_principal() {
        assert_eq!(compute_emi(0.0, 0.005, 12).unwrap(), 0.0);
    }

    #[test]
    fn test_zero_periods_rejected() {
        let err = compute_emi(100_000.0, 0.005, 0).unwrap_err();
        assert!(matches!(err, EngineError::InvalidParameter { ref field, .. } if field == "periods"));
    }

    #[test]
    fn test_invalid_inputs_rejected() {
        assert!(compute_emi(-1.0, 0.005, 12).is_err());
        assert!(compute_emi(f64::INFINITY, 0.005, 12).is_err());
        assert!(compute_emi(1_000.0, f64::NAN, 12).is_err());
        assert!(compute_emi(1_000.0, -1.0, 12).is_err());
    }

    #[test]
    fn test_remaining_balance_ends_at_zero() {
        let emi = compute_emi(800_000.0, 0.005, 240).unwrap();
        assert_relative_eq!(remaining_balance(800_000.0, 0.005, emi, 0), 800_000.0);
        assert!(remaining_balance(800_000.0, 0.005, emi, 240).abs() < 1e-6);
    }
}
