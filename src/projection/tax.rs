//! Tax relief per loan year

use crate::assumptions::TaxRelief;
use crate::loan::AmortizationSchedule;

/// Tax saved in each loan year of `schedule`
///
/// Caps apply per 12-month window, so the windows come from
/// `AmortizationSchedule::annual_totals` and never overlap. Index 0 is year 1.
pub fn annual_tax_relief(schedule: &AmortizationSchedule, relief: &TaxRelief) -> Vec<f64> {
    schedule
        .annual_totals()
        .iter()
        .map(|year| relief.saving(year.interest, year.principal))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loan::{build_amortization, compute_emi};
    use approx::assert_relative_eq;

    #[test]
    fn test_relief_per_year() {
        let emi = compute_emi(6_400_000.0, 0.085 / 12.0, 240).unwrap();
        let schedule = build_amortization(6_400_000.0, 0.085 / 12.0, emi, 36, 8_000_000.0).unwrap();
        let relief = TaxRelief::india_default();

        let savings = annual_tax_relief(&schedule, &relief);
        assert_eq!(savings.len(), 3);

        // Year 1 interest (~539k) is over the 200k cap; principal (~127k) is under 150k
        let year1 = &schedule.annual_totals()[0];
        assert!(year1.interest > 200_000.0);
        assert!(year1.principal < 150_000.0);
        assert_relative_eq!(savings[0], (200_000.0 + year1.principal) * 0.30, max_relative = 1e-12);
    }

    #[test]
    fn test_zero_marginal_rate_gives_no_relief() {
        let emi = compute_emi(1_000_000.0, 0.01, 120).unwrap();
        let schedule = build_amortization(1_000_000.0, 0.01, emi, 24, 1_200_000.0).unwrap();
        let relief = TaxRelief {
            marginal_rate: 0.0,
            ..TaxRelief::india_default()
        };
        assert!(annual_tax_relief(&schedule, &relief).iter().all(|&s| s == 0.0));
    }
}
