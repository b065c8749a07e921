//! Buy and rent cash-flow builder and NPV engine

use log::debug;

use super::cashflows::{discount_pair, CashflowRow, CashflowSeries, NpvResult};
use super::discount::DiscountRate;
use super::state::ProjectionState;
use super::tax::annual_tax_relief;
use crate::assumptions::{check_rate, Assumptions, Granularity};
use crate::error::{EngineError, EngineResult};
use crate::loan::{build_amortization, compute_emi, AmortizationSchedule};

const BREAKEVEN_ACCURACY: f64 = 1e-9;
const BREAKEVEN_MAX_ITERATIONS: usize = 200;

/// NPV engine for one parameter set
///
/// The loan schedule, tax relief and discount rate do not depend on the
/// growth assumptions, so they are computed once here and shared by every
/// scenario or Monte Carlo draw evaluated against this engine.
#[derive(Debug, Clone)]
pub struct NpvEngine {
    assumptions: Assumptions,
    emi: f64,
    /// Monthly schedule over the holding period
    schedule: AmortizationSchedule,
    /// Tax saved per loan year (empty when relief is disabled)
    tax_by_year: Vec<f64>,
    discount: DiscountRate,
}

impl NpvEngine {
    /// Validate the assumptions and prepare the loan schedule
    pub fn new(assumptions: Assumptions) -> EngineResult<Self> {
        assumptions.validate()?;

        let rate = assumptions.monthly_loan_rate();
        let emi = compute_emi(assumptions.loan_amount(), rate, assumptions.loan_months())?;
        let schedule = build_amortization(
            assumptions.loan_amount(),
            rate,
            emi,
            assumptions.exit_months(),
            assumptions.price,
        )?;
        let tax_by_year = match &assumptions.tax_relief {
            Some(relief) => annual_tax_relief(&schedule, relief),
            None => Vec::new(),
        };
        let discount = DiscountRate::from_assumptions(&assumptions)?;

        debug!(
            "Engine ready: EMI {:.2}, {} periods ({:?}), discount {:.6}/period",
            emi,
            assumptions.periods(),
            assumptions.granularity,
            discount.period_rate()
        );

        Ok(Self {
            assumptions,
            emi,
            schedule,
            tax_by_year,
            discount,
        })
    }

    pub fn assumptions(&self) -> &Assumptions {
        &self.assumptions
    }

    /// Monthly installment
    pub fn emi(&self) -> f64 {
        self.emi
    }

    /// Monthly amortization schedule over the holding period
    pub fn schedule(&self) -> &AmortizationSchedule {
        &self.schedule
    }

    pub fn discount(&self) -> &DiscountRate {
        &self.discount
    }

    /// Build both cash-flow series for a house/rent growth pair
    pub fn build_cashflows(&self, house_growth: f64, rent_growth: f64) -> EngineResult<CashflowSeries> {
        check_rate("house_growth", house_growth)?;
        check_rate("rent_growth", rent_growth)?;

        let a = &self.assumptions;
        let periods = a.periods();
        let mut series = CashflowSeries::with_capacity(periods as usize + 1);
        let mut state = ProjectionState::initial(a, rent_growth);

        // Period 0: down payment and purchase costs; nothing on the rent side
        let mut row = CashflowRow::new(0);
        row.upfront = a.down_payment() + a.transaction.upfront(a.price);
        row.settle();
        series.add_row(row);

        for _ in 1..=periods {
            state.advance_period();
            let mut row = self.calculate_period(&state);
            if state.period == periods {
                self.apply_exit(house_growth, &mut row);
            }
            row.settle();
            series.add_row(row);
        }

        Ok(series)
    }

    /// NPV of buying and of renting for a house/rent growth pair
    pub fn compute_npv(&self, house_growth: f64, rent_growth: f64) -> EngineResult<NpvResult> {
        let series = self.build_cashflows(house_growth, rent_growth)?;
        discount_pair(self.discount.period_rate(), &series.buy(), &series.rent())
    }

    /// House growth at which buying and renting have equal NPV
    ///
    /// Bisection over `[low, high]` at a fixed rent growth. The buy-minus-rent
    /// difference rises with house growth, so `None` means buying wins (or
    /// loses) across the whole bracket.
    pub fn breakeven_house_growth(&self, rent_growth: f64, low: f64, high: f64) -> EngineResult<Option<f64>> {
        if !low.is_finite() || !high.is_finite() || high <= low {
            return Err(EngineError::invalid("high", "must be above 'low'"));
        }

        let difference = |hg: f64| -> EngineResult<f64> { Ok(self.compute_npv(hg, rent_growth)?.difference()) };

        let mut a = low;
        let mut b = high;
        let fa = difference(a)?;
        let fb = difference(b)?;
        if fa == 0.0 {
            return Ok(Some(a));
        }
        if fb == 0.0 {
            return Ok(Some(b));
        }
        if fa * fb > 0.0 {
            return Ok(None);
        }

        let mut fa = fa;
        for _ in 0..BREAKEVEN_MAX_ITERATIONS {
            let mid = 0.5 * (a + b);
            let fm = difference(mid)?;
            if fm == 0.0 || 0.5 * (b - a) < BREAKEVEN_ACCURACY {
                debug!("Break-even house growth {mid:.6} at rent growth {rent_growth}");
                return Ok(Some(mid));
            }
            if fa * fm < 0.0 {
                b = mid;
            } else {
                a = mid;
                fa = fm;
            }
        }
        Ok(Some(0.5 * (a + b)))
    }

    /// Cash flows of one period before exit adjustments
    fn calculate_period(&self, state: &ProjectionState) -> CashflowRow {
        let a = &self.assumptions;
        let mut row = CashflowRow::new(state.period);
        let annual_ownership = a.ownership_cost.annual_amount(a.price);

        match a.granularity {
            Granularity::Monthly => {
                row.installment = self
                    .schedule
                    .row(state.period)
                    .map(|r| r.installment())
                    .unwrap_or(0.0);
                row.ownership_cost = annual_ownership / 12.0;
            }
            Granularity::Annual => {
                let first = ((state.year - 1) * 12) as usize;
                let last = (state.year * 12) as usize;
                row.installment = self
                    .schedule
                    .rows
                    .get(first..last.min(self.schedule.len()))
                    .map(|window| window.iter().map(|r| r.installment()).sum())
                    .unwrap_or(0.0);
                row.ownership_cost = annual_ownership;
            }
        }

        // Relief for a loan year is credited in the period that closes it
        if state.closes_year() {
            row.tax_relief = self
                .tax_by_year
                .get(state.year as usize - 1)
                .copied()
                .unwrap_or(0.0);
        }

        row.rent = state.rent;
        row
    }

    /// Sell the house and cash in the renter's investment
    fn apply_exit(&self, house_growth: f64, row: &mut CashflowRow) {
        let a = &self.assumptions;
        let years = a.exit_years as i32;

        let sale_price = a.price * (1.0 + house_growth).powi(years);
        let outstanding = self.schedule.final_balance().unwrap_or(0.0);
        row.resale = a.transaction.net_resale(sale_price) - outstanding;

        row.investment = a.down_payment() * (1.0 + a.investment_return).powi(years);
    }
}

/// One-shot NPV for a parameter set and growth pair
pub fn compute_npv(assumptions: &Assumptions, house_growth: f64, rent_growth: f64) -> EngineResult<NpvResult> {
    NpvEngine::new(assumptions.clone())?.compute_npv(house_growth, rent_growth)
}

/// Shortest holding period (in whole years, up to `max_years`) for which
/// buying beats renting at the base growth assumptions
pub fn breakeven_exit_year(assumptions: &Assumptions, max_years: u32) -> EngineResult<Option<u32>> {
    if max_years == 0 {
        return Err(EngineError::invalid("max_years", "must be at least 1"));
    }

    for years in 1..=max_years {
        let trial = Assumptions {
            exit_years: years,
            ..assumptions.clone()
        };
        let result = NpvEngine::new(trial)?.compute_npv(assumptions.house_growth, assumptions.rent_growth)?;
        if result.buying_wins() {
            debug!("Buying breaks even after {years} years (difference {:.2})", result.difference());
            return Ok(Some(years));
        }
    }
    Ok(None)
}
