//! Parameter file loader
//!
//! Reads assumptions from `data/parameters.csv` style files (`parameter,value`
//! rows) or from a JSON document matching `Assumptions`.

use std::fs::File;
use std::path::Path;

use log::debug;

use super::{Assumptions, Granularity, OwnershipCost, TaxRelief};
use crate::error::{EngineError, EngineResult};

/// Default path to the parameter file
pub const DEFAULT_PARAMETERS_PATH: &str = "data/parameters.csv";

/// Load assumptions from a file, picking the format by extension
pub fn load_from(path: &Path) -> EngineResult<Assumptions> {
    let is_json = path
        .extension()
        .map(|ext| ext.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    let assumptions = if is_json {
        load_json(path)?
    } else {
        load_csv(path)?
    };
    debug!("Loaded parameters from {}", path.display());

    assumptions.validate()?;
    Ok(assumptions)
}

/// Load the default parameter file
pub fn load_default() -> EngineResult<Assumptions> {
    load_from(Path::new(DEFAULT_PARAMETERS_PATH))
}

/// Load assumptions from a JSON document
pub fn load_json(path: &Path) -> EngineResult<Assumptions> {
    let file = File::open(path)?;
    Ok(serde_json::from_reader(file)?)
}

/// Load assumptions from a `parameter,value` CSV file
///
/// Parameters not present keep their classroom default.
pub fn load_csv(path: &Path) -> EngineResult<Assumptions> {
    let file = File::open(path)?;
    parse_csv(file)
}

/// Parse `parameter,value` rows from any reader
pub fn parse_csv<R: std::io::Read>(reader: R) -> EngineResult<Assumptions> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .comment(Some(b'#'))
        .from_reader(reader);

    let mut a = Assumptions::classroom_defaults();
    let mut relief = a.tax_relief.unwrap_or_else(TaxRelief::india_default);
    let mut tax_enabled = a.tax_relief.is_some();

    for result in reader.records() {
        let record = result?;
        let name = record.get(0).unwrap_or("");
        let raw = record.get(1).unwrap_or("");

        match name {
            "price" => a.price = number(name, raw)?,
            "down_payment_fraction" => a.down_payment_fraction = number(name, raw)?,
            "loan_rate" => a.loan_rate = number(name, raw)?,
            "loan_tenure_years" => a.loan_tenure_years = whole(name, raw)?,
            "monthly_rent" => a.monthly_rent = number(name, raw)?,
            "rent_growth" => a.rent_growth = number(name, raw)?,
            "house_growth" => a.house_growth = number(name, raw)?,
            "investment_return" => a.investment_return = number(name, raw)?,
            "discount_rate" => a.discount_rate = number(name, raw)?,
            "inflation_rate" => {
                a.inflation_rate = if raw.is_empty() {
                    None
                } else {
                    Some(number(name, raw)?)
                }
            }
            "exit_years" => a.exit_years = whole(name, raw)?,
            "buy_commission" => a.transaction.buy_commission = number(name, raw)?,
            "sell_commission" => a.transaction.sell_commission = number(name, raw)?,
            "closing_costs" => a.transaction.closing_costs = number(name, raw)?,
            "maintenance_pct" => a.ownership_cost = OwnershipCost::PercentOfPrice(number(name, raw)?),
            "maintenance_flat" => a.ownership_cost = OwnershipCost::FlatAnnual(number(name, raw)?),
            "tax_relief" => tax_enabled = flag(name, raw)?,
            "tax_interest_cap" => relief.interest_cap = number(name, raw)?,
            "tax_principal_cap" => relief.principal_cap = number(name, raw)?,
            "tax_rate" => relief.marginal_rate = number(name, raw)?,
            "granularity" => a.granularity = raw.parse::<Granularity>()?,
            other => {
                return Err(EngineError::Load(format!("unknown parameter '{other}'")));
            }
        }
    }

    a.tax_relief = if tax_enabled { Some(relief) } else { None };
    Ok(a)
}

fn number(name: &str, raw: &str) -> EngineResult<f64> {
    raw.parse::<f64>()
        .map_err(|e| EngineError::Load(format!("{name}: '{raw}' is not a number ({e})")))
}

fn whole(name: &str, raw: &str) -> EngineResult<u32> {
    raw.parse::<u32>()
        .map_err(|e| EngineError::Load(format!("{name}: '{raw}' is not a whole number ({e})")))
}

fn flag(name: &str, raw: &str) -> EngineResult<bool> {
    match raw.to_ascii_lowercase().as_str() {
        "true" | "yes" | "1" | "on" => Ok(true),
        "false" | "no" | "0" | "off" => Ok(false),
        _ => Err(EngineError::Load(format!("{name}: '{raw}' is not true/false"))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_overrides_defaults() {
        let data = "\
parameter,value
# property
price,1000000
down_payment_fraction,0.25
granularity,monthly
inflation_rate,
maintenance_flat,24000
tax_relief,false
";
        let a = parse_csv(data.as_bytes()).unwrap();
        assert_eq!(a.price, 1_000_000.0);
        assert_eq!(a.down_payment_fraction, 0.25);
        assert_eq!(a.granularity, Granularity::Monthly);
        assert_eq!(a.inflation_rate, None);
        assert_eq!(a.ownership_cost, OwnershipCost::FlatAnnual(24_000.0));
        assert!(a.tax_relief.is_none());
        // Untouched parameters keep their defaults
        assert_eq!(a.loan_tenure_years, 20);
    }

    #[test]
    fn test_parse_tax_caps() {
        let data = "parameter,value\ntax_rate,0.2\ntax_interest_cap,100000\n";
        let a = parse_csv(data.as_bytes()).unwrap();
        let relief = a.tax_relief.unwrap();
        assert_eq!(relief.marginal_rate, 0.2);
        assert_eq!(relief.interest_cap, 100_000.0);
        assert_eq!(relief.principal_cap, 150_000.0);
    }

    #[test]
    fn test_unknown_parameter_rejected() {
        let data = "parameter,value\nhoa_fees,100\n";
        assert!(matches!(parse_csv(data.as_bytes()), Err(EngineError::Load(_))));
    }

    #[test]
    fn test_bad_number_rejected() {
        let data = "parameter,value\nprice,lots\n";
        assert!(parse_csv(data.as_bytes()).is_err());
    }

    #[test]
    fn test_json_roundtrip_of_defaults() {
        let a = Assumptions::classroom_defaults();
        let json = serde_json::to_string(&a).unwrap();
        let back: Assumptions = serde_json::from_str(&json).unwrap();
        assert_eq!(a, back);
    }
}
