//! Buy vs Rent CLI
//!
//! Command-line front end for the NPV engine. Reads a parameter file
//! (CSV or JSON), runs the requested computation and prints a table.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use log::info;

use buy_vs_rent::assumptions::loader::DEFAULT_PARAMETERS_PATH;
use buy_vs_rent::{
    breakeven_exit_year, Assumptions, Granularity, MonteCarloConfig, NpvEngine, Scenario,
    ScenarioRunner, ScenarioTable,
};

#[derive(Parser, Debug)]
#[command(name = "buy-vs-rent", version, about = "Compare the NPV of buying a home against renting")]
struct Cli {
    /// Parameter file (.csv with parameter,value rows, or .json). Uses the
    /// built-in classroom defaults when omitted and data/parameters.csv is absent.
    #[arg(long, global = true)]
    params: Option<PathBuf>,

    /// Override the cash-flow granularity (monthly or annual)
    #[arg(long, global = true)]
    granularity: Option<Granularity>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Monthly installment for the configured loan
    Emi,
    /// Amortization schedule over the holding period
    Schedule {
        /// Write every month to this CSV file instead of printing yearly totals
        #[arg(long = "csv")]
        output: Option<PathBuf>,
    },
    /// NPV of buying and renting for one growth pair
    Npv {
        #[arg(long, allow_hyphen_values = true)]
        house_growth: Option<f64>,
        #[arg(long, allow_hyphen_values = true)]
        rent_growth: Option<f64>,
    },
    /// Base / Boom / Crash comparison table
    Scenarios {
        #[arg(long)]
        json: bool,
    },
    /// NPVs across a range of house growth rates
    Sensitivity {
        #[arg(long, default_value_t = -0.05, allow_hyphen_values = true)]
        from: f64,
        #[arg(long, default_value_t = 0.15, allow_hyphen_values = true)]
        to: f64,
        #[arg(long, default_value_t = 0.01)]
        step: f64,
    },
    /// Probability that buying wins under random growth
    MonteCarlo {
        #[arg(long, default_value_t = 1000)]
        samples: u32,
        #[arg(long, default_value_t = 0.02)]
        std_dev: f64,
        #[arg(long)]
        seed: Option<u64>,
        /// Emit the full result, including every differential, as JSON
        #[arg(long)]
        json: bool,
    },
    /// Shortest holding period for which buying wins
    Breakeven {
        #[arg(long, default_value_t = 30)]
        max_years: u32,
    },
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    let mut assumptions = load_assumptions(cli.params.as_ref())?;
    if let Some(granularity) = cli.granularity {
        assumptions.granularity = granularity;
    }

    match cli.command {
        Command::Emi => {
            let engine = NpvEngine::new(assumptions)?;
            let a = engine.assumptions();
            println!("Loan amount:  {:>16.2}", a.loan_amount());
            println!("Rate:         {:>15.3}%", a.loan_rate * 100.0);
            println!("Tenure:       {:>13} yrs", a.loan_tenure_years);
            println!("Monthly EMI:  {:>16.2}", engine.emi());
        }
        Command::Schedule { output } => {
            let engine = NpvEngine::new(assumptions)?;
            match output {
                Some(path) => {
                    let mut writer = csv::Writer::from_path(&path)
                        .with_context(|| format!("Unable to create {}", path.display()))?;
                    for row in &engine.schedule().rows {
                        writer.serialize(row)?;
                    }
                    writer.flush()?;
                    println!("Schedule written to: {}", path.display());
                }
                None => print_schedule(&engine),
            }
        }
        Command::Npv { house_growth, rent_growth } => {
            let engine = NpvEngine::new(assumptions)?;
            let hg = house_growth.unwrap_or(engine.assumptions().house_growth);
            let rg = rent_growth.unwrap_or(engine.assumptions().rent_growth);
            let result = engine.compute_npv(hg, rg)?;
            let summary = engine.build_cashflows(hg, rg)?.summary();

            println!("House growth {:.2}%, rent growth {:.2}%", hg * 100.0, rg * 100.0);
            println!("  NPV Buy:   {:>16.2}", result.npv_buy);
            println!("  NPV Rent:  {:>16.2}", result.npv_rent);
            println!("  Buy-Rent:  {:>16.2}", result.difference());
            println!();
            println!("  Installments paid: {:>16.2}", summary.total_installments);
            println!("  Ownership costs:   {:>16.2}", summary.total_ownership_cost);
            println!("  Tax relief:        {:>16.2}", summary.total_tax_relief);
            println!("  Rent paid:         {:>16.2}", summary.total_rent);
            println!("  Net resale:        {:>16.2}", summary.resale);
            println!("  Invested capital:  {:>16.2}", summary.investment);
            if let Some(breakeven) = engine.breakeven_house_growth(rg, -0.5, 0.5)? {
                println!("  Break-even growth: {:>15.2}%", breakeven * 100.0);
            }
        }
        Command::Scenarios { json } => {
            let runner = ScenarioRunner::new(assumptions)?;
            let table = runner.run_scenarios(&Scenario::standard_set(runner.assumptions()))?;
            if json {
                println!("{}", serde_json::to_string_pretty(&table)?);
            } else {
                print_table(&table);
            }
        }
        Command::Sensitivity { from, to, step } => {
            let runner = ScenarioRunner::new(assumptions)?;
            let rows = runner.sensitivity_sweep(from, to, step)?;
            print_table(&ScenarioTable { rows });
        }
        Command::MonteCarlo { samples, std_dev, seed, json } => {
            let config = MonteCarloConfig { samples, std_dev, seed };
            let result = buy_vs_rent::run_monte_carlo(&assumptions, &config)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&result)?);
            } else {
                let s = &result.summary;
                println!("Draws: {}", result.differentials.len());
                println!("Probability buying wins: {:.2}%", result.win_probability * 100.0);
                println!("Buy-Rent mean {:.2}, std dev {:.2}", s.mean, s.std_dev);
                println!(
                    "  P5 {:.2}  P25 {:.2}  P50 {:.2}  P75 {:.2}  P95 {:.2}",
                    s.percentiles.p5, s.percentiles.p25, s.percentiles.p50, s.percentiles.p75, s.percentiles.p95
                );
                for bin in &s.histogram {
                    println!("{:>16.0} .. {:>16.0} {:>5} {}", bin.lower, bin.upper, bin.count, "#".repeat((bin.frequency * 200.0) as usize));
                }
            }
        }
        Command::Breakeven { max_years } => match breakeven_exit_year(&assumptions, max_years)? {
            Some(years) => println!("Buying wins after holding for {} years", years),
            None => println!("Renting wins for every holding period up to {} years", max_years),
        },
    }

    Ok(())
}

fn load_assumptions(path: Option<&PathBuf>) -> Result<Assumptions> {
    if let Some(path) = path {
        return Assumptions::from_path(path)
            .with_context(|| format!("Failed to load parameters from {}", path.display()));
    }

    let default_path = PathBuf::from(DEFAULT_PARAMETERS_PATH);
    if default_path.exists() {
        info!("Using parameters from {}", default_path.display());
        Assumptions::from_path(&default_path)
            .with_context(|| format!("Failed to load parameters from {}", default_path.display()))
    } else {
        info!("Using built-in classroom defaults");
        Ok(Assumptions::classroom_defaults())
    }
}

fn print_schedule(engine: &NpvEngine) {
    println!("Monthly EMI: {:.2}", engine.emi());
    println!("{:>4} {:>16} {:>16} {:>16} {:>16}", "Year", "Interest", "Principal", "Balance", "Equity");
    println!("{}", "-".repeat(72));

    let rows = &engine.schedule().rows;
    for totals in engine.schedule().annual_totals() {
        let last = ((totals.year * 12) as usize).min(rows.len()) - 1;
        println!(
            "{:>4} {:>16.2} {:>16.2} {:>16.2} {:>16.2}",
            totals.year, totals.interest, totals.principal, rows[last].balance, rows[last].equity
        );
    }
}

fn print_table(table: &ScenarioTable) {
    println!(
        "{:<10} {:>8} {:>8} {:>16} {:>16} {:>16}",
        "Scenario", "House%", "Rent%", "NPV Buy", "NPV Rent", "Buy-Rent"
    );
    println!("{}", "-".repeat(80));
    for row in &table.rows {
        println!(
            "{:<10} {:>8.2} {:>8.2} {:>16.2} {:>16.2} {:>16.2}",
            row.name,
            row.house_growth * 100.0,
            row.rent_growth * 100.0,
            row.npv_buy,
            row.npv_rent,
            row.difference
        );
    }
    if table.renting_wins_somewhere() {
        println!("\nIn some scenarios, renting is financially better than buying.");
    }
}
