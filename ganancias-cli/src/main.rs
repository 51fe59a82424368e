use std::fs::{self, File};
use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::{Datelike, Local};
use clap::{Parser, Subcommand};
use ganancias_core::{
    AggregateAccumulated, AnnualReconciliationEngine, MaritalStatus, MonthlyInput,
    MonthlyTaxEngine, OptionalDeduction,
};
use ganancias_data::{BracketTableLoader, DeductionRulesLoader};
use rust_decimal::Decimal;

mod logging;
mod output;

/// Compute Argentina's salary income-tax withholding.
///
/// Rule tables are read from two files: the progressive bracket scale as CSV
/// (lower_bound, upper_bound, rate, fixed_amount) and the deduction rules as
/// TOML (personal allowances, mandatory rates, optional-deduction caps).
#[derive(Parser, Debug)]
#[command(name = "ganancias")]
#[command(version, about, long_about = None)]
struct Args {
    /// Path to the bracket-table CSV file
    #[arg(long, default_value = "data/brackets_2026.csv")]
    brackets: PathBuf,

    /// Path to the deduction-rules TOML file
    #[arg(long, default_value = "data/deduction_rules_2026.toml")]
    rules: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Calculate one month's withholding
    Month(MonthArgs),

    /// Reconcile the fiscal year from accumulated totals
    Year(YearArgs),
}

#[derive(clap::Args, Debug)]
struct MonthArgs {
    /// Monthly gross salary
    #[arg(long)]
    gross: Decimal,

    /// Marital status: single or married
    #[arg(long, default_value = "single", value_parser = parse_marital_status)]
    marital_status: MaritalStatus,

    /// Number of children
    #[arg(long, default_value_t = 0)]
    children: u32,

    /// Number of disabled children (counted within --children)
    #[arg(long, default_value_t = 0)]
    disabled_children: u32,

    /// Optional deduction as kind=monthly-amount (repeatable),
    /// e.g. --deduction rent=450000
    #[arg(long = "deduction", value_parser = parse_deduction)]
    deductions: Vec<OptionalDeduction>,
}

#[derive(clap::Args, Debug)]
struct YearArgs {
    #[command(flatten)]
    month: MonthArgs,

    /// Gross income accumulated over the prior months of the year
    #[arg(long)]
    prior_gross: Option<Decimal>,

    /// Deductions accumulated over the prior months of the year
    #[arg(long)]
    prior_deductions: Option<Decimal>,

    /// Tax already withheld this year, when the pay slips report it
    #[arg(long)]
    prior_withheld: Option<Decimal>,

    /// Month number 1-12; defaults to the current calendar month
    #[arg(long)]
    month_number: Option<u8>,
}

impl MonthArgs {
    fn to_input(&self) -> MonthlyInput {
        MonthlyInput {
            gross_salary: self.gross,
            marital_status: self.marital_status,
            children: self.children,
            disabled_children: self.disabled_children,
            optional_deductions: self.deductions.clone(),
        }
    }
}

impl YearArgs {
    fn accumulated(&self) -> Option<AggregateAccumulated> {
        if self.prior_gross.is_none()
            && self.prior_deductions.is_none()
            && self.prior_withheld.is_none()
        {
            return None;
        }
        Some(AggregateAccumulated {
            prior_gross_income: self.prior_gross.unwrap_or_default(),
            prior_deductions: self.prior_deductions.unwrap_or_default(),
            prior_withheld_tax: self.prior_withheld,
        })
    }
}

fn parse_marital_status(s: &str) -> Result<MaritalStatus, String> {
    MaritalStatus::parse(s).ok_or_else(|| format!("expected 'single' or 'married', got '{s}'"))
}

fn parse_deduction(s: &str) -> Result<OptionalDeduction, String> {
    let (kind, amount) = s
        .split_once('=')
        .ok_or_else(|| format!("expected kind=amount, got '{s}'"))?;
    let amount: Decimal = amount
        .trim()
        .parse()
        .map_err(|e| format!("invalid amount in '{s}': {e}"))?;
    Ok(OptionalDeduction {
        concept: kind.trim().to_string(),
        amount,
        kind: kind.trim().to_string(),
    })
}

fn current_month_number() -> u8 {
    Local::now().month() as u8
}

fn main() -> Result<()> {
    logging::init();

    let args = Args::parse();

    let brackets_file = File::open(&args.brackets)
        .with_context(|| format!("Failed to open: {}", args.brackets.display()))?;
    let table = BracketTableLoader::load(brackets_file)
        .with_context(|| format!("Failed to load bracket table: {}", args.brackets.display()))?;

    let rules_text = fs::read_to_string(&args.rules)
        .with_context(|| format!("Failed to open: {}", args.rules.display()))?;
    let rules = DeductionRulesLoader::parse(&rules_text)
        .with_context(|| format!("Failed to load deduction rules: {}", args.rules.display()))?;

    match args.command {
        Command::Month(month_args) => {
            let input = month_args.to_input();
            let engine = MonthlyTaxEngine::new(&rules, &table);
            let result = engine.calculate(&input).context("Calculation failed")?;
            output::print_monthly(&result);
        }
        Command::Year(year_args) => {
            let input = year_args.month.to_input();
            let month_number = year_args.month_number.unwrap_or_else(current_month_number);
            let accumulated = year_args.accumulated();
            let engine = AnnualReconciliationEngine::new(&rules, &table);
            let projection = engine
                .project_from_aggregate(&input, accumulated.as_ref(), month_number)
                .context("Reconciliation failed")?;
            output::print_projection(&projection);
        }
    }

    Ok(())
}
