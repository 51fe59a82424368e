//! Progressive-scale application.
//!
//! The bracket table is a lookup-and-compute structure rather than a sum of
//! marginal slices: each row's `fixed_amount` already contains the tax owed
//! on every bracket below it, so the row matching the taxable base yields the
//! full annual tax in a single step. The applier still walks every bracket
//! under the base to record the per-bracket trace shown to the worker.
//!
//! A base landing exactly on a boundary belongs to the LOWER bracket; the
//! loop condition is a strict `>` against each row's lower bound.
//!
//! # Example
//!
//! ```
//! use rust_decimal_macros::dec;
//! use ganancias_core::calculations::ProgressiveScale;
//! use ganancias_core::{Bracket, BracketTable};
//!
//! let table = BracketTable::new(vec![
//!     Bracket {
//!         lower_bound: dec!(0),
//!         upper_bound: Some(dec!(1000000)),
//!         rate: dec!(0),
//!         fixed_amount: dec!(0),
//!     },
//!     Bracket {
//!         lower_bound: dec!(1000000),
//!         upper_bound: None,
//!         rate: dec!(0.27),
//!         fixed_amount: dec!(0),
//!     },
//! ]);
//!
//! let assessment = ProgressiveScale::new(&table).apply(dec!(12720000));
//!
//! // (12,720,000 - 1,000,000) × 0.27 = 3,164,400 a year
//! assert_eq!(assessment.annual_tax, dec!(3164400.00));
//! assert_eq!(assessment.monthly_tax, dec!(263700.00));
//! ```

use rust_decimal::Decimal;

use crate::calculations::common::round_money;
use crate::models::{BracketTable, BracketTraceEntry, TaxAssessment};

/// Applies the progressive bracket table to an annualized taxable base.
#[derive(Debug, Clone)]
pub struct ProgressiveScale<'a> {
    table: &'a BracketTable,
}

impl<'a> ProgressiveScale<'a> {
    pub fn new(table: &'a BracketTable) -> Self {
        Self { table }
    }

    /// Computes the annual tax for `annual_taxable_base` along with the
    /// monthly twelfth and the trace of visited brackets.
    ///
    /// Bases at or below zero produce a zero assessment with an empty trace.
    pub fn apply(
        &self,
        annual_taxable_base: Decimal,
    ) -> TaxAssessment {
        if annual_taxable_base <= Decimal::ZERO {
            return TaxAssessment::zero();
        }

        let mut annual_tax = Decimal::ZERO;
        let mut trace = Vec::new();

        for bracket in self.table.brackets() {
            // Strict comparison: a base exactly on a boundary stays in the
            // bracket below it.
            if annual_taxable_base <= bracket.lower_bound {
                break;
            }

            let reach = match bracket.upper_bound {
                Some(upper) => annual_taxable_base.min(upper),
                None => annual_taxable_base,
            };
            let taxed_amount = reach - bracket.lower_bound;
            let bracket_tax = taxed_amount * bracket.rate + bracket.fixed_amount;

            trace.push(BracketTraceEntry {
                lower_bound: bracket.lower_bound,
                upper_bound: bracket.upper_bound,
                rate: bracket.rate,
                fixed_amount: bracket.fixed_amount,
                taxed_amount: round_money(taxed_amount),
                bracket_tax: round_money(bracket_tax),
            });

            // The fixed amount already carries every lower bracket, so the
            // running value is replaced, not accumulated.
            annual_tax = bracket_tax;

            if let Some(upper) = bracket.upper_bound {
                if annual_taxable_base <= upper {
                    break;
                }
            }
        }

        TaxAssessment {
            annual_tax: round_money(annual_tax),
            monthly_tax: round_money(annual_tax / Decimal::from(12)),
            trace,
        }
    }
}
