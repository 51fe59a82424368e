//! Annual reconciliation: projecting the full fiscal year from partial data.
//!
//! Two entry points share one output shape:
//!
//! - [`AnnualReconciliationEngine::project_from_aggregate`] works from
//!   year-to-date totals (gross income, deductions, optionally the tax
//!   already retained).
//! - [`AnnualReconciliationEngine::project_from_history`] works from an
//!   itemized list of prior months, as produced by the deduction-form
//!   scraper.
//!
//! Both modes extrapolate the remaining months flatly from the current month
//! (no future salary or deduction changes are assumed), re-apply the
//! progressive scale to the resulting full-year base, and derive the
//! adjustment the remaining withholdings would need. The suggested
//! remaining-month withholding is zero whenever no months remain; that guard
//! holds in both modes.
//!
//! When the tax already retained is not reported, the aggregate mode
//! estimates it by running the average prior month back through the scale.
//! This is an approximation: it does not replay each historical month's own
//! bracket application. The history mode estimates each listed month the
//! same way, annualizing the single month and taking the twelfth, so the two
//! modes agree on equivalent inputs.

use chrono::Month;
use rust_decimal::Decimal;
use thiserror::Error;

use crate::calculations::common::{floor_at_zero, round_money};
use crate::calculations::monthly::{MonthlyEngineError, MonthlyTaxEngine};
use crate::calculations::personal::{PersonalDeductionCalculator, PersonalDeductionError};
use crate::calculations::scale::ProgressiveScale;
use crate::models::{
    AggregateAccumulated, AnnualProjection, BracketTable, DeductionRules, HistoryMonth, MonthKind,
    MonthSummary, MonthlyInput, MonthlyResult, WithholdingBalance,
};

const MONTHS_IN_YEAR: u8 = 12;

/// Errors that can occur while building an annual projection.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ReconciliationError {
    /// The month number fell outside 1–12.
    #[error("month number must be between 1 and 12, got {0}")]
    MonthOutOfRange(u8),

    /// An accumulated year-to-date amount was negative.
    #[error("accumulated {field} must not be negative, got {amount}")]
    NegativeAccumulatedAmount { field: &'static str, amount: Decimal },

    /// A history month carried a negative amount.
    #[error("history month '{label}' has a negative {field}: {amount}")]
    NegativeHistoryAmount {
        label: String,
        field: &'static str,
        amount: Decimal,
    },

    #[error(transparent)]
    Monthly(#[from] MonthlyEngineError),

    #[error(transparent)]
    Personal(#[from] PersonalDeductionError),
}

/// Reconciles withholding already applied against the projected full-year
/// liability.
#[derive(Debug, Clone)]
pub struct AnnualReconciliationEngine<'a> {
    rules: &'a DeductionRules,
    table: &'a BracketTable,
}

impl<'a> AnnualReconciliationEngine<'a> {
    pub fn new(
        rules: &'a DeductionRules,
        table: &'a BracketTable,
    ) -> Self {
        Self { rules, table }
    }

    /// Projects the year from aggregate year-to-date totals.
    ///
    /// With no accumulated state every prior figure is taken as zero, which
    /// reduces the projection to a flat extrapolation of the current month.
    ///
    /// # Errors
    ///
    /// Returns [`ReconciliationError`] on a month number outside 1–12, a
    /// negative accumulated amount, or an invalid current-month input.
    pub fn project_from_aggregate(
        &self,
        current_month: &MonthlyInput,
        accumulated: Option<&AggregateAccumulated>,
        month_number: u8,
    ) -> Result<AnnualProjection, ReconciliationError> {
        check_month_number(month_number)?;
        if let Some(acc) = accumulated {
            check_accumulated(acc)?;
        }

        let engine = MonthlyTaxEngine::new(self.rules, self.table);
        let current = engine.calculate(current_month)?;
        let current_base = engine.net_taxable_with_caps(current_month)?;

        let personal = PersonalDeductionCalculator::new(self.rules).compute(
            current_month.marital_status,
            current_month.children,
            current_month.disabled_children,
        )?;

        let prior_month_count = Decimal::from(month_number - 1);
        let prior_gross = accumulated
            .map(|a| a.prior_gross_income)
            .unwrap_or_default();
        let prior_deductions = accumulated.map(|a| a.prior_deductions).unwrap_or_default();
        let reported_withheld = accumulated.and_then(|a| a.prior_withheld_tax);

        let prior_taxable = floor_at_zero(
            prior_gross * (Decimal::ONE - self.rules.mandatory_rates.total)
                - personal.total_monthly * prior_month_count
                - prior_deductions,
        );

        let estimated_prior_withheld = match reported_withheld {
            Some(withheld) if withheld > Decimal::ZERO => withheld,
            _ if month_number > 1 => {
                let average_base = prior_taxable / prior_month_count;
                let monthly_tax = ProgressiveScale::new(self.table)
                    .apply(average_base * Decimal::from(12))
                    .monthly_tax;
                monthly_tax * prior_month_count
            }
            _ => Decimal::ZERO,
        };

        // The aggregate carries no per-month detail; the summary spreads the
        // prior totals evenly over the elapsed months.
        let mut summary = Vec::new();
        if month_number > 1 {
            let average_base = prior_taxable / prior_month_count;
            let average_tax = estimated_prior_withheld / prior_month_count;
            for month in 1..month_number {
                summary.push(MonthSummary {
                    label: month_label(month),
                    taxable_base: round_money(average_base),
                    estimated_tax: round_money(average_tax),
                    kind: MonthKind::Historical,
                });
            }
        }

        Ok(self.project(
            current,
            current_base,
            prior_taxable,
            estimated_prior_withheld,
            month_number,
            summary,
        ))
    }

    /// Projects the year from an itemized list of prior months.
    ///
    /// Each prior month's taxable base is rebuilt with the current month's
    /// personal-deduction profile (marital status and dependants are assumed
    /// constant across the year); its deduction total is treated as an
    /// opaque, already-deductible amount.
    ///
    /// # Errors
    ///
    /// Returns [`ReconciliationError`] on a month number outside 1–12, a
    /// negative history amount, or an invalid current-month input.
    pub fn project_from_history(
        &self,
        current_month: &MonthlyInput,
        prior_months: &[HistoryMonth],
        month_number: u8,
    ) -> Result<AnnualProjection, ReconciliationError> {
        check_month_number(month_number)?;
        for month in prior_months {
            check_history_month(month)?;
        }

        let engine = MonthlyTaxEngine::new(self.rules, self.table);
        let current = engine.calculate(current_month)?;
        let current_base = engine.net_taxable_with_caps(current_month)?;

        let personal = PersonalDeductionCalculator::new(self.rules).compute(
            current_month.marital_status,
            current_month.children,
            current_month.disabled_children,
        )?;

        let scale = ProgressiveScale::new(self.table);
        let mut prior_taxable_total = Decimal::ZERO;
        let mut estimated_prior_withheld = Decimal::ZERO;
        let mut summary = Vec::with_capacity(prior_months.len() + 1);

        for month in prior_months {
            let mandatory_total = month.gross_salary * self.rules.mandatory_rates.total;
            let taxable = floor_at_zero(
                month.gross_salary
                    - mandatory_total
                    - personal.total_monthly
                    - month.optional_deductions_total,
            );
            // Annualize the single month and take the twelfth, the same
            // approximation the aggregate mode applies to its average.
            let estimated_tax = scale.apply(taxable * Decimal::from(12)).monthly_tax;

            prior_taxable_total += taxable;
            estimated_prior_withheld += estimated_tax;
            summary.push(MonthSummary {
                label: month.label.clone(),
                taxable_base: round_money(taxable),
                estimated_tax,
                kind: MonthKind::Historical,
            });
        }

        Ok(self.project(
            current,
            current_base,
            prior_taxable_total,
            estimated_prior_withheld,
            month_number,
            summary,
        ))
    }

    /// Shared tail of both modes: flat extrapolation, full-year scale
    /// application, and the withheld-versus-owed comparison.
    fn project(
        &self,
        current: MonthlyResult,
        current_base: Decimal,
        prior_taxable: Decimal,
        estimated_prior_withheld: Decimal,
        month_number: u8,
        mut summary: Vec<MonthSummary>,
    ) -> AnnualProjection {
        let months_remaining = MONTHS_IN_YEAR - month_number;
        let remaining = Decimal::from(months_remaining);

        let projected_base = current_base * remaining;
        let full_year_base = prior_taxable + current_base + projected_base;
        let assessment = ProgressiveScale::new(self.table).apply(full_year_base);
        let real_annual_tax = assessment.annual_tax;

        let estimated_withheld = estimated_prior_withheld + current.assessment.monthly_tax;
        let difference = estimated_withheld - real_annual_tax;
        let balance = WithholdingBalance::from_difference(difference);
        let difference_percent = if real_annual_tax > Decimal::ZERO {
            difference.abs() / real_annual_tax * Decimal::ONE_HUNDRED
        } else {
            Decimal::ZERO
        };

        // December closes the year: nothing remains to spread the
        // adjustment over, so the suggestion is zero rather than a division
        // fault.
        let suggested_monthly_withholding = if months_remaining > 0 {
            (real_annual_tax - estimated_withheld) / remaining
        } else {
            Decimal::ZERO
        };

        summary.push(MonthSummary {
            label: month_label(month_number),
            taxable_base: current.net_taxable_base,
            estimated_tax: current.assessment.monthly_tax,
            kind: MonthKind::Current,
        });
        for month in month_number + 1..=MONTHS_IN_YEAR {
            summary.push(MonthSummary {
                label: month_label(month),
                taxable_base: current.net_taxable_base,
                estimated_tax: current.assessment.monthly_tax,
                kind: MonthKind::Projected,
            });
        }

        let current_monthly_withholding = current.assessment.monthly_tax;

        AnnualProjection {
            current_month: current,
            real_annual_tax,
            estimated_withheld: round_money(estimated_withheld),
            difference: round_money(difference),
            difference_percent: round_money(difference_percent),
            balance,
            current_monthly_withholding,
            suggested_monthly_withholding: round_money(suggested_monthly_withholding),
            months_remaining,
            full_year_taxable_base: round_money(full_year_base),
            monthly_summary: summary,
            trace: assessment.trace,
        }
    }
}

fn check_month_number(month_number: u8) -> Result<(), ReconciliationError> {
    if !(1..=MONTHS_IN_YEAR).contains(&month_number) {
        return Err(ReconciliationError::MonthOutOfRange(month_number));
    }
    Ok(())
}

fn check_accumulated(accumulated: &AggregateAccumulated) -> Result<(), ReconciliationError> {
    if accumulated.prior_gross_income < Decimal::ZERO {
        return Err(ReconciliationError::NegativeAccumulatedAmount {
            field: "gross income",
            amount: accumulated.prior_gross_income,
        });
    }
    if accumulated.prior_deductions < Decimal::ZERO {
        return Err(ReconciliationError::NegativeAccumulatedAmount {
            field: "deductions",
            amount: accumulated.prior_deductions,
        });
    }
    if let Some(withheld) = accumulated.prior_withheld_tax {
        if withheld < Decimal::ZERO {
            return Err(ReconciliationError::NegativeAccumulatedAmount {
                field: "withheld tax",
                amount: withheld,
            });
        }
    }
    Ok(())
}

fn check_history_month(month: &HistoryMonth) -> Result<(), ReconciliationError> {
    if month.gross_salary < Decimal::ZERO {
        return Err(ReconciliationError::NegativeHistoryAmount {
            label: month.label.clone(),
            field: "gross salary",
            amount: month.gross_salary,
        });
    }
    if month.optional_deductions_total < Decimal::ZERO {
        return Err(ReconciliationError::NegativeHistoryAmount {
            label: month.label.clone(),
            field: "deduction total",
            amount: month.optional_deductions_total,
        });
    }
    Ok(())
}

fn month_label(number: u8) -> String {
    Month::try_from(number)
        .map(|month| month.name().to_string())
        .unwrap_or_else(|_| format!("month {number}"))
}
