//! One month's full withholding calculation.
//!
//! # Calculation steps
//!
//! The engine runs the following steps in strict order:
//!
//! | Step | Description |
//! |------|-------------|
//! | 1    | Mandatory withholdings (retirement, health insurance, law fund), each rounded independently |
//! | 2    | Net salary after mandatory withholdings |
//! | 3    | Personal allowances for the worker's profile |
//! | 4    | Optional deductions: deductible percentage, then the annual cap per the configured policy |
//! | 5    | Net taxable base; at or below zero the calculation short-circuits to a zero-tax result |
//! | 6    | Annualize (×12) and apply the progressive scale |
//! | 7    | Final net salary and effective rate |
//!
//! The engine is a pure function over the rule tables and the input: the same
//! input always produces an identical result.
//!
//! # Example
//!
//! ```
//! use rust_decimal_macros::dec;
//! use ganancias_core::calculations::MonthlyTaxEngine;
//! use ganancias_core::{
//!     Bracket, BracketTable, CapPolicy, DeductionRules, MandatoryRates, MaritalStatus,
//!     MonthlyInput, PersonalAllowances,
//! };
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
//! let rules = DeductionRules {
//!     personal_allowances: PersonalAllowances {
//!         general_monthly: dec!(300000),
//!         general_annual: dec!(3600000),
//!         special_monthly: dec!(300000),
//!         special_annual: dec!(3600000),
//!         spouse_monthly: dec!(120000),
//!         spouse_annual: dec!(1440000),
//!         per_child_monthly: dec!(50000),
//!         per_child_annual: dec!(600000),
//!         per_disabled_child_monthly: dec!(100000),
//!         per_disabled_child_annual: dec!(1200000),
//!     },
//!     mandatory_rates: MandatoryRates {
//!         retirement: dec!(0.11),
//!         health_insurance: dec!(0.03),
//!         law_fund: dec!(0.03),
//!         total: dec!(0.17),
//!     },
//!     optional_deductions: Default::default(),
//!     cap_policy: CapPolicy::MonthlyProrated,
//! };
//!
//! let engine = MonthlyTaxEngine::new(&rules, &table);
//! let result = engine
//!     .calculate(&MonthlyInput {
//!         gross_salary: dec!(2000000),
//!         marital_status: MaritalStatus::Single,
//!         children: 0,
//!         disabled_children: 0,
//!         optional_deductions: vec![],
//!     })
//!     .unwrap();
//!
//! assert_eq!(result.mandatory.total, dec!(340000.00));
//! assert_eq!(result.net_taxable_base, dec!(1060000.00));
//! assert_eq!(result.assessment.annual_tax, dec!(3164400.00));
//! assert_eq!(result.final_net_salary, dec!(1396300.00));
//! ```

use rust_decimal::Decimal;
use thiserror::Error;
use tracing::warn;

use crate::calculations::common::{floor_at_zero, round_money};
use crate::calculations::personal::{PersonalDeductionCalculator, PersonalDeductionError};
use crate::calculations::scale::ProgressiveScale;
use crate::models::{
    BracketTable, CapPolicy, DeductionRules, MandatoryWithholdings, MonthlyInput, MonthlyResult,
    OptionalDeduction, OptionalDeductionLine, TaxAssessment,
};

/// Errors that can occur during a monthly calculation.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum MonthlyEngineError {
    /// The gross salary was negative.
    #[error("gross salary must not be negative, got {0}")]
    NegativeGrossSalary(Decimal),

    /// An optional deduction carried a negative amount.
    #[error("optional deduction '{concept}' has a negative amount {amount}")]
    NegativeDeductionAmount { concept: String, amount: Decimal },

    #[error(transparent)]
    PersonalDeduction(#[from] PersonalDeductionError),
}

/// Calculator for one month's withholding.
///
/// Holds references to the two immutable rule tables; every calculation is a
/// pure function over them and the per-call input.
#[derive(Debug, Clone)]
pub struct MonthlyTaxEngine<'a> {
    rules: &'a DeductionRules,
    table: &'a BracketTable,
}

impl<'a> MonthlyTaxEngine<'a> {
    pub fn new(
        rules: &'a DeductionRules,
        table: &'a BracketTable,
    ) -> Self {
        Self { rules, table }
    }

    /// Runs the full monthly calculation.
    ///
    /// # Errors
    ///
    /// Returns [`MonthlyEngineError`] on a negative gross salary, a negative
    /// optional-deduction amount, or more disabled children than children.
    /// No partial result is produced on error.
    pub fn calculate(
        &self,
        input: &MonthlyInput,
    ) -> Result<MonthlyResult, MonthlyEngineError> {
        self.validate(input)?;

        let mandatory = self.mandatory_withholdings(input.gross_salary);
        let net_after_mandatory = input.gross_salary - mandatory.total;

        let personal = PersonalDeductionCalculator::new(self.rules).compute(
            input.marital_status,
            input.children,
            input.disabled_children,
        )?;

        let enforce_caps = self.rules.cap_policy == CapPolicy::MonthlyProrated;
        let (optional, optional_total) =
            self.optional_deduction_lines(&input.optional_deductions, enforce_caps);

        let net_taxable = net_after_mandatory - personal.total_monthly - optional_total;

        if net_taxable <= Decimal::ZERO {
            warn!(
                net_taxable = %net_taxable,
                gross_salary = %input.gross_salary,
                "net taxable base at or below zero; no withholding applies"
            );
            return Ok(MonthlyResult {
                gross_salary: round_money(input.gross_salary),
                mandatory,
                net_after_mandatory: round_money(net_after_mandatory),
                personal,
                optional,
                optional_total: round_money(optional_total),
                net_taxable_base: Decimal::ZERO,
                assessment: TaxAssessment::zero(),
                final_net_salary: round_money(net_after_mandatory),
                effective_rate: Decimal::ZERO,
                below_threshold: true,
            });
        }

        let assessment = ProgressiveScale::new(self.table).apply(net_taxable * Decimal::from(12));
        let final_net_salary = net_after_mandatory - assessment.monthly_tax;
        let effective_rate = if input.gross_salary > Decimal::ZERO {
            assessment.monthly_tax / input.gross_salary * Decimal::ONE_HUNDRED
        } else {
            Decimal::ZERO
        };

        Ok(MonthlyResult {
            gross_salary: round_money(input.gross_salary),
            mandatory,
            net_after_mandatory: round_money(net_after_mandatory),
            personal,
            optional,
            optional_total: round_money(optional_total),
            net_taxable_base: round_money(net_taxable),
            assessment,
            final_net_salary: round_money(final_net_salary),
            effective_rate: round_money(effective_rate),
            below_threshold: false,
        })
    }

    /// Net taxable base with annual caps enforced regardless of the
    /// configured policy. The reconciliation engine projects the year from
    /// this value so deferred caps still bind the annual estimate.
    pub(crate) fn net_taxable_with_caps(
        &self,
        input: &MonthlyInput,
    ) -> Result<Decimal, MonthlyEngineError> {
        self.validate(input)?;

        let mandatory_total = round_money(input.gross_salary * self.rules.mandatory_rates.total);
        let personal = PersonalDeductionCalculator::new(self.rules).compute(
            input.marital_status,
            input.children,
            input.disabled_children,
        )?;
        let (_, optional_total) = self.optional_deduction_lines(&input.optional_deductions, true);

        Ok(floor_at_zero(
            input.gross_salary - mandatory_total - personal.total_monthly - optional_total,
        ))
    }

    fn validate(
        &self,
        input: &MonthlyInput,
    ) -> Result<(), MonthlyEngineError> {
        if input.gross_salary < Decimal::ZERO {
            return Err(MonthlyEngineError::NegativeGrossSalary(input.gross_salary));
        }
        for item in &input.optional_deductions {
            if item.amount < Decimal::ZERO {
                return Err(MonthlyEngineError::NegativeDeductionAmount {
                    concept: item.concept.clone(),
                    amount: item.amount,
                });
            }
        }
        Ok(())
    }

    /// Step 1: each component is rounded on its own, and the total comes
    /// from the published combined rate rather than the component sum.
    fn mandatory_withholdings(
        &self,
        gross_salary: Decimal,
    ) -> MandatoryWithholdings {
        let rates = &self.rules.mandatory_rates;
        MandatoryWithholdings {
            retirement: round_money(gross_salary * rates.retirement),
            health_insurance: round_money(gross_salary * rates.health_insurance),
            law_fund: round_money(gross_salary * rates.law_fund),
            total: round_money(gross_salary * rates.total),
        }
    }

    /// Step 4: applies the deductible percentage per kind and, when
    /// `enforce_caps` is set, clamps to one twelfth of the annual cap.
    ///
    /// Unrecognized kinds are not an error: they pass through fully
    /// deductible and uncapped.
    fn optional_deduction_lines(
        &self,
        items: &[OptionalDeduction],
        enforce_caps: bool,
    ) -> (Vec<OptionalDeductionLine>, Decimal) {
        let mut lines = Vec::with_capacity(items.len());
        let mut total = Decimal::ZERO;

        for item in items {
            let rule = self.rules.optional_deductions.get(&item.kind);
            if rule.is_none() {
                warn!(
                    kind = %item.kind,
                    concept = %item.concept,
                    "unrecognized optional deduction kind; passing through fully deductible"
                );
            }

            let percentage = rule
                .map(|r| r.deductible_percentage)
                .unwrap_or(Decimal::ONE);
            let mut deductible = item.amount * percentage;
            let mut capped = false;

            if enforce_caps {
                if let Some(cap) = rule.and_then(|r| r.annual_cap) {
                    if deductible * Decimal::from(12) > cap {
                        deductible = cap / Decimal::from(12);
                        capped = true;
                    }
                }
            }

            total += deductible;
            lines.push(OptionalDeductionLine {
                concept: item.concept.clone(),
                amount: item.amount,
                deductible_amount: round_money(deductible),
                capped,
            });
        }

        (lines, total)
    }
}
