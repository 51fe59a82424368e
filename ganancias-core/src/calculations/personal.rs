//! Personal-allowance breakdown from marital status and dependants.

use rust_decimal::Decimal;
use thiserror::Error;

use crate::calculations::common::round_money;
use crate::models::{DeductionRules, MaritalStatus, PersonalDeductions};

/// Errors that can occur while computing personal deductions.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PersonalDeductionError {
    /// More disabled children were declared than children in total.
    #[error("disabled children count {disabled} exceeds children count {children}")]
    DisabledChildrenExceedTotal { children: u32, disabled: u32 },
}

/// Computes the statutory personal allowances for one worker profile.
#[derive(Debug, Clone)]
pub struct PersonalDeductionCalculator<'a> {
    rules: &'a DeductionRules,
}

impl<'a> PersonalDeductionCalculator<'a> {
    pub fn new(rules: &'a DeductionRules) -> Self {
        Self { rules }
    }

    /// Builds the itemized allowance breakdown.
    ///
    /// The general and special worker allowances always apply; the spouse
    /// allowance only for married workers. Children split into normal and
    /// disabled, each priced by its own monthly and annual constants. The
    /// annual total is derived as `total_monthly * 12` rather than summed
    /// from the annual constants, keeping both views consistent.
    ///
    /// # Errors
    ///
    /// Returns [`PersonalDeductionError::DisabledChildrenExceedTotal`] when
    /// `disabled_children > children`.
    pub fn compute(
        &self,
        marital_status: MaritalStatus,
        children: u32,
        disabled_children: u32,
    ) -> Result<PersonalDeductions, PersonalDeductionError> {
        if disabled_children > children {
            return Err(PersonalDeductionError::DisabledChildrenExceedTotal {
                children,
                disabled: disabled_children,
            });
        }

        let allowances = &self.rules.personal_allowances;

        let (spouse_monthly, spouse_annual) = match marital_status {
            MaritalStatus::Married => (allowances.spouse_monthly, allowances.spouse_annual),
            MaritalStatus::Single => (Decimal::ZERO, Decimal::ZERO),
        };

        let normal_children = Decimal::from(children - disabled_children);
        let disabled = Decimal::from(disabled_children);
        let children_monthly = normal_children * allowances.per_child_monthly
            + disabled * allowances.per_disabled_child_monthly;
        let children_annual = normal_children * allowances.per_child_annual
            + disabled * allowances.per_disabled_child_annual;

        let total_monthly = allowances.general_monthly
            + allowances.special_monthly
            + spouse_monthly
            + children_monthly;
        let total_annual = total_monthly * Decimal::from(12);

        Ok(PersonalDeductions {
            general_monthly: allowances.general_monthly,
            general_annual: allowances.general_annual,
            special_monthly: allowances.special_monthly,
            special_annual: allowances.special_annual,
            spouse_monthly,
            spouse_annual,
            children_monthly: round_money(children_monthly),
            children_annual: round_money(children_annual),
            total_monthly: round_money(total_monthly),
            total_annual: round_money(total_annual),
        })
    }
}
