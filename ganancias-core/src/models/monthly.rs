use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::models::MaritalStatus;

/// One itemized optional deduction as entered by the worker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OptionalDeduction {
    pub concept: String,
    /// Monthly amount actually paid, before the deductible percentage.
    pub amount: Decimal,
    /// Rule-table key; unrecognized kinds pass through fully deductible.
    pub kind: String,
}

/// Input for one month's withholding calculation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonthlyInput {
    pub gross_salary: Decimal,
    pub marital_status: MaritalStatus,
    pub children: u32,
    pub disabled_children: u32,
    pub optional_deductions: Vec<OptionalDeduction>,
}

/// Mandatory withholdings, each component rounded independently.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MandatoryWithholdings {
    pub retirement: Decimal,
    pub health_insurance: Decimal,
    pub law_fund: Decimal,
    pub total: Decimal,
}

/// Itemized personal-allowance breakdown.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersonalDeductions {
    pub general_monthly: Decimal,
    pub general_annual: Decimal,
    pub special_monthly: Decimal,
    pub special_annual: Decimal,
    pub spouse_monthly: Decimal,
    pub spouse_annual: Decimal,
    pub children_monthly: Decimal,
    pub children_annual: Decimal,
    pub total_monthly: Decimal,
    /// Derived as `total_monthly * 12`, keeping the monthly and annual views
    /// consistent with each other.
    pub total_annual: Decimal,
}

/// One optional deduction after the deductible percentage and cap policy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OptionalDeductionLine {
    pub concept: String,
    pub amount: Decimal,
    pub deductible_amount: Decimal,
    pub capped: bool,
}

/// One bracket visited while applying the progressive scale.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BracketTraceEntry {
    pub lower_bound: Decimal,
    pub upper_bound: Option<Decimal>,
    pub rate: Decimal,
    pub fixed_amount: Decimal,
    pub taxed_amount: Decimal,
    pub bracket_tax: Decimal,
}

/// Outcome of applying the progressive scale to an annualized base.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxAssessment {
    pub annual_tax: Decimal,
    pub monthly_tax: Decimal,
    pub trace: Vec<BracketTraceEntry>,
}

impl TaxAssessment {
    /// Zero-tax assessment for bases at or below the taxable threshold.
    pub fn zero() -> Self {
        Self {
            annual_tax: Decimal::ZERO,
            monthly_tax: Decimal::ZERO,
            trace: Vec::new(),
        }
    }
}

/// Full result of one month's calculation. Built once, never mutated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonthlyResult {
    pub gross_salary: Decimal,
    pub mandatory: MandatoryWithholdings,
    pub net_after_mandatory: Decimal,
    pub personal: PersonalDeductions,
    pub optional: Vec<OptionalDeductionLine>,
    pub optional_total: Decimal,
    pub net_taxable_base: Decimal,
    pub assessment: TaxAssessment,
    pub final_net_salary: Decimal,
    /// Monthly tax as a percentage of the gross salary.
    pub effective_rate: Decimal,
    /// Set when the net taxable base was zero or negative and no tax applies.
    pub below_threshold: bool,
}
