use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::models::{BracketTraceEntry, MonthlyResult};

/// Year-to-date totals carried over from prior pay slips.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AggregateAccumulated {
    pub prior_gross_income: Decimal,
    pub prior_deductions: Decimal,
    /// Tax actually retained so far, when the worker knows it. Absent or
    /// zero, the engine estimates it from the average prior month.
    pub prior_withheld_tax: Option<Decimal>,
}

/// One prior month as reported by the deduction-form scraper. The deduction
/// total is treated as an opaque, already-deductible monthly amount.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryMonth {
    pub label: String,
    pub gross_salary: Decimal,
    pub optional_deductions_total: Decimal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MonthKind {
    Historical,
    Current,
    Projected,
}

/// One line of the chronological monthly summary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonthSummary {
    pub label: String,
    pub taxable_base: Decimal,
    pub estimated_tax: Decimal,
    pub kind: MonthKind,
}

/// Sign of the withheld-versus-owed difference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WithholdingBalance {
    /// More was withheld than the year requires.
    Favorable,
    /// Less was withheld than the year requires.
    Unfavorable,
    Balanced,
}

impl WithholdingBalance {
    pub fn from_difference(difference: Decimal) -> Self {
        if difference > Decimal::ZERO {
            Self::Favorable
        } else if difference < Decimal::ZERO {
            Self::Unfavorable
        } else {
            Self::Balanced
        }
    }
}

/// Full-year projection produced by the reconciliation engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnnualProjection {
    pub current_month: MonthlyResult,
    pub real_annual_tax: Decimal,
    pub estimated_withheld: Decimal,
    /// `estimated_withheld - real_annual_tax`; positive means over-withheld.
    pub difference: Decimal,
    pub difference_percent: Decimal,
    pub balance: WithholdingBalance,
    pub current_monthly_withholding: Decimal,
    /// Even spread of the outstanding tax over the remaining months; zero
    /// when no months remain.
    pub suggested_monthly_withholding: Decimal,
    pub months_remaining: u8,
    pub full_year_taxable_base: Decimal,
    pub monthly_summary: Vec<MonthSummary>,
    pub trace: Vec<BracketTraceEntry>,
}
