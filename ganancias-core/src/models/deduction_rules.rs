use std::collections::HashMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Statutory allowance amounts. Monthly and annual values are distinct
/// constants published by the tax authority, not a ×12 of each other.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersonalAllowances {
    pub general_monthly: Decimal,
    pub general_annual: Decimal,
    pub special_monthly: Decimal,
    pub special_annual: Decimal,
    pub spouse_monthly: Decimal,
    pub spouse_annual: Decimal,
    pub per_child_monthly: Decimal,
    pub per_child_annual: Decimal,
    pub per_disabled_child_monthly: Decimal,
    pub per_disabled_child_annual: Decimal,
}

/// Mandatory withholding rates applied to the gross salary.
///
/// `total` is the published combined rate; loaders check that it matches the
/// component sum.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MandatoryRates {
    pub retirement: Decimal,
    pub health_insurance: Decimal,
    pub law_fund: Decimal,
    pub total: Decimal,
}

/// Per-kind rule for an optional deduction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OptionalDeductionRule {
    pub deductible_percentage: Decimal,
    pub annual_cap: Option<Decimal>,
}

/// Where annual caps on optional deductions are enforced.
///
/// `MonthlyProrated` clamps each month's deductible amount to one twelfth of
/// the annual cap as soon as the annualized amount would exceed it.
/// `DeferredToAnnual` leaves the monthly result unclamped; the reconciliation
/// engine still applies the prorated clamp when it builds its full-year
/// estimate, so both accumulation modes keep producing the same annual
/// figures. The two variants are never mixed within one calculation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CapPolicy {
    #[default]
    MonthlyProrated,
    DeferredToAnnual,
}

/// The full deduction-rule table, loaded once at startup and read-only
/// afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeductionRules {
    pub personal_allowances: PersonalAllowances,
    pub mandatory_rates: MandatoryRates,
    /// Keyed by deduction kind (e.g. `rent`, `private_health_insurance`).
    /// Kinds absent from the map are fully deductible and uncapped.
    pub optional_deductions: HashMap<String, OptionalDeductionRule>,
    #[serde(default)]
    pub cap_policy: CapPolicy,
}
