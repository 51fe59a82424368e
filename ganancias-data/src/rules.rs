use ganancias_core::DeductionRules;
use rust_decimal::Decimal;
use thiserror::Error;

/// Errors that can occur when loading the deduction-rule table.
#[derive(Debug, Error)]
pub enum DeductionRulesError {
    #[error("TOML parse error: {0}")]
    TomlParse(String),

    #[error("{field} must not be negative, got {value}")]
    NegativeAllowance {
        field: &'static str,
        value: Decimal,
    },

    #[error("mandatory rate {field} out of range: {value}")]
    RateOutOfRange {
        field: &'static str,
        value: Decimal,
    },

    #[error("mandatory components sum to {component_sum} but the total rate is {total}")]
    TotalRateMismatch {
        component_sum: Decimal,
        total: Decimal,
    },

    #[error("deductible percentage for '{kind}' out of range: {value}")]
    DeductiblePercentageOutOfRange { kind: String, value: Decimal },

    #[error("annual cap for '{kind}' must not be negative, got {value}")]
    NegativeAnnualCap { kind: String, value: Decimal },
}

impl From<toml::de::Error> for DeductionRulesError {
    fn from(err: toml::de::Error) -> Self {
        DeductionRulesError::TomlParse(err.to_string())
    }
}

/// Loader for the deduction-rule table from TOML data.
pub struct DeductionRulesLoader;

impl DeductionRulesLoader {
    /// Deserialize and validate a rule table.
    ///
    /// Checks that every allowance constant is present and non-negative,
    /// that the mandatory rates sit in `[0, 1]` with the published total
    /// matching the component sum, and that every optional-deduction rule
    /// carries a deductible percentage in `[0, 1]` and a non-negative cap.
    pub fn parse(content: &str) -> Result<DeductionRules, DeductionRulesError> {
        let rules: DeductionRules = toml::from_str(content)?;
        Self::validate(&rules)?;
        Ok(rules)
    }

    fn validate(rules: &DeductionRules) -> Result<(), DeductionRulesError> {
        let allowances = &rules.personal_allowances;
        let named = [
            ("general_monthly", allowances.general_monthly),
            ("general_annual", allowances.general_annual),
            ("special_monthly", allowances.special_monthly),
            ("special_annual", allowances.special_annual),
            ("spouse_monthly", allowances.spouse_monthly),
            ("spouse_annual", allowances.spouse_annual),
            ("per_child_monthly", allowances.per_child_monthly),
            ("per_child_annual", allowances.per_child_annual),
            (
                "per_disabled_child_monthly",
                allowances.per_disabled_child_monthly,
            ),
            (
                "per_disabled_child_annual",
                allowances.per_disabled_child_annual,
            ),
        ];
        for (field, value) in named {
            if value < Decimal::ZERO {
                return Err(DeductionRulesError::NegativeAllowance { field, value });
            }
        }

        let rates = &rules.mandatory_rates;
        let rate_fields = [
            ("retirement", rates.retirement),
            ("health_insurance", rates.health_insurance),
            ("law_fund", rates.law_fund),
            ("total", rates.total),
        ];
        for (field, value) in rate_fields {
            if value < Decimal::ZERO || value > Decimal::ONE {
                return Err(DeductionRulesError::RateOutOfRange { field, value });
            }
        }

        let component_sum = rates.retirement + rates.health_insurance + rates.law_fund;
        if component_sum != rates.total {
            return Err(DeductionRulesError::TotalRateMismatch {
                component_sum,
                total: rates.total,
            });
        }

        for (kind, rule) in &rules.optional_deductions {
            if rule.deductible_percentage < Decimal::ZERO
                || rule.deductible_percentage > Decimal::ONE
            {
                return Err(DeductionRulesError::DeductiblePercentageOutOfRange {
                    kind: kind.clone(),
                    value: rule.deductible_percentage,
                });
            }
            if let Some(cap) = rule.annual_cap {
                if cap < Decimal::ZERO {
                    return Err(DeductionRulesError::NegativeAnnualCap {
                        kind: kind.clone(),
                        value: cap,
                    });
                }
            }
        }

        Ok(())
    }
}
