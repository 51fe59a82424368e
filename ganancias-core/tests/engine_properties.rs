//! Cross-engine properties over a realistic nine-bracket scale.

use ganancias_core::{
    AggregateAccumulated, AnnualReconciliationEngine, Bracket, BracketTable, CapPolicy,
    DeductionRules, HistoryMonth, MandatoryRates, MaritalStatus, MonthlyInput, MonthlyTaxEngine,
    PersonalAllowances, ProgressiveScale,
};
use pretty_assertions::assert_eq;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

fn bracket(
    lower: Decimal,
    upper: Option<Decimal>,
    rate: Decimal,
    fixed: Decimal,
) -> Bracket {
    Bracket {
        lower_bound: lower,
        upper_bound: upper,
        rate,
        fixed_amount: fixed,
    }
}

/// Nine contiguous brackets with cumulative fixed amounts, the shape of the
/// shipped fiscal-year tables.
fn scale_2026() -> BracketTable {
    BracketTable::new(vec![
        bracket(dec!(0), Some(dec!(1200000)), dec!(0.05), dec!(0)),
        bracket(dec!(1200000), Some(dec!(2400000)), dec!(0.09), dec!(60000)),
        bracket(dec!(2400000), Some(dec!(3600000)), dec!(0.12), dec!(168000)),
        bracket(dec!(3600000), Some(dec!(4800000)), dec!(0.15), dec!(312000)),
        bracket(dec!(4800000), Some(dec!(7200000)), dec!(0.19), dec!(492000)),
        bracket(dec!(7200000), Some(dec!(9600000)), dec!(0.23), dec!(948000)),
        bracket(dec!(9600000), Some(dec!(14400000)), dec!(0.27), dec!(1500000)),
        bracket(dec!(14400000), Some(dec!(19200000)), dec!(0.31), dec!(2796000)),
        bracket(dec!(19200000), None, dec!(0.35), dec!(4284000)),
    ])
}

fn rules_2026() -> DeductionRules {
    DeductionRules {
        personal_allowances: PersonalAllowances {
            general_monthly: dec!(375000),
            general_annual: dec!(4500000),
            special_monthly: dec!(1800000),
            special_annual: dec!(21600000),
            spouse_monthly: dec!(350000),
            spouse_annual: dec!(4200000),
            per_child_monthly: dec!(177000),
            per_child_annual: dec!(2124000),
            per_disabled_child_monthly: dec!(354000),
            per_disabled_child_annual: dec!(4248000),
        },
        mandatory_rates: MandatoryRates {
            retirement: dec!(0.11),
            health_insurance: dec!(0.03),
            law_fund: dec!(0.03),
            total: dec!(0.17),
        },
        optional_deductions: Default::default(),
        cap_policy: CapPolicy::MonthlyProrated,
    }
}

fn input(gross: Decimal) -> MonthlyInput {
    MonthlyInput {
        gross_salary: gross,
        marital_status: MaritalStatus::Single,
        children: 0,
        disabled_children: 0,
        optional_deductions: vec![],
    }
}

#[test]
fn tax_is_monotonic_in_taxable_base() {
    let table = scale_2026();
    let scale = ProgressiveScale::new(&table);

    let mut previous = Decimal::ZERO;
    let mut base = Decimal::ZERO;
    while base <= dec!(25000000) {
        let tax = scale.apply(base).annual_tax;
        assert!(
            tax >= previous,
            "tax decreased from {previous} to {tax} at base {base}"
        );
        previous = tax;
        base += dec!(100000);
    }
}

#[test]
fn every_boundary_belongs_to_the_lower_bracket() {
    let table = scale_2026();
    let scale = ProgressiveScale::new(&table);

    for (index, row) in table.brackets().iter().enumerate() {
        let Some(upper) = row.upper_bound else {
            continue;
        };

        let at_boundary = scale.apply(upper);
        let past_boundary = scale.apply(upper + dec!(0.01));

        assert_eq!(
            at_boundary.trace.len(),
            index + 1,
            "base {upper} should stop in bracket {index}"
        );
        assert_eq!(past_boundary.trace.len(), index + 2);

        // Continuity: fixed amounts accumulate the lower brackets exactly,
        // so crossing a boundary adds at most one cent's worth of marginal
        // rate.
        let jump = past_boundary.annual_tax - at_boundary.annual_tax;
        assert!(jump >= Decimal::ZERO);
        assert!(jump <= dec!(0.01), "discontinuity of {jump} at {upper}");
    }
}

#[test]
fn net_taxable_base_is_monotonic_in_gross_salary() {
    let rules = rules_2026();
    let table = scale_2026();
    let engine = MonthlyTaxEngine::new(&rules, &table);

    let mut previous = Decimal::ZERO;
    let mut gross = dec!(1000000);
    while gross <= dec!(20000000) {
        let result = engine.calculate(&input(gross)).unwrap();
        assert!(
            result.net_taxable_base >= previous,
            "net taxable base decreased at gross {gross}"
        );
        previous = result.net_taxable_base;
        gross += dec!(250000);
    }
}

#[test]
fn below_threshold_salaries_pay_no_tax() {
    let rules = rules_2026();
    let table = scale_2026();
    let engine = MonthlyTaxEngine::new(&rules, &table);

    // 2,175,000 of monthly allowances need a gross above ~2.62M to tax.
    for gross in [dec!(0), dec!(500000), dec!(1500000), dec!(2600000)] {
        let result = engine.calculate(&input(gross)).unwrap();
        assert!(result.below_threshold, "gross {gross} should be exempt");
        assert_eq!(result.assessment.monthly_tax, dec!(0));
        assert_eq!(result.assessment.annual_tax, dec!(0));
    }
}

#[test]
fn both_reconciliation_modes_agree_on_a_flat_year() {
    let rules = rules_2026();
    let table = scale_2026();
    let engine = AnnualReconciliationEngine::new(&rules, &table);
    let current = input(dec!(4500000));

    let history: Vec<HistoryMonth> = (1..=8)
        .map(|number| HistoryMonth {
            label: format!("month {number}"),
            gross_salary: dec!(4500000),
            optional_deductions_total: dec!(0),
        })
        .collect();
    let accumulated = AggregateAccumulated {
        prior_gross_income: dec!(36000000),
        prior_deductions: dec!(0),
        prior_withheld_tax: None,
    };

    let from_history = engine.project_from_history(&current, &history, 9).unwrap();
    let from_aggregate = engine
        .project_from_aggregate(&current, Some(&accumulated), 9)
        .unwrap();

    assert_eq!(from_history.real_annual_tax, from_aggregate.real_annual_tax);
    assert_eq!(
        from_history.estimated_withheld,
        from_aggregate.estimated_withheld
    );
    assert_eq!(
        from_history.suggested_monthly_withholding,
        from_aggregate.suggested_monthly_withholding
    );
    assert_eq!(
        from_history.full_year_taxable_base,
        from_aggregate.full_year_taxable_base
    );
}

#[test]
fn december_reconciliation_never_divides_by_zero() {
    let rules = rules_2026();
    let table = scale_2026();
    let engine = AnnualReconciliationEngine::new(&rules, &table);
    let current = input(dec!(4500000));

    let aggregate = engine
        .project_from_aggregate(&current, None, 12)
        .unwrap();
    let history = engine.project_from_history(&current, &[], 12).unwrap();

    assert_eq!(aggregate.months_remaining, 0);
    assert_eq!(aggregate.suggested_monthly_withholding, dec!(0));
    assert_eq!(history.months_remaining, 0);
    assert_eq!(history.suggested_monthly_withholding, dec!(0));
}

#[test]
fn projection_is_pure() {
    let rules = rules_2026();
    let table = scale_2026();
    let engine = AnnualReconciliationEngine::new(&rules, &table);
    let current = input(dec!(4500000));
    let accumulated = AggregateAccumulated {
        prior_gross_income: dec!(18000000),
        prior_deductions: dec!(350000),
        prior_withheld_tax: Some(dec!(420000)),
    };

    let first = engine
        .project_from_aggregate(&current, Some(&accumulated), 5)
        .unwrap();
    let second = engine
        .project_from_aggregate(&current, Some(&accumulated), 5)
        .unwrap();

    assert_eq!(first, second);
}
