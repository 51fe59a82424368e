use ganancias_core::{AnnualProjection, MonthKind, MonthlyResult, WithholdingBalance};

/// Prints the monthly breakdown in pay-slip order.
pub fn print_monthly(result: &MonthlyResult) {
    println!("Gross salary:             {}", result.gross_salary);
    println!(
        "Mandatory withholdings:   {}  (retirement {}, health {}, law fund {})",
        result.mandatory.total,
        result.mandatory.retirement,
        result.mandatory.health_insurance,
        result.mandatory.law_fund
    );
    println!("Net after mandatory:      {}", result.net_after_mandatory);
    println!("Personal allowances:      {}", result.personal.total_monthly);

    if !result.optional.is_empty() {
        println!("Optional deductions:      {}", result.optional_total);
        for line in &result.optional {
            let capped = if line.capped { " (capped)" } else { "" };
            println!("  - {}: {}{}", line.concept, line.deductible_amount, capped);
        }
    }

    println!("Net taxable base:         {}", result.net_taxable_base);

    if result.below_threshold {
        println!("Below the taxable minimum; no withholding applies.");
    } else {
        println!("Annual tax:               {}", result.assessment.annual_tax);
        println!("Monthly withholding:      {}", result.assessment.monthly_tax);
        println!("Effective rate:           {}%", result.effective_rate);
        for entry in &result.assessment.trace {
            let upper = match entry.upper_bound {
                Some(upper) => upper.to_string(),
                None => "and up".to_string(),
            };
            println!(
                "  bracket {} to {}: rate {}, fixed {}, taxed {} -> {}",
                entry.lower_bound,
                upper,
                entry.rate,
                entry.fixed_amount,
                entry.taxed_amount,
                entry.bracket_tax
            );
        }
    }

    println!("Final net salary:         {}", result.final_net_salary);
}

/// Prints the annual projection under the current month's breakdown.
pub fn print_projection(projection: &AnnualProjection) {
    print_monthly(&projection.current_month);
    println!();

    println!(
        "Full-year taxable base:   {}",
        projection.full_year_taxable_base
    );
    println!("Real annual tax:          {}", projection.real_annual_tax);
    println!("Estimated withheld:       {}", projection.estimated_withheld);

    let balance = match projection.balance {
        WithholdingBalance::Favorable => "in your favor",
        WithholdingBalance::Unfavorable => "against you",
        WithholdingBalance::Balanced => "balanced",
    };
    println!(
        "Difference:               {} ({}, {}%)",
        projection.difference, balance, projection.difference_percent
    );

    println!(
        "Current withholding:      {} per month",
        projection.current_monthly_withholding
    );
    println!(
        "Suggested withholding:    {} per month over {} remaining months",
        projection.suggested_monthly_withholding, projection.months_remaining
    );

    println!();
    println!("Monthly summary:");
    for entry in &projection.monthly_summary {
        let tag = match entry.kind {
            MonthKind::Historical => "history",
            MonthKind::Current => "current",
            MonthKind::Projected => "projected",
        };
        println!(
            "  {:<10} {:>9}  base {} -> tax {}",
            entry.label, tag, entry.taxable_base, entry.estimated_tax
        );
    }
}
