//! Shared money-arithmetic helpers.
//!
//! Every amount placed into a result struct is rounded here; intermediate
//! computation stays at full precision so rounding error never compounds.

use rust_decimal::Decimal;

/// Rounds a monetary value to two fractional digits, half-up (away from
/// zero), the standard financial convention.
///
/// # Examples
///
/// ```
/// use rust_decimal_macros::dec;
/// use ganancias_core::calculations::common::round_money;
///
/// assert_eq!(round_money(dec!(263700.004)), dec!(263700.00));
/// assert_eq!(round_money(dec!(263700.005)), dec!(263700.01));
/// ```
pub fn round_money(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(2, rust_decimal::RoundingStrategy::MidpointAwayFromZero)
}

/// Floors a taxable amount at zero. Deductions can exceed income; taxable
/// bases never go negative.
pub fn floor_at_zero(value: Decimal) -> Decimal {
    if value > Decimal::ZERO {
        value
    } else {
        Decimal::ZERO
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    use super::*;

    // =========================================================================
    // round_money tests
    // =========================================================================

    #[test]
    fn round_money_rounds_down_below_midpoint() {
        let result = round_money(dec!(1660000.454));

        assert_eq!(result, dec!(1660000.45));
    }

    #[test]
    fn round_money_rounds_up_at_midpoint() {
        let result = round_money(dec!(1660000.455));

        assert_eq!(result, dec!(1660000.46));
    }

    #[test]
    fn round_money_rounds_away_from_zero_for_negatives() {
        let result = round_money(dec!(-0.125));

        assert_eq!(result, dec!(-0.13));
    }

    #[test]
    fn round_money_preserves_already_rounded_values() {
        let result = round_money(dec!(340000.00));

        assert_eq!(result, dec!(340000.00));
    }

    // =========================================================================
    // floor_at_zero tests
    // =========================================================================

    #[test]
    fn floor_at_zero_passes_positive_values() {
        let result = floor_at_zero(dec!(1060000.00));

        assert_eq!(result, dec!(1060000.00));
    }

    #[test]
    fn floor_at_zero_clamps_negative_values() {
        let result = floor_at_zero(dec!(-185000.00));

        assert_eq!(result, dec!(0));
    }

    #[test]
    fn floor_at_zero_keeps_zero() {
        let result = floor_at_zero(dec!(0));

        assert_eq!(result, dec!(0));
    }
}
