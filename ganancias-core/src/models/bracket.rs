use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// One row of the progressive scale.
///
/// `fixed_amount` is cumulative: it already contains the tax owed on every
/// bracket below this one, so the row matching a taxable base yields the full
/// annual tax without summing marginal slices.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bracket {
    pub lower_bound: Decimal,
    /// `None` marks the open-ended top bracket.
    pub upper_bound: Option<Decimal>,
    pub rate: Decimal,
    pub fixed_amount: Decimal,
}

/// The ordered progressive scale for one fiscal year.
///
/// Construction does not re-check the table invariants (sorted ascending,
/// contiguous, exactly one open-ended bracket at the top, rates below 1);
/// loaders validate once and the engines trust the result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BracketTable {
    brackets: Vec<Bracket>,
}

impl BracketTable {
    pub fn new(brackets: Vec<Bracket>) -> Self {
        Self { brackets }
    }

    pub fn brackets(&self) -> &[Bracket] {
        &self.brackets
    }

    pub fn len(&self) -> usize {
        self.brackets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.brackets.is_empty()
    }
}
