//! Rule-table loading and validation.
//!
//! The calculation engines assume structurally valid tables; every invariant
//! is enforced here, once, at load time.

pub mod brackets;
pub mod rules;

pub use brackets::{BracketRecord, BracketTableError, BracketTableLoader};
pub use rules::{DeductionRulesError, DeductionRulesLoader};
