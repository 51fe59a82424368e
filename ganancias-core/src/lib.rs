pub mod calculations;
pub mod models;

pub use calculations::{
    AnnualReconciliationEngine, MonthlyEngineError, MonthlyTaxEngine, PersonalDeductionCalculator,
    PersonalDeductionError, ProgressiveScale, ReconciliationError,
};
pub use models::*;
