mod bracket;
mod deduction_rules;
mod marital_status;
mod monthly;
mod projection;

pub use bracket::{Bracket, BracketTable};
pub use deduction_rules::{
    CapPolicy, DeductionRules, MandatoryRates, OptionalDeductionRule, PersonalAllowances,
};
pub use marital_status::MaritalStatus;
pub use monthly::{
    BracketTraceEntry, MandatoryWithholdings, MonthlyInput, MonthlyResult, OptionalDeduction,
    OptionalDeductionLine, PersonalDeductions, TaxAssessment,
};
pub use projection::{
    AggregateAccumulated, AnnualProjection, HistoryMonth, MonthKind, MonthSummary,
    WithholdingBalance,
};
