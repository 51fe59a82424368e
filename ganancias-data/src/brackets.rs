use std::io::Read;

use ganancias_core::{Bracket, BracketTable};
use rust_decimal::Decimal;
use serde::Deserialize;
use thiserror::Error;

/// Errors that can occur when loading a bracket table.
#[derive(Debug, Error)]
pub enum BracketTableError {
    #[error("CSV parse error: {0}")]
    CsvParse(String),

    #[error("bracket table is empty")]
    Empty,

    #[error("first bracket must start at 0, got {0}")]
    FirstBracketNotZero(Decimal),

    #[error("bracket starting at {lower} does not continue from {previous_upper}")]
    NotContiguous {
        previous_upper: Decimal,
        lower: Decimal,
    },

    #[error("open-ended bracket starting at {lower} must be the last")]
    OpenEndedNotLast { lower: Decimal },

    #[error("last bracket must be open-ended, got upper bound {0}")]
    MissingOpenBracket(Decimal),

    #[error("rate {rate} out of range for bracket starting at {lower}")]
    RateOutOfRange { lower: Decimal, rate: Decimal },

    #[error("negative fixed amount {fixed_amount} for bracket starting at {lower}")]
    NegativeFixedAmount {
        lower: Decimal,
        fixed_amount: Decimal,
    },
}

impl From<csv::Error> for BracketTableError {
    fn from(err: csv::Error) -> Self {
        BracketTableError::CsvParse(err.to_string())
    }
}

/// A single record from the bracket CSV file.
///
/// Columns:
/// - `lower_bound`: where the bracket starts
/// - `upper_bound`: where it ends (empty for the open-ended top bracket)
/// - `rate`: marginal rate as a decimal (e.g. 0.27 for 27%)
/// - `fixed_amount`: cumulative tax owed on every lower bracket
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct BracketRecord {
    pub lower_bound: Decimal,
    #[serde(deserialize_with = "deserialize_optional_decimal")]
    pub upper_bound: Option<Decimal>,
    pub rate: Decimal,
    pub fixed_amount: Decimal,
}

fn deserialize_optional_decimal<'de, D>(deserializer: D) -> Result<Option<Decimal>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let s: Option<String> = Option::deserialize(deserializer)?;
    match s {
        Some(s) if s.trim().is_empty() => Ok(None),
        Some(s) => s
            .trim()
            .parse::<Decimal>()
            .map(Some)
            .map_err(serde::de::Error::custom),
        None => Ok(None),
    }
}

/// Loader for progressive-scale tables from CSV data.
pub struct BracketTableLoader;

impl BracketTableLoader {
    /// Parse bracket records from a CSV reader.
    pub fn parse<R: Read>(reader: R) -> Result<Vec<BracketRecord>, BracketTableError> {
        let mut csv_reader = csv::Reader::from_reader(reader);
        let mut records = Vec::new();

        for result in csv_reader.deserialize() {
            let record: BracketRecord = result?;
            records.push(record);
        }

        Ok(records)
    }

    /// Validate parsed records and build the table the engines will trust.
    ///
    /// Enforced invariants: non-empty, first bracket starts at 0, contiguous
    /// ascending bounds, exactly one open-ended bracket sitting last, every
    /// rate in `[0, 1)`, no negative fixed amount.
    pub fn build(records: Vec<BracketRecord>) -> Result<BracketTable, BracketTableError> {
        let last_index = match records.len() {
            0 => return Err(BracketTableError::Empty),
            n => n - 1,
        };

        let mut previous_upper: Option<Decimal> = None;
        for (index, record) in records.iter().enumerate() {
            match previous_upper {
                None if index == 0 => {
                    if record.lower_bound != Decimal::ZERO {
                        return Err(BracketTableError::FirstBracketNotZero(record.lower_bound));
                    }
                }
                None => {
                    // The previous record had no upper bound but was not last.
                    return Err(BracketTableError::OpenEndedNotLast {
                        lower: records[index - 1].lower_bound,
                    });
                }
                Some(upper) => {
                    if record.lower_bound != upper {
                        return Err(BracketTableError::NotContiguous {
                            previous_upper: upper,
                            lower: record.lower_bound,
                        });
                    }
                }
            }

            if record.rate < Decimal::ZERO || record.rate >= Decimal::ONE {
                return Err(BracketTableError::RateOutOfRange {
                    lower: record.lower_bound,
                    rate: record.rate,
                });
            }
            if record.fixed_amount < Decimal::ZERO {
                return Err(BracketTableError::NegativeFixedAmount {
                    lower: record.lower_bound,
                    fixed_amount: record.fixed_amount,
                });
            }

            if index == last_index {
                if let Some(upper) = record.upper_bound {
                    return Err(BracketTableError::MissingOpenBracket(upper));
                }
            }
            previous_upper = record.upper_bound;
        }

        Ok(BracketTable::new(
            records
                .into_iter()
                .map(|record| Bracket {
                    lower_bound: record.lower_bound,
                    upper_bound: record.upper_bound,
                    rate: record.rate,
                    fixed_amount: record.fixed_amount,
                })
                .collect(),
        ))
    }

    /// Parse and validate in one step.
    pub fn load<R: Read>(reader: R) -> Result<BracketTable, BracketTableError> {
        Self::build(Self::parse(reader)?)
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    use super::*;

    const TEST_CSV: &str = r#"lower_bound,upper_bound,rate,fixed_amount
0,1200000,0.05,0
1200000,2400000,0.09,60000
2400000,3600000,0.12,168000
3600000,4800000,0.15,312000
4800000,7200000,0.19,492000
7200000,9600000,0.23,948000
9600000,14400000,0.27,1500000
14400000,19200000,0.31,2796000
19200000,,0.35,4284000
"#;

    #[test]
    fn test_parse_csv_single_bracket() {
        let csv = "lower_bound,upper_bound,rate,fixed_amount\n0,1200000,0.05,0";

        let records = BracketTableLoader::parse(csv.as_bytes()).expect("Failed to parse CSV");

        assert_eq!(records.len(), 1);
        assert_eq!(
            records[0],
            BracketRecord {
                lower_bound: dec!(0),
                upper_bound: Some(dec!(1200000)),
                rate: dec!(0.05),
                fixed_amount: dec!(0),
            }
        );
    }

    #[test]
    fn test_parse_csv_open_ended_upper_bound() {
        let csv = "lower_bound,upper_bound,rate,fixed_amount\n19200000,,0.35,4284000";

        let records = BracketTableLoader::parse(csv.as_bytes()).expect("Failed to parse CSV");

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].upper_bound, None);
        assert_eq!(records[0].fixed_amount, dec!(4284000));
    }

    #[test]
    fn test_load_full_table() {
        let table = BracketTableLoader::load(TEST_CSV.as_bytes()).expect("Failed to load table");

        assert_eq!(table.len(), 9);
        assert_eq!(table.brackets()[0].lower_bound, dec!(0));
        assert_eq!(table.brackets()[8].upper_bound, None);
        assert_eq!(table.brackets()[8].rate, dec!(0.35));
    }

    #[test]
    fn test_build_rejects_empty_table() {
        let result = BracketTableLoader::build(vec![]);

        assert!(matches!(result, Err(BracketTableError::Empty)));
    }

    #[test]
    fn test_build_rejects_first_bracket_above_zero() {
        let csv = "lower_bound,upper_bound,rate,fixed_amount\n100,,0.05,0";
        let records = BracketTableLoader::parse(csv.as_bytes()).unwrap();

        let result = BracketTableLoader::build(records);

        assert!(matches!(
            result,
            Err(BracketTableError::FirstBracketNotZero(lower)) if lower == dec!(100)
        ));
    }

    #[test]
    fn test_build_rejects_gap_between_brackets() {
        let csv = "lower_bound,upper_bound,rate,fixed_amount\n\
                   0,1200000,0.05,0\n\
                   1300000,,0.09,60000";
        let records = BracketTableLoader::parse(csv.as_bytes()).unwrap();

        let result = BracketTableLoader::build(records);

        assert!(matches!(
            result,
            Err(BracketTableError::NotContiguous { previous_upper, lower })
                if previous_upper == dec!(1200000) && lower == dec!(1300000)
        ));
    }

    #[test]
    fn test_build_rejects_open_ended_bracket_in_the_middle() {
        let csv = "lower_bound,upper_bound,rate,fixed_amount\n\
                   0,,0.05,0\n\
                   1200000,,0.09,60000";
        let records = BracketTableLoader::parse(csv.as_bytes()).unwrap();

        let result = BracketTableLoader::build(records);

        assert!(matches!(
            result,
            Err(BracketTableError::OpenEndedNotLast { lower }) if lower == dec!(0)
        ));
    }

    #[test]
    fn test_build_rejects_bounded_last_bracket() {
        let csv = "lower_bound,upper_bound,rate,fixed_amount\n0,1200000,0.05,0";
        let records = BracketTableLoader::parse(csv.as_bytes()).unwrap();

        let result = BracketTableLoader::build(records);

        assert!(matches!(
            result,
            Err(BracketTableError::MissingOpenBracket(upper)) if upper == dec!(1200000)
        ));
    }

    #[test]
    fn test_build_rejects_rate_of_one_or_more() {
        let csv = "lower_bound,upper_bound,rate,fixed_amount\n0,,1.0,0";
        let records = BracketTableLoader::parse(csv.as_bytes()).unwrap();

        let result = BracketTableLoader::build(records);

        assert!(matches!(
            result,
            Err(BracketTableError::RateOutOfRange { rate, .. }) if rate == dec!(1.0)
        ));
    }

    #[test]
    fn test_build_rejects_negative_rate() {
        let csv = "lower_bound,upper_bound,rate,fixed_amount\n0,,-0.05,0";
        let records = BracketTableLoader::parse(csv.as_bytes()).unwrap();

        let result = BracketTableLoader::build(records);

        assert!(matches!(
            result,
            Err(BracketTableError::RateOutOfRange { .. })
        ));
    }

    #[test]
    fn test_build_rejects_negative_fixed_amount() {
        let csv = "lower_bound,upper_bound,rate,fixed_amount\n0,,0.05,-10";
        let records = BracketTableLoader::parse(csv.as_bytes()).unwrap();

        let result = BracketTableLoader::build(records);

        assert!(matches!(
            result,
            Err(BracketTableError::NegativeFixedAmount { .. })
        ));
    }

    #[test]
    fn test_parse_invalid_csv_missing_column() {
        let csv = "lower_bound,upper_bound,rate\n0,1200000,0.05";

        let result = BracketTableLoader::parse(csv.as_bytes());

        let err = result.expect_err("Should fail for missing column");
        let BracketTableError::CsvParse(msg) = err else {
            panic!("Expected CsvParse error, got: {:?}", err);
        };
        assert!(
            msg.contains("missing field"),
            "Expected 'missing field' in error, got: {}",
            msg
        );
    }

    #[test]
    fn test_parse_invalid_csv_bad_decimal() {
        let csv = "lower_bound,upper_bound,rate,fixed_amount\nabc,1200000,0.05,0";

        let result = BracketTableLoader::parse(csv.as_bytes());

        assert!(matches!(result, Err(BracketTableError::CsvParse(_))));
    }

    #[test]
    fn test_parse_empty_csv() {
        let csv = "lower_bound,upper_bound,rate,fixed_amount\n";

        let records = BracketTableLoader::parse(csv.as_bytes()).expect("Failed to parse CSV");

        assert!(records.is_empty());
    }
}
