//! String codec of the slur-classifier threshold table.
//!
//! Rules are separated by `_`, values within a rule by `,`:
//! `"20,0,0_10,10,1.5_0,0,1.7"`. The table is always 3 rules of 3 values.

use twave_delineator::FeatureThresholds;

use crate::error::{ConfigError, Result};

const RULES: usize = 3;
const VALUES: usize = 3;

/// Parses a threshold string into a [`FeatureThresholds`] table.
///
/// # Example
///
/// ```rust
/// use twave_config::parse_thresholds;
///
/// let table = parse_thresholds("20,0,0_10,10,1.5_0,0,1.7").unwrap();
/// assert_eq!(table.get(1, 2), 1.5);
/// ```
pub fn parse_thresholds(text: &str) -> Result<FeatureThresholds> {
    let rules: Vec<&str> = text.split('_').collect();
    if rules.len() != RULES {
        return Err(ConfigError::ThresholdTable {
            row: rules.len().min(RULES),
            token: text.to_string(),
            reason: "must hold exactly 3 rules",
        });
    }

    let mut table = [[0.0; VALUES]; RULES];
    for (row, rule) in rules.iter().enumerate() {
        let values: Vec<&str> = rule.split(',').collect();
        if values.len() != VALUES {
            return Err(ConfigError::ThresholdTable {
                row,
                token: (*rule).to_string(),
                reason: "must hold exactly 3 values",
            });
        }
        for (column, token) in values.iter().enumerate() {
            let value: f64 = token.trim().parse().map_err(|_| ConfigError::ThresholdTable {
                row,
                token: (*token).to_string(),
                reason: "is not a number",
            })?;
            if !value.is_finite() {
                return Err(ConfigError::ThresholdTable {
                    row,
                    token: (*token).to_string(),
                    reason: "is not finite",
                });
            }
            table[row][column] = value;
        }
    }
    Ok(FeatureThresholds(table))
}

/// Formats a table back into its string form.
pub fn format_thresholds(table: &FeatureThresholds) -> String {
    table
        .0
        .iter()
        .map(|rule| {
            rule.iter()
                .map(f64::to_string)
                .collect::<Vec<_>>()
                .join(",")
        })
        .collect::<Vec<_>>()
        .join("_")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_string_matches_default_table() {
        let table = parse_thresholds("20,0,0_10,10,1.5_0,0,1.7").unwrap();
        assert_eq!(table, FeatureThresholds::default());
        assert_eq!(format_thresholds(&table), "20,0,0_10,10,1.5_0,0,1.7");
    }

    #[test]
    fn whitespace_around_values_is_accepted() {
        let table = parse_thresholds("20, 0, 0_10 ,10,1.5_0,0, 1.7").unwrap();
        assert_eq!(table, FeatureThresholds::default());
    }

    #[test]
    fn wrong_rule_count() {
        let err = parse_thresholds("20,0,0_10,10,1.5").unwrap_err();
        assert!(matches!(err, ConfigError::ThresholdTable { row: 2, .. }));
    }

    #[test]
    fn wrong_value_count_names_the_rule() {
        let err = parse_thresholds("20,0,0_10,10_0,0,1.7").unwrap_err();
        match err {
            ConfigError::ThresholdTable { row, token, .. } => {
                assert_eq!(row, 1);
                assert_eq!(token, "10,10");
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn non_numeric_token() {
        let err = parse_thresholds("20,0,0_10,ten,1.5_0,0,1.7").unwrap_err();
        assert!(matches!(
            err,
            ConfigError::ThresholdTable { row: 1, ref token, .. } if token == "ten"
        ));
    }

    #[test]
    fn infinite_value_rejected() {
        assert!(parse_thresholds("inf,0,0_10,10,1.5_0,0,1.7").is_err());
    }
}
