//! Column profiling
//!
//! Infers one semantic [`ColumnType`] per column from its header tokens and a
//! bounded sample of its values. Checks run in a fixed priority order
//! (currency, percentage, date, numeric, categorical) and the first match
//! wins; a column nothing matches is `text`.

use ahash::AHashSet;
use serde::{Deserialize, Serialize};
use sheetsense_core::{tokenize, Column, ColumnProfile, ColumnType, Dataset, Error, Result};
use tracing::debug;

use crate::value::{currency_symbol, has_percent_suffix, parse_date, parse_numeric};

const CURRENCY_KEYWORDS: &[&str] = &[
    "amount", "amounts", "price", "prices", "revenue", "revenues", "cost", "costs", "sales",
    "expense", "expenses", "income", "value", "budget", "salary", "fee", "fees", "payment",
    "payments", "usd", "eur", "gbp",
];

const PERCENT_KEYWORDS: &[&str] = &["%", "percent", "percentage", "pct", "ratio", "margin"];

/// Profiler settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProfilerConfig {
    /// Datasets up to this many rows are scanned in full, larger ones by
    /// their leading `sample_limit` rows
    pub sample_limit: usize,
    /// Share of sampled values that must agree for a typed classification
    pub numeric_fraction: f64,
    /// Distinct-to-sampled ratio below which a text column is categorical
    pub categorical_ratio: f64,
}

impl Default for ProfilerConfig {
    fn default() -> Self {
        Self {
            sample_limit: 100,
            numeric_fraction: 0.8,
            categorical_ratio: 0.5,
        }
    }
}

impl ProfilerConfig {
    pub fn validate(&self) -> Result<()> {
        if self.sample_limit == 0 {
            return Err(Error::InvalidConfig("sample_limit must be positive".to_string()));
        }
        if !(self.numeric_fraction > 0.0 && self.numeric_fraction <= 1.0) {
            return Err(Error::InvalidConfig(format!(
                "numeric_fraction must be in (0, 1], got {}",
                self.numeric_fraction
            )));
        }
        if !(self.categorical_ratio > 0.0 && self.categorical_ratio <= 1.0) {
            return Err(Error::InvalidConfig(format!(
                "categorical_ratio must be in (0, 1], got {}",
                self.categorical_ratio
            )));
        }
        Ok(())
    }
}

/// Infers column types for uploaded datasets
#[derive(Debug, Clone, Default)]
pub struct ColumnProfiler {
    config: ProfilerConfig,
}

impl ColumnProfiler {
    pub fn new(config: ProfilerConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ProfilerConfig {
        &self.config
    }

    /// One profile per column, in column order
    pub fn profile(&self, dataset: &Dataset) -> Vec<ColumnProfile> {
        dataset
            .columns()
            .iter()
            .map(|column| self.profile_column(column))
            .collect()
    }

    pub fn profile_column(&self, column: &Column) -> ColumnProfile {
        let sample: Vec<String> = column
            .values
            .iter()
            .take(self.config.sample_limit)
            .filter(|v| !v.trim().is_empty())
            .cloned()
            .collect();

        let inferred = {
            let refs: Vec<&str> = sample.iter().map(String::as_str).collect();
            self.infer_type(&column.name, &refs)
        };

        debug!(
            column = %column.name,
            inferred = %inferred,
            sampled = sample.len(),
            "profiled column"
        );

        ColumnProfile::new(column.name.clone(), inferred, sample)
    }

    /// Type of a column given its header and non-empty sampled values
    pub fn infer_type(&self, header: &str, values: &[&str]) -> ColumnType {
        if values.is_empty() {
            return ColumnType::Text;
        }

        let header_tokens = tokenize(header);
        let percent_header = header_tokens
            .iter()
            .any(|t| PERCENT_KEYWORDS.contains(&t.as_str()));

        let numeric: Vec<Option<f64>> = values.iter().map(|v| parse_numeric(v)).collect();
        let numeric_count = numeric.iter().filter(|n| n.is_some()).count();

        if !percent_header && self.is_currency(header, &header_tokens, values, &numeric) {
            return ColumnType::Currency;
        }

        if self.meets(numeric_count, values.len()) {
            let percent_like = values
                .iter()
                .zip(&numeric)
                .filter(|(raw, n)| {
                    has_percent_suffix(raw) || n.map(|v| (-1.0..=1.0).contains(&v)).unwrap_or(false)
                })
                .count();

            if percent_header || self.meets(percent_like, values.len()) {
                return ColumnType::Percentage;
            }
        }

        let dates = values.iter().filter(|v| parse_date(v).is_some()).count();
        if self.meets(dates, values.len()) {
            return ColumnType::Date;
        }

        if self.meets(numeric_count, values.len()) {
            return ColumnType::Numeric;
        }

        let distinct: AHashSet<String> = values.iter().map(|v| v.trim().to_lowercase()).collect();
        if (distinct.len() as f64) < self.config.categorical_ratio * values.len() as f64 {
            return ColumnType::Categorical;
        }

        ColumnType::Text
    }

    fn is_currency(
        &self,
        header: &str,
        header_tokens: &[String],
        values: &[&str],
        numeric: &[Option<f64>],
    ) -> bool {
        let keyword_header = currency_symbol(header).is_some()
            || header_tokens.iter().any(|t| CURRENCY_KEYWORDS.contains(&t.as_str()));
        let symbol_values = values.iter().any(|v| currency_symbol(v).is_some());
        if !keyword_header && !symbol_values {
            return false;
        }

        // "23%" is a number, but not an amount of money
        let amounts = values
            .iter()
            .zip(numeric)
            .filter(|(raw, n)| n.is_some() && !has_percent_suffix(raw))
            .count();
        self.meets(amounts, values.len())
    }

    #[inline]
    fn meets(&self, count: usize, total: usize) -> bool {
        total > 0 && count as f64 >= self.config.numeric_fraction * total as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn infer(header: &str, values: &[&str]) -> ColumnType {
        ColumnProfiler::default().infer_type(header, values)
    }

    fn column(name: &str, values: &[&str]) -> Column {
        Column::new(name, values.iter().map(|v| v.to_string()).collect())
    }

    #[test]
    fn test_currency_from_symbol() {
        assert_eq!(infer("Total", &["$1,200,000", "$950,000", "$80"]), ColumnType::Currency);
    }

    #[test]
    fn test_currency_from_header_keyword() {
        assert_eq!(infer("Unit Price", &["12.50", "8", "19.99"]), ColumnType::Currency);
        assert_eq!(infer("Revenue (USD)", &["1200", "3400"]), ColumnType::Currency);
    }

    #[test]
    fn test_currency_keyword_needs_numbers() {
        assert_eq!(
            infer(
                "Cost Center",
                &["Marketing", "Sales", "Marketing", "Sales", "Sales", "Marketing", "R&D"]
            ),
            ColumnType::Categorical
        );
    }

    #[test]
    fn test_percentage_from_header() {
        assert_eq!(infer("Margin %", &["23%", "31%", "18%"]), ColumnType::Percentage);
        assert_eq!(infer("Growth Percent", &["12", "15", "-3"]), ColumnType::Percentage);
    }

    #[test]
    fn test_percentage_from_values() {
        assert_eq!(infer("Q1", &["12%", "15%", "9%"]), ColumnType::Percentage);
        assert_eq!(infer("Share", &["0.25", "0.5", "0.125"]), ColumnType::Percentage);
    }

    #[test]
    fn test_percent_header_beats_currency_keyword() {
        assert_eq!(infer("Budget %", &["0.4", "0.6"]), ColumnType::Percentage);
        assert_eq!(infer("Budget", &["40%", "60%"]), ColumnType::Percentage);
    }

    #[test]
    fn test_date() {
        assert_eq!(
            infer("Posted", &["2024-01-05", "2024-02-11", "2024-03-30"]),
            ColumnType::Date
        );
        assert_eq!(infer("When", &["01/05/2024", "Feb 11, 2024"]), ColumnType::Date);
    }

    #[test]
    fn test_numeric() {
        assert_eq!(infer("Units", &["12", "1,500", "7", "300"]), ColumnType::Numeric);
    }

    #[test]
    fn test_categorical_and_text() {
        assert_eq!(
            infer(
                "Region",
                &["North", "South", "North", "North", "South", "East", "North", "South"]
            ),
            ColumnType::Categorical
        );
        assert_eq!(
            infer("Notes", &["late delivery", "ok", "called twice"]),
            ColumnType::Text
        );
    }

    #[test]
    fn test_fraction_threshold_tolerates_noise() {
        // 4 of 5 numeric meets the default 0.8
        assert_eq!(infer("Units", &["1", "2", "3", "4", "n/a"]), ColumnType::Numeric);
        // 3 of 5 does not, and 5 distinct values are not categorical
        assert_eq!(infer("Units", &["1", "2", "3", "x", "n/a"]), ColumnType::Text);
    }

    #[test]
    fn test_empty_column_is_text() {
        let profile = ColumnProfiler::default().profile_column(&column("Blank", &["", "  ", ""]));
        assert_eq!(profile.inferred_type, ColumnType::Text);
        assert!(profile.sample_values.is_empty());
    }

    #[test]
    fn test_sample_limit_bounds_scan() {
        let profiler = ColumnProfiler::new(ProfilerConfig {
            sample_limit: 3,
            ..ProfilerConfig::default()
        });
        // Only the leading three values are inspected
        let profile = profiler.profile_column(&column(
            "Units",
            &["10", "20", "30", "abc", "def", "ghi", "jkl"],
        ));

        assert_eq!(profile.inferred_type, ColumnType::Numeric);
        assert_eq!(profile.sample_values, vec!["10", "20", "30"]);
    }

    #[test]
    fn test_profile_dataset_in_column_order() {
        let dataset = Dataset::new(vec![
            column("Metric", &["Total Revenue", "COGS", "Gross Margin"]),
            column("Value", &["$1,200,000", "$700,000", "$500,000"]),
            column("Margin %", &["23%", "31%", "42%"]),
        ])
        .unwrap();

        let profiles = ColumnProfiler::default().profile(&dataset);
        let types: Vec<ColumnType> = profiles.iter().map(|p| p.inferred_type).collect();
        assert_eq!(
            types,
            vec![ColumnType::Text, ColumnType::Currency, ColumnType::Percentage]
        );
    }

    #[test]
    fn test_config_validation() {
        assert!(ProfilerConfig::default().validate().is_ok());

        let bad = ProfilerConfig {
            numeric_fraction: 1.5,
            ..ProfilerConfig::default()
        };
        assert!(matches!(bad.validate(), Err(Error::InvalidConfig(_))));

        let zero = ProfilerConfig {
            sample_limit: 0,
            ..ProfilerConfig::default()
        };
        assert!(zero.validate().is_err());
    }

    #[test]
    fn test_partial_config_deserializes_with_defaults() {
        let config: ProfilerConfig = serde_json::from_str(r#"{"sample_limit": 25}"#).unwrap();
        assert_eq!(config.sample_limit, 25);
        assert_eq!(config.numeric_fraction, 0.8);
    }
}
