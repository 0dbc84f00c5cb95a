//! Row Serializer
//!
//! Converts one row plus its dataset's column profiles into the canonical
//! sentence that gets embedded, and attaches the business categories and
//! column types stored next to the embedding.

use sheetsense_core::{BusinessVocabulary, ColumnProfile, ColumnType, Error, Result, Row, RowRecord};
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use crate::value::{
    currency_symbol, format_currency, format_date, format_number, format_percentage,
    has_percent_suffix, parse_date, parse_numeric,
};

/// Separator between `column: value` fragments
pub const FIELD_DELIMITER: &str = "; ";

/// Currency symbol used when neither the value nor the header carries one
pub const DEFAULT_CURRENCY_SYMBOL: char = '$';

/// Serializes rows for indexing
#[derive(Debug, Clone)]
pub struct RowSerializer {
    vocabulary: Arc<BusinessVocabulary>,
}

impl RowSerializer {
    /// Create a serializer tagging with the given vocabulary
    pub fn new(vocabulary: Arc<BusinessVocabulary>) -> Self {
        Self { vocabulary }
    }

    pub fn vocabulary(&self) -> &BusinessVocabulary {
        &self.vocabulary
    }

    /// Build the full record for row `index`.
    ///
    /// Fails only when `profiles` is empty, i.e. the dataset had no columns.
    pub fn serialize(&self, index: u64, row: &Row, profiles: &[ColumnProfile]) -> Result<RowRecord> {
        if profiles.is_empty() {
            return Err(Error::invalid_argument("no column profiles supplied"));
        }

        let serialized_text = self.render_text(row, profiles);
        let business_categories = self.categorize(row, profiles, &serialized_text);
        let column_types: BTreeMap<String, ColumnType> = profiles
            .iter()
            .map(|p| (p.name.clone(), p.inferred_type))
            .collect();

        Ok(RowRecord {
            index,
            raw_values: row.clone(),
            serialized_text,
            business_categories,
            column_types,
        })
    }

    /// `"{column}: {value}"` fragments in profile order, missing values skipped
    pub fn render_text(&self, row: &Row, profiles: &[ColumnProfile]) -> String {
        profiles
            .iter()
            .filter_map(|profile| {
                let raw = row.get(&profile.name)?.trim();
                if raw.is_empty() {
                    return None;
                }
                Some(format!("{}: {}", profile.name, format_value(raw, profile)))
            })
            .collect::<Vec<_>>()
            .join(FIELD_DELIMITER)
    }

    fn categorize(&self, row: &Row, profiles: &[ColumnProfile], text: &str) -> BTreeSet<String> {
        let headers = profiles
            .iter()
            .map(|p| p.name.as_str())
            .collect::<Vec<_>>()
            .join(" ");

        let mut categories = self.vocabulary.tag(&format!("{} {}", headers, text));
        for raw in row.values() {
            categories.extend(self.vocabulary.tag_formula(raw));
        }
        categories
    }
}

/// Render a raw cell according to its column's inferred type.
/// Values that do not parse under that type are kept as trimmed raw text.
pub fn format_value(raw: &str, profile: &ColumnProfile) -> String {
    let raw = raw.trim();
    let formatted = match profile.inferred_type {
        ColumnType::Currency => parse_numeric(raw).map(|v| {
            let symbol = currency_symbol(raw)
                .or_else(|| currency_symbol(&profile.name))
                .unwrap_or(DEFAULT_CURRENCY_SYMBOL);
            format_currency(v, symbol)
        }),
        ColumnType::Percentage => parse_numeric(raw).map(|v| {
            let fractional = !has_percent_suffix(raw) && is_fractional_column(profile);
            format_percentage(v, fractional)
        }),
        ColumnType::Date => parse_date(raw).map(format_date),
        ColumnType::Numeric => parse_numeric(raw).map(format_number),
        ColumnType::Categorical | ColumnType::Text => None,
    };

    formatted.unwrap_or_else(|| raw.to_string())
}

// A percentage column holds shares of one when it was sampled, none of its
// sampled values carries a `%` and every numeric one lies in [-1, 1]
fn is_fractional_column(profile: &ColumnProfile) -> bool {
    !profile.sample_values.is_empty()
        && profile.sample_values.iter().all(|v| {
            !has_percent_suffix(v)
                && parse_numeric(v)
                    .map(|n| (-1.0..=1.0).contains(&n))
                    .unwrap_or(true)
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn profile(name: &str, ty: ColumnType, samples: &[&str]) -> ColumnProfile {
        ColumnProfile::new(name, ty, samples.iter().map(|s| s.to_string()).collect())
    }

    fn row(values: &[(&str, &str)]) -> Row {
        values.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
    }

    fn serializer() -> RowSerializer {
        RowSerializer::new(BusinessVocabulary::shared())
    }

    fn finance_profiles() -> Vec<ColumnProfile> {
        vec![
            profile("Metric", ColumnType::Text, &["Total Revenue", "COGS"]),
            profile("Value", ColumnType::Currency, &["$1,200,000", "$700,000"]),
            profile("Margin %", ColumnType::Percentage, &["23%", "31%"]),
            profile("Period End", ColumnType::Date, &["2024-03-31"]),
        ]
    }

    #[test]
    fn test_render_text_in_profile_order() {
        let text = serializer().render_text(
            &row(&[
                ("Period End", "03/31/2024"),
                ("Margin %", "23%"),
                ("Value", "$1,200,000"),
                ("Metric", "Total Revenue"),
            ]),
            &finance_profiles(),
        );

        assert_eq!(
            text,
            "Metric: Total Revenue; Value: $1,200,000; Margin %: 23%; Period End: 2024-03-31"
        );
    }

    #[test]
    fn test_missing_values_are_skipped() {
        let text = serializer().render_text(
            &row(&[("Metric", "COGS"), ("Value", "  ")]),
            &finance_profiles(),
        );
        assert_eq!(text, "Metric: COGS");
    }

    #[test]
    fn test_serialize_record() {
        let record = serializer()
            .serialize(
                4,
                &row(&[("Metric", "Total Revenue"), ("Value", "$1,200,000")]),
                &finance_profiles(),
            )
            .unwrap();

        assert_eq!(record.index, 4);
        assert!(record.business_categories.contains("revenue"));
        // "Margin %" header contributes even though the cell is empty
        assert!(record.business_categories.contains("margin"));
        assert!(record.business_categories.contains("ratio"));
        assert_eq!(record.column_types.get("Value"), Some(&ColumnType::Currency));
        assert_eq!(record.column_types.len(), 4);
        assert_eq!(record.raw_values.len(), 2);
    }

    #[test]
    fn test_formula_cells_add_formula_categories() {
        let profiles = vec![
            profile("Label", ColumnType::Text, &[]),
            profile("Formula", ColumnType::Text, &[]),
        ];
        let record = serializer()
            .serialize(0, &row(&[("Label", "Subtotal"), ("Formula", "=SUM(B2:B9)")]), &profiles)
            .unwrap();

        assert!(record.business_categories.contains("formula_aggregation"));
    }

    #[test]
    fn test_serialize_without_profiles_is_invalid() {
        let result = serializer().serialize(0, &row(&[("A", "1")]), &[]);
        assert!(matches!(result, Err(Error::InvalidArgument(_))));
    }

    #[test]
    fn test_serialize_is_deterministic() {
        let input = row(&[("Metric", "Net Profit"), ("Value", "(12,500)"), ("Margin %", "-4%")]);
        let first = serializer().serialize(9, &input, &finance_profiles()).unwrap();
        for _ in 0..5 {
            assert_eq!(serializer().serialize(9, &input, &finance_profiles()).unwrap(), first);
        }
        assert!(first.serialized_text.contains("Value: -$12,500"));
    }

    #[test]
    fn test_format_value_by_type() {
        let currency = profile("Amount (€)", ColumnType::Currency, &[]);
        assert_eq!(format_value("1250.5", &currency), "€1,250.50");

        let fraction = profile("Share", ColumnType::Percentage, &["0.25", "0.5"]);
        assert_eq!(format_value("0.25", &fraction), "25%");

        let whole = profile("Growth Percent", ColumnType::Percentage, &["12", "0.5"]);
        assert_eq!(format_value("0.5", &whole), "0.5%");

        let numeric = profile("Units", ColumnType::Numeric, &[]);
        assert_eq!(format_value("1,500.00", &numeric), "1500");

        let date = profile("Due", ColumnType::Date, &[]);
        assert_eq!(format_value("Jan 5, 2024", &date), "2024-01-05");

        let region = profile("Region", ColumnType::Categorical, &[]);
        assert_eq!(format_value("  North ", &region), "North");
    }

    #[test]
    fn test_unsampled_percentage_is_not_scaled() {
        let unsampled = profile("Share", ColumnType::Percentage, &[]);
        assert_eq!(format_value("0.5", &unsampled), "0.5%");
        assert_eq!(format_value("12%", &unsampled), "12%");
    }

    #[test]
    fn test_format_value_falls_back_to_raw() {
        let currency = profile("Price", ColumnType::Currency, &[]);
        assert_eq!(format_value("n/a", &currency), "n/a");

        let date = profile("Due", ColumnType::Date, &[]);
        assert_eq!(format_value("someday", &date), "someday");
    }
}
