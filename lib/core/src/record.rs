use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use crate::error::{Error, Result};

/// One row of raw cell values keyed by column name
pub type Row = BTreeMap<String, String>;

/// Semantic type inferred for a column
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnType {
    /// Monetary amounts ("$1,200,000")
    Currency,
    /// Percentages and ratios ("23%", "0.23")
    Percentage,
    /// Calendar dates
    Date,
    /// Low-cardinality labels
    Categorical,
    /// Plain numbers
    Numeric,
    /// Anything else
    Text,
}

impl ColumnType {
    #[inline]
    pub fn as_str(&self) -> &'static str {
        match self {
            ColumnType::Currency => "currency",
            ColumnType::Percentage => "percentage",
            ColumnType::Date => "date",
            ColumnType::Categorical => "categorical",
            ColumnType::Numeric => "numeric",
            ColumnType::Text => "text",
        }
    }

    /// Whether values of this type are numbers once parsed
    #[inline]
    pub fn is_numeric(&self) -> bool {
        matches!(self, ColumnType::Currency | ColumnType::Percentage | ColumnType::Numeric)
    }
}

impl fmt::Display for ColumnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Profile of a single column, created once per dataset
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnProfile {
    pub name: String,
    pub inferred_type: ColumnType,
    /// The bounded, non-empty sample the type was inferred from
    pub sample_values: Vec<String>,
}

impl ColumnProfile {
    #[inline]
    #[must_use]
    pub fn new(name: impl Into<String>, inferred_type: ColumnType, sample_values: Vec<String>) -> Self {
        Self {
            name: name.into(),
            inferred_type,
            sample_values,
        }
    }
}

/// A named column of raw cell values
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Column {
    pub name: String,
    pub values: Vec<String>,
}

impl Column {
    #[inline]
    #[must_use]
    pub fn new(name: impl Into<String>, values: Vec<String>) -> Self {
        Self {
            name: name.into(),
            values,
        }
    }
}

/// An uploaded table held column-wise.
///
/// Empty cells are missing values. Columns may have different lengths;
/// the row count is the length of the longest one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dataset {
    columns: Vec<Column>,
}

impl Dataset {
    pub fn new(columns: Vec<Column>) -> Result<Self> {
        if columns.is_empty() {
            return Err(Error::invalid_argument("dataset has no columns"));
        }
        Ok(Self { columns })
    }

    /// Build a dataset from a header line and row-major records.
    /// Short records are padded with missing values, extra cells are dropped.
    pub fn from_rows(headers: Vec<String>, rows: Vec<Vec<String>>) -> Result<Self> {
        let mut columns: Vec<Column> = headers
            .into_iter()
            .map(|name| Column::new(name, Vec::with_capacity(rows.len())))
            .collect();

        for row in rows {
            for (i, column) in columns.iter_mut().enumerate() {
                column.values.push(row.get(i).cloned().unwrap_or_default());
            }
        }

        Self::new(columns)
    }

    #[inline]
    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }

    pub fn row_count(&self) -> usize {
        self.columns.iter().map(|c| c.values.len()).max().unwrap_or(0)
    }

    /// Values of row `index` keyed by column name, skipping missing cells
    pub fn row(&self, index: usize) -> Option<Row> {
        if index >= self.row_count() {
            return None;
        }

        let row = self
            .columns
            .iter()
            .filter_map(|c| {
                c.values
                    .get(index)
                    .filter(|v| !v.trim().is_empty())
                    .map(|v| (c.name.clone(), v.clone()))
            })
            .collect();
        Some(row)
    }

    pub fn rows(&self) -> impl Iterator<Item = Row> + '_ {
        (0..self.row_count()).filter_map(move |i| self.row(i))
    }
}

/// A row prepared for indexing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RowRecord {
    /// Stable row identity, unique within its dataset
    pub index: u64,
    pub raw_values: Row,
    pub serialized_text: String,
    pub business_categories: BTreeSet<String>,
    pub column_types: BTreeMap<String, ColumnType>,
}

impl RowRecord {
    /// The self-contained payload handed to the vector index
    pub fn payload(&self) -> IndexPayload {
        IndexPayload {
            row_index: self.index,
            row_text: self.serialized_text.clone(),
            business_categories: self.business_categories.clone(),
            column_types: self.column_types.clone(),
        }
    }
}

/// What the external index stores next to a row embedding, and what it
/// hands back with every hit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexPayload {
    pub row_index: u64,
    pub row_text: String,
    #[serde(default)]
    pub business_categories: BTreeSet<String>,
    #[serde(default)]
    pub column_types: BTreeMap<String, ColumnType>,
}

impl IndexPayload {
    #[inline]
    pub fn has_category(&self, category: &str) -> bool {
        self.business_categories.contains(category)
    }

    #[inline]
    pub fn has_column_type(&self, column_type: ColumnType) -> bool {
        self.column_types.values().any(|t| *t == column_type)
    }

    /// Metadata object to attach next to the embedding (everything but the text)
    pub fn metadata(&self) -> serde_json::Value {
        serde_json::json!({
            "row_index": self.row_index,
            "business_categories": self.business_categories,
            "column_types": self.column_types,
        })
    }
}

/// A raw nearest-neighbour hit: payload plus distance (lower is closer)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawHit {
    #[serde(flatten)]
    pub payload: IndexPayload,
    pub raw_score: f32,
}

impl RawHit {
    #[inline]
    #[must_use]
    pub fn new(payload: IndexPayload, raw_score: f32) -> Self {
        Self { payload, raw_score }
    }

    #[inline]
    pub fn row_index(&self) -> u64 {
        self.payload.row_index
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    #[test]
    fn test_dataset_requires_columns() {
        assert!(matches!(Dataset::new(vec![]), Err(Error::InvalidArgument(_))));
        assert!(matches!(
            Dataset::from_rows(vec![], vec![strings(&["a"])]),
            Err(Error::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_from_rows_pads_short_records() {
        let dataset = Dataset::from_rows(
            strings(&["Item", "Amount"]),
            vec![strings(&["Rent", "1200"]), strings(&["Travel"])],
        )
        .unwrap();

        assert_eq!(dataset.row_count(), 2);
        assert_eq!(dataset.column_names(), vec!["Item", "Amount"]);

        let second = dataset.row(1).unwrap();
        assert_eq!(second.get("Item").map(String::as_str), Some("Travel"));
        assert!(!second.contains_key("Amount"));
        assert!(dataset.row(2).is_none());
    }

    #[test]
    fn test_rows_iterates_in_order() {
        let dataset = Dataset::new(vec![
            Column::new("A", strings(&["1", "2", "3"])),
            Column::new("B", strings(&["x"])),
        ])
        .unwrap();

        let rows: Vec<Row> = dataset.rows().collect();
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[2].get("A").map(String::as_str), Some("3"));
        assert_eq!(rows[0].len(), 2);
        assert_eq!(rows[1].len(), 1);
    }

    #[test]
    fn test_column_type_serde_is_lowercase() {
        let json = serde_json::to_string(&ColumnType::Percentage).unwrap();
        assert_eq!(json, "\"percentage\"");
        assert_eq!(ColumnType::Currency.to_string(), "currency");
        assert!(ColumnType::Currency.is_numeric());
        assert!(!ColumnType::Date.is_numeric());
    }

    #[test]
    fn test_raw_hit_flattens_payload() {
        let json = r#"{
            "row_index": 7,
            "row_text": "Item: Rent; Amount: $1,200",
            "business_categories": ["cost"],
            "column_types": {"Amount": "currency", "Item": "text"},
            "raw_score": 0.42
        }"#;

        let hit: RawHit = serde_json::from_str(json).unwrap();
        assert_eq!(hit.row_index(), 7);
        assert!(hit.payload.has_category("cost"));
        assert!(hit.payload.has_column_type(ColumnType::Currency));
        assert!((hit.raw_score - 0.42).abs() < f32::EPSILON);
    }

    #[test]
    fn test_payload_metadata_omits_text() {
        let record = RowRecord {
            index: 3,
            raw_values: Row::new(),
            serialized_text: "Region: EMEA".to_string(),
            business_categories: BTreeSet::from(["revenue".to_string()]),
            column_types: BTreeMap::from([("Region".to_string(), ColumnType::Categorical)]),
        };

        let metadata = record.payload().metadata();
        assert_eq!(metadata["row_index"], 3);
        assert_eq!(metadata["business_categories"][0], "revenue");
        assert_eq!(metadata["column_types"]["Region"], "categorical");
        assert!(metadata.get("row_text").is_none());
    }
}
