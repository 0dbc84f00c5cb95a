//! CSV loading
//!
//! Reads an uploaded sheet exported as CSV into a [`Dataset`]. The first
//! record is the header line; ragged records are tolerated.

use sheetsense_core::{Dataset, Error, Result};
use std::fs::File;
use std::io::Read;
use std::path::Path;
use tracing::debug;

pub fn load_csv(path: impl AsRef<Path>) -> Result<Dataset> {
    let path = path.as_ref();
    let dataset = read_csv(File::open(path)?)?;
    debug!(
        path = %path.display(),
        columns = dataset.columns().len(),
        rows = dataset.row_count(),
        "loaded csv"
    );
    Ok(dataset)
}

pub fn read_csv<R: Read>(reader: R) -> Result<Dataset> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::Headers)
        .from_reader(reader);

    let headers: Vec<String> = reader
        .headers()
        .map_err(csv_error)?
        .iter()
        .map(str::to_string)
        .collect();

    let rows = reader
        .records()
        .map(|record| {
            record
                .map(|r| r.iter().map(str::to_string).collect())
                .map_err(csv_error)
        })
        .collect::<Result<Vec<Vec<String>>>>()?;

    Dataset::from_rows(headers, rows)
}

fn csv_error(e: csv::Error) -> Error {
    Error::Csv(e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_csv() {
        let data = "Metric, Value\nTotal Revenue,\"$1,200,000\"\nCOGS,\"$700,000\"\n";
        let dataset = read_csv(data.as_bytes()).unwrap();

        assert_eq!(dataset.column_names(), vec!["Metric", "Value"]);
        assert_eq!(dataset.row_count(), 2);
        let row = dataset.row(0).unwrap();
        assert_eq!(row.get("Value").map(String::as_str), Some("$1,200,000"));
    }

    #[test]
    fn test_ragged_records() {
        let data = "A,B,C\n1\n1,2,3,4\n";
        let dataset = read_csv(data.as_bytes()).unwrap();

        assert_eq!(dataset.row_count(), 2);
        assert_eq!(dataset.row(0).unwrap().len(), 1);
        assert_eq!(dataset.row(1).unwrap().len(), 3);
    }

    #[test]
    fn test_empty_input_has_no_columns() {
        let result = read_csv("".as_bytes());
        assert!(matches!(result, Err(Error::InvalidArgument(_))));
    }

    #[test]
    fn test_missing_file() {
        assert!(matches!(load_csv("/nonexistent/sheet.csv"), Err(Error::Io(_))));
    }
}
