use super::FormatParser;
use crate::data::record::{coerce_price, coerce_year, Record, RecordBatch, SourceFormat, FIELD_NAMES};
use crate::error::{EtlError, Result};
use serde::Deserialize;
use serde_json::{Map, Value};
use std::fs;
use std::path::Path;

/// The two table layouts accepted in a JSON source file.
///
/// `Rows` is a list of row objects. `Columns` maps each column name to
/// either an array of cells or an object of cells keyed by row label (the
/// layout `DataFrame.to_json()` produces).
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum JsonTable {
    Rows(Vec<Map<String, Value>>),
    Columns(Map<String, Value>),
}

/// Reads JSON files holding either a list of row objects or an object of
/// columns.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonParser;

impl FormatParser for JsonParser {
    fn format(&self) -> SourceFormat {
        SourceFormat::Json
    }

    fn parse(&self, path: &Path) -> Result<RecordBatch> {
        let content = fs::read_to_string(path).map_err(|e| EtlError::source_read(path, e))?;

        let table: JsonTable = serde_json::from_str(&content).map_err(|e| {
            EtlError::source_read(path, format!("not a JSON table: {}", e))
        })?;

        let rows = match table {
            JsonTable::Rows(rows) => rows,
            JsonTable::Columns(columns) => rows_from_columns(path, &columns)?,
        };

        rows.iter()
            .enumerate()
            .map(|(index, row)| record_from_row(path, index, row))
            .collect()
    }
}

/// Pivots a column layout into row objects holding the four schema fields.
fn rows_from_columns(path: &Path, columns: &Map<String, Value>) -> Result<Vec<Map<String, Value>>> {
    let mut cells: Vec<(&str, Vec<(String, Value)>)> = Vec::with_capacity(FIELD_NAMES.len());

    for field in FIELD_NAMES {
        let column = columns
            .get(field)
            .ok_or_else(|| EtlError::schema(path, format!("missing column {:?}", field)))?;
        cells.push((field, labelled_cells(path, field, column)?));
    }

    let index: Vec<&String> = cells[0].1.iter().map(|(label, _)| label).collect();
    for (field, column) in &cells[1..] {
        let aligned = column.len() == index.len()
            && column.iter().zip(&index).all(|((label, _), expected)| label == *expected);
        if !aligned {
            return Err(EtlError::source_read(
                path,
                format!("column {:?} does not line up with column {:?}", field, FIELD_NAMES[0]),
            ));
        }
    }

    let mut rows = vec![Map::new(); index.len()];
    for (field, column) in cells {
        for (row, (_, value)) in rows.iter_mut().zip(column) {
            row.insert(field.to_string(), value);
        }
    }

    Ok(rows)
}

/// Returns a column's cells paired with their row labels, in row order.
fn labelled_cells(path: &Path, field: &str, column: &Value) -> Result<Vec<(String, Value)>> {
    match column {
        Value::Array(values) => Ok(values
            .iter()
            .enumerate()
            .map(|(position, value)| (position.to_string(), value.clone()))
            .collect()),
        Value::Object(by_label) => {
            let mut cells: Vec<(String, Value)> = by_label
                .iter()
                .map(|(label, value)| (label.clone(), value.clone()))
                .collect();
            // numeric labels sort by value so "10" follows "9"
            cells.sort_by(|(a, _), (b, _)| match (a.parse::<u64>(), b.parse::<u64>()) {
                (Ok(a), Ok(b)) => a.cmp(&b),
                _ => a.cmp(b),
            });
            Ok(cells)
        }
        _ => Err(EtlError::source_read(
            path,
            format!("column {:?} is neither an array nor an object", field),
        )),
    }
}

fn record_from_row(path: &Path, index: usize, row: &Map<String, Value>) -> Result<Record> {
    let field = |name: &str| {
        row.get(name)
            .filter(|value| !value.is_null())
            .ok_or_else(|| EtlError::schema(path, format!("row {} is missing {:?}", index, name)))
    };
    let invalid = |reason: String| EtlError::schema(path, format!("row {}: {}", index, reason));

    let year_of_manufacture = match field("year_of_manufacture")? {
        Value::String(text) => coerce_year(text).map_err(invalid)?,
        value => coerce_year(&value.to_string()).map_err(invalid)?,
    };

    let price = match field("price")? {
        Value::String(text) => coerce_price(text).map_err(invalid)?,
        Value::Number(number) => number
            .as_f64()
            .ok_or_else(|| invalid(format!("price {} is out of range", number)))?,
        value => return Err(invalid(format!("price {} is not a number", value))),
    };

    Ok(Record {
        car_model: text_value(field("car_model")?),
        year_of_manufacture,
        price,
        fuel: text_value(field("fuel")?),
    })
}

fn text_value(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use tempfile::TempDir;

    fn parse_str(content: &str) -> Result<RecordBatch> {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("cars.json");
        fs::write(&path, content).unwrap();
        JsonParser.parse(&path)
    }

    #[test]
    fn test_parse_row_objects() {
        let batch = parse_str(
            r#"[
                {"car_model": "Tesla Model 3", "year_of_manufacture": 2021, "price": 44999.5, "fuel": "Electric"},
                {"car_model": "alto 800", "year_of_manufacture": "2017", "price": "2985.07", "fuel": "CNG", "owner": 1}
            ]"#,
        )
        .unwrap();

        assert_eq!(batch.len(), 2);
        assert_eq!(batch[0].car_model, "Tesla Model 3");
        assert_eq!(batch[0].year_of_manufacture, 2021);
        assert_eq!(batch[0].price, 44999.5);
        assert_eq!(batch[1].year_of_manufacture, 2017);
        assert_eq!(batch[1].price, 2985.07);
        assert_eq!(batch[1].fuel, "CNG");
    }

    #[test]
    fn test_parse_column_arrays() {
        let batch = parse_str(
            r#"{
                "car_model": ["ritz", "ciaz"],
                "year_of_manufacture": [2014, 2017.0],
                "price": [5000, 10223.88],
                "fuel": ["Petrol", "Diesel"]
            }"#,
        )
        .unwrap();

        assert_eq!(batch.len(), 2);
        assert_eq!(batch[1].car_model, "ciaz");
        assert_eq!(batch[1].year_of_manufacture, 2017);
        assert_eq!(batch[0].price, 5000.0);
    }

    #[test]
    fn test_parse_labelled_columns_in_numeric_order() {
        let mut models = Map::new();
        let mut years = Map::new();
        let mut prices = Map::new();
        let mut fuels = Map::new();
        for i in 0..11 {
            models.insert(i.to_string(), Value::from(format!("car{}", i)));
            years.insert(i.to_string(), Value::from(2000 + i));
            prices.insert(i.to_string(), Value::from(1000.0 + i as f64));
            fuels.insert(i.to_string(), Value::from("Petrol"));
        }
        let table = serde_json::json!({
            "car_model": models,
            "year_of_manufacture": years,
            "price": prices,
            "fuel": fuels,
        });

        let batch = parse_str(&table.to_string()).unwrap();
        let order: Vec<&str> = batch.iter().map(|r| r.car_model.as_str()).collect();
        assert_eq!(order[9], "car9");
        assert_eq!(order[10], "car10");
        assert_eq!(batch[10].year_of_manufacture, 2010);
    }

    #[test]
    fn test_empty_list_is_empty_batch() {
        assert!(parse_str("[]").unwrap().is_empty());
    }

    #[test]
    fn test_missing_key_is_schema_error() {
        let err = parse_str(r#"[{"car_model": "ritz", "year_of_manufacture": 2014, "fuel": "Petrol"}]"#)
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Schema);
        assert!(err.to_string().contains("price"));
    }

    #[test]
    fn test_uneven_columns_is_source_error() {
        let err = parse_str(
            r#"{"car_model": ["a", "b"], "year_of_manufacture": [2014], "price": [1, 2], "fuel": ["x", "y"]}"#,
        )
        .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::SourceRead);
    }

    #[test]
    fn test_invalid_json_is_source_error() {
        assert_eq!(parse_str("{not json").unwrap_err().kind(), ErrorKind::SourceRead);
        assert_eq!(parse_str("42").unwrap_err().kind(), ErrorKind::SourceRead);
    }
}
