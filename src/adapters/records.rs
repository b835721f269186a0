use crate::domain::model::Record;
use crate::domain::value::Value;
use crate::utils::error::{CoalesceError, Result};
use std::collections::BTreeSet;
use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Read, Write};
use std::path::Path;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordFormat {
    /// An array of objects, or a single object.
    Json,
    /// One object per line.
    Jsonl,
    /// Header row plus string cells.
    Csv,
}

impl RecordFormat {
    pub fn from_path(path: &Path) -> Option<Self> {
        path.extension()
            .and_then(|ext| ext.to_str())
            .and_then(|ext| ext.parse().ok())
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RecordFormat::Json => "json",
            RecordFormat::Jsonl => "jsonl",
            RecordFormat::Csv => "csv",
        }
    }
}

impl FromStr for RecordFormat {
    type Err = CoalesceError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "json" => Ok(RecordFormat::Json),
            "jsonl" | "ndjson" => Ok(RecordFormat::Jsonl),
            "csv" => Ok(RecordFormat::Csv),
            other => Err(CoalesceError::InvalidConfigValueError {
                field: "format".to_string(),
                value: other.to_string(),
                reason: "Unsupported format. Valid formats: json, jsonl, csv".to_string(),
            }),
        }
    }
}

fn resolve_format(path: &Path, format: Option<RecordFormat>) -> Result<RecordFormat> {
    format
        .or_else(|| RecordFormat::from_path(path))
        .ok_or_else(|| CoalesceError::ConfigError {
            message: format!(
                "Cannot detect the format of '{}'; pass it explicitly",
                path.display()
            ),
        })
}

fn into_record(value: serde_json::Value, line: usize) -> Result<Record> {
    Record::try_from(value).map_err(|other| CoalesceError::InvalidRecordError {
        line,
        message: format!("expected an object, found {}", Value::from(other).type_name()),
    })
}

pub fn read_records(path: &Path, format: Option<RecordFormat>) -> Result<Vec<Record>> {
    let format = resolve_format(path, format)?;
    tracing::info!("📥 Reading {} records from {}", format.as_str(), path.display());
    let file = File::open(path)?;
    read_records_from(BufReader::new(file), format)
}

pub fn read_records_from<R: Read>(reader: R, format: RecordFormat) -> Result<Vec<Record>> {
    match format {
        RecordFormat::Json => {
            let value: serde_json::Value = serde_json::from_reader(reader)?;
            match value {
                serde_json::Value::Array(items) => items
                    .into_iter()
                    .enumerate()
                    .map(|(index, item)| into_record(item, index + 1))
                    .collect(),
                other => Ok(vec![into_record(other, 1)?]),
            }
        }
        RecordFormat::Jsonl => {
            let mut records = Vec::new();
            for (index, line) in BufReader::new(reader).lines().enumerate() {
                let line = line?;
                if line.trim().is_empty() {
                    continue;
                }
                let value: serde_json::Value = serde_json::from_str(&line).map_err(|e| {
                    CoalesceError::InvalidRecordError {
                        line: index + 1,
                        message: e.to_string(),
                    }
                })?;
                records.push(into_record(value, index + 1)?);
            }
            Ok(records)
        }
        RecordFormat::Csv => {
            let mut csv_reader = csv::Reader::from_reader(reader);
            let headers = csv_reader.headers()?.clone();
            let mut records = Vec::new();
            for row in csv_reader.records() {
                let row = row?;
                let mut record = Record::new();
                for (header, cell) in headers.iter().zip(row.iter()) {
                    record.set(header, serde_json::Value::String(cell.to_string()));
                }
                records.push(record);
            }
            Ok(records)
        }
    }
}

fn csv_cell(value: Option<&serde_json::Value>) -> String {
    match value {
        None | Some(serde_json::Value::Null) => String::new(),
        Some(serde_json::Value::String(s)) => s.clone(),
        Some(other) => Value::from(other).to_string(),
    }
}

pub fn write_records<W: Write>(mut writer: W, records: &[Record], format: RecordFormat) -> Result<()> {
    match format {
        RecordFormat::Json => {
            let rows: Vec<_> = records.iter().map(|record| &record.data).collect();
            serde_json::to_writer_pretty(&mut writer, &rows)?;
            writeln!(writer)?;
        }
        RecordFormat::Jsonl => {
            for record in records {
                serde_json::to_writer(&mut writer, &record.data)?;
                writeln!(writer)?;
            }
        }
        RecordFormat::Csv => {
            let headers: BTreeSet<&str> = records
                .iter()
                .flat_map(|record| record.data.keys().map(String::as_str))
                .collect();

            // no columns: a header-only row would read back as one empty field
            if !headers.is_empty() {
                let mut csv_writer = csv::Writer::from_writer(&mut writer);
                csv_writer.write_record(&headers)?;
                for record in records {
                    csv_writer.write_record(
                        headers.iter().map(|header| csv_cell(record.data.get(*header))),
                    )?;
                }
                csv_writer.flush()?;
            }
        }
    }
    writer.flush()?;
    Ok(())
}

pub fn write_records_to_path(
    path: &Path,
    records: &[Record],
    format: Option<RecordFormat>,
) -> Result<()> {
    let format = resolve_format(path, format)?;
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    let file = File::create(path)?;
    write_records(BufWriter::new(file), records, format)?;
    tracing::info!("📁 Wrote {} records to {}", records.len(), path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::io::Cursor;

    #[test]
    fn test_format_detection() {
        assert_eq!(RecordFormat::from_path(Path::new("a/users.json")), Some(RecordFormat::Json));
        assert_eq!(RecordFormat::from_path(Path::new("x.NDJSON")), Some(RecordFormat::Jsonl));
        assert_eq!(RecordFormat::from_path(Path::new("x.csv")), Some(RecordFormat::Csv));
        assert_eq!(RecordFormat::from_path(Path::new("x.txt")), None);
        assert!(resolve_format(Path::new("noext"), None).is_err());
    }

    #[test]
    fn test_read_json_array_and_single_object() {
        let records =
            read_records_from(Cursor::new(r#"[{"a": 1}, {"a": 0}]"#), RecordFormat::Json).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[1].data.get("a"), Some(&json!(0)));

        let records = read_records_from(Cursor::new(r#"{"a": ""}"#), RecordFormat::Json).unwrap();
        assert_eq!(records.len(), 1);
    }

    #[test]
    fn test_read_json_rejects_non_objects() {
        let err = read_records_from(Cursor::new(r#"[{"a": 1}, 5]"#), RecordFormat::Json).unwrap_err();
        assert!(matches!(err, CoalesceError::InvalidRecordError { line: 2, .. }));
    }

    #[test]
    fn test_read_jsonl_skips_blank_lines() {
        let input = "{\"a\": 1}\n\n{\"a\": null}\n";
        let records = read_records_from(Cursor::new(input), RecordFormat::Jsonl).unwrap();
        assert_eq!(records.len(), 2);

        let err = read_records_from(Cursor::new("{\"a\": 1}\nnot json\n"), RecordFormat::Jsonl)
            .unwrap_err();
        assert!(matches!(err, CoalesceError::InvalidRecordError { line: 2, .. }));
    }

    #[test]
    fn test_read_csv_cells_are_strings() {
        let input = "id,nick,name\n1,,Ada\n";
        let records = read_records_from(Cursor::new(input), RecordFormat::Csv).unwrap();
        assert_eq!(records[0].data.get("id"), Some(&json!("1")));
        assert_eq!(records[0].data.get("nick"), Some(&json!("")));
    }

    #[test]
    fn test_write_csv_uses_union_of_keys() {
        let records = vec![
            Record::try_from(json!({"b": 2, "a": "x"})).unwrap(),
            Record::try_from(json!({"c": null, "a": [1, 2]})).unwrap(),
        ];
        let mut out = Vec::new();
        write_records(&mut out, &records, RecordFormat::Csv).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert_eq!(text, "a,b,c\nx,2,\n\"[1,2]\",,\n");
    }

    #[test]
    fn test_write_csv_without_columns_is_empty() {
        let mut out = Vec::new();
        write_records(&mut out, &[], RecordFormat::Csv).unwrap();
        assert!(out.is_empty());

        let mut out = Vec::new();
        write_records(&mut out, &[Record::new(), Record::new()], RecordFormat::Csv).unwrap();
        assert!(out.is_empty());
    }

    #[test]
    fn test_write_jsonl() {
        let records = vec![Record::try_from(json!({"a": 1})).unwrap()];
        let mut out = Vec::new();
        write_records(&mut out, &records, RecordFormat::Jsonl).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "{\"a\":1}\n");
    }
}
