/// Tag sheet loading: one record per surveyed tag column.
///
/// TOML sheets hold `[[tag]]` tables, JSON sheets a top-level `tags` array.
/// Each entry carries a `kind`, an optional `column` label and field values.
/// Entries are converted one by one so a bad cell only fails its own tag.
use std::path::Path;

use anyhow::{Context, Result};
use railtag::TagRecord;
use serde_json::Value;

/// Location cells surveyors leave as `UNKNOWN` encode as 0.
const UNKNOWN_LOCATION: &str = "UNKNOWN";
const LOCATION_KEYS: [&str; 3] = ["abs_location", "nominal_location", "reverse_location"];

#[derive(Debug)]
pub struct SheetRow {
    pub column: String,
    pub record: Result<TagRecord, String>,
}

pub fn load_sheet(path: &Path) -> Result<Vec<SheetRow>> {
    let text =
        std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    match path.extension().and_then(|e| e.to_str()) {
        Some("toml") => parse_toml(&text).with_context(|| format!("parsing {}", path.display())),
        Some("json") => parse_json(&text).with_context(|| format!("parsing {}", path.display())),
        _ => anyhow::bail!(
            "unsupported sheet '{}', expected a .toml or .json file",
            path.display()
        ),
    }
}

pub fn parse_toml(text: &str) -> Result<Vec<SheetRow>> {
    let doc: toml::Table = toml::from_str(text)?;
    let entries = match doc.get("tag") {
        None => Vec::new(),
        Some(toml::Value::Array(entries)) => entries
            .iter()
            .map(serde_json::to_value)
            .collect::<Result<Vec<_>, _>>()?,
        Some(_) => anyhow::bail!("'tag' must be an array of tables ([[tag]])"),
    };
    Ok(rows(entries))
}

pub fn parse_json(text: &str) -> Result<Vec<SheetRow>> {
    let mut doc: Value = serde_json::from_str(text)?;
    let entries = match doc.get_mut("tags").map(Value::take) {
        None => Vec::new(),
        Some(Value::Array(entries)) => entries,
        Some(_) => anyhow::bail!("'tags' must be an array"),
    };
    Ok(rows(entries))
}

fn rows(entries: Vec<Value>) -> Vec<SheetRow> {
    entries
        .into_iter()
        .enumerate()
        .map(|(i, entry)| SheetRow {
            column: column_label(&entry, i),
            record: to_record(entry),
        })
        .collect()
}

fn column_label(entry: &Value, index: usize) -> String {
    match entry.get("column") {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Number(n)) => n.to_string(),
        _ => format!("#{}", index + 1),
    }
}

fn to_record(mut entry: Value) -> Result<TagRecord, String> {
    if let Value::Object(map) = &mut entry {
        map.remove("column");
        for key in LOCATION_KEYS {
            if map.get(key).and_then(Value::as_str) == Some(UNKNOWN_LOCATION) {
                map.insert(key.to_string(), Value::from(0));
            }
        }
    }
    serde_json::from_value(entry).map_err(|e| e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use railtag::{FieldSource, TagKind};

    #[test]
    fn toml_sheet_rows() {
        let rows = parse_toml(
            r#"
            [[tag]]
            column = "C"
            kind = "nt"
            unique_id = 904

            [tag.nominal]
            tin = 84

            [[tag]]
            kind = "aline"
            adjacent_tins = [75, 74, 0, 0, 0]
            "#,
        )
        .unwrap();

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].column, "C");
        assert_eq!(rows[1].column, "#2");
        let nt = rows[0].record.as_ref().unwrap();
        assert_eq!(nt.kind(), TagKind::Nt);
        assert_eq!(nt.unique_id(), 904);
        assert_eq!(rows[1].record.as_ref().unwrap().kind(), TagKind::Aline);
    }

    #[test]
    fn bad_entry_fails_alone() {
        let rows = parse_json(
            r#"{"tags": [
                {"kind": "adj", "unique_id": 77},
                {"kind": "nt", "unique_id": "x"},
                {"kind": "lc"}
            ]}"#,
        )
        .unwrap();

        assert!(rows[0].record.is_ok());
        assert!(rows[1].record.is_err());
        assert!(rows[2].record.is_err());
    }

    #[test]
    fn unknown_location_encodes_as_zero() {
        let rows = parse_json(
            r#"{"tags": [{"kind": "adj", "nominal_location": "UNKNOWN", "reverse_location": 12}]}"#,
        )
        .unwrap();
        let TagRecord::Adj(adj) = rows[0].record.clone().unwrap() else {
            panic!("expected AdjT record");
        };
        assert_eq!(adj.nominal_location, 0);
        assert_eq!(adj.reverse_location, 12);
    }

    #[test]
    fn numeric_column_label() {
        let rows = parse_json(r#"{"tags": [{"column": 4, "kind": "nt"}]}"#).unwrap();
        assert_eq!(rows[0].column, "4");
    }

    #[test]
    fn missing_tag_array_is_empty() {
        assert!(parse_toml("title = \"station 12\"").unwrap().is_empty());
        assert!(parse_json("{}").unwrap().is_empty());
    }

    #[test]
    fn non_array_tags_rejected() {
        assert!(parse_toml("tag = 3").is_err());
        assert!(parse_json(r#"{"tags": {}}"#).is_err());
    }
}
