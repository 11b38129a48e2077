use crate::error::{AssetError, Result};
use crate::pipeline::write_atomic;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as JsonValue};
use std::fs;
use std::path::Path;

/// Sort key for records whose id has no numeric suffix
pub const MALFORMED_ID_SEQUENCE: u64 = u64::MAX;

/// One quiz question as stored in the batch files
///
/// The record is kept as the JSON value it was read from, so every field
/// (including explicit `null`s, non-string ids and keys this crate knows
/// nothing about) is written back exactly as it came in. The text fields
/// the translator touches are read through accessors.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct QuestionRecord(JsonValue);

impl QuestionRecord {
    /// A record object with only an `id`
    pub fn new(id: impl Into<String>) -> Self {
        let mut fields = Map::new();
        fields.insert("id".to_string(), JsonValue::String(id.into()));
        Self(JsonValue::Object(fields))
    }

    /// Add or replace a field; ignored when the record is not an object
    pub fn with_field(mut self, key: &str, value: impl Into<JsonValue>) -> Self {
        if let Some(fields) = self.fields_mut() {
            fields.insert(key.to_string(), value.into());
        }
        self
    }

    pub fn from_value(value: JsonValue) -> Self {
        Self(value)
    }

    pub fn as_value(&self) -> &JsonValue {
        &self.0
    }

    pub fn into_value(self) -> JsonValue {
        self.0
    }

    pub fn fields(&self) -> Option<&Map<String, JsonValue>> {
        self.0.as_object()
    }

    pub fn fields_mut(&mut self) -> Option<&mut Map<String, JsonValue>> {
        self.0.as_object_mut()
    }

    /// String value of a field, `None` when absent, null or not a string
    pub fn text(&self, key: &str) -> Option<&str> {
        self.0.get(key).and_then(JsonValue::as_str)
    }

    /// The `id` when it is a string
    pub fn id(&self) -> Option<&str> {
        self.text("id")
    }

    /// Numeric suffix of the id, e.g. `tk10_42` → 42
    ///
    /// Ids without a parsable suffix, non-string ids and records without an
    /// id map to [`MALFORMED_ID_SEQUENCE`] so they sort after every
    /// well-formed id.
    ///
    /// # Examples
    /// ```
    /// use assetprep::questions::{QuestionRecord, MALFORMED_ID_SEQUENCE};
    ///
    /// assert_eq!(QuestionRecord::new("tk10_42").sequence(), 42);
    /// assert_eq!(QuestionRecord::new("bad").sequence(), MALFORMED_ID_SEQUENCE);
    /// ```
    pub fn sequence(&self) -> u64 {
        self.id().map_or(MALFORMED_ID_SEQUENCE, id_sequence)
    }
}

/// Parse the numeric suffix after the last `_` of an id
pub fn id_sequence(id: &str) -> u64 {
    id.rsplit_once('_')
        .and_then(|(_, suffix)| suffix.parse::<u64>().ok())
        .unwrap_or(MALFORMED_ID_SEQUENCE)
}

/// Stable sort by id sequence, then by id text
pub fn sort_by_sequence(records: &mut [QuestionRecord]) {
    records.sort_by(|a, b| {
        a.sequence()
            .cmp(&b.sequence())
            .then_with(|| a.id().unwrap_or_default().cmp(b.id().unwrap_or_default()))
    });
}

/// Read a batch file containing a top-level JSON array of records
///
/// Individual records are never rejected; only the file as a whole can be.
///
/// # Returns
/// * `Ok(Vec<QuestionRecord>)` - Records in file order
/// * `Err(AssetError::UnsupportedFormat)` - If the top level is not an array
/// * `Err(AssetError)` - If the file cannot be read or is not JSON
pub fn load_records(path: &Path) -> Result<Vec<QuestionRecord>> {
    let text = fs::read_to_string(path)?;
    match serde_json::from_str::<JsonValue>(&text)? {
        JsonValue::Array(items) => Ok(items.into_iter().map(QuestionRecord).collect()),
        _ => Err(AssetError::UnsupportedFormat(format!(
            "{} does not contain a list",
            path.display()
        ))),
    }
}

/// Write records as a pretty-printed JSON array with 4-space indentation
///
/// Non-ASCII text is written as UTF-8, not escaped.
pub fn write_records(path: &Path, records: &[QuestionRecord]) -> Result<()> {
    let mut bytes = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
    let mut serializer = serde_json::Serializer::with_formatter(&mut bytes, formatter);
    records.serialize(&mut serializer)?;
    write_atomic(path, &bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_id_sequence() {
        assert_eq!(id_sequence("tk10_1"), 1);
        assert_eq!(id_sequence("tk10_960"), 960);
        assert_eq!(id_sequence("endo_tk10_7"), 7);
        assert_eq!(id_sequence("bad"), MALFORMED_ID_SEQUENCE);
        assert_eq!(id_sequence("tk10_"), MALFORMED_ID_SEQUENCE);
        assert_eq!(id_sequence("tk10_x1"), MALFORMED_ID_SEQUENCE);
        assert_eq!(id_sequence(""), MALFORMED_ID_SEQUENCE);
    }

    #[test]
    fn test_non_string_ids_are_malformed() {
        for value in [json!({"id": 2}), json!({"id": null}), json!({}), json!("loose")] {
            assert_eq!(QuestionRecord::from_value(value).sequence(), MALFORMED_ID_SEQUENCE);
        }
    }

    #[test]
    fn test_sort_by_sequence() {
        let mut records: Vec<QuestionRecord> = ["tk10_10", "bad", "tk10_2", "tk10_1"]
            .iter()
            .map(|id| QuestionRecord::new(*id))
            .collect();
        records.push(QuestionRecord::from_value(json!({"id": 2})));
        sort_by_sequence(&mut records);

        let ids: Vec<Option<&str>> = records.iter().map(|r| r.id()).collect();
        assert_eq!(
            ids,
            vec![Some("tk10_1"), Some("tk10_2"), Some("tk10_10"), None, Some("bad")]
        );
    }

    #[test]
    fn test_round_trip_preserves_unknown_fields() {
        let input = json!({
            "id": "tk10_3",
            "type": "matching",
            "bloom_level": 2,
            "topic": "Thyroid",
            "subtopic": "Hormones",
            "question_text": "Match the hormone",
            "options": ["TSH -> Pituitary", "T4 -> Thyroid"],
            "correct_answer": "TSH->Pituitary; T4->Thyroid",
            "explanation": "Basics."
        });

        let record: QuestionRecord = serde_json::from_value(input.clone()).unwrap();
        assert_eq!(record.as_value()["bloom_level"], json!(2));
        assert_eq!(record.text("question_text"), Some("Match the hormone"));
        assert_eq!(serde_json::to_value(&record).unwrap(), input);
    }

    #[test]
    fn test_null_and_empty_fields_survive_round_trip() {
        let input = json!({
            "id": "",
            "question_text": "q",
            "options": null,
            "explanation": null
        });

        let record: QuestionRecord = serde_json::from_value(input.clone()).unwrap();
        assert_eq!(record.text("explanation"), None);
        let output = serde_json::to_value(&record).unwrap();
        assert_eq!(output.as_object().unwrap().len(), 4);
        assert_eq!(output, input);
    }

    #[test]
    fn test_missing_fields_stay_missing() {
        let input = json!({ "id": "tk10_4", "question_text": "Only text" });
        let record: QuestionRecord = serde_json::from_value(input.clone()).unwrap();
        assert_eq!(serde_json::to_value(&record).unwrap(), input);
    }

    #[test]
    fn test_load_rejects_non_list() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("batch.json");
        fs::write(&path, r#"{"id": "tk10_1"}"#).unwrap();
        assert!(matches!(
            load_records(&path),
            Err(AssetError::UnsupportedFormat(_))
        ));
    }

    #[test]
    fn test_load_keeps_irregular_records() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("batch.json");
        fs::write(
            &path,
            r#"[{"id": "tk10_1", "options": ["a"]}, {"id": 2, "options": [1, null]}, "stray"]"#,
        )
        .unwrap();

        let records = load_records(&path).unwrap();
        assert_eq!(records.len(), 3);
        assert_eq!(records[1].as_value()["id"], json!(2));
        assert_eq!(records[2].as_value(), &json!("stray"));
    }

    #[test]
    fn test_write_records_format() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.json");
        let record = QuestionRecord::new("tk10_1").with_field("question_text", "Melyik hormon?");
        write_records(&path, &[record.clone()]).unwrap();

        let text = fs::read_to_string(&path).unwrap();
        assert!(text.starts_with("[\n    {\n        \"id\": \"tk10_1\""));
        assert!(text.contains("Melyik hormon?"));
        assert_eq!(load_records(&path).unwrap(), vec![record]);
    }

    #[test]
    fn test_non_ascii_is_not_escaped() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("hu.json");
        let record = QuestionRecord::new("tk10_1").with_field("explanation", "Pajzsmirigy működése");
        write_records(&path, &[record]).unwrap();
        assert!(fs::read_to_string(&path).unwrap().contains("működése"));
    }
}
