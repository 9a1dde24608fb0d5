// src/ingest.rs
//! Batch ingest: turn an uploaded JSON document into `Comment` records.
//!
//! Two document shapes are accepted:
//! - records: `[{"comentario": "...", "fecha": "..."}, ...]`
//! - columns: `{"comentario": ["...", "..."], "fecha": [...]}`
//!
//! Extra fields are ignored. Blank comments and any other shape fail the
//! whole batch with `MalformedInput` before any model is called.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use crate::error::{PipelineError, Result};

/// Name of the comment text field in uploaded documents.
pub const COMMENT_FIELD: &str = "comentario";

/// One customer comment. Immutable once ingested.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Comment {
    pub text: String,
}

impl Comment {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }
}

/// Parse raw bytes of an uploaded document.
pub fn parse_batch(raw: &[u8]) -> Result<Vec<Comment>> {
    let value: Value = serde_json::from_slice(raw)
        .map_err(|e| PipelineError::MalformedInput(format!("invalid JSON document: {e}")))?;
    parse_batch_value(&value)
}

/// Parse an already-decoded JSON document.
pub fn parse_batch_value(value: &Value) -> Result<Vec<Comment>> {
    let comments = match value {
        Value::Array(records) => from_records(records)?,
        Value::Object(columns) => {
            let column = columns.get(COMMENT_FIELD).ok_or_else(|| {
                PipelineError::MalformedInput(format!(
                    "column document has no `{COMMENT_FIELD}` column"
                ))
            })?;
            from_column(column)?
        }
        other => {
            return Err(PipelineError::MalformedInput(format!(
                "expected an array of records or an object of columns, got {}",
                kind(other)
            )))
        }
    };
    debug!(count = comments.len(), "batch parsed");
    Ok(comments)
}

fn from_records(records: &[Value]) -> Result<Vec<Comment>> {
    records
        .iter()
        .enumerate()
        .map(|(i, rec)| {
            let obj = rec.as_object().ok_or_else(|| {
                PipelineError::MalformedInput(format!(
                    "record {i}: expected an object, got {}",
                    kind(rec)
                ))
            })?;
            match obj.get(COMMENT_FIELD) {
                Some(Value::String(s)) => comment_at(i, s),
                Some(other) => Err(PipelineError::MalformedInput(format!(
                    "record {i}: `{COMMENT_FIELD}` must be a string, got {}",
                    kind(other)
                ))),
                None => Err(PipelineError::MalformedInput(format!(
                    "record {i}: missing `{COMMENT_FIELD}`"
                ))),
            }
        })
        .collect()
}

fn from_column(column: &Value) -> Result<Vec<Comment>> {
    let cells = column.as_array().ok_or_else(|| {
        PipelineError::MalformedInput(format!(
            "`{COMMENT_FIELD}` column must be an array, got {}",
            kind(column)
        ))
    })?;
    cells
        .iter()
        .enumerate()
        .map(|(i, cell)| match cell {
            Value::String(s) => comment_at(i, s),
            other => Err(PipelineError::MalformedInput(format!(
                "record {i}: `{COMMENT_FIELD}` must be a string, got {}",
                kind(other)
            ))),
        })
        .collect()
}

fn comment_at(i: usize, text: &str) -> Result<Comment> {
    if text.trim().is_empty() {
        return Err(blank_record(i));
    }
    Ok(Comment::new(text))
}

pub(crate) fn blank_record(i: usize) -> PipelineError {
    PipelineError::MalformedInput(format!("record {i}: blank `{COMMENT_FIELD}`"))
}

fn kind(v: &Value) -> &'static str {
    match v {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn texts(v: &[Comment]) -> Vec<&str> {
        v.iter().map(|c| c.text.as_str()).collect()
    }

    #[test]
    fn record_documents_keep_order_and_ignore_extra_fields() {
        let raw = br#"[
            {"comentario": "Muy rica", "cliente": "Ana", "estrellas": 5},
            {"comentario": "Tardaron mucho"}
        ]"#;
        let out = parse_batch(raw).unwrap();
        assert_eq!(texts(&out), vec!["Muy rica", "Tardaron mucho"]);
    }

    #[test]
    fn column_documents_are_accepted() {
        let raw = br#"{"comentario": ["uno", "dos"], "fecha": ["2024-01-01", "2024-01-02"]}"#;
        let out = parse_batch(raw).unwrap();
        assert_eq!(texts(&out), vec!["uno", "dos"]);
    }

    #[test]
    fn empty_array_is_an_empty_batch() {
        assert!(parse_batch(b"[]").unwrap().is_empty());
    }

    #[test]
    fn missing_field_names_the_record() {
        let raw = br#"[{"comentario": "ok"}, {"texto": "sin campo"}]"#;
        match parse_batch(raw) {
            Err(PipelineError::MalformedInput(msg)) => {
                assert!(msg.contains("record 1"), "{msg}");
                assert!(msg.contains("comentario"), "{msg}");
            }
            other => panic!("expected MalformedInput, got {other:?}"),
        }
    }

    #[test]
    fn blank_comments_are_malformed_in_both_shapes() {
        let cases: [(&[u8], &str); 3] = [
            (br#"[{"comentario": "Las arepas estaban deliciosas"}, {"comentario": ""}]"#, "record 1"),
            (br#"[{"comentario": "   "}]"#, "record 0"),
            (br#"{"comentario": ["uno", "dos", "\n\t"]}"#, "record 2"),
        ];
        for (raw, at) in cases {
            match parse_batch(raw) {
                Err(PipelineError::MalformedInput(msg)) => {
                    assert!(msg.contains(at), "{msg}");
                    assert!(msg.contains("blank"), "{msg}");
                }
                other => panic!("expected MalformedInput, got {other:?}"),
            }
        }
    }

    #[test]
    fn wrong_types_are_malformed() {
        let cases: [&[u8]; 7] = [
            br#"[{"comentario": 42}]"#,
            br#"[{"comentario": null}]"#,
            br#"["just a string"]"#,
            br#"{"comentario": "not an array"}"#,
            br#"{"otra": []}"#,
            br#""scalar""#,
            b"not json at all",
        ];
        for raw in cases {
            assert!(
                matches!(parse_batch(raw), Err(PipelineError::MalformedInput(_))),
                "should reject {}",
                String::from_utf8_lossy(raw)
            );
        }
    }
}
