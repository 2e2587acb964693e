//! Decoder implementations

use super::types::RecordDecoder;
use crate::error::{Error, Result};
use serde_json::Value;

/// Key holding the shot list in feed listings
pub const SHOTS_PATH: &str = "shots";

/// JSON decoder that pulls a required record array out of the body
#[derive(Debug, Clone)]
pub struct JsonDecoder {
    /// Dot-separated path to the record array
    record_path: String,
}

impl JsonDecoder {
    /// Decoder for feed listings: the `shots` array must be present
    pub fn shots() -> Self {
        Self {
            record_path: SHOTS_PATH.to_string(),
        }
    }

    /// Extract the records at the path; anything but an array is an error
    pub fn extract_records(&self, value: &Value) -> Result<Vec<Value>> {
        let path = &self.record_path;
        match extract_simple_path(value, path) {
            Some(Value::Array(arr)) => Ok(arr.clone()),
            Some(other) => Err(Error::decode(format!(
                "expected an array at '{path}', found {}",
                type_name(other)
            ))),
            None => Err(Error::decode(format!("missing '{path}' in response"))),
        }
    }
}

impl RecordDecoder for JsonDecoder {
    fn decode(&self, body: &str) -> Result<Vec<Value>> {
        let value = self.decode_raw(body)?;
        self.extract_records(&value)
    }

    fn decode_raw(&self, body: &str) -> Result<Value> {
        serde_json::from_str(body).map_err(|e| Error::Decode {
            message: format!("Failed to parse JSON: {e}"),
        })
    }
}

/// Follow a dot-separated path through objects
fn extract_simple_path<'a>(value: &'a Value, path: &str) -> Option<&'a Value> {
    path.split('.')
        .filter(|part| !part.is_empty())
        .try_fold(value, |current, part| current.get(part))
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
