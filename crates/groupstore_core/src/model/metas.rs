//! JSON codec for the string-to-string metadata column.

use serde_json::Value;
use std::collections::BTreeMap;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Decoded metadata mapping.
pub type Metas = BTreeMap<String, String>;

pub type MetasResult<T> = Result<T, MetasError>;

/// Metadata column could not be encoded or decoded.
#[derive(Debug)]
pub enum MetasError {
    Json(serde_json::Error),
    /// Column holds valid JSON that is not an object.
    NotAnObject(String),
}

impl Display for MetasError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Json(err) => write!(f, "invalid metas json: {err}"),
            Self::NotAnObject(kind) => write!(f, "metas json must be an object, got {kind}"),
        }
    }
}

impl Error for MetasError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Json(err) => Some(err),
            Self::NotAnObject(_) => None,
        }
    }
}

impl From<serde_json::Error> for MetasError {
    fn from(value: serde_json::Error) -> Self {
        Self::Json(value)
    }
}

/// Serializes metadata as one JSON object string.
pub fn encode_metas(metas: &Metas) -> MetasResult<String> {
    Ok(serde_json::to_string(metas)?)
}

/// Parses the metadata column.
///
/// Empty text decodes to an empty mapping. Non-string JSON values are kept
/// in their JSON text form, so `{"n": 1}` reads back as `n -> "1"`.
pub fn decode_metas(raw: &str) -> MetasResult<Metas> {
    if raw.trim().is_empty() {
        return Ok(Metas::new());
    }

    let object = match serde_json::from_str::<Value>(raw)? {
        Value::Object(object) => object,
        Value::Null => return Ok(Metas::new()),
        other => return Err(MetasError::NotAnObject(json_kind(&other).to_string())),
    };

    Ok(object
        .into_iter()
        .map(|(key, value)| {
            let text = match value {
                Value::String(text) => text,
                Value::Null => String::new(),
                other => other.to_string(),
            };
            (key, text)
        })
        .collect())
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
