pub mod fence;
pub mod repair;

use serde::{Serialize, Serializer};
use serde_json::{Map, Value};
use tracing::{debug, warn};

use fence::strip_fences;
use repair::quote_bare_keys;

/// A model reply after normalization.
///
/// Normalization never fails; a reply that cannot be read as JSON becomes
/// `Failed` and travels through the pipeline as data.
#[derive(Debug, Clone, PartialEq)]
pub enum ParsedPayload {
    /// A JSON object. Top-level arrays are wrapped as `{"data": [...]}`.
    Parsed(Map<String, Value>),
    Failed {
        message: String,
        /// The cleaned reply text, absent when the reply was empty.
        raw: Option<String>,
    },
}

impl ParsedPayload {
    pub fn is_failed(&self) -> bool {
        matches!(self, ParsedPayload::Failed { .. })
    }

    /// The payload as a JSON object; failures become `{"error", "raw"}`.
    pub fn to_value(&self) -> Value {
        match self {
            ParsedPayload::Parsed(map) => Value::Object(map.clone()),
            ParsedPayload::Failed { message, raw } => {
                let mut map = Map::new();
                map.insert("error".into(), Value::String(message.clone()));
                if let Some(raw) = raw {
                    map.insert("raw".into(), Value::String(raw.clone()));
                }
                Value::Object(map)
            }
        }
    }
}

impl Serialize for ParsedPayload {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_value().serialize(serializer)
    }
}

/// Normalize raw model output into a `ParsedPayload`.
///
/// Fences are stripped and the text folded onto one line, then it is parsed
/// as strict JSON. If that fails, bare keys are quoted once and the parse is
/// retried.
pub fn normalize(raw: Option<&str>) -> ParsedPayload {
    let raw = match raw {
        Some(r) if !r.is_empty() => r,
        _ => {
            warn!("model returned an empty reply");
            return ParsedPayload::Failed {
                message: "Empty response".into(),
                raw: None,
            };
        }
    };

    let text = strip_fences(raw);

    match serde_json::from_str::<Value>(&text) {
        Ok(value) => return ParsedPayload::Parsed(wrap(value)),
        Err(e) => debug!(error = %e, "strict JSON parse failed, quoting bare keys"),
    }

    let fixed = quote_bare_keys(&text);
    match serde_json::from_str::<Value>(&fixed) {
        Ok(value) => ParsedPayload::Parsed(wrap(value)),
        Err(e) => {
            warn!(error = %e, chars = text.len(), "model reply is not valid JSON");
            ParsedPayload::Failed {
                message: format!("JSON parse failed: {e}"),
                raw: Some(text),
            }
        }
    }
}

/// Objects pass through; arrays and bare scalars are wrapped under `data`.
fn wrap(value: Value) -> Map<String, Value> {
    match value {
        Value::Object(map) => map,
        Value::Array(items) => {
            let mut map = Map::new();
            map.insert("data".into(), Value::Array(items));
            map
        }
        scalar => {
            let mut map = Map::new();
            map.insert("data".into(), Value::Array(vec![scalar]));
            map
        }
    }
}
