use serde_json::{Map, Value};

use crate::health::HealthSnapshot;
use crate::HEALTH_STEP_NAME;

/// Step result payload, classified once at ingestion so renderers never
/// have to probe raw JSON shapes.
#[derive(Debug, Clone, PartialEq)]
pub enum StepPayload {
    /// Routed by step name or by structural match. A name match with a
    /// malformed object still lands here; the health formatter handles the
    /// missing pieces.
    Health(HealthSnapshot),
    /// Any other non-null structured value, rendered as pretty JSON.
    Structured(Value),
    /// Raw string output, possibly empty.
    Text(String),
    /// Null or absent result.
    Empty,
}

pub fn classify(step_name: &str, result: Option<&Value>) -> StepPayload {
    match result {
        None | Some(Value::Null) => StepPayload::Empty,
        Some(Value::String(text)) => StepPayload::Text(text.clone()),
        Some(value @ Value::Object(map)) => {
            if step_name == HEALTH_STEP_NAME || looks_like_health(map) {
                let snapshot =
                    serde_json::from_value(value.clone()).unwrap_or_default();
                StepPayload::Health(snapshot)
            } else {
                StepPayload::Structured(value.clone())
            }
        }
        Some(value) => StepPayload::Structured(value.clone()),
    }
}

/// The duck-typed contract with the backend: three required top-level
/// fields, no explicit type tag.
fn looks_like_health(map: &Map<String, Value>) -> bool {
    map.contains_key("basic") && map.contains_key("resources") && map.contains_key("hardware")
}
