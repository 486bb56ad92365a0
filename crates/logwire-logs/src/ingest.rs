use serde_json::{Map, Value};
use thiserror::Error;

use logwire_types::{Level, LogEvent};

/// Why an inbound payload was rejected
#[derive(Debug, Error, PartialEq, Eq)]
pub enum IngestError {
    #[error("payload is not a JSON object")]
    NotAnObject,

    #[error("missing field `{0}`")]
    MissingField(&'static str),

    #[error("field `{0}` is not a string")]
    NotAString(&'static str),
}

/// Turn the first argument of a `log` push message into a [`LogEvent`].
///
/// All three fields must be present and be strings. Unknown levels are
/// accepted; extra fields are ignored.
pub fn parse_event(payload: &Value) -> Result<LogEvent, IngestError> {
    let obj = payload.as_object().ok_or(IngestError::NotAnObject)?;

    let level = string_field(obj, "level")?;
    let message = string_field(obj, "message")?;
    let timestamp = string_field(obj, "timestamp")?;

    Ok(LogEvent::new(Level::parse(level), message, timestamp))
}

fn string_field<'a>(obj: &'a Map<String, Value>, name: &'static str) -> Result<&'a str, IngestError> {
    match obj.get(name) {
        None | Some(Value::Null) => Err(IngestError::MissingField(name)),
        Some(Value::String(s)) => Ok(s.as_str()),
        Some(_) => Err(IngestError::NotAString(name)),
    }
}
