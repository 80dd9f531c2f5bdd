//! crates/vdr_core/src/schema.rs
//!
//! The fixed schema every submitted session must satisfy, and the validator
//! that checks a JSON document against it.
//!
//! Validation is a single pass over the document that coerces scalars into
//! their declared types and records every violation it meets, rather than
//! stopping at the first one. A document with no violations is then turned
//! into a typed [`Session`].

use crate::domain::Session;
use serde::Serialize;
use serde_json::{Map, Number, Value};
use std::fmt;

//=========================================================================================
// Schema Description
//=========================================================================================

/// The type a schema node expects.
#[derive(Debug, Clone, Copy)]
pub enum Kind {
    /// Any JSON value, including `null`.
    Any,
    Boolean,
    /// A number with no fractional part that fits in an `i64`.
    Integer,
    Number,
    String,
    Array(&'static Kind),
    /// An object with the listed fields. Fields not listed are allowed.
    Object(&'static [Field]),
}

/// One named property of an object node.
#[derive(Debug, Clone, Copy)]
pub struct Field {
    pub name: &'static str,
    pub kind: Kind,
    pub required: bool,
}

const fn req(name: &'static str, kind: Kind) -> Field {
    Field { name, kind, required: true }
}

const fn opt(name: &'static str, kind: Kind) -> Field {
    Field { name, kind, required: false }
}

use self::Kind::{Any, Boolean, Integer, Number as Num, String as Str};

const SESSION_DATA: &[Field] = &[
    req("id", Integer),
    req("user_id", Num),
    req("name", Str),
    req("notes", Str),
    req("created_at", Str),
    req("updated_at", Str),
    req("deleted_at", Str),
];

const VDR_LOG: &[Field] = &[
    req("id", Integer),
    req("session_id", Num),
    req("vdr_logs_id", Num),
    req("raw_sentence", Str),
    req("talker", Str),
    req("sentence_type", Str),
    req("timestamp", Str),
    opt("latitude", Num),
    opt("longitude", Num),
    opt("speed_over_ground", Num),
    opt("course_over_ground", Num),
    opt("heading_true", Num),
    opt("water_speed_kmh", Num),
    req("depth_meters", Any),
    req("rudder_angle_starboard", Any),
    req("rate_of_turn", Any),
    req("created_at", Str),
    req("updated_at", Any),
    req("deleted_at", Any),
];

const OWNSHIP: &[Field] = &[
    req("id", Integer),
    req("session_id", Num),
    req("vdr_log_id", Num),
    req("nmea_sentence_id", Num),
    req("name", Str),
    req("imo", Str),
    req("mmsi", Str),
    req("heading_true", Num),
    req("speed_over_ground", Num),
    req("rate_of_turn", Num),
    req("revolution_per_min", Num),
    req("rudder_angle_starboard", Num),
    req("latitude", Num),
    req("longitude", Num),
    req("is_ownership", Boolean),
    req("timestamp", Str),
    req("created_at", Str),
    req("updated_at", Any),
    req("deleted_at", Any),
];

const CONNING: &[Field] = &[
    req("id", Integer),
    req("session_id", Num),
    req("vdr_log_id", Num),
    req("nmea_sentence_id", Num),
    req("name", Str),
    req("imo", Num),
    req("mmsi", Str),
    req("heading_true", Num),
    req("speed_over_ground", Num),
    req("revolution_per_min", Num),
    req("rudder_angle_starboard", Num),
    req("created_at", Str),
    req("updated_at", Any),
    req("deleted_at", Any),
];

const TELEMETRY: &[Field] = &[
    req("id", Integer),
    req("session_id", Num),
    req("vdr_log_id", Num),
    req("nmea_sentence_id", Num),
    req("name", Str),
    req("imo", Str),
    req("mmsi", Str),
    req("heading_true", Num),
    req("speed_over_ground", Num),
    req("rate_of_turn", Num),
    req("revolution_per_min", Num),
    req("rudder_angle_starboard", Num),
    req("course_over_ground", Num),
    req("water_speed_kmh", Num),
    req("depth_meters", Num),
    req("is_ownership", Boolean),
    req("timestamp", Str),
    req("created_at", Str),
    req("updated_at", Any),
    req("deleted_at", Any),
];

const AIS: &[Field] = &[
    req("id", Integer),
    req("session_id", Num),
    req("vdr_log_id", Num),
    req("nmea_sentence_id", Num),
    req("name", Str),
    req("imo", Str),
    req("mmsi", Str),
    req("heading_true", Num),
    req("speed_over_ground", Num),
    req("rate_of_turn", Num),
    req("revolution_per_min", Num),
    req("rudder_angle_starboard", Num),
    req("latitude", Num),
    req("longitude", Num),
    req("is_ownership", Boolean),
    opt("timestamp", Str),
    req("created_at", Str),
    req("updated_at", Any),
    req("deleted_at", Any),
];

const TRACK_POINT: &[Field] = &[
    req("vdr_log_id", Num),
    req("nmea_sentence_id", Num),
    req("speed_over_ground", Num),
    req("course_over_ground", Num),
    req("status", Num),
    req("latitude", Num),
    req("longitude", Num),
    req("timestamp", Str),
    req("created_at", Str),
    opt("updated_at", Any),
    opt("deleted_at", Any),
];

const ACTIVE_VESSEL: &[Field] = &[
    req("id", Integer),
    req("session_id", Num),
    req("name", Str),
    req("imo", Str),
    req("mmsi", Str),
    req("is_ownership", Boolean),
    req("track", Kind::Array(&Kind::Object(TRACK_POINT))),
];

const SHIP: &[Field] = &[
    req("id", Integer),
    req("session_id", Num),
    req("vdr_log_id", Num),
    req("nmea_sentence_id", Num),
    req("name", Str),
    req("imo", Str),
    req("mmsi", Str),
    req("is_ownership", Boolean),
    req("created_at", Str),
    req("updated_at", Any),
    req("deleted_at", Any),
];

const SHIP_LIST: &[Field] = &[
    req("data", Kind::Array(&Kind::Object(SHIP))),
    req("count", Num),
];

const ALARM: &[Field] = &[
    req("id", Integer),
    req("session_id", Num),
    req("vdr_log_id", Num),
    req("nmea_sentence_id", Num),
    req("alert_id", Str),
    req("description", Str),
    req("timestamp", Str),
    req("created_at", Str),
    req("updated_at", Any),
    req("deleted_at", Any),
];

const CPA_TCPA: &[Field] = &[
    req("id", Integer),
    req("session_id", Num),
    req("vdr_log_id", Num),
    req("name", Str),
    req("cpa_distance", Num),
    req("tcpa", Str),
    req("timestamp", Str),
    req("risk_level", Str),
];

const SESSION_BODY: &[Field] = &[
    req("session_data", Kind::Object(SESSION_DATA)),
    req("vdr_logs", Kind::Array(&Kind::Object(VDR_LOG))),
    req("session_ownship", Kind::Array(&Kind::Object(OWNSHIP))),
    req("session_ownship_conning", Kind::Array(&Kind::Object(CONNING))),
    req("session_ownship_telemetry", Kind::Array(&Kind::Object(TELEMETRY))),
    req("session_ships_ais", Kind::Array(&Kind::Object(AIS))),
    req("session_ships", Kind::Object(SHIP_LIST)),
    req(
        "session_ownship_active_vessels",
        Kind::Array(&Kind::Object(ACTIVE_VESSEL)),
    ),
    req("session_alarm", Kind::Array(&Kind::Object(ALARM))),
    req("session_cpa_tcpa", Kind::Array(&Kind::Object(CPA_TCPA))),
    req("start_time", Str),
    req("end_time", Str),
    req("duration_seconds", Num),
    req("duration_human", Str),
];

const ROOT: &[Field] = &[
    req("success", Boolean),
    req("data", Kind::Object(SESSION_BODY)),
];

/// The schema of a complete session document.
pub const SESSION: Kind = Kind::Object(ROOT);

//=========================================================================================
// Validation Errors
//=========================================================================================

/// A single schema violation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    /// JSON pointer to the offending value; empty for the document root.
    pub path: String,
    pub message: String,
}

impl FieldError {
    pub(crate) fn new(path: &str, message: impl Into<String>) -> Self {
        Self {
            path: path.to_string(),
            message: message.into(),
        }
    }
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.path.is_empty() {
            write!(f, "{}", self.message)
        } else {
            write!(f, "{} {}", self.path, self.message)
        }
    }
}

/// Every violation found in a rejected document.
#[derive(Debug, Clone, thiserror::Error)]
#[error("document failed schema validation with {} error(s)", .errors.len())]
pub struct ValidationError {
    pub errors: Vec<FieldError>,
}

impl ValidationError {
    /// True when any error points at exactly `path`.
    pub fn mentions(&self, path: &str) -> bool {
        self.errors.iter().any(|e| e.path == path)
    }
}

//=========================================================================================
// Validator
//=========================================================================================

/// Validates `document` against [`SESSION`], coercing scalars on the way.
pub fn validate(mut document: Value) -> Result<Session, ValidationError> {
    let mut errors = Vec::new();
    check(&SESSION, &mut document, "", &mut errors);
    if !errors.is_empty() {
        return Err(ValidationError { errors });
    }

    serde_json::from_value(document).map_err(|e| ValidationError {
        errors: vec![FieldError::new("", e.to_string())],
    })
}

fn check(kind: &Kind, value: &mut Value, path: &str, errors: &mut Vec<FieldError>) {
    match kind {
        Kind::Any => {}
        Kind::Object(fields) => match value.as_object_mut() {
            Some(object) => check_object(fields, object, path, errors),
            None => errors.push(FieldError::new(path, "must be object")),
        },
        Kind::Array(item) => match value.as_array_mut() {
            Some(items) => {
                for (index, element) in items.iter_mut().enumerate() {
                    check(item, element, &child_path(path, &index.to_string()), errors);
                }
            }
            None => errors.push(FieldError::new(path, "must be array")),
        },
        scalar => match coerce(scalar, value) {
            Some(coerced) => *value = coerced,
            None if matches!(scalar, Kind::Integer) => {
                errors.push(FieldError::new(path, "must be integer"))
            }
            None if matches!(scalar, Kind::Number) => {
                errors.push(FieldError::new(path, "must be number"))
            }
            None if matches!(scalar, Kind::Boolean) => {
                errors.push(FieldError::new(path, "must be boolean"))
            }
            None => errors.push(FieldError::new(path, "must be string")),
        },
    }
}

fn check_object(
    fields: &[Field],
    object: &mut Map<String, Value>,
    path: &str,
    errors: &mut Vec<FieldError>,
) {
    for field in fields {
        let field_path = child_path(path, field.name);
        match object.get_mut(field.name) {
            Some(value) => check(&field.kind, value, &field_path, errors),
            None if field.required => errors.push(FieldError::new(
                &field_path,
                format!("must have required property '{}'", field.name),
            )),
            None => {}
        }
    }
}

/// Returns the value coerced to `kind`, or `None` when no lossless coercion
/// exists. Values already of the right type come back unchanged.
fn coerce(kind: &Kind, value: &Value) -> Option<Value> {
    match kind {
        Kind::Number => to_number(value).map(Value::Number),
        Kind::Integer => to_number(value).and_then(to_integer).map(Value::Number),
        Kind::String => match value {
            Value::String(_) => Some(value.clone()),
            Value::Number(n) => Some(Value::String(n.to_string())),
            Value::Bool(b) => Some(Value::String(b.to_string())),
            _ => None,
        },
        Kind::Boolean => match value {
            Value::Bool(_) => Some(value.clone()),
            Value::String(s) if s == "true" => Some(Value::Bool(true)),
            Value::String(s) if s == "false" => Some(Value::Bool(false)),
            Value::Number(n) => match n.as_f64() {
                Some(f) if f == 1.0 => Some(Value::Bool(true)),
                Some(f) if f == 0.0 => Some(Value::Bool(false)),
                _ => None,
            },
            _ => None,
        },
        _ => Some(value.clone()),
    }
}

fn to_number(value: &Value) -> Option<Number> {
    match value {
        Value::Number(n) => Some(n.clone()),
        Value::Bool(b) => Some(Number::from(u8::from(*b))),
        Value::String(s) => {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                return None;
            }
            if let Ok(i) = trimmed.parse::<i64>() {
                return Some(Number::from(i));
            }
            trimmed
                .parse::<f64>()
                .ok()
                .filter(|f| f.is_finite())
                .and_then(Number::from_f64)
        }
        _ => None,
    }
}

fn to_integer(n: Number) -> Option<Number> {
    if let Some(i) = n.as_i64() {
        return Some(Number::from(i));
    }
    let f = n.as_f64()?;
    // i64::MAX is not exactly representable; stay strictly below 2^63.
    if f.fract() == 0.0 && f >= i64::MIN as f64 && f < i64::MAX as f64 {
        Some(Number::from(f as i64))
    } else {
        None
    }
}

/// Appends one reference token to a JSON pointer.
fn child_path(parent: &str, token: &str) -> String {
    format!("{}/{}", parent, token.replace('~', "~0").replace('/', "~1"))
}
