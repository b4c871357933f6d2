//! Field values that predicates compare against.

use std::cmp::Ordering;

use geocast_types::{EventId, EventStatus, PrivacyMode, StreamId, StreamStatus, Timestamp, UserId};
use uuid::Uuid;

/// A single indexed field value.
///
/// Values of different variants never compare equal and are unordered,
/// so a range predicate against a mismatched type simply does not match.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Id(Uuid),
    Text(String),
    Float(f64),
    Int(i64),
    Time(Timestamp),
}

impl PartialOrd for Value {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        match (self, other) {
            (Value::Null, Value::Null) => Some(Ordering::Equal),
            (Value::Id(a), Value::Id(b)) => a.partial_cmp(b),
            (Value::Text(a), Value::Text(b)) => a.partial_cmp(b),
            (Value::Float(a), Value::Float(b)) => a.partial_cmp(b),
            (Value::Int(a), Value::Int(b)) => a.partial_cmp(b),
            (Value::Time(a), Value::Time(b)) => a.partial_cmp(b),
            _ => None,
        }
    }
}

impl From<StreamId> for Value {
    fn from(id: StreamId) -> Self {
        Value::Id(*id.as_uuid())
    }
}

impl From<EventId> for Value {
    fn from(id: EventId) -> Self {
        Value::Id(*id.as_uuid())
    }
}

impl From<Option<EventId>> for Value {
    fn from(id: Option<EventId>) -> Self {
        id.map_or(Value::Null, Value::from)
    }
}

impl From<&UserId> for Value {
    fn from(id: &UserId) -> Self {
        Value::Text(id.as_str().to_string())
    }
}

impl From<StreamStatus> for Value {
    fn from(status: StreamStatus) -> Self {
        Value::Text(status.as_str().to_string())
    }
}

impl From<EventStatus> for Value {
    fn from(status: EventStatus) -> Self {
        Value::Text(status.as_str().to_string())
    }
}

impl From<PrivacyMode> for Value {
    fn from(mode: PrivacyMode) -> Self {
        Value::Text(mode.as_str().to_string())
    }
}

impl From<Timestamp> for Value {
    fn from(ts: Timestamp) -> Self {
        Value::Time(ts)
    }
}

impl From<Option<Timestamp>> for Value {
    fn from(ts: Option<Timestamp>) -> Self {
        ts.map_or(Value::Null, Value::Time)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float(v)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Text(v.to_string())
    }
}
