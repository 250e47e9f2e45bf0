use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::constants::{ACTIVITY_NAME, TIMESTAMP_NAME, TRACE_ID_NAME};

///
/// Possible attribute values of events, traces and logs
///
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", content = "content")]
pub enum AttributeValue {
    /// String values
    String(String),
    /// DateTime values
    Date(DateTime<Utc>),
    /// Integer values
    Int(i64),
    /// Float values
    Float(f64),
    /// Boolean values
    Boolean(bool),
    /// IDs (UUIDs)
    ID(Uuid),
}

impl AttributeValue {
    ///
    /// Try to get attribute value as String
    ///
    /// Returns `Some()` of the inner value if it is an [`AttributeValue::String`] and `None` otherwise
    ///
    pub fn try_as_string(&self) -> Option<&String> {
        match self {
            AttributeValue::String(v) => Some(v),
            _ => None,
        }
    }

    ///
    /// Try to get attribute value as date
    ///
    /// Returns `Some()` of the inner value if it is an [`AttributeValue::Date`] and `None` otherwise
    ///
    pub fn try_as_date(&self) -> Option<&DateTime<Utc>> {
        match self {
            AttributeValue::Date(v) => Some(v),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
///
/// Attribute made up of key and value
///
pub struct Attribute {
    /// Attribute key
    pub key: String,
    /// Attribute value
    pub value: AttributeValue,
}

impl Attribute {
    ///
    /// Helper to create a new attribute
    ///
    pub fn new(key: String, attribute_val: AttributeValue) -> Self {
        Self {
            key,
            value: attribute_val,
        }
    }
}

///
/// Attributes are [`Vec`]s of [`Attribute`]s
///
pub type Attributes = Vec<Attribute>;

///
/// Trait to easily access and add attributes
///
pub trait AttributeAccess {
    ///
    /// Add a new attribute (with key and value)
    ///
    fn add_to_attributes(&mut self, key: String, value: AttributeValue);
    ///
    /// Get an attribute by key
    ///
    /// Does a linear lookup (i.e., in O(n))
    fn get_by_key(&self, key: &str) -> Option<&Attribute>;
}

impl AttributeAccess for Attributes {
    fn add_to_attributes(&mut self, key: String, value: AttributeValue) {
        self.push(Attribute::new(key, value));
    }

    fn get_by_key(&self, key: &str) -> Option<&Attribute> {
        self.iter().find(|attr| attr.key == key)
    }
}

///
/// An event consists of multiple (event) attributes ([`Attributes`])
///
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Event {
    /// Event attributes
    pub attributes: Attributes,
}

impl Event {
    /// Create a new event with the provided activity
    ///
    /// Implicitly assumes usage of the concept XES extension (i.e., uses [`ACTIVITY_NAME`] as key)
    pub fn new(activity: String) -> Self {
        Event {
            attributes: vec![Attribute::new(
                ACTIVITY_NAME.to_string(),
                AttributeValue::String(activity),
            )],
        }
    }

    /// Create a new event with the provided activity and timestamp
    pub fn new_with_time(activity: String, timestamp: DateTime<Utc>) -> Self {
        Event {
            attributes: vec![
                Attribute::new(ACTIVITY_NAME.to_string(), AttributeValue::String(activity)),
                Attribute::new(TIMESTAMP_NAME.to_string(), AttributeValue::Date(timestamp)),
            ],
        }
    }

    /// Get the activity name of this event (if any)
    pub fn activity(&self) -> Option<&str> {
        self.attributes
            .get_by_key(ACTIVITY_NAME)
            .and_then(|a| a.value.try_as_string())
            .map(|s| s.as_str())
    }

    /// Get the timestamp of this event (if any)
    pub fn timestamp(&self) -> Option<&DateTime<Utc>> {
        self.attributes
            .get_by_key(TIMESTAMP_NAME)
            .and_then(|a| a.value.try_as_date())
    }
}

///
/// A trace consists of a list of events and trace attributes (See also [`Event`] and [`Attributes`])
///
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Trace {
    /// Trace-level attributes
    pub attributes: Attributes,
    /// Events contained in the trace
    pub events: Vec<Event>,
}

impl Trace {
    /// Create a new trace with the given case id and no events
    pub fn new(case_id: String) -> Self {
        Trace {
            attributes: vec![Attribute::new(
                TRACE_ID_NAME.to_string(),
                AttributeValue::String(case_id),
            )],
            events: Vec::new(),
        }
    }

    /// Get the case id of this trace (if any)
    pub fn case_id(&self) -> Option<&str> {
        self.attributes
            .get_by_key(TRACE_ID_NAME)
            .and_then(|a| a.value.try_as_string())
            .map(|s| s.as_str())
    }

    /// The sequence of activity names of this trace
    ///
    /// Events without an activity name are skipped.
    pub fn activity_sequence(&self) -> Vec<String> {
        self.events
            .iter()
            .filter_map(|e| e.activity())
            .map(|s| s.to_string())
            .collect()
    }

    /// Total duration of this trace in seconds (last event timestamp - first event timestamp)
    ///
    /// Returns 0.0 if fewer than two events carry timestamps.
    pub fn duration_secs(&self) -> f64 {
        let mut timestamps = self.events.iter().filter_map(|e| e.timestamp());
        match (timestamps.next(), timestamps.last()) {
            (Some(first), Some(last)) => (*last - *first).num_milliseconds() as f64 / 1000.0,
            _ => 0.0,
        }
    }
}

///
/// Event log consisting of a list of [`Trace`]s and log [`Attributes`]
///
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EventLog {
    /// Top-level attributes
    pub attributes: Attributes,
    /// Traces contained in the log
    pub traces: Vec<Trace>,
}

impl EventLog {
    /// Create a new event log with no traces
    pub fn new() -> Self {
        EventLog {
            attributes: Vec::new(),
            traces: Vec::new(),
        }
    }

    /// Number of cases (traces) in the log
    pub fn num_cases(&self) -> usize {
        self.traces.len()
    }

    /// The sorted set of distinct activity names occurring in the log
    pub fn unique_activities(&self) -> Vec<String> {
        let mut acts: Vec<String> = self
            .traces
            .iter()
            .flat_map(|t| t.activity_sequence())
            .collect();
        acts.sort();
        acts.dedup();
        acts
    }
}

impl Default for EventLog {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn build_log() {
        let mut log = EventLog::new();
        let mut trace = Trace::new("c1".to_string());
        trace.events.push(Event::new("Register".to_string()));
        trace.events.push(Event::new("Check".to_string()));
        log.traces.push(trace);

        assert_eq!(log.num_cases(), 1);
        assert_eq!(log.traces[0].case_id(), Some("c1"));
        assert_eq!(
            log.traces[0].activity_sequence(),
            vec!["Register".to_string(), "Check".to_string()]
        );
        assert_eq!(
            log.unique_activities(),
            vec!["Check".to_string(), "Register".to_string()]
        );
    }
}
