///
/// Default attribute key for the activity name of an event (XES concept extension)
///
pub const ACTIVITY_NAME: &str = "concept:name";

///
/// Default attribute key for the case identifier of a trace (XES concept extension)
///
pub const TRACE_ID_NAME: &str = "concept:name";

///
/// Default attribute key for the timestamp of an event (XES time extension)
///
pub const TIMESTAMP_NAME: &str = "time:timestamp";

/// Labels that carry no behavioral meaning
///
/// Activities or model elements with these labels are filtered out before mining or checking:
/// placeholder values from modeling tools, generic start/end markers, and common null spellings.
pub const USELESS_LABELS: &[&str] = &[
    "MISSING",
    "UNDEFINED",
    "undefined",
    "missing",
    "nan",
    "NaN",
    "empty",
    "empties",
    "unknown",
    "other",
    "others",
    "na",
    "nil",
    "null",
    "NIL",
    "none",
    "None",
    "",
    " ",
    "<unknown>",
    "0;n/a",
    "?",
    "Start",
    "End",
    "start",
    "end",
    "Start Event",
    "End Event",
    "Start event",
    "End event",
    "StartEvent",
    "EndEvent",
    "Start Process",
    "Start process",
    "End Process",
    "End process",
    "Gateway",
    "No name found",
];

/// Check whether a label is one of the [`USELESS_LABELS`]
///
/// Numbered boundary-event labels ("Start Event1", "End Event3", ...) are treated as useless too.
pub fn is_useless_label(label: &str) -> bool {
    if USELESS_LABELS.contains(&label) {
        return true;
    }
    for prefix in ["Start Event", "End Event"] {
        if let Some(rest) = label.strip_prefix(prefix) {
            if !rest.is_empty() && rest.chars().all(|c| c.is_ascii_digit()) {
                return true;
            }
        }
    }
    false
}

/// Check whether a task label is worth keeping in a played-out trace
///
/// Rejects empty and purely numeric names, gateway labels and subprocess markers.
pub fn is_relevant_label(label: &str) -> bool {
    if label.is_empty() {
        return false;
    }
    if label.chars().all(|c| c.is_ascii_digit()) {
        return false;
    }
    if label == "Message" {
        return false;
    }
    if label.contains("Gateway") {
        return false;
    }
    if label.starts_with("EventSubprocess") || label.starts_with("Subprocess") {
        return false;
    }
    true
}
