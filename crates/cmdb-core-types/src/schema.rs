//! Canonical schema constants for structured logging and events
//!
//! These constants keep log field names stable across the render engine,
//! the reverse-reference finder and their callers.

// Canonical field keys for structured logging
pub const FIELD_COMPONENT: &str = "component";
pub const FIELD_OP: &str = "op";
pub const FIELD_EVENT: &str = "event";
pub const FIELD_DURATION_MS: &str = "duration_ms";
pub const FIELD_REQUEST_ID: &str = "request_id";
pub const FIELD_TRACE_ID: &str = "trace_id";

// Entity identifiers
pub const FIELD_OBJECT_ID: &str = "object_id";
pub const FIELD_TYPE_ID: &str = "type_id";
pub const FIELD_USER_ID: &str = "user_id";
pub const FIELD_SECTION: &str = "section";
pub const FIELD_FIELD_NAME: &str = "field";

// Collection sizes and budgets
pub const FIELD_DEPTH: &str = "depth";
pub const FIELD_FIELDS_LEN: &str = "fields_len";
pub const FIELD_TOTAL: &str = "total";

// Error fields
pub const FIELD_ERR_KIND: &str = "err.kind";
pub const FIELD_ERR_CODE: &str = "err.code";

// Canonical event names
pub const EVENT_START: &str = "start";
pub const EVENT_END: &str = "end";
pub const EVENT_END_ERROR: &str = "end_error";

// Canonical operation names
pub const OP_RENDER: &str = "render_object";
pub const OP_FIND_REFERENCING: &str = "find_referencing";
pub const OP_CLEAR_REFERENCES: &str = "clear_references";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_constants_accessibility() {
        assert!(!FIELD_COMPONENT.is_empty());
        assert!(!FIELD_OP.is_empty());
        assert!(!EVENT_START.is_empty());
        assert!(!EVENT_END.is_empty());
        assert!(!EVENT_END_ERROR.is_empty());
    }

    #[test]
    fn test_event_names_are_distinct() {
        assert_ne!(EVENT_START, EVENT_END);
        assert_ne!(EVENT_START, EVENT_END_ERROR);
        assert_ne!(EVENT_END, EVENT_END_ERROR);
    }

    #[test]
    fn test_op_names_are_distinct() {
        assert_ne!(OP_RENDER, OP_FIND_REFERENCING);
        assert_ne!(OP_FIND_REFERENCING, OP_CLEAR_REFERENCES);
    }
}
