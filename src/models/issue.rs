use serde::{Deserialize, Serialize};

/// Issue as returned by the search endpoint and consumed by the widget.
///
/// Decoding is strict: a payload with unknown, missing or mistyped fields is
/// rejected rather than coerced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct IssueRecord {
    /// Display-formatted identifier (zero padded)
    pub id: String,

    /// One-line summary
    pub summary: String,

    /// Resolved project name
    pub project: String,

    /// Resolved status label
    pub status: String,

    /// CSS class token for the status color
    #[serde(rename = "statusColor")]
    pub status_color: String,
}

impl IssueRecord {
    /// Numeric value of the display id, ignoring zero padding
    pub fn numeric_id(&self) -> Option<u64> {
        self.id.trim().parse().ok()
    }
}

/// Issue view state as stored by the bug tracker
pub const VIEW_STATE_PUBLIC: i32 = 10;
pub const VIEW_STATE_PRIVATE: i32 = 50;

/// Raw issue row as produced by the store, before access filtering and formatting
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IssueRow {
    pub id: u64,
    pub summary: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub additional_information: String,
    pub project_id: u32,
    pub status: i32,
    #[serde(default = "default_view_state")]
    pub view_state: i32,
    pub reporter_id: u32,
}

impl IssueRow {
    pub fn is_private(&self) -> bool {
        self.view_state == VIEW_STATE_PRIVATE
    }
}

fn default_view_state() -> i32 {
    VIEW_STATE_PUBLIC
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_uses_camel_case_status_color() {
        let record = IssueRecord {
            id: "0000042".to_string(),
            summary: "Login fails".to_string(),
            project: "Web".to_string(),
            status: "new".to_string(),
            status_color: "status-10-fg".to_string(),
        };

        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["statusColor"], "status-10-fg");
        assert!(json.get("status_color").is_none());
    }

    #[test]
    fn test_record_rejects_unknown_fields() {
        let payload = r#"{"id":"1","summary":"s","project":"p","status":"new","statusColor":"c","extra":1}"#;
        assert!(serde_json::from_str::<IssueRecord>(payload).is_err());
    }

    #[test]
    fn test_record_rejects_mistyped_fields() {
        let payload = r#"{"id":1,"summary":"s","project":"p","status":"new","statusColor":"c"}"#;
        assert!(serde_json::from_str::<IssueRecord>(payload).is_err());
    }

    #[test]
    fn test_numeric_id_ignores_padding() {
        let record = IssueRecord {
            id: "0000123".to_string(),
            summary: String::new(),
            project: String::new(),
            status: String::new(),
            status_color: String::new(),
        };
        assert_eq!(record.numeric_id(), Some(123));
    }

    #[test]
    fn test_row_defaults_to_public() {
        let row: IssueRow = serde_json::from_str(
            r#"{"id":1,"summary":"s","project_id":1,"status":10,"reporter_id":2}"#,
        )
        .unwrap();
        assert!(!row.is_private());
        assert!(row.description.is_empty());
    }
}
