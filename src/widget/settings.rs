use crate::config::{Config, WindowSettings};
use crate::widget::WidgetError;
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Id of the element whose `data-data` attribute carries [`WidgetSettings`]
pub const MARKER_ELEMENT_ID: &str = "imaticIssueAutocomplete";

/// Widget configuration embedded in the host page.
///
/// Parsed strictly: every field must be present with the right type before
/// anything is read.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct WidgetSettings {
    /// Search endpoint
    #[validate(length(min = 1))]
    pub url: String,

    pub autocomplete_issue_window_settings: WindowSettings,

    #[validate(range(min = 1))]
    pub min_search_length: usize,

    pub min_search_length_message: String,
    pub no_issue_found_message: String,
    pub search_for_issue_message: String,

    /// Shown when a search attempt fails
    #[serde(default = "default_search_failed_message")]
    pub search_failed_message: String,

    /// Names of inputs that receive autocomplete
    pub search_input_names: Vec<String>,

    /// Separator markup between row fields
    pub field_separator: String,

    pub submit_on_select: bool,
}

impl WidgetSettings {
    /// Parse and validate a marker payload
    pub fn from_marker(data: &str) -> Result<Self, WidgetError> {
        let settings: WidgetSettings = serde_json::from_str(data)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Settings a server with `config` embeds into host pages
    pub fn from_config(config: &Config) -> Self {
        let widget = &config.widget;
        let min = config.search.min_search_length;

        Self {
            url: config.server.search_path.clone(),
            autocomplete_issue_window_settings: widget.autocomplete_issue_window_settings.clone(),
            min_search_length: min,
            min_search_length_message: widget
                .messages
                .min_search_length_message
                .replace("{min}", &min.to_string()),
            no_issue_found_message: widget.messages.no_issue_found_message.clone(),
            search_for_issue_message: widget.messages.search_for_issue_message.clone(),
            search_failed_message: widget.messages.search_failed_message.clone(),
            search_input_names: widget.search_input_names.clone(),
            field_separator: widget.field_separator.clone(),
            submit_on_select: widget.submit_on_select,
        }
    }
}

fn default_search_failed_message() -> String {
    "Search failed".to_string()
}
