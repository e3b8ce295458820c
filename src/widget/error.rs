use thiserror::Error;

/// Failures reported by a host document
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DocumentError {
    #[error("No form found for input {0}")]
    NoEnclosingForm(u64),

    #[error("Element {0} does not exist")]
    UnknownElement(u64),
}

/// Errors raised by the autocomplete widget
#[derive(Error, Debug)]
pub enum WidgetError {
    /// The host page carries no configuration marker
    #[error("Missing data attribute on #{0} element")]
    MissingMarker(&'static str),

    /// The marker payload failed schema validation
    #[error("Invalid widget settings: {0}")]
    InvalidSettings(String),

    /// Auto-submit was requested for an input outside any form
    #[error("Cannot submit selection: {0}")]
    NoEnclosingForm(DocumentError),

    /// Other document failures
    #[error("Document error: {0}")]
    Document(#[from] DocumentError),
}

impl From<serde_json::Error> for WidgetError {
    fn from(err: serde_json::Error) -> Self {
        WidgetError::InvalidSettings(err.to_string())
    }
}

impl From<validator::ValidationErrors> for WidgetError {
    fn from(err: validator::ValidationErrors) -> Self {
        WidgetError::InvalidSettings(err.to_string())
    }
}
