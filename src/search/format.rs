//! Presentation of raw issue rows as [`IssueRecord`]s

use crate::config::DisplayConfig;
use crate::models::{IssueRecord, IssueRow};
use std::collections::BTreeMap;

/// Status code to label mapping parsed from a `code:label,...` enum string
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StatusCatalog {
    labels: BTreeMap<i32, String>,
}

impl StatusCatalog {
    pub fn parse(enum_string: &str) -> Self {
        let mut labels = BTreeMap::new();
        for entry in enum_string.split(',').map(str::trim).filter(|e| !e.is_empty()) {
            match entry.split_once(':') {
                Some((code, label)) => match code.trim().parse::<i32>() {
                    Ok(code) => {
                        labels.insert(code, label.trim().to_string());
                    }
                    Err(_) => tracing::warn!(entry = %entry, "Ignoring status entry with non-numeric code"),
                },
                None => tracing::warn!(entry = %entry, "Ignoring malformed status entry"),
            }
        }
        Self { labels }
    }

    /// Label for a status code; unknown codes render as `@code@`
    pub fn label(&self, code: i32) -> String {
        self.labels
            .get(&code)
            .cloned()
            .unwrap_or_else(|| format!("@{code}@"))
    }

    /// CSS class token used to color a status
    pub fn color_token(&self, code: i32) -> String {
        format!("status-{code}-fg")
    }
}

/// Turns access-checked rows into display records
#[derive(Debug, Clone)]
pub struct IssueFormatter {
    id_padding: usize,
    statuses: StatusCatalog,
}

impl IssueFormatter {
    pub fn new(config: &DisplayConfig) -> Self {
        Self {
            id_padding: config.id_padding,
            statuses: StatusCatalog::parse(&config.status_enum_string),
        }
    }

    pub fn format_id(&self, id: u64) -> String {
        format!("{:0width$}", id, width = self.id_padding)
    }

    pub fn format(&self, row: &IssueRow, project_name: &str) -> IssueRecord {
        IssueRecord {
            id: self.format_id(row.id),
            summary: row.summary.clone(),
            project: project_name.to_string(),
            status: self.statuses.label(row.status),
            status_color: self.statuses.color_token(row.status),
        }
    }
}

impl Default for IssueFormatter {
    fn default() -> Self {
        Self::new(&DisplayConfig::default())
    }
}
