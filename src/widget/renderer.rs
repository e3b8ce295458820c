use crate::models::IssueRecord;
use crate::widget::dom::{IssueItem, ListItem, MessageItem};
use crate::widget::WidgetSettings;

/// Class names shared with the host stylesheet
pub mod css {
    pub const OVERLAY: &str = "issue-autocomplete-overlay";
    pub const SEARCH_INPUT: &str = "issue-search-input";
    pub const LIST: &str = "issues-list";
    pub const ISSUE_ITEM: &str = "issue-item";
    pub const ISSUE_BUTTON: &str = "issue-button";
    pub const ISSUE_LINK: &str = "issue-link";
    pub const ISSUE_SUMMARY: &str = "issue-summary";
    pub const CURRENT_ISSUE: &str = "current-issue";
    pub const HIGHLIGHTED: &str = "highlighted";
    pub const NO_ISSUES_ITEM: &str = "no-issues-item";
    pub const SEARCH_FAILED_ITEM: &str = "search-failed-item";
}

/// Attribute carrying the issue id on a row's select affordance
pub const DATA_ID_ATTRIBUTE: &str = "data-id";

/// Turns search outcomes into overlay rows
#[derive(Debug, Clone)]
pub struct ResultRenderer {
    separator: String,
    no_issue_found_message: String,
    min_search_length_message: String,
    search_failed_message: String,
}

impl ResultRenderer {
    pub fn new(settings: &WidgetSettings) -> Self {
        Self {
            separator: settings.field_separator.clone(),
            no_issue_found_message: settings.no_issue_found_message.clone(),
            min_search_length_message: settings.min_search_length_message.clone(),
            search_failed_message: settings.search_failed_message.clone(),
        }
    }

    /// Rows for a completed search.
    ///
    /// `current_issue` is the page's `id` query parameter; ids are compared
    /// numerically so padded and unpadded forms match.
    pub fn render(&self, records: &[IssueRecord], current_issue: Option<&str>) -> Vec<ListItem> {
        if records.is_empty() {
            return vec![message(css::NO_ISSUES_ITEM, &self.no_issue_found_message)];
        }

        let current = current_issue.and_then(|id| id.trim().parse::<u64>().ok());

        records
            .iter()
            .map(|record| {
                ListItem::Issue(IssueItem {
                    id: record.id.clone(),
                    href: format!("view.php?id={}", record.id),
                    project: record.project.clone(),
                    status: record.status.clone(),
                    status_color: record.status_color.clone(),
                    summary: record.summary.clone(),
                    separator: self.separator.clone(),
                    current: current.is_some() && record.numeric_id() == current,
                })
            })
            .collect()
    }

    pub fn render_too_short(&self) -> Vec<ListItem> {
        vec![message(css::NO_ISSUES_ITEM, &self.min_search_length_message)]
    }

    pub fn render_failure(&self) -> Vec<ListItem> {
        vec![message(css::SEARCH_FAILED_ITEM, &self.search_failed_message)]
    }
}

fn message(class: &str, text: &str) -> ListItem {
    ListItem::Message(MessageItem {
        class: class.to_string(),
        text: text.to_string(),
    })
}

impl ListItem {
    /// Markup for hosts that paint rows as HTML
    pub fn to_html(&self) -> String {
        match self {
            ListItem::Message(item) => format!(
                r#"<li class="{}">{}</li>"#,
                escape_html(&item.class),
                escape_html(&item.text)
            ),
            ListItem::Issue(item) => {
                let mut class = css::ISSUE_ITEM.to_string();
                if item.current {
                    class.push(' ');
                    class.push_str(css::CURRENT_ISSUE);
                }
                let id = escape_html(&item.id);
                let color = escape_html(&item.status_color);
                let sep = &item.separator;

                format!(
                    concat!(
                        r#"<li class="{class}">"#,
                        r#"<button type="button" class="{button} fa fa-external-link" {data_id}="{id}"></button>"#,
                        r#"<span>{sep}</span>"#,
                        r#"<a href="{href}" target="_blank" class="{link}">{id}</a>"#,
                        r#"<span>{sep}</span>"#,
                        r#"<span>{project}</span>"#,
                        r#"<span>{sep}</span>"#,
                        r#"<i class="fa fa-square fa-status-box {color}"></i> "#,
                        r#"<span class="{color}">{status}</span>"#,
                        r#"<span>{sep}</span>"#,
                        r#"<span class="{summary_class}">{summary}</span>"#,
                        "</li>"
                    ),
                    class = class,
                    button = css::ISSUE_BUTTON,
                    data_id = DATA_ID_ATTRIBUTE,
                    id = id,
                    sep = sep,
                    href = escape_html(&item.href),
                    link = css::ISSUE_LINK,
                    project = escape_html(&item.project),
                    color = color,
                    status = escape_html(&item.status),
                    summary_class = css::ISSUE_SUMMARY,
                    summary = escape_html(&item.summary),
                )
            }
        }
    }
}

fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            c => escaped.push(c),
        }
    }
    escaped
}
