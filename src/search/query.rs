//! Issue search query construction for the supported SQL dialects

use crate::config::{SearchFields, SearchSettings};
use crate::models::{AccessSnapshot, IssueRow};
use crate::search::{SearchError, SearchResult};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt::Write;

/// SQL dialect of the active database backend
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, strum::Display,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Dialect {
    #[default]
    Postgres,
    Mysql,
    Sqlite,
    Mssql,
    Oracle,
}

/// Bound statement parameter
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SqlParam {
    Text(String),
    Int(i64),
}

/// A statement ready for the store driver
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Statement {
    pub dialect: Dialect,
    pub sql: String,
    pub params: Vec<SqlParam>,
}

/// Physical table names
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableNames {
    pub bug: String,
    pub bug_text: String,
}

impl TableNames {
    pub fn new(prefix: &str, suffix: &str) -> Self {
        Self {
            bug: format!("{prefix}bug{suffix}"),
            bug_text: format!("{prefix}bug_text{suffix}"),
        }
    }
}

impl Default for TableNames {
    fn default() -> Self {
        Self::new("mantis_", "_table")
    }
}

/// One search request, built fresh from the term, settings and caller access
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchQuery {
    /// Trimmed search term
    pub term: String,

    /// Optional columns to search
    pub fields: SearchFields,

    /// Digits matched against the issue id, present only for numeric terms
    pub id_digits: Option<String>,

    /// Projects the caller may see, ascending
    pub accessible_project_ids: Vec<u32>,

    /// Status codes to exclude
    pub excluded_statuses: Vec<i32>,

    /// Rows from this project sort first
    pub current_project: u32,

    /// Hard row cap
    pub limit: u32,
}

impl SearchQuery {
    pub fn new(term: &str, settings: &SearchSettings, access: &AccessSnapshot) -> Self {
        let term = term.trim().to_string();
        let id_digits = if settings.search_by_fields.id {
            parse_issue_id(&term).map(|id| id.to_string())
        } else {
            None
        };

        Self {
            term,
            fields: settings.search_by_fields,
            id_digits,
            accessible_project_ids: access.accessible_project_ids(),
            excluded_statuses: settings.exclude_view_states.clone(),
            current_project: access.current_project,
            limit: settings.search_issue_limit,
        }
    }

    /// `%term%` with LIKE metacharacters escaped
    pub fn like_pattern(&self) -> String {
        format!("%{}%", escape_like(&self.term))
    }

    /// Whether a row satisfies the WHERE clause (case-insensitive substring match)
    pub fn matches(&self, row: &IssueRow) -> bool {
        if self.excluded_statuses.contains(&row.status) {
            return false;
        }
        if !self.accessible_project_ids.contains(&row.project_id) {
            return false;
        }

        let needle = self.term.to_lowercase();
        let contains = |haystack: &str| haystack.to_lowercase().contains(&needle);

        contains(&row.summary)
            || (self.fields.description && contains(&row.description))
            || (self.fields.additional_information && contains(&row.additional_information))
            || self
                .id_digits
                .as_deref()
                .is_some_and(|digits| row.id.to_string().contains(digits))
    }

    /// ORDER BY: current project first, then project id, then status
    pub fn compare(&self, a: &IssueRow, b: &IssueRow) -> Ordering {
        let rank = |row: &IssueRow| u8::from(row.project_id != self.current_project);
        rank(a)
            .cmp(&rank(b))
            .then(a.project_id.cmp(&b.project_id))
            .then(a.status.cmp(&b.status))
    }
}

/// Parse a term as a positive issue id; anything else yields `None`
pub fn parse_issue_id(term: &str) -> Option<u64> {
    term.trim().parse::<u64>().ok().filter(|id| *id > 0)
}

fn escape_like(term: &str) -> String {
    let mut escaped = String::with_capacity(term.len());
    for c in term.chars() {
        if matches!(c, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

/// Builds the search statement for one dialect
pub struct QueryBuilder {
    dialect: Dialect,
    tables: TableNames,
}

impl QueryBuilder {
    /// Create a builder; unsupported dialects are rejected here
    pub fn new(dialect: Dialect, tables: TableNames) -> SearchResult<Self> {
        match dialect {
            Dialect::Postgres | Dialect::Mysql => Ok(Self { dialect, tables }),
            other => Err(SearchError::UnsupportedDialect(other)),
        }
    }

    fn like_operator(&self) -> &'static str {
        match self.dialect {
            Dialect::Postgres => "ILIKE",
            _ => "LIKE",
        }
    }

    fn id_as_text(&self) -> &'static str {
        match self.dialect {
            Dialect::Postgres => "b.id::text",
            _ => "CAST(b.id AS CHAR)",
        }
    }

    fn placeholder(&self, position: usize) -> String {
        match self.dialect {
            Dialect::Postgres => format!("${position}"),
            _ => "?".to_string(),
        }
    }

    /// Build the statement for a query
    pub fn build(&self, query: &SearchQuery) -> Statement {
        let mut params: Vec<SqlParam> = Vec::new();
        let like = self.like_operator();
        let bind = |param: SqlParam, params: &mut Vec<SqlParam>| {
            params.push(param);
            self.placeholder(params.len())
        };

        let mut sql = format!(
            "SELECT b.id, b.summary, b.project_id, b.status, b.view_state, b.reporter_id FROM {} b \
             JOIN {} bt ON bt.id = b.bug_text_id WHERE ",
            self.tables.bug, self.tables.bug_text
        );

        if !query.excluded_statuses.is_empty() {
            let _ = write!(
                sql,
                "b.status NOT IN ({}) AND ",
                join_numbers(&query.excluded_statuses)
            );
        }

        let pattern = query.like_pattern();
        let p = bind(SqlParam::Text(pattern.clone()), &mut params);
        let _ = write!(sql, "(b.summary {like} {p}");

        if query.fields.description {
            let p = bind(SqlParam::Text(pattern.clone()), &mut params);
            let _ = write!(sql, " OR bt.description {like} {p}");
        }

        if query.fields.additional_information {
            let p = bind(SqlParam::Text(pattern.clone()), &mut params);
            let _ = write!(sql, " OR bt.additional_information {like} {p}");
        }

        if let Some(digits) = &query.id_digits {
            let p = bind(SqlParam::Text(format!("%{digits}%")), &mut params);
            let _ = write!(sql, " OR {} {like} {p}", self.id_as_text());
        }

        sql.push(')');

        if query.accessible_project_ids.is_empty() {
            sql.push_str(" AND 1 = 0");
        } else {
            let _ = write!(
                sql,
                " AND b.project_id IN ({})",
                join_numbers(&query.accessible_project_ids)
            );
        }

        sql.push_str(" GROUP BY b.project_id, b.id, b.summary, b.status, b.view_state, b.reporter_id");

        let p = bind(SqlParam::Int(i64::from(query.current_project)), &mut params);
        let _ = write!(
            sql,
            " ORDER BY CASE WHEN b.project_id = {p} THEN 0 ELSE 1 END, b.project_id ASC, b.status ASC"
        );

        let p = bind(SqlParam::Int(i64::from(query.limit)), &mut params);
        let _ = write!(sql, " LIMIT {p}");

        Statement {
            dialect: self.dialect,
            sql,
            params,
        }
    }
}

fn join_numbers<T: ToString>(values: &[T]) -> String {
    values
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(",")
}
