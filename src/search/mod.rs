//! Access-controlled issue search behind the autocomplete endpoint
//!
//! A search runs in three steps:
//!
//! ```text
//! term + SearchSettings + AccessSnapshot
//!          │
//!          ▼
//!    SearchQuery ──► QueryBuilder (postgres | mysql) ──► Statement
//!          │                                               │
//!          └──────────────► IssueStore::fetch_rows ◄───────┘
//!                                   │
//!                                   ▼
//!                per-row AccessSnapshot::check_issue
//!                                   │
//!                                   ▼
//!                     IssueFormatter ──► Vec<IssueRecord>
//! ```
//!
//! Matching is case-insensitive substring matching on the summary and, when
//! enabled, the description, additional information and issue id. Results
//! are ordered current project first, then by project id and status, and
//! capped at `search_issue_limit`.

mod error;
mod format;
mod query;
mod service;

pub use error::{SearchError, SearchResult};
pub use format::{IssueFormatter, StatusCatalog};
pub use query::{
    parse_issue_id, Dialect, QueryBuilder, SearchQuery, SqlParam, Statement, TableNames,
};
pub use service::IssueSearchService;
