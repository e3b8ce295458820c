use crate::error::Result;
use crate::models::IssueRow;
use crate::search::{Dialect, SearchQuery, Statement};
use crate::state::IssueStore;
use async_trait::async_trait;
use dashmap::DashMap;
use std::sync::Arc;

/// In-memory issue store (for demos and testing).
///
/// Reports a configurable dialect so the statement built for it is the one a
/// real driver would receive.
#[derive(Clone)]
pub struct InMemoryIssueStore {
    issues: Arc<DashMap<u64, IssueRow>>,
    dialect: Dialect,
}

impl InMemoryIssueStore {
    pub fn new(dialect: Dialect) -> Self {
        Self {
            issues: Arc::new(DashMap::new()),
            dialect,
        }
    }

    pub fn with_issues(dialect: Dialect, issues: impl IntoIterator<Item = IssueRow>) -> Self {
        let store = Self::new(dialect);
        for issue in issues {
            store.insert(issue);
        }
        store
    }

    pub fn insert(&self, issue: IssueRow) {
        tracing::debug!(issue_id = issue.id, "Issue stored");
        self.issues.insert(issue.id, issue);
    }

    pub fn len(&self) -> usize {
        self.issues.len()
    }

    pub fn is_empty(&self) -> bool {
        self.issues.is_empty()
    }
}

impl Default for InMemoryIssueStore {
    fn default() -> Self {
        Self::new(Dialect::default())
    }
}

#[async_trait]
impl IssueStore for InMemoryIssueStore {
    fn dialect(&self) -> Dialect {
        self.dialect
    }

    async fn fetch_rows(&self, query: &SearchQuery, statement: &Statement) -> Result<Vec<IssueRow>> {
        tracing::debug!(sql = %statement.sql, params = statement.params.len(), "Evaluating search in memory");

        // Keyed by id, so each issue appears at most once
        let mut rows: Vec<IssueRow> = self
            .issues
            .iter()
            .filter(|entry| query.matches(entry.value()))
            .map(|entry| entry.value().clone())
            .collect();

        rows.sort_by(|a, b| query.compare(a, b).then(a.id.cmp(&b.id)));
        rows.truncate(query.limit as usize);

        Ok(rows)
    }
}
