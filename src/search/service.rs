//! Issue search: query construction, execution and per-row access filtering

use crate::config::SearchSettings;
use crate::models::{IssueRecord, User};
use crate::search::{IssueFormatter, QueryBuilder, SearchError, SearchQuery, SearchResult, TableNames};
use crate::state::{IssueStore, PermissionModel};
use std::sync::Arc;
use tracing::{debug, info};

/// Runs access-controlled issue searches for authenticated users
pub struct IssueSearchService {
    settings: SearchSettings,
    tables: TableNames,
    formatter: IssueFormatter,
    store: Arc<dyn IssueStore>,
    permissions: Arc<dyn PermissionModel>,
}

impl IssueSearchService {
    pub fn new(
        settings: SearchSettings,
        tables: TableNames,
        formatter: IssueFormatter,
        store: Arc<dyn IssueStore>,
        permissions: Arc<dyn PermissionModel>,
    ) -> Self {
        Self {
            settings,
            tables,
            formatter,
            store,
            permissions,
        }
    }

    pub fn settings(&self) -> &SearchSettings {
        &self.settings
    }

    /// Build the query for `term`, run it, and return what `user` may see.
    ///
    /// Access data is fetched once; rows the per-issue check rejects are
    /// dropped from the output.
    pub async fn build_and_run(&self, term: &str, user: &User) -> SearchResult<Vec<IssueRecord>> {
        let term = term.trim();
        if term.is_empty() {
            debug!(user_id = user.id, "Empty search term, skipping query");
            return Ok(Vec::new());
        }

        let builder = QueryBuilder::new(self.store.dialect(), self.tables.clone())?;

        let access = self
            .permissions
            .access_snapshot(user)
            .await
            .map_err(|e| SearchError::AccessLookupFailed(e.to_string()))?;

        let query = SearchQuery::new(term, &self.settings, &access);
        if query.accessible_project_ids.is_empty() {
            debug!(user_id = user.id, "User has no accessible projects");
            return Ok(Vec::new());
        }

        let statement = builder.build(&query);
        let rows = self
            .store
            .fetch_rows(&query, &statement)
            .await
            .map_err(|e| SearchError::StoreFailed(e.to_string()))?;

        let fetched = rows.len();
        let records: Vec<IssueRecord> = rows
            .iter()
            .filter_map(|row| match access.check_issue(row) {
                Ok(()) => {
                    let project = access.project_name(row.project_id).unwrap_or_default();
                    Some(self.formatter.format(row, project))
                }
                Err(reason) => {
                    debug!(issue_id = row.id, user_id = user.id, reason = %reason, "Dropping row");
                    None
                }
            })
            .collect();

        info!(
            user_id = user.id,
            dialect = %statement.dialect,
            fetched,
            returned = records.len(),
            id_predicate = query.id_digits.is_some(),
            "Issue search completed"
        );

        Ok(records)
    }
}
