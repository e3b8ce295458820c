pub mod directory;
pub mod factory;
pub mod store;

pub use directory::*;
pub use factory::{create_backends, Backends, Seed};
pub use store::*;

use crate::error::Result;
use crate::models::{AccessSnapshot, IssueRow, User};
use crate::search::{Dialect, SearchQuery, Statement};
use async_trait::async_trait;

/// Trait for the relational issue store
#[async_trait]
pub trait IssueStore: Send + Sync {
    /// Dialect of the underlying database
    fn dialect(&self) -> Dialect;

    /// Execute a search statement.
    ///
    /// SQL drivers run `statement`; stores without SQL evaluate `query`,
    /// which carries the same semantics.
    async fn fetch_rows(&self, query: &SearchQuery, statement: &Statement) -> Result<Vec<IssueRow>>;
}

/// Trait for the host's session and permission model
#[async_trait]
pub trait PermissionModel: Send + Sync {
    /// Resolve a session token to a user
    async fn authenticate(&self, token: &str) -> Result<Option<User>>;

    /// Everything needed to filter one search for `user`
    async fn access_snapshot(&self, user: &User) -> Result<AccessSnapshot>;
}
