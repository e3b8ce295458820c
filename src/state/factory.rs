use crate::config::{StorageBackend, StorageConfig};
use crate::error::{AppError, Result};
use crate::models::IssueRow;
use crate::state::{
    DirectoryProject, DirectoryUser, InMemoryDirectory, InMemoryIssueStore, IssueStore,
    PermissionModel,
};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Arc;

/// Fixture content for the in-memory backend
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Seed {
    #[serde(default)]
    pub projects: Vec<DirectoryProject>,
    #[serde(default)]
    pub users: Vec<DirectoryUser>,
    #[serde(default)]
    pub issues: Vec<IssueRow>,
}

impl Seed {
    pub async fn from_file(path: &Path) -> Result<Self> {
        let raw = tokio::fs::read_to_string(path).await?;
        let seed: Seed = serde_json::from_str(&raw)?;
        Ok(seed)
    }
}

/// Store and permission model the server runs against
#[derive(Clone)]
pub struct Backends {
    pub store: Arc<dyn IssueStore>,
    pub permissions: Arc<dyn PermissionModel>,
}

/// Create the backends based on configuration
pub async fn create_backends(config: &StorageConfig) -> Result<Backends> {
    match config.backend {
        StorageBackend::Memory => {
            let seed = match &config.seed_path {
                Some(path) => {
                    tracing::info!(path = ?path, "Loading in-memory seed");
                    Seed::from_file(path).await.map_err(|e| {
                        AppError::Configuration(format!(
                            "Failed to load seed {}: {}",
                            path.display(),
                            e
                        ))
                    })?
                }
                None => {
                    tracing::warn!("No seed_path configured, starting with an empty store");
                    Seed::default()
                }
            };

            tracing::info!(
                dialect = %config.dialect,
                issues = seed.issues.len(),
                projects = seed.projects.len(),
                users = seed.users.len(),
                "Initializing in-memory storage backend"
            );

            Ok(seeded_backends(config, seed))
        }
    }
}

fn seeded_backends(config: &StorageConfig, seed: Seed) -> Backends {
    let directory = InMemoryDirectory::new();
    for project in seed.projects {
        directory.add_project(project);
    }
    for user in seed.users {
        directory.add_user(user);
    }

    let store = InMemoryIssueStore::with_issues(config.dialect, seed.issues);

    Backends {
        store: Arc::new(store),
        permissions: Arc::new(directory),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::search::Dialect;
    use std::io::Write;

    fn storage(seed_path: Option<std::path::PathBuf>) -> StorageConfig {
        StorageConfig {
            backend: StorageBackend::Memory,
            dialect: Dialect::Mysql,
            seed_path,
            table_prefix: "mantis_".to_string(),
            table_suffix: "_table".to_string(),
        }
    }

    #[tokio::test]
    async fn test_create_from_seed_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{
                "projects": [{{"id": 1, "name": "Web", "public": true}}],
                "users": [{{"id": 5, "username": "dev", "token": "t5", "access_level": 55}}],
                "issues": [{{"id": 1, "summary": "Crash", "project_id": 1, "status": 10, "reporter_id": 5}}]
            }}"#
        )
        .unwrap();

        let backends = create_backends(&storage(Some(file.path().to_path_buf())))
            .await
            .unwrap();
        assert_eq!(backends.store.dialect(), Dialect::Mysql);

        let user = backends.permissions.authenticate("t5").await.unwrap().unwrap();
        let snapshot = backends.permissions.access_snapshot(&user).await.unwrap();
        assert_eq!(snapshot.accessible_project_ids(), vec![1]);
    }

    #[tokio::test]
    async fn test_missing_seed_file_is_configuration_error() {
        let result = create_backends(&storage(Some("/nonexistent/seed.json".into()))).await;
        assert!(matches!(result, Err(AppError::Configuration(_))));
    }

    #[tokio::test]
    async fn test_no_seed_starts_empty() {
        let backends = create_backends(&storage(None)).await.unwrap();
        assert!(backends.permissions.authenticate("any").await.unwrap().is_none());
    }
}
