use crate::error::{AppError, Result};
use crate::models::{AccessLevel, AccessSnapshot, ProjectAccess, User, ALL_PROJECTS};
use crate::state::PermissionModel;
use async_trait::async_trait;
use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;

/// Project known to the directory
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DirectoryProject {
    pub id: u32,
    pub name: String,

    /// Public projects are visible to every user at their global level
    #[serde(default)]
    pub public: bool,
}

/// Account known to the directory
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DirectoryUser {
    pub id: u32,
    pub username: String,

    /// Session token
    pub token: String,

    pub access_level: AccessLevel,

    #[serde(default)]
    pub current_project: u32,

    /// Explicit per-project levels, overriding the global level
    #[serde(default)]
    pub project_access: HashMap<u32, AccessLevel>,
}

/// In-memory permission model (for demos and testing).
///
/// Administrators see every project; other users see public projects at
/// their global level plus the projects they are explicitly assigned to.
#[derive(Clone)]
pub struct InMemoryDirectory {
    projects: Arc<DashMap<u32, DirectoryProject>>,
    users: Arc<DashMap<u32, DirectoryUser>>,
    sessions: Arc<DashMap<String, u32>>,
    view_threshold: AccessLevel,
    private_issue_threshold: AccessLevel,
}

impl InMemoryDirectory {
    pub fn new() -> Self {
        Self {
            projects: Arc::new(DashMap::new()),
            users: Arc::new(DashMap::new()),
            sessions: Arc::new(DashMap::new()),
            view_threshold: AccessLevel::VIEWER,
            private_issue_threshold: AccessLevel::DEVELOPER,
        }
    }

    pub fn with_private_issue_threshold(mut self, threshold: AccessLevel) -> Self {
        self.private_issue_threshold = threshold;
        self
    }

    pub fn add_project(&self, project: DirectoryProject) {
        self.projects.insert(project.id, project);
    }

    pub fn add_user(&self, user: DirectoryUser) {
        self.sessions.insert(user.token.clone(), user.id);
        self.users.insert(user.id, user);
    }

    fn project_levels(&self, account: &DirectoryUser) -> HashMap<u32, ProjectAccess> {
        self.projects
            .iter()
            .filter_map(|entry| {
                let project = entry.value();
                let level = match account.project_access.get(&project.id) {
                    Some(level) => *level,
                    None if account.access_level >= AccessLevel::ADMINISTRATOR || project.public => {
                        account.access_level
                    }
                    None => return None,
                };
                Some((
                    project.id,
                    ProjectAccess {
                        name: project.name.clone(),
                        access_level: level,
                    },
                ))
            })
            .collect()
    }
}

impl Default for InMemoryDirectory {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PermissionModel for InMemoryDirectory {
    async fn authenticate(&self, token: &str) -> Result<Option<User>> {
        let Some(user_id) = self.sessions.get(token).map(|entry| *entry.value()) else {
            return Ok(None);
        };

        Ok(self.users.get(&user_id).map(|account| User {
            id: account.id,
            username: account.username.clone(),
        }))
    }

    async fn access_snapshot(&self, user: &User) -> Result<AccessSnapshot> {
        let account = self
            .users
            .get(&user.id)
            .map(|entry| entry.value().clone())
            .ok_or_else(|| AppError::Authentication(format!("Unknown user {}", user.id)))?;

        let projects = self.project_levels(&account);

        // A current project the user lost access to no longer sorts first
        let current_project = if projects.contains_key(&account.current_project) {
            account.current_project
        } else {
            ALL_PROJECTS
        };

        Ok(AccessSnapshot {
            user_id: account.id,
            access_level: account.access_level,
            current_project,
            projects,
            view_threshold: self.view_threshold,
            private_issue_threshold: self.private_issue_threshold,
        })
    }
}
