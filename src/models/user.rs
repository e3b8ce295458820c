use crate::models::IssueRow;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use thiserror::Error;

/// Authenticated caller of the search endpoint
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: u32,
    pub username: String,
}

/// Numeric access level as used by the host permission model
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AccessLevel(pub u16);

impl AccessLevel {
    pub const NOBODY: AccessLevel = AccessLevel(100);
    pub const ADMINISTRATOR: AccessLevel = AccessLevel(90);
    pub const MANAGER: AccessLevel = AccessLevel(70);
    pub const DEVELOPER: AccessLevel = AccessLevel(55);
    pub const UPDATER: AccessLevel = AccessLevel(40);
    pub const REPORTER: AccessLevel = AccessLevel(25);
    pub const VIEWER: AccessLevel = AccessLevel(10);
}

impl fmt::Display for AccessLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Id of the pseudo project meaning "all projects"
pub const ALL_PROJECTS: u32 = 0;

/// Project the caller can see, with the level it holds there
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectAccess {
    pub name: String,
    pub access_level: AccessLevel,
}

/// Why a single row was withheld from the caller
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AccessDenied {
    #[error("project {0} is not accessible")]
    ProjectNotAccessible(u32),

    #[error("access level {level} below view threshold in project {project_id}")]
    BelowViewThreshold { project_id: u32, level: AccessLevel },

    #[error("issue {0} is private")]
    PrivateIssue(u64),
}

/// Access data for one caller, fetched once per request.
///
/// Per-row checks run against this snapshot so filtering a result set never
/// goes back to the permission model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessSnapshot {
    pub user_id: u32,

    /// Global access level
    pub access_level: AccessLevel,

    /// Project the caller is currently working in ([`ALL_PROJECTS`] if none)
    #[serde(default)]
    pub current_project: u32,

    /// Accessible projects keyed by id
    pub projects: HashMap<u32, ProjectAccess>,

    /// Minimum level needed to see issues in a project
    #[serde(default = "default_view_threshold")]
    pub view_threshold: AccessLevel,

    /// Minimum level needed to see private issues reported by someone else
    #[serde(default = "default_private_threshold")]
    pub private_issue_threshold: AccessLevel,
}

impl AccessSnapshot {
    /// Accessible project ids in ascending order
    pub fn accessible_project_ids(&self) -> Vec<u32> {
        let mut ids: Vec<u32> = self.projects.keys().copied().collect();
        ids.sort_unstable();
        ids
    }

    pub fn project_name(&self, project_id: u32) -> Option<&str> {
        self.projects.get(&project_id).map(|p| p.name.as_str())
    }

    /// Bug-level access check for one row
    pub fn check_issue(&self, row: &IssueRow) -> Result<(), AccessDenied> {
        let project = self
            .projects
            .get(&row.project_id)
            .ok_or(AccessDenied::ProjectNotAccessible(row.project_id))?;

        if project.access_level < self.view_threshold {
            return Err(AccessDenied::BelowViewThreshold {
                project_id: row.project_id,
                level: project.access_level,
            });
        }

        if row.is_private()
            && row.reporter_id != self.user_id
            && project.access_level < self.private_issue_threshold
        {
            return Err(AccessDenied::PrivateIssue(row.id));
        }

        Ok(())
    }
}

fn default_view_threshold() -> AccessLevel {
    AccessLevel::VIEWER
}

fn default_private_threshold() -> AccessLevel {
    AccessLevel::DEVELOPER
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{VIEW_STATE_PRIVATE, VIEW_STATE_PUBLIC};

    fn snapshot(level: AccessLevel) -> AccessSnapshot {
        let mut projects = HashMap::new();
        projects.insert(
            1,
            ProjectAccess {
                name: "Web".to_string(),
                access_level: level,
            },
        );
        AccessSnapshot {
            user_id: 7,
            access_level: level,
            current_project: 1,
            projects,
            view_threshold: AccessLevel::VIEWER,
            private_issue_threshold: AccessLevel::DEVELOPER,
        }
    }

    fn row(project_id: u32, view_state: i32, reporter_id: u32) -> IssueRow {
        IssueRow {
            id: 10,
            summary: "Crash".to_string(),
            description: String::new(),
            additional_information: String::new(),
            project_id,
            status: 10,
            view_state,
            reporter_id,
        }
    }

    #[test]
    fn test_public_issue_visible_to_reporter_level() {
        let snap = snapshot(AccessLevel::REPORTER);
        assert!(snap.check_issue(&row(1, VIEW_STATE_PUBLIC, 3)).is_ok());
    }

    #[test]
    fn test_unknown_project_denied() {
        let snap = snapshot(AccessLevel::MANAGER);
        assert_eq!(
            snap.check_issue(&row(2, VIEW_STATE_PUBLIC, 3)),
            Err(AccessDenied::ProjectNotAccessible(2))
        );
    }

    #[test]
    fn test_private_issue_needs_threshold_or_ownership() {
        let snap = snapshot(AccessLevel::REPORTER);
        assert_eq!(
            snap.check_issue(&row(1, VIEW_STATE_PRIVATE, 3)),
            Err(AccessDenied::PrivateIssue(10))
        );
        assert!(snap.check_issue(&row(1, VIEW_STATE_PRIVATE, 7)).is_ok());

        let developer = snapshot(AccessLevel::DEVELOPER);
        assert!(developer.check_issue(&row(1, VIEW_STATE_PRIVATE, 3)).is_ok());
    }

    #[test]
    fn test_accessible_ids_sorted() {
        let mut snap = snapshot(AccessLevel::VIEWER);
        snap.projects.insert(
            9,
            ProjectAccess {
                name: "Ops".to_string(),
                access_level: AccessLevel::VIEWER,
            },
        );
        snap.projects.insert(
            3,
            ProjectAccess {
                name: "Api".to_string(),
                access_level: AccessLevel::VIEWER,
            },
        );
        assert_eq!(snap.accessible_project_ids(), vec![1, 3, 9]);
    }
}
