//! Project node - the tracked unit of work
//!
//! A project owns eight document slots and participates in the relation
//! graph. Created once via registration; metadata mutated thereafter; never
//! implicitly deleted.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ulid::Ulid;

use super::types::{ProjectKind, ProjectStatus};

/// A registered project
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Project {
    /// Unique identifier (ULID)
    pub id: Ulid,

    /// Unique human-chosen slug (e.g. `api-service`)
    pub name: String,

    /// Human-readable name, defaults to the slug
    pub display_name: String,

    /// Filesystem path of the codebase
    pub path: String,

    /// Project or module
    pub kind: ProjectKind,

    /// Ordered technology tags
    pub tech_stack: Vec<String>,

    /// Owner string (free text)
    pub owner: String,

    /// Lifecycle status
    pub status: ProjectStatus,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Parameters for registering a project
#[derive(Debug, Clone, Default)]
pub struct NewProject {
    pub name: String,
    pub path: String,
    pub display_name: Option<String>,
    pub kind: Option<ProjectKind>,
    pub tech_stack: Vec<String>,
    pub owner: Option<String>,
    /// Creates an automatic `parent_child` edge from this project
    pub parent_id: Option<Ulid>,
}

impl NewProject {
    pub fn new(name: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
            ..Default::default()
        }
    }

    pub fn with_display_name(mut self, display_name: impl Into<String>) -> Self {
        self.display_name = Some(display_name.into());
        self
    }

    pub fn with_tech_stack(mut self, tech_stack: Vec<String>) -> Self {
        self.tech_stack = tech_stack;
        self
    }

    pub fn with_owner(mut self, owner: impl Into<String>) -> Self {
        self.owner = Some(owner.into());
        self
    }

    pub fn with_parent(mut self, parent_id: Ulid) -> Self {
        self.parent_id = Some(parent_id);
        self
    }
}

/// Fields a project update may change; `None` leaves the field alone
#[derive(Debug, Clone, Default)]
pub struct ProjectPatch {
    pub display_name: Option<String>,
    pub status: Option<ProjectStatus>,
    pub tech_stack: Option<Vec<String>>,
    pub owner: Option<String>,
}

impl ProjectPatch {
    pub fn is_empty(&self) -> bool {
        self.display_name.is_none()
            && self.status.is_none()
            && self.tech_stack.is_none()
            && self.owner.is_none()
    }
}

impl std::fmt::Display for Project {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {} ({})", self.id, self.name, self.status)
    }
}
