//! Project display label resolution.
//!
//! References are not re-validated on read: a transaction whose project is
//! missing from the snapshot resolves to `ARCHIVED_LABEL` instead of failing.

use crate::model::project::{Project, ProjectId};
use crate::report::classify::Scope;
use std::collections::HashMap;

/// Label for project-less entries.
pub const GENERAL_LABEL: &str = "General";
/// Label for references that no longer resolve.
pub const ARCHIVED_LABEL: &str = "Archived";

/// Read-only id → name lookup over a project snapshot.
#[derive(Debug, Clone, Default)]
pub struct ProjectDirectory<'a> {
    names: HashMap<ProjectId, &'a str>,
}

impl<'a> ProjectDirectory<'a> {
    pub fn new(projects: &'a [Project]) -> Self {
        Self {
            names: projects
                .iter()
                .map(|project| (project.id, project.name.as_str()))
                .collect(),
        }
    }

    pub fn contains(&self, id: ProjectId) -> bool {
        self.names.contains_key(&id)
    }

    /// Label for a nullable project reference.
    pub fn label(&self, project: Option<ProjectId>) -> &'a str {
        match project {
            None => GENERAL_LABEL,
            Some(id) => self.names.get(&id).copied().unwrap_or(ARCHIVED_LABEL),
        }
    }

    pub fn scope_label(&self, scope: Scope) -> &'a str {
        self.label(scope.project_id())
    }
}
