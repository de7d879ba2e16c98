//! Project domain model.
//!
//! # Responsibility
//! - Define the canonical record for one hotel/property project.
//! - Resolve symbolic icon names through one closed lookup table.
//!
//! # Invariants
//! - `id` is stable, non-nil and never reused for another project.
//! - `name` is never blank after trim.
//! - Unknown icon names resolve to `ProjectIcon::DEFAULT`, never an error.

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Stable identifier for a project.
pub type ProjectId = Uuid;

/// Closed set of icon identifiers a presentation layer can render.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ProjectIcon {
    Building,
    Hotel,
    Bed,
    Restaurant,
    Pool,
    Spa,
    Parking,
    Wrench,
    Briefcase,
    Chart,
}

const ICON_TABLE: &[(&str, ProjectIcon)] = &[
    ("building", ProjectIcon::Building),
    ("hotel", ProjectIcon::Hotel),
    ("bed", ProjectIcon::Bed),
    ("restaurant", ProjectIcon::Restaurant),
    ("pool", ProjectIcon::Pool),
    ("spa", ProjectIcon::Spa),
    ("parking", ProjectIcon::Parking),
    ("wrench", ProjectIcon::Wrench),
    ("briefcase", ProjectIcon::Briefcase),
    ("chart", ProjectIcon::Chart),
];

impl ProjectIcon {
    /// Icon used when a stored name is missing or unknown.
    pub const DEFAULT: ProjectIcon = ProjectIcon::Building;

    /// Resolves a symbolic name (case-insensitive) to a known icon.
    pub fn from_name(name: &str) -> Self {
        let normalized = name.trim().to_ascii_lowercase();
        ICON_TABLE
            .iter()
            .find(|(key, _)| *key == normalized)
            .map_or(Self::DEFAULT, |(_, icon)| *icon)
    }

    /// Stable symbolic name used in storage and on the wire.
    pub fn as_str(self) -> &'static str {
        ICON_TABLE
            .iter()
            .find(|(_, icon)| *icon == self)
            .map_or("building", |(key, _)| *key)
    }
}

impl Default for ProjectIcon {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl From<String> for ProjectIcon {
    fn from(value: String) -> Self {
        Self::from_name(value.as_str())
    }
}

impl From<ProjectIcon> for String {
    fn from(value: ProjectIcon) -> Self {
        value.as_str().to_string()
    }
}

/// Canonical project record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Project {
    pub id: ProjectId,
    pub name: String,
    #[serde(default)]
    pub description: String,
    /// Display tag only; carries no behavior.
    #[serde(default)]
    pub color: String,
    #[serde(default)]
    pub icon: ProjectIcon,
    /// Unix epoch milliseconds.
    pub created_at: i64,
}

/// Creation input collected by the presentation layer.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProjectDraft {
    pub name: String,
    pub description: String,
    pub color: String,
    pub icon: ProjectIcon,
}

/// Partial in-place update. `None` keeps the current value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProjectPatch {
    pub name: Option<String>,
    pub description: Option<String>,
    pub color: Option<String>,
    pub icon: Option<ProjectIcon>,
}

impl Project {
    /// Builds a validated project from a draft with a generated id.
    ///
    /// # Errors
    /// - `BlankName` when the trimmed name is empty.
    pub fn from_draft(draft: ProjectDraft, created_at: i64) -> Result<Self, ProjectValidationError> {
        let project = Self {
            id: Uuid::new_v4(),
            name: draft.name.trim().to_string(),
            description: draft.description,
            color: draft.color,
            icon: draft.icon,
            created_at,
        };
        project.validate()?;
        Ok(project)
    }

    /// Applies a patch and re-validates the result.
    ///
    /// The receiver is left untouched when validation fails.
    pub fn apply_patch(&self, patch: ProjectPatch) -> Result<Self, ProjectValidationError> {
        let mut next = self.clone();
        if let Some(name) = patch.name {
            next.name = name.trim().to_string();
        }
        if let Some(description) = patch.description {
            next.description = description;
        }
        if let Some(color) = patch.color {
            next.color = color;
        }
        if let Some(icon) = patch.icon {
            next.icon = icon;
        }
        next.validate()?;
        Ok(next)
    }

    /// Validates project invariants.
    pub fn validate(&self) -> Result<(), ProjectValidationError> {
        if self.id.is_nil() {
            return Err(ProjectValidationError::NilId);
        }
        if self.name.trim().is_empty() {
            return Err(ProjectValidationError::BlankName);
        }
        Ok(())
    }
}

/// Project invariant violations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProjectValidationError {
    NilId,
    BlankName,
}

impl Display for ProjectValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NilId => write!(f, "project id must not be nil"),
            Self::BlankName => write!(f, "project name must not be blank"),
        }
    }
}

impl Error for ProjectValidationError {}
