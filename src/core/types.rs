//! Closed vocabularies of the knowledge base
//!
//! Every project carries exactly one document per [`DocType`]. Each type has
//! a fixed default merge mode and a seed template used when the project is
//! registered.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::error::Error;

/// Project category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ProjectKind {
    #[default]
    Project,
    Module,
}

impl std::fmt::Display for ProjectKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProjectKind::Project => write!(f, "project"),
            ProjectKind::Module => write!(f, "module"),
        }
    }
}

impl std::str::FromStr for ProjectKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "project" => Ok(ProjectKind::Project),
            "module" => Ok(ProjectKind::Module),
            _ => anyhow::bail!("Unknown project kind: {}", s),
        }
    }
}

/// Project lifecycle status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ProjectStatus {
    #[default]
    Active,
    Paused,
    Archived,
}

impl std::fmt::Display for ProjectStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProjectStatus::Active => write!(f, "active"),
            ProjectStatus::Paused => write!(f, "paused"),
            ProjectStatus::Archived => write!(f, "archived"),
        }
    }
}

impl std::str::FromStr for ProjectStatus {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "active" => Ok(ProjectStatus::Active),
            "paused" => Ok(ProjectStatus::Paused),
            "archived" => Ok(ProjectStatus::Archived),
            _ => anyhow::bail!("Unknown project status: {}", s),
        }
    }
}

/// The eight fixed document slots every project owns
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocType {
    Todo,
    Confirm,
    Progress,
    Delays,
    Prd,
    Memory,
    Notes,
    Qa,
}

impl DocType {
    /// All eight slots, in seed order
    pub const ALL: [DocType; 8] = [
        DocType::Todo,
        DocType::Confirm,
        DocType::Progress,
        DocType::Delays,
        DocType::Prd,
        DocType::Memory,
        DocType::Notes,
        DocType::Qa,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            DocType::Todo => "todo",
            DocType::Confirm => "confirm",
            DocType::Progress => "progress",
            DocType::Delays => "delays",
            DocType::Prd => "prd",
            DocType::Memory => "memory",
            DocType::Notes => "notes",
            DocType::Qa => "qa",
        }
    }

    /// Merge mode applied when the caller does not pick one
    pub fn default_mode(&self) -> UpdateMode {
        match self {
            DocType::Todo => UpdateMode::Append,
            DocType::Confirm => UpdateMode::Upsert,
            DocType::Progress => UpdateMode::Upsert,
            DocType::Delays => UpdateMode::Append,
            DocType::Prd => UpdateMode::Upsert,
            DocType::Memory => UpdateMode::Append,
            DocType::Notes => UpdateMode::Append,
            DocType::Qa => UpdateMode::Upsert,
        }
    }

    /// Seed content written when the project is registered
    pub fn template(&self, today: NaiveDate) -> String {
        match self {
            DocType::Todo => format!(
                "# To-Do List\n\n## {}\n- [ ] Initial setup\n",
                today.format("%Y-%m-%d")
            ),
            DocType::Confirm => "# Things to Confirm\n\n_No items yet._\n".to_string(),
            DocType::Progress => {
                "# Current Progress\n\n## Current Sprint\n**Status:** Not started\n".to_string()
            }
            DocType::Delays => "# Delay Logs\n\n_No delays recorded._\n".to_string(),
            DocType::Prd => {
                "# Product Requirements Document\n\n## V1.0\n_To be defined._\n".to_string()
            }
            DocType::Memory => {
                "# Long-term Memories\n\n## Architecture Decisions\n\n## Technical Learnings\n\n## Key Insights\n"
                    .to_string()
            }
            DocType::Notes => "# Notable Points\n\n_No notes yet._\n".to_string(),
            DocType::Qa => "# Questions & Answers\n\n_No Q&A entries yet._\n".to_string(),
        }
    }
}

impl std::fmt::Display for DocType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for DocType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "todo" => Ok(DocType::Todo),
            "confirm" => Ok(DocType::Confirm),
            "progress" => Ok(DocType::Progress),
            "delays" => Ok(DocType::Delays),
            "prd" => Ok(DocType::Prd),
            "memory" => Ok(DocType::Memory),
            "notes" => Ok(DocType::Notes),
            "qa" => Ok(DocType::Qa),
            _ => Err(Error::InvalidDocType(s.to_string())),
        }
    }
}

/// Strategy for applying new content to a document
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UpdateMode {
    /// Replace a section identified by its `##` header, or append if absent
    Upsert,
    /// Grow the document, never remove
    Append,
}

impl std::fmt::Display for UpdateMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            UpdateMode::Upsert => write!(f, "upsert"),
            UpdateMode::Append => write!(f, "append"),
        }
    }
}

impl std::str::FromStr for UpdateMode {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "upsert" => Ok(UpdateMode::Upsert),
            "append" => Ok(UpdateMode::Append),
            _ => anyhow::bail!("Unknown update mode: {}", s),
        }
    }
}

/// Typed directed relation between two projects
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EdgeType {
    DependsOn,
    Uses,
    Related,
    ParentChild,
}

impl EdgeType {
    pub fn as_str(&self) -> &'static str {
        match self {
            EdgeType::DependsOn => "depends_on",
            EdgeType::Uses => "uses",
            EdgeType::Related => "related",
            EdgeType::ParentChild => "parent_child",
        }
    }
}

impl std::fmt::Display for EdgeType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for EdgeType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "depends_on" => Ok(EdgeType::DependsOn),
            "uses" => Ok(EdgeType::Uses),
            "related" => Ok(EdgeType::Related),
            "parent_child" => Ok(EdgeType::ParentChild),
            _ => Err(Error::InvalidEdgeType(s.to_string())),
        }
    }
}

/// What initiated a document merge
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UpdateTrigger {
    /// Driven by the auto-classifier
    Auto,
    /// Direct caller request
    Manual,
}

impl std::fmt::Display for UpdateTrigger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            UpdateTrigger::Auto => write!(f, "auto"),
            UpdateTrigger::Manual => write!(f, "manual"),
        }
    }
}

impl std::str::FromStr for UpdateTrigger {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "auto" => Ok(UpdateTrigger::Auto),
            "manual" => Ok(UpdateTrigger::Manual),
            _ => anyhow::bail!("Unknown update trigger: {}", s),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_doc_types_covered() {
        assert_eq!(DocType::ALL.len(), 8);
        // Round-trip every slot through its string form
        for doc_type in DocType::ALL {
            let parsed: DocType = doc_type.as_str().parse().unwrap();
            assert_eq!(parsed, doc_type);
        }
    }

    #[test]
    fn test_doc_type_rejects_unknown() {
        let err = "journal".parse::<DocType>().unwrap_err();
        assert!(matches!(err, Error::InvalidDocType(_)));
    }

    #[test]
    fn test_default_modes() {
        assert_eq!(DocType::Todo.default_mode(), UpdateMode::Append);
        assert_eq!(DocType::Confirm.default_mode(), UpdateMode::Upsert);
        assert_eq!(DocType::Progress.default_mode(), UpdateMode::Upsert);
        assert_eq!(DocType::Delays.default_mode(), UpdateMode::Append);
        assert_eq!(DocType::Prd.default_mode(), UpdateMode::Upsert);
        assert_eq!(DocType::Memory.default_mode(), UpdateMode::Append);
        assert_eq!(DocType::Notes.default_mode(), UpdateMode::Append);
        assert_eq!(DocType::Qa.default_mode(), UpdateMode::Upsert);
    }

    #[test]
    fn test_templates_seed_dated_todo() {
        let today = NaiveDate::from_ymd_opt(2025, 2, 10).unwrap();
        let todo = DocType::Todo.template(today);
        assert!(todo.contains("## 2025-02-10"));
        assert!(todo.contains("- [ ] Initial setup"));

        // Every template is non-empty markdown with a top-level heading
        for doc_type in DocType::ALL {
            let tpl = doc_type.template(today);
            assert!(tpl.starts_with("# "), "{} template", doc_type);
        }
    }

    #[test]
    fn test_edge_type_parse() {
        assert_eq!(
            "parent_child".parse::<EdgeType>().unwrap(),
            EdgeType::ParentChild
        );
        assert!(matches!(
            "friends".parse::<EdgeType>().unwrap_err(),
            Error::InvalidEdgeType(_)
        ));
    }
}
