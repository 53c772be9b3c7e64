//! MCP tool argument structs
//!
//! Simple structs for deserializing tool arguments. Field names follow the
//! wire format expected by tool-calling front-ends (camelCase).

use serde::Deserialize;

/// Initialize a new project with its eight document templates
#[derive(Debug, Deserialize)]
pub struct ProjectCreateTool {
    /// Unique project slug (e.g. `api-service`)
    pub name: String,
    /// Filesystem path to the project
    pub path: String,
    /// Technology stack (e.g. `["Rust", "SQLite"]`)
    #[serde(default, rename = "techStack")]
    pub tech_stack: Vec<String>,
    /// Owner string
    #[serde(default)]
    pub owner: Option<String>,
    /// Parent project id or name, creates a parent-child edge
    #[serde(default, rename = "parentId")]
    pub parent_id: Option<String>,
    /// Human-readable project name
    #[serde(default, rename = "displayName")]
    pub display_name: Option<String>,
}

/// Manually update a specific document
#[derive(Debug, Deserialize)]
pub struct UpdateTool {
    /// Project id or name
    #[serde(rename = "projectId")]
    pub project_id: String,
    /// Document type to update
    #[serde(rename = "docType")]
    pub doc_type: String,
    /// Content to add or upsert
    pub content: String,
    /// Update mode (defaults to the doc type default)
    #[serde(default)]
    pub mode: Option<String>,
    /// Recorded on the version snapshot
    #[serde(default, rename = "changeSummary")]
    pub change_summary: Option<String>,
}

/// Auto-classify and batch-update documents from a conversation summary
#[derive(Debug, Deserialize)]
pub struct AutoUpdateTool {
    #[serde(rename = "conversationSummary")]
    pub conversation_summary: String,
    /// Project id or name
    #[serde(default, rename = "projectId")]
    pub project_id: Option<String>,
}

/// Get full project context, optionally with related projects
#[derive(Debug, Deserialize)]
pub struct ProjectContextTool {
    /// Project id or name
    #[serde(rename = "projectId")]
    pub project_id: String,
    #[serde(default, rename = "includeRelated")]
    pub include_related: bool,
    #[serde(default = "default_depth", rename = "maxDepth")]
    pub max_depth: u32,
}

fn default_depth() -> u32 {
    1
}

/// Search across documents using keyword matching
#[derive(Debug, Deserialize)]
pub struct SearchTool {
    pub query: String,
    /// Limit search to one project
    #[serde(default, rename = "projectId")]
    pub project_id: Option<String>,
    /// Filter by document types
    #[serde(default, rename = "docTypes")]
    pub doc_types: Vec<String>,
    /// Max results (default: 10)
    #[serde(default)]
    pub limit: Option<usize>,
}

/// Create a directed dependency between two projects
#[derive(Debug, Deserialize)]
pub struct DependencyAddTool {
    /// Source project id or name
    #[serde(rename = "fromId")]
    pub from_id: String,
    /// Target project id or name
    #[serde(rename = "toId")]
    pub to_id: String,
    /// Relationship type
    #[serde(rename = "type")]
    pub edge_type: String,
    #[serde(default)]
    pub description: Option<String>,
    /// Relation strength in [0, 1]
    #[serde(default)]
    pub strength: Option<f64>,
    #[serde(default)]
    pub bidirectional: bool,
}

/// Sync documents from the database to .md files on disk
#[derive(Debug, Deserialize)]
pub struct SyncTool {
    /// Project id or name (omit to sync all projects)
    #[serde(default, rename = "projectId")]
    pub project_id: Option<String>,
}
