//! Operations façade
//!
//! The surface consumed by the CLI and the MCP server. Wraps the store,
//! the engines, and the filesystem mirror; resolves project identifiers
//! (id first, then unique slug name) on every entry point.

use std::path::PathBuf;

use chrono::Utc;
use tracing::warn;
use ulid::Ulid;

use super::classify::classify;
use super::conversation::{AppliedUpdate, ConversationLog};
use super::document::{Document, VersionInfo};
use super::edge::{Edge, NewEdge};
use super::error::{Error, Result};
use super::graph::GraphEngine;
use super::project::{NewProject, Project, ProjectPatch};
use super::search::{SearchEngine, SearchHit, SearchQuery};
use super::store::{Store, StoreStats};
use super::text::prefix_chars;
use super::types::{DocType, EdgeType, ProjectStatus, UpdateMode, UpdateTrigger};
use crate::mirror::Mirror;

/// A project freshly registered, with its mirror location
#[derive(Debug)]
pub struct CreatedProject {
    pub project: Project,
    pub documents: Vec<Document>,
    pub docs_dir: PathBuf,
}

/// One project re-mirrored by `sync`
#[derive(Debug)]
pub struct SyncedProject {
    pub project_name: String,
    pub docs_dir: PathBuf,
    pub files: Vec<String>,
}

pub struct Ops {
    store: Store,
    mirror: Mirror,
}

impl Ops {
    pub fn new(store: Store, mirror: Mirror) -> Self {
        Self { store, mirror }
    }

    pub fn store(&self) -> &Store {
        &self.store
    }

    /// Register a project with its eight template documents
    pub fn create_project(&mut self, new: &NewProject) -> Result<CreatedProject> {
        let project = self.store.create_project(new)?;
        let documents = self.store.documents_for_project(project.id)?;

        let docs_dir = match self.mirror.sync_project(&project.name, &documents) {
            Ok(dir) => dir,
            Err(err) => {
                warn!(project = %project.name, %err, "mirror write failed");
                self.mirror.project_dir(&project.name)
            }
        };

        Ok(CreatedProject {
            project,
            documents,
            docs_dir,
        })
    }

    /// Merge content into one document slot
    pub fn update_document(
        &mut self,
        id_or_name: &str,
        doc_type: DocType,
        content: &str,
        mode: Option<UpdateMode>,
        trigger: UpdateTrigger,
        change_summary: Option<&str>,
    ) -> Result<Document> {
        let project = self.store.resolve_project(id_or_name)?;
        let doc = self
            .store
            .update_document(project.id, doc_type, content, mode, trigger, change_summary)?;

        if let Err(err) = self
            .mirror
            .sync_document(&project.name, doc.doc_type, &doc.content)
        {
            warn!(project = %project.name, doc = %doc.doc_type, %err, "mirror write failed");
        }

        Ok(doc)
    }

    /// Classify a conversation summary and apply the resulting merges
    ///
    /// Every merge runs with the `auto` trigger; the pass is recorded as a
    /// conversation log.
    pub fn auto_update(&mut self, summary: &str, id_or_name: &str) -> Result<Vec<AppliedUpdate>> {
        let project = self.store.resolve_project(id_or_name)?;
        let now = Utc::now();

        let mut applied = Vec::new();
        for update in classify(summary, now.date_naive()) {
            let doc = self.store.update_document(
                project.id,
                update.doc_type,
                &update.content,
                Some(update.mode),
                UpdateTrigger::Auto,
                Some("Auto-update from conversation"),
            )?;

            if let Err(err) = self
                .mirror
                .sync_document(&project.name, doc.doc_type, &doc.content)
            {
                warn!(project = %project.name, doc = %doc.doc_type, %err, "mirror write failed");
            }

            applied.push(AppliedUpdate {
                doc_type: update.doc_type,
                mode: update.mode,
                snippet: prefix_chars(&update.content, 100).to_string(),
            });
        }

        self.store
            .log_conversation(Some(project.id), summary, &applied, now, now)?;

        Ok(applied)
    }

    /// Rendered context of a project, optionally with related projects
    pub fn project_context(
        &self,
        id_or_name: &str,
        include_related: bool,
        max_depth: u32,
    ) -> Result<String> {
        let project = self.store.resolve_project(id_or_name)?;
        let engine = GraphEngine::new(&self.store);
        let context = engine.context(project.id, include_related, max_depth)?;
        Ok(engine.render_markdown(&context))
    }

    /// Keyword search across documents
    ///
    /// An unresolvable project identifier widens the search to every
    /// project rather than failing.
    pub fn search(
        &self,
        query: &str,
        id_or_name: Option<&str>,
        doc_types: Vec<DocType>,
        limit: Option<usize>,
    ) -> Result<Vec<SearchHit>> {
        let project_id = id_or_name.and_then(|ident| {
            self.store
                .resolve_project(ident)
                .map(|p| p.id)
                .ok()
        });

        let mut search_query = SearchQuery::new(query).with_doc_types(doc_types);
        if let Some(id) = project_id {
            search_query = search_query.in_project(id);
        }
        if let Some(limit) = limit {
            search_query = search_query.with_limit(limit);
        }

        SearchEngine::new(&self.store).search(&search_query)
    }

    /// Create a typed edge between two projects
    pub fn add_edge(
        &mut self,
        from: &str,
        to: &str,
        edge_type: EdgeType,
        description: Option<&str>,
        strength: Option<f64>,
        bidirectional: bool,
    ) -> Result<Edge> {
        let from_project = self.store.resolve_project(from)?;
        let to_project = self.store.resolve_project(to)?;

        let mut new = NewEdge::new(from_project.id, to_project.id, edge_type);
        if let Some(description) = description {
            new = new.with_description(description);
        }
        if let Some(strength) = strength {
            new = new.with_strength(strength);
        }
        if bidirectional {
            new = new.bidirectional();
        }

        self.store.add_edge(&new)
    }

    /// Re-mirror one project, or all of them
    pub fn sync(&self, id_or_name: Option<&str>) -> Result<Vec<SyncedProject>> {
        let projects = match id_or_name {
            Some(ident) => vec![self.store.resolve_project(ident)?],
            None => self.store.list_projects(None)?,
        };

        let mut synced = Vec::new();
        for project in projects {
            let docs = self.store.documents_for_project(project.id)?;
            let docs_dir = self.mirror.sync_project(&project.name, &docs)?;
            synced.push(SyncedProject {
                project_name: project.name,
                docs_dir,
                files: docs
                    .iter()
                    .map(|d| format!("{}.md", d.doc_type))
                    .collect(),
            });
        }

        Ok(synced)
    }

    // ----- passthrough queries -----

    pub fn resolve_project(&self, id_or_name: &str) -> Result<Project> {
        self.store.resolve_project(id_or_name)
    }

    pub fn list_projects(&self, status: Option<ProjectStatus>) -> Result<Vec<Project>> {
        self.store.list_projects(status)
    }

    pub fn update_project(&mut self, id_or_name: &str, patch: &ProjectPatch) -> Result<Project> {
        let project = self.store.resolve_project(id_or_name)?;
        self.store.update_project(project.id, patch)
    }

    pub fn delete_project(&mut self, id_or_name: &str) -> Result<bool> {
        let project = self.store.resolve_project(id_or_name)?;
        self.store.delete_project(project.id)
    }

    pub fn document(&self, id_or_name: &str, doc_type: DocType) -> Result<Option<Document>> {
        let project = self.store.resolve_project(id_or_name)?;
        self.store.document(project.id, doc_type)
    }

    /// Version history of one document slot, newest first
    pub fn versions(&self, id_or_name: &str, doc_type: DocType) -> Result<Vec<VersionInfo>> {
        let project = self.store.resolve_project(id_or_name)?;
        let doc = self
            .store
            .document(project.id, doc_type)?
            .ok_or(Error::DocumentNotFound {
                project_id: project.id,
                doc_type,
            })?;
        self.store.versions_for_document(doc.id)
    }

    pub fn version_content(&self, version_id: Ulid) -> Result<Option<String>> {
        self.store.version_content(version_id)
    }

    pub fn conversations(&self, id_or_name: &str) -> Result<Vec<ConversationLog>> {
        let project = self.store.resolve_project(id_or_name)?;
        self.store.conversations_for_project(project.id)
    }

    pub fn stats(&self) -> Result<StoreStats> {
        self.store.stats()
    }
}
