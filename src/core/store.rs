//! Store - SQLite persistence layer
//!
//! One connection, WAL mode, foreign keys on. Project registration and
//! document merges run as single transactions so the eight document slots
//! and the version counter can never be observed half-applied.

use std::path::Path as FilePath;

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OpenFlags};
use tracing::debug;
use ulid::Ulid;

use super::conversation::{AppliedUpdate, ConversationLog};
use super::document::{self, Document, VersionInfo};
use super::edge::{Edge, NewEdge};
use super::error::{Error, Result};
use super::project::{NewProject, Project, ProjectPatch};
use super::types::{DocType, EdgeType, ProjectKind, ProjectStatus, UpdateMode, UpdateTrigger};

/// Database storage
pub struct Store {
    conn: Connection,
}

/// Candidate row handed to the search engine
#[derive(Debug, Clone)]
pub struct SearchCandidate {
    pub project_id: Ulid,
    pub project_name: String,
    pub doc_type: DocType,
    pub content: String,
}

/// Row counts across the whole database
#[derive(Debug, Clone, Default)]
pub struct StoreStats {
    pub projects: usize,
    pub documents: usize,
    pub edges: usize,
    pub versions: usize,
    pub conversations: usize,
}

impl Store {
    /// Open or create a database
    pub fn open(path: &FilePath) -> Result<Self> {
        let conn = Connection::open_with_flags(
            path,
            OpenFlags::SQLITE_OPEN_READ_WRITE
                | OpenFlags::SQLITE_OPEN_CREATE
                | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )?;

        conn.execute_batch(
            "PRAGMA journal_mode=WAL; PRAGMA busy_timeout=5000; PRAGMA foreign_keys=ON;",
        )?;

        let store = Self { conn };
        store.init_schema()?;
        Ok(store)
    }

    /// Open an in-memory database (for testing)
    pub fn open_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch("PRAGMA foreign_keys=ON;")?;
        let store = Self { conn };
        store.init_schema()?;
        Ok(store)
    }

    /// Initialize database schema
    fn init_schema(&self) -> Result<()> {
        self.conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS project_nodes (
                id TEXT PRIMARY KEY,
                name TEXT UNIQUE NOT NULL,
                display_name TEXT NOT NULL,
                path TEXT NOT NULL,
                kind TEXT NOT NULL CHECK(kind IN ('project', 'module')),
                tech_stack TEXT NOT NULL DEFAULT '[]',  -- JSON array
                owner TEXT NOT NULL DEFAULT '',
                status TEXT NOT NULL DEFAULT 'active' CHECK(status IN ('active', 'paused', 'archived')),
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS documents (
                id TEXT PRIMARY KEY,
                project_id TEXT NOT NULL,
                doc_type TEXT NOT NULL CHECK(doc_type IN ('todo', 'confirm', 'progress', 'delays', 'prd', 'memory', 'notes', 'qa')),
                file_path TEXT NOT NULL,
                update_mode TEXT NOT NULL CHECK(update_mode IN ('upsert', 'append')),
                content TEXT NOT NULL DEFAULT '',
                version INTEGER NOT NULL DEFAULT 1,
                last_modified TEXT NOT NULL,
                FOREIGN KEY (project_id) REFERENCES project_nodes(id) ON DELETE CASCADE,
                UNIQUE(project_id, doc_type)
            );

            CREATE TABLE IF NOT EXISTS project_edges (
                id TEXT PRIMARY KEY,
                from_id TEXT NOT NULL,
                to_id TEXT NOT NULL,
                edge_type TEXT NOT NULL CHECK(edge_type IN ('depends_on', 'uses', 'related', 'parent_child')),
                description TEXT NOT NULL DEFAULT '',
                strength REAL NOT NULL DEFAULT 0.5 CHECK(strength >= 0.0 AND strength <= 1.0),
                bidirectional INTEGER NOT NULL DEFAULT 0,
                created_at TEXT NOT NULL,
                FOREIGN KEY (from_id) REFERENCES project_nodes(id) ON DELETE CASCADE,
                FOREIGN KEY (to_id) REFERENCES project_nodes(id) ON DELETE CASCADE
            );

            CREATE TABLE IF NOT EXISTS document_versions (
                id TEXT PRIMARY KEY,
                document_id TEXT NOT NULL,
                content TEXT NOT NULL,
                change_summary TEXT NOT NULL DEFAULT '',
                trigger TEXT NOT NULL CHECK(trigger IN ('auto', 'manual')),
                version_number INTEGER NOT NULL,
                created_at TEXT NOT NULL,
                FOREIGN KEY (document_id) REFERENCES documents(id) ON DELETE CASCADE
            );

            CREATE TABLE IF NOT EXISTS conversation_logs (
                id TEXT PRIMARY KEY,
                project_id TEXT,
                summary TEXT NOT NULL DEFAULT '',
                updates_applied TEXT NOT NULL DEFAULT '[]',  -- JSON array
                conversation_start TEXT NOT NULL,
                conversation_end TEXT NOT NULL,
                FOREIGN KEY (project_id) REFERENCES project_nodes(id) ON DELETE SET NULL
            );

            CREATE INDEX IF NOT EXISTS idx_documents_project ON documents(project_id);
            CREATE INDEX IF NOT EXISTS idx_documents_type ON documents(doc_type);
            CREATE INDEX IF NOT EXISTS idx_edges_from ON project_edges(from_id);
            CREATE INDEX IF NOT EXISTS idx_edges_to ON project_edges(to_id);
            CREATE INDEX IF NOT EXISTS idx_versions_doc ON document_versions(document_id);
            CREATE INDEX IF NOT EXISTS idx_conv_project ON conversation_logs(project_id);
            "#,
        )?;

        Ok(())
    }

    // ----- projects -----

    /// Register a project with its eight template documents
    ///
    /// One transaction: the project row, all eight documents (each at
    /// version 1 with its version-1 snapshot), and the optional
    /// parent-child edge all exist afterwards, or none do.
    pub fn create_project(&mut self, new: &NewProject) -> Result<Project> {
        if self.project_by_name(&new.name)?.is_some() {
            return Err(Error::AlreadyExists(new.name.clone()));
        }

        let now = Utc::now();
        let project = Project {
            id: Ulid::new(),
            name: new.name.clone(),
            display_name: new
                .display_name
                .clone()
                .unwrap_or_else(|| new.name.clone()),
            path: new.path.clone(),
            kind: new.kind.unwrap_or_default(),
            tech_stack: new.tech_stack.clone(),
            owner: new.owner.clone().unwrap_or_default(),
            status: ProjectStatus::Active,
            created_at: now,
            updated_at: now,
        };

        let tech_stack_json = serde_json::to_string(&project.tech_stack)?;

        let tx = self.conn.transaction()?;

        tx.execute(
            r#"
            INSERT INTO project_nodes (id, name, display_name, path, kind, tech_stack, owner, status, created_at, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
            "#,
            params![
                project.id.to_string(),
                project.name,
                project.display_name,
                project.path,
                project.kind.to_string(),
                tech_stack_json,
                project.owner,
                project.status.to_string(),
                project.created_at.to_rfc3339(),
                project.updated_at.to_rfc3339(),
            ],
        )?;

        for doc_type in DocType::ALL {
            let doc_id = Ulid::new();
            let content = doc_type.template(now.date_naive());
            tx.execute(
                r#"
                INSERT INTO documents (id, project_id, doc_type, file_path, update_mode, content, version, last_modified)
                VALUES (?1, ?2, ?3, ?4, ?5, ?6, 1, ?7)
                "#,
                params![
                    doc_id.to_string(),
                    project.id.to_string(),
                    doc_type.as_str(),
                    format!("{}/{}.md", project.name, doc_type),
                    doc_type.default_mode().to_string(),
                    content,
                    now.to_rfc3339(),
                ],
            )?;

            // Version 1 snapshot: the seeded template
            tx.execute(
                r#"
                INSERT INTO document_versions (id, document_id, content, change_summary, trigger, version_number, created_at)
                VALUES (?1, ?2, ?3, ?4, ?5, 1, ?6)
                "#,
                params![
                    Ulid::new().to_string(),
                    doc_id.to_string(),
                    content,
                    "Initial template",
                    UpdateTrigger::Manual.to_string(),
                    now.to_rfc3339(),
                ],
            )?;
        }

        if let Some(parent_id) = new.parent_id {
            tx.execute(
                r#"
                INSERT INTO project_edges (id, from_id, to_id, edge_type, description, strength, bidirectional, created_at)
                VALUES (?1, ?2, ?3, 'parent_child', 'Auto-created parent-child relationship', 0.8, 0, ?4)
                "#,
                params![
                    Ulid::new().to_string(),
                    parent_id.to_string(),
                    project.id.to_string(),
                    now.to_rfc3339(),
                ],
            )?;
        }

        tx.commit()?;
        debug!(project = %project.name, "project registered");

        Ok(project)
    }

    pub fn project_by_id(&self, id: Ulid) -> Result<Option<Project>> {
        let mut stmt = self
            .conn
            .prepare("SELECT * FROM project_nodes WHERE id = ?1")?;
        let result = stmt.query_row([id.to_string()], Self::row_to_project);

        match result {
            Ok(project) => Ok(Some(project)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    pub fn project_by_name(&self, name: &str) -> Result<Option<Project>> {
        let mut stmt = self
            .conn
            .prepare("SELECT * FROM project_nodes WHERE name = ?1")?;
        let result = stmt.query_row([name], Self::row_to_project);

        match result {
            Ok(project) => Ok(Some(project)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Resolve an identifier that may be an id or the unique slug name
    ///
    /// Tries the id first, then the name.
    pub fn resolve_project(&self, id_or_name: &str) -> Result<Project> {
        if let Ok(id) = id_or_name.parse::<Ulid>() {
            if let Some(project) = self.project_by_id(id)? {
                return Ok(project);
            }
        }
        self.project_by_name(id_or_name)?
            .ok_or_else(|| Error::ProjectNotFound(id_or_name.to_string()))
    }

    /// List projects, optionally filtered by status, most recently updated first
    pub fn list_projects(&self, status: Option<ProjectStatus>) -> Result<Vec<Project>> {
        let mut sql = "SELECT * FROM project_nodes".to_string();
        if status.is_some() {
            sql.push_str(" WHERE status = ?1");
        }
        sql.push_str(" ORDER BY updated_at DESC");

        let mut stmt = self.conn.prepare(&sql)?;
        let projects = match status {
            Some(s) => stmt
                .query_map([s.to_string()], Self::row_to_project)?
                .collect::<std::result::Result<Vec<_>, _>>()?,
            None => stmt
                .query_map([], Self::row_to_project)?
                .collect::<std::result::Result<Vec<_>, _>>()?,
        };

        Ok(projects)
    }

    /// Apply a metadata patch; untouched fields keep their values
    pub fn update_project(&mut self, id: Ulid, patch: &ProjectPatch) -> Result<Project> {
        let project = self
            .project_by_id(id)?
            .ok_or_else(|| Error::ProjectNotFound(id.to_string()))?;

        let now = Utc::now();
        let mut sets = vec!["updated_at = ?1".to_string()];
        let mut values: Vec<String> = vec![now.to_rfc3339()];

        if let Some(display_name) = &patch.display_name {
            sets.push(format!("display_name = ?{}", values.len() + 1));
            values.push(display_name.clone());
        }
        if let Some(status) = patch.status {
            sets.push(format!("status = ?{}", values.len() + 1));
            values.push(status.to_string());
        }
        if let Some(tech_stack) = &patch.tech_stack {
            sets.push(format!("tech_stack = ?{}", values.len() + 1));
            values.push(serde_json::to_string(tech_stack)?);
        }
        if let Some(owner) = &patch.owner {
            sets.push(format!("owner = ?{}", values.len() + 1));
            values.push(owner.clone());
        }

        let sql = format!(
            "UPDATE project_nodes SET {} WHERE id = ?{}",
            sets.join(", "),
            values.len() + 1
        );
        values.push(id.to_string());

        self.conn
            .execute(&sql, rusqlite::params_from_iter(values.iter()))?;

        self.project_by_id(id)?
            .ok_or_else(|| Error::ProjectNotFound(project.name))
    }

    /// Delete a project; documents, versions, and edges cascade
    pub fn delete_project(&mut self, id: Ulid) -> Result<bool> {
        let changed = self
            .conn
            .execute("DELETE FROM project_nodes WHERE id = ?1", [id.to_string()])?;
        Ok(changed > 0)
    }

    // ----- documents -----

    pub fn document(&self, project_id: Ulid, doc_type: DocType) -> Result<Option<Document>> {
        Self::get_document(&self.conn, project_id, doc_type)
    }

    /// All eight documents of a project, ordered by doc type
    pub fn documents_for_project(&self, project_id: Ulid) -> Result<Vec<Document>> {
        let mut stmt = self
            .conn
            .prepare("SELECT * FROM documents WHERE project_id = ?1 ORDER BY doc_type")?;

        let docs = stmt
            .query_map([project_id.to_string()], Self::row_to_document)?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(docs)
    }

    /// Merge incoming content into a document slot
    ///
    /// One transaction: content overwrite, version increment, and the new
    /// snapshot commit together. The version counter never skips or
    /// collides.
    pub fn update_document(
        &mut self,
        project_id: Ulid,
        doc_type: DocType,
        content: &str,
        mode: Option<UpdateMode>,
        trigger: UpdateTrigger,
        change_summary: Option<&str>,
    ) -> Result<Document> {
        let tx = self.conn.transaction()?;

        let doc = Self::get_document(&tx, project_id, doc_type)?.ok_or(
            Error::DocumentNotFound {
                project_id,
                doc_type,
            },
        )?;

        let effective_mode = mode.unwrap_or(doc.update_mode);
        let new_content = document::merge(&doc.content, content, effective_mode);
        let new_version = doc.version + 1;
        let now = Utc::now();

        tx.execute(
            "UPDATE documents SET content = ?1, version = ?2, last_modified = ?3 WHERE id = ?4",
            params![
                new_content,
                new_version,
                now.to_rfc3339(),
                doc.id.to_string()
            ],
        )?;

        let summary = change_summary
            .map(str::to_string)
            .unwrap_or_else(|| format!("{} update to {}", effective_mode, doc_type));

        tx.execute(
            r#"
            INSERT INTO document_versions (id, document_id, content, change_summary, trigger, version_number, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            "#,
            params![
                Ulid::new().to_string(),
                doc.id.to_string(),
                new_content,
                summary,
                trigger.to_string(),
                new_version,
                now.to_rfc3339(),
            ],
        )?;

        tx.commit()?;
        debug!(doc = %doc_type, version = new_version, "document merged");

        Ok(Document {
            content: new_content,
            version: new_version,
            last_modified: now,
            ..doc
        })
    }

    fn get_document(
        conn: &Connection,
        project_id: Ulid,
        doc_type: DocType,
    ) -> Result<Option<Document>> {
        let mut stmt =
            conn.prepare("SELECT * FROM documents WHERE project_id = ?1 AND doc_type = ?2")?;
        let result = stmt.query_row(
            params![project_id.to_string(), doc_type.as_str()],
            Self::row_to_document,
        );

        match result {
            Ok(doc) => Ok(Some(doc)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    // ----- versions -----

    /// Version history of a document, newest first
    pub fn versions_for_document(&self, document_id: Ulid) -> Result<Vec<VersionInfo>> {
        let mut stmt = self.conn.prepare(
            r#"
            SELECT id, version_number, change_summary, trigger, created_at
            FROM document_versions
            WHERE document_id = ?1
            ORDER BY version_number DESC
            "#,
        )?;

        let versions = stmt
            .query_map([document_id.to_string()], |row| {
                let id_str: String = row.get("id")?;
                let trigger_str: String = row.get("trigger")?;
                let created_str: String = row.get("created_at")?;
                Ok(VersionInfo {
                    id: Ulid::from_string(&id_str).unwrap_or_else(|_| Ulid::new()),
                    version_number: row.get("version_number")?,
                    change_summary: row.get("change_summary")?,
                    trigger: match trigger_str.as_str() {
                        "auto" => UpdateTrigger::Auto,
                        _ => UpdateTrigger::Manual,
                    },
                    created_at: parse_timestamp(&created_str),
                })
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(versions)
    }

    /// Full content of one snapshot
    pub fn version_content(&self, version_id: Ulid) -> Result<Option<String>> {
        let mut stmt = self
            .conn
            .prepare("SELECT content FROM document_versions WHERE id = ?1")?;
        let result = stmt.query_row([version_id.to_string()], |row| row.get::<_, String>(0));

        match result {
            Ok(content) => Ok(Some(content)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    // ----- edges -----

    pub fn add_edge(&mut self, new: &NewEdge) -> Result<Edge> {
        let edge = Edge {
            id: Ulid::new(),
            from_id: new.from_id,
            to_id: new.to_id,
            edge_type: new.edge_type,
            description: new.description.clone(),
            strength: new.strength,
            bidirectional: new.bidirectional,
            created_at: Utc::now(),
        };

        self.conn.execute(
            r#"
            INSERT INTO project_edges (id, from_id, to_id, edge_type, description, strength, bidirectional, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
            "#,
            params![
                edge.id.to_string(),
                edge.from_id.to_string(),
                edge.to_id.to_string(),
                edge.edge_type.as_str(),
                edge.description,
                edge.strength,
                edge.bidirectional as i64,
                edge.created_at.to_rfc3339(),
            ],
        )?;

        Ok(edge)
    }

    /// All edges touching a project, incoming and outgoing
    pub fn edges_for_project(&self, project_id: Ulid) -> Result<Vec<Edge>> {
        let mut stmt = self
            .conn
            .prepare("SELECT * FROM project_edges WHERE from_id = ?1 OR to_id = ?1")?;

        let edges = stmt
            .query_map([project_id.to_string()], Self::row_to_edge)?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(edges)
    }

    pub fn delete_edge(&mut self, id: Ulid) -> Result<bool> {
        let changed = self
            .conn
            .execute("DELETE FROM project_edges WHERE id = ?1", [id.to_string()])?;
        Ok(changed > 0)
    }

    // ----- conversation logs -----

    pub fn log_conversation(
        &mut self,
        project_id: Option<Ulid>,
        summary: &str,
        updates_applied: &[AppliedUpdate],
        conversation_start: DateTime<Utc>,
        conversation_end: DateTime<Utc>,
    ) -> Result<ConversationLog> {
        let log = ConversationLog {
            id: Ulid::new(),
            project_id,
            summary: summary.to_string(),
            updates_applied: updates_applied.to_vec(),
            conversation_start,
            conversation_end,
        };

        self.conn.execute(
            r#"
            INSERT INTO conversation_logs (id, project_id, summary, updates_applied, conversation_start, conversation_end)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            "#,
            params![
                log.id.to_string(),
                log.project_id.map(|id| id.to_string()),
                log.summary,
                serde_json::to_string(&log.updates_applied)?,
                log.conversation_start.to_rfc3339(),
                log.conversation_end.to_rfc3339(),
            ],
        )?;

        Ok(log)
    }

    pub fn conversations_for_project(&self, project_id: Ulid) -> Result<Vec<ConversationLog>> {
        let mut stmt = self.conn.prepare(
            "SELECT * FROM conversation_logs WHERE project_id = ?1 ORDER BY conversation_end DESC",
        )?;

        let logs = stmt
            .query_map([project_id.to_string()], |row| {
                let id_str: String = row.get("id")?;
                let project_str: Option<String> = row.get("project_id")?;
                let updates_json: String = row.get("updates_applied")?;
                let start_str: String = row.get("conversation_start")?;
                let end_str: String = row.get("conversation_end")?;
                Ok(ConversationLog {
                    id: Ulid::from_string(&id_str).unwrap_or_else(|_| Ulid::new()),
                    project_id: project_str.and_then(|s| Ulid::from_string(&s).ok()),
                    summary: row.get("summary")?,
                    updates_applied: serde_json::from_str(&updates_json).unwrap_or_default(),
                    conversation_start: parse_timestamp(&start_str),
                    conversation_end: parse_timestamp(&end_str),
                })
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(logs)
    }

    // ----- search support -----

    /// Candidate documents for scoring, filtered, most recently touched first
    pub fn search_candidates(
        &self,
        project_id: Option<Ulid>,
        doc_types: &[DocType],
    ) -> Result<Vec<SearchCandidate>> {
        let mut sql = String::from(
            r#"
            SELECT d.project_id, p.name AS project_name, d.doc_type, d.content
            FROM documents d
            JOIN project_nodes p ON d.project_id = p.id
            WHERE 1=1
            "#,
        );
        let mut values: Vec<String> = Vec::new();

        if let Some(id) = project_id {
            values.push(id.to_string());
            sql.push_str(&format!(" AND d.project_id = ?{}", values.len()));
        }

        if !doc_types.is_empty() {
            let placeholders: Vec<String> = doc_types
                .iter()
                .map(|doc_type| {
                    values.push(doc_type.as_str().to_string());
                    format!("?{}", values.len())
                })
                .collect();
            sql.push_str(&format!(" AND d.doc_type IN ({})", placeholders.join(",")));
        }

        sql.push_str(" ORDER BY d.last_modified DESC");

        let mut stmt = self.conn.prepare(&sql)?;
        let candidates = stmt
            .query_map(rusqlite::params_from_iter(values.iter()), |row| {
                let project_str: String = row.get("project_id")?;
                let doc_type_str: String = row.get("doc_type")?;
                Ok(SearchCandidate {
                    project_id: Ulid::from_string(&project_str).unwrap_or_else(|_| Ulid::new()),
                    project_name: row.get("project_name")?,
                    doc_type: parse_doc_type(&doc_type_str),
                    content: row.get("content")?,
                })
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(candidates)
    }

    /// Database statistics
    pub fn stats(&self) -> Result<StoreStats> {
        let count = |table: &str| -> Result<usize> {
            let n: i64 = self
                .conn
                .query_row(&format!("SELECT COUNT(*) FROM {}", table), [], |row| {
                    row.get(0)
                })?;
            Ok(n as usize)
        };

        Ok(StoreStats {
            projects: count("project_nodes")?,
            documents: count("documents")?,
            edges: count("project_edges")?,
            versions: count("document_versions")?,
            conversations: count("conversation_logs")?,
        })
    }

    /// Raw statement escape hatch for test fixtures
    #[cfg(test)]
    pub(crate) fn execute_raw(&self, sql: &str) -> Result<()> {
        self.conn.execute_batch(sql)?;
        Ok(())
    }

    // ----- row converters -----

    fn row_to_project(row: &rusqlite::Row) -> rusqlite::Result<Project> {
        let id_str: String = row.get("id")?;
        let kind_str: String = row.get("kind")?;
        let tech_stack_json: String = row.get("tech_stack")?;
        let status_str: String = row.get("status")?;
        let created_str: String = row.get("created_at")?;
        let updated_str: String = row.get("updated_at")?;

        Ok(Project {
            id: Ulid::from_string(&id_str).unwrap_or_else(|_| Ulid::new()),
            name: row.get("name")?,
            display_name: row.get("display_name")?,
            path: row.get("path")?,
            kind: match kind_str.as_str() {
                "module" => ProjectKind::Module,
                _ => ProjectKind::Project,
            },
            tech_stack: serde_json::from_str(&tech_stack_json).unwrap_or_default(),
            owner: row.get("owner")?,
            status: match status_str.as_str() {
                "paused" => ProjectStatus::Paused,
                "archived" => ProjectStatus::Archived,
                _ => ProjectStatus::Active,
            },
            created_at: parse_timestamp(&created_str),
            updated_at: parse_timestamp(&updated_str),
        })
    }

    fn row_to_document(row: &rusqlite::Row) -> rusqlite::Result<Document> {
        let id_str: String = row.get("id")?;
        let project_str: String = row.get("project_id")?;
        let doc_type_str: String = row.get("doc_type")?;
        let mode_str: String = row.get("update_mode")?;
        let modified_str: String = row.get("last_modified")?;

        let doc_type = parse_doc_type(&doc_type_str);

        Ok(Document {
            id: Ulid::from_string(&id_str).unwrap_or_else(|_| Ulid::new()),
            project_id: Ulid::from_string(&project_str).unwrap_or_else(|_| Ulid::new()),
            doc_type,
            file_path: row.get("file_path")?,
            update_mode: match mode_str.as_str() {
                "upsert" => UpdateMode::Upsert,
                "append" => UpdateMode::Append,
                _ => doc_type.default_mode(),
            },
            content: row.get("content")?,
            version: row.get("version")?,
            last_modified: parse_timestamp(&modified_str),
        })
    }

    fn row_to_edge(row: &rusqlite::Row) -> rusqlite::Result<Edge> {
        let id_str: String = row.get("id")?;
        let from_str: String = row.get("from_id")?;
        let to_str: String = row.get("to_id")?;
        let type_str: String = row.get("edge_type")?;
        let bidirectional: i64 = row.get("bidirectional")?;
        let created_str: String = row.get("created_at")?;

        Ok(Edge {
            id: Ulid::from_string(&id_str).unwrap_or_else(|_| Ulid::new()),
            from_id: Ulid::from_string(&from_str).unwrap_or_else(|_| Ulid::new()),
            to_id: Ulid::from_string(&to_str).unwrap_or_else(|_| Ulid::new()),
            edge_type: match type_str.as_str() {
                "depends_on" => EdgeType::DependsOn,
                "uses" => EdgeType::Uses,
                "parent_child" => EdgeType::ParentChild,
                _ => EdgeType::Related,
            },
            description: row.get("description")?,
            strength: row.get("strength")?,
            bidirectional: bidirectional != 0,
            created_at: parse_timestamp(&created_str),
        })
    }
}

/// Columns are CHECK-constrained; unknown values fall back to `notes`
fn parse_doc_type(s: &str) -> DocType {
    match s {
        "todo" => DocType::Todo,
        "confirm" => DocType::Confirm,
        "progress" => DocType::Progress,
        "delays" => DocType::Delays,
        "prd" => DocType::Prd,
        "memory" => DocType::Memory,
        "qa" => DocType::Qa,
        _ => DocType::Notes,
    }
}

fn parse_timestamp(s: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(|_| Utc::now())
}
