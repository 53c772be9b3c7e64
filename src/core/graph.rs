//! Graph context engine
//!
//! Assembles a project's documents, its edges, and a bounded-depth
//! breadth-first expansion of related projects. The visited set is threaded
//! through the whole traversal so cycles terminate and no project is
//! emitted twice. Also renders an assembled context as a deterministic
//! markdown transcript.

use std::collections::{HashSet, VecDeque};

use serde::Serialize;
use tracing::warn;
use ulid::Ulid;

use super::document::Document;
use super::edge::{neighbor_ids, Edge};
use super::error::{Error, Result};
use super::project::Project;
use super::store::Store;
use super::text::prefix_chars;
use super::types::DocType;

/// Traversal depth ceiling; requests beyond it are clamped
pub const MAX_TRAVERSAL_DEPTH: u32 = 5;

/// Related-project document excerpts are cut to this many characters
const EXCERPT_CHARS: usize = 300;

/// A project's assembled neighborhood
#[derive(Debug, Clone, Serialize)]
pub struct ProjectContext {
    pub project: Project,
    pub documents: Vec<Document>,
    pub edges: Vec<Edge>,
    /// Traversal discovery order
    pub related: Vec<RelatedProject>,
}

/// One related project with the edge that connected it
#[derive(Debug, Clone, Serialize)]
pub struct RelatedProject {
    pub project: Project,
    pub edge: Edge,
    pub documents: Vec<Document>,
}

/// Read-side engine over the store
pub struct GraphEngine<'a> {
    store: &'a Store,
}

impl<'a> GraphEngine<'a> {
    pub fn new(store: &'a Store) -> Self {
        Self { store }
    }

    /// Assemble the context of a project
    ///
    /// Always returns the project's documents and every edge touching it.
    /// With `include_related` and a positive depth, expands outward
    /// breadth-first, visiting each project at most once. Dangling edge
    /// references are skipped silently.
    pub fn context(
        &self,
        project_id: Ulid,
        include_related: bool,
        max_depth: u32,
    ) -> Result<ProjectContext> {
        let project = self
            .store
            .project_by_id(project_id)?
            .ok_or_else(|| Error::ProjectNotFound(project_id.to_string()))?;

        let documents = self.store.documents_for_project(project_id)?;
        let edges = self.store.edges_for_project(project_id)?;

        let mut related = Vec::new();
        if include_related && max_depth > 0 {
            let depth = if max_depth > MAX_TRAVERSAL_DEPTH {
                warn!(
                    requested = max_depth,
                    clamped = MAX_TRAVERSAL_DEPTH,
                    "traversal depth clamped"
                );
                MAX_TRAVERSAL_DEPTH
            } else {
                max_depth
            };
            self.collect_related(project_id, depth, &edges, &mut related)?;
        }

        Ok(ProjectContext {
            project,
            documents,
            edges,
            related,
        })
    }

    /// Breadth-first expansion with an explicit frontier queue
    fn collect_related(
        &self,
        root_id: Ulid,
        max_depth: u32,
        root_edges: &[Edge],
        result: &mut Vec<RelatedProject>,
    ) -> Result<()> {
        let mut visited: HashSet<Ulid> = HashSet::from([root_id]);
        // (project, remaining depth, that project's edge set)
        let mut frontier: VecDeque<(Ulid, u32, Vec<Edge>)> = VecDeque::new();
        frontier.push_back((root_id, max_depth, root_edges.to_vec()));

        while let Some((current_id, depth, current_edges)) = frontier.pop_front() {
            for neighbor_id in neighbor_ids(&current_edges, current_id) {
                if !visited.insert(neighbor_id) {
                    continue;
                }

                // Tolerate dangling references: skip, but stay visited
                let Some(neighbor) = self.store.project_by_id(neighbor_id)? else {
                    continue;
                };
                let documents = self.store.documents_for_project(neighbor_id)?;

                // Prefer an edge already known to the discovering project,
                // else re-query the neighbor's own edges
                let mut neighbor_edges: Option<Vec<Edge>> = None;
                let connecting = match current_edges.iter().find(|e| e.touches(neighbor_id)) {
                    Some(edge) => Some(edge.clone()),
                    None => {
                        let fetched = self.store.edges_for_project(neighbor_id)?;
                        let found = fetched.iter().find(|e| e.touches(current_id)).cloned();
                        neighbor_edges = Some(fetched);
                        found
                    }
                };

                if let Some(edge) = connecting {
                    result.push(RelatedProject {
                        project: neighbor,
                        edge,
                        documents,
                    });
                }

                if depth > 1 {
                    let edges = match neighbor_edges {
                        Some(edges) => edges,
                        None => self.store.edges_for_project(neighbor_id)?,
                    };
                    frontier.push_back((neighbor_id, depth - 1, edges));
                }
            }
        }

        Ok(())
    }

    /// Render an assembled context as a markdown transcript
    ///
    /// Reproducible byte-for-byte for the same context; the only store
    /// access is resolving edge endpoint names.
    pub fn render_markdown(&self, context: &ProjectContext) -> String {
        let mut lines: Vec<String> = Vec::new();

        let project = &context.project;
        lines.push(format!("# Project: {}", project.display_name));
        lines.push(format!("**Name:** {}", project.name));
        lines.push(format!("**Path:** {}", project.path));
        let tech = if project.tech_stack.is_empty() {
            "N/A".to_string()
        } else {
            project.tech_stack.join(", ")
        };
        lines.push(format!("**Tech Stack:** {}", tech));
        lines.push(format!("**Status:** {}", project.status));
        lines.push(String::new());

        for doc in &context.documents {
            if doc.content.trim().is_empty() {
                continue;
            }
            lines.push("---".to_string());
            lines.push(format!("## [{}]", doc.doc_type.as_str().to_uppercase()));
            lines.push(doc.content.clone());
            lines.push(String::new());
        }

        if !context.edges.is_empty() {
            lines.push("---".to_string());
            lines.push("## Dependencies & Relations".to_string());
            for edge in &context.edges {
                let direction = if edge.from_id == project.id {
                    "\u{2192}"
                } else {
                    "\u{2190}"
                };
                let other_id = edge.other_endpoint(project.id);
                let other_name = self
                    .store
                    .project_by_id(other_id)
                    .ok()
                    .flatten()
                    .map(|p| p.name)
                    .unwrap_or_else(|| other_id.to_string());
                let description = if edge.description.is_empty() {
                    "N/A"
                } else {
                    &edge.description
                };
                lines.push(format!(
                    "- {} **{}** ({}): {}",
                    direction, other_name, edge.edge_type, description
                ));
            }
            lines.push(String::new());
        }

        if !context.related.is_empty() {
            lines.push("---".to_string());
            lines.push("## Related Projects".to_string());
            for rel in &context.related {
                lines.push(format!(
                    "### {} ({})",
                    rel.project.display_name, rel.edge.edge_type
                ));
                if let Some(doc) = rel.documents.iter().find(|d| d.doc_type == DocType::Progress)
                {
                    lines.push(format!(
                        "**Progress:** {}...",
                        prefix_chars(&doc.content, EXCERPT_CHARS)
                    ));
                }
                if let Some(doc) = rel.documents.iter().find(|d| d.doc_type == DocType::Prd) {
                    lines.push(format!(
                        "**PRD:** {}...",
                        prefix_chars(&doc.content, EXCERPT_CHARS)
                    ));
                }
                lines.push(String::new());
            }
        }

        lines.join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::edge::NewEdge;
    use crate::core::project::NewProject;
    use crate::core::types::{EdgeType, UpdateTrigger};

    fn project(store: &mut Store, name: &str) -> Project {
        store
            .create_project(&NewProject::new(name, format!("/tmp/{}", name)))
            .unwrap()
    }

    fn link(store: &mut Store, from: Ulid, to: Ulid) {
        store
            .add_edge(&NewEdge::new(from, to, EdgeType::DependsOn))
            .unwrap();
    }

    #[test]
    fn test_context_without_related() -> Result<()> {
        let mut store = Store::open_memory()?;
        let p = project(&mut store, "solo");

        let engine = GraphEngine::new(&store);
        let ctx = engine.context(p.id, false, 1)?;

        assert_eq!(ctx.project.name, "solo");
        assert_eq!(ctx.documents.len(), 8);
        assert!(ctx.edges.is_empty());
        assert!(ctx.related.is_empty());

        Ok(())
    }

    #[test]
    fn test_unknown_root_is_not_found() -> Result<()> {
        let store = Store::open_memory()?;
        let engine = GraphEngine::new(&store);

        let err = engine.context(Ulid::new(), false, 1).unwrap_err();
        assert!(matches!(err, Error::ProjectNotFound(_)));

        Ok(())
    }

    #[test]
    fn test_related_includes_both_directions() -> Result<()> {
        let mut store = Store::open_memory()?;
        let api = project(&mut store, "api");
        let rpc = project(&mut store, "rpc");
        let frontend = project(&mut store, "frontend");

        link(&mut store, api.id, rpc.id);
        store
            .add_edge(&NewEdge::new(frontend.id, api.id, EdgeType::Uses))
            .unwrap();

        let engine = GraphEngine::new(&store);
        let ctx = engine.context(api.id, true, 1)?;

        assert_eq!(ctx.edges.len(), 2);
        let mut names: Vec<&str> = ctx.related.iter().map(|r| r.project.name.as_str()).collect();
        names.sort();
        assert_eq!(names, vec!["frontend", "rpc"]);
        for rel in &ctx.related {
            assert_eq!(rel.documents.len(), 8);
        }

        Ok(())
    }

    #[test]
    fn test_depth_limits_expansion() -> Result<()> {
        let mut store = Store::open_memory()?;
        let a = project(&mut store, "a");
        let b = project(&mut store, "b");
        let c = project(&mut store, "c");

        link(&mut store, a.id, b.id);
        link(&mut store, b.id, c.id);

        let engine = GraphEngine::new(&store);

        let ctx1 = engine.context(a.id, true, 1)?;
        assert_eq!(ctx1.related.len(), 1);
        assert_eq!(ctx1.related[0].project.name, "b");

        let ctx2 = engine.context(a.id, true, 2)?;
        let names: Vec<&str> = ctx2.related.iter().map(|r| r.project.name.as_str()).collect();
        assert_eq!(names, vec!["b", "c"]);

        Ok(())
    }

    #[test]
    fn test_depth_zero_and_disabled_expansion() -> Result<()> {
        let mut store = Store::open_memory()?;
        let a = project(&mut store, "a");
        let b = project(&mut store, "b");
        link(&mut store, a.id, b.id);

        let engine = GraphEngine::new(&store);
        assert!(engine.context(a.id, true, 0)?.related.is_empty());
        assert!(engine.context(a.id, false, 3)?.related.is_empty());

        Ok(())
    }

    #[test]
    fn test_cycles_terminate_without_duplicates() -> Result<()> {
        let mut store = Store::open_memory()?;
        let a = project(&mut store, "cycle-a");
        let b = project(&mut store, "cycle-b");

        store
            .add_edge(&NewEdge::new(a.id, b.id, EdgeType::Related))
            .unwrap();
        store
            .add_edge(&NewEdge::new(b.id, a.id, EdgeType::Related))
            .unwrap();

        let engine = GraphEngine::new(&store);
        let ctx = engine.context(a.id, true, 3)?;

        assert_eq!(ctx.related.len(), 1);
        assert_eq!(ctx.related[0].project.name, "cycle-b");

        Ok(())
    }

    #[test]
    fn test_bidirectional_edge_expands_against_direction() -> Result<()> {
        let mut store = Store::open_memory()?;
        let a = project(&mut store, "a");
        let b = project(&mut store, "b");
        let c = project(&mut store, "c");

        // c -> b, bidirectional: from b the traversal may still reach c
        link(&mut store, a.id, b.id);
        store
            .add_edge(&NewEdge::new(c.id, b.id, EdgeType::Related).bidirectional())
            .unwrap();

        let engine = GraphEngine::new(&store);
        let ctx = engine.context(a.id, true, 2)?;

        let names: Vec<&str> = ctx.related.iter().map(|r| r.project.name.as_str()).collect();
        assert_eq!(names, vec!["b", "c"]);

        Ok(())
    }

    #[test]
    fn test_dangling_edge_is_skipped() -> Result<()> {
        let mut store = Store::open_memory()?;
        let a = project(&mut store, "a");
        let b = project(&mut store, "b");
        link(&mut store, a.id, b.id);

        // Remove b behind the store's back so the edge dangles
        store.execute_raw("PRAGMA foreign_keys=OFF")?;
        store.execute_raw(&format!(
            "DELETE FROM project_nodes WHERE id = '{}'",
            b.id
        ))?;

        let engine = GraphEngine::new(&store);
        let ctx = engine.context(a.id, true, 2)?;

        assert_eq!(ctx.edges.len(), 1);
        assert!(ctx.related.is_empty());

        Ok(())
    }

    #[test]
    fn test_depth_is_clamped() -> Result<()> {
        let mut store = Store::open_memory()?;
        let chain: Vec<Project> = (0..8)
            .map(|i| project(&mut store, &format!("chain-{}", i)))
            .collect();
        for pair in chain.windows(2) {
            link(&mut store, pair[0].id, pair[1].id);
        }

        let engine = GraphEngine::new(&store);
        let ctx = engine.context(chain[0].id, true, 100)?;

        assert_eq!(ctx.related.len(), MAX_TRAVERSAL_DEPTH as usize);

        Ok(())
    }

    #[test]
    fn test_markdown_rendering_is_deterministic() -> Result<()> {
        let mut store = Store::open_memory()?;
        let api = store.create_project(
            &NewProject::new("api", "/tmp/api")
                .with_display_name("API Service")
                .with_tech_stack(vec!["Rust".to_string()]),
        )?;
        let rpc = project(&mut store, "rpc");
        store
            .add_edge(
                &NewEdge::new(api.id, rpc.id, EdgeType::DependsOn)
                    .with_description("API calls RPC"),
            )
            .unwrap();
        store.update_document(
            api.id,
            crate::core::types::DocType::Todo,
            "- [ ] ship it",
            None,
            UpdateTrigger::Manual,
            None,
        )?;

        let engine = GraphEngine::new(&store);
        let ctx = engine.context(api.id, true, 1)?;
        let md = engine.render_markdown(&ctx);

        assert!(md.contains("# Project: API Service"));
        assert!(md.contains("**Tech Stack:** Rust"));
        assert!(md.contains("## [TODO]"));
        assert!(md.contains("- [ ] ship it"));
        assert!(md.contains("## Dependencies & Relations"));
        assert!(md.contains("\u{2192} **rpc** (depends_on): API calls RPC"));
        assert!(md.contains("## Related Projects"));
        assert!(md.contains("**Progress:**"));

        assert_eq!(md, engine.render_markdown(&ctx));

        Ok(())
    }
}
