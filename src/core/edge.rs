//! Edge - typed directed relation between two projects
//!
//! Multiple edges between the same ordered pair are allowed. The
//! bidirectional flag widens traversal neighborhoods; it does not change
//! how the edge is stored.

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ulid::Ulid;

use super::types::EdgeType;

/// A stored relation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Edge {
    /// Unique identifier (ULID)
    pub id: Ulid,

    pub from_id: Ulid,
    pub to_id: Ulid,

    pub edge_type: EdgeType,

    /// Free-text description of the relationship
    pub description: String,

    /// Relation strength in [0, 1]
    pub strength: f64,

    /// Traversal may cross this edge in either direction
    pub bidirectional: bool,

    pub created_at: DateTime<Utc>,
}

impl Edge {
    /// Whether the edge touches the given project on either end
    pub fn touches(&self, project_id: Ulid) -> bool {
        self.from_id == project_id || self.to_id == project_id
    }

    /// The endpoint that is not `project_id` (either end for self-loops)
    pub fn other_endpoint(&self, project_id: Ulid) -> Ulid {
        if self.from_id == project_id {
            self.to_id
        } else {
            self.from_id
        }
    }
}

/// Parameters for creating an edge
#[derive(Debug, Clone)]
pub struct NewEdge {
    pub from_id: Ulid,
    pub to_id: Ulid,
    pub edge_type: EdgeType,
    pub description: String,
    pub strength: f64,
    pub bidirectional: bool,
}

impl NewEdge {
    pub fn new(from_id: Ulid, to_id: Ulid, edge_type: EdgeType) -> Self {
        Self {
            from_id,
            to_id,
            edge_type,
            description: String::new(),
            strength: 0.5,
            bidirectional: false,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_strength(mut self, strength: f64) -> Self {
        self.strength = strength;
        self
    }

    pub fn bidirectional(mut self) -> Self {
        self.bidirectional = true;
        self
    }
}

/// Neighbor ids of a project across its edges, in edge order, deduplicated
///
/// Every edge contributes its opposite endpoint; a bidirectional edge
/// contributes both endpoints regardless of direction. The project itself
/// is never a neighbor.
pub fn neighbor_ids(edges: &[Edge], project_id: Ulid) -> Vec<Ulid> {
    let mut seen: HashSet<Ulid> = HashSet::new();
    let mut neighbors = Vec::new();

    for edge in edges {
        let mut candidates: Vec<Ulid> = Vec::with_capacity(2);
        if edge.from_id == project_id {
            candidates.push(edge.to_id);
        }
        if edge.to_id == project_id {
            candidates.push(edge.from_id);
        }
        if edge.bidirectional {
            candidates.push(edge.from_id);
            candidates.push(edge.to_id);
        }
        for id in candidates {
            if id != project_id && seen.insert(id) {
                neighbors.push(id);
            }
        }
    }

    neighbors
}

#[cfg(test)]
mod tests {
    use super::*;

    fn edge(from: Ulid, to: Ulid, bidirectional: bool) -> Edge {
        Edge {
            id: Ulid::new(),
            from_id: from,
            to_id: to,
            edge_type: EdgeType::Related,
            description: String::new(),
            strength: 0.5,
            bidirectional,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_neighbors_both_directions() {
        let (a, b, c) = (Ulid::new(), Ulid::new(), Ulid::new());
        let edges = vec![edge(a, b, false), edge(c, a, false)];

        let neighbors = neighbor_ids(&edges, a);
        assert_eq!(neighbors, vec![b, c]);
    }

    #[test]
    fn test_neighbors_deduplicated_in_edge_order() {
        let (a, b, c) = (Ulid::new(), Ulid::new(), Ulid::new());
        // Two parallel edges to b, then one to c
        let edges = vec![edge(a, b, false), edge(a, b, false), edge(a, c, false)];

        let neighbors = neighbor_ids(&edges, a);
        assert_eq!(neighbors, vec![b, c]);
    }

    #[test]
    fn test_bidirectional_adds_both_endpoints() {
        let (a, b, c) = (Ulid::new(), Ulid::new(), Ulid::new());
        // Edge between b and c, flagged bidirectional, in a's edge set
        let edges = vec![edge(b, c, true)];

        let neighbors = neighbor_ids(&edges, a);
        assert_eq!(neighbors, vec![b, c]);
    }

    #[test]
    fn test_self_never_a_neighbor() {
        let (a, b) = (Ulid::new(), Ulid::new());
        let edges = vec![edge(a, a, true), edge(a, b, false)];

        let neighbors = neighbor_ids(&edges, a);
        assert_eq!(neighbors, vec![b]);
    }

    #[test]
    fn test_other_endpoint() {
        let (a, b) = (Ulid::new(), Ulid::new());
        let e = edge(a, b, false);
        assert_eq!(e.other_endpoint(a), b);
        assert_eq!(e.other_endpoint(b), a);
    }
}
