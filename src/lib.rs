//! pmem - project-memory knowledge base
//!
//! Persistent knowledge base of projects, each holding eight typed markdown
//! documents, linked by typed directed edges, with automatic version
//! history and keyword search. Consumed by a tool-calling front-end over
//! MCP and by the `pmem` CLI.
//!
//! ## Key Concepts
//!
//! - **Eight document slots per project**: todo, confirm, progress, delays,
//!   prd, memory, notes, qa - seeded from templates at registration
//! - **Merge modes**: `append` grows a document, `upsert` replaces the
//!   section named by the first `##` header
//! - **Version history**: every merge snapshots the full content
//! - **Relation graph**: typed edges with cycle-safe bounded traversal

pub mod cli;
pub mod config;
pub mod core;
pub mod mcp;
pub mod mirror;

pub use crate::config::Config;
pub use crate::core::document::Document;
pub use crate::core::edge::Edge;
pub use crate::core::error::{Error, Result};
pub use crate::core::ops::Ops;
pub use crate::core::project::Project;
pub use crate::core::store::Store;
pub use crate::mcp::run_mcp_server;
pub use crate::mirror::Mirror;
