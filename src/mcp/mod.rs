//! MCP (Model Context Protocol) server
//!
//! JSON-RPC 2.0 over stdio. The protocol layer translates tool calls into
//! operations on [`crate::core::ops::Ops`] and surfaces engine failures as
//! structured error payloads.

mod server;
mod tools;

pub use server::run_mcp_server;
