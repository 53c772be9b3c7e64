//! MCP server for the project-memory knowledge base
//!
//! Implements the Model Context Protocol (JSON-RPC 2.0) server directly
//! over stdio, without external SDK dependencies.

use std::io::{BufRead, BufReader, Write};

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use super::tools::*;
use crate::config::Config;
use crate::core::ops::Ops;
use crate::core::store::Store;
use crate::core::types::{DocType, EdgeType, UpdateMode, UpdateTrigger};
use crate::mirror::Mirror;

/// JSON-RPC 2.0 Request
#[derive(Debug, Deserialize)]
struct JsonRpcRequest {
    #[allow(dead_code)]
    jsonrpc: String,
    id: Option<Value>,
    method: String,
    #[serde(default)]
    params: Value,
}

/// JSON-RPC 2.0 Response
#[derive(Debug, Serialize)]
struct JsonRpcResponse {
    jsonrpc: String,
    id: Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    result: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<JsonRpcError>,
}

#[derive(Debug, Serialize)]
struct JsonRpcError {
    code: i64,
    message: String,
}

impl JsonRpcResponse {
    fn success(id: Value, result: Value) -> Self {
        Self {
            jsonrpc: "2.0".to_string(),
            id,
            result: Some(result),
            error: None,
        }
    }

    fn error(id: Value, code: i64, message: String) -> Self {
        Self {
            jsonrpc: "2.0".to_string(),
            id,
            result: None,
            error: Some(JsonRpcError { code, message }),
        }
    }
}

/// MCP server handler
struct PmMcpServer {
    ops: Ops,
    initialized: bool,
}

impl PmMcpServer {
    fn new(ops: Ops) -> Self {
        Self {
            ops,
            initialized: false,
        }
    }

    /// Handle a JSON-RPC request
    fn handle_request(&mut self, request: &JsonRpcRequest) -> Option<JsonRpcResponse> {
        let id = request.id.clone().unwrap_or(Value::Null);

        // Notifications (no id) don't get responses
        if request.id.is_none() {
            match request.method.as_str() {
                "notifications/initialized" => {
                    self.initialized = true;
                    eprintln!("MCP: Client initialized");
                }
                "notifications/cancelled" => {
                    eprintln!("MCP: Request cancelled");
                }
                _ => {
                    eprintln!("MCP: Unknown notification: {}", request.method);
                }
            }
            return None;
        }

        let result = match request.method.as_str() {
            "initialize" => self.handle_initialize(&request.params),
            "tools/list" => self.handle_list_tools(&request.params),
            "tools/call" => self.handle_call_tool(&request.params),
            "ping" => Ok(json!({})),
            _ => Err((-32601, format!("Method not found: {}", request.method))),
        };

        Some(match result {
            Ok(value) => JsonRpcResponse::success(id, value),
            Err((code, msg)) => JsonRpcResponse::error(id, code, msg),
        })
    }

    fn handle_initialize(&self, _params: &Value) -> Result<Value, (i64, String)> {
        Ok(json!({
            "protocolVersion": "2024-11-05",
            "capabilities": {
                "tools": {
                    "listChanged": false
                }
            },
            "serverInfo": {
                "name": "pmem",
                "version": env!("CARGO_PKG_VERSION")
            },
            "instructions": "pmem is a project knowledge base. Use pm_project_context at the start of a conversation, pm_update to record document changes, and pm_search to find prior knowledge across projects."
        }))
    }

    fn handle_list_tools(&self, _params: &Value) -> Result<Value, (i64, String)> {
        Ok(json!({
            "tools": [
                {
                    "name": "pm_project_create",
                    "description": "Initialize a new project with 8 document templates (todo, confirm, progress, delays, prd, memory, notes, qa). Example: pm_project_create({\"name\": \"api-service\", \"path\": \"/workspace/api-service\", \"techStack\": [\"Rust\"]})",
                    "inputSchema": {
                        "type": "object",
                        "properties": {
                            "name": { "type": "string", "description": "Unique project slug (e.g. api-service)" },
                            "path": { "type": "string", "description": "Filesystem path to the project" },
                            "techStack": { "type": "array", "items": { "type": "string" }, "description": "Technology stack (e.g. [\"Rust\", \"SQLite\"])" },
                            "owner": { "type": "string", "description": "Owner of the project" },
                            "parentId": { "type": "string", "description": "Parent project ID or name for parent-child relationships" },
                            "displayName": { "type": "string", "description": "Human-readable project name" }
                        },
                        "required": ["name", "path"]
                    }
                },
                {
                    "name": "pm_update",
                    "description": "Manually update a specific document (upsert or append). Upsert replaces the section named by the first '## ' header; append grows the document. Every update creates a version snapshot.",
                    "inputSchema": {
                        "type": "object",
                        "properties": {
                            "projectId": { "type": "string", "description": "Project ID or name" },
                            "docType": {
                                "type": "string",
                                "enum": ["todo", "confirm", "progress", "delays", "prd", "memory", "notes", "qa"],
                                "description": "Document type to update"
                            },
                            "content": { "type": "string", "description": "Content to add/update" },
                            "mode": {
                                "type": "string",
                                "enum": ["upsert", "append"],
                                "description": "Update mode (defaults to doc type default)"
                            },
                            "changeSummary": { "type": "string", "description": "Recorded on the version snapshot" }
                        },
                        "required": ["projectId", "docType", "content"]
                    }
                },
                {
                    "name": "pm_auto_update",
                    "description": "Auto-classify and batch-update documents from a conversation summary. Routes to todo/progress/memory/delays/notes by keyword rules; unmatched summaries land in notes.",
                    "inputSchema": {
                        "type": "object",
                        "properties": {
                            "conversationSummary": { "type": "string", "description": "Summary of the conversation" },
                            "projectId": { "type": "string", "description": "Project ID or name" }
                        },
                        "required": ["conversationSummary"]
                    }
                },
                {
                    "name": "pm_project_context",
                    "description": "Get full project context including related projects for conversation injection",
                    "inputSchema": {
                        "type": "object",
                        "properties": {
                            "projectId": { "type": "string", "description": "Project ID or name" },
                            "includeRelated": { "type": "boolean", "description": "Include related projects", "default": false },
                            "maxDepth": { "type": "number", "description": "Max traversal depth for related projects", "default": 1 }
                        },
                        "required": ["projectId"]
                    }
                },
                {
                    "name": "pm_search",
                    "description": "Search across documents and projects using keyword matching",
                    "inputSchema": {
                        "type": "object",
                        "properties": {
                            "query": { "type": "string", "description": "Search query text" },
                            "projectId": { "type": "string", "description": "Limit search to specific project" },
                            "docTypes": {
                                "type": "array",
                                "items": { "type": "string", "enum": ["todo", "confirm", "progress", "delays", "prd", "memory", "notes", "qa"] },
                                "description": "Filter by document types"
                            },
                            "limit": { "type": "integer", "description": "Max results (default: 10)", "default": 10 }
                        },
                        "required": ["query"]
                    }
                },
                {
                    "name": "pm_dependency_add",
                    "description": "Create a directed, typed relation between two projects",
                    "inputSchema": {
                        "type": "object",
                        "properties": {
                            "fromId": { "type": "string", "description": "Source project ID or name" },
                            "toId": { "type": "string", "description": "Target project ID or name" },
                            "type": {
                                "type": "string",
                                "enum": ["depends_on", "uses", "related", "parent_child"],
                                "description": "Relationship type"
                            },
                            "description": { "type": "string", "description": "Description of the relationship" },
                            "strength": { "type": "number", "description": "Relation strength in [0, 1] (default: 0.5)" },
                            "bidirectional": { "type": "boolean", "description": "Traversal may cross the edge in either direction", "default": false }
                        },
                        "required": ["fromId", "toId", "type"]
                    }
                },
                {
                    "name": "pm_sync",
                    "description": "Sync all documents from the database to .md files on disk",
                    "inputSchema": {
                        "type": "object",
                        "properties": {
                            "projectId": { "type": "string", "description": "Project ID or name (omit to sync all projects)" }
                        }
                    }
                }
            ]
        }))
    }

    fn handle_call_tool(&mut self, params: &Value) -> Result<Value, (i64, String)> {
        let name = params["name"]
            .as_str()
            .ok_or((-32602, "Missing tool name".to_string()))?;
        let arguments = &params["arguments"];

        let result = match name {
            "pm_project_create" => self.do_project_create(arguments),
            "pm_update" => self.do_update(arguments),
            "pm_auto_update" => self.do_auto_update(arguments),
            "pm_project_context" => self.do_project_context(arguments),
            "pm_search" => self.do_search(arguments),
            "pm_dependency_add" => self.do_dependency_add(arguments),
            "pm_sync" => self.do_sync(arguments),
            _ => Err(format!("Unknown tool: {}", name)),
        };

        let (payload, is_error) = match result {
            Ok(value) => {
                let mut body = value.as_object().cloned().unwrap_or_default();
                body.insert("success".to_string(), Value::Bool(true));
                (Value::Object(body), false)
            }
            Err(e) => (json!({ "success": false, "error": e }), true),
        };

        let text =
            serde_json::to_string_pretty(&payload).unwrap_or_else(|_| payload.to_string());

        Ok(json!({
            "content": [{
                "type": "text",
                "text": text
            }],
            "isError": is_error
        }))
    }

    fn do_project_create(&mut self, args: &Value) -> Result<Value, String> {
        let tool_args: ProjectCreateTool =
            serde_json::from_value(args.clone()).map_err(|e| format!("Invalid params: {}", e))?;

        let parent_id = match &tool_args.parent_id {
            Some(ident) => Some(
                self.ops
                    .resolve_project(ident)
                    .map_err(|_| format!("Parent project \"{}\" not found", ident))?
                    .id,
            ),
            None => None,
        };

        let mut new =
            crate::core::project::NewProject::new(tool_args.name.as_str(), tool_args.path.as_str())
                .with_tech_stack(tool_args.tech_stack.clone());
        if let Some(display_name) = &tool_args.display_name {
            new = new.with_display_name(display_name.as_str());
        }
        if let Some(owner) = &tool_args.owner {
            new = new.with_owner(owner.as_str());
        }
        if let Some(parent_id) = parent_id {
            new = new.with_parent(parent_id);
        }

        let created = self.ops.create_project(&new).map_err(|e| e.to_string())?;

        Ok(json!({
            "project": {
                "id": created.project.id.to_string(),
                "name": created.project.name,
                "display_name": created.project.display_name,
                "path": created.project.path,
                "status": created.project.status.to_string(),
                "docs_directory": created.docs_dir,
                "documents": created.documents.iter().map(|d| json!({
                    "doc_type": d.doc_type.to_string(),
                    "update_mode": d.update_mode.to_string(),
                    "file_path": d.file_path,
                })).collect::<Vec<_>>(),
            }
        }))
    }

    fn do_update(&mut self, args: &Value) -> Result<Value, String> {
        let tool_args: UpdateTool =
            serde_json::from_value(args.clone()).map_err(|e| format!("Invalid params: {}", e))?;

        let doc_type: DocType = tool_args.doc_type.parse().map_err(|e| format!("{}", e))?;
        let mode: Option<UpdateMode> = match &tool_args.mode {
            Some(m) => Some(m.parse().map_err(|e| format!("{}", e))?),
            None => None,
        };

        let doc = self
            .ops
            .update_document(
                &tool_args.project_id,
                doc_type,
                &tool_args.content,
                mode,
                UpdateTrigger::Manual,
                tool_args.change_summary.as_deref(),
            )
            .map_err(|e| e.to_string())?;

        let preview: String = doc.content.chars().take(200).collect();

        Ok(json!({
            "document": {
                "doc_type": doc.doc_type.to_string(),
                "version": doc.version,
                "update_mode": doc.update_mode.to_string(),
                "last_modified": doc.last_modified.to_rfc3339(),
                "file_path": doc.file_path,
                "content_preview": preview,
            }
        }))
    }

    fn do_auto_update(&mut self, args: &Value) -> Result<Value, String> {
        let tool_args: AutoUpdateTool =
            serde_json::from_value(args.clone()).map_err(|e| format!("Invalid params: {}", e))?;

        let project_id = tool_args
            .project_id
            .as_deref()
            .ok_or_else(|| "Could not detect project. Please provide projectId.".to_string())?;

        let applied = self
            .ops
            .auto_update(&tool_args.conversation_summary, project_id)
            .map_err(|e| e.to_string())?;

        Ok(json!({ "updates": applied }))
    }

    fn do_project_context(&mut self, args: &Value) -> Result<Value, String> {
        let tool_args: ProjectContextTool =
            serde_json::from_value(args.clone()).map_err(|e| format!("Invalid params: {}", e))?;

        let markdown = self
            .ops
            .project_context(
                &tool_args.project_id,
                tool_args.include_related,
                tool_args.max_depth,
            )
            .map_err(|e| e.to_string())?;

        Ok(json!({ "context": markdown }))
    }

    fn do_search(&mut self, args: &Value) -> Result<Value, String> {
        let tool_args: SearchTool =
            serde_json::from_value(args.clone()).map_err(|e| format!("Invalid params: {}", e))?;

        let doc_types: Vec<DocType> = tool_args
            .doc_types
            .iter()
            .map(|s| s.parse().map_err(|e| format!("{}", e)))
            .collect::<Result<_, String>>()?;

        let hits = self
            .ops
            .search(
                &tool_args.query,
                tool_args.project_id.as_deref(),
                doc_types,
                tool_args.limit,
            )
            .map_err(|e| e.to_string())?;

        Ok(json!({ "results": hits }))
    }

    fn do_dependency_add(&mut self, args: &Value) -> Result<Value, String> {
        let tool_args: DependencyAddTool =
            serde_json::from_value(args.clone()).map_err(|e| format!("Invalid params: {}", e))?;

        let edge_type: EdgeType = tool_args.edge_type.parse().map_err(|e| format!("{}", e))?;

        let from = self
            .ops
            .resolve_project(&tool_args.from_id)
            .map_err(|_| format!("Source project \"{}\" not found", tool_args.from_id))?;
        let to = self
            .ops
            .resolve_project(&tool_args.to_id)
            .map_err(|_| format!("Target project \"{}\" not found", tool_args.to_id))?;

        let edge = self
            .ops
            .add_edge(
                &from.name,
                &to.name,
                edge_type,
                tool_args.description.as_deref(),
                tool_args.strength,
                tool_args.bidirectional,
            )
            .map_err(|e| e.to_string())?;

        Ok(json!({
            "edge": {
                "id": edge.id.to_string(),
                "from": from.name,
                "to": to.name,
                "type": edge.edge_type.to_string(),
                "description": edge.description,
                "strength": edge.strength,
                "bidirectional": edge.bidirectional,
            }
        }))
    }

    fn do_sync(&mut self, args: &Value) -> Result<Value, String> {
        let tool_args: SyncTool =
            serde_json::from_value(args.clone()).map_err(|e| format!("Invalid params: {}", e))?;

        let synced = self
            .ops
            .sync(tool_args.project_id.as_deref())
            .map_err(|e| e.to_string())?;

        if synced.is_empty() {
            return Err(match tool_args.project_id {
                Some(ident) => format!("Project \"{}\" not found", ident),
                None => "No projects found".to_string(),
            });
        }

        Ok(json!({
            "synced": synced.iter().map(|s| json!({
                "project": s.project_name,
                "docs_directory": s.docs_dir,
                "files": s.files,
            })).collect::<Vec<_>>(),
        }))
    }
}

/// Run the MCP server with STDIO transport
pub fn run_mcp_server(db_path: std::path::PathBuf) -> anyhow::Result<()> {
    eprintln!("pmem MCP server starting...");

    let config = Config::load().unwrap_or_default();
    let store = Store::open(&db_path)?;
    let mirror = Mirror::new(config.docs_dir());
    let mut server = PmMcpServer::new(Ops::new(store, mirror));

    let stdin = std::io::stdin();
    let mut stdout = std::io::stdout();
    let reader = BufReader::new(stdin.lock());

    for line in reader.lines() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }

        let preview: String = line.chars().take(100).collect();
        eprintln!("MCP: Received: {}", preview);

        let request: JsonRpcRequest = match serde_json::from_str(&line) {
            Ok(req) => req,
            Err(e) => {
                let response =
                    JsonRpcResponse::error(Value::Null, -32700, format!("Parse error: {}", e));
                let json = serde_json::to_string(&response)?;
                writeln!(stdout, "{}", json)?;
                stdout.flush()?;
                continue;
            }
        };

        if let Some(response) = server.handle_request(&request) {
            let json = serde_json::to_string(&response)?;
            writeln!(stdout, "{}", json)?;
            stdout.flush()?;
        }
    }

    eprintln!("pmem MCP server stopping.");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn server() -> (PmMcpServer, tempfile::TempDir) {
        let dir = tempfile::tempdir().unwrap();
        let ops = Ops::new(Store::open_memory().unwrap(), Mirror::new(dir.path()));
        (PmMcpServer::new(ops), dir)
    }

    fn call(server: &mut PmMcpServer, tool: &str, arguments: Value) -> (Value, bool) {
        let result = server
            .handle_call_tool(&json!({ "name": tool, "arguments": arguments }))
            .unwrap();
        let text = result["content"][0]["text"].as_str().unwrap();
        let payload: Value = serde_json::from_str(text).unwrap();
        (payload, result["isError"].as_bool().unwrap())
    }

    #[test]
    fn test_create_and_update_round_trip() {
        let (mut server, _dir) = server();

        let (created, is_error) = call(
            &mut server,
            "pm_project_create",
            json!({ "name": "api", "path": "/tmp/api", "techStack": ["Rust"] }),
        );
        assert!(!is_error);
        assert_eq!(created["success"], json!(true));
        assert_eq!(created["project"]["documents"].as_array().unwrap().len(), 8);

        let (updated, is_error) = call(
            &mut server,
            "pm_update",
            json!({ "projectId": "api", "docType": "todo", "content": "- [ ] ship" }),
        );
        assert!(!is_error);
        assert_eq!(updated["document"]["version"], json!(2));
    }

    #[test]
    fn test_duplicate_create_is_tool_error() {
        let (mut server, _dir) = server();
        call(
            &mut server,
            "pm_project_create",
            json!({ "name": "api", "path": "/tmp/api" }),
        );

        let (payload, is_error) = call(
            &mut server,
            "pm_project_create",
            json!({ "name": "api", "path": "/tmp/api2" }),
        );
        assert!(is_error);
        assert_eq!(payload["success"], json!(false));
        assert!(payload["error"].as_str().unwrap().contains("already exists"));
    }

    #[test]
    fn test_invalid_doc_type_is_tool_error() {
        let (mut server, _dir) = server();
        call(
            &mut server,
            "pm_project_create",
            json!({ "name": "api", "path": "/tmp/api" }),
        );

        let (payload, is_error) = call(
            &mut server,
            "pm_update",
            json!({ "projectId": "api", "docType": "journal", "content": "x" }),
        );
        assert!(is_error);
        assert!(payload["error"]
            .as_str()
            .unwrap()
            .contains("invalid doc type"));
    }

    #[test]
    fn test_context_and_search_tools() {
        let (mut server, _dir) = server();
        call(
            &mut server,
            "pm_project_create",
            json!({ "name": "api", "path": "/tmp/api" }),
        );
        call(
            &mut server,
            "pm_update",
            json!({ "projectId": "api", "docType": "notes", "content": "uses consistent hashing" }),
        );

        let (context, is_error) = call(
            &mut server,
            "pm_project_context",
            json!({ "projectId": "api" }),
        );
        assert!(!is_error);
        assert!(context["context"]
            .as_str()
            .unwrap()
            .contains("# Project: api"));

        let (results, is_error) =
            call(&mut server, "pm_search", json!({ "query": "hashing" }));
        assert!(!is_error);
        assert_eq!(results["results"].as_array().unwrap().len(), 1);
    }

    #[test]
    fn test_dependency_add_and_unknown_tool() {
        let (mut server, _dir) = server();
        call(
            &mut server,
            "pm_project_create",
            json!({ "name": "api", "path": "/tmp/api" }),
        );
        call(
            &mut server,
            "pm_project_create",
            json!({ "name": "rpc", "path": "/tmp/rpc" }),
        );

        let (edge, is_error) = call(
            &mut server,
            "pm_dependency_add",
            json!({ "fromId": "api", "toId": "rpc", "type": "depends_on" }),
        );
        assert!(!is_error);
        assert_eq!(edge["edge"]["from"], json!("api"));
        assert_eq!(edge["edge"]["to"], json!("rpc"));

        let (payload, is_error) = call(&mut server, "pm_nonexistent", json!({}));
        assert!(is_error);
        assert!(payload["error"].as_str().unwrap().contains("Unknown tool"));
    }

    #[test]
    fn test_request_dispatch() {
        let (mut server, _dir) = server();

        let request: JsonRpcRequest = serde_json::from_value(json!({
            "jsonrpc": "2.0", "id": 1, "method": "initialize", "params": {}
        }))
        .unwrap();
        let response = server.handle_request(&request).unwrap();
        assert!(response.error.is_none());

        let request: JsonRpcRequest = serde_json::from_value(json!({
            "jsonrpc": "2.0", "id": 2, "method": "tools/list"
        }))
        .unwrap();
        let response = server.handle_request(&request).unwrap();
        let tools = response.result.unwrap();
        assert_eq!(tools["tools"].as_array().unwrap().len(), 7);

        // Notifications get no response
        let request: JsonRpcRequest = serde_json::from_value(json!({
            "jsonrpc": "2.0", "method": "notifications/initialized"
        }))
        .unwrap();
        assert!(server.handle_request(&request).is_none());
        assert!(server.initialized);

        let request: JsonRpcRequest = serde_json::from_value(json!({
            "jsonrpc": "2.0", "id": 3, "method": "no/such/method"
        }))
        .unwrap();
        let response = server.handle_request(&request).unwrap();
        assert!(response.error.is_some());
    }
}
