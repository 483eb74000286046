mod confluence;
mod jira;

use serde::{Deserialize, Serialize};
use serde_json::json;

// Re-export types needed by tool handlers
pub use super::{JsonRpcError, Tool};

// MCP Protocol types for tools
#[derive(Debug, Serialize)]
pub struct ServerInfo {
    pub name: String,
    pub version: String,
}

#[derive(Debug, Serialize)]
pub struct ServerCapabilities {
    pub tools: Option<ToolsCapability>,
}

#[derive(Debug, Serialize)]
pub struct ToolsCapability {}

#[derive(Debug, Serialize)]
pub struct InitializeResult {
    #[serde(rename = "protocolVersion")]
    pub protocol_version: String,
    pub capabilities: ServerCapabilities,
    #[serde(rename = "serverInfo")]
    pub server_info: ServerInfo,
}

#[derive(Debug, Serialize)]
pub struct ToolsList {
    pub tools: Vec<Tool>,
}

#[derive(Debug, Deserialize)]
pub struct CallToolParams {
    pub name: String,
    pub arguments: Option<serde_json::Value>,
}

#[derive(Debug, Serialize)]
pub struct CallToolResult {
    pub content: Vec<Content>,
    #[serde(rename = "isError", skip_serializing_if = "Option::is_none")]
    pub is_error: Option<bool>,
}

#[derive(Debug, Serialize)]
#[serde(tag = "type")]
pub enum Content {
    #[serde(rename = "text")]
    Text { text: String },
}

// --- Shared reply/error helpers for the tool handlers ---

pub fn invalid_params(message: impl std::fmt::Display) -> JsonRpcError {
    JsonRpcError {
        code: -32602,
        message: format!("Invalid arguments: {message}"),
        data: None,
    }
}

pub fn internal_error(message: impl std::fmt::Display) -> JsonRpcError {
    JsonRpcError {
        code: -32603,
        message: format!("Tool execution error: {message}"),
        data: None,
    }
}

/// Deserialize the `arguments` object into a typed argument struct.
/// Absent arguments are treated as an empty object so tools with only
/// optional fields can be called bare.
pub fn parse_args<T: serde::de::DeserializeOwned>(
    arguments: Option<serde_json::Value>,
) -> Result<T, JsonRpcError> {
    serde_json::from_value(arguments.unwrap_or_else(|| json!({}))).map_err(invalid_params)
}

/// Wrap a text reply in the MCP tool-result envelope.
pub fn text_result(text: String) -> Result<serde_json::Value, JsonRpcError> {
    let result = CallToolResult {
        content: vec![Content::Text { text }],
        is_error: None,
    };

    serde_json::to_value(result).map_err(|e| JsonRpcError {
        code: -32603,
        message: format!("Internal error: {e}"),
        data: None,
    })
}

/// Serialize a data value to pretty JSON and wrap it as a text reply.
pub fn json_result<T: Serialize>(data: &T) -> Result<serde_json::Value, JsonRpcError> {
    let json_string = serde_json::to_string_pretty(data).map_err(|e| JsonRpcError {
        code: -32603,
        message: format!("Serialization error: {e}"),
        data: None,
    })?;

    text_result(json_string)
}

pub fn handle_initialize() -> Result<serde_json::Value, JsonRpcError> {
    let result = InitializeResult {
        protocol_version: "2024-11-05".to_string(),
        capabilities: ServerCapabilities {
            tools: Some(ToolsCapability {}),
        },
        server_info: ServerInfo {
            name: "atlasmcp".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        },
    };

    serde_json::to_value(result).map_err(|e| JsonRpcError {
        code: -32603,
        message: format!("Internal error: {e}"),
        data: None,
    })
}

pub fn handle_tools_list() -> Result<serde_json::Value, JsonRpcError> {
    let tools = vec![
        Tool {
            name: "searchIssues".to_string(),
            description: "Search Jira issues by project, assignee, type, or custom JQL. Returns all fields for each issue. Supports offset pagination via startAt and nextPageToken.".to_string(),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "projectKey": { "type": "string", "description": "Project key to filter by (e.g., 'PROJ')" },
                    "assignee": { "type": "string", "description": "Assignee to filter by (e.g., 'currentUser()')" },
                    "issueType": { "type": "string", "description": "Issue type name to filter by (e.g., 'Bug')" },
                    "maxResults": { "type": "number", "description": "Page size (default: 20)" },
                    "startAt": { "type": "number", "description": "Zero-based offset of the first result (default: 0)" },
                    "jql": { "type": "string", "description": "Raw JQL query; overrides the filter fields when set" }
                },
                "required": []
            }),
        },
        Tool {
            name: "getAssignedIssues".to_string(),
            description: "Get Jira issues assigned to the current user as a one-line-per-issue summary. Use nextPageToken from the previous reply for pagination.".to_string(),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "maxResults": { "type": "number", "description": "Page size (default: 5)" },
                    "nextPageToken": { "type": "string", "description": "Token from the previous reply" }
                },
                "required": []
            }),
        },
        Tool {
            name: "getIssueByKey".to_string(),
            description: "Fetch a specific Jira issue by its key and return a text summary.".to_string(),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "issueKey": { "type": "string", "description": "Issue key (e.g., 'PROJ-123')" }
                },
                "required": ["issueKey"]
            }),
        },
        Tool {
            name: "transitionIssue".to_string(),
            description: "Transition a Jira issue to a new status by transition name (matched case-insensitively against the issue's legal transitions).".to_string(),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "issueKey": { "type": "string" },
                    "transitionName": { "type": "string", "description": "Display name of the transition (e.g., 'In Progress')" }
                },
                "required": ["issueKey", "transitionName"]
            }),
        },
        Tool {
            name: "assignIssue".to_string(),
            description: "Assign a Jira issue to a user by accountId.".to_string(),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "issueKey": { "type": "string" },
                    "accountId": { "type": "string" }
                },
                "required": ["issueKey", "accountId"]
            }),
        },
        Tool {
            name: "linkToEpic".to_string(),
            description: "Link a Jira issue (like a Story) to an Epic.".to_string(),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "issueKey": { "type": "string" },
                    "epicKey": { "type": "string" }
                },
                "required": ["issueKey", "epicKey"]
            }),
        },
        Tool {
            name: "createIssue".to_string(),
            description: "Create a new Jira issue in a project.".to_string(),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "projectKey": { "type": "string" },
                    "summary": { "type": "string" },
                    "issueType": { "type": "string", "description": "Issue type name (default: 'Task')" },
                    "description": { "type": "string" }
                },
                "required": ["projectKey", "summary"]
            }),
        },
        Tool {
            name: "updateIssue".to_string(),
            description: "Update one or more fields on a Jira issue. Fields are passed through to the vendor untyped.".to_string(),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "issueKey": { "type": "string" },
                    "fields": { "type": "object", "description": "Map of Jira field names to values" }
                },
                "required": ["issueKey", "fields"]
            }),
        },
        Tool {
            name: "bulkEditIssues".to_string(),
            description: "Bulk edit fields for multiple Jira issues. Uses the Jira v3 bulk edit endpoint and returns the spawned task id.".to_string(),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "issueKeys": { "type": "array", "items": { "type": "string" } },
                    "fields": { "type": "object" },
                    "sendBulkNotification": { "type": "boolean", "description": "Default: false" }
                },
                "required": ["issueKeys", "fields"]
            }),
        },
        Tool {
            name: "confluenceCreatePage".to_string(),
            description: "Create a Confluence page in a space. The body uses the storage representation. Provide spaceId, or spaceKey to have it resolved.".to_string(),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "spaceId": { "type": "string" },
                    "spaceKey": { "type": "string", "description": "Human-readable space key; resolved to an id when spaceId is absent" },
                    "title": { "type": "string" },
                    "body": { "type": "string", "description": "Page body in storage format" },
                    "parentId": { "type": "string" }
                },
                "required": ["title", "body"]
            }),
        },
        Tool {
            name: "confluenceGetPage".to_string(),
            description: "Get a Confluence page by id.".to_string(),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "pageId": { "type": "string" },
                    "bodyFormat": { "type": "string", "description": "Body representation to fetch (default: 'storage')" }
                },
                "required": ["pageId"]
            }),
        },
        Tool {
            name: "confluenceUpdatePage".to_string(),
            description: "Update a Confluence page. Absent title/body reuse the current values; version must match the vendor's current version number.".to_string(),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "pageId": { "type": "string" },
                    "title": { "type": "string" },
                    "body": { "type": "string", "description": "New body in storage format" },
                    "version": { "type": "number", "description": "New version number (current + 1)" },
                    "parentId": { "type": "string" },
                    "message": { "type": "string", "description": "Version message" }
                },
                "required": ["pageId", "version"]
            }),
        },
        Tool {
            name: "confluenceDeletePage".to_string(),
            description: "Delete a Confluence page by id.".to_string(),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "pageId": { "type": "string" }
                },
                "required": ["pageId"]
            }),
        },
        Tool {
            name: "confluenceListPages".to_string(),
            description: "List pages in a Confluence space, cursor-paginated.".to_string(),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "spaceId": { "type": "string" },
                    "spaceKey": { "type": "string" },
                    "limit": { "type": "number", "description": "Page size (default: 25)" },
                    "cursor": { "type": "string" }
                },
                "required": []
            }),
        },
        Tool {
            name: "confluenceSearchPages".to_string(),
            description: "Search Confluence pages using CQL (Confluence Query Language).".to_string(),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "cql": { "type": "string", "description": "CQL query (e.g., 'space = ENG AND text ~ \"keyword\"')" },
                    "limit": { "type": "number", "description": "Page size (default: 25)" },
                    "cursor": { "type": "string" }
                },
                "required": ["cql"]
            }),
        },
        Tool {
            name: "confluenceAddComment".to_string(),
            description: "Add a footer comment to a Confluence page. The body uses the storage representation.".to_string(),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "pageId": { "type": "string" },
                    "body": { "type": "string" }
                },
                "required": ["pageId", "body"]
            }),
        },
        Tool {
            name: "confluenceAddAttachment".to_string(),
            description: "Upload an attachment to a Confluence page. File content is base64-encoded.".to_string(),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "pageId": { "type": "string" },
                    "filename": { "type": "string" },
                    "contentBase64": { "type": "string", "description": "Base64-encoded file content" }
                },
                "required": ["pageId", "filename", "contentBase64"]
            }),
        },
        Tool {
            name: "confluenceListSpaces".to_string(),
            description: "List Confluence spaces, cursor-paginated.".to_string(),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "limit": { "type": "number", "description": "Page size (default: 25)" },
                    "cursor": { "type": "string" }
                },
                "required": []
            }),
        },
        Tool {
            name: "confluenceGetSpaceId".to_string(),
            description: "Resolve a Confluence space key (e.g., 'ENG') to the space id the v2 page endpoints require.".to_string(),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "spaceKey": { "type": "string" }
                },
                "required": ["spaceKey"]
            }),
        },
        Tool {
            name: "confluenceMovePage".to_string(),
            description: "Move a Confluence page under a new parent page, keeping its content. Version must match the vendor's current version number.".to_string(),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "pageId": { "type": "string" },
                    "parentId": { "type": "string", "description": "Id of the new parent page" },
                    "version": { "type": "number", "description": "New version number (current + 1)" },
                    "message": { "type": "string" }
                },
                "required": ["pageId", "parentId", "version"]
            }),
        },
    ];

    let result = ToolsList { tools };

    serde_json::to_value(result).map_err(|e| JsonRpcError {
        code: -32603,
        message: format!("Internal error: {e}"),
        data: None,
    })
}

pub async fn handle_tools_call(
    params: Option<serde_json::Value>,
    ctx: &crate::AppContext,
) -> Result<serde_json::Value, JsonRpcError> {
    let params: CallToolParams = serde_json::from_value(params.unwrap_or(serde_json::Value::Null))
        .map_err(|e| JsonRpcError {
            code: -32602,
            message: format!("Invalid params: {e}"),
            data: None,
        })?;

    match params.name.as_str() {
        "searchIssues" => jira::handle_search_issues(params.arguments, ctx).await,
        "getAssignedIssues" => jira::handle_get_assigned_issues(params.arguments, ctx).await,
        "getIssueByKey" => jira::handle_get_issue_by_key(params.arguments, ctx).await,
        "transitionIssue" => jira::handle_transition_issue(params.arguments, ctx).await,
        "assignIssue" => jira::handle_assign_issue(params.arguments, ctx).await,
        "linkToEpic" => jira::handle_link_to_epic(params.arguments, ctx).await,
        "createIssue" => jira::handle_create_issue(params.arguments, ctx).await,
        "updateIssue" => jira::handle_update_issue(params.arguments, ctx).await,
        "bulkEditIssues" => jira::handle_bulk_edit_issues(params.arguments, ctx).await,
        "confluenceCreatePage" => confluence::handle_create_page(params.arguments, ctx).await,
        "confluenceGetPage" => confluence::handle_get_page(params.arguments, ctx).await,
        "confluenceUpdatePage" => confluence::handle_update_page(params.arguments, ctx).await,
        "confluenceDeletePage" => confluence::handle_delete_page(params.arguments, ctx).await,
        "confluenceListPages" => confluence::handle_list_pages(params.arguments, ctx).await,
        "confluenceSearchPages" => confluence::handle_search_pages(params.arguments, ctx).await,
        "confluenceAddComment" => confluence::handle_add_comment(params.arguments, ctx).await,
        "confluenceAddAttachment" => confluence::handle_add_attachment(params.arguments, ctx).await,
        "confluenceListSpaces" => confluence::handle_list_spaces(params.arguments, ctx).await,
        "confluenceGetSpaceId" => confluence::handle_get_space_id(params.arguments, ctx).await,
        "confluenceMovePage" => confluence::handle_move_page(params.arguments, ctx).await,
        _ => Err(JsonRpcError {
            code: -32602,
            message: format!("Unknown tool: {}", params.name),
            data: None,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_context() -> crate::AppContext {
        crate::AppContext {
            global: crate::Global { verbose: false },
            jira: crate::atlassian::JiraClient {
                http: reqwest::Client::new(),
                base_url: "https://example.atlassian.net".to_string(),
            },
            confluence: crate::atlassian::ConfluenceClient {
                http: reqwest::Client::new(),
                base_url: "https://example.atlassian.net/wiki/api/v2".to_string(),
            },
        }
    }

    fn call_params(name: &str, arguments: serde_json::Value) -> Option<serde_json::Value> {
        Some(json!({ "name": name, "arguments": arguments }))
    }

    #[test]
    fn tools_list_exposes_every_operation() {
        let result = handle_tools_list().unwrap();
        let tools = result["tools"].as_array().unwrap();

        let names: Vec<&str> = tools
            .iter()
            .map(|tool| tool["name"].as_str().unwrap())
            .collect();

        for expected in [
            "searchIssues",
            "getAssignedIssues",
            "getIssueByKey",
            "transitionIssue",
            "assignIssue",
            "linkToEpic",
            "createIssue",
            "updateIssue",
            "bulkEditIssues",
            "confluenceCreatePage",
            "confluenceGetPage",
            "confluenceUpdatePage",
            "confluenceDeletePage",
            "confluenceListPages",
            "confluenceSearchPages",
            "confluenceAddComment",
            "confluenceAddAttachment",
            "confluenceListSpaces",
            "confluenceGetSpaceId",
            "confluenceMovePage",
        ] {
            assert!(names.contains(&expected), "missing tool: {expected}");
        }

        assert_eq!(tools.len(), 20);
    }

    #[test]
    fn every_tool_has_an_object_schema() {
        let result = handle_tools_list().unwrap();
        let tools = result["tools"].as_array().unwrap();

        for tool in tools {
            assert_eq!(tool["inputSchema"]["type"], "object", "{}", tool["name"]);
            assert!(tool["description"].as_str().unwrap().len() > 10);
        }
    }

    #[tokio::test]
    async fn update_issue_rejects_empty_fields() {
        let ctx = test_context();
        let params = call_params("updateIssue", json!({ "issueKey": "PROJ-1", "fields": {} }));

        let error = handle_tools_call(params, &ctx).await.unwrap_err();
        assert_eq!(error.code, -32602);
        assert!(error.message.contains("fields"));
    }

    #[tokio::test]
    async fn bulk_edit_rejects_empty_issue_keys() {
        let ctx = test_context();
        let params = call_params(
            "bulkEditIssues",
            json!({ "issueKeys": [], "fields": { "priority": { "name": "High" } } }),
        );

        let error = handle_tools_call(params, &ctx).await.unwrap_err();
        assert_eq!(error.code, -32602);
        assert!(error.message.contains("issueKeys"));
    }

    #[tokio::test]
    async fn create_page_requires_a_space_reference() {
        let ctx = test_context();
        let params = call_params(
            "confluenceCreatePage",
            json!({ "title": "T", "body": "<p>b</p>" }),
        );

        let error = handle_tools_call(params, &ctx).await.unwrap_err();
        assert_eq!(error.code, -32602);
        assert!(error.message.contains("spaceId"));
    }

    #[tokio::test]
    async fn add_attachment_rejects_invalid_base64() {
        let ctx = test_context();
        let params = call_params(
            "confluenceAddAttachment",
            json!({ "pageId": "123", "filename": "a.txt", "contentBase64": "%%%" }),
        );

        let error = handle_tools_call(params, &ctx).await.unwrap_err();
        assert_eq!(error.code, -32602);
        assert!(error.message.contains("base64"));
    }

    #[test]
    fn parse_args_treats_absent_arguments_as_empty_object() {
        let criteria: atlasmcp_core::atlassian::jira::SearchCriteria = parse_args(None).unwrap();
        assert_eq!(criteria.max_results, 20);
        assert_eq!(criteria.start_at, 0);
    }

    #[tokio::test]
    async fn missing_required_argument_is_invalid_params() {
        let ctx = test_context();
        let params = call_params("getIssueByKey", json!({}));

        let error = handle_tools_call(params, &ctx).await.unwrap_err();
        assert_eq!(error.code, -32602);
    }
}
