pub mod stdio;
pub mod tools;

use serde::{Deserialize, Serialize};

// JSON-RPC 2.0 types
#[derive(Debug, Deserialize)]
struct JsonRpcRequest {
    jsonrpc: String,
    id: Option<serde_json::Value>,
    method: String,
    params: Option<serde_json::Value>,
}

#[derive(Debug, Serialize)]
pub struct JsonRpcResponse {
    jsonrpc: String,
    id: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    result: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<JsonRpcError>,
}

#[derive(Debug, Serialize)]
pub struct JsonRpcError {
    pub code: i32,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,
}

// MCP Protocol types
#[derive(Debug, Serialize)]
pub struct Tool {
    pub name: String,
    pub description: String,
    #[serde(rename = "inputSchema")]
    pub input_schema: serde_json::Value,
}

/// Dispatch one JSON-RPC request string to the MCP method handlers.
pub async fn handle_request(request_str: &str, ctx: &crate::AppContext) -> JsonRpcResponse {
    let request: JsonRpcRequest = match serde_json::from_str(request_str) {
        Ok(req) => req,
        Err(e) => {
            return JsonRpcResponse {
                jsonrpc: "2.0".to_string(),
                id: None,
                result: None,
                error: Some(JsonRpcError {
                    code: -32700,
                    message: format!("Parse error: {e}"),
                    data: None,
                }),
            };
        }
    };

    let result = match request.method.as_str() {
        "initialize" => tools::handle_initialize(),
        "tools/list" => tools::handle_tools_list(),
        "tools/call" => tools::handle_tools_call(request.params, ctx).await,
        method => Err(JsonRpcError {
            code: -32601,
            message: format!("Method not found: {method}"),
            data: None,
        }),
    };

    match result {
        Ok(value) => JsonRpcResponse {
            jsonrpc: "2.0".to_string(),
            id: request.id,
            result: Some(value),
            error: None,
        },
        Err(error) => JsonRpcResponse {
            jsonrpc: "2.0".to_string(),
            id: request.id,
            result: None,
            error: Some(error),
        },
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

    #[tokio::test]
    async fn malformed_json_returns_parse_error() {
        let ctx = test_context();
        let response = handle_request("{not json", &ctx).await;

        let error = response.error.unwrap();
        assert_eq!(error.code, -32700);
        assert!(response.result.is_none());
        assert!(response.id.is_none());
    }

    #[tokio::test]
    async fn unknown_method_returns_method_not_found() {
        let ctx = test_context();
        let request = r#"{"jsonrpc":"2.0","id":7,"method":"resources/list"}"#;
        let response = handle_request(request, &ctx).await;

        let error = response.error.unwrap();
        assert_eq!(error.code, -32601);
        assert_eq!(response.id, Some(serde_json::json!(7)));
    }

    #[tokio::test]
    async fn initialize_reports_server_info() {
        let ctx = test_context();
        let request = r#"{"jsonrpc":"2.0","id":1,"method":"initialize","params":{}}"#;
        let response = handle_request(request, &ctx).await;

        let result = response.result.unwrap();
        assert_eq!(result["protocolVersion"], "2024-11-05");
        assert_eq!(result["serverInfo"]["name"], "atlasmcp");
    }

    #[tokio::test]
    async fn unknown_tool_returns_invalid_params() {
        let ctx = test_context();
        let request =
            r#"{"jsonrpc":"2.0","id":2,"method":"tools/call","params":{"name":"noSuchTool"}}"#;
        let response = handle_request(request, &ctx).await;

        let error = response.error.unwrap();
        assert_eq!(error.code, -32602);
        assert!(error.message.contains("noSuchTool"));
    }
}
