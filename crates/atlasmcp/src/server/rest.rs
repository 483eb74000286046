//! REST facade over the shared data functions
//!
//! The same operations as the MCP tools, exposed as plain HTTP routes.
//! Failures collapse to HTTP 500 with an `{"error": message}` body; the
//! caller/vendor distinction is not surfaced at this layer.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use base64::Engine;
use serde::Deserialize;
use serde_json::{json, Map, Value};

use super::ServerState;
use crate::atlassian::{
    add_attachment_data, add_comment_data, bulk_edit_issues_data, create_page_data,
    delete_page_data, get_issue_data, get_page_data, list_pages_data, list_spaces_data,
    move_page_data, resolve_space, search_issues_data, search_pages_data, update_issue_data,
    update_page_data, UpdatePageParams,
};
use atlasmcp_core::atlassian::confluence::default_page_limit;
use atlasmcp_core::atlassian::jira::SearchCriteria;

type RestResult = (StatusCode, Json<Value>);

fn ok(value: Value) -> RestResult {
    (StatusCode::OK, Json(value))
}

fn bad_request(message: impl std::fmt::Display) -> RestResult {
    (
        StatusCode::BAD_REQUEST,
        Json(json!({ "error": message.to_string() })),
    )
}

fn internal(message: impl std::fmt::Display) -> RestResult {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({ "error": message.to_string() })),
    )
}

// --- Jira routes ---

pub async fn search_issues(
    State(state): State<ServerState>,
    Json(criteria): Json<SearchCriteria>,
) -> RestResult {
    match search_issues_data(&state.ctx.jira, criteria).await {
        Ok(output) => match serde_json::to_value(&output) {
            Ok(value) => ok(value),
            Err(e) => internal(e),
        },
        Err(e) => internal(e),
    }
}

pub async fn get_issue(
    State(state): State<ServerState>,
    Path(issue_key): Path<String>,
) -> RestResult {
    match get_issue_data(&state.ctx.jira, &issue_key).await {
        Ok(issue) => ok(issue),
        Err(e) => internal(e),
    }
}

#[derive(Debug, Deserialize)]
pub struct UpdateIssueBody {
    #[serde(rename = "issueKey")]
    issue_key: String,
    fields: Map<String, Value>,
}

pub async fn update_issue(
    State(state): State<ServerState>,
    Json(body): Json<UpdateIssueBody>,
) -> RestResult {
    if body.fields.is_empty() {
        return bad_request("fields must not be empty");
    }

    match update_issue_data(&state.ctx.jira, &body.issue_key, body.fields).await {
        Ok(()) => ok(json!({ "issueKey": body.issue_key, "updated": true })),
        Err(e) => internal(e),
    }
}

#[derive(Debug, Deserialize)]
pub struct BulkEditBody {
    #[serde(rename = "issueKeys")]
    issue_keys: Vec<String>,
    fields: Map<String, Value>,
    #[serde(rename = "sendBulkNotification", default)]
    send_bulk_notification: bool,
}

pub async fn bulk_edit_issues(
    State(state): State<ServerState>,
    Json(body): Json<BulkEditBody>,
) -> RestResult {
    if body.issue_keys.is_empty() {
        return bad_request("issueKeys must not be empty");
    }
    if body.fields.is_empty() {
        return bad_request("fields must not be empty");
    }

    match bulk_edit_issues_data(
        &state.ctx.jira,
        body.issue_keys,
        body.fields,
        body.send_bulk_notification,
    )
    .await
    {
        Ok(task_id) => ok(json!({ "taskId": task_id })),
        Err(e) => internal(e),
    }
}

// --- Confluence routes ---

#[derive(Debug, Deserialize)]
pub struct CreatePageBody {
    #[serde(rename = "spaceId")]
    space_id: Option<String>,
    #[serde(rename = "spaceKey")]
    space_key: Option<String>,
    title: String,
    body: String,
    #[serde(rename = "parentId")]
    parent_id: Option<String>,
}

pub async fn create_page(
    State(state): State<ServerState>,
    Json(body): Json<CreatePageBody>,
) -> RestResult {
    if body.space_id.is_none() && body.space_key.is_none() {
        return bad_request("either spaceId or spaceKey is required");
    }

    let space_id = match resolve_space(
        &state.ctx.confluence,
        body.space_id.as_deref(),
        body.space_key.as_deref(),
    )
    .await
    {
        Ok(id) => id,
        Err(e) => return internal(e),
    };

    match create_page_data(
        &state.ctx.confluence,
        &space_id,
        &body.title,
        &body.body,
        body.parent_id.as_deref(),
    )
    .await
    {
        Ok(page) => ok(page),
        Err(e) => internal(e),
    }
}

#[derive(Debug, Deserialize)]
pub struct GetPageQuery {
    #[serde(rename = "bodyFormat")]
    body_format: Option<String>,
}

pub async fn get_page(
    State(state): State<ServerState>,
    Path(page_id): Path<String>,
    Query(query): Query<GetPageQuery>,
) -> RestResult {
    let body_format = query.body_format.as_deref().unwrap_or("storage");

    match get_page_data(&state.ctx.confluence, &page_id, body_format).await {
        Ok(page) => ok(page),
        Err(e) => internal(e),
    }
}

#[derive(Debug, Deserialize)]
pub struct UpdatePageBody {
    title: Option<String>,
    body: Option<String>,
    version: u64,
    #[serde(rename = "parentId")]
    parent_id: Option<String>,
    message: Option<String>,
}

pub async fn update_page(
    State(state): State<ServerState>,
    Path(page_id): Path<String>,
    Json(body): Json<UpdatePageBody>,
) -> RestResult {
    let params = UpdatePageParams {
        page_id,
        title: body.title,
        body: body.body,
        version: body.version,
        parent_id: body.parent_id,
        message: body.message,
    };

    match update_page_data(&state.ctx.confluence, params).await {
        Ok(page) => ok(page),
        Err(e) => internal(e),
    }
}

pub async fn delete_page(
    State(state): State<ServerState>,
    Path(page_id): Path<String>,
) -> RestResult {
    match delete_page_data(&state.ctx.confluence, &page_id).await {
        Ok(()) => ok(json!({ "pageId": page_id, "deleted": true })),
        Err(e) => internal(e),
    }
}

#[derive(Debug, Deserialize)]
pub struct MovePageBody {
    #[serde(rename = "parentId")]
    parent_id: String,
    version: u64,
    message: Option<String>,
}

pub async fn move_page(
    State(state): State<ServerState>,
    Path(page_id): Path<String>,
    Json(body): Json<MovePageBody>,
) -> RestResult {
    match move_page_data(
        &state.ctx.confluence,
        &page_id,
        &body.parent_id,
        body.version,
        body.message.as_deref(),
    )
    .await
    {
        Ok(page) => ok(page),
        Err(e) => internal(e),
    }
}

#[derive(Debug, Deserialize)]
pub struct AddCommentBody {
    body: String,
}

pub async fn add_comment(
    State(state): State<ServerState>,
    Path(page_id): Path<String>,
    Json(body): Json<AddCommentBody>,
) -> RestResult {
    match add_comment_data(&state.ctx.confluence, &page_id, &body.body).await {
        Ok(comment) => ok(comment),
        Err(e) => internal(e),
    }
}

#[derive(Debug, Deserialize)]
pub struct AddAttachmentBody {
    filename: String,
    #[serde(rename = "contentBase64")]
    content_base64: String,
}

pub async fn add_attachment(
    State(state): State<ServerState>,
    Path(page_id): Path<String>,
    Json(body): Json<AddAttachmentBody>,
) -> RestResult {
    let bytes = match base64::engine::general_purpose::STANDARD.decode(&body.content_base64) {
        Ok(bytes) => bytes,
        Err(e) => return bad_request(format!("contentBase64 is not valid base64: {e}")),
    };

    match add_attachment_data(&state.ctx.confluence, &page_id, &body.filename, bytes).await {
        Ok(attachment) => ok(attachment),
        Err(e) => internal(e),
    }
}

#[derive(Debug, Deserialize)]
pub struct PagesQuery {
    #[serde(rename = "spaceId")]
    space_id: Option<String>,
    #[serde(rename = "spaceKey")]
    space_key: Option<String>,
    cql: Option<String>,
    limit: Option<u64>,
    cursor: Option<String>,
}

/// `GET /api/confluence/pages` doubles as list (by space) and search
/// (by CQL); the query parameters decide which.
pub async fn list_or_search_pages(
    State(state): State<ServerState>,
    Query(query): Query<PagesQuery>,
) -> RestResult {
    let limit = query.limit.unwrap_or_else(default_page_limit);

    if let Some(cql) = query.cql.as_deref() {
        return match search_pages_data(&state.ctx.confluence, cql, limit, query.cursor.as_deref())
            .await
        {
            Ok(results) => ok(results),
            Err(e) => internal(e),
        };
    }

    if query.space_id.is_none() && query.space_key.is_none() {
        return bad_request("either cql, spaceId, or spaceKey is required");
    }

    let space_id = match resolve_space(
        &state.ctx.confluence,
        query.space_id.as_deref(),
        query.space_key.as_deref(),
    )
    .await
    {
        Ok(id) => id,
        Err(e) => return internal(e),
    };

    match list_pages_data(
        &state.ctx.confluence,
        &space_id,
        limit,
        query.cursor.as_deref(),
    )
    .await
    {
        Ok(pages) => ok(pages),
        Err(e) => internal(e),
    }
}

#[derive(Debug, Deserialize)]
pub struct SpacesQuery {
    limit: Option<u64>,
    cursor: Option<String>,
}

pub async fn list_spaces(
    State(state): State<ServerState>,
    Query(query): Query<SpacesQuery>,
) -> RestResult {
    let limit = query.limit.unwrap_or_else(default_page_limit);

    match list_spaces_data(&state.ctx.confluence, limit, query.cursor.as_deref()).await {
        Ok(spaces) => ok(spaces),
        Err(e) => internal(e),
    }
}
