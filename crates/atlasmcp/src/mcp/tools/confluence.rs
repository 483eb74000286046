//! Confluence tool handlers

use base64::Engine;
use serde::Deserialize;
use serde_json::Value;

use super::{internal_error, invalid_params, json_result, parse_args, text_result, JsonRpcError};
use crate::atlassian::{
    add_attachment_data, add_comment_data, create_page_data, delete_page_data, get_page_data,
    list_pages_data, list_spaces_data, move_page_data, resolve_space, search_pages_data,
    update_page_data, UpdatePageParams,
};
use atlasmcp_core::atlassian::confluence::default_page_limit;

#[derive(Debug, Deserialize)]
struct CreatePageArgs {
    #[serde(rename = "spaceId")]
    space_id: Option<String>,
    #[serde(rename = "spaceKey")]
    space_key: Option<String>,
    title: String,
    body: String,
    #[serde(rename = "parentId")]
    parent_id: Option<String>,
}

pub async fn handle_create_page(
    arguments: Option<Value>,
    ctx: &crate::AppContext,
) -> Result<Value, JsonRpcError> {
    let args: CreatePageArgs = parse_args(arguments)?;

    if args.space_id.is_none() && args.space_key.is_none() {
        return Err(invalid_params("either spaceId or spaceKey is required"));
    }

    let space_id = resolve_space(
        &ctx.confluence,
        args.space_id.as_deref(),
        args.space_key.as_deref(),
    )
    .await
    .map_err(internal_error)?;

    let page = create_page_data(
        &ctx.confluence,
        &space_id,
        &args.title,
        &args.body,
        args.parent_id.as_deref(),
    )
    .await
    .map_err(internal_error)?;

    json_result(&page)
}

#[derive(Debug, Deserialize)]
struct GetPageArgs {
    #[serde(rename = "pageId")]
    page_id: String,
    #[serde(rename = "bodyFormat", default = "default_body_format")]
    body_format: String,
}

fn default_body_format() -> String {
    "storage".to_string()
}

pub async fn handle_get_page(
    arguments: Option<Value>,
    ctx: &crate::AppContext,
) -> Result<Value, JsonRpcError> {
    let args: GetPageArgs = parse_args(arguments)?;

    let page = get_page_data(&ctx.confluence, &args.page_id, &args.body_format)
        .await
        .map_err(internal_error)?;

    json_result(&page)
}

#[derive(Debug, Deserialize)]
struct UpdatePageArgs {
    #[serde(rename = "pageId")]
    page_id: String,
    title: Option<String>,
    body: Option<String>,
    version: u64,
    #[serde(rename = "parentId")]
    parent_id: Option<String>,
    message: Option<String>,
}

pub async fn handle_update_page(
    arguments: Option<Value>,
    ctx: &crate::AppContext,
) -> Result<Value, JsonRpcError> {
    let args: UpdatePageArgs = parse_args(arguments)?;

    let params = UpdatePageParams {
        page_id: args.page_id,
        title: args.title,
        body: args.body,
        version: args.version,
        parent_id: args.parent_id,
        message: args.message,
    };

    let page = update_page_data(&ctx.confluence, params)
        .await
        .map_err(internal_error)?;

    json_result(&page)
}

#[derive(Debug, Deserialize)]
struct DeletePageArgs {
    #[serde(rename = "pageId")]
    page_id: String,
}

pub async fn handle_delete_page(
    arguments: Option<Value>,
    ctx: &crate::AppContext,
) -> Result<Value, JsonRpcError> {
    let args: DeletePageArgs = parse_args(arguments)?;

    delete_page_data(&ctx.confluence, &args.page_id)
        .await
        .map_err(internal_error)?;

    text_result(format!("Page {} deleted", args.page_id))
}

#[derive(Debug, Deserialize)]
struct ListPagesArgs {
    #[serde(rename = "spaceId")]
    space_id: Option<String>,
    #[serde(rename = "spaceKey")]
    space_key: Option<String>,
    #[serde(default = "default_page_limit")]
    limit: u64,
    cursor: Option<String>,
}

pub async fn handle_list_pages(
    arguments: Option<Value>,
    ctx: &crate::AppContext,
) -> Result<Value, JsonRpcError> {
    let args: ListPagesArgs = parse_args(arguments)?;

    if args.space_id.is_none() && args.space_key.is_none() {
        return Err(invalid_params("either spaceId or spaceKey is required"));
    }

    let space_id = resolve_space(
        &ctx.confluence,
        args.space_id.as_deref(),
        args.space_key.as_deref(),
    )
    .await
    .map_err(internal_error)?;

    let pages = list_pages_data(
        &ctx.confluence,
        &space_id,
        args.limit,
        args.cursor.as_deref(),
    )
    .await
    .map_err(internal_error)?;

    json_result(&pages)
}

#[derive(Debug, Deserialize)]
struct SearchPagesArgs {
    cql: String,
    #[serde(default = "default_page_limit")]
    limit: u64,
    cursor: Option<String>,
}

pub async fn handle_search_pages(
    arguments: Option<Value>,
    ctx: &crate::AppContext,
) -> Result<Value, JsonRpcError> {
    let args: SearchPagesArgs = parse_args(arguments)?;

    let results = search_pages_data(
        &ctx.confluence,
        &args.cql,
        args.limit,
        args.cursor.as_deref(),
    )
    .await
    .map_err(internal_error)?;

    json_result(&results)
}

#[derive(Debug, Deserialize)]
struct AddCommentArgs {
    #[serde(rename = "pageId")]
    page_id: String,
    body: String,
}

pub async fn handle_add_comment(
    arguments: Option<Value>,
    ctx: &crate::AppContext,
) -> Result<Value, JsonRpcError> {
    let args: AddCommentArgs = parse_args(arguments)?;

    let comment = add_comment_data(&ctx.confluence, &args.page_id, &args.body)
        .await
        .map_err(internal_error)?;

    json_result(&comment)
}

#[derive(Debug, Deserialize)]
struct AddAttachmentArgs {
    #[serde(rename = "pageId")]
    page_id: String,
    filename: String,
    #[serde(rename = "contentBase64")]
    content_base64: String,
}

pub async fn handle_add_attachment(
    arguments: Option<Value>,
    ctx: &crate::AppContext,
) -> Result<Value, JsonRpcError> {
    let args: AddAttachmentArgs = parse_args(arguments)?;

    let bytes = base64::engine::general_purpose::STANDARD
        .decode(&args.content_base64)
        .map_err(|e| invalid_params(format!("contentBase64 is not valid base64: {e}")))?;

    let attachment = add_attachment_data(&ctx.confluence, &args.page_id, &args.filename, bytes)
        .await
        .map_err(internal_error)?;

    json_result(&attachment)
}

#[derive(Debug, Deserialize)]
struct ListSpacesArgs {
    #[serde(default = "default_page_limit")]
    limit: u64,
    cursor: Option<String>,
}

pub async fn handle_list_spaces(
    arguments: Option<Value>,
    ctx: &crate::AppContext,
) -> Result<Value, JsonRpcError> {
    let args: ListSpacesArgs = parse_args(arguments)?;

    let spaces = list_spaces_data(&ctx.confluence, args.limit, args.cursor.as_deref())
        .await
        .map_err(internal_error)?;

    json_result(&spaces)
}

#[derive(Debug, Deserialize)]
struct GetSpaceIdArgs {
    #[serde(rename = "spaceKey")]
    space_key: String,
}

pub async fn handle_get_space_id(
    arguments: Option<Value>,
    ctx: &crate::AppContext,
) -> Result<Value, JsonRpcError> {
    let args: GetSpaceIdArgs = parse_args(arguments)?;

    let space_id = crate::atlassian::get_space_id_from_key(&ctx.confluence, &args.space_key)
        .await
        .map_err(internal_error)?;

    text_result(space_id)
}

#[derive(Debug, Deserialize)]
struct MovePageArgs {
    #[serde(rename = "pageId")]
    page_id: String,
    #[serde(rename = "parentId")]
    parent_id: String,
    version: u64,
    message: Option<String>,
}

pub async fn handle_move_page(
    arguments: Option<Value>,
    ctx: &crate::AppContext,
) -> Result<Value, JsonRpcError> {
    let args: MovePageArgs = parse_args(arguments)?;

    let page = move_page_data(
        &ctx.confluence,
        &args.page_id,
        &args.parent_id,
        args.version,
        args.message.as_deref(),
    )
    .await
    .map_err(internal_error)?;

    json_result(&page)
}
