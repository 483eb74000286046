//! Confluence page operations (v2 API, storage representation)

use crate::atlassian::{check_response, ConfluenceClient};
use crate::prelude::*;
use serde_json::Value;

use atlasmcp_core::atlassian::confluence::{
    create_page_payload, extract_storage_body, merge_page_move, merge_page_update,
};

/// Create a page in a space. Returns the raw page JSON.
pub async fn create_page_data(
    confluence: &ConfluenceClient,
    space_id: &str,
    title: &str,
    body: &str,
    parent_id: Option<&str>,
) -> Result<Value> {
    let url = format!("{}/pages", confluence.base_url);
    let payload = create_page_payload(space_id, title, body, parent_id);

    let response = confluence
        .http
        .post(&url)
        .json(&payload)
        .send()
        .await
        .map_err(|e| eyre!("Failed to create page: {}", e))?;

    let response = check_response(response, "Failed to create page").await?;

    response
        .json()
        .await
        .map_err(|e| eyre!("Failed to parse page response: {}", e))
}

/// Fetch a page by id, with its body in the requested format.
pub async fn get_page_data(
    confluence: &ConfluenceClient,
    page_id: &str,
    body_format: &str,
) -> Result<Value> {
    let url = format!("{}/pages/{page_id}", confluence.base_url);

    let response = confluence
        .http
        .get(&url)
        .query(&[("body-format", body_format)])
        .send()
        .await
        .map_err(|e| eyre!("Failed to fetch page: {}", e))?;

    let response = check_response(response, "Failed to fetch page").await?;

    response
        .json()
        .await
        .map_err(|e| eyre!("Failed to parse page response: {}", e))
}

/// Parameters for a page update.
#[derive(Debug, Clone)]
pub struct UpdatePageParams {
    pub page_id: String,
    pub title: Option<String>,
    pub body: Option<String>,
    pub version: u64,
    pub parent_id: Option<String>,
    pub message: Option<String>,
}

/// Update a page.
///
/// The v2 endpoint requires the full representation, so the current page
/// is fetched first; absent or empty title/body reuse the fetched values
/// and the caller's version number is echoed for optimistic concurrency.
pub async fn update_page_data(
    confluence: &ConfluenceClient,
    params: UpdatePageParams,
) -> Result<Value> {
    let current = get_page_data(confluence, &params.page_id, "storage").await?;

    let payload = merge_page_update(
        &params.page_id,
        &current,
        params.title.as_deref(),
        params.body.as_deref(),
        params.version,
        params.parent_id.as_deref(),
        params.message.as_deref().unwrap_or("Updated page"),
    );

    put_page(confluence, &params.page_id, &payload).await
}

/// Move a page under a new parent, keeping its content unchanged.
pub async fn move_page_data(
    confluence: &ConfluenceClient,
    page_id: &str,
    new_parent_id: &str,
    version: u64,
    message: Option<&str>,
) -> Result<Value> {
    let current = get_page_data(confluence, page_id, "storage").await?;

    let payload = merge_page_move(
        page_id,
        &current,
        new_parent_id,
        version,
        message.unwrap_or("Moved page"),
    );

    put_page(confluence, page_id, &payload).await
}

async fn put_page(confluence: &ConfluenceClient, page_id: &str, payload: &Value) -> Result<Value> {
    let url = format!("{}/pages/{page_id}", confluence.base_url);

    let response = confluence
        .http
        .put(&url)
        .json(payload)
        .send()
        .await
        .map_err(|e| eyre!("Failed to update page: {}", e))?;

    let response = check_response(response, "Failed to update page").await?;

    response
        .json()
        .await
        .map_err(|e| eyre!("Failed to parse page response: {}", e))
}

/// Delete a page by id.
pub async fn delete_page_data(confluence: &ConfluenceClient, page_id: &str) -> Result<()> {
    let url = format!("{}/pages/{page_id}", confluence.base_url);

    let response = confluence
        .http
        .delete(&url)
        .send()
        .await
        .map_err(|e| eyre!("Failed to delete page: {}", e))?;

    check_response(response, "Failed to delete page").await?;

    Ok(())
}

/// List pages in a space, cursor-paginated.
pub async fn list_pages_data(
    confluence: &ConfluenceClient,
    space_id: &str,
    limit: u64,
    cursor: Option<&str>,
) -> Result<Value> {
    let url = format!("{}/pages", confluence.base_url);
    let limit_str = limit.to_string();

    let mut query = vec![("space-id", space_id), ("limit", limit_str.as_str())];
    if let Some(cursor) = cursor {
        query.push(("cursor", cursor));
    }

    let response = confluence
        .http
        .get(&url)
        .query(&query)
        .send()
        .await
        .map_err(|e| eyre!("Failed to list pages: {}", e))?;

    let response = check_response(response, "Failed to list pages").await?;

    response
        .json()
        .await
        .map_err(|e| eyre!("Failed to parse pages response: {}", e))
}

/// Search pages by CQL, cursor-paginated.
pub async fn search_pages_data(
    confluence: &ConfluenceClient,
    cql: &str,
    limit: u64,
    cursor: Option<&str>,
) -> Result<Value> {
    let url = format!("{}/pages/search", confluence.base_url);
    let limit_str = limit.to_string();

    let mut query = vec![("cql", cql), ("limit", limit_str.as_str())];
    if let Some(cursor) = cursor {
        query.push(("cursor", cursor));
    }

    let response = confluence
        .http
        .get(&url)
        .query(&query)
        .send()
        .await
        .map_err(|e| eyre!("Failed to search pages: {}", e))?;

    let response = check_response(response, "Failed to search pages").await?;

    response
        .json()
        .await
        .map_err(|e| eyre!("Failed to parse search response: {}", e))
}
