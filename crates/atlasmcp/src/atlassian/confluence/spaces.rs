//! Space listing and key resolution

use crate::atlassian::{check_response, ConfluenceClient};
use crate::prelude::*;
use serde_json::Value;

use atlasmcp_core::atlassian::confluence::resolve_space_id;

/// List spaces, cursor-paginated.
pub async fn list_spaces_data(
    confluence: &ConfluenceClient,
    limit: u64,
    cursor: Option<&str>,
) -> Result<Value> {
    let url = format!("{}/spaces", confluence.base_url);
    let limit_str = limit.to_string();

    let mut query = vec![("limit", limit_str.as_str())];
    if let Some(cursor) = cursor {
        query.push(("cursor", cursor));
    }

    let response = confluence
        .http
        .get(&url)
        .query(&query)
        .send()
        .await
        .map_err(|e| eyre!("Failed to list spaces: {}", e))?;

    let response = check_response(response, "Failed to list spaces").await?;

    response
        .json()
        .await
        .map_err(|e| eyre!("Failed to parse spaces response: {}", e))
}

/// Resolve a human-readable space key to the id the v2 page endpoints
/// require. Fails when the lookup returns zero results.
pub async fn get_space_id_from_key(
    confluence: &ConfluenceClient,
    space_key: &str,
) -> Result<String> {
    let url = format!("{}/spaces", confluence.base_url);

    let response = confluence
        .http
        .get(&url)
        .query(&[("keys", space_key)])
        .send()
        .await
        .map_err(|e| eyre!("Failed to look up space: {}", e))?;

    let response = check_response(response, "Failed to look up space").await?;

    let body: Value = response
        .json()
        .await
        .map_err(|e| eyre!("Failed to parse spaces response: {}", e))?;

    resolve_space_id(&body, space_key).map_err(|e| eyre!(e))
}

/// Resolve the space for a page operation from either an explicit id or a
/// human key. Exactly one must be supplied by the caller's validation.
pub async fn resolve_space(
    confluence: &ConfluenceClient,
    space_id: Option<&str>,
    space_key: Option<&str>,
) -> Result<String> {
    if let Some(id) = space_id {
        return Ok(id.to_string());
    }
    match space_key {
        Some(key) => get_space_id_from_key(confluence, key).await,
        None => Err(eyre!("Either spaceId or spaceKey must be provided")),
    }
}
