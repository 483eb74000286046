//! Update Jira issue fields, single and bulk

use crate::atlassian::{check_response, JiraClient};
use crate::prelude::*;
use serde::Deserialize;
use serde_json::{Map, Value};

/// Public data function - used by both the MCP tools and the REST facade.
///
/// Fields are an opaque map of vendor field names to JSON values, passed
/// straight through; the vendor schema is not modeled here.
pub async fn update_issue_data(
    jira: &JiraClient,
    issue_key: &str,
    fields: Map<String, Value>,
) -> Result<()> {
    let url = format!("{}/rest/api/3/issue/{issue_key}", jira.base_url);

    let payload = serde_json::json!({ "fields": fields });

    let response = jira
        .http
        .put(&url)
        .json(&payload)
        .send()
        .await
        .map_err(|e| eyre!("Failed to update issue: {}", e))?;

    check_response(response, "Failed to update issue").await?;

    Ok(())
}

#[derive(Debug, Deserialize)]
struct BulkEditResponse {
    #[serde(rename = "taskId")]
    task_id: Value,
}

/// Submit a bulk field edit for multiple issues. Returns the id of the
/// asynchronous task the vendor spawns to apply it.
pub async fn bulk_edit_issues_data(
    jira: &JiraClient,
    issue_keys: Vec<String>,
    fields: Map<String, Value>,
    send_bulk_notification: bool,
) -> Result<String> {
    let url = format!("{}/rest/api/3/bulk/issues/fields", jira.base_url);

    let payload = serde_json::json!({
        "selectedIssueIdsOrKeys": issue_keys,
        "fields": fields,
        "sendBulkNotification": send_bulk_notification,
    });

    let response = jira
        .http
        .post(&url)
        .json(&payload)
        .send()
        .await
        .map_err(|e| eyre!("Failed to submit bulk edit: {}", e))?;

    let response = check_response(response, "Failed to submit bulk edit").await?;

    let bulk: BulkEditResponse = response
        .json()
        .await
        .map_err(|e| eyre!("Failed to parse bulk edit response: {}", e))?;

    // The task id is numeric in some deployments and a string in others.
    Ok(match bulk.task_id {
        Value::String(s) => s,
        other => other.to_string(),
    })
}
