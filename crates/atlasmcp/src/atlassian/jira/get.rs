//! Fetch a single Jira issue by key

use crate::atlassian::{check_response, JiraClient};
use crate::prelude::*;

/// Field list requested for single-issue reads.
const ISSUE_FIELDS: &str = "summary,description,status,assignee,reporter,priority,comment,project";

/// Public data function - used by both the MCP tools and the REST facade.
/// Returns the raw issue JSON; callers decide how to shape it.
pub async fn get_issue_data(jira: &JiraClient, issue_key: &str) -> Result<serde_json::Value> {
    let url = format!("{}/rest/api/3/issue/{issue_key}", jira.base_url);

    let response = jira
        .http
        .get(&url)
        .query(&[("fields", ISSUE_FIELDS)])
        .send()
        .await
        .map_err(|e| eyre!("Failed to send request to Jira: {}", e))?;

    let response = check_response(response, "Jira API error").await?;

    response
        .json()
        .await
        .map_err(|e| eyre!("Failed to parse Jira response: {}", e))
}
