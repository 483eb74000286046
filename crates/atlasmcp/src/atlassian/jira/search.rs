//! Search Jira issues

use crate::atlassian::{check_response, JiraClient};
use crate::prelude::*;

use atlasmcp_core::atlassian::jira::{
    parse_page_token, summarize_assigned_issues, transform_search_response, JiraSearchResponse,
    SearchCriteria, SearchOutput,
};

/// Public data function - used by both the MCP tools and the REST facade.
///
/// Builds the JQL query from the criteria, issues a single search call,
/// and computes the offset-based pagination fields locally.
pub async fn search_issues_data(
    jira: &JiraClient,
    criteria: SearchCriteria,
) -> Result<SearchOutput> {
    let jql = criteria.build_jql();
    let url = format!("{}/rest/api/3/search", jira.base_url);

    // Page size is passed through as-is; the vendor's validation is
    // authoritative.
    let payload = serde_json::json!({
        "jql": jql,
        "maxResults": criteria.max_results,
        "startAt": criteria.start_at,
        "fields": ["*all"],
    });

    let response = jira
        .http
        .post(&url)
        .json(&payload)
        .send()
        .await
        .map_err(|e| eyre!("Failed to send request to Jira: {}", e))?;

    let response = check_response(response, "Jira API error").await?;

    let search_response: JiraSearchResponse = response
        .json()
        .await
        .map_err(|e| eyre!("Failed to parse Jira response: {}", e))?;

    Ok(transform_search_response(
        criteria.start_at,
        criteria.max_results,
        search_response,
    ))
}

/// Output for the assigned-issues operation: a one-line-per-issue text
/// summary plus the pagination token when another page exists.
#[derive(Debug, Clone)]
pub struct AssignedIssuesOutput {
    pub text: String,
    pub next_page_token: Option<String>,
}

/// Fetch issues assigned to the current user, paging by token.
pub async fn assigned_issues_data(
    jira: &JiraClient,
    max_results: u64,
    next_page_token: Option<String>,
) -> Result<AssignedIssuesOutput> {
    let criteria = SearchCriteria {
        assignee: Some("currentUser()".to_string()),
        max_results,
        start_at: parse_page_token(next_page_token.as_deref()),
        ..SearchCriteria::default()
    };

    let output = search_issues_data(jira, criteria).await?;
    let text = summarize_assigned_issues(&output.issues, output.next_page_token.as_deref());

    Ok(AssignedIssuesOutput {
        text,
        next_page_token: output.next_page_token,
    })
}
