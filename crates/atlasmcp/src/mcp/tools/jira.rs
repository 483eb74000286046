//! Jira tool handlers
//!
//! Each handler deserializes the tool arguments, calls the shared data
//! function, and shapes the reply as MCP content.

use serde::Deserialize;
use serde_json::{Map, Value};

use super::{internal_error, invalid_params, json_result, parse_args, text_result, JsonRpcError};
use crate::atlassian::{
    assign_issue_data, assigned_issues_data, bulk_edit_issues_data, create_issue_data,
    get_issue_data, link_to_epic_data, search_issues_data, transition_issue_data,
    update_issue_data, CreateIssueParams, TransitionOutcome,
};
use atlasmcp_core::atlassian::jira::{format_issue_summary, SearchCriteria};

pub async fn handle_search_issues(
    arguments: Option<Value>,
    ctx: &crate::AppContext,
) -> Result<Value, JsonRpcError> {
    let criteria: SearchCriteria = parse_args(arguments)?;

    let output = search_issues_data(&ctx.jira, criteria)
        .await
        .map_err(internal_error)?;

    json_result(&output)
}

#[derive(Debug, Deserialize)]
struct GetAssignedIssuesArgs {
    #[serde(rename = "maxResults", default = "default_assigned_max_results")]
    max_results: u64,
    #[serde(rename = "nextPageToken")]
    next_page_token: Option<String>,
}

fn default_assigned_max_results() -> u64 {
    5
}

pub async fn handle_get_assigned_issues(
    arguments: Option<Value>,
    ctx: &crate::AppContext,
) -> Result<Value, JsonRpcError> {
    let args: GetAssignedIssuesArgs = parse_args(arguments)?;

    let output = assigned_issues_data(&ctx.jira, args.max_results, args.next_page_token)
        .await
        .map_err(internal_error)?;

    text_result(output.text)
}

#[derive(Debug, Deserialize)]
struct GetIssueByKeyArgs {
    #[serde(rename = "issueKey")]
    issue_key: String,
}

pub async fn handle_get_issue_by_key(
    arguments: Option<Value>,
    ctx: &crate::AppContext,
) -> Result<Value, JsonRpcError> {
    let args: GetIssueByKeyArgs = parse_args(arguments)?;

    let issue = get_issue_data(&ctx.jira, &args.issue_key)
        .await
        .map_err(internal_error)?;

    let fields = issue.get("fields").cloned().unwrap_or(Value::Null);
    text_result(format_issue_summary(&args.issue_key, &fields))
}

#[derive(Debug, Deserialize)]
struct TransitionIssueArgs {
    #[serde(rename = "issueKey")]
    issue_key: String,
    #[serde(rename = "transitionName")]
    transition_name: String,
}

pub async fn handle_transition_issue(
    arguments: Option<Value>,
    ctx: &crate::AppContext,
) -> Result<Value, JsonRpcError> {
    let args: TransitionIssueArgs = parse_args(arguments)?;

    let outcome = transition_issue_data(&ctx.jira, &args.issue_key, &args.transition_name)
        .await
        .map_err(internal_error)?;

    let text = match outcome {
        TransitionOutcome::Applied => format!(
            "Issue {} transitioned via '{}'",
            args.issue_key, args.transition_name
        ),
        TransitionOutcome::NotFound => format!(
            "Transition '{}' not found for issue {}",
            args.transition_name, args.issue_key
        ),
    };

    text_result(text)
}

#[derive(Debug, Deserialize)]
struct AssignIssueArgs {
    #[serde(rename = "issueKey")]
    issue_key: String,
    #[serde(rename = "accountId")]
    account_id: String,
}

pub async fn handle_assign_issue(
    arguments: Option<Value>,
    ctx: &crate::AppContext,
) -> Result<Value, JsonRpcError> {
    let args: AssignIssueArgs = parse_args(arguments)?;

    assign_issue_data(&ctx.jira, &args.issue_key, &args.account_id)
        .await
        .map_err(internal_error)?;

    text_result(format!(
        "Issue {} assigned to account {}",
        args.issue_key, args.account_id
    ))
}

#[derive(Debug, Deserialize)]
struct LinkToEpicArgs {
    #[serde(rename = "issueKey")]
    issue_key: String,
    #[serde(rename = "epicKey")]
    epic_key: String,
}

pub async fn handle_link_to_epic(
    arguments: Option<Value>,
    ctx: &crate::AppContext,
) -> Result<Value, JsonRpcError> {
    let args: LinkToEpicArgs = parse_args(arguments)?;

    link_to_epic_data(&ctx.jira, &args.issue_key, &args.epic_key)
        .await
        .map_err(internal_error)?;

    text_result(format!(
        "Issue {} linked to epic {}",
        args.issue_key, args.epic_key
    ))
}

#[derive(Debug, Deserialize)]
struct CreateIssueArgs {
    #[serde(rename = "projectKey")]
    project_key: String,
    summary: String,
    #[serde(rename = "issueType", default = "default_issue_type")]
    issue_type: String,
    description: Option<String>,
}

fn default_issue_type() -> String {
    "Task".to_string()
}

pub async fn handle_create_issue(
    arguments: Option<Value>,
    ctx: &crate::AppContext,
) -> Result<Value, JsonRpcError> {
    let args: CreateIssueArgs = parse_args(arguments)?;

    let params = CreateIssueParams {
        project_key: args.project_key,
        summary: args.summary,
        issue_type: args.issue_type,
        description: args.description,
    };

    let key = create_issue_data(&ctx.jira, params)
        .await
        .map_err(internal_error)?;

    text_result(format!("Created issue {key}"))
}

#[derive(Debug, Deserialize)]
struct UpdateIssueArgs {
    #[serde(rename = "issueKey")]
    issue_key: String,
    fields: Map<String, Value>,
}

pub async fn handle_update_issue(
    arguments: Option<Value>,
    ctx: &crate::AppContext,
) -> Result<Value, JsonRpcError> {
    let args: UpdateIssueArgs = parse_args(arguments)?;

    if args.fields.is_empty() {
        return Err(invalid_params("fields must not be empty"));
    }

    update_issue_data(&ctx.jira, &args.issue_key, args.fields)
        .await
        .map_err(internal_error)?;

    text_result(format!("Issue {} updated", args.issue_key))
}

#[derive(Debug, Deserialize)]
struct BulkEditIssuesArgs {
    #[serde(rename = "issueKeys")]
    issue_keys: Vec<String>,
    fields: Map<String, Value>,
    #[serde(rename = "sendBulkNotification", default)]
    send_bulk_notification: bool,
}

pub async fn handle_bulk_edit_issues(
    arguments: Option<Value>,
    ctx: &crate::AppContext,
) -> Result<Value, JsonRpcError> {
    let args: BulkEditIssuesArgs = parse_args(arguments)?;

    if args.issue_keys.is_empty() {
        return Err(invalid_params("issueKeys must not be empty"));
    }
    if args.fields.is_empty() {
        return Err(invalid_params("fields must not be empty"));
    }

    let task_id = bulk_edit_issues_data(
        &ctx.jira,
        args.issue_keys,
        args.fields,
        args.send_bulk_notification,
    )
    .await
    .map_err(internal_error)?;

    text_result(format!("Bulk edit submitted, task id: {task_id}"))
}
