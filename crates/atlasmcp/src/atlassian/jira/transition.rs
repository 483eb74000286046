//! Issue status transitions, assignment, and epic linking

use crate::atlassian::{check_response, JiraClient};
use crate::prelude::*;

use atlasmcp_core::atlassian::jira::{find_transition, JiraTransitionsResponse};

/// Result of a transition attempt.
///
/// An unknown transition name is a normal outcome, not an error: the
/// mutation endpoint is never called and the caller reports it as text.
#[derive(Debug, Clone, PartialEq)]
pub enum TransitionOutcome {
    Applied,
    NotFound,
}

/// Transition an issue to a new status by transition display name.
///
/// Fetches the legal transitions for the issue first and matches the name
/// case-insensitively; only a match triggers the mutating call.
pub async fn transition_issue_data(
    jira: &JiraClient,
    issue_key: &str,
    transition_name: &str,
) -> Result<TransitionOutcome> {
    let url = format!("{}/rest/api/3/issue/{issue_key}/transitions", jira.base_url);

    let response = jira
        .http
        .get(&url)
        .send()
        .await
        .map_err(|e| eyre!("Failed to fetch transitions: {}", e))?;

    let response = check_response(response, "Failed to fetch transitions").await?;

    let transitions: JiraTransitionsResponse = response
        .json()
        .await
        .map_err(|e| eyre!("Failed to parse transitions response: {}", e))?;

    let Some(transition) = find_transition(&transitions.transitions, transition_name) else {
        return Ok(TransitionOutcome::NotFound);
    };

    let payload = serde_json::json!({
        "transition": { "id": transition.id },
    });

    let response = jira
        .http
        .post(&url)
        .json(&payload)
        .send()
        .await
        .map_err(|e| eyre!("Failed to apply transition: {}", e))?;

    check_response(response, "Failed to apply transition").await?;

    Ok(TransitionOutcome::Applied)
}

/// Assign an issue to a user by account id.
pub async fn assign_issue_data(jira: &JiraClient, issue_key: &str, account_id: &str) -> Result<()> {
    let url = format!("{}/rest/api/3/issue/{issue_key}/assignee", jira.base_url);

    let payload = serde_json::json!({ "accountId": account_id });

    let response = jira
        .http
        .put(&url)
        .json(&payload)
        .send()
        .await
        .map_err(|e| eyre!("Failed to assign issue: {}", e))?;

    check_response(response, "Failed to assign issue").await?;

    Ok(())
}

/// Link an issue to an epic by setting its parent.
pub async fn link_to_epic_data(jira: &JiraClient, issue_key: &str, epic_key: &str) -> Result<()> {
    let url = format!("{}/rest/api/3/issue/{issue_key}", jira.base_url);

    let payload = serde_json::json!({
        "fields": {
            "parent": { "key": epic_key },
        },
    });

    let response = jira
        .http
        .put(&url)
        .json(&payload)
        .send()
        .await
        .map_err(|e| eyre!("Failed to link issue to epic: {}", e))?;

    check_response(response, "Failed to link issue to epic").await?;

    Ok(())
}
