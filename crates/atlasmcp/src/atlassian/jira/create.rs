//! Create Jira issues

use crate::atlassian::{check_response, JiraClient};
use crate::prelude::*;
use serde::Deserialize;

/// Parameters for issue creation.
#[derive(Debug, Clone)]
pub struct CreateIssueParams {
    pub project_key: String,
    pub summary: String,
    pub issue_type: String,
    pub description: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CreatedIssue {
    key: String,
}

/// Build the POST /issue payload. `description` is omitted entirely when
/// absent; Jira treats an explicit null differently from a missing key.
fn create_issue_payload(params: &CreateIssueParams) -> serde_json::Value {
    let mut fields = serde_json::json!({
        "project": { "key": params.project_key },
        "summary": params.summary,
        "issuetype": { "name": params.issue_type },
    });
    if let Some(description) = &params.description {
        fields["description"] = serde_json::json!(description);
    }

    serde_json::json!({ "fields": fields })
}

/// Public data function - used by both the MCP tools and the REST facade.
/// Returns the vendor-assigned key of the new issue.
pub async fn create_issue_data(jira: &JiraClient, params: CreateIssueParams) -> Result<String> {
    let url = format!("{}/rest/api/3/issue", jira.base_url);

    let payload = create_issue_payload(&params);

    let response = jira
        .http
        .post(&url)
        .json(&payload)
        .send()
        .await
        .map_err(|e| eyre!("Failed to create issue: {}", e))?;

    let response = check_response(response, "Failed to create issue").await?;

    let created: CreatedIssue = response
        .json()
        .await
        .map_err(|e| eyre!("Failed to parse create response: {}", e))?;

    Ok(created.key)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params() -> CreateIssueParams {
        CreateIssueParams {
            project_key: "ABC".to_string(),
            summary: "Fix login".to_string(),
            issue_type: "Task".to_string(),
            description: None,
        }
    }

    #[test]
    fn test_payload_omits_absent_description() {
        let payload = create_issue_payload(&params());
        assert!(payload["fields"].get("description").is_none());
        assert_eq!(payload["fields"]["project"]["key"], "ABC");
        assert_eq!(payload["fields"]["summary"], "Fix login");
        assert_eq!(payload["fields"]["issuetype"]["name"], "Task");
    }

    #[test]
    fn test_payload_carries_present_description() {
        let payload = create_issue_payload(&CreateIssueParams {
            description: Some("Steps to reproduce".to_string()),
            ..params()
        });
        assert_eq!(payload["fields"]["description"], "Steps to reproduce");
    }
}
