//! Transformation functions for Jira API requests and responses

use serde::{Deserialize, Serialize};

fn default_max_results() -> u64 {
    20
}

/// Filters accepted by the issue search operations.
///
/// `jql`, when set, overrides the three structured filter fields. When
/// neither is present the emitted query is empty, which Jira treats as
/// "all accessible issues".
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct SearchCriteria {
    #[serde(default, rename = "projectKey")]
    pub project_key: Option<String>,
    #[serde(default)]
    pub assignee: Option<String>,
    #[serde(default, rename = "issueType")]
    pub issue_type: Option<String>,
    #[serde(default = "default_max_results", rename = "maxResults")]
    pub max_results: u64,
    #[serde(default, rename = "startAt")]
    pub start_at: u64,
    #[serde(default)]
    pub jql: Option<String>,
}

impl Default for SearchCriteria {
    fn default() -> Self {
        Self {
            project_key: None,
            assignee: None,
            issue_type: None,
            max_results: default_max_results(),
            start_at: 0,
            jql: None,
        }
    }
}

impl SearchCriteria {
    /// Assemble the JQL query string.
    ///
    /// A raw `jql` value is used verbatim. Otherwise each present filter
    /// contributes a `field = 'value'` clause, joined with `AND`.
    pub fn build_jql(&self) -> String {
        if let Some(jql) = &self.jql {
            if !jql.is_empty() {
                return jql.clone();
            }
        }

        let mut clauses = Vec::new();
        if let Some(project_key) = &self.project_key {
            clauses.push(format!("project = '{project_key}'"));
        }
        if let Some(assignee) = &self.assignee {
            clauses.push(format!("assignee = '{assignee}'"));
        }
        if let Some(issue_type) = &self.issue_type {
            clauses.push(format!("issuetype = '{issue_type}'"));
        }

        clauses.join(" AND ")
    }
}

/// Computed pagination fields for an offset-based search page.
#[derive(Debug, Clone, PartialEq)]
pub struct Pagination {
    pub is_last: bool,
    pub next_page_token: Option<String>,
}

/// Compute the pagination fields from an offset, a page size, and the
/// vendor-reported total.
///
/// The token is the decimal string of the next offset, present only when
/// more pages remain. It is deliberately not an opaque cursor, so callers
/// may hand back arbitrary offsets; the addition saturates rather than
/// wrapping on extreme values.
pub fn paginate(start_at: u64, max_results: u64, total: u64) -> Pagination {
    let next_start = start_at.saturating_add(max_results);
    let is_last = next_start >= total;

    Pagination {
        is_last,
        next_page_token: if is_last {
            None
        } else {
            Some(next_start.to_string())
        },
    }
}

/// Parse a page token back into an offset. Absent or malformed tokens fall
/// back to the first page.
pub fn parse_page_token(token: Option<&str>) -> u64 {
    token.and_then(|t| t.parse().ok()).unwrap_or(0)
}

/// Search response from POST /rest/api/3/search.
///
/// Issues are passed through as opaque field bags; the vendor schema is
/// open-ended and versioned independently of this server.
#[derive(Debug, Deserialize, Clone)]
pub struct JiraSearchResponse {
    #[serde(default)]
    pub issues: Vec<serde_json::Value>,
    #[serde(default)]
    pub total: u64,
}

/// Output structure for the search operations.
#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct SearchOutput {
    pub issues: Vec<serde_json::Value>,
    pub total: u64,
    #[serde(rename = "startAt")]
    pub start_at: u64,
    #[serde(rename = "maxResults")]
    pub max_results: u64,
    #[serde(rename = "isLast")]
    pub is_last: bool,
    #[serde(rename = "nextPageToken", skip_serializing_if = "Option::is_none")]
    pub next_page_token: Option<String>,
}

/// Combine the echoed request window with the raw search response.
pub fn transform_search_response(
    start_at: u64,
    max_results: u64,
    response: JiraSearchResponse,
) -> SearchOutput {
    let pagination = paginate(start_at, max_results, response.total);

    SearchOutput {
        issues: response.issues,
        total: response.total,
        start_at,
        max_results,
        is_last: pagination.is_last,
        next_page_token: pagination.next_page_token,
    }
}

/// A single legal status change, from GET /rest/api/3/issue/{key}/transitions.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct JiraTransition {
    pub id: String,
    pub name: String,
}

/// Transitions response wrapper.
#[derive(Debug, Deserialize, Clone)]
pub struct JiraTransitionsResponse {
    #[serde(default)]
    pub transitions: Vec<JiraTransition>,
}

/// Find a transition by display name, case-insensitively.
///
/// A miss is a normal result, not an error: the caller reports it as
/// "not found" text without issuing the mutation.
pub fn find_transition<'a>(
    transitions: &'a [JiraTransition],
    name: &str,
) -> Option<&'a JiraTransition> {
    transitions
        .iter()
        .find(|t| t.name.eq_ignore_ascii_case(name))
}

/// One-line-per-issue summary for the assigned-issues tool.
///
/// Each line is `KEY: summary [Status]`; a trailing pagination hint is
/// appended when another page exists.
pub fn summarize_assigned_issues(
    issues: &[serde_json::Value],
    next_page_token: Option<&str>,
) -> String {
    let mut text = issues
        .iter()
        .map(|issue| {
            let key = issue.get("key").and_then(|k| k.as_str()).unwrap_or("");
            let fields = issue.get("fields");
            let summary = fields
                .and_then(|f| f.get("summary"))
                .and_then(|s| s.as_str())
                .unwrap_or("");
            let status = fields
                .and_then(|f| f.get("status"))
                .and_then(|s| s.get("name"))
                .and_then(|n| n.as_str())
                .unwrap_or("");
            format!("{key}: {summary} [{status}]")
        })
        .collect::<Vec<_>>()
        .join("\n");

    if let Some(token) = next_page_token {
        text.push_str(&format!("\n\nnextPageToken: {token}"));
    }

    text
}

/// Multi-line text summary of a single issue, from its raw field bag.
pub fn format_issue_summary(issue_key: &str, fields: &serde_json::Value) -> String {
    let summary = fields
        .get("summary")
        .and_then(|s| s.as_str())
        .unwrap_or("");
    let status = fields
        .get("status")
        .and_then(|s| s.get("name"))
        .and_then(|n| n.as_str())
        .unwrap_or("Unknown");
    let assignee = fields
        .get("assignee")
        .and_then(|a| a.get("displayName"))
        .and_then(|n| n.as_str())
        .unwrap_or("Unassigned");
    let priority = fields
        .get("priority")
        .and_then(|p| p.get("name"))
        .and_then(|n| n.as_str())
        .unwrap_or("None");
    let project = fields
        .get("project")
        .and_then(|p| p.get("name"))
        .and_then(|n| n.as_str())
        .unwrap_or("");

    format!(
        "{issue_key}: {summary}\nStatus: {status}\nAssignee: {assignee}\nPriority: {priority}\nProject: {project}"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn criteria() -> SearchCriteria {
        SearchCriteria::default()
    }

    #[test]
    fn test_build_jql_empty_when_no_filters() {
        // No filters, no raw JQL: the query matches everything
        assert_eq!(criteria().build_jql(), "");
    }

    #[test]
    fn test_build_jql_single_filter() {
        let c = SearchCriteria {
            project_key: Some("ABC".to_string()),
            ..criteria()
        };
        assert_eq!(c.build_jql(), "project = 'ABC'");
    }

    #[test]
    fn test_build_jql_joins_filters_with_and() {
        let c = SearchCriteria {
            project_key: Some("ABC".to_string()),
            assignee: Some("currentUser()".to_string()),
            issue_type: Some("Bug".to_string()),
            ..criteria()
        };
        assert_eq!(
            c.build_jql(),
            "project = 'ABC' AND assignee = 'currentUser()' AND issuetype = 'Bug'"
        );
    }

    #[test]
    fn test_build_jql_raw_query_overrides_filters() {
        let c = SearchCriteria {
            project_key: Some("ABC".to_string()),
            assignee: Some("alice".to_string()),
            issue_type: Some("Bug".to_string()),
            jql: Some("labels = backend ORDER BY created".to_string()),
            ..criteria()
        };
        assert_eq!(c.build_jql(), "labels = backend ORDER BY created");
    }

    #[test]
    fn test_build_jql_empty_raw_query_falls_back_to_filters() {
        let c = SearchCriteria {
            assignee: Some("alice".to_string()),
            jql: Some(String::new()),
            ..criteria()
        };
        assert_eq!(c.build_jql(), "assignee = 'alice'");
    }

    #[test]
    fn test_criteria_deserialization_defaults() {
        let c: SearchCriteria = serde_json::from_str("{}").unwrap();
        assert_eq!(c.max_results, 20);
        assert_eq!(c.start_at, 0);
        assert_eq!(c.project_key, None);
        assert_eq!(c.jql, None);
    }

    #[test]
    fn test_paginate_not_last() {
        let p = paginate(0, 2, 5);
        assert!(!p.is_last);
        assert_eq!(p.next_page_token, Some("2".to_string()));
    }

    #[test]
    fn test_paginate_last_page() {
        let p = paginate(4, 2, 5);
        assert!(p.is_last);
        assert_eq!(p.next_page_token, None);
    }

    #[test]
    fn test_paginate_exact_boundary() {
        // offset + pageSize == total is the last page
        let p = paginate(3, 2, 5);
        assert!(p.is_last);
        assert_eq!(p.next_page_token, None);
    }

    #[test]
    fn test_paginate_empty_result_set() {
        let p = paginate(0, 20, 0);
        assert!(p.is_last);
        assert_eq!(p.next_page_token, None);
    }

    #[test]
    fn test_paginate_token_is_decimal_offset() {
        let p = paginate(40, 20, 100);
        assert_eq!(p.next_page_token, Some("60".to_string()));
    }

    #[test]
    fn test_paginate_saturates_on_huge_offset() {
        // A tampered token can carry any offset, u64::MAX included
        let p = paginate(u64::MAX, 20, 5);
        assert!(p.is_last);
        assert_eq!(p.next_page_token, None);

        let p = paginate(u64::MAX - 1, u64::MAX, u64::MAX);
        assert!(p.is_last);
    }

    #[test]
    fn test_parse_page_token() {
        assert_eq!(parse_page_token(Some("40")), 40);
        assert_eq!(parse_page_token(Some("not-a-number")), 0);
        assert_eq!(parse_page_token(None), 0);
    }

    #[test]
    fn test_transform_search_response_pagination_fields() {
        let response = JiraSearchResponse {
            issues: vec![serde_json::json!({"key": "ABC-1"})],
            total: 5,
        };

        let output = transform_search_response(0, 2, response);

        assert_eq!(output.total, 5);
        assert_eq!(output.start_at, 0);
        assert_eq!(output.max_results, 2);
        assert!(!output.is_last);
        assert_eq!(output.next_page_token, Some("2".to_string()));
    }

    #[test]
    fn test_transform_search_response_last_page() {
        let response = JiraSearchResponse {
            issues: vec![],
            total: 5,
        };

        let output = transform_search_response(4, 2, response);

        assert!(output.is_last);
        assert_eq!(output.next_page_token, None);
    }

    #[test]
    fn test_search_output_omits_absent_token() {
        let output = transform_search_response(
            0,
            20,
            JiraSearchResponse {
                issues: vec![],
                total: 0,
            },
        );

        let json = serde_json::to_value(&output).unwrap();
        assert!(json.get("nextPageToken").is_none());
        assert_eq!(json["isLast"], serde_json::json!(true));
    }

    fn transitions() -> Vec<JiraTransition> {
        vec![
            JiraTransition {
                id: "11".to_string(),
                name: "In Progress".to_string(),
            },
            JiraTransition {
                id: "31".to_string(),
                name: "Done".to_string(),
            },
        ]
    }

    #[test]
    fn test_find_transition_case_insensitive() {
        let all = transitions();
        let found = find_transition(&all, "in progress").unwrap();
        assert_eq!(found.id, "11");

        let found = find_transition(&all, "DONE").unwrap();
        assert_eq!(found.id, "31");
    }

    #[test]
    fn test_find_transition_miss() {
        assert_eq!(find_transition(&transitions(), "Blocked"), None);
    }

    #[test]
    fn test_summarize_assigned_issues() {
        let issues = vec![
            serde_json::json!({
                "key": "ABC-1",
                "fields": {"summary": "Fix login", "status": {"name": "In Progress"}}
            }),
            serde_json::json!({
                "key": "ABC-2",
                "fields": {"summary": "Write docs", "status": {"name": "To Do"}}
            }),
        ];

        let text = summarize_assigned_issues(&issues, None);
        assert_eq!(
            text,
            "ABC-1: Fix login [In Progress]\nABC-2: Write docs [To Do]"
        );
    }

    #[test]
    fn test_summarize_assigned_issues_with_token() {
        let issues = vec![serde_json::json!({
            "key": "ABC-1",
            "fields": {"summary": "Fix login", "status": {"name": "Open"}}
        })];

        let text = summarize_assigned_issues(&issues, Some("5"));
        assert!(text.ends_with("\n\nnextPageToken: 5"));
    }

    #[test]
    fn test_summarize_assigned_issues_missing_fields() {
        let issues = vec![serde_json::json!({"key": "ABC-3"})];
        let text = summarize_assigned_issues(&issues, None);
        assert_eq!(text, "ABC-3:  []");
    }

    #[test]
    fn test_format_issue_summary_full() {
        let fields = serde_json::json!({
            "summary": "Fix login",
            "status": {"name": "In Progress"},
            "assignee": {"displayName": "Jane Smith"},
            "priority": {"name": "High"},
            "project": {"name": "Platform"}
        });

        let text = format_issue_summary("ABC-1", &fields);
        assert_eq!(
            text,
            "ABC-1: Fix login\nStatus: In Progress\nAssignee: Jane Smith\nPriority: High\nProject: Platform"
        );
    }

    #[test]
    fn test_format_issue_summary_defaults() {
        let fields = serde_json::json!({"summary": "Orphan issue"});
        let text = format_issue_summary("ABC-9", &fields);
        assert!(text.contains("Assignee: Unassigned"));
        assert!(text.contains("Priority: None"));
        assert!(text.contains("Status: Unknown"));
    }
}
