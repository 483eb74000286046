//! Transformation functions for the Confluence v2 API
//!
//! The v2 page endpoints take a full representation on update, not a
//! partial patch, so the merge helpers here rebuild the complete payload
//! from a previously fetched page. Bodies always use the "storage"
//! representation and are passed through verbatim.

use serde_json::{json, Value};

/// Errors from named lookups against Confluence replies.
#[derive(thiserror::Error, Debug, PartialEq)]
pub enum LookupError {
    #[error("No space found with key '{0}'")]
    SpaceNotFound(String),
}

/// Extract the storage-format body value from a fetched page.
///
/// Falls back to `body.value` for replies that inline the value, and to
/// the empty string when the page was fetched without a body.
pub fn extract_storage_body(page: &Value) -> String {
    page.get("body")
        .and_then(|b| {
            b.get("storage")
                .and_then(|s| s.get("value"))
                .or_else(|| b.get("value"))
        })
        .and_then(|v| v.as_str())
        .unwrap_or("")
        .to_string()
}

/// Build the POST /pages payload for page creation.
pub fn create_page_payload(
    space_id: &str,
    title: &str,
    body: &str,
    parent_id: Option<&str>,
) -> Value {
    let mut payload = json!({
        "spaceId": space_id,
        "title": title,
        "body": {
            "representation": "storage",
            "value": body,
        },
    });
    if let Some(parent_id) = parent_id {
        payload["parentId"] = json!(parent_id);
    }
    payload
}

/// Build the full PUT /pages/{id} payload for an update.
///
/// The vendor requires the complete representation: status, title, and
/// body absent from the request are reused from the fetched `current`
/// page, and the caller's `version` is echoed for optimistic concurrency.
/// An empty title or body counts as absent; a page cannot be blanked
/// through this operation.
pub fn merge_page_update(
    page_id: &str,
    current: &Value,
    title: Option<&str>,
    body: Option<&str>,
    version: u64,
    parent_id: Option<&str>,
    message: &str,
) -> Value {
    let status = current
        .get("status")
        .and_then(|s| s.as_str())
        .unwrap_or("current");
    let current_title = current.get("title").and_then(|t| t.as_str()).unwrap_or("");
    let current_body = extract_storage_body(current);

    let title = title.filter(|t| !t.is_empty());
    let body = body.filter(|b| !b.is_empty());

    let mut payload = json!({
        "id": page_id,
        "status": status,
        "title": title.unwrap_or(current_title),
        "body": {
            "representation": "storage",
            "value": body.unwrap_or(&current_body),
        },
        "version": {
            "number": version,
            "message": message,
        },
    });
    if let Some(parent_id) = parent_id {
        payload["parentId"] = json!(parent_id);
    }
    payload
}

/// Build the PUT payload that reparents a page without changing its content.
pub fn merge_page_move(
    page_id: &str,
    current: &Value,
    new_parent_id: &str,
    version: u64,
    message: &str,
) -> Value {
    merge_page_update(
        page_id,
        current,
        None,
        None,
        version,
        Some(new_parent_id),
        message,
    )
}

/// Build the POST payload for a footer comment on a page.
pub fn comment_payload(page_id: &str, body: &str) -> Value {
    json!({
        "pageId": page_id,
        "body": {
            "representation": "storage",
            "value": body,
        },
    })
}

/// Resolve a human-readable space key to the space id required by the
/// id-based v2 endpoints, from a raw GET /spaces?keys= reply.
pub fn resolve_space_id(response: &Value, space_key: &str) -> Result<String, LookupError> {
    response
        .get("results")
        .and_then(|r| r.as_array())
        .and_then(|results| results.first())
        .and_then(|space| space.get("id"))
        .and_then(|id| match id {
            Value::String(s) => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        })
        .ok_or_else(|| LookupError::SpaceNotFound(space_key.to_string()))
}

/// Default page size for the cursor-paginated list endpoints.
pub fn default_page_limit() -> u64 {
    25
}

#[cfg(test)]
mod tests {
    use super::*;

    fn current_page() -> Value {
        json!({
            "id": "12345",
            "status": "current",
            "title": "Release Notes",
            "body": {
                "storage": {
                    "representation": "storage",
                    "value": "<p>existing body</p>"
                }
            },
            "version": {"number": 2}
        })
    }

    #[test]
    fn test_extract_storage_body() {
        assert_eq!(extract_storage_body(&current_page()), "<p>existing body</p>");
    }

    #[test]
    fn test_extract_storage_body_inline_value() {
        let page = json!({"body": {"value": "<p>inline</p>"}});
        assert_eq!(extract_storage_body(&page), "<p>inline</p>");
    }

    #[test]
    fn test_extract_storage_body_missing() {
        assert_eq!(extract_storage_body(&json!({"id": "1"})), "");
    }

    #[test]
    fn test_create_page_payload() {
        let payload = create_page_payload("111", "Title", "<p>hi</p>", None);
        assert_eq!(payload["spaceId"], "111");
        assert_eq!(payload["title"], "Title");
        assert_eq!(payload["body"]["representation"], "storage");
        assert_eq!(payload["body"]["value"], "<p>hi</p>");
        assert!(payload.get("parentId").is_none());
    }

    #[test]
    fn test_create_page_payload_with_parent() {
        let payload = create_page_payload("111", "Title", "", Some("999"));
        assert_eq!(payload["parentId"], "999");
    }

    #[test]
    fn test_merge_page_update_reuses_fetched_fields() {
        // No new title or body: the fetched values are resubmitted unchanged
        let payload = merge_page_update(
            "12345",
            &current_page(),
            None,
            None,
            3,
            None,
            "Updated page",
        );

        assert_eq!(payload["id"], "12345");
        assert_eq!(payload["status"], "current");
        assert_eq!(payload["title"], "Release Notes");
        assert_eq!(payload["body"]["value"], "<p>existing body</p>");
        assert_eq!(payload["version"]["number"], 3);
        assert_eq!(payload["version"]["message"], "Updated page");
    }

    #[test]
    fn test_merge_page_update_overrides() {
        let payload = merge_page_update(
            "12345",
            &current_page(),
            Some("New Title"),
            Some("<p>new body</p>"),
            4,
            Some("777"),
            "edit",
        );

        assert_eq!(payload["title"], "New Title");
        assert_eq!(payload["body"]["value"], "<p>new body</p>");
        assert_eq!(payload["parentId"], "777");
    }

    #[test]
    fn test_merge_page_update_empty_strings_reuse_fetched_values() {
        let payload = merge_page_update("12345", &current_page(), Some(""), Some(""), 3, None, "m");

        assert_eq!(payload["title"], "Release Notes");
        assert_eq!(payload["body"]["value"], "<p>existing body</p>");
    }

    #[test]
    fn test_merge_page_update_defaults_status() {
        let payload = merge_page_update("1", &json!({"title": "T"}), None, None, 1, None, "m");
        assert_eq!(payload["status"], "current");
    }

    #[test]
    fn test_merge_page_move_keeps_content() {
        let payload = merge_page_move("12345", &current_page(), "888", 3, "Moved page");

        assert_eq!(payload["parentId"], "888");
        assert_eq!(payload["title"], "Release Notes");
        assert_eq!(payload["body"]["value"], "<p>existing body</p>");
        assert_eq!(payload["version"]["number"], 3);
    }

    #[test]
    fn test_comment_payload() {
        let payload = comment_payload("12345", "<p>nice</p>");
        assert_eq!(payload["pageId"], "12345");
        assert_eq!(payload["body"]["representation"], "storage");
        assert_eq!(payload["body"]["value"], "<p>nice</p>");
    }

    #[test]
    fn test_resolve_space_id_string_id() {
        let response = json!({"results": [{"id": "4242", "key": "ENG"}]});
        assert_eq!(resolve_space_id(&response, "ENG").unwrap(), "4242");
    }

    #[test]
    fn test_resolve_space_id_numeric_id() {
        let response = json!({"results": [{"id": 4242, "key": "ENG"}]});
        assert_eq!(resolve_space_id(&response, "ENG").unwrap(), "4242");
    }

    #[test]
    fn test_resolve_space_id_empty_results() {
        let response = json!({"results": []});
        assert_eq!(
            resolve_space_id(&response, "NOPE"),
            Err(LookupError::SpaceNotFound("NOPE".to_string()))
        );
    }

    #[test]
    fn test_resolve_space_id_missing_results() {
        assert!(resolve_space_id(&json!({}), "X").is_err());
    }
}
