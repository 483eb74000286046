//! Page comments and attachments

use crate::atlassian::{check_response, ConfluenceClient};
use crate::prelude::*;
use serde_json::Value;

use atlasmcp_core::atlassian::confluence::comment_payload;

/// Add a footer comment to a page. The body uses the storage representation.
pub async fn add_comment_data(
    confluence: &ConfluenceClient,
    page_id: &str,
    body: &str,
) -> Result<Value> {
    let url = format!("{}/pages/{page_id}/comments", confluence.base_url);
    let payload = comment_payload(page_id, body);

    let response = confluence
        .http
        .post(&url)
        .json(&payload)
        .send()
        .await
        .map_err(|e| eyre!("Failed to add comment: {}", e))?;

    let response = check_response(response, "Failed to add comment").await?;

    response
        .json()
        .await
        .map_err(|e| eyre!("Failed to parse comment response: {}", e))
}

/// Upload an attachment to a page as multipart form data.
///
/// The multipart boundary header is set per-request by reqwest and
/// coexists with the client's Basic credential default header; neither
/// overwrites the other.
pub async fn add_attachment_data(
    confluence: &ConfluenceClient,
    page_id: &str,
    filename: &str,
    bytes: Vec<u8>,
) -> Result<Value> {
    let url = format!("{}/pages/{page_id}/attachments", confluence.base_url);

    let part = reqwest::multipart::Part::bytes(bytes).file_name(filename.to_string());
    let form = reqwest::multipart::Form::new().part("file", part);

    let response = confluence
        .http
        .post(&url)
        .header("X-Atlassian-Token", "nocheck")
        .multipart(form)
        .send()
        .await
        .map_err(|e| eyre!("Failed to upload attachment: {}", e))?;

    let response = check_response(response, "Failed to upload attachment").await?;

    response
        .json()
        .await
        .map_err(|e| eyre!("Failed to parse attachment response: {}", e))
}

#[cfg(test)]
mod tests {
    use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};

    // Attachment uploads set their own Content-Type carrying the multipart
    // boundary. reqwest only fills default headers into vacant slots at
    // send time, so the boundary survives alongside the Basic credential.
    #[test]
    fn test_multipart_request_keeps_boundary_content_type() {
        let config = crate::atlassian::ConfluenceConfig {
            domain: "example.atlassian.net".to_string(),
            email: "user@example.com".to_string(),
            api_token: "token123".to_string(),
        };
        let confluence = crate::atlassian::ConfluenceClient::new(&config).unwrap();

        let part = reqwest::multipart::Part::bytes(vec![1, 2, 3]).file_name("a.txt".to_string());
        let form = reqwest::multipart::Form::new().part("file", part);

        let request = confluence
            .http
            .post(format!("{}/pages/123/attachments", confluence.base_url))
            .header("X-Atlassian-Token", "nocheck")
            .multipart(form)
            .build()
            .unwrap();

        let content_type = request
            .headers()
            .get(CONTENT_TYPE)
            .unwrap()
            .to_str()
            .unwrap();
        assert!(content_type.starts_with("multipart/form-data; boundary="));

        // The credential is a client default, not a request header, so it
        // cannot have displaced the boundary.
        assert!(request.headers().get(AUTHORIZATION).is_none());
    }
}
