use crate::prelude::*;

pub mod confluence;
pub mod jira;

pub use confluence::*;
pub use jira::*;

/// Jira configuration from environment variables
#[derive(Debug, Clone)]
pub struct JiraConfig {
    pub domain: String,
    pub email: String,
    pub api_token: String,
}

impl JiraConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            domain: std::env::var("JIRA_DOMAIN")
                .map_err(|_| eyre!("JIRA_DOMAIN environment variable not set"))?,
            email: std::env::var("JIRA_EMAIL")
                .map_err(|_| eyre!("JIRA_EMAIL environment variable not set"))?,
            api_token: std::env::var("JIRA_API_TOKEN")
                .map_err(|_| eyre!("JIRA_API_TOKEN environment variable not set"))?,
        })
    }
}

/// Confluence configuration from environment variables
#[derive(Debug, Clone)]
pub struct ConfluenceConfig {
    pub domain: String,
    pub email: String,
    pub api_token: String,
}

impl ConfluenceConfig {
    /// Load configuration from environment variables.
    /// Falls back to the Jira variables when the Atlassian ones are absent,
    /// since both products usually live on the same site.
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            domain: std::env::var("ATLASSIAN_DOMAIN")
                .or_else(|_| std::env::var("CONFLUENCE_DOMAIN"))
                .or_else(|_| std::env::var("JIRA_DOMAIN"))
                .map_err(|_| eyre!("ATLASSIAN_DOMAIN environment variable not set"))?,
            email: std::env::var("ATLASSIAN_EMAIL")
                .or_else(|_| std::env::var("JIRA_EMAIL"))
                .map_err(|_| eyre!("ATLASSIAN_EMAIL environment variable not set"))?,
            api_token: std::env::var("ATLASSIAN_API_TOKEN")
                .or_else(|_| std::env::var("JIRA_API_TOKEN"))
                .map_err(|_| eyre!("ATLASSIAN_API_TOKEN environment variable not set"))?,
        })
    }
}

/// Default header set for vendor calls: Basic credential from an email
/// and API token, plus JSON accept/content-type. reqwest applies these
/// only where a request does not set the header itself, so per-request
/// headers (the multipart boundary in particular) are never clobbered.
fn basic_auth_headers(email: &str, api_token: &str) -> Result<reqwest::header::HeaderMap> {
    use base64::Engine;
    use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION, CONTENT_TYPE};

    let auth_string = format!("{email}:{api_token}");
    let auth_encoded = base64::engine::general_purpose::STANDARD.encode(&auth_string);

    let mut headers = HeaderMap::new();
    headers.insert(
        AUTHORIZATION,
        HeaderValue::from_str(&format!("Basic {auth_encoded}"))
            .map_err(|e| eyre!("Invalid header value: {}", e))?,
    );
    headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
    headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

    Ok(headers)
}

/// Build an HTTP client with Basic Auth default headers from an email and
/// API token.
fn create_authenticated_client(email: &str, api_token: &str) -> Result<reqwest::Client> {
    reqwest::Client::builder()
        .default_headers(basic_auth_headers(email, api_token)?)
        .build()
        .map_err(|e| eyre!("Failed to build HTTP client: {}", e))
}

/// Authenticated client for the Jira REST v3 API.
#[derive(Debug, Clone)]
pub struct JiraClient {
    pub http: reqwest::Client,
    pub base_url: String,
}

impl JiraClient {
    pub fn new(config: &JiraConfig) -> Result<Self> {
        Ok(Self {
            http: create_authenticated_client(&config.email, &config.api_token)?,
            base_url: format!("https://{}", config.domain.trim_end_matches('/')),
        })
    }

    pub fn from_env() -> Result<Self> {
        Self::new(&JiraConfig::from_env()?)
    }
}

/// Authenticated client for the Confluence v2 API.
#[derive(Debug, Clone)]
pub struct ConfluenceClient {
    pub http: reqwest::Client,
    pub base_url: String,
}

impl ConfluenceClient {
    pub fn new(config: &ConfluenceConfig) -> Result<Self> {
        Ok(Self {
            http: create_authenticated_client(&config.email, &config.api_token)?,
            base_url: format!("https://{}/wiki/api/v2", config.domain.trim_end_matches('/')),
        })
    }

    pub fn from_env() -> Result<Self> {
        Self::new(&ConfluenceConfig::from_env()?)
    }
}

/// Check that an HTTP response was successful, returning a descriptive error otherwise.
pub async fn check_response(
    response: reqwest::Response,
    context: &str,
) -> Result<reqwest::Response> {
    if response.status().is_success() {
        return Ok(response);
    }
    let status = response.status();
    let body = response.text().await.unwrap_or_default();
    Err(eyre!("{context} [{status}]: {body}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};

    #[test]
    fn test_basic_auth_headers() {
        let headers = basic_auth_headers("user@example.com", "token123").unwrap();

        // base64("user@example.com:token123")
        assert_eq!(
            headers.get(AUTHORIZATION).unwrap(),
            "Basic dXNlckBleGFtcGxlLmNvbTp0b2tlbjEyMw=="
        );
        assert_eq!(headers.get(CONTENT_TYPE).unwrap(), "application/json");
    }

    #[test]
    fn test_jira_client_base_url_trims_trailing_slash() {
        let client = JiraClient::new(&JiraConfig {
            domain: "example.atlassian.net/".to_string(),
            email: "user@example.com".to_string(),
            api_token: "t".to_string(),
        })
        .unwrap();
        assert_eq!(client.base_url, "https://example.atlassian.net");
    }

    #[test]
    fn test_confluence_client_base_url() {
        let client = ConfluenceClient::new(&ConfluenceConfig {
            domain: "example.atlassian.net".to_string(),
            email: "user@example.com".to_string(),
            api_token: "t".to_string(),
        })
        .unwrap();
        assert_eq!(client.base_url, "https://example.atlassian.net/wiki/api/v2");
    }
}
