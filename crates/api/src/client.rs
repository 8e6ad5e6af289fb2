use std::env;
use std::time::Duration;

use anyhow::{Context, Result, anyhow};
use paramdeck_types::{ComponentDetail, ComponentRef, Parameter};
use percent_encoding::{AsciiSet, CONTROLS, utf8_percent_encode};
use reqwest::{Client, RequestBuilder, Url, header};
use serde_json::Value;
use tracing::{debug, warn};

use crate::{ModelService, ServiceError};

/// Base URL used when `PARAMDECK_API_BASE` is not set.
pub const DEFAULT_API_BASE: &str = "http://127.0.0.1:8000";

const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Hostnames allowed to use plain HTTP.
const LOCALHOST_DOMAINS: &[&str] = &["localhost", "127.0.0.1", "[::1]"];

/// Characters escaped when a dotted model path is placed in a URL segment.
const PATH_SEGMENT: &AsciiSet = &CONTROLS.add(b' ').add(b'"').add(b'#').add(b'/').add(b'?').add(b'%').add(b'<').add(b'>');

/// Connection settings for [`ModelClient`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceConfig {
    pub base_url: String,
    pub token: Option<String>,
    pub timeout: Duration,
}

impl ServiceConfig {
    /// Resolve settings from the environment.
    ///
    /// - `PARAMDECK_API_BASE`: service base URL (defaults to [`DEFAULT_API_BASE`])
    /// - `PARAMDECK_API_TOKEN`: optional bearer token
    /// - `PARAMDECK_TIMEOUT_SECS`: request timeout in seconds
    pub fn from_env() -> Result<Self> {
        let base_url = env::var("PARAMDECK_API_BASE").unwrap_or_else(|_| DEFAULT_API_BASE.into());
        let token = env::var("PARAMDECK_API_TOKEN").ok().filter(|token| !token.trim().is_empty());
        let timeout_secs = match env::var("PARAMDECK_TIMEOUT_SECS") {
            Ok(raw) => raw
                .trim()
                .parse::<u64>()
                .with_context(|| format!("PARAMDECK_TIMEOUT_SECS must be a whole number of seconds, got '{raw}'"))?,
            Err(_) => DEFAULT_TIMEOUT_SECS,
        };
        Ok(Self {
            base_url,
            token,
            timeout: Duration::from_secs(timeout_secs),
        })
    }

    /// Replace the base URL, typically from a command-line flag.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }
}

#[derive(Debug, Clone)]
/// Thin wrapper around a configured `reqwest::Client` for the model service.
///
/// Every request goes to a validated base URL with a consistent User-Agent
/// and, when configured, a bearer token.
pub struct ModelClient {
    pub base_url: String,
    pub http: Client,
    pub user_agent: String,
}

impl ModelClient {
    pub fn new(config: ServiceConfig) -> Result<Self> {
        validate_base_url(&config.base_url)?;

        let mut default_headers = header::HeaderMap::new();
        if let Some(token) = config.token.as_deref() {
            let authorization = header::HeaderValue::from_str(&format!("Bearer {token}")).context("invalid PARAMDECK_API_TOKEN")?;
            default_headers.insert(header::AUTHORIZATION, authorization);
        }
        default_headers.insert(header::ACCEPT, header::HeaderValue::from_static("application/json"));

        let http = Client::builder()
            .default_headers(default_headers)
            .timeout(config.timeout)
            .build()
            .context("build http client")?;

        Ok(Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            http,
            user_agent: format!("paramdeck/0.1; {}", env::consts::OS),
        })
    }

    /// Build a request for a method and service-relative path.
    pub fn request(&self, method: reqwest::Method, path: &str) -> RequestBuilder {
        let url = format!("{}{}", self.base_url, path);
        debug!(%url, "building request");

        self.http.request(method, url).header(header::USER_AGENT, &self.user_agent)
    }

    async fn get_json(&self, path: &str) -> Result<Value, ServiceError> {
        let response = self.request(reqwest::Method::GET, path).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(ServiceError::Status {
                status: status.as_u16(),
                path: path.to_string(),
            });
        }
        let text = response.text().await?;
        if text.trim().is_empty() {
            return Ok(Value::Null);
        }
        serde_json::from_str(&text).map_err(|source| ServiceError::Decode {
            path: path.to_string(),
            source,
        })
    }
}

#[async_trait::async_trait]
impl ModelService for ModelClient {
    async fn issue_command(&self, command: &str) -> Result<(), ServiceError> {
        debug!(command, "issuing command");
        let response = self
            .request(reqwest::Method::POST, "/command")
            .header(header::CONTENT_TYPE, "text/plain; charset=utf-8")
            .body(command.to_string())
            .send()
            .await?;
        let status = response.status();
        if !status.is_success() {
            return Err(ServiceError::Status {
                status: status.as_u16(),
                path: "/command".into(),
            });
        }
        Ok(())
    }

    async fn get_workflow(&self, path: &str) -> Result<Vec<ComponentRef>, ServiceError> {
        let request_path = resource_path("workflow", path);
        let value = self.get_json(&request_path).await?;
        if value.is_null() {
            return Ok(Vec::new());
        }
        serde_json::from_value(value).map_err(|source| ServiceError::Decode {
            path: request_path,
            source,
        })
    }

    async fn get_component(&self, path: &str) -> Result<ComponentDetail, ServiceError> {
        let request_path = resource_path("component", path);
        let value = self.get_json(&request_path).await?;
        if value.is_null() {
            return Ok(ComponentDetail::default());
        }
        serde_json::from_value(value).map_err(|source| ServiceError::Decode {
            path: request_path,
            source,
        })
    }

    async fn fetch_parameters(&self, entity: &str) -> Result<Option<Vec<Parameter>>, ServiceError> {
        let request_path = resource_path("parameters", entity);
        let value = self.get_json(&request_path).await?;
        Ok(parse_parameter_rows(value))
    }
}

/// Interpret a parameter listing payload.
///
/// Anything other than a well-formed array of rows yields `None` so the
/// caller can take its fail-soft path.
pub(crate) fn parse_parameter_rows(value: Value) -> Option<Vec<Parameter>> {
    if !value.is_array() {
        return None;
    }
    match serde_json::from_value::<Vec<Parameter>>(value) {
        Ok(rows) => Some(rows),
        Err(error) => {
            warn!(%error, "discarding malformed parameter rows");
            None
        }
    }
}

fn resource_path(kind: &str, model_path: &str) -> String {
    format!("/{kind}/{}", utf8_percent_encode(model_path, PATH_SEGMENT))
}

/// Validate that a base URL is acceptable for use by the client.
///
/// Rules:
/// - `localhost`, `127.0.0.1` or `[::1]`: any scheme is allowed
/// - otherwise: scheme must be HTTPS
fn validate_base_url(base: &str) -> Result<()> {
    let parsed_base_url = Url::parse(base).map_err(|e| anyhow!("Invalid PARAMDECK_API_BASE URL '{}': {}", base, e))?;

    let host_name = parsed_base_url
        .host_str()
        .ok_or_else(|| anyhow!("PARAMDECK_API_BASE must include a host"))?;

    if LOCALHOST_DOMAINS.iter().any(|&allowed| host_name.eq_ignore_ascii_case(allowed)) {
        return Ok(());
    }

    if parsed_base_url.scheme() != "https" {
        return Err(anyhow!(
            "PARAMDECK_API_BASE must use https for non-localhost hosts; got '{}://'",
            parsed_base_url.scheme()
        ));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn base_url_rules() {
        assert!(validate_base_url("http://localhost:8000").is_ok());
        assert!(validate_base_url("http://127.0.0.1").is_ok());
        assert!(validate_base_url("https://models.example.com").is_ok());
        assert!(validate_base_url("http://models.example.com").is_err());
        assert!(validate_base_url("not a url").is_err());
    }

    #[test]
    fn resource_paths_escape_model_paths() {
        assert_eq!(resource_path("workflow", "top.driver"), "/workflow/top.driver");
        assert_eq!(resource_path("parameters", "top/odd name"), "/parameters/top%2Fodd%20name");
    }

    #[test]
    fn parameter_rows_fail_soft() {
        assert!(parse_parameter_rows(Value::Null).is_none());
        assert!(parse_parameter_rows(json!({"target": "a.x"})).is_none());
        assert!(parse_parameter_rows(json!([{"low": 1}])).is_none());

        let rows = parse_parameter_rows(json!([{"target": "a.x", "low": 1, "high": 2}])).expect("rows");
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].high.as_deref(), Some("2"));
    }

    #[test]
    fn client_rejects_insecure_remote_base() {
        let config = ServiceConfig {
            base_url: "http://models.example.com".into(),
            token: None,
            timeout: Duration::from_secs(1),
        };
        assert!(ModelClient::new(config).is_err());
    }

    #[tokio::test]
    async fn https_requests_reach_the_connector() {
        // Nothing listens on port 1; the failure must come from connecting.
        let config = ServiceConfig {
            base_url: "https://127.0.0.1:1".into(),
            token: None,
            timeout: Duration::from_secs(5),
        };
        let client = ModelClient::new(config).expect("https base accepted");
        let error = client.issue_command("top.driver.clear_parameters();").await.expect_err("nothing is listening");
        let ServiceError::Transport(error) = error else {
            panic!("expected a transport error, got {error:?}");
        };
        assert!(!format!("{error:?}").contains("scheme is not http"), "https unsupported: {error:?}");
    }
}
