//! SendGrid legacy (`<resource>/<action>.json`) async client implementation.

use async_trait::async_trait;
use crate::client::{USER_AGENT_VALUE, env_var, http_client, parse_base_url};
use crate::error::{self, is_truthy};
use crate::request::{Executor, FilePart, Payload, Request, endpoint_url};
use crate::{Error, Result};
use reqwest::header::{ACCEPT, HeaderValue};
use reqwest::multipart::{Form, Part};
use reqwest::Url;
use serde_json::Value;
use std::fmt;
use tracing::{debug, trace, warn};

const BASE_URL: &str = "https://sendgrid.com/api";
const API_USER_VAR: &str = "SENDGRID_API_USER";
const API_KEY_VAR: &str = "SENDGRID_API_KEY";

/// Async client for the legacy SendGrid web API.
///
/// Every call is a `POST` to `{base}/{path}/{action}.json` with the
/// `api_user`/`api_key` pair in the query string and a form-encoded body.
#[derive(Clone)]
pub struct LegacyClient {
    http: reqwest::Client,
    api_user: String,
    api_key: String,
    base_url: Url,
    proxy: Option<String>,
}

impl LegacyClient {
    /// Create a builder for configuring the client.
    pub fn builder(api_user: impl Into<String>, api_key: impl Into<String>) -> LegacyClientBuilder {
        LegacyClientBuilder::new(api_user, api_key)
    }

    /// Create a client with default settings.
    ///
    /// Fails with [`Error::Argument`] when either credential is empty.
    pub fn new(api_user: impl Into<String>, api_key: impl Into<String>) -> Result<Self> {
        LegacyClientBuilder::new(api_user, api_key).build()
    }

    /// Create a client from `SENDGRID_API_USER` and `SENDGRID_API_KEY`.
    pub fn from_env() -> Result<Self> {
        LegacyClientBuilder::from_env()?.build()
    }

    /// Get the proxy URL if one was configured.
    pub fn proxy(&self) -> Option<&str> {
        self.proxy.as_deref()
    }

    /// Base URL every request path is joined onto.
    pub fn base_url(&self) -> &str {
        self.base_url.as_str()
    }

    /// The configured API user.
    pub fn api_user(&self) -> &str {
        &self.api_user
    }
}

impl fmt::Debug for LegacyClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LegacyClient")
            .field("api_user", &self.api_user)
            .field("base_url", &self.base_url.as_str())
            .field("proxy", &self.proxy)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl Executor for LegacyClient {
    async fn execute(&self, request: Request) -> Result<Option<Value>> {
        request.validate()?;
        debug!(
            action = request.verb(),
            path = request.path(),
            query = ?request.query(),
            payload = ?request.payload(),
            "sendgrid legacy request"
        );

        if request.segment().is_some() {
            return Err(Error::argument(
                "path segments are not supported by the legacy client",
            ));
        }
        let url = endpoint_url(
            &self.base_url,
            &format!("{}/{}.json", request.path(), request.verb()),
            None,
        )?;
        let credentials = [
            ("api_user", self.api_user.as_str()),
            ("api_key", self.api_key.as_str()),
        ];

        let mut builder = self
            .http
            .post(url)
            .header(ACCEPT, HeaderValue::from_static("application/json"))
            .query(&credentials);
        if !request.query().is_empty() {
            builder = builder.query(request.query());
        }
        builder = match request.payload() {
            Payload::None => builder,
            Payload::Form(fields) => builder.form(fields),
            Payload::Multipart { fields, files } => builder.multipart(multipart(fields, files)?),
            Payload::Json(_) => {
                return Err(Error::argument(
                    "JSON payloads are not supported by the legacy client",
                ));
            }
        };

        let response = builder.send().await?;
        let status = response.status();
        trace!(status = status.as_u16(), path = request.path(), "sendgrid legacy response");

        let body: Value = serde_json::from_slice(&response.bytes().await?)?;
        if is_error_body(&body) {
            warn!(status = status.as_u16(), body = %body, "sendgrid legacy error");
            return Err(error::normalize(status.as_u16(), body).into());
        }

        Ok(Some(body))
    }
}

/// Legacy error rule: `{"message": "error"}` or any truthy `error` field.
fn is_error_body(body: &Value) -> bool {
    body.get("message").and_then(Value::as_str) == Some("error")
        || body.get("error").is_some_and(is_truthy)
}

fn multipart(fields: &[(String, String)], files: &[FilePart]) -> Result<Form> {
    let mut form = Form::new();
    for (name, value) in fields {
        form = form.text(name.clone(), value.clone());
    }
    for file in files {
        let mut part = Part::bytes(file.content.clone()).file_name(file.filename.clone());
        if let Some(content_type) = &file.content_type {
            part = part.mime_str(content_type).map_err(|_| {
                Error::argument(format!("invalid content type for {}: {content_type}", file.filename))
            })?;
        }
        form = form.part(file.field.clone(), part);
    }
    Ok(form)
}

/// Builder for configuring a legacy SendGrid client.
#[derive(Clone)]
pub struct LegacyClientBuilder {
    api_user: String,
    api_key: String,
    base_url: String,
    proxy: Option<String>,
    danger_accept_invalid_certs: bool,
    user_agent: String,
}

impl LegacyClientBuilder {
    /// Create a new builder with default settings.
    ///
    /// Defaults mirror [`ClientBuilder`](crate::ClientBuilder) with base URL
    /// `https://sendgrid.com/api`.
    pub fn new(api_user: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            api_user: api_user.into(),
            api_key: api_key.into(),
            base_url: BASE_URL.to_string(),
            proxy: None,
            danger_accept_invalid_certs: false,
            user_agent: USER_AGENT_VALUE.to_string(),
        }
    }

    /// Start from `SENDGRID_API_USER` and `SENDGRID_API_KEY`.
    pub fn from_env() -> Result<Self> {
        Ok(Self::new(env_var(API_USER_VAR)?, env_var(API_KEY_VAR)?))
    }

    /// Override the API base URL.
    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Set a proxy URL.
    pub fn proxy(mut self, proxy: impl Into<String>) -> Self {
        self.proxy = Some(proxy.into());
        self
    }

    /// Control whether to accept invalid TLS certificates (default: false).
    pub fn danger_accept_invalid_certs(mut self, value: bool) -> Self {
        self.danger_accept_invalid_certs = value;
        self
    }

    /// Override the default user agent string.
    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Build the client.
    pub fn build(self) -> Result<LegacyClient> {
        if self.api_user.trim().is_empty() {
            return Err(Error::argument("API user is required"));
        }
        if self.api_key.trim().is_empty() {
            return Err(Error::argument("API key is required"));
        }

        Ok(LegacyClient {
            http: http_client(
                self.proxy.as_deref(),
                self.danger_accept_invalid_certs,
                &self.user_agent,
            )?,
            base_url: parse_base_url(&self.base_url)?,
            api_user: self.api_user,
            api_key: self.api_key,
            proxy: self.proxy,
        })
    }
}

impl fmt::Debug for LegacyClientBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LegacyClientBuilder")
            .field("api_user", &self.api_user)
            .field("api_key", &"<redacted>")
            .field("base_url", &self.base_url)
            .field("proxy", &self.proxy)
            .field("danger_accept_invalid_certs", &self.danger_accept_invalid_certs)
            .field("user_agent", &self.user_agent)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn build_requires_both_credentials() {
        assert!(LegacyClient::new("", "key").unwrap_err().is_argument());
        assert!(LegacyClient::new("user", "").unwrap_err().is_argument());
        assert!(LegacyClient::new("user", "key").is_ok());
    }

    #[test]
    fn debug_output_hides_key() {
        let client = LegacyClient::new("user", "very-secret").unwrap();
        let rendered = format!("{client:?}");
        assert!(rendered.contains("user"));
        assert!(!rendered.contains("very-secret"));
        assert!(!format!("{:?}", LegacyClient::builder("u", "very-secret")).contains("very-secret"));
    }

    #[test]
    fn error_rule() {
        assert!(is_error_body(&json!({"message": "error", "errors": ["bad"]})));
        assert!(is_error_body(&json!({"error": {"code": 401}})));
        assert!(is_error_body(&json!({"error": "denied"})));
        assert!(!is_error_body(&json!({"message": "success"})));
        assert!(!is_error_body(&json!({"error": null})));
        assert!(!is_error_body(&json!([{"email": "a@x.com"}])));
    }

    #[test]
    fn multipart_rejects_bad_content_type() {
        let files = vec![FilePart {
            field: "files[a.txt]".into(),
            filename: "a.txt".into(),
            content: b"abc".to_vec(),
            content_type: Some("not a mime".into()),
        }];
        assert!(multipart(&[], &files).unwrap_err().is_argument());
    }

    #[tokio::test]
    async fn segment_requests_are_rejected() {
        let client = LegacyClient::builder("user", "key")
            .base_url("http://127.0.0.1:1")
            .build()
            .unwrap();
        let request = Request::action("get", "bounces").with_segment("a@x.com");
        assert!(client.execute(request).await.unwrap_err().is_argument());
    }
}
