//! SendGrid v3 (JSON API) async client implementation.

use async_trait::async_trait;
use crate::error::{self, is_truthy};
use crate::request::{Executor, Payload, Request, endpoint_url};
use crate::{Error, Result};
use reqwest::header::{ACCEPT, AUTHORIZATION, HeaderMap, HeaderValue};
use reqwest::{Method, StatusCode, Url};
use serde_json::Value;
use std::fmt;
use tracing::{debug, trace, warn};

/// Async client for the SendGrid v3 REST API.
///
/// Authenticates with `Authorization: Bearer <key>` and exchanges JSON bodies.
/// Use [`Client::new`] for defaults or [`Client::builder`] for custom settings
/// like proxies, TLS behavior, a custom user agent or a different base URL.
#[derive(Clone)]
pub struct Client {
    http: reqwest::Client,
    headers: HeaderMap,
    base_url: Url,
    proxy: Option<String>,
}

impl Client {
    /// Create a builder for configuring the client.
    pub fn builder(api_key: impl Into<String>) -> ClientBuilder {
        ClientBuilder::new(api_key)
    }

    /// Create a client with default settings.
    ///
    /// Fails with [`Error::Argument`] when `api_key` is empty.
    ///
    /// # Examples
    /// ```no_run
    /// # use sendgrid_client::Client;
    /// # fn main() -> Result<(), sendgrid_client::Error> {
    /// let client = Client::new("SG.xxxxx")?;
    /// # Ok(())
    /// # }
    /// ```
    pub fn new(api_key: impl Into<String>) -> Result<Self> {
        ClientBuilder::new(api_key).build()
    }

    /// Create a client from the `SENDGRID_API_KEY` environment variable.
    pub fn from_env() -> Result<Self> {
        ClientBuilder::from_env()?.build()
    }

    /// Get the proxy URL if one was configured.
    ///
    /// Returns `None` when no proxy was set on the builder.
    pub fn proxy(&self) -> Option<&str> {
        self.proxy.as_deref()
    }

    /// Base URL every request path is joined onto.
    pub fn base_url(&self) -> &str {
        self.base_url.as_str()
    }
}

impl fmt::Debug for Client {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Client")
            .field("base_url", &self.base_url.as_str())
            .field("proxy", &self.proxy)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl Executor for Client {
    async fn execute(&self, request: Request) -> Result<Option<Value>> {
        request.validate()?;
        debug!(
            verb = request.verb(),
            path = request.path(),
            segment = ?request.segment(),
            query = ?request.query(),
            payload = ?request.payload(),
            "sendgrid request"
        );

        let method = Method::from_bytes(request.verb().as_bytes())
            .map_err(|_| Error::argument(format!("unsupported HTTP verb: {}", request.verb())))?;
        let url = endpoint_url(&self.base_url, request.path(), request.segment())?;

        let mut builder = self
            .http
            .request(method, url)
            .headers(self.headers.clone());
        if !request.query().is_empty() {
            builder = builder.query(request.query());
        }
        match request.payload() {
            Payload::None => {}
            Payload::Json(body) => builder = builder.json(body),
            Payload::Form(_) | Payload::Multipart { .. } => {
                return Err(Error::argument(
                    "form payloads are only supported by the legacy client",
                ));
            }
        }

        let response = builder.send().await?;
        let status = response.status();
        trace!(status = status.as_u16(), path = request.path(), "sendgrid response");

        if status == StatusCode::ACCEPTED {
            return Ok(None);
        }

        let body = response.bytes().await?;
        interpret(status, &body)
    }
}

/// Apply the v3 error rule to a response.
///
/// A truthy `errors` field is a failure whatever the status; otherwise any
/// non-2xx status is a failure carrying the whole body.
fn interpret(status: StatusCode, body: &[u8]) -> Result<Option<Value>> {
    if body.iter().all(u8::is_ascii_whitespace) {
        if status.is_success() {
            return Ok(None);
        }
        warn!(status = status.as_u16(), "sendgrid error without body");
        return Err(error::normalize(status.as_u16(), Value::Null).into());
    }

    let data: Value = match serde_json::from_slice(body) {
        Ok(data) => data,
        Err(e) if status.is_success() => return Err(e.into()),
        Err(_) => Value::String(String::from_utf8_lossy(body).into_owned()),
    };

    if let Some(errors) = data.get("errors").filter(|errors| is_truthy(errors)) {
        warn!(status = status.as_u16(), errors = %errors, "sendgrid reported errors");
        return Err(error::normalize(status.as_u16(), errors.clone()).into());
    }

    if !status.is_success() {
        warn!(status = status.as_u16(), "sendgrid error status");
        return Err(error::normalize(status.as_u16(), data).into());
    }

    Ok(Some(data))
}

pub(crate) const BASE_URL: &str = "https://api.sendgrid.com/v3";
pub(crate) const USER_AGENT_VALUE: &str =
    concat!("sendgrid-client-rs/", env!("CARGO_PKG_VERSION"));
const API_KEY_VAR: &str = "SENDGRID_API_KEY";

/// Builder for configuring a SendGrid v3 client.
///
/// Start with [`Client::builder`] to override defaults.
#[derive(Clone)]
pub struct ClientBuilder {
    api_key: String,
    base_url: String,
    proxy: Option<String>,
    danger_accept_invalid_certs: bool,
    user_agent: String,
}

impl ClientBuilder {
    /// Create a new builder with default settings.
    ///
    /// Defaults:
    /// - No proxy
    /// - `danger_accept_invalid_certs = false`
    /// - Default user agent
    /// - Base URL `https://api.sendgrid.com/v3`
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: BASE_URL.to_string(),
            proxy: None,
            danger_accept_invalid_certs: false,
            user_agent: USER_AGENT_VALUE.to_string(),
        }
    }

    /// Start from the `SENDGRID_API_KEY` environment variable.
    pub fn from_env() -> Result<Self> {
        Ok(Self::new(env_var(API_KEY_VAR)?))
    }

    /// Override the API base URL.
    ///
    /// Useful for testing against a mock server.
    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Set a proxy URL (e.g., "http://127.0.0.1:8080" or "socks5://127.0.0.1:1080").
    ///
    /// Applied to every request made by this client.
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
    ///
    /// No network traffic happens here; the key is only validated for presence.
    pub fn build(self) -> Result<Client> {
        if self.api_key.trim().is_empty() {
            return Err(Error::argument("API key is required"));
        }

        let mut auth = HeaderValue::from_str(&format!("Bearer {}", self.api_key))
            .map_err(|_| Error::argument("API key contains invalid header characters"))?;
        auth.set_sensitive(true);

        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        headers.insert(AUTHORIZATION, auth);

        Ok(Client {
            http: http_client(
                self.proxy.as_deref(),
                self.danger_accept_invalid_certs,
                &self.user_agent,
            )?,
            headers,
            base_url: parse_base_url(&self.base_url)?,
            proxy: self.proxy,
        })
    }
}

impl fmt::Debug for ClientBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientBuilder")
            .field("api_key", &"<redacted>")
            .field("base_url", &self.base_url)
            .field("proxy", &self.proxy)
            .field("danger_accept_invalid_certs", &self.danger_accept_invalid_certs)
            .field("user_agent", &self.user_agent)
            .finish()
    }
}

/// Build the shared reqwest client used by both API generations.
pub(crate) fn http_client(
    proxy: Option<&str>,
    danger_accept_invalid_certs: bool,
    user_agent: &str,
) -> Result<reqwest::Client> {
    let mut builder = reqwest::Client::builder()
        .danger_accept_invalid_certs(danger_accept_invalid_certs)
        .user_agent(user_agent);

    if let Some(proxy_url) = proxy {
        builder = builder.proxy(reqwest::Proxy::all(proxy_url)?);
    }

    Ok(builder.build()?)
}

pub(crate) fn parse_base_url(base_url: &str) -> Result<Url> {
    Url::parse(base_url).map_err(|e| Error::argument(format!("invalid base URL {base_url}: {e}")))
}

pub(crate) fn env_var(name: &str) -> Result<String> {
    std::env::var(name).map_err(|_| Error::argument(format!("{name} is not set")))
}
