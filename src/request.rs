//! Request descriptors and the executor seam shared by both API generations.

use async_trait::async_trait;
use crate::{Error, Result};
use reqwest::Url;
use serde_json::Value;
use std::fmt;

/// Performs one SendGrid call described by a [`Request`].
///
/// [`Client`](crate::Client) speaks the v3 JSON API and
/// [`LegacyClient`](crate::LegacyClient) the form-encoded `<action>.json` API.
/// Facades only ever see this trait.
///
/// Returns `Ok(None)` when the provider accepted the request without content
/// (HTTP 202), otherwise the parsed JSON body.
#[async_trait]
pub trait Executor: fmt::Debug + Send + Sync {
    async fn execute(&self, request: Request) -> Result<Option<Value>>;
}

/// Body attached to a [`Request`].
///
/// JSON bodies and form fields are mutually exclusive by construction.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum Payload {
    #[default]
    None,
    /// Serialized as `application/json` (v3 API).
    Json(Value),
    /// Serialized as `application/x-www-form-urlencoded` (legacy API).
    Form(Vec<(String, String)>),
    /// Serialized as `multipart/form-data` (legacy API with file parts).
    Multipart {
        fields: Vec<(String, String)>,
        files: Vec<FilePart>,
    },
}

/// A file uploaded as one part of a multipart body.
#[derive(Clone, PartialEq)]
pub struct FilePart {
    pub field: String,
    pub filename: String,
    pub content: Vec<u8>,
    pub content_type: Option<String>,
}

impl fmt::Debug for FilePart {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FilePart")
            .field("field", &self.field)
            .field("filename", &self.filename)
            .field("len", &self.content.len())
            .field("content_type", &self.content_type)
            .finish()
    }
}

/// One fully-formed call: verb, resource path, query pairs and payload.
///
/// For the v3 API `verb` is an HTTP method; for the legacy API it is the
/// action name (`get`, `add`, `delete`, ...). An optional `segment` names a
/// single entry below `path` (e.g. an email address) and is always sent as
/// exactly one URL path segment.
#[derive(Debug, Clone, PartialEq)]
pub struct Request {
    verb: String,
    path: String,
    segment: Option<String>,
    query: Vec<(String, String)>,
    payload: Payload,
}

impl Request {
    /// A request with no query and no body.
    pub fn new(verb: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            verb: verb.into(),
            path: path.into(),
            segment: None,
            query: Vec::new(),
            payload: Payload::None,
        }
    }

    /// `GET` on the v3 API.
    pub fn get(path: impl Into<String>) -> Self {
        Self::new("GET", path)
    }

    /// `POST` on the v3 API.
    pub fn post(path: impl Into<String>) -> Self {
        Self::new("POST", path)
    }

    /// `DELETE` on the v3 API.
    pub fn delete(path: impl Into<String>) -> Self {
        Self::new("DELETE", path)
    }

    /// Legacy `<path>/<action>.json` call.
    pub fn action(action: impl Into<String>, path: impl Into<String>) -> Self {
        Self::new(action, path)
    }

    /// Address one entry below `path`. `/` inside the value is percent-encoded.
    pub fn with_segment(mut self, segment: impl Into<String>) -> Self {
        self.segment = Some(segment.into());
        self
    }

    /// Replace the query pairs.
    pub fn with_query(mut self, query: Vec<(String, String)>) -> Self {
        self.query = query;
        self
    }

    /// Set a JSON body, replacing any previous payload.
    pub fn with_json(mut self, body: Value) -> Self {
        self.payload = Payload::Json(body);
        self
    }

    /// Set a form body, replacing any previous payload.
    pub fn with_form(mut self, fields: Vec<(String, String)>) -> Self {
        self.payload = Payload::Form(fields);
        self
    }

    /// Set a multipart body, replacing any previous payload.
    pub fn with_multipart(mut self, fields: Vec<(String, String)>, files: Vec<FilePart>) -> Self {
        self.payload = Payload::Multipart { fields, files };
        self
    }

    /// HTTP method or legacy action.
    pub fn verb(&self) -> &str {
        &self.verb
    }

    /// Resource path relative to the base URL.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Entry addressed below [`Request::path`], if any.
    pub fn segment(&self) -> Option<&str> {
        self.segment.as_deref()
    }

    /// Query pairs in insertion order.
    pub fn query(&self) -> &[(String, String)] {
        &self.query
    }

    /// Request body.
    pub fn payload(&self) -> &Payload {
        &self.payload
    }

    /// Check the descriptor is complete before it reaches the network.
    pub(crate) fn validate(&self) -> Result<()> {
        required(&self.verb, "verb")?;
        required(&self.path, "path")?;
        if let Some(segment) = &self.segment {
            path_segment(segment, "path segment")?;
        }
        Ok(())
    }
}

/// Ordered key/value pairs for query strings and form bodies.
///
/// Optional values go through [`Params::push_opt`], which adds nothing when the
/// value is absent.
#[derive(Debug, Clone, Default, PartialEq)]
pub(crate) struct Params(Vec<(String, String)>);

impl Params {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn push(&mut self, key: &str, value: impl ToString) -> &mut Self {
        self.0.push((key.to_string(), value.to_string()));
        self
    }

    pub(crate) fn push_opt<V: ToString>(&mut self, key: &str, value: Option<V>) -> &mut Self {
        if let Some(value) = value {
            self.push(key, value);
        }
        self
    }

    pub(crate) fn push_all<V: ToString>(&mut self, key: &str, values: &[V]) -> &mut Self {
        for value in values {
            self.push(key, value.to_string());
        }
        self
    }

    pub(crate) fn into_inner(self) -> Vec<(String, String)> {
        self.0
    }
}

/// Fail with [`Error::Argument`] when a required string is empty.
pub(crate) fn required<'a>(value: &'a str, field: &str) -> Result<&'a str> {
    if value.trim().is_empty() {
        Err(Error::argument(format!("{field} is required")))
    } else {
        Ok(value)
    }
}

/// Fail with [`Error::Argument`] when a required optional string is absent or empty.
pub(crate) fn required_opt<'a>(value: Option<&'a str>, field: &str) -> Result<&'a str> {
    required(value.unwrap_or_default(), field)
}

/// Fail with [`Error::Argument`] unless `value` can stand as one path segment.
///
/// Blank values and the dot segments `.` and `..` are rejected; URL
/// normalization would otherwise resolve them to a different resource.
pub(crate) fn path_segment<'a>(value: &'a str, field: &str) -> Result<&'a str> {
    let value = required(value, field)?;
    if value == "." || value == ".." {
        return Err(Error::argument(format!("{field} must not be {value:?}")));
    }
    Ok(value)
}

/// Join `path` onto `base`, then append `segment` as a single segment.
///
/// Every segment is percent-encoded; `/` inside `segment` becomes `%2F`.
pub(crate) fn endpoint_url(base: &Url, path: &str, segment: Option<&str>) -> Result<Url> {
    let mut url = base.clone();
    {
        let mut segments = url
            .path_segments_mut()
            .map_err(|_| Error::argument(format!("base URL cannot carry a path: {base}")))?;
        segments
            .pop_if_empty()
            .extend(path.split('/').filter(|segment| !segment.is_empty()));
        if let Some(segment) = segment {
            segments.push(path_segment(segment, "path segment")?);
        }
    }
    Ok(url)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn payload_is_replaced_not_merged() {
        let request = Request::post("mail/send")
            .with_form(vec![("a".into(), "b".into())])
            .with_json(json!({"a": "b"}));
        assert_eq!(request.payload(), &Payload::Json(json!({"a": "b"})));
    }

    #[test]
    fn validate_rejects_empty_verb_and_path() {
        assert!(Request::new("", "mail/send").validate().unwrap_err().is_argument());
        assert!(Request::get("").validate().unwrap_err().is_argument());
        assert!(Request::get("suppression/blocks").validate().is_ok());
    }

    #[test]
    fn params_skip_absent_values() {
        let mut params = Params::new();
        params
            .push("list", "Customers")
            .push_opt("name", None::<&str>)
            .push_opt("limit", Some(10))
            .push_all("email[]", &["a@x.com", "b@x.com"]);
        assert_eq!(
            params.into_inner(),
            vec![
                ("list".to_string(), "Customers".to_string()),
                ("limit".to_string(), "10".to_string()),
                ("email[]".to_string(), "a@x.com".to_string()),
                ("email[]".to_string(), "b@x.com".to_string()),
            ]
        );
    }

    #[test]
    fn required_rejects_blank() {
        assert!(required("  ", "email").is_err());
        assert!(required_opt(None, "subject").is_err());
        assert_eq!(required_opt(Some("hi"), "subject").unwrap(), "hi");
    }

    #[test]
    fn endpoint_url_joins_segments() {
        let base = Url::parse("https://api.sendgrid.com/v3").unwrap();
        assert_eq!(
            endpoint_url(&base, "suppression/blocks", Some("a@x.com")).unwrap().as_str(),
            "https://api.sendgrid.com/v3/suppression/blocks/a@x.com"
        );

        let base = Url::parse("http://127.0.0.1:8080/").unwrap();
        assert_eq!(
            endpoint_url(&base, "newsletter/lists/get.json", None).unwrap().as_str(),
            "http://127.0.0.1:8080/newsletter/lists/get.json"
        );
    }

    #[test]
    fn endpoint_url_encodes_segments() {
        let base = Url::parse("https://api.sendgrid.com/v3").unwrap();
        let url = endpoint_url(&base, "suppression/bounces", Some("odd name@x.com")).unwrap();
        assert_eq!(url.path(), "/v3/suppression/bounces/odd%20name@x.com");
    }

    #[test]
    fn endpoint_url_keeps_segment_whole() {
        let base = Url::parse("https://api.sendgrid.com/v3").unwrap();
        let url = endpoint_url(&base, "suppression/blocks", Some("a/b@x.com")).unwrap();
        assert_eq!(url.path(), "/v3/suppression/blocks/a%2Fb@x.com");
    }

    #[test]
    fn endpoint_url_rejects_dot_segments() {
        let base = Url::parse("https://api.sendgrid.com/v3").unwrap();
        for segment in [".", ".."] {
            let err = endpoint_url(&base, "suppression/blocks", Some(segment)).unwrap_err();
            assert!(err.is_argument());
        }
        assert!(
            Request::get("suppression/blocks")
                .with_segment("..")
                .validate()
                .unwrap_err()
                .is_argument()
        );
    }
}
