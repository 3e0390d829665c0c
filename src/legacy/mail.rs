//! Legacy mail send endpoint (`mail/send.json`).

use chrono::{DateTime, FixedOffset};
use crate::request::{Executor, FilePart, Params, Request, required};
use crate::{Error, Result};
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::Arc;

/// A file uploaded with a [`LegacyMessage`] as `files[<filename>]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LegacyFile {
    pub filename: String,
    pub content: Vec<u8>,
    pub content_type: Option<String>,
}

impl LegacyFile {
    /// A file with no explicit content type.
    pub fn new(filename: impl Into<String>, content: impl Into<Vec<u8>>) -> Self {
        Self {
            filename: filename.into(),
            content: content.into(),
            content_type: None,
        }
    }

    /// Set the part's `Content-Type`.
    pub fn content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = Some(content_type.into());
        self
    }
}

/// A single-recipient message for [`LegacyMail::send`].
///
/// `to`, `from`, `subject` and one of `text`/`html` are required.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LegacyMessage {
    pub to: String,
    pub to_name: Option<String>,
    /// Sent as the JSON-encoded `x-smtpapi` field.
    pub x_smtpapi: Option<Value>,
    pub from: String,
    pub from_name: Option<String>,
    pub subject: String,
    pub text: Option<String>,
    pub html: Option<String>,
    pub bcc: Vec<String>,
    /// Sent as an RFC 2822 `date` header.
    pub date: Option<DateTime<FixedOffset>>,
    /// Sent as a JSON-encoded `headers` field.
    pub headers: Option<BTreeMap<String, String>>,
    pub files: Vec<LegacyFile>,
}

impl LegacyMessage {
    fn to_request(&self) -> Result<Request> {
        let to = required(&self.to, "to")?;
        let from = required(&self.from, "from")?;
        let subject = required(&self.subject, "subject")?;
        let text = self.text.as_deref().filter(|t| !t.is_empty());
        let html = self.html.as_deref().filter(|h| !h.is_empty());
        if text.is_none() && html.is_none() {
            return Err(Error::argument("text or html is required"));
        }

        let mut params = Params::new();
        params
            .push("to", to)
            .push_opt("toname", self.to_name.as_deref())
            .push_opt(
                "x-smtpapi",
                self.x_smtpapi.as_ref().map(serde_json::to_string).transpose()?,
            )
            .push("from", from)
            .push_opt("fromname", self.from_name.as_deref())
            .push("subject", subject)
            .push_opt("text", text)
            .push_opt("html", html)
            .push_all("bcc[]", self.bcc.as_slice())
            .push_opt("date", self.date.map(|d| d.to_rfc2822()))
            .push_opt(
                "headers",
                self.headers.as_ref().map(serde_json::to_string).transpose()?,
            );

        let request = Request::action("send", "mail");
        if self.files.is_empty() {
            return Ok(request.with_form(params.into_inner()));
        }

        let mut files = Vec::with_capacity(self.files.len());
        for file in &self.files {
            let filename = required(&file.filename, "file name")?;
            files.push(FilePart {
                field: format!("files[{filename}]"),
                filename: filename.to_string(),
                content: file.content.clone(),
                content_type: file.content_type.clone(),
            });
        }
        Ok(request.with_multipart(params.into_inner(), files))
    }
}

/// Legacy mail send API.
#[derive(Debug, Clone)]
pub struct LegacyMail {
    executor: Arc<dyn Executor>,
}

impl LegacyMail {
    /// Create the facade over a legacy executor.
    pub fn new(executor: Arc<dyn Executor>) -> Self {
        Self { executor }
    }

    /// Send a message to one recipient.
    pub async fn send(&self, message: &LegacyMessage) -> Result<Option<Value>> {
        let request = message.to_request()?;
        self.executor.execute(request).await
    }
}
