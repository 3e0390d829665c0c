//! Mail send endpoint (`POST mail/send`).

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use chrono::{DateTime, Utc};
use crate::request::{Executor, Request, required, required_opt};
use crate::{Client, Error, Result};
use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

/// An address with an optional display name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EmailAddress {
    pub email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl EmailAddress {
    /// An address without a display name.
    pub fn new(email: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            name: None,
        }
    }

    /// An address with a display name.
    pub fn with_name(email: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            name: Some(name.into()),
        }
    }
}

impl From<&str> for EmailAddress {
    fn from(email: &str) -> Self {
        Self::new(email)
    }
}

/// A file attached to a [`Message`].
///
/// `content` holds the raw bytes; it is base64-encoded when the message is sent.
#[derive(Clone, PartialEq, Eq)]
pub struct Attachment {
    pub content: Vec<u8>,
    pub filename: String,
    /// MIME type, sent as `type`.
    pub mime_type: Option<String>,
    /// `attachment` or `inline`.
    pub disposition: Option<String>,
    /// Content id for inline attachments, sent as `content_id`.
    pub content_id: Option<String>,
}

impl Attachment {
    /// Raw attachment bytes; encoding to base64 happens at send time.
    pub fn new(filename: impl Into<String>, content: impl Into<Vec<u8>>) -> Self {
        Self {
            content: content.into(),
            filename: filename.into(),
            mime_type: None,
            disposition: None,
            content_id: None,
        }
    }

    /// Set the MIME type, sent as `type`.
    pub fn mime_type(mut self, mime_type: impl Into<String>) -> Self {
        self.mime_type = Some(mime_type.into());
        self
    }

    /// `inline` or `attachment`.
    pub fn disposition(mut self, disposition: impl Into<String>) -> Self {
        self.disposition = Some(disposition.into());
        self
    }

    /// Content ID for inline attachments.
    pub fn content_id(mut self, content_id: impl Into<String>) -> Self {
        self.content_id = Some(content_id.into());
        self
    }
}

impl fmt::Debug for Attachment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Attachment")
            .field("filename", &self.filename)
            .field("len", &self.content.len())
            .field("mime_type", &self.mime_type)
            .field("disposition", &self.disposition)
            .field("content_id", &self.content_id)
            .finish()
    }
}

/// A message for [`Mail::send`].
///
/// Required: at least one `to` recipient, `from`, `subject`, and `text` or
/// `html`. Everything else is left out of the request when `None`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Message {
    pub to: Vec<EmailAddress>,
    pub cc: Option<Vec<EmailAddress>>,
    pub bcc: Option<Vec<EmailAddress>>,
    pub reply_to: Option<EmailAddress>,
    pub from: Option<EmailAddress>,
    pub subject: Option<String>,
    pub text: Option<String>,
    pub html: Option<String>,
    pub attachments: Option<Vec<Attachment>>,
    pub template_id: Option<String>,
    pub sections: Option<BTreeMap<String, String>>,
    pub headers: Option<BTreeMap<String, String>>,
    pub categories: Option<Vec<String>>,
    pub custom_args: Option<BTreeMap<String, String>>,
    /// Sent as epoch milliseconds.
    pub send_at: Option<DateTime<Utc>>,
    pub batch_id: Option<String>,
    pub asm: Option<Value>,
    pub ip_pool_name: Option<String>,
    pub mail_settings: Option<Value>,
    pub tracking_settings: Option<Value>,
}

impl Message {
    /// Check the required fields without building a request.
    pub fn validate(&self) -> Result<()> {
        if self.to.is_empty() {
            return Err(Error::argument("recipients are required"));
        }
        validate_recipients(&self.to, "to")?;
        if let Some(cc) = &self.cc {
            validate_recipients(cc, "cc")?;
        }
        if let Some(bcc) = &self.bcc {
            validate_recipients(bcc, "bcc")?;
        }
        let from = self
            .from
            .as_ref()
            .ok_or_else(|| Error::argument("sender email is required"))?;
        required(&from.email, "sender email")?;
        required_opt(self.subject.as_deref(), "subject")?;
        if is_blank(&self.text) && is_blank(&self.html) {
            return Err(Error::argument("body is required"));
        }
        for attachment in self.attachments.iter().flatten() {
            required(&attachment.filename, "attachment filename")?;
        }
        Ok(())
    }

    /// Build the JSON body sent to `mail/send`.
    fn to_body(&self) -> Result<Value> {
        self.validate()?;

        let mut content = Vec::with_capacity(2);
        if let Some(text) = self.text.as_deref().filter(|t| !t.is_empty()) {
            content.push(Content {
                kind: "text/plain",
                value: text,
            });
        }
        if let Some(html) = self.html.as_deref().filter(|h| !h.is_empty()) {
            content.push(Content {
                kind: "text/html",
                value: html,
            });
        }

        let attachments = self.attachments.as_ref().map(|attachments| {
            attachments
                .iter()
                .map(|a| EncodedAttachment {
                    content: STANDARD.encode(&a.content),
                    kind: a.mime_type.as_deref(),
                    filename: &a.filename,
                    disposition: a.disposition.as_deref(),
                    content_id: a.content_id.as_deref(),
                })
                .collect()
        });

        let body = SendBody {
            personalizations: [Personalization {
                to: &self.to,
                cc: self.cc.as_deref(),
                bcc: self.bcc.as_deref(),
            }],
            subject: self.subject.as_deref().unwrap_or_default(),
            from: self.from.as_ref(),
            reply_to: self.reply_to.as_ref(),
            content,
            attachments,
            template_id: self.template_id.as_deref(),
            sections: self.sections.as_ref(),
            headers: self.headers.as_ref(),
            categories: self.categories.as_deref(),
            custom_args: self.custom_args.as_ref(),
            send_at: self.send_at.map(|at| at.timestamp_millis()),
            batch_id: self.batch_id.as_deref(),
            asm: self.asm.as_ref(),
            ip_pool_name: self.ip_pool_name.as_deref(),
            mail_settings: self.mail_settings.as_ref(),
            tracking_settings: self.tracking_settings.as_ref(),
        };
        Ok(serde_json::to_value(body)?)
    }
}

fn is_blank(value: &Option<String>) -> bool {
    value.as_deref().is_none_or(str::is_empty)
}

fn validate_recipients(recipients: &[EmailAddress], field: &str) -> Result<()> {
    for recipient in recipients {
        required(&recipient.email, &format!("{field} email"))?;
    }
    Ok(())
}

#[derive(Serialize)]
struct SendBody<'a> {
    personalizations: [Personalization<'a>; 1],
    subject: &'a str,
    from: Option<&'a EmailAddress>,
    #[serde(skip_serializing_if = "Option::is_none")]
    reply_to: Option<&'a EmailAddress>,
    content: Vec<Content<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    attachments: Option<Vec<EncodedAttachment<'a>>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    template_id: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    sections: Option<&'a BTreeMap<String, String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    headers: Option<&'a BTreeMap<String, String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    categories: Option<&'a [String]>,
    #[serde(skip_serializing_if = "Option::is_none")]
    custom_args: Option<&'a BTreeMap<String, String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    send_at: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    batch_id: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    asm: Option<&'a Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    ip_pool_name: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    mail_settings: Option<&'a Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tracking_settings: Option<&'a Value>,
}

#[derive(Serialize)]
struct Personalization<'a> {
    to: &'a [EmailAddress],
    #[serde(skip_serializing_if = "Option::is_none")]
    cc: Option<&'a [EmailAddress]>,
    #[serde(skip_serializing_if = "Option::is_none")]
    bcc: Option<&'a [EmailAddress]>,
}

#[derive(Serialize)]
struct Content<'a> {
    #[serde(rename = "type")]
    kind: &'static str,
    value: &'a str,
}

#[derive(Serialize)]
struct EncodedAttachment<'a> {
    content: String,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    kind: Option<&'a str>,
    filename: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    disposition: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    content_id: Option<&'a str>,
}

/// Mail send API.
#[derive(Debug, Clone)]
pub struct Mail {
    executor: Arc<dyn Executor>,
}

impl Mail {
    /// Create the facade with its own [`Client`].
    pub fn new(api_key: impl Into<String>) -> Result<Self> {
        Ok(Self::with_executor(Arc::new(Client::new(api_key)?)))
    }

    /// Create the facade over an existing executor.
    pub fn with_executor(executor: Arc<dyn Executor>) -> Self {
        Self { executor }
    }

    /// Send a message.
    ///
    /// SendGrid queues mail and answers 202, so a successful send yields `None`.
    ///
    /// # Examples
    /// ```no_run
    /// # use sendgrid_client::{EmailAddress, Mail, Message};
    /// # #[tokio::main]
    /// # async fn main() -> Result<(), sendgrid_client::Error> {
    /// let mail = Mail::new("SG.xxxxx")?;
    /// let message = Message {
    ///     to: vec![EmailAddress::with_name("to@example.com", "To")],
    ///     from: Some("from@example.com".into()),
    ///     subject: Some("Hello".into()),
    ///     text: Some("Hello there\n".into()),
    ///     ..Default::default()
    /// };
    /// mail.send(&message).await?;
    /// # Ok(())
    /// # }
    /// ```
    pub async fn send(&self, message: &Message) -> Result<Option<Value>> {
        let body = message.to_body()?;
        self.executor
            .execute(Request::post("mail/send").with_json(body))
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::request::Payload;
    use crate::testing::RecordingExecutor;
    use chrono::TimeZone;
    use serde_json::json;

    fn message() -> Message {
        Message {
            to: vec![EmailAddress::with_name("to@example.com", "To")],
            from: Some(EmailAddress::with_name("from@example.com", "From")),
            subject: Some("Test Message".into()),
            text: Some("TestMessage\n".into()),
            html: Some("<p>TestMessage<p>\n".into()),
            ..Default::default()
        }
    }

    fn sent_body(executor: &RecordingExecutor) -> Value {
        match executor.last().payload() {
            Payload::Json(body) => body.clone(),
            other => panic!("expected JSON payload, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn send_posts_content_in_fixed_order() {
        let executor = Arc::new(RecordingExecutor::default());
        let mail = Mail::with_executor(executor.clone());

        let result = mail.send(&message()).await.unwrap();
        assert_eq!(result, None);

        let request = executor.last();
        assert_eq!(request.verb(), "POST");
        assert_eq!(request.path(), "mail/send");
        assert!(request.query().is_empty());

        let body = sent_body(&executor);
        assert_eq!(
            body["content"],
            json!([
                {"type": "text/plain", "value": "TestMessage\n"},
                {"type": "text/html", "value": "<p>TestMessage<p>\n"},
            ])
        );
        assert_eq!(
            body["personalizations"],
            json!([{"to": [{"email": "to@example.com", "name": "To"}]}])
        );
        assert_eq!(body["from"], json!({"email": "from@example.com", "name": "From"}));
        assert_eq!(body["subject"], json!("Test Message"));
    }

    #[tokio::test]
    async fn send_omits_absent_optional_fields() {
        let executor = Arc::new(RecordingExecutor::default());
        let mail = Mail::with_executor(executor.clone());

        let msg = Message {
            html: None,
            ..message()
        };
        mail.send(&msg).await.unwrap();

        let body = sent_body(&executor);
        let mut keys: Vec<&str> = body.as_object().unwrap().keys().map(String::as_str).collect();
        keys.sort_unstable();
        assert_eq!(keys, ["content", "from", "personalizations", "subject"]);
        assert_eq!(body["content"].as_array().unwrap().len(), 1);
        assert!(body["personalizations"][0].get("cc").is_none());
    }

    #[tokio::test]
    async fn send_encodes_attachments_and_passes_extras_through() {
        let executor = Arc::new(RecordingExecutor::default());
        let mail = Mail::with_executor(executor.clone());

        let msg = Message {
            cc: Some(vec![EmailAddress::new("cc@example.com")]),
            reply_to: Some(EmailAddress::new("no-reply@example.com")),
            attachments: Some(vec![
                Attachment::new("abc.txt", "abc\n").mime_type("text/plain"),
            ]),
            template_id: Some("d-123".into()),
            headers: Some(BTreeMap::from([("X-Order-ID".to_string(), "432432".to_string())])),
            categories: Some(vec!["orders".into()]),
            custom_args: Some(BTreeMap::from([("order".to_string(), "1".to_string())])),
            send_at: Some(Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()),
            batch_id: Some("batch-1".into()),
            tracking_settings: Some(json!({"click_tracking": {"enable": false}})),
            ..message()
        };
        mail.send(&msg).await.unwrap();

        let body = sent_body(&executor);
        assert_eq!(
            body["attachments"],
            json!([{"content": "YWJjCg==", "type": "text/plain", "filename": "abc.txt"}])
        );
        assert_eq!(body["personalizations"][0]["cc"], json!([{"email": "cc@example.com"}]));
        assert_eq!(body["reply_to"], json!({"email": "no-reply@example.com"}));
        assert_eq!(body["template_id"], json!("d-123"));
        assert_eq!(body["headers"], json!({"X-Order-ID": "432432"}));
        assert_eq!(body["categories"], json!(["orders"]));
        assert_eq!(body["custom_args"], json!({"order": "1"}));
        assert_eq!(body["send_at"], json!(1_704_067_200_000_i64));
        assert_eq!(body["batch_id"], json!("batch-1"));
        assert_eq!(body["tracking_settings"], json!({"click_tracking": {"enable": false}}));
        assert!(body.get("mail_settings").is_none());
    }

    #[tokio::test]
    async fn send_rejects_missing_required_fields_without_calling() {
        let executor = Arc::new(RecordingExecutor::default());
        let mail = Mail::with_executor(executor.clone());

        let cases = [
            Message {
                to: vec![],
                ..message()
            },
            Message {
                from: None,
                ..message()
            },
            Message {
                subject: None,
                ..message()
            },
            Message {
                subject: Some(String::new()),
                ..message()
            },
            Message {
                text: None,
                html: None,
                ..message()
            },
            Message {
                cc: Some(vec![EmailAddress::new("")]),
                ..message()
            },
            Message {
                bcc: Some(vec![EmailAddress::new(" ")]),
                ..message()
            },
        ];
        for msg in cases {
            let err = mail.send(&msg).await.unwrap_err();
            assert!(err.is_argument(), "{msg:?} gave {err:?}");
        }
        assert_eq!(executor.calls(), 0);
    }

    #[tokio::test]
    async fn send_returns_provider_payload_when_present() {
        let executor = Arc::new(RecordingExecutor::responding(json!({"id": "abc"})));
        let mail = Mail::with_executor(executor);
        assert_eq!(mail.send(&message()).await.unwrap(), Some(json!({"id": "abc"})));
    }

    #[test]
    fn attachment_debug_hides_content() {
        let rendered = format!("{:?}", Attachment::new("a.bin", vec![1, 2, 3]));
        assert!(rendered.contains("len: 3"));
    }
}
