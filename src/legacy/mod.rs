//! Legacy SendGrid web API (`https://sendgrid.com/api`).
//!
//! Credentials travel as `api_user`/`api_key` query parameters and bodies are
//! form-encoded. Errors are reported in-band as `{"message": "error", ...}` or
//! an `error` field, often with a 200 status.

mod bounces;
mod client;
mod invalid_emails;
mod mail;

pub use bounces::{BounceFilter, BounceQuery, BounceType, LegacyBounces};
pub use client::{LegacyClient, LegacyClientBuilder};
pub use invalid_emails::{InvalidEmailQuery, LegacyInvalidEmails};
pub use mail::{LegacyFile, LegacyMail, LegacyMessage};

use crate::newsletter::Newsletter;
use crate::request::Executor;
use crate::Result;
use chrono::NaiveDate;
use std::sync::{Arc, OnceLock};

/// Calendar-date representation the legacy API expects.
pub(crate) fn calendar_date(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

/// Legacy SendGrid API.
///
/// Sub-facades are created on first access and reused afterwards.
#[derive(Debug)]
pub struct LegacySendGrid {
    executor: Arc<dyn Executor>,
    bounces: OnceLock<LegacyBounces>,
    invalid_emails: OnceLock<LegacyInvalidEmails>,
    mail: OnceLock<LegacyMail>,
    newsletter: OnceLock<Newsletter>,
}

impl LegacySendGrid {
    /// Create the API with a default [`LegacyClient`].
    pub fn new(api_user: impl Into<String>, api_key: impl Into<String>) -> Result<Self> {
        Ok(Self::with_executor(Arc::new(LegacyClient::new(
            api_user, api_key,
        )?)))
    }

    /// Create the API from `SENDGRID_API_USER` and `SENDGRID_API_KEY`.
    pub fn from_env() -> Result<Self> {
        Ok(Self::with_executor(Arc::new(LegacyClient::from_env()?)))
    }

    /// Create the API on top of any executor, e.g. a configured [`LegacyClient`].
    pub fn with_executor(executor: Arc<dyn Executor>) -> Self {
        Self {
            executor,
            bounces: OnceLock::new(),
            invalid_emails: OnceLock::new(),
            mail: OnceLock::new(),
            newsletter: OnceLock::new(),
        }
    }

    /// Bounces API.
    pub fn bounces(&self) -> &LegacyBounces {
        self.bounces
            .get_or_init(|| LegacyBounces::new(self.executor.clone()))
    }

    /// Invalid emails API.
    pub fn invalid_emails(&self) -> &LegacyInvalidEmails {
        self.invalid_emails
            .get_or_init(|| LegacyInvalidEmails::new(self.executor.clone()))
    }

    /// Mail API.
    pub fn mail(&self) -> &LegacyMail {
        self.mail.get_or_init(|| LegacyMail::new(self.executor.clone()))
    }

    /// Newsletter API.
    pub fn newsletter(&self) -> &Newsletter {
        self.newsletter
            .get_or_init(|| Newsletter::with_executor(self.executor.clone()))
    }
}
