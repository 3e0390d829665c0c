//! Suppression list endpoints: blocks, bounces and invalid emails.

use chrono::{DateTime, Utc};
use crate::request::{Executor, Params, Request, path_segment, required};
use crate::{Client, Error, Result};
use serde_json::{Value, json};
use std::sync::{Arc, OnceLock};

/// Which suppression list a [`SuppressionList`] talks to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SuppressionKind {
    Blocks,
    Bounces,
    InvalidEmails,
}

impl SuppressionKind {
    /// Resource path under the v3 API.
    pub fn path(self) -> &'static str {
        match self {
            SuppressionKind::Blocks => "suppression/blocks",
            SuppressionKind::Bounces => "suppression/bounces",
            SuppressionKind::InvalidEmails => "suppression/invalid_emails",
        }
    }
}

/// Filters for [`SuppressionList::list`]. Dates are sent as epoch milliseconds.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListOptions {
    pub start: Option<DateTime<Utc>>,
    pub end: Option<DateTime<Utc>>,
    pub limit: Option<u32>,
    pub offset: Option<u32>,
}

impl ListOptions {
    fn to_query(&self) -> Vec<(String, String)> {
        let mut params = Params::new();
        params
            .push_opt("start_time", self.start.map(|d| d.timestamp_millis()))
            .push_opt("end_time", self.end.map(|d| d.timestamp_millis()))
            .push_opt("limit", self.limit)
            .push_opt("offset", self.offset);
        params.into_inner()
    }
}

/// Retrieve and delete entries of one suppression list.
#[derive(Debug, Clone)]
pub struct SuppressionList {
    executor: Arc<dyn Executor>,
    kind: SuppressionKind,
}

impl SuppressionList {
    /// Create a facade for one suppression list.
    pub fn new(executor: Arc<dyn Executor>, kind: SuppressionKind) -> Self {
        Self { executor, kind }
    }

    /// Which list this facade addresses.
    pub fn kind(&self) -> SuppressionKind {
        self.kind
    }

    /// List entries, optionally within a date range.
    pub async fn list(&self, options: &ListOptions) -> Result<Option<Value>> {
        let request = Request::get(self.kind.path()).with_query(options.to_query());
        self.executor.execute(request).await
    }

    /// Delete entries.
    ///
    /// With `Some(emails)` exactly those addresses are removed. With `None`
    /// the **entire list** is deleted (`delete_all`).
    pub async fn delete(&self, emails: Option<&[String]>) -> Result<Option<Value>> {
        let body = match emails {
            Some([]) => {
                return Err(Error::argument(
                    "emails must not be empty; pass None to delete the whole list",
                ));
            }
            Some(emails) => {
                for email in emails {
                    required(email, "email")?;
                }
                json!({ "emails": emails })
            }
            None => json!({ "delete_all": true }),
        };
        let request = Request::delete(self.kind.path()).with_json(body);
        self.executor.execute(request).await
    }

    /// Get the entry for one address.
    pub async fn get(&self, email: &str) -> Result<Option<Value>> {
        let email = path_segment(email, "email")?;
        let request = Request::get(self.kind.path()).with_segment(email);
        self.executor.execute(request).await
    }

    /// Delete the entry for one address.
    pub async fn delete_one(&self, email: &str) -> Result<Option<Value>> {
        let email = path_segment(email, "email")?;
        let request = Request::delete(self.kind.path()).with_segment(email);
        self.executor.execute(request).await
    }
}

/// Suppressions API: blocks, bounces and invalid emails.
///
/// Sub-facades are built on first access and then reused.
#[derive(Debug)]
pub struct Suppressions {
    executor: Arc<dyn Executor>,
    blocks: OnceLock<SuppressionList>,
    bounces: OnceLock<SuppressionList>,
    invalid_emails: OnceLock<SuppressionList>,
}

impl Suppressions {
    /// Create the facade with its own [`Client`].
    pub fn new(api_key: impl Into<String>) -> Result<Self> {
        Ok(Self::with_executor(Arc::new(Client::new(api_key)?)))
    }

    /// Create the facade over an existing executor.
    pub fn with_executor(executor: Arc<dyn Executor>) -> Self {
        Self {
            executor,
            blocks: OnceLock::new(),
            bounces: OnceLock::new(),
            invalid_emails: OnceLock::new(),
        }
    }

    /// Blocks API.
    pub fn blocks(&self) -> &SuppressionList {
        self.blocks
            .get_or_init(|| SuppressionList::new(self.executor.clone(), SuppressionKind::Blocks))
    }

    /// Bounces API.
    pub fn bounces(&self) -> &SuppressionList {
        self.bounces
            .get_or_init(|| SuppressionList::new(self.executor.clone(), SuppressionKind::Bounces))
    }

    /// Invalid emails API.
    pub fn invalid_emails(&self) -> &SuppressionList {
        self.invalid_emails.get_or_init(|| {
            SuppressionList::new(self.executor.clone(), SuppressionKind::InvalidEmails)
        })
    }
}
