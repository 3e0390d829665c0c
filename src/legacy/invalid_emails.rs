//! Legacy invalid emails endpoints (`invalidemails/<action>.json`).

use chrono::NaiveDate;
use crate::request::{Executor, Params, Request, required};
use crate::Result;
use serde_json::Value;
use std::sync::Arc;
use super::calendar_date;

const PATH: &str = "invalidemails";

/// Filters for [`LegacyInvalidEmails::get`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InvalidEmailQuery {
    /// Include the timestamp of each record.
    pub date: bool,
    pub days: Option<u32>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub limit: Option<u32>,
    pub offset: Option<u32>,
    pub email: Option<String>,
}

/// Retrieve and delete entries of the invalid emails list.
#[derive(Debug, Clone)]
pub struct LegacyInvalidEmails {
    executor: Arc<dyn Executor>,
}

impl LegacyInvalidEmails {
    /// Create the facade over a legacy executor.
    pub fn new(executor: Arc<dyn Executor>) -> Self {
        Self { executor }
    }

    /// List invalid addresses matching `query`.
    pub async fn get(&self, query: &InvalidEmailQuery) -> Result<Option<Value>> {
        let mut params = Params::new();
        params
            .push_opt("date", query.date.then_some(1))
            .push_opt("days", query.days)
            .push_opt("start_date", query.start_date.map(calendar_date))
            .push_opt("end_date", query.end_date.map(calendar_date))
            .push_opt("limit", query.limit)
            .push_opt("offset", query.offset)
            .push_opt("email", query.email.as_deref());
        let request = Request::action("get", PATH).with_form(params.into_inner());
        self.executor.execute(request).await
    }

    /// Remove one address from the list.
    pub async fn delete(&self, email: &str) -> Result<Option<Value>> {
        let email = required(email, "email")?;
        let mut params = Params::new();
        params.push("email", email);
        let request = Request::action("delete", PATH).with_form(params.into_inner());
        self.executor.execute(request).await
    }
}
