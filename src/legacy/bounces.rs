//! Legacy bounces endpoints (`bounces/<action>.json`).

use chrono::NaiveDate;
use crate::request::{Executor, Params, Request};
use crate::Result;
use serde_json::Value;
use std::sync::Arc;
use super::calendar_date;

const PATH: &str = "bounces";

/// Bounce classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BounceType {
    Hard,
    Soft,
}

impl BounceType {
    /// Wire value of the `type` field.
    pub fn as_str(self) -> &'static str {
        match self {
            BounceType::Hard => "hard",
            BounceType::Soft => "soft",
        }
    }
}

/// Filters for [`LegacyBounces::get`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BounceQuery {
    /// Include the timestamp of each bounce record.
    pub date: bool,
    /// Days in the past to include (today counts).
    pub days: Option<u32>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub limit: Option<u32>,
    pub offset: Option<u32>,
    pub bounce_type: Option<BounceType>,
    pub email: Option<String>,
}

/// Filters for [`LegacyBounces::delete`] and [`LegacyBounces::count`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BounceFilter {
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub bounce_type: Option<BounceType>,
    pub email: Option<String>,
}

impl BounceFilter {
    fn to_form(&self) -> Vec<(String, String)> {
        let mut params = Params::new();
        params
            .push_opt("start_date", self.start_date.map(calendar_date))
            .push_opt("end_date", self.end_date.map(calendar_date))
            .push_opt("type", self.bounce_type.map(BounceType::as_str))
            .push_opt("email", self.email.as_deref());
        params.into_inner()
    }
}

/// Retrieve, count and delete entries of the bounce list.
#[derive(Debug, Clone)]
pub struct LegacyBounces {
    executor: Arc<dyn Executor>,
}

impl LegacyBounces {
    /// Create the facade over a legacy executor.
    pub fn new(executor: Arc<dyn Executor>) -> Self {
        Self { executor }
    }

    /// List bounces with addresses and response codes.
    pub async fn get(&self, query: &BounceQuery) -> Result<Option<Value>> {
        let mut params = Params::new();
        params
            .push_opt("date", query.date.then_some(1))
            .push_opt("days", query.days)
            .push_opt("start_date", query.start_date.map(calendar_date))
            .push_opt("end_date", query.end_date.map(calendar_date))
            .push_opt("limit", query.limit)
            .push_opt("offset", query.offset)
            .push_opt("type", query.bounce_type.map(BounceType::as_str))
            .push_opt("email", query.email.as_deref());
        let request = Request::action("get", PATH).with_form(params.into_inner());
        self.executor.execute(request).await
    }

    /// Delete bounces matching `filter`.
    ///
    /// An empty filter deletes the **entire** bounce list.
    pub async fn delete(&self, filter: &BounceFilter) -> Result<Option<Value>> {
        let request = Request::action("delete", PATH).with_form(filter.to_form());
        self.executor.execute(request).await
    }

    /// Count bounces matching `filter`.
    pub async fn count(&self, filter: &BounceFilter) -> Result<Option<Value>> {
        let request = Request::action("count", PATH).with_form(filter.to_form());
        self.executor.execute(request).await
    }
}
