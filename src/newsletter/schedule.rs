use chrono::{DateTime, SecondsFormat, Utc};
use crate::request::{Executor, Params, Request, required};
use crate::Result;
use serde_json::Value;
use std::sync::Arc;

const PATH: &str = "newsletter/schedule";

/// When to deliver a scheduled newsletter.
///
/// With neither field set the newsletter is sent immediately.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScheduleOptions {
    /// Absolute delivery time, sent as `YYYY-MM-DDTHH:MM:SS.mmmZ`.
    pub at: Option<DateTime<Utc>>,
    /// Minutes from now.
    pub after: Option<u32>,
}

/// Delivery schedule of a newsletter.
#[derive(Debug, Clone)]
pub struct NewsletterSchedule {
    executor: Arc<dyn Executor>,
}

impl NewsletterSchedule {
    /// Create the facade over a legacy executor.
    pub fn new(executor: Arc<dyn Executor>) -> Self {
        Self { executor }
    }

    /// Schedule delivery of the newsletter `name`.
    pub async fn add(&self, name: &str, options: &ScheduleOptions) -> Result<Option<Value>> {
        let mut params = Params::new();
        params
            .push("name", required(name, "name")?)
            .push_opt(
                "at",
                options
                    .at
                    .map(|at| at.to_rfc3339_opts(SecondsFormat::Millis, true)),
            )
            .push_opt("after", options.after.filter(|after| *after > 0));
        self.call("add", params).await
    }

    /// Cancel the scheduled delivery.
    pub async fn delete(&self, name: &str) -> Result<Option<Value>> {
        let mut params = Params::new();
        params.push("name", required(name, "name")?);
        self.call("delete", params).await
    }

    /// Scheduled delivery time of the newsletter `name`.
    pub async fn get(&self, name: &str) -> Result<Option<Value>> {
        let mut params = Params::new();
        params.push("name", required(name, "name")?);
        self.call("get", params).await
    }

    async fn call(&self, action: &str, params: Params) -> Result<Option<Value>> {
        let request = Request::action(action, PATH).with_form(params.into_inner());
        self.executor.execute(request).await
    }
}
