//! Legacy newsletter (marketing) API under `newsletter/*`.
//!
//! Every call goes through the legacy executor as a form-encoded
//! `<path>/<action>.json` request.

mod category;
mod identity;
mod lists;
mod recipients;
mod schedule;

pub use category::NewsletterCategory;
pub use identity::{Identity, IdentityEdit, NewsletterIdentity};
pub use lists::{ListColumns, ListEntry, NewsletterLists, NewsletterListsEmail};
pub use recipients::NewsletterRecipients;
pub use schedule::{NewsletterSchedule, ScheduleOptions};

use crate::request::{Executor, Params, Request, required};
use crate::{LegacyClient, Result};
use serde_json::Value;
use std::sync::{Arc, OnceLock};

const PATH: &str = "newsletter";

/// Fields for [`Newsletter::edit`].
///
/// `subject`, `text` and `html` are required; `newname` renames the newsletter.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NewsletterEdit {
    pub newname: Option<String>,
    pub subject: String,
    pub text: String,
    pub html: String,
}

/// Newsletters and their sub-resources.
#[derive(Debug)]
pub struct Newsletter {
    executor: Arc<dyn Executor>,
    category: OnceLock<NewsletterCategory>,
    identity: OnceLock<NewsletterIdentity>,
    lists: OnceLock<NewsletterLists>,
    recipients: OnceLock<NewsletterRecipients>,
    schedule: OnceLock<NewsletterSchedule>,
}

impl Newsletter {
    /// Create the API with a default [`LegacyClient`].
    pub fn new(api_user: impl Into<String>, api_key: impl Into<String>) -> Result<Self> {
        Ok(Self::with_executor(Arc::new(LegacyClient::new(
            api_user, api_key,
        )?)))
    }

    /// Create the API on top of any legacy executor.
    pub fn with_executor(executor: Arc<dyn Executor>) -> Self {
        Self {
            executor,
            category: OnceLock::new(),
            identity: OnceLock::new(),
            lists: OnceLock::new(),
            recipients: OnceLock::new(),
            schedule: OnceLock::new(),
        }
    }

    /// Categories API.
    pub fn category(&self) -> &NewsletterCategory {
        self.category
            .get_or_init(|| NewsletterCategory::new(self.executor.clone()))
    }

    /// Sender identities API.
    pub fn identity(&self) -> &NewsletterIdentity {
        self.identity
            .get_or_init(|| NewsletterIdentity::new(self.executor.clone()))
    }

    /// Recipient lists API.
    pub fn lists(&self) -> &NewsletterLists {
        self.lists
            .get_or_init(|| NewsletterLists::new(self.executor.clone()))
    }

    /// Lists attached to newsletters.
    pub fn recipients(&self) -> &NewsletterRecipients {
        self.recipients
            .get_or_init(|| NewsletterRecipients::new(self.executor.clone()))
    }

    /// Delivery schedule API.
    pub fn schedule(&self) -> &NewsletterSchedule {
        self.schedule
            .get_or_init(|| NewsletterSchedule::new(self.executor.clone()))
    }

    /// Create a newsletter. Every argument is required.
    pub async fn add(
        &self,
        identity: &str,
        name: &str,
        subject: &str,
        text: &str,
        html: &str,
    ) -> Result<Option<Value>> {
        let mut params = Params::new();
        params
            .push("identity", required(identity, "identity")?)
            .push("name", required(name, "name")?)
            .push("subject", required(subject, "subject")?)
            .push("text", required(text, "text")?)
            .push("html", required(html, "html")?);
        self.call("add", params).await
    }

    /// Replace the content of an existing newsletter.
    pub async fn edit(
        &self,
        identity: &str,
        name: &str,
        edit: &NewsletterEdit,
    ) -> Result<Option<Value>> {
        let mut params = Params::new();
        params
            .push("identity", required(identity, "identity")?)
            .push("name", required(name, "name")?)
            .push_opt("newname", edit.newname.as_deref().filter(|n| !n.is_empty()))
            .push("subject", required(&edit.subject, "subject")?)
            .push("text", required(&edit.text, "text")?)
            .push("html", required(&edit.html, "html")?);
        self.call("edit", params).await
    }

    /// Delete the newsletter `name`.
    pub async fn delete(&self, name: &str) -> Result<Option<Value>> {
        let mut params = Params::new();
        params.push("name", required(name, "name")?);
        self.call("delete", params).await
    }

    /// Contents of one newsletter.
    pub async fn get(&self, name: &str) -> Result<Option<Value>> {
        let mut params = Params::new();
        params.push("name", required(name, "name")?);
        self.call("get", params).await
    }

    /// All newsletters, or only the one called `name`.
    pub async fn list(&self, name: Option<&str>) -> Result<Option<Value>> {
        let mut params = Params::new();
        params.push_opt("name", name.filter(|n| !n.is_empty()));
        self.call("list", params).await
    }

    async fn call(&self, action: &str, params: Params) -> Result<Option<Value>> {
        let request = Request::action(action, PATH).with_form(params.into_inner());
        self.executor.execute(request).await
    }
}
