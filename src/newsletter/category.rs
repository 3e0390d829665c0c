use crate::request::{Executor, Params, Request, required};
use crate::Result;
use serde_json::Value;
use std::sync::Arc;

const PATH: &str = "newsletter/category";

/// Newsletter categories.
#[derive(Debug, Clone)]
pub struct NewsletterCategory {
    executor: Arc<dyn Executor>,
}

impl NewsletterCategory {
    /// Create the facade over a legacy executor.
    pub fn new(executor: Arc<dyn Executor>) -> Self {
        Self { executor }
    }

    /// Assign `category` to the newsletter `name`.
    pub async fn add(&self, category: &str, name: &str) -> Result<Option<Value>> {
        let mut params = Params::new();
        params
            .push("category", required(category, "category")?)
            .push("name", required(name, "name")?);
        self.call("add", params).await
    }

    /// Create a category.
    pub async fn create(&self, category: &str) -> Result<Option<Value>> {
        let mut params = Params::new();
        params.push("category", required(category, "category")?);
        self.call("create", params).await
    }

    /// All categories, or check whether `category` exists.
    pub async fn list(&self, category: Option<&str>) -> Result<Option<Value>> {
        let mut params = Params::new();
        params.push_opt("category", category.filter(|c| !c.is_empty()));
        self.call("list", params).await
    }

    /// Remove `category` from the newsletter, or every category when `None`.
    pub async fn remove(&self, name: &str, category: Option<&str>) -> Result<Option<Value>> {
        let mut params = Params::new();
        params
            .push("name", required(name, "name")?)
            .push_opt("category", category.filter(|c| !c.is_empty()));
        self.call("remove", params).await
    }

    async fn call(&self, action: &str, params: Params) -> Result<Option<Value>> {
        let request = Request::action(action, PATH).with_form(params.into_inner());
        self.executor.execute(request).await
    }
}
