use crate::request::{Executor, Params, Request, required};
use crate::Result;
use serde_json::Value;
use std::sync::Arc;

const PATH: &str = "newsletter/recipients";

/// Recipient lists attached to a newsletter.
#[derive(Debug, Clone)]
pub struct NewsletterRecipients {
    executor: Arc<dyn Executor>,
}

impl NewsletterRecipients {
    /// Create the facade over a legacy executor.
    pub fn new(executor: Arc<dyn Executor>) -> Self {
        Self { executor }
    }

    /// Attach `list` to the newsletter `name`.
    pub async fn add(&self, name: &str, list: &str) -> Result<Option<Value>> {
        self.call("add", name, Some(list)).await
    }

    /// Detach `list` from the newsletter `name`.
    pub async fn delete(&self, name: &str, list: &str) -> Result<Option<Value>> {
        self.call("delete", name, Some(list)).await
    }

    /// Lists attached to the newsletter `name`.
    pub async fn get(&self, name: &str) -> Result<Option<Value>> {
        self.call("get", name, None).await
    }

    async fn call(&self, action: &str, name: &str, list: Option<&str>) -> Result<Option<Value>> {
        let mut params = Params::new();
        params.push("name", required(name, "name")?);
        if let Some(list) = list {
            params.push("list", required(list, "list")?);
        }
        let request = Request::action(action, PATH).with_form(params.into_inner());
        self.executor.execute(request).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::request::Payload;
    use crate::testing::{RecordingExecutor, pairs};

    #[tokio::test]
    async fn add_delete_get() {
        let executor = Arc::new(RecordingExecutor::default());
        let recipients = NewsletterRecipients::new(executor.clone());

        recipients.add("Weekly", "Customers").await.unwrap();
        let request = executor.last();
        assert_eq!(request.path(), "newsletter/recipients");
        assert_eq!(request.verb(), "add");
        assert_eq!(
            request.payload(),
            &Payload::Form(pairs(&[("name", "Weekly"), ("list", "Customers")]))
        );

        recipients.delete("Weekly", "Customers").await.unwrap();
        assert_eq!(executor.last().verb(), "delete");

        recipients.get("Weekly").await.unwrap();
        assert_eq!(
            executor.last().payload(),
            &Payload::Form(pairs(&[("name", "Weekly")]))
        );
    }

    #[tokio::test]
    async fn missing_arguments_never_call() {
        let executor = Arc::new(RecordingExecutor::default());
        let recipients = NewsletterRecipients::new(executor.clone());

        assert!(recipients.add("", "Customers").await.unwrap_err().is_argument());
        assert!(recipients.delete("Weekly", "").await.unwrap_err().is_argument());
        assert!(recipients.get("").await.unwrap_err().is_argument());
        assert_eq!(executor.calls(), 0);
    }
}
