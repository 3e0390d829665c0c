use crate::request::{Executor, Params, Request, required};
use crate::{Error, Result};
use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::{Arc, OnceLock};

const PATH: &str = "newsletter/lists";
const EMAIL_PATH: &str = "newsletter/lists/email";

/// Column layout for a new recipient list.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListColumns {
    /// Column name used for the recipient's name.
    pub name: Option<String>,
    /// Additional columns, sent as top-level form fields.
    pub columns: BTreeMap<String, String>,
}

/// One recipient added with [`NewsletterListsEmail::add`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ListEntry {
    pub email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Values for any extra list columns. Keys may not be `email` or `name`.
    #[serde(flatten)]
    pub extra: BTreeMap<String, String>,
}

impl ListEntry {
    /// An entry with only an email address.
    pub fn new(email: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            ..Default::default()
        }
    }

    /// Set the recipient name.
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Set the value of an extra list column.
    pub fn column(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.extra.insert(key.into(), value.into());
        self
    }
}

/// Recipient lists.
#[derive(Debug)]
pub struct NewsletterLists {
    executor: Arc<dyn Executor>,
    email: OnceLock<NewsletterListsEmail>,
}

impl NewsletterLists {
    /// Create the facade over a legacy executor.
    pub fn new(executor: Arc<dyn Executor>) -> Self {
        Self {
            executor,
            email: OnceLock::new(),
        }
    }

    /// Addresses stored in lists.
    pub fn email(&self) -> &NewsletterListsEmail {
        self.email
            .get_or_init(|| NewsletterListsEmail::new(self.executor.clone()))
    }

    /// Create the list `list`.
    ///
    /// Extra columns may not be called `list` or `name`, which would clash
    /// with the request's own fields.
    pub async fn add(&self, list: &str, columns: &ListColumns) -> Result<Option<Value>> {
        let mut params = Params::new();
        params
            .push("list", required(list, "list")?)
            .push_opt("name", columns.name.as_deref().filter(|n| !n.is_empty()));
        for (key, value) in &columns.columns {
            if key == "list" || key == "name" {
                return Err(Error::argument(format!("column name {key:?} is reserved")));
            }
            params.push(key, value);
        }
        self.call(PATH, "add", params).await
    }

    /// Delete the list `list`.
    pub async fn delete(&self, list: &str) -> Result<Option<Value>> {
        let mut params = Params::new();
        params.push("list", required(list, "list")?);
        self.call(PATH, "delete", params).await
    }

    /// Rename `list` to `newlist`.
    pub async fn edit(&self, list: &str, newlist: &str) -> Result<Option<Value>> {
        let mut params = Params::new();
        params
            .push("list", required(list, "list")?)
            .push("newlist", required(newlist, "newlist")?);
        self.call(PATH, "edit", params).await
    }

    /// All lists, or only `list` when given.
    pub async fn get(&self, list: Option<&str>) -> Result<Option<Value>> {
        let mut params = Params::new();
        params.push_opt("list", list.filter(|l| !l.is_empty()));
        self.call(PATH, "get", params).await
    }

    async fn call(&self, path: &str, action: &str, params: Params) -> Result<Option<Value>> {
        execute(&self.executor, path, action, params).await
    }
}

/// Addresses stored in a recipient list.
#[derive(Debug, Clone)]
pub struct NewsletterListsEmail {
    executor: Arc<dyn Executor>,
}

impl NewsletterListsEmail {
    /// Create the facade over a legacy executor.
    pub fn new(executor: Arc<dyn Executor>) -> Self {
        Self { executor }
    }

    /// Add `entries` to `list`, one JSON-encoded `data[]` field per entry.
    pub async fn add(&self, list: &str, entries: &[ListEntry]) -> Result<Option<Value>> {
        let list = required(list, "list")?;
        if entries.is_empty() {
            return Err(Error::argument("data is required"));
        }
        let mut params = Params::new();
        params.push("list", list);
        for entry in entries {
            required(&entry.email, "email")?;
            if let Some(key) = entry.extra.keys().find(|k| *k == "email" || *k == "name") {
                return Err(Error::argument(format!("column name {key:?} is reserved")));
            }
            params.push("data[]", serde_json::to_string(entry)?);
        }
        execute(&self.executor, EMAIL_PATH, "add", params).await
    }

    /// Remove `emails` from `list`.
    pub async fn delete(&self, list: &str, emails: &[String]) -> Result<Option<Value>> {
        let list = required(list, "list")?;
        if emails.is_empty() {
            return Err(Error::argument("email is required"));
        }
        let mut params = Params::new();
        params.push("list", list).push_all("email[]", emails);
        execute(&self.executor, EMAIL_PATH, "delete", params).await
    }

    /// Entries of `list`, narrowed to `emails` when any are given.
    pub async fn get(&self, list: &str, emails: &[String]) -> Result<Option<Value>> {
        let mut params = Params::new();
        params
            .push("list", required(list, "list")?)
            .push_all("email[]", emails);
        execute(&self.executor, EMAIL_PATH, "get", params).await
    }
}

async fn execute(
    executor: &Arc<dyn Executor>,
    path: &str,
    action: &str,
    params: Params,
) -> Result<Option<Value>> {
    let request = Request::action(action, path).with_form(params.into_inner());
    executor.execute(request).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::request::Payload;
    use crate::testing::{RecordingExecutor, pairs};

    #[tokio::test]
    async fn add_flattens_columns() {
        let executor = Arc::new(RecordingExecutor::default());
        let lists = NewsletterLists::new(executor.clone());

        let columns = ListColumns {
            name: Some("fullname".into()),
            columns: BTreeMap::from([
                ("city".to_string(), "text".to_string()),
                ("age".to_string(), "number".to_string()),
            ]),
        };
        lists.add("Customers", &columns).await.unwrap();

        let request = executor.last();
        assert_eq!(request.path(), "newsletter/lists");
        assert_eq!(request.verb(), "add");
        assert_eq!(
            request.payload(),
            &Payload::Form(pairs(&[
                ("list", "Customers"),
                ("name", "fullname"),
                ("age", "number"),
                ("city", "text"),
            ]))
        );
    }

    #[tokio::test]
    async fn add_rejects_reserved_columns() {
        let executor = Arc::new(RecordingExecutor::default());
        let lists = NewsletterLists::new(executor.clone());

        let columns = ListColumns {
            name: None,
            columns: BTreeMap::from([("list".to_string(), "x".to_string())]),
        };
        assert!(lists.add("Customers", &columns).await.unwrap_err().is_argument());
        assert!(
            lists
                .add("", &ListColumns::default())
                .await
                .unwrap_err()
                .is_argument()
        );
        assert_eq!(executor.calls(), 0);
    }

    #[tokio::test]
    async fn edit_get_delete() {
        let executor = Arc::new(RecordingExecutor::default());
        let lists = NewsletterLists::new(executor.clone());

        lists.edit("Customers", "Clients").await.unwrap();
        assert_eq!(
            executor.last().payload(),
            &Payload::Form(pairs(&[("list", "Customers"), ("newlist", "Clients")]))
        );
        assert!(lists.edit("Customers", "").await.unwrap_err().is_argument());

        lists.get(None).await.unwrap();
        assert_eq!(executor.last().payload(), &Payload::Form(vec![]));
        lists.get(Some("Clients")).await.unwrap();
        assert_eq!(
            executor.last().payload(),
            &Payload::Form(pairs(&[("list", "Clients")]))
        );

        lists.delete("Clients").await.unwrap();
        assert_eq!(executor.last().verb(), "delete");
        assert_eq!(executor.calls(), 4);
    }

    #[tokio::test]
    async fn email_add_encodes_each_entry() {
        let executor = Arc::new(RecordingExecutor::default());
        let lists = NewsletterLists::new(executor.clone());

        let entries = [
            ListEntry::new("a@x.com").name("A"),
            ListEntry::new("b@x.com").column("city", "Oslo"),
        ];
        lists.email().add("Customers", &entries).await.unwrap();

        let request = executor.last();
        assert_eq!(request.path(), "newsletter/lists/email");
        assert_eq!(request.verb(), "add");
        assert_eq!(
            request.payload(),
            &Payload::Form(pairs(&[
                ("list", "Customers"),
                ("data[]", r#"{"email":"a@x.com","name":"A"}"#),
                ("data[]", r#"{"email":"b@x.com","city":"Oslo"}"#),
            ]))
        );
    }

    #[tokio::test]
    async fn email_add_and_delete_require_entries() {
        let executor = Arc::new(RecordingExecutor::default());
        let email = NewsletterListsEmail::new(executor.clone());

        assert!(email.add("Customers", &[]).await.unwrap_err().is_argument());
        assert!(
            email
                .add("Customers", &[ListEntry::new("")])
                .await
                .unwrap_err()
                .is_argument()
        );
        assert!(email.delete("Customers", &[]).await.unwrap_err().is_argument());
        assert_eq!(executor.calls(), 0);

        let emails = vec!["a@x.com".to_string(), "b@x.com".to_string()];
        email.delete("Customers", &emails).await.unwrap();
        assert_eq!(
            executor.last().payload(),
            &Payload::Form(pairs(&[
                ("list", "Customers"),
                ("email[]", "a@x.com"),
                ("email[]", "b@x.com"),
            ]))
        );
    }

    #[tokio::test]
    async fn email_add_rejects_columns_shadowing_entry_fields() {
        let executor = Arc::new(RecordingExecutor::default());
        let email = NewsletterListsEmail::new(executor.clone());

        for entry in [
            ListEntry::new("a@x.com").column("email", "b@x.com"),
            ListEntry::new("a@x.com").column("name", "B"),
        ] {
            let err = email.add("Customers", &[entry]).await.unwrap_err();
            assert!(err.is_argument());
        }
        assert_eq!(executor.calls(), 0);
    }

    #[tokio::test]
    async fn email_get_is_sparse() {
        let executor = Arc::new(RecordingExecutor::default());
        let email = NewsletterListsEmail::new(executor.clone());

        email.get("Customers", &[]).await.unwrap();
        let request = executor.last();
        assert_eq!(request.verb(), "get");
        assert_eq!(request.payload(), &Payload::Form(pairs(&[("list", "Customers")])));
    }
}
