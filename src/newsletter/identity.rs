use crate::request::{Executor, Params, Request, required};
use crate::Result;
use serde_json::Value;
use std::sync::Arc;

const PATH: &str = "newsletter/identity";

/// Sender identity for [`NewsletterIdentity::add`]. Every field is required.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Identity {
    pub identity: String,
    pub name: String,
    pub email: String,
    pub address: String,
    pub city: String,
    pub state: String,
    pub zip: String,
    pub country: String,
}

impl Identity {
    fn to_form(&self) -> Result<Vec<(String, String)>> {
        let mut params = Params::new();
        for (key, value) in [
            ("identity", &self.identity),
            ("name", &self.name),
            ("email", &self.email),
            ("address", &self.address),
            ("city", &self.city),
            ("state", &self.state),
            ("zip", &self.zip),
            ("country", &self.country),
        ] {
            params.push(key, required(value, key)?);
        }
        Ok(params.into_inner())
    }
}

/// Changes for [`NewsletterIdentity::edit`]. Only the fields that are set
/// are sent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IdentityEdit {
    /// New title for the identity.
    pub newidentity: Option<String>,
    pub name: Option<String>,
    pub email: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub zip: Option<String>,
    pub country: Option<String>,
}

/// Sender identities used by newsletters.
#[derive(Debug, Clone)]
pub struct NewsletterIdentity {
    executor: Arc<dyn Executor>,
}

impl NewsletterIdentity {
    /// Create the facade over a legacy executor.
    pub fn new(executor: Arc<dyn Executor>) -> Self {
        Self { executor }
    }

    /// Create a sender identity.
    pub async fn add(&self, identity: &Identity) -> Result<Option<Value>> {
        let form = identity.to_form()?;
        self.call("add", form).await
    }

    /// Delete the identity titled `identity`.
    pub async fn delete(&self, identity: &str) -> Result<Option<Value>> {
        let mut params = Params::new();
        params.push("identity", required(identity, "identity")?);
        self.call("delete", params.into_inner()).await
    }

    /// Update the fields set in `edit`.
    pub async fn edit(&self, identity: &str, edit: &IdentityEdit) -> Result<Option<Value>> {
        let mut params = Params::new();
        params.push("identity", required(identity, "identity")?);
        for (key, value) in [
            ("newidentity", &edit.newidentity),
            ("name", &edit.name),
            ("email", &edit.email),
            ("address", &edit.address),
            ("city", &edit.city),
            ("state", &edit.state),
            ("zip", &edit.zip),
            ("country", &edit.country),
        ] {
            params.push_opt(key, value.as_deref().filter(|v| !v.is_empty()));
        }
        self.call("edit", params.into_inner()).await
    }

    /// Details of one identity.
    pub async fn get(&self, identity: &str) -> Result<Option<Value>> {
        let mut params = Params::new();
        params.push("identity", required(identity, "identity")?);
        self.call("get", params.into_inner()).await
    }

    /// All identities, or only `identity` when given.
    pub async fn list(&self, identity: Option<&str>) -> Result<Option<Value>> {
        let mut params = Params::new();
        params.push_opt("identity", identity.filter(|i| !i.is_empty()));
        self.call("list", params.into_inner()).await
    }

    async fn call(&self, action: &str, form: Vec<(String, String)>) -> Result<Option<Value>> {
        let request = Request::action(action, PATH).with_form(form);
        self.executor.execute(request).await
    }
}
