//! Entry point bundling the v3 facades over one shared client.

use crate::request::Executor;
use crate::{Client, Mail, Result, Suppressions};
use std::sync::{Arc, OnceLock};

/// SendGrid v3 API.
///
/// Holds one executor and hands out facades that share it. Each facade is
/// created on first access and reused afterwards.
///
/// # Examples
/// ```no_run
/// # use sendgrid_client::{ListOptions, SendGrid};
/// # #[tokio::main]
/// # async fn main() -> Result<(), sendgrid_client::Error> {
/// let sendgrid = SendGrid::new("SG.xxxxx")?;
/// let blocks = sendgrid.suppressions().blocks().list(&ListOptions::default()).await?;
/// println!("{blocks:?}");
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct SendGrid {
    executor: Arc<dyn Executor>,
    mail: OnceLock<Mail>,
    suppressions: OnceLock<Suppressions>,
}

impl SendGrid {
    /// Create the API with a default [`Client`].
    pub fn new(api_key: impl Into<String>) -> Result<Self> {
        Ok(Self::with_executor(Arc::new(Client::new(api_key)?)))
    }

    /// Create the API with a client configured from `SENDGRID_API_KEY`.
    pub fn from_env() -> Result<Self> {
        Ok(Self::with_executor(Arc::new(Client::from_env()?)))
    }

    /// Create the API on top of any executor, e.g. a [`Client`] built with
    /// [`Client::builder`].
    pub fn with_executor(executor: Arc<dyn Executor>) -> Self {
        Self {
            executor,
            mail: OnceLock::new(),
            suppressions: OnceLock::new(),
        }
    }

    /// Mail send API.
    pub fn mail(&self) -> &Mail {
        self.mail
            .get_or_init(|| Mail::with_executor(self.executor.clone()))
    }

    /// Suppressions API.
    pub fn suppressions(&self) -> &Suppressions {
        self.suppressions
            .get_or_init(|| Suppressions::with_executor(self.executor.clone()))
    }
}
