//! # SendGrid Client
//! Asynchronous wrapper around the SendGrid email HTTP APIs: mail send and suppression lists on the v3 JSON API through [`SendGrid`], plus bounces, invalid emails, mail and the newsletter (marketing) resources on the legacy form-encoded API through [`LegacySendGrid`].
//!
//! ## Audience and uses
//! For Rust services that send transactional mail or keep suppression and recipient lists in sync: configure a [`Client`] (or [`LegacyClient`]) with [`ClientBuilder`], hand it to a facade, and call typed methods that validate their arguments before anything reaches the network.
//!
//! ## Runtime requirements
//! Async-only; every call must be awaited inside a Tokio (v1) runtime because transport goes through `reqwest`. Clients and facades are `Send + Sync` and can be shared across tasks behind an `Arc`.
//!
//! ## Out of scope
//! No retries, rate-limit handling, pagination helpers or typed response models. Responses are returned as raw [`serde_json::Value`] exactly as SendGrid sent them.
//!
//! ## Errors
//! Missing or empty required arguments fail with [`Error::Argument`] without issuing a request. Errors reported by SendGrid become [`Error::Provider`] carrying the HTTP status and the provider payload ([`ProviderError`]); network failures surface as [`Error::Transport`]. The crate-wide [`Result`] alias wraps these errors.
//!
//! ## Example
//! ```no_run
//! use sendgrid_client::{EmailAddress, Message, SendGrid};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), sendgrid_client::Error> {
//!     let sendgrid = SendGrid::from_env()?;
//!
//!     let message = Message {
//!         to: vec![EmailAddress::new("to@example.com")],
//!         from: Some(EmailAddress::with_name("from@example.com", "Example")),
//!         subject: Some("Hello".into()),
//!         text: Some("Hello from Rust".into()),
//!         ..Default::default()
//!     };
//!     sendgrid.mail().send(&message).await?;
//!
//!     sendgrid.suppressions().bounces().delete_one("gone@example.com").await?;
//!     Ok(())
//! }
//! ```

mod client;
mod error;
mod legacy;
mod mail;
mod newsletter;
mod request;
mod sendgrid;
mod suppressions;
#[cfg(test)]
mod testing;

pub use client::{Client, ClientBuilder};
pub use error::{Error, ProviderError, normalize};
pub use legacy::{
    BounceFilter, BounceQuery, BounceType, InvalidEmailQuery, LegacyBounces, LegacyClient,
    LegacyClientBuilder, LegacyFile, LegacyInvalidEmails, LegacyMail, LegacyMessage,
    LegacySendGrid,
};
pub use mail::{Attachment, EmailAddress, Mail, Message};
pub use newsletter::{
    Identity, IdentityEdit, ListColumns, ListEntry, Newsletter, NewsletterCategory,
    NewsletterEdit, NewsletterIdentity, NewsletterLists, NewsletterListsEmail,
    NewsletterRecipients, NewsletterSchedule, ScheduleOptions,
};
pub use request::{Executor, FilePart, Payload, Request};
pub use sendgrid::SendGrid;
pub use suppressions::{ListOptions, SuppressionKind, SuppressionList, Suppressions};

/// Result type alias for SendGrid operations.
///
/// This is equivalent to `std::result::Result<T, Error>`.
pub type Result<T> = std::result::Result<T, Error>;
