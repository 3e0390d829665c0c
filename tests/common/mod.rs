#![allow(dead_code)]

use httpmock::MockServer;
use sendgrid_client::{Client, LegacyClient};
use tracing_subscriber::EnvFilter;

pub const API_KEY: &str = "SG.test-key";
pub const API_USER: &str = "test-user";

/// Route crate logs to the test output when `RUST_LOG` is set.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

pub fn client(server: &MockServer) -> Client {
    init_tracing();
    Client::builder(API_KEY)
        .base_url(server.base_url())
        .build()
        .expect("client should build")
}

pub fn legacy_client(server: &MockServer) -> LegacyClient {
    init_tracing();
    LegacyClient::builder(API_USER, API_KEY)
        .base_url(server.base_url())
        .build()
        .expect("legacy client should build")
}
