//! In-memory executor for facade unit tests.

use async_trait::async_trait;
use crate::request::{Executor, Request};
use crate::Result;
use serde_json::Value;
use std::sync::Mutex;

/// Records every request and answers with a canned body (`None` by default).
#[derive(Debug, Default)]
pub(crate) struct RecordingExecutor {
    requests: Mutex<Vec<Request>>,
    response: Option<Value>,
}

impl RecordingExecutor {
    pub(crate) fn responding(response: Value) -> Self {
        Self {
            requests: Mutex::default(),
            response: Some(response),
        }
    }

    pub(crate) fn calls(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    pub(crate) fn last(&self) -> Request {
        self.requests
            .lock()
            .unwrap()
            .last()
            .cloned()
            .expect("no request was executed")
    }
}

#[async_trait]
impl Executor for RecordingExecutor {
    async fn execute(&self, request: Request) -> Result<Option<Value>> {
        self.requests.lock().unwrap().push(request);
        Ok(self.response.clone())
    }
}

/// Shorthand for building expected query/form pairs.
pub(crate) fn pairs(items: &[(&str, &str)]) -> Vec<(String, String)> {
    items
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}
