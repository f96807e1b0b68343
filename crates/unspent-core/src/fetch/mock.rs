use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use bitcoin::Address;

use crate::error::BalanceError;

use super::UnspentSource;

/// Canned response for one address.
#[derive(Debug, Clone)]
pub enum MockResponse {
    Body(String),
    Status { code: u16, message: String },
    Io(String),
}

/// A mock unspent-output source for testing. Returns canned responses per
/// address, populated via the builder pattern. Unknown addresses fail with
/// a `404 Not Found` status.
pub struct MockSource {
    responses: HashMap<String, MockResponse>,
    calls: AtomicUsize,
    requested: Mutex<Vec<String>>,
}

impl MockSource {
    pub fn builder() -> MockSourceBuilder {
        MockSourceBuilder {
            responses: HashMap::new(),
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn requested(&self) -> Vec<String> {
        self.requested
            .lock()
            .expect("mock request log must not be poisoned")
            .clone()
    }
}

pub struct MockSourceBuilder {
    responses: HashMap<String, MockResponse>,
}

impl MockSourceBuilder {
    pub fn with_body(mut self, address: &Address, body: impl Into<String>) -> Self {
        self.responses
            .insert(address.to_string(), MockResponse::Body(body.into()));
        self
    }

    pub fn with_status(mut self, address: &Address, code: u16, message: &str) -> Self {
        self.responses.insert(
            address.to_string(),
            MockResponse::Status {
                code,
                message: message.to_owned(),
            },
        );
        self
    }

    pub fn with_io_error(mut self, address: &Address, message: &str) -> Self {
        self.responses
            .insert(address.to_string(), MockResponse::Io(message.to_owned()));
        self
    }

    pub fn build(self) -> MockSource {
        MockSource {
            responses: self.responses,
            calls: AtomicUsize::new(0),
            requested: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait]
impl UnspentSource for MockSource {
    async fn fetch_unspent(&self, address: &Address) -> Result<String, BalanceError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let key = address.to_string();
        self.requested
            .lock()
            .expect("mock request log must not be poisoned")
            .push(key.clone());

        match self.responses.get(&key) {
            Some(MockResponse::Body(body)) => Ok(body.clone()),
            Some(MockResponse::Status { code, message }) => Err(BalanceError::HttpStatus {
                code: *code,
                message: message.clone(),
            }),
            Some(MockResponse::Io(message)) => Err(BalanceError::NetworkIo(message.clone())),
            None => Err(BalanceError::HttpStatus {
                code: 404,
                message: "Not Found".to_owned(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_util::test_address;

    #[tokio::test]
    async fn unknown_address_is_not_found() {
        let source = MockSource::builder().build();
        let err = source
            .fetch_unspent(&test_address())
            .await
            .expect_err("unknown address must fail");
        assert!(matches!(err, BalanceError::HttpStatus { code: 404, .. }));
        assert_eq!(source.call_count(), 1);
    }

    #[tokio::test]
    async fn returns_canned_body() {
        let address = test_address();
        let source = MockSource::builder().with_body(&address, "{}").build();
        let body = source.fetch_unspent(&address).await.expect("canned body");
        assert_eq!(body, "{}");
        assert_eq!(source.requested(), vec![address.to_string()]);
    }
}
