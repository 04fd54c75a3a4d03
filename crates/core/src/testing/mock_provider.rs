//! Mock metadata provider.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use crate::metadata::{MetaCandidate, MetadataError, MetadataProvider};

/// Metadata backend with a configurable canned response.
///
/// Records every code it is asked about so tests can assert which lookups
/// happened (or that none did).
pub struct MockProvider {
    candidate: Mutex<Option<MetaCandidate>>,
    fail_next: Mutex<Option<String>>,
    recorded: Arc<Mutex<Vec<String>>>,
}

impl MockProvider {
    pub fn new() -> Self {
        Self {
            candidate: Mutex::new(None),
            fail_next: Mutex::new(None),
            recorded: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Canned candidate returned by every subsequent lookup.
    pub fn set_candidate(&self, candidate: MetaCandidate) {
        *self.candidate.lock().unwrap() = Some(candidate);
    }

    /// Make the next lookup fail with the given message.
    pub fn fail_next(&self, message: &str) {
        *self.fail_next.lock().unwrap() = Some(message.to_string());
    }

    /// Handle on the list of codes that have been looked up.
    pub fn recorded(&self) -> Arc<Mutex<Vec<String>>> {
        self.recorded.clone()
    }
}

impl Default for MockProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl MetadataProvider for MockProvider {
    fn name(&self) -> &str {
        "mock"
    }

    async fn lookup(&self, code: &str) -> Result<Option<MetaCandidate>, MetadataError> {
        self.recorded.lock().unwrap().push(code.to_string());

        if let Some(message) = self.fail_next.lock().unwrap().take() {
            return Err(MetadataError::Api {
                status: 500,
                message,
            });
        }

        Ok(self.candidate.lock().unwrap().clone())
    }
}
