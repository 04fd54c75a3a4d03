//! Mock translator.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::translate::Translator;

/// Dictionary-backed translator: unmapped text passes through unchanged,
/// matching the real backend's degraded behavior.
pub struct MockTranslator {
    mappings: Mutex<HashMap<String, String>>,
}

impl MockTranslator {
    pub fn new() -> Self {
        Self {
            mappings: Mutex::new(HashMap::new()),
        }
    }

    /// Add a fixed translation.
    pub fn map(&self, from: &str, to: &str) {
        self.mappings
            .lock()
            .unwrap()
            .insert(from.to_string(), to.to_string());
    }
}

impl Default for MockTranslator {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Translator for MockTranslator {
    async fn translate(&self, text: &str, _src: &str, _tgt: &str) -> String {
        self.mappings
            .lock()
            .unwrap()
            .get(text)
            .cloned()
            .unwrap_or_else(|| text.to_string())
    }
}
