use std::sync::{Arc, Mutex};

use loreweave_core::{
    application::{
        ApplicationError,
        ports::{ContentGenerator, GenerationRequest},
    },
    error::LoreResult,
};

/// Generator that answers every request with a fixed reply.
///
/// Used for offline runs and tests. Clones share the request log.
#[derive(Debug, Clone)]
pub struct CannedGenerator {
    reply: Result<String, String>,
    requests: Arc<Mutex<Vec<GenerationRequest>>>,
}

impl CannedGenerator {
    pub fn new(reply: impl Into<String>) -> Self {
        Self {
            reply: Ok(reply.into()),
            requests: Arc::default(),
        }
    }

    /// A generator whose every call fails with `reason`.
    pub fn failing(reason: impl Into<String>) -> Self {
        Self {
            reply: Err(reason.into()),
            requests: Arc::default(),
        }
    }

    /// Requests seen so far, oldest first.
    pub fn requests(&self) -> Vec<GenerationRequest> {
        self.requests
            .lock()
            .map(|log| log.clone())
            .unwrap_or_default()
    }
}

impl ContentGenerator for CannedGenerator {
    fn generate(&self, request: &GenerationRequest) -> LoreResult<String> {
        self.requests
            .lock()
            .map_err(|_| ApplicationError::StoreLockError)?
            .push(request.clone());

        self.reply.clone().map_err(|reason| {
            ApplicationError::GenerationFailed { reason }.into()
        })
    }
}
