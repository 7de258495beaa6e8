use std::sync::{Mutex, PoisonError};

use tracing::debug;
use uuid::Uuid;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RequestToken(Uuid);

/// Tracks the most recently started fetch of some collection. A response is
/// only applied if no newer fetch has started since its request went out, so
/// a slow stale response can never overwrite a fresher one.
#[derive(Debug, Default)]
pub struct LatestRequest {
    latest: Mutex<Option<Uuid>>,
}

impl LatestRequest {
    pub fn begin(&self) -> RequestToken {
        let token = Uuid::new_v4();
        *self.latest.lock().unwrap_or_else(PoisonError::into_inner) = Some(token);
        RequestToken(token)
    }

    pub fn is_current(&self, token: &RequestToken) -> bool {
        *self.latest.lock().unwrap_or_else(PoisonError::into_inner) == Some(token.0)
    }

    /// Runs `apply` if `token` is still the latest request. The check and the
    /// apply happen under one lock, a concurrent `begin` waits for both.
    pub fn commit<R, F: FnOnce() -> R>(&self, token: &RequestToken, apply: F) -> Option<R> {
        let latest = self.latest.lock().unwrap_or_else(PoisonError::into_inner);
        if *latest != Some(token.0) {
            debug!("discarding stale response for request {}", token.0);
            return None;
        }
        Some(apply())
    }
}
