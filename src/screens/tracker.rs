//! View-count tracking guard

use std::collections::HashSet;
use std::sync::{Arc, Mutex, PoisonError};

use tracing::{debug, warn};

use crate::api::ApiClient;

/// Remembers which articles have had a view recorded in this process
///
/// Clones share the same set, so one tracker built at startup covers every
/// article screen regardless of how many revalidation passes run.
#[derive(Debug, Clone, Default)]
pub struct ViewTracker {
    tracked: Arc<Mutex<HashSet<u64>>>,
}

impl ViewTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Marks `id` as tracked. Returns true only the first time.
    pub fn mark(&self, id: u64) -> bool {
        self.tracked
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(id)
    }

    pub fn is_tracked(&self, id: u64) -> bool {
        self.tracked
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .contains(&id)
    }

    /// Records a view of `id` in the background, once per process
    pub fn track(&self, api: &ApiClient, id: u64) {
        if !self.mark(id) {
            return;
        }
        let api = api.clone();
        tokio::spawn(async move {
            match api.track_view(id).await {
                Ok(()) => debug!(article = id, "recorded view"),
                Err(err) => warn!(article = id, error = %err, "failed to record view"),
            }
        });
    }
}
