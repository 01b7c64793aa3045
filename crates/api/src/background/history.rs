//! Detached history writes.

use std::sync::Arc;

use scrollstop_core::caption::{CaptionCandidate, GenerationRequest};
use scrollstop_core::history::HistoryRecord;
use scrollstop_db::HistoryStore;
use tokio::task::JoinHandle;

/// Record a generation for `user_id` on a background task.
///
/// Returns `None` when there is nothing to write (no store configured, or no
/// caption text). A failed write is logged at `warn` with the user id.
pub fn spawn_history_write(
    store: Option<&Arc<dyn HistoryStore>>,
    user_id: &str,
    request: &GenerationRequest,
    captions: &[CaptionCandidate],
) -> Option<JoinHandle<()>> {
    let Some(store) = store else {
        tracing::warn!(user_id, "Caption history store not configured, skipping write");
        return None;
    };
    let record = HistoryRecord::from_generation(request, captions)?;

    let store = Arc::clone(store);
    let user_id = user_id.to_string();
    Some(tokio::spawn(async move {
        if let Err(err) = store.record(&user_id, &record).await {
            tracing::warn!(user_id = %user_id, error = %err, "Caption history write failed");
        }
    }))
}
