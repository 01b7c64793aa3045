//! Response bodies for the caption endpoints.

use scrollstop_core::caption::CaptionCandidate;
use scrollstop_core::history::HistoryItem;
use serde::Serialize;

/// `{ "captions": [...] }` -- body of a successful generation.
#[derive(Debug, Serialize)]
pub struct CaptionsResponse {
    pub captions: Vec<CaptionCandidate>,
}

/// `{ "items": [...] }` -- body of the recent-history listing.
#[derive(Debug, Serialize)]
pub struct HistoryResponse {
    pub items: Vec<HistoryItem>,
}
