//! crates/vdr_core/src/query.rs
//!
//! Read-only views over the session store, shaped the way clients consume them.

use crate::domain::{Session, SessionData};
use crate::store::SessionStore;
use serde::Serialize;

/// Paging metadata. The listing is never split: everything is one page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Pagination {
    pub current_page: usize,
    pub per_page: usize,
    pub total: usize,
}

/// The lightweight listing of every stored session.
#[derive(Debug, Serialize)]
pub struct SummaryPage<'a> {
    pub success: bool,
    pub count: usize,
    pub data: Vec<&'a SessionData>,
    pub pagination: Pagination,
}

/// Everything in the store, unprojected.
#[derive(Debug, Serialize)]
pub struct RawDump<'a> {
    pub success: bool,
    pub count: usize,
    pub data: &'a [Session],
}

/// The full session stored under `raw_id`, if `raw_id` is an integer that
/// names one.
pub fn detail<'a>(store: &'a SessionStore, raw_id: &str) -> Option<&'a Session> {
    store.find_by_raw_id(raw_id)
}

pub fn summary_page(store: &SessionStore) -> SummaryPage<'_> {
    let data = store.list_summaries();
    let count = data.len();
    SummaryPage {
        success: true,
        count,
        data,
        pagination: Pagination {
            current_page: 1,
            per_page: count,
            total: count,
        },
    }
}

pub fn raw_dump(store: &SessionStore) -> RawDump<'_> {
    let data = store.list_raw();
    RawDump {
        success: true,
        count: data.len(),
        data,
    }
}
