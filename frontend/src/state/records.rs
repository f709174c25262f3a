//! Optimistic record-list state and server reconciliation.
//!
//! Everything here is a pure function of its inputs (plus the injected
//! cache); the hooks layer supplies wall-clock instants and performs the
//! actual network calls.

use crate::services::storage::RecordCache;
use shared::{generate_local_id, sort_records, FeedingRecord};
use std::collections::HashMap;

/// A local change newer than this is protected from being clobbered by a
/// server snapshot that has not caught up with an in-flight write. Once the
/// window elapses the server's view wins unconditionally.
pub const RECENCY_WINDOW_MS: i64 = 5 * 60 * 1000;

/// Which record, if any, the user is currently interacting with. A single
/// slot: starting an edit cancels a pending delete confirmation and vice
/// versa.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Selection {
    #[default]
    None,
    Editing(String),
    ConfirmDelete(String),
}

impl Selection {
    pub fn editing_id(&self) -> Option<&str> {
        match self {
            Selection::Editing(id) => Some(id),
            _ => None,
        }
    }

    pub fn confirm_delete_id(&self) -> Option<&str> {
        match self {
            Selection::ConfirmDelete(id) => Some(id),
            _ => None,
        }
    }
}

/// Merge a fresh server snapshot with the current local list.
///
/// The server wins by default. A local record whose `updatedAt` falls within
/// the recency window overrides the server's copy when the server does not
/// know the id at all, or when the local `updatedAt` is strictly newer. The
/// merged set is re-sorted under the ordering contract.
pub fn merge_by_recency(
    server: Vec<FeedingRecord>,
    local: &[FeedingRecord],
    now_ms: i64,
) -> Vec<FeedingRecord> {
    let mut merged: HashMap<String, FeedingRecord> = server
        .into_iter()
        .map(|record| (record.id.clone(), record))
        .collect();

    for record in local {
        let Some(updated_at) = record.updated_at else {
            continue;
        };
        if now_ms - updated_at >= RECENCY_WINDOW_MS {
            continue;
        }
        match merged.get(&record.id) {
            None => {
                merged.insert(record.id.clone(), record.clone());
            }
            Some(server_copy) => {
                if server_copy.updated_at.unwrap_or(i64::MIN) < updated_at {
                    merged.insert(record.id.clone(), record.clone());
                }
            }
        }
    }

    let mut result: Vec<FeedingRecord> = merged.into_values().collect();
    sort_records(&mut result);
    result
}

/// Merge a server snapshot against the cached local list and persist the
/// result, returning the new display list.
pub fn reconcile_and_cache(
    server: Vec<FeedingRecord>,
    cache: &dyn RecordCache,
    now_ms: i64,
) -> Vec<FeedingRecord> {
    let local = cache.load().unwrap_or_default();
    let merged = merge_by_recency(server, &local, now_ms);
    cache.save(&merged);
    merged
}

/// Build an optimistic record for a feeding logged right now.
pub fn new_local_record(
    amount: f64,
    date_string: String,
    display_time: String,
    now_ms: i64,
) -> FeedingRecord {
    FeedingRecord {
        id: generate_local_id(now_ms),
        amount,
        date_string: Some(date_string),
        display_time: Some(display_time),
        timestamp: Some(now_ms),
        updated_at: Some(now_ms),
    }
}

/// Rewrite a record's client-local id to the id the server stored it
/// under. The confirmed record stops reporting itself as local, and the
/// next merge sees a single identity instead of a temp/record pair.
pub fn adopt_server_id(records: &mut [FeedingRecord], local_id: &str, server_id: &str) {
    if let Some(record) = records.iter_mut().find(|r| r.id == local_id) {
        record.id = server_id.to_string();
    }
}

/// Splice a new record into the list and restore sort order.
pub fn apply_add(records: &mut Vec<FeedingRecord>, record: FeedingRecord) {
    records.push(record);
    sort_records(records);
}

/// Replace the record with `old_id` in place and restore sort order.
pub fn apply_replace(records: &mut Vec<FeedingRecord>, old_id: &str, updated: FeedingRecord) {
    if let Some(slot) = records.iter_mut().find(|r| r.id == old_id) {
        *slot = updated;
    }
    sort_records(records);
}

/// Remove a record by id, returning it so a failed delete can be reverted.
pub fn apply_remove(records: &mut Vec<FeedingRecord>, id: &str) -> Option<FeedingRecord> {
    let index = records.iter().position(|r| r.id == id)?;
    Some(records.remove(index))
}
