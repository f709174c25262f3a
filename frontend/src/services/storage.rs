use gloo::storage::{LocalStorage, Storage};
use shared::FeedingRecord;
use std::cell::RefCell;

/// localStorage key holding the cached record list.
const RECORDS_CACHE_KEY: &str = "milk_tracker_records";

/// Injected persistence capability for the local record shadow copy.
///
/// The cache is the authoritative "current local list": it is rewritten
/// after every merge and every optimistic mutation, and read back at the
/// start of each one, so long-lived callbacks never act on a stale render
/// snapshot. Abstracting it keeps the reconciliation logic testable without
/// a browser storage backend.
pub trait RecordCache {
    fn load(&self) -> Option<Vec<FeedingRecord>>;
    fn save(&self, records: &[FeedingRecord]);
    fn clear(&self);
}

/// Browser localStorage implementation used by the app.
#[derive(Clone, Default, PartialEq)]
pub struct LocalRecordCache;

impl RecordCache for LocalRecordCache {
    fn load(&self) -> Option<Vec<FeedingRecord>> {
        LocalStorage::get(RECORDS_CACHE_KEY).ok()
    }

    fn save(&self, records: &[FeedingRecord]) {
        if let Err(e) = LocalStorage::set(RECORDS_CACHE_KEY, records) {
            gloo::console::warn!("Failed to write record cache:", e.to_string());
        }
    }

    fn clear(&self) {
        LocalStorage::delete(RECORDS_CACHE_KEY);
    }
}

/// In-memory cache for tests.
#[derive(Default)]
pub struct MemoryRecordCache {
    records: RefCell<Option<Vec<FeedingRecord>>>,
}

impl RecordCache for MemoryRecordCache {
    fn load(&self) -> Option<Vec<FeedingRecord>> {
        self.records.borrow().clone()
    }

    fn save(&self, records: &[FeedingRecord]) {
        *self.records.borrow_mut() = Some(records.to_vec());
    }

    fn clear(&self) {
        *self.records.borrow_mut() = None;
    }
}
