use chrono::NaiveDateTime;
use gloo::timers::future::TimeoutFuture;
use shared::{D3Update, FeedingRecord};
use std::rc::Rc;
use wasm_bindgen_futures::spawn_local;
use yew::prelude::*;

use crate::hooks::use_interval::use_interval;
use crate::services::api::{ApiClient, FetchError};
use crate::services::date_utils;
use crate::services::storage::{LocalRecordCache, RecordCache};
use crate::state::records::{
    adopt_server_id, apply_add, apply_remove, apply_replace, new_local_record,
    reconcile_and_cache, Selection,
};

/// Periodic server refetch; stragglers are reconciled by merge-by-recency,
/// so in-flight requests are never cancelled.
pub const REFRESH_INTERVAL_MS: u32 = 60_000;
/// Clock tick driving only the "time since last feed" text.
pub const CLOCK_TICK_MS: u32 = 30_000;
/// Delay before the post-mutation refetch, giving the store time to settle.
const CREATE_REFETCH_DELAY_MS: u32 = 3_000;
const DELETE_REFETCH_DELAY_MS: u32 = 2_000;

/// Payload of a committed edit form.
#[derive(Debug, Clone, PartialEq)]
pub struct EditSubmit {
    pub id: String,
    pub amount: f64,
    pub display_time: String,
}

#[derive(Clone)]
pub struct RecordsState {
    /// Full record list, sorted newest first.
    pub records: Vec<FeedingRecord>,
    /// Date the day-view is showing ("YYYY-MM-DD").
    pub selected_date: String,
    /// D3 checklist status for the selected date.
    pub d3_status: [bool; 2],
    pub selection: Selection,
    /// True until the first fetch (or cache hit) resolves.
    pub loading: bool,
    pub submitting: bool,
    /// User-visible sync signal ("saved locally only", failed writes).
    pub notice: Option<String>,
    /// Periodically sampled wall clock for the derived time-since text.
    pub now: NaiveDateTime,
}

#[derive(Clone)]
pub struct RecordsActions {
    pub refresh: Callback<()>,
    pub add_record: Callback<f64>,
    pub begin_edit: Callback<String>,
    pub save_edit: Callback<EditSubmit>,
    pub begin_delete: Callback<String>,
    pub confirm_delete: Callback<String>,
    pub cancel_selection: Callback<()>,
    pub select_date: Callback<String>,
    pub shift_selected_date: Callback<i64>,
    pub toggle_d3: Callback<usize>,
    pub dismiss_notice: Callback<()>,
}

pub struct UseRecordsResult {
    pub state: RecordsState,
    pub actions: RecordsActions,
}

fn schedule_refetch(refresh: Callback<()>, delay_ms: u32) {
    spawn_local(async move {
        TimeoutFuture::new(delay_ms).await;
        refresh.emit(());
    });
}

/// State and actions for the whole tracker: the optimistic record list, the
/// per-date D3 checklist, day selection, and the reconciliation loop.
///
/// The persistent cache, not the render snapshot, is the authoritative
/// local list: every mutation reads it, applies the change, writes it back
/// and mirrors the result into component state. That keeps long-lived
/// callbacks (timers, in-flight request completions) from acting on stale
/// captures.
#[hook]
pub fn use_records(api: &ApiClient) -> UseRecordsResult {
    let cache: Rc<dyn RecordCache> = Rc::new(LocalRecordCache);

    let records = use_state(Vec::<FeedingRecord>::new);
    let selected_date = use_state(date_utils::today_string);
    let d3_status = use_state(|| [false, false]);
    let selection = use_state(Selection::default);
    let loading = use_state(|| true);
    let submitting = use_state(|| false);
    let notice = use_state(|| Option::<String>::None);
    let now = use_state(date_utils::now_local);

    // Merge a fresh server snapshot against the cached local list.
    let refresh = {
        let api = api.clone();
        let cache = cache.clone();
        let records = records.clone();
        let loading = loading.clone();

        Callback::from(move |_| {
            let api = api.clone();
            let cache = cache.clone();
            let records = records.clone();
            let loading = loading.clone();

            spawn_local(async move {
                match api.list_records().await {
                    Ok(server) => {
                        let merged =
                            reconcile_and_cache(server, cache.as_ref(), date_utils::now_millis());
                        records.set(merged);
                    }
                    Err(e) => {
                        // Keep whatever we have; the next tick will retry.
                        gloo::console::warn!("Failed to refresh records:", e.to_string());
                    }
                }
                loading.set(false);
            });
        })
    };

    let add_record = {
        let api = api.clone();
        let cache = cache.clone();
        let records = records.clone();
        let selected_date = selected_date.clone();
        let submitting = submitting.clone();
        let notice = notice.clone();
        let refresh = refresh.clone();

        Callback::from(move |amount: f64| {
            let api = api.clone();
            let cache = cache.clone();
            let records = records.clone();
            let submitting = submitting.clone();
            let notice = notice.clone();
            let refresh = refresh.clone();

            let now_ms = date_utils::now_millis();
            let today = date_utils::today_string();
            let record = new_local_record(
                amount,
                today.clone(),
                date_utils::current_display_time(),
                now_ms,
            );

            let mut list = cache.load().unwrap_or_default();
            apply_add(&mut list, record.clone());
            cache.save(&list);
            records.set(list);
            if *selected_date != today {
                selected_date.set(today);
            }
            notice.set(None);
            submitting.set(true);

            spawn_local(async move {
                match api.create_record(&record).await {
                    Ok(response) => {
                        // The server rekeys the temp id; adopt its id so the
                        // record stops counting as pending.
                        let mut list = cache.load().unwrap_or_default();
                        adopt_server_id(&mut list, &record.id, &response.id);
                        cache.save(&list);
                        records.set(list);
                        schedule_refetch(refresh, CREATE_REFETCH_DELAY_MS);
                    }
                    Err(FetchError::Http { message, .. }) => {
                        // Confirmed rejection: take the optimistic entry out.
                        let mut list = cache.load().unwrap_or_default();
                        apply_remove(&mut list, &record.id);
                        cache.save(&list);
                        records.set(list);
                        notice.set(Some(format!("Add failed: {}", message)));
                    }
                    Err(FetchError::Network(_)) => {
                        notice.set(Some("Saved locally only; server unreachable".to_string()));
                    }
                }
                submitting.set(false);
            });
        })
    };

    let save_edit = {
        let api = api.clone();
        let cache = cache.clone();
        let records = records.clone();
        let selection = selection.clone();
        let notice = notice.clone();
        let refresh = refresh.clone();

        Callback::from(move |submit: EditSubmit| {
            let api = api.clone();
            let cache = cache.clone();
            let records = records.clone();
            let notice = notice.clone();
            let refresh = refresh.clone();

            let mut list = cache.load().unwrap_or_default();
            let Some(original) = list.iter().find(|r| r.id == submit.id).cloned() else {
                return;
            };
            let mut updated = original.clone();
            updated.amount = submit.amount;
            updated.display_time = Some(submit.display_time);
            updated.updated_at = Some(date_utils::now_millis());

            apply_replace(&mut list, &submit.id, updated.clone());
            cache.save(&list);
            records.set(list);
            selection.set(Selection::None);
            notice.set(None);

            spawn_local(async move {
                // The gateway has no in-place update: delete the old key,
                // then recreate under the same id.
                let result = match api.delete_record(&updated.id).await {
                    Ok(_) => api.create_record(&updated).await.map(|_| ()),
                    Err(e) => Err(e),
                };
                match result {
                    Ok(()) => schedule_refetch(refresh, CREATE_REFETCH_DELAY_MS),
                    Err(FetchError::Http { message, .. }) => {
                        let mut list = cache.load().unwrap_or_default();
                        apply_replace(&mut list, &original.id, original.clone());
                        cache.save(&list);
                        records.set(list);
                        notice.set(Some(format!("Edit failed: {}", message)));
                    }
                    Err(FetchError::Network(_)) => {
                        notice.set(Some("Saved locally only; server unreachable".to_string()));
                    }
                }
            });
        })
    };

    let confirm_delete = {
        let api = api.clone();
        let cache = cache.clone();
        let records = records.clone();
        let selection = selection.clone();
        let notice = notice.clone();
        let refresh = refresh.clone();

        Callback::from(move |id: String| {
            let api = api.clone();
            let cache = cache.clone();
            let records = records.clone();
            let notice = notice.clone();
            let refresh = refresh.clone();

            let mut list = cache.load().unwrap_or_default();
            let removed = apply_remove(&mut list, &id);
            cache.save(&list);
            records.set(list);
            selection.set(Selection::None);
            notice.set(None);

            spawn_local(async move {
                match api.delete_record(&id).await {
                    Ok(_) => schedule_refetch(refresh, DELETE_REFETCH_DELAY_MS),
                    Err(FetchError::Http { message, .. }) => {
                        if let Some(record) = removed {
                            let mut list = cache.load().unwrap_or_default();
                            apply_add(&mut list, record);
                            cache.save(&list);
                            records.set(list);
                        }
                        notice.set(Some(format!("Delete failed: {}", message)));
                    }
                    Err(FetchError::Network(_)) => {
                        notice.set(Some("Deleted locally only; server unreachable".to_string()));
                    }
                }
            });
        })
    };

    let begin_edit = {
        let selection = selection.clone();
        Callback::from(move |id: String| selection.set(Selection::Editing(id)))
    };

    let begin_delete = {
        let selection = selection.clone();
        Callback::from(move |id: String| selection.set(Selection::ConfirmDelete(id)))
    };

    let cancel_selection = {
        let selection = selection.clone();
        Callback::from(move |_| selection.set(Selection::None))
    };

    let select_date = {
        let selected_date = selected_date.clone();
        let selection = selection.clone();
        Callback::from(move |date: String| {
            selected_date.set(date);
            selection.set(Selection::None);
        })
    };

    let shift_selected_date = {
        let selected_date = selected_date.clone();
        let selection = selection.clone();
        Callback::from(move |days: i64| {
            if let Some(shifted) = date_utils::shift_date(&selected_date, days) {
                selected_date.set(shifted);
                selection.set(Selection::None);
            }
        })
    };

    let toggle_d3 = {
        let api = api.clone();
        let d3_status = d3_status.clone();
        let selected_date = selected_date.clone();
        let notice = notice.clone();

        Callback::from(move |dose: usize| {
            let api = api.clone();
            let d3_status = d3_status.clone();
            let notice = notice.clone();

            let previous = *d3_status;
            let mut status = previous;
            status[dose] = !status[dose];
            d3_status.set(status);

            let update = D3Update::new((*selected_date).clone(), status);
            spawn_local(async move {
                match api.set_d3_status(&update).await {
                    Ok(_) => {}
                    Err(FetchError::Http { message, .. }) => {
                        d3_status.set(previous);
                        notice.set(Some(format!("D3 update failed: {}", message)));
                    }
                    Err(FetchError::Network(_)) => {
                        notice.set(Some("Saved locally only; server unreachable".to_string()));
                    }
                }
            });
        })
    };

    let dismiss_notice = {
        let notice = notice.clone();
        Callback::from(move |_| notice.set(None))
    };

    // Initial load: show the cached list before the first round-trip
    // completes, then reconcile against the server.
    {
        let cache = cache.clone();
        let records = records.clone();
        let loading = loading.clone();
        let refresh = refresh.clone();
        use_effect_with((), move |_| {
            if let Some(cached) = cache.load() {
                records.set(cached);
                loading.set(false);
            }
            refresh.emit(());
            || ()
        });
    }

    use_interval(refresh.clone(), REFRESH_INTERVAL_MS);

    {
        let now = now.clone();
        use_interval(
            Callback::from(move |_| now.set(date_utils::now_local())),
            CLOCK_TICK_MS,
        );
    }

    // Checklist status follows the selected date.
    {
        let api = api.clone();
        let d3_status = d3_status.clone();
        use_effect_with((*selected_date).clone(), move |date: &String| {
            let api = api.clone();
            let d3_status = d3_status.clone();
            let date = date.clone();
            spawn_local(async move {
                match api.get_d3_status(&date).await {
                    Ok(status) => d3_status.set(status),
                    Err(e) => {
                        gloo::console::warn!("Failed to fetch D3 status:", e.to_string());
                    }
                }
            });
            || ()
        });
    }

    let state = RecordsState {
        records: (*records).clone(),
        selected_date: (*selected_date).clone(),
        d3_status: *d3_status,
        selection: (*selection).clone(),
        loading: *loading,
        submitting: *submitting,
        notice: (*notice).clone(),
        now: *now,
    };

    let actions = RecordsActions {
        refresh,
        add_record,
        begin_edit,
        save_edit,
        begin_delete,
        confirm_delete,
        cancel_selection,
        select_date,
        shift_selected_date,
        toggle_d3,
        dismiss_notice,
    };

    UseRecordsResult { state, actions }
}
