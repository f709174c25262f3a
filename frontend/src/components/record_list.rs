use shared::FeedingRecord;
use web_sys::HtmlInputElement;
use yew::prelude::*;

use crate::hooks::use_records::EditSubmit;
use crate::state::records::Selection;

#[derive(Properties, PartialEq)]
pub struct RecordListProps {
    /// Records for the selected day, already sorted newest first.
    pub records: Vec<FeedingRecord>,
    pub selection: Selection,
    pub on_begin_edit: Callback<String>,
    pub on_save_edit: Callback<EditSubmit>,
    pub on_begin_delete: Callback<String>,
    pub on_confirm_delete: Callback<String>,
    pub on_cancel: Callback<()>,
}

#[function_component(RecordList)]
pub fn record_list(props: &RecordListProps) -> Html {
    if props.records.is_empty() {
        return html! {
            <div class="record-list empty">{"No feeds logged this day"}</div>
        };
    }

    html! {
        <ul class="record-list">
            {for props.records.iter().map(|record| {
                let row = if props.selection.editing_id() == Some(record.id.as_str()) {
                    html! {
                        <EditRecordForm
                            record={record.clone()}
                            on_save={props.on_save_edit.clone()}
                            on_cancel={props.on_cancel.clone()}
                        />
                    }
                } else if props.selection.confirm_delete_id() == Some(record.id.as_str()) {
                    confirm_delete_row(record, props)
                } else {
                    record_row(record, props)
                };
                html! { <li key={record.id.clone()} class="record-row">{row}</li> }
            })}
        </ul>
    }
}

fn record_row(record: &FeedingRecord, props: &RecordListProps) -> Html {
    let id = record.id.clone();
    let on_begin_edit = props.on_begin_edit.clone();
    let on_begin_delete = props.on_begin_delete.clone();
    let edit_id = id.clone();
    let delete_id = id.clone();

    html! {
        <>
            <span class="record-time">
                {record.display_time.clone().unwrap_or_else(|| "--:--".to_string())}
            </span>
            <span class="record-amount">{format!("{} ml", record.amount)}</span>
            {if record.is_local() {
                // Not yet confirmed by the server.
                html! { <span class="record-pending" title="Not yet synced">{"⏳"}</span> }
            } else { html! {} }}
            <span class="record-actions">
                <button class="btn btn-small" onclick={Callback::from(move |_| on_begin_edit.emit(edit_id.clone()))}>
                    {"Edit"}
                </button>
                <button class="btn btn-small btn-danger" onclick={Callback::from(move |_| on_begin_delete.emit(delete_id.clone()))}>
                    {"Delete"}
                </button>
            </span>
        </>
    }
}

fn confirm_delete_row(record: &FeedingRecord, props: &RecordListProps) -> Html {
    let on_confirm = props.on_confirm_delete.clone();
    let on_cancel = props.on_cancel.clone();
    let id = record.id.clone();

    html! {
        <>
            <span class="record-confirm-text">
                {format!(
                    "Delete the {} ml feed at {}?",
                    record.amount,
                    record.display_time.as_deref().unwrap_or("--:--")
                )}
            </span>
            <span class="record-actions">
                <button class="btn btn-small btn-danger" onclick={Callback::from(move |_| on_confirm.emit(id.clone()))}>
                    {"Confirm"}
                </button>
                <button class="btn btn-small" onclick={Callback::from(move |_| on_cancel.emit(()))}>
                    {"Cancel"}
                </button>
            </span>
        </>
    }
}

#[derive(Properties, PartialEq)]
struct EditRecordFormProps {
    record: FeedingRecord,
    on_save: Callback<EditSubmit>,
    on_cancel: Callback<()>,
}

#[function_component(EditRecordForm)]
fn edit_record_form(props: &EditRecordFormProps) -> Html {
    let amount = use_state(|| props.record.amount.to_string());
    let display_time = use_state(|| {
        props
            .record
            .display_time
            .clone()
            .unwrap_or_else(|| "12:00".to_string())
    });

    let on_amount_change = {
        let amount = amount.clone();
        Callback::from(move |e: Event| {
            let input: HtmlInputElement = e.target_unchecked_into();
            amount.set(input.value());
        })
    };

    let on_time_change = {
        let display_time = display_time.clone();
        Callback::from(move |e: Event| {
            let input: HtmlInputElement = e.target_unchecked_into();
            display_time.set(input.value());
        })
    };

    let on_submit = {
        let amount = amount.clone();
        let display_time = display_time.clone();
        let on_save = props.on_save.clone();
        let id = props.record.id.clone();
        Callback::from(move |e: SubmitEvent| {
            e.prevent_default();
            if let Ok(value) = amount.trim().parse::<f64>() {
                if value > 0.0 {
                    on_save.emit(EditSubmit {
                        id: id.clone(),
                        amount: value,
                        display_time: (*display_time).clone(),
                    });
                }
            }
        })
    };

    let on_cancel = {
        let on_cancel = props.on_cancel.clone();
        Callback::from(move |_| on_cancel.emit(()))
    };

    html! {
        <form class="edit-record-form" onsubmit={on_submit}>
            <input
                type="time"
                value={(*display_time).clone()}
                onchange={on_time_change}
            />
            <input
                type="number"
                step="1"
                min="1"
                value={(*amount).clone()}
                onchange={on_amount_change}
            />
            <button type="submit" class="btn btn-small btn-primary">{"Save"}</button>
            <button type="button" class="btn btn-small" onclick={on_cancel}>{"Cancel"}</button>
        </form>
    }
}
