mod components;
mod hooks;
mod services;
mod state;

use yew::prelude::*;

use components::add_feed_form::AddFeedForm;
use components::d3_checklist::D3Checklist;
use components::history::History;
use components::record_list::RecordList;
use hooks::use_records::{use_records, UseRecordsResult};
use services::api::ApiClient;
use services::date_utils;
use state::stats;

#[function_component(App)]
fn app() -> Html {
    let api = ApiClient::new();
    let UseRecordsResult { state, actions } = use_records(&api);

    let is_today = state.selected_date == date_utils::today_string();
    let day_records: Vec<_> = state
        .records
        .iter()
        .filter(|record| record.date_string.as_deref() == Some(state.selected_date.as_str()))
        .cloned()
        .collect();
    let day_total = stats::day_total(&state.records, &state.selected_date);
    let day_count = stats::day_count(&state.records, &state.selected_date);
    let time_since = stats::time_since_last_feed(&state.records, state.now);
    let totals = stats::daily_totals(&state.records);
    let trend = stats::trailing_trend(&state.records, state.now.date());

    let prev_day = {
        let shift = actions.shift_selected_date.clone();
        Callback::from(move |_| shift.emit(-1))
    };
    let next_day = {
        let shift = actions.shift_selected_date.clone();
        Callback::from(move |_| shift.emit(1))
    };
    let dismiss_notice = {
        let dismiss = actions.dismiss_notice.clone();
        Callback::from(move |_| dismiss.emit(()))
    };

    html! {
        <>
            <header class="header">
                <div class="container">
                    <h1>{"Milk Tracker"}</h1>
                    <div class="time-since">{time_since.to_string()}</div>
                </div>
            </header>

            <main class="main">
                <div class="container">
                    {if let Some(notice) = state.notice.as_ref() {
                        html! {
                            <div class="notice-banner">
                                <span>{notice}</span>
                                <button class="btn btn-small" onclick={dismiss_notice}>{"✕"}</button>
                            </div>
                        }
                    } else { html! {} }}

                    <section class="day-section">
                        <div class="day-header">
                            <button class="day-nav-btn" onclick={prev_day}>{"‹"}</button>
                            <h2 class="day-title">
                                {if is_today {
                                    "Today".to_string()
                                } else {
                                    state.selected_date.clone()
                                }}
                            </h2>
                            <button class="day-nav-btn" onclick={next_day} disabled={is_today}>{"›"}</button>
                        </div>

                        <div class="day-summary">
                            <span class="day-total">{format!("{} ml", day_total)}</span>
                            <span class="day-count">{format!("{} feeds", day_count)}</span>
                        </div>

                        {if state.loading {
                            html! { <div class="loading">{"Loading feeds..."}</div> }
                        } else {
                            html! {
                                <RecordList
                                    records={day_records}
                                    selection={state.selection.clone()}
                                    on_begin_edit={actions.begin_edit.clone()}
                                    on_save_edit={actions.save_edit.clone()}
                                    on_begin_delete={actions.begin_delete.clone()}
                                    on_confirm_delete={actions.confirm_delete.clone()}
                                    on_cancel={actions.cancel_selection.clone()}
                                />
                            }
                        }}
                    </section>

                    <D3Checklist
                        status={state.d3_status}
                        on_toggle={actions.toggle_d3.clone()}
                    />

                    <AddFeedForm
                        enabled={is_today}
                        submitting={state.submitting}
                        on_add={actions.add_record.clone()}
                    />

                    <History
                        totals={totals}
                        trend={trend}
                        on_select_date={actions.select_date.clone()}
                    />
                </div>
            </main>
        </>
    }
}

fn main() {
    yew::Renderer::<App>::new().render();
}
