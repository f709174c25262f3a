use yew::prelude::*;

use crate::state::stats::TrendPoint;

#[derive(Properties, PartialEq)]
pub struct HistoryProps {
    /// Per-date totals, newest first.
    pub totals: Vec<(String, f64)>,
    /// Fixed trailing window, oldest first.
    pub trend: Vec<TrendPoint>,
    pub on_select_date: Callback<String>,
}

#[function_component(History)]
pub fn history(props: &HistoryProps) -> Html {
    let max_total = props
        .trend
        .iter()
        .map(|point| point.total)
        .fold(0.0_f64, f64::max);

    html! {
        <section class="history-section">
            <h2>{"History"}</h2>

            <div class="trend-chart">
                {for props.trend.iter().map(|point| {
                    let height = if max_total > 0.0 {
                        (point.total / max_total * 100.0).round()
                    } else {
                        0.0
                    };
                    html! {
                        <div class="trend-column" title={format!("{}: {} ml", point.date, point.total)}>
                            <div class="trend-bar" style={format!("height: {}%", height)}></div>
                            <div class="trend-label">{&point.label}</div>
                        </div>
                    }
                })}
            </div>

            <ul class="history-totals">
                {for props.totals.iter().map(|(date, total)| {
                    let on_select_date = props.on_select_date.clone();
                    let date_clone = date.clone();
                    html! {
                        <li key={date.clone()}>
                            <button class="history-date" onclick={Callback::from(move |_| on_select_date.emit(date_clone.clone()))}>
                                {date}
                            </button>
                            <span class="history-total">{format!("{} ml", total)}</span>
                        </li>
                    }
                })}
            </ul>
        </section>
    }
}
