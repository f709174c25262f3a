use web_sys::HtmlInputElement;
use yew::prelude::*;

/// One-tap buttons for the usual bottle sizes.
const QUICK_ADD_AMOUNTS: [f64; 4] = [120.0, 150.0, 180.0, 200.0];

#[derive(Properties, PartialEq)]
pub struct AddFeedFormProps {
    /// Adding is only allowed on the current day; a new feed is always
    /// stamped with the current time.
    pub enabled: bool,
    pub submitting: bool,
    pub on_add: Callback<f64>,
}

#[function_component(AddFeedForm)]
pub fn add_feed_form(props: &AddFeedFormProps) -> Html {
    let amount = use_state(String::new);

    let on_amount_change = {
        let amount = amount.clone();
        Callback::from(move |e: Event| {
            let input: HtmlInputElement = e.target_unchecked_into();
            amount.set(input.value());
        })
    };

    let on_submit = {
        let amount = amount.clone();
        let on_add = props.on_add.clone();
        Callback::from(move |e: SubmitEvent| {
            e.prevent_default();
            if let Ok(value) = amount.trim().parse::<f64>() {
                if value > 0.0 {
                    on_add.emit(value);
                    amount.set(String::new());
                }
            }
        })
    };

    let disabled = !props.enabled || props.submitting;

    html! {
        <section class="add-feed-section">
            <h2>{"Log a feed"}</h2>

            {if !props.enabled {
                html! {
                    <div class="form-message info">
                        {"Feeds can only be logged for today"}
                    </div>
                }
            } else { html! {} }}

            <div class="quick-add-buttons">
                {for QUICK_ADD_AMOUNTS.iter().map(|&quick_amount| {
                    let on_add = props.on_add.clone();
                    html! {
                        <button
                            class="btn quick-add-btn"
                            disabled={disabled}
                            onclick={Callback::from(move |_| on_add.emit(quick_amount))}
                        >
                            {format!("{} ml", quick_amount)}
                        </button>
                    }
                })}
            </div>

            <form class="add-feed-form" onsubmit={on_submit}>
                <input
                    type="number"
                    placeholder="Amount (ml)"
                    step="1"
                    min="1"
                    value={(*amount).clone()}
                    onchange={on_amount_change}
                    disabled={disabled}
                />
                <button type="submit" class="btn btn-primary" disabled={disabled}>
                    {if props.submitting { "Saving..." } else { "Add feed" }}
                </button>
            </form>
        </section>
    }
}
