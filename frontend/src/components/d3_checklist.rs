use yew::prelude::*;

const DOSE_LABELS: [&str; 2] = ["Morning dose", "Evening dose"];

#[derive(Properties, PartialEq)]
pub struct D3ChecklistProps {
    pub status: [bool; 2],
    pub on_toggle: Callback<usize>,
}

/// The two-dose vitamin D3 checklist for the selected day.
#[function_component(D3Checklist)]
pub fn d3_checklist(props: &D3ChecklistProps) -> Html {
    html! {
        <section class="d3-section">
            <h2>{"Vitamin D3"}</h2>
            <div class="d3-checklist">
                {for (0..2).map(|dose| {
                    let on_toggle = props.on_toggle.clone();
                    html! {
                        <label class="d3-dose">
                            <input
                                type="checkbox"
                                checked={props.status[dose]}
                                onchange={Callback::from(move |_| on_toggle.emit(dose))}
                            />
                            {DOSE_LABELS[dose]}
                        </label>
                    }
                })}
            </div>
        </section>
    }
}
