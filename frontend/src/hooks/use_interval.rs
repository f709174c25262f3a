use gloo::timers::future::TimeoutFuture;
use wasm_bindgen_futures::spawn_local;
use yew::prelude::*;

/// Fire a callback every `period_ms` milliseconds for the lifetime of the
/// page. Used for the periodic server refetch and the clock tick; both live
/// on the root component, which never unmounts, so there is no cancellation
/// path.
#[hook]
pub fn use_interval(callback: Callback<()>, period_ms: u32) {
    use_effect_with((), move |_| {
        spawn_local(async move {
            loop {
                TimeoutFuture::new(period_ms).await;
                callback.emit(());
            }
        });
        || ()
    });
}
