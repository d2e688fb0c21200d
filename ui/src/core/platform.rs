//! Platform helpers. The islands run in the browser; the native branches keep
//! the crate testable and usable from a desktop shell.

use std::future::Future;

use time::{Date, OffsetDateTime};

/// Runs a future on the UI thread without waiting for it.
#[cfg(target_arch = "wasm32")]
pub fn spawn_future<F>(future: F)
where
    F: Future<Output = ()> + 'static,
{
    wasm_bindgen_futures::spawn_local(future);
}

/// Native fallback: drives the future to completion on the calling thread.
#[cfg(not(target_arch = "wasm32"))]
pub fn spawn_future<F>(future: F)
where
    F: Future<Output = ()> + 'static,
{
    futures::executor::block_on(future);
}

/// Calendar date used as "today" for sample generation.
pub fn today() -> Date {
    OffsetDateTime::now_utc().date()
}

/// Origin of the page the island is mounted in, e.g. `https://members.coop`.
#[cfg(target_arch = "wasm32")]
pub fn page_origin() -> Option<String> {
    web_sys::window().and_then(|window| window.location().origin().ok())
}

#[cfg(not(target_arch = "wasm32"))]
pub fn page_origin() -> Option<String> {
    None
}

/// Text content of the element with the given id, if any.
#[cfg(target_arch = "wasm32")]
pub fn element_text(id: &str) -> Option<String> {
    web_sys::window()
        .and_then(|window| window.document())
        .and_then(|document| document.get_element_by_id(id))
        .and_then(|element| element.text_content())
}

#[cfg(not(target_arch = "wasm32"))]
pub fn element_text(_id: &str) -> Option<String> {
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn native_build_has_no_page() {
        assert_eq!(page_origin(), None);
        assert_eq!(element_text("tapir-ui-config"), None);
    }

    #[test]
    fn spawn_future_runs_to_completion_natively() {
        let flag = std::rc::Rc::new(std::cell::Cell::new(false));
        let inner = flag.clone();
        spawn_future(async move { inner.set(true) });
        assert!(flag.get());
    }
}
