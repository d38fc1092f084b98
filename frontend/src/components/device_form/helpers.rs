//! Browser glue for the device form: toasts, navigation and the description
//! preview.

use gloo_timers::future::TimeoutFuture;
use wasm_bindgen::JsCast;
use web_sys::HtmlElement;
use wasm_bindgen_futures::spawn_local;

use common::form::TOAST_DURATION_MS;

pub fn show_toast(message: &str) {
    show_toast_for(message, TOAST_DURATION_MS);
}

/// Shows `message` at the bottom of the page and removes it after
/// `duration_ms`.
pub fn show_toast_for(message: &str, duration_ms: u32) {
    let Some(document) = web_sys::window().and_then(|w| w.document()) else {
        return;
    };
    let (Ok(toast), Some(body)) = (document.create_element("div"), document.body()) else {
        return;
    };
    // Server messages end up here, never treat them as markup.
    toast.set_text_content(Some(message));
    let toast: HtmlElement = toast.unchecked_into();
    toast.set_class_name("toast");
    let style = toast.style();
    style.set_property("position", "fixed").ok();
    style.set_property("bottom", "20px").ok();
    style.set_property("left", "50%").ok();
    style.set_property("transform", "translateX(-50%)").ok();
    style.set_property("background", "rgba(0, 0, 0, 0.8)").ok();
    style.set_property("color", "#fff").ok();
    style.set_property("padding", "10px 20px").ok();
    style.set_property("border-radius", "4px").ok();
    style.set_property("z-index", "10000").ok();

    if body.append_child(&toast).is_ok() {
        spawn_local(async move {
            TimeoutFuture::new(duration_ms).await;
            if let Some(parent) = toast.parent_node() {
                parent.remove_child(&toast).ok();
            }
        });
    }
}

/// Path, query and hash of the current page.
pub struct PageLocation {
    pub path: String,
    pub query: String,
    pub hash: String,
}

pub fn current_location() -> PageLocation {
    let location = web_sys::window().map(|w| w.location());
    let read = |f: fn(&web_sys::Location) -> Result<String, wasm_bindgen::JsValue>| {
        location
            .as_ref()
            .and_then(|l| f(l).ok())
            .unwrap_or_default()
    };
    PageLocation {
        path: read(web_sys::Location::pathname),
        query: read(web_sys::Location::search),
        hash: read(web_sys::Location::hash),
    }
}

pub fn navigate(url: &str) {
    if let Some(window) = web_sys::window() {
        window.location().set_href(url).ok();
    }
}

pub fn reload() {
    if let Some(window) = web_sys::window() {
        window.location().reload().ok();
    }
}

/// Rewrites the address bar without a navigation.
pub fn replace_url(url: &str) {
    if let Some(history) = web_sys::window().and_then(|w| w.history().ok()) {
        history
            .replace_state_with_url(&wasm_bindgen::JsValue::NULL, "", Some(url))
            .ok();
    }
}

pub fn open_in_new_tab(url: &str) {
    if let Some(window) = web_sys::window() {
        window.open_with_url_and_target(url, "_blank").ok();
    }
}
