use web_sys::window;

/// Viewport width below which the sidebar becomes a drawer.
pub const MOBILE_BREAKPOINT: f64 = 768.0;

pub fn is_mobile_viewport() -> bool {
    window()
        .and_then(|w| w.inner_width().ok())
        .and_then(|w| w.as_f64())
        .map(|width| width < MOBILE_BREAKPOINT)
        .unwrap_or(false)
}

pub fn copy_text_to_clipboard(text: &str) {
    let Ok(payload) = serde_json::to_string(text) else {
        return;
    };
    let js = format!(
        "if (navigator && navigator.clipboard) {{ navigator.clipboard.writeText({payload}); }}"
    );
    if let Err(e) = js_sys::eval(&js) {
        log::error!("Clipboard write failed: {e:?}");
    }
}

pub fn scroll_into_view(element_id: &str) {
    let Some(element) = window()
        .and_then(|w| w.document())
        .and_then(|d| d.get_element_by_id(element_id))
    else {
        return;
    };
    element.scroll_into_view();
}
