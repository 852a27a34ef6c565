//! DOM and Web API helpers.

use wasm_bindgen::JsCast;
use web_sys::Window;

use crate::core::error::StorageError;
use crate::core::storage::Storage;

/// Get the browser window object.
#[inline]
pub fn window() -> Option<Window> {
    web_sys::window()
}

/// Get localStorage.
#[inline]
pub fn local_storage() -> Option<web_sys::Storage> {
    window()?.local_storage().ok()?
}

/// Focus the first element matching a CSS selector.
///
/// Returns `true` if the element was found and focused.
pub fn focus_element(selector: &str) -> bool {
    if let Some(window) = window()
        && let Some(document) = window.document()
        && let Some(element) = document.query_selector(selector).ok().flatten()
        && let Ok(html_element) = element.dyn_into::<web_sys::HtmlElement>()
    {
        html_element.focus().is_ok()
    } else {
        false
    }
}

/// Focus the terminal input line.
#[inline]
pub fn focus_terminal_input() {
    focus_element("input");
}

/// Scroll an element to its bottom.
pub fn scroll_to_bottom(element: &web_sys::HtmlElement) {
    element.set_scroll_top(element.scroll_height());
}

// =============================================================================
// localStorage
// =============================================================================

/// One localStorage key holding one blob.
///
/// Private browsing and disabled storage surface as
/// [`StorageError::Unavailable`]; the shell keeps running in memory.
#[derive(Clone, Debug)]
pub struct LocalStorage {
    key: &'static str,
}

impl LocalStorage {
    pub const fn new(key: &'static str) -> Self {
        Self { key }
    }
}

impl Storage for LocalStorage {
    fn save(&self, blob: &str) -> Result<(), StorageError> {
        let storage = local_storage().ok_or(StorageError::Unavailable)?;
        storage
            .set_item(self.key, blob)
            .map_err(|_| StorageError::WriteFailed)
    }

    fn load(&self) -> Result<Option<String>, StorageError> {
        let storage = local_storage().ok_or(StorageError::Unavailable)?;
        storage
            .get_item(self.key)
            .map_err(|_| StorageError::ReadFailed)
    }
}
