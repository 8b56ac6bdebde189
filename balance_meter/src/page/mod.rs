//! The slice of the DOM the widgets touch.
//!
//! Everything in this crate talks to the page through these traits, so the
//! same behavior runs against the browser DOM (`web`, wasm32 only) and the
//! in-memory tree used by tests and the headless preview (`memory`).

use thiserror::Error;

pub mod memory;
#[cfg(target_arch = "wasm32")]
pub mod web;

/// A class name that can't be a single class token.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("{0:?} is not a valid class name")]
pub struct InvalidClassName(pub String);

/// Check that `class` is one class token: non-empty and free of ASCII
/// whitespace, the same rule `classList` enforces.
///
/// # Errors
///
/// [`InvalidClassName`] when it isn't.
pub fn check_class_name(class: &str) -> Result<(), InvalidClassName> {
    if class.is_empty() || class.contains(|c: char| c.is_ascii_whitespace()) {
        return Err(InvalidClassName(class.to_string()));
    }
    Ok(())
}

/// Handle to a single element.
///
/// Handles are cheap to clone and share the underlying node, the same way a
/// DOM reference does. Mutating methods take `&self`.
pub trait Element: Clone {
    /// Value of the named attribute, if present.
    fn attribute(&self, name: &str) -> Option<String>;

    /// First descendant matching `selectors`.
    fn query_selector(&self, selectors: &str) -> Option<Self>;

    /// Every descendant matching `selectors`, in document order.
    fn query_selector_all(&self, selectors: &str) -> Vec<Self>;

    fn has_class(&self, class: &str) -> bool;

    fn add_class(&self, class: &str);

    /// Flip membership of `class` and return whether it is now present.
    ///
    /// # Errors
    ///
    /// If `class` is not a single class token; nothing changes then.
    fn toggle_class(&self, class: &str) -> Result<bool, InvalidClassName>;

    fn text(&self) -> String;

    fn set_text(&self, text: &str);

    /// The `max` of a progress indicator.
    ///
    /// Follows `<progress>` semantics: a missing or unparsable attribute
    /// reads as `1.0`.
    fn progress_max(&self) -> f64;

    fn set_progress_value(&self, value: f64);
}

/// Document-level lookups.
pub trait Page {
    type Element: Element;

    fn query_selector(&self, selectors: &str) -> Option<Self::Element>;

    fn query_selector_all(&self, selectors: &str) -> Vec<Self::Element>;
}

/// A click delivered to a document-level listener.
pub trait ClickEvent {
    type Element: Element;

    /// The element the click originated on, if it was an element.
    fn target(&self) -> Option<Self::Element>;

    fn prevent_default(&self);

    fn stop_propagation(&self);
}
