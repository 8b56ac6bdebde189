//! Delegated class toggling.
//!
//! Any element carrying `data-toggle-class="is-open"` and
//! `data-toggle-class-target="#menu"` toggles `is-open` on `#menu` when
//! clicked. One listener on the document handles every such element.

use thiserror::Error;

use crate::page::{ClickEvent, Element, InvalidClassName, Page, check_class_name};

pub const TOGGLE_CLASS_ATTRIBUTE: &str = "data-toggle-class";
pub const TOGGLE_TARGET_ATTRIBUTE: &str = "data-toggle-class-target";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ToggleError {
    #[error("element declares data-toggle-class without data-toggle-class-target")]
    MissingTarget,
    #[error("toggle target {selector:?} matches no element")]
    TargetNotFound { selector: String },
    #[error("data-toggle-class: {0}")]
    InvalidClass(#[from] InvalidClassName),
}

/// What a click asked for, read from the clicked element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToggleDirective {
    pub class_name: String,
    pub target_selector: Option<String>,
}

impl ToggleDirective {
    /// Read the directive from `element`, if it declares one.
    pub fn from_element<E: Element>(element: &E) -> Option<Self> {
        let class_name = element.attribute(TOGGLE_CLASS_ATTRIBUTE)?;

        Some(Self {
            class_name,
            target_selector: element.attribute(TOGGLE_TARGET_ATTRIBUTE),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClickOutcome {
    /// The click did not carry a directive and was left alone.
    Ignored,
    /// The class was toggled; `present` is its membership afterwards.
    Toggled { class: String, present: bool },
}

/// Stateless handler for document-level clicks.
#[derive(Debug, Default, Clone, Copy)]
pub struct ClassToggler;

impl ClassToggler {
    /// Handle one click.
    ///
    /// # Errors
    ///
    /// A directive whose class is not a single class token, or whose target
    /// is missing or matches nothing, is a page configuration error. Nothing is mutated and the event is not
    /// suppressed in that case.
    pub fn handle_click<P, C>(
        self,
        page: &P,
        event: &C,
    ) -> Result<ClickOutcome, ToggleError>
    where
        P: Page,
        C: ClickEvent<Element = P::Element>,
    {
        let Some(directive) =
            event.target().as_ref().and_then(ToggleDirective::from_element)
        else {
            return Ok(ClickOutcome::Ignored);
        };

        check_class_name(&directive.class_name)?;
        let selector =
            directive.target_selector.ok_or(ToggleError::MissingTarget)?;
        let target = page.query_selector(&selector).ok_or_else(|| {
            ToggleError::TargetNotFound {
                selector: selector.clone(),
            }
        })?;

        let present = target.toggle_class(&directive.class_name)?;
        event.prevent_default();
        event.stop_propagation();

        tracing::debug!(
            "toggled {} on {} (present: {})",
            directive.class_name,
            selector,
            present
        );

        Ok(ClickOutcome::Toggled {
            class: directive.class_name,
            present,
        })
    }
}
