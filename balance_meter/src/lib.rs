//! Client-side behavior for the umverteiler page.
//!
//! Two independent widgets:
//!
//! - [`toggler`]: a delegated click handler toggling a class on the element
//!   named by the clicked element's `data-toggle-class-target`.
//! - [`meter`]: the balance meter, which fetches a balance once and animates
//!   a progress bar up to it.
//!
//! Both work against the [`page`] traits. In the browser the page bootstrap
//! calls `page::web::init` (wasm32 only); elsewhere the in-memory page in
//! [`page::memory`] stands in for the DOM.

pub mod meter;
pub mod page;
pub mod toggler;

pub use meter::{BalanceMeter, MeterPhase, MeterReport, VisualState, setup_meters};
pub use toggler::{ClassToggler, ClickOutcome, ToggleError};
