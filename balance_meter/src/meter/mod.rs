//! The balance meter: fetches a balance once and animates a progress bar up
//! to it with a quadratic ease-out, colored by how close the balance is to
//! the bar's maximum.
//!
//! A meter is any element carrying `data-balance-meter="<endpoint>"` with
//! three nodes inside:
//!
//! ```html
//! <div data-balance-meter="/api/balance">
//!   <span class="current"></span>
//!   <progress class="progress" max="1000"></progress>
//!   <span class="period" data-fixed-costs="200"></span>
//! </div>
//! ```

pub mod animation;
pub mod animator;
pub mod classify;
pub mod config;
pub mod easing;
pub mod fetch;
pub mod schedule;

pub use animator::{BalanceMeter, MeterPhase, MeterReport};
pub use classify::VisualState;
pub use config::{MeterConfig, SetupError};
pub use fetch::{BalanceSource, FetchError, HttpBalanceSource};
pub use schedule::{Interval, Ticker, TimerToken};

use crate::page::Page;

/// Set up a meter for every container on `page`.
///
/// Containers that fail setup are logged and skipped; the others are
/// returned in document order, each with its own clone of `source`.
pub fn setup_meters<P, S>(
    page: &P,
    source: &S,
) -> Vec<BalanceMeter<P::Element, S>>
where
    P: Page,
    S: BalanceSource + Clone,
{
    let selector = format!("[{}]", config::METER_ATTRIBUTE);

    page.query_selector_all(&selector)
        .iter()
        .enumerate()
        .filter_map(|(index, container)| {
            match BalanceMeter::setup(container, source.clone()) {
                Ok(meter) => Some(meter),
                Err(e) => {
                    tracing::error!("skipping balance meter #{}: {}", index, e);
                    None
                }
            }
        })
        .collect()
}
