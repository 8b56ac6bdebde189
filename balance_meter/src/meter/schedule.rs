//! Repeating timers for the animation loop.
//!
//! The animator never sleeps on its own: it owns an [`Interval`], which pairs
//! a [`Ticker`] (how to wait for the next tick on this platform) with a
//! [`TimerToken`] that records when the timer was released. Tests drive the
//! loop with a ticker that never waits.

use std::{cell::Cell, rc::Rc};

/// Waits for the next tick of a repeating timer.
pub trait Ticker {
    fn tick(&mut self) -> impl Future<Output = ()>;
}

/// Observer for the release of an [`Interval`].
#[derive(Debug, Clone, Default)]
pub struct TimerToken(Rc<Cell<bool>>);

impl TimerToken {
    #[must_use]
    pub fn is_released(&self) -> bool {
        self.0.get()
    }
}

/// A repeating timer owned by exactly one task.
///
/// Releasing consumes the interval, so the timer is released at most once
/// and nothing can wait on it afterwards.
#[derive(Debug)]
pub struct Interval<T> {
    ticker: T,
    token: TimerToken,
    ticks: u32,
}

impl<T: Ticker> Interval<T> {
    pub fn new(ticker: T) -> Self {
        Self {
            ticker,
            token: TimerToken::default(),
            ticks: 0,
        }
    }

    /// A handle that observes when this interval is released.
    #[must_use]
    pub fn token(&self) -> TimerToken {
        self.token.clone()
    }

    /// Wait for the next tick.
    pub async fn tick(&mut self) {
        self.ticker.tick().await;
        self.ticks += 1;
    }

    /// Ticks elapsed so far.
    #[must_use]
    pub const fn ticks(&self) -> u32 {
        self.ticks
    }

    /// Stop the timer, returning how many ticks it fired.
    pub fn release(self) -> u32 {
        self.token.0.set(true);
        self.ticks
    }
}

#[cfg(not(target_arch = "wasm32"))]
pub use native::TokioTicker;

#[cfg(not(target_arch = "wasm32"))]
mod native {
    use std::time::Duration;

    use tokio::time::{self, Instant, MissedTickBehavior};

    use super::Ticker;
    use crate::meter::easing::TICK_INTERVAL;

    /// Ticker on the tokio timer. Like `setInterval`, the first tick fires
    /// one period after the first wait begins, and the timer is only
    /// created then. Must be polled inside a runtime.
    #[derive(Debug)]
    pub struct TokioTicker {
        period: Duration,
        interval: Option<time::Interval>,
    }

    impl TokioTicker {
        #[must_use]
        pub const fn new(period: Duration) -> Self {
            Self {
                period,
                interval: None,
            }
        }
    }

    impl Default for TokioTicker {
        fn default() -> Self {
            Self::new(TICK_INTERVAL)
        }
    }

    impl Ticker for TokioTicker {
        async fn tick(&mut self) {
            let period = self.period;
            let interval = self.interval.get_or_insert_with(|| {
                let mut interval =
                    time::interval_at(Instant::now() + period, period);
                interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
                interval
            });
            interval.tick().await;
        }
    }
}

#[cfg(target_arch = "wasm32")]
pub use browser::TimeoutTicker;

#[cfg(target_arch = "wasm32")]
mod browser {
    use std::time::Duration;

    use wasm_bindgen::JsValue;
    use wasm_bindgen_futures::JsFuture;

    use super::Ticker;
    use crate::meter::easing::TICK_INTERVAL;

    /// Ticker on the browser's `setTimeout`.
    #[derive(Debug, Clone, Copy)]
    pub struct TimeoutTicker {
        period_ms: i32,
    }

    impl TimeoutTicker {
        #[must_use]
        pub fn new(period: Duration) -> Self {
            Self {
                period_ms: i32::try_from(period.as_millis()).unwrap_or(i32::MAX),
            }
        }
    }

    impl Default for TimeoutTicker {
        fn default() -> Self {
            Self::new(TICK_INTERVAL)
        }
    }

    impl Ticker for TimeoutTicker {
        async fn tick(&mut self) {
            let period_ms = self.period_ms;
            let promise = js_sys::Promise::new(&mut |resolve, _reject| {
                let scheduled = web_sys::window().and_then(|window| {
                    window
                        .set_timeout_with_callback_and_timeout_and_arguments_0(
                            &resolve, period_ms,
                        )
                        .ok()
                });
                // without a window there is nothing to wait on
                if scheduled.is_none() {
                    let _ = resolve.call0(&JsValue::NULL);
                }
            });
            let _ = JsFuture::from(promise).await;
        }
    }
}
