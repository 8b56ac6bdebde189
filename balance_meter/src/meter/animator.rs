use super::{
    animation::{Animation, Frame},
    classify::{VisualState, classify},
    config::{DisplayNodes, MeterConfig, SetupError},
    fetch::BalanceSource,
    schedule::{Interval, Ticker},
};
use crate::page::Element;

/// Shown in the current-value node when the balance could not be fetched.
pub const UNAVAILABLE_TEXT: &str = "unavailable";

/// Shown in the period node when there is no period count to show.
pub const NOT_APPLICABLE_TEXT: &str = "N/A";

/// Lifecycle of a meter.
///
/// `Idle -> AwaitingFetch -> Animating -> Done`, or
/// `AwaitingFetch -> Failed` when the balance can't be fetched. `Done` and
/// `Failed` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MeterPhase {
    Idle,
    AwaitingFetch,
    Animating,
    Done,
    Failed,
}

impl MeterPhase {
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Done | Self::Failed)
    }
}

/// How a meter run ended.
#[derive(Debug, Clone, PartialEq)]
pub struct MeterReport {
    pub phase: MeterPhase,
    pub balance: Option<f64>,
    pub state: Option<VisualState>,
    /// Timer ticks fired before the timer was released.
    pub ticks: u32,
}

/// One balance meter widget bound to its container.
#[derive(Debug)]
pub struct BalanceMeter<E, S> {
    config: MeterConfig,
    nodes: DisplayNodes<E>,
    source: S,
    phase: MeterPhase,
}

impl<E: Element, S: BalanceSource> BalanceMeter<E, S> {
    /// Read the container's configuration and resolve its display nodes.
    ///
    /// # Errors
    ///
    /// If the container is missing its endpoint or one of its display nodes.
    pub fn setup(container: &E, source: S) -> Result<Self, SetupError> {
        let (config, nodes) = MeterConfig::read(container)?;

        tracing::debug!(
            "balance meter for {} (target {}, period cost {})",
            config.endpoint_url,
            config.target_threshold,
            config.period_cost
        );

        Ok(Self {
            config,
            nodes,
            source,
            phase: MeterPhase::Idle,
        })
    }

    #[must_use]
    pub const fn config(&self) -> &MeterConfig {
        &self.config
    }

    #[must_use]
    pub const fn phase(&self) -> MeterPhase {
        self.phase
    }

    /// Fetch the balance and animate the display on `interval` until the
    /// eased value reaches the balance. The interval is released when the
    /// last frame has been drawn.
    ///
    /// A failed fetch ends the run in [`MeterPhase::Failed`] with the
    /// display showing [`UNAVAILABLE_TEXT`]; the timer is never started.
    pub async fn run<T: Ticker>(mut self, mut interval: Interval<T>) -> MeterReport {
        self.enter(MeterPhase::AwaitingFetch);

        let fetched = self
            .source
            .fetch_balance(&self.config.endpoint_url)
            .await;

        let balance = match fetched {
            Ok(balance) => balance,
            Err(e) => {
                tracing::warn!(
                    "balance unavailable for {}: {}",
                    self.config.endpoint_url,
                    e
                );
                self.show_unavailable();
                self.enter(MeterPhase::Failed);
                return MeterReport {
                    phase: self.phase,
                    balance: None,
                    state: None,
                    ticks: 0,
                };
            }
        };

        let state = classify(balance, self.config.target_threshold);
        self.nodes.progress.add_class(state.class_name());
        self.enter(MeterPhase::Animating);

        let mut animation = Animation::new(balance, self.config.period_cost);
        loop {
            interval.tick().await;

            let t = animation.progress();
            let Some(frame) = animation.next_frame() else {
                break;
            };
            tracing::trace!("tick {} at t={}", interval.ticks(), t);
            self.render(&frame);

            if frame.last {
                break;
            }
        }

        let ticks = interval.release();
        self.enter(MeterPhase::Done);

        MeterReport {
            phase: self.phase,
            balance: Some(balance),
            state: Some(state),
            ticks,
        }
    }

    fn enter(&mut self, phase: MeterPhase) {
        tracing::debug!(
            "balance meter {}: {:?} -> {:?}",
            self.config.endpoint_url,
            self.phase,
            phase
        );
        self.phase = phase;
    }

    fn render(&self, frame: &Frame) {
        let value = display_number(frame.value);
        self.nodes.current.set_text(&value);
        self.nodes.progress.set_progress_value(frame.value);
        self.nodes.period.set_text(
            &frame
                .periods
                .map_or_else(|| NOT_APPLICABLE_TEXT.to_string(), display_number),
        );
    }

    fn show_unavailable(&self) {
        self.nodes.current.set_text(UNAVAILABLE_TEXT);
        self.nodes.period.set_text(NOT_APPLICABLE_TEXT);
    }
}

/// Text for a number the way a browser prints it: integers without a
/// fraction, negative zero as `0`, and exponent notation (`1e+21`,
/// `1.5e-7`) below `1e-6` and from `1e21` up.
#[must_use]
pub fn display_number(value: f64) -> String {
    if value.is_nan() {
        return "NaN".to_string();
    }
    if value.is_infinite() {
        return if value > 0.0 { "Infinity" } else { "-Infinity" }.to_string();
    }
    if value == 0.0 {
        return "0".to_string();
    }

    let magnitude = value.abs();
    if !(1e-6..1e21).contains(&magnitude) {
        let exponential = format!("{value:e}");
        return match exponential.split_once('e') {
            Some((digits, exponent)) if !exponent.starts_with('-') => {
                format!("{digits}e+{exponent}")
            }
            _ => exponential,
        };
    }

    value.to_string()
}
