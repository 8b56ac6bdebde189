use super::easing::{LAST_STEP, eased_value, interpolation};

/// What one tick displays.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Frame {
    /// Eased balance shown in the current-value node and the progress bar.
    pub value: f64,
    /// Whole periods `value` covers, `None` when the period cost can't be
    /// divided by.
    pub periods: Option<f64>,
    /// Whether this is the last frame of the animation.
    pub last: bool,
}

/// Whole periods `value` covers at `period_cost` each.
///
/// `None` for a zero, negative or non-finite cost.
#[must_use]
pub fn periods_covered(value: f64, period_cost: f64) -> Option<f64> {
    if !period_cost.is_finite() || period_cost <= 0.0 {
        return None;
    }
    Some((value / period_cost).floor())
}

/// Progress of one meter from `t = 0` to `t = 1`.
#[derive(Debug, Clone)]
pub struct Animation {
    balance: f64,
    period_cost: f64,
    step: u32,
    finished: bool,
}

impl Animation {
    #[must_use]
    pub const fn new(balance: f64, period_cost: f64) -> Self {
        Self {
            balance,
            period_cost,
            step: 0,
            finished: false,
        }
    }

    #[must_use]
    pub const fn balance(&self) -> f64 {
        self.balance
    }

    /// The interpolation parameter of the next frame, `1.0` once finished.
    #[must_use]
    pub fn progress(&self) -> f64 {
        interpolation(self.step)
    }

    #[must_use]
    pub const fn is_finished(&self) -> bool {
        self.finished
    }

    /// Frame for the current tick, advancing `t`. `None` once the frame at
    /// `t = 1` has been produced.
    pub fn next_frame(&mut self) -> Option<Frame> {
        if self.finished {
            return None;
        }

        let value = eased_value(self.balance, interpolation(self.step));
        let last = self.step >= LAST_STEP;

        if last {
            self.finished = true;
        } else {
            self.step += 1;
        }

        Some(Frame {
            value,
            periods: periods_covered(value, self.period_cost),
            last,
        })
    }
}

impl Iterator for Animation {
    type Item = Frame;

    fn next(&mut self) -> Option<Frame> {
        self.next_frame()
    }
}
