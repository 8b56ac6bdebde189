/// Ratio at or above which the meter shows success.
pub const SUCCESS_RATIO: f64 = 0.5;

/// Ratio at or above which the meter shows a warning instead of danger.
pub const WARNING_RATIO: f64 = 0.25;

/// Coloring of the progress indicator, fixed once the balance is known.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VisualState {
    Success,
    Warning,
    Danger,
}

impl VisualState {
    /// CSS class applied to the progress indicator.
    #[must_use]
    pub const fn class_name(self) -> &'static str {
        match self {
            Self::Success => "is-success",
            Self::Warning => "is-warning",
            Self::Danger => "is-danger",
        }
    }
}

/// Classify `balance` against `target`. Both thresholds are inclusive.
///
/// A ratio that is not finite (a zero target, `NaN` inputs) is `Danger`.
#[must_use]
pub fn classify(balance: f64, target: f64) -> VisualState {
    let ratio = balance / target;

    if !ratio.is_finite() {
        return VisualState::Danger;
    }

    if ratio >= SUCCESS_RATIO {
        VisualState::Success
    } else if ratio >= WARNING_RATIO {
        VisualState::Warning
    } else {
        VisualState::Danger
    }
}
