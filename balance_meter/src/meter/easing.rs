//! Quadratic ease-out over a fixed number of ticks.

use std::time::Duration;

/// Delay between two animation ticks.
pub const TICK_INTERVAL: Duration = Duration::from_millis(10);

/// How far `t` advances per tick.
pub const STEP: f64 = 0.005;

/// Number of increments from `t = 0` to `t = 1`.
pub const LAST_STEP: u32 = 200;

/// Ticks in a full animation, `t = 0` and `t = 1` included.
pub const TICKS: u32 = LAST_STEP + 1;

/// Interpolation parameter for a step counter.
///
/// `t` is derived from the integer step rather than accumulated, so the
/// final tick lands on exactly `1.0`.
#[must_use]
pub fn interpolation(step: u32) -> f64 {
    f64::from(step.min(LAST_STEP)) / f64::from(LAST_STEP)
}

/// Displayed value at `t`: `floor(balance * t * (2 - t))`.
///
/// Non-decreasing over `t` in `[0, 1]` for a non-negative balance, `0` at
/// the start and exactly `balance.floor()` at the end.
#[must_use]
pub fn eased_value(balance: f64, t: f64) -> f64 {
    (balance * t * (2.0 - t)).floor()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_interpolation_hits_bounds_exactly() {
        assert!(interpolation(0) == 0.0);
        assert!(interpolation(LAST_STEP) == 1.0);
        assert!(interpolation(LAST_STEP + 7) == 1.0);
        assert!((interpolation(1) - STEP).abs() < 1e-15);
        assert!((interpolation(100) - 0.5).abs() < 1e-15);
    }

    #[test]
    fn test_eased_value_endpoints() {
        for balance in [0.0, 1.0, 240.0, 500.0, 600.0, 1_000_000.0] {
            assert!(eased_value(balance, 0.0) == 0.0);
            assert!(eased_value(balance, 1.0) == balance);
        }
    }

    #[test]
    fn test_eased_value_is_monotonic() {
        for balance in [1.0, 37.0, 500.0, 999.0, 123_456.0] {
            let values: Vec<f64> = (0..=LAST_STEP)
                .map(|step| eased_value(balance, interpolation(step)))
                .collect();

            assert_eq!(values.len(), TICKS as usize);
            assert!(
                values.windows(2).all(|pair| pair[0] <= pair[1]),
                "values for {balance} are not monotonic"
            );
        }
    }

    #[test]
    fn test_eased_value_front_loads_progress() {
        // halfway through the animation three quarters are shown
        assert!(eased_value(1000.0, 0.5) == 750.0);
        assert!(eased_value(1000.0, interpolation(1)) == 9.0);
    }

    #[test]
    fn test_eased_value_floors_fractional_balance() {
        assert!(eased_value(10.75, 1.0) == 10.0);
        assert!(eased_value(-10.25, 1.0) == -11.0);
    }
}
