use thiserror::Error;

use crate::page::Element;

/// Marker attribute of a meter container; its value is the endpoint URL.
pub const METER_ATTRIBUTE: &str = "data-balance-meter";

/// Period cost attribute on the period node.
pub const FIXED_COSTS_ATTRIBUTE: &str = "data-fixed-costs";

pub const CURRENT_SELECTOR: &str = ".current";
pub const PROGRESS_SELECTOR: &str = ".progress";
pub const PERIOD_SELECTOR: &str = ".period";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SetupError {
    #[error("container has no {0} attribute")]
    MissingAttribute(&'static str),
    #[error("container has no element matching {0}")]
    MissingNode(&'static str),
}

/// Configuration read once from a meter container.
#[derive(Debug, Clone, PartialEq)]
pub struct MeterConfig {
    pub endpoint_url: String,
    /// The progress indicator's `max`.
    pub target_threshold: f64,
    /// Recurring cost per period. `NaN` when the attribute is missing or
    /// not a number.
    pub period_cost: f64,
}

/// The nodes a meter writes to. Resolved once, written on every tick.
#[derive(Debug, Clone)]
pub struct DisplayNodes<E> {
    pub current: E,
    pub progress: E,
    pub period: E,
}

impl<E: Element> DisplayNodes<E> {
    /// Resolve the display nodes inside `container`.
    ///
    /// # Errors
    ///
    /// [`SetupError::MissingNode`] naming the first selector that matched
    /// nothing.
    pub fn resolve(container: &E) -> Result<Self, SetupError> {
        let find = |selector: &'static str| {
            container
                .query_selector(selector)
                .ok_or(SetupError::MissingNode(selector))
        };

        Ok(Self {
            current: find(CURRENT_SELECTOR)?,
            progress: find(PROGRESS_SELECTOR)?,
            period: find(PERIOD_SELECTOR)?,
        })
    }
}

impl MeterConfig {
    /// Read the configuration of `container` and resolve its display nodes.
    ///
    /// # Errors
    ///
    /// If the marker attribute or one of the display nodes is missing.
    pub fn read<E: Element>(
        container: &E,
    ) -> Result<(Self, DisplayNodes<E>), SetupError> {
        let endpoint_url = container
            .attribute(METER_ATTRIBUTE)
            .ok_or(SetupError::MissingAttribute(METER_ATTRIBUTE))?;
        let nodes = DisplayNodes::resolve(container)?;

        let config = Self {
            endpoint_url,
            target_threshold: nodes.progress.progress_max(),
            period_cost: nodes
                .period
                .attribute(FIXED_COSTS_ATTRIBUTE)
                .map_or(f64::NAN, |value| parse_float(&value)),
        };

        Ok((config, nodes))
    }
}

/// Lenient float parsing in the manner of `parseFloat`: leading whitespace
/// is skipped and the longest numeric prefix is used, so `"200 EUR"` reads
/// as `200`. Anything without a numeric prefix is `NaN`.
#[must_use]
pub fn parse_float(input: &str) -> f64 {
    let input = input.trim_start();

    // Longest prefix that parses. Inputs are attribute values, short enough
    // for the quadratic scan not to matter.
    (1..=input.len())
        .rev()
        .filter(|end| input.is_char_boundary(*end))
        .find_map(|end| {
            let prefix = &input[..end];
            // Rust accepts "inf"/"nan" spellings that parseFloat does not
            if prefix.chars().any(|c| c.is_ascii_alphabetic() && c != 'e' && c != 'E') {
                return None;
            }
            prefix.parse::<f64>().ok()
        })
        .unwrap_or(f64::NAN)
}
