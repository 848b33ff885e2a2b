//! Error taxonomy for a single backtest task.
//!
//! Three classes, each fatal to the task that raised it and to nothing else:
//! - `ConfigError`: rejected before any computation starts.
//! - `AlignmentError`: two series that must be index-aligned are not.
//! - `DataQualityError`: the input cannot be simulated (empty, non-finite, unordered).

use thiserror::Error;

/// Invalid configuration: unknown names, parameters out of range.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("unknown indicator kind: {0}")]
    UnknownIndicator(String),

    #[error("strategy {strategy:?} is not supported by {indicator}; supported: {supported:?}")]
    UnsupportedStrategy {
        indicator: String,
        strategy: String,
        supported: Vec<&'static str>,
    },

    #[error("unsupported interval: {0}")]
    UnsupportedInterval(String),

    #[error("invalid parameter {name} = {value}: {reason}")]
    InvalidParameter {
        name: String,
        value: f64,
        reason: &'static str,
    },

    #[error("config parse error: {0}")]
    Parse(String),
}

impl ConfigError {
    pub fn invalid(name: &str, value: f64, reason: &'static str) -> Self {
        ConfigError::InvalidParameter {
            name: name.to_string(),
            value,
            reason,
        }
    }
}

/// Two series that must have one entry per bar have different lengths.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{what} has {actual} entries but {expected} bars were supplied")]
pub struct AlignmentError {
    pub what: &'static str,
    pub expected: usize,
    pub actual: usize,
}

impl AlignmentError {
    /// Returns `Err` unless `actual == expected`.
    pub fn check(what: &'static str, expected: usize, actual: usize) -> Result<(), Self> {
        if expected == actual {
            Ok(())
        } else {
            Err(AlignmentError {
                what,
                expected,
                actual,
            })
        }
    }
}

/// Input data that cannot be simulated.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DataQualityError {
    #[error("empty bar series")]
    Empty,

    #[error("non-finite {field} at bar {index}")]
    NonFinite { field: &'static str, index: usize },

    #[error("non-positive {field} {value} at bar {index}")]
    NonPositivePrice {
        field: &'static str,
        index: usize,
        value: f64,
    },

    #[error("bar {index} has a high/low range that does not contain its open and close, or negative volume")]
    InconsistentBar { index: usize },

    #[error("timestamps not strictly ascending at bar {index}")]
    Unordered { index: usize },

    #[error("signal value {value} at bar {index} is outside {{-1, 0, 1}}")]
    InvalidSignal { index: usize, value: f64 },
}

/// Per-task error: the union of the three classes.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum BacktestError {
    #[error("configuration error: {0}")]
    Configuration(#[from] ConfigError),

    #[error("alignment error: {0}")]
    Alignment(#[from] AlignmentError),

    #[error("data quality error: {0}")]
    DataQuality(#[from] DataQualityError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn alignment_check_accepts_equal_lengths() {
        assert!(AlignmentError::check("signal", 5, 5).is_ok());
    }

    #[test]
    fn alignment_check_reports_both_lengths() {
        let err = AlignmentError::check("signal", 5, 4).unwrap_err();
        assert_eq!(err.expected, 5);
        assert_eq!(err.actual, 4);
        assert_eq!(
            err.to_string(),
            "signal has 4 entries but 5 bars were supplied"
        );
    }

    #[test]
    fn errors_convert_into_backtest_error() {
        let e: BacktestError = DataQualityError::Empty.into();
        assert!(matches!(e, BacktestError::DataQuality(DataQualityError::Empty)));

        let e: BacktestError = ConfigError::UnknownIndicator("Foo".into()).into();
        assert!(matches!(e, BacktestError::Configuration(_)));
    }

    #[test]
    fn unsupported_strategy_message_lists_choices() {
        let e = ConfigError::UnsupportedStrategy {
            indicator: "MACD".into(),
            strategy: "Nope".into(),
            supported: vec!["MACD"],
        };
        let msg = e.to_string();
        assert!(msg.contains("Nope"));
        assert!(msg.contains("MACD"));
    }
}
