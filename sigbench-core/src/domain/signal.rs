//! Discrete trading signal and the per-bar series the simulator consumes.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::DataQualityError;

/// One trading instruction per bar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Signal {
    Sell,
    #[default]
    Hold,
    Buy,
}

impl Signal {
    /// -1 / 0 / +1
    pub fn as_i8(self) -> i8 {
        match self {
            Signal::Sell => -1,
            Signal::Hold => 0,
            Signal::Buy => 1,
        }
    }

    pub fn from_i8(v: i8) -> Option<Self> {
        match v {
            -1 => Some(Signal::Sell),
            0 => Some(Signal::Hold),
            1 => Some(Signal::Buy),
            _ => None,
        }
    }
}

impl fmt::Display for Signal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Signal::Sell => "SELL",
            Signal::Hold => "HOLD",
            Signal::Buy => "BUY",
        };
        write!(f, "{s}")
    }
}

/// Actionable signal at the most recent bar. `Hold` is not an action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Action {
    Buy,
    Sell,
}

/// One signal per bar, index-aligned with the bars it was computed from.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SignalSeries(Vec<Signal>);

impl SignalSeries {
    pub fn new(signals: Vec<Signal>) -> Self {
        Self(signals)
    }

    /// All-hold series of length `n`.
    pub fn neutral(n: usize) -> Self {
        Self(vec![Signal::Hold; n])
    }

    /// Parse numeric signals (e.g. from an external source). Any value outside
    /// {-1, 0, +1}, including NaN, is rejected with its index.
    pub fn from_raw(values: &[f64]) -> Result<Self, DataQualityError> {
        values
            .iter()
            .enumerate()
            .map(|(index, &value)| {
                if !value.is_finite() {
                    return Err(DataQualityError::NonFinite {
                        field: "signal",
                        index,
                    });
                }
                if value.fract() != 0.0 {
                    return Err(DataQualityError::InvalidSignal { index, value });
                }
                Signal::from_i8(value as i8).ok_or(DataQualityError::InvalidSignal { index, value })
            })
            .collect::<Result<Vec<_>, _>>()
            .map(Self)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_slice(&self) -> &[Signal] {
        &self.0
    }

    pub fn iter(&self) -> impl Iterator<Item = Signal> + '_ {
        self.0.iter().copied()
    }

    pub fn to_raw(&self) -> Vec<i8> {
        self.0.iter().map(|s| s.as_i8()).collect()
    }

    /// Drop the first `n` entries (warmup window).
    pub fn skip(&self, n: usize) -> Self {
        Self(self.0.iter().skip(n).copied().collect())
    }

    /// Buy or sell at the last bar; `None` when it is a hold or the series is empty.
    pub fn latest_action(&self) -> Option<Action> {
        match self.0.last()? {
            Signal::Buy => Some(Action::Buy),
            Signal::Sell => Some(Action::Sell),
            Signal::Hold => None,
        }
    }
}

impl From<Vec<Signal>> for SignalSeries {
    fn from(v: Vec<Signal>) -> Self {
        Self(v)
    }
}

impl FromIterator<Signal> for SignalSeries {
    fn from_iter<I: IntoIterator<Item = Signal>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_raw_accepts_domain_values() {
        let s = SignalSeries::from_raw(&[1.0, 0.0, -1.0, 0.0]).unwrap();
        assert_eq!(
            s.as_slice(),
            &[Signal::Buy, Signal::Hold, Signal::Sell, Signal::Hold]
        );
        assert_eq!(s.to_raw(), vec![1, 0, -1, 0]);
    }

    #[test]
    fn from_raw_rejects_nan() {
        let err = SignalSeries::from_raw(&[0.0, f64::NAN]).unwrap_err();
        assert_eq!(
            err,
            DataQualityError::NonFinite {
                field: "signal",
                index: 1
            }
        );
    }

    #[test]
    fn from_raw_rejects_out_of_domain() {
        assert!(matches!(
            SignalSeries::from_raw(&[2.0]),
            Err(DataQualityError::InvalidSignal { index: 0, .. })
        ));
        assert!(matches!(
            SignalSeries::from_raw(&[0.0, 0.5]),
            Err(DataQualityError::InvalidSignal { index: 1, .. })
        ));
    }

    #[test]
    fn latest_action_reads_last_bar() {
        let s = SignalSeries::new(vec![Signal::Buy, Signal::Sell]);
        assert_eq!(s.latest_action(), Some(Action::Sell));
        let s = SignalSeries::new(vec![Signal::Buy, Signal::Hold]);
        assert_eq!(s.latest_action(), None);
        assert_eq!(SignalSeries::default().latest_action(), None);
    }

    #[test]
    fn skip_drops_warmup() {
        let s = SignalSeries::new(vec![Signal::Buy, Signal::Hold, Signal::Sell]);
        assert_eq!(s.skip(1).as_slice(), &[Signal::Hold, Signal::Sell]);
        assert!(s.skip(10).is_empty());
    }

    #[test]
    fn signal_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&Signal::Buy).unwrap(), "\"buy\"");
        assert_eq!(Signal::Sell.to_string(), "SELL");
    }
}
