//! SignalProvider — one indicator configuration plus an optional strategy,
//! memoized on the content fingerprint of its last input.
//!
//! The memo is per-instance state behind `&mut self`: sharing one provider
//! across threads requires external locking, and the borrow checker rejects
//! concurrent `calculate` calls outright. For cross-task sharing, hold
//! components in an external memo keyed by `(ProviderKey, Fingerprint)`
//! instead.

use std::collections::BTreeMap;
use std::sync::Arc;

use tracing::debug;

use crate::domain::{check_ordering, Bar, SignalSeries};
use crate::error::{ConfigError, DataQualityError};
use crate::fingerprint::{Fingerprint, ProviderKey};

use super::factory::{create_indicator, IndicatorKind};
use super::indicator::{Components, SignalIndicator};
use super::strategy::StrategyRule;

/// What `calculate` hands back: a discrete signal when a strategy is
/// selected, the raw components otherwise (diagnostic mode).
#[derive(Debug, Clone, PartialEq)]
pub enum SignalOutput {
    Signal(SignalSeries),
    Components(Arc<Components>),
}

impl SignalOutput {
    pub fn into_signal(self) -> Option<SignalSeries> {
        match self {
            SignalOutput::Signal(s) => Some(s),
            SignalOutput::Components(_) => None,
        }
    }
}

pub struct SignalProvider {
    indicator: Box<dyn SignalIndicator>,
    strategy: Option<&'static StrategyRule>,
    key: ProviderKey,
    cached: Option<(Fingerprint, Arc<Components>)>,
    recomputations: usize,
}

impl std::fmt::Debug for SignalProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SignalProvider")
            .field("kind", &self.indicator.kind())
            .field("strategy", &self.strategy_name())
            .field("key", &self.key)
            .field("recomputations", &self.recomputations)
            .finish()
    }
}

impl SignalProvider {
    /// Build a provider; the strategy name, if any, is validated here.
    pub fn new(
        kind: IndicatorKind,
        strategy: Option<&str>,
        params: &BTreeMap<String, f64>,
    ) -> Result<Self, ConfigError> {
        let indicator = create_indicator(kind, params)?;
        let strategy = strategy.map(|s| kind.strategy(s)).transpose()?;
        let key = ProviderKey::new(kind.name(), &indicator.params());
        Ok(Self {
            indicator,
            strategy,
            key,
            cached: None,
            recomputations: 0,
        })
    }

    /// Resolve both names from strings.
    pub fn from_names(
        indicator: &str,
        strategy: Option<&str>,
        params: &BTreeMap<String, f64>,
    ) -> Result<Self, ConfigError> {
        Self::new(indicator.parse()?, strategy, params)
    }

    /// Switch strategy. Components stay cached; only the mapping changes.
    pub fn set_strategy(&mut self, strategy: Option<&str>) -> Result<(), ConfigError> {
        self.strategy = strategy
            .map(|s| self.indicator.kind().strategy(s))
            .transpose()?;
        Ok(())
    }

    pub fn kind(&self) -> IndicatorKind {
        self.indicator.kind()
    }

    pub fn strategy_name(&self) -> Option<&'static str> {
        self.strategy.map(|r| r.name)
    }

    pub fn key(&self) -> &ProviderKey {
        &self.key
    }

    pub fn lookback(&self) -> usize {
        self.indicator.lookback()
    }

    /// How many times components were actually computed.
    pub fn recomputations(&self) -> usize {
        self.recomputations
    }

    /// Components for `bars`, recomputed only if the fingerprint changed.
    pub fn components(&mut self, bars: &[Bar]) -> Result<Arc<Components>, DataQualityError> {
        check_ordering(bars)?;
        let fingerprint = Fingerprint::of_bars(bars);
        if let Some((cached_fp, components)) = &self.cached {
            if *cached_fp == fingerprint {
                debug!(kind = %self.kind(), %fingerprint, "component cache hit");
                return Ok(Arc::clone(components));
            }
        }

        debug!(kind = %self.kind(), %fingerprint, bars = bars.len(), "computing components");
        let components = Arc::new(self.indicator.compute(bars));
        self.recomputations += 1;
        self.cached = Some((fingerprint, Arc::clone(&components)));
        Ok(components)
    }

    /// Signal series (strategy selected) or raw components (no strategy).
    pub fn calculate(&mut self, bars: &[Bar]) -> Result<SignalOutput, DataQualityError> {
        let components = self.components(bars)?;
        Ok(match self.strategy {
            Some(rule) => SignalOutput::Signal(rule.evaluate(&components, bars)),
            None => SignalOutput::Components(components),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Signal;
    use crate::components::MAX_PERIOD;
    use crate::indicators::make_bars;

    fn closes() -> Vec<f64> {
        (0..60).map(|i| 100.0 + (i as f64 * 0.25).sin() * 10.0).collect()
    }

    #[test]
    fn unsupported_strategy_fails_at_selection() {
        let err = SignalProvider::new(IndicatorKind::Macd, Some("KC"), &BTreeMap::new()).unwrap_err();
        assert!(matches!(err, ConfigError::UnsupportedStrategy { .. }));

        let mut p = SignalProvider::new(IndicatorKind::Macd, None, &BTreeMap::new()).unwrap();
        assert!(p.set_strategy(Some("KC")).is_err());
        assert!(p.set_strategy(Some("MACD")).is_ok());
        assert_eq!(p.strategy_name(), Some("MACD"));
    }

    #[test]
    fn identical_input_is_computed_once() {
        let bars = make_bars(&closes());
        let mut p = SignalProvider::from_names("RSI", Some("RSI"), &BTreeMap::new()).unwrap();
        let first = p.calculate(&bars).unwrap();
        let second = p.calculate(&bars.clone()).unwrap();
        assert_eq!(first, second);
        assert_eq!(p.recomputations(), 1);
    }

    #[test]
    fn changed_input_recomputes() {
        let mut bars = make_bars(&closes());
        let mut p = SignalProvider::from_names("RSI", Some("RSI"), &BTreeMap::new()).unwrap();
        p.calculate(&bars).unwrap();
        bars[10].volume += 1.0;
        p.calculate(&bars).unwrap();
        assert_eq!(p.recomputations(), 2);
    }

    #[test]
    fn strategy_switch_reuses_components() {
        let bars = make_bars(&closes());
        let mut p = SignalProvider::from_names("Ichimoku", Some("Kumo"), &BTreeMap::new()).unwrap();
        p.calculate(&bars).unwrap();
        p.set_strategy(Some("TenkanKijun")).unwrap();
        p.calculate(&bars).unwrap();
        assert_eq!(p.recomputations(), 1);
    }

    #[test]
    fn no_strategy_returns_components() {
        let bars = make_bars(&closes());
        let mut p = SignalProvider::from_names("MACD", None, &BTreeMap::new()).unwrap();
        match p.calculate(&bars).unwrap() {
            SignalOutput::Components(c) => {
                assert_eq!(c.len(), bars.len());
                assert!(c.series("macd_hist").is_some());
            }
            SignalOutput::Signal(_) => panic!("expected components"),
        }
    }

    #[test]
    fn output_length_matches_bars_even_when_shorter_than_lookback() {
        let bars = make_bars(&[100.0, 101.0, 102.0]);
        let mut p = SignalProvider::from_names("Ichimoku", Some("Ichimoku"), &BTreeMap::new()).unwrap();
        let signal = p.calculate(&bars).unwrap().into_signal().unwrap();
        assert_eq!(signal.len(), 3);
        assert!(signal.iter().all(|s| s == Signal::Hold));
    }

    #[test]
    fn absurd_period_is_a_config_error() {
        let params = BTreeMap::from([("signal_period".to_string(), 1e20)]);
        let err = SignalProvider::from_names("MACD", Some("MACD"), &params).err();
        assert!(matches!(err, Some(ConfigError::InvalidParameter { .. })));
    }

    #[test]
    fn largest_periods_stay_neutral_on_short_series() {
        let bars = make_bars(&closes());
        let cases = [
            ("MACD", "signal_period"),
            ("Stochastic", "d_period"),
            ("Ichimoku", "displacement"),
        ];
        for (indicator, name) in cases {
            let params = BTreeMap::from([(name.to_string(), MAX_PERIOD as f64)]);
            let mut p = SignalProvider::from_names(indicator, Some(indicator), &params).unwrap();
            let signal = p.calculate(&bars).unwrap().into_signal().unwrap();
            assert_eq!(signal.len(), bars.len());
            assert!(signal.iter().all(|s| s == Signal::Hold), "{indicator}");
        }
    }

    #[test]
    fn unordered_bars_rejected() {
        let mut bars = make_bars(&[1.0, 2.0, 3.0]);
        bars.swap(0, 2);
        let mut p = SignalProvider::from_names("Hold", Some("Hold"), &BTreeMap::new()).unwrap();
        assert!(matches!(p.calculate(&bars), Err(DataQualityError::Unordered { .. })));
        assert_eq!(p.recomputations(), 0);
    }

    #[test]
    fn default_params_share_a_key_with_explicit_defaults() {
        let explicit = BTreeMap::from([("period".to_string(), 20.0)]);
        let a = SignalProvider::from_names("Bollinger", Some("Bollinger"), &BTreeMap::new()).unwrap();
        let b = SignalProvider::from_names("Bollinger", None, &explicit).unwrap();
        assert_eq!(a.key(), b.key());
    }
}
