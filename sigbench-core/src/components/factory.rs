//! Registry — resolves indicator and strategy names to implementations.
//!
//! The set of indicator kinds is closed (`IndicatorKind`), and each kind owns a
//! closed table of strategy rules. Names are resolved once, when a provider is
//! configured; an unknown name is a `ConfigError` before any bar is touched.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

use super::indicator::SignalIndicator;
use super::signal::{
    awesome, bollinger, hold, ichimoku, keltner, macd, moving_average, parabolic_sar, rsi,
    stochastic, volume,
};
use super::strategy::StrategyRule;

/// Largest accepted value for any period parameter.
pub const MAX_PERIOD: usize = 1_000_000;

/// Every indicator the registry knows about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum IndicatorKind {
    Rsi,
    Macd,
    Bollinger,
    Keltner,
    MovingAverage,
    Psar,
    Ichimoku,
    Volume,
    AwesomeOscillator,
    Stochastic,
    Hold,
}

impl IndicatorKind {
    pub const ALL: [IndicatorKind; 11] = [
        IndicatorKind::Rsi,
        IndicatorKind::Macd,
        IndicatorKind::Bollinger,
        IndicatorKind::Keltner,
        IndicatorKind::MovingAverage,
        IndicatorKind::Psar,
        IndicatorKind::Ichimoku,
        IndicatorKind::Volume,
        IndicatorKind::AwesomeOscillator,
        IndicatorKind::Stochastic,
        IndicatorKind::Hold,
    ];

    /// Registry name (case-sensitive).
    pub fn name(self) -> &'static str {
        match self {
            IndicatorKind::Rsi => "RSI",
            IndicatorKind::Macd => "MACD",
            IndicatorKind::Bollinger => "Bollinger",
            IndicatorKind::Keltner => "Keltner",
            IndicatorKind::MovingAverage => "MovingAverage",
            IndicatorKind::Psar => "PSAR",
            IndicatorKind::Ichimoku => "Ichimoku",
            IndicatorKind::Volume => "Volume",
            IndicatorKind::AwesomeOscillator => "AwesomeOscillator",
            IndicatorKind::Stochastic => "Stochastic",
            IndicatorKind::Hold => "Hold",
        }
    }

    /// The closed strategy table for this kind.
    pub fn strategies(self) -> &'static [StrategyRule] {
        match self {
            IndicatorKind::Rsi => rsi::STRATEGIES,
            IndicatorKind::Macd => macd::STRATEGIES,
            IndicatorKind::Bollinger => bollinger::STRATEGIES,
            IndicatorKind::Keltner => keltner::STRATEGIES,
            IndicatorKind::MovingAverage => moving_average::STRATEGIES,
            IndicatorKind::Psar => parabolic_sar::STRATEGIES,
            IndicatorKind::Ichimoku => ichimoku::STRATEGIES,
            IndicatorKind::Volume => volume::STRATEGIES,
            IndicatorKind::AwesomeOscillator => awesome::STRATEGIES,
            IndicatorKind::Stochastic => stochastic::STRATEGIES,
            IndicatorKind::Hold => hold::STRATEGIES,
        }
    }

    pub fn strategy_names(self) -> Vec<&'static str> {
        self.strategies().iter().map(|r| r.name).collect()
    }

    /// Look up a strategy by name; unsupported names fail with the allowed set.
    pub fn strategy(self, name: &str) -> Result<&'static StrategyRule, ConfigError> {
        self.strategies()
            .iter()
            .find(|r| r.name == name)
            .ok_or_else(|| ConfigError::UnsupportedStrategy {
                indicator: self.name().to_string(),
                strategy: name.to_string(),
                supported: self.strategy_names(),
            })
    }
}

impl fmt::Display for IndicatorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for IndicatorKind {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        IndicatorKind::ALL
            .into_iter()
            .find(|k| k.name() == s)
            .ok_or_else(|| ConfigError::UnknownIndicator(s.to_string()))
    }
}

impl TryFrom<String> for IndicatorKind {
    type Error = ConfigError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<IndicatorKind> for String {
    fn from(k: IndicatorKind) -> Self {
        k.name().to_string()
    }
}

/// Create an indicator from its kind and parameter overrides.
pub fn create_indicator(
    kind: IndicatorKind,
    params: &BTreeMap<String, f64>,
) -> Result<Box<dyn SignalIndicator>, ConfigError> {
    let mut p = ParamReader::new(params);
    let indicator: Box<dyn SignalIndicator> = match kind {
        IndicatorKind::Rsi => Box::new(rsi::Rsi::from_params(&mut p)?),
        IndicatorKind::Macd => Box::new(macd::Macd::from_params(&mut p)?),
        IndicatorKind::Bollinger => Box::new(bollinger::Bollinger::from_params(&mut p)?),
        IndicatorKind::Keltner => Box::new(keltner::Keltner::from_params(&mut p)?),
        IndicatorKind::MovingAverage => {
            Box::new(moving_average::MovingAverage::from_params(&mut p)?)
        }
        IndicatorKind::Psar => Box::new(parabolic_sar::Psar::from_params(&mut p)?),
        IndicatorKind::Ichimoku => Box::new(ichimoku::Ichimoku::from_params(&mut p)?),
        IndicatorKind::Volume => Box::new(volume::Volume::from_params(&mut p)?),
        IndicatorKind::AwesomeOscillator => {
            Box::new(awesome::AwesomeOscillator::from_params(&mut p)?)
        }
        IndicatorKind::Stochastic => Box::new(stochastic::Stochastic::from_params(&mut p)?),
        IndicatorKind::Hold => Box::new(hold::Hold),
    };
    p.finish()?;
    Ok(indicator)
}

/// Resolve a kind name and a strategy name in one step.
pub fn resolve(
    indicator: &str,
    strategy: &str,
) -> Result<(IndicatorKind, &'static StrategyRule), ConfigError> {
    let kind: IndicatorKind = indicator.parse()?;
    Ok((kind, kind.strategy(strategy)?))
}

/// Reads and validates numeric parameters, tracking which keys were consumed
/// so leftovers can be rejected.
pub struct ParamReader<'a> {
    params: &'a BTreeMap<String, f64>,
    used: Vec<&'static str>,
}

impl<'a> ParamReader<'a> {
    pub fn new(params: &'a BTreeMap<String, f64>) -> Self {
        Self {
            params,
            used: Vec::new(),
        }
    }

    /// Finite f64 parameter.
    pub fn param(&mut self, name: &'static str, default: f64) -> Result<f64, ConfigError> {
        self.used.push(name);
        let value = self.params.get(name).copied().unwrap_or(default);
        if value.is_finite() {
            Ok(value)
        } else {
            Err(ConfigError::invalid(name, value, "must be finite"))
        }
    }

    /// Strictly positive f64 parameter.
    pub fn positive(&mut self, name: &'static str, default: f64) -> Result<f64, ConfigError> {
        let value = self.param(name, default)?;
        if value > 0.0 {
            Ok(value)
        } else {
            Err(ConfigError::invalid(name, value, "must be > 0"))
        }
    }

    /// Whole number of bars in `1..=MAX_PERIOD`.
    pub fn period(&mut self, name: &'static str, default: usize) -> Result<usize, ConfigError> {
        let value = self.param(name, default as f64)?;
        if value < 1.0 || value.fract() != 0.0 {
            return Err(ConfigError::invalid(name, value, "must be a whole number >= 1"));
        }
        if value > MAX_PERIOD as f64 {
            return Err(ConfigError::invalid(name, value, "exceeds the maximum period"));
        }
        Ok(value as usize)
    }

    /// Reject any key no constructor asked for.
    pub fn finish(self) -> Result<(), ConfigError> {
        match self
            .params
            .iter()
            .find(|(k, _)| !self.used.contains(&k.as_str()))
        {
            Some((k, v)) => Err(ConfigError::invalid(k, *v, "unknown parameter")),
            None => Ok(()),
        }
    }
}
