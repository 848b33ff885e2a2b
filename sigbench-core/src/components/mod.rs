//! Signal computation — indicators, strategy tables, registry and provider.
//!
//! - Indicator: bars in, named component series out (`SignalIndicator`)
//! - Strategy: predicate table mapping components to BUY/SELL/HOLD
//! - Registry: closed name → implementation lookup (`factory`)
//! - Provider: memoized indicator + strategy (`SignalProvider`)

pub mod factory;
pub mod indicator;
pub mod provider;
pub mod signal;
pub mod strategy;

pub use factory::{create_indicator, resolve, IndicatorKind, ParamReader, MAX_PERIOD};
pub use indicator::{Components, SignalIndicator};
pub use provider::{SignalOutput, SignalProvider};
pub use strategy::{Predicate, StrategyRule};
