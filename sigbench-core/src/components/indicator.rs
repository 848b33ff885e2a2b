//! Signal indicator trait and the named component series it produces.
//!
//! An indicator turns a bar history into one or more numeric series of the
//! same length ("components"). Strategies read components bar by bar and map
//! them to a discrete signal. Components are computed once per distinct input
//! and shared between every strategy of the same indicator configuration.

use crate::domain::Bar;
use serde::Serialize;
use std::collections::BTreeMap;

use super::factory::IndicatorKind;

/// Trait for signal indicators.
///
/// # Look-ahead contamination guard
/// No component value at bar t may depend on price data from bar t+1 or later.
/// Truncating the input must never change the values of the retained prefix.
pub trait SignalIndicator: Send + Sync {
    fn kind(&self) -> IndicatorKind;

    /// Number of bars needed before every component is defined.
    fn lookback(&self) -> usize;

    /// Canonical parameters, defaults filled in. Feeds the provider key.
    fn params(&self) -> BTreeMap<String, f64>;

    /// Compute every component for the entire bar series.
    ///
    /// Every returned series has `bars.len()` entries; warmup entries are NaN.
    fn compute(&self, bars: &[Bar]) -> Components;
}

/// Named component series, all of one length.
///
/// `BTreeMap` keeps diagnostic output in a stable order.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Components {
    len: usize,
    series: BTreeMap<String, Vec<f64>>,
}

impl Components {
    pub fn new(len: usize) -> Self {
        Self {
            len,
            series: BTreeMap::new(),
        }
    }

    /// Insert a named series. Series of the wrong length are padded or cut to
    /// `len` with NaN so that per-bar lookups stay in bounds.
    pub fn insert(&mut self, name: impl Into<String>, mut values: Vec<f64>) {
        debug_assert_eq!(values.len(), self.len, "component length mismatch");
        values.resize(self.len, f64::NAN);
        self.series.insert(name.into(), values);
    }

    /// Builder-style `insert`.
    pub fn with(mut self, name: impl Into<String>, values: Vec<f64>) -> Self {
        self.insert(name, values);
        self
    }

    /// Value of `name` at `bar_index`; NaN when the series or index is absent,
    /// so every comparison against it is false.
    pub fn get(&self, name: &str, bar_index: usize) -> f64 {
        self.series
            .get(name)
            .and_then(|v| v.get(bar_index).copied())
            .unwrap_or(f64::NAN)
    }

    /// Value of `name` at `bar_index - lag`; NaN before the start.
    pub fn get_lagged(&self, name: &str, bar_index: usize, lag: usize) -> f64 {
        bar_index
            .checked_sub(lag)
            .map_or(f64::NAN, |i| self.get(name, i))
    }

    pub fn series(&self, name: &str) -> Option<&[f64]> {
        self.series.get(name).map(|v| v.as_slice())
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.series.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[f64])> {
        self.series.iter().map(|(k, v)| (k.as_str(), v.as_slice()))
    }

    /// Number of bars each series covers.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Number of named series.
    pub fn series_count(&self) -> usize {
        self.series.len()
    }
}
