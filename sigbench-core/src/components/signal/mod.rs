//! Concrete signal indicators.
//!
//! Each module defines one `SignalIndicator` and its closed `STRATEGIES` table.
//! Indicators are portfolio-agnostic: they see bars, never simulator state.

pub mod awesome;
pub mod bollinger;
pub mod hold;
pub mod ichimoku;
pub mod keltner;
pub mod macd;
pub mod moving_average;
pub mod parabolic_sar;
pub mod rsi;
pub mod stochastic;
pub mod volume;

pub use awesome::AwesomeOscillator;
pub use bollinger::Bollinger;
pub use hold::Hold;
pub use ichimoku::Ichimoku;
pub use keltner::Keltner;
pub use macd::Macd;
pub use moving_average::{MaType, MovingAverage};
pub use parabolic_sar::Psar;
pub use rsi::Rsi;
pub use stochastic::Stochastic;
pub use volume::Volume;

#[cfg(test)]
pub(crate) mod test_support {
    use crate::components::indicator::SignalIndicator;
    use crate::components::strategy::StrategyRule;
    use crate::domain::{Bar, Signal};

    /// Run one strategy of an indicator over `bars`.
    pub fn run(indicator: &dyn SignalIndicator, rule: &StrategyRule, bars: &[Bar]) -> Vec<Signal> {
        let components = indicator.compute(bars);
        rule.evaluate(&components, bars).as_slice().to_vec()
    }

    /// Prefix-stability check: computing on a truncated history must not
    /// change any retained value.
    pub fn assert_no_lookahead(indicator: &dyn SignalIndicator, bars: &[Bar], cut: usize) {
        let full = indicator.compute(bars);
        let part = indicator.compute(&bars[..cut]);
        for (name, series) in part.iter() {
            let whole = full.series(name).unwrap();
            for (i, (a, b)) in series.iter().zip(whole).enumerate() {
                assert!(
                    (a.is_nan() && b.is_nan()) || a == b,
                    "{name}[{i}] changed when later bars were added: {a} vs {b}"
                );
            }
        }
    }
}
