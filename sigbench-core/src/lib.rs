//! Sigbench Core — signal providers, portfolio simulator, result summarizer.
//!
//! Data flows one way:
//! - `components`: bars → indicator components → discrete signal (memoized)
//! - `simulator`: signal + bars → portfolio trajectory and trades
//! - `summary`: trajectory → final metrics and a sparse signal timeline

pub mod components;
pub mod domain;
pub mod error;
pub mod fingerprint;
pub mod indicators;
pub mod simulator;
pub mod summary;

pub use error::{AlignmentError, BacktestError, ConfigError, DataQualityError};
pub use simulator::{ExecutionPricePolicy, PortfolioSimulator, PortfolioState, SimulationConfig};
pub use summary::{backtest, BacktestResult};

#[cfg(test)]
mod tests {
    use super::*;

    /// Compile-time check: everything a worker thread touches is Send + Sync.
    #[allow(dead_code)]
    fn assert_send_sync() {
        fn require_send<T: Send>() {}
        fn require_sync<T: Sync>() {}

        require_send::<domain::Bar>();
        require_sync::<domain::Bar>();
        require_send::<domain::SignalSeries>();
        require_sync::<domain::SignalSeries>();
        require_send::<domain::Trade>();
        require_sync::<domain::Trade>();

        require_send::<components::Components>();
        require_sync::<components::Components>();
        require_send::<components::SignalProvider>();
        require_sync::<components::SignalProvider>();
        require_send::<components::StrategyRule>();
        require_sync::<components::StrategyRule>();

        require_send::<fingerprint::Fingerprint>();
        require_sync::<fingerprint::Fingerprint>();
        require_send::<fingerprint::ProviderKey>();
        require_sync::<fingerprint::ProviderKey>();

        require_send::<PortfolioSimulator>();
        require_sync::<PortfolioSimulator>();
        require_send::<BacktestResult>();
        require_sync::<BacktestResult>();
        require_send::<BacktestError>();
        require_sync::<BacktestError>();
    }

    /// A strategy predicate sees components and bars only, never the portfolio.
    #[test]
    fn predicates_cannot_see_portfolio_state() {
        fn _check(
            rule: &components::StrategyRule,
            c: &components::Components,
            bars: &[domain::Bar],
        ) -> bool {
            (rule.buy)(c, bars, 0)
        }
    }
}
