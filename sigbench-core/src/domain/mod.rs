//! Domain types for sigbench

pub mod bar;
pub mod signal;
pub mod trade;

pub use bar::{check_ordering, trailing_window_start, validate_series, Bar};
pub use signal::{Action, Signal, SignalSeries};
pub use trade::{Trade, TradeSide};

/// Symbol type alias
pub type Symbol = String;
