//! Bar loading from CSV.
//!
//! One file per ticker, `<dir>/<TICKER>.csv`, with a header row:
//!
//! ```text
//! timestamp,open,high,low,close,volume
//! 2024-01-02T00:00:00Z,100.0,101.5,99.2,101.0,120000
//! ```
//!
//! Every loaded series is validated (non-empty, strictly ascending, finite
//! positive prices) before it reaches a task.

use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{debug, info};

use sigbench_core::domain::{validate_series, Bar};
use sigbench_core::{ConfigError, DataQualityError};

use crate::market::{MarketData, TickerBars};

/// Errors from the loading layer.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("cannot read {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("malformed CSV in {path}: {source}")]
    Csv { path: PathBuf, source: csv::Error },

    #[error("{path} failed validation: {source}")]
    Invalid {
        path: PathBuf,
        source: DataQualityError,
    },

    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Parse bars from any CSV reader. `origin` only labels errors.
pub fn read_bars<R: Read>(reader: R, origin: &Path) -> Result<Vec<Bar>, LoadError> {
    let mut rdr = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader);
    let bars = rdr
        .deserialize::<Bar>()
        .collect::<Result<Vec<_>, _>>()
        .map_err(|source| LoadError::Csv {
            path: origin.to_path_buf(),
            source,
        })?;

    validate_series(&bars).map_err(|source| LoadError::Invalid {
        path: origin.to_path_buf(),
        source,
    })?;
    Ok(bars)
}

pub fn load_csv(path: &Path) -> Result<Vec<Bar>, LoadError> {
    let file = File::open(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let bars = read_bars(file, path)?;
    debug!(path = %path.display(), bars = bars.len(), "loaded bars");
    Ok(bars)
}

/// Load `<dir>/<TICKER>.csv` for every ticker. Any failure aborts the load.
pub fn load_directory(dir: &Path, tickers: &[String]) -> Result<MarketData, LoadError> {
    let mut data = MarketData::new();
    for ticker in tickers {
        let path = dir.join(format!("{ticker}.csv"));
        let bars = load_csv(&path)?;
        data.insert(ticker.clone(), TickerBars::new(bars));
    }
    info!(tickers = data.len(), dir = %dir.display(), "market data loaded");
    Ok(data)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const GOOD: &str = "\
timestamp,open,high,low,close,volume
2024-01-02T00:00:00Z,100.0,101.0,99.0,100.5,1000
2024-01-03T00:00:00Z,100.5,102.0,100.0,101.5,1200
2024-01-04T00:00:00Z,101.5,103.0,101.0,102.0,900
";

    #[test]
    fn reads_rfc3339_rows() {
        let bars = read_bars(GOOD.as_bytes(), Path::new("mem")).unwrap();
        assert_eq!(bars.len(), 3);
        assert_eq!(bars[1].close, 101.5);
        assert_eq!(bars[2].volume, 900.0);
        assert_eq!(bars[0].timestamp.to_rfc3339(), "2024-01-02T00:00:00+00:00");
    }

    #[test]
    fn unordered_rows_fail_validation() {
        let csv = "\
timestamp,open,high,low,close,volume
2024-01-03T00:00:00Z,100.0,101.0,99.0,100.5,1000
2024-01-02T00:00:00Z,100.5,102.0,100.0,101.5,1200
";
        let err = read_bars(csv.as_bytes(), Path::new("mem")).unwrap_err();
        assert!(matches!(
            err,
            LoadError::Invalid {
                source: DataQualityError::Unordered { index: 1 },
                ..
            }
        ));
    }

    #[test]
    fn high_below_low_fails_validation() {
        let csv = "\
timestamp,open,high,low,close,volume
2024-01-02T00:00:00Z,100.0,101.0,99.0,100.5,1000
2024-01-03T00:00:00Z,100.5,99.0,102.0,101.5,1200
";
        let err = read_bars(csv.as_bytes(), Path::new("mem")).unwrap_err();
        assert!(matches!(
            err,
            LoadError::Invalid {
                source: DataQualityError::InconsistentBar { index: 1 },
                ..
            }
        ));
    }

    #[test]
    fn header_only_is_empty_series() {
        let err = read_bars("timestamp,open,high,low,close,volume\n".as_bytes(), Path::new("mem"))
            .unwrap_err();
        assert!(matches!(
            err,
            LoadError::Invalid {
                source: DataQualityError::Empty,
                ..
            }
        ));
    }

    #[test]
    fn garbage_is_csv_error() {
        let csv = "timestamp,open,high,low,close,volume\nyesterday,a,b,c,d,e\n";
        assert!(matches!(
            read_bars(csv.as_bytes(), Path::new("mem")),
            Err(LoadError::Csv { .. })
        ));
    }

    #[test]
    fn loads_directory_by_ticker() {
        let dir = tempfile::tempdir().unwrap();
        let mut f = File::create(dir.path().join("ACME.csv")).unwrap();
        f.write_all(GOOD.as_bytes()).unwrap();

        let data = load_directory(dir.path(), &["ACME".to_string()]).unwrap();
        assert_eq!(data.get("ACME").unwrap().bars().len(), 3);

        let missing = load_directory(dir.path(), &["NOPE".to_string()]).unwrap_err();
        assert!(matches!(missing, LoadError::Io { .. }));
    }
}
