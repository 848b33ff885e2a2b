//! Content fingerprinting — deterministic identification of inputs and providers.
//!
//! - `Fingerprint`: BLAKE3 over every field of every bar. Two bar slices with
//!   the same fingerprint produce the same indicator output.
//! - `ProviderKey`: BLAKE3 over the indicator kind and its canonical parameters.
//!   The strategy is not part of the key; every strategy of one indicator
//!   configuration reads the same components.

use crate::domain::Bar;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Content hash of a bar sequence.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Fingerprint(pub String);

impl Fingerprint {
    /// Hash timestamps and raw f64 bit patterns, so NaN payloads and signed
    /// zeros are distinguished exactly as stored.
    pub fn of_bars(bars: &[Bar]) -> Self {
        let mut hasher = blake3::Hasher::new();
        hasher.update(&(bars.len() as u64).to_le_bytes());
        for bar in bars {
            hasher.update(&bar.timestamp.timestamp().to_le_bytes());
            hasher.update(&bar.timestamp.timestamp_subsec_nanos().to_le_bytes());
            for v in [bar.open, bar.high, bar.low, bar.close, bar.volume] {
                hasher.update(&v.to_bits().to_le_bytes());
            }
        }
        Self(hasher.finalize().to_hex().to_string())
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identity of an indicator configuration.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ProviderKey(pub String);

impl ProviderKey {
    /// `BTreeMap` keeps parameter order canonical; values hash by bit pattern.
    pub fn new(kind: &str, params: &BTreeMap<String, f64>) -> Self {
        let mut hasher = blake3::Hasher::new();
        hasher.update(kind.as_bytes());
        for (name, value) in params {
            hasher.update(&[0]);
            hasher.update(name.as_bytes());
            hasher.update(&[b'=']);
            hasher.update(&value.to_bits().to_le_bytes());
        }
        Self(hasher.finalize().to_hex().to_string())
    }
}

impl fmt::Display for ProviderKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
