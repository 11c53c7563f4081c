//! Domain primitive types used across the Berth workspace.

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use serde::{Deserialize, Serialize};

use crate::error::{BerthError, Result};

/// A resource quantity in cluster notation (`500m`, `1Gi`, `2`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Quantity(String);

/// Suffix multipliers, binary ones first so `Mi` wins over `M`.
const SUFFIXES: &[(&str, f64)] = &[
    ("Ki", 1024.0),
    ("Mi", 1_048_576.0),
    ("Gi", 1_073_741_824.0),
    ("Ti", 1_099_511_627_776.0),
    ("Pi", 1_125_899_906_842_624.0),
    ("Ei", 1_152_921_504_606_846_976.0),
    ("n", 1e-9),
    ("u", 1e-6),
    ("m", 1e-3),
    ("k", 1e3),
    ("M", 1e6),
    ("G", 1e9),
    ("T", 1e12),
    ("P", 1e15),
    ("E", 1e18),
];

impl Quantity {
    /// Creates a quantity from its textual form.
    #[must_use]
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Returns the textual form.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns the numeric value in base units, or `None` if unparseable.
    #[must_use]
    pub fn value(&self) -> Option<f64> {
        let s = self.0.trim();
        if s.is_empty() {
            return None;
        }
        for (suffix, multiplier) in SUFFIXES {
            if let Some(n) = s.strip_suffix(suffix) {
                return n.trim().parse::<f64>().ok().map(|n| n * multiplier);
            }
        }
        s.parse::<f64>().ok()
    }

    /// Returns whether the quantity parses to a value strictly above zero.
    ///
    /// Absent, zero, and malformed quantities are all "not positive".
    #[must_use]
    pub fn is_positive(&self) -> bool {
        self.value().is_some_and(|v| v > 0.0)
    }
}

impl fmt::Display for Quantity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for Quantity {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

/// Cooperative cancellation signal for one orchestration pass.
///
/// Cloned handles share the same flag; typically one clone lives in a
/// Ctrl+C handler and another is checked before every apply.
#[derive(Debug, Clone, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    /// Creates a flag in the not-cancelled state.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests cancellation.
    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    /// Returns whether cancellation has been requested.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }

    /// Fails with [`BerthError::Cancelled`] once cancellation was requested.
    ///
    /// # Errors
    ///
    /// Returns `Cancelled` if the flag is set.
    pub fn check(&self) -> Result<()> {
        if self.is_cancelled() {
            return Err(BerthError::Cancelled);
        }
        Ok(())
    }
}
