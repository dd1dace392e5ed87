//! Denial-of-service limits handed to the FlatBuffers verifier.

use flatbuffers::VerifierOptions;
use serde::{Deserialize, Serialize};

use crate::VerifyError;

/// Maximum nesting depth used when none is configured.
pub const DEFAULT_MAX_DEPTH: usize = 128;

/// Tables allowed per buffer byte when none is configured.
pub const DEFAULT_TABLES_PER_BYTE: usize = 8;

/// Upper bound on the number of tables the verifier may visit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TableCountLimit {
    /// The same bound for every buffer.
    Fixed(usize),
    /// `factor * buffer length`, derived on each call.
    PerByte(usize),
}

impl TableCountLimit {
    pub fn resolve(self, buffer_len: usize) -> usize {
        match self {
            TableCountLimit::Fixed(n) => n,
            TableCountLimit::PerByte(factor) => factor.saturating_mul(buffer_len),
        }
    }
}

impl Default for TableCountLimit {
    fn default() -> Self {
        TableCountLimit::PerByte(DEFAULT_TABLES_PER_BYTE)
    }
}

/// Bounds on the cost of a single verification pass.
///
/// Both values guard against malformed buffers that claim unbounded
/// recursive structure. The defaults match the Arrow C++ readers: a nesting
/// depth of 128 and eight tables per byte of input.
///
/// ```
/// use arrow_ipc_verify::{TableCountLimit, VerificationLimits};
///
/// let limits = VerificationLimits::from_json(r#"{"max_table_count": {"fixed": 64}}"#).unwrap();
/// assert_eq!(limits.max_depth, 128);
/// assert_eq!(limits.max_table_count, TableCountLimit::Fixed(64));
/// assert_eq!(limits.verifier_options(1024).max_tables, 64);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct VerificationLimits {
    pub max_depth: usize,
    pub max_table_count: TableCountLimit,
}

impl Default for VerificationLimits {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
            max_table_count: TableCountLimit::default(),
        }
    }
}

impl VerificationLimits {
    pub fn new(max_depth: usize, max_table_count: TableCountLimit) -> Result<Self, VerifyError> {
        let limits = Self {
            max_depth,
            max_table_count,
        };
        limits.validate()?;
        Ok(limits)
    }

    /// Parses limits from a JSON object. Missing keys keep their defaults.
    pub fn from_json(json: &str) -> Result<Self, VerifyError> {
        let limits: Self = serde_json::from_str(json)
            .map_err(|e| VerifyError::InvalidLimits(e.to_string()))?;
        limits.validate()?;
        Ok(limits)
    }

    pub fn validate(&self) -> Result<(), VerifyError> {
        if self.max_depth == 0 {
            return Err(VerifyError::InvalidLimits(
                "max_depth must be at least 1".to_owned(),
            ));
        }
        Ok(())
    }

    /// Options for verifying a buffer of `buffer_len` bytes.
    pub fn verifier_options(&self, buffer_len: usize) -> VerifierOptions {
        VerifierOptions {
            max_depth: self.max_depth,
            max_tables: self.max_table_count.resolve(buffer_len),
            ..Default::default()
        }
    }
}
