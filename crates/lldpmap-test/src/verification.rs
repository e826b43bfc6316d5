//! Verification helpers for correlated neighbor tables

use lldpmap::{CorrelationKey, NeighborRecord, NeighborTable};
use thiserror::Error;

/// Verification error types
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum VerificationError {
    #[error("Expected key '{key}' not found in neighbor table")]
    KeyNotFound { key: String },

    #[error("Key '{key}' should have been absent")]
    UnexpectedKey { key: String },

    #[error("Value mismatch for {key}.{field}: expected '{expected}', got '{actual}'")]
    ValueMismatch {
        key: String,
        field: &'static str,
        expected: String,
        actual: String,
    },

    #[error("Expected keys {expected:?}, found {actual:?}")]
    KeySetMismatch {
        expected: Vec<String>,
        actual: Vec<String>,
    },
}

/// Result type for verification operations
pub type VerifyResult<T> = Result<T, VerificationError>;

/// Neighbor table verification helper
pub struct TableVerifier<'a> {
    table: &'a NeighborTable,
}

impl<'a> TableVerifier<'a> {
    pub fn new(table: &'a NeighborTable) -> Self {
        Self { table }
    }

    fn record(&self, index: u32) -> VerifyResult<&'a NeighborRecord> {
        self.table
            .get(&CorrelationKey::interface(index))
            .ok_or(VerificationError::KeyNotFound {
                key: index.to_string(),
            })
    }

    /// Verify all three fields of the record for `index`
    pub fn assert_record(
        &self,
        index: u32,
        local: &str,
        remote_port: &str,
        remote_system: &str,
    ) -> VerifyResult<()> {
        let record = self.record(index)?;
        let checks = [
            ("LocalPortName", local, &record.local_port_label),
            ("RemotePortName", remote_port, &record.remote_port_label),
            ("RemoteSysName", remote_system, &record.remote_system_name),
        ];
        for (field, expected, actual) in checks {
            if expected != actual.as_str() {
                return Err(VerificationError::ValueMismatch {
                    key: index.to_string(),
                    field,
                    expected: expected.to_string(),
                    actual: actual.clone(),
                });
            }
        }
        Ok(())
    }

    /// Verify that no record exists for `index`
    pub fn assert_absent(&self, index: u32) -> VerifyResult<()> {
        if self.table.contains_key(&CorrelationKey::interface(index)) {
            return Err(VerificationError::UnexpectedKey {
                key: index.to_string(),
            });
        }
        Ok(())
    }

    /// Verify the exact key set, in order
    pub fn assert_keys(&self, expected: &[u32]) -> VerifyResult<()> {
        let expected: Vec<String> = expected.iter().map(ToString::to_string).collect();
        let actual: Vec<String> = self.table.keys().map(ToString::to_string).collect();
        if expected != actual {
            return Err(VerificationError::KeySetMismatch { expected, actual });
        }
        Ok(())
    }
}
