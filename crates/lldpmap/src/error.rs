//! Error types for lldpmap
//!
//! Every fatal path names the table and, where one exists, the identifier
//! that triggered it, so a device/configuration mismatch can be diagnosed
//! from the message alone.

use lldpmap_types::{ObjectId, ParseError};
use thiserror::Error;

use crate::key::{CorrelationKey, KeyError};
use crate::mib::SourceTable;
use crate::table::CorrelationError;
use crate::walker::WalkError;

/// Errors that can occur while polling a device
#[derive(Debug, Error)]
pub enum LldpError {
    /// Invalid option or configuration file; detected before any I/O
    #[error("Configuration error: {0}")]
    Config(String),

    /// Walk failed at the transport layer
    #[error("Failed to walk {table} ({subtree}): {source}")]
    Transport {
        table: SourceTable,
        subtree: ObjectId,
        #[source]
        source: WalkError,
    },

    /// A required walk returned nothing
    #[error("Walk of {table} ({subtree}) returned no entries")]
    EmptyWalk {
        table: SourceTable,
        subtree: ObjectId,
    },

    /// A walked identifier does not carry a usable index
    #[error("Malformed identifier {oid} in {table}: {source}")]
    MalformedIdentifier {
        table: SourceTable,
        oid: ObjectId,
        #[source]
        source: KeyError,
    },

    /// Remote entry without a local record, under the abort policy
    #[error("Correlation failure in {table} at {oid}: {source}")]
    Correlation {
        table: SourceTable,
        oid: ObjectId,
        #[source]
        source: CorrelationError,
    },

    /// Output could not be produced
    #[error("Render error: {0}")]
    Render(String),

    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl LldpError {
    /// Creates a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Creates a render error.
    pub fn render(message: impl Into<String>) -> Self {
        Self::Render(message.into())
    }

    /// Key of the orphan entry, for correlation failures.
    pub fn orphan_key(&self) -> Option<&CorrelationKey> {
        match self {
            LldpError::Correlation {
                source: CorrelationError::OrphanRemoteEntry { key, .. },
                ..
            } => Some(key),
            _ => None,
        }
    }

    /// Returns true if the error was raised before talking to the device.
    pub fn is_configuration(&self) -> bool {
        matches!(self, LldpError::Config(_) | LldpError::Parse(_))
    }

    /// Process exit status for this error.
    pub fn exit_code(&self) -> u8 {
        if self.is_configuration() {
            2
        } else {
            1
        }
    }
}

/// Result type alias for lldpmap operations
pub type Result<T> = std::result::Result<T, LldpError>;
