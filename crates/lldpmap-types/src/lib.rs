//! Common types for LLDP neighbor discovery over SNMP.
//!
//! This crate provides type-safe representations of the primitives shared
//! across the lldpmap workspace:
//!
//! - [`ObjectId`]: dotted SNMP object identifiers with prefix arithmetic
//! - [`LocalPortSemantic`]: which local table labels a local port
//! - [`RemotePortSemantic`]: which remote table labels a remote port

mod oid;
mod port;

pub use oid::ObjectId;
pub use port::{LocalPortSemantic, RemotePortSemantic};

/// Common error type for parsing failures.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    #[error("invalid object identifier: {0}")]
    InvalidObjectId(String),

    #[error("invalid local port semantic: {0} (expected name, description, id or port-description)")]
    InvalidLocalPortSemantic(String),

    #[error("invalid remote port semantic: {0} (expected id or description)")]
    InvalidRemotePortSemantic(String),
}
