//! Port label semantics for the local and remote side of a neighbor record.

use crate::ParseError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// What text labels a local port.
///
/// Each semantic corresponds to a different local table on the device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LocalPortSemantic {
    /// Interface name (IF-MIB `ifName`).
    #[default]
    Name,
    /// Interface description (IF-MIB `ifDescr`).
    #[serde(alias = "desc")]
    Description,
    /// LLDP local port identifier (`lldpLocPortId`).
    Id,
    /// LLDP local port description (`lldpLocPortDesc`).
    #[serde(alias = "port-desc")]
    PortDescription,
}

impl fmt::Display for LocalPortSemantic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            LocalPortSemantic::Name => "name",
            LocalPortSemantic::Description => "description",
            LocalPortSemantic::Id => "id",
            LocalPortSemantic::PortDescription => "port-description",
        };
        write!(f, "{}", s)
    }
}

impl FromStr for LocalPortSemantic {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "name" => Ok(LocalPortSemantic::Name),
            "description" | "desc" => Ok(LocalPortSemantic::Description),
            "id" => Ok(LocalPortSemantic::Id),
            "port-description" | "port-desc" => Ok(LocalPortSemantic::PortDescription),
            _ => Err(ParseError::InvalidLocalPortSemantic(s.to_string())),
        }
    }
}

/// What text labels a remote port.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RemotePortSemantic {
    /// Remote port identifier (`lldpRemPortId`).
    #[default]
    Id,
    /// Remote port description (`lldpRemPortDesc`).
    #[serde(alias = "desc")]
    Description,
}

impl fmt::Display for RemotePortSemantic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            RemotePortSemantic::Id => "id",
            RemotePortSemantic::Description => "description",
        };
        write!(f, "{}", s)
    }
}

impl FromStr for RemotePortSemantic {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "id" => Ok(RemotePortSemantic::Id),
            "description" | "desc" => Ok(RemotePortSemantic::Description),
            _ => Err(ParseError::InvalidRemotePortSemantic(s.to_string())),
        }
    }
}
