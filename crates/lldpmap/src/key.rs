//! Correlation key extraction
//!
//! Every walked identifier is `<table subtree>.<index>`. The index of a local
//! table is the local interface; the index of a remote table is a compound
//! whose local-interface component is the only part used for joining.

use std::fmt;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use lldpmap_types::ObjectId;

use crate::mib::{SourceTable, TableKind};

/// Join key shared by all tables describing one local interface.
///
/// Displayed as the dotted index (`"3"`), ordered numerically.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CorrelationKey(Vec<u32>);

impl CorrelationKey {
    pub fn new(components: Vec<u32>) -> Self {
        CorrelationKey(components)
    }

    /// Key for a single local interface index.
    pub fn interface(index: u32) -> Self {
        CorrelationKey(vec![index])
    }
}

impl fmt::Display for CorrelationKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, component) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(".")?;
            }
            write!(f, "{}", component)?;
        }
        Ok(())
    }
}

impl From<u32> for CorrelationKey {
    fn from(index: u32) -> Self {
        CorrelationKey::interface(index)
    }
}

/// Position of the local interface inside a remote-entry index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum RemoteIndexLayout {
    /// `<local port>.<time mark>.<remote index>`: key on the first component.
    #[default]
    LocalPortFirst,
    /// `<time mark>.<local port>.<remote index>` (LLDP-MIB `lldpRemEntry`
    /// INDEX order): key on the second component.
    TimeMarkFirst,
}

impl RemoteIndexLayout {
    const fn position(&self) -> usize {
        match self {
            RemoteIndexLayout::LocalPortFirst => 0,
            RemoteIndexLayout::TimeMarkFirst => 1,
        }
    }
}

/// Reasons an identifier cannot be turned into a key.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum KeyError {
    #[error("identifier has {actual} arcs, expected more than the {expected} of the table prefix")]
    TooShort { expected: usize, actual: usize },

    #[error("identifier is not under subtree {subtree}")]
    NotUnderSubtree { subtree: ObjectId },

    #[error("remote index has {found} components, need at least {needed}")]
    MissingComponent { needed: usize, found: usize },
}

/// Derives correlation keys from walked identifiers.
#[derive(Debug, Clone, Copy, Default)]
pub struct KeyExtractor {
    layout: RemoteIndexLayout,
}

impl KeyExtractor {
    pub fn new(layout: RemoteIndexLayout) -> Self {
        Self { layout }
    }

    pub fn layout(&self) -> RemoteIndexLayout {
        self.layout
    }

    /// Extracts the key of `oid`, which was returned by a walk of `table`.
    ///
    /// Local tables key on the whole index suffix; remote tables key on the
    /// single component selected by the configured [`RemoteIndexLayout`].
    pub fn extract(&self, oid: &ObjectId, table: SourceTable) -> Result<CorrelationKey, KeyError> {
        let index = Self::index_of(oid, table)?;
        match table.kind() {
            TableKind::Local => Ok(CorrelationKey::new(index.to_vec())),
            TableKind::Remote => {
                let position = self.layout.position();
                index
                    .get(position)
                    .map(|component| CorrelationKey::interface(*component))
                    .ok_or(KeyError::MissingComponent {
                        needed: position + 1,
                        found: index.len(),
                    })
            }
        }
    }

    /// Splits off the index suffix of `oid` below the table prefix.
    fn index_of(oid: &ObjectId, table: SourceTable) -> Result<&[u32], KeyError> {
        let expected = table.prefix_len();
        if oid.len() <= expected {
            return Err(KeyError::TooShort {
                expected,
                actual: oid.len(),
            });
        }

        oid.suffix_after(&table.subtree())
            .ok_or_else(|| KeyError::NotUnderSubtree {
                subtree: table.subtree(),
            })
    }
}
