//! Neighbor table: one record per local interface, filled by successive merges

use std::collections::BTreeMap;
use std::fmt;

use serde::ser::Serializer;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::key::CorrelationKey;

/// What one local interface sees on the other end of its link.
///
/// Serialized field names follow the JSON shape operators already consume.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NeighborRecord {
    /// Local port name or description, depending on the local semantic
    #[serde(rename = "LocalPortName")]
    pub local_port_label: String,
    /// Remote port identifier or description; empty until resolved
    #[serde(rename = "RemotePortName")]
    pub remote_port_label: String,
    /// Remote system name; empty until resolved
    #[serde(rename = "RemoteSysName")]
    pub remote_system_name: String,
}

impl NeighborRecord {
    pub fn new(local_port_label: impl Into<String>) -> Self {
        Self {
            local_port_label: local_port_label.into(),
            ..Default::default()
        }
    }

    /// Returns true if neither remote field has been filled in.
    pub fn is_unresolved(&self) -> bool {
        self.remote_port_label.is_empty() && self.remote_system_name.is_empty()
    }

    /// Returns true if both remote fields have been filled in.
    pub fn is_fully_resolved(&self) -> bool {
        !self.remote_port_label.is_empty() && !self.remote_system_name.is_empty()
    }
}

/// Remote-side field targeted by a merge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RemoteField {
    SystemName,
    PortLabel,
}

impl fmt::Display for RemoteField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RemoteField::SystemName => f.write_str("remote system name"),
            RemoteField::PortLabel => f.write_str("remote port"),
        }
    }
}

/// A remote entry that cannot be attached to any local interface.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CorrelationError {
    #[error("orphan remote entry: {field} for key {key} has no local port record")]
    OrphanRemoteEntry {
        key: CorrelationKey,
        field: RemoteField,
    },
}

/// Effect of a single merge on a record field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MergeOutcome {
    /// Field was empty or already held the same value
    Set,
    /// Field held a different non-empty value, which was replaced
    Replaced { previous: String },
    /// Incoming value was empty and the field already had content
    KeptExisting,
}

/// Mapping from correlation key to neighbor record.
///
/// Records are created only by [`NeighborTable::upsert_local`]; remote merges
/// require an existing record. Fields are never cleared: an empty incoming
/// value leaves a filled field untouched, any other value overwrites it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NeighborTable {
    records: BTreeMap<CorrelationKey, NeighborRecord>,
}

impl NeighborTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a record for `key`, or overwrites its local label.
    ///
    /// Returns true if a new record was created.
    pub fn upsert_local(&mut self, key: CorrelationKey, local_port_label: impl Into<String>) -> bool {
        let label = local_port_label.into();
        match self.records.get_mut(&key) {
            Some(record) => {
                if !label.is_empty() {
                    record.local_port_label = label;
                }
                false
            }
            None => {
                self.records.insert(key, NeighborRecord::new(label));
                true
            }
        }
    }

    /// Merges a remote system name into the record for `key`.
    pub fn merge_remote_system_name(
        &mut self,
        key: &CorrelationKey,
        value: impl Into<String>,
    ) -> Result<MergeOutcome, CorrelationError> {
        self.merge_remote(key, RemoteField::SystemName, value.into())
    }

    /// Merges a remote port label into the record for `key`.
    pub fn merge_remote_port(
        &mut self,
        key: &CorrelationKey,
        value: impl Into<String>,
    ) -> Result<MergeOutcome, CorrelationError> {
        self.merge_remote(key, RemoteField::PortLabel, value.into())
    }

    /// Merges `value` into `field` of the record for `key`.
    pub fn merge_remote(
        &mut self,
        key: &CorrelationKey,
        field: RemoteField,
        value: String,
    ) -> Result<MergeOutcome, CorrelationError> {
        let record = self
            .records
            .get_mut(key)
            .ok_or_else(|| CorrelationError::OrphanRemoteEntry {
                key: key.clone(),
                field,
            })?;

        let slot = match field {
            RemoteField::SystemName => &mut record.remote_system_name,
            RemoteField::PortLabel => &mut record.remote_port_label,
        };

        if value.is_empty() && !slot.is_empty() {
            return Ok(MergeOutcome::KeptExisting);
        }
        if slot.is_empty() || *slot == value {
            *slot = value;
            return Ok(MergeOutcome::Set);
        }
        let previous = std::mem::replace(slot, value);
        Ok(MergeOutcome::Replaced { previous })
    }

    pub fn get(&self, key: &CorrelationKey) -> Option<&NeighborRecord> {
        self.records.get(key)
    }

    pub fn contains_key(&self, key: &CorrelationKey) -> bool {
        self.records.contains_key(key)
    }

    /// Iterates records in key order. Call again to restart.
    pub fn entries(&self) -> impl Iterator<Item = (&CorrelationKey, &NeighborRecord)> + Clone {
        self.records.iter()
    }

    pub fn keys(&self) -> impl Iterator<Item = &CorrelationKey> {
        self.records.keys()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Number of records with both remote fields filled.
    pub fn resolved_count(&self) -> usize {
        self.records
            .values()
            .filter(|r| r.is_fully_resolved())
            .count()
    }

    /// Keeps only the records accepted by `keep`; returns how many were removed.
    pub(crate) fn retain<F>(&mut self, mut keep: F) -> usize
    where
        F: FnMut(&CorrelationKey, &NeighborRecord) -> bool,
    {
        let before = self.records.len();
        self.records.retain(|key, record| keep(key, record));
        before - self.records.len()
    }
}

impl Serialize for NeighborTable {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_map(self.records.iter().map(|(key, record)| (key.to_string(), record)))
    }
}
