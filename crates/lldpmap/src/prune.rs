//! Post-correlation pruning of records without remote data

use std::fmt;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::table::{NeighborRecord, NeighborTable};

/// Rule deciding which records are dropped.
///
/// There is no default: callers that enable pruning must name one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum PrunePolicy {
    /// Drop a record only when both remote fields are empty.
    BothEmpty,
    /// Drop a record when either remote field is empty.
    EitherEmpty,
}

impl PrunePolicy {
    /// Returns true if `record` survives this policy.
    pub fn keeps(&self, record: &NeighborRecord) -> bool {
        match self {
            PrunePolicy::BothEmpty => !record.is_unresolved(),
            PrunePolicy::EitherEmpty => record.is_fully_resolved(),
        }
    }
}

impl fmt::Display for PrunePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PrunePolicy::BothEmpty => f.write_str("both-empty"),
            PrunePolicy::EitherEmpty => f.write_str("either-empty"),
        }
    }
}

/// Removes every record rejected by `policy`; returns the number removed.
///
/// Only removes. Surviving records are not modified.
pub fn prune(table: &mut NeighborTable, policy: PrunePolicy) -> usize {
    table.retain(|key, record| {
        let keep = policy.keeps(record);
        if !keep {
            debug!(%key, local = %record.local_port_label, %policy, "Pruning record");
        }
        keep
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::key::CorrelationKey;
    use pretty_assertions::assert_eq;

    fn sample_table() -> NeighborTable {
        let mut table = NeighborTable::new();
        // 1: fully resolved
        table.upsert_local(CorrelationKey::interface(1), "eth0");
        table
            .merge_remote_system_name(&CorrelationKey::interface(1), "spine1")
            .unwrap();
        table
            .merge_remote_port(&CorrelationKey::interface(1), "Ethernet0")
            .unwrap();
        // 2: local only
        table.upsert_local(CorrelationKey::interface(2), "eth1");
        // 3: system name only
        table.upsert_local(CorrelationKey::interface(3), "eth2");
        table
            .merge_remote_system_name(&CorrelationKey::interface(3), "spine2")
            .unwrap();
        table
    }

    fn keys(table: &NeighborTable) -> Vec<String> {
        table.keys().map(ToString::to_string).collect()
    }

    #[test]
    fn test_both_empty_removes_only_unresolved() {
        let mut table = sample_table();
        let removed = prune(&mut table, PrunePolicy::BothEmpty);
        assert_eq!(removed, 1);
        assert_eq!(keys(&table), vec!["1", "3"]);
    }

    #[test]
    fn test_either_empty_removes_partial() {
        let mut table = sample_table();
        let removed = prune(&mut table, PrunePolicy::EitherEmpty);
        assert_eq!(removed, 2);
        assert_eq!(keys(&table), vec!["1"]);
    }

    #[test]
    fn test_both_empty_keeps_superset() {
        let mut both = sample_table();
        let mut either = sample_table();
        prune(&mut both, PrunePolicy::BothEmpty);
        prune(&mut either, PrunePolicy::EitherEmpty);
        for key in either.keys() {
            assert!(both.contains_key(key));
        }
    }

    #[test]
    fn test_prune_does_not_mutate_survivors() {
        let original = sample_table();
        let mut table = original.clone();
        prune(&mut table, PrunePolicy::BothEmpty);
        for (key, record) in table.entries() {
            assert_eq!(original.get(key), Some(record));
        }
    }

    #[test]
    fn test_prune_empty_table() {
        let mut table = NeighborTable::new();
        assert_eq!(prune(&mut table, PrunePolicy::EitherEmpty), 0);
    }
}
