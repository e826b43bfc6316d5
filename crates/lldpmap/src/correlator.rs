//! Correlator - joins the local-port, remote-system-name and remote-port
//! walks into one neighbor table
//!
//! Passes run in a fixed order: the local walk creates records, the two
//! remote walks only fill them in. Each walk is fully merged before the next
//! one is requested.

use std::fmt;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, warn};

use lldpmap_types::{LocalPortSemantic, ObjectId, RemotePortSemantic};

use crate::error::{LldpError, Result};
use crate::key::{CorrelationKey, KeyExtractor, RemoteIndexLayout};
use crate::mib::SourceTable;
use crate::table::{CorrelationError, MergeOutcome, NeighborTable, RemoteField};
use crate::walker::{SubtreeWalker, WalkEntry};

/// What to do with a remote entry whose key has no local record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum OrphanPolicy {
    /// Log and report the entry, continue with the rest.
    #[default]
    Skip,
    /// Stop the run with a correlation error.
    Abort,
}

impl fmt::Display for OrphanPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OrphanPolicy::Skip => f.write_str("skip"),
            OrphanPolicy::Abort => f.write_str("abort"),
        }
    }
}

/// Which tables to walk and how to treat their indexes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CorrelationPlan {
    pub local_table: SourceTable,
    pub remote_port_table: SourceTable,
    pub layout: RemoteIndexLayout,
    pub orphan_policy: OrphanPolicy,
}

impl CorrelationPlan {
    pub fn new(local: LocalPortSemantic, remote: RemotePortSemantic) -> Self {
        Self {
            local_table: SourceTable::for_local_port(local),
            remote_port_table: SourceTable::for_remote_port(remote),
            layout: RemoteIndexLayout::default(),
            orphan_policy: OrphanPolicy::default(),
        }
    }

    pub fn with_layout(mut self, layout: RemoteIndexLayout) -> Self {
        self.layout = layout;
        self
    }

    pub fn with_orphan_policy(mut self, policy: OrphanPolicy) -> Self {
        self.orphan_policy = policy;
        self
    }

    /// Tables in walk order.
    pub fn walk_order(&self) -> [SourceTable; 3] {
        [
            self.local_table,
            SourceTable::LldpRemSysName,
            self.remote_port_table,
        ]
    }
}

impl Default for CorrelationPlan {
    fn default() -> Self {
        Self::new(LocalPortSemantic::default(), RemotePortSemantic::default())
    }
}

/// A remote entry skipped because no local record exists for its key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrphanEntry {
    pub table: SourceTable,
    pub oid: ObjectId,
    pub key: CorrelationKey,
    pub value: String,
}

/// A remote field overwritten by a later entry for the same key, which
/// happens when one local port sees several neighbors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReplacedValue {
    pub table: SourceTable,
    pub key: CorrelationKey,
    pub previous: String,
    pub current: String,
}

/// Per-run bookkeeping returned alongside the table.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CorrelationReport {
    /// Entries returned by each walk, in walk order
    pub walked: Vec<(SourceTable, usize)>,
    pub orphans: Vec<OrphanEntry>,
    pub replaced: Vec<ReplacedValue>,
}

impl CorrelationReport {
    pub fn has_orphans(&self) -> bool {
        !self.orphans.is_empty()
    }

    /// Distinct keys that had at least one orphan entry.
    pub fn orphan_keys(&self) -> Vec<&CorrelationKey> {
        let mut keys: Vec<&CorrelationKey> = self.orphans.iter().map(|o| &o.key).collect();
        keys.sort();
        keys.dedup();
        keys
    }
}

/// Result of a correlation run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Correlation {
    pub table: NeighborTable,
    pub report: CorrelationReport,
}

/// Drives the walks and merges their results.
pub struct Correlator<W> {
    walker: W,
    plan: CorrelationPlan,
    extractor: KeyExtractor,
}

impl<W: SubtreeWalker> Correlator<W> {
    pub fn new(walker: W, plan: CorrelationPlan) -> Self {
        Self {
            walker,
            extractor: KeyExtractor::new(plan.layout),
            plan,
        }
    }

    pub fn walker(&self) -> &W {
        &self.walker
    }

    /// Runs all passes and returns the populated table.
    ///
    /// Fails on the first transport error, empty walk or malformed
    /// identifier. Orphan remote entries fail the run only under
    /// [`OrphanPolicy::Abort`].
    #[instrument(skip(self), fields(local = %self.plan.local_table, remote_port = %self.plan.remote_port_table))]
    pub async fn run(&mut self) -> Result<Correlation> {
        let mut table = NeighborTable::new();
        let mut report = CorrelationReport::default();

        self.merge_local(&mut table, &mut report).await?;
        self.merge_remote(
            SourceTable::LldpRemSysName,
            RemoteField::SystemName,
            &mut table,
            &mut report,
        )
        .await?;
        self.merge_remote(
            self.plan.remote_port_table,
            RemoteField::PortLabel,
            &mut table,
            &mut report,
        )
        .await?;

        info!(
            interfaces = table.len(),
            resolved = table.resolved_count(),
            orphans = report.orphans.len(),
            "Correlation complete"
        );
        Ok(Correlation { table, report })
    }

    async fn merge_local(
        &mut self,
        table: &mut NeighborTable,
        report: &mut CorrelationReport,
    ) -> Result<()> {
        let source = self.plan.local_table;
        let keyed = self.fetch(source, report).await?;

        for (key, entry) in keyed {
            if table.upsert_local(key.clone(), entry.value) {
                debug!(%key, table = %source, "Created record");
            }
        }
        Ok(())
    }

    async fn merge_remote(
        &mut self,
        source: SourceTable,
        field: RemoteField,
        table: &mut NeighborTable,
        report: &mut CorrelationReport,
    ) -> Result<()> {
        let keyed = self.fetch(source, report).await?;

        for (key, entry) in keyed {
            let current = entry.value.clone();
            match table.merge_remote(&key, field, entry.value) {
                Ok(MergeOutcome::Replaced { previous }) => {
                    debug!(%key, table = %source, %previous, %current, "Replaced remote value");
                    report.replaced.push(ReplacedValue {
                        table: source,
                        key,
                        previous,
                        current,
                    });
                }
                Ok(_) => {}
                Err(err @ CorrelationError::OrphanRemoteEntry { .. }) => {
                    match self.plan.orphan_policy {
                        OrphanPolicy::Abort => {
                            return Err(LldpError::Correlation {
                                table: source,
                                oid: entry.oid,
                                source: err,
                            });
                        }
                        OrphanPolicy::Skip => {
                            warn!(%key, table = %source, oid = %entry.oid, "Skipping orphan remote entry");
                            report.orphans.push(OrphanEntry {
                                table: source,
                                oid: entry.oid,
                                key,
                                value: current,
                            });
                        }
                    }
                }
            }
        }
        Ok(())
    }

    /// Walks `source`, orders the result and extracts every key.
    ///
    /// Entries are sorted by identifier (then value) so the merge outcome
    /// does not depend on response order.
    async fn fetch(
        &mut self,
        source: SourceTable,
        report: &mut CorrelationReport,
    ) -> Result<Vec<(CorrelationKey, WalkEntry)>> {
        let subtree = source.subtree();
        let mut entries = self
            .walker
            .walk(&subtree)
            .await
            .map_err(|err| LldpError::Transport {
                table: source,
                subtree: subtree.clone(),
                source: err,
            })?;

        if entries.is_empty() {
            return Err(LldpError::EmptyWalk {
                table: source,
                subtree,
            });
        }
        info!(table = %source, entries = entries.len(), "Walk complete");
        report.walked.push((source, entries.len()));

        entries.sort_by(|a, b| a.oid.cmp(&b.oid).then_with(|| a.value.cmp(&b.value)));

        let extractor = self.extractor;
        entries
            .into_iter()
            .map(|entry| {
                let key = extractor
                    .extract(&entry.oid, source)
                    .map_err(|err| LldpError::MalformedIdentifier {
                        table: source,
                        oid: entry.oid.clone(),
                        source: err,
                    })?;
                Ok((key, entry))
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::key::KeyError;
    use crate::table::NeighborRecord;
    use crate::walker::{MemoryWalker, MockSubtreeWalker, WalkError};
    use mockall::Sequence;
    use pretty_assertions::assert_eq;

    fn entry(table: SourceTable, index: &[u32], value: &str) -> WalkEntry {
        WalkEntry::new(table.subtree().child(index), value)
    }

    fn record(local: &str, port: &str, sys: &str) -> NeighborRecord {
        NeighborRecord {
            local_port_label: local.to_string(),
            remote_port_label: port.to_string(),
            remote_system_name: sys.to_string(),
        }
    }

    fn basic_walker() -> MemoryWalker {
        MemoryWalker::with_entries(vec![
            entry(SourceTable::IfName, &[3], "Gi0/3"),
            entry(SourceTable::IfName, &[4], "Gi0/4"),
            entry(SourceTable::LldpRemSysName, &[3, 4, 1], "core-switch"),
            entry(SourceTable::LldpRemPortId, &[3, 4, 1], "Gi1/1"),
        ])
    }

    #[tokio::test]
    async fn test_single_neighbor() {
        let mut correlator = Correlator::new(basic_walker(), CorrelationPlan::default());
        let result = correlator.run().await.unwrap();

        assert_eq!(
            result.table.get(&CorrelationKey::interface(3)),
            Some(&record("Gi0/3", "Gi1/1", "core-switch"))
        );
        assert_eq!(
            result.table.get(&CorrelationKey::interface(4)),
            Some(&record("Gi0/4", "", ""))
        );
        assert!(!result.report.has_orphans());
    }

    #[tokio::test]
    async fn test_walk_order() {
        let plan = CorrelationPlan::new(LocalPortSemantic::Description, RemotePortSemantic::Description);
        let walker = MemoryWalker::with_entries(vec![
            entry(SourceTable::IfDescr, &[1], "eth0"),
            entry(SourceTable::LldpRemSysName, &[1, 0, 1], "leaf"),
            entry(SourceTable::LldpRemPortDesc, &[1, 0, 1], "uplink"),
        ]);
        let mut correlator = Correlator::new(walker, plan);
        correlator.run().await.unwrap();

        let expected: Vec<ObjectId> = plan.walk_order().iter().map(|t| t.subtree()).collect();
        assert_eq!(correlator.walker().walked(), expected.as_slice());
    }

    #[tokio::test]
    async fn test_orphan_is_skipped_and_reported() {
        let mut walker = basic_walker();
        walker.insert(SourceTable::LldpRemSysName.subtree().child(&[7, 1, 1]), "rogue");

        let mut correlator = Correlator::new(walker, CorrelationPlan::default());
        let result = correlator.run().await.unwrap();

        assert_eq!(result.report.orphan_keys(), vec![&CorrelationKey::interface(7)]);
        assert_eq!(result.report.orphans[0].value, "rogue");
        assert!(!result.table.contains_key(&CorrelationKey::interface(7)));
        assert_eq!(
            result.table.get(&CorrelationKey::interface(3)),
            Some(&record("Gi0/3", "Gi1/1", "core-switch"))
        );
    }

    #[tokio::test]
    async fn test_orphan_aborts_under_abort_policy() {
        let mut walker = basic_walker();
        walker.insert(SourceTable::LldpRemPortId.subtree().child(&[7, 1, 1]), "Gi9/9");

        let plan = CorrelationPlan::default().with_orphan_policy(OrphanPolicy::Abort);
        let mut correlator = Correlator::new(walker, plan);
        let err = correlator.run().await.unwrap_err();

        assert_eq!(err.orphan_key(), Some(&CorrelationKey::interface(7)));
        assert!(err.to_string().contains("lldpRemPortId"));
    }

    #[tokio::test]
    async fn test_empty_local_walk_is_fatal() {
        let walker = MemoryWalker::with_entries(vec![entry(
            SourceTable::LldpRemSysName,
            &[1, 1, 1],
            "x",
        )]);
        let mut correlator = Correlator::new(walker, CorrelationPlan::default());
        let err = correlator.run().await.unwrap_err();
        assert!(matches!(
            err,
            LldpError::EmptyWalk {
                table: SourceTable::IfName,
                ..
            }
        ));
        // Nothing after the failed walk was requested
        assert_eq!(correlator.walker().walked().len(), 1);
    }

    #[tokio::test]
    async fn test_empty_remote_port_walk_is_fatal() {
        let walker = MemoryWalker::with_entries(vec![
            entry(SourceTable::IfName, &[1], "eth0"),
            entry(SourceTable::LldpRemSysName, &[1, 1, 1], "leaf"),
        ]);
        let mut correlator = Correlator::new(walker, CorrelationPlan::default());
        let err = correlator.run().await.unwrap_err();
        assert!(matches!(
            err,
            LldpError::EmptyWalk {
                table: SourceTable::LldpRemPortId,
                ..
            }
        ));
    }

    #[tokio::test]
    async fn test_malformed_remote_identifier_is_fatal() {
        let mut walker = basic_walker();
        walker.insert(SourceTable::LldpRemPortId.subtree().child(&[5]), "short");
        let plan = CorrelationPlan::default().with_layout(RemoteIndexLayout::TimeMarkFirst);
        let mut correlator = Correlator::new(walker, plan);

        let err = correlator.run().await.unwrap_err();
        match err {
            LldpError::MalformedIdentifier { table, source, .. } => {
                assert_eq!(table, SourceTable::LldpRemPortId);
                assert!(matches!(source, KeyError::MissingComponent { .. }));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn test_malformed_local_identifier_is_fatal() {
        // ifDescr row, one arc longer than the ifName prefix
        let foreign: ObjectId = ".1.3.6.1.2.1.2.2.1.2.1.7".parse().unwrap();
        let cases = [
            (SourceTable::IfName.subtree(), "too short"),
            (foreign.clone(), "not under subtree"),
        ];

        for (bad_oid, label) in cases {
            let mut walker = MockSubtreeWalker::new();
            let returned = bad_oid.clone();
            // Only the local walk may run
            walker
                .expect_walk()
                .withf(|subtree| *subtree == SourceTable::IfName.subtree())
                .times(1)
                .returning(move |_| {
                    Ok(vec![
                        WalkEntry::new(SourceTable::IfName.subtree().child(&[1]), "eth0"),
                        WalkEntry::new(returned.clone(), "bad"),
                    ])
                });

            let mut correlator = Correlator::new(walker, CorrelationPlan::default());
            let err = correlator.run().await.unwrap_err();
            match err {
                LldpError::MalformedIdentifier { table, oid, source } => {
                    assert_eq!(table, SourceTable::IfName, "{label}");
                    assert_eq!(oid, bad_oid, "{label}");
                    if bad_oid == foreign {
                        assert!(matches!(source, KeyError::NotUnderSubtree { .. }), "{label}");
                    } else {
                        assert!(matches!(source, KeyError::TooShort { .. }), "{label}");
                    }
                }
                other => panic!("{label}: unexpected error: {other}"),
            }
        }
    }

    #[tokio::test]
    async fn test_multiple_neighbors_last_write_wins() {
        let walker = MemoryWalker::with_entries(vec![
            entry(SourceTable::IfName, &[1], "eth0"),
            // Returned out of order; index 1.0.2 sorts after 1.0.1
            entry(SourceTable::LldpRemSysName, &[1, 0, 2], "second"),
            entry(SourceTable::LldpRemSysName, &[1, 0, 1], "first"),
            entry(SourceTable::LldpRemPortId, &[1, 0, 1], "p1"),
        ]);
        let mut correlator = Correlator::new(walker, CorrelationPlan::default());
        let result = correlator.run().await.unwrap();

        assert_eq!(
            result.table.get(&CorrelationKey::interface(1)),
            Some(&record("eth0", "p1", "second"))
        );
        assert_eq!(result.report.replaced.len(), 1);
        assert_eq!(result.report.replaced[0].previous, "first");
    }

    #[tokio::test]
    async fn test_transport_failure_stops_run() {
        let mut seq = Sequence::new();
        let mut walker = MockSubtreeWalker::new();

        walker
            .expect_walk()
            .withf(|subtree| *subtree == SourceTable::IfName.subtree())
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| {
                Ok(vec![WalkEntry::new(
                    SourceTable::IfName.subtree().child(&[1]),
                    "eth0",
                )])
            });
        walker
            .expect_walk()
            .withf(|subtree| *subtree == SourceTable::LldpRemSysName.subtree())
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Err(WalkError::Timeout { retries: 3 }));

        let mut correlator = Correlator::new(walker, CorrelationPlan::default());
        let err = correlator.run().await.unwrap_err();
        match err {
            LldpError::Transport { table, source, .. } => {
                assert_eq!(table, SourceTable::LldpRemSysName);
                assert_eq!(source, WalkError::Timeout { retries: 3 });
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn test_report_counts_walks() {
        let mut correlator = Correlator::new(basic_walker(), CorrelationPlan::default());
        let result = correlator.run().await.unwrap();
        assert_eq!(
            result.report.walked,
            vec![
                (SourceTable::IfName, 2),
                (SourceTable::LldpRemSysName, 1),
                (SourceTable::LldpRemPortId, 1),
            ]
        );
    }
}
