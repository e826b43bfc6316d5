//! LLDP neighbor discovery over SNMPv2c
//!
//! Walks a device's local-port table and its LLDP remote tables, joins the
//! rows on the local interface index and renders one neighbor record per
//! local interface.
//!
//! The pipeline is walk -> key extraction -> merge -> optional prune ->
//! render. Walks go through the [`SubtreeWalker`] seam so the engine runs
//! unchanged against a live agent ([`SnmpWalker`]) or canned data
//! ([`MemoryWalker`]).

pub mod config;
pub mod correlator;
pub mod error;
pub mod key;
pub mod mib;
pub mod presenter;
pub mod prune;
pub mod snmp;
pub mod table;
pub mod walker;

pub use config::{PollerConfig, DEFAULT_CONFIG_PATH};
pub use correlator::{
    Correlation, CorrelationPlan, CorrelationReport, Correlator, OrphanEntry, OrphanPolicy,
    ReplacedValue,
};
pub use error::{LldpError, Result};
pub use key::{CorrelationKey, KeyError, KeyExtractor, RemoteIndexLayout};
pub use mib::{SourceTable, TableKind};
pub use presenter::{OutputFormat, Presenter};
pub use prune::{prune, PrunePolicy};
pub use snmp::{SnmpSettings, SnmpWalker, SNMP_PORT};
pub use table::{CorrelationError, MergeOutcome, NeighborRecord, NeighborTable, RemoteField};
pub use walker::{MemoryWalker, SubtreeWalker, WalkEntry, WalkError};

pub use lldpmap_types::{LocalPortSemantic, ObjectId, ParseError, RemotePortSemantic};

use tracing::info;

/// Outcome of a full discovery run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Discovery {
    pub table: NeighborTable,
    pub report: CorrelationReport,
    /// Records removed by pruning
    pub pruned: usize,
}

/// Correlates the device behind `walker` and applies the configured pruning.
///
/// `config` is expected to be validated; the target address is not used here.
pub async fn discover_neighbors<W: SubtreeWalker>(
    walker: W,
    config: &PollerConfig,
) -> Result<Discovery> {
    let mut correlator = Correlator::new(walker, config.correlation_plan());
    let Correlation { mut table, report } = correlator.run().await?;

    let pruned = match config.prune_policy() {
        Some(policy) => prune(&mut table, policy),
        None => 0,
    };

    info!(
        interfaces = table.len(),
        resolved = table.resolved_count(),
        orphans = report.orphans.len(),
        replaced = report.replaced.len(),
        pruned,
        "Neighbor discovery finished"
    );

    Ok(Discovery {
        table,
        report,
        pruned,
    })
}
