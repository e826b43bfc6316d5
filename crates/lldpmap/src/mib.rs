//! Source table registry
//!
//! Every table the poller walks is listed here with its subtree and kind, so
//! prefix lengths come from one place instead of string offsets.

use std::fmt;

use lldpmap_types::{LocalPortSemantic, ObjectId, RemotePortSemantic};

/// LLDP-MIB `lldpLocPortId`
pub const LLDP_LOC_PORT_ID: &[u32] = &[1, 0, 8802, 1, 1, 2, 1, 3, 7, 1, 3];

/// LLDP-MIB `lldpLocPortDesc`
pub const LLDP_LOC_PORT_DESC: &[u32] = &[1, 0, 8802, 1, 1, 2, 1, 3, 7, 1, 4];

/// IF-MIB `ifDescr`
pub const IF_DESCR: &[u32] = &[1, 3, 6, 1, 2, 1, 2, 2, 1, 2];

/// IF-MIB `ifName`
pub const IF_NAME: &[u32] = &[1, 3, 6, 1, 2, 1, 31, 1, 1, 1, 1];

/// LLDP-MIB `lldpRemPortId`
pub const LLDP_REM_PORT_ID: &[u32] = &[1, 0, 8802, 1, 1, 2, 1, 4, 1, 1, 7];

/// LLDP-MIB `lldpRemPortDesc`
pub const LLDP_REM_PORT_DESC: &[u32] = &[1, 0, 8802, 1, 1, 2, 1, 4, 1, 1, 8];

/// LLDP-MIB `lldpRemSysName`
pub const LLDP_REM_SYS_NAME: &[u32] = &[1, 0, 8802, 1, 1, 2, 1, 4, 1, 1, 9];

/// Whether a table is indexed by local interface alone or by a remote entry
/// compound index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TableKind {
    /// Indexed by the local interface (one component).
    Local,
    /// Indexed by a compound remote-entry index.
    Remote,
}

/// A table walked during correlation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum SourceTable {
    LldpLocPortId,
    LldpLocPortDesc,
    IfDescr,
    IfName,
    LldpRemSysName,
    LldpRemPortId,
    LldpRemPortDesc,
}

impl SourceTable {
    /// All tables, local ones first.
    pub const ALL: [SourceTable; 7] = [
        SourceTable::LldpLocPortId,
        SourceTable::LldpLocPortDesc,
        SourceTable::IfDescr,
        SourceTable::IfName,
        SourceTable::LldpRemSysName,
        SourceTable::LldpRemPortId,
        SourceTable::LldpRemPortDesc,
    ];

    /// The local table that provides labels for the given semantic.
    pub const fn for_local_port(semantic: LocalPortSemantic) -> Self {
        match semantic {
            LocalPortSemantic::Name => SourceTable::IfName,
            LocalPortSemantic::Description => SourceTable::IfDescr,
            LocalPortSemantic::Id => SourceTable::LldpLocPortId,
            LocalPortSemantic::PortDescription => SourceTable::LldpLocPortDesc,
        }
    }

    /// The remote table that provides labels for the given semantic.
    pub const fn for_remote_port(semantic: RemotePortSemantic) -> Self {
        match semantic {
            RemotePortSemantic::Id => SourceTable::LldpRemPortId,
            RemotePortSemantic::Description => SourceTable::LldpRemPortDesc,
        }
    }

    /// MIB object name.
    pub const fn name(&self) -> &'static str {
        match self {
            SourceTable::LldpLocPortId => "lldpLocPortId",
            SourceTable::LldpLocPortDesc => "lldpLocPortDesc",
            SourceTable::IfDescr => "ifDescr",
            SourceTable::IfName => "ifName",
            SourceTable::LldpRemSysName => "lldpRemSysName",
            SourceTable::LldpRemPortId => "lldpRemPortId",
            SourceTable::LldpRemPortDesc => "lldpRemPortDesc",
        }
    }

    /// Subtree arcs.
    pub const fn arcs(&self) -> &'static [u32] {
        match self {
            SourceTable::LldpLocPortId => LLDP_LOC_PORT_ID,
            SourceTable::LldpLocPortDesc => LLDP_LOC_PORT_DESC,
            SourceTable::IfDescr => IF_DESCR,
            SourceTable::IfName => IF_NAME,
            SourceTable::LldpRemSysName => LLDP_REM_SYS_NAME,
            SourceTable::LldpRemPortId => LLDP_REM_PORT_ID,
            SourceTable::LldpRemPortDesc => LLDP_REM_PORT_DESC,
        }
    }

    /// Subtree root to walk.
    pub fn subtree(&self) -> ObjectId {
        ObjectId::from_slice(self.arcs())
    }

    /// Number of arcs before the index suffix.
    pub const fn prefix_len(&self) -> usize {
        self.arcs().len()
    }

    pub const fn kind(&self) -> TableKind {
        match self {
            SourceTable::LldpLocPortId
            | SourceTable::LldpLocPortDesc
            | SourceTable::IfDescr
            | SourceTable::IfName => TableKind::Local,
            SourceTable::LldpRemSysName
            | SourceTable::LldpRemPortId
            | SourceTable::LldpRemPortDesc => TableKind::Remote,
        }
    }
}

impl fmt::Display for SourceTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}
