//! Test fixtures for simulated devices
//!
//! A [`DeviceFixture`] describes local ports and LLDP neighbors and expands
//! them into the walk results every source table would return.

use lldpmap::{MemoryWalker, RemoteIndexLayout, SourceTable, WalkEntry};

/// A local interface as seen in ifTable and the LLDP local port table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalPort {
    /// Index shared by ifName/ifDescr and lldpLocPortId/lldpLocPortDesc
    pub index: u32,
    /// ifName and lldpLocPortId value
    pub name: String,
    /// ifDescr and lldpLocPortDesc value
    pub description: String,
}

/// A neighbor learned on a local port
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Neighbor {
    pub local_index: u32,
    pub time_mark: u32,
    pub remote_index: u32,
    pub system_name: String,
    pub port_id: String,
    pub port_description: String,
}

impl Neighbor {
    /// Remote-table index suffix under `layout`
    pub fn index(&self, layout: RemoteIndexLayout) -> Vec<u32> {
        match layout {
            RemoteIndexLayout::LocalPortFirst => {
                vec![self.local_index, self.time_mark, self.remote_index]
            }
            RemoteIndexLayout::TimeMarkFirst => {
                vec![self.time_mark, self.local_index, self.remote_index]
            }
        }
    }
}

/// Builder for the walk results of one device
#[derive(Debug, Clone, Default)]
pub struct DeviceFixture {
    layout: RemoteIndexLayout,
    ports: Vec<LocalPort>,
    neighbors: Vec<Neighbor>,
    extra: Vec<WalkEntry>,
}

impl DeviceFixture {
    pub fn new() -> Self {
        Self::default()
    }

    /// Encode remote indexes with `layout`
    pub fn with_layout(mut self, layout: RemoteIndexLayout) -> Self {
        self.layout = layout;
        self
    }

    /// Add a local port
    pub fn with_port(
        mut self,
        index: u32,
        name: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        self.ports.push(LocalPort {
            index,
            name: name.into(),
            description: description.into(),
        });
        self
    }

    /// Add a neighbor on `local_index`; the port description is derived
    /// from the port id
    pub fn with_neighbor(
        self,
        local_index: u32,
        system_name: impl Into<String>,
        port_id: impl Into<String>,
    ) -> Self {
        let port_id = port_id.into();
        let port_description = format!("{port_id} uplink");
        self.with_neighbor_detail(local_index, system_name, port_id, port_description)
    }

    /// Add a neighbor with an explicit port description
    pub fn with_neighbor_detail(
        mut self,
        local_index: u32,
        system_name: impl Into<String>,
        port_id: impl Into<String>,
        port_description: impl Into<String>,
    ) -> Self {
        let remote_index = self
            .neighbors
            .iter()
            .filter(|n| n.local_index == local_index)
            .count() as u32
            + 1;
        self.neighbors.push(Neighbor {
            local_index,
            time_mark: 0,
            remote_index,
            system_name: system_name.into(),
            port_id: port_id.into(),
            port_description: port_description.into(),
        });
        self
    }

    /// Add a raw entry under `table`
    pub fn with_entry(mut self, table: SourceTable, index: &[u32], value: impl Into<String>) -> Self {
        self.extra
            .push(WalkEntry::new(table.subtree().child(index), value));
        self
    }

    pub fn layout(&self) -> RemoteIndexLayout {
        self.layout
    }

    pub fn ports(&self) -> &[LocalPort] {
        &self.ports
    }

    pub fn neighbors(&self) -> &[Neighbor] {
        &self.neighbors
    }

    /// All walk entries, grouped by table in registry order
    pub fn entries(&self) -> Vec<WalkEntry> {
        let mut entries = Vec::new();
        for table in SourceTable::ALL {
            for port in &self.ports {
                let value = match table {
                    SourceTable::IfName | SourceTable::LldpLocPortId => &port.name,
                    SourceTable::IfDescr | SourceTable::LldpLocPortDesc => &port.description,
                    _ => continue,
                };
                entries.push(WalkEntry::new(table.subtree().child(&[port.index]), value.clone()));
            }
            for neighbor in &self.neighbors {
                let value = match table {
                    SourceTable::LldpRemSysName => &neighbor.system_name,
                    SourceTable::LldpRemPortId => &neighbor.port_id,
                    SourceTable::LldpRemPortDesc => &neighbor.port_description,
                    _ => continue,
                };
                entries.push(WalkEntry::new(
                    table.subtree().child(&neighbor.index(self.layout)),
                    value.clone(),
                ));
            }
        }
        entries.extend(self.extra.iter().cloned());
        entries
    }

    pub fn walker(&self) -> MemoryWalker {
        MemoryWalker::with_entries(self.entries())
    }
}

/// Ready-made device scenarios
pub mod device_fixtures {
    use super::*;

    /// One port with a fully resolved neighbor on index 3
    pub fn core_switch() -> DeviceFixture {
        DeviceFixture::new()
            .with_port(3, "Gi0/3", "GigabitEthernet0/3")
            .with_neighbor(3, "core-switch", "Gi1/1")
    }

    /// Four ports: two neighbors, one unused port and one port whose
    /// neighbor advertises no port information
    pub fn leaf_switch() -> DeviceFixture {
        DeviceFixture::new()
            .with_port(1, "Ethernet0", "100G port 1")
            .with_port(2, "Ethernet4", "100G port 2")
            .with_port(3, "Ethernet8", "100G port 3")
            .with_port(10, "Management0", "mgmt")
            .with_neighbor(1, "spine1", "Ethernet48")
            .with_neighbor(2, "spine2", "Ethernet48")
            .with_entry(SourceTable::LldpRemSysName, &[10, 0, 1], "oob-switch")
    }

    /// `core_switch` plus a remote entry for local index 7, which does
    /// not exist
    pub fn switch_with_orphan() -> DeviceFixture {
        core_switch().with_entry(SourceTable::LldpRemSysName, &[7, 0, 1], "rogue-ap")
    }

    /// Two neighbors on the same local port
    pub fn shared_segment() -> DeviceFixture {
        DeviceFixture::new()
            .with_port(5, "eth5", "hub uplink")
            .with_neighbor(5, "host-a", "eth0")
            .with_neighbor(5, "host-b", "eth1")
    }
}
