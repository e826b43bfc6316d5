//! SNMPv2c subtree walker backed by `async-snmp`

use std::net::{IpAddr, SocketAddr};
use std::time::Duration;

use async_snmp::{Auth, Client, Oid, Retry, UdpClient, Value};
use async_trait::async_trait;
use futures::TryStreamExt;
use tracing::{debug, instrument};

use lldpmap_types::ObjectId;

use crate::walker::{SubtreeWalker, WalkEntry, WalkError};

/// Agent port; not configurable.
pub const SNMP_PORT: u16 = 161;

/// Connection parameters for one device.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SnmpSettings {
    pub target: IpAddr,
    pub community: String,
    pub timeout: Duration,
    pub retries: u32,
    pub max_repetitions: u32,
}

impl SnmpSettings {
    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.target, SNMP_PORT)
    }
}

/// Walks subtrees of one device with GETBULK.
pub struct SnmpWalker {
    client: UdpClient,
    settings: SnmpSettings,
}

impl SnmpWalker {
    /// Opens a UDP session to the device.
    ///
    /// No request is sent here; an unreachable agent is reported by the first
    /// walk as a timeout.
    pub async fn connect(settings: SnmpSettings) -> Result<Self, WalkError> {
        let addr = settings.socket_addr();
        let client = Client::builder(addr.to_string(), Auth::v2c(settings.community.clone()))
            .timeout(settings.timeout)
            .retry(Retry::fixed(settings.retries, Duration::ZERO))
            .connect()
            .await
            .map_err(|e| WalkError::Connect {
                target: addr.to_string(),
                message: e.to_string(),
            })?;

        debug!(
            device = %addr,
            timeout_ms = settings.timeout.as_millis() as u64,
            retries = settings.retries,
            "SNMP session ready"
        );
        Ok(Self { client, settings })
    }
}

#[async_trait]
impl SubtreeWalker for SnmpWalker {
    #[instrument(skip(self), fields(device = %self.settings.target))]
    async fn walk(&mut self, subtree: &ObjectId) -> Result<Vec<WalkEntry>, WalkError> {
        let root = Oid::from_slice(subtree.arcs());
        let entries: Vec<WalkEntry> = self
            .client
            .bulk_walk(root, self.settings.max_repetitions as i32)
            .map_ok(|varbind| {
                WalkEntry::new(
                    ObjectId::from_slice(varbind.oid.arcs()),
                    value_text(&varbind.value),
                )
            })
            .map_err(map_error)
            .try_collect()
            .await?;

        debug!(entries = entries.len(), "Bulk walk finished");
        Ok(entries)
    }
}

/// Textual form of a value: octet strings as (lossy) UTF-8, anything else
/// through its display form.
fn value_text(value: &Value) -> String {
    match value {
        Value::OctetString(bytes) => String::from_utf8_lossy(bytes).into_owned(),
        other => other.to_string(),
    }
}

fn map_error(err: Box<async_snmp::Error>) -> WalkError {
    match *err {
        async_snmp::Error::Timeout { retries, .. } => WalkError::Timeout { retries },
        other => WalkError::Protocol(other.to_string()),
    }
}
