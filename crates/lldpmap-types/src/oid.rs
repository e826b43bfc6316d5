//! SNMP object identifier type with safe parsing and prefix handling.

use crate::ParseError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A fully-qualified SNMP object identifier, stored as numeric arcs.
///
/// Ordering is arc-by-arc numeric, which is the order an SNMP agent returns
/// a walk in (`1.2.10` sorts after `1.2.9`).
///
/// # Examples
///
/// ```
/// use lldpmap_types::ObjectId;
///
/// let oid: ObjectId = ".1.3.6.1.2.1.31.1.1.1.1.3".parse().unwrap();
/// assert_eq!(oid.to_string(), ".1.3.6.1.2.1.31.1.1.1.1.3");
///
/// // The leading dot is optional on input
/// let same: ObjectId = "1.3.6.1.2.1.31.1.1.1.1.3".parse().unwrap();
/// assert_eq!(oid, same);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ObjectId(Vec<u32>);

impl ObjectId {
    /// Creates an object identifier from its arcs.
    pub fn new(arcs: Vec<u32>) -> Self {
        ObjectId(arcs)
    }

    /// Creates an object identifier by copying a slice of arcs.
    pub fn from_slice(arcs: &[u32]) -> Self {
        ObjectId(arcs.to_vec())
    }

    /// Returns the numeric arcs.
    pub fn arcs(&self) -> &[u32] {
        &self.0
    }

    /// Returns the number of arcs.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns true if the identifier has no arcs.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns true if `prefix` is an ancestor of (or equal to) this identifier.
    pub fn starts_with(&self, prefix: &ObjectId) -> bool {
        self.0.starts_with(&prefix.0)
    }

    /// Returns the index arcs below `prefix`, or `None` if this identifier is
    /// not under `prefix`.
    ///
    /// An identifier equal to `prefix` yields an empty suffix.
    pub fn suffix_after(&self, prefix: &ObjectId) -> Option<&[u32]> {
        self.0.strip_prefix(prefix.0.as_slice())
    }

    /// Returns a new identifier with `index` appended.
    pub fn child(&self, index: &[u32]) -> ObjectId {
        let mut arcs = Vec::with_capacity(self.0.len() + index.len());
        arcs.extend_from_slice(&self.0);
        arcs.extend_from_slice(index);
        ObjectId(arcs)
    }
}

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for arc in &self.0 {
            write!(f, ".{}", arc)?;
        }
        Ok(())
    }
}

impl FromStr for ObjectId {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let body = s.trim().strip_prefix('.').unwrap_or(s.trim());
        if body.is_empty() {
            return Err(ParseError::InvalidObjectId(s.to_string()));
        }

        body.split('.')
            .map(|arc| {
                if arc.is_empty() || !arc.bytes().all(|b| b.is_ascii_digit()) {
                    return Err(ParseError::InvalidObjectId(s.to_string()));
                }
                arc.parse::<u32>()
                    .map_err(|_| ParseError::InvalidObjectId(s.to_string()))
            })
            .collect::<Result<Vec<_>, _>>()
            .map(ObjectId)
    }
}

impl TryFrom<String> for ObjectId {
    type Error = ParseError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<ObjectId> for String {
    fn from(oid: ObjectId) -> String {
        oid.to_string()
    }
}

impl From<&[u32]> for ObjectId {
    fn from(arcs: &[u32]) -> Self {
        ObjectId::from_slice(arcs)
    }
}
