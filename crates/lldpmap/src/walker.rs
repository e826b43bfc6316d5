//! Subtree walk seam between the correlator and the SNMP transport

use async_trait::async_trait;
use thiserror::Error;

use lldpmap_types::ObjectId;

/// One identifier/value pair returned by a walk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WalkEntry {
    pub oid: ObjectId,
    pub value: String,
}

impl WalkEntry {
    pub fn new(oid: ObjectId, value: impl Into<String>) -> Self {
        Self {
            oid,
            value: value.into(),
        }
    }
}

/// Transport-level failures of a walk.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WalkError {
    /// Session setup failed
    #[error("failed to connect to {target}: {message}")]
    Connect { target: String, message: String },

    /// No response within the timeout, after all retries
    #[error("request timed out after {retries} retries")]
    Timeout { retries: u32 },

    /// Agent answered with an error or an undecodable response
    #[error("{0}")]
    Protocol(String),
}

/// Retrieves every identifier/value pair below a subtree.
///
/// Implementations handle pagination, retries and timeouts; a returned error
/// means the walk as a whole failed.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SubtreeWalker: Send {
    async fn walk(&mut self, subtree: &ObjectId) -> Result<Vec<WalkEntry>, WalkError>;
}

#[async_trait]
impl<W: SubtreeWalker + ?Sized> SubtreeWalker for &mut W {
    async fn walk(&mut self, subtree: &ObjectId) -> Result<Vec<WalkEntry>, WalkError> {
        (**self).walk(subtree).await
    }
}

/// In-memory walker over a fixed set of entries.
///
/// Answers a walk with every stored entry under the subtree, in insertion
/// order, and records which subtrees were requested.
#[derive(Debug, Clone, Default)]
pub struct MemoryWalker {
    entries: Vec<WalkEntry>,
    failures: Vec<(ObjectId, WalkError)>,
    walked: Vec<ObjectId>,
}

impl MemoryWalker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, oid: ObjectId, value: impl Into<String>) {
        self.entries.push(WalkEntry::new(oid, value));
    }

    pub fn with_entries<I>(entries: I) -> Self
    where
        I: IntoIterator<Item = WalkEntry>,
    {
        Self {
            entries: entries.into_iter().collect(),
            ..Default::default()
        }
    }

    /// Makes walks of `subtree` fail with `error`.
    pub fn fail(&mut self, subtree: ObjectId, error: WalkError) {
        self.failures.push((subtree, error));
    }

    /// Subtrees requested so far, in order.
    pub fn walked(&self) -> &[ObjectId] {
        &self.walked
    }

    pub fn entries(&self) -> &[WalkEntry] {
        &self.entries
    }
}

#[async_trait]
impl SubtreeWalker for MemoryWalker {
    async fn walk(&mut self, subtree: &ObjectId) -> Result<Vec<WalkEntry>, WalkError> {
        self.walked.push(subtree.clone());

        if let Some((_, error)) = self.failures.iter().find(|(root, _)| root == subtree) {
            return Err(error.clone());
        }

        Ok(self
            .entries
            .iter()
            .filter(|entry| entry.oid.starts_with(subtree) && entry.oid != *subtree)
            .cloned()
            .collect())
    }
}
