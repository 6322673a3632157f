//! Dialogue memory - long-term visit history per dialogue instance.
//!
//! One entry per instance identity. Entries never interact: there is no
//! cross-instance query. The map is safe to read from several contexts at
//! once; each instance is expected to have a single writer (the context
//! currently playing it). Two contexts sharing an instance identity must be
//! serialized by the caller.

use std::collections::BTreeMap;
use std::path::Path;

use dashmap::DashMap;

use dlgflow_domain::{DialogueId, History};

use crate::infrastructure::archive::{self, ArchiveError};

/// Visited-node history keyed by dialogue instance.
#[derive(Debug, Default)]
pub struct DialogueMemory {
    history: DashMap<DialogueId, History>,
}

impl DialogueMemory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace or insert a whole history record.
    pub fn set_entry(&self, instance_id: DialogueId, history: History) {
        self.history.insert(instance_id, history);
    }

    /// Record a visit, creating the instance entry on first use.
    ///
    /// Idempotent: marking an already visited node changes nothing.
    pub fn mark_visited(&self, instance_id: DialogueId, node_index: i32) {
        let inserted = self
            .history
            .entry(instance_id)
            .or_default()
            .mark_visited(node_index);
        if inserted {
            tracing::trace!(instance = %instance_id, node_index, "Marked node visited");
        }
    }

    /// False when the instance has no record yet.
    pub fn is_visited(&self, instance_id: DialogueId, node_index: i32) -> bool {
        self.history
            .get(&instance_id)
            .is_some_and(|history| history.is_visited(node_index))
    }

    /// A copy of one instance's history.
    pub fn history(&self, instance_id: DialogueId) -> Option<History> {
        self.history.get(&instance_id).map(|entry| entry.clone())
    }

    /// Forget one instance. Returns the removed history.
    pub fn reset_entry(&self, instance_id: DialogueId) -> Option<History> {
        self.history.remove(&instance_id).map(|(_, history)| history)
    }

    pub fn clear(&self) {
        self.history.clear();
    }

    pub fn len(&self) -> usize {
        self.history.len()
    }

    pub fn is_empty(&self) -> bool {
        self.history.is_empty()
    }

    /// Ordered copy of the whole map.
    pub fn snapshot(&self) -> BTreeMap<DialogueId, History> {
        self.history
            .iter()
            .map(|entry| (*entry.key(), entry.value().clone()))
            .collect()
    }

    /// Replace the whole map.
    pub fn restore(&self, entries: BTreeMap<DialogueId, History>) {
        self.history.clear();
        for (instance_id, history) in entries {
            self.history.insert(instance_id, history);
        }
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>, ArchiveError> {
        archive::encode_memory(&self.snapshot())
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, ArchiveError> {
        let memory = Self::new();
        memory.restore(archive::decode_memory(bytes)?);
        Ok(memory)
    }

    pub fn save_to_path(&self, path: impl AsRef<Path>) -> Result<(), ArchiveError> {
        let path = path.as_ref();
        std::fs::write(path, self.to_bytes()?)?;
        tracing::debug!(path = %path.display(), entries = self.len(), "Saved dialogue memory");
        Ok(())
    }

    pub fn load_from_path(path: impl AsRef<Path>) -> Result<Self, ArchiveError> {
        let path = path.as_ref();
        let memory = Self::from_bytes(&std::fs::read(path)?)?;
        tracing::debug!(path = %path.display(), entries = memory.len(), "Loaded dialogue memory");
        Ok(memory)
    }
}
