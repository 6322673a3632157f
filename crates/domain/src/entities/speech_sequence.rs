//! SpeechSequence - a fixed monologue played beat by beat inside one node
//!
//! The sequence exposes one synthetic "continue" edge per entry. Those inner
//! edges are a pure function of the entry list: they are rebuilt on every
//! mutation and on deserialization, and are never archived.

use serde::{Deserialize, Serialize};

use crate::entities::Edge;

/// One beat of a speech sequence.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpeechSequenceEntry {
    pub speaker: String,
    pub text: String,
    /// Voice asset reference, resolved by the host
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub voice: Option<String>,
    /// Text of the "continue" option shown while this beat is active
    pub edge_text: String,
}

impl SpeechSequenceEntry {
    pub fn new(speaker: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            speaker: speaker.into(),
            text: text.into(),
            voice: None,
            edge_text: String::new(),
        }
    }

    pub fn with_voice(mut self, voice: impl Into<String>) -> Self {
        self.voice = Some(voice.into());
        self
    }

    pub fn with_edge_text(mut self, edge_text: impl Into<String>) -> Self {
        self.edge_text = edge_text.into();
        self
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct SpeechSequenceData {
    #[serde(default)]
    entries: Vec<SpeechSequenceEntry>,
}

impl From<SpeechSequenceData> for SpeechSequence {
    fn from(data: SpeechSequenceData) -> Self {
        Self::new(data.entries)
    }
}

/// The entries of a speech-sequence node plus their derived inner edges.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", from = "SpeechSequenceData")]
pub struct SpeechSequence {
    entries: Vec<SpeechSequenceEntry>,
    #[serde(skip)]
    inner_edges: Vec<Edge>,
}

impl SpeechSequence {
    pub fn new(entries: Vec<SpeechSequenceEntry>) -> Self {
        let mut sequence = Self {
            entries,
            inner_edges: Vec::new(),
        };
        sequence.regenerate_inner_edges();
        sequence
    }

    pub fn entries(&self) -> &[SpeechSequenceEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn inner_edges(&self) -> &[Edge] {
        &self.inner_edges
    }

    pub fn inner_edge(&self, cursor: usize) -> Option<&Edge> {
        self.inner_edges.get(cursor)
    }

    pub fn entry(&self, cursor: usize) -> Option<&SpeechSequenceEntry> {
        self.entries.get(cursor)
    }

    /// True when `cursor` points at the final beat. A sequence without
    /// beats has no last beat, so it never reaches its real children.
    pub fn is_last(&self, cursor: usize) -> bool {
        !self.entries.is_empty() && cursor + 1 >= self.entries.len()
    }

    // Accessors degrade to empty values when the cursor is out of range

    pub fn speaker_at(&self, cursor: usize) -> &str {
        self.entry(cursor).map(|e| e.speaker.as_str()).unwrap_or_default()
    }

    pub fn text_at(&self, cursor: usize) -> &str {
        self.entry(cursor).map(|e| e.text.as_str()).unwrap_or_default()
    }

    pub fn voice_at(&self, cursor: usize) -> Option<&str> {
        self.entry(cursor).and_then(|e| e.voice.as_deref())
    }

    // Mutators keep the inner edges in sync

    pub fn set_entries(&mut self, entries: Vec<SpeechSequenceEntry>) {
        self.entries = entries;
        self.regenerate_inner_edges();
    }

    pub fn push_entry(&mut self, entry: SpeechSequenceEntry) {
        self.entries.push(entry);
        self.regenerate_inner_edges();
    }

    pub fn remove_entry(&mut self, index: usize) -> Option<SpeechSequenceEntry> {
        if index >= self.entries.len() {
            return None;
        }
        let removed = self.entries.remove(index);
        self.regenerate_inner_edges();
        Some(removed)
    }

    fn regenerate_inner_edges(&mut self) {
        self.inner_edges = self
            .entries
            .iter()
            .map(|entry| Edge::unconnected().with_text(entry.edge_text.clone()))
            .collect();
    }
}
