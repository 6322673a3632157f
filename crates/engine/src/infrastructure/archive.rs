//! Binary and JSON archives for dialogue records.
//!
//! Binary records are `bincode` encodings of the domain types. Struct fields
//! are written in declaration order and enums as their u32 discriminant, so
//! the field order of `Edge`, `Event` and `Condition` is the compatibility
//! contract. Memory is wrapped in a versioned envelope.

use std::collections::BTreeMap;
use std::path::Path;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use dlgflow_domain::{Dialogue, DialogueId, Edge, Event, History};

/// Current memory archive version.
pub const MEMORY_ARCHIVE_VERSION: u32 = 1;

/// Archive failures.
#[derive(Debug, thiserror::Error)]
pub enum ArchiveError {
    #[error("Failed to encode {record}: {message}")]
    Encode {
        record: &'static str,
        message: String,
    },

    /// Malformed bytes, including enum discriminants this engine does not know
    #[error("Failed to decode {record}: {message}")]
    Decode {
        record: &'static str,
        message: String,
    },

    #[error("Unsupported {record} archive version {found} (expected {expected})")]
    UnsupportedVersion {
        record: &'static str,
        found: u32,
        expected: u32,
    },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl ArchiveError {
    fn encode(record: &'static str, message: impl ToString) -> Self {
        Self::Encode {
            record,
            message: message.to_string(),
        }
    }

    fn decode(record: &'static str, message: impl ToString) -> Self {
        Self::Decode {
            record,
            message: message.to_string(),
        }
    }
}

// =============================================================================
// Field-ordered records
// =============================================================================

pub fn encode_record<T: Serialize>(record: &'static str, value: &T) -> Result<Vec<u8>, ArchiveError> {
    bincode::serialize(value).map_err(|e| ArchiveError::encode(record, e))
}

pub fn decode_record<T: DeserializeOwned>(
    record: &'static str,
    bytes: &[u8],
) -> Result<T, ArchiveError> {
    bincode::deserialize(bytes).map_err(|e| ArchiveError::decode(record, e))
}

/// `target_index:i32, text:string, conditions:list<Condition>`
pub fn encode_edge(edge: &Edge) -> Result<Vec<u8>, ArchiveError> {
    encode_record("edge", edge)
}

pub fn decode_edge(bytes: &[u8]) -> Result<Edge, ArchiveError> {
    decode_record("edge", bytes)
}

/// `participant_name, event_name, int_value:i32, float_value:f32,
/// name_value, is_delta, bool_value, kind:u32`
pub fn encode_event(event: &Event) -> Result<Vec<u8>, ArchiveError> {
    encode_record("event", event)
}

/// Rejects unknown event kinds: they mean the content was written by an
/// incompatible engine version.
pub fn decode_event(bytes: &[u8]) -> Result<Event, ArchiveError> {
    decode_record("event", bytes)
}

// =============================================================================
// Memory
// =============================================================================

#[derive(Serialize, Deserialize)]
struct MemoryArchive {
    version: u32,
    entries: BTreeMap<DialogueId, History>,
}

pub fn encode_memory(entries: &BTreeMap<DialogueId, History>) -> Result<Vec<u8>, ArchiveError> {
    #[derive(Serialize)]
    struct MemoryArchiveRef<'a> {
        version: u32,
        entries: &'a BTreeMap<DialogueId, History>,
    }

    encode_record(
        "memory",
        &MemoryArchiveRef {
            version: MEMORY_ARCHIVE_VERSION,
            entries,
        },
    )
}

pub fn decode_memory(bytes: &[u8]) -> Result<BTreeMap<DialogueId, History>, ArchiveError> {
    let archive: MemoryArchive = decode_record("memory", bytes)?;
    if archive.version != MEMORY_ARCHIVE_VERSION {
        return Err(ArchiveError::UnsupportedVersion {
            record: "memory",
            found: archive.version,
            expected: MEMORY_ARCHIVE_VERSION,
        });
    }
    Ok(archive.entries)
}

// =============================================================================
// Dialogue assets (JSON)
// =============================================================================

pub fn dialogue_from_json(json: &str) -> Result<Dialogue, ArchiveError> {
    serde_json::from_str(json).map_err(|e| ArchiveError::decode("dialogue", e))
}

pub fn dialogue_to_json(dialogue: &Dialogue) -> Result<String, ArchiveError> {
    serde_json::to_string_pretty(dialogue).map_err(|e| ArchiveError::encode("dialogue", e))
}

pub fn load_dialogue(path: impl AsRef<Path>) -> Result<Dialogue, ArchiveError> {
    let json = std::fs::read_to_string(path)?;
    dialogue_from_json(&json)
}
