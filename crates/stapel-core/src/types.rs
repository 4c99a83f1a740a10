// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Core domain types for the Stapel batch pipeline.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use uuid::Uuid;

/// Unique identifier for a queue item.
///
/// Assigned at insertion and never reused within a session, even after the
/// item is removed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ItemId(pub Uuid);

impl ItemId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ItemId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for ItemId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Media types the transform catalog knows about.
///
/// Callers declare a free-form MIME string per input; transforms parse it
/// with [`MediaType::from_mime`] when deciding whether they accept a file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MediaType {
    Pdf,
    Jpeg,
    Png,
    Tiff,
    PlainText,
}

impl MediaType {
    /// Canonical MIME type string.
    pub fn mime_type(&self) -> &'static str {
        match self {
            Self::Pdf => "application/pdf",
            Self::Jpeg => "image/jpeg",
            Self::Png => "image/png",
            Self::Tiff => "image/tiff",
            Self::PlainText => "text/plain",
        }
    }

    /// Parse a declared MIME type string. Unknown types yield `None`.
    pub fn from_mime(mime: &str) -> Option<Self> {
        match mime.trim().to_ascii_lowercase().as_str() {
            "application/pdf" => Some(Self::Pdf),
            "image/jpeg" | "image/jpg" => Some(Self::Jpeg),
            "image/png" => Some(Self::Png),
            "image/tiff" => Some(Self::Tiff),
            "text/plain" => Some(Self::PlainText),
            _ => None,
        }
    }

    /// Infer media type from a file extension.
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "pdf" => Some(Self::Pdf),
            "jpg" | "jpeg" => Some(Self::Jpeg),
            "png" => Some(Self::Png),
            "tif" | "tiff" => Some(Self::Tiff),
            "txt" => Some(Self::PlainText),
            _ => None,
        }
    }
}

/// One input document as supplied by the caller.
///
/// The declared media type is stored verbatim — insertion never rejects a
/// file; whether a given transform accepts it is decided at run time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceDocument {
    pub name: String,
    /// Declared MIME type, e.g. `"application/pdf"`.
    pub media_type: String,
    pub bytes: Vec<u8>,
}

impl SourceDocument {
    pub fn new(name: impl Into<String>, media_type: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            media_type: media_type.into(),
            bytes,
        }
    }

    /// SHA-256 hash of the payload, hex encoded.
    pub fn digest(&self) -> String {
        hex::encode(Sha256::digest(&self.bytes))
    }
}

/// Output produced by a successful transform.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransformOutput {
    pub name: String,
    pub bytes: Vec<u8>,
}

/// Lifecycle state of a queue item.
///
/// Terminal payloads live inside the variant, so a result and an error can
/// never coexist and partial updates are impossible — the whole state is
/// replaced in one assignment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum ItemState {
    /// Waiting to be processed.
    Idle,
    /// Currently being transformed.
    Processing,
    /// Transform completed — output payload attached.
    Succeeded(TransformOutput),
    /// Transform failed — human-readable cause attached.
    Failed(String),
}

impl ItemState {
    /// Terminal states admit no further automatic transition.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Succeeded(_) | Self::Failed(_))
    }

    /// Payload-free status for snapshots and progress rendering.
    pub fn status(&self) -> ItemStatus {
        match self {
            Self::Idle => ItemStatus::Idle,
            Self::Processing => ItemStatus::Processing,
            Self::Succeeded(_) => ItemStatus::Succeeded,
            Self::Failed(_) => ItemStatus::Failed,
        }
    }
}

/// Payload-free view of [`ItemState`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ItemStatus {
    Idle,
    Processing,
    Succeeded,
    Failed,
}

/// One queued document plus its mutable lifecycle record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueueItem {
    pub id: ItemId,
    pub source: SourceDocument,
    pub state: ItemState,
    /// SHA-256 hash of the source bytes, fixed at insertion.
    pub source_hash: String,
    /// Action under which the item reached its terminal state.
    pub completed_action: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl QueueItem {
    pub fn new(source: SourceDocument) -> Self {
        let now = Utc::now();
        let source_hash = source.digest();
        Self {
            id: ItemId::new(),
            source,
            state: ItemState::Idle,
            source_hash,
            completed_action: None,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Frozen view of one queue item at a point in time.
///
/// Snapshots do not track later mutations; callers re-query the queue to
/// observe progress.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ItemSnapshot {
    pub id: ItemId,
    pub name: String,
    pub media_type: String,
    pub status: ItemStatus,
    /// Present only when the item succeeded.
    pub output_name: Option<String>,
    /// Present only when the item failed.
    pub error_message: Option<String>,
    pub updated_at: DateTime<Utc>,
}

impl From<&QueueItem> for ItemSnapshot {
    fn from(item: &QueueItem) -> Self {
        let (output_name, error_message) = match &item.state {
            ItemState::Succeeded(output) => (Some(output.name.clone()), None),
            ItemState::Failed(message) => (None, Some(message.clone())),
            _ => (None, None),
        };
        Self {
            id: item.id,
            name: item.source.name.clone(),
            media_type: item.source.media_type.clone(),
            status: item.state.status(),
            output_name,
            error_message,
            updated_at: item.updated_at,
        }
    }
}

/// Aggregate outcome of one batch run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchSummary {
    pub succeeded: usize,
    pub failed: usize,
    pub skipped: usize,
    /// True when the run stopped early at a cooperative cancellation check.
    pub cancelled: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn media_type_round_trips_through_mime() {
        for mt in [
            MediaType::Pdf,
            MediaType::Jpeg,
            MediaType::Png,
            MediaType::Tiff,
            MediaType::PlainText,
        ] {
            assert_eq!(MediaType::from_mime(mt.mime_type()), Some(mt));
        }
    }

    #[test]
    fn unknown_mime_is_none() {
        assert_eq!(MediaType::from_mime("application/x-unknown"), None);
        assert_eq!(MediaType::from_extension("docx"), None);
    }

    #[test]
    fn new_item_starts_idle_with_hash() {
        let item = QueueItem::new(SourceDocument::new(
            "a.pdf",
            "application/pdf",
            b"%PDF-1.5".to_vec(),
        ));
        assert_eq!(item.state.status(), ItemStatus::Idle);
        assert!(!item.state.is_terminal());
        assert_eq!(item.source_hash.len(), 64);
        assert!(item.completed_action.is_none());
    }

    #[test]
    fn snapshot_exposes_exactly_one_terminal_field() {
        let mut item = QueueItem::new(SourceDocument::new("a.pdf", "application/pdf", vec![]));

        item.state = ItemState::Succeeded(TransformOutput {
            name: "a-out.pdf".into(),
            bytes: vec![1, 2, 3],
        });
        let snap = ItemSnapshot::from(&item);
        assert_eq!(snap.output_name.as_deref(), Some("a-out.pdf"));
        assert!(snap.error_message.is_none());

        item.state = ItemState::Failed("corrupt header".into());
        let snap = ItemSnapshot::from(&item);
        assert!(snap.output_name.is_none());
        assert_eq!(snap.error_message.as_deref(), Some("corrupt header"));
    }

    #[test]
    fn item_ids_are_unique() {
        let a = ItemId::new();
        let b = ItemId::new();
        assert_ne!(a, b);
    }
}
