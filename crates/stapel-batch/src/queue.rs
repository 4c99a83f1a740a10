// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// In-memory item queue for one pipeline session.
//
// The queue is the only shared mutable state in the pipeline. The processor
// is its sole writer for lifecycle state (via `transition`/`settle`); all
// other callers observe it through frozen snapshots.

use chrono::Utc;
use stapel_core::error::{Result, StapelError};
use stapel_core::types::{
    ItemId, ItemSnapshot, ItemState, QueueItem, SourceDocument, TransformOutput,
};
use tracing::{debug, info, instrument, warn};

/// Ordered collection of queue items.
///
/// Order is insertion order; removal does not reorder the remaining items.
#[derive(Default)]
pub struct ItemQueue {
    items: Vec<QueueItem>,
}

impl ItemQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a new item in the `Idle` state and return its id.
    ///
    /// Never rejects based on file content or media type — whether a given
    /// transform accepts the file is decided at run time by the registry.
    #[instrument(skip(self, source), fields(name = %source.name, media_type = %source.media_type))]
    pub fn add(&mut self, source: SourceDocument) -> ItemId {
        let item = QueueItem::new(source);
        let id = item.id;
        debug!(item = %id, "item queued");
        self.items.push(item);
        id
    }

    /// Remove an item. Idempotent: removing an absent id is a no-op.
    #[instrument(skip(self), fields(item = %id))]
    pub fn remove(&mut self, id: ItemId) {
        let before = self.items.len();
        if let Some(item) = self.items.iter().find(|i| i.id == id)
            && matches!(item.state, ItemState::Processing)
        {
            // The sequential processor holds its own copy of the bytes, so
            // the in-flight apply() is unaffected; its settle will then miss
            // the item and be dropped.
            warn!(item = %id, "removing an item that is currently processing");
        }
        self.items.retain(|i| i.id != id);
        if self.items.len() < before {
            info!(item = %id, "item removed from queue");
        }
    }

    /// Drop every item.
    pub fn clear(&mut self) {
        let count = self.items.len();
        self.items.clear();
        info!(count, "queue cleared");
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Borrow an item by id.
    pub fn get(&self, id: ItemId) -> Option<&QueueItem> {
        self.items.iter().find(|i| i.id == id)
    }

    /// Ids of all items in queue order.
    pub fn ids(&self) -> Vec<ItemId> {
        self.items.iter().map(|i| i.id).collect()
    }

    /// Frozen snapshots of every item, in queue order.
    ///
    /// Each call reflects the live state at call time; a returned snapshot
    /// never changes afterwards.
    pub fn items(&self) -> Vec<ItemSnapshot> {
        self.items.iter().map(ItemSnapshot::from).collect()
    }

    /// Frozen snapshot of a single item.
    pub fn snapshot(&self, id: ItemId) -> Option<ItemSnapshot> {
        self.get(id).map(ItemSnapshot::from)
    }

    /// Output payloads of all succeeded items, in queue order.
    pub fn successful_outputs(&self) -> Vec<(ItemId, &TransformOutput)> {
        self.items
            .iter()
            .filter_map(|item| match &item.state {
                ItemState::Succeeded(output) => Some((item.id, output)),
                _ => None,
            })
            .collect()
    }

    /// Return an item to `Idle`, clearing any terminal payload. Required
    /// before a terminal item can be processed again.
    #[instrument(skip(self), fields(item = %id))]
    pub fn reset(&mut self, id: ItemId) -> Result<()> {
        let item = self.item_mut(id)?;
        item.state = ItemState::Idle;
        item.completed_action = None;
        item.updated_at = Utc::now();
        debug!(item = %id, "item reset to idle");
        Ok(())
    }

    /// Reset every terminal item to `Idle`, returning how many changed.
    pub fn reset_terminal(&mut self) -> usize {
        let mut count = 0;
        let now = Utc::now();
        for item in &mut self.items {
            if item.state.is_terminal() {
                item.state = ItemState::Idle;
                item.completed_action = None;
                item.updated_at = now;
                count += 1;
            }
        }
        info!(count, "terminal items reset");
        count
    }

    // -- Mutation points reserved for the processor ---------------------------

    /// Move an item to its next lifecycle state.
    ///
    /// Legal transitions are `Idle → Processing` and
    /// `Processing → {Succeeded, Failed}`. A terminal item cannot transition
    /// anywhere; it must be `reset` first.
    pub(crate) fn transition(&mut self, id: ItemId, next: ItemState) -> Result<()> {
        let item = self.item_mut(id)?;
        let legal = matches!(
            (&item.state, &next),
            (ItemState::Idle, ItemState::Processing)
                | (ItemState::Processing, ItemState::Succeeded(_))
                | (ItemState::Processing, ItemState::Failed(_))
        );
        if !legal {
            return Err(StapelError::InvalidTransition(format!(
                "{:?} -> {:?} for item {id}",
                item.state.status(),
                next.status()
            )));
        }
        item.state = next;
        item.updated_at = Utc::now();
        Ok(())
    }

    /// Settle an item into a terminal state, recording the action it
    /// completed under.
    pub(crate) fn settle(&mut self, id: ItemId, outcome: ItemState, action_id: &str) -> Result<()> {
        if !outcome.is_terminal() {
            return Err(StapelError::InvalidTransition(
                "settle requires a terminal state".into(),
            ));
        }
        self.transition(id, outcome)?;
        let item = self.item_mut(id)?;
        item.completed_action = Some(action_id.to_string());
        Ok(())
    }

    fn item_mut(&mut self, id: ItemId) -> Result<&mut QueueItem> {
        self.items
            .iter_mut()
            .find(|i| i.id == id)
            .ok_or_else(|| StapelError::ItemNotFound(id.to_string()))
    }
}
