// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Batch processor — sequential execution of one selected transform over
// every non-terminal item in the queue.
//
// Per-item failure isolation is the defining correctness property here: a
// failing item is recorded and the run continues with the next item. The
// only batch-level abort is an unknown action id, which fails before any
// item is touched.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use stapel_core::config::BatchConfig;
use stapel_core::error::{Result, StapelError};
use stapel_core::types::{BatchSummary, ItemSnapshot, ItemState, SourceDocument, TransformOutput};
use tracing::{debug, info, instrument, warn};

use crate::queue::ItemQueue;
use crate::registry::{Transform, TransformRegistry};

/// Shared cooperative-cancellation flag.
///
/// Checked between items, never inside a running transform — transforms are
/// atomic black boxes. Clones observe the same flag.
#[derive(Debug, Clone, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request that the current (and any future) run stop at the next
    /// between-items check.
    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    /// Re-arm the flag so later runs proceed normally.
    pub fn clear(&self) {
        self.0.store(false, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// Drives one selected transform over a queue, item by item, in insertion
/// order.
pub struct BatchProcessor {
    registry: TransformRegistry,
    config: BatchConfig,
    cancel: CancelFlag,
}

impl BatchProcessor {
    pub fn new(registry: TransformRegistry) -> Self {
        Self::with_config(registry, BatchConfig::default())
    }

    pub fn with_config(registry: TransformRegistry, config: BatchConfig) -> Self {
        Self {
            registry,
            config,
            cancel: CancelFlag::new(),
        }
    }

    /// Handle for cancelling a run from another context. Call
    /// [`CancelFlag::clear`] before re-running after a cancellation.
    pub fn cancel_flag(&self) -> CancelFlag {
        self.cancel.clone()
    }

    pub fn registry(&self) -> &TransformRegistry {
        &self.registry
    }

    /// Run the selected action over every non-terminal item.
    pub fn run(&self, queue: &mut ItemQueue, action_id: &str) -> Result<BatchSummary> {
        self.run_with_observer(queue, action_id, |_| {})
    }

    /// Like [`BatchProcessor::run`], invoking `on_settled` after each item's
    /// status settles so callers can render progress between items.
    ///
    /// Items already in a terminal state are skipped; partial progress from
    /// earlier runs is preserved. A terminal item that completed under a
    /// different action is still skipped (with a warning) — re-processing
    /// requires an explicit `reset` first.
    #[instrument(skip(self, queue, on_settled), fields(action = action_id))]
    pub fn run_with_observer(
        &self,
        queue: &mut ItemQueue,
        action_id: &str,
        mut on_settled: impl FnMut(&ItemSnapshot),
    ) -> Result<BatchSummary> {
        // Unknown action: abort with zero item transitions.
        let transform = self.registry.lookup(action_id)?;

        let mut summary = BatchSummary::default();
        info!(items = queue.len(), "batch run starting");

        for id in queue.ids() {
            if self.cancel.is_cancelled() {
                warn!(visited = summary.succeeded + summary.failed + summary.skipped,
                      "batch cancelled between items");
                summary.cancelled = true;
                break;
            }

            let Some(item) = queue.get(id) else { continue };
            if item.state.is_terminal() {
                if self.config.warn_on_action_mismatch
                    && item.completed_action.as_deref().is_some_and(|a| a != action_id)
                {
                    warn!(
                        item = %id,
                        completed_under = item.completed_action.as_deref().unwrap_or_default(),
                        requested = action_id,
                        "terminal item completed under a different action; skipping — reset it to re-process"
                    );
                }
                summary.skipped += 1;
                continue;
            }

            queue.transition(id, ItemState::Processing)?;

            let outcome = match queue.get(id) {
                Some(item) => self.execute(transform, &item.source, action_id),
                None => continue,
            };

            match outcome {
                Ok(output) => {
                    debug!(item = %id, output = %output.name, "item succeeded");
                    queue.settle(id, ItemState::Succeeded(output), action_id)?;
                    summary.succeeded += 1;
                }
                Err(err) => {
                    warn!(item = %id, error = %err, "item failed; continuing with remaining items");
                    queue.settle(id, ItemState::Failed(err.to_string()), action_id)?;
                    summary.failed += 1;
                }
            }

            if let Some(snapshot) = queue.snapshot(id) {
                on_settled(&snapshot);
            }
        }

        info!(
            succeeded = summary.succeeded,
            failed = summary.failed,
            skipped = summary.skipped,
            cancelled = summary.cancelled,
            "batch run finished"
        );
        Ok(summary)
    }

    /// Pre-flight checks plus the transform call for one item.
    fn execute(
        &self,
        transform: &dyn Transform,
        source: &SourceDocument,
        action_id: &str,
    ) -> Result<TransformOutput> {
        if let Some(limit) = self.config.max_input_bytes
            && source.bytes.len() as u64 > limit
        {
            return Err(StapelError::TransformFailure(format!(
                "{}: input is {} bytes, over the configured limit of {limit}",
                source.name,
                source.bytes.len()
            )));
        }
        if !transform.accepts(&source.media_type) {
            return Err(StapelError::UnsupportedMediaType(format!(
                "action '{action_id}' does not accept '{}' ({})",
                source.media_type, source.name
            )));
        }
        transform.apply(source)
    }
}
