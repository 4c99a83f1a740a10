// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// stapel-batch — The batch document-transformation pipeline.
//
// Data flow: callers fill an `ItemQueue` with input documents, select an
// action from the `TransformRegistry`, and invoke `BatchProcessor::run`.
// The processor visits items strictly in insertion order, transitioning
// each through Idle → Processing → {Succeeded | Failed}; one bad file never
// aborts the batch. `ResultAggregator::export` packages whatever has
// succeeded so far into a single gzip-compressed tar archive — it may be
// called mid-batch.

pub mod actions;
pub mod archive;
pub mod processor;
pub mod queue;
pub mod registry;

pub use archive::{ArchivePayload, ResultAggregator};
pub use processor::{BatchProcessor, CancelFlag};
pub use queue::ItemQueue;
pub use registry::{Transform, TransformRegistry};
