// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Unified error types for Stapel.

use thiserror::Error;

/// Top-level error type for all Stapel operations.
#[derive(Debug, Error)]
pub enum StapelError {
    // -- Batch errors --
    #[error("unknown action: {0}")]
    ActionNotFound(String),

    #[error("unsupported media type: {0}")]
    UnsupportedMediaType(String),

    #[error("transform failed: {0}")]
    TransformFailure(String),

    #[error("no successful outputs to export")]
    NothingToExport,

    #[error("queue item {0} not found")]
    ItemNotFound(String),

    #[error("invalid state transition: {0}")]
    InvalidTransition(String),

    // -- Document errors --
    #[error("PDF operation failed: {0}")]
    PdfError(String),

    #[error("image processing failed: {0}")]
    ImageError(String),

    // -- Packaging / persistence --
    #[error("archive packaging failed: {0}")]
    ArchiveError(String),

    #[error("file I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, StapelError>;
