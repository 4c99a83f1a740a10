// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Pipeline configuration.

use serde::{Deserialize, Serialize};

/// Settings for batch processing and export.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchConfig {
    /// Inputs larger than this many bytes fail at run time (recorded as a
    /// per-item failure, never a batch abort). `None` disables the guard.
    pub max_input_bytes: Option<u64>,
    /// File name given to exported archives.
    pub archive_name: String,
    /// Log a warning when a terminal item is skipped while the requested
    /// action differs from the one it completed under.
    pub warn_on_action_mismatch: bool,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            max_input_bytes: None,
            archive_name: "stapel-output.tar.gz".into(),
            warn_on_action_mismatch: true,
        }
    }
}
