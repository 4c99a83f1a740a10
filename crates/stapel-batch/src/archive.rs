// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Result aggregation — package all succeeded outputs into one gzip-compressed
// tar archive, built entirely in memory.
//
// Purely a read-side projection over the queue: it never mutates item state
// and may be called repeatedly, including mid-batch.

use std::collections::HashSet;
use std::path::Path;

use chrono::Utc;
use flate2::Compression;
use flate2::write::GzEncoder;
use stapel_core::config::BatchConfig;
use stapel_core::error::{Result, StapelError};
use tracing::{debug, info, instrument};

use crate::queue::ItemQueue;

/// One packaged archive ready for download or writing to disk.
#[derive(Debug, Clone)]
pub struct ArchivePayload {
    /// Suggested file name, from configuration.
    pub name: String,
    /// Complete `.tar.gz` bytes.
    pub bytes: Vec<u8>,
    pub entry_count: usize,
}

/// Bundles succeeded outputs into a single archive.
pub struct ResultAggregator {
    archive_name: String,
}

impl ResultAggregator {
    pub fn new(archive_name: impl Into<String>) -> Self {
        Self {
            archive_name: archive_name.into(),
        }
    }

    pub fn from_config(config: &BatchConfig) -> Self {
        Self::new(config.archive_name.clone())
    }

    /// Build an archive with one entry per succeeded item, named by its
    /// output name. Entry-name collisions are resolved deterministically by
    /// suffixing `-2`, `-3`, … before the extension. Zero successes yields
    /// [`StapelError::NothingToExport`] rather than an empty archive.
    #[instrument(skip(self, queue))]
    pub fn export(&self, queue: &ItemQueue) -> Result<ArchivePayload> {
        let outputs = queue.successful_outputs();
        if outputs.is_empty() {
            return Err(StapelError::NothingToExport);
        }

        let mtime = Utc::now().timestamp().max(0) as u64;
        let encoder = GzEncoder::new(Vec::new(), Compression::default());
        let mut builder = tar::Builder::new(encoder);
        let mut taken: HashSet<String> = HashSet::new();

        for (id, output) in &outputs {
            let entry_name = disambiguate(&taken, &output.name);
            taken.insert(entry_name.clone());

            let mut header = tar::Header::new_gnu();
            header.set_size(output.bytes.len() as u64);
            header.set_mode(0o644);
            header.set_mtime(mtime);
            header.set_cksum();

            builder
                .append_data(&mut header, &entry_name, output.bytes.as_slice())
                .map_err(|err| {
                    StapelError::ArchiveError(format!("append entry '{entry_name}': {err}"))
                })?;
            debug!(item = %id, entry = %entry_name, bytes = output.bytes.len(), "entry added");
        }

        let encoder = builder
            .into_inner()
            .map_err(|err| StapelError::ArchiveError(format!("finalise tar: {err}")))?;
        let bytes = encoder
            .finish()
            .map_err(|err| StapelError::ArchiveError(format!("finalise gzip: {err}")))?;

        info!(
            entries = outputs.len(),
            archive_bytes = bytes.len(),
            "archive exported"
        );
        Ok(ArchivePayload {
            name: self.archive_name.clone(),
            bytes,
            entry_count: outputs.len(),
        })
    }

    /// Export and write the archive to `path`.
    pub fn export_to_file(&self, queue: &ItemQueue, path: impl AsRef<Path>) -> Result<()> {
        let payload = self.export(queue)?;
        std::fs::write(path.as_ref(), &payload.bytes)?;
        info!(
            entries = payload.entry_count,
            path = %path.as_ref().display(),
            "archive written"
        );
        Ok(())
    }
}

/// Pick a unique entry name: the original, or `<stem>-N<ext>` for the first
/// free N starting at 2.
fn disambiguate(taken: &HashSet<String>, name: &str) -> String {
    if !taken.contains(name) {
        return name.to_string();
    }
    let (stem, ext) = match name.rfind('.') {
        Some(i) if i > 0 => (&name[..i], &name[i..]),
        _ => (name, ""),
    };
    let mut n = 2usize;
    loop {
        let candidate = format!("{stem}-{n}{ext}");
        if !taken.contains(&candidate) {
            return candidate;
        }
        n += 1;
    }
}
