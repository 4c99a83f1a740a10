// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// PDF compression — prune unreachable objects, re-apply stream compression,
// and drop expendable metadata using the `lopdf` crate.

use lopdf::Document;
use stapel_core::error::{Result, StapelError};
use tracing::{debug, instrument};

/// Shrinks an existing PDF without touching its visible content.
///
/// Three passes: the document `/Info` dictionary is dropped, objects no
/// longer reachable from the catalog are pruned, and all content streams are
/// re-compressed. Page structure and count are preserved.
pub struct PdfCompressor;

impl PdfCompressor {
    /// Compress a PDF given as raw bytes, returning the serialised result.
    #[instrument(skip_all, fields(input_bytes = data.len()))]
    pub fn compress(data: &[u8]) -> Result<Vec<u8>> {
        let mut doc = Document::load_mem(data)
            .map_err(|err| StapelError::PdfError(format!("failed to load PDF: {err}")))?;
        let pages = doc.get_pages().len();

        doc.trailer.remove(b"Info");
        doc.prune_objects();
        doc.renumber_objects();
        doc.compress();

        let mut output = Vec::new();
        doc.save_to(&mut output).map_err(|err| {
            StapelError::PdfError(format!("failed to serialise compressed PDF: {err}"))
        })?;

        debug!(
            pages,
            input_bytes = data.len(),
            output_bytes = output.len(),
            "PDF compressed"
        );
        Ok(output)
    }
}
