// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Form flattening — remove interactive AcroForm data and page annotations
// so the document renders as static content everywhere.

use lopdf::{Document, Object, ObjectId};
use stapel_core::error::{Result, StapelError};
use tracing::{debug, instrument};

/// Strips interactive form structure from a PDF.
///
/// Removes the catalog's `/AcroForm` dictionary and every page's `/Annots`
/// array (field widgets live there), then prunes the orphaned objects.
pub struct FormFlattener;

impl FormFlattener {
    /// Flatten a PDF given as raw bytes, returning the serialised result.
    #[instrument(skip_all, fields(input_bytes = data.len()))]
    pub fn flatten(data: &[u8]) -> Result<Vec<u8>> {
        let mut doc = Document::load_mem(data)
            .map_err(|err| StapelError::PdfError(format!("failed to load PDF: {err}")))?;

        let root_id = match doc.trailer.get(b"Root") {
            Ok(Object::Reference(id)) => *id,
            _ => return Err(StapelError::PdfError("document has no catalog".into())),
        };

        let mut removed_form = false;
        if let Ok(Object::Dictionary(catalog)) = doc.get_object_mut(root_id) {
            removed_form = catalog.remove(b"AcroForm").is_some();
        }

        let page_ids: Vec<ObjectId> = doc.get_pages().values().copied().collect();
        let mut stripped_pages = 0usize;
        for page_id in page_ids {
            if let Ok(Object::Dictionary(page)) = doc.get_object_mut(page_id)
                && page.remove(b"Annots").is_some()
            {
                stripped_pages += 1;
            }
        }

        doc.prune_objects();

        let mut output = Vec::new();
        doc.save_to(&mut output).map_err(|err| {
            StapelError::PdfError(format!("failed to serialise flattened PDF: {err}"))
        })?;

        debug!(removed_form, stripped_pages, "form data flattened");
        Ok(output)
    }
}
