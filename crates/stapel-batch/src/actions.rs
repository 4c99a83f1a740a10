// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Built-in actions wiring the `stapel-document` transforms into the
// registry's `Transform` trait.

use stapel_core::error::Result;
use stapel_core::types::{MediaType, SourceDocument, TransformOutput};
use stapel_document::{FormFlattener, ImageToPdf, PdfCompressor};

use crate::registry::Transform;

/// File name without its final extension.
fn stem(name: &str) -> &str {
    match name.rfind('.') {
        Some(i) if i > 0 => &name[..i],
        _ => name,
    }
}

/// `compress` — shrink a PDF in place.
pub struct CompressAction;

impl Transform for CompressAction {
    fn action_id(&self) -> &str {
        "compress"
    }

    fn accepts(&self, media_type: &str) -> bool {
        MediaType::from_mime(media_type) == Some(MediaType::Pdf)
    }

    fn apply(&self, source: &SourceDocument) -> Result<TransformOutput> {
        let bytes = PdfCompressor::compress(&source.bytes)?;
        Ok(TransformOutput {
            name: format!("{}-compressed.pdf", stem(&source.name)),
            bytes,
        })
    }
}

/// `flatten` — remove interactive form data from a PDF.
pub struct FlattenAction;

impl Transform for FlattenAction {
    fn action_id(&self) -> &str {
        "flatten"
    }

    fn accepts(&self, media_type: &str) -> bool {
        MediaType::from_mime(media_type) == Some(MediaType::Pdf)
    }

    fn apply(&self, source: &SourceDocument) -> Result<TransformOutput> {
        let bytes = FormFlattener::flatten(&source.bytes)?;
        Ok(TransformOutput {
            name: format!("{}-flattened.pdf", stem(&source.name)),
            bytes,
        })
    }
}

/// `convert-image-to-document` — place a raster image on an A4 PDF page.
pub struct ImageToDocumentAction;

impl Transform for ImageToDocumentAction {
    fn action_id(&self) -> &str {
        "convert-image-to-document"
    }

    fn accepts(&self, media_type: &str) -> bool {
        matches!(
            MediaType::from_mime(media_type),
            Some(MediaType::Jpeg | MediaType::Png | MediaType::Tiff)
        )
    }

    fn apply(&self, source: &SourceDocument) -> Result<TransformOutput> {
        let converter = ImageToPdf::with_title(stem(&source.name));
        let bytes = converter.convert(&source.bytes)?;
        Ok(TransformOutput {
            name: format!("{}.pdf", stem(&source.name)),
            bytes,
        })
    }
}
