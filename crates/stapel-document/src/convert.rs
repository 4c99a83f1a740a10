// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Image-to-PDF conversion using `printpdf` 0.8.
//
// printpdf 0.8 uses a data-oriented API: documents are built by constructing
// `PdfPage` structs containing `Vec<Op>` operation lists, then serialised via
// `PdfDocument::save()`.

use printpdf::{
    Mm, Op, PdfDocument, PdfPage, PdfSaveOptions, PdfWarnMsg, Pt, RawImage, RawImageData,
    RawImageFormat, XObjectTransform,
};
use stapel_core::error::{Result, StapelError};
use tracing::{debug, instrument};

const PAGE_W_MM: f32 = 210.0;
const PAGE_H_MM: f32 = 297.0;
const MARGIN_MM: f32 = 15.0;
const RENDER_DPI: f32 = 150.0;

/// Converts a raster image (JPEG, PNG, TIFF) into a single-page A4 PDF.
///
/// The image is scaled to fit within the page margins while preserving its
/// aspect ratio, centred on the page, and never upscaled.
pub struct ImageToPdf {
    /// Title embedded in the PDF /Info dictionary.
    title: Option<String>,
}

impl ImageToPdf {
    pub fn new() -> Self {
        Self { title: None }
    }

    pub fn with_title(title: impl Into<String>) -> Self {
        Self {
            title: Some(title.into()),
        }
    }

    /// Convert encoded image bytes into a single-page PDF.
    #[instrument(skip(self, image_bytes), fields(input_bytes = image_bytes.len()))]
    pub fn convert(&self, image_bytes: &[u8]) -> Result<Vec<u8>> {
        let decoded = image::load_from_memory(image_bytes)
            .map_err(|err| StapelError::ImageError(format!("failed to decode image: {err}")))?;

        let img_width = decoded.width() as usize;
        let img_height = decoded.height() as usize;

        // printpdf expects raw RGB8 pixel data.
        let rgb = decoded.to_rgb8();
        let raw = RawImage {
            pixels: RawImageData::U8(rgb.into_raw()),
            width: img_width,
            height: img_height,
            data_format: RawImageFormat::RGB8,
            tag: Vec::new(),
        };

        let title = self.title.as_deref().unwrap_or("Converted image");
        let mut doc = PdfDocument::new(title);
        let image_id = doc.add_image(&raw);

        let usable_w_pt = Mm(PAGE_W_MM - 2.0 * MARGIN_MM).into_pt().0;
        let usable_h_pt = Mm(PAGE_H_MM - 2.0 * MARGIN_MM).into_pt().0;

        // Image native size at the render DPI.
        let img_w_pt = img_width as f32 / RENDER_DPI * 72.0;
        let img_h_pt = img_height as f32 / RENDER_DPI * 72.0;

        // Scale to fit while preserving aspect ratio; never upscale.
        let scale = (usable_w_pt / img_w_pt)
            .min(usable_h_pt / img_h_pt)
            .min(1.0);

        let rendered_w_pt = img_w_pt * scale;
        let rendered_h_pt = img_h_pt * scale;

        // Centre within the usable area.
        let margin_pt = Mm(MARGIN_MM).into_pt().0;
        let x_offset = margin_pt + (usable_w_pt - rendered_w_pt) / 2.0;
        let y_offset = margin_pt + (usable_h_pt - rendered_h_pt) / 2.0;

        let ops = vec![Op::UseXobject {
            id: image_id,
            transform: XObjectTransform {
                translate_x: Some(Pt(x_offset)),
                translate_y: Some(Pt(y_offset)),
                scale_x: Some(scale),
                scale_y: Some(scale),
                dpi: Some(RENDER_DPI),
                rotate: None,
            },
        }];

        doc.with_pages(vec![PdfPage::new(Mm(PAGE_W_MM), Mm(PAGE_H_MM), ops)]);

        debug!(img_width, img_height, scale, "image placed on A4 page");

        let mut warnings: Vec<PdfWarnMsg> = Vec::new();
        Ok(doc.save(&PdfSaveOptions::default(), &mut warnings))
    }
}

impl Default for ImageToPdf {
    fn default() -> Self {
        Self::new()
    }
}
