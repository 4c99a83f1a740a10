// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// stapel-document — Concrete document transforms for the Stapel pipeline.
//
// Provides PDF compression (object pruning, stream re-compression, metadata
// stripping), form flattening (AcroForm and annotation removal), and
// image-to-PDF conversion. Each operation is a pure bytes-in/bytes-out
// function; queue and lifecycle concerns live in `stapel-batch`.

pub mod compress;
pub mod convert;
pub mod flatten;

pub use compress::PdfCompressor;
pub use convert::ImageToPdf;
pub use flatten::FormFlattener;
