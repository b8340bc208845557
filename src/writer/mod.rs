//! PDF writing module: the page canvas and everything beneath it.
//!
//! ## Architecture
//!
//! ```text
//! composer draw calls
//!     ↓
//! [PageCanvas] (top-left coordinates → resolved DrawOps + content stream)
//!     ↓                     ↑
//! [ContentStreamBuilder]    [barcode::encode] (payload → EncodedSymbol)
//!     ↓
//! [PdfWriter] (streams pages, then fonts/xref/trailer)
//!     ↓
//! [ObjectSerializer] (serializes PDF objects)
//!     ↓
//! io::Write sink
//! ```
//!
//! ## Example
//!
//! ```
//! use std::sync::Arc;
//! use wms_docgen::geometry::Color;
//! use wms_docgen::writer::{CanvasOptions, FontResource, PageCanvas, TextStyle};
//!
//! let mut canvas = PageCanvas::new(Vec::new(), Arc::new(FontResource::standard()), CanvasOptions::default());
//! canvas.fill_rect(0.0, 0.0, 595.0, 115.0, Color::hex(0x1e293b))?;
//! canvas.draw_text("INBOUND SHIPMENT RECEIPT", 40.0, 35.0, &TextStyle::new(24.0).with_color(Color::WHITE))?;
//! let doc = canvas.finalize()?;
//! assert_eq!(doc.page_count(), 1);
//! # Ok::<(), wms_docgen::Error>(())
//! ```

pub mod barcode;
pub mod canvas;
mod content_stream;
pub mod font_manager;
pub mod image_handler;
mod object_serializer;
mod pdf_writer;

pub use barcode::{encode, EncodedSymbol, QrErrorCorrection, SymbolKind, SymbolOptions};
pub use canvas::{
    CanvasOptions, Checkpoint, DrawOp, GeneratedDocument, PageCanvas, PageRecord, PageState,
    TextAlign, TextStyle,
};
pub use content_stream::{ContentStreamBuilder, ContentStreamOp};
pub use font_manager::{global_font, load_global_font, EmbeddedFont, FontFace, FontResource};
pub use image_handler::{ColorSpace, ImageData, ImageError};
pub use object_serializer::ObjectSerializer;
pub use pdf_writer::{PageImage, PdfWriter, PdfWriterConfig};
