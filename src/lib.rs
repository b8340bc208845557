// Allow some clippy lints that are too pedantic for this project
#![allow(clippy::too_many_arguments)]
#![allow(clippy::enum_variant_names)]
#![allow(clippy::match_like_matches_macro)]

//! # WMS DocGen
//!
//! Warehouse document engine: inbound shipment receipts with product label
//! sheets, and outbound picking lists, rendered straight to PDF.
//!
//! ## Core Features
//!
//! - **Streaming output**: pages are written to any `io::Write` sink as soon
//!   as they are finished
//! - **Symbologies**: QR codes and Code 128 bars embedded as image XObjects,
//!   Code 128 captions as real text
//! - **Fixed layouts**: every coordinate lives in [`layout::LayoutConfig`];
//!   the label sheet pagination rule is exact and independently testable
//! - **Pagination policies**: legacy overflow (default) or strict table paging
//! - **Fonts**: Base-14 Helvetica, or one TrueType font embedded once per process
//! - **Cancellation**: caller token and deadline checked per record and per page
//!
//! ## Architecture
//!
//! ```text
//! model (JSON intake) → pipeline (DocumentEngine)
//!     → layout (composers) → writer (PageCanvas → PdfWriter) → sink
//! ```
//!
//! ## Quick Start
//!
//! ```
//! use wms_docgen::{DocumentEngine, DocumentRequest, EngineConfig, LineItem};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let engine = DocumentEngine::new(EngineConfig::default())?;
//! let request = DocumentRequest::Inbound {
//!     items: vec![LineItem {
//!         id: "P1".into(),
//!         name: "Widget".into(),
//!         quantity: 10.0,
//!         unit_weight: 2.5,
//!     }],
//! };
//!
//! let (doc, pdf) = engine.generate_to_vec(&request)?;
//! assert_eq!(doc.page_count(), 2);
//! assert!(pdf.starts_with(b"%PDF"));
//! # Ok(())
//! # }
//! ```
//!
//! ## License
//!
//! Licensed under either of:
//!
//! * Apache License, Version 2.0 ([LICENSE-APACHE](LICENSE-APACHE) or <http://www.apache.org/licenses/LICENSE-2.0>)
//! * MIT license ([LICENSE-MIT](LICENSE-MIT) or <http://opensource.org/licenses/MIT>)
//!
//! at your option.

#![warn(missing_docs)]
#![cfg_attr(docsrs, feature(doc_cfg))]

// Error handling
pub mod error;

// PDF object model
pub mod object;

// Page geometry
pub mod geometry;

// Request records
pub mod model;

// Document composition
pub mod layout;

// Generation pipeline
pub mod pipeline;

// PDF writing
pub mod writer;

// Configuration
pub mod config;

// Re-exports
pub use config::EngineConfig;
pub use error::{DocumentGenerationError, EncodingError, Error, Result};
pub use layout::{DocumentStamp, LayoutConfig, PaginationPolicy};
pub use model::{CartLine, DocumentRequest, LineItem, TotalWeight};
pub use pipeline::{CancelHandle, DocumentEngine, DocumentKind};
pub use writer::{GeneratedDocument, PageRecord, SymbolKind};

// Version info
/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");
