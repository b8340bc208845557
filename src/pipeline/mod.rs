//! Document generation pipeline.
//!
//! ```text
//! JSON body / DocumentRequest
//!     ↓
//! [model] (normalise records)
//!     ↓
//! [DocumentEngine] (stamp, canvas, cancellation)
//!     ↓
//! [layout::compose_inbound | layout::compose_outbound]
//!     ↓
//! PDF bytes streamed to the sink page by page
//! ```
//!
//! Pages reach the sink as soon as they are finished. A failure is always
//! reported as a [`DocumentGenerationError`]; when its `bytes_emitted` is
//! non-zero the caller already holds a truncated document and has to abort
//! the transfer instead of answering with an error body.

mod cancel;

pub use cancel::CancelHandle;

use std::fmt;
use std::io::Write;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Instant;

use cancel::RenderGuard;

use crate::config::EngineConfig;
use crate::error::{DocumentGenerationError, Error, Result};
use crate::layout::{compose_inbound, compose_outbound, DocumentStamp, INBOUND_PREFIX, OUTBOUND_PREFIX};
use crate::model::DocumentRequest;
use crate::writer::{load_global_font, CanvasOptions, FontResource, GeneratedDocument, PageCanvas, PdfWriterConfig};

/// The two documents the engine produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DocumentKind {
    /// Inbound shipment receipt with product labels
    Inbound,
    /// Outbound picking list
    Outbound,
}

impl DocumentKind {
    /// MIME type of the output.
    pub fn content_type(&self) -> &'static str {
        "application/pdf"
    }

    /// Suggested download name.
    pub fn file_name(&self) -> &'static str {
        match self {
            DocumentKind::Inbound => "receipt.pdf",
            DocumentKind::Outbound => "outbound-order.pdf",
        }
    }

    /// Identifier prefix.
    pub fn id_prefix(&self) -> &'static str {
        match self {
            DocumentKind::Inbound => INBOUND_PREFIX,
            DocumentKind::Outbound => OUTBOUND_PREFIX,
        }
    }

    fn title(&self) -> &'static str {
        match self {
            DocumentKind::Inbound => "Inbound Shipment Receipt",
            DocumentKind::Outbound => "Outbound Order",
        }
    }
}

impl fmt::Display for DocumentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DocumentKind::Inbound => write!(f, "inbound"),
            DocumentKind::Outbound => write!(f, "outbound"),
        }
    }
}

impl FromStr for DocumentKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "inbound" | "receipt" => Ok(DocumentKind::Inbound),
            "outbound" | "order" => Ok(DocumentKind::Outbound),
            other => Err(format!("unknown document kind: {}", other)),
        }
    }
}

/// Renders requests into PDF byte streams.
///
/// The engine holds no per-document state; one instance can serve any number
/// of concurrent `generate` calls.
///
/// # Examples
///
/// ```
/// use wms_docgen::{DocumentEngine, DocumentKind, EngineConfig};
///
/// let engine = DocumentEngine::new(EngineConfig::default())?;
/// let body = br#"{"items":[{"id":"P1","name":"Widget","qty":10,"weight":2.5}]}"#;
/// let mut pdf = Vec::new();
/// let doc = engine.generate_json(DocumentKind::Inbound, body, &mut pdf)?;
/// assert_eq!(doc.page_count(), 2);
/// assert!(pdf.starts_with(b"%PDF-1.7"));
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
#[derive(Debug, Clone)]
pub struct DocumentEngine {
    config: EngineConfig,
    font: Arc<FontResource>,
}

impl DocumentEngine {
    /// Engine using the process-wide font, loading it on first use.
    pub fn new(config: EngineConfig) -> Result<Self> {
        let font = load_global_font(config.font_path.as_deref())?;
        Ok(Self { config, font })
    }

    /// Engine with an explicit font resource.
    pub fn with_font(config: EngineConfig, font: Arc<FontResource>) -> Self {
        Self { config, font }
    }

    /// Engine configuration.
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Render `request` into `sink`.
    pub fn generate<W: Write>(
        &self,
        request: &DocumentRequest,
        sink: W,
    ) -> std::result::Result<GeneratedDocument, DocumentGenerationError> {
        self.render(request, sink, None).map(|(doc, _)| doc)
    }

    /// Render `request` into `sink`, stopping when `cancel` is triggered.
    pub fn generate_cancellable<W: Write>(
        &self,
        request: &DocumentRequest,
        sink: W,
        cancel: &CancelHandle,
    ) -> std::result::Result<GeneratedDocument, DocumentGenerationError> {
        self.render(request, sink, Some(cancel.clone())).map(|(doc, _)| doc)
    }

    /// Render `request` into memory.
    pub fn generate_to_vec(
        &self,
        request: &DocumentRequest,
    ) -> std::result::Result<(GeneratedDocument, Vec<u8>), DocumentGenerationError> {
        self.render(request, Vec::new(), None)
    }

    /// Parse an endpoint-shaped JSON body and render it.
    ///
    /// Malformed bodies and invalid records fail before the sink is touched.
    pub fn generate_json<W: Write>(
        &self,
        kind: DocumentKind,
        body: &[u8],
        sink: W,
    ) -> std::result::Result<GeneratedDocument, DocumentGenerationError> {
        let request = DocumentRequest::from_body(kind, body).map_err(|e| {
            log::error!("Rejected {} request: {}", kind, e);
            let record = match &e {
                Error::InvalidRecord { index, .. } => Some(*index),
                _ => None,
            };
            let err = DocumentGenerationError::new(e, 0);
            match record {
                Some(index) => err.at_record(index),
                None => err,
            }
        })?;
        self.generate(&request, sink)
    }

    fn canvas_options(&self, kind: DocumentKind, stamp: &DocumentStamp) -> CanvasOptions {
        let layout = &self.config.layout;
        CanvasOptions {
            page_width: layout.page_width,
            page_height: layout.page_height,
            top_margin: layout.top_margin,
            writer: PdfWriterConfig::default()
                .with_title(format!("{} {}", kind.title(), stamp.id))
                .with_compress(self.config.compress),
            ..CanvasOptions::default()
        }
    }

    fn render<W: Write>(
        &self,
        request: &DocumentRequest,
        sink: W,
        cancel: Option<CancelHandle>,
    ) -> std::result::Result<(GeneratedDocument, W), DocumentGenerationError> {
        let started = Instant::now();
        let kind = request.kind();
        let stamp = DocumentStamp::now(kind.id_prefix());
        log::info!(
            "Generating {} document {} ({} records, {} pagination)",
            kind,
            stamp.id,
            request.record_count(),
            self.config.pagination
        );

        let guard = RenderGuard {
            cancel,
            deadline: self.config.timeout.map(|t| started + t),
        };
        let mut canvas = PageCanvas::new(sink, self.font.clone(), self.canvas_options(kind, &stamp))
            .with_checkpoint(guard);

        let result = match request {
            DocumentRequest::Inbound { items } => compose_inbound(&mut canvas, items, &stamp, &self.config),
            DocumentRequest::Outbound { cart, total_weight } => {
                compose_outbound(&mut canvas, cart, total_weight, &stamp, &self.config)
            },
        };

        let doc = match result {
            Ok(doc) => doc,
            Err(e) => {
                log::error!(
                    "Generation of {} failed (record {:?}, {} bytes already emitted): {}",
                    stamp.id,
                    e.record,
                    e.bytes_emitted,
                    e.source
                );
                return Err(e);
            },
        };

        log::info!(
            "Generated {} in {:?}: {} pages, {} bytes",
            stamp.id,
            started.elapsed(),
            doc.page_count(),
            doc.byte_len
        );

        let byte_len = doc.byte_len;
        let sink = canvas
            .into_sink()
            .ok_or_else(|| DocumentGenerationError::new(Error::CanvasClosed, byte_len))?;
        Ok((doc, sink))
    }
}
