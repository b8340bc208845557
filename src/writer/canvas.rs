//! Page canvas: absolute drawing on fixed-size pages, streamed page by page.
//!
//! Coordinates are points with the origin at the top-left of the current
//! page. Every call is applied in order, recorded as a resolved [`DrawOp`]
//! and emitted into the page's content stream. [`PageCanvas::add_page`]
//! streams the finished page to the sink; [`PageCanvas::finalize`] streams the
//! last page plus the document trailer and closes the canvas for good.

use std::io::Write;
use std::sync::Arc;

use super::barcode::{EncodedSymbol, SymbolKind};
use super::content_stream::ContentStreamBuilder;
use super::font_manager::{EncodedText, FontFace, FontResource, GlyphUsage};
use super::image_handler::ImageData;
use super::pdf_writer::{PageImage, PdfWriter, PdfWriterConfig};
use crate::error::{DocumentGenerationError, Error, Result};
use crate::geometry::{Color, Rect};

/// Horizontal alignment of a text run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TextAlign {
    /// Left edge at `x`
    #[default]
    Start,
    /// Centred on `x` (or within `max_width`)
    Center,
    /// Right edge at `x` (or at `x + max_width`)
    End,
}

/// Text run styling.
#[derive(Debug, Clone, PartialEq)]
pub struct TextStyle {
    /// Font size in points
    pub font_size: f32,
    /// Fill color
    pub color: Color,
    /// Alignment
    pub align: TextAlign,
    /// Wrap box width
    pub max_width: Option<f32>,
    /// Bold face
    pub bold: bool,
}

impl Default for TextStyle {
    fn default() -> Self {
        Self {
            font_size: 12.0,
            color: Color::BLACK,
            align: TextAlign::Start,
            max_width: None,
            bold: false,
        }
    }
}

impl TextStyle {
    /// Regular text at `font_size`.
    pub fn new(font_size: f32) -> Self {
        Self {
            font_size,
            ..Self::default()
        }
    }

    /// Set the fill color.
    pub fn with_color(mut self, color: Color) -> Self {
        self.color = color;
        self
    }

    /// Set the alignment.
    pub fn with_align(mut self, align: TextAlign) -> Self {
        self.align = align;
        self
    }

    /// Wrap inside a box of this width.
    pub fn with_max_width(mut self, width: f32) -> Self {
        self.max_width = Some(width);
        self
    }

    /// Use the bold face.
    pub fn bold(mut self) -> Self {
        self.bold = true;
        self
    }

    fn face(&self) -> FontFace {
        if self.bold {
            FontFace::Bold
        } else {
            FontFace::Regular
        }
    }
}

/// A draw operation resolved to absolute page coordinates.
#[derive(Debug, Clone, PartialEq)]
pub enum DrawOp {
    /// Filled rectangle
    FillRect {
        /// Area
        rect: Rect,
        /// Fill color
        color: Color,
    },
    /// Stroked rectangle, optionally with rounded corners
    StrokeRect {
        /// Outline
        rect: Rect,
        /// Corner radius (0 for square corners)
        radius: f32,
        /// Stroke color
        color: Color,
    },
    /// One laid-out line of text
    Text {
        /// Line content
        text: String,
        /// Left edge after alignment
        x: f32,
        /// Top of the line box
        y: f32,
        /// Advance width of the line
        width: f32,
        /// Font size
        font_size: f32,
        /// Fill color
        color: Color,
        /// Bold face
        bold: bool,
    },
    /// Placed raster
    Image {
        /// Placement
        rect: Rect,
        /// Symbology when the raster is an encoded symbol
        symbol: Option<SymbolKind>,
    },
}

/// The draw operations of one finished page, in call order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PageRecord {
    /// Zero-based page index
    pub index: usize,
    /// Operations in call order
    pub ops: Vec<DrawOp>,
}

impl PageRecord {
    /// Text lines drawn on the page.
    pub fn texts(&self) -> impl Iterator<Item = &str> {
        self.ops.iter().filter_map(|op| match op {
            DrawOp::Text { text, .. } => Some(text.as_str()),
            _ => None,
        })
    }

    /// True when some text line contains `needle`.
    pub fn contains_text(&self, needle: &str) -> bool {
        self.texts().any(|t| t.contains(needle))
    }

    /// Placements of symbols of one kind.
    pub fn symbols(&self, kind: SymbolKind) -> impl Iterator<Item = &Rect> {
        self.ops.iter().filter_map(move |op| match op {
            DrawOp::Image {
                rect,
                symbol: Some(k),
            } if *k == kind => Some(rect),
            _ => None,
        })
    }
}

/// Result of a finished render: the display list of every page.
///
/// The PDF bytes themselves went to the sink as pages were finalised.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct GeneratedDocument {
    /// Pages in order
    pub pages: Vec<PageRecord>,
    /// Total bytes written to the sink
    pub byte_len: u64,
}

impl GeneratedDocument {
    /// Number of pages.
    pub fn page_count(&self) -> usize {
        self.pages.len()
    }
}

/// Drawing state of the page currently open.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageState {
    /// Cursor x
    pub cursor_x: f32,
    /// Cursor y
    pub cursor_y: f32,
    /// Zero-based index of the open page
    pub page_index: usize,
    /// Lowest y reached by any drawing on this page
    pub content_bottom: f32,
}

/// Cancellation / deadline hook consulted before records and page flushes.
pub trait Checkpoint {
    /// Fail when the render must stop.
    fn check(&self) -> Result<()>;
}

/// Page geometry and output settings for a canvas.
#[derive(Debug, Clone)]
pub struct CanvasOptions {
    /// Page width in points
    pub page_width: f32,
    /// Page height in points
    pub page_height: f32,
    /// Cursor y after `add_page`
    pub top_margin: f32,
    /// Stroke width for outlines
    pub line_width: f32,
    /// PDF writer settings
    pub writer: PdfWriterConfig,
}

impl Default for CanvasOptions {
    fn default() -> Self {
        Self {
            page_width: 595.0,
            page_height: 842.0,
            top_margin: 50.0,
            line_width: 1.0,
            writer: PdfWriterConfig::default(),
        }
    }
}

/// Single-writer drawing surface bound to one document.
pub struct PageCanvas<W: Write> {
    writer: Option<PdfWriter<W>>,
    sink: Option<W>,
    font: Arc<FontResource>,
    options: CanvasOptions,
    checkpoint: Option<Box<dyn Checkpoint>>,
    state: PageState,
    content: ContentStreamBuilder,
    images: Vec<PageImage>,
    ops: Vec<DrawOp>,
    pages: Vec<PageRecord>,
    glyphs: GlyphUsage,
    bytes_written: u64,
}

impl<W: Write> PageCanvas<W> {
    /// Open a canvas with its first page.
    pub fn new(sink: W, font: Arc<FontResource>, options: CanvasOptions) -> Self {
        let writer = PdfWriter::new(sink, options.writer.clone(), font.resource_names());
        Self {
            writer: Some(writer),
            sink: None,
            font,
            options,
            checkpoint: None,
            state: PageState {
                cursor_x: 0.0,
                cursor_y: 0.0,
                page_index: 0,
                content_bottom: 0.0,
            },
            content: ContentStreamBuilder::new(),
            images: Vec::new(),
            ops: Vec::new(),
            pages: Vec::new(),
            glyphs: GlyphUsage::new(),
            bytes_written: 0,
        }
    }

    /// Install a cancellation / deadline hook.
    pub fn with_checkpoint(mut self, checkpoint: impl Checkpoint + 'static) -> Self {
        self.checkpoint = Some(Box::new(checkpoint));
        self
    }

    /// Page geometry.
    pub fn options(&self) -> &CanvasOptions {
        &self.options
    }

    /// The font all text is drawn with.
    pub fn font(&self) -> &FontResource {
        &self.font
    }

    /// State of the open page.
    pub fn state(&self) -> &PageState {
        &self.state
    }

    /// Move the cursor.
    pub fn set_cursor(&mut self, x: f32, y: f32) {
        self.state.cursor_x = x;
        self.state.cursor_y = y;
    }

    /// Operations recorded on the open page so far.
    pub fn current_ops(&self) -> &[DrawOp] {
        &self.ops
    }

    /// Bytes already written to the sink.
    pub fn bytes_written(&self) -> u64 {
        self.writer
            .as_ref()
            .map(|w| w.bytes_written())
            .unwrap_or(self.bytes_written)
    }

    /// True once `finalize` has been called.
    pub fn is_closed(&self) -> bool {
        self.writer.is_none()
    }

    /// Run the cancellation / deadline hook.
    pub fn checkpoint(&self) -> Result<()> {
        match &self.checkpoint {
            Some(cp) => cp.check(),
            None => Ok(()),
        }
    }

    /// Wrap an error with the number of bytes already streamed.
    pub fn failure(&self, source: Error) -> DocumentGenerationError {
        DocumentGenerationError::new(source, self.bytes_written())
    }

    fn ensure_open(&self) -> Result<()> {
        if self.writer.is_none() {
            return Err(Error::CanvasClosed);
        }
        Ok(())
    }

    fn pdf_y(&self, y: f32, height: f32) -> f32 {
        self.options.page_height - y - height
    }

    fn record(&mut self, op: DrawOp, bottom: f32) {
        self.state.content_bottom = self.state.content_bottom.max(bottom);
        self.ops.push(op);
    }

    /// Fill an axis-aligned rectangle.
    pub fn fill_rect(&mut self, x: f32, y: f32, w: f32, h: f32, color: Color) -> Result<()> {
        self.ensure_open()?;
        let pdf_y = self.pdf_y(y, h);
        self.content.fill_color(color).rect(x, pdf_y, w, h).fill();
        let rect = Rect::new(x, y, w, h);
        self.record(DrawOp::FillRect { rect, color }, rect.bottom());
        Ok(())
    }

    /// Stroke an axis-aligned rectangle.
    pub fn stroke_rect(&mut self, x: f32, y: f32, w: f32, h: f32, color: Color) -> Result<()> {
        self.stroke_rounded_rect(x, y, w, h, 0.0, color)
    }

    /// Stroke a rectangle with rounded corners.
    pub fn stroke_rounded_rect(
        &mut self,
        x: f32,
        y: f32,
        w: f32,
        h: f32,
        radius: f32,
        color: Color,
    ) -> Result<()> {
        self.ensure_open()?;
        let pdf_y = self.pdf_y(y, h);
        let line_width = self.options.line_width;
        self.content
            .stroke_color(color)
            .set_line_width(line_width)
            .rounded_rect(x, pdf_y, w, h, radius)
            .stroke();
        let rect = Rect::new(x, y, w, h);
        self.record(DrawOp::StrokeRect { rect, radius, color }, rect.bottom());
        Ok(())
    }

    /// Draw text whose first line box has its top at `y`.
    ///
    /// Returns the height of the laid-out block.
    pub fn draw_text(&mut self, text: &str, x: f32, y: f32, style: &TextStyle) -> Result<f32> {
        self.ensure_open()?;

        let face = style.face();
        let size = style.font_size;
        let lines: Vec<String> = match style.max_width {
            Some(max_width) => self.font.wrap_text(text, size, face, max_width),
            None => text.split('\n').map(str::to_string).collect(),
        };
        let advance = self.font.line_height(size) * self.font.line_spacing_factor();
        let ascent = self.font.ascent(size);
        let resource = self.font.resource_name(face);

        for (i, line) in lines.iter().enumerate() {
            if line.is_empty() {
                continue;
            }
            let width = self.font.text_width(line, size, face);
            let left = match (style.align, style.max_width) {
                (TextAlign::Start, _) => x,
                (TextAlign::Center, Some(box_width)) => x + (box_width - width) / 2.0,
                (TextAlign::End, Some(box_width)) => x + box_width - width,
                (TextAlign::Center, None) => x - width / 2.0,
                (TextAlign::End, None) => x - width,
            };
            let top = y + i as f32 * advance;
            let baseline = self.options.page_height - (top + ascent);

            self.content.fill_color(style.color).set_font(resource, size);
            match self.font.encode(line, &mut self.glyphs) {
                EncodedText::Bytes(bytes) => self.content.text(bytes, left, baseline),
                EncodedText::Glyphs(glyphs) => self.content.glyphs(glyphs, left, baseline),
            };

            self.record(
                DrawOp::Text {
                    text: line.clone(),
                    x: left,
                    y: top,
                    width,
                    font_size: size,
                    color: style.color,
                    bold: style.bold,
                },
                top + advance,
            );
        }

        Ok(lines.len() as f32 * advance)
    }

    fn place_image(
        &mut self,
        data: ImageData,
        x: f32,
        y: f32,
        w: f32,
        h: f32,
        symbol: Option<SymbolKind>,
    ) -> Rect {
        let name = format!("Im{}", self.images.len() + 1);
        let pdf_y = self.pdf_y(y, h);
        self.content.draw_image(&name, x, pdf_y, w, h);
        self.images.push(PageImage { name, data });

        let rect = Rect::new(x, y, w, h);
        self.record(DrawOp::Image { rect, symbol }, rect.bottom());
        rect
    }

    /// Place a PNG raster. Without `height` the aspect ratio is preserved.
    pub fn draw_image(&mut self, png: &[u8], x: f32, y: f32, width: f32, height: Option<f32>) -> Result<Rect> {
        self.ensure_open()?;
        let data = ImageData::from_png(png)?;
        let (w, h) = data.display_size(width, height);
        Ok(self.place_image(data, x, y, w, h, None))
    }

    /// Place an encoded symbol and print its caption in the reserved band.
    pub fn draw_symbol(
        &mut self,
        symbol: &EncodedSymbol,
        x: f32,
        y: f32,
        width: f32,
        height: Option<f32>,
    ) -> Result<Rect> {
        self.ensure_open()?;
        let data = ImageData::from_gray(symbol.pixel_width, symbol.pixel_height, &symbol.pixels)?;
        let (w, h) = data.display_size(width, height);
        let rect = self.place_image(data, x, y, w, h, Some(symbol.kind));

        if let Some(caption) = &symbol.caption {
            let band = symbol.caption_band as f32 * h / symbol.pixel_height as f32;
            let size = (band * 0.8).max(4.0);
            let top = rect.bottom() - band + (band - self.font.line_height(size)) / 2.0;
            let style = TextStyle::new(size).with_align(TextAlign::Center).with_max_width(w);
            self.draw_text(caption, x, top, &style)?;
        }

        Ok(rect)
    }

    fn flush_page(&mut self) -> Result<()> {
        self.checkpoint()?;

        let content = self.content.build()?;
        let images = std::mem::take(&mut self.images);
        let writer = self.writer.as_mut().ok_or(Error::CanvasClosed)?;
        writer.write_page(self.options.page_width, self.options.page_height, &content, &images)?;

        log::debug!(
            "Finalised page {} ({} ops, {} bytes streamed)",
            self.state.page_index,
            self.ops.len(),
            writer.bytes_written()
        );

        self.pages.push(PageRecord {
            index: self.state.page_index,
            ops: std::mem::take(&mut self.ops),
        });
        self.content = ContentStreamBuilder::new();
        Ok(())
    }

    /// Close the current page for good and open a fresh one.
    pub fn add_page(&mut self) -> Result<()> {
        self.ensure_open()?;
        self.flush_page()?;
        self.state = PageState {
            cursor_x: 0.0,
            cursor_y: self.options.top_margin,
            page_index: self.state.page_index + 1,
            content_bottom: 0.0,
        };
        Ok(())
    }

    /// Stream the last page and the document trailer. Only callable once.
    pub fn finalize(&mut self) -> Result<GeneratedDocument> {
        self.ensure_open()?;
        self.flush_page()?;

        let writer = self.writer.take().ok_or(Error::CanvasClosed)?;
        self.bytes_written = writer.bytes_written();
        let (sink, total) = writer.finish(&self.font, &self.glyphs)?;
        self.bytes_written = total;
        self.sink = Some(sink);

        Ok(GeneratedDocument {
            pages: std::mem::take(&mut self.pages),
            byte_len: self.bytes_written,
        })
    }

    /// The sink, once the document has been finalised.
    pub fn into_sink(self) -> Option<W> {
        self.sink
    }
}
