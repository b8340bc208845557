//! PDF content stream builder.
//!
//! Builds PDF content streams containing graphics and text operators
//! according to PDF specification ISO 32000-1:2008 Section 8-9.
//! Coordinates given to the builder are already in PDF user space
//! (bottom-left origin); the canvas does the flip.

use super::object_serializer::{write_escaped_bytes, write_real};
use crate::geometry::Color;
use std::io::{self, Write};

/// Operations that can be added to a content stream.
#[derive(Debug, Clone, PartialEq)]
pub enum ContentStreamOp {
    /// Save graphics state (q)
    SaveState,
    /// Restore graphics state (Q)
    RestoreState,
    /// Set transformation matrix (cm)
    Transform(f32, f32, f32, f32, f32, f32),
    /// Begin text object (BT)
    BeginText,
    /// End text object (ET)
    EndText,
    /// Set font resource and size (Tf)
    SetFont(String, f32),
    /// Set text matrix (Tm)
    SetTextMatrix(f32, f32, f32, f32, f32, f32),
    /// Show text (Tj) - single-byte encoded literal string
    ShowText(Vec<u8>),
    /// Show glyph ids (Tj) - two-byte Identity-H hex string
    ShowGlyphs(Vec<u16>),
    /// Set fill color RGB (rg)
    SetFillColorRGB(f32, f32, f32),
    /// Set stroke color RGB (RG)
    SetStrokeColorRGB(f32, f32, f32),
    /// Set line width (w)
    SetLineWidth(f32),
    /// Move to (m)
    MoveTo(f32, f32),
    /// Line to (l)
    LineTo(f32, f32),
    /// Curve to (c)
    CurveTo(f32, f32, f32, f32, f32, f32),
    /// Rectangle (re)
    Rectangle(f32, f32, f32, f32),
    /// Close path (h)
    ClosePath,
    /// Stroke (S)
    Stroke,
    /// Fill (f)
    Fill,
    /// Paint XObject (Do)
    PaintXObject(String),
}

/// Builder for PDF content streams.
#[derive(Debug, Default)]
pub struct ContentStreamBuilder {
    /// Operations in the stream
    operations: Vec<ContentStreamOp>,
    /// Current font resource name
    current_font: Option<String>,
    /// Current font size
    current_font_size: f32,
    /// Current non-stroking color
    current_fill: Option<Color>,
    /// Current stroking color
    current_stroke: Option<Color>,
    /// Whether we're in a text object
    in_text_object: bool,
}

impl ContentStreamBuilder {
    /// Create a new content stream builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an operation to the stream.
    pub fn op(&mut self, op: ContentStreamOp) -> &mut Self {
        self.operations.push(op);
        self
    }

    /// Operations recorded so far.
    pub fn operations(&self) -> &[ContentStreamOp] {
        &self.operations
    }

    /// True when nothing has been drawn.
    pub fn is_empty(&self) -> bool {
        self.operations.is_empty()
    }

    /// Begin a text object.
    pub fn begin_text(&mut self) -> &mut Self {
        if !self.in_text_object {
            self.op(ContentStreamOp::BeginText);
            self.in_text_object = true;
        }
        self
    }

    /// End a text object.
    pub fn end_text(&mut self) -> &mut Self {
        if self.in_text_object {
            self.op(ContentStreamOp::EndText);
            self.in_text_object = false;
        }
        self
    }

    /// Set font for text operations. Repeated identical calls are dropped.
    pub fn set_font(&mut self, resource: &str, size: f32) -> &mut Self {
        if self.current_font.as_deref() != Some(resource) || self.current_font_size != size {
            self.begin_text();
            self.op(ContentStreamOp::SetFont(resource.to_string(), size));
            self.current_font = Some(resource.to_string());
            self.current_font_size = size;
        }
        self
    }

    /// Show single-byte encoded text with its baseline origin at (x, y).
    pub fn text(&mut self, encoded: Vec<u8>, x: f32, y: f32) -> &mut Self {
        self.begin_text();
        self.op(ContentStreamOp::SetTextMatrix(1.0, 0.0, 0.0, 1.0, x, y));
        self.op(ContentStreamOp::ShowText(encoded))
    }

    /// Show glyph ids of a composite font with its baseline origin at (x, y).
    pub fn glyphs(&mut self, glyph_ids: Vec<u16>, x: f32, y: f32) -> &mut Self {
        self.begin_text();
        self.op(ContentStreamOp::SetTextMatrix(1.0, 0.0, 0.0, 1.0, x, y));
        self.op(ContentStreamOp::ShowGlyphs(glyph_ids))
    }

    /// Set fill color. Redundant changes are skipped.
    pub fn fill_color(&mut self, color: Color) -> &mut Self {
        if self.current_fill != Some(color) {
            let (r, g, b) = color.components();
            self.op(ContentStreamOp::SetFillColorRGB(r, g, b));
            self.current_fill = Some(color);
        }
        self
    }

    /// Set stroke color. Redundant changes are skipped.
    pub fn stroke_color(&mut self, color: Color) -> &mut Self {
        if self.current_stroke != Some(color) {
            let (r, g, b) = color.components();
            self.op(ContentStreamOp::SetStrokeColorRGB(r, g, b));
            self.current_stroke = Some(color);
        }
        self
    }

    /// Draw an image XObject at the specified position and size.
    ///
    /// `x`/`y` are the lower-left corner in PDF user space.
    pub fn draw_image(&mut self, resource_id: &str, x: f32, y: f32, width: f32, height: f32) -> &mut Self {
        self.end_text();
        self.op(ContentStreamOp::SaveState);
        self.op(ContentStreamOp::Transform(width, 0.0, 0.0, height, x, y));
        self.op(ContentStreamOp::PaintXObject(resource_id.to_string()));
        self.op(ContentStreamOp::RestoreState)
    }

    /// Set line width.
    pub fn set_line_width(&mut self, width: f32) -> &mut Self {
        self.op(ContentStreamOp::SetLineWidth(width))
    }

    /// Move to a point (start a new subpath).
    pub fn move_to(&mut self, x: f32, y: f32) -> &mut Self {
        self.op(ContentStreamOp::MoveTo(x, y))
    }

    /// Draw a line to a point.
    pub fn line_to(&mut self, x: f32, y: f32) -> &mut Self {
        self.op(ContentStreamOp::LineTo(x, y))
    }

    /// Append a cubic Bézier segment.
    pub fn curve_to(&mut self, x1: f32, y1: f32, x2: f32, y2: f32, x3: f32, y3: f32) -> &mut Self {
        self.op(ContentStreamOp::CurveTo(x1, y1, x2, y2, x3, y3))
    }

    /// Draw a rectangle.
    pub fn rect(&mut self, x: f32, y: f32, width: f32, height: f32) -> &mut Self {
        self.end_text();
        self.op(ContentStreamOp::Rectangle(x, y, width, height))
    }

    /// Close the current subpath.
    pub fn close_path(&mut self) -> &mut Self {
        self.op(ContentStreamOp::ClosePath)
    }

    /// Stroke the current path.
    pub fn stroke(&mut self) -> &mut Self {
        self.op(ContentStreamOp::Stroke)
    }

    /// Fill the current path.
    pub fn fill(&mut self) -> &mut Self {
        self.op(ContentStreamOp::Fill)
    }

    /// Draw a rounded rectangle path; (x, y) is the lower-left corner.
    pub fn rounded_rect(&mut self, x: f32, y: f32, width: f32, height: f32, radius: f32) -> &mut Self {
        let r = radius.min(width / 2.0).min(height / 2.0).max(0.0);
        if r == 0.0 {
            return self.rect(x, y, width, height);
        }
        let k = r * 0.552_284_8;

        self.end_text();
        self.move_to(x + r, y)
            .line_to(x + width - r, y)
            .curve_to(x + width - r + k, y, x + width, y + r - k, x + width, y + r)
            .line_to(x + width, y + height - r)
            .curve_to(x + width, y + height - r + k, x + width - r + k, y + height, x + width - r, y + height)
            .line_to(x + r, y + height)
            .curve_to(x + r - k, y + height, x, y + height - r + k, x, y + height - r)
            .line_to(x, y + r)
            .curve_to(x, y + r - k, x + r - k, y, x + r, y)
            .close_path()
    }

    /// Build the content stream to bytes.
    pub fn build(&self) -> io::Result<Vec<u8>> {
        let mut buf = Vec::new();

        for op in &self.operations {
            write_op(&mut buf, op)?;
            writeln!(buf)?;
        }
        if self.in_text_object {
            writeln!(buf, "ET")?;
        }

        Ok(buf)
    }
}

fn write_numbers<W: Write>(w: &mut W, values: &[f32]) -> io::Result<()> {
    for value in values {
        write_real(w, *value as f64)?;
        write!(w, " ")?;
    }
    Ok(())
}

/// Write a single operation.
fn write_op<W: Write>(w: &mut W, op: &ContentStreamOp) -> io::Result<()> {
    match op {
        ContentStreamOp::SaveState => write!(w, "q"),
        ContentStreamOp::RestoreState => write!(w, "Q"),
        ContentStreamOp::Transform(a, b, c, d, e, f) => {
            write_numbers(w, &[*a, *b, *c, *d, *e, *f])?;
            write!(w, "cm")
        },
        ContentStreamOp::BeginText => write!(w, "BT"),
        ContentStreamOp::EndText => write!(w, "ET"),
        ContentStreamOp::SetFont(name, size) => {
            write!(w, "/{} ", name)?;
            write_numbers(w, &[*size])?;
            write!(w, "Tf")
        },
        ContentStreamOp::SetTextMatrix(a, b, c, d, e, f) => {
            write_numbers(w, &[*a, *b, *c, *d, *e, *f])?;
            write!(w, "Tm")
        },
        ContentStreamOp::ShowText(bytes) => {
            write!(w, "(")?;
            write_escaped_bytes(w, bytes)?;
            write!(w, ") Tj")
        },
        ContentStreamOp::ShowGlyphs(glyphs) => {
            write!(w, "<")?;
            for gid in glyphs {
                write!(w, "{:04X}", gid)?;
            }
            write!(w, "> Tj")
        },
        ContentStreamOp::SetFillColorRGB(r, g, b) => {
            write_numbers(w, &[*r, *g, *b])?;
            write!(w, "rg")
        },
        ContentStreamOp::SetStrokeColorRGB(r, g, b) => {
            write_numbers(w, &[*r, *g, *b])?;
            write!(w, "RG")
        },
        ContentStreamOp::SetLineWidth(width) => {
            write_numbers(w, &[*width])?;
            write!(w, "w")
        },
        ContentStreamOp::MoveTo(x, y) => {
            write_numbers(w, &[*x, *y])?;
            write!(w, "m")
        },
        ContentStreamOp::LineTo(x, y) => {
            write_numbers(w, &[*x, *y])?;
            write!(w, "l")
        },
        ContentStreamOp::CurveTo(x1, y1, x2, y2, x3, y3) => {
            write_numbers(w, &[*x1, *y1, *x2, *y2, *x3, *y3])?;
            write!(w, "c")
        },
        ContentStreamOp::Rectangle(x, y, width, height) => {
            write_numbers(w, &[*x, *y, *width, *height])?;
            write!(w, "re")
        },
        ContentStreamOp::ClosePath => write!(w, "h"),
        ContentStreamOp::Stroke => write!(w, "S"),
        ContentStreamOp::Fill => write!(w, "f"),
        ContentStreamOp::PaintXObject(name) => write!(w, "/{} Do", name),
    }
}
