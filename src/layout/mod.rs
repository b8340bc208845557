//! Document composition: the receipt, the label sheet and the picking list.
//!
//! Each routine drives a [`PageCanvas`] from top to bottom:
//! - header band with the document identifier and its QR code
//! - banded item table (optionally paginated, see [`PaginationPolicy`])
//! - signature footer at a fixed position
//! - label blocks (inbound only), paginated by [`LayoutConfig::advance_label`]
//!
//! Symbols are encoded up front, so a payload the encoder rejects fails the
//! document before anything reaches the sink.

pub mod config;
pub mod ids;
pub mod inbound;
pub mod outbound;

pub use config::{LabelAdvance, LayoutConfig, PaginationPolicy, Palette};
pub use ids::{generate_id, DocumentStamp, INBOUND_PREFIX, OUTBOUND_PREFIX};
pub use inbound::compose_inbound;
pub use outbound::compose_outbound;

use std::io::Write;

use crate::error::{DocumentGenerationError, EncodingError, Result};
use crate::geometry::Color;
use crate::writer::{EncodedSymbol, PageCanvas, TextAlign, TextStyle};
use config::NOTE_COLOR;

/// Encode one symbol set per record.
///
/// Records are encoded on the rayon pool when `parallel` is set and the
/// `parallel` feature is enabled. The error reported is always the one of the
/// lowest failing record index, whatever the encoding order.
pub(crate) fn encode_records<T, F>(
    count: usize,
    parallel: bool,
    encode_one: F,
) -> std::result::Result<Vec<T>, (usize, EncodingError)>
where
    T: Send,
    F: Fn(usize) -> std::result::Result<T, EncodingError> + Sync,
{
    let results: Vec<std::result::Result<T, EncodingError>> = if parallel {
        par_encode(count, &encode_one)
    } else {
        (0..count).map(&encode_one).collect()
    };

    results
        .into_iter()
        .enumerate()
        .map(|(i, r)| r.map_err(|e| (i, e)))
        .collect()
}

#[cfg(feature = "parallel")]
fn par_encode<T, F>(count: usize, encode_one: &F) -> Vec<std::result::Result<T, EncodingError>>
where
    T: Send,
    F: Fn(usize) -> std::result::Result<T, EncodingError> + Sync,
{
    use rayon::prelude::*;
    (0..count).into_par_iter().map(encode_one).collect()
}

#[cfg(not(feature = "parallel"))]
fn par_encode<T, F>(count: usize, encode_one: &F) -> Vec<std::result::Result<T, EncodingError>>
where
    F: Fn(usize) -> std::result::Result<T, EncodingError>,
{
    (0..count).map(encode_one).collect()
}

/// Attach the record being drawn, if any, to a failure.
pub(crate) fn attribute(err: DocumentGenerationError, record: Option<usize>) -> DocumentGenerationError {
    match record {
        Some(index) => err.at_record(index),
        None => err,
    }
}

/// Texts of a header band.
pub(crate) struct HeaderText<'a> {
    pub title: &'a str,
    pub title_pos: (f32, f32),
    pub title_size: f32,
    pub subtitle: &'a str,
    pub subtitle_pos: (f32, f32),
    pub id_label: &'a str,
}

pub(crate) fn draw_header<W: Write>(
    canvas: &mut PageCanvas<W>,
    layout: &LayoutConfig,
    fill: Color,
    text: &HeaderText<'_>,
    stamp: &DocumentStamp,
    qr: &EncodedSymbol,
) -> Result<()> {
    canvas.fill_rect(0.0, 0.0, layout.page_width, layout.header_height, fill)?;

    let (x, y) = text.title_pos;
    canvas.draw_text(text.title, x, y, &TextStyle::new(text.title_size).with_color(Color::WHITE))?;
    let (x, y) = text.subtitle_pos;
    canvas.draw_text(text.subtitle, x, y, &TextStyle::new(10.0).with_color(Color::WHITE))?;

    let meta = TextStyle::new(10.0)
        .with_color(Color::WHITE)
        .with_align(TextAlign::End)
        .with_max_width(layout.meta_width);
    canvas.draw_text(&format!("{}: {}", text.id_label, stamp.id), layout.meta_x, layout.meta_id_y, &meta)?;
    canvas.draw_text(&stamp.date_line(), layout.meta_x, layout.meta_date_y, &meta)?;

    let (qx, qy, qw) = layout.header_qr;
    canvas.draw_symbol(qr, qx, qy, qw, None)?;
    Ok(())
}

pub(crate) fn draw_footer<W: Write>(
    canvas: &mut PageCanvas<W>,
    layout: &LayoutConfig,
    signatures: [&str; 2],
    note: &str,
) -> Result<()> {
    let sign = TextStyle::new(12.0);
    for (label, x) in signatures.iter().zip(layout.footer_columns) {
        canvas.draw_text(label, x, layout.footer_y, &sign)?;
    }

    let note_style = TextStyle::new(10.0)
        .with_color(NOTE_COLOR)
        .with_align(TextAlign::Center)
        .with_max_width(layout.table_width);
    canvas.draw_text(note, layout.table_x, layout.footer_y + layout.footer_note_gap, &note_style)?;
    Ok(())
}

/// Banded table drawn one row at a time.
///
/// Under [`PaginationPolicy::Strict`] a row that would cross
/// `strict_table_limit` closes the current page and the table restarts at the
/// top margin of the next one with a repeated header row. Under
/// [`PaginationPolicy::Legacy`] rows keep going down the page.
pub(crate) struct Table<'a> {
    layout: &'a LayoutConfig,
    palette: Palette,
    headers: &'a [(f32, &'a str)],
    policy: PaginationPolicy,
    segment_top: f32,
    row_y: f32,
    rows: usize,
}

impl<'a> Table<'a> {
    /// Draw the header row at `top`.
    pub(crate) fn begin<W: Write>(
        canvas: &mut PageCanvas<W>,
        layout: &'a LayoutConfig,
        palette: Palette,
        headers: &'a [(f32, &'a str)],
        policy: PaginationPolicy,
        top: f32,
    ) -> Result<Self> {
        let mut table = Self {
            layout,
            palette,
            headers,
            policy,
            segment_top: top,
            row_y: top,
            rows: 0,
        };
        table.draw_header_row(canvas, top)?;
        Ok(table)
    }

    fn draw_header_row<W: Write>(&mut self, canvas: &mut PageCanvas<W>, top: f32) -> Result<()> {
        let layout = self.layout;
        canvas.fill_rect(
            layout.table_x,
            top,
            layout.table_width,
            layout.header_row_height,
            self.palette.table_header_fill,
        )?;
        let style = TextStyle::new(12.0).with_color(self.palette.table_header_text);
        for (x, label) in self.headers {
            canvas.draw_text(label, *x, top + layout.text_inset, &style)?;
        }
        self.segment_top = top;
        self.row_y = top + layout.header_row_height;
        Ok(())
    }

    fn close_segment<W: Write>(&self, canvas: &mut PageCanvas<W>) -> Result<()> {
        let layout = self.layout;
        canvas.stroke_rect(
            layout.table_x,
            self.segment_top,
            layout.table_width,
            self.row_y - self.segment_top,
            self.palette.border,
        )
    }

    /// Open the next body row and return its top y.
    pub(crate) fn next_row<W: Write>(&mut self, canvas: &mut PageCanvas<W>) -> Result<f32> {
        let layout = self.layout;
        if self.policy == PaginationPolicy::Strict && !layout.row_fits(self.row_y) {
            self.close_segment(canvas)?;
            canvas.add_page()?;
            log::debug!("Table continues on page {} at row {}", canvas.state().page_index, self.rows);
            self.draw_header_row(canvas, layout.top_margin)?;
        }

        let top = self.row_y;
        canvas.fill_rect(
            layout.table_x,
            top,
            layout.table_width,
            layout.row_height,
            self.palette.row_fill(self.rows),
        )?;
        self.row_y += layout.row_height;
        self.rows += 1;
        Ok(top)
    }

    /// Stroke the border of the last segment and return the y below the table.
    pub(crate) fn finish<W: Write>(self, canvas: &mut PageCanvas<W>) -> Result<f32> {
        self.close_segment(canvas)?;
        if self.policy == PaginationPolicy::Legacy && self.row_y > self.layout.strict_table_limit {
            log::warn!(
                "Table of {} rows ends at y={} past the page limit {}; rows overflow the footer",
                self.rows,
                self.row_y,
                self.layout.strict_table_limit
            );
        }
        Ok(self.row_y)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::writer::{CanvasOptions, DrawOp, FontResource};
    use std::sync::Arc;

    fn canvas() -> PageCanvas<Vec<u8>> {
        PageCanvas::new(Vec::new(), Arc::new(FontResource::standard()), CanvasOptions::default())
    }

    #[test]
    fn test_encode_records_reports_lowest_index() {
        for parallel in [false, true] {
            let result = encode_records(10, parallel, |i| {
                if i == 3 || i == 7 {
                    Err(EncodingError::UnsupportedCharacter { ch: 'é', position: i })
                } else {
                    Ok(i * 2)
                }
            });
            let (index, err) = result.unwrap_err();
            assert_eq!(index, 3);
            assert!(matches!(err, EncodingError::UnsupportedCharacter { position: 3, .. }));
        }
    }

    #[test]
    fn test_encode_records_keeps_order() {
        let values = encode_records(50, true, |i| Ok::<_, EncodingError>(i)).unwrap();
        assert_eq!(values, (0..50).collect::<Vec<_>>());
    }

    #[test]
    fn test_legacy_table_stays_on_page() {
        let layout = LayoutConfig::default();
        let headers = [(60.0, "Item")];
        let mut c = canvas();
        let mut table =
            Table::begin(&mut c, &layout, Palette::INBOUND, &headers, PaginationPolicy::Legacy, 150.0).unwrap();
        for _ in 0..30 {
            table.next_row(&mut c).unwrap();
        }
        let bottom = table.finish(&mut c).unwrap();
        assert_eq!(bottom, 175.0 + 30.0 * 25.0);
        assert_eq!(c.state().page_index, 0);
    }

    #[test]
    fn test_strict_table_breaks_with_header() {
        let layout = LayoutConfig::default();
        let headers = [(60.0, "Item")];
        let mut c = canvas();
        let mut table =
            Table::begin(&mut c, &layout, Palette::INBOUND, &headers, PaginationPolicy::Strict, 150.0).unwrap();

        // rows at 175..655 fit (20 rows), the 21st moves to page 2
        let mut tops = Vec::new();
        for _ in 0..21 {
            tops.push(table.next_row(&mut c).unwrap());
        }
        assert_eq!(tops[19], 650.0);
        assert_eq!(tops[20], layout.top_margin + layout.header_row_height);
        assert_eq!(c.state().page_index, 1);

        let header_texts = c
            .current_ops()
            .iter()
            .filter(|op| matches!(op, DrawOp::Text { text, .. } if text == "Item"))
            .count();
        assert_eq!(header_texts, 1);

        let bottom = table.finish(&mut c).unwrap();
        assert_eq!(bottom, 100.0);
    }
}
