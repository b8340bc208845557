//! Outbound picking list.

use std::io::Write;

use super::config::{PaginationPolicy, Palette};
use super::{attribute, draw_footer, draw_header, DocumentStamp, HeaderText, Table};
use crate::config::EngineConfig;
use crate::error::{DocumentGenerationError, Result};
use crate::model::{CartLine, TotalWeight};
use crate::writer::{
    encode, EncodedSymbol, GeneratedDocument, PageCanvas, SymbolKind, SymbolOptions, TextAlign, TextStyle,
};

const HEADER: HeaderText<'static> = HeaderText {
    title: "Outbound Order",
    title_pos: (40.0, 30.0),
    title_size: 22.0,
    subtitle: "WAREHOUSE MANAGEMENT SYSTEM - PICKING LIST",
    subtitle_pos: (40.0, 60.0),
    id_label: "Order ID",
};

const SIGNATURES: [&str; 2] = [
    "Requested by: ...........................................",
    "Approved by: ...........................................",
];

const NOTE: &str = "Note: Check every item and quantity before goods leave the warehouse. \
                    Delivery is complete once goods leave the warehouse area.";

/// Row label: `"{n}. {name} (ID: {id})"` with a one-based `n`.
pub fn line_label(index: usize, line: &CartLine) -> String {
    format!("{}. {} (ID: {})", index + 1, line.item.name, line.item.id)
}

/// Per-line weight rounded to two decimals, with unit.
///
/// Exact ties round half up (`0.125` prints as `0.13`).
pub fn line_weight_text(line: &CartLine) -> String {
    format!("{} kg", fixed_two(line.line_weight()))
}

/// Two-decimal fixed notation, ties away from zero.
///
/// `{:.2}` breaks exact ties towards the even digit. A tie is detected on the
/// exact decimal expansion: any finite `f64` of magnitude 0.005 or more has
/// at most 60 fractional digits, so 64 digits are exact.
fn fixed_two(value: f64) -> String {
    if !value.is_finite() {
        return format!("{:.2}", value);
    }
    let exact = format!("{:.64}", value.abs());
    let Some((int, frac)) = exact.split_once('.') else {
        return format!("{:.2}", value);
    };
    let tail = &frac[2..];
    if !(tail.starts_with('5') && tail[1..].bytes().all(|b| b == b'0')) {
        return format!("{:.2}", value);
    }

    let mut digits: Vec<u8> = int.bytes().chain(frac[..2].bytes()).collect();
    let mut carry = true;
    for d in digits.iter_mut().rev() {
        if *d == b'9' {
            *d = b'0';
        } else {
            *d += 1;
            carry = false;
            break;
        }
    }
    if carry {
        digits.insert(0, b'1');
    }
    let split = digits.len() - 2;
    let sign = if value < 0.0 { "-" } else { "" };
    format!(
        "{}{}.{}",
        sign,
        String::from_utf8_lossy(&digits[..split]),
        String::from_utf8_lossy(&digits[split..])
    )
}

/// Summary line with the caller's total, unchanged.
pub fn summary_text(total: &TotalWeight) -> String {
    format!("Net total weight: {} kg", total)
}

/// Render the picking list and finalize the canvas.
///
/// The printed total is the caller-supplied `total_weight`; it is not checked
/// against the line weights.
pub fn compose_outbound<W: Write>(
    canvas: &mut PageCanvas<W>,
    cart: &[CartLine],
    total_weight: &TotalWeight,
    stamp: &DocumentStamp,
    config: &EngineConfig,
) -> std::result::Result<GeneratedDocument, DocumentGenerationError> {
    let header_qr = encode(SymbolKind::MatrixCode, &stamp.id, &SymbolOptions::default())
        .map_err(|e| canvas.failure(e.into()))?;

    let mut record = None;
    draw(canvas, cart, total_weight, stamp, config, &header_qr, &mut record)
        .map_err(|e| attribute(canvas.failure(e), record))
}

fn draw<W: Write>(
    canvas: &mut PageCanvas<W>,
    cart: &[CartLine],
    total_weight: &TotalWeight,
    stamp: &DocumentStamp,
    config: &EngineConfig,
    header_qr: &EncodedSymbol,
    record: &mut Option<usize>,
) -> Result<GeneratedDocument> {
    let layout = &config.layout;
    let palette = Palette::OUTBOUND;

    draw_header(canvas, layout, palette.header, &HEADER, stamp, header_qr)?;

    let [c0, c1, c2] = layout.outbound_columns;
    let headers = [(c0, "Items to pick"), (c1, "Qty"), (c2, "Line weight")];
    let mut table = Table::begin(
        canvas,
        layout,
        palette,
        &headers,
        config.pagination,
        layout.outbound_table_top,
    )?;

    let body = TextStyle::new(11.0);
    for (i, line) in cart.iter().enumerate() {
        *record = Some(i);
        canvas.checkpoint()?;
        let row_y = table.next_row(canvas)?;
        let text_y = row_y + layout.text_inset;
        canvas.draw_text(&line_label(i, line), c0, text_y, &body)?;
        canvas.draw_text(&format!("{} pcs", line.ordered_quantity), c1, text_y, &body)?;
        canvas.draw_text(&line_weight_text(line), c2, text_y, &body)?;
    }
    *record = None;
    let table_bottom = table.finish(canvas)?;

    let summary = TextStyle::new(14.0)
        .with_color(palette.accent)
        .with_align(TextAlign::End)
        .with_max_width(layout.table_width);
    let mut summary_y = table_bottom + layout.summary_gap;
    if config.pagination == PaginationPolicy::Strict {
        let height = canvas.font().line_height(14.0) * canvas.font().line_spacing_factor();
        if summary_y + height > layout.footer_y {
            canvas.add_page()?;
            summary_y = layout.top_margin;
        }
    }
    canvas.draw_text(&summary_text(total_weight), layout.table_x, summary_y, &summary)?;

    draw_footer(canvas, layout, SIGNATURES, NOTE)?;
    canvas.finalize()
}
