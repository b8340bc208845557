//! Inbound shipment receipt followed by the product label sheet.

use std::io::Write;

use super::config::{LabelAdvance, Palette, LABEL_BORDER_COLOR};
use super::{attribute, draw_footer, draw_header, encode_records, DocumentStamp, HeaderText, Table};
use crate::config::EngineConfig;
use crate::error::{DocumentGenerationError, EncodingError, Result};
use crate::geometry::Color;
use crate::model::LineItem;
use crate::writer::{
    encode, EncodedSymbol, GeneratedDocument, PageCanvas, SymbolKind, SymbolOptions, TextAlign, TextStyle,
};

const HEADER: HeaderText<'static> = HeaderText {
    title: "WMS AUTOMATION SYSTEM",
    title_pos: (40.0, 35.0),
    title_size: 24.0,
    subtitle: "INBOUND SHIPMENT RECEIPT",
    subtitle_pos: (40.0, 65.0),
    id_label: "Document No",
};

const SIGNATURES: [&str; 2] = [
    "Received by: ...........................................",
    "Warehouse officer: ...........................................",
];

const NOTE: &str = "Note: Goods have passed initial inspection. Keep this receipt for stock auditing.";

const LABEL_TITLE: &str = "PRODUCT LABELS";

/// Symbols printed on one product label.
#[derive(Debug, Clone)]
pub struct LabelSymbols {
    /// QR code with the item summary
    pub summary: EncodedSymbol,
    /// Code 128 of the item id with its caption, absent when the id is empty
    pub id_bars: Option<EncodedSymbol>,
}

/// Multi-field payload of a label QR code.
pub fn label_payload(item: &LineItem) -> String {
    format!("ID:{}\nNAME:{}\nQTY:{}", item.id, item.name, item.quantity)
}

fn encode_label(item: &LineItem) -> std::result::Result<LabelSymbols, EncodingError> {
    Ok(LabelSymbols {
        summary: encode(SymbolKind::MatrixCode, &label_payload(item), &SymbolOptions::default())?,
        id_bars: match item.id.as_str() {
            "" => None,
            id => Some(encode(SymbolKind::LinearCode, id, &SymbolOptions::default().show_text(true))?),
        },
    })
}

/// Render the receipt and one label per item, then finalize the canvas.
///
/// Page 1 carries the header, the item table and the signature footer. The
/// label sheet always starts on page 2, titled even when there are no items,
/// and follows [`LayoutConfig::advance_label`]. An item without an id gets a
/// label without the Code 128 symbol.
///
/// [`LayoutConfig::advance_label`]: super::LayoutConfig::advance_label
pub fn compose_inbound<W: Write>(
    canvas: &mut PageCanvas<W>,
    items: &[LineItem],
    stamp: &DocumentStamp,
    config: &EngineConfig,
) -> std::result::Result<GeneratedDocument, DocumentGenerationError> {
    let header_qr = encode(SymbolKind::MatrixCode, &stamp.id, &SymbolOptions::default())
        .map_err(|e| canvas.failure(e.into()))?;
    let labels = encode_records(items.len(), config.parallel_encoding, |i| encode_label(&items[i]))
        .map_err(|(i, e)| canvas.failure(e.into()).at_record(i))?;

    let mut record = None;
    draw(canvas, items, stamp, config, &header_qr, &labels, &mut record)
        .map_err(|e| attribute(canvas.failure(e), record))
}

fn draw<W: Write>(
    canvas: &mut PageCanvas<W>,
    items: &[LineItem],
    stamp: &DocumentStamp,
    config: &EngineConfig,
    header_qr: &EncodedSymbol,
    labels: &[LabelSymbols],
    record: &mut Option<usize>,
) -> Result<GeneratedDocument> {
    let layout = &config.layout;
    let palette = Palette::INBOUND;

    draw_header(canvas, layout, palette.header, &HEADER, stamp, header_qr)?;

    let [c0, c1, c2, c3] = layout.inbound_columns;
    let headers = [(c0, "Item"), (c1, "Item ID"), (c2, "Qty"), (c3, "Weight (kg)")];
    let mut table = Table::begin(
        canvas,
        layout,
        palette,
        &headers,
        config.pagination,
        layout.inbound_table_top,
    )?;

    let body = TextStyle::new(11.0);
    let small = TextStyle::new(9.0);
    for (i, item) in items.iter().enumerate() {
        *record = Some(i);
        canvas.checkpoint()?;
        let row_y = table.next_row(canvas)?;
        canvas.draw_text(&item.name, c0, row_y + layout.text_inset, &body)?;
        canvas.draw_text(&item.id, c1, row_y + layout.id_inset, &small)?;
        canvas.draw_text(&item.quantity.to_string(), c2, row_y + layout.text_inset, &body)?;
        canvas.draw_text(&item.unit_weight.to_string(), c3, row_y + layout.text_inset, &body)?;
    }
    *record = None;
    table.finish(canvas)?;

    draw_footer(canvas, layout, SIGNATURES, NOTE)?;

    canvas.add_page()?;
    let title = TextStyle::new(18.0)
        .with_align(TextAlign::Center)
        .with_max_width(layout.table_width);
    canvas.draw_text(LABEL_TITLE, layout.table_x, layout.label_title_y, &title)?;

    let mut label_y = layout.label_first_y;
    for (i, (item, symbols)) in items.iter().zip(labels).enumerate() {
        *record = Some(i);
        canvas.checkpoint()?;
        draw_label(canvas, config, item, symbols, label_y)?;

        label_y = match layout.advance_label(label_y) {
            LabelAdvance::SamePage(y) => y,
            LabelAdvance::NewPage(y) => {
                if i + 1 < items.len() {
                    canvas.add_page()?;
                }
                y
            },
        };
    }
    *record = None;

    canvas.finalize()
}

fn draw_label<W: Write>(
    canvas: &mut PageCanvas<W>,
    config: &EngineConfig,
    item: &LineItem,
    symbols: &LabelSymbols,
    y: f32,
) -> Result<()> {
    let layout = &config.layout;
    let x = layout.label_x;
    canvas.stroke_rounded_rect(
        x,
        y,
        layout.label_width,
        layout.label_height,
        layout.label_radius,
        LABEL_BORDER_COLOR,
    )?;

    canvas.draw_text(
        &format!("Product: {}", item.name),
        x + 20.0,
        y + 20.0,
        &TextStyle::new(14.0).with_color(Color::BLACK),
    )?;
    canvas.draw_text(&format!("ID: {}", item.id), x + 20.0, y + 40.0, &TextStyle::new(10.0))?;

    let (qx, qy, qw) = layout.label_qr;
    canvas.draw_symbol(&symbols.summary, x + qx, y + qy, qw, None)?;
    if let Some(bars) = &symbols.id_bars {
        let (bx, by, bw, bh) = layout.label_barcode;
        canvas.draw_symbol(bars, x + bx, y + by, bw, Some(bh))?;
    }
    Ok(())
}
