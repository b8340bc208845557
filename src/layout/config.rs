//! Layout constants for the warehouse documents.
//!
//! Every coordinate the composers use lives in [`LayoutConfig`]; the defaults
//! describe the A4 receipt and picking list. Units are PDF points measured
//! from the top-left corner of the page.

use std::fmt;
use std::str::FromStr;

use crate::geometry::Color;

/// What happens when table rows run past the bottom of the page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PaginationPolicy {
    /// Rows keep going down the first page; the overflow is only logged
    #[default]
    Legacy,
    /// Rows that would cross the table limit move to a new page with a repeated header
    Strict,
}

impl fmt::Display for PaginationPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PaginationPolicy::Legacy => write!(f, "legacy"),
            PaginationPolicy::Strict => write!(f, "strict"),
        }
    }
}

impl FromStr for PaginationPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "legacy" => Ok(PaginationPolicy::Legacy),
            "strict" => Ok(PaginationPolicy::Strict),
            other => Err(format!("unknown pagination policy: {}", other)),
        }
    }
}

/// Colors of one document variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Palette {
    /// Header band fill
    pub header: Color,
    /// Table header row fill
    pub table_header_fill: Color,
    /// Table header text
    pub table_header_text: Color,
    /// Fill of rows with an even index
    pub row_even: Color,
    /// Fill of rows with an odd index
    pub row_odd: Color,
    /// Table border
    pub border: Color,
    /// Summary line text
    pub accent: Color,
}

impl Palette {
    /// Slate receipt colors.
    pub const INBOUND: Palette = Palette {
        header: Color::hex(0x1e293b),
        table_header_fill: Color::hex(0xf1f5f9),
        table_header_text: Color::hex(0x475569),
        row_even: Color::hex(0xffffff),
        row_odd: Color::hex(0xf8fafc),
        border: Color::hex(0xe2e8f0),
        accent: Color::hex(0x1e293b),
    };

    /// Orange picking list colors.
    pub const OUTBOUND: Palette = Palette {
        header: Color::hex(0xf97316),
        table_header_fill: Color::hex(0xfff7ed),
        table_header_text: Color::hex(0x9a3412),
        row_even: Color::hex(0xffffff),
        row_odd: Color::hex(0xfffaf5),
        border: Color::hex(0xfed7aa),
        accent: Color::hex(0xf97316),
    };

    /// Row fill for a row index.
    pub fn row_fill(&self, index: usize) -> Color {
        if index % 2 == 0 {
            self.row_even
        } else {
            self.row_odd
        }
    }
}

/// Footer note color.
pub const NOTE_COLOR: Color = Color::hex(0x64748b);
/// Label border color.
pub const LABEL_BORDER_COLOR: Color = Color::hex(0xcbd5e1);

/// Where the next label block goes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LabelAdvance {
    /// Next block fits on this page at this y
    SamePage(f32),
    /// Next block starts a new page at this y
    NewPage(f32),
}

/// Every coordinate of the document layouts.
#[derive(Debug, Clone, PartialEq)]
pub struct LayoutConfig {
    /// Page width
    pub page_width: f32,
    /// Page height
    pub page_height: f32,
    /// Header band height
    pub header_height: f32,
    /// Header QR position and width
    pub header_qr: (f32, f32, f32),
    /// Left edge of the right-aligned identifier/date box
    pub meta_x: f32,
    /// Width of the identifier/date box
    pub meta_width: f32,
    /// Identifier line y
    pub meta_id_y: f32,
    /// Date line y
    pub meta_date_y: f32,
    /// Table left edge
    pub table_x: f32,
    /// Table width
    pub table_width: f32,
    /// Inbound table top
    pub inbound_table_top: f32,
    /// Outbound table top
    pub outbound_table_top: f32,
    /// Header row height
    pub header_row_height: f32,
    /// Body row height
    pub row_height: f32,
    /// Text offset from the top of a row
    pub text_inset: f32,
    /// Text offset of the smaller id column
    pub id_inset: f32,
    /// Inbound column x positions (name, id, qty, weight)
    pub inbound_columns: [f32; 4],
    /// Outbound column x positions (line, qty, weight)
    pub outbound_columns: [f32; 3],
    /// Gap between the last row and the summary line
    pub summary_gap: f32,
    /// Signature line y
    pub footer_y: f32,
    /// Signature x positions
    pub footer_columns: [f32; 2],
    /// Note offset below the signature line
    pub footer_note_gap: f32,
    /// Label page title y
    pub label_title_y: f32,
    /// First label block y
    pub label_first_y: f32,
    /// Label block x
    pub label_x: f32,
    /// Label block width
    pub label_width: f32,
    /// Label block height
    pub label_height: f32,
    /// Label block corner radius
    pub label_radius: f32,
    /// Label QR offset and width
    pub label_qr: (f32, f32, f32),
    /// Label barcode offset, width and height
    pub label_barcode: (f32, f32, f32, f32),
    /// Vertical advance per label block
    pub label_advance: f32,
    /// A new page starts once the cursor passes this y
    pub label_overflow_y: f32,
    /// Cursor y on a new page
    pub top_margin: f32,
    /// Rows may not extend below this y under strict pagination
    pub strict_table_limit: f32,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            page_width: 595.0,
            page_height: 842.0,
            header_height: 115.0,
            header_qr: (520.0, 25.0, 55.0),
            meta_x: 300.0,
            meta_width: 210.0,
            meta_id_y: 40.0,
            meta_date_y: 55.0,
            table_x: 40.0,
            table_width: 520.0,
            inbound_table_top: 150.0,
            outbound_table_top: 160.0,
            header_row_height: 25.0,
            row_height: 25.0,
            text_inset: 7.0,
            id_inset: 9.0,
            inbound_columns: [60.0, 220.0, 380.0, 480.0],
            outbound_columns: [60.0, 350.0, 480.0],
            summary_gap: 15.0,
            footer_y: 700.0,
            footer_columns: [60.0, 350.0],
            footer_note_gap: 50.0,
            label_title_y: 40.0,
            label_first_y: 100.0,
            label_x: 40.0,
            label_width: 520.0,
            label_height: 140.0,
            label_radius: 10.0,
            label_qr: (20.0, 55.0, 65.0),
            label_barcode: (110.0, 70.0, 280.0, 55.0),
            label_advance: 160.0,
            label_overflow_y: 650.0,
            top_margin: 50.0,
            strict_table_limit: 680.0,
        }
    }
}

impl LayoutConfig {
    /// Advance the label cursor past one block.
    ///
    /// Overflow happens strictly when the advanced cursor is greater than
    /// `label_overflow_y`; the next block then starts at `top_margin`.
    pub fn advance_label(&self, cursor_y: f32) -> LabelAdvance {
        let next = cursor_y + self.label_advance;
        if next > self.label_overflow_y {
            LabelAdvance::NewPage(self.top_margin)
        } else {
            LabelAdvance::SamePage(next)
        }
    }

    /// True when a row starting at `row_y` fits above the strict table limit.
    pub fn row_fits(&self, row_y: f32) -> bool {
        row_y + self.row_height <= self.strict_table_limit
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_label_pagination_rule() {
        let layout = LayoutConfig::default();
        assert_eq!(layout.advance_label(100.0), LabelAdvance::SamePage(260.0));
        assert_eq!(layout.advance_label(420.0), LabelAdvance::SamePage(580.0));
        // 580 + 160 = 740 > 650
        assert_eq!(layout.advance_label(580.0), LabelAdvance::NewPage(50.0));
        // 490 + 160 = 650 is not past the threshold
        assert_eq!(layout.advance_label(490.0), LabelAdvance::SamePage(650.0));
    }

    #[test]
    fn test_row_fits() {
        let layout = LayoutConfig::default();
        assert!(layout.row_fits(655.0));
        assert!(!layout.row_fits(656.0));
    }

    #[test]
    fn test_row_fill_parity() {
        assert_eq!(Palette::INBOUND.row_fill(0), Color::hex(0xffffff));
        assert_eq!(Palette::INBOUND.row_fill(1), Color::hex(0xf8fafc));
        assert_eq!(Palette::OUTBOUND.row_fill(3), Color::hex(0xfffaf5));
    }

    #[test]
    fn test_pagination_policy_parse() {
        assert_eq!("strict".parse::<PaginationPolicy>(), Ok(PaginationPolicy::Strict));
        assert_eq!(" Legacy ".parse::<PaginationPolicy>(), Ok(PaginationPolicy::Legacy));
        assert!("paged".parse::<PaginationPolicy>().is_err());
        assert_eq!(PaginationPolicy::default().to_string(), "legacy");
    }
}
