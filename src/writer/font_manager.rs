//! Font resource for PDF generation.
//!
//! A document draws all of its text with one [`FontResource`]:
//!
//! - **Standard**: the Base-14 Helvetica / Helvetica-Bold pair with WinAnsi
//!   encoding. Nothing is embedded; characters outside WinAnsi print as `?`.
//! - **Embedded**: a TrueType font loaded once, embedded as a Type 0 composite
//!   font (CIDFontType2, Identity-H, CIDToGIDMap Identity) with a `W` array and
//!   a ToUnicode CMap covering the glyphs the document actually used.
//!
//! The resource is immutable after loading. [`global_font`] and
//! [`load_global_font`] hold one process-wide instance behind a
//! `once_cell::sync::OnceCell`, shared read-only by every render.

use std::collections::{BTreeMap, HashMap};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use lazy_static::lazy_static;
use once_cell::sync::OnceCell;

use crate::error::{Error, Result};
use crate::object::{Object, ObjectRef};
use crate::writer::object_serializer::ObjectSerializer;
use crate::writer::pdf_writer::encode_stream;

/// Glyphs used by one document: glyph id -> the character it was drawn for.
pub type GlyphUsage = BTreeMap<u16, char>;

/// Weight requested for a text run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FontFace {
    /// Regular weight
    #[default]
    Regular,
    /// Bold weight (Helvetica-Bold; an embedded font has a single face)
    Bold,
}

/// Text encoded for a content stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EncodedText {
    /// Single-byte WinAnsi codes for a Base-14 font
    Bytes(Vec<u8>),
    /// Two-byte glyph ids for the embedded composite font
    Glyphs(Vec<u16>),
}

/// Helvetica advance widths for 0x20..=0x7E, in 1/1000 em (Adobe AFM).
const HELVETICA_WIDTHS: [u16; 95] = [
    278, 278, 355, 556, 556, 889, 667, 191, 333, 333, 389, 584, 278, 333, 278, 278, // ' '../
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, // 0..9
    278, 278, 584, 584, 584, 556, 1015, // :..@
    667, 667, 722, 722, 667, 611, 778, 722, 278, 500, 667, 556, 833, // A..M
    722, 778, 667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, // N..Z
    278, 278, 278, 469, 556, 333, // [..`
    556, 556, 500, 556, 556, 278, 556, 556, 222, 222, 500, 222, 833, // a..m
    556, 556, 556, 556, 333, 500, 278, 556, 500, 722, 500, 500, 500, // n..z
    334, 260, 334, 584, // {..~
];

/// Helvetica-Bold advance widths for 0x20..=0x7E, in 1/1000 em (Adobe AFM).
const HELVETICA_BOLD_WIDTHS: [u16; 95] = [
    278, 333, 474, 556, 556, 889, 722, 238, 333, 333, 389, 584, 278, 333, 278, 278, // ' '../
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, // 0..9
    333, 333, 584, 584, 584, 611, 975, // :..@
    722, 722, 722, 722, 667, 611, 778, 722, 278, 556, 722, 611, 833, // A..M
    722, 778, 667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, // N..Z
    333, 278, 333, 584, 556, 333, // [..`
    556, 611, 556, 611, 556, 333, 611, 611, 278, 278, 556, 278, 889, // a..m
    611, 611, 611, 611, 389, 556, 333, 611, 556, 778, 556, 556, 500, // n..z
    389, 280, 389, 584, // {..~
];

/// Approximate width for WinAnsi characters above 0x7F.
const HIGH_WINANSI_WIDTH: u16 = 556;

/// Helvetica metrics: (ascender, descender) in 1/1000 em.
const HELVETICA_ASCENDER: f32 = 718.0;
const HELVETICA_DESCENDER: f32 = -207.0;

lazy_static! {
    /// Characters WinAnsiEncoding places in 0x80..=0x9F.
    static ref WINANSI_HIGH: HashMap<char, u8> = [
        ('\u{20AC}', 0x80),
        ('\u{201A}', 0x82),
        ('\u{0192}', 0x83),
        ('\u{201E}', 0x84),
        ('\u{2026}', 0x85),
        ('\u{2020}', 0x86),
        ('\u{2021}', 0x87),
        ('\u{02C6}', 0x88),
        ('\u{2030}', 0x89),
        ('\u{0160}', 0x8A),
        ('\u{2039}', 0x8B),
        ('\u{0152}', 0x8C),
        ('\u{017D}', 0x8E),
        ('\u{2018}', 0x91),
        ('\u{2019}', 0x92),
        ('\u{201C}', 0x93),
        ('\u{201D}', 0x94),
        ('\u{2022}', 0x95),
        ('\u{2013}', 0x96),
        ('\u{2014}', 0x97),
        ('\u{02DC}', 0x98),
        ('\u{2122}', 0x99),
        ('\u{0161}', 0x9A),
        ('\u{203A}', 0x9B),
        ('\u{0153}', 0x9C),
        ('\u{017E}', 0x9E),
        ('\u{0178}', 0x9F),
    ]
    .into_iter()
    .collect();
}

/// Map a character to its WinAnsiEncoding code.
pub fn winansi_code(ch: char) -> Option<u8> {
    match ch as u32 {
        0x20..=0x7E | 0xA0..=0xFF => Some(ch as u32 as u8),
        _ => WINANSI_HIGH.get(&ch).copied(),
    }
}

fn base14_width(code: u8, face: FontFace) -> u16 {
    let table = match face {
        FontFace::Regular => &HELVETICA_WIDTHS,
        FontFace::Bold => &HELVETICA_BOLD_WIDTHS,
    };
    match code {
        0x20..=0x7E => table[(code - 0x20) as usize],
        _ => HIGH_WINANSI_WIDTH,
    }
}

/// Embedded TrueType font.
///
/// Glyph lookup and advance widths are cached at load time; the raw font
/// program is embedded unmodified as `FontFile2`.
#[derive(Debug)]
pub struct EmbeddedFont {
    /// PostScript name used as BaseFont
    pub name: String,
    /// Raw font data (for embedding)
    font_data: bytes::Bytes,
    /// Unicode -> glyph id
    glyph_lookup: HashMap<char, u16>,
    /// Glyph id -> width in 1/1000 em
    glyph_widths: HashMap<u16, u16>,
    /// Font ascender in 1/1000 em
    pub ascender: i32,
    /// Font descender in 1/1000 em (negative)
    pub descender: i32,
    /// Cap height in 1/1000 em
    pub cap_height: i32,
    /// Font bounding box (llx, lly, urx, ury) in 1/1000 em
    pub bbox: (i32, i32, i32, i32),
    /// Whether the face is flagged italic
    pub italic: bool,
}

impl EmbeddedFont {
    /// Parse a TrueType/OpenType font from raw data.
    pub fn from_data(data: Vec<u8>) -> Result<Self> {
        if data.is_empty() {
            return Err(Error::Font("font file is empty".to_string()));
        }

        let face = ttf_parser::Face::parse(&data, 0)
            .map_err(|e| Error::Font(format!("failed to parse font: {}", e)))?;

        let units_per_em = face.units_per_em().max(1) as i32;
        let scale = |v: i16| v as i32 * 1000 / units_per_em;

        let mut glyph_lookup = HashMap::new();
        for codepoint in 0x20..=0xFFFF_u32 {
            if let Some(ch) = char::from_u32(codepoint) {
                if let Some(gid) = face.glyph_index(ch) {
                    glyph_lookup.insert(ch, gid.0);
                }
            }
        }

        let mut glyph_widths = HashMap::new();
        for gid in 0..face.number_of_glyphs() {
            let advance = face.glyph_hor_advance(ttf_parser::GlyphId(gid)).unwrap_or(0);
            glyph_widths.insert(gid, (advance as i32 * 1000 / units_per_em) as u16);
        }

        let name = face
            .names()
            .into_iter()
            .find(|n| n.name_id == ttf_parser::name_id::POST_SCRIPT_NAME)
            .and_then(|n| n.to_string())
            .map(|n| n.chars().filter(|c| c.is_ascii_alphanumeric() || *c == '-').collect())
            .filter(|n: &String| !n.is_empty())
            .unwrap_or_else(|| "EmbeddedFont".to_string());

        let bbox = face.global_bounding_box();
        let ascender = scale(face.ascender());

        Ok(Self {
            name,
            glyph_lookup,
            glyph_widths,
            ascender,
            descender: scale(face.descender()),
            cap_height: face.capital_height().map(scale).unwrap_or(ascender),
            bbox: (scale(bbox.x_min), scale(bbox.y_min), scale(bbox.x_max), scale(bbox.y_max)),
            italic: face.is_italic(),
            font_data: bytes::Bytes::from(data),
        })
    }

    /// Get the glyph ID for a character (0 = .notdef).
    pub fn glyph_id(&self, ch: char) -> u16 {
        self.glyph_lookup.get(&ch).copied().unwrap_or(0)
    }

    /// Get the width of a glyph in 1/1000 em units.
    pub fn glyph_width(&self, gid: u16) -> u16 {
        self.glyph_widths.get(&gid).copied().unwrap_or(0)
    }

    /// Raw font program.
    pub fn font_data(&self) -> &[u8] {
        &self.font_data
    }

    /// Generate the CID widths array for the W entry.
    ///
    /// Consecutive glyph ids are grouped as `start [w1 w2 ...]`.
    fn widths_array(&self, used: &GlyphUsage) -> Object {
        let glyphs: Vec<u16> = used.keys().copied().collect();
        let mut result = Vec::new();

        let mut i = 0;
        while i < glyphs.len() {
            let start = glyphs[i];
            let mut widths = vec![Object::Integer(self.glyph_width(start) as i64)];
            while i + 1 < glyphs.len() && glyphs[i + 1] == glyphs[i] + 1 {
                i += 1;
                widths.push(Object::Integer(self.glyph_width(glyphs[i]) as i64));
            }
            result.push(Object::Integer(start as i64));
            result.push(Object::Array(widths));
            i += 1;
        }

        Object::Array(result)
    }

    /// Generate the ToUnicode CMap for text extraction.
    fn tounicode_cmap(&self, used: &GlyphUsage) -> String {
        let mut cmap = String::new();
        cmap.push_str("/CIDInit /ProcSet findresource begin\n");
        cmap.push_str("12 dict begin\n");
        cmap.push_str("begincmap\n");
        cmap.push_str("/CIDSystemInfo << /Registry (Adobe) /Ordering (UCS) /Supplement 0 >> def\n");
        cmap.push_str("/CMapName /Adobe-Identity-UCS def\n");
        cmap.push_str("/CMapType 2 def\n");
        cmap.push_str("1 begincodespacerange\n<0000> <FFFF>\nendcodespacerange\n");

        let mappings: Vec<(u16, char)> = used.iter().map(|(&gid, &ch)| (gid, ch)).collect();
        // At most 100 entries per bfchar block
        for chunk in mappings.chunks(100) {
            cmap.push_str(&format!("{} beginbfchar\n", chunk.len()));
            for &(gid, ch) in chunk {
                let mut units = [0u16; 2];
                let hex: String = ch
                    .encode_utf16(&mut units)
                    .iter()
                    .map(|u| format!("{:04X}", u))
                    .collect();
                cmap.push_str(&format!("<{:04X}> <{}>\n", gid, hex));
            }
            cmap.push_str("endbfchar\n");
        }

        cmap.push_str("endcmap\n");
        cmap.push_str("CMapName currentdict /CMap defineresource pop\n");
        cmap.push_str("end\nend\n");
        cmap
    }
}

#[derive(Debug)]
enum FontKind {
    Standard,
    Embedded(EmbeddedFont),
}

/// The font every text run of a document is drawn with.
#[derive(Debug)]
pub struct FontResource {
    kind: FontKind,
    source: Option<PathBuf>,
}

impl FontResource {
    /// Base-14 Helvetica pair, nothing embedded.
    pub fn standard() -> Self {
        Self {
            kind: FontKind::Standard,
            source: None,
        }
    }

    /// Load a TrueType font to embed.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let data = std::fs::read(path)
            .map_err(|e| Error::Font(format!("failed to read {}: {}", path.display(), e)))?;
        let font = EmbeddedFont::from_data(data)?;
        log::info!("Loaded document font {} from {}", font.name, path.display());
        Ok(Self {
            kind: FontKind::Embedded(font),
            source: Some(path.to_path_buf()),
        })
    }

    /// Use an already parsed TrueType font.
    pub fn from_embedded(font: EmbeddedFont) -> Self {
        Self {
            kind: FontKind::Embedded(font),
            source: None,
        }
    }

    /// True when text is drawn with an embedded TrueType font.
    pub fn is_embedded(&self) -> bool {
        matches!(self.kind, FontKind::Embedded(_))
    }

    /// File the font was loaded from, if any.
    pub fn source(&self) -> Option<&Path> {
        self.source.as_deref()
    }

    /// Content stream resource name for a face.
    pub fn resource_name(&self, face: FontFace) -> &'static str {
        match (&self.kind, face) {
            (FontKind::Standard, FontFace::Bold) => "F2",
            _ => "F1",
        }
    }

    /// All resource names this font registers on a page.
    pub fn resource_names(&self) -> &'static [&'static str] {
        match self.kind {
            FontKind::Standard => &["F1", "F2"],
            FontKind::Embedded(_) => &["F1"],
        }
    }

    /// Width of a character in 1/1000 em.
    pub fn char_width(&self, ch: char, face: FontFace) -> u16 {
        match &self.kind {
            FontKind::Standard => base14_width(winansi_code(ch).unwrap_or(b'?'), face),
            FontKind::Embedded(font) => font.glyph_width(font.glyph_id(ch)),
        }
    }

    /// Calculate the width of text in points.
    pub fn text_width(&self, text: &str, font_size: f32, face: FontFace) -> f32 {
        let units: u32 = text.chars().map(|c| self.char_width(c, face) as u32).sum();
        units as f32 * font_size / 1000.0
    }

    /// Distance from the top of the line box to the baseline, in points.
    pub fn ascent(&self, font_size: f32) -> f32 {
        let ascender = match &self.kind {
            FontKind::Standard => HELVETICA_ASCENDER,
            FontKind::Embedded(font) => font.ascender as f32,
        };
        ascender * font_size / 1000.0
    }

    /// Get the line height (ascender to descender) at the given size.
    pub fn line_height(&self, font_size: f32) -> f32 {
        let (ascender, descender) = match &self.kind {
            FontKind::Standard => (HELVETICA_ASCENDER, HELVETICA_DESCENDER),
            FontKind::Embedded(font) => (font.ascender as f32, font.descender as f32),
        };
        (ascender - descender) * font_size / 1000.0
    }

    /// Line advance multiplier for wrapped text.
    pub fn line_spacing_factor(&self) -> f32 {
        1.2
    }

    /// Greedy word wrap on whitespace.
    ///
    /// Words are packed while the line fits `max_width`. A word wider than the
    /// box is kept whole on a line of its own. Explicit `\n` always breaks.
    pub fn wrap_text(&self, text: &str, font_size: f32, face: FontFace, max_width: f32) -> Vec<String> {
        let space = self.text_width(" ", font_size, face);
        let mut lines = Vec::new();

        for paragraph in text.split('\n') {
            let mut current = String::new();
            let mut current_width = 0.0;

            for word in paragraph.split_whitespace() {
                let word_width = self.text_width(word, font_size, face);
                if current.is_empty() {
                    current.push_str(word);
                    current_width = word_width;
                } else if current_width + space + word_width <= max_width {
                    current.push(' ');
                    current.push_str(word);
                    current_width += space + word_width;
                } else {
                    lines.push(std::mem::take(&mut current));
                    current.push_str(word);
                    current_width = word_width;
                }
            }
            lines.push(current);
        }

        lines
    }

    /// Encode text for a content stream, recording embedded glyph usage.
    pub fn encode(&self, text: &str, usage: &mut GlyphUsage) -> EncodedText {
        match &self.kind {
            FontKind::Standard => {
                EncodedText::Bytes(text.chars().map(|c| winansi_code(c).unwrap_or(b'?')).collect())
            },
            FontKind::Embedded(font) => EncodedText::Glyphs(
                text.chars()
                    .map(|c| {
                        let gid = font.glyph_id(c);
                        if gid != 0 {
                            usage.entry(gid).or_insert(c);
                        }
                        gid
                    })
                    .collect(),
            ),
        }
    }

    /// Build the font objects. `roots` are the references reserved for the
    /// page resources (one per [`resource_names`](Self::resource_names) entry);
    /// helper objects take ids from `next_id`.
    pub(crate) fn build_objects(
        &self,
        roots: &[ObjectRef],
        usage: &GlyphUsage,
        next_id: &mut u32,
        compress: bool,
    ) -> io::Result<Vec<(ObjectRef, Object)>> {
        let mut alloc = || {
            let id = *next_id;
            *next_id += 1;
            ObjectRef::new(id, 0)
        };

        match &self.kind {
            FontKind::Standard => Ok(roots
                .iter()
                .zip(["Helvetica", "Helvetica-Bold"])
                .map(|(r, base)| {
                    let dict = ObjectSerializer::dict(vec![
                        ("Type", ObjectSerializer::name("Font")),
                        ("Subtype", ObjectSerializer::name("Type1")),
                        ("BaseFont", ObjectSerializer::name(base)),
                        ("Encoding", ObjectSerializer::name("WinAnsiEncoding")),
                    ]);
                    (*r, dict)
                })
                .collect()),
            FontKind::Embedded(font) => {
                let type0 = roots.first().copied().ok_or_else(|| {
                    io::Error::new(io::ErrorKind::InvalidInput, "no font object reserved")
                })?;
                let cid_ref = alloc();
                let descriptor_ref = alloc();
                let file_ref = alloc();
                let tounicode_ref = alloc();

                let type0_dict = ObjectSerializer::dict(vec![
                    ("Type", ObjectSerializer::name("Font")),
                    ("Subtype", ObjectSerializer::name("Type0")),
                    ("BaseFont", ObjectSerializer::name(&font.name)),
                    ("Encoding", ObjectSerializer::name("Identity-H")),
                    ("DescendantFonts", Object::Array(vec![Object::Reference(cid_ref)])),
                    ("ToUnicode", Object::Reference(tounicode_ref)),
                ]);

                let cid_dict = ObjectSerializer::dict(vec![
                    ("Type", ObjectSerializer::name("Font")),
                    ("Subtype", ObjectSerializer::name("CIDFontType2")),
                    ("BaseFont", ObjectSerializer::name(&font.name)),
                    (
                        "CIDSystemInfo",
                        ObjectSerializer::dict(vec![
                            ("Registry", ObjectSerializer::string("Adobe")),
                            ("Ordering", ObjectSerializer::string("Identity")),
                            ("Supplement", ObjectSerializer::integer(0)),
                        ]),
                    ),
                    ("FontDescriptor", Object::Reference(descriptor_ref)),
                    ("DW", ObjectSerializer::integer(1000)),
                    ("W", font.widths_array(usage)),
                    ("CIDToGIDMap", ObjectSerializer::name("Identity")),
                ]);

                let (llx, lly, urx, ury) = font.bbox;
                let descriptor = ObjectSerializer::dict(vec![
                    ("Type", ObjectSerializer::name("FontDescriptor")),
                    ("FontName", ObjectSerializer::name(&font.name)),
                    // Nonsymbolic, plus Italic when flagged
                    ("Flags", ObjectSerializer::integer(if font.italic { 32 | 64 } else { 32 })),
                    (
                        "FontBBox",
                        Object::Array(vec![
                            Object::Integer(llx as i64),
                            Object::Integer(lly as i64),
                            Object::Integer(urx as i64),
                            Object::Integer(ury as i64),
                        ]),
                    ),
                    ("ItalicAngle", ObjectSerializer::integer(if font.italic { -12 } else { 0 })),
                    ("Ascent", ObjectSerializer::integer(font.ascender as i64)),
                    ("Descent", ObjectSerializer::integer(font.descender as i64)),
                    ("CapHeight", ObjectSerializer::integer(font.cap_height as i64)),
                    ("StemV", ObjectSerializer::integer(80)),
                    ("FontFile2", Object::Reference(file_ref)),
                ]);

                let mut file_dict = ObjectSerializer::dict_map(vec![(
                    "Length1",
                    ObjectSerializer::integer(font.font_data().len() as i64),
                )]);
                let file_data = encode_stream(font.font_data(), compress, &mut file_dict)?;

                let mut cmap_dict = HashMap::new();
                let cmap_data =
                    encode_stream(font.tounicode_cmap(usage).as_bytes(), compress, &mut cmap_dict)?;

                Ok(vec![
                    (type0, type0_dict),
                    (cid_ref, cid_dict),
                    (descriptor_ref, descriptor),
                    (file_ref, Object::stream(file_dict, file_data)),
                    (tounicode_ref, Object::stream(cmap_dict, cmap_data)),
                ])
            },
        }
    }
}

static GLOBAL_FONT: OnceCell<Arc<FontResource>> = OnceCell::new();

/// The process-wide font, defaulting to the Base-14 pair.
pub fn global_font() -> Arc<FontResource> {
    GLOBAL_FONT
        .get_or_init(|| Arc::new(FontResource::standard()))
        .clone()
}

/// Initialise the process-wide font once.
///
/// The first call decides: with `Some(path)` the TrueType file is loaded and
/// embedded, with `None` the Base-14 pair is used. Later calls return the
/// already installed resource.
pub fn load_global_font(path: Option<&Path>) -> Result<Arc<FontResource>> {
    let font = GLOBAL_FONT.get_or_try_init(|| {
        let resource = match path {
            Some(p) => FontResource::from_file(p)?,
            None => FontResource::standard(),
        };
        Ok::<_, Error>(Arc::new(resource))
    })?;

    if path.is_some() && font.source() != path {
        log::warn!(
            "Document font already initialised from {:?}; ignoring {:?}",
            font.source(),
            path
        );
    }
    Ok(font.clone())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_winansi_mapping() {
        assert_eq!(winansi_code('A'), Some(b'A'));
        assert_eq!(winansi_code('é'), Some(0xE9));
        assert_eq!(winansi_code('€'), Some(0x80));
        assert_eq!(winansi_code('\u{0E01}'), None);
        assert_eq!(winansi_code('\n'), None);
    }

    #[test]
    fn test_standard_encoding_substitutes_question_mark() {
        let font = FontResource::standard();
        let mut usage = GlyphUsage::new();
        let encoded = font.encode("Aé\u{0E01}", &mut usage);
        assert_eq!(encoded, EncodedText::Bytes(vec![b'A', 0xE9, b'?']));
        assert!(usage.is_empty());
    }

    #[test]
    fn test_text_width_calculation() {
        let font = FontResource::standard();
        // H(722) e(556) l(222) l(222) o(556) = 2278 units
        let width = font.text_width("Hello", 10.0, FontFace::Regular);
        assert!((width - 22.78).abs() < 0.001);
    }

    #[test]
    fn test_bold_is_wider() {
        let font = FontResource::standard();
        let regular = font.text_width("Widget", 12.0, FontFace::Regular);
        let bold = font.text_width("Widget", 12.0, FontFace::Bold);
        assert!(bold > regular);
    }

    #[test]
    fn test_proportional_variance() {
        let font = FontResource::standard();
        assert!(font.char_width('i', FontFace::Regular) < font.char_width('W', FontFace::Regular));
    }

    #[test]
    fn test_metrics() {
        let font = FontResource::standard();
        assert!((font.ascent(10.0) - 7.18).abs() < 0.001);
        assert!((font.line_height(10.0) - 9.25).abs() < 0.001);
        assert_eq!(font.line_spacing_factor(), 1.2);
    }

    #[test]
    fn test_wrap_text_greedy() {
        let font = FontResource::standard();
        // "aaaa" = 4 * 556 = 2224 units -> 22.24pt at size 10, space 2.78pt
        let lines = font.wrap_text("aaaa aaaa aaaa", 10.0, FontFace::Regular, 50.0);
        assert_eq!(lines, vec!["aaaa aaaa", "aaaa"]);
    }

    #[test]
    fn test_wrap_text_keeps_long_word_whole() {
        let font = FontResource::standard();
        let lines = font.wrap_text("ok WWWWWWWWWWWW ok", 10.0, FontFace::Regular, 30.0);
        assert_eq!(lines, vec!["ok", "WWWWWWWWWWWW", "ok"]);
    }

    #[test]
    fn test_wrap_text_explicit_breaks() {
        let font = FontResource::standard();
        let lines = font.wrap_text("one\n\ntwo", 10.0, FontFace::Regular, 500.0);
        assert_eq!(lines, vec!["one", "", "two"]);
    }

    #[test]
    fn test_resource_names() {
        let font = FontResource::standard();
        assert_eq!(font.resource_name(FontFace::Regular), "F1");
        assert_eq!(font.resource_name(FontFace::Bold), "F2");
        assert_eq!(font.resource_names(), &["F1", "F2"]);
        assert!(!font.is_embedded());
    }

    #[test]
    fn test_standard_font_objects() {
        let font = FontResource::standard();
        let mut next_id = 10;
        let objects = font
            .build_objects(
                &[ObjectRef::new(3, 0), ObjectRef::new(4, 0)],
                &GlyphUsage::new(),
                &mut next_id,
                true,
            )
            .unwrap();

        assert_eq!(objects.len(), 2);
        assert_eq!(next_id, 10);
        let bold = objects[1].1.as_dict().unwrap();
        assert_eq!(bold.get("BaseFont"), Some(&Object::Name("Helvetica-Bold".to_string())));
        assert_eq!(bold.get("Encoding"), Some(&Object::Name("WinAnsiEncoding".to_string())));
    }

    #[test]
    fn test_invalid_font_data() {
        assert!(matches!(EmbeddedFont::from_data(Vec::new()), Err(Error::Font(_))));
        assert!(matches!(EmbeddedFont::from_data(b"not a font".to_vec()), Err(Error::Font(_))));
    }

    #[test]
    fn test_missing_font_file() {
        let result = FontResource::from_file("/definitely/not/here.ttf");
        assert!(matches!(result, Err(Error::Font(_))));
    }

    #[test]
    fn test_global_font_is_shared() {
        let a = global_font();
        let b = global_font();
        assert!(Arc::ptr_eq(&a, &b));
    }
}
