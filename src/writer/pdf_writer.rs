//! PDF document writer.
//!
//! Streams a PDF file to any `io::Write` sink one page at a time:
//! header, page bodies as they are finalised, then fonts, page tree,
//! catalog, xref table and trailer on [`PdfWriter::finish`].
//!
//! Object ids 1 (catalog) and 2 (page tree) and the font roots are reserved
//! up front so already written pages can reference them.

use super::font_manager::{FontResource, GlyphUsage};
use super::image_handler::ImageData;
use super::object_serializer::ObjectSerializer;
use crate::object::{Object, ObjectRef};
use std::collections::HashMap;
use std::io::{self, Write};

const CATALOG_ID: u32 = 1;
const PAGES_ID: u32 = 2;

/// Configuration for PDF generation.
#[derive(Debug, Clone)]
pub struct PdfWriterConfig {
    /// PDF version (e.g., "1.7")
    pub version: String,
    /// Document title
    pub title: Option<String>,
    /// Creator application
    pub creator: Option<String>,
    /// Whether to compress content streams
    pub compress: bool,
}

impl Default for PdfWriterConfig {
    fn default() -> Self {
        Self {
            version: "1.7".to_string(),
            title: None,
            creator: Some("wms_docgen".to_string()),
            compress: true,
        }
    }
}

impl PdfWriterConfig {
    /// Set document title.
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Enable or disable stream compression.
    ///
    /// When enabled, content streams and the embedded font program are
    /// compressed using FlateDecode.
    pub fn with_compress(mut self, compress: bool) -> Self {
        self.compress = compress;
        self
    }
}

/// Flate-compress a stream payload when enabled, recording the filter.
pub(crate) fn encode_stream(
    data: &[u8],
    compress: bool,
    dict: &mut HashMap<String, Object>,
) -> io::Result<Vec<u8>> {
    if !compress {
        return Ok(data.to_vec());
    }

    use flate2::write::ZlibEncoder;
    use flate2::Compression;

    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(data)?;
    dict.insert("Filter".to_string(), Object::Name("FlateDecode".to_string()));
    encoder.finish()
}

/// Byte-counting adapter over the output sink.
#[derive(Debug)]
struct CountingWriter<W> {
    inner: W,
    count: u64,
}

impl<W: Write> Write for CountingWriter<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let n = self.inner.write(buf)?;
        self.count += n as u64;
        Ok(n)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.inner.flush()
    }
}

/// An image XObject placed on a page under a resource name.
#[derive(Debug, Clone)]
pub struct PageImage {
    /// Resource name used by the `Do` operator
    pub name: String,
    /// Decoded image
    pub data: ImageData,
}

/// Streaming PDF document writer.
pub struct PdfWriter<W: Write> {
    config: PdfWriterConfig,
    out: CountingWriter<W>,
    serializer: ObjectSerializer,
    header_written: bool,
    /// Object ID counter
    next_obj_id: u32,
    /// Font resources (name -> reserved object ref)
    fonts: Vec<(&'static str, ObjectRef)>,
    /// Pages written so far
    page_refs: Vec<ObjectRef>,
    /// Byte offset of every written object
    xref_offsets: Vec<(u32, u64)>,
}

impl<W: Write> PdfWriter<W> {
    /// Create a writer over `sink`, reserving one font object per resource name.
    pub fn new(sink: W, config: PdfWriterConfig, font_resources: &[&'static str]) -> Self {
        let mut next_obj_id = PAGES_ID + 1;
        let fonts = font_resources
            .iter()
            .map(|name| {
                let r = ObjectRef::new(next_obj_id, 0);
                next_obj_id += 1;
                (*name, r)
            })
            .collect();

        Self {
            config,
            out: CountingWriter {
                inner: sink,
                count: 0,
            },
            serializer: ObjectSerializer::compact(),
            header_written: false,
            next_obj_id,
            fonts,
            page_refs: Vec::new(),
            xref_offsets: Vec::new(),
        }
    }

    /// Bytes written to the sink so far.
    pub fn bytes_written(&self) -> u64 {
        self.out.count
    }

    /// Number of pages already streamed.
    pub fn page_count(&self) -> usize {
        self.page_refs.len()
    }

    /// Allocate a new object ID.
    fn alloc_obj_id(&mut self) -> ObjectRef {
        let id = self.next_obj_id;
        self.next_obj_id += 1;
        ObjectRef::new(id, 0)
    }

    fn ensure_header(&mut self) -> io::Result<()> {
        if !self.header_written {
            writeln!(self.out, "%PDF-{}", self.config.version)?;
            // Binary marker
            self.out.write_all(b"%\xE2\xE3\xCF\xD3\n")?;
            self.header_written = true;
        }
        Ok(())
    }

    fn write_object(&mut self, id: ObjectRef, obj: &Object) -> io::Result<()> {
        self.xref_offsets.push((id.id, self.out.count));
        self.serializer.write_indirect(&mut self.out, id, obj)
    }

    /// Stream one finished page: its images, content stream and page object.
    pub fn write_page(
        &mut self,
        width: f32,
        height: f32,
        content: &[u8],
        images: &[PageImage],
    ) -> io::Result<()> {
        self.ensure_header()?;

        let mut xobjects = HashMap::new();
        for image in images {
            let mut dict = image.data.build_xobject_dict();
            if let (Some(mask_dict), Some(mask)) =
                (image.data.build_soft_mask_dict(), image.data.soft_mask.as_ref())
            {
                let mask_ref = self.alloc_obj_id();
                self.write_object(mask_ref, &Object::stream(mask_dict, mask.clone()))?;
                dict.insert("SMask".to_string(), Object::Reference(mask_ref));
            }
            let image_ref = self.alloc_obj_id();
            self.write_object(image_ref, &Object::stream(dict, image.data.data.clone()))?;
            xobjects.insert(image.name.clone(), Object::Reference(image_ref));
        }

        let mut content_dict = HashMap::new();
        let content_bytes = encode_stream(content, self.config.compress, &mut content_dict)?;
        let content_ref = self.alloc_obj_id();
        self.write_object(content_ref, &Object::stream(content_dict, content_bytes))?;

        let font_resources: HashMap<String, Object> = self
            .fonts
            .iter()
            .map(|(name, r)| (name.to_string(), Object::Reference(*r)))
            .collect();
        let mut resources = vec![("Font", Object::Dictionary(font_resources))];
        if !xobjects.is_empty() {
            resources.push(("XObject", Object::Dictionary(xobjects)));
        }

        let page_obj = ObjectSerializer::dict(vec![
            ("Type", ObjectSerializer::name("Page")),
            ("Parent", ObjectSerializer::reference(ObjectRef::new(PAGES_ID, 0))),
            (
                "MediaBox",
                ObjectSerializer::rect(0.0, 0.0, width as f64, height as f64),
            ),
            ("Contents", ObjectSerializer::reference(content_ref)),
            ("Resources", ObjectSerializer::dict(resources)),
        ]);
        let page_ref = self.alloc_obj_id();
        self.write_object(page_ref, &page_obj)?;
        self.page_refs.push(page_ref);

        Ok(())
    }

    /// Write fonts, page tree, catalog, info, xref and trailer.
    ///
    /// Returns the sink and the total number of bytes written to it.
    pub fn finish(mut self, font: &FontResource, usage: &GlyphUsage) -> io::Result<(W, u64)> {
        self.ensure_header()?;

        let roots: Vec<ObjectRef> = self.fonts.iter().map(|(_, r)| *r).collect();
        let mut next_id = self.next_obj_id;
        let font_objects = font.build_objects(&roots, usage, &mut next_id, self.config.compress)?;
        self.next_obj_id = next_id;
        for (r, obj) in &font_objects {
            self.write_object(*r, obj)?;
        }

        let pages_obj = ObjectSerializer::dict(vec![
            ("Type", ObjectSerializer::name("Pages")),
            (
                "Kids",
                Object::Array(self.page_refs.iter().map(|r| Object::Reference(*r)).collect()),
            ),
            ("Count", ObjectSerializer::integer(self.page_refs.len() as i64)),
        ]);
        self.write_object(ObjectRef::new(PAGES_ID, 0), &pages_obj)?;

        let catalog_obj = ObjectSerializer::dict(vec![
            ("Type", ObjectSerializer::name("Catalog")),
            ("Pages", ObjectSerializer::reference(ObjectRef::new(PAGES_ID, 0))),
        ]);
        self.write_object(ObjectRef::new(CATALOG_ID, 0), &catalog_obj)?;

        let mut info_entries = Vec::new();
        if let Some(title) = &self.config.title {
            info_entries.push(("Title", ObjectSerializer::string(title)));
        }
        if let Some(creator) = &self.config.creator {
            info_entries.push(("Creator", ObjectSerializer::string(creator)));
            info_entries.push(("Producer", ObjectSerializer::string(creator)));
        }
        let info_ref = self.alloc_obj_id();
        self.write_object(info_ref, &ObjectSerializer::dict(info_entries))?;

        // Write xref table
        let xref_start = self.out.count;
        writeln!(self.out, "xref")?;
        writeln!(self.out, "0 {}", self.next_obj_id)?;

        // Object 0 is always free
        writeln!(self.out, "0000000000 65535 f ")?;

        // Sort xref entries by object ID
        self.xref_offsets.sort_by_key(|(id, _)| *id);
        for (_, offset) in &self.xref_offsets {
            writeln!(self.out, "{:010} 00000 n ", offset)?;
        }

        let trailer = ObjectSerializer::dict(vec![
            ("Size", ObjectSerializer::integer(self.next_obj_id as i64)),
            ("Root", ObjectSerializer::reference(ObjectRef::new(CATALOG_ID, 0))),
            ("Info", ObjectSerializer::reference(info_ref)),
        ]);

        writeln!(self.out, "trailer")?;
        self.serializer.write_object(&mut self.out, &trailer)?;
        writeln!(self.out)?;
        writeln!(self.out, "startxref")?;
        writeln!(self.out, "{}", xref_start)?;
        write!(self.out, "%%EOF")?;
        self.out.flush()?;

        Ok((self.out.inner, self.out.count))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn standard_writer(sink: Vec<u8>) -> (PdfWriter<Vec<u8>>, FontResource) {
        let font = FontResource::standard();
        let config = PdfWriterConfig::default().with_compress(false);
        (PdfWriter::new(sink, config, font.resource_names()), font)
    }

    #[test]
    fn test_header_is_lazy() {
        let (writer, _) = standard_writer(Vec::new());
        assert_eq!(writer.bytes_written(), 0);
    }

    #[test]
    fn test_single_page_document() {
        let (mut writer, font) = standard_writer(Vec::new());
        writer
            .write_page(595.0, 842.0, b"BT\n/F1 12 Tf\n(Hello) Tj\nET\n", &[])
            .unwrap();
        assert!(writer.bytes_written() > 0);
        assert_eq!(writer.page_count(), 1);

        let (bytes, total) = writer.finish(&font, &GlyphUsage::new()).unwrap();
        assert_eq!(total, bytes.len() as u64);
        let content = String::from_utf8_lossy(&bytes);

        assert!(content.starts_with("%PDF-1.7"));
        assert!(content.contains("/Type /Catalog"));
        assert!(content.contains("/Type /Pages"));
        assert!(content.contains("/Count 1"));
        assert!(content.contains("[0 0 595 842]"));
        assert!(content.contains("/BaseFont /Helvetica-Bold"));
        assert!(content.contains("(Hello) Tj"));
        assert!(content.ends_with("%%EOF"));
    }

    #[test]
    fn test_xref_offsets_point_at_objects() {
        let (mut writer, font) = standard_writer(Vec::new());
        writer.write_page(595.0, 842.0, b"", &[]).unwrap();
        writer.write_page(595.0, 842.0, b"", &[]).unwrap();
        let (bytes, total) = writer.finish(&font, &GlyphUsage::new()).unwrap();
        assert_eq!(total, bytes.len() as u64);

        let find = |needle: &[u8]| bytes.windows(needle.len()).rposition(|w| w == needle);
        let xref_pos = find(b"\nxref\n").unwrap() + 1;
        // Everything after the binary marker is ASCII
        let tail = std::str::from_utf8(&bytes[xref_pos..]).unwrap();
        let entries: Vec<&str> = tail.lines().skip(3).take_while(|l| l.ends_with(" n ")).collect();
        assert_eq!(entries.len(), 9);
        for (i, entry) in entries.iter().enumerate() {
            let offset: usize = entry[..10].parse().unwrap();
            assert!(bytes[offset..].starts_with(format!("{} 0 obj", i + 1).as_bytes()));
        }

        let start: usize = tail
            .lines()
            .skip_while(|l| *l != "startxref")
            .nth(1)
            .unwrap()
            .parse()
            .unwrap();
        assert_eq!(start, xref_pos);
    }

    #[test]
    fn test_compressed_content_stream() {
        let font = FontResource::standard();
        let mut writer = PdfWriter::new(Vec::new(), PdfWriterConfig::default(), font.resource_names());
        writer.write_page(595.0, 842.0, b"0 0 10 10 re\nf\n", &[]).unwrap();
        let (bytes, total) = writer.finish(&font, &GlyphUsage::new()).unwrap();
        assert_eq!(total, bytes.len() as u64);
        let content = String::from_utf8_lossy(&bytes);
        assert!(content.contains("/Filter /FlateDecode"));
        assert!(!content.contains("0 0 10 10 re"));
    }

    #[test]
    fn test_metadata() {
        let font = FontResource::standard();
        let config = PdfWriterConfig::default().with_title("Receipt").with_compress(false);
        let mut writer = PdfWriter::new(Vec::new(), config, font.resource_names());
        writer.write_page(595.0, 842.0, b"", &[]).unwrap();
        let (bytes, total) = writer.finish(&font, &GlyphUsage::new()).unwrap();
        assert_eq!(total, bytes.len() as u64);
        let content = String::from_utf8_lossy(&bytes);
        assert!(content.contains("/Title (Receipt)"));
        assert!(content.contains("/Creator (wms_docgen)"));
    }

    #[test]
    fn test_sink_failure_is_reported() {
        struct Broken;
        impl Write for Broken {
            fn write(&mut self, _: &[u8]) -> io::Result<usize> {
                Err(io::Error::new(io::ErrorKind::BrokenPipe, "closed"))
            }
            fn flush(&mut self) -> io::Result<()> {
                Ok(())
            }
        }

        let font = FontResource::standard();
        let mut writer = PdfWriter::new(Broken, PdfWriterConfig::default(), font.resource_names());
        let err = writer.write_page(595.0, 842.0, b"", &[]).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::BrokenPipe);
        assert_eq!(writer.bytes_written(), 0);
    }
}
