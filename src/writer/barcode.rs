//! Symbology encoder: QR codes and Code 128 barcodes.
//!
//! [`encode`] turns a text payload into an [`EncodedSymbol`], an 8-bit
//! grayscale raster with its pixel dimensions. The function is pure: the same
//! payload and options always give byte-identical pixels.
//!
//! ## Supported symbologies
//!
//! - [`SymbolKind::MatrixCode`]: QR code (via `qrcode`), byte mode, any UTF-8
//!   payload up to the capacity of the selected error correction level.
//! - [`SymbolKind::LinearCode`]: Code 128 character set B (via `barcoders`),
//!   printable ASCII only.
//!
//! ## Example
//!
//! ```
//! use wms_docgen::writer::barcode::{encode, SymbolKind, SymbolOptions};
//!
//! let qr = encode(SymbolKind::MatrixCode, "ID:P1\nNAME:Widget\nQTY:10", &SymbolOptions::default())?;
//! assert_eq!(qr.pixel_width, qr.pixel_height);
//!
//! let bars = encode(SymbolKind::LinearCode, "P1", &SymbolOptions::default().show_text(true))?;
//! assert_eq!(bars.caption.as_deref(), Some("P1"));
//! # Ok::<(), wms_docgen::EncodingError>(())
//! ```

use crate::error::EncodingError;
use crate::writer::image_handler::ImageError;

/// Code 128 requires ten modules of quiet zone on each side.
const LINEAR_QUIET_MODULES: u32 = 10;

/// Symbology selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SymbolKind {
    /// 2D matrix code (QR)
    MatrixCode,
    /// 1D linear code (Code 128)
    LinearCode,
}

impl std::fmt::Display for SymbolKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SymbolKind::MatrixCode => write!(f, "QR code"),
            SymbolKind::LinearCode => write!(f, "Code 128"),
        }
    }
}

/// QR code error correction level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum QrErrorCorrection {
    /// Low (~7% correction capability)
    Low,
    /// Medium (~15% correction capability)
    #[default]
    Medium,
    /// Quartile (~25% correction capability)
    Quartile,
    /// High (~30% correction capability)
    High,
}

impl QrErrorCorrection {
    fn ec_level(self) -> qrcode::EcLevel {
        match self {
            QrErrorCorrection::Low => qrcode::EcLevel::L,
            QrErrorCorrection::Medium => qrcode::EcLevel::M,
            QrErrorCorrection::Quartile => qrcode::EcLevel::Q,
            QrErrorCorrection::High => qrcode::EcLevel::H,
        }
    }
}

/// Options for symbol generation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SymbolOptions {
    /// QR error correction level
    pub error_correction: QrErrorCorrection,
    /// Pixels per QR module
    pub module_scale: u32,
    /// QR quiet zone (border) in modules
    pub quiet_zone: u32,
    /// Pixels per Code 128 module
    pub x_dim: u32,
    /// Code 128 bar height in pixels
    pub bar_height: u32,
    /// Reserve a band beneath the bars for the human-readable payload
    pub show_text: bool,
    /// Height of that band in pixels
    pub text_band: u32,
}

impl Default for SymbolOptions {
    fn default() -> Self {
        Self {
            error_correction: QrErrorCorrection::Medium,
            module_scale: 2,
            quiet_zone: 4,
            x_dim: 2,
            bar_height: 34,
            show_text: false,
            text_band: 14,
        }
    }
}

impl SymbolOptions {
    /// Create new symbol options with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the error correction level.
    pub fn error_correction(mut self, level: QrErrorCorrection) -> Self {
        self.error_correction = level;
        self
    }

    /// Set the pixels per QR module.
    pub fn module_scale(mut self, scale: u32) -> Self {
        self.module_scale = scale.max(1);
        self
    }

    /// Set the quiet zone (border) in modules.
    pub fn quiet_zone(mut self, modules: u32) -> Self {
        self.quiet_zone = modules;
        self
    }

    /// Set the pixels per Code 128 module.
    pub fn x_dim(mut self, px: u32) -> Self {
        self.x_dim = px.max(1);
        self
    }

    /// Set the bar height in pixels.
    pub fn bar_height(mut self, px: u32) -> Self {
        self.bar_height = px.max(1);
        self
    }

    /// Include human-readable text below the bars.
    pub fn show_text(mut self, show: bool) -> Self {
        self.show_text = show;
        self
    }
}

/// An encoded symbol: an immutable grayscale raster.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedSymbol {
    /// Symbology that produced the raster
    pub kind: SymbolKind,
    /// Row-major 8-bit gray pixels (0 = dark, 255 = light)
    pub pixels: bytes::Bytes,
    /// Raster width in pixels
    pub pixel_width: u32,
    /// Raster height in pixels
    pub pixel_height: u32,
    /// Human-readable text to print in the reserved band, if any
    pub caption: Option<String>,
    /// Height of the reserved caption band at the bottom of the raster
    pub caption_band: u32,
}

impl EncodedSymbol {
    /// Width / height of the raster.
    pub fn aspect_ratio(&self) -> f32 {
        self.pixel_width as f32 / self.pixel_height as f32
    }

    /// Encode the raster as PNG.
    pub fn to_png(&self) -> Result<Vec<u8>, ImageError> {
        let img = image::GrayImage::from_raw(self.pixel_width, self.pixel_height, self.pixels.to_vec())
            .ok_or_else(|| ImageError::InvalidData("pixel buffer size mismatch".to_string()))?;
        let mut buf = Vec::new();
        image::DynamicImage::ImageLuma8(img)
            .write_to(&mut std::io::Cursor::new(&mut buf), image::ImageFormat::Png)
            .map_err(|e| ImageError::InvalidData(format!("PNG encoding failed: {}", e)))?;
        Ok(buf)
    }
}

/// Encode `payload` as a symbol of the given kind.
pub fn encode(
    kind: SymbolKind,
    payload: &str,
    options: &SymbolOptions,
) -> Result<EncodedSymbol, EncodingError> {
    if payload.is_empty() {
        return Err(EncodingError::EmptyPayload { kind });
    }
    match kind {
        SymbolKind::MatrixCode => encode_matrix(payload, options),
        SymbolKind::LinearCode => encode_linear(payload, options),
    }
}

fn encode_matrix(payload: &str, options: &SymbolOptions) -> Result<EncodedSymbol, EncodingError> {
    use qrcode::QrCode;

    // Byte-mode input can only fail on capacity
    let code = QrCode::with_error_correction_level(payload.as_bytes(), options.error_correction.ec_level())
        .map_err(|_| EncodingError::PayloadTooLarge {
            kind: SymbolKind::MatrixCode,
            len: payload.len(),
        })?;

    let qr_width = code.width() as u32;
    let module_size = options.module_scale.max(1);
    let size = (qr_width + options.quiet_zone * 2) * module_size;
    let quiet_px = options.quiet_zone * module_size;

    let mut img = image::GrayImage::from_pixel(size, size, image::Luma([255]));
    for (y, row) in code.to_colors().chunks(qr_width as usize).enumerate() {
        for (x, &module) in row.iter().enumerate() {
            if module == qrcode::Color::Dark {
                let start_x = quiet_px + x as u32 * module_size;
                let start_y = quiet_px + y as u32 * module_size;
                fill_block(&mut img, start_x, start_y, module_size, module_size);
            }
        }
    }

    Ok(EncodedSymbol {
        kind: SymbolKind::MatrixCode,
        pixels: bytes::Bytes::from(img.into_raw()),
        pixel_width: size,
        pixel_height: size,
        caption: None,
        caption_band: 0,
    })
}

fn encode_linear(payload: &str, options: &SymbolOptions) -> Result<EncodedSymbol, EncodingError> {
    use barcoders::sym::code128::Code128;

    if let Some((position, ch)) = payload
        .chars()
        .enumerate()
        .find(|(_, c)| !matches!(*c, ' '..='~'))
    {
        return Err(EncodingError::UnsupportedCharacter { ch, position });
    }

    // \u{0181} selects character set B
    let barcode = Code128::new(&format!("\u{0181}{}", payload)).map_err(|e| {
        log::warn!("Code 128 rejected validated payload {:?}: {}", payload, e);
        EncodingError::UnsupportedCharacter {
            ch: payload.chars().next().unwrap_or(' '),
            position: 0,
        }
    })?;
    let modules = barcode.encode();

    let x_dim = options.x_dim.max(1);
    let band = if options.show_text { options.text_band } else { 0 };
    let width = (modules.len() as u32 + LINEAR_QUIET_MODULES * 2) * x_dim;
    let height = options.bar_height + band;

    let mut img = image::GrayImage::from_pixel(width, height, image::Luma([255]));
    for (i, &module) in modules.iter().enumerate() {
        if module == 1 {
            let x = (LINEAR_QUIET_MODULES + i as u32) * x_dim;
            fill_block(&mut img, x, 0, x_dim, options.bar_height);
        }
    }

    Ok(EncodedSymbol {
        kind: SymbolKind::LinearCode,
        pixels: bytes::Bytes::from(img.into_raw()),
        pixel_width: width,
        pixel_height: height,
        caption: options.show_text.then(|| payload.to_string()),
        caption_band: band,
    })
}

fn fill_block(img: &mut image::GrayImage, x: u32, y: u32, w: u32, h: u32) {
    for py in y..(y + h).min(img.height()) {
        for px in x..(x + w).min(img.width()) {
            img.put_pixel(px, py, image::Luma([0]));
        }
    }
}
