//! Image handling for PDF generation.
//!
//! Encoded symbols arrive as raw 8-bit gray pixels ([`ImageData::from_gray`]);
//! caller-supplied images arrive as PNG bytes ([`ImageData::from_png`]), which
//! are decoded and split into color and alpha planes. Per PDF spec Section 8.9
//! both are embedded as Flate-compressed image XObjects.
//!
//! # Color Spaces
//!
//! - DeviceGray (1 component)
//! - DeviceRGB (3 components)

use std::collections::HashMap;
use std::io::Write;

use crate::object::Object;

/// Color space for image data.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorSpace {
    /// Grayscale (1 component per pixel)
    DeviceGray,
    /// RGB color (3 components per pixel)
    DeviceRGB,
}

impl ColorSpace {
    /// Get the number of color components.
    pub fn components(&self) -> u8 {
        match self {
            ColorSpace::DeviceGray => 1,
            ColorSpace::DeviceRGB => 3,
        }
    }

    /// Get the PDF name for this color space.
    pub fn pdf_name(&self) -> &'static str {
        match self {
            ColorSpace::DeviceGray => "DeviceGray",
            ColorSpace::DeviceRGB => "DeviceRGB",
        }
    }
}

/// Decoded, compressed image data ready for embedding.
#[derive(Debug, Clone)]
pub struct ImageData {
    /// Image width in pixels
    pub width: u32,
    /// Image height in pixels
    pub height: u32,
    /// Bits per component (always 8 here)
    pub bits_per_component: u8,
    /// Color space
    pub color_space: ColorSpace,
    /// Flate-compressed pixel data
    pub data: Vec<u8>,
    /// Optional Flate-compressed alpha plane
    pub soft_mask: Option<Vec<u8>>,
}

impl ImageData {
    /// Load a PNG image from raw PNG data.
    pub fn from_png(data: &[u8]) -> Result<Self, ImageError> {
        use image::GenericImageView;

        if data.len() < 8 || &data[0..8] != b"\x89PNG\r\n\x1a\n" {
            return Err(ImageError::UnsupportedFormat);
        }

        let img = image::load_from_memory_with_format(data, image::ImageFormat::Png)
            .map_err(|e| ImageError::DecodeError(e.to_string()))?;

        let (width, height) = img.dimensions();
        if width == 0 || height == 0 {
            return Err(ImageError::InvalidData("image has no pixels".to_string()));
        }

        let (color_space, pixels, alpha) = match img.color() {
            image::ColorType::L8 | image::ColorType::L16 => {
                (ColorSpace::DeviceGray, img.to_luma8().into_raw(), None)
            },
            image::ColorType::La8 | image::ColorType::La16 => {
                let la = img.to_luma_alpha8();
                let mut gray = Vec::with_capacity((width * height) as usize);
                let mut alpha_channel = Vec::with_capacity((width * height) as usize);
                for pixel in la.pixels() {
                    gray.push(pixel.0[0]);
                    alpha_channel.push(pixel.0[1]);
                }
                (ColorSpace::DeviceGray, gray, Some(alpha_channel))
            },
            image::ColorType::Rgba8 | image::ColorType::Rgba16 => {
                let rgba = img.to_rgba8();
                let mut rgb = Vec::with_capacity((width * height * 3) as usize);
                let mut alpha_channel = Vec::with_capacity((width * height) as usize);
                for pixel in rgba.pixels() {
                    rgb.extend_from_slice(&pixel.0[..3]);
                    alpha_channel.push(pixel.0[3]);
                }
                (ColorSpace::DeviceRGB, rgb, Some(alpha_channel))
            },
            _ => (ColorSpace::DeviceRGB, img.to_rgb8().into_raw(), None),
        };

        // Fully opaque alpha planes are dropped
        let alpha = alpha.filter(|a| a.iter().any(|&v| v != 0xFF));

        Ok(Self {
            width,
            height,
            bits_per_component: 8,
            color_space,
            data: compress_image_data(&pixels)?,
            soft_mask: alpha.map(|a| compress_image_data(&a)).transpose()?,
        })
    }

    /// Wrap raw 8-bit grayscale pixels (row-major, no alpha).
    pub fn from_gray(width: u32, height: u32, pixels: &[u8]) -> Result<Self, ImageError> {
        if width == 0 || height == 0 || pixels.len() != (width as usize) * (height as usize) {
            return Err(ImageError::InvalidData(format!(
                "{} bytes do not describe a {}x{} gray raster",
                pixels.len(),
                width,
                height
            )));
        }

        Ok(Self {
            width,
            height,
            bits_per_component: 8,
            color_space: ColorSpace::DeviceGray,
            data: compress_image_data(pixels)?,
            soft_mask: None,
        })
    }

    /// Build the PDF Image XObject dictionary (without `Length` or `SMask`).
    pub fn build_xobject_dict(&self) -> HashMap<String, Object> {
        let mut dict = HashMap::new();
        dict.insert("Type".to_string(), Object::Name("XObject".to_string()));
        dict.insert("Subtype".to_string(), Object::Name("Image".to_string()));
        dict.insert("Width".to_string(), Object::Integer(self.width as i64));
        dict.insert("Height".to_string(), Object::Integer(self.height as i64));
        dict.insert(
            "ColorSpace".to_string(),
            Object::Name(self.color_space.pdf_name().to_string()),
        );
        dict.insert(
            "BitsPerComponent".to_string(),
            Object::Integer(self.bits_per_component as i64),
        );
        dict.insert("Filter".to_string(), Object::Name("FlateDecode".to_string()));
        dict
    }

    /// Build a soft mask (alpha channel) XObject dictionary.
    pub fn build_soft_mask_dict(&self) -> Option<HashMap<String, Object>> {
        self.soft_mask.as_ref().map(|_| {
            let mut dict = HashMap::new();
            dict.insert("Type".to_string(), Object::Name("XObject".to_string()));
            dict.insert("Subtype".to_string(), Object::Name("Image".to_string()));
            dict.insert("Width".to_string(), Object::Integer(self.width as i64));
            dict.insert("Height".to_string(), Object::Integer(self.height as i64));
            dict.insert("ColorSpace".to_string(), Object::Name("DeviceGray".to_string()));
            dict.insert("BitsPerComponent".to_string(), Object::Integer(8));
            dict.insert("Filter".to_string(), Object::Name("FlateDecode".to_string()));
            dict
        })
    }

    /// Get the aspect ratio (width / height).
    pub fn aspect_ratio(&self) -> f32 {
        self.width as f32 / self.height as f32
    }

    /// Display size for a requested width, deriving the height from the aspect ratio
    /// when none is given.
    pub fn display_size(&self, width: f32, height: Option<f32>) -> (f32, f32) {
        match height {
            Some(h) => (width, h),
            None => (width, width / self.aspect_ratio()),
        }
    }
}

/// Image embedding error.
#[derive(Debug, thiserror::Error)]
pub enum ImageError {
    /// Unsupported image format
    #[error("Unsupported image format (expected PNG)")]
    UnsupportedFormat,

    /// Failed to decode image
    #[error("Failed to decode image: {0}")]
    DecodeError(String),

    /// Failed to compress image data
    #[error("Compression error: {0}")]
    CompressionError(String),

    /// Invalid image data
    #[error("Invalid image data: {0}")]
    InvalidData(String),
}

/// Compress image data using Flate.
fn compress_image_data(data: &[u8]) -> Result<Vec<u8>, ImageError> {
    use flate2::write::ZlibEncoder;
    use flate2::Compression;

    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
    encoder
        .write_all(data)
        .map_err(|e| ImageError::CompressionError(e.to_string()))?;
    encoder
        .finish()
        .map_err(|e| ImageError::CompressionError(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn png(img: image::DynamicImage) -> Vec<u8> {
        let mut buf = Vec::new();
        img.write_to(&mut std::io::Cursor::new(&mut buf), image::ImageFormat::Png)
            .unwrap();
        buf
    }

    #[test]
    fn test_color_space_components() {
        assert_eq!(ColorSpace::DeviceGray.components(), 1);
        assert_eq!(ColorSpace::DeviceRGB.components(), 3);
        assert_eq!(ColorSpace::DeviceRGB.pdf_name(), "DeviceRGB");
    }

    #[test]
    fn test_gray_png() {
        let img = image::GrayImage::from_pixel(40, 20, image::Luma([255]));
        let data = ImageData::from_png(&png(image::DynamicImage::ImageLuma8(img))).unwrap();

        assert_eq!((data.width, data.height), (40, 20));
        assert_eq!(data.color_space, ColorSpace::DeviceGray);
        assert!(data.soft_mask.is_none());
        assert_eq!(data.display_size(80.0, None), (80.0, 40.0));
        assert_eq!(data.display_size(80.0, Some(10.0)), (80.0, 10.0));
    }

    #[test]
    fn test_rgba_png_keeps_alpha() {
        let mut img = image::RgbaImage::from_pixel(4, 4, image::Rgba([255, 0, 0, 255]));
        img.put_pixel(0, 0, image::Rgba([0, 0, 0, 0]));
        let data = ImageData::from_png(&png(image::DynamicImage::ImageRgba8(img))).unwrap();

        assert_eq!(data.color_space, ColorSpace::DeviceRGB);
        assert!(data.soft_mask.is_some());
        assert!(data.build_soft_mask_dict().is_some());
    }

    #[test]
    fn test_opaque_alpha_dropped() {
        let img = image::RgbaImage::from_pixel(4, 4, image::Rgba([1, 2, 3, 255]));
        let data = ImageData::from_png(&png(image::DynamicImage::ImageRgba8(img))).unwrap();
        assert!(data.soft_mask.is_none());
    }

    #[test]
    fn test_xobject_dict() {
        let img = image::GrayImage::from_pixel(3, 2, image::Luma([0]));
        let data = ImageData::from_png(&png(image::DynamicImage::ImageLuma8(img))).unwrap();
        let dict = data.build_xobject_dict();

        assert_eq!(dict.get("Subtype"), Some(&Object::Name("Image".to_string())));
        assert_eq!(dict.get("Width"), Some(&Object::Integer(3)));
        assert_eq!(dict.get("Filter"), Some(&Object::Name("FlateDecode".to_string())));
        assert!(!dict.contains_key("DecodeParms"));
    }

    #[test]
    fn test_from_gray() {
        let data = ImageData::from_gray(3, 2, &[0, 255, 0, 255, 0, 255]).unwrap();
        assert_eq!(data.color_space, ColorSpace::DeviceGray);
        assert_eq!(data.aspect_ratio(), 1.5);
        assert!(matches!(ImageData::from_gray(3, 2, &[0; 5]), Err(ImageError::InvalidData(_))));
    }

    #[test]
    fn test_not_png() {
        let result = ImageData::from_png(b"\xFF\xD8\xFF\xE0 jpeg");
        assert!(matches!(result, Err(ImageError::UnsupportedFormat)));
    }
}
