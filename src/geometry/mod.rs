//! Geometric primitives for page layout.
//!
//! All coordinates are PDF points in a top-left page space: `y` grows downwards,
//! which is how the composers think about a sheet. The writer converts to the
//! bottom-left PDF user space only when emitting operators.

/// A rectangle in top-left page space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    /// X coordinate of top-left corner
    pub x: f32,
    /// Y coordinate of top-left corner
    pub y: f32,
    /// Width of rectangle
    pub width: f32,
    /// Height of rectangle
    pub height: f32,
}

impl Rect {
    /// Create a new rectangle from position and dimensions.
    ///
    /// # Examples
    ///
    /// ```
    /// use wms_docgen::geometry::Rect;
    ///
    /// let rect = Rect::new(40.0, 150.0, 520.0, 25.0);
    /// assert_eq!(rect.bottom(), 175.0);
    /// ```
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Get the left edge x-coordinate.
    pub fn left(&self) -> f32 {
        self.x
    }

    /// Get the right edge x-coordinate.
    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    /// Get the top edge y-coordinate.
    pub fn top(&self) -> f32 {
        self.y
    }

    /// Get the bottom edge y-coordinate.
    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }

    /// Lower-left y of this rectangle in PDF user space for a page of `page_height`.
    pub fn pdf_y(&self, page_height: f32) -> f32 {
        page_height - self.y - self.height
    }
}

/// An RGB color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Color {
    /// Red channel
    pub r: u8,
    /// Green channel
    pub g: u8,
    /// Blue channel
    pub b: u8,
}

impl Color {
    /// Black.
    pub const BLACK: Color = Color::hex(0x000000);
    /// White.
    pub const WHITE: Color = Color::hex(0xffffff);

    /// Create a color from channels.
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Create a color from a `0xRRGGBB` literal.
    ///
    /// ```
    /// use wms_docgen::geometry::Color;
    ///
    /// assert_eq!(Color::hex(0xf97316), Color::rgb(0xf9, 0x73, 0x16));
    /// ```
    pub const fn hex(value: u32) -> Self {
        Self {
            r: ((value >> 16) & 0xff) as u8,
            g: ((value >> 8) & 0xff) as u8,
            b: (value & 0xff) as u8,
        }
    }

    /// Channels scaled to the 0..=1 range used by the `rg`/`RG` operators.
    pub fn components(&self) -> (f32, f32, f32) {
        (self.r as f32 / 255.0, self.g as f32 / 255.0, self.b as f32 / 255.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rect_edges() {
        let rect = Rect::new(10.0, 20.0, 100.0, 50.0);
        assert_eq!(rect.left(), 10.0);
        assert_eq!(rect.right(), 110.0);
        assert_eq!(rect.top(), 20.0);
        assert_eq!(rect.bottom(), 70.0);
    }

    #[test]
    fn test_rect_pdf_y() {
        // Header band of an A4 page
        let band = Rect::new(0.0, 0.0, 595.0, 115.0);
        assert_eq!(band.pdf_y(842.0), 727.0);
    }

    #[test]
    fn test_color_hex() {
        let c = Color::hex(0x1e293b);
        assert_eq!((c.r, c.g, c.b), (0x1e, 0x29, 0x3b));
        assert_eq!(Color::WHITE.components(), (1.0, 1.0, 1.0));
        assert_eq!(Color::BLACK.components(), (0.0, 0.0, 0.0));
    }
}
