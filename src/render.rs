//! Software canvas over a `wl_shm` buffer.
//!
//! The buffer format is `Argb8888`, premultiplied, little endian (byte
//! order B, G, R, A). Shapes take logical coordinates and are multiplied
//! by the buffer scale; glyph masks arrive already in device pixels.

use euclid::default::{Point2D, Rect};

use crate::style::Color;

pub struct Canvas<'a> {
    data: &'a mut [u8],
    width: u32,
    height: u32,
    scale: f32,
}

impl<'a> Canvas<'a> {
    pub fn new(data: &'a mut [u8], width: u32, height: u32, scale: f32) -> Self {
        debug_assert_eq!(data.len(), (width * height * 4) as usize);
        Self {
            data,
            width,
            height,
            scale,
        }
    }

    /// Fully transparent; zero is also zero premultiplied.
    pub fn clear(&mut self) {
        self.data.fill(0);
    }

    /// Antialiased rounded rectangle, `rect` in logical coordinates.
    ///
    /// A border is drawn by filling the outline colour first and painting
    /// the interior on top with a smaller radius, so this only needs fills.
    pub fn fill_rounded_rect(&mut self, rect: Rect<f32>, radius: f32, color: Color) {
        let rect = rect.scale(self.scale, self.scale);
        let radius = (radius * self.scale).min(rect.width().min(rect.height()) / 2.0);

        let center = rect.center();
        let half = (rect.width() / 2.0, rect.height() / 2.0);

        let x0 = rect.min_x().floor().max(0.0) as u32;
        let y0 = rect.min_y().floor().max(0.0) as u32;
        let x1 = (rect.max_x().ceil() as i64).clamp(0, i64::from(self.width)) as u32;
        let y1 = (rect.max_y().ceil() as i64).clamp(0, i64::from(self.height)) as u32;

        for y in y0..y1 {
            for x in x0..x1 {
                let px = x as f32 + 0.5 - center.x;
                let py = y as f32 + 0.5 - center.y;
                let coverage = rounded_rect_coverage(px, py, half.0, half.1, radius);
                if coverage > 0.0 {
                    self.blend_px(x, y, color, coverage);
                }
            }
        }
    }

    /// Composites an alpha mask (one byte per pixel) tinted with `color`.
    /// `origin` is in device pixels and may be partially off-canvas.
    pub fn blend_mask(
        &mut self,
        origin: Point2D<i32>,
        mask_width: u32,
        mask_height: u32,
        mask: &[u8],
        color: Color,
    ) {
        for row in 0..mask_height {
            let y = origin.y + row as i32;
            if y < 0 || y >= self.height as i32 {
                continue;
            }
            for col in 0..mask_width {
                let x = origin.x + col as i32;
                if x < 0 || x >= self.width as i32 {
                    continue;
                }
                let coverage = mask[(row * mask_width + col) as usize];
                if coverage > 0 {
                    self.blend_px(x as u32, y as u32, color, f32::from(coverage) / 255.0);
                }
            }
        }
    }

    /// Composites a straight-alpha RGBA image (colour glyphs).
    pub fn blend_image(
        &mut self,
        origin: Point2D<i32>,
        img_width: u32,
        img_height: u32,
        rgba: &[u8],
    ) {
        for row in 0..img_height {
            let y = origin.y + row as i32;
            if y < 0 || y >= self.height as i32 {
                continue;
            }
            for col in 0..img_width {
                let x = origin.x + col as i32;
                if x < 0 || x >= self.width as i32 {
                    continue;
                }
                let idx = ((row * img_width + col) * 4) as usize;
                let color = Color {
                    r: rgba[idx],
                    g: rgba[idx + 1],
                    b: rgba[idx + 2],
                    a: rgba[idx + 3],
                };
                if color.a > 0 {
                    self.blend_px(x as u32, y as u32, color, 1.0);
                }
            }
        }
    }

    /// Source-over blend of one pixel, `coverage` in `0.0..=1.0`.
    fn blend_px(&mut self, x: u32, y: u32, color: Color, coverage: f32) {
        let idx = ((y * self.width + x) * 4) as usize;
        let alpha = f32::from(color.a) / 255.0 * coverage;
        let inv = 1.0 - alpha;

        // dst is premultiplied already; premultiply src while blending.
        let b = f32::from(color.b) * alpha + f32::from(self.data[idx]) * inv;
        let g = f32::from(color.g) * alpha + f32::from(self.data[idx + 1]) * inv;
        let r = f32::from(color.r) * alpha + f32::from(self.data[idx + 2]) * inv;
        let a = 255.0 * alpha + f32::from(self.data[idx + 3]) * inv;

        self.data[idx] = b as u8;
        self.data[idx + 1] = g as u8;
        self.data[idx + 2] = r as u8;
        self.data[idx + 3] = a as u8;
    }

    #[cfg(test)]
    fn pixel(&self, x: u32, y: u32) -> [u8; 4] {
        let idx = ((y * self.width + x) * 4) as usize;
        [
            self.data[idx],
            self.data[idx + 1],
            self.data[idx + 2],
            self.data[idx + 3],
        ]
    }
}

/// Pixel coverage from the signed distance to a rounded rectangle with
/// half extents `(hw, hh)`; `(px, py)` is relative to the centre.
fn rounded_rect_coverage(px: f32, py: f32, hw: f32, hh: f32, radius: f32) -> f32 {
    let qx = px.abs() - (hw - radius);
    let qy = py.abs() - (hh - radius);
    let outside = (qx.max(0.0).powi(2) + qy.max(0.0).powi(2)).sqrt();
    let inside = qx.max(qy).min(0.0);
    let distance = outside + inside - radius;
    (0.5 - distance).clamp(0.0, 1.0)
}

#[cfg(test)]
mod tests {
    use euclid::default::{Point2D, Rect, Size2D};
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::style;

    fn canvas_buf(w: u32, h: u32) -> Vec<u8> {
        vec![0; (w * h * 4) as usize]
    }

    #[test]
    fn fill_covers_centre_and_misses_corner() {
        let mut buf = canvas_buf(20, 20);
        let mut canvas = Canvas::new(&mut buf, 20, 20, 1.0);
        canvas.fill_rounded_rect(
            Rect::new(Point2D::origin(), Size2D::new(20.0, 20.0)),
            8.0,
            style::GREEN,
        );

        // Centre is fully opaque fill.
        let centre = canvas.pixel(10, 10);
        assert_eq!(centre[3], 255);
        // The very corner lies outside the 8px corner arc.
        assert_eq!(canvas.pixel(0, 0), [0, 0, 0, 0]);
    }

    #[test]
    fn fill_clips_to_canvas_bounds() {
        let mut buf = canvas_buf(4, 4);
        let mut canvas = Canvas::new(&mut buf, 4, 4, 1.0);
        // Larger than the canvas on every side; must not panic.
        canvas.fill_rounded_rect(
            Rect::new(Point2D::new(-10.0, -10.0), Size2D::new(40.0, 40.0)),
            0.0,
            style::TEXT,
        );
        assert_eq!(canvas.pixel(0, 0)[3], 255);
        assert_eq!(canvas.pixel(3, 3)[3], 255);
    }

    #[test]
    fn scale_multiplies_shape_extents() {
        let mut buf = canvas_buf(8, 8);
        let mut canvas = Canvas::new(&mut buf, 8, 8, 2.0);
        // 3x3 logical square becomes 6x6 device pixels.
        canvas.fill_rounded_rect(
            Rect::new(Point2D::origin(), Size2D::new(3.0, 3.0)),
            0.0,
            style::TEXT,
        );
        assert_eq!(canvas.pixel(5, 5)[3], 255);
        assert_eq!(canvas.pixel(6, 6), [0, 0, 0, 0]);
    }

    #[test]
    fn full_mask_writes_premultiplied_colour() {
        let mut buf = canvas_buf(2, 2);
        let mut canvas = Canvas::new(&mut buf, 2, 2, 1.0);
        canvas.blend_mask(Point2D::new(0, 0), 1, 1, &[255], style::BLUE);

        // Opaque colour over transparent: straight channels, B G R A order.
        assert_eq!(
            canvas.pixel(0, 0),
            [style::BLUE.b, style::BLUE.g, style::BLUE.r, 255]
        );
    }

    #[test]
    fn mask_is_clipped_not_wrapped() {
        let mut buf = canvas_buf(2, 2);
        let mut canvas = Canvas::new(&mut buf, 2, 2, 1.0);
        canvas.blend_mask(Point2D::new(-1, -1), 3, 3, &[255; 9], style::TEXT);
        // Only the overlapping quadrant is touched.
        assert_eq!(canvas.pixel(1, 1)[3], 255);
    }

    #[test]
    fn coverage_is_signed_distance_based() {
        // Deep inside, on the edge, far outside.
        assert_eq!(rounded_rect_coverage(0.0, 0.0, 10.0, 10.0, 2.0), 1.0);
        assert_eq!(rounded_rect_coverage(10.5, 0.0, 10.0, 10.0, 2.0), 0.0);
        let edge = rounded_rect_coverage(10.0, 0.0, 10.0, 10.0, 2.0);
        assert_eq!(edge, 0.5);
    }
}
