// ABOUTME: Integer scanline rasterizer turning polygons into a single-channel mask bitmap
// ABOUTME: Also encodes binary PGM and reads the dimensions back from a PGM header
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use serde::{Deserialize, Serialize};

use motionctl_core::constants::limits::MAX_MASK_DIMENSION;

use crate::errors::{AppError, AppResult};

/// Pixel value of an active region when not inverted
pub const ACTIVE: u8 = 255;
/// Pixel value of the background when not inverted
pub const BACKGROUND: u8 = 0;
/// Largest accepted absolute vertex coordinate; keeps crossing math inside i64
pub const COORDINATE_LIMIT: i64 = 1_000_000;

/// A polygon vertex; accepts `[x, y]` or `{"x": .., "y": ..}` on the wire
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "PointRepr")]
pub struct Point {
    /// Column
    pub x: i64,
    /// Row
    pub y: i64,
}

impl Point {
    /// Point at `(x, y)`
    #[must_use]
    pub const fn new(x: i64, y: i64) -> Self {
        Self { x, y }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum PointRepr {
    Pair([i64; 2]),
    Object { x: i64, y: i64 },
}

impl From<PointRepr> for Point {
    fn from(repr: PointRepr) -> Self {
        match repr {
            PointRepr::Pair([x, y]) | PointRepr::Object { x, y } => Self { x, y },
        }
    }
}

/// Polygons to rasterize onto a `width`×`height` bitmap
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MaskRequest {
    /// Polygons composited into one bitmap
    #[serde(default)]
    pub polygons: Vec<Vec<Point>>,
    /// Bitmap width in pixels
    pub width: u32,
    /// Bitmap height in pixels
    pub height: u32,
    /// Swap which value marks the polygon interior
    #[serde(default)]
    pub invert: bool,
}

impl MaskRequest {
    /// Check both dimensions lie in `1..=9999` and every vertex is near the image
    ///
    /// # Errors
    ///
    /// `ValueOutOfRange` naming the offending dimension or vertex
    pub fn validate(&self) -> AppResult<()> {
        for (label, value) in [("width", self.width), ("height", self.height)] {
            if !(1..=MAX_MASK_DIMENSION).contains(&value) {
                return Err(AppError::out_of_range(format!(
                    "Mask {label} must be between 1 and {MAX_MASK_DIMENSION}, got {value}"
                )));
            }
        }
        let limit = -COORDINATE_LIMIT..=COORDINATE_LIMIT;
        if let Some(point) = self
            .polygons
            .iter()
            .flatten()
            .find(|point| !limit.contains(&point.x) || !limit.contains(&point.y))
        {
            return Err(AppError::out_of_range(format!(
                "Vertex ({}, {}) is outside +/-{COORDINATE_LIMIT}",
                point.x, point.y
            )));
        }
        Ok(())
    }

    /// Validate and rasterize every polygon
    ///
    /// # Errors
    ///
    /// Dimension errors from [`Self::validate`]
    pub fn rasterize(&self) -> AppResult<MaskBitmap> {
        self.validate()?;
        let (background, fill) = if self.invert {
            (ACTIVE, BACKGROUND)
        } else {
            (BACKGROUND, ACTIVE)
        };
        let mut bitmap = MaskBitmap::filled(self.width, self.height, background);
        for polygon in &self.polygons {
            bitmap.fill_polygon(polygon, fill);
        }
        Ok(bitmap)
    }
}

/// Row-major single-byte-per-pixel bitmap
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MaskBitmap {
    width: u32,
    height: u32,
    pixels: Vec<u8>,
}

impl MaskBitmap {
    /// Bitmap with every pixel set to `value`
    #[must_use]
    pub fn filled(width: u32, height: u32, value: u8) -> Self {
        Self {
            width,
            height,
            pixels: vec![value; width as usize * height as usize],
        }
    }

    /// Width in pixels
    #[must_use]
    pub const fn width(&self) -> u32 {
        self.width
    }

    /// Height in pixels
    #[must_use]
    pub const fn height(&self) -> u32 {
        self.height
    }

    /// Raw pixels, row-major
    #[must_use]
    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    /// Pixel at `(x, y)`, `None` outside the bitmap
    #[must_use]
    pub fn pixel(&self, x: u32, y: u32) -> Option<u8> {
        if x >= self.width || y >= self.height {
            return None;
        }
        self.pixels
            .get(y as usize * self.width as usize + x as usize)
            .copied()
    }

    /// Scanline fill of one polygon
    ///
    /// Fewer than three vertices draw nothing. Crossings use the half-open test
    /// `y1 <= y < y2` so a vertex shared by two edges is counted once.
    pub fn fill_polygon(&mut self, polygon: &[Point], value: u8) {
        if polygon.len() < 3 || self.pixels.is_empty() {
            return;
        }
        let width = i64::from(self.width);
        let height = i64::from(self.height);

        let min_y = polygon.iter().map(|p| p.y).min().unwrap_or(0).max(0);
        let max_y = polygon
            .iter()
            .map(|p| p.y)
            .max()
            .unwrap_or(-1)
            .min(height - 1);

        let mut crossings = Vec::with_capacity(polygon.len());
        for y in min_y..=max_y {
            crossings.clear();
            for (i, start) in polygon.iter().enumerate() {
                let end = polygon[(i + 1) % polygon.len()];
                if (start.y <= y && end.y > y) || (end.y <= y && start.y > y) {
                    crossings
                        .push(start.x + (y - start.y) * (end.x - start.x) / (end.y - start.y));
                }
            }
            crossings.sort_unstable();

            let row = (y * width) as usize;
            for span in crossings.chunks_exact(2) {
                let from = span[0].max(0);
                let to = span[1].min(width - 1);
                if from > to {
                    continue;
                }
                self.pixels[row + from as usize..=row + to as usize].fill(value);
            }
        }
    }

    /// Binary PGM: `P5`, `width height`, `255`, then the raw pixels
    #[must_use]
    pub fn to_pgm_bytes(&self) -> Vec<u8> {
        let header = format!("P5\n{} {}\n255\n", self.width, self.height);
        let mut bytes = Vec::with_capacity(header.len() + self.pixels.len());
        bytes.extend_from_slice(header.as_bytes());
        bytes.extend_from_slice(&self.pixels);
        bytes
    }
}

/// Dimensions read from a PGM header
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PgmHeader {
    /// Width in pixels
    pub width: u32,
    /// Height in pixels
    pub height: u32,
    /// Maximum sample value
    pub max_value: u32,
}

impl PgmHeader {
    /// Parse the header at the start of `bytes`, skipping `#` comment lines
    ///
    /// Returns `None` when the magic is not `P5` or a field is missing.
    #[must_use]
    pub fn parse(bytes: &[u8]) -> Option<Self> {
        let mut lines = bytes
            .split(|byte| *byte == b'\n')
            .map(|line| std::str::from_utf8(line).ok().map(str::trim));

        if lines.next()?? != "P5" {
            return None;
        }
        let mut fields = lines
            .filter(|line| !matches!(line, Some(text) if text.starts_with('#')))
            .map_while(|line| line);
        let mut dimensions = fields.next()?.split_whitespace();
        let width = dimensions.next()?.parse().ok()?;
        let height = dimensions.next()?.parse().ok()?;
        let max_value = fields.next()?.parse().ok()?;
        Some(Self {
            width,
            height,
            max_value,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square(x0: i64, y0: i64, x1: i64, y1: i64) -> Vec<Point> {
        vec![
            Point::new(x0, y0),
            Point::new(x1, y0),
            Point::new(x1, y1),
            Point::new(x0, y1),
        ]
    }

    fn request(polygons: Vec<Vec<Point>>, invert: bool) -> MaskRequest {
        MaskRequest {
            polygons,
            width: 10,
            height: 10,
            invert,
        }
    }

    #[test]
    fn test_square_fills_half_open_rows() {
        let bitmap = request(vec![square(2, 2, 5, 5)], false)
            .rasterize()
            .unwrap();
        // Rows 2..=4 cross both vertical edges; row 5 only touches the bottom vertices.
        assert_eq!(bitmap.pixel(2, 2), Some(ACTIVE));
        assert_eq!(bitmap.pixel(5, 4), Some(ACTIVE));
        assert_eq!(bitmap.pixel(3, 5), Some(BACKGROUND));
        assert_eq!(bitmap.pixel(1, 3), Some(BACKGROUND));
        assert_eq!(bitmap.pixel(6, 3), Some(BACKGROUND));
        let active = bitmap.pixels().iter().filter(|p| **p == ACTIVE).count();
        assert_eq!(active, 12);
    }

    #[test]
    fn test_invert_swaps_values() {
        let bitmap = request(vec![square(2, 2, 5, 5)], true).rasterize().unwrap();
        assert_eq!(bitmap.pixel(3, 3), Some(BACKGROUND));
        assert_eq!(bitmap.pixel(0, 0), Some(ACTIVE));
    }

    #[test]
    fn test_degenerate_polygons_draw_nothing() {
        let bitmap = request(
            vec![vec![], vec![Point::new(1, 1)], vec![Point::new(0, 0), Point::new(9, 9)]],
            false,
        )
        .rasterize()
        .unwrap();
        assert!(bitmap.pixels().iter().all(|p| *p == BACKGROUND));
    }

    #[test]
    fn test_out_of_bounds_polygon_is_clamped() {
        let bitmap = request(vec![square(-50, -50, 50, 50)], false)
            .rasterize()
            .unwrap();
        assert!(bitmap.pixels().iter().all(|p| *p == ACTIVE));

        let outside = request(vec![square(20, 20, 30, 30)], false)
            .rasterize()
            .unwrap();
        assert!(outside.pixels().iter().all(|p| *p == BACKGROUND));
    }

    #[test]
    fn test_corner_triangle_on_small_canvas() {
        let bitmap = MaskRequest {
            polygons: vec![vec![Point::new(0, 0), Point::new(4, 0), Point::new(0, 4)]],
            width: 8,
            height: 8,
            invert: false,
        }
        .rasterize()
        .unwrap();
        assert_eq!(bitmap.pixel(1, 1), Some(ACTIVE));
        assert_eq!(bitmap.pixel(6, 6), Some(BACKGROUND));

        let empty = MaskRequest {
            polygons: Vec::new(),
            width: 8,
            height: 8,
            invert: false,
        }
        .rasterize()
        .unwrap();
        assert!(empty.pixels().iter().all(|p| *p == BACKGROUND));
    }

    #[test]
    fn test_triangle_uses_truncating_division() {
        let triangle = vec![Point::new(0, 0), Point::new(9, 9), Point::new(0, 9)];
        let bitmap = request(vec![triangle], false).rasterize().unwrap();
        for y in 0..9 {
            assert_eq!(bitmap.pixel(y, y), Some(ACTIVE), "diagonal at row {y}");
            assert_eq!(bitmap.pixel(0, y), Some(ACTIVE));
            if y < 8 {
                assert_eq!(bitmap.pixel(y + 1, y), Some(BACKGROUND));
            }
        }
    }

    #[test]
    fn test_dimension_bounds() {
        let mut req = request(vec![], false);
        req.width = 0;
        assert!(req.rasterize().is_err());
        req.width = 10_000;
        assert!(req.rasterize().is_err());
        req.width = 9999;
        req.height = 1;
        assert!(req.rasterize().is_ok());
        req.polygons = vec![square(0, 0, i64::MAX, 5)];
        assert!(req.rasterize().is_err());
    }

    #[test]
    fn test_pgm_layout() {
        let bitmap = MaskRequest {
            polygons: vec![],
            width: 3,
            height: 2,
            invert: true,
        }
        .rasterize()
        .unwrap();
        let bytes = bitmap.to_pgm_bytes();
        assert!(bytes.starts_with(b"P5\n3 2\n255\n"));
        assert_eq!(bytes.len(), b"P5\n3 2\n255\n".len() + 6);
        assert!(bytes.ends_with(&[255; 6]));
    }

    #[test]
    fn test_header_skips_comments() {
        let header = PgmHeader::parse(b"P5\n# Motion mask\n# second\n640 480\n255\n\x00\x00").unwrap();
        assert_eq!(header.width, 640);
        assert_eq!(header.height, 480);
        assert_eq!(header.max_value, 255);
        assert!(PgmHeader::parse(b"P6\n1 1\n255\n").is_none());
        assert!(PgmHeader::parse(b"P5\n12\n").is_none());
    }

    #[test]
    fn test_points_accept_both_shapes() {
        let req: MaskRequest = serde_json::from_str(
            r#"{"polygons":[[[1,2],{"x":3,"y":4},[5,6]]],"width":8,"height":8}"#,
        )
        .unwrap();
        assert_eq!(
            req.polygons[0],
            vec![Point::new(1, 2), Point::new(3, 4), Point::new(5, 6)]
        );
        assert!(!req.invert);
    }
}
