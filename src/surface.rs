// src/surface.rs

//! In-memory pixel surface the rasterizer tests draw into.
//!
//! A `Surface` is a `width x height` grid of `RgbPixel`s in row-major order,
//! backed by a non-lockable `Blob` — the surface is the buffer's single
//! owner, so every access goes through the blob's unconditional fast path
//! and resizing goes through its amortized growth. Shrinking the surface
//! therefore never reallocates; the logical `width * height` window simply
//! uses less of the capacity.
//!
//! Drawing primitives mirror a DIB-style surface: the unchecked accessors do
//! no bounds checking beyond debug assertions (the hot path), with `_checked`
//! variants for callers that may wander off the grid. Horizontal extents are
//! right-exclusive and vertical extents bottom-exclusive throughout.

use crate::blob::{BlobError, RawBlob};
use crate::color::{self, RgbPixel};

use log::trace;
use std::fmt;

/// Failures a surface can report. Only storage growth can fail; drawing never
/// does.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SurfaceError {
    /// The backing blob could not grow to the requested dimensions.
    Alloc,
}

impl fmt::Display for SurfaceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SurfaceError::Alloc => write!(f, "allocation failure while resizing surface"),
        }
    }
}

impl std::error::Error for SurfaceError {}

/// Row-major 32-bit pixel surface.
pub struct Surface {
    width: i32,
    height: i32,
    pixels: RawBlob<RgbPixel>,
}

impl Surface {
    /// Creates a surface of the given size, clamped to at least 1x1 and
    /// filled with black.
    pub fn new(width: i32, height: i32) -> Result<Self, SurfaceError> {
        let mut surface = Self {
            width: 0,
            height: 0,
            pixels: RawBlob::new(),
        };
        surface.set_size(width, height)?;
        Ok(surface)
    }

    /// Resizes the surface. A no-op when the dimensions are unchanged;
    /// otherwise grows the backing store as needed and clears the surface to
    /// black. On failure the previous size and contents remain intact.
    pub fn set_size(&mut self, width: i32, height: i32) -> Result<(), SurfaceError> {
        let width = width.max(1);
        let height = height.max(1);
        if width == self.width && height == self.height {
            return Ok(());
        }
        let needed = width as usize * height as usize;
        self.pixels.ensure_capacity(needed).map_err(|e| match e {
            BlobError::Alloc => SurfaceError::Alloc,
            // The blob is non-lockable; growth can only fail on allocation.
            other => unreachable!("unexpected blob error on resize: {other}"),
        })?;
        trace!("surface resized to {}x{}", width, height);
        self.width = width;
        self.height = height;
        self.fill(color::rgb(0, 0, 0));
        Ok(())
    }

    pub fn width(&self) -> i32 {
        self.width
    }

    pub fn height(&self) -> i32 {
        self.height
    }

    #[inline]
    fn index(&self, x: i32, y: i32) -> usize {
        debug_assert!(x >= 0 && x < self.width, "x {} out of 0..{}", x, self.width);
        debug_assert!(y >= 0 && y < self.height, "y {} out of 0..{}", y, self.height);
        y as usize * self.width as usize + x as usize
    }

    fn len(&self) -> usize {
        self.width as usize * self.height as usize
    }

    /// The live pixel rows, row-major.
    pub fn pixels(&self) -> &[RgbPixel] {
        &self.pixels.as_slice()[..self.len()]
    }

    fn pixels_mut(&mut self) -> &mut [RgbPixel] {
        let len = self.len();
        &mut self.pixels.direct_mut()[..len]
    }

    /// Reads a pixel. No bounds checking in release builds.
    #[inline]
    pub fn pixel(&self, x: i32, y: i32) -> RgbPixel {
        self.pixels()[self.index(x, y)]
    }

    /// Writes a pixel. No bounds checking in release builds.
    #[inline]
    pub fn set_pixel(&mut self, x: i32, y: i32, c: RgbPixel) {
        let at = self.index(x, y);
        self.pixels_mut()[at] = c;
    }

    /// Reads a pixel, or `None` when off the surface.
    pub fn pixel_checked(&self, x: i32, y: i32) -> Option<RgbPixel> {
        if x >= 0 && y >= 0 && x < self.width && y < self.height {
            Some(self.pixel(x, y))
        } else {
            None
        }
    }

    /// Writes a pixel if it is on the surface; reports whether it was.
    pub fn set_pixel_checked(&mut self, x: i32, y: i32, c: RgbPixel) -> bool {
        if x >= 0 && y >= 0 && x < self.width && y < self.height {
            self.set_pixel(x, y, c);
            true
        } else {
            false
        }
    }

    /// Blends `c` over the existing pixel by `f / f_max`.
    #[inline]
    pub fn mix_pixel(&mut self, x: i32, y: i32, f: u32, f_max: u32, c: RgbPixel) {
        let blended = color::mix(f, f_max, c, self.pixel(x, y));
        self.set_pixel(x, y, blended);
    }

    /// Fills the whole surface with one color.
    pub fn fill(&mut self, c: RgbPixel) {
        self.pixels_mut().fill(c);
    }

    /// Horizontal line from `min(x1, x2)` up to but not including
    /// `max(x1, x2)`. Coordinates must be on the surface.
    pub fn hline(&mut self, x1: i32, x2: i32, y: i32, c: RgbPixel) {
        let left = x1.min(x2);
        let right = x1.max(x2);
        if left == right {
            return;
        }
        let start = self.index(left, y);
        let end = start + (right - left) as usize;
        self.pixels_mut()[start..end].fill(c);
    }

    /// Vertical line from `min(y1, y2)` up to but not including
    /// `max(y1, y2)`. Coordinates must be on the surface.
    pub fn vline(&mut self, x: i32, y1: i32, y2: i32, c: RgbPixel) {
        let top = y1.min(y2);
        let bottom = y1.max(y2);
        for y in top..bottom {
            self.set_pixel(x, y, c);
        }
    }

    /// Filled rectangle; `right` and `bottom` are not drawn.
    pub fn rect(&mut self, left: i32, top: i32, right: i32, bottom: i32, c: RgbPixel) {
        for y in top..bottom {
            self.hline(left, right, y, c);
        }
    }

    /// Copies this surface onto `dest` at `(x, y)`, clipping to `dest`'s
    /// bounds.
    pub fn blit(&self, dest: &mut Surface, x: i32, y: i32) {
        for src_y in 0..self.height {
            let dest_y = y + src_y;
            if dest_y < 0 || dest_y >= dest.height {
                continue;
            }
            let src_left = (-x).clamp(0, self.width);
            let dest_left = x + src_left;
            let copy_w = (self.width - src_left).min(dest.width - dest_left);
            if copy_w <= 0 {
                continue;
            }
            let src_start = self.index(src_left, src_y);
            let dest_start = dest.index(dest_left, dest_y);
            let src_row = &self.pixels()[src_start..src_start + copy_w as usize];
            dest.pixels_mut()[dest_start..dest_start + copy_w as usize].copy_from_slice(src_row);
        }
    }
}

impl fmt::Debug for Surface {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Surface")
            .field("width", &self.width)
            .field("height", &self.height)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::rgb;

    #[test]
    fn new_surface_is_black_and_clamped() {
        let surface = Surface::new(0, -5).unwrap();
        assert_eq!(surface.width(), 1);
        assert_eq!(surface.height(), 1);
        assert_eq!(surface.pixel(0, 0), rgb(0, 0, 0));
    }

    #[test]
    fn fill_covers_every_pixel() {
        let mut surface = Surface::new(4, 3).unwrap();
        let c = rgb(1, 2, 3);
        surface.fill(c);
        assert!(surface.pixels().iter().all(|&p| p == c));
        assert_eq!(surface.pixels().len(), 12);
    }

    #[test]
    fn hline_is_right_exclusive_and_order_insensitive() {
        let mut surface = Surface::new(8, 2).unwrap();
        let c = rgb(255, 255, 255);
        surface.hline(6, 2, 1, c);
        for x in 0..8 {
            let expected = (2..6).contains(&x);
            assert_eq!(surface.pixel(x, 1) == c, expected, "x = {}", x);
        }
        assert_eq!(surface.pixel(2, 0), rgb(0, 0, 0));
    }

    #[test]
    fn hline_of_zero_width_draws_nothing() {
        let mut surface = Surface::new(4, 1).unwrap();
        surface.hline(2, 2, 0, rgb(9, 9, 9));
        assert!(surface.pixels().iter().all(|&p| p == rgb(0, 0, 0)));
    }

    #[test]
    fn vline_is_bottom_exclusive() {
        let mut surface = Surface::new(2, 6).unwrap();
        let c = rgb(0, 255, 0);
        surface.vline(1, 4, 1, c);
        for y in 0..6 {
            let expected = (1..4).contains(&y);
            assert_eq!(surface.pixel(1, y) == c, expected, "y = {}", y);
        }
    }

    #[test]
    fn rect_excludes_right_and_bottom_edges() {
        let mut surface = Surface::new(5, 5).unwrap();
        let c = rgb(10, 20, 30);
        surface.rect(1, 1, 4, 3, c);
        for y in 0..5 {
            for x in 0..5 {
                let inside = (1..4).contains(&x) && (1..3).contains(&y);
                assert_eq!(surface.pixel(x, y) == c, inside, "({}, {})", x, y);
            }
        }
    }

    #[test]
    fn checked_accessors_reject_off_surface_coordinates() {
        let mut surface = Surface::new(3, 3).unwrap();
        assert!(!surface.set_pixel_checked(-1, 0, rgb(1, 1, 1)));
        assert!(!surface.set_pixel_checked(0, 3, rgb(1, 1, 1)));
        assert!(surface.set_pixel_checked(2, 2, rgb(1, 1, 1)));
        assert_eq!(surface.pixel_checked(2, 2), Some(rgb(1, 1, 1)));
        assert_eq!(surface.pixel_checked(3, 0), None);
    }

    #[test]
    fn mix_pixel_blends_over_existing_content() {
        let mut surface = Surface::new(1, 1).unwrap();
        surface.set_pixel(0, 0, rgb(0, 0, 0));
        surface.mix_pixel(0, 0, 2, 10, rgb(255, 255, 255));
        assert_eq!(surface.pixel(0, 0), rgb(51, 51, 51));
    }

    #[test]
    fn resize_reuses_capacity_when_shrinking() {
        let mut surface = Surface::new(16, 16).unwrap();
        surface.set_size(4, 4).unwrap();
        assert_eq!(surface.width(), 4);
        assert_eq!(surface.pixels().len(), 16);
        surface.set_size(16, 16).unwrap();
        assert_eq!(surface.pixels().len(), 256);
    }

    #[test]
    fn resize_to_same_dimensions_keeps_contents() {
        let mut surface = Surface::new(2, 2).unwrap();
        surface.set_pixel(1, 1, rgb(5, 5, 5));
        surface.set_size(2, 2).unwrap();
        assert_eq!(surface.pixel(1, 1), rgb(5, 5, 5));
    }

    #[test]
    fn blit_clips_to_destination_bounds() {
        let mut src = Surface::new(3, 3).unwrap();
        src.fill(rgb(7, 7, 7));
        let mut dest = Surface::new(4, 4).unwrap();

        src.blit(&mut dest, 2, 2);
        for y in 0..4 {
            for x in 0..4 {
                let painted = x >= 2 && y >= 2;
                assert_eq!(dest.pixel(x, y) == rgb(7, 7, 7), painted, "({}, {})", x, y);
            }
        }

        // Negative offsets clip on the near edge.
        let mut dest2 = Surface::new(4, 4).unwrap();
        src.blit(&mut dest2, -2, -2);
        assert_eq!(dest2.pixel(0, 0), rgb(7, 7, 7));
        assert_eq!(dest2.pixel(1, 1), rgb(0, 0, 0));
    }
}
