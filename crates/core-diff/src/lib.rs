//! Minimal dirty-rectangle detection against the previously submitted frame.

use core_geometry::Rect;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum DiffError {
    #[error("raster length {actual} does not match previous submission's {expected}")]
    SizeMismatch { expected: usize, actual: usize },
}

/// Tracks the last raster submitted to the panel and computes the tightest
/// bounding rectangle of pixels that changed since then.
pub struct DiffDetector {
    width: u32,
    height: u32,
    previous: Option<Vec<u8>>,
}

impl DiffDetector {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            previous: None,
        }
    }

    /// Compare `raster` against the stored previous frame, store a copy of
    /// `raster` as the new previous frame unconditionally, and return the
    /// tight bounding rectangle of differing pixels (empty if none, or the
    /// full screen on the very first call).
    pub fn single_pass(&mut self, raster: &[u8]) -> Result<Rect, DiffError> {
        let expected = self.width as usize * self.height as usize;
        if raster.len() != expected {
            return Err(DiffError::SizeMismatch {
                expected,
                actual: raster.len(),
            });
        }

        let rect = match &self.previous {
            None => Rect::full(self.width, self.height),
            Some(prev) => self.calculate_diff_rect(prev, raster),
        };

        self.previous = Some(raster.to_vec());
        tracing::trace!(target: "render.diff", ?rect, "single_pass");
        Ok(rect)
    }

    fn calculate_diff_rect(&self, prev: &[u8], next: &[u8]) -> Rect {
        let mut min_x = self.width;
        let mut min_y = self.height;
        let mut max_x = 0i64;
        let mut max_y = 0i64;
        let mut different = false;

        for y in 0..self.height {
            let row_start = (y * self.width) as usize;
            let row_end = row_start + self.width as usize;
            if prev[row_start..row_end] == next[row_start..row_end] {
                continue;
            }
            for x in 0..self.width {
                let idx = row_start + x as usize;
                if prev[idx] != next[idx] {
                    different = true;
                    min_x = min_x.min(x);
                    max_x = max_x.max(x as i64);
                    min_y = min_y.min(y);
                    max_y = max_y.max(y as i64);
                }
            }
        }

        if !different {
            return Rect::new(0, 0, 0, 0);
        }
        Rect::new(min_x, min_y, max_x as u32 + 1, max_y as u32 + 1)
    }
}
