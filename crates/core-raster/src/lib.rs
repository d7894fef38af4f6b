//! Pure transformations on grayscale and packed-4bpp pixel buffers.
//!
//! Every function here is stateless: given the same inputs they always
//! produce the same output, and none of them touch the panel. The 16-shade
//! invariant (both nibbles of a grayscale byte equal) is assumed on input
//! and preserved on output; [`debug_assert_grayscale_invariant`] is a cheap
//! sanity check callers can run in debug builds.

use core_geometry::Rect;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RasterError {
    #[error("rectangle {rect:?} is not contained within a {width}x{height} screen")]
    OutOfBounds {
        rect: Rect,
        width: u32,
        height: u32,
    },
    #[error("raster width {0} must be even to pack to 4bpp")]
    OddWidth(u32),
    #[error("raster length {actual} does not match expected {expected} for {width}x{height}")]
    LengthMismatch {
        expected: usize,
        actual: usize,
        width: u32,
        height: u32,
    },
}

fn expect_len(raster: &[u8], width: u32, height: u32) -> Result<(), RasterError> {
    let expected = width as usize * height as usize;
    if raster.len() != expected {
        return Err(RasterError::LengthMismatch {
            expected,
            actual: raster.len(),
            width,
            height,
        });
    }
    Ok(())
}

/// Copy the sub-rectangle `rect` out of a `screen_width x screen_height`
/// grayscale buffer into a freshly allocated `rect.width() x rect.height()`
/// buffer.
pub fn cut_rect(
    raster: &[u8],
    screen_width: u32,
    screen_height: u32,
    rect: Rect,
) -> Result<Vec<u8>, RasterError> {
    expect_len(raster, screen_width, screen_height)?;
    if !rect.is_contained_in(Rect::full(screen_width, screen_height)) {
        return Err(RasterError::OutOfBounds {
            rect,
            width: screen_width,
            height: screen_height,
        });
    }
    let w = rect.width() as usize;
    let h = rect.height() as usize;
    let mut out = vec![0u8; w * h];
    for row in 0..h {
        let src_start = screen_width as usize * (rect.min_y as usize + row) + rect.min_x as usize;
        let dst_start = w * row;
        out[dst_start..dst_start + w].copy_from_slice(&raster[src_start..src_start + w]);
    }
    Ok(out)
}

/// Pack a `width x height` grayscale buffer (one byte per pixel, both
/// nibbles equal) into a `width/2 x height` buffer of two pixels per byte,
/// left pixel in the high nibble. `flip_horizontal` reverses each row's
/// pixel order before packing, to compensate for the panel's mounting.
pub fn pack_4bpp(
    raster: &[u8],
    width: u32,
    height: u32,
    flip_horizontal: bool,
) -> Result<Vec<u8>, RasterError> {
    expect_len(raster, width, height)?;
    if width % 2 != 0 {
        return Err(RasterError::OddWidth(width));
    }
    let w = width as usize;
    let h = height as usize;
    let mut out = vec![0u8; w / 2 * h];
    for row in 0..h {
        let src_row = &raster[row * w..row * w + w];
        let mut buf;
        let ordered: &[u8] = if flip_horizontal {
            buf = src_row.to_vec();
            buf.reverse();
            &buf
        } else {
            src_row
        };
        let dst_row = &mut out[row * (w / 2)..row * (w / 2) + w / 2];
        for (i, pair) in ordered.chunks_exact(2).enumerate() {
            dst_row[i] = (pair[0] & 0xF0) | (pair[1] & 0x0F);
        }
    }
    Ok(out)
}

/// Walks a grayscale buffer and panics (debug builds only) if any byte
/// violates the 16-shade invariant. Compiled out entirely in release.
pub fn debug_assert_grayscale_invariant(raster: &[u8]) {
    debug_assert!(
        raster.iter().all(|&b| (b & 0x0F) == (b & 0xF0) >> 4),
        "raster contains a byte whose nibbles are not equal; collaborator violated the 16-shade invariant"
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    fn checker(width: u32, height: u32) -> Vec<u8> {
        (0..width * height)
            .map(|i| if (i % width + i / width) % 2 == 0 { 0x00 } else { 0xFF })
            .collect()
    }

    #[test]
    fn cut_rect_extracts_subregion() {
        let raster = checker(8, 4);
        let cut = cut_rect(&raster, 8, 4, Rect::new(2, 1, 6, 3)).unwrap();
        assert_eq!(cut.len(), 4 * 2);
        assert_eq!(&cut[0..4], &raster[8 + 2..8 + 6]);
    }

    #[test]
    fn cut_rect_rejects_out_of_bounds() {
        let raster = checker(8, 4);
        let err = cut_rect(&raster, 8, 4, Rect::new(2, 1, 9, 3)).unwrap_err();
        assert!(matches!(err, RasterError::OutOfBounds { .. }));
    }

    #[test]
    fn pack_4bpp_pairs_adjacent_pixels() {
        let raster = vec![0x00, 0xFF, 0x11, 0x22];
        let packed = pack_4bpp(&raster, 4, 1, false).unwrap();
        assert_eq!(packed, vec![0x0F, 0x12]);
    }

    #[test]
    fn pack_4bpp_rejects_odd_width() {
        let raster = vec![0x00, 0xFF, 0x11];
        let err = pack_4bpp(&raster, 3, 1, false).unwrap_err();
        assert_eq!(err, RasterError::OddWidth(3));
    }

    #[test]
    fn pack_4bpp_flip_equals_pack_of_reversed_rows() {
        let raster = vec![0x00, 0x11, 0x22, 0x33, 0x44, 0x55, 0x66, 0x77];
        let flipped = pack_4bpp(&raster, 4, 2, true).unwrap();

        let mut reversed = raster.clone();
        for row in reversed.chunks_exact_mut(4) {
            row.reverse();
        }
        let packed_of_reversed = pack_4bpp(&reversed, 4, 2, false).unwrap();
        assert_eq!(flipped, packed_of_reversed);
    }

    #[test]
    fn cut_rect_full_screen_is_identity() {
        let raster = checker(6, 5);
        let cut = cut_rect(&raster, 6, 5, Rect::full(6, 5)).unwrap();
        assert_eq!(cut, raster);
    }

    proptest::proptest! {
        #[test]
        fn pack_unpack_round_trip(seed in proptest::collection::vec(0u8..16, 32)) {
            let raster: Vec<u8> = seed.iter().map(|&n| n * 0x11).collect();
            let packed = pack_4bpp(&raster, 32, 1, false).unwrap();
            let mut unpacked = vec![0u8; 32];
            for (i, byte) in packed.iter().enumerate() {
                unpacked[i * 2] = (byte & 0xF0) | (byte >> 4);
                unpacked[i * 2 + 1] = (byte & 0x0F) | (byte << 4);
            }
            proptest::prop_assert_eq!(unpacked, raster);
        }
    }
}
