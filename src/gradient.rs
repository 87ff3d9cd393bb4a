// gradient.rs — Sobel gradients and edge-magnitude kernels.
//
// Sobel kernels are separable:
//   Sobel_x = col_kernel * row_kernel^T
//     row: [-1, 0, 1]   (derivative along x)
//     col: [ 1, 2, 1]   (smoothing along y)
//
//   Sobel_y = col_kernel * row_kernel^T
//     row: [ 1, 2, 1]   (smoothing along x)
//     col: [-1, 0, 1]   (derivative along y)
//
// Three edge-magnitude kernels live here, one per way of producing the
// filtered frame:
//
//   sobel_magnitude_naive      3×3 loop, out-of-image taps skipped
//                              (the single-threaded CPU strategy)
//   sobel_magnitude_separable  two separable passes, |gx|/2 + |gy|/2
//                              (the vectorised "library" strategy)
//   sobel_magnitude_clamped    3×3 loop, clamp-to-edge taps
//                              (bit-exact reference for kernels/sobel.cl)
//
// The three are NOT interchangeable at the borders; only the clamped one
// is the device's contract.

use crate::convolution::convolve_separable;
use crate::image::{Image, Pixel};

/// Unnormalised Sobel taps.
const SOBEL_DERIV: [f32; 3] = [-1.0, 0.0, 1.0];
const SOBEL_SMOOTH: [f32; 3] = [1.0, 2.0, 1.0];

/// Integer smoothing taps indexed by offset + 1.
const SMOOTH_TAPS: [i32; 3] = [1, 2, 1];

/// Compute the horizontal gradient Ix using the Sobel operator.
///
/// Positive values indicate intensity increasing to the right.
pub fn sobel_x<T: Pixel>(src: &Image<T>) -> Image<f32> {
    convolve_separable(src, &SOBEL_DERIV, &SOBEL_SMOOTH)
}

/// Compute the vertical gradient Iy using the Sobel operator.
///
/// Positive values indicate intensity increasing downward.
pub fn sobel_y<T: Pixel>(src: &Image<T>) -> Image<f32> {
    convolve_separable(src, &SOBEL_SMOOTH, &SOBEL_DERIV)
}

/// Compute both gradients at once.
pub fn sobel_xy<T: Pixel>(src: &Image<T>) -> (Image<f32>, Image<f32>) {
    (sobel_x(src), sobel_y(src))
}

/// Naive 3×3 Sobel magnitude. Taps that fall outside the image contribute
/// nothing, so border pixels of a flat image are NOT zero.
pub fn sobel_magnitude_naive(src: &Image<u8>) -> Image<u8> {
    let w = src.width() as isize;
    let h = src.height() as isize;
    let data = src.as_slice();
    let mut dst = Image::<u8>::new(src.width(), src.height());
    let out = dst.as_mut_slice();

    for y in 0..h {
        for x in 0..w {
            let mut gx = 0i32;
            let mut gy = 0i32;
            for dy in -1..=1isize {
                for dx in -1..=1isize {
                    let sx = x + dx;
                    let sy = y + dy;
                    if sx < 0 || sx >= w || sy < 0 || sy >= h {
                        continue;
                    }
                    let p = data[(sy * w + sx) as usize] as i32;
                    gx += SMOOTH_TAPS[(dy + 1) as usize] * dx as i32 * p;
                    gy += SMOOTH_TAPS[(dx + 1) as usize] * dy as i32 * p;
                }
            }
            out[(y * w + x) as usize] = magnitude_u8(gx, gy);
        }
    }
    dst
}

/// 3×3 Sobel magnitude with clamp-to-edge addressing.
///
/// Bit-exact with `kernels/sobel.cl`: truncated `sqrt(gx² + gy²)` clamped
/// to 255. A uniform image yields all zeros, borders included.
pub fn sobel_magnitude_clamped(src: &Image<u8>) -> Image<u8> {
    let mut dst = Image::<u8>::new(src.width(), src.height());
    let w = src.width();
    let out = dst.as_mut_slice();

    for y in 0..src.height() {
        for x in 0..w {
            let (xi, yi) = (x as isize, y as isize);
            let mut gx = 0i32;
            let mut gy = 0i32;
            for dy in -1..=1isize {
                for dx in -1..=1isize {
                    let p = src.get_clamped(xi + dx, yi + dy) as i32;
                    gx += SMOOTH_TAPS[(dy + 1) as usize] * dx as i32 * p;
                    gy += SMOOTH_TAPS[(dx + 1) as usize] * dy as i32 * p;
                }
            }
            out[y * w + x] = magnitude_u8(gx, gy);
        }
    }
    dst
}

/// Separable Sobel magnitude: `|gx|` and `|gy|` saturated to u8, then
/// blended 50/50 and saturated again.
pub fn sobel_magnitude_separable(src: &Image<u8>) -> Image<u8> {
    let (ix, iy) = sobel_xy(src);
    let data = ix
        .as_slice()
        .iter()
        .zip(iy.as_slice())
        .map(|(&gx, &gy)| {
            let ax = u8::from_f32(gx.abs()) as f32;
            let ay = u8::from_f32(gy.abs()) as f32;
            u8::from_f32(0.5 * ax + 0.5 * ay)
        })
        .collect();
    Image::from_vec(src.width(), src.height(), data)
}

#[inline]
fn magnitude_u8(gx: i32, gy: i32) -> u8 {
    let mag = ((gx * gx + gy * gy) as f32).sqrt() as i32;
    mag.clamp(0, 255) as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    /// 4×3 vertical step: columns 0–1 are 0, columns 2–3 are 20.
    fn step_image() -> Image<u8> {
        let mut img = Image::<u8>::new(4, 3);
        for y in 0..3 {
            img.set(2, y, 20);
            img.set(3, y, 20);
        }
        img
    }

    #[test]
    fn test_horizontal_gradient() {
        let mut img = Image::<u8>::new(20, 10);
        for y in 0..10 {
            for x in 10..20 {
                img.set(x, y, 100);
            }
        }

        let ix = sobel_x(&img);
        let edge_response = ix.get(10, 5);
        assert!(
            edge_response > 50.0,
            "expected strong positive Ix at edge, got {edge_response}"
        );
        let flat_response = ix.get(5, 5);
        assert!(
            flat_response.abs() < 1.0,
            "expected near-zero Ix in flat region, got {flat_response}"
        );
    }

    #[test]
    fn test_vertical_gradient() {
        let mut img = Image::<u8>::new(10, 20);
        for y in 10..20 {
            for x in 0..10 {
                img.set(x, y, 100);
            }
        }

        let iy = sobel_y(&img);
        assert!(iy.get(5, 10) > 50.0);
        assert!(iy.get(5, 5).abs() < 1.0);
    }

    #[test]
    fn test_linear_ramp_gradient() {
        // f(x) = x. Row pass gives 2 everywhere in the interior, the column
        // smoothing pass multiplies by 1 + 2 + 1 = 4, so Ix = 8.
        let mut img = Image::<f32>::new(20, 10);
        for y in 0..10 {
            for x in 0..20 {
                img.set(x, y, x as f32);
            }
        }

        let (ix, iy) = sobel_xy(&img);
        for y in 2..8 {
            for x in 2..18 {
                assert!((ix.get(x, y) - 8.0).abs() < 1e-3);
                assert!(iy.get(x, y).abs() < 1e-3);
            }
        }
    }

    #[test]
    fn test_clamped_step_edge_exact() {
        // gx at x=1 and x=2 is (20 + 40 + 20) - 0 = 80; clamping makes the
        // outer columns see a flat neighbourhood.
        let out = sobel_magnitude_clamped(&step_image());
        for y in 0..3 {
            assert_eq!(out.row(y), &[0, 80, 80, 0], "row {y}");
        }
    }

    #[test]
    fn test_naive_step_edge_border_differs() {
        let out = sobel_magnitude_naive(&step_image());
        // Interior row matches the clamped kernel, except the right border
        // where the missing column reads as zero.
        assert_eq!(out.row(1), &[0, 80, 80, 80]);
        // Top row loses the row above: gx = 2*20 + 20 = 60, gy = 20.
        assert_eq!(out.get(1, 0), 63);
    }

    #[test]
    fn test_uniform_image_zero_for_clamped_and_separable() {
        let img = Image::filled(16, 9, 128u8);
        assert!(sobel_magnitude_clamped(&img).as_slice().iter().all(|&p| p == 0));
        assert!(sobel_magnitude_separable(&img).as_slice().iter().all(|&p| p == 0));
    }

    #[test]
    fn test_uniform_image_naive_border_response() {
        let img = Image::filled(3, 3, 100u8);
        let out = sobel_magnitude_naive(&img);
        assert_eq!(out.get(1, 1), 0);
        // Corner: gx = gy = 2*100 + 100 = 300, magnitude saturates.
        assert_eq!(out.get(0, 0), 255);
    }

    #[test]
    fn test_separable_blend() {
        // Only a horizontal gradient: |gx| = 80 at the edge columns, gy = 0,
        // blended to 40.
        let out = sobel_magnitude_separable(&step_image());
        assert_eq!(out.row(1), &[0, 40, 40, 0]);
    }

    #[test]
    fn test_magnitude_saturates() {
        assert_eq!(magnitude_u8(300, 0), 255);
        assert_eq!(magnitude_u8(3, 4), 5);
        assert_eq!(magnitude_u8(0, 0), 0);
    }
}
