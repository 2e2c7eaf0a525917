//! Pixel-level image comparison.
//!
//! The comparator treats the differ as an opaque collaborator behind the
//! `PixelDiff` trait; `Pixelmatch` is the shipped implementation.

use image::{Rgba, RgbaImage};

/// Maximum perceptual distance between two RGBA pixels.
///
/// `sqrt((255*0.299)^2 + (255*0.587)^2 + (255*0.114)^2)`, the distance
/// between full white and full black under the perceptual channel weights.
const MAX_PERCEPTUAL_DELTA: f64 = 170.48156542570814;

/// Mismatch highlight painted onto the diff canvas.
const HIGHLIGHT: Rgba<u8> = Rgba([255, 0, 0, 255]);

/// Pixel-difference function contract.
///
/// Compares two equal-sized bitmaps, paints the difference onto `out`, and
/// returns the number of mismatched pixels. Callers guarantee that `a`, `b`
/// and `out` share dimensions. With `fail_fast` the function may stop at the
/// first mismatch, so the returned count is a lower bound; only the
/// zero/nonzero distinction is reliable in that mode.
pub trait PixelDiff: Send + Sync {
    /// Compare `a` against `b` with the given sensitivity.
    fn diff(
        &self,
        a: &RgbaImage,
        b: &RgbaImage,
        out: &mut RgbaImage,
        threshold: f64,
        fail_fast: bool,
    ) -> usize;
}

/// Default differ: perceptually weighted per-pixel color distance.
///
/// A pixel mismatches when its distance from the baseline pixel exceeds
/// `threshold` of the maximum representable distance. Mismatches are painted
/// solid red; matching pixels carry the candidate at half intensity so the
/// canvas keeps enough context to locate the highlights.
#[derive(Debug, Clone, Copy, Default)]
pub struct Pixelmatch;

impl Pixelmatch {
    /// Create the default differ.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl PixelDiff for Pixelmatch {
    fn diff(
        &self,
        a: &RgbaImage,
        b: &RgbaImage,
        out: &mut RgbaImage,
        threshold: f64,
        fail_fast: bool,
    ) -> usize {
        let cutoff = threshold.clamp(0.0, 1.0) * MAX_PERCEPTUAL_DELTA;
        let (width, height) = a.dimensions();
        let mut mismatched = 0usize;

        for y in 0..height {
            for x in 0..width {
                let candidate = *a.get_pixel(x, y);
                let baseline = *b.get_pixel(x, y);

                if perceptual_diff(candidate, baseline) > cutoff {
                    mismatched += 1;
                    out.put_pixel(x, y, HIGHLIGHT);
                    if fail_fast {
                        return mismatched;
                    }
                } else {
                    let Rgba([r, g, b, _]) = candidate;
                    out.put_pixel(x, y, Rgba([r / 2, g / 2, b / 2, 128]));
                }
            }
        }

        mismatched
    }
}

/// Perceptual color distance between two pixels.
///
/// Channel weights follow human luminance sensitivity:
/// red 0.299, green 0.587, blue 0.114. Alpha is ignored.
#[must_use]
pub fn perceptual_diff(a: Rgba<u8>, b: Rgba<u8>) -> f64 {
    let Rgba([r1, g1, b1, _]) = a;
    let Rgba([r2, g2, b2, _]) = b;

    let dr = (f64::from(r1) - f64::from(r2)) * 0.299;
    let dg = (f64::from(g1) - f64::from(g2)) * 0.587;
    let db = (f64::from(b1) - f64::from(b2)) * 0.114;

    (dr * dr + dg * dg + db * db).sqrt()
}
