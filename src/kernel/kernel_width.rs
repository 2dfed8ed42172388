/*
 * // Copyright (c) Radzivon Bartoshyk. All rights reserved.
 * //
 * // Redistribution and use in source and binary forms, with or without modification,
 * // are permitted provided that the following conditions are met:
 * //
 * // 1.  Redistributions of source code must retain the above copyright notice, this
 * // list of conditions and the following disclaimer.
 * //
 * // 2.  Redistributions in binary form must reproduce the above copyright notice,
 * // this list of conditions and the following disclaimer in the documentation
 * // and/or other materials provided with the distribution.
 * //
 * // 3.  Neither the name of the copyright holder nor the names of its
 * // contributors may be used to endorse or promote products derived from
 * // this software without specific prior written permission.
 * //
 * // THIS SOFTWARE IS PROVIDED BY THE COPYRIGHT HOLDERS AND CONTRIBUTORS "AS IS"
 * // AND ANY EXPRESS OR IMPLIED WARRANTIES, INCLUDING, BUT NOT LIMITED TO, THE
 * // IMPLIED WARRANTIES OF MERCHANTABILITY AND FITNESS FOR A PARTICULAR PURPOSE ARE
 * // DISCLAIMED. IN NO EVENT SHALL THE COPYRIGHT HOLDER OR CONTRIBUTORS BE LIABLE
 * // FOR ANY DIRECT, INDIRECT, INCIDENTAL, SPECIAL, EXEMPLARY, OR CONSEQUENTIAL
 * // DAMAGES (INCLUDING, BUT NOT LIMITED TO, PROCUREMENT OF SUBSTITUTE GOODS OR
 * // SERVICES; LOSS OF USE, DATA, OR PROFITS; OR BUSINESS INTERRUPTION) HOWEVER
 * // CAUSED AND ON ANY THEORY OF LIABILITY, WHETHER IN CONTRACT, STRICT LIABILITY,
 * // OR TORT (INCLUDING NEGLIGENCE OR OTHERWISE) ARISING IN ANY WAY OUT OF THE USE
 * // OF THIS SOFTWARE, EVEN IF ADVISED OF THE POSSIBILITY OF SUCH DAMAGE.
 */

use crate::quantum::{MAGICK_EPSILON, MAX_SHORT};
use std::f64::consts::PI;

const SQRT_2PI: f64 = 2.506_628_274_631_000_5;

/// Derives an odd kernel width for a 1D Gaussian.
///
/// A positive radius wins; otherwise the width grows from 5 until the edge
/// weight of the normalized Gaussian no longer registers at 16-bit precision.
pub fn optimal_kernel_width_1d(radius: f64, sigma: f64) -> usize {
    if radius > MAGICK_EPSILON {
        return 2 * radius.ceil() as usize + 1;
    }
    if sigma.abs() <= MAGICK_EPSILON || !sigma.is_finite() {
        return 1;
    }
    let two_sigma2 = 2.0 * sigma * sigma;
    let weight = |u: f64| (-(u * u) / two_sigma2).exp() / (SQRT_2PI * sigma);
    let mut normalize: f64 = (-2i64..=2).map(|u| weight(u as f64)).sum();
    let mut width = 5usize;
    loop {
        let value = weight((width / 2) as f64) / normalize;
        if !(MAX_SHORT * value >= 1.0) {
            break;
        }
        width += 2;
        let edge = (width / 2) as f64;
        normalize += 2.0 * weight(edge);
    }
    width - 2
}

/// Derives an odd kernel width for a square 2D Gaussian.
pub fn optimal_kernel_width_2d(radius: f64, sigma: f64) -> usize {
    if radius > MAGICK_EPSILON {
        return 2 * radius.ceil() as usize + 1;
    }
    if sigma.abs() <= MAGICK_EPSILON || !sigma.is_finite() {
        return 1;
    }
    let two_sigma2 = 2.0 * sigma * sigma;
    let weight = |u: f64| (-(u * u) / two_sigma2).exp();
    // The square sum factors into the product of its row sums.
    let mut row_sum: f64 = (-2i64..=2).map(|u| weight(u as f64)).sum();
    let mut width = 5usize;
    loop {
        let normalize = row_sum * row_sum / (PI * two_sigma2);
        let value = weight((width / 2) as f64) / normalize;
        if !(MAX_SHORT * value >= 1.0) {
            break;
        }
        width += 2;
        row_sum += 2.0 * weight((width / 2) as f64);
    }
    width - 2
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_radius_wins() {
        assert_eq!(optimal_kernel_width_1d(2.0, 10.0), 5);
        assert_eq!(optimal_kernel_width_1d(2.2, 0.0), 7);
        assert_eq!(optimal_kernel_width_2d(1.0, 0.3), 3);
    }

    #[test]
    fn test_zero_sigma_is_identity_width() {
        assert_eq!(optimal_kernel_width_1d(0.0, 0.0), 1);
        assert_eq!(optimal_kernel_width_2d(0.0, 1e-15), 1);
        assert_eq!(optimal_kernel_width_1d(0.0, f64::NAN), 1);
    }

    #[test]
    fn test_derived_widths_are_odd_and_grow() {
        let mut previous = 0;
        for sigma in [0.5, 1.0, 1.5, 2.0, 3.0, 5.0] {
            let w1 = optimal_kernel_width_1d(0.0, sigma);
            let w2 = optimal_kernel_width_2d(0.0, sigma);
            assert_eq!(w1 % 2, 1, "1D width {w1} for sigma {sigma}");
            assert_eq!(w2 % 2, 1, "2D width {w2} for sigma {sigma}");
            assert!(w1 >= previous, "width must not shrink, {w1} < {previous}");
            previous = w1;
        }
        // edge weight of sigma 1 drops under 1/65535 at |u| = 5
        assert_eq!(optimal_kernel_width_1d(0.0, 1.0), 9);
    }
}
