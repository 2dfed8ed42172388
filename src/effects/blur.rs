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

use crate::context::EffectContext;
use crate::convolve::{convolve_separable, convolve_tagged};
use crate::kernel::{
    gaussian_kernel_1d, gaussian_kernel_2d, optimal_kernel_width_1d, optimal_kernel_width_2d,
    Kernel,
};
use crate::progress::BLUR_TAG;
use crate::quantum::Quantum;
use crate::{EffectError, ImageStore, ImageStoreMut};
use tracing::{debug, trace};

/// Separable Gaussian blur.
///
/// The kernel width is derived from `radius` and `sigma` with
/// [optimal_kernel_width_1d]; a radius of 0 lets sigma choose it.
pub fn blur<T: Quantum>(
    src: &ImageStore<T>,
    dst: &mut ImageStoreMut<T>,
    radius: f64,
    sigma: f64,
    ctx: &EffectContext,
) -> Result<(), EffectError> {
    trace!(radius, sigma, "blur");
    let width = optimal_kernel_width_1d(radius, sigma);
    debug!(width, "blur kernel width");
    if width == 1 {
        return src.copy_to_mut(dst);
    }
    let row_kernel = gaussian_kernel_1d(width, sigma)?;
    let column_kernel = Kernel::new(1, width, row_kernel.values.clone())?;
    convolve_separable(src, dst, &row_kernel, &column_kernel, BLUR_TAG, ctx)
}

/// Gaussian blur with a full square kernel.
pub fn gaussian_blur<T: Quantum>(
    src: &ImageStore<T>,
    dst: &mut ImageStoreMut<T>,
    radius: f64,
    sigma: f64,
    ctx: &EffectContext,
) -> Result<(), EffectError> {
    trace!(radius, sigma, "gaussian blur");
    let width = optimal_kernel_width_2d(radius, sigma);
    debug!(width, "gaussian blur kernel width");
    if width == 1 {
        return src.copy_to_mut(dst);
    }
    let kernel = gaussian_kernel_2d(width, sigma)?;
    convolve_tagged(src, dst, &kernel, BLUR_TAG, ctx)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ChannelLayout;

    fn spot(width: usize, height: usize) -> Vec<u8> {
        let mut data = vec![0u8; width * height];
        data[(height / 2) * width + width / 2] = 255;
        data
    }

    #[test]
    fn test_blur_spreads_spot_symmetrically() {
        let data = spot(15, 15);
        let image = ImageStore::borrow(&data, 15, 15, ChannelLayout::Gray);
        let mut dst = ImageStoreMut::default();
        blur(&image, &mut dst, 3.0, 1.0, &EffectContext::new()).unwrap();
        let out = dst.data.borrow();
        let center = out[7 * 15 + 7];
        assert!(center < 255 && center > 0, "center {center}");
        assert_eq!(out[7 * 15 + 6], out[7 * 15 + 8]);
        assert_eq!(out[6 * 15 + 7], out[8 * 15 + 7]);
        assert_eq!(out[6 * 15 + 7], out[7 * 15 + 6]);
        assert_eq!(out[0], 0);
    }

    #[test]
    fn test_blur_matches_gaussian_blur() {
        let width = 19usize;
        let data: Vec<u8> = (0..width * width).map(|i| ((i * 13) % 256) as u8).collect();
        let image = ImageStore::borrow(&data, width as u32, width as u32, ChannelLayout::Gray);
        let mut a = ImageStoreMut::default();
        let mut b = ImageStoreMut::default();
        let ctx = EffectContext::new();
        blur(&image, &mut a, 2.0, 1.2, &ctx).unwrap();
        gaussian_blur(&image, &mut b, 2.0, 1.2, &ctx).unwrap();
        for (i, (&x, &y)) in a.data.borrow().iter().zip(b.data.borrow().iter()).enumerate() {
            let diff = (x as i32 - y as i32).abs();
            assert!(diff <= 1, "diff {diff} at {i}");
        }
    }

    #[test]
    fn test_zero_sigma_is_copy() {
        let data: Vec<u16> = (0..48).map(|i| i * 1000).collect();
        let image = ImageStore::borrow(&data, 4, 4, ChannelLayout::Rgb);
        let mut dst = ImageStoreMut::default();
        gaussian_blur(&image, &mut dst, 0.0, 0.0, &EffectContext::new()).unwrap();
        assert_eq!(dst.data.borrow(), data.as_slice());
    }
}
