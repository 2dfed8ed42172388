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
use crate::convolve::convolve_tagged;
use crate::effects::equalize::equalize;
use crate::kernel::{edge_kernel, emboss_kernel, optimal_kernel_width_1d};
use crate::progress::CONVOLVE_TAG;
use crate::quantum::Quantum;
use crate::{EffectError, ImageStore, ImageStoreMut};
use tracing::{debug, trace};

/// Edge detection with a discrete Laplacian of the derived width.
pub fn edge<T: Quantum>(
    src: &ImageStore<T>,
    dst: &mut ImageStoreMut<T>,
    radius: f64,
    ctx: &EffectContext,
) -> Result<(), EffectError> {
    trace!(radius, "edge");
    let width = optimal_kernel_width_1d(radius, 0.5);
    debug!(width, "edge kernel width");
    let kernel = edge_kernel(width)?;
    convolve_tagged(src, dst, &kernel, CONVOLVE_TAG, ctx)
}

/// Relief effect: directional Gaussian, then equalized.
pub fn emboss<T: Quantum>(
    src: &ImageStore<T>,
    dst: &mut ImageStoreMut<T>,
    radius: f64,
    sigma: f64,
    ctx: &EffectContext,
) -> Result<(), EffectError> {
    trace!(radius, sigma, "emboss");
    let width = optimal_kernel_width_1d(radius, sigma);
    debug!(width, "emboss kernel width");
    let kernel = emboss_kernel(width, sigma)?;
    convolve_tagged(src, dst, &kernel, CONVOLVE_TAG, ctx)?;
    equalize(dst, ctx)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ChannelLayout;

    #[test]
    fn test_edge_flat_is_black() {
        let data = vec![140u8; 10 * 10];
        let image = ImageStore::borrow(&data, 10, 10, ChannelLayout::Gray);
        let mut dst = ImageStoreMut::default();
        edge(&image, &mut dst, 1.0, &EffectContext::new()).unwrap();
        assert!(dst.data.borrow().iter().all(|&x| x == 0));
    }

    #[test]
    fn test_edge_detects_step() {
        let data: Vec<u8> = (0..12 * 6).map(|i| if i % 12 < 6 { 0 } else { 100 }).collect();
        let image = ImageStore::borrow(&data, 12, 6, ChannelLayout::Gray);
        let mut dst = ImageStoreMut::default();
        edge(&image, &mut dst, 1.0, &EffectContext::new()).unwrap();
        let out = dst.data.borrow();
        assert_eq!(out[3 * 12 + 2], 0);
        assert_eq!(out[3 * 12 + 5], 0);
        assert!(out[3 * 12 + 6] > 0);
        assert_eq!(out[3 * 12 + 10], 0);
    }

    #[test]
    fn test_emboss_reaches_white() {
        let data: Vec<u8> = (0..16 * 16).map(|i| ((i % 16) * 16) as u8).collect();
        let image = ImageStore::borrow(&data, 16, 16, ChannelLayout::Gray);
        let mut dst = ImageStoreMut::default();
        emboss(&image, &mut dst, 1.0, 0.5, &EffectContext::new()).unwrap();
        let out = dst.data.borrow();
        let min = out.iter().min().copied().unwrap_or(0);
        let max = out.iter().max().copied().unwrap_or(0);
        assert_eq!(max, 255);
        assert!(min < max);
    }
}
