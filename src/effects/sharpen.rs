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
use crate::effects::blur::blur;
use crate::kernel::{optimal_kernel_width_2d, sharpen_kernel};
use crate::progress::{SHARPEN_TAG, UNSHARP_MASK_TAG};
use crate::quantum::Quantum;
use crate::row_executor::for_each_row;
use crate::{EffectError, ImageStore, ImageStoreMut};
use tracing::{debug, trace};

/// Sharpens with a negative Gaussian whose center outweighs its surround.
pub fn sharpen<T: Quantum>(
    src: &ImageStore<T>,
    dst: &mut ImageStoreMut<T>,
    radius: f64,
    sigma: f64,
    ctx: &EffectContext,
) -> Result<(), EffectError> {
    trace!(radius, sigma, "sharpen");
    let width = optimal_kernel_width_2d(radius, sigma);
    debug!(width, "sharpen kernel width");
    if width == 1 {
        return src.copy_to_mut(dst);
    }
    let kernel = sharpen_kernel(width, sigma)?;
    convolve_tagged(src, dst, &kernel, SHARPEN_TAG, ctx)
}

/// Unsharp mask.
///
/// # Arguments
///
/// * `gain`: Fraction of the difference between the source and its blur
///   added back to the source.
/// * `threshold`: Fraction of the channel range; differences whose double
///   stays below it leave the source value in place.
pub fn unsharp_mask<T: Quantum>(
    src: &ImageStore<T>,
    dst: &mut ImageStoreMut<T>,
    radius: f64,
    sigma: f64,
    gain: f64,
    threshold: f64,
    ctx: &EffectContext,
) -> Result<(), EffectError> {
    trace!(radius, sigma, gain, threshold, "unsharp mask");
    if !gain.is_finite() || !threshold.is_finite() {
        return Err(EffectError::InvalidArguments(format!(
            "unsharp mask gain {gain}, threshold {threshold}"
        )));
    }
    blur(src, dst, radius, sigma, ctx)?;

    let range = T::QUANTUM_RANGE;
    let cut = range * threshold;
    let cn = src.layout.channels();
    let width = src.width as usize;
    let height = src.height as usize;
    let src_stride = src.row_stride() as usize;
    let dst_stride = dst.row_stride() as usize;
    let active = src.active_channels();
    let src_data = src.data.as_ref();
    let progress = ctx.row_progress(UNSHARP_MASK_TAG, height as u64);

    for_each_row(
        dst.data.borrow_mut(),
        dst_stride,
        height,
        ctx.thread_count(src.width, src.height),
        &progress,
        |y, row| {
            let src_row = &src_data[y * src_stride..y * src_stride + width * cn];
            for (dst, src) in row[..width * cn]
                .chunks_exact_mut(cn)
                .zip(src_row.chunks_exact(cn))
            {
                for (c, (d, &s)) in dst.iter_mut().zip(src.iter()).enumerate() {
                    if !active[c] {
                        continue;
                    }
                    let p = s.to_f64();
                    let diff = p - d.to_f64();
                    *d = if (2.0 * diff).abs() < cut {
                        s
                    } else {
                        T::clamp_from(p + gain * diff)
                    };
                }
            }
        },
    )
}
