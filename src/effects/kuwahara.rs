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

use crate::arena::{make_arena, ArenaPads};
use crate::context::EffectContext;
use crate::effects::blur::blur;
use crate::image_store::pixel_intensity;
use crate::progress::KUWAHARA_TAG;
use crate::quantum::Quantum;
use crate::row_executor::for_each_row_init;
use crate::{EffectError, ImageStore, ImageStoreMut};
use tracing::{debug, trace};

/// Edge preserving smoothing.
///
/// The image is blurred first. Every output pixel then takes the mean of the
/// least varying of the four `radius + 1` square quadrants that share it as a
/// corner, variance being measured on intensity.
pub fn kuwahara<T: Quantum>(
    src: &ImageStore<T>,
    dst: &mut ImageStoreMut<T>,
    radius: f64,
    sigma: f64,
    ctx: &EffectContext,
) -> Result<(), EffectError> {
    src.check_layout()?;
    dst.check_layout(Some(src))?;
    src.size_matches_mut(dst)?;
    if !radius.is_finite() || !sigma.is_finite() || radius < 0.0 {
        return Err(EffectError::InvalidArguments(format!(
            "kuwahara {radius}x{sigma}"
        )));
    }
    trace!(radius, sigma, "kuwahara");
    let side = radius as usize + 1;
    debug!(side, "kuwahara quadrant side");

    let mut blurred =
        ImageStoreMut::alloc(src.width, src.height, src.layout).with_mask(src.mask);
    blur(src, &mut blurred, radius, sigma, ctx)?;
    let blurred_view = blurred.to_immutable_ref();
    let (arena_source, arena) = make_arena(
        &blurred_view,
        ArenaPads::constant(side - 1),
        ctx.edge_mode,
        ctx.background,
    )?;

    let layout = src.layout;
    let cn = arena.components;
    let arena_stride = arena.stride();
    let active = src.active_channels();
    let width = src.width as usize;
    let height = src.height as usize;
    let src_stride = src.row_stride() as usize;
    let dst_stride = dst.row_stride() as usize;
    let src_data = src.data.as_ref();
    let area = (side * side) as f64;
    // quadrant origins in arena coordinates, relative to the pixel
    let quadrants = [(0, 0), (side - 1, 0), (0, side - 1), (side - 1, side - 1)];
    let progress = ctx.row_progress(KUWAHARA_TAG, height as u64);

    for_each_row_init(
        dst.data.borrow_mut(),
        dst_stride,
        height,
        ctx.thread_count(src.width, src.height),
        &progress,
        || (vec![0f64; cn], vec![0f64; cn]),
        |scratch, y, row| {
            let (mean, best) = scratch;
            let src_row = &src_data[y * src_stride..y * src_stride + width * cn];
            for (x, (dst, src_px)) in row[..width * cn]
                .chunks_exact_mut(cn)
                .zip(src_row.chunks_exact(cn))
                .enumerate()
            {
                let mut min_variance = f64::MAX;
                for (q, &(dx, dy)) in quadrants.iter().enumerate() {
                    let window = |j: usize| {
                        let start = (y + dy + j) * arena_stride + (x + dx) * cn;
                        &arena_source[start..start + side * cn]
                    };
                    mean.iter_mut().for_each(|m| *m = 0.0);
                    for j in 0..side {
                        for px in window(j).chunks_exact(cn) {
                            for (m, v) in mean.iter_mut().zip(px.iter()) {
                                *m += v.to_f64();
                            }
                        }
                    }
                    mean.iter_mut().for_each(|m| *m /= area);
                    let mean_intensity = layout.intensity(&mean[..]);
                    let mut variance = 0.0;
                    for j in 0..side {
                        for px in window(j).chunks_exact(cn) {
                            let d = pixel_intensity(layout, px) - mean_intensity;
                            variance += d * d;
                        }
                    }
                    if q == 0 || variance < min_variance {
                        min_variance = variance;
                        best.copy_from_slice(&mean[..]);
                    }
                }
                for (c, (d, &s)) in dst.iter_mut().zip(src_px.iter()).enumerate() {
                    *d = if active[c] { T::clamp_from(best[c]) } else { s };
                }
            }
        },
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ChannelLayout;

    #[test]
    fn test_step_edge_stays_sharp() {
        let data: Vec<u8> = (0..12 * 8)
            .map(|i| if i % 12 < 6 { 40 } else { 200 })
            .collect();
        let image = ImageStore::borrow(&data, 12, 8, ChannelLayout::Gray);
        let mut dst = ImageStoreMut::default();
        kuwahara(&image, &mut dst, 2.0, 0.1, &EffectContext::new()).unwrap();
        assert_eq!(dst.data.borrow(), data.as_slice());
    }

    #[test]
    fn test_isolated_spike_is_flattened() {
        let mut data = vec![100u8; 9 * 9];
        data[4 * 9 + 4] = 250;
        let image = ImageStore::borrow(&data, 9, 9, ChannelLayout::Gray);
        let mut dst = ImageStoreMut::default();
        kuwahara(&image, &mut dst, 1.0, 0.1, &EffectContext::new()).unwrap();
        let out = dst.data.borrow();
        // every quadrant of the spike holds it, so it only averages down
        assert!(out[4 * 9 + 4] < 150, "spike {}", out[4 * 9 + 4]);
        for (i, &v) in out.iter().enumerate().filter(|&(i, _)| i != 4 * 9 + 4) {
            assert_eq!(v, 100, "pixel {i}");
        }
    }

    #[test]
    fn test_rejects_negative_radius() {
        let data = vec![0u8; 4];
        let image = ImageStore::borrow(&data, 2, 2, ChannelLayout::Gray);
        let mut dst = ImageStoreMut::default();
        assert!(kuwahara(&image, &mut dst, -1.0, 1.0, &EffectContext::new()).is_err());
    }
}
