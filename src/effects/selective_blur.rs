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
use crate::convolve::channel_plan::ChannelPlan;
use crate::image_store::pixel_intensity;
use crate::kernel::optimal_kernel_width_1d;
use crate::progress::SELECTIVE_BLUR_TAG;
use crate::quantum::{Quantum, MAGICK_EPSILON};
use crate::util::try_vec;
use crate::{EffectError, ImageStore, ImageStoreMut};
use novtb::{ParallelZonedIterator, TbSliceMut};
use std::f64::consts::PI;
use tracing::{debug, trace};

/// Gaussian blur restricted to neighbours of similar intensity.
///
/// # Arguments
///
/// * `threshold`: Largest intensity difference, in channel range units, a
///   neighbour may have from the center pixel and still contribute.
///
/// A pixel without any contributing neighbour keeps its value.
pub fn selective_blur<T: Quantum>(
    src: &ImageStore<T>,
    dst: &mut ImageStoreMut<T>,
    radius: f64,
    sigma: f64,
    threshold: f64,
    ctx: &EffectContext,
) -> Result<(), EffectError> {
    src.check_layout()?;
    dst.check_layout(Some(src))?;
    src.size_matches_mut(dst)?;
    trace!(radius, sigma, threshold, "selective blur");

    let width = optimal_kernel_width_1d(radius, sigma);
    debug!(width, "selective blur kernel width");
    let sigma = if sigma.abs() < MAGICK_EPSILON {
        MAGICK_EPSILON
    } else {
        sigma
    };

    let half = (width / 2) as isize;
    let mut weights = try_vec(width * width, 0f64, "selective blur kernel")?;
    for (v, row) in (-half..=half).zip(weights.chunks_exact_mut(width)) {
        for (u, dst) in (-half..=half).zip(row.iter_mut()) {
            *dst = (-((u * u + v * v) as f64) / (2.0 * sigma * sigma)).exp()
                / (2.0 * PI * sigma * sigma);
        }
    }

    let (arena_source, arena) = make_arena(
        src,
        ArenaPads::from_window(width, width),
        ctx.edge_mode,
        ctx.background,
    )?;
    let cn = arena.components;
    let layout = src.layout;
    let mut intensities = try_vec(arena.width * arena.height, 0f64, "intensity plane")?;
    for (dst, px) in intensities
        .iter_mut()
        .zip(arena_source.chunks_exact(cn))
    {
        *dst = pixel_intensity(layout, px);
    }

    let plan = ChannelPlan::new(src.layout, src.mask, T::quantum_scale());
    let image_width = src.width as usize;
    let src_stride = src.row_stride() as usize;
    let dst_stride = dst.row_stride() as usize;
    let src_data = src.data.as_ref();
    let arena_slice = arena_source.as_slice();
    let intensities = intensities.as_slice();

    let pool = novtb::ThreadPool::new(ctx.thread_count(src.width, src.height));
    let progress = ctx.row_progress(SELECTIVE_BLUR_TAG, src.height as u64);

    dst.data
        .borrow_mut()
        .tb_par_chunks_mut(dst_stride)
        .take(src.height as usize)
        .for_each_enumerated(&pool, |y, row| {
            if progress.is_cancelled() {
                return;
            }
            let mut out = [0f64; 5];
            let src_row = &src_data[y * src_stride..y * src_stride + image_width * cn];
            for (x, (dst, src_px)) in row[..image_width * cn]
                .chunks_exact_mut(cn)
                .zip(src_row.chunks_exact(cn))
                .enumerate()
            {
                let center = intensities[(y + arena.pad_h) * arena.width + x + arena.pad_w];
                let taps = weights
                    .iter()
                    .enumerate()
                    .map(|(i, &k)| (k, (y + i / width) * arena.width + x + i % width))
                    .filter(|&(_, at)| (intensities[at] - center).abs() < threshold)
                    .map(|(k, at)| (k, &arena_slice[at * cn..at * cn + cn]));
                let (plain, gamma) = plan.weighted_mean(taps, &mut out);
                for (c, (dst, &src)) in dst.iter_mut().zip(src_px.iter()).enumerate() {
                    let weight = match plan.alpha {
                        Some(a) if a != c => gamma,
                        _ => plain,
                    };
                    *dst = if plan.active[c] && weight.abs() >= MAGICK_EPSILON {
                        T::clamp_from(out[c])
                    } else {
                        src
                    };
                }
            }
            progress.row_done();
        });

    progress.finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ChannelLayout, ThreadingPolicy};

    #[test]
    fn test_edges_are_preserved() {
        let data: Vec<u8> = (0..16 * 8).map(|i| if i % 16 < 8 { 20 } else { 220 }).collect();
        let image = ImageStore::borrow(&data, 16, 8, ChannelLayout::Gray);
        let mut dst = ImageStoreMut::default();
        selective_blur(&image, &mut dst, 3.0, 1.5, 50.0, &EffectContext::new()).unwrap();
        assert_eq!(dst.data.borrow(), data.as_slice());
    }

    #[test]
    fn test_small_differences_are_smoothed() {
        let mut data = vec![100u8; 9 * 9];
        data[4 * 9 + 4] = 110;
        let image = ImageStore::borrow(&data, 9, 9, ChannelLayout::Gray);
        let mut dst = ImageStoreMut::default();
        selective_blur(&image, &mut dst, 2.0, 1.0, 50.0, &EffectContext::new()).unwrap();
        let center = dst.data.borrow()[4 * 9 + 4];
        assert!(center > 100 && center < 110, "center {center}");
    }

    #[test]
    fn test_zero_threshold_copies() {
        let data: Vec<u8> = (0..3 * 25).map(|i| (i * 5) as u8).collect();
        let image = ImageStore::borrow(&data, 5, 5, ChannelLayout::Rgb);
        let mut dst = ImageStoreMut::default();
        selective_blur(&image, &mut dst, 1.0, 1.0, 0.0, &EffectContext::new()).unwrap();
        assert_eq!(dst.data.borrow(), data.as_slice());
    }

    #[test]
    fn test_padded_destination_stride() {
        for policy in [
            ThreadingPolicy::Single,
            ThreadingPolicy::Fixed(std::num::NonZeroUsize::new(2).unwrap()),
        ] {
            let src = vec![50u8; 4 * 3];
            let src_image = ImageStore::borrow(&src, 4, 3, ChannelLayout::Gray);
            // stride 6, the last row carries no padding
            let mut out = vec![0u8; 6 * 2 + 4];
            let mut dst = ImageStoreMut::borrow(&mut out, 4, 3, ChannelLayout::Gray);
            dst.stride = 6;
            let ctx = EffectContext::new().with_threading_policy(policy);
            selective_blur(&src_image, &mut dst, 2.0, 1.0, 10.0, &ctx).unwrap();
            assert_eq!(
                out,
                vec![50, 50, 50, 50, 0, 0, 50, 50, 50, 50, 0, 0, 50, 50, 50, 50],
                "{policy:?}"
            );
        }
    }
}
