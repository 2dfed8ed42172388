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
use crate::effects::blur::blur;
use crate::effects::edge::edge;
use crate::effects::level::level;
use crate::image_store::pixel_intensity;
use crate::kernel::{blur_family, optimal_kernel_width_2d, sharpen_family, KernelFamily};
use crate::progress::{ADAPTIVE_BLUR_TAG, ADAPTIVE_SHARPEN_TAG};
use crate::quantum::{Quantum, MAGICK_EPSILON};
use crate::{ChannelMask, EffectError, ImageStore, ImageStoreMut};
use novtb::{ParallelZonedIterator, TbSliceMut};
use tracing::{debug, trace};

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
enum AdaptiveKind {
    Blur,
    Sharpen,
}

/// Blurs less where the image has edges and more where it is flat.
///
/// An edge map picks, per pixel, one kernel of a family of decreasing sizes:
/// strong edges get the smallest window.
pub fn adaptive_blur<T: Quantum>(
    src: &ImageStore<T>,
    dst: &mut ImageStoreMut<T>,
    radius: f64,
    sigma: f64,
    ctx: &EffectContext,
) -> Result<(), EffectError> {
    adaptive_filter(src, dst, radius, sigma, AdaptiveKind::Blur, ctx)
}

/// Sharpens more where the image has edges and less where it is flat.
pub fn adaptive_sharpen<T: Quantum>(
    src: &ImageStore<T>,
    dst: &mut ImageStoreMut<T>,
    radius: f64,
    sigma: f64,
    ctx: &EffectContext,
) -> Result<(), EffectError> {
    adaptive_filter(src, dst, radius, sigma, AdaptiveKind::Sharpen, ctx)
}

/// Edge strength of the whole image: edge, stretch, blur, stretch.
fn edge_map<T: Quantum>(
    src: &ImageStore<T>,
    radius: f64,
    sigma: f64,
    ctx: &EffectContext,
) -> Result<ImageStoreMut<'static, T>, EffectError> {
    let mut full = ImageStore::borrow(src.data.as_ref(), src.width, src.height, src.layout)
        .with_mask(ChannelMask::ALL);
    full.stride = src.row_stride();
    let mut edges = ImageStoreMut::default();
    edge(&full, &mut edges, radius, ctx)?;
    level(&mut edges, 20.0, 95.0, ctx)?;
    let mut smoothed = ImageStoreMut::default();
    blur(&edges.to_immutable_ref(), &mut smoothed, radius, sigma, ctx)?;
    level(&mut smoothed, 10.0, 95.0, ctx)?;
    Ok(smoothed)
}

/// Family index for an edge intensity, always even and below `width`.
#[inline]
fn select_kernel(width: usize, intensity: f64, quantum_scale: f64) -> usize {
    let j = (width as f64 * (1.0 - quantum_scale * intensity) - 0.5).ceil();
    let j = j.max(0.0).min(width as f64) as usize;
    j & !1
}

fn adaptive_filter<T: Quantum>(
    src: &ImageStore<T>,
    dst: &mut ImageStoreMut<T>,
    radius: f64,
    sigma: f64,
    kind: AdaptiveKind,
    ctx: &EffectContext,
) -> Result<(), EffectError> {
    src.check_layout()?;
    dst.check_layout(Some(src))?;
    src.size_matches_mut(dst)?;
    trace!(radius, sigma, ?kind, "adaptive filter");

    if sigma.abs() < MAGICK_EPSILON {
        return src.copy_to_mut(dst);
    }

    let edges = edge_map(src, radius, sigma, ctx)?;

    let width = optimal_kernel_width_2d(radius, sigma);
    debug!(width, "adaptive kernel width");
    let family: KernelFamily = match kind {
        AdaptiveKind::Blur => blur_family(width, sigma)?,
        AdaptiveKind::Sharpen => sharpen_family(width, sigma)?,
    };
    let tag = match kind {
        AdaptiveKind::Blur => ADAPTIVE_BLUR_TAG,
        AdaptiveKind::Sharpen => ADAPTIVE_SHARPEN_TAG,
    };

    let half = width / 2;
    let (arena_source, arena) =
        make_arena(src, ArenaPads::constant(half), ctx.edge_mode, ctx.background)?;
    let arena_stride = arena.stride();
    let arena_slice = arena_source.as_slice();

    let plan = ChannelPlan::new(src.layout, src.mask, T::quantum_scale());
    let cn = plan.cn;
    let image_width = src.width as usize;
    let src_stride = src.row_stride() as usize;
    let dst_stride = dst.row_stride() as usize;
    let src_data = src.data.as_ref();
    let layout = src.layout;

    let pool = novtb::ThreadPool::new(ctx.thread_count(src.width, src.height));
    let progress = ctx.row_progress(tag, src.height as u64);

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
                let intensity = pixel_intensity(layout, edges.pixel(x, y));
                let j = select_kernel(width, intensity, T::quantum_scale());
                let Some(kernel) = family.kernel(j) else {
                    dst.copy_from_slice(src_px);
                    continue;
                };
                let size = kernel.width;
                let origin_x = x + half - size / 2;
                let origin_y = y + half - size / 2;
                let taps = kernel.values.iter().enumerate().map(|(i, &k)| {
                    let ay = origin_y + i / size;
                    let ax = origin_x + i % size;
                    let start = ay * arena_stride + ax * cn;
                    (k, &arena_slice[start..start + cn])
                });
                plan.weighted_mean(taps, &mut out);
                for (c, (dst, &src)) in dst.iter_mut().zip(src_px.iter()).enumerate() {
                    *dst = if plan.active[c] {
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
    fn test_select_kernel_is_even() {
        for w in [3usize, 5, 9, 15] {
            for intensity in [0.0, 10.0, 100.0, 200.0, 255.0] {
                let j = select_kernel(w, intensity, 1. / 255.);
                assert_eq!(j % 2, 0);
                assert!(j < w, "j {j} for width {w}");
            }
        }
        assert_eq!(select_kernel(9, 255.0, 1. / 255.), 0);
        assert_eq!(select_kernel(9, 0.0, 1. / 255.), 8);
    }

    #[test]
    fn test_adaptive_blur_flat_image() {
        let data = vec![90u8; 3 * 12 * 12];
        let image = ImageStore::borrow(&data, 12, 12, ChannelLayout::Rgb);
        let mut dst = ImageStoreMut::default();
        adaptive_blur(&image, &mut dst, 2.0, 1.0, &EffectContext::new()).unwrap();
        for &v in dst.data.borrow().iter() {
            assert!((v as i32 - 90).abs() <= 1, "value {v}");
        }
    }

    #[test]
    fn test_adaptive_sharpen_flat_image() {
        let data = vec![1200u16; 12 * 12];
        let image = ImageStore::borrow(&data, 12, 12, ChannelLayout::Gray);
        let mut dst = ImageStoreMut::default();
        adaptive_sharpen(&image, &mut dst, 2.0, 1.0, &EffectContext::new()).unwrap();
        for &v in dst.data.borrow().iter() {
            assert!((v as i32 - 1200).abs() <= 1, "value {v}");
        }
    }

    #[test]
    fn test_zero_sigma_copies() {
        let data: Vec<u8> = (0..64).map(|i| i as u8 * 3).collect();
        let image = ImageStore::borrow(&data, 8, 8, ChannelLayout::Gray);
        let mut dst = ImageStoreMut::default();
        adaptive_blur(&image, &mut dst, 1.0, 0.0, &EffectContext::new()).unwrap();
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
            adaptive_blur(&src_image, &mut dst, 2.0, 1.0, &ctx).unwrap();
            assert_eq!(
                out,
                vec![50, 50, 50, 50, 0, 0, 50, 50, 50, 50, 0, 0, 50, 50, 50, 50],
                "{policy:?}"
            );
        }
    }
}
