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
use crate::kernel::Kernel;
use crate::progress::CONVOLVE_TAG;
use crate::quantum::Quantum;
use crate::util::MismatchedSize;
use crate::{EffectError, ImageStore, ImageStoreMut};
use novtb::{ParallelZonedIterator, TbSliceMut};
use tracing::trace;

pub(crate) fn check_kernel(kernel: &Kernel) -> Result<(), EffectError> {
    if kernel.width % 2 == 0 {
        return Err(EffectError::KernelWidthMustBeOdd(kernel.width));
    }
    if kernel.height % 2 == 0 {
        return Err(EffectError::KernelWidthMustBeOdd(kernel.height));
    }
    if kernel.values.len() != kernel.width * kernel.height {
        return Err(EffectError::KernelSizeMismatch(MismatchedSize {
            expected: kernel.width * kernel.height,
            received: kernel.values.len(),
        }));
    }
    Ok(())
}

/// This performs direct 2D convolution on image.
///
/// # Arguments
///
/// * `src`: Source image.
/// * `dst`: Destination image, owned storage is resized to the source.
/// * `kernel`: Odd sized kernel, applied in its reflected form.
/// * `ctx`: Edge mode, threading and the `convolve:bias` artifact, see [EffectContext].
///
/// Channels outside of the source mask are copied through.
pub fn convolve<T: Quantum>(
    src: &ImageStore<T>,
    dst: &mut ImageStoreMut<T>,
    kernel: &Kernel,
    ctx: &EffectContext,
) -> Result<(), EffectError> {
    convolve_tagged(src, dst, kernel, CONVOLVE_TAG, ctx)
}

pub(crate) fn convolve_tagged<T: Quantum>(
    src: &ImageStore<T>,
    dst: &mut ImageStoreMut<T>,
    kernel: &Kernel,
    tag: &'static str,
    ctx: &EffectContext,
) -> Result<(), EffectError> {
    src.check_layout()?;
    dst.check_layout(Some(src))?;
    src.size_matches_mut(dst)?;
    check_kernel(kernel)?;

    let bias = ctx
        .artifact_quantum("convolve:bias", T::QUANTUM_RANGE)?
        .unwrap_or(0.);

    trace!(
        tag,
        width = src.width,
        height = src.height,
        kernel_w = kernel.width,
        kernel_h = kernel.height,
        bias,
        "convolve"
    );

    let points = kernel.reflected().scan_points();

    let (arena_source, arena) = make_arena(
        src,
        ArenaPads::from_window(kernel.width, kernel.height),
        ctx.edge_mode,
        ctx.background,
    )?;

    let plan = ChannelPlan::new(src.layout, src.mask, T::quantum_scale());
    let cn = plan.cn;
    let width = src.width as usize;
    let src_stride = src.row_stride() as usize;
    let dst_stride = dst.row_stride() as usize;
    let arena_stride = arena.stride();

    let pool = novtb::ThreadPool::new(ctx.thread_count(src.width, src.height));
    let progress = ctx.row_progress(tag, src.height as u64);
    let src_data = src.data.as_ref();
    let arena_slice = arena_source.as_slice();

    dst.data
        .borrow_mut()
        .tb_par_chunks_mut(dst_stride)
        .take(src.height as usize)
        .for_each_enumerated(&pool, |y, row| {
            if progress.is_cancelled() {
                return;
            }
            let src_row = &src_data[y * src_stride..y * src_stride + width * cn];
            let mut out = [0f64; 5];
            for (x, (dst, src_px)) in row[..width * cn]
                .chunks_exact_mut(cn)
                .zip(src_row.chunks_exact(cn))
                .enumerate()
            {
                let taps = points.iter().map(|p| {
                    let ay = (y as isize + arena.pad_h as isize + p.y) as usize;
                    let ax = (x as isize + arena.pad_w as isize + p.x) as usize;
                    let start = ay * arena_stride + ax * cn;
                    (p.weight, &arena_slice[start..start + cn])
                });
                plan.accumulate(taps, bias, &mut out);
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
    use crate::{ChannelLayout, EdgeMode, ThreadingPolicy};
    use std::sync::Arc;

    #[test]
    fn test_identity_kernel() {
        let width = 17usize;
        let height = 9usize;
        let src: Vec<u8> = (0..width * height * 3).map(|i| (i * 7 % 251) as u8).collect();
        let src_image = ImageStore::borrow(&src, width as u32, height as u32, ChannelLayout::Rgb);
        let mut dst = ImageStoreMut::default();
        convolve(&src_image, &mut dst, &Kernel::identity(), &EffectContext::new()).unwrap();
        assert_eq!(dst.data.borrow(), src.as_slice());
    }

    #[test]
    fn test_flat_field_stays_flat() {
        let width = 33usize;
        let height = 21usize;
        let src = vec![126u8; width * height * 4];
        let src_image = ImageStore::borrow(&src, width as u32, height as u32, ChannelLayout::Rgba);
        let mut dst = ImageStoreMut::alloc(width as u32, height as u32, ChannelLayout::Rgba);
        let kernel = crate::kernel::gaussian_kernel_2d(7, 1.5).unwrap();
        for edge_mode in [
            EdgeMode::Clamp,
            EdgeMode::Wrap,
            EdgeMode::Reflect,
            EdgeMode::Reflect101,
        ] {
            let ctx = EffectContext::new().with_edge_mode(edge_mode);
            convolve(&src_image, &mut dst, &kernel, &ctx).unwrap();
            for (i, &cn) in dst.data.borrow().iter().enumerate() {
                let diff = (cn as i32 - 126).abs();
                assert!(
                    diff <= 1,
                    "Diff expected to be less than 1, but it was {diff} at {i} for {edge_mode:?}"
                );
            }
        }
    }

    #[test]
    fn test_box_kernel_on_5x5_gray() {
        let mut src = vec![0u8; 25];
        src[12] = 90;
        let src_image = ImageStore::borrow(&src, 5, 5, ChannelLayout::Gray);
        let mut dst = ImageStoreMut::alloc(5, 5, ChannelLayout::Gray);
        let kernel = Kernel::new(3, 3, vec![1. / 9.; 9]).unwrap();
        convolve(&src_image, &mut dst, &kernel, &EffectContext::new()).unwrap();
        let data = dst.data.borrow();
        for y in 0..5 {
            for x in 0..5 {
                let expected = if (1..4).contains(&x) && (1..4).contains(&y) {
                    10
                } else {
                    0
                };
                assert_eq!(data[y * 5 + x], expected, "at ({x}, {y})");
            }
        }
    }

    #[test]
    fn test_kernel_is_reflected() {
        let src = vec![0u8, 0, 100, 0, 0];
        let src_image = ImageStore::borrow(&src, 5, 1, ChannelLayout::Gray);
        let mut dst = ImageStoreMut::alloc(5, 1, ChannelLayout::Gray);
        // picks up the left neighbour when applied as a convolution
        let kernel = Kernel::new(3, 1, vec![1., 0., 0.]).unwrap();
        convolve(&src_image, &mut dst, &kernel, &EffectContext::new()).unwrap();
        assert_eq!(dst.data.borrow(), &[0, 0, 0, 100, 0]);
    }

    #[test]
    fn test_bias_and_mask() {
        let src = vec![10u8; 3 * 4 * 4];
        let src_image = ImageStore::borrow(&src, 4, 4, ChannelLayout::Rgb)
            .with_mask(crate::ChannelMask::from_channels(&[crate::PixelChannel::Red]));
        let mut dst = ImageStoreMut::default();
        let ctx = EffectContext::new().with_artifact("convolve:bias", "5");
        convolve(&src_image, &mut dst, &Kernel::identity(), &ctx).unwrap();
        for px in dst.data.borrow().chunks_exact(3) {
            assert_eq!(px, &[15, 10, 10]);
        }
    }

    #[test]
    fn test_even_kernel_rejected() {
        let src = vec![0u8; 16];
        let src_image = ImageStore::borrow(&src, 4, 4, ChannelLayout::Gray);
        let mut dst = ImageStoreMut::default();
        let kernel = Kernel {
            width: 2,
            height: 1,
            values: vec![0.5, 0.5],
        };
        let result = convolve(&src_image, &mut dst, &kernel, &EffectContext::new());
        assert!(matches!(result, Err(EffectError::KernelWidthMustBeOdd(2))));
    }

    #[test]
    fn test_cancellation() {
        let src = vec![0u8; 64 * 64];
        let src_image = ImageStore::borrow(&src, 64, 64, ChannelLayout::Gray);
        let mut dst = ImageStoreMut::default();
        let ctx = EffectContext::new()
            .with_threading_policy(ThreadingPolicy::Single)
            .with_monitor(Arc::new(|_: &'static str, done: u64, _: u64| done < 3));
        let result = convolve(&src_image, &mut dst, &Kernel::identity(), &ctx);
        assert!(matches!(result, Err(EffectError::Cancelled(CONVOLVE_TAG))));
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
            convolve(&src_image, &mut dst, &Kernel::identity(), &ctx).unwrap();
            assert_eq!(
                out,
                vec![50, 50, 50, 50, 0, 0, 50, 50, 50, 50, 0, 0, 50, 50, 50, 50],
                "{policy:?}"
            );
        }
    }
}
