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
use crate::convolve::convolve_2d::check_kernel;
use crate::kernel::Kernel;
use crate::quantum::Quantum;
use crate::util::try_vec;
use crate::{EffectError, ImageStore, ImageStoreMut};
use novtb::{ParallelZonedIterator, TbSliceMut};
use tracing::trace;

/// Two pass convolution, rows first into an `f64` intermediate, then columns.
///
/// Equivalent to the full 2D convolution with the outer product of
/// `row_kernel` and `column_kernel`, including alpha weighting.
pub fn convolve_separable<T: Quantum>(
    src: &ImageStore<T>,
    dst: &mut ImageStoreMut<T>,
    row_kernel: &Kernel,
    column_kernel: &Kernel,
    tag: &'static str,
    ctx: &EffectContext,
) -> Result<(), EffectError> {
    src.check_layout()?;
    dst.check_layout(Some(src))?;
    src.size_matches_mut(dst)?;
    check_kernel(row_kernel)?;
    check_kernel(column_kernel)?;

    let bias = ctx
        .artifact_quantum("convolve:bias", T::QUANTUM_RANGE)?
        .unwrap_or(0.);

    trace!(
        tag,
        width = src.width,
        height = src.height,
        row_kernel = row_kernel.values.len(),
        column_kernel = column_kernel.values.len(),
        "convolve separable"
    );

    let plan = ChannelPlan::new(src.layout, src.mask, T::quantum_scale());
    let all_channels = plan.all_active();
    let cn = plan.cn;
    let width = src.width as usize;
    let height = src.height as usize;
    let src_stride = src.row_stride() as usize;
    let dst_stride = dst.row_stride() as usize;

    let row_taps: Vec<(isize, f64)> = row_kernel
        .values
        .iter()
        .rev()
        .enumerate()
        .filter(|(_, &w)| w != 0.0)
        .map(|(i, &w)| (i as isize - (row_kernel.values.len() / 2) as isize, w))
        .collect();
    let column_taps: Vec<(isize, f64)> = column_kernel
        .values
        .iter()
        .rev()
        .enumerate()
        .filter(|(_, &w)| w != 0.0)
        .map(|(i, &w)| (i as isize - (column_kernel.values.len() / 2) as isize, w))
        .collect();

    let pad = row_kernel.values.len() / 2;
    let (arena_source, arena) =
        make_arena(src, ArenaPads::new(pad, 0, pad, 0), ctx.edge_mode, ctx.background)?;
    let arena_stride = arena.stride();

    let pool = novtb::ThreadPool::new(ctx.thread_count(src.width, src.height));
    let progress = ctx.row_progress(tag, 2 * height as u64);

    let mut intermediate = try_vec(width * height * cn, 0f64, "separable intermediate")?;

    intermediate
        .tb_par_chunks_exact_mut(width * cn)
        .for_each_enumerated(&pool, |y, row| {
            if progress.is_cancelled() {
                return;
            }
            let mut out = [0f64; 5];
            for (x, dst) in row.chunks_exact_mut(cn).enumerate() {
                let taps = row_taps.iter().map(|&(dx, w)| {
                    let start = y * arena_stride + (x as isize + pad as isize + dx) as usize * cn;
                    (w, &arena_source[start..start + cn])
                });
                all_channels.accumulate(taps, 0., &mut out);
                dst.copy_from_slice(&out[..cn]);
            }
            progress.row_done();
        });

    if progress.is_cancelled() {
        return progress.finish();
    }

    let background: Vec<f64> = (0..cn).map(|c| ctx.background[c]).collect();
    let src_data = src.data.as_ref();
    let intermediate = intermediate.as_slice();
    let edge_mode = ctx.edge_mode;

    dst.data
        .borrow_mut()
        .tb_par_chunks_mut(dst_stride)
        .take(src.height as usize)
        .for_each_enumerated(&pool, |y, row| {
            if progress.is_cancelled() {
                return;
            }
            let resolved: Vec<(Option<usize>, f64)> = column_taps
                .iter()
                .map(|&(dy, w)| (edge_mode.resolve(y as isize + dy, height), w))
                .collect();
            let mut out = [0f64; 5];
            for (x, dst) in row[..width * cn].chunks_exact_mut(cn).enumerate() {
                let taps = resolved.iter().map(|&(sy, w)| match sy {
                    Some(sy) => {
                        let start = (sy * width + x) * cn;
                        (w, &intermediate[start..start + cn])
                    }
                    None => (w, background.as_slice()),
                });
                plan.accumulate(taps, bias, &mut out);
                let src_px = &src_data[y * src_stride + x * cn..y * src_stride + (x + 1) * cn];
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
    use crate::convolve::convolve;
    use crate::kernel::gaussian_kernel_1d;
    use crate::{ChannelLayout, EdgeMode, ThreadingPolicy};

    fn outer(row: &Kernel, column: &Kernel) -> Kernel {
        let mut values = Vec::new();
        for &c in column.values.iter() {
            for &r in row.values.iter() {
                values.push(c * r);
            }
        }
        Kernel::new(row.values.len(), column.values.len(), values).unwrap()
    }

    #[test]
    fn test_separable_matches_full_kernel() {
        let width = 23usize;
        let height = 17usize;
        let src: Vec<u8> = (0..width * height * 4)
            .map(|i| ((i * 31 + i / 7) % 256) as u8)
            .collect();
        let src_image = ImageStore::borrow(&src, width as u32, height as u32, ChannelLayout::Rgba);
        let row = gaussian_kernel_1d(5, 1.2).unwrap();
        let column = gaussian_kernel_1d(7, 1.7).unwrap();
        let column = Kernel::new(1, 7, column.values).unwrap();
        for edge_mode in [EdgeMode::Clamp, EdgeMode::Reflect101, EdgeMode::Wrap] {
            let ctx = EffectContext::new().with_edge_mode(edge_mode);
            let mut separable = ImageStoreMut::default();
            convolve_separable(&src_image, &mut separable, &row, &column, "test", &ctx).unwrap();
            let mut full = ImageStoreMut::default();
            convolve(&src_image, &mut full, &outer(&row, &column), &ctx).unwrap();
            for (i, (&a, &b)) in separable
                .data
                .borrow()
                .iter()
                .zip(full.data.borrow().iter())
                .enumerate()
            {
                let diff = (a as i32 - b as i32).abs();
                assert!(diff <= 1, "diff {diff} at {i} for {edge_mode:?}");
            }
        }
    }

    #[test]
    fn test_separable_flat() {
        let src = vec![77u16; 12 * 12];
        let src_image = ImageStore::borrow(&src, 12, 12, ChannelLayout::Gray);
        let mut dst = ImageStoreMut::default();
        let kernel = gaussian_kernel_1d(9, 2.0).unwrap();
        convolve_separable(&src_image, &mut dst, &kernel, &kernel, "test", &EffectContext::new())
            .unwrap();
        assert!(dst.data.borrow().iter().all(|&x| x == 77));
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
            let kernel = gaussian_kernel_1d(3, 0.8).unwrap();
            convolve_separable(&src_image, &mut dst, &kernel, &kernel, "test", &ctx).unwrap();
            assert_eq!(
                out,
                vec![50, 50, 50, 50, 0, 0, 50, 50, 50, 50, 0, 0, 50, 50, 50, 50],
                "{policy:?}"
            );
        }
    }
}
