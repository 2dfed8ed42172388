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
use crate::progress::ADAPTIVE_THRESHOLD_TAG;
use crate::quantum::Quantum;
use crate::row_executor::for_each_row_init;
use crate::threshold::threshold_targets;
use crate::{EffectError, ImageStore, ImageStoreMut};
use tracing::trace;

/// Local threshold against the mean of a `width`×`height` neighbourhood.
///
/// A sample becomes 0 when it is at or below `mean + bias`, the full range
/// otherwise. `bias` is in channel units. Window sums slide along each row
/// over per column sums, so the cost per sample does not grow with `width`.
pub fn adaptive_threshold<T: Quantum>(
    src: &ImageStore<T>,
    dst: &mut ImageStoreMut<T>,
    width: usize,
    height: usize,
    bias: f64,
    ctx: &EffectContext,
) -> Result<(), EffectError> {
    if width == 0 || height == 0 {
        return Err(EffectError::InvalidArguments(format!(
            "adaptive threshold window {width}x{height} is empty"
        )));
    }
    if width % 2 == 0 {
        return Err(EffectError::KernelWidthMustBeOdd(width));
    }
    src.check_layout()?;
    dst.check_layout(Some(src))?;
    src.size_matches_mut(dst)?;
    trace!(width, height, bias, "adaptive threshold");

    let (arena_source, arena) = make_arena(
        src,
        ArenaPads::from_window(width, height),
        ctx.edge_mode,
        ctx.background,
    )?;
    let arena_stride = arena.stride();
    let arena_slice = arena_source.as_slice();
    let cn = arena.components;
    let top = arena.pad_h - height / 2;
    let count = (width * height) as f64;

    let targets = threshold_targets(src.layout, src.mask);
    let columns = src.width as usize;
    let rows = src.height as usize;
    let src_stride = src.row_stride() as usize;
    let src_data = src.data.as_ref();
    let black = T::clamp_from(0.0);
    let white = T::clamp_from(T::QUANTUM_RANGE);
    let progress = ctx.row_progress(ADAPTIVE_THRESHOLD_TAG, rows as u64);

    let dst_stride = dst.row_stride() as usize;
    for_each_row_init(
        dst.data.borrow_mut(),
        dst_stride,
        rows,
        ctx.thread_count(src.width, src.height),
        &progress,
        || vec![0f64; arena_stride],
        |column_sums, y, row| {
            column_sums.iter_mut().for_each(|x| *x = 0.0);
            for v in 0..height {
                let start = (y + top + v) * arena_stride;
                for (sum, sample) in column_sums
                    .iter_mut()
                    .zip(arena_slice[start..start + arena_stride].iter())
                {
                    *sum += sample.to_f64();
                }
            }

            let src_row = &src_data[y * src_stride..y * src_stride + columns * cn];
            let dst_row = &mut row[..columns * cn];
            for c in 0..cn {
                if !targets[c] {
                    for (dst, src) in dst_row
                        .iter_mut()
                        .skip(c)
                        .step_by(cn)
                        .zip(src_row.iter().skip(c).step_by(cn))
                    {
                        *dst = *src;
                    }
                    continue;
                }
                let mut window: f64 = (0..width).map(|u| column_sums[u * cn + c]).sum();
                for x in 0..columns {
                    if x > 0 {
                        window += column_sums[(x + width - 1) * cn + c]
                            - column_sums[(x - 1) * cn + c];
                    }
                    let mean = window / count + bias;
                    let center = src_row[x * cn + c].to_f64();
                    dst_row[x * cn + c] = if center <= mean { black } else { white };
                }
            }
        },
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ChannelLayout, EdgeMode, Scalar};

    #[test]
    fn test_uniform_image_goes_black() {
        let data = vec![173u8; 3 * 12 * 9];
        let image = ImageStore::borrow(&data, 12, 9, ChannelLayout::Rgb);
        let mut dst = ImageStoreMut::default();
        adaptive_threshold(&image, &mut dst, 5, 5, 0.0, &EffectContext::new()).unwrap();
        assert!(dst.data.borrow().iter().all(|&x| x == 0));
    }

    #[test]
    fn test_rejects_even_or_empty_window() {
        let data = vec![0u8; 16];
        let image = ImageStore::borrow(&data, 4, 4, ChannelLayout::Gray);
        let mut dst = ImageStoreMut::default();
        let ctx = EffectContext::new();
        assert!(matches!(
            adaptive_threshold(&image, &mut dst, 4, 3, 0.0, &ctx),
            Err(EffectError::KernelWidthMustBeOdd(4))
        ));
        assert!(adaptive_threshold(&image, &mut dst, 3, 0, 0.0, &ctx).is_err());
    }

    #[test]
    fn test_bright_spot_stands_out() {
        let mut data = vec![10u8; 9 * 9];
        data[4 * 9 + 4] = 200;
        let image = ImageStore::borrow(&data, 9, 9, ChannelLayout::Gray);
        let mut dst = ImageStoreMut::default();
        let ctx = EffectContext::new()
            .with_edge_mode(EdgeMode::Constant)
            .with_background(Scalar::dup(10.0));
        adaptive_threshold(&image, &mut dst, 3, 3, 0.0, &ctx).unwrap();
        let out = dst.data.borrow();
        assert_eq!(out[4 * 9 + 4], 255);
        assert_eq!(out.iter().filter(|&&x| x == 255).count(), 1);
    }

    #[test]
    fn test_alpha_is_copied() {
        let data: Vec<u8> = (0..4 * 7 * 7).map(|i| (i * 13 % 256) as u8).collect();
        let image = ImageStore::borrow(&data, 7, 7, ChannelLayout::Rgba);
        let mut dst = ImageStoreMut::default();
        adaptive_threshold(&image, &mut dst, 3, 3, 5.0, &EffectContext::new()).unwrap();
        for (out, src) in dst.data.borrow().chunks_exact(4).zip(data.chunks_exact(4)) {
            assert_eq!(out[3], src[3]);
            assert!(out[..3].iter().all(|&x| x == 0 || x == 255));
        }
    }
}
