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
use crate::kernel::optimal_kernel_width_1d;
use crate::pixel_view::VirtualView;
use crate::progress::SPREAD_TAG;
use crate::quantum::Quantum;
use crate::row_executor::for_each_row;
use crate::{EffectError, ImageStore, ImageStoreMut};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::{debug, trace};

/// Seed of the generator owned by row `y`.
#[inline]
pub(crate) fn row_seed(seed: u64, y: usize) -> u64 {
    seed.wrapping_add((y as u64).wrapping_mul(0x9E37_79B9_7F4A_7C15))
}

/// Displaces every pixel by a random amount within the derived radius.
///
/// Results are reproducible for a context carrying a seed, whatever the
/// number of workers.
pub fn spread<T: Quantum>(
    src: &ImageStore<T>,
    dst: &mut ImageStoreMut<T>,
    radius: f64,
    ctx: &EffectContext,
) -> Result<(), EffectError> {
    src.check_layout()?;
    dst.check_layout(Some(src))?;
    src.size_matches_mut(dst)?;
    trace!(radius, "spread");

    let width = optimal_kernel_width_1d(radius, 0.5) as f64;
    debug!(width, "spread width");
    let seed = ctx.call_seed();
    let view = VirtualView::new(src, ctx.edge_mode, ctx.background);
    let active = src.active_channels();
    let cn = src.layout.channels();
    let image_width = src.width as usize;
    let height = src.height as usize;
    let progress = ctx.row_progress(SPREAD_TAG, height as u64);

    let dst_stride = dst.row_stride() as usize;
    for_each_row(
        dst.data.borrow_mut(),
        dst_stride,
        height,
        ctx.thread_count(src.width, src.height),
        &progress,
        |y, row| {
            let mut rng = StdRng::seed_from_u64(row_seed(seed, y));
            for (x, dst) in row[..image_width * cn].chunks_exact_mut(cn).enumerate() {
                let dx = width * (rng.gen::<f64>() - 0.5);
                let dy = width * (rng.gen::<f64>() - 0.5);
                let sx = (x as f64 + dx).round() as isize;
                let sy = (y as f64 + dy).round() as isize;
                let sample = view.pixel(sx, sy);
                let source = view.pixel(x as isize, y as isize);
                for (c, dst) in dst.iter_mut().enumerate() {
                    *dst = if active[c] { sample[c] } else { source[c] };
                }
            }
        },
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ChannelLayout, ThreadingPolicy};

    fn gradient() -> Vec<u8> {
        (0..20 * 20).map(|i| (i % 256) as u8).collect()
    }

    #[test]
    fn test_seeded_spread_is_reproducible() {
        let data = gradient();
        let image = ImageStore::borrow(&data, 20, 20, ChannelLayout::Gray);
        let mut a = ImageStoreMut::default();
        let mut b = ImageStoreMut::default();
        let single = EffectContext::new()
            .with_seed(7)
            .with_threading_policy(ThreadingPolicy::Single);
        let many = EffectContext::new()
            .with_seed(7)
            .with_threading_policy(ThreadingPolicy::Fixed(std::num::NonZeroUsize::new(4).unwrap()));
        spread(&image, &mut a, 3.0, &single).unwrap();
        spread(&image, &mut b, 3.0, &many).unwrap();
        assert_eq!(a.data.borrow(), b.data.borrow());
        assert_ne!(a.data.borrow(), data.as_slice());
    }

    #[test]
    fn test_spread_keeps_values_from_neighbourhood() {
        let data: Vec<u8> = (0..16 * 16).map(|i| ((i % 16) * 10) as u8).collect();
        let image = ImageStore::borrow(&data, 16, 16, ChannelLayout::Gray);
        let mut dst = ImageStoreMut::default();
        spread(&image, &mut dst, 1.0, &EffectContext::new().with_seed(3)).unwrap();
        for (i, &v) in dst.data.borrow().iter().enumerate() {
            let x = (i % 16) as i32;
            let sx = v as i32 / 10;
            assert_eq!(v % 10, 0);
            assert!((sx - x).abs() <= 2, "pixel {x} took column {sx}");
        }
    }
}
