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
use crate::convolve::channel_plan::ChannelPlan;
use crate::kernel::{motion_kernel, optimal_kernel_width_1d};
use crate::pixel_view::VirtualView;
use crate::progress::MOTION_BLUR_TAG;
use crate::quantum::Quantum;
use crate::row_executor::for_each_row;
use crate::{EffectError, ImageStore, ImageStoreMut};
use tracing::{debug, trace};

/// Sample offsets along the direction of `angle` degrees.
fn motion_offsets(width: usize, angle: f64) -> Vec<(isize, isize)> {
    let radians = angle.to_radians();
    let point_x = width as f64 * radians.sin();
    let point_y = width as f64 * radians.cos();
    let hypot = point_x.hypot(point_y);
    (0..width)
        .map(|i| {
            let i = i as f64;
            (
                (i * point_y / hypot - 0.5).ceil() as isize,
                (i * point_x / hypot - 0.5).ceil() as isize,
            )
        })
        .collect()
}

/// One sided directional blur simulating motion toward `angle` degrees.
pub fn motion_blur<T: Quantum>(
    src: &ImageStore<T>,
    dst: &mut ImageStoreMut<T>,
    radius: f64,
    sigma: f64,
    angle: f64,
    ctx: &EffectContext,
) -> Result<(), EffectError> {
    src.check_layout()?;
    dst.check_layout(Some(src))?;
    src.size_matches_mut(dst)?;
    if !angle.is_finite() {
        return Err(EffectError::InvalidArguments(format!("motion angle {angle}")));
    }
    trace!(radius, sigma, angle, "motion blur");

    let width = optimal_kernel_width_1d(radius, sigma);
    debug!(width, "motion kernel width");
    let kernel = motion_kernel(width, sigma)?;
    let offsets = motion_offsets(width, angle);

    let view = VirtualView::new(src, ctx.edge_mode, ctx.background);
    let plan = ChannelPlan::new(src.layout, src.mask, T::quantum_scale());
    let cn = plan.cn;
    let image_width = src.width as usize;
    let height = src.height as usize;
    let dst_stride = dst.row_stride() as usize;
    let progress = ctx.row_progress(MOTION_BLUR_TAG, height as u64);

    for_each_row(
        dst.data.borrow_mut(),
        dst_stride,
        height,
        ctx.thread_count(src.width, src.height),
        &progress,
        |y, row| {
            let mut out = [0f64; 5];
            for (x, dst) in row[..image_width * cn].chunks_exact_mut(cn).enumerate() {
                let taps = kernel.iter().zip(offsets.iter()).map(|(&k, &(ox, oy))| {
                    (k, view.pixel(x as isize + ox, y as isize + oy))
                });
                plan.accumulate(taps, 0., &mut out);
                let src_px = view.pixel(x as isize, y as isize);
                for (c, (dst, &src)) in dst.iter_mut().zip(src_px.iter()).enumerate() {
                    *dst = if plan.active[c] {
                        T::clamp_from(out[c])
                    } else {
                        src
                    };
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
    fn test_offsets_follow_angle() {
        let horizontal = motion_offsets(5, 0.0);
        assert_eq!(horizontal, vec![(0, 0), (1, 0), (2, 0), (3, 0), (4, 0)]);
        let vertical = motion_offsets(3, 90.0);
        assert_eq!(vertical, vec![(0, 0), (0, 1), (0, 2)]);
    }

    #[test]
    fn test_motion_blur_is_one_sided() {
        let mut data = vec![0u8; 15 * 3];
        data[15 + 7] = 255;
        let image = ImageStore::borrow(&data, 15, 3, ChannelLayout::Gray);
        let mut dst = ImageStoreMut::default();
        motion_blur(&image, &mut dst, 3.0, 1.0, 0.0, &EffectContext::new()).unwrap();
        let out = dst.data.borrow();
        let row = &out[15..30];
        assert!(row[7] > 0);
        assert!(row[5] > 0, "trail {}", row[5]);
        assert_eq!(row[8], 0);
        assert_eq!(row[9], 0);
        assert!(out[..15].iter().all(|&x| x == 0));
    }

    #[test]
    fn test_motion_blur_flat() {
        let data = vec![0.25f32; 4 * 10 * 10];
        let image = ImageStore::borrow(&data, 10, 10, ChannelLayout::Rgba);
        let mut dst = ImageStoreMut::default();
        motion_blur(&image, &mut dst, 0.0, 2.0, 33.0, &EffectContext::new()).unwrap();
        for &v in dst.data.borrow().iter() {
            assert!((v - 0.25).abs() < 1e-4, "value {v}");
        }
    }
}
