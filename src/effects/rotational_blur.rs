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
use crate::pixel_view::VirtualView;
use crate::progress::ROTATIONAL_BLUR_TAG;
use crate::quantum::Quantum;
use crate::row_executor::for_each_row;
use crate::{EffectError, ImageStore, ImageStoreMut};
use tracing::{debug, trace};

/// Radial blur around the image center.
///
/// Every pixel averages samples taken along the arc it sweeps when rotated
/// by `angle` degrees; pixels close to the center take every sample, pixels
/// far from it skip proportionally.
pub fn rotational_blur<T: Quantum>(
    src: &ImageStore<T>,
    dst: &mut ImageStoreMut<T>,
    angle: f64,
    ctx: &EffectContext,
) -> Result<(), EffectError> {
    src.check_layout()?;
    dst.check_layout(Some(src))?;
    src.size_matches_mut(dst)?;
    if !angle.is_finite() {
        return Err(EffectError::InvalidArguments(format!(
            "rotational angle {angle}"
        )));
    }
    trace!(angle, "rotational blur");

    let center_x = (src.width as f64 - 1.0) / 2.0;
    let center_y = (src.height as f64 - 1.0) / 2.0;
    let blur_radius = center_x.hypot(center_y);
    let radians = angle.to_radians();
    let n = ((4.0 * radians * blur_radius.sqrt() + 2.0).abs() as usize).max(2);
    let theta = radians / (n - 1) as f64;
    let offset = theta * (n - 1) as f64 / 2.0;
    let rotations: Vec<(f64, f64)> = (0..n)
        .map(|i| {
            let a = theta * i as f64 - offset;
            (a.cos(), a.sin())
        })
        .collect();
    debug!(samples = n, "rotational blur samples");

    let view = VirtualView::new(src, ctx.edge_mode, ctx.background);
    let plan = ChannelPlan::new(src.layout, src.mask, T::quantum_scale());
    let cn = plan.cn;
    let width = src.width as usize;
    let height = src.height as usize;
    let dst_stride = dst.row_stride() as usize;
    let progress = ctx.row_progress(ROTATIONAL_BLUR_TAG, height as u64);

    for_each_row(
        dst.data.borrow_mut(),
        dst_stride,
        height,
        ctx.thread_count(src.width, src.height),
        &progress,
        |y, row| {
            let mut out = [0f64; 5];
            let dy = y as f64 - center_y;
            for (x, dst) in row[..width * cn].chunks_exact_mut(cn).enumerate() {
                let dx = x as f64 - center_x;
                let radius = dx.hypot(dy);
                let step = if radius == 0.0 {
                    1
                } else {
                    ((blur_radius / radius) as usize).clamp(1, n - 1)
                };
                let taps = rotations.iter().step_by(step).map(|&(cos, sin)| {
                    let sx = (center_x + dx * cos - dy * sin + 0.5).floor() as isize;
                    let sy = (center_y + dx * sin + dy * cos + 0.5).floor() as isize;
                    (1.0, view.pixel(sx, sy))
                });
                plan.weighted_mean(taps, &mut out);
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
    fn test_zero_angle_is_identity() {
        let data: Vec<u8> = (0..3 * 9 * 7).map(|i| (i * 11 % 256) as u8).collect();
        let image = ImageStore::borrow(&data, 9, 7, ChannelLayout::Rgb);
        let mut dst = ImageStoreMut::default();
        rotational_blur(&image, &mut dst, 0.0, &EffectContext::new()).unwrap();
        assert_eq!(dst.data.borrow(), data.as_slice());
    }

    #[test]
    fn test_center_pixel_is_kept() {
        let data: Vec<u8> = (0..11 * 11).map(|i| (i * 7 % 256) as u8).collect();
        let image = ImageStore::borrow(&data, 11, 11, ChannelLayout::Gray);
        let mut dst = ImageStoreMut::default();
        rotational_blur(&image, &mut dst, 30.0, &EffectContext::new()).unwrap();
        assert_eq!(dst.data.borrow()[5 * 11 + 5], data[5 * 11 + 5]);
    }

    #[test]
    fn test_rings_are_smoothed() {
        // a single bright pixel on a ring spreads along that ring
        let mut data = vec![0u8; 21 * 21];
        data[10 * 21 + 18] = 255;
        let image = ImageStore::borrow(&data, 21, 21, ChannelLayout::Gray);
        let mut dst = ImageStoreMut::default();
        rotational_blur(&image, &mut dst, 20.0, &EffectContext::new()).unwrap();
        let out = dst.data.borrow();
        assert!(out[10 * 21 + 18] < 255);
        assert!(out[9 * 21 + 18] > 0 || out[11 * 21 + 18] > 0);
        assert_eq!(out[10 * 21 + 2], 0);
    }
}
