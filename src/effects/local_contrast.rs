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
use crate::image_store::pixel_intensity;
use crate::progress::LOCAL_CONTRAST_TAG;
use crate::quantum::{perceptible_reciprocal, Quantum};
use crate::row_executor::for_each_row;
use crate::util::try_vec;
use crate::{EffectError, ImageStore, ImageStoreMut, PixelChannel};
use tracing::{debug, trace};

/// Boosts large scale light and dark transitions.
///
/// Works like an unsharp mask on intensity with a much wider triangle blur.
///
/// # Arguments
///
/// * `radius`: Blur reach in percent, 100 reaching a fifth of the larger
///   image dimension.
/// * `strength`: Percentage of the difference from the blurred intensity
///   added back.
pub fn local_contrast<T: Quantum>(
    src: &ImageStore<T>,
    dst: &mut ImageStoreMut<T>,
    radius: f64,
    strength: f64,
    ctx: &EffectContext,
) -> Result<(), EffectError> {
    src.check_layout()?;
    dst.check_layout(Some(src))?;
    src.size_matches_mut(dst)?;
    if !radius.is_finite() || !strength.is_finite() {
        return Err(EffectError::InvalidArguments(format!(
            "local contrast {radius}x{strength}"
        )));
    }
    trace!(radius, strength, "local contrast");

    let layout = src.layout;
    let cn = layout.channels();
    let width = src.width as usize;
    let height = src.height as usize;
    let src_stride = src.row_stride() as usize;
    let src_data = src.data.as_ref();
    let reach = (width.max(height) as f64 * 0.002 * radius.abs()) as usize;
    debug!(reach, "local contrast reach");

    let mut intensities = try_vec(width * height, 0f64, "intensity plane")?;
    for (plane_row, src_row) in intensities
        .chunks_exact_mut(width)
        .zip(src_data.chunks(src_stride))
    {
        for (v, px) in plane_row.iter_mut().zip(src_row[..width * cn].chunks_exact(cn)) {
            *v = pixel_intensity(layout, px);
        }
    }
    let background: Vec<f64> = (0..cn).map(|c| ctx.background[c]).collect();
    let outside = layout.intensity(&background);

    // triangle weights summing to (reach + 1)²
    let weights: Vec<f64> = (0..=2 * reach)
        .map(|k| (reach + 1 - k.abs_diff(reach)) as f64)
        .collect();
    let total_weight = ((reach + 1) * (reach + 1)) as f64;
    let edge_mode = ctx.edge_mode;
    let thread_count = ctx.thread_count(src.width, src.height);

    let mut vertical = try_vec(width * height, 0f64, "vertical pass")?;
    let vertical_progress = ctx.row_progress(LOCAL_CONTRAST_TAG, height as u64);
    for_each_row(
        &mut vertical,
        width,
        height,
        thread_count,
        &vertical_progress,
        |y, row| {
            for (k, &weight) in weights.iter().enumerate() {
                match edge_mode.resolve(y as isize + k as isize - reach as isize, height) {
                    Some(yy) => {
                        let source = &intensities[yy * width..(yy + 1) * width];
                        for (v, &s) in row.iter_mut().zip(source.iter()) {
                            *v += weight * s;
                        }
                    }
                    None => row.iter_mut().for_each(|v| *v += weight * outside),
                }
            }
        },
    )?;

    let update: Vec<bool> = src
        .active_channels()
        .iter()
        .enumerate()
        .map(|(c, &active)| {
            active
                && matches!(
                    layout.channel(c),
                    PixelChannel::Red | PixelChannel::Green | PixelChannel::Blue
                )
        })
        .collect();
    let gain = strength / 100.0;
    let dst_stride = dst.row_stride() as usize;
    let progress = ctx.row_progress(LOCAL_CONTRAST_TAG, height as u64);

    for_each_row(
        dst.data.borrow_mut(),
        dst_stride,
        height,
        thread_count,
        &progress,
        |y, row| {
            let src_row = &src_data[y * src_stride..y * src_stride + width * cn];
            let column_sums = &vertical[y * width..(y + 1) * width];
            for (x, (dst, src_px)) in row[..width * cn]
                .chunks_exact_mut(cn)
                .zip(src_row.chunks_exact(cn))
                .enumerate()
            {
                let mut sum = 0.0;
                for (k, &weight) in weights.iter().enumerate() {
                    sum += weight
                        * match edge_mode.resolve(x as isize + k as isize - reach as isize, width) {
                            Some(xx) => column_sums[xx],
                            None => outside * total_weight,
                        };
                }
                let blurred = sum / (total_weight * total_weight);
                let value = intensities[y * width + x];
                let mult = (value + gain * (value - blurred)) * perceptible_reciprocal(value);
                for (c, (d, &s)) in dst.iter_mut().zip(src_px.iter()).enumerate() {
                    *d = if update[c] {
                        T::clamp_from(s.to_f64() * mult)
                    } else {
                        s
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

    fn step(width: usize, height: usize) -> Vec<u8> {
        (0..width * height)
            .map(|i| if i % width < width / 2 { 80 } else { 160 })
            .collect()
    }

    #[test]
    fn test_flat_image_is_unchanged() {
        let data = vec![100u8; 16 * 16];
        let image = ImageStore::borrow(&data, 16, 16, ChannelLayout::Gray);
        let mut dst = ImageStoreMut::default();
        local_contrast(&image, &mut dst, 100.0, 80.0, &EffectContext::new()).unwrap();
        assert_eq!(dst.data.borrow(), data.as_slice());
    }

    #[test]
    fn test_step_gains_contrast_near_edge_only() {
        let data = step(64, 4);
        let image = ImageStore::borrow(&data, 64, 4, ChannelLayout::Gray);
        let mut dst = ImageStoreMut::default();
        // reach 64·0.002·100 = 12
        local_contrast(&image, &mut dst, 100.0, 50.0, &EffectContext::new()).unwrap();
        let out = dst.data.borrow();
        let row = &out[64..128];
        assert!(row[31] < 80, "dark side {}", row[31]);
        assert!(row[32] > 160, "bright side {}", row[32]);
        assert_eq!(row[0], 80);
        assert_eq!(row[63], 160);
    }

    #[test]
    fn test_zero_radius_is_copy() {
        let data = step(8, 8);
        let image = ImageStore::borrow(&data, 8, 8, ChannelLayout::Gray);
        let mut dst = ImageStoreMut::default();
        local_contrast(&image, &mut dst, 0.0, 100.0, &EffectContext::new()).unwrap();
        assert_eq!(dst.data.borrow(), data.as_slice());
    }

    #[test]
    fn test_alpha_is_kept() {
        let data: Vec<u8> = (0..32)
            .flat_map(|x| {
                let v = if x < 16 { 60 } else { 180 };
                [v, v, v, 33]
            })
            .collect();
        let image = ImageStore::borrow(&data, 32, 1, ChannelLayout::Rgba);
        let mut dst = ImageStoreMut::default();
        local_contrast(&image, &mut dst, 100.0, 100.0, &EffectContext::new()).unwrap();
        let out = dst.data.borrow();
        assert!(out.chunks_exact(4).all(|px| px[3] == 33));
        assert!(out[15 * 4] < 60);
    }
}
