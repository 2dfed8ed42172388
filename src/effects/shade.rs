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
use crate::image_store::pixel_intensity;
use crate::progress::SHADE_TAG;
use crate::quantum::{Quantum, MAGICK_EPSILON};
use crate::row_executor::for_each_row;
use crate::util::try_vec;
use crate::{EffectError, ImageStore, ImageStoreMut, PixelChannel};
use tracing::trace;

/// Lights the intensity surface of the image from a distant source.
///
/// # Arguments
///
/// * `gray`: Writes the shading itself into every colour channel instead of
///   modulating the source colour with it.
/// * `azimuth`: Direction of the light in degrees, measured from the x axis.
/// * `elevation`: Height of the light above the surface in degrees.
pub fn shade<T: Quantum>(
    src: &ImageStore<T>,
    dst: &mut ImageStoreMut<T>,
    gray: bool,
    azimuth: f64,
    elevation: f64,
    ctx: &EffectContext,
) -> Result<(), EffectError> {
    src.check_layout()?;
    dst.check_layout(Some(src))?;
    src.size_matches_mut(dst)?;
    if !azimuth.is_finite() || !elevation.is_finite() {
        return Err(EffectError::InvalidArguments(format!(
            "shade {azimuth}x{elevation}"
        )));
    }
    trace!(gray, azimuth, elevation, "shade");

    let range = T::QUANTUM_RANGE;
    let (azimuth, elevation) = (azimuth.to_radians(), elevation.to_radians());
    let light = [
        range * azimuth.cos() * elevation.cos(),
        range * azimuth.sin() * elevation.cos(),
        range * elevation.sin(),
    ];

    let (arena_source, arena) =
        make_arena(src, ArenaPads::constant(1), ctx.edge_mode, ctx.background)?;
    let cn = arena.components;
    let mut intensities = try_vec(arena.width * arena.height, 0f64, "intensity plane")?;
    for (dst, px) in intensities.iter_mut().zip(arena_source.chunks_exact(cn)) {
        *dst = pixel_intensity(src.layout, px);
    }

    let layout = src.layout;
    let update: Vec<bool> = src
        .active_channels()
        .iter()
        .enumerate()
        .map(|(c, &active)| active && layout.channel(c) != PixelChannel::Alpha)
        .collect();
    let width = src.width as usize;
    let height = src.height as usize;
    let src_stride = src.row_stride() as usize;
    let src_data = src.data.as_ref();
    let aw = arena.width;
    let progress = ctx.row_progress(SHADE_TAG, height as u64);

    let dst_stride = dst.row_stride() as usize;
    for_each_row(
        dst.data.borrow_mut(),
        dst_stride,
        height,
        ctx.thread_count(src.width, src.height),
        &progress,
        |y, row| {
            let src_row = &src_data[y * src_stride..y * src_stride + width * cn];
            let pre = &intensities[y * aw..(y + 1) * aw];
            let center = &intensities[(y + 1) * aw..(y + 2) * aw];
            let post = &intensities[(y + 2) * aw..(y + 3) * aw];
            for (x, (dst, src_px)) in row[..width * cn]
                .chunks_exact_mut(cn)
                .zip(src_row.chunks_exact(cn))
                .enumerate()
            {
                let normal_x = pre[x] + center[x] + post[x] - pre[x + 2] - center[x + 2] - post[x + 2];
                let normal_y = post[x] + post[x + 1] + post[x + 2] - pre[x] - pre[x + 1] - pre[x + 2];
                let normal_z = 2.0 * range;
                let shade = if normal_x.abs() <= MAGICK_EPSILON && normal_y.abs() <= MAGICK_EPSILON {
                    light[2]
                } else {
                    let distance = normal_x * light[0] + normal_y * light[1] + normal_z * light[2];
                    let normal_distance =
                        normal_x * normal_x + normal_y * normal_y + normal_z * normal_z;
                    if distance > MAGICK_EPSILON && normal_distance > MAGICK_EPSILON * MAGICK_EPSILON {
                        distance / normal_distance.sqrt()
                    } else {
                        0.0
                    }
                };
                for (c, (dst, &src)) in dst.iter_mut().zip(src_px.iter()).enumerate() {
                    *dst = if !update[c] {
                        src
                    } else if gray {
                        T::clamp_from(shade)
                    } else {
                        T::clamp_from(T::quantum_scale() * shade * src.to_f64())
                    };
                }
            }
        },
    )
}
