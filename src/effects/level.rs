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
use crate::progress::LEVEL_TAG;
use crate::quantum::{perceptible_reciprocal, Quantum};
use crate::row_executor::for_each_row;
use crate::{EffectError, ImageStoreMut, PixelChannel};
use tracing::trace;

/// Linear stretch of every active colour channel, in place.
///
/// `black` and `white` are percentages of the channel range; values are
/// mapped with `range·(v-black)/(white-black)` and clamped.
pub fn level<T: Quantum>(
    image: &mut ImageStoreMut<T>,
    black_percent: f64,
    white_percent: f64,
    ctx: &EffectContext,
) -> Result<(), EffectError> {
    image.check_layout(None)?;
    if !black_percent.is_finite() || !white_percent.is_finite() {
        return Err(EffectError::InvalidArguments(format!(
            "level {black_percent}%,{white_percent}%"
        )));
    }
    trace!(black_percent, white_percent, "level");
    let range = T::QUANTUM_RANGE;
    let black = black_percent * range / 100.0;
    let white = white_percent * range / 100.0;
    let scale = perceptible_reciprocal(white - black);

    let layout = image.layout;
    let update: Vec<bool> = image
        .active_channels()
        .iter()
        .enumerate()
        .map(|(c, &active)| active && layout.channel(c) != PixelChannel::Alpha)
        .collect();
    let cn = layout.channels();
    let width = image.width as usize;
    let height = image.height as usize;
    let stride = image.row_stride() as usize;
    let thread_count = ctx.thread_count(image.width, image.height);
    let progress = ctx.row_progress(LEVEL_TAG, height as u64);

    for_each_row(
        image.data.borrow_mut(),
        stride,
        height,
        thread_count,
        &progress,
        |_, row| {
            for px in row[..width * cn].chunks_exact_mut(cn) {
                for (v, &active) in px.iter_mut().zip(update.iter()) {
                    if active {
                        *v = T::clamp_from(range * (v.to_f64() - black) * scale);
                    }
                }
            }
        },
    )
}
