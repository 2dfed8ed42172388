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
use crate::progress::THRESHOLD_TAG;
use crate::quantum::Quantum;
use crate::row_executor::for_each_row;
use crate::threshold::threshold_targets;
use crate::{EffectError, ImageStoreMut};
use tracing::trace;

/// Binarizes the image in place: values at or below `threshold` become 0,
/// the rest the full channel range.
///
/// Under the default channel mask every channel follows the pixel intensity;
/// with a custom mask each selected channel is compared with itself.
/// `threshold` is in channel range units.
pub fn bilevel_threshold<T: Quantum>(
    image: &mut ImageStoreMut<T>,
    threshold: f64,
    ctx: &EffectContext,
) -> Result<(), EffectError> {
    image.check_layout(None)?;
    if threshold.is_nan() {
        return Err(EffectError::InvalidArguments("bilevel threshold is NaN".to_string()));
    }
    trace!(threshold, "bilevel threshold");
    let layout = image.layout;
    let targets = threshold_targets(layout, image.mask);
    let by_intensity = image.mask.is_default();
    let cn = layout.channels();
    let width = image.width as usize;
    let height = image.height as usize;
    let stride = image.row_stride() as usize;
    let thread_count = ctx.thread_count(image.width, image.height);
    let progress = ctx.row_progress(THRESHOLD_TAG, height as u64);
    let white = T::clamp_from(T::QUANTUM_RANGE);
    let black = T::clamp_from(0.0);

    for_each_row(
        image.data.borrow_mut(),
        stride,
        height,
        thread_count,
        &progress,
        |_, row| {
            for px in row[..width * cn].chunks_exact_mut(cn) {
                let intensity = pixel_intensity(layout, px);
                for (v, &target) in px.iter_mut().zip(targets.iter()) {
                    if !target {
                        continue;
                    }
                    let value = if by_intensity { intensity } else { v.to_f64() };
                    *v = if value <= threshold { black } else { white };
                }
            }
        },
    )
}
