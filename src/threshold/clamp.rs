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
use crate::progress::{CLAMP_TAG, PERCEPTIBLE_TAG};
use crate::quantum::Quantum;
use crate::row_executor::for_each_row;
use crate::{EffectError, ImageStoreMut};
use tracing::trace;

fn map_active<T: Quantum>(
    image: &mut ImageStoreMut<T>,
    tag: &'static str,
    ctx: &EffectContext,
    op: impl Fn(f64) -> T + Send + Sync,
) -> Result<(), EffectError> {
    image.check_layout(None)?;
    let active = image.active_channels();
    let cn = image.layout.channels();
    let width = image.width as usize;
    let height = image.height as usize;
    let stride = image.row_stride() as usize;
    let thread_count = ctx.thread_count(image.width, image.height);
    let progress = ctx.row_progress(tag, height as u64);
    for_each_row(
        image.data.borrow_mut(),
        stride,
        height,
        thread_count,
        &progress,
        |_, row| {
            for px in row[..width * cn].chunks_exact_mut(cn) {
                for (v, &active) in px.iter_mut().zip(active.iter()) {
                    if active {
                        *v = op(v.to_f64());
                    }
                }
            }
        },
    )
}

/// Clamps every active channel into `[0, range]`.
///
/// Integer quanta are always in range; this matters for floating point
/// images carrying out of gamut values.
pub fn clamp_image<T: Quantum>(
    image: &mut ImageStoreMut<T>,
    ctx: &EffectContext,
) -> Result<(), EffectError> {
    trace!("clamp");
    map_active(image, CLAMP_TAG, ctx, T::clamp_from)
}

/// Moves values closer to zero than `epsilon` out to `±epsilon`, keeping
/// their sign, so they stay safe to divide by.
pub fn perceptible<T: Quantum>(
    image: &mut ImageStoreMut<T>,
    epsilon: f64,
    ctx: &EffectContext,
) -> Result<(), EffectError> {
    if !epsilon.is_finite() {
        return Err(EffectError::InvalidArguments(format!(
            "perceptible epsilon must be finite, but it is {epsilon}"
        )));
    }
    let epsilon = epsilon.abs();
    trace!(epsilon, "perceptible");
    map_active(image, PERCEPTIBLE_TAG, ctx, move |v| {
        let sign = if v < 0.0 { -1.0 } else { 1.0 };
        if sign * v >= epsilon {
            T::from_f64(v)
        } else {
            T::from_f64(sign * epsilon)
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ChannelLayout, ChannelMask, PixelChannel};

    #[test]
    fn test_clamp_float_image() {
        let mut data = vec![-0.5f32, 0.25, 1.5, 2.0];
        let mut image = ImageStoreMut::borrow(&mut data, 2, 1, ChannelLayout::GrayAlpha)
            .with_mask(ChannelMask::from_channels(&[PixelChannel::Red]));
        clamp_image(&mut image, &EffectContext::new()).unwrap();
        assert_eq!(image.data.borrow(), &[0.0, 0.25, 1.0, 2.0]);
    }

    #[test]
    fn test_perceptible_keeps_sign() {
        let mut data = vec![-1e-9f32, 0.0, 1e-9, 0.5];
        let mut image = ImageStoreMut::borrow(&mut data, 4, 1, ChannelLayout::Gray);
        perceptible(&mut image, 1e-4, &EffectContext::new()).unwrap();
        assert_eq!(image.data.borrow(), &[-1e-4f32, 1e-4, 1e-4, 0.5]);
    }

    #[test]
    fn test_perceptible_integer_image() {
        let mut data = vec![0u8, 1, 2, 200];
        let mut image = ImageStoreMut::borrow(&mut data, 4, 1, ChannelLayout::Gray);
        perceptible(&mut image, 2.0, &EffectContext::new()).unwrap();
        assert_eq!(image.data.borrow(), &[2, 2, 2, 200]);
    }
}
