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
use crate::{ChannelLayout, EffectError, ImageStoreMut, PixelChannel};
use std::str::FromStr;
use tracing::trace;

/// Per channel thresholds, written like `"r[,g[,b[,a[,k]]]][%]"`.
///
/// The fourth value is black and the fifth alpha on CMYK layouts.
/// Missing colour values repeat the first one and a missing alpha reads as
/// `100`. With `percent` every value, the alpha default included, is a
/// percentage of the range.
#[derive(Debug, Clone, PartialEq)]
pub struct ChannelThresholds {
    pub values: Vec<f64>,
    pub percent: bool,
}

impl ChannelThresholds {
    pub fn new(values: Vec<f64>) -> Self {
        ChannelThresholds {
            values,
            percent: false,
        }
    }

    pub fn uniform(value: f64) -> Self {
        ChannelThresholds::new(vec![value])
    }

    /// Thresholds indexed by [PixelChannel::cycle_index].
    pub fn resolve(&self, layout: ChannelLayout, range: f64) -> Result<[f64; 5], EffectError> {
        let first = *self.values.first().ok_or_else(|| {
            EffectError::InvalidArguments("at least one threshold is required".to_string())
        })?;
        let value = |i: usize| self.values.get(i).copied();
        let scale = if self.percent { range / 100.0 } else { 1.0 };
        let (black, alpha) = if layout.is_cmyk() {
            (value(3), value(4))
        } else {
            (value(4), value(3))
        };
        let mut slots = [0f64; 5];
        slots[PixelChannel::Red.cycle_index()] = first * scale;
        slots[PixelChannel::Green.cycle_index()] = value(1).unwrap_or(first) * scale;
        slots[PixelChannel::Blue.cycle_index()] = value(2).unwrap_or(first) * scale;
        slots[PixelChannel::Black.cycle_index()] = black.unwrap_or(first) * scale;
        slots[PixelChannel::Alpha.cycle_index()] = alpha.unwrap_or(100.0) * scale;
        Ok(slots)
    }
}

impl FromStr for ChannelThresholds {
    type Err = EffectError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let percent = trimmed.ends_with('%');
        let body = trimmed.trim_end_matches('%');
        let values = body
            .split(|c: char| c == ',' || c == '/' || c.is_whitespace())
            .filter(|x| !x.is_empty())
            .map(|x| {
                x.parse::<f64>()
                    .map_err(|_| EffectError::InvalidGeometry(s.to_string()))
            })
            .collect::<Result<Vec<f64>, _>>()?;
        if values.is_empty() || values.len() > 5 {
            return Err(EffectError::InvalidGeometry(s.to_string()));
        }
        Ok(ChannelThresholds { values, percent })
    }
}

#[derive(Copy, Clone, Debug)]
enum Side {
    Black,
    White,
}

fn threshold_side<T: Quantum>(
    image: &mut ImageStoreMut<T>,
    thresholds: &ChannelThresholds,
    side: Side,
    ctx: &EffectContext,
) -> Result<(), EffectError> {
    image.check_layout(None)?;
    let layout = image.layout;
    let slots = thresholds.resolve(layout, T::QUANTUM_RANGE)?;
    trace!(?side, ?slots, "channel threshold");
    let targets = threshold_targets(layout, image.mask);
    let by_intensity = image.mask.is_default();
    let cn = layout.channels();
    let limits: Vec<f64> = (0..cn)
        .map(|i| slots[layout.channel(i).cycle_index() % 5])
        .collect();
    let width = image.width as usize;
    let height = image.height as usize;
    let stride = image.row_stride() as usize;
    let thread_count = ctx.thread_count(image.width, image.height);
    let progress = ctx.row_progress(THRESHOLD_TAG, height as u64);
    let black = T::clamp_from(0.0);
    let white = T::clamp_from(T::QUANTUM_RANGE);

    for_each_row(
        image.data.borrow_mut(),
        stride,
        height,
        thread_count,
        &progress,
        |_, row| {
            for px in row[..width * cn].chunks_exact_mut(cn) {
                let intensity = pixel_intensity(layout, px);
                for (c, v) in px.iter_mut().enumerate() {
                    if !targets[c] {
                        continue;
                    }
                    let value = if by_intensity { intensity } else { v.to_f64() };
                    match side {
                        Side::Black if value <= limits[c] => *v = black,
                        Side::White if value > limits[c] => *v = white,
                        _ => {}
                    }
                }
            }
        },
    )
}

/// Forces channels at or below their threshold to black, leaving the rest.
pub fn black_threshold<T: Quantum>(
    image: &mut ImageStoreMut<T>,
    thresholds: &ChannelThresholds,
    ctx: &EffectContext,
) -> Result<(), EffectError> {
    threshold_side(image, thresholds, Side::Black, ctx)
}

/// Forces channels above their threshold to white, leaving the rest.
pub fn white_threshold<T: Quantum>(
    image: &mut ImageStoreMut<T>,
    thresholds: &ChannelThresholds,
    ctx: &EffectContext,
) -> Result<(), EffectError> {
    threshold_side(image, thresholds, Side::White, ctx)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ChannelMask;

    #[test]
    fn test_parse_thresholds() {
        let t: ChannelThresholds = "10,20,30%".parse().unwrap();
        assert_eq!(t.values, vec![10.0, 20.0, 30.0]);
        assert!(t.percent);
        assert!("".parse::<ChannelThresholds>().is_err());
        assert!("1,2,3,4,5,6".parse::<ChannelThresholds>().is_err());
        assert!("a,b".parse::<ChannelThresholds>().is_err());
    }

    #[test]
    fn test_missing_values_repeat_first() {
        let t: ChannelThresholds = "50%".parse().unwrap();
        let slots = t.resolve(ChannelLayout::Rgba, 255.0).unwrap();
        assert_eq!(slots, [127.5, 127.5, 127.5, 127.5, 255.0]);
    }

    #[test]
    fn test_missing_alpha_is_literal_without_percent() {
        let t: ChannelThresholds = "50".parse().unwrap();
        let slots = t.resolve(ChannelLayout::Rgba, 65535.0).unwrap();
        assert_eq!(slots[PixelChannel::Red.cycle_index()], 50.0);
        assert_eq!(slots[PixelChannel::Alpha.cycle_index()], 100.0);
        let t: ChannelThresholds = "50%".parse().unwrap();
        let slots = t.resolve(ChannelLayout::Rgba, 65535.0).unwrap();
        assert_eq!(slots[PixelChannel::Alpha.cycle_index()], 65535.0);
    }

    #[test]
    fn test_cmyk_swaps_fourth_and_fifth() {
        let t = ChannelThresholds::new(vec![1.0, 2.0, 3.0, 4.0, 5.0]);
        let rgb = t.resolve(ChannelLayout::Rgba, 255.0).unwrap();
        let cmyk = t.resolve(ChannelLayout::Cmyka, 255.0).unwrap();
        assert_eq!(rgb[PixelChannel::Alpha.cycle_index()], 4.0);
        assert_eq!(rgb[PixelChannel::Black.cycle_index()], 5.0);
        assert_eq!(cmyk[PixelChannel::Black.cycle_index()], 4.0);
        assert_eq!(cmyk[PixelChannel::Alpha.cycle_index()], 5.0);
    }

    #[test]
    fn test_per_channel_black_and_white() {
        let mask = ChannelMask::COLORS;
        let mut data: Vec<u8> = vec![40, 40, 40, 200, 200, 200];
        let mut image = ImageStoreMut::borrow(&mut data, 2, 1, ChannelLayout::Rgb).with_mask(mask);
        let ctx = EffectContext::new();
        black_threshold(&mut image, &"30,50,40".parse().unwrap(), &ctx).unwrap();
        assert_eq!(&image.data.borrow()[..3], &[40, 0, 0]);
        white_threshold(&mut image, &"100,210,199".parse().unwrap(), &ctx).unwrap();
        assert_eq!(&image.data.borrow()[3..], &[255, 200, 255]);
    }

    #[test]
    fn test_default_mask_compares_intensity() {
        let mut data: Vec<u8> = vec![255, 0, 0, 77];
        let mut image = ImageStoreMut::borrow(&mut data, 1, 1, ChannelLayout::Rgba);
        black_threshold(&mut image, &ChannelThresholds::uniform(60.0), &EffectContext::new())
            .unwrap();
        assert_eq!(image.data.borrow(), &[0, 0, 0, 77]);
    }
}
