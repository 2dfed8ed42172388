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
use crate::progress::ORDERED_POSTERIZE_TAG;
use crate::quantum::Quantum;
use crate::row_executor::for_each_row;
use crate::threshold::threshold_targets;
use crate::threshold::threshold_map::ThresholdMapRegistry;
use crate::{EffectError, ImageStoreMut};
use tracing::{debug, trace};

/// Splits `"name[,levels...]"` into the map name and the per channel levels.
fn parse_map_spec(map_spec: &str) -> Result<(&str, Vec<u32>), EffectError> {
    let mut parts = map_spec
        .split(|c: char| c == ',' || c.is_whitespace())
        .filter(|x| !x.is_empty());
    let name = parts
        .next()
        .ok_or_else(|| EffectError::InvalidArguments("threshold map name is empty".to_string()))?;
    let levels = parts
        .map(|x| {
            x.parse::<u32>()
                .map_err(|_| EffectError::InvalidArguments(format!("posterize level `{x}`")))
        })
        .collect::<Result<Vec<u32>, _>>()?;
    Ok((name, levels))
}

/// Posterizes to a number of levels per channel, dithering between levels
/// with a threshold map.
///
/// `map_spec` is `"name[,levels...]"`. Without levels every channel gets 2.
/// A single level applies to every updated channel; with several the n-th
/// updated channel takes the n-th value, or the first one when the list is
/// shorter. A channel asking for 0 or 1 level is left alone.
pub fn ordered_posterize<T: Quantum>(
    image: &mut ImageStoreMut<T>,
    map_spec: &str,
    registry: &ThresholdMapRegistry,
    ctx: &EffectContext,
) -> Result<(), EffectError> {
    image.check_layout(None)?;
    let (name, requested) = parse_map_spec(map_spec)?;
    let map = registry
        .get(name)
        .ok_or_else(|| EffectError::UnknownThresholdMap(name.to_string()))?;
    trace!(map = map.map.as_str(), ?requested, "ordered posterize");

    let targets = threshold_targets(image.layout, image.mask);
    let first = requested.first().copied().unwrap_or(2);
    let mut n = 0usize;
    // levels minus one, 0 marks a channel left alone
    let levels: Vec<i64> = targets
        .iter()
        .map(|&target| {
            if !target {
                return 0;
            }
            let level = requested.get(n).copied().unwrap_or(first);
            n += 1;
            level.saturating_sub(1) as i64
        })
        .collect();
    debug!(?levels, divisor = map.divisor, "posterize levels");

    let d = map.divisor as i64 - 1;
    let cn = image.layout.channels();
    let width = image.width as usize;
    let height = image.height as usize;
    let stride = image.row_stride() as usize;
    let thread_count = ctx.thread_count(image.width, image.height);
    let progress = ctx.row_progress(ORDERED_POSTERIZE_TAG, height as u64);
    let range = T::QUANTUM_RANGE;
    let scale = T::quantum_scale();

    for_each_row(
        image.data.borrow_mut(),
        stride,
        height,
        thread_count,
        &progress,
        |y, row| {
            for (x, px) in row[..width * cn].chunks_exact_mut(cn).enumerate() {
                let threshold = map.level_at(x, y) as i64;
                for (v, &level_count) in px.iter_mut().zip(levels.iter()) {
                    if level_count == 0 {
                        continue;
                    }
                    let mut t = (scale * v.to_f64() * (level_count * d + 1) as f64).floor() as i64;
                    let level = t / d;
                    t -= level * d;
                    let bump = if t >= threshold { 1 } else { 0 };
                    *v = T::clamp_from((level + bump) as f64 * range / level_count as f64);
                }
            }
        },
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ChannelLayout, ChannelMask, PixelChannel};

    #[test]
    fn test_threshold_map_is_plain_threshold() {
        let data: Vec<u8> = (0..=255).collect();
        let mut output = data.clone();
        let mut image = ImageStoreMut::borrow(&mut output, 16, 16, ChannelLayout::Gray);
        let registry = ThresholdMapRegistry::default();
        ordered_posterize(&mut image, "threshold", &registry, &EffectContext::new()).unwrap();
        for (&out, &src) in image.data.borrow().iter().zip(data.iter()) {
            let expected = if src >= 128 { 255 } else { 0 };
            assert_eq!(out, expected, "source {src}");
        }
    }

    #[test]
    fn test_levels_are_respected() {
        let mut data: Vec<u16> = (0..64 * 64).map(|i| (i * 16) as u16).collect();
        let mut image = ImageStoreMut::borrow(&mut data, 64, 64, ChannelLayout::Gray);
        let registry = ThresholdMapRegistry::default();
        ordered_posterize(&mut image, "o4x4,5", &registry, &EffectContext::new()).unwrap();
        let allowed: Vec<u16> = (0..5).map(|l| (l as f64 * 65535.0 / 4.0).round() as u16).collect();
        for &v in image.data.borrow().iter() {
            assert!(allowed.contains(&v), "unexpected level {v}");
        }
    }

    #[test]
    fn test_checks_dither_alternates() {
        // a mid gray dithers into a checkerboard
        let mut data = vec![128u8; 4 * 4];
        let mut image = ImageStoreMut::borrow(&mut data, 4, 4, ChannelLayout::Gray);
        let registry = ThresholdMapRegistry::default();
        ordered_posterize(&mut image, "2x1", &registry, &EffectContext::new()).unwrap();
        let out = image.data.borrow();
        for y in 0..4 {
            for x in 0..4 {
                let expected = if (x + y) % 2 == 0 { 255 } else { 0 };
                assert_eq!(out[y * 4 + x], expected, "at {x},{y}");
            }
        }
    }

    #[test]
    fn test_per_channel_levels() {
        let mut data: Vec<u8> = vec![200, 200, 200];
        let mut image = ImageStoreMut::borrow(&mut data, 1, 1, ChannelLayout::Rgb)
            .with_mask(ChannelMask::from_channels(&[PixelChannel::Green, PixelChannel::Blue]));
        let registry = ThresholdMapRegistry::default();
        ordered_posterize(&mut image, "threshold,1,3", &registry, &EffectContext::new()).unwrap();
        // red is masked, green asks for a single level, blue for three
        assert_eq!(image.data.borrow(), &[200, 200, 255]);
    }

    #[test]
    fn test_unknown_map_leaves_image() {
        let mut data = vec![77u8; 9];
        let mut image = ImageStoreMut::borrow(&mut data, 3, 3, ChannelLayout::Gray);
        let registry = ThresholdMapRegistry::default();
        let result = ordered_posterize(&mut image, "h6x6o,4", &registry, &EffectContext::new());
        assert!(matches!(result, Err(EffectError::UnknownThresholdMap(ref x)) if x == "h6x6o"));
        assert!(image.data.borrow().iter().all(|&x| x == 77));
    }
}
