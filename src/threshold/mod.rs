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

mod adaptive_threshold;
mod bilevel;
mod channel_thresholds;
mod clamp;
mod ordered_posterize;
mod random_threshold;
mod threshold_map;

use crate::{ChannelLayout, ChannelMask, PixelChannel};

pub use adaptive_threshold::adaptive_threshold;
pub use bilevel::bilevel_threshold;
pub use channel_thresholds::{black_threshold, white_threshold, ChannelThresholds};
pub use clamp::{clamp_image, perceptible};
pub use ordered_posterize::ordered_posterize;
pub use random_threshold::{random_threshold, ThresholdRange};
pub use threshold_map::{ThresholdMap, ThresholdMapRegistry};

/// Channels a threshold writes.
///
/// Alpha is left alone under the default mask and thresholded only when a
/// custom mask names it.
pub(crate) fn threshold_targets(layout: ChannelLayout, mask: ChannelMask) -> Vec<bool> {
    (0..layout.channels())
        .map(|i| {
            let channel = layout.channel(i);
            mask.contains(channel) && (channel != PixelChannel::Alpha || !mask.is_default())
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_alpha_needs_explicit_mask() {
        assert_eq!(
            threshold_targets(ChannelLayout::Rgba, ChannelMask::ALL),
            vec![true, true, true, false]
        );
        let mask = ChannelMask::from_channels(&[PixelChannel::Red, PixelChannel::Alpha]);
        assert_eq!(
            threshold_targets(ChannelLayout::Rgba, mask),
            vec![true, false, false, true]
        );
    }
}
