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

use serde::{Deserialize, Serialize};

#[repr(C)]
#[derive(Debug, Clone, Copy, Ord, PartialOrd, Eq, PartialEq, Hash, Serialize, Deserialize)]
/// Semantic meaning of an interleaved sample.
/// Gray data is stored in the `Red` slot.
pub enum PixelChannel {
    Red = 0,
    Green = 1,
    Blue = 2,
    Black = 3,
    Alpha = 4,
}

impl PixelChannel {
    /// Position of the channel in the 5-slot cycle used by per-channel
    /// threshold lists.
    #[inline]
    pub fn cycle_index(self) -> usize {
        self as usize
    }

    #[inline]
    fn bit(self) -> u8 {
        1u8 << (self as u8)
    }
}

#[repr(C)]
#[derive(Debug, Clone, Copy, Ord, PartialOrd, Eq, PartialEq, Hash, Serialize, Deserialize)]
/// Declares interleaved pixel layout, alpha is always the last sample.
pub enum ChannelLayout {
    /// Single gray plane
    Gray,
    /// Gray with alpha
    GrayAlpha,
    /// RGB
    Rgb,
    /// RGBA
    Rgba,
    /// CMYK, black is the fourth sample
    Cmyk,
    /// CMYK with alpha
    Cmyka,
}

impl ChannelLayout {
    #[inline]
    pub fn channels(&self) -> usize {
        match self {
            ChannelLayout::Gray => 1,
            ChannelLayout::GrayAlpha => 2,
            ChannelLayout::Rgb => 3,
            ChannelLayout::Rgba => 4,
            ChannelLayout::Cmyk => 4,
            ChannelLayout::Cmyka => 5,
        }
    }

    #[inline]
    pub fn has_alpha(&self) -> bool {
        matches!(
            self,
            ChannelLayout::GrayAlpha | ChannelLayout::Rgba | ChannelLayout::Cmyka
        )
    }

    #[inline]
    pub fn alpha_index(&self) -> Option<usize> {
        if self.has_alpha() {
            Some(self.channels() - 1)
        } else {
            None
        }
    }

    #[inline]
    pub fn is_gray(&self) -> bool {
        matches!(self, ChannelLayout::Gray | ChannelLayout::GrayAlpha)
    }

    #[inline]
    pub fn is_cmyk(&self) -> bool {
        matches!(self, ChannelLayout::Cmyk | ChannelLayout::Cmyka)
    }

    /// Semantic channel stored at interleaved position `index`.
    pub fn channel(&self, index: usize) -> PixelChannel {
        match (self, index) {
            (ChannelLayout::Gray, _) => PixelChannel::Red,
            (ChannelLayout::GrayAlpha, 0) => PixelChannel::Red,
            (ChannelLayout::GrayAlpha, _) => PixelChannel::Alpha,
            (ChannelLayout::Rgb | ChannelLayout::Rgba, 0) => PixelChannel::Red,
            (ChannelLayout::Rgb | ChannelLayout::Rgba, 1) => PixelChannel::Green,
            (ChannelLayout::Rgb, _) => PixelChannel::Blue,
            (ChannelLayout::Rgba, 2) => PixelChannel::Blue,
            (ChannelLayout::Rgba, _) => PixelChannel::Alpha,
            (ChannelLayout::Cmyk | ChannelLayout::Cmyka, 0) => PixelChannel::Red,
            (ChannelLayout::Cmyk | ChannelLayout::Cmyka, 1) => PixelChannel::Green,
            (ChannelLayout::Cmyk | ChannelLayout::Cmyka, 2) => PixelChannel::Blue,
            (ChannelLayout::Cmyk, _) => PixelChannel::Black,
            (ChannelLayout::Cmyka, 3) => PixelChannel::Black,
            (ChannelLayout::Cmyka, _) => PixelChannel::Alpha,
        }
    }

    /// Interleaved position of `channel`, if the layout carries it.
    pub fn position(&self, channel: PixelChannel) -> Option<usize> {
        (0..self.channels()).find(|&i| self.channel(i) == channel)
    }

    /// Intensity of an interleaved pixel, Rec.709 luma for colour layouts.
    #[inline]
    pub fn intensity(&self, pixel: &[f64]) -> f64 {
        if self.is_gray() {
            return pixel[0];
        }
        0.212656 * pixel[0] + 0.715158 * pixel[1] + 0.072186 * pixel[2]
    }
}

impl TryFrom<usize> for ChannelLayout {
    type Error = crate::EffectError;

    fn try_from(value: usize) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(ChannelLayout::Gray),
            2 => Ok(ChannelLayout::GrayAlpha),
            3 => Ok(ChannelLayout::Rgb),
            4 => Ok(ChannelLayout::Rgba),
            5 => Ok(ChannelLayout::Cmyka),
            _ => Err(crate::EffectError::InvalidArguments(format!(
                "no layout carries {value} channels"
            ))),
        }
    }
}

#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash, Serialize, Deserialize)]
/// Set of channels an operation updates, the rest is copied through.
pub struct ChannelMask(u8);

impl ChannelMask {
    pub const ALL: ChannelMask = ChannelMask(0b1_1111);
    pub const COLORS: ChannelMask = ChannelMask(0b0_1111);
    pub const NONE: ChannelMask = ChannelMask(0);

    pub fn from_channels(channels: &[PixelChannel]) -> ChannelMask {
        ChannelMask(channels.iter().fold(0u8, |acc, c| acc | c.bit()))
    }

    #[inline]
    pub fn contains(&self, channel: PixelChannel) -> bool {
        self.0 & channel.bit() != 0
    }

    #[inline]
    pub fn with(self, channel: PixelChannel) -> ChannelMask {
        ChannelMask(self.0 | channel.bit())
    }

    #[inline]
    pub fn without(self, channel: PixelChannel) -> ChannelMask {
        ChannelMask(self.0 & !channel.bit())
    }

    #[inline]
    pub fn is_default(&self) -> bool {
        *self == ChannelMask::ALL
    }
}

impl Default for ChannelMask {
    fn default() -> Self {
        ChannelMask::ALL
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layout_channel_positions() {
        assert_eq!(ChannelLayout::Rgba.channel(3), PixelChannel::Alpha);
        assert_eq!(ChannelLayout::Cmyk.channel(3), PixelChannel::Black);
        assert_eq!(ChannelLayout::Cmyka.channel(4), PixelChannel::Alpha);
        assert_eq!(ChannelLayout::GrayAlpha.alpha_index(), Some(1));
        assert_eq!(ChannelLayout::Rgb.alpha_index(), None);
        assert_eq!(ChannelLayout::Rgb.position(PixelChannel::Black), None);
        assert_eq!(ChannelLayout::Cmyka.position(PixelChannel::Black), Some(3));
    }

    #[test]
    fn test_mask() {
        let mask = ChannelMask::ALL.without(PixelChannel::Alpha);
        assert!(!mask.contains(PixelChannel::Alpha));
        assert!(mask.contains(PixelChannel::Black));
        assert_eq!(mask, ChannelMask::COLORS);
        let only_red = ChannelMask::from_channels(&[PixelChannel::Red]);
        assert!(only_red.contains(PixelChannel::Red));
        assert!(!only_red.contains(PixelChannel::Green));
    }

    #[test]
    fn test_intensity() {
        let gray = ChannelLayout::Rgb.intensity(&[100., 100., 100.]);
        assert!((gray - 100.).abs() < 1e-9);
        assert_eq!(ChannelLayout::Gray.intensity(&[42.]), 42.);
    }
}
