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

mod bounding_box;
mod convex_hull;
mod minimum_bounding_box;

use crate::quantum::Quantum;
use crate::{EffectError, ImageStore};
use serde::{Deserialize, Serialize};

pub use bounding_box::image_bounding_box;
pub use convex_hull::{convex_hull, monotone_chain};
pub use minimum_bounding_box::{calipers, minimum_bounding_box, MinimumBoundingBox};

#[derive(Debug, Copy, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct PointInfo {
    pub x: f64,
    pub y: f64,
}

impl PointInfo {
    #[inline]
    pub fn new(x: f64, y: f64) -> Self {
        PointInfo { x, y }
    }
}

/// Axis aligned region of an image, in pixels.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct RectangleInfo {
    pub x: usize,
    pub y: usize,
    pub width: usize,
    pub height: usize,
}

impl RectangleInfo {
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }
}

/// Pixel colour widened to `f64`, unused slots are zero.
pub(crate) type Color = [f64; 5];

#[inline]
pub(crate) fn color_at<T: Quantum>(image: &ImageStore<T>, x: usize, y: usize) -> Color {
    let mut color = [0f64; 5];
    for (dst, src) in color.iter_mut().zip(image.pixel(x, y).iter()) {
        *dst = src.to_f64();
    }
    color
}

/// Fuzz tolerant colour comparison: colours are similar when their euclidean
/// distance over the active channels is at most `fuzz`.
#[inline]
pub(crate) fn is_similar(a: &Color, b: &Color, active: &[bool], fuzz: f64) -> bool {
    let mut distance = 0f64;
    for (c, &active) in active.iter().enumerate() {
        if active {
            let delta = a[c] - b[c];
            distance += delta * delta;
        }
    }
    distance <= fuzz * fuzz
}

/// Parses a `"v0,v1,..."` colour artifact in channel units. A `%` suffix on
/// a value scales it by `range/100`. Missing colour values repeat the last
/// one, a missing alpha is opaque.
pub(crate) fn parse_color<T: Quantum>(
    image: &ImageStore<T>,
    key: &str,
    value: &str,
) -> Result<Color, EffectError> {
    let values = value
        .split(|c: char| c == ',' || c.is_whitespace())
        .filter(|x| !x.is_empty())
        .map(|x| {
            let trimmed = x.trim_end_matches('%');
            let v = trimmed
                .parse::<f64>()
                .map_err(|_| EffectError::InvalidArguments(format!("{key}={value}")))?;
            Ok(if trimmed.len() != x.len() {
                v * T::QUANTUM_RANGE / 100.0
            } else {
                v
            })
        })
        .collect::<Result<Vec<f64>, EffectError>>()?;
    let last = *values
        .last()
        .ok_or_else(|| EffectError::InvalidArguments(format!("{key} is empty")))?;
    let alpha = image.layout.alpha_index();
    let mut color = [0f64; 5];
    for (c, dst) in color.iter_mut().enumerate().take(image.layout.channels()) {
        *dst = match values.get(c) {
            Some(&v) => v,
            None if Some(c) == alpha => T::QUANTUM_RANGE,
            None => last,
        };
    }
    Ok(color)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ChannelLayout;

    #[test]
    fn test_similarity_respects_fuzz() {
        let a = [10.0, 20.0, 30.0, 0.0, 0.0];
        let b = [13.0, 24.0, 30.0, 0.0, 0.0];
        let active = [true, true, true];
        assert!(is_similar(&a, &b, &active, 5.0));
        assert!(!is_similar(&a, &b, &active, 4.9));
        assert!(is_similar(&a, &b, &[false, false, true], 0.0));
    }

    #[test]
    fn test_parse_color() {
        let data = vec![0u8; 4];
        let image = ImageStore::borrow(&data, 1, 1, ChannelLayout::Rgba);
        let color = parse_color(&image, "background", "10,100%").unwrap();
        assert_eq!(color, [10.0, 255.0, 255.0, 255.0, 0.0]);
        assert!(parse_color(&image, "background", "white").is_err());
    }
}
