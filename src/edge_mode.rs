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
use std::ops::Index;

#[derive(Debug, Copy, Clone, Ord, PartialOrd, Eq, PartialEq, Default, Hash, Serialize, Deserialize)]
/// Declares how reads outside of the image are resolved
pub enum EdgeMode {
    /// Edge pixel is replicated across the filter
    #[default]
    Clamp = 0,
    /// Image is tiled, `defgh|abcdefgh|abcde`
    Wrap = 1,
    /// Image is replicated with rule `fedcba|abcdefgh|hgfedcb`
    Reflect = 2,
    /// Image is replicated with rule `gfedcb|abcdefgh|gfedcba`
    Reflect101 = 3,
    /// Out of bounds reads return the background [Scalar]
    Constant = 4,
}

impl TryFrom<usize> for EdgeMode {
    type Error = crate::EffectError;

    fn try_from(value: usize) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(EdgeMode::Clamp),
            1 => Ok(EdgeMode::Wrap),
            2 => Ok(EdgeMode::Reflect),
            3 => Ok(EdgeMode::Reflect101),
            4 => Ok(EdgeMode::Constant),
            _ => Err(crate::EffectError::InvalidArguments(format!(
                "Unknown edge mode for value: {value}"
            ))),
        }
    }
}

#[inline]
pub(crate) fn reflect_index(i: isize, n: isize) -> usize {
    let period = 2 * n;
    let r = i.rem_euclid(period);
    if r < n {
        r as usize
    } else {
        (period - r - 1) as usize
    }
}

#[inline]
pub(crate) fn reflect_index_101(i: isize, n: isize) -> usize {
    let n_r = n - 1;
    if n_r == 0 {
        return 0;
    }
    let period = 2 * n_r;
    let r = i.rem_euclid(period);
    if r <= n_r {
        r as usize
    } else {
        (period - r) as usize
    }
}

impl EdgeMode {
    /// Resolves a coordinate against `[0, n)`.
    /// Returns `None` when the read must take the background constant.
    #[inline]
    pub fn resolve(self, value: isize, n: usize) -> Option<usize> {
        let n_i = n as isize;
        if value >= 0 && value < n_i {
            return Some(value as usize);
        }
        match self {
            EdgeMode::Clamp => Some(value.clamp(0, n_i - 1) as usize),
            EdgeMode::Wrap => Some(value.rem_euclid(n_i) as usize),
            EdgeMode::Reflect => Some(reflect_index(value, n_i)),
            EdgeMode::Reflect101 => Some(reflect_index_101(value, n_i)),
            EdgeMode::Constant => None,
        }
    }
}

/// Background colour used by [EdgeMode::Constant], one value per interleaved
/// position, in the channel range of the image.
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialOrd, PartialEq, Serialize, Deserialize)]
pub struct Scalar {
    pub v0: f64,
    pub v1: f64,
    pub v2: f64,
    pub v3: f64,
    pub v4: f64,
}

impl Scalar {
    pub fn new(v0: f64, v1: f64, v2: f64, v3: f64, v4: f64) -> Self {
        Self { v0, v1, v2, v3, v4 }
    }

    pub fn dup(v: f64) -> Self {
        Scalar::new(v, v, v, v, v)
    }

    /// Builds a scalar from up to five comma separated values.
    pub(crate) fn from_slice(values: &[f64]) -> Self {
        let mut scalar = Scalar::default();
        for (i, &v) in values.iter().take(5).enumerate() {
            match i {
                0 => scalar.v0 = v,
                1 => scalar.v1 = v,
                2 => scalar.v2 = v,
                3 => scalar.v3 = v,
                _ => scalar.v4 = v,
            }
        }
        scalar
    }
}

impl Default for Scalar {
    fn default() -> Self {
        Self::dup(0.0)
    }
}

/// Positions past the fifth saturate to the last component, so a six or more
/// channel layout reads `v4` for its trailing channels.
impl Index<usize> for Scalar {
    type Output = f64;
    fn index(&self, index: usize) -> &Self::Output {
        debug_assert!(index < 5, "Scalar index out of range: {}", index);
        match index {
            0 => &self.v0,
            1 => &self.v1,
            2 => &self.v2,
            3 => &self.v3,
            _ => &self.v4,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_modes() {
        // abcde
        let n = 5usize;
        assert_eq!(EdgeMode::Clamp.resolve(-2, n), Some(0));
        assert_eq!(EdgeMode::Clamp.resolve(7, n), Some(4));
        assert_eq!(EdgeMode::Wrap.resolve(-1, n), Some(4));
        assert_eq!(EdgeMode::Wrap.resolve(6, n), Some(1));
        assert_eq!(EdgeMode::Reflect.resolve(-1, n), Some(0));
        assert_eq!(EdgeMode::Reflect.resolve(-2, n), Some(1));
        assert_eq!(EdgeMode::Reflect.resolve(5, n), Some(4));
        assert_eq!(EdgeMode::Reflect101.resolve(-1, n), Some(1));
        assert_eq!(EdgeMode::Reflect101.resolve(5, n), Some(3));
        assert_eq!(EdgeMode::Reflect101.resolve(-3, 1), Some(0));
        assert_eq!(EdgeMode::Constant.resolve(-1, n), None);
        assert_eq!(EdgeMode::Constant.resolve(2, n), Some(2));
    }

    #[test]
    fn test_scalar_from_slice() {
        let s = Scalar::from_slice(&[1., 2., 3.]);
        assert_eq!(s[0], 1.);
        assert_eq!(s[2], 3.);
        assert_eq!(s[4], 0.);
    }

    #[test]
    fn test_scalar_index_covers_every_component() {
        let s = Scalar::new(1., 2., 3., 4., 5.);
        let read: Vec<f64> = (0..5).map(|i| s[i]).collect();
        assert_eq!(read, vec![1., 2., 3., 4., 5.]);
    }

    #[test]
    #[cfg(not(debug_assertions))]
    fn test_scalar_index_saturates_past_last_component() {
        let s = Scalar::new(1., 2., 3., 4., 5.);
        assert_eq!(s[5], 5.);
        assert_eq!(s[usize::MAX], 5.);
    }

    #[test]
    #[cfg(debug_assertions)]
    #[should_panic]
    fn test_scalar_index_past_last_component_asserts_in_debug() {
        let s = Scalar::new(1., 2., 3., 4., 5.);
        let _ = s[5];
    }
}
