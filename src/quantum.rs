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

use half::f16;
use num_traits::AsPrimitive;
use std::fmt::Debug;

/// Values below this are treated as zero by every weighted accumulation.
pub const MAGICK_EPSILON: f64 = 1.0e-12;

/// The 16-bit domain used by order statistics and histogram equalization.
pub const MAX_SHORT: f64 = 65535.0;

/// Storage type of a single channel sample.
///
/// Integer quanta span `[0, MAX]`; floating quanta are normalized to `[0, 1]`.
pub trait Quantum: Copy + Default + Debug + PartialOrd + Send + Sync + 'static {
    /// Largest legal channel value expressed as `f64`.
    const QUANTUM_RANGE: f64;

    fn to_f64(self) -> f64;

    /// Rounds and clamps a working value into the legal channel range.
    fn clamp_from(value: f64) -> Self;

    /// Stores a working value, saturating only where the type must.
    /// Floating quanta keep values outside `[0, 1]`.
    #[inline]
    fn from_f64(value: f64) -> Self {
        Self::clamp_from(value)
    }

    /// Scales into the 16-bit statistic domain.
    fn to_short(self) -> u16;

    /// Scales back from the 16-bit statistic domain.
    fn from_short(value: u16) -> Self;

    #[inline]
    fn quantum_scale() -> f64 {
        1.0 / Self::QUANTUM_RANGE
    }
}

#[inline]
fn clamp_round<T>(value: f64, max: f64) -> T
where
    T: Copy + 'static,
    f64: AsPrimitive<T>,
{
    if value.is_nan() || value <= 0.0 {
        return 0f64.as_();
    }
    if value >= max {
        return max.as_();
    }
    (value + 0.5).as_()
}

impl Quantum for u8 {
    const QUANTUM_RANGE: f64 = 255.0;

    #[inline]
    fn to_f64(self) -> f64 {
        self.as_()
    }

    #[inline]
    fn clamp_from(value: f64) -> Self {
        clamp_round::<u8>(value, Self::QUANTUM_RANGE)
    }

    #[inline]
    fn to_short(self) -> u16 {
        self as u16 * 257
    }

    #[inline]
    fn from_short(value: u16) -> Self {
        let v = value as u32 + 128;
        ((v - (v >> 8)) >> 8) as u8
    }
}

impl Quantum for u16 {
    const QUANTUM_RANGE: f64 = 65535.0;

    #[inline]
    fn to_f64(self) -> f64 {
        self.as_()
    }

    #[inline]
    fn clamp_from(value: f64) -> Self {
        clamp_round::<u16>(value, Self::QUANTUM_RANGE)
    }

    #[inline]
    fn to_short(self) -> u16 {
        self
    }

    #[inline]
    fn from_short(value: u16) -> Self {
        value
    }
}

#[inline]
fn unit_to_short(value: f64) -> u16 {
    clamp_round::<u16>(value * MAX_SHORT, MAX_SHORT)
}

impl Quantum for f32 {
    const QUANTUM_RANGE: f64 = 1.0;

    #[inline]
    fn to_f64(self) -> f64 {
        self.as_()
    }

    #[inline]
    fn clamp_from(value: f64) -> Self {
        if value.is_nan() {
            return 0.;
        }
        value.clamp(0.0, Self::QUANTUM_RANGE).as_()
    }

    #[inline]
    fn from_f64(value: f64) -> Self {
        value.as_()
    }

    #[inline]
    fn to_short(self) -> u16 {
        unit_to_short(self.as_())
    }

    #[inline]
    fn from_short(value: u16) -> Self {
        (value as f64 / MAX_SHORT).as_()
    }
}

impl Quantum for f16 {
    const QUANTUM_RANGE: f64 = 1.0;

    #[inline]
    fn to_f64(self) -> f64 {
        f16::to_f64(self)
    }

    #[inline]
    fn clamp_from(value: f64) -> Self {
        if value.is_nan() {
            return f16::ZERO;
        }
        f16::from_f64(value.clamp(0.0, Self::QUANTUM_RANGE))
    }

    #[inline]
    fn from_f64(value: f64) -> Self {
        f16::from_f64(value)
    }

    #[inline]
    fn to_short(self) -> u16 {
        unit_to_short(f16::to_f64(self))
    }

    #[inline]
    fn from_short(value: u16) -> Self {
        f16::from_f64(value as f64 / MAX_SHORT)
    }
}

/// Reciprocal of an accumulated weight; near-zero weights collapse to 1.
#[inline]
pub fn perceptible_reciprocal(x: f64) -> f64 {
    if x.abs() < MAGICK_EPSILON {
        return 1.0;
    }
    1.0 / x
}

/// Reciprocal preserving sign, used where a weight may legitimately be tiny.
#[inline]
pub(crate) fn signed_reciprocal(x: f64) -> f64 {
    let sign = if x < 0.0 { -1.0 } else { 1.0 };
    if sign * x >= MAGICK_EPSILON {
        return 1.0 / x;
    }
    sign / MAGICK_EPSILON
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_u8_short_round_trip_is_exact() {
        for v in 0..=255u8 {
            assert_eq!(u8::from_short(v.to_short()), v, "mismatch at {v}");
        }
    }

    #[test]
    fn test_u8_from_short_rounds_to_nearest() {
        assert_eq!(u8::from_short(0), 0);
        assert_eq!(u8::from_short(65535), 255);
        assert_eq!(u8::from_short(257 * 100 + 100), 100);
        assert_eq!(u8::from_short(257 * 100 + 200), 101);
    }

    #[test]
    fn test_clamp_from() {
        assert_eq!(u8::clamp_from(-4.0), 0);
        assert_eq!(u8::clamp_from(254.6), 255);
        assert_eq!(u8::clamp_from(1000.0), 255);
        assert_eq!(u8::clamp_from(f64::NAN), 0);
        assert_eq!(u16::clamp_from(65534.4), 65534);
        assert_eq!(f32::clamp_from(1.5), 1.0);
        assert_eq!(f16::clamp_from(0.5), f16::from_f32(0.5));
    }

    #[test]
    fn test_float_short_scaling() {
        assert_eq!(1.0f32.to_short(), 65535);
        assert_eq!(0.0f32.to_short(), 0);
        assert!((f32::from_short(32768) - 0.5).abs() < 1e-4);
    }

    #[test]
    fn test_perceptible_reciprocal() {
        assert_eq!(perceptible_reciprocal(0.0), 1.0);
        assert_eq!(perceptible_reciprocal(1e-20), 1.0);
        assert_eq!(perceptible_reciprocal(4.0), 0.25);
        assert!(signed_reciprocal(-1e-20) < 0.0);
    }
}
