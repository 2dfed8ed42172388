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

use crate::image_store::active_channels;
use crate::quantum::{perceptible_reciprocal, Quantum};
use crate::{ChannelLayout, ChannelMask};

/// Sample readable as a working `f64` value: every [Quantum] plus the `f64`
/// intermediate of separable passes.
pub(crate) trait WorkingSample: Copy + Send + Sync {
    fn working(self) -> f64;
}

impl<T: Quantum> WorkingSample for T {
    #[inline(always)]
    fn working(self) -> f64 {
        self.to_f64()
    }
}

impl WorkingSample for f64 {
    #[inline(always)]
    fn working(self) -> f64 {
        self
    }
}

/// How the channels of one layout are accumulated by weighted filters.
///
/// Colour channels of images with alpha are weighted by the normalized
/// alpha and divided by the accumulated weight; alpha itself is summed as is.
#[derive(Clone, Debug)]
pub(crate) struct ChannelPlan {
    pub(crate) cn: usize,
    pub(crate) alpha: Option<usize>,
    pub(crate) active: Vec<bool>,
    pub(crate) quantum_scale: f64,
}

impl ChannelPlan {
    pub(crate) fn new(layout: ChannelLayout, mask: ChannelMask, quantum_scale: f64) -> ChannelPlan {
        ChannelPlan {
            cn: layout.channels(),
            alpha: layout.alpha_index(),
            active: active_channels(layout, mask),
            quantum_scale,
        }
    }

    /// Same plan with every channel active.
    pub(crate) fn all_active(&self) -> ChannelPlan {
        ChannelPlan {
            cn: self.cn,
            alpha: self.alpha,
            active: vec![true; self.cn],
            quantum_scale: self.quantum_scale,
        }
    }

    /// Writes `bias + Σ k·p` (or its alpha weighted form) for active channels.
    /// Returns the accumulated alpha weight, 0 without alpha.
    #[inline]
    pub(crate) fn accumulate<'s, S: WorkingSample + 's>(
        &self,
        taps: impl Iterator<Item = (f64, &'s [S])>,
        bias: f64,
        out: &mut [f64],
    ) -> f64 {
        let mut sums = [0f64; 5];
        let mut gamma = 0f64;
        match self.alpha {
            Some(a) => {
                for (weight, px) in taps {
                    let alpha = px[a].working() * self.quantum_scale;
                    let weighted = weight * alpha;
                    gamma += weighted;
                    for (c, (sum, &v)) in sums.iter_mut().zip(px.iter()).enumerate() {
                        if c == a {
                            *sum += weight * v.working();
                        } else {
                            *sum += weighted * v.working();
                        }
                    }
                }
                let recip = perceptible_reciprocal(gamma);
                for (c, dst) in out.iter_mut().enumerate().take(self.cn) {
                    if !self.active[c] {
                        continue;
                    }
                    *dst = if c == a {
                        bias + sums[c]
                    } else {
                        bias + recip * sums[c]
                    };
                }
            }
            None => {
                for (weight, px) in taps {
                    for (sum, &v) in sums.iter_mut().zip(px.iter()) {
                        *sum += weight * v.working();
                    }
                }
                for (c, dst) in out.iter_mut().enumerate().take(self.cn) {
                    if self.active[c] {
                        *dst = bias + sums[c];
                    }
                }
            }
        }
        gamma
    }

    /// Normalized weighted mean: sums divided by `Σk` (or `Σkα` for colour
    /// channels of alpha images). Used by adaptive and selective filters.
    #[inline]
    pub(crate) fn weighted_mean<'s, S: WorkingSample + 's>(
        &self,
        taps: impl Iterator<Item = (f64, &'s [S])>,
        out: &mut [f64],
    ) -> (f64, f64) {
        let mut sums = [0f64; 5];
        let mut gamma = 0f64;
        let mut plain = 0f64;
        for (weight, px) in taps {
            plain += weight;
            match self.alpha {
                Some(a) => {
                    let weighted = weight * px[a].working() * self.quantum_scale;
                    gamma += weighted;
                    for (c, (sum, &v)) in sums.iter_mut().zip(px.iter()).enumerate() {
                        let w = if c == a { weight } else { weighted };
                        *sum += w * v.working();
                    }
                }
                None => {
                    for (sum, &v) in sums.iter_mut().zip(px.iter()) {
                        *sum += weight * v.working();
                    }
                }
            }
        }
        let plain_recip = perceptible_reciprocal(plain);
        let alpha_recip = perceptible_reciprocal(gamma);
        for (c, dst) in out.iter_mut().enumerate().take(self.cn) {
            if !self.active[c] {
                continue;
            }
            *dst = match self.alpha {
                Some(a) if c != a => alpha_recip * sums[c],
                _ => plain_recip * sums[c],
            };
        }
        (plain, gamma)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accumulate_without_alpha() {
        let plan = ChannelPlan::new(ChannelLayout::Rgb, ChannelMask::ALL, 1. / 255.);
        let a = [10u8, 20, 30];
        let b = [30u8, 40, 50];
        let mut out = [0f64; 3];
        plan.accumulate([(0.5, &a[..]), (0.5, &b[..])].into_iter(), 1.0, &mut out);
        assert_eq!(out, [21.0, 31.0, 41.0]);
    }

    #[test]
    fn test_accumulate_with_alpha_ignores_transparent() {
        let plan = ChannelPlan::new(ChannelLayout::Rgba, ChannelMask::ALL, 1. / 255.);
        let opaque = [200u8, 100, 50, 255];
        let clear = [0u8, 0, 0, 0];
        let mut out = [0f64; 4];
        plan.accumulate(
            [(0.5, &opaque[..]), (0.5, &clear[..])].into_iter(),
            0.0,
            &mut out,
        );
        assert!((out[0] - 200.0).abs() < 1e-9);
        assert!((out[2] - 50.0).abs() < 1e-9);
        assert!((out[3] - 127.5).abs() < 1e-9);
    }

    #[test]
    fn test_quantum_and_intermediate_samples() {
        fn mean_of<S: WorkingSample>(px: &[S]) -> f64 {
            let plan = ChannelPlan::new(ChannelLayout::Gray, ChannelMask::ALL, 1.0);
            let mut out = [0f64; 1];
            plan.weighted_mean(px.chunks_exact(1).map(|p| (1.0, p)), &mut out);
            out[0]
        }
        assert_eq!(mean_of(&[10u16, 30]), 20.0);
        assert_eq!(mean_of(&[0.25f32, 0.75]), 0.5);
        assert_eq!(mean_of(&[half::f16::from_f32(0.5), half::f16::from_f32(1.0)]), 0.75);
        assert_eq!(mean_of(&[-3.0f64, 5.0]), 1.0);
    }

    #[test]
    fn test_inactive_channels_untouched() {
        let mask = ChannelMask::ALL.without(crate::PixelChannel::Green);
        let plan = ChannelPlan::new(ChannelLayout::Rgb, mask, 1. / 255.);
        let a = [10u8, 20, 30];
        let mut out = [-1f64; 3];
        plan.accumulate([(1.0, &a[..])].into_iter(), 0.0, &mut out);
        assert_eq!(out, [10.0, -1.0, 30.0]);
    }
}
