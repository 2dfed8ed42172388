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
use crate::effects::row_seed;
use crate::progress::RANDOM_THRESHOLD_TAG;
use crate::quantum::Quantum;
use crate::row_executor::for_each_row;
use crate::threshold::threshold_targets;
use crate::{EffectError, ImageStoreMut};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::str::FromStr;
use tracing::trace;

/// Band `"low[,high][%]"` outside of which [random_threshold] is
/// deterministic. A single value gives an empty band.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct ThresholdRange {
    pub low: f64,
    pub high: f64,
    pub percent: bool,
}

impl ThresholdRange {
    /// Bounds in channel units.
    pub fn bounds(&self, range: f64) -> (f64, f64) {
        if self.percent {
            (self.low * range / 100.0, self.high * range / 100.0)
        } else {
            (self.low, self.high)
        }
    }
}

impl FromStr for ThresholdRange {
    type Err = EffectError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let percent = trimmed.ends_with('%');
        let mut values = trimmed
            .trim_end_matches('%')
            .split(|c: char| c == ',' || c.is_whitespace())
            .filter(|x| !x.is_empty())
            .map(|x| x.parse::<f64>());
        let low = match values.next() {
            Some(Ok(v)) => v,
            _ => return Err(EffectError::InvalidGeometry(s.to_string())),
        };
        let high = match values.next() {
            Some(Ok(v)) => v,
            Some(Err(_)) => return Err(EffectError::InvalidGeometry(s.to_string())),
            None => low,
        };
        if values.next().is_some() {
            return Err(EffectError::InvalidGeometry(s.to_string()));
        }
        Ok(ThresholdRange { low, high, percent })
    }
}

/// Binarizes values below `low` and above `high` at those bounds, and values
/// in between against a uniformly drawn threshold.
///
/// Bounds are in channel units. Each row owns a generator seeded from the
/// context seed, so a seeded call is reproducible on any number of workers.
pub fn random_threshold<T: Quantum>(
    image: &mut ImageStoreMut<T>,
    low: f64,
    high: f64,
    ctx: &EffectContext,
) -> Result<(), EffectError> {
    image.check_layout(None)?;
    if low.is_nan() || high.is_nan() {
        return Err(EffectError::InvalidArguments(
            "random threshold bounds are NaN".to_string(),
        ));
    }
    let (low, high) = if low <= high { (low, high) } else { (high, low) };
    trace!(low, high, "random threshold");
    let seed = ctx.call_seed();
    let targets = threshold_targets(image.layout, image.mask);
    let cn = image.layout.channels();
    let width = image.width as usize;
    let height = image.height as usize;
    let stride = image.row_stride() as usize;
    let thread_count = ctx.thread_count(image.width, image.height);
    let progress = ctx.row_progress(RANDOM_THRESHOLD_TAG, height as u64);
    let range = T::QUANTUM_RANGE;
    let black = T::clamp_from(0.0);
    let white = T::clamp_from(range);

    for_each_row(
        image.data.borrow_mut(),
        stride,
        height,
        thread_count,
        &progress,
        |y, row| {
            let mut rng = StdRng::seed_from_u64(row_seed(seed, y));
            for px in row[..width * cn].chunks_exact_mut(cn) {
                for (v, &target) in px.iter_mut().zip(targets.iter()) {
                    if !target {
                        continue;
                    }
                    let value = v.to_f64();
                    let threshold = if value < low {
                        low
                    } else if value > high {
                        high
                    } else {
                        range * rng.gen::<f64>()
                    };
                    *v = if value <= threshold { black } else { white };
                }
            }
        },
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ChannelLayout, ThreadingPolicy};
    use std::num::NonZeroUsize;

    fn gradient() -> Vec<u16> {
        (0..32 * 32).map(|i| (i * 64) as u16).collect()
    }

    #[test]
    fn test_parse_range() {
        let r: ThresholdRange = "10,90%".parse().unwrap();
        assert_eq!(r.bounds(255.0), (25.5, 229.5));
        let r: ThresholdRange = "40".parse().unwrap();
        assert_eq!((r.low, r.high, r.percent), (40.0, 40.0, false));
        assert!("x".parse::<ThresholdRange>().is_err());
        assert!("1,2,3".parse::<ThresholdRange>().is_err());
    }

    #[test]
    fn test_seeded_is_reproducible_across_workers() {
        let one = EffectContext::new()
            .with_seed(7)
            .with_threading_policy(ThreadingPolicy::Single);
        let four = EffectContext::new()
            .with_seed(7)
            .with_threading_policy(ThreadingPolicy::Fixed(NonZeroUsize::new(4).unwrap()));
        let mut a = gradient();
        let mut b = gradient();
        let mut image_a = ImageStoreMut::borrow(&mut a, 32, 32, ChannelLayout::Gray);
        let mut image_b = ImageStoreMut::borrow(&mut b, 32, 32, ChannelLayout::Gray);
        random_threshold(&mut image_a, 8000.0, 50000.0, &one).unwrap();
        random_threshold(&mut image_b, 8000.0, 50000.0, &four).unwrap();
        assert_eq!(image_a.data.borrow(), image_b.data.borrow());
    }

    #[test]
    fn test_outside_band_is_deterministic() {
        let mut data = gradient();
        let mut image = ImageStoreMut::borrow(&mut data, 32, 32, ChannelLayout::Gray);
        random_threshold(&mut image, 8000.0, 50000.0, &EffectContext::new()).unwrap();
        let out = image.data.borrow();
        assert!(out.iter().all(|&x| x == 0 || x == 65535));
        for (i, &v) in gradient().iter().enumerate() {
            if v < 8000 {
                assert_eq!(out[i], 0, "at {i}");
            } else if v > 50000 {
                assert_eq!(out[i], 65535, "at {i}");
            }
        }
    }
}
