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
use std::{num::NonZeroUsize, thread::available_parallelism};

#[repr(C)]
#[derive(Debug, Copy, Clone, Ord, PartialOrd, Eq, PartialEq, Default, Hash, Serialize, Deserialize)]
/// Set threading policy.
pub enum ThreadingPolicy {
    /// Use only one thread, current is preferred.
    Single,
    /// Compute adaptive thread count between 1..available CPUs.
    #[default]
    Adaptive,
    /// Like `Adaptive`, but reserve given amount of threads (i.e. those will not be
    /// used).
    AdaptiveReserve(NonZeroUsize),
    /// Use specified number of threads.
    Fixed(NonZeroUsize),
}

impl ThreadingPolicy {
    /// Returns the number of row workers for the given image dimensions.
    ///
    /// Never less than 1 and never more than the number of rows.
    pub fn thread_count(&self, width: u32, height: u32) -> usize {
        let pixels = width as usize * height as usize;
        let count = match self {
            ThreadingPolicy::Single => 1,
            ThreadingPolicy::Adaptive => {
                (pixels / (256 * 256)).clamp(1, Self::available_parallelism(2))
            }
            ThreadingPolicy::AdaptiveReserve(reserve) => {
                let reserve = reserve.get();
                let max_threads = Self::available_parallelism(1);
                let usable = if max_threads <= reserve {
                    1
                } else {
                    max_threads - reserve
                };
                (pixels / (256 * 256)).clamp(1, usable)
            }
            ThreadingPolicy::Fixed(fixed) => fixed.get(),
        };
        count.min(height.max(1) as usize)
    }

    fn available_parallelism(min: usize) -> usize {
        available_parallelism()
            .map(|x| x.get())
            .unwrap_or(1)
            .max(min)
    }
}

/// Builds a rayon pool for `thread_count` workers.
pub(crate) fn make_rayon_pool(thread_count: usize) -> Result<rayon::ThreadPool, crate::EffectError> {
    rayon::ThreadPoolBuilder::new()
        .num_threads(thread_count)
        .build()
        .map_err(|e| crate::EffectError::ThreadPool(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_thread_count_bounds() {
        assert_eq!(ThreadingPolicy::Single.thread_count(4096, 4096), 1);
        assert_eq!(ThreadingPolicy::Adaptive.thread_count(8, 8), 1);
        let fixed = ThreadingPolicy::Fixed(NonZeroUsize::new(6).unwrap());
        assert_eq!(fixed.thread_count(100, 100), 6);
        assert_eq!(fixed.thread_count(100, 3), 3);
    }
}
