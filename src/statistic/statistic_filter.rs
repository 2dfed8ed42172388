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

use crate::arena::{make_arena, ArenaPads};
use crate::context::EffectContext;
use crate::kernel::optimal_kernel_width_2d;
use crate::progress::STATISTIC_TAG;
use crate::quantum::Quantum;
use crate::row_executor::for_each_row_init;
use crate::statistic::pixel_list::PixelList;
use crate::{EffectError, ImageStore, ImageStoreMut};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::{debug, trace};

/// Statistic computed over every window.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StatisticKind {
    /// Difference between the window maximum and minimum
    Gradient,
    Maximum,
    Mean,
    Median,
    Minimum,
    /// Most frequent value
    Mode,
    /// Median pulled away from the window extremes
    Nonpeak,
    RootMeanSquare,
    StandardDeviation,
}

impl FromStr for StatisticKind {
    type Err = EffectError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "gradient" => Ok(StatisticKind::Gradient),
            "maximum" => Ok(StatisticKind::Maximum),
            "mean" => Ok(StatisticKind::Mean),
            "median" => Ok(StatisticKind::Median),
            "minimum" => Ok(StatisticKind::Minimum),
            "mode" => Ok(StatisticKind::Mode),
            "nonpeak" => Ok(StatisticKind::Nonpeak),
            "rootmeansquare" | "rms" => Ok(StatisticKind::RootMeanSquare),
            "standarddeviation" => Ok(StatisticKind::StandardDeviation),
            _ => Err(EffectError::InvalidArguments(format!(
                "unknown statistic {s}"
            ))),
        }
    }
}

impl StatisticKind {
    #[inline]
    fn evaluate<T: Quantum>(self, list: &PixelList) -> T {
        match self {
            StatisticKind::Gradient => {
                let maximum = T::from_short(list.maximum()).to_f64();
                let minimum = T::from_short(list.minimum()).to_f64();
                T::clamp_from((maximum - minimum).abs())
            }
            StatisticKind::Maximum => T::from_short(list.maximum()),
            StatisticKind::Mean => T::from_short(list.mean()),
            StatisticKind::Median => T::from_short(list.median()),
            StatisticKind::Minimum => T::from_short(list.minimum()),
            StatisticKind::Mode => T::from_short(list.mode()),
            StatisticKind::Nonpeak => T::from_short(list.nonpeak()),
            StatisticKind::RootMeanSquare => T::from_short(list.root_mean_square()),
            StatisticKind::StandardDeviation => T::from_short(list.standard_deviation()),
        }
    }
}

/// Replaces every sample with a statistic of its `width`×`height`
/// neighbourhood.
///
/// Samples are ranked at 16-bit precision. A zero width or height is treated
/// as 1. Each worker owns one [PixelList].
pub fn statistic<T: Quantum>(
    src: &ImageStore<T>,
    dst: &mut ImageStoreMut<T>,
    kind: StatisticKind,
    width: usize,
    height: usize,
    ctx: &EffectContext,
) -> Result<(), EffectError> {
    src.check_layout()?;
    dst.check_layout(Some(src))?;
    src.size_matches_mut(dst)?;
    let window_w = width.max(1);
    let window_h = height.max(1);
    trace!(?kind, window_w, window_h, "statistic");

    let (arena_source, arena) = make_arena(
        src,
        ArenaPads::from_window(window_w, window_h),
        ctx.edge_mode,
        ctx.background,
    )?;
    let arena_stride = arena.stride();
    let arena_slice = arena_source.as_slice();
    let cn = arena.components;
    // even windows start one sample further left and up
    let origin_x = arena.pad_w - window_w / 2;
    let origin_y = arena.pad_h - window_h / 2;

    let active = src.active_channels();
    let image_width = src.width as usize;
    let rows = src.height as usize;
    let src_stride = src.row_stride() as usize;
    let src_data = src.data.as_ref();
    let allocation_failed = AtomicBool::new(false);
    let progress = ctx.row_progress(STATISTIC_TAG, rows as u64);

    let dst_stride = dst.row_stride() as usize;
    for_each_row_init(
        dst.data.borrow_mut(),
        dst_stride,
        rows,
        ctx.thread_count(src.width, src.height),
        &progress,
        || PixelList::new(window_w, window_h),
        |list, y, row| {
            let list = match list {
                Ok(list) => list,
                Err(_) => {
                    allocation_failed.store(true, Ordering::Relaxed);
                    return;
                }
            };
            let src_row = &src_data[y * src_stride..y * src_stride + image_width * cn];
            for (x, (dst, src_px)) in row[..image_width * cn]
                .chunks_exact_mut(cn)
                .zip(src_row.chunks_exact(cn))
                .enumerate()
            {
                for (c, (dst, &src)) in dst.iter_mut().zip(src_px.iter()).enumerate() {
                    if !active[c] {
                        *dst = src;
                        continue;
                    }
                    list.reset();
                    for v in 0..window_h {
                        let start = (y + origin_y + v) * arena_stride + (x + origin_x) * cn + c;
                        for sample in arena_slice[start..]
                            .iter()
                            .step_by(cn)
                            .take(window_w)
                        {
                            list.insert(sample.to_short());
                        }
                    }
                    *dst = kind.evaluate(list);
                }
            }
        },
    )?;

    if allocation_failed.load(Ordering::Relaxed) {
        return Err(EffectError::MemoryAllocationFailed("pixel list"));
    }
    Ok(())
}

/// Median of the square window derived from `radius`.
pub fn median_filter<T: Quantum>(
    src: &ImageStore<T>,
    dst: &mut ImageStoreMut<T>,
    radius: f64,
    ctx: &EffectContext,
) -> Result<(), EffectError> {
    let width = optimal_kernel_width_2d(radius, 0.5);
    debug!(width, "median window");
    statistic(src, dst, StatisticKind::Median, width, width, ctx)
}
