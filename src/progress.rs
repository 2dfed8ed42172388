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

use crate::EffectError;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use tracing::warn;

pub const BLUR_TAG: &str = "Blur/Image";
pub const CONVOLVE_TAG: &str = "Convolve/Image";
pub const SHARPEN_TAG: &str = "Sharpen/Image";
pub const ADAPTIVE_BLUR_TAG: &str = "AdaptiveBlur/Image";
pub const ADAPTIVE_SHARPEN_TAG: &str = "AdaptiveSharpen/Image";
pub const SELECTIVE_BLUR_TAG: &str = "SelectiveBlur/Image";
pub const MOTION_BLUR_TAG: &str = "MotionBlur/Image";
pub const ROTATIONAL_BLUR_TAG: &str = "RotationalBlur/Image";
pub const UNSHARP_MASK_TAG: &str = "UnsharpMask/Image";
pub const DESPECKLE_TAG: &str = "Despeckle/Image";
pub const SHADE_TAG: &str = "Shade/Image";
pub const SPREAD_TAG: &str = "Spread/Image";
pub const KUWAHARA_TAG: &str = "Kuwahara/Image";
pub const LOCAL_CONTRAST_TAG: &str = "LocalContrast/Image";
pub const LEVEL_TAG: &str = "Level/Image";
pub const EQUALIZE_TAG: &str = "Equalize/Image";
pub const STATISTIC_TAG: &str = "Statistic/Image";
pub const THRESHOLD_TAG: &str = "Threshold/Image";
pub const ADAPTIVE_THRESHOLD_TAG: &str = "AdaptiveThreshold/Image";
pub const RANDOM_THRESHOLD_TAG: &str = "RandomThreshold/Image";
pub const ORDERED_POSTERIZE_TAG: &str = "OrderedPosterize/Image";
pub const CLAMP_TAG: &str = "Clamp/Image";
pub const PERCEPTIBLE_TAG: &str = "Perceptible/Image";
pub const GET_BOUNDING_BOX_TAG: &str = "GetImageBoundingBox/Image";
pub const CONVEX_HULL_TAG: &str = "ConvexHull/Image";

/// Receives row completion reports.
/// Returning `false` asks the running operation to stop.
pub trait ProgressMonitor: Send + Sync {
    fn progress(&self, tag: &'static str, completed: u64, total: u64) -> bool;
}

impl<F> ProgressMonitor for F
where
    F: Fn(&'static str, u64, u64) -> bool + Send + Sync,
{
    fn progress(&self, tag: &'static str, completed: u64, total: u64) -> bool {
        self(tag, completed, total)
    }
}

/// Per call row tracker shared by every worker of a filter.
pub(crate) struct RowProgress {
    tag: &'static str,
    total: u64,
    completed: AtomicU64,
    cancelled: AtomicBool,
    monitor: Option<Arc<dyn ProgressMonitor>>,
}

impl RowProgress {
    pub(crate) fn new(
        tag: &'static str,
        total: u64,
        monitor: Option<Arc<dyn ProgressMonitor>>,
    ) -> RowProgress {
        RowProgress {
            tag,
            total,
            completed: AtomicU64::new(0),
            cancelled: AtomicBool::new(false),
            monitor,
        }
    }

    /// Polled before a row starts.
    #[inline]
    pub(crate) fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Relaxed)
    }

    /// Reports a finished row.
    #[inline]
    pub(crate) fn row_done(&self) {
        let completed = self.completed.fetch_add(1, Ordering::Relaxed) + 1;
        if let Some(monitor) = &self.monitor {
            if !monitor.progress(self.tag, completed, self.total) {
                self.cancelled.store(true, Ordering::Relaxed);
            }
        }
    }

    pub(crate) fn finish(&self) -> Result<(), EffectError> {
        if self.is_cancelled() {
            warn!(
                tag = self.tag,
                completed = self.completed.load(Ordering::Relaxed),
                total = self.total,
                "operation cancelled"
            );
            return Err(EffectError::Cancelled(self.tag));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;
    use tracing_subscriber::EnvFilter;

    #[test]
    fn test_row_progress_reports_and_cancels() {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
        let seen = Arc::new(Mutex::new(Vec::new()));
        let seen_c = seen.clone();
        let monitor: Arc<dyn ProgressMonitor> = Arc::new(move |tag: &'static str, done: u64, total: u64| {
            seen_c.lock().unwrap().push((tag, done, total));
            done < 2
        });
        let progress = RowProgress::new(BLUR_TAG, 4, Some(monitor));
        progress.row_done();
        assert!(!progress.is_cancelled());
        progress.row_done();
        assert!(progress.is_cancelled());
        assert!(matches!(progress.finish(), Err(EffectError::Cancelled(BLUR_TAG))));
        assert_eq!(seen.lock().unwrap().as_slice(), &[(BLUR_TAG, 1, 4), (BLUR_TAG, 2, 4)]);
    }

    #[test]
    fn test_no_monitor_never_cancels() {
        let progress = RowProgress::new(CONVOLVE_TAG, 2, None);
        progress.row_done();
        progress.row_done();
        assert!(progress.finish().is_ok());
    }
}
