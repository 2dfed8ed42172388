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
use crate::geometry::{color_at, is_similar, parse_color, Color, PointInfo};
use crate::progress::CONVEX_HULL_TAG;
use crate::quantum::Quantum;
use crate::threading_policy::make_rayon_pool;
use crate::{EffectError, ImageStore};
use rayon::iter::{IntoParallelIterator, ParallelIterator};
use tracing::{debug, trace};

#[inline]
fn cross(o: &PointInfo, a: &PointInfo, b: &PointInfo) -> f64 {
    (a.x - o.x) * (b.y - o.y) - (a.y - o.y) * (b.x - o.x)
}

/// Andrew's monotone chain.
///
/// Returns the hull counter-clockwise, starting at the smallest `(x, y)`
/// point, without repeating the first vertex. Collinear points are dropped.
pub fn monotone_chain(points: &[PointInfo]) -> Vec<PointInfo> {
    let mut sorted = points.to_vec();
    sorted.sort_by(|a, b| a.x.total_cmp(&b.x).then(a.y.total_cmp(&b.y)));
    sorted.dedup();
    if sorted.len() < 3 {
        return sorted;
    }

    let mut hull: Vec<PointInfo> = Vec::with_capacity(2 * sorted.len());
    for point in sorted.iter() {
        while hull.len() >= 2
            && cross(&hull[hull.len() - 2], &hull[hull.len() - 1], point) <= 0.0
        {
            hull.pop();
        }
        hull.push(*point);
    }
    let lower = hull.len() + 1;
    for point in sorted.iter().rev().skip(1) {
        while hull.len() >= lower
            && cross(&hull[hull.len() - 2], &hull[hull.len() - 1], point) <= 0.0
        {
            hull.pop();
        }
        hull.push(*point);
    }
    hull.pop();
    hull
}

/// Most frequent corner colour, the first corner in reading order on ties.
fn corner_background<T: Quantum>(image: &ImageStore<T>, active: &[bool], fuzz: f64) -> Color {
    let columns = image.width as usize;
    let rows = image.height as usize;
    let corners = [
        color_at(image, 0, 0),
        color_at(image, columns - 1, 0),
        color_at(image, 0, rows - 1),
        color_at(image, columns - 1, rows - 1),
    ];
    let mut best = corners[0];
    let mut best_count = 0usize;
    for candidate in corners.iter() {
        let count = corners
            .iter()
            .filter(|x| is_similar(x, candidate, active, fuzz))
            .count();
        if count > best_count {
            best = *candidate;
            best_count = count;
        }
    }
    best
}

/// Convex hull of the pixels standing out from the background.
///
/// The background is the dominant corner colour unless the
/// `convex-hull:background-color` artifact names one. Pixels farther than
/// `ctx.fuzz` from it are foreground. The hull of an image without
/// foreground is empty.
pub fn convex_hull<T: Quantum>(
    image: &ImageStore<T>,
    ctx: &EffectContext,
) -> Result<Vec<PointInfo>, EffectError> {
    image.check_layout()?;
    let active = image.active_channels();
    let fuzz = ctx.fuzz;
    let background = match ctx.artifact("convex-hull:background-color") {
        Some(value) => parse_color(image, "convex-hull:background-color", value)?,
        None => corner_background(image, &active, fuzz),
    };
    trace!(?background, fuzz, "convex hull");

    let columns = image.width as usize;
    let rows = image.height as usize;
    let progress = ctx.row_progress(CONVEX_HULL_TAG, rows as u64);
    let scan_row = |y: usize| -> Vec<PointInfo> {
        if progress.is_cancelled() {
            return Vec::new();
        }
        let points = (0..columns)
            .filter(|&x| !is_similar(&color_at(image, x, y), &background, &active, fuzz))
            .map(|x| PointInfo::new(x as f64, y as f64))
            .collect();
        progress.row_done();
        points
    };

    let thread_count = ctx.thread_count(image.width, image.height);
    let per_row: Vec<Vec<PointInfo>> = if thread_count <= 1 {
        (0..rows).map(scan_row).collect()
    } else {
        let pool = make_rayon_pool(thread_count)?;
        pool.install(|| (0..rows).into_par_iter().map(scan_row).collect())
    };
    progress.finish()?;

    let foreground: Vec<PointInfo> = per_row.into_iter().flatten().collect();
    let hull = monotone_chain(&foreground);
    debug!(foreground = foreground.len(), vertices = hull.len(), "convex hull");
    Ok(hull)
}
