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
use crate::geometry::{color_at, is_similar, parse_color, Color, RectangleInfo};
use crate::progress::GET_BOUNDING_BOX_TAG;
use crate::quantum::Quantum;
use crate::threading_policy::make_rayon_pool;
use crate::{EffectError, ImageStore};
use rayon::iter::{IntoParallelIterator, ParallelIterator};
use tracing::{debug, trace, warn};

/// Inclusive extremes of the foreground, `x`/`y` as minima and
/// `right`/`bottom` as maxima.
#[derive(Copy, Clone, Debug)]
struct PartialBounds {
    x: usize,
    y: usize,
    right: usize,
    bottom: usize,
}

impl PartialBounds {
    fn merge(self, other: PartialBounds) -> PartialBounds {
        PartialBounds {
            x: self.x.min(other.x),
            y: self.y.min(other.y),
            right: self.right.max(other.right),
            bottom: self.bottom.max(other.bottom),
        }
    }
}

fn empty_box(columns: usize, rows: usize) -> RectangleInfo {
    warn!(columns, rows, "geometry does not contain image");
    RectangleInfo {
        x: columns,
        y: rows,
        width: 0,
        height: 0,
    }
}

/// Region of the image differing from its background.
///
/// By default the background is sampled at the corners: columns are compared
/// with the top-left and top-right pixels, rows with the top-left and
/// bottom-left ones. With the `trim:percent-background` artifact edges are
/// peeled instead while at least that share of them is background.
/// Colours within `ctx.fuzz` count as equal.
///
/// An image without foreground gives an empty box at `(width, height)`.
pub fn image_bounding_box<T: Quantum>(
    image: &ImageStore<T>,
    ctx: &EffectContext,
) -> Result<RectangleInfo, EffectError> {
    image.check_layout()?;
    trace!(width = image.width, height = image.height, fuzz = ctx.fuzz, "bounding box");
    match ctx.artifact_f64("trim:percent-background")? {
        Some(percent) => percent_background_box(image, percent.clamp(0.0, 100.0) / 100.0, ctx),
        None => corner_box(image, ctx),
    }
}

fn corner_box<T: Quantum>(
    image: &ImageStore<T>,
    ctx: &EffectContext,
) -> Result<RectangleInfo, EffectError> {
    let columns = image.width as usize;
    let rows = image.height as usize;
    let active = image.active_channels();
    let fuzz = ctx.fuzz;
    let targets = [
        color_at(image, 0, 0),
        color_at(image, columns - 1, 0),
        color_at(image, 0, rows - 1),
    ];
    let progress = ctx.row_progress(GET_BOUNDING_BOX_TAG, rows as u64);
    let initial = PartialBounds {
        x: columns,
        y: rows,
        right: 0,
        bottom: 0,
    };

    let scan_row = |y: usize| -> PartialBounds {
        let mut bounds = initial;
        if progress.is_cancelled() {
            return bounds;
        }
        for x in 0..columns {
            let pixel = color_at(image, x, y);
            if x < bounds.x && !is_similar(&pixel, &targets[0], &active, fuzz) {
                bounds.x = x;
            }
            if x > bounds.right && !is_similar(&pixel, &targets[1], &active, fuzz) {
                bounds.right = x;
            }
            if y < bounds.y && !is_similar(&pixel, &targets[0], &active, fuzz) {
                bounds.y = y;
            }
            if y > bounds.bottom && !is_similar(&pixel, &targets[2], &active, fuzz) {
                bounds.bottom = y;
            }
        }
        progress.row_done();
        bounds
    };

    let thread_count = ctx.thread_count(image.width, image.height);
    let bounds = if thread_count <= 1 {
        (0..rows).map(scan_row).fold(initial, PartialBounds::merge)
    } else {
        let pool = make_rayon_pool(thread_count)?;
        pool.install(|| {
            (0..rows)
                .into_par_iter()
                .map(scan_row)
                .reduce(|| initial, PartialBounds::merge)
        })
    };
    progress.finish()?;

    // minima left at (columns, rows) mean no pixel differed
    if bounds.x > bounds.right || bounds.y > bounds.bottom {
        return Ok(empty_box(columns, rows));
    }
    Ok(RectangleInfo {
        x: bounds.x,
        y: bounds.y,
        width: bounds.right + 1 - bounds.x,
        height: bounds.bottom + 1 - bounds.y,
    })
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum Edge {
    Left,
    Right,
    Top,
    Bottom,
}

/// Share of background pixels on one edge strip of `bounds`.
fn edge_census<T: Quantum>(
    image: &ImageStore<T>,
    bounds: &RectangleInfo,
    edge: Edge,
    background: &Color,
    active: &[bool],
    fuzz: f64,
) -> f64 {
    let (xs, ys) = match edge {
        Edge::Left => (bounds.x..bounds.x + 1, bounds.y..bounds.y + bounds.height),
        Edge::Right => (
            bounds.x + bounds.width - 1..bounds.x + bounds.width,
            bounds.y..bounds.y + bounds.height,
        ),
        Edge::Top => (bounds.x..bounds.x + bounds.width, bounds.y..bounds.y + 1),
        Edge::Bottom => (
            bounds.x..bounds.x + bounds.width,
            bounds.y + bounds.height - 1..bounds.y + bounds.height,
        ),
    };
    let mut total = 0usize;
    let mut matching = 0usize;
    for y in ys {
        for x in xs.clone() {
            total += 1;
            if is_similar(&color_at(image, x, y), background, active, fuzz) {
                matching += 1;
            }
        }
    }
    if total == 0 {
        return 0.0;
    }
    matching as f64 / total as f64
}

/// Peels the edge with the largest background share while that share is at
/// least `target`; only the strips touching the moved edge are counted again.
///
/// The background comes from the `background` artifact, else the top-left
/// pixel.
fn percent_background_box<T: Quantum>(
    image: &ImageStore<T>,
    target: f64,
    ctx: &EffectContext,
) -> Result<RectangleInfo, EffectError> {
    let columns = image.width as usize;
    let rows = image.height as usize;
    let background = match ctx.artifact("background") {
        Some(value) => parse_color(image, "background", value)?,
        None => color_at(image, 0, 0),
    };
    let active = image.active_channels();
    let fuzz = ctx.fuzz;
    debug!(target, ?background, "percent background trim");

    let progress = ctx.row_progress(GET_BOUNDING_BOX_TAG, (columns + rows) as u64);
    let mut bounds = RectangleInfo {
        x: 0,
        y: 0,
        width: columns,
        height: rows,
    };
    let census = |bounds: &RectangleInfo, edge: Edge| {
        edge_census(image, bounds, edge, &background, &active, fuzz)
    };
    let mut left = census(&bounds, Edge::Left);
    let mut right = census(&bounds, Edge::Right);
    let mut top = census(&bounds, Edge::Top);
    let mut bottom = census(&bounds, Edge::Bottom);

    while !bounds.is_empty() {
        if progress.is_cancelled() {
            break;
        }
        let best = left.max(right).max(top).max(bottom);
        if best < target {
            break;
        }
        let edge = if left == best {
            Edge::Left
        } else if right == best {
            Edge::Right
        } else if top == best {
            Edge::Top
        } else {
            Edge::Bottom
        };
        match edge {
            Edge::Left => {
                bounds.x += 1;
                bounds.width -= 1;
            }
            Edge::Right => bounds.width -= 1,
            Edge::Top => {
                bounds.y += 1;
                bounds.height -= 1;
            }
            Edge::Bottom => bounds.height -= 1,
        }
        progress.row_done();
        if bounds.is_empty() {
            break;
        }
        match edge {
            Edge::Left | Edge::Right => {
                if edge == Edge::Left {
                    left = census(&bounds, Edge::Left);
                } else {
                    right = census(&bounds, Edge::Right);
                }
                top = census(&bounds, Edge::Top);
                bottom = census(&bounds, Edge::Bottom);
            }
            Edge::Top | Edge::Bottom => {
                if edge == Edge::Top {
                    top = census(&bounds, Edge::Top);
                } else {
                    bottom = census(&bounds, Edge::Bottom);
                }
                left = census(&bounds, Edge::Left);
                right = census(&bounds, Edge::Right);
            }
        }
    }
    progress.finish()?;

    if bounds.is_empty() {
        return Ok(empty_box(columns, rows));
    }
    Ok(bounds)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ChannelLayout;

    fn framed(columns: usize, rows: usize, block: RectangleInfo) -> Vec<u8> {
        let mut data = vec![255u8; columns * rows * 3];
        for y in block.y..block.y + block.height {
            for x in block.x..block.x + block.width {
                let start = (y * columns + x) * 3;
                data[start..start + 3].copy_from_slice(&[10, 20, 30]);
            }
        }
        data
    }

    #[test]
    fn test_corner_mode_finds_block() {
        let block = RectangleInfo {
            x: 3,
            y: 2,
            width: 4,
            height: 5,
        };
        let data = framed(12, 10, block);
        let image = ImageStore::borrow(&data, 12, 10, ChannelLayout::Rgb);
        let bounds = image_bounding_box(&image, &EffectContext::new()).unwrap();
        assert_eq!(bounds, block);
    }

    #[test]
    fn test_corner_mode_fuzz_hides_faint_block() {
        let mut data = vec![100u8; 8 * 8];
        data[3 * 8 + 4] = 103;
        let image = ImageStore::borrow(&data, 8, 8, ChannelLayout::Gray);
        let found = image_bounding_box(&image, &EffectContext::new()).unwrap();
        assert_eq!(
            found,
            RectangleInfo {
                x: 4,
                y: 3,
                width: 1,
                height: 1
            }
        );
        let hidden = image_bounding_box(&image, &EffectContext::new().with_fuzz(5.0)).unwrap();
        assert!(hidden.is_empty());
        assert_eq!((hidden.x, hidden.y), (8, 8));
    }

    fn single_pixel(x: usize, y: usize) -> RectangleInfo {
        RectangleInfo {
            x,
            y,
            width: 1,
            height: 1,
        }
    }

    #[test]
    fn test_corner_mode_foreground_on_first_row_and_column() {
        for (x, y) in [(5usize, 0usize), (0, 5), (0, 0), (9, 9)] {
            let mut data = vec![255u8; 10 * 10];
            data[y * 10 + x] = 0;
            let image = ImageStore::borrow(&data, 10, 10, ChannelLayout::Gray);
            let bounds = image_bounding_box(&image, &EffectContext::new()).unwrap();
            assert_eq!(bounds, single_pixel(x, y), "pixel at ({x}, {y})");
        }
    }

    #[test]
    fn test_corner_mode_single_row_and_column_images() {
        let mut column = vec![40u8; 7];
        column[3] = 200;
        let image = ImageStore::borrow(&column, 1, 7, ChannelLayout::Gray);
        let bounds = image_bounding_box(&image, &EffectContext::new()).unwrap();
        assert_eq!(bounds, single_pixel(0, 3));

        let mut row = vec![40u8; 7];
        row[4] = 200;
        let image = ImageStore::borrow(&row, 7, 1, ChannelLayout::Gray);
        let bounds = image_bounding_box(&image, &EffectContext::new()).unwrap();
        assert_eq!(bounds, single_pixel(4, 0));

        let flat = vec![40u8; 7];
        let image = ImageStore::borrow(&flat, 1, 7, ChannelLayout::Gray);
        let bounds = image_bounding_box(&image, &EffectContext::new()).unwrap();
        assert!(bounds.is_empty());
        assert_eq!((bounds.x, bounds.y), (1, 7));
    }

    #[test]
    fn test_percent_background_mode() {
        let block = RectangleInfo {
            x: 2,
            y: 1,
            width: 5,
            height: 6,
        };
        let mut data = framed(10, 9, block);
        // a stray pixel on the outer frame
        data[(8 * 10) * 3..(8 * 10) * 3 + 3].copy_from_slice(&[0, 0, 0]);
        let image = ImageStore::borrow(&data, 10, 9, ChannelLayout::Rgb);
        let ctx = EffectContext::new().with_artifact("trim:percent-background", "80%");
        let bounds = image_bounding_box(&image, &ctx).unwrap();
        assert_eq!(bounds, block);
    }

    #[test]
    fn test_percent_background_uses_artifact_colour() {
        let data = framed(
            6,
            6,
            RectangleInfo {
                x: 0,
                y: 0,
                width: 6,
                height: 6,
            },
        );
        let image = ImageStore::borrow(&data, 6, 6, ChannelLayout::Rgb);
        let ctx = EffectContext::new()
            .with_artifact("trim:percent-background", "100")
            .with_artifact("background", "10,20,30");
        assert!(image_bounding_box(&image, &ctx).unwrap().is_empty());
        let ctx = EffectContext::new()
            .with_artifact("trim:percent-background", "100")
            .with_artifact("background", "255");
        assert_eq!(
            image_bounding_box(&image, &ctx).unwrap(),
            RectangleInfo {
                x: 0,
                y: 0,
                width: 6,
                height: 6
            }
        );
    }
}
