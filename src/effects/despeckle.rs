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
use crate::progress::DESPECKLE_TAG;
use crate::quantum::Quantum;
use crate::threading_policy::make_rayon_pool;
use crate::util::try_vec;
use crate::{EffectError, ImageStore, ImageStoreMut};
use rayon::iter::{IntoParallelIterator, ParallelIterator};
use tracing::trace;

const X: [isize; 4] = [0, 1, 1, -1];
const Y: [isize; 4] = [1, 0, 1, 1];

/// Channel plane surrounded by a one pixel ring that is never written.
struct HullPlane {
    columns: usize,
    rows: usize,
    step: f64,
}

impl HullPlane {
    #[inline]
    fn index(&self, x: usize, y: usize) -> usize {
        (y + 1) * (self.columns + 2) + x + 1
    }

    /// One hull pass in direction `(dx, dy)`, `f` is updated through `g`.
    fn hull(&self, dx: isize, dy: isize, polarity: i32, f: &mut [f64], g: &mut [f64]) {
        let offset = dy * (self.columns as isize + 2) + dx;
        let step = self.step;
        for y in 0..self.rows {
            for x in 0..self.columns {
                let i = self.index(x, y);
                let r = f[(i as isize + offset) as usize];
                let mut v = f[i];
                if polarity > 0 {
                    if r >= v + 2.0 * step {
                        v += step;
                    }
                } else if r <= v - 2.0 * step {
                    v -= step;
                }
                g[i] = v;
            }
        }
        for y in 0..self.rows {
            for x in 0..self.columns {
                let i = self.index(x, y);
                let r = g[(i as isize + offset) as usize];
                let s = g[(i as isize - offset) as usize];
                let mut v = g[i];
                if polarity > 0 {
                    if s >= v + 2.0 * step && r > v {
                        v += step;
                    }
                } else if s <= v - 2.0 * step && r < v {
                    v -= step;
                }
                f[i] = v;
            }
        }
    }
}

/// Speckle reduction by hull filtering.
///
/// Each active channel is raised where it is darker than its neighbours and
/// lowered where it is brighter, in eight directions; isolated specks fade
/// while edges survive. Channels are processed in parallel.
pub fn despeckle<T: Quantum>(
    src: &ImageStore<T>,
    dst: &mut ImageStoreMut<T>,
    ctx: &EffectContext,
) -> Result<(), EffectError> {
    src.check_layout()?;
    dst.check_layout(Some(src))?;
    src.size_matches_mut(dst)?;
    trace!(width = src.width, height = src.height, "despeckle");

    let columns = src.width as usize;
    let rows = src.height as usize;
    let cn = src.layout.channels();
    let src_stride = src.row_stride() as usize;
    let plane = HullPlane {
        columns,
        rows,
        step: T::QUANTUM_RANGE / 255.0,
    };
    let length = (columns + 2) * (rows + 2);
    let edge_mode = ctx.edge_mode;
    let active = src.active_channels();
    let progress = ctx.row_progress(DESPECKLE_TAG, cn as u64);
    let src_data = src.data.as_ref();

    let despeckle_channel = |c: usize| -> Result<Option<Vec<f64>>, EffectError> {
        if !active[c] || progress.is_cancelled() {
            return Ok(None);
        }
        let mut pixels = try_vec(length, 0f64, "despeckle pixels")?;
        for y in -1..=rows as isize {
            for x in -1..=columns as isize {
                let value = match (edge_mode.resolve(x, columns), edge_mode.resolve(y, rows)) {
                    (Some(sx), Some(sy)) => src_data[sy * src_stride + sx * cn + c].to_f64(),
                    _ => ctx.background[c],
                };
                pixels[((y + 1) as usize) * (columns + 2) + (x + 1) as usize] = value;
            }
        }
        let mut buffer = pixels.clone();
        for k in 0..4 {
            plane.hull(X[k], Y[k], 1, &mut pixels, &mut buffer);
            plane.hull(-X[k], -Y[k], 1, &mut pixels, &mut buffer);
            plane.hull(-X[k], -Y[k], -1, &mut pixels, &mut buffer);
            plane.hull(X[k], Y[k], -1, &mut pixels, &mut buffer);
        }
        progress.row_done();
        Ok(Some(pixels))
    };

    let thread_count = ctx.thread_count(src.width, src.height).min(cn);
    let planes: Vec<Option<Vec<f64>>> = if thread_count <= 1 {
        (0..cn).map(despeckle_channel).collect::<Result<_, _>>()?
    } else {
        let pool = make_rayon_pool(thread_count)?;
        pool.install(|| {
            (0..cn)
                .into_par_iter()
                .map(despeckle_channel)
                .collect::<Result<Vec<_>, _>>()
        })?
    };
    progress.finish()?;

    let dst_stride = dst.row_stride() as usize;
    for (y, row) in dst
        .data
        .borrow_mut()
        .chunks_mut(dst_stride)
        .take(rows)
        .enumerate()
    {
        let src_row = &src_data[y * src_stride..y * src_stride + columns * cn];
        for (x, (dst, src_px)) in row[..columns * cn]
            .chunks_exact_mut(cn)
            .zip(src_row.chunks_exact(cn))
            .enumerate()
        {
            for (c, (dst, &src)) in dst.iter_mut().zip(src_px.iter()).enumerate() {
                *dst = match &planes[c] {
                    Some(values) => T::clamp_from(values[plane.index(x, y)]),
                    None => src,
                };
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ChannelLayout, EdgeMode};

    #[test]
    fn test_flat_image_is_fixed_point() {
        for edge_mode in [EdgeMode::Clamp, EdgeMode::Reflect101, EdgeMode::Wrap] {
            let data = vec![133u8; 3 * 9 * 7];
            let image = ImageStore::borrow(&data, 9, 7, ChannelLayout::Rgb);
            let mut dst = ImageStoreMut::default();
            let ctx = EffectContext::new().with_edge_mode(edge_mode);
            despeckle(&image, &mut dst, &ctx).unwrap();
            assert_eq!(dst.data.borrow(), data.as_slice(), "{edge_mode:?}");
        }
    }

    #[test]
    fn test_speck_is_reduced() {
        let mut data = vec![50u8; 11 * 11];
        data[5 * 11 + 5] = 250;
        let image = ImageStore::borrow(&data, 11, 11, ChannelLayout::Gray);
        let mut dst = ImageStoreMut::default();
        despeckle(&image, &mut dst, &EffectContext::new()).unwrap();
        let out = dst.data.borrow();
        assert!(out[5 * 11 + 5] < 250, "speck {}", out[5 * 11 + 5]);
        assert_eq!(out[0], 50);
    }

    #[test]
    fn test_dark_speck_is_raised() {
        let mut data = vec![5000u16; 9 * 9];
        data[4 * 9 + 4] = 0;
        let image = ImageStore::borrow(&data, 9, 9, ChannelLayout::Gray);
        let mut dst = ImageStoreMut::default();
        despeckle(&image, &mut dst, &EffectContext::new()).unwrap();
        assert!(dst.data.borrow()[4 * 9 + 4] > 0);
    }
}
