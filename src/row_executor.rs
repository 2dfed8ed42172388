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

use crate::progress::RowProgress;
use crate::threading_policy::make_rayon_pool;
use crate::EffectError;
use rayon::iter::{IndexedParallelIterator, ParallelIterator};
use rayon::prelude::ParallelSliceMut;

/// Runs `op(scratch, y, row)` over the first `height` rows of `data`.
///
/// One worker runs on the calling thread, more workers run on a scoped rayon
/// pool where every worker builds its own scratch with `init`. Rows starting
/// after a cancellation are skipped.
pub(crate) fn for_each_row_init<T, S, I, F>(
    data: &mut [T],
    stride: usize,
    height: usize,
    thread_count: usize,
    progress: &RowProgress,
    init: I,
    op: F,
) -> Result<(), EffectError>
where
    T: Send,
    I: Fn() -> S + Send + Sync,
    F: Fn(&mut S, usize, &mut [T]) + Send + Sync,
{
    let run = |scratch: &mut S, (y, row): (usize, &mut [T])| {
        if progress.is_cancelled() {
            return;
        }
        op(scratch, y, row);
        progress.row_done();
    };
    if thread_count <= 1 {
        let mut scratch = init();
        data.chunks_mut(stride)
            .take(height)
            .enumerate()
            .for_each(|row| run(&mut scratch, row));
    } else {
        let pool = make_rayon_pool(thread_count)?;
        pool.install(|| {
            data.par_chunks_mut(stride)
                .take(height)
                .enumerate()
                .for_each_init(&init, run);
        });
    }
    progress.finish()
}

pub(crate) fn for_each_row<T, F>(
    data: &mut [T],
    stride: usize,
    height: usize,
    thread_count: usize,
    progress: &RowProgress,
    op: F,
) -> Result<(), EffectError>
where
    T: Send,
    F: Fn(usize, &mut [T]) + Send + Sync,
{
    for_each_row_init(data, stride, height, thread_count, progress, || (), |_, y, row| {
        op(y, row)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rows_are_visited_once() {
        for threads in [1usize, 3] {
            let mut data = vec![0u32; 7 * 11];
            let progress = RowProgress::new("test", 11, None);
            for_each_row(&mut data, 7, 11, threads, &progress, |y, row| {
                row.iter_mut().for_each(|x| *x += y as u32 + 1);
            })
            .unwrap();
            for (y, row) in data.chunks_exact(7).enumerate() {
                assert!(row.iter().all(|&x| x == y as u32 + 1), "row {y} with {threads} threads");
            }
        }
    }

    #[test]
    fn test_scratch_is_per_worker() {
        let mut data = vec![0usize; 4 * 16];
        let progress = RowProgress::new("test", 16, None);
        for_each_row_init(
            &mut data,
            4,
            16,
            2,
            &progress,
            || vec![0usize; 4],
            |scratch, y, row| {
                scratch.iter_mut().for_each(|x| *x = y);
                row.copy_from_slice(scratch);
            },
        )
        .unwrap();
        for (y, row) in data.chunks_exact(4).enumerate() {
            assert!(row.iter().all(|&x| x == y));
        }
    }
}
