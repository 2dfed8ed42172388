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
use crate::progress::EQUALIZE_TAG;
use crate::quantum::{Quantum, MAX_SHORT};
use crate::row_executor::for_each_row;
use crate::util::try_vec;
use crate::{EffectError, ImageStoreMut, PixelChannel};
use tracing::{debug, trace};

const BINS: usize = 65536;

fn cdf(arr: &mut [u64]) {
    let mut sum: u64 = 0u64;
    for item in arr.iter_mut() {
        sum += *item;
        *item = sum;
    }
}

/// Histogram equalization of every active colour channel, in place.
///
/// Each channel gets its own 16-bit histogram; the cumulative map is stretched
/// between its first and last entries. A channel whose map is flat is kept.
pub fn equalize<T: Quantum>(
    image: &mut ImageStoreMut<T>,
    ctx: &EffectContext,
) -> Result<(), EffectError> {
    image.check_layout(None)?;
    trace!(width = image.width, height = image.height, "equalize");
    let layout = image.layout;
    let cn = layout.channels();
    let width = image.width as usize;
    let height = image.height as usize;
    let stride = image.row_stride() as usize;

    let update: Vec<bool> = image
        .active_channels()
        .iter()
        .enumerate()
        .map(|(c, &active)| active && layout.channel(c) != PixelChannel::Alpha)
        .collect();

    let mut maps: Vec<Option<Vec<T>>> = Vec::with_capacity(cn);
    for (c, &active) in update.iter().enumerate() {
        if !active {
            maps.push(None);
            continue;
        }
        let mut histogram = try_vec(BINS, 0u64, "histogram")?;
        for row in image.data.borrow().chunks(stride).take(height) {
            for px in row[..width * cn].chunks_exact(cn) {
                histogram[px[c].to_short() as usize] += 1;
            }
        }
        cdf(&mut histogram);
        let black = histogram[0];
        let white = histogram[BINS - 1];
        if white == black {
            debug!(channel = c, "flat cumulative histogram, channel kept");
            maps.push(None);
            continue;
        }
        let scale = MAX_SHORT / (white - black) as f64;
        let map = histogram
            .iter()
            .map(|&v| T::from_short(((v - black) as f64 * scale).round().min(MAX_SHORT) as u16))
            .collect::<Vec<T>>();
        maps.push(Some(map));
    }

    let thread_count = ctx.thread_count(image.width, image.height);
    let progress = ctx.row_progress(EQUALIZE_TAG, height as u64);
    for_each_row(
        image.data.borrow_mut(),
        stride,
        height,
        thread_count,
        &progress,
        |_, row| {
            for px in row[..width * cn].chunks_exact_mut(cn) {
                for (v, map) in px.iter_mut().zip(maps.iter()) {
                    if let Some(map) = map {
                        *v = map[v.to_short() as usize];
                    }
                }
            }
        },
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ChannelLayout;

    #[test]
    fn test_equalize_spreads_values() {
        let mut data: Vec<u8> = vec![100, 100, 101, 101, 102, 102, 103, 103];
        let mut image = ImageStoreMut::borrow(&mut data, 8, 1, ChannelLayout::Gray);
        equalize(&mut image, &EffectContext::new()).unwrap();
        let data = image.data.borrow();
        assert_eq!(data[7], 255);
        assert!((data[0] as i32 - 64).abs() <= 1, "first bin {}", data[0]);
        assert!(data[0] < data[2] && data[2] < data[4] && data[4] < data[6]);
    }

    #[test]
    fn test_equalize_flat_image_is_kept() {
        let mut data: Vec<u16> = vec![0; 16];
        let mut image = ImageStoreMut::borrow(&mut data, 4, 4, ChannelLayout::Gray);
        equalize(&mut image, &EffectContext::new()).unwrap();
        assert!(image.data.borrow().iter().all(|&x| x == 0));
    }
}
