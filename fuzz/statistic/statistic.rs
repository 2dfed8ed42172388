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

#![no_main]

use arbitrary::Arbitrary;
use libeffect::{
    statistic, ChannelLayout, EffectContext, ImageStore, ImageStoreMut, StatisticKind,
    ThreadingPolicy,
};
use libfuzzer_sys::fuzz_target;

#[derive(Clone, Debug, Arbitrary)]
pub struct SrcImage {
    pub src_width: u8,
    pub src_height: u8,
    pub kind: u8,
    pub window_width: u8,
    pub window_height: u8,
    pub pixels: Vec<u8>,
    pub threading: bool,
}

fuzz_target!(|data: SrcImage| {
    if data.src_width == 0 || data.src_height == 0 {
        return;
    }
    if data.window_width > 21 || data.window_height > 21 {
        return;
    }
    let kind = match data.kind % 9 {
        0 => StatisticKind::Gradient,
        1 => StatisticKind::Maximum,
        2 => StatisticKind::Mean,
        3 => StatisticKind::Median,
        4 => StatisticKind::Minimum,
        5 => StatisticKind::Mode,
        6 => StatisticKind::Nonpeak,
        7 => StatisticKind::RootMeanSquare,
        _ => StatisticKind::StandardDeviation,
    };
    let policy = if data.threading {
        ThreadingPolicy::Adaptive
    } else {
        ThreadingPolicy::Single
    };
    let width = data.src_width as u32;
    let height = data.src_height as u32;
    let mut src_data = data.pixels.clone();
    src_data.resize(width as usize * height as usize * 3, 0);
    let src = ImageStore::borrow(&src_data, width, height, ChannelLayout::Rgb);
    let mut dst = ImageStoreMut::alloc(width, height, ChannelLayout::Rgb);
    let ctx = EffectContext::new().with_threading_policy(policy);
    statistic(
        &src,
        &mut dst,
        kind,
        data.window_width as usize,
        data.window_height as usize,
        &ctx,
    )
    .unwrap();

    let lowest = src_data.iter().copied().min().unwrap_or(0);
    let highest = src_data.iter().copied().max().unwrap_or(0);
    if matches!(
        kind,
        StatisticKind::Maximum | StatisticKind::Minimum | StatisticKind::Median
    ) {
        for &v in dst.data.borrow().iter() {
            assert!(v >= lowest && v <= highest);
        }
    }
});
