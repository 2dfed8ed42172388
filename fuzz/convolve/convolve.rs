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
    convolve, ChannelLayout, EdgeMode, EffectContext, ImageStore, ImageStoreMut, Kernel,
    ThreadingPolicy,
};
use libfuzzer_sys::fuzz_target;

#[derive(Clone, Debug, Arbitrary)]
pub struct SrcImage {
    pub src_width: u16,
    pub src_height: u16,
    pub edge_mode: u8,
    pub layout: u8,
    pub kernel_width: u8,
    pub kernel_height: u8,
    pub weights: Vec<f32>,
    pub threading: bool,
}

fuzz_target!(|data: SrcImage| {
    if data.src_width > 250 || data.src_height > 250 || data.src_width == 0 || data.src_height == 0
    {
        return;
    }
    if data.kernel_width > 15 || data.kernel_height > 15 {
        return;
    }
    let edge_mode = match data.edge_mode % 5 {
        0 => EdgeMode::Clamp,
        1 => EdgeMode::Wrap,
        2 => EdgeMode::Reflect,
        3 => EdgeMode::Reflect101,
        _ => EdgeMode::Constant,
    };
    let layout = match data.layout % 4 {
        0 => ChannelLayout::Rgba,
        1 => ChannelLayout::Rgb,
        2 => ChannelLayout::GrayAlpha,
        _ => ChannelLayout::Gray,
    };
    let policy = if data.threading {
        ThreadingPolicy::Adaptive
    } else {
        ThreadingPolicy::Single
    };
    let kw = data.kernel_width as usize;
    let kh = data.kernel_height as usize;
    let mut values: Vec<f64> = data
        .weights
        .iter()
        .map(|&x| if x.is_finite() { x as f64 } else { 0.0 })
        .collect();
    values.resize(kw * kh, 1.0);
    // even sized kernels are rejected, anything else must succeed
    let kernel = match Kernel::new(kw, kh, values) {
        Ok(kernel) => kernel,
        Err(_) => return,
    };

    let ctx = EffectContext::new()
        .with_edge_mode(edge_mode)
        .with_threading_policy(policy);
    let width = data.src_width as u32;
    let height = data.src_height as u32;
    let src_data = vec![127u8; width as usize * height as usize * layout.channels()];
    let src = ImageStore::borrow(&src_data, width, height, layout);
    let mut dst = ImageStoreMut::alloc(width, height, layout);
    convolve(&src, &mut dst, &kernel, &ctx).unwrap();

    let src_data16 = vec![40000u16; width as usize * height as usize * layout.channels()];
    let src16 = ImageStore::borrow(&src_data16, width, height, layout);
    let mut dst16 = ImageStoreMut::alloc(width, height, layout);
    convolve(&src16, &mut dst16, &kernel, &ctx).unwrap();
});
