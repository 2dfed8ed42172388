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
    calipers, image_bounding_box, minimum_bounding_box, monotone_chain, ChannelLayout,
    EffectContext, ImageStore, PointInfo,
};
use libfuzzer_sys::fuzz_target;

#[derive(Clone, Debug, Arbitrary)]
pub struct Shapes {
    pub points: Vec<(i16, i16)>,
    pub src_width: u8,
    pub src_height: u8,
    pub pixels: Vec<u8>,
}

fuzz_target!(|data: Shapes| {
    let points: Vec<PointInfo> = data
        .points
        .iter()
        .map(|&(x, y)| PointInfo::new(x as f64, y as f64))
        .collect();
    let hull = monotone_chain(&points);
    assert!(hull.len() <= points.len());
    let found = calipers(hull);
    assert!(found.area >= 0.0);

    if data.src_width == 0 || data.src_height == 0 {
        return;
    }
    let width = data.src_width as u32;
    let height = data.src_height as u32;
    let mut src_data = data.pixels.clone();
    src_data.resize(width as usize * height as usize, 0);
    let image = ImageStore::borrow(&src_data, width, height, ChannelLayout::Gray);
    let ctx = EffectContext::new();
    let bounds = image_bounding_box(&image, &ctx).unwrap();
    assert!(bounds.is_empty() || bounds.x + bounds.width <= width as usize);
    assert!(bounds.is_empty() || bounds.y + bounds.height <= height as usize);
    minimum_bounding_box(&image, &ctx).unwrap();
});
