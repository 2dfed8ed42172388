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

use crate::quantum::Quantum;
use crate::util::try_vec;
use crate::{EdgeMode, EffectError, ImageStore, Scalar};

/// Geometry of a padded copy of an image.
#[derive(Copy, Clone, Debug)]
pub struct Arena {
    pub width: usize,
    pub height: usize,
    pub pad_w: usize,
    pub pad_h: usize,
    pub components: usize,
}

impl Arena {
    #[inline]
    pub fn stride(&self) -> usize {
        self.width * self.components
    }
}

#[derive(Copy, Clone, Debug)]
pub struct ArenaPads {
    pub pad_left: usize,
    pub pad_top: usize,
    pub pad_right: usize,
    pub pad_bottom: usize,
}

impl ArenaPads {
    pub fn constant(v: usize) -> ArenaPads {
        ArenaPads::new(v, v, v, v)
    }

    pub fn new(pad_left: usize, pad_top: usize, pad_right: usize, pad_bottom: usize) -> ArenaPads {
        ArenaPads {
            pad_left,
            pad_top,
            pad_right,
            pad_bottom,
        }
    }

    /// Pads for a `width`×`height` window with its origin at the center.
    pub fn from_window(width: usize, height: usize) -> ArenaPads {
        let pad_w = width / 2;
        let pad_h = height / 2;
        ArenaPads::new(pad_w, pad_h, pad_w, pad_h)
    }
}

/// Background expressed in the sample type, one entry per channel.
pub(crate) fn background_pixel<T: Quantum>(scalar: Scalar, cn: usize) -> Vec<T> {
    (0..cn).map(|c| T::clamp_from(scalar[c])).collect()
}

/// Pads an image with chosen border strategy
pub fn make_arena<T: Quantum>(
    image: &ImageStore<T>,
    pads: ArenaPads,
    border_mode: EdgeMode,
    scalar: Scalar,
) -> Result<(Vec<T>, Arena), EffectError> {
    image.check_layout()?;
    let cn = image.layout.channels();
    let width = image.width as usize;
    let height = image.height as usize;
    let old_stride = image.row_stride() as usize;

    let new_height = height + pads.pad_top + pads.pad_bottom;
    let new_width = width + pads.pad_left + pads.pad_right;
    let new_stride = new_width * cn;

    let mut padded_image = try_vec(new_height * new_stride, T::default(), "arena")?;

    for (src, dst) in image.data.as_ref().chunks(old_stride).take(height).zip(
        padded_image
            .chunks_exact_mut(new_stride)
            .skip(pads.pad_top),
    ) {
        let offset = pads.pad_left * cn;
        dst[offset..offset + width * cn].copy_from_slice(&src[..width * cn]);
    }

    let filling_ranges = [
        (0..pads.pad_top, 0..new_width), // Top outer
        (
            pads.pad_top..(new_height - pads.pad_bottom),
            0..pads.pad_left,
        ), // Left outer
        ((height + pads.pad_top)..new_height, 0..new_width), // Bottom outer
        (
            pads.pad_top..(new_height - pads.pad_bottom),
            (width + pads.pad_left)..new_width,
        ), // Right outer
    ];

    let background = background_pixel::<T>(scalar, cn);

    for ranges in filling_ranges.iter() {
        for (i, dst) in ranges.0.clone().zip(
            padded_image
                .chunks_exact_mut(new_stride)
                .skip(ranges.0.start),
        ) {
            let y = border_mode.resolve(i as isize - pads.pad_top as isize, height);
            for (j, dst) in ranges
                .1
                .clone()
                .zip(dst.chunks_exact_mut(cn).skip(ranges.1.start))
            {
                let x = border_mode.resolve(j as isize - pads.pad_left as isize, width);
                match (x, y) {
                    (Some(x), Some(y)) => {
                        let v_src = y * old_stride + x * cn;
                        dst.copy_from_slice(&image.data[v_src..(v_src + cn)]);
                    }
                    _ => dst.copy_from_slice(&background),
                }
            }
        }
    }

    Ok((
        padded_image,
        Arena {
            width: new_width,
            height: new_height,
            pad_w: pads.pad_left,
            pad_h: pads.pad_top,
            components: cn,
        },
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ChannelLayout;

    #[test]
    fn test_arena_clamp_and_constant() {
        let data: Vec<u8> = (0..9).map(|x| x as u8 * 10).collect();
        let image = ImageStore::borrow(&data, 3, 3, ChannelLayout::Gray);
        let (arena, info) =
            make_arena(&image, ArenaPads::constant(1), EdgeMode::Clamp, Scalar::default())
                .unwrap();
        assert_eq!(info.width, 5);
        assert_eq!(info.height, 5);
        assert_eq!(arena[0], 0);
        assert_eq!(arena[4], 20);
        assert_eq!(arena[24], 80);
        assert_eq!(arena[6], 0);
        assert_eq!(arena[12], 40);

        let (arena, _) = make_arena(
            &image,
            ArenaPads::constant(1),
            EdgeMode::Constant,
            Scalar::dup(7.),
        )
        .unwrap();
        assert_eq!(arena[0], 7);
        assert_eq!(arena[5], 7);
        assert_eq!(arena[6], 0);
        assert_eq!(arena[18], 80);
    }

    #[test]
    fn test_arena_wrap() {
        let data: Vec<u8> = vec![1, 2, 3, 4];
        let image = ImageStore::borrow(&data, 4, 1, ChannelLayout::Gray);
        let (arena, info) =
            make_arena(&image, ArenaPads::new(2, 0, 2, 0), EdgeMode::Wrap, Scalar::default())
                .unwrap();
        assert_eq!(info.width, 8);
        assert_eq!(arena, vec![3, 4, 1, 2, 3, 4, 1, 2]);
    }
}
