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

use crate::arena::background_pixel;
use crate::quantum::Quantum;
use crate::{EdgeMode, ImageStore, Scalar};

/// Single pixel reads at arbitrary, possibly out of bounds, coordinates.
pub struct VirtualView<'a, T: Quantum> {
    image: &'a ImageStore<'a, T>,
    edge_mode: EdgeMode,
    background: Vec<T>,
    stride: usize,
    cn: usize,
}

impl<'a, T: Quantum> VirtualView<'a, T> {
    pub fn new(image: &'a ImageStore<'a, T>, edge_mode: EdgeMode, background: Scalar) -> Self {
        let cn = image.layout.channels();
        VirtualView {
            image,
            edge_mode,
            background: background_pixel(background, cn),
            stride: image.row_stride() as usize,
            cn,
        }
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.image.width as usize
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.image.height as usize
    }

    #[inline]
    pub fn pixel(&self, x: isize, y: isize) -> &[T] {
        match (
            self.edge_mode.resolve(x, self.width()),
            self.edge_mode.resolve(y, self.height()),
        ) {
            (Some(x), Some(y)) => {
                let start = y * self.stride + x * self.cn;
                &self.image.data[start..start + self.cn]
            }
            _ => &self.background,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ChannelLayout;

    #[test]
    fn test_virtual_reads() {
        let data: Vec<u8> = vec![1, 2, 3, 4, 5, 6];
        let image = ImageStore::borrow(&data, 2, 1, ChannelLayout::Rgb);
        let view = VirtualView::new(&image, EdgeMode::Clamp, Scalar::default());
        assert_eq!(view.pixel(-3, 0), &[1, 2, 3]);
        assert_eq!(view.pixel(5, 9), &[4, 5, 6]);
        let view = VirtualView::new(&image, EdgeMode::Constant, Scalar::dup(9.));
        assert_eq!(view.pixel(-1, 0), &[9, 9, 9]);
        assert_eq!(view.pixel(1, 0), &[4, 5, 6]);
    }
}
