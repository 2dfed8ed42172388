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

use crate::channels_configuration::{ChannelLayout, ChannelMask};
use crate::quantum::Quantum;
use crate::util::check_slice_size;
use crate::EffectError;
use std::borrow::Cow;
use std::fmt::Debug;

#[derive(Debug)]
pub enum BufferStore<'a, T: Copy + Debug> {
    Borrowed(&'a mut [T]),
    Owned(Vec<T>),
}

impl<T: Copy + Debug> BufferStore<'_, T> {
    #[allow(clippy::should_implement_trait)]
    pub fn borrow(&self) -> &[T] {
        match self {
            Self::Borrowed(p_ref) => p_ref,
            Self::Owned(vec) => vec,
        }
    }

    #[allow(clippy::should_implement_trait)]
    pub fn borrow_mut(&mut self) -> &mut [T] {
        match self {
            Self::Borrowed(p_ref) => p_ref,
            Self::Owned(vec) => vec,
        }
    }

    pub(crate) fn resize(&mut self, new_size: usize, value: T) {
        match self {
            Self::Borrowed(_) => {}
            Self::Owned(vec) => vec.resize(new_size, value),
        }
    }
}

/// Immutable image store
pub struct ImageStore<'a, T: Quantum> {
    pub data: Cow<'a, [T]>,
    pub width: u32,
    pub height: u32,
    /// Image stride, items per row, might be 0
    pub stride: u32,
    pub layout: ChannelLayout,
    /// Channels updated by filters reading this image
    pub mask: ChannelMask,
}

/// Mutable image store
/// If it owns vector it does auto resizing on methods that working out-of-place.
pub struct ImageStoreMut<'a, T: Quantum> {
    pub data: BufferStore<'a, T>,
    pub width: u32,
    pub height: u32,
    /// Image stride, items per row, might be 0
    pub stride: u32,
    pub layout: ChannelLayout,
    pub mask: ChannelMask,
}

impl<T: Quantum> Default for ImageStoreMut<'_, T> {
    fn default() -> Self {
        ImageStoreMut {
            data: BufferStore::Owned(Vec::new()),
            width: 0,
            height: 0,
            stride: 0,
            layout: ChannelLayout::Gray,
            mask: ChannelMask::ALL,
        }
    }
}

/// Per interleaved position, whether `mask` lets a filter write it.
pub(crate) fn active_channels(layout: ChannelLayout, mask: ChannelMask) -> Vec<bool> {
    (0..layout.channels())
        .map(|i| mask.contains(layout.channel(i)))
        .collect()
}

impl<'a, T: Quantum> ImageStore<'a, T> {
    /// Allocates default image layout for given [ChannelLayout]
    pub fn alloc(width: u32, height: u32, layout: ChannelLayout) -> Self {
        Self {
            data: Cow::Owned(vec![
                T::default();
                width as usize * height as usize * layout.channels()
            ]),
            width,
            height,
            stride: width * layout.channels() as u32,
            layout,
            mask: ChannelMask::ALL,
        }
    }

    /// Borrows existing data
    /// Stride will be default `width * layout.channels()`
    pub fn borrow(arr: &'a [T], width: u32, height: u32, layout: ChannelLayout) -> Self {
        Self {
            data: Cow::Borrowed(arr),
            width,
            height,
            stride: width * layout.channels() as u32,
            layout,
            mask: ChannelMask::ALL,
        }
    }

    pub fn with_mask(mut self, mask: ChannelMask) -> Self {
        self.mask = mask;
        self
    }

    /// Deep copy immutable image to mutable
    pub fn copy_to_mut(&self, dst: &mut ImageStoreMut<T>) -> Result<(), EffectError> {
        self.check_layout()?;
        dst.check_layout(Some(self))?;
        self.size_matches_mut(dst)?;
        let src_stride = self.row_stride() as usize;
        let dst_stride = dst.row_stride() as usize;
        let row_length = self.width as usize * self.layout.channels();
        for (src, dst) in self
            .data
            .as_ref()
            .chunks(src_stride)
            .zip(dst.data.borrow_mut().chunks_mut(dst_stride))
        {
            dst[..row_length].copy_from_slice(&src[..row_length]);
        }
        Ok(())
    }

    /// Checks if it is matches the size of the other image
    #[inline]
    pub fn size_matches(&self, other: &ImageStore<'_, T>) -> Result<(), EffectError> {
        if self.width == other.width && self.height == other.height && self.layout == other.layout
        {
            return Ok(());
        }
        Err(EffectError::ImagesMustMatch)
    }

    /// Checks if it is matches the size of the other image
    #[inline]
    pub fn size_matches_mut(&self, other: &ImageStoreMut<'_, T>) -> Result<(), EffectError> {
        if self.width == other.width && self.height == other.height && self.layout == other.layout
        {
            return Ok(());
        }
        Err(EffectError::ImagesMustMatch)
    }

    /// Returns row stride
    #[inline]
    pub fn row_stride(&self) -> u32 {
        if self.stride == 0 {
            self.width * self.layout.channels() as u32
        } else {
            self.stride
        }
    }

    #[inline]
    pub fn check_layout(&self) -> Result<(), EffectError> {
        check_slice_size(
            self.data.as_ref(),
            self.row_stride() as usize,
            self.width as usize,
            self.height as usize,
            self.layout.channels(),
        )
    }

    /// Interleaved samples of a pixel inside the image.
    #[inline]
    pub fn pixel(&self, x: usize, y: usize) -> &[T] {
        let cn = self.layout.channels();
        let start = y * self.row_stride() as usize + x * cn;
        &self.data[start..start + cn]
    }

    /// Rec.709 intensity of the pixel in channel range units.
    #[inline]
    pub fn intensity(&self, x: usize, y: usize) -> f64 {
        pixel_intensity(self.layout, self.pixel(x, y))
    }

    #[inline]
    pub(crate) fn active_channels(&self) -> Vec<bool> {
        active_channels(self.layout, self.mask)
    }

    /// Deep clone as mutable image
    pub fn clone_as_mut<'f>(&self) -> ImageStoreMut<'f, T> {
        ImageStoreMut {
            data: BufferStore::Owned(self.data.to_vec()),
            width: self.width,
            height: self.height,
            stride: self.row_stride(),
            layout: self.layout,
            mask: self.mask,
        }
    }
}

#[inline]
pub(crate) fn pixel_intensity<T: Quantum>(layout: ChannelLayout, pixel: &[T]) -> f64 {
    if layout.is_gray() {
        return pixel[0].to_f64();
    }
    0.212656 * pixel[0].to_f64() + 0.715158 * pixel[1].to_f64() + 0.072186 * pixel[2].to_f64()
}

impl<'a, T: Quantum> ImageStoreMut<'a, T> {
    /// Allocates default image layout for given [ChannelLayout]
    pub fn alloc(width: u32, height: u32, layout: ChannelLayout) -> Self {
        Self {
            data: BufferStore::Owned(vec![
                T::default();
                width as usize * height as usize * layout.channels()
            ]),
            width,
            height,
            stride: width * layout.channels() as u32,
            layout,
            mask: ChannelMask::ALL,
        }
    }

    /// Mutable borrows existing data
    /// Stride will be default `width * layout.channels()`
    pub fn borrow(arr: &'a mut [T], width: u32, height: u32, layout: ChannelLayout) -> Self {
        Self {
            data: BufferStore::Borrowed(arr),
            width,
            height,
            stride: width * layout.channels() as u32,
            layout,
            mask: ChannelMask::ALL,
        }
    }

    pub fn with_mask(mut self, mask: ChannelMask) -> Self {
        self.mask = mask;
        self
    }

    /// Returns row stride
    #[inline]
    pub fn row_stride(&self) -> u32 {
        if self.stride == 0 {
            self.width * self.layout.channels() as u32
        } else {
            self.stride
        }
    }

    /// Checks if layout matches necessary requirements.
    /// Owned storage is resized to `other` instead.
    #[inline]
    pub fn check_layout(&mut self, other: Option<&ImageStore<'_, T>>) -> Result<(), EffectError> {
        if let Some(other) = other {
            if matches!(self.data, BufferStore::Owned(_)) {
                self.resize(other.width, other.height, other.layout);
                self.mask = other.mask;
                return Ok(());
            }
        }
        check_slice_size(
            self.data.borrow(),
            self.row_stride() as usize,
            self.width as usize,
            self.height as usize,
            self.layout.channels(),
        )
    }

    /// Checks if it is matches the size of the other image
    #[inline]
    pub fn size_matches(&self, other: &ImageStore<'_, T>) -> Result<(), EffectError> {
        if self.width == other.width && self.height == other.height && self.layout == other.layout
        {
            return Ok(());
        }
        Err(EffectError::ImagesMustMatch)
    }

    #[inline]
    pub fn to_immutable_ref(&self) -> ImageStore<'_, T> {
        ImageStore {
            data: Cow::Borrowed(self.data.borrow()),
            stride: self.row_stride(),
            width: self.width,
            height: self.height,
            layout: self.layout,
            mask: self.mask,
        }
    }

    #[inline]
    pub fn pixel(&self, x: usize, y: usize) -> &[T] {
        let cn = self.layout.channels();
        let start = y * self.row_stride() as usize + x * cn;
        &self.data.borrow()[start..start + cn]
    }

    #[inline]
    pub(crate) fn active_channels(&self) -> Vec<bool> {
        active_channels(self.layout, self.mask)
    }

    pub fn resize(&mut self, width: u32, height: u32, layout: ChannelLayout) {
        self.height = height;
        self.width = width;
        self.layout = layout;
        self.stride = self.width * self.layout.channels() as u32;
        self.data.resize(
            self.row_stride() as usize * self.height as usize,
            T::default(),
        );
    }
}
