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
use crate::geometry::{image_bounding_box, RectangleInfo};
use crate::quantum::Quantum;
use crate::{
    blur, despeckle, median_filter, ChannelLayout, EffectError, ImageStore, ImageStoreMut,
};
use image::{DynamicImage, ImageBuffer, Pixel};

/// A filter that runs on every sample type carried by [DynamicImage].
trait DynamicFilter {
    fn apply<T: Quantum>(
        &self,
        src: &ImageStore<T>,
        dst: &mut ImageStoreMut<T>,
        ctx: &EffectContext,
    ) -> Result<(), EffectError>;
}

struct Blur {
    radius: f64,
    sigma: f64,
}

impl DynamicFilter for Blur {
    fn apply<T: Quantum>(
        &self,
        src: &ImageStore<T>,
        dst: &mut ImageStoreMut<T>,
        ctx: &EffectContext,
    ) -> Result<(), EffectError> {
        blur(src, dst, self.radius, self.sigma, ctx)
    }
}

struct Median {
    radius: f64,
}

impl DynamicFilter for Median {
    fn apply<T: Quantum>(
        &self,
        src: &ImageStore<T>,
        dst: &mut ImageStoreMut<T>,
        ctx: &EffectContext,
    ) -> Result<(), EffectError> {
        median_filter(src, dst, self.radius, ctx)
    }
}

struct Despeckle;

impl DynamicFilter for Despeckle {
    fn apply<T: Quantum>(
        &self,
        src: &ImageStore<T>,
        dst: &mut ImageStoreMut<T>,
        ctx: &EffectContext,
    ) -> Result<(), EffectError> {
        despeckle(src, dst, ctx)
    }
}

fn filter_buffer<P, T>(
    buffer: &ImageBuffer<P, Vec<T>>,
    layout: ChannelLayout,
    filter: &impl DynamicFilter,
    ctx: &EffectContext,
) -> Result<ImageBuffer<P, Vec<T>>, EffectError>
where
    P: Pixel<Subpixel = T>,
    T: Quantum + image::Primitive,
{
    let (width, height) = buffer.dimensions();
    let src = ImageStore::borrow(buffer.as_raw(), width, height, layout);
    let mut dst = ImageStoreMut::alloc(width, height, layout);
    filter.apply(&src, &mut dst, ctx)?;
    ImageBuffer::from_raw(width, height, dst.data.borrow().to_vec())
        .ok_or_else(|| EffectError::InvalidArguments("image buffer size".to_string()))
}

fn filter_dynamic(
    image: &DynamicImage,
    filter: &impl DynamicFilter,
    ctx: &EffectContext,
) -> Result<DynamicImage, EffectError> {
    Ok(match image {
        DynamicImage::ImageLuma8(img) => {
            DynamicImage::ImageLuma8(filter_buffer(img, ChannelLayout::Gray, filter, ctx)?)
        }
        DynamicImage::ImageLumaA8(img) => {
            DynamicImage::ImageLumaA8(filter_buffer(img, ChannelLayout::GrayAlpha, filter, ctx)?)
        }
        DynamicImage::ImageRgb8(img) => {
            DynamicImage::ImageRgb8(filter_buffer(img, ChannelLayout::Rgb, filter, ctx)?)
        }
        DynamicImage::ImageRgba8(img) => {
            DynamicImage::ImageRgba8(filter_buffer(img, ChannelLayout::Rgba, filter, ctx)?)
        }
        DynamicImage::ImageLuma16(img) => {
            DynamicImage::ImageLuma16(filter_buffer(img, ChannelLayout::Gray, filter, ctx)?)
        }
        DynamicImage::ImageLumaA16(img) => {
            DynamicImage::ImageLumaA16(filter_buffer(img, ChannelLayout::GrayAlpha, filter, ctx)?)
        }
        DynamicImage::ImageRgb16(img) => {
            DynamicImage::ImageRgb16(filter_buffer(img, ChannelLayout::Rgb, filter, ctx)?)
        }
        DynamicImage::ImageRgba16(img) => {
            DynamicImage::ImageRgba16(filter_buffer(img, ChannelLayout::Rgba, filter, ctx)?)
        }
        DynamicImage::ImageRgb32F(img) => {
            DynamicImage::ImageRgb32F(filter_buffer(img, ChannelLayout::Rgb, filter, ctx)?)
        }
        DynamicImage::ImageRgba32F(img) => {
            DynamicImage::ImageRgba32F(filter_buffer(img, ChannelLayout::Rgba, filter, ctx)?)
        }
        other => DynamicImage::ImageRgba32F(filter_buffer(
            &other.to_rgba32f(),
            ChannelLayout::Rgba,
            filter,
            ctx,
        )?),
    })
}

/// Gaussian blur of a [DynamicImage], see [crate::blur].
pub fn blur_image(
    image: &DynamicImage,
    radius: f64,
    sigma: f64,
    ctx: &EffectContext,
) -> Result<DynamicImage, EffectError> {
    filter_dynamic(image, &Blur { radius, sigma }, ctx)
}

/// Median filter of a [DynamicImage], see [crate::median_filter].
pub fn median_filter_image(
    image: &DynamicImage,
    radius: f64,
    ctx: &EffectContext,
) -> Result<DynamicImage, EffectError> {
    filter_dynamic(image, &Median { radius }, ctx)
}

pub fn despeckle_image(
    image: &DynamicImage,
    ctx: &EffectContext,
) -> Result<DynamicImage, EffectError> {
    filter_dynamic(image, &Despeckle, ctx)
}

/// Trim box of a [DynamicImage], measured on its 16-bit RGBA form.
pub fn image_bounding_box_dynamic(
    image: &DynamicImage,
    ctx: &EffectContext,
) -> Result<RectangleInfo, EffectError> {
    let rgba = image.to_rgba16();
    let store = ImageStore::borrow(rgba.as_raw(), rgba.width(), rgba.height(), ChannelLayout::Rgba);
    image_bounding_box(&store, ctx)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{GrayImage, Luma};

    #[test]
    fn test_median_keeps_variant() {
        let mut gray = GrayImage::from_pixel(9, 9, Luma([60u8]));
        gray.put_pixel(4, 4, Luma([255u8]));
        let filtered = median_filter_image(
            &DynamicImage::ImageLuma8(gray),
            1.0,
            &EffectContext::new(),
        )
        .unwrap();
        let out = filtered.as_luma8().unwrap();
        assert_eq!(out.get_pixel(4, 4)[0], 60);
    }

    #[test]
    fn test_bounding_box_of_dynamic_image() {
        let mut gray = GrayImage::from_pixel(10, 10, Luma([0u8]));
        gray.put_pixel(3, 6, Luma([255u8]));
        let bounds =
            image_bounding_box_dynamic(&DynamicImage::ImageLuma8(gray), &EffectContext::new())
                .unwrap();
        assert_eq!(
            bounds,
            RectangleInfo {
                x: 3,
                y: 6,
                width: 1,
                height: 1
            }
        );
    }
}
