// Copyright (c) Radzivon Bartoshyk. All rights reserved.

//
// Redistribution and use in source and binary forms, with or without modification,
// are permitted provided that the following conditions are met:
//
// 1.  Redistributions of source code must retain the above copyright notice, this
// list of conditions and the following disclaimer.
//
// 2.  Redistributions in binary form must reproduce the above copyright notice,
// this list of conditions and the following disclaimer in the documentation
// and/or other materials provided with the distribution.
//
// 3.  Neither the name of the copyright holder nor the names of its
// contributors may be used to endorse or promote products derived from
// this software without specific prior written permission.
//
// THIS SOFTWARE IS PROVIDED BY THE COPYRIGHT HOLDERS AND CONTRIBUTORS "AS IS"
// AND ANY EXPRESS OR IMPLIED WARRANTIES, INCLUDING, BUT NOT LIMITED TO, THE
// IMPLIED WARRANTIES OF MERCHANTABILITY AND FITNESS FOR A PARTICULAR PURPOSE ARE
// DISCLAIMED. IN NO EVENT SHALL THE COPYRIGHT HOLDER OR CONTRIBUTORS BE LIABLE
// FOR ANY DIRECT, INDIRECT, INCIDENTAL, SPECIAL, EXEMPLARY, OR CONSEQUENTIAL
// DAMAGES (INCLUDING, BUT NOT LIMITED TO, PROCUREMENT OF SUBSTITUTE GOODS OR
// SERVICES; LOSS OF USE, DATA, OR PROFITS; OR BUSINESS INTERRUPTION) HOWEVER
// CAUSED AND ON ANY THEORY OF LIABILITY, WHETHER IN CONTRACT, STRICT LIABILITY,
// OR TORT (INCLUDING NEGLIGENCE OR OTHERWISE) ARISING IN ANY WAY OUT OF THE USE
// OF THIS SOFTWARE, EVEN IF ADVISED OF THE POSSIBILITY OF SUCH DAMAGE.
#![allow(clippy::too_many_arguments)]
#![cfg_attr(docsrs, feature(doc_cfg))]
//! Neighborhood filters for interleaved raster images.
//!
//! Every operation works on an [ImageStore] of any [Quantum] sample type,
//! writes only the channels selected by its [ChannelMask], and takes an
//! [EffectContext] with the threading policy, the virtual pixel [EdgeMode]
//! and an optional [ProgressMonitor].
//!
//! The crate covers:
//! - convolution with caller or generated kernels, see [convolve()];
//! - blur, sharpen and edge derived filters, see [blur], [sharpen], [edge];
//! - order statistic windows, see [statistic()] and [PixelList];
//! - global, adaptive, random and ordered dither thresholds;
//! - despeckle;
//! - trim bounding box, convex hull and minimum area rectangle analysis.

mod arena;
mod channels_configuration;
mod context;
mod convolve;
mod edge_mode;
#[cfg(feature = "image")]
#[cfg_attr(docsrs, doc(cfg(feature = "image")))]
mod effect_image;
mod effects;
mod geometry;
mod image_store;
mod kernel;
mod pixel_view;
mod progress;
mod quantum;
mod row_executor;
mod statistic;
mod threading_policy;
mod threshold;
mod util;

pub use arena::{make_arena, Arena, ArenaPads};
pub use channels_configuration::{ChannelLayout, ChannelMask, PixelChannel};
pub use context::{EffectContext, EffectOptions};
pub use convolve::{convolve, convolve_separable};
pub use edge_mode::{EdgeMode, Scalar};
#[cfg(feature = "image")]
#[cfg_attr(docsrs, doc(cfg(feature = "image")))]
pub use effect_image::{
    blur_image, despeckle_image, image_bounding_box_dynamic, median_filter_image,
};
pub use effects::{
    adaptive_blur, adaptive_sharpen, blur, despeckle, edge, emboss, equalize, gaussian_blur,
    kuwahara, level, local_contrast, motion_blur, rotational_blur, selective_blur, shade, sharpen,
    spread, unsharp_mask,
};
pub use geometry::{
    calipers, convex_hull, image_bounding_box, minimum_bounding_box, monotone_chain,
    MinimumBoundingBox, PointInfo, RectangleInfo,
};
pub use image_store::{BufferStore, ImageStore, ImageStoreMut};
pub use kernel::{
    blur_family, edge_kernel, emboss_kernel, gaussian_kernel_1d, gaussian_kernel_2d, log_kernel,
    motion_kernel, optimal_kernel_width_1d, optimal_kernel_width_2d, sharpen_family,
    sharpen_kernel, Kernel, KernelFamily, KernelShape,
};
pub use pixel_view::VirtualView;
pub use progress::*;
pub use quantum::{perceptible_reciprocal, Quantum, MAGICK_EPSILON, MAX_SHORT};
pub use statistic::{median_filter, statistic, PixelList, StatisticKind};
pub use threading_policy::ThreadingPolicy;
pub use threshold::{
    adaptive_threshold, bilevel_threshold, black_threshold, clamp_image, ordered_posterize,
    perceptible, random_threshold, white_threshold, ChannelThresholds, ThresholdMap,
    ThresholdMapRegistry, ThresholdRange,
};
pub use util::{EffectError, EffectResult, MismatchedSize};
