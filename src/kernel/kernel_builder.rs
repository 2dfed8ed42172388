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

use crate::quantum::MAGICK_EPSILON;
use crate::util::{try_vec, MismatchedSize};
use crate::EffectError;
use std::f64::consts::PI;

const SQRT_2PI: f64 = 2.506_628_274_631_000_5;

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct KernelShape {
    pub width: usize,
    pub height: usize,
}

impl KernelShape {
    pub fn new(width: usize, height: usize) -> KernelShape {
        KernelShape { width, height }
    }
}

/// Nonzero kernel tap relative to the kernel origin.
#[derive(Copy, Clone, Debug, PartialEq)]
pub(crate) struct ScanPoint {
    pub(crate) x: isize,
    pub(crate) y: isize,
    pub(crate) weight: f64,
}

/// Odd sized, row major convolution kernel with its origin at the center.
#[derive(Clone, Debug, PartialEq)]
pub struct Kernel {
    pub width: usize,
    pub height: usize,
    pub values: Vec<f64>,
}

impl Kernel {
    pub fn new(width: usize, height: usize, values: Vec<f64>) -> Result<Kernel, EffectError> {
        if width % 2 == 0 {
            return Err(EffectError::KernelWidthMustBeOdd(width));
        }
        if height % 2 == 0 {
            return Err(EffectError::KernelWidthMustBeOdd(height));
        }
        if values.len() != width * height {
            return Err(EffectError::KernelSizeMismatch(MismatchedSize {
                expected: width * height,
                received: values.len(),
            }));
        }
        Ok(Kernel {
            width,
            height,
            values,
        })
    }

    pub fn identity() -> Kernel {
        Kernel {
            width: 1,
            height: 1,
            values: vec![1.0],
        }
    }

    #[inline]
    pub fn shape(&self) -> KernelShape {
        KernelShape::new(self.width, self.height)
    }

    #[inline]
    pub fn sum(&self) -> f64 {
        self.values.iter().sum()
    }

    /// Scales the kernel so its weights add up to one.
    /// Zero sum kernels are left as they are.
    pub fn normalize(&mut self) {
        let sum = self.sum();
        if sum.abs() > MAGICK_EPSILON {
            let scale = 1.0 / sum;
            self.values.iter_mut().for_each(|x| *x *= scale);
        }
    }

    /// Kernel rotated by 180 degrees, turning correlation into convolution.
    pub fn reflected(&self) -> Kernel {
        let mut values = self.values.clone();
        values.reverse();
        Kernel {
            width: self.width,
            height: self.height,
            values,
        }
    }

    pub(crate) fn scan_points(&self) -> Vec<ScanPoint> {
        let anchor_x = (self.width / 2) as isize;
        let anchor_y = (self.height / 2) as isize;
        let mut points = Vec::new();
        for (y, row) in self.values.chunks_exact(self.width).enumerate() {
            for (x, &weight) in row.iter().enumerate() {
                if weight != 0.0 {
                    points.push(ScanPoint {
                        x: x as isize - anchor_x,
                        y: y as isize - anchor_y,
                        weight,
                    });
                }
            }
        }
        points
    }
}

fn check_odd(width: usize) -> Result<(), EffectError> {
    if width % 2 == 0 {
        return Err(EffectError::KernelWidthMustBeOdd(width));
    }
    Ok(())
}

#[inline]
fn effective_sigma(sigma: f64) -> f64 {
    if sigma.abs() <= MAGICK_EPSILON {
        1.0
    } else {
        sigma
    }
}

/// Fills a square kernel with the 2D Gaussian `exp(-(u²+v²)/2σ²)/2πσ²`.
fn gaussian_square(width: usize, sigma: f64, sign: f64) -> Result<Vec<f64>, EffectError> {
    check_odd(width)?;
    let sigma = effective_sigma(sigma);
    let mut values = try_vec(width * width, 0f64, "kernel")?;
    let j = (width / 2) as isize;
    let scale = sign / (2.0 * PI * sigma * sigma);
    for (v, row) in (-j..=j).zip(values.chunks_exact_mut(width)) {
        for (u, dst) in (-j..=j).zip(row.iter_mut()) {
            *dst = scale * (-((u * u + v * v) as f64) / (2.0 * sigma * sigma)).exp();
        }
    }
    Ok(values)
}

/// Separable Gaussian row, sum-normalized to 1.
pub fn gaussian_kernel_1d(width: usize, sigma: f64) -> Result<Kernel, EffectError> {
    check_odd(width)?;
    let sigma = effective_sigma(sigma);
    let mut values = try_vec(width, 0f64, "kernel")?;
    let j = (width / 2) as isize;
    for (k, dst) in (-j..=j).zip(values.iter_mut()) {
        *dst = (-((k * k) as f64) / (2.0 * sigma * sigma)).exp() / (SQRT_2PI * sigma);
    }
    let mut kernel = Kernel::new(width, 1, values)?;
    kernel.normalize();
    Ok(kernel)
}

/// Full square Gaussian, sum-normalized to 1.
pub fn gaussian_kernel_2d(width: usize, sigma: f64) -> Result<Kernel, EffectError> {
    let mut kernel = Kernel::new(width, width, gaussian_square(width, sigma, 1.0)?)?;
    kernel.normalize();
    Ok(kernel)
}

/// Negative Gaussian whose center carries twice the magnitude of the whole
/// kernel, rescaled to a unity sum.
pub fn sharpen_kernel(width: usize, sigma: f64) -> Result<Kernel, EffectError> {
    let mut values = gaussian_square(width, sigma, -1.0)?;
    let normalize: f64 = values.iter().sum();
    values[width * width / 2] = -2.0 * normalize;
    let mut kernel = Kernel::new(width, width, values)?;
    kernel.normalize();
    Ok(kernel)
}

/// Discrete Laplacian: every tap `-1`, center `width²-1`.
pub fn edge_kernel(width: usize) -> Result<Kernel, EffectError> {
    check_odd(width)?;
    let mut values = try_vec(width * width, -1f64, "kernel")?;
    values[width * width / 2] = (width * width) as f64 - 1.0;
    Kernel::new(width, width, values)
}

/// Directional kernel with `±8×Gaussian` on the anti-diagonal only.
pub fn emboss_kernel(width: usize, sigma: f64) -> Result<Kernel, EffectError> {
    let mut values = gaussian_square(width, sigma, 8.0)?;
    let j = (width / 2) as isize;
    let mut k = j;
    for (v, row) in (-j..=j).zip(values.chunks_exact_mut(width)) {
        for (u, dst) in (-j..=j).zip(row.iter_mut()) {
            if u != k {
                *dst = 0.0;
            } else if u < 0 || v < 0 {
                *dst = -*dst;
            }
        }
        k -= 1;
    }
    let mut kernel = Kernel::new(width, width, values)?;
    kernel.normalize();
    Ok(kernel)
}

/// One sided Gaussian tail `exp(-i²/2σ²)` for `i` in `0..width`, normalized.
pub fn motion_kernel(width: usize, sigma: f64) -> Result<Vec<f64>, EffectError> {
    let sigma = effective_sigma(sigma);
    let mut values = try_vec(width.max(1), 0f64, "kernel")?;
    for (i, dst) in values.iter_mut().enumerate() {
        *dst = (-((i * i) as f64) / (2.0 * sigma * sigma)).exp() / (SQRT_2PI * sigma);
    }
    let sum: f64 = values.iter().sum();
    if sum.abs() > MAGICK_EPSILON {
        values.iter_mut().for_each(|x| *x /= sum);
    }
    Ok(values)
}

/// Laplacian of Gaussian, shifted to a zero sum.
pub fn log_kernel(width: usize, sigma: f64) -> Result<Kernel, EffectError> {
    check_odd(width)?;
    let sigma = effective_sigma(sigma);
    let mut values = try_vec(width * width, 0f64, "kernel")?;
    let j = (width / 2) as isize;
    let sigma_p_2 = sigma * sigma;
    let scale = -1. / (PI * sigma_p_2 * sigma_p_2);
    for (v, row) in (-j..=j).zip(values.chunks_exact_mut(width)) {
        for (u, dst) in (-j..=j).zip(row.iter_mut()) {
            let der = -(((u * u + v * v) as f64) / (2. * sigma_p_2));
            *dst = scale * (1. + der) * der.exp();
        }
    }
    let mean = values.iter().sum::<f64>() / values.len() as f64;
    values.iter_mut().for_each(|x| *x -= mean);
    Kernel::new(width, width, values)
}

/// Square kernels of decreasing size used by adaptive filters.
///
/// Entry `i` (even `i` only) is `(width-i)×(width-i)`.
#[derive(Clone, Debug)]
pub struct KernelFamily {
    pub width: usize,
    kernels: Vec<Option<Kernel>>,
}

impl KernelFamily {
    /// Kernel applied when the selector lands on `index`.
    #[inline]
    pub fn kernel(&self, index: usize) -> Option<&Kernel> {
        self.kernels.get(index).and_then(|x| x.as_ref())
    }

    fn build(
        width: usize,
        sigma: f64,
        shape: impl Fn(usize, f64) -> Result<Kernel, EffectError>,
    ) -> Result<KernelFamily, EffectError> {
        check_odd(width)?;
        let mut kernels = Vec::new();
        kernels
            .try_reserve_exact(width)
            .map_err(|_| EffectError::MemoryAllocationFailed("kernel family"))?;
        for i in 0..width {
            if i % 2 == 0 {
                kernels.push(Some(shape(width - i, sigma)?));
            } else {
                kernels.push(None);
            }
        }
        Ok(KernelFamily { width, kernels })
    }
}

/// Gaussians whose center absorbs `1-Σ`, so each member sums to one.
pub fn blur_family(width: usize, sigma: f64) -> Result<KernelFamily, EffectError> {
    KernelFamily::build(width, sigma, |size, sigma| {
        let mut values = gaussian_square(size, sigma, 1.0)?;
        let normalize: f64 = values.iter().sum();
        let center = size * size / 2;
        values[center] += 1.0 - normalize;
        if sigma < MAGICK_EPSILON {
            values[center] = 1.0;
        }
        Kernel::new(size, size, values)
    })
}

/// Negative Gaussians with a `-2×Σ` center.
pub fn sharpen_family(width: usize, sigma: f64) -> Result<KernelFamily, EffectError> {
    KernelFamily::build(width, sigma, |size, sigma| {
        let mut values = gaussian_square(size, sigma, -1.0)?;
        let normalize: f64 = values.iter().sum();
        values[size * size / 2] = -2.0 * normalize;
        Kernel::new(size, size, values)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gaussian_kernels_are_normalized() {
        for sigma in [0.5, 1.0, 2.5] {
            let k1 = gaussian_kernel_1d(9, sigma).unwrap();
            let k2 = gaussian_kernel_2d(9, sigma).unwrap();
            assert!((k1.sum() - 1.0).abs() < 1e-9, "1D sum {}", k1.sum());
            assert!((k2.sum() - 1.0).abs() < 1e-9, "2D sum {}", k2.sum());
            assert!(k1.values[4] > k1.values[3]);
            assert!((k1.values[0] - k1.values[8]).abs() < 1e-15);
        }
    }

    #[test]
    fn test_even_width_is_rejected() {
        assert!(matches!(
            gaussian_kernel_1d(4, 1.0),
            Err(EffectError::KernelWidthMustBeOdd(4))
        ));
        assert!(matches!(
            Kernel::new(3, 2, vec![0.; 6]),
            Err(EffectError::KernelWidthMustBeOdd(2))
        ));
        assert!(matches!(
            Kernel::new(3, 3, vec![0.; 8]),
            Err(EffectError::KernelSizeMismatch(_))
        ));
    }

    #[test]
    fn test_sharpen_kernel_sums_to_one() {
        let kernel = sharpen_kernel(5, 1.0).unwrap();
        assert!((kernel.sum() - 1.0).abs() < 1e-9, "sum {}", kernel.sum());
        assert!(kernel.values[12] > 0.0);
        assert!(kernel.values.iter().enumerate().all(|(i, &x)| i == 12 || x < 0.0));
    }

    #[test]
    fn test_edge_kernel() {
        let kernel = edge_kernel(3).unwrap();
        assert_eq!(kernel.values, vec![-1., -1., -1., -1., 8., -1., -1., -1., -1.]);
        assert_eq!(kernel.sum(), 0.0);
    }

    #[test]
    fn test_emboss_kernel_keeps_anti_diagonal() {
        let kernel = emboss_kernel(3, 1.0).unwrap();
        let v = &kernel.values;
        assert_eq!(v[0], 0.0);
        assert_eq!(v[1], 0.0);
        assert!(v[2] < 0.0);
        assert!(v[4] > 0.0);
        assert!(v[6] < 0.0);
        assert_eq!(v[8], 0.0);
    }

    #[test]
    fn test_motion_and_log_kernels() {
        let motion = motion_kernel(5, 1.0).unwrap();
        assert!((motion.iter().sum::<f64>() - 1.0).abs() < 1e-12);
        assert!(motion.windows(2).all(|w| w[0] > w[1]));
        let log = log_kernel(7, 1.2).unwrap();
        assert!(log.sum().abs() < 1e-9);
        assert!(log.values[24] < 0.0);
    }

    #[test]
    fn test_families() {
        let family = blur_family(7, 1.0).unwrap();
        for (i, size) in [(0usize, 7usize), (2, 5), (4, 3), (6, 1)] {
            let kernel = family.kernel(i).unwrap();
            assert_eq!(kernel.width, size);
            assert!((kernel.sum() - 1.0).abs() < 1e-9);
        }
        assert!(family.kernel(1).is_none());
        let family = sharpen_family(5, 1.0).unwrap();
        assert!(family.kernel(0).unwrap().values[12] > 0.0);
    }

    #[test]
    fn test_reflection_and_scan_points() {
        let kernel = Kernel::new(3, 1, vec![1., 0., 2.]).unwrap();
        assert_eq!(kernel.reflected().values, vec![2., 0., 1.]);
        let points = kernel.scan_points();
        assert_eq!(points.len(), 2);
        assert_eq!((points[0].x, points[0].y), (-1, 0));
        assert_eq!((points[1].x, points[1].weight), (1, 2.));
    }
}
