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

use thiserror::Error;

#[derive(Debug, Copy, Clone, Ord, PartialOrd, Eq, PartialEq)]
/// Shows size mismatching
pub struct MismatchedSize {
    pub expected: usize,
    pub received: usize,
}

impl std::fmt::Display for MismatchedSize {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "expected={}, received={}", self.expected, self.received)
    }
}

/// Errors reported by every filter entry point.
///
/// A returned error always means the destination holds no valid result;
/// degenerate but valid inputs (flat images, zero sigma, empty foreground)
/// are never reported through this type.
#[derive(Debug, Error)]
pub enum EffectError {
    #[error("Image size must not be zero")]
    ZeroBaseSize,
    #[error("Minimum image slice size mismatch: {0}")]
    MinimumSliceSizeMismatch(MismatchedSize),
    #[error("Minimum stride must have size at least {}, but it is {}", .0.expected, .0.received)]
    MinimumStrideSizeMismatch(MismatchedSize),
    #[error("Kernel width must be odd, but received {0}")]
    KernelWidthMustBeOdd(usize),
    #[error("Kernel size mismatch: {0}")]
    KernelSizeMismatch(MismatchedSize),
    #[error("Source and destination images must match in their dimensions and layout")]
    ImagesMustMatch,
    #[error("Invalid arguments: {0}")]
    InvalidArguments(String),
    #[error("Invalid geometry `{0}`")]
    InvalidGeometry(String),
    #[error("Threshold map `{0}` is not defined")]
    UnknownThresholdMap(String),
    #[error("Memory allocation failed for {0}")]
    MemoryAllocationFailed(&'static str),
    #[error("Unable to start worker pool: {0}")]
    ThreadPool(String),
    #[error("Operation {0} was cancelled")]
    Cancelled(&'static str),
    #[error("Configuration error: {0}")]
    Config(#[from] serde_yaml::Error),
}

pub type EffectResult<T> = Result<T, EffectError>;

pub(crate) fn check_slice_size<T>(
    arr: &[T],
    stride: usize,
    width: usize,
    height: usize,
    cn: usize,
) -> Result<(), EffectError> {
    if width == 0 || height == 0 {
        return Err(EffectError::ZeroBaseSize);
    }
    if arr.len() < stride * (height - 1) + width * cn {
        return Err(EffectError::MinimumSliceSizeMismatch(MismatchedSize {
            expected: stride * height,
            received: arr.len(),
        }));
    }
    if stride < width * cn {
        return Err(EffectError::MinimumStrideSizeMismatch(MismatchedSize {
            expected: width * cn,
            received: stride,
        }));
    }
    Ok(())
}

/// Allocates a buffer, reporting exhaustion instead of aborting.
pub(crate) fn try_vec<T: Clone>(
    len: usize,
    value: T,
    what: &'static str,
) -> Result<Vec<T>, EffectError> {
    let mut store = Vec::new();
    store
        .try_reserve_exact(len)
        .map_err(|_| EffectError::MemoryAllocationFailed(what))?;
    store.resize(len, value);
    Ok(store)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_slice_size_rejects_short_slice() {
        let data = vec![0u8; 10];
        let result = check_slice_size(&data, 4, 4, 3, 1);
        assert!(matches!(
            result,
            Err(EffectError::MinimumSliceSizeMismatch(MismatchedSize {
                expected: 12,
                received: 10
            }))
        ));
    }

    #[test]
    fn test_check_slice_size_rejects_narrow_stride() {
        let data = vec![0u8; 64];
        let result = check_slice_size(&data, 3, 4, 2, 1);
        assert!(matches!(
            result,
            Err(EffectError::MinimumStrideSizeMismatch(_))
        ));
    }

    #[test]
    fn test_error_messages() {
        let error = EffectError::KernelWidthMustBeOdd(4);
        assert_eq!(error.to_string(), "Kernel width must be odd, but received 4");
        let error = EffectError::MinimumStrideSizeMismatch(MismatchedSize {
            expected: 12,
            received: 10,
        });
        assert_eq!(
            error.to_string(),
            "Minimum stride must have size at least 12, but it is 10"
        );
    }

    #[test]
    fn test_try_vec() {
        let store = try_vec(16, 1.5f64, "test buffer").unwrap();
        assert_eq!(store.len(), 16);
        assert!(store.iter().all(|&x| x == 1.5));
    }
}
