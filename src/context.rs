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

use crate::progress::{ProgressMonitor, RowProgress};
use crate::{EdgeMode, EffectError, Scalar, ThreadingPolicy};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt::{Debug, Formatter};
use std::sync::Arc;

/// Per call settings shared by every filter in this crate.
///
/// Replaces process wide state: one context carries the worker policy, the
/// virtual pixel method, the random seed, the progress sink and the free
/// form artifacts (`convolve:bias`, `trim:percent-background`, ...).
#[derive(Clone, Default)]
pub struct EffectContext {
    pub threading_policy: ThreadingPolicy,
    pub edge_mode: EdgeMode,
    /// Background for [EdgeMode::Constant], in the channel range of the image
    pub background: Scalar,
    /// Colour distance under which two pixels are considered equal
    pub fuzz: f64,
    pub seed: Option<u64>,
    pub monitor: Option<Arc<dyn ProgressMonitor>>,
    pub artifacts: HashMap<String, String>,
}

impl Debug for EffectContext {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EffectContext")
            .field("threading_policy", &self.threading_policy)
            .field("edge_mode", &self.edge_mode)
            .field("background", &self.background)
            .field("fuzz", &self.fuzz)
            .field("seed", &self.seed)
            .field("monitor", &self.monitor.is_some())
            .field("artifacts", &self.artifacts)
            .finish()
    }
}

impl EffectContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_threading_policy(mut self, threading_policy: ThreadingPolicy) -> Self {
        self.threading_policy = threading_policy;
        self
    }

    pub fn with_edge_mode(mut self, edge_mode: EdgeMode) -> Self {
        self.edge_mode = edge_mode;
        self
    }

    pub fn with_background(mut self, background: Scalar) -> Self {
        self.background = background;
        self
    }

    pub fn with_fuzz(mut self, fuzz: f64) -> Self {
        self.fuzz = fuzz;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn with_monitor(mut self, monitor: Arc<dyn ProgressMonitor>) -> Self {
        self.monitor = Some(monitor);
        self
    }

    pub fn with_artifact(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.artifacts.insert(key.into(), value.into());
        self
    }

    #[inline]
    pub fn artifact(&self, key: &str) -> Option<&str> {
        self.artifacts.get(key).map(|x| x.as_str())
    }

    /// Numeric artifact, a trailing `%` is kept out of the value.
    pub(crate) fn artifact_f64(&self, key: &str) -> Result<Option<f64>, EffectError> {
        match self.artifact(key) {
            None => Ok(None),
            Some(value) => value
                .trim()
                .trim_end_matches('%')
                .parse::<f64>()
                .map(Some)
                .map_err(|_| EffectError::InvalidArguments(format!("{key}={value}"))),
        }
    }

    /// Like [EffectContext::artifact_f64]; a `%` suffix scales by `range/100`.
    pub(crate) fn artifact_quantum(&self, key: &str, range: f64) -> Result<Option<f64>, EffectError> {
        let percent = self
            .artifact(key)
            .map(|x| x.trim().ends_with('%'))
            .unwrap_or(false);
        Ok(self
            .artifact_f64(key)?
            .map(|v| if percent { v * range / 100.0 } else { v }))
    }

    #[inline]
    pub(crate) fn thread_count(&self, width: u32, height: u32) -> usize {
        self.threading_policy.thread_count(width, height)
    }

    pub(crate) fn row_progress(&self, tag: &'static str, rows: u64) -> RowProgress {
        RowProgress::new(tag, rows, self.monitor.clone())
    }

    /// Seed of this call; a missing seed is drawn once per call.
    pub(crate) fn call_seed(&self) -> u64 {
        self.seed.unwrap_or_else(rand::random::<u64>)
    }
}

/// Serializable form of [EffectContext].
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct EffectOptions {
    pub threading_policy: ThreadingPolicy,
    pub edge_mode: EdgeMode,
    pub background: Vec<f64>,
    pub fuzz: f64,
    pub seed: Option<u64>,
    pub artifacts: HashMap<String, String>,
}

impl EffectOptions {
    pub fn from_yaml(yaml: &str) -> Result<EffectOptions, EffectError> {
        let options: EffectOptions = serde_yaml::from_str(yaml)?;
        if options.fuzz < 0.0 || !options.fuzz.is_finite() {
            return Err(EffectError::InvalidArguments(format!(
                "fuzz must be a non negative number, but it is {}",
                options.fuzz
            )));
        }
        Ok(options)
    }

    pub fn into_context(self) -> EffectContext {
        EffectContext {
            threading_policy: self.threading_policy,
            edge_mode: self.edge_mode,
            background: Scalar::from_slice(&self.background),
            fuzz: self.fuzz,
            seed: self.seed,
            monitor: None,
            artifacts: self.artifacts,
        }
    }
}

impl From<EffectOptions> for EffectContext {
    fn from(value: EffectOptions) -> Self {
        value.into_context()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::num::NonZeroUsize;

    #[test]
    fn test_options_from_yaml() {
        let yaml = r#"
threading_policy: !Fixed 3
edge_mode: Reflect101
background: [10.0, 20.0, 30.0]
fuzz: 2.5
seed: 42
artifacts:
  convolve:bias: "4"
  trim:percent-background: "50%"
"#;
        let options = EffectOptions::from_yaml(yaml).unwrap();
        assert_eq!(
            options.threading_policy,
            ThreadingPolicy::Fixed(NonZeroUsize::new(3).unwrap())
        );
        let ctx: EffectContext = options.into();
        assert_eq!(ctx.edge_mode, EdgeMode::Reflect101);
        assert_eq!(ctx.background[1], 20.0);
        assert_eq!(ctx.seed, Some(42));
        assert_eq!(ctx.artifact_f64("convolve:bias").unwrap(), Some(4.0));
        assert_eq!(
            ctx.artifact_f64("trim:percent-background").unwrap(),
            Some(50.0)
        );
        assert_eq!(ctx.artifact_f64("missing").unwrap(), None);
    }

    #[test]
    fn test_options_defaults_and_errors() {
        let options = EffectOptions::from_yaml("fuzz: 1.0").unwrap();
        assert_eq!(options.edge_mode, EdgeMode::Clamp);
        assert_eq!(options.threading_policy, ThreadingPolicy::Adaptive);
        assert!(EffectOptions::from_yaml("fuzz: -1.0").is_err());
        assert!(matches!(
            EffectOptions::from_yaml("edge_mode: Mirror"),
            Err(EffectError::Config(_))
        ));
        let ctx = EffectContext::new().with_artifact("convolve:bias", "abc");
        assert!(ctx.artifact_f64("convolve:bias").is_err());
    }
}
