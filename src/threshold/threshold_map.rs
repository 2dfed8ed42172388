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

use crate::EffectError;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Dither matrix for [crate::ordered_posterize].
///
/// `levels` is row-major with `width * height` entries, each in
/// `0..=divisor`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThresholdMap {
    pub map: String,
    #[serde(default)]
    pub alias: Option<String>,
    #[serde(default)]
    pub description: String,
    pub width: usize,
    pub height: usize,
    pub divisor: u32,
    pub levels: Vec<u32>,
}

impl ThresholdMap {
    fn builtin(
        map: &str,
        alias: Option<&str>,
        description: &str,
        width: usize,
        height: usize,
        divisor: u32,
        levels: &[u32],
    ) -> ThresholdMap {
        ThresholdMap {
            map: map.to_string(),
            alias: alias.map(|x| x.to_string()),
            description: description.to_string(),
            width,
            height,
            divisor,
            levels: levels.to_vec(),
        }
    }

    pub fn validate(&self) -> Result<(), EffectError> {
        let invalid = |reason: &str| {
            Err(EffectError::InvalidArguments(format!(
                "threshold map `{}`: {reason}",
                self.map
            )))
        };
        if self.map.is_empty() {
            return invalid("empty name");
        }
        if self.width == 0 || self.height == 0 {
            return invalid("empty matrix");
        }
        if self.divisor < 2 {
            return invalid("divisor must be at least 2");
        }
        if self.levels.len() != self.width * self.height {
            return invalid("levels do not fill the matrix");
        }
        if self.levels.iter().any(|&x| x > self.divisor) {
            return invalid("level exceeds the divisor");
        }
        Ok(())
    }

    /// Matrix entry for image position `(x, y)`, tiling the matrix.
    #[inline]
    pub fn level_at(&self, x: usize, y: usize) -> u32 {
        self.levels[(y % self.height) * self.width + x % self.width]
    }

    fn answers_to(&self, name: &str) -> bool {
        self.map.eq_ignore_ascii_case(name)
            || self
                .alias
                .as_deref()
                .map(|alias| alias.eq_ignore_ascii_case(name))
                .unwrap_or(false)
    }
}

#[derive(Deserialize)]
struct ThresholdMapFile {
    thresholds: Vec<ThresholdMap>,
}

/// Named dither matrices.
///
/// The default registry carries `threshold` (`1x1`), `checks` (`2x1`) and the
/// ordered `o2x2`, `o3x3`, `o4x4` and `o8x8` matrices.
#[derive(Debug, Clone)]
pub struct ThresholdMapRegistry {
    maps: Vec<ThresholdMap>,
}

impl Default for ThresholdMapRegistry {
    fn default() -> Self {
        #[rustfmt::skip]
        let maps = vec![
            ThresholdMap::builtin("threshold", Some("1x1"), "Threshold 1x1 (non-dither)", 1, 1, 2, &[1]),
            ThresholdMap::builtin("checks", Some("2x1"), "Checkerboard 2x1 (dither)", 2, 2, 3, &[
                1, 2,
                2, 1,
            ]),
            ThresholdMap::builtin("o2x2", Some("2x2"), "Ordered 2x2 (dispersed)", 2, 2, 5, &[
                1, 3,
                4, 2,
            ]),
            ThresholdMap::builtin("o3x3", Some("3x3"), "Ordered 3x3 (dispersed)", 3, 3, 10, &[
                3, 7, 4,
                6, 1, 9,
                2, 8, 5,
            ]),
            ThresholdMap::builtin("o4x4", Some("4x4"), "Ordered 4x4 (dispersed)", 4, 4, 17, &[
                1, 9, 3, 11,
                13, 5, 15, 7,
                4, 12, 2, 10,
                16, 8, 14, 6,
            ]),
            ThresholdMap::builtin("o8x8", Some("8x8"), "Ordered 8x8 (dispersed)", 8, 8, 65, &[
                1, 49, 13, 61, 4, 52, 16, 64,
                33, 17, 45, 29, 36, 20, 48, 32,
                9, 57, 5, 53, 12, 60, 8, 56,
                41, 25, 37, 21, 44, 28, 40, 24,
                3, 51, 15, 63, 2, 50, 14, 62,
                35, 19, 47, 31, 34, 18, 46, 30,
                11, 59, 7, 55, 10, 58, 6, 54,
                43, 27, 39, 23, 42, 26, 38, 22,
            ]),
        ];
        ThresholdMapRegistry { maps }
    }
}

impl ThresholdMapRegistry {
    /// Registry without any map.
    pub fn empty() -> Self {
        ThresholdMapRegistry { maps: Vec::new() }
    }

    /// Built-in maps extended with the `thresholds` list of a YAML document.
    /// A user map replaces a built-in one of the same name.
    pub fn from_yaml(yaml: &str) -> Result<Self, EffectError> {
        let file: ThresholdMapFile = serde_yaml::from_str(yaml)?;
        let mut registry = ThresholdMapRegistry::default();
        for map in file.thresholds {
            registry.insert(map)?;
        }
        Ok(registry)
    }

    /// Looks a map up by name or alias, ignoring case.
    pub fn get(&self, name: &str) -> Option<&ThresholdMap> {
        self.maps.iter().find(|x| x.answers_to(name.trim()))
    }

    pub fn insert(&mut self, map: ThresholdMap) -> Result<(), EffectError> {
        map.validate()?;
        debug!(map = map.map.as_str(), width = map.width, height = map.height, "threshold map");
        self.maps.retain(|x| !x.map.eq_ignore_ascii_case(&map.map));
        self.maps.push(map);
        Ok(())
    }

    pub fn maps(&self) -> impl Iterator<Item = &ThresholdMap> {
        self.maps.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtins_are_valid() {
        let registry = ThresholdMapRegistry::default();
        for map in registry.maps() {
            map.validate().unwrap();
        }
        assert_eq!(registry.get("1x1").unwrap().map, "threshold");
        assert_eq!(registry.get("O8X8").unwrap().divisor, 65);
        assert_eq!(registry.get("checks").unwrap().level_at(3, 1), 1);
        assert!(registry.get("h4x4a").is_none());
    }

    #[test]
    fn test_maps_from_yaml() {
        let yaml = r#"
thresholds:
  - map: stripes
    alias: s2
    description: Vertical stripes
    width: 2
    height: 1
    divisor: 3
    levels: [1, 2]
  - map: threshold
    width: 1
    height: 1
    divisor: 4
    levels: [2]
"#;
        let registry = ThresholdMapRegistry::from_yaml(yaml).unwrap();
        let stripes = registry.get("s2").unwrap();
        assert_eq!((stripes.width, stripes.height), (2, 1));
        assert_eq!(stripes.level_at(5, 9), 2);
        assert_eq!(registry.get("threshold").unwrap().divisor, 4);
        assert!(registry.get("1x1").is_none());
        assert!(registry.get("o4x4").is_some());
    }

    #[test]
    fn test_rejects_broken_maps() {
        let yaml = r#"
thresholds:
  - map: short
    width: 2
    height: 2
    divisor: 5
    levels: [1, 2, 3]
"#;
        assert!(matches!(
            ThresholdMapRegistry::from_yaml(yaml),
            Err(EffectError::InvalidArguments(_))
        ));
        assert!(matches!(
            ThresholdMapRegistry::from_yaml("thresholds: 3"),
            Err(EffectError::Config(_))
        ));
    }
}
