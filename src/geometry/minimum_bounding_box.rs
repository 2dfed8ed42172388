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
use crate::geometry::{convex_hull, PointInfo};
use crate::quantum::Quantum;
use crate::{EffectError, ImageStore};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Smallest area rectangle enclosing the foreground hull.
///
/// `angle` is the direction of the `width` side in degrees, measured from
/// the x axis towards the y axis. `corners` run along the width side first.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct MinimumBoundingBox {
    pub area: f64,
    pub width: f64,
    pub height: f64,
    pub angle: f64,
    pub corners: [PointInfo; 4],
    pub hull: Vec<PointInfo>,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum Orientation {
    Landscape,
    Portrait,
}

impl MinimumBoundingBox {
    /// Box of a hull with fewer than three vertices.
    fn degenerate(hull: Vec<PointInfo>) -> MinimumBoundingBox {
        let (corners, width, angle) = match hull.as_slice() {
            [] => ([PointInfo::default(); 4], 0.0, 0.0),
            [p] => ([*p; 4], 0.0, 0.0),
            [a, b, ..] => {
                let dx = b.x - a.x;
                let dy = b.y - a.y;
                ([*a, *b, *b, *a], dx.hypot(dy), dy.atan2(dx).to_degrees())
            }
        };
        MinimumBoundingBox {
            area: 0.0,
            width,
            height: 0.0,
            angle,
            corners,
            hull,
        }
    }

    fn orient(&mut self, orientation: Orientation) {
        let swap = match orientation {
            Orientation::Landscape => self.width < self.height,
            Orientation::Portrait => self.width > self.height,
        };
        if !swap {
            return;
        }
        std::mem::swap(&mut self.width, &mut self.height);
        self.angle += 90.0;
        if self.angle > 180.0 {
            self.angle -= 360.0;
        }
        self.corners.rotate_left(1);
    }
}

/// Rotating calipers over a convex hull in counter-clockwise order.
///
/// Every hull edge is tried as a side of the rectangle; the extents along the
/// edge and its normal come from a scan of all vertices. The first smallest
/// area wins.
pub fn calipers(hull: Vec<PointInfo>) -> MinimumBoundingBox {
    if hull.len() < 3 {
        return MinimumBoundingBox::degenerate(hull);
    }
    let mut best: Option<MinimumBoundingBox> = None;
    for i in 0..hull.len() {
        let a = hull[i];
        let b = hull[(i + 1) % hull.len()];
        let length = (b.x - a.x).hypot(b.y - a.y);
        if length == 0.0 {
            continue;
        }
        let u = PointInfo::new((b.x - a.x) / length, (b.y - a.y) / length);
        let n = PointInfo::new(-u.y, u.x);

        let mut min_u = f64::INFINITY;
        let mut max_u = f64::NEG_INFINITY;
        let mut min_n = f64::INFINITY;
        let mut max_n = f64::NEG_INFINITY;
        for p in hull.iter() {
            let along = p.x * u.x + p.y * u.y;
            let across = p.x * n.x + p.y * n.y;
            min_u = min_u.min(along);
            max_u = max_u.max(along);
            min_n = min_n.min(across);
            max_n = max_n.max(across);
        }
        let width = max_u - min_u;
        let height = max_n - min_n;
        let area = width * height;
        if best.as_ref().map(|x| area < x.area).unwrap_or(true) {
            let corner = |s: f64, t: f64| PointInfo::new(s * u.x + t * n.x, s * u.y + t * n.y);
            best = Some(MinimumBoundingBox {
                area,
                width,
                height,
                angle: u.y.atan2(u.x).to_degrees(),
                corners: [
                    corner(min_u, min_n),
                    corner(max_u, min_n),
                    corner(max_u, max_n),
                    corner(min_u, max_n),
                ],
                hull: Vec::new(),
            });
        }
    }
    match best {
        Some(mut found) => {
            found.hull = hull;
            found
        }
        None => MinimumBoundingBox::degenerate(hull),
    }
}

/// Minimum area rectangle around the foreground of `image`, see
/// [convex_hull] for what counts as foreground.
///
/// The `minimum-bounding-box:orientation` artifact, `landscape` or
/// `portrait`, swaps the sides when needed and turns the angle by 90°.
pub fn minimum_bounding_box<T: Quantum>(
    image: &ImageStore<T>,
    ctx: &EffectContext,
) -> Result<MinimumBoundingBox, EffectError> {
    let orientation = match ctx.artifact("minimum-bounding-box:orientation") {
        None => None,
        Some(value) => match value.trim().to_ascii_lowercase().as_str() {
            "landscape" => Some(Orientation::Landscape),
            "portrait" => Some(Orientation::Portrait),
            _ => {
                return Err(EffectError::InvalidArguments(format!(
                    "minimum-bounding-box:orientation={value}"
                )))
            }
        },
    };
    let hull = convex_hull(image, ctx)?;
    if hull.len() < 3 {
        warn!(vertices = hull.len(), "degenerate hull");
    }
    let mut found = calipers(hull);
    if let Some(orientation) = orientation {
        found.orient(orientation);
    }
    debug!(
        area = found.area,
        width = found.width,
        height = found.height,
        angle = found.angle,
        "minimum bounding box"
    );
    Ok(found)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::monotone_chain;
    use crate::ChannelLayout;

    fn diamond_image() -> Vec<u8> {
        // a rotated square, |x - 10| + |y - 10| <= 6
        let mut data = vec![0u8; 21 * 21];
        for y in 0..21i32 {
            for x in 0..21i32 {
                if (x - 10).abs() + (y - 10).abs() <= 6 {
                    data[(y * 21 + x) as usize] = 255;
                }
            }
        }
        data
    }

    #[test]
    fn test_diamond_beats_axis_aligned_box() {
        let data = diamond_image();
        let image = ImageStore::borrow(&data, 21, 21, ChannelLayout::Gray);
        let found = minimum_bounding_box(&image, &EffectContext::new()).unwrap();
        // axis aligned extent is 12 by 12
        assert!(found.area <= 144.0 + 1e-9);
        assert!((found.area - 72.0).abs() < 1e-6, "area {}", found.area);
        let angle = found.angle.abs();
        assert!((angle - 45.0).abs() < 1e-6 || (angle - 135.0).abs() < 1e-6, "angle {angle}");
        assert_eq!(found.hull.len(), 4);
    }

    #[test]
    fn test_never_exceeds_axis_aligned_area() {
        let points: Vec<PointInfo> = (0..40)
            .map(|i| {
                let t = i as f64 * 0.37;
                PointInfo::new((t * 7.0).sin() * 9.0 + t, (t * 3.0).cos() * 4.0 - 0.5 * t)
            })
            .collect();
        let hull = monotone_chain(&points);
        let min_x = hull.iter().map(|p| p.x).fold(f64::INFINITY, f64::min);
        let max_x = hull.iter().map(|p| p.x).fold(f64::NEG_INFINITY, f64::max);
        let min_y = hull.iter().map(|p| p.y).fold(f64::INFINITY, f64::min);
        let max_y = hull.iter().map(|p| p.y).fold(f64::NEG_INFINITY, f64::max);
        let found = calipers(hull);
        assert!(found.area <= (max_x - min_x) * (max_y - min_y) + 1e-9);
        assert!(found.area > 0.0);
    }

    #[test]
    fn test_orientation_artifact() {
        let mut data = vec![0u8; 20 * 10];
        for y in 2..5 {
            for x in 3..15 {
                data[y * 20 + x] = 255;
            }
        }
        let image = ImageStore::borrow(&data, 20, 10, ChannelLayout::Gray);
        let landscape = minimum_bounding_box(&image, &EffectContext::new()).unwrap();
        assert!(landscape.width >= landscape.height);
        let ctx = EffectContext::new().with_artifact("minimum-bounding-box:orientation", "portrait");
        let portrait = minimum_bounding_box(&image, &ctx).unwrap();
        assert!(portrait.width <= portrait.height);
        assert!((portrait.area - landscape.area).abs() < 1e-9);
        assert_eq!(portrait.corners[0], landscape.corners[1]);
        let bad = EffectContext::new().with_artifact("minimum-bounding-box:orientation", "square");
        assert!(minimum_bounding_box(&image, &bad).is_err());
    }

    #[test]
    fn test_degenerate_hulls() {
        let empty = calipers(Vec::new());
        assert_eq!(empty.area, 0.0);
        let segment = calipers(vec![PointInfo::new(0.0, 0.0), PointInfo::new(3.0, 4.0)]);
        assert_eq!(segment.area, 0.0);
        assert_eq!(segment.width, 5.0);
    }
}
