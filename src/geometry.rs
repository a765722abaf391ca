//! Planar geometry helpers shared by the scorers and the path converter

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// A point in the route frame (meters)
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize, ToSchema)]
pub struct Coordinates {
    #[schema(example = 1.0)]
    pub x: f64,
    #[schema(example = 2.5)]
    pub y: f64,
}

impl Coordinates {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Euclidean distance to `other`
    pub fn distance(&self, other: &Coordinates) -> f64 {
        (other.x - self.x).hypot(other.y - self.y)
    }

    fn lerp(&self, other: &Coordinates, t: f64) -> Coordinates {
        Coordinates::new(
            self.x + (other.x - self.x) * t,
            self.y + (other.y - self.y) * t,
        )
    }
}

/// Append evenly spaced points from `start` toward `end`, excluding `end` itself
///
/// With segment length `L` the number of emitted points is `ceil(L / density)`
/// (at least 1, at most `max_points`), spaced `L / n` apart along the segment.
/// Degenerate segments (zero or non-finite length) emit `start` only.
///
/// Returns the number of points appended.
pub fn interpolate_segment(
    start: Coordinates,
    end: Coordinates,
    density: f64,
    max_points: usize,
    out: &mut Vec<Coordinates>,
) -> usize {
    let mag = start.distance(&end);
    if !(mag > 0.0 && mag.is_finite()) {
        out.push(start);
        return 1;
    }

    // `as usize` saturates, so a tiny density cannot wrap around
    let num_pts = ((mag / density).ceil() as usize).clamp(1, max_points.max(1));
    let step = mag / num_pts as f64;
    let ux = (end.x - start.x) / mag;
    let uy = (end.y - start.y) / mag;

    out.reserve(num_pts);
    out.push(start);
    for i in 1..num_pts {
        let dist = step * i as f64;
        out.push(Coordinates::new(start.x + ux * dist, start.y + uy * dist));
    }

    num_pts
}

/// Sample the straight line `start -> end` every `step` meters, both ends included
///
/// Yields `ceil(L / step) + 1` points, at most `max_steps + 1`; past the cap the
/// spacing widens. A zero-length line yields `start` once.
pub fn sample_line(
    start: Coordinates,
    end: Coordinates,
    step: f64,
    max_steps: usize,
) -> impl Iterator<Item = Coordinates> {
    let length = start.distance(&end);
    let steps = if length > 0.0 && length.is_finite() && step > 0.0 {
        ((length / step).ceil() as usize).min(max_steps.max(1))
    } else {
        0
    };

    (0..=steps).map(move |i| {
        if steps == 0 {
            start
        } else {
            start.lerp(&end, i as f64 / steps as f64)
        }
    })
}

/// Closest point to `p` on the segment `a -> b`
pub fn closest_point_on_segment(p: Coordinates, a: Coordinates, b: Coordinates) -> Coordinates {
    let dx = b.x - a.x;
    let dy = b.y - a.y;
    let len_sq = dx * dx + dy * dy;
    if len_sq <= f64::EPSILON {
        return a;
    }

    let t = (((p.x - a.x) * dx + (p.y - a.y) * dy) / len_sq).clamp(0.0, 1.0);
    a.lerp(&b, t)
}
