//! Distance queries used for link hit-testing. All inputs are world coordinates.

use super::types::Point;

/// Links closer than this (in screen pixels, i.e. world distance times zoom) are hit.
pub const HIT_THRESHOLD: f64 = 8.0;

/// Sampling steps over `t ∈ [0, 1]` when measuring distance to a curve.
pub const BEZIER_SAMPLES: usize = 40;

/// Upper bound for how far Bézier control points extend from their endpoint.
pub const MAX_CONTROL_LENGTH: f64 = 100.0;

/// Closest point to `p` on the closed segment `a–b`.
pub fn closest_point_on_segment(a: Point, b: Point, p: Point) -> Point {
	let ab = b - a;
	let len_sq = ab.x * ab.x + ab.y * ab.y;
	if len_sq == 0.0 {
		return a;
	}
	let ap = p - a;
	let t = ((ap.x * ab.x + ap.y * ab.y) / len_sq).clamp(0.0, 1.0);
	a + ab * t
}

pub fn point_segment_distance(a: Point, b: Point, p: Point) -> f64 {
	p.distance(closest_point_on_segment(a, b, p))
}

/// Minimum distance from `p` to a polyline through `points`.
pub fn polyline_distance(points: &[Point], p: Point) -> f64 {
	match points {
		[] => f64::INFINITY,
		[only] => p.distance(*only),
		_ => points
			.windows(2)
			.map(|w| point_segment_distance(w[0], w[1], p))
			.fold(f64::INFINITY, f64::min),
	}
}

/// Length by which control points extend from each endpoint along its direction.
pub fn control_length(p1: Point, p2: Point) -> f64 {
	(p1.distance(p2) * 0.5).min(MAX_CONTROL_LENGTH)
}

/// Control points for the curve between two anchors leaving along `dir_from` and `dir_to`.
pub fn bezier_controls(p1: Point, p2: Point, dir_from: Point, dir_to: Point) -> (Point, Point) {
	let len = control_length(p1, p2);
	(p1 + dir_from * len, p2 + dir_to * len)
}

pub fn cubic_point(p0: Point, c1: Point, c2: Point, p3: Point, t: f64) -> Point {
	let mt = 1.0 - t;
	let a = mt * mt * mt;
	let b = 3.0 * mt * mt * t;
	let c = 3.0 * mt * t * t;
	let d = t * t * t;
	Point::new(
		a * p0.x + b * c1.x + c * c2.x + d * p3.x,
		a * p0.y + b * c1.y + c * c2.y + d * p3.y,
	)
}

/// Sampled distance from `p` to a cubic curve with explicit control points.
///
/// Returns the first sample within [`HIT_THRESHOLD`] world units rather than the
/// true minimum. At zoom above 1 that sample can still miss the screen-space
/// threshold when a closer sample would have hit.
pub fn cubic_distance(p0: Point, c1: Point, c2: Point, p3: Point, p: Point) -> f64 {
	let mut min = f64::INFINITY;
	for i in 0..=BEZIER_SAMPLES {
		let t = i as f64 / BEZIER_SAMPLES as f64;
		let d = p.distance(cubic_point(p0, c1, c2, p3, t));
		if d < HIT_THRESHOLD {
			return d;
		}
		min = min.min(d);
	}
	min
}

/// Distance from `p` to the link curve between `p1` and `p2`.
pub fn bezier_distance(p1: Point, p2: Point, dir_from: Point, dir_to: Point, p: Point) -> f64 {
	let (c1, c2) = bezier_controls(p1, p2, dir_from, dir_to);
	cubic_distance(p1, c1, c2, p2, p)
}

/// Distance from `p` to the three-segment route through the horizontal midpoint:
/// `p1 → (mid_x, p1.y) → (mid_x, p2.y) → p2`.
pub fn orthogonal_route_distance(p1: Point, p2: Point, p: Point) -> f64 {
	let mid_x = (p1.x + p2.x) / 2.0;
	polyline_distance(
		&[p1, Point::new(mid_x, p1.y), Point::new(mid_x, p2.y), p2],
		p,
	)
}

/// Whether a world-space distance counts as a hit at the given zoom.
pub fn within_hit_threshold(world_distance: f64, zoom: f64) -> bool {
	world_distance * zoom < HIT_THRESHOLD
}
