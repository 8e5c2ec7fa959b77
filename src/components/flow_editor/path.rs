//! Link routing shared by the renderer and by hit-testing, so that the
//! clickable region of a link is exactly the line that was drawn.

use super::geometry::{bezier_controls, cubic_distance, point_segment_distance, polyline_distance};
use super::types::{LineMode, Point};

/// Initial length of the straight stubs leaving each connector in flowchart mode.
pub const FLOWCHART_STUB: f64 = 20.0;
/// Stubs never shrink below this.
pub const FLOWCHART_MIN_STUB: f64 = 4.0;
/// Clearance kept between a stub and the middle of the span.
pub const FLOWCHART_STUB_MARGIN: f64 = 5.0;

/// Geometry of one routed link in world coordinates.
#[derive(Clone, Debug, PartialEq)]
pub enum LinkPath {
	Straight {
		from: Point,
		to: Point,
	},
	Curve {
		from: Point,
		c1: Point,
		c2: Point,
		to: Point,
	},
	/// Stub, jog, stub, then the final segment into the target anchor.
	Orthogonal(Vec<Point>),
}

impl LinkPath {
	/// Routes a link from `p1` to `p2`. Direction hints may be zero for a free pointer end.
	pub fn route(mode: LineMode, p1: Point, p2: Point, dir_from: Point, dir_to: Point) -> Self {
		match mode {
			LineMode::Straight => LinkPath::Straight { from: p1, to: p2 },
			LineMode::Curve => {
				let (c1, c2) = bezier_controls(p1, p2, dir_from, dir_to);
				LinkPath::Curve {
					from: p1,
					c1,
					c2,
					to: p2,
				}
			}
			LineMode::Flowchart => LinkPath::Orthogonal(orthogonal_points(p1, p2, dir_from, dir_to)),
		}
	}

	pub fn end(&self) -> Point {
		match self {
			LinkPath::Straight { to, .. } | LinkPath::Curve { to, .. } => *to,
			LinkPath::Orthogonal(points) => points.last().copied().unwrap_or_default(),
		}
	}

	/// Angle of the line as it arrives at the end point, in radians.
	pub fn arrow_angle(&self) -> f64 {
		let (from, to) = match self {
			LinkPath::Straight { from, to } => (*from, *to),
			LinkPath::Curve { c2, to, .. } => (*c2, *to),
			LinkPath::Orthogonal(points) => match points.as_slice() {
				[.., before, last] => (*before, *last),
				_ => return 0.0,
			},
		};
		(to.y - from.y).atan2(to.x - from.x)
	}

	/// World-space distance from `p` to this path.
	pub fn distance_to(&self, p: Point) -> f64 {
		match self {
			LinkPath::Straight { from, to } => point_segment_distance(*from, *to, p),
			LinkPath::Curve { from, c1, c2, to } => cubic_distance(*from, *c1, *c2, *to, p),
			LinkPath::Orthogonal(points) => polyline_distance(points, p),
		}
	}
}

/// Stub length for a flowchart route, fitted to half the span along the source axis.
pub fn stub_length(p1: Point, p2: Point, dir_from: Point) -> f64 {
	let half_span = if dir_from.x != 0.0 {
		(p2.x - p1.x).abs() / 2.0
	} else {
		(p2.y - p1.y).abs() / 2.0
	};
	FLOWCHART_STUB
		.min(half_span - FLOWCHART_STUB_MARGIN)
		.max(FLOWCHART_MIN_STUB)
}

fn orthogonal_points(p1: Point, p2: Point, dir_from: Point, dir_to: Point) -> Vec<Point> {
	let stub = stub_length(p1, p2, dir_from);
	let s1 = p1 + dir_from * stub;
	let s2 = p2 + dir_to * stub;
	let mid = Point::new((s1.x + s2.x) / 2.0, (s1.y + s2.y) / 2.0);
	let (j1, j2) = if dir_from.x != 0.0 {
		(Point::new(mid.x, s1.y), Point::new(mid.x, s2.y))
	} else {
		(Point::new(s1.x, mid.y), Point::new(s2.x, mid.y))
	};
	vec![p1, s1, j1, j2, s2, p2]
}
