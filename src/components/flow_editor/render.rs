use wasm_bindgen::JsValue;
use web_sys::CanvasRenderingContext2d;

use super::config::EditorConfig;
use super::path::LinkPath;
use super::types::{LineMode, Point};

pub const ACCENT_COLOR: &str = "#2a80ff";
pub const LINK_COLOR: &str = "#333";
pub const LINK_WIDTH: f64 = 2.0;
pub const SELECTED_WIDTH: f64 = 4.0;
pub const SELECTED_GLOW: f64 = 4.0;
pub const DASH_PATTERN: [f64; 2] = [4.0, 4.0];
pub const ARROW_SIZE: f64 = 8.0;
/// Pull-back from the anchor so the arrow tip does not cover the connector dot.
pub const ARROW_OFFSET: f64 = 3.5;

/// Minimal immediate-mode drawing target. Implemented for the browser canvas
/// and by a recorder in tests.
pub trait Surface {
	fn clear(&mut self, width: f64, height: f64);
	fn save(&mut self);
	fn restore(&mut self);
	/// Translate by `pan`, then scale uniformly by `zoom`.
	fn transform(&mut self, pan: Point, zoom: f64);
	fn set_stroke(&mut self, color: &str, width: f64, glow: f64);
	fn set_dash(&mut self, dash: &[f64]);
	fn begin_path(&mut self);
	fn move_to(&mut self, p: Point);
	fn line_to(&mut self, p: Point);
	fn bezier_to(&mut self, c1: Point, c2: Point, to: Point);
	fn stroke(&mut self);
	fn fill_polygon(&mut self, points: &[Point], color: &str);
	fn fill_rect(&mut self, origin: Point, width: f64, height: f64, color: &str);
	fn stroke_rect(&mut self, origin: Point, width: f64, height: f64, color: &str, line_width: f64);
}

/// Per-link styling on top of the diagram-wide toggles.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LinkStyle {
	pub mode: LineMode,
	pub selected: bool,
	pub dashed: bool,
	pub arrow: bool,
}

impl LinkStyle {
	pub fn new(config: &EditorConfig, selected: bool) -> Self {
		Self {
			mode: config.line_mode,
			selected,
			dashed: config.show_dashed,
			arrow: config.show_arrow,
		}
	}
}

/// Draws one link. The caller has already applied the viewport transform.
pub fn render_link<S: Surface + ?Sized>(
	surface: &mut S,
	p1: Point,
	p2: Point,
	dirs: (Point, Point),
	style: LinkStyle,
) {
	let path = LinkPath::route(style.mode, p1, p2, dirs.0, dirs.1);
	let (color, width, glow) = if style.selected {
		(ACCENT_COLOR, SELECTED_WIDTH, SELECTED_GLOW)
	} else {
		(LINK_COLOR, LINK_WIDTH, 0.0)
	};

	surface.set_stroke(color, width, glow);
	let dash: &[f64] = if style.dashed { &DASH_PATTERN } else { &[] };
	surface.set_dash(dash);
	surface.begin_path();
	match &path {
		LinkPath::Straight { from, to } => {
			surface.move_to(*from);
			surface.line_to(*to);
		}
		LinkPath::Curve { from, c1, c2, to } => {
			surface.move_to(*from);
			surface.bezier_to(*c1, *c2, *to);
		}
		LinkPath::Orthogonal(points) => {
			if let Some((first, rest)) = points.split_first() {
				surface.move_to(*first);
				for p in rest {
					surface.line_to(*p);
				}
			}
		}
	}
	surface.stroke();

	if style.arrow {
		let angle = path.arrow_angle();
		let end = path.end();
		let tip = Point::new(end.x - angle.cos() * ARROW_OFFSET, end.y - angle.sin() * ARROW_OFFSET);
		draw_arrowhead(surface, tip, angle, color);
	}
}

/// Filled triangle with its tip at `tip`, pointing along `angle`.
pub fn draw_arrowhead<S: Surface + ?Sized>(surface: &mut S, tip: Point, angle: f64, color: &str) {
	let (sin, cos) = angle.sin_cos();
	let rotate = |x: f64, y: f64| Point::new(tip.x + x * cos - y * sin, tip.y + x * sin + y * cos);
	surface.fill_polygon(
		&[
			tip,
			rotate(-ARROW_SIZE, ARROW_SIZE / 2.0),
			rotate(-ARROW_SIZE, -ARROW_SIZE / 2.0),
		],
		color,
	);
}

impl Surface for CanvasRenderingContext2d {
	fn clear(&mut self, width: f64, height: f64) {
		self.clear_rect(0.0, 0.0, width, height);
	}

	fn save(&mut self) {
		CanvasRenderingContext2d::save(self);
	}

	fn restore(&mut self) {
		CanvasRenderingContext2d::restore(self);
	}

	fn transform(&mut self, pan: Point, zoom: f64) {
		let _ = self.translate(pan.x, pan.y);
		let _ = self.scale(zoom, zoom);
	}

	fn set_stroke(&mut self, color: &str, width: f64, glow: f64) {
		self.set_stroke_style_str(color);
		self.set_line_width(width);
		self.set_shadow_color(if glow > 0.0 { color } else { "transparent" });
		self.set_shadow_blur(glow);
	}

	fn set_dash(&mut self, dash: &[f64]) {
		let segments = js_sys::Array::new();
		for d in dash {
			segments.push(&JsValue::from_f64(*d));
		}
		let _ = self.set_line_dash(&segments);
	}

	fn begin_path(&mut self) {
		CanvasRenderingContext2d::begin_path(self);
	}

	fn move_to(&mut self, p: Point) {
		CanvasRenderingContext2d::move_to(self, p.x, p.y);
	}

	fn line_to(&mut self, p: Point) {
		CanvasRenderingContext2d::line_to(self, p.x, p.y);
	}

	fn bezier_to(&mut self, c1: Point, c2: Point, to: Point) {
		self.bezier_curve_to(c1.x, c1.y, c2.x, c2.y, to.x, to.y);
	}

	fn stroke(&mut self) {
		CanvasRenderingContext2d::stroke(self);
	}

	fn fill_polygon(&mut self, points: &[Point], color: &str) {
		let Some((first, rest)) = points.split_first() else {
			return;
		};
		let _ = self.set_line_dash(&js_sys::Array::new());
		self.set_fill_style_str(color);
		CanvasRenderingContext2d::begin_path(self);
		CanvasRenderingContext2d::move_to(self, first.x, first.y);
		for p in rest {
			CanvasRenderingContext2d::line_to(self, p.x, p.y);
		}
		self.close_path();
		self.fill();
	}

	fn fill_rect(&mut self, origin: Point, width: f64, height: f64, color: &str) {
		self.set_fill_style_str(color);
		CanvasRenderingContext2d::fill_rect(self, origin.x, origin.y, width, height);
	}

	fn stroke_rect(&mut self, origin: Point, width: f64, height: f64, color: &str, line_width: f64) {
		self.set_stroke_style_str(color);
		self.set_line_width(line_width);
		CanvasRenderingContext2d::stroke_rect(self, origin.x, origin.y, width, height);
	}
}

#[cfg(test)]
pub(crate) mod recording {
	use super::*;

	/// One recorded drawing call.
	#[derive(Clone, Debug, PartialEq)]
	pub enum Op {
		Clear(f64, f64),
		Save,
		Restore,
		Transform(Point, f64),
		Stroke { color: String, width: f64, glow: f64 },
		Dash(Vec<f64>),
		BeginPath,
		MoveTo(Point),
		LineTo(Point),
		BezierTo(Point, Point, Point),
		StrokePath,
		FillPolygon(Vec<Point>, String),
		FillRect(Point, f64, f64, String),
		StrokeRect(Point, f64, f64, String),
	}

	#[derive(Debug, Default)]
	pub struct Recorder {
		pub ops: Vec<Op>,
	}

	impl Recorder {
		pub fn count(&self, pred: impl Fn(&Op) -> bool) -> usize {
			self.ops.iter().filter(|op| pred(op)).count()
		}
	}

	impl Surface for Recorder {
		fn clear(&mut self, width: f64, height: f64) {
			self.ops.push(Op::Clear(width, height));
		}

		fn save(&mut self) {
			self.ops.push(Op::Save);
		}

		fn restore(&mut self) {
			self.ops.push(Op::Restore);
		}

		fn transform(&mut self, pan: Point, zoom: f64) {
			self.ops.push(Op::Transform(pan, zoom));
		}

		fn set_stroke(&mut self, color: &str, width: f64, glow: f64) {
			self.ops.push(Op::Stroke {
				color: color.to_owned(),
				width,
				glow,
			});
		}

		fn set_dash(&mut self, dash: &[f64]) {
			self.ops.push(Op::Dash(dash.to_vec()));
		}

		fn begin_path(&mut self) {
			self.ops.push(Op::BeginPath);
		}

		fn move_to(&mut self, p: Point) {
			self.ops.push(Op::MoveTo(p));
		}

		fn line_to(&mut self, p: Point) {
			self.ops.push(Op::LineTo(p));
		}

		fn bezier_to(&mut self, c1: Point, c2: Point, to: Point) {
			self.ops.push(Op::BezierTo(c1, c2, to));
		}

		fn stroke(&mut self) {
			self.ops.push(Op::StrokePath);
		}

		fn fill_polygon(&mut self, points: &[Point], color: &str) {
			self.ops.push(Op::FillPolygon(points.to_vec(), color.to_owned()));
		}

		fn fill_rect(&mut self, origin: Point, width: f64, height: f64, color: &str) {
			self.ops.push(Op::FillRect(origin, width, height, color.to_owned()));
		}

		fn stroke_rect(&mut self, origin: Point, width: f64, height: f64, color: &str, _line_width: f64) {
			self.ops.push(Op::StrokeRect(origin, width, height, color.to_owned()));
		}
	}
}
