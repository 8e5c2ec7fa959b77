//! Read-only overview of the whole diagram with the visible area outlined.

use super::render::Surface;
use super::state::EditorState;
use super::types::Point;

pub const MINIMAP_WIDTH: f64 = 200.0;
pub const MINIMAP_HEIGHT: f64 = 150.0;
/// World-space margin around the node bounds.
pub const MINIMAP_PADDING: f64 = 100.0;
pub const MINIMAP_NODE_COLOR: &str = "#333";
pub const MINIMAP_VIEW_COLOR: &str = "red";
pub const MINIMAP_VIEW_WIDTH: f64 = 2.0;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Rect {
	pub origin: Point,
	pub width: f64,
	pub height: f64,
}

/// Minimap-space geometry derived from the editor state.
#[derive(Clone, Debug, PartialEq)]
pub struct MinimapLayout {
	pub scale: f64,
	/// World point drawn at the minimap's top-left corner.
	pub world_origin: Point,
	pub nodes: Vec<Rect>,
	pub viewport: Rect,
}

impl MinimapLayout {
	/// Fits the padded node bounds into the overview. `None` when there are no nodes.
	///
	/// Bounds and boxes use each node's own width and height rather than a fixed
	/// 100x50 nominal size, so resized nodes are drawn to scale.
	pub fn compute(state: &EditorState, width: f64, height: f64) -> Option<Self> {
		if state.diagram.nodes.is_empty() {
			return None;
		}
		let mut min = Point::new(f64::INFINITY, f64::INFINITY);
		let mut max = Point::new(f64::NEG_INFINITY, f64::NEG_INFINITY);
		for node in &state.diagram.nodes {
			min.x = min.x.min(node.x);
			min.y = min.y.min(node.y);
			max.x = max.x.max(node.x + node.width);
			max.y = max.y.max(node.y + node.height);
		}
		let min = min - Point::new(MINIMAP_PADDING, MINIMAP_PADDING);
		let max = max + Point::new(MINIMAP_PADDING, MINIMAP_PADDING);
		let scale = (width / (max.x - min.x)).min(height / (max.y - min.y));
		let to_map = |origin: Point, w: f64, h: f64| Rect {
			origin: (origin - min) * scale,
			width: w * scale,
			height: h * scale,
		};

		let t = &state.transform;
		let view_origin = t.screen_to_world(Point::ZERO);
		Some(Self {
			scale,
			world_origin: min,
			nodes: state
				.diagram
				.nodes
				.iter()
				.map(|n| to_map(n.origin(), n.width, n.height))
				.collect(),
			viewport: to_map(view_origin, state.width / t.k, state.height / t.k),
		})
	}
}

/// Clears the minimap and draws node boxes plus the viewport outline.
pub fn paint_minimap<S: Surface + ?Sized>(state: &EditorState, surface: &mut S) {
	surface.clear(MINIMAP_WIDTH, MINIMAP_HEIGHT);
	let Some(layout) = MinimapLayout::compute(state, MINIMAP_WIDTH, MINIMAP_HEIGHT) else {
		return;
	};
	for rect in &layout.nodes {
		surface.fill_rect(rect.origin, rect.width, rect.height, MINIMAP_NODE_COLOR);
	}
	let view = layout.viewport;
	surface.stroke_rect(view.origin, view.width, view.height, MINIMAP_VIEW_COLOR, MINIMAP_VIEW_WIDTH);
}
