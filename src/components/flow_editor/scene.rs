//! Redraw engine for the two layers: a retained node layer rebuilt from a
//! snapshot, and an immediate link layer repainted from scratch.

use super::connector::resolve;
use super::render::{LinkStyle, Surface, render_link};
use super::state::{EditorState, Interaction};
use super::types::{ConnectorRef, LinkEnd, Point, Side};

/// Which layers a state change invalidates.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum Redraw {
	None,
	/// Repaint the link canvas (and minimap) only.
	Links,
	/// Regenerate every node element, then repaint links.
	Full,
}

impl Redraw {
	pub fn merge(self, other: Redraw) -> Redraw {
		self.max(other)
	}
}

/// One connector dot in the node layer.
#[derive(Clone, Debug, PartialEq)]
pub struct ConnectorVisual {
	pub side: Side,
	pub unconnected: bool,
	/// Endpoint of the selected link.
	pub link_end: bool,
	pub nearby: bool,
}

impl ConnectorVisual {
	pub fn class_name(&self) -> String {
		let mut class = String::from("connector-dot");
		if self.unconnected {
			class.push_str(" unconnected");
		}
		if self.link_end {
			class.push_str(" link-end");
		}
		if self.nearby {
			class.push_str(" nearby");
		}
		class
	}

	/// Centres the 10px dot on the midpoint of its edge.
	pub fn style(&self) -> &'static str {
		match self.side {
			Side::Top => "left: 50%; top: -5px; transform: translateX(-50%);",
			Side::Right => "top: 50%; right: -5px; transform: translateY(-50%);",
			Side::Bottom => "left: 50%; bottom: -5px; transform: translateX(-50%);",
			Side::Left => "top: 50%; left: -5px; transform: translateY(-50%);",
		}
	}
}

/// One node element in the retained layer.
#[derive(Clone, Debug, PartialEq)]
pub struct NodeVisual {
	pub id: String,
	pub label: String,
	pub x: f64,
	pub y: f64,
	pub width: f64,
	pub height: f64,
	pub shape: &'static str,
	pub selected: bool,
	pub connectors: Vec<ConnectorVisual>,
}

impl NodeVisual {
	pub fn class_name(&self) -> String {
		let mut class = format!("flow-node {}", self.shape);
		if self.selected {
			class.push_str(" selected");
		}
		class
	}

	pub fn style(&self) -> String {
		format!(
			"left: {}px; top: {}px; width: {}px; height: {}px; line-height: {}px; border: {};",
			self.x,
			self.y,
			self.width,
			self.height,
			self.height,
			if self.selected { "2px solid #2a80ff" } else { "1px solid black" },
		)
	}
}

/// Snapshot of the node layer for the current state.
pub fn node_layer(state: &EditorState) -> Vec<NodeVisual> {
	let selected_link = state.selection.link().and_then(|i| state.diagram.links.get(i));
	state
		.diagram
		.nodes
		.iter()
		.map(|node| NodeVisual {
			id: node.id.to_string(),
			label: node.label.clone(),
			x: node.x,
			y: node.y,
			width: node.width,
			height: node.height,
			shape: node.shape.css_class(),
			selected: state.selection.node() == Some(&node.id),
			connectors: Side::ALL
				.into_iter()
				.map(|side| {
					let connector = ConnectorRef::new(node.id.clone(), side);
					let unconnected = !state.diagram.is_connected(&connector);
					ConnectorVisual {
						side,
						unconnected,
						link_end: selected_link.is_some_and(|l| l.touches(&connector)),
						nearby: unconnected && state.nearby.contains(&connector),
					}
				})
				.collect(),
		})
		.collect()
}

/// Clears the link canvas and draws every resolvable link plus the ghost link of
/// an in-progress create or rewire.
pub fn paint_links<S: Surface + ?Sized>(state: &EditorState, surface: &mut S) {
	surface.clear(state.width, state.height);
	surface.save();
	surface.transform(state.transform.pan(), state.transform.k);

	let selected = state.selection.link();
	for index in 0..state.diagram.links.len() {
		let Some((p1, p2, d1, d2)) = state.link_geometry(index) else {
			continue;
		};
		let style = LinkStyle::new(&state.config, selected == Some(index));
		render_link(surface, p1, p2, (d1, d2), style);
	}

	if let Some((p1, p2, dirs)) = ghost(state) {
		render_link(surface, p1, p2, dirs, LinkStyle::new(&state.config, false));
	}

	surface.restore();
}

/// Endpoints of the preview link: one end anchored, the other at the pointer.
fn ghost(state: &EditorState) -> Option<(Point, Point, (Point, Point))> {
	match &state.interaction {
		Interaction::CreatingLink { from, pointer } => {
			let (anchor, dir) = resolve(&state.diagram, from)?;
			Some((anchor, *pointer, (dir, Point::ZERO)))
		}
		Interaction::RewiringLink {
			link_index,
			end,
			pointer,
		} => {
			let link = state.diagram.links.get(*link_index)?;
			let (fixed, dir) = resolve(&state.diagram, &link.endpoint(end.opposite()))?;
			Some(match end {
				LinkEnd::Source => (*pointer, fixed, (Point::ZERO, dir)),
				LinkEnd::Target => (fixed, *pointer, (dir, Point::ZERO)),
			})
		}
		_ => None,
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::components::flow_editor::render::recording::{Op, Recorder};
	use crate::components::flow_editor::render::{ACCENT_COLOR, LINK_COLOR};
	use crate::components::flow_editor::state::Selection;
	use crate::components::flow_editor::types::{Diagram, Link, Node};

	fn state() -> EditorState {
		EditorState::new(
			Diagram::new(
				vec![Node::new("a", "A", 0.0, 0.0), Node::new("b", "B", 300.0, 0.0)],
				vec![
					Link::new(ConnectorRef::new("a", Side::Right), ConnectorRef::new("b", Side::Left)),
					Link::new(ConnectorRef::new("a", Side::Top), ConnectorRef::new("gone", Side::Top)),
				],
			),
			640.0,
			480.0,
		)
	}

	fn strokes(rec: &Recorder) -> Vec<String> {
		rec.ops
			.iter()
			.filter_map(|op| match op {
				Op::Stroke { color, .. } => Some(color.clone()),
				_ => None,
			})
			.collect()
	}

	#[test]
	fn rebuild_is_idempotent() {
		let s = state();
		assert_eq!(node_layer(&s), node_layer(&s));
	}

	#[test]
	fn connector_classes_reflect_links_and_selection() {
		let mut s = state();
		s.selection = Selection::Link(0);
		let layer = node_layer(&s);
		let a_right = &layer[0].connectors[1];
		assert_eq!(a_right.side, Side::Right);
		assert_eq!(a_right.class_name(), "connector-dot link-end");
		// A link to a missing node still counts as connecting `a`'s top dot.
		assert_eq!(layer[0].connectors[0].class_name(), "connector-dot");
		assert_eq!(layer[0].connectors[2].class_name(), "connector-dot unconnected");
		assert_eq!(layer[1].connectors[3].class_name(), "connector-dot link-end");
	}

	#[test]
	fn selected_node_gets_accent_border() {
		let mut s = state();
		s.selection = Selection::Node("b".into());
		let layer = node_layer(&s);
		assert!(!layer[0].selected);
		assert_eq!(layer[1].class_name(), "flow-node rect selected");
		assert!(layer[1].style().contains("2px solid #2a80ff"));
	}

	#[test]
	fn nearby_only_marks_unconnected_dots() {
		let mut s = state();
		s.nearby.insert(ConnectorRef::new("a", Side::Bottom));
		s.nearby.insert(ConnectorRef::new("a", Side::Right));
		let layer = node_layer(&s);
		assert!(layer[0].connectors[2].nearby);
		assert!(!layer[0].connectors[1].nearby);
	}

	#[test]
	fn paint_skips_dangling_links_and_wraps_in_transform() {
		let s = state();
		let mut rec = Recorder::default();
		paint_links(&s, &mut rec);
		assert_eq!(rec.ops[0], Op::Clear(640.0, 480.0));
		assert_eq!(rec.ops[1], Op::Save);
		assert_eq!(rec.ops[2], Op::Transform(Point::ZERO, 1.0));
		assert_eq!(rec.ops.last(), Some(&Op::Restore));
		assert_eq!(rec.count(|op| matches!(op, Op::StrokePath)), 1);
	}

	#[test]
	fn selected_link_painted_in_accent() {
		let mut s = state();
		s.selection = Selection::Link(0);
		let mut rec = Recorder::default();
		paint_links(&s, &mut rec);
		assert_eq!(strokes(&rec), vec![ACCENT_COLOR.to_owned()]);
	}

	#[test]
	fn rewire_ghost_keeps_other_end_fixed() {
		let mut s = state();
		s.interaction = Interaction::RewiringLink {
			link_index: 0,
			end: LinkEnd::Target,
			pointer: Point::new(500.0, 400.0),
		};
		let mut rec = Recorder::default();
		paint_links(&s, &mut rec);
		assert_eq!(strokes(&rec), vec![LINK_COLOR.to_owned(), LINK_COLOR.to_owned()]);
		let moves: Vec<_> = rec
			.ops
			.iter()
			.filter_map(|op| match op {
				Op::MoveTo(p) => Some(*p),
				_ => None,
			})
			.collect();
		assert_eq!(moves, vec![Point::new(100.0, 25.0), Point::new(100.0, 25.0)]);
		assert!(rec.ops.contains(&Op::LineTo(Point::new(500.0, 400.0))));
	}

	#[test]
	fn redraw_merge_keeps_strongest() {
		assert_eq!(Redraw::None.merge(Redraw::Links), Redraw::Links);
		assert_eq!(Redraw::Full.merge(Redraw::Links), Redraw::Full);
	}
}
