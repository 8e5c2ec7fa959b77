//! Connector anchors on node bounding boxes.
//!
//! Anchors are computed on demand from the node's current position and size;
//! nothing here is cached, so a node being dragged always resolves correctly.

use super::types::{ConnectorRef, Diagram, Node, Point, Side};

/// Radius of a connector dot in node space (the dot is a 10px circle).
pub const DOT_RADIUS: f64 = 5.0;

/// Extra slack around a dot when deciding whether the pointer is on it, in world units.
pub const DOT_HIT_SLOP: f64 = 2.0;

/// Distance in screen pixels within which unconnected dots are revealed.
pub const PROXIMITY_RADIUS: f64 = 40.0;

/// World-space midpoint of the given edge of the node's bounding box.
pub fn anchor(node: &Node, side: Side) -> Point {
	let offset = match side {
		Side::Top => Point::new(node.width / 2.0, 0.0),
		Side::Right => Point::new(node.width, node.height / 2.0),
		Side::Bottom => Point::new(node.width / 2.0, node.height),
		Side::Left => Point::new(0.0, node.height / 2.0),
	};
	node.origin() + offset
}

/// Resolves a connector against the diagram. Dangling references yield `None`.
pub fn resolve(diagram: &Diagram, connector: &ConnectorRef) -> Option<(Point, Point)> {
	diagram
		.node(&connector.node_id)
		.map(|node| (anchor(node, connector.side), connector.side.direction()))
}

/// The connector dot under `world`, checking later (visually topmost) nodes first.
pub fn connector_at(diagram: &Diagram, world: Point) -> Option<ConnectorRef> {
	let reach = DOT_RADIUS + DOT_HIT_SLOP;
	diagram.nodes.iter().rev().find_map(|node| {
		Side::ALL
			.into_iter()
			.find(|&side| anchor(node, side).distance(world) <= reach)
			.map(|side| ConnectorRef::new(node.id.clone(), side))
	})
}

/// Unconnected connectors whose dot centre lies within [`PROXIMITY_RADIUS`] screen pixels.
pub fn nearby_unconnected(diagram: &Diagram, world: Point, zoom: f64) -> Vec<ConnectorRef> {
	let mut found = Vec::new();
	for node in &diagram.nodes {
		for side in Side::ALL {
			let connector = ConnectorRef::new(node.id.clone(), side);
			if anchor(node, side).distance(world) * zoom < PROXIMITY_RADIUS
				&& !diagram.is_connected(&connector)
			{
				found.push(connector);
			}
		}
	}
	found
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::components::flow_editor::types::Link;

	fn diagram() -> Diagram {
		Diagram::new(
			vec![
				Node::new("a", "A", 10.0, 20.0).with_size(120.0, 60.0),
				Node::new("b", "B", 300.0, 0.0),
			],
			vec![Link::new(ConnectorRef::new("a", Side::Right), ConnectorRef::new("b", Side::Left))],
		)
	}

	#[test]
	fn anchors_sit_on_edge_midpoints() {
		let d = diagram();
		let a = &d.nodes[0];
		assert_eq!(anchor(a, Side::Top), Point::new(70.0, 20.0));
		assert_eq!(anchor(a, Side::Right), Point::new(130.0, 50.0));
		assert_eq!(anchor(a, Side::Bottom), Point::new(70.0, 80.0));
		assert_eq!(anchor(a, Side::Left), Point::new(10.0, 50.0));
	}

	#[test]
	fn resolve_skips_missing_nodes() {
		let d = diagram();
		assert!(resolve(&d, &ConnectorRef::new("ghost", Side::Top)).is_none());
		let (p, dir) = resolve(&d, &ConnectorRef::new("b", Side::Left)).unwrap();
		assert_eq!(p, Point::new(300.0, 25.0));
		assert_eq!(dir, Point::new(-1.0, 0.0));
	}

	#[test]
	fn connector_at_finds_dot_including_outside_half() {
		let d = diagram();
		assert_eq!(
			connector_at(&d, Point::new(70.0, 16.0)),
			Some(ConnectorRef::new("a", Side::Top))
		);
		assert_eq!(connector_at(&d, Point::new(70.0, 50.0)), None);
	}

	#[test]
	fn connector_at_prefers_topmost_node() {
		let d = Diagram::new(
			vec![Node::new("under", "U", 0.0, 0.0), Node::new("over", "O", 0.0, 0.0)],
			vec![],
		);
		assert_eq!(
			connector_at(&d, Point::new(0.0, 25.0)),
			Some(ConnectorRef::new("over", Side::Left))
		);
	}

	#[test]
	fn proximity_ignores_connected_dots_and_scales_with_zoom() {
		let d = diagram();
		// Right of `a` is connected; 30 world units away from its anchor.
		let near_a_right = Point::new(160.0, 50.0);
		assert!(nearby_unconnected(&d, near_a_right, 1.0).is_empty());

		let near_a_bottom = Point::new(70.0, 110.0);
		assert_eq!(
			nearby_unconnected(&d, near_a_bottom, 1.0),
			vec![ConnectorRef::new("a", Side::Bottom)]
		);
		assert!(nearby_unconnected(&d, near_a_bottom, 2.0).is_empty());
	}
}
