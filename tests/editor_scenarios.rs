//! End-to-end editing sessions driven through the public controller API, the
//! same calls the browser component makes for each DOM event.

use flow_diagram_canvas::components::flow_editor::connector::anchor;
use flow_diagram_canvas::components::flow_editor::state::{MAX_ZOOM, MIN_ZOOM};
use flow_diagram_canvas::{
	ConnectorRef, Diagram, EditorState, Link, Node, NodeId, Point, PointerButton, Redraw, Side,
};
use proptest::prelude::*;

fn editor(nodes: Vec<Node>, links: Vec<Link>) -> EditorState {
	EditorState::new(Diagram::new(nodes, links), 800.0, 600.0)
}

/// Press at `from`, move to `to`, release there.
fn drag(state: &mut EditorState, from: Point, to: Point) -> Redraw {
	let down = state.pointer_down(from, PointerButton::Primary);
	let moved = state.pointer_move(to);
	down.merge(moved).merge(state.pointer_up(to))
}

fn click(state: &mut EditorState, at: Point) -> Redraw {
	let down = state.pointer_down(at, PointerButton::Primary);
	down.merge(state.pointer_up(at))
}

fn dot(state: &EditorState, id: &str, side: Side) -> Point {
	let node = state.diagram.node(&NodeId::from(id)).expect("node exists");
	state.transform.world_to_screen(anchor(node, side))
}

#[test]
fn connect_select_and_delete_link() {
	let mut state = editor(
		vec![Node::new("a", "A", 0.0, 0.0), Node::new("b", "B", 300.0, 0.0)],
		vec![],
	);
	let nodes_before = state.diagram.nodes.clone();

	let from = dot(&state, "a", Side::Right);
	let to = dot(&state, "b", Side::Left);
	assert_eq!(drag(&mut state, from, to), Redraw::Full);

	let json: serde_json::Value =
		serde_json::from_str(&state.diagram.to_json().unwrap()).unwrap();
	assert_eq!(
		json["links"],
		serde_json::json!([{
			"sourceId": "a",
			"sourcePosition": "right",
			"targetId": "b",
			"targetPosition": "left"
		}])
	);

	assert_eq!(click(&mut state, Point::new(200.0, 25.0)), Redraw::Full);
	assert_eq!(state.selection.link(), Some(0));

	assert_eq!(state.key_down("Delete"), Redraw::Full);
	assert!(state.diagram.links.is_empty());
	assert_eq!(state.diagram.nodes, nodes_before);
}

#[test]
fn rewiring_target_leaves_source_untouched() {
	let mut state = editor(
		vec![
			Node::new("n1", "N1", 0.0, 0.0),
			Node::new("n2", "N2", 300.0, 0.0),
			Node::new("n3", "N3", 150.0, 200.0),
		],
		vec![],
	);
	let (n1_right, n2_left) = (dot(&state, "n1", Side::Right), dot(&state, "n2", Side::Left));
	drag(&mut state, n1_right, n2_left);
	click(&mut state, Point::new(200.0, 25.0));
	assert_eq!(state.selection.link(), Some(0));

	let n3_top = dot(&state, "n3", Side::Top);
	assert_eq!(drag(&mut state, n2_left, n3_top), Redraw::Full);

	assert_eq!(
		state.diagram.links,
		vec![Link::new(
			ConnectorRef::new("n1", Side::Right),
			ConnectorRef::new("n3", Side::Top)
		)]
	);
	assert!(state.interaction.is_idle());
}

#[test]
fn fresh_self_loop_rejected_but_rewire_onto_source_node_allowed() {
	let mut state = editor(
		vec![Node::new("n1", "N1", 0.0, 0.0), Node::new("n2", "N2", 300.0, 0.0)],
		vec![],
	);
	let (top, bottom) = (dot(&state, "n1", Side::Top), dot(&state, "n1", Side::Bottom));
	drag(&mut state, top, bottom);
	assert!(state.diagram.links.is_empty());

	state.diagram.links.push(Link::new(
		ConnectorRef::new("n1", Side::Top),
		ConnectorRef::new("n2", Side::Left),
	));
	// Straight link from (50, 0) to (300, 25); (175, 12.5) lies on it.
	click(&mut state, Point::new(175.0, 12.5));
	assert_eq!(state.selection.link(), Some(0));

	let n2_left = dot(&state, "n2", Side::Left);
	drag(&mut state, n2_left, bottom);
	assert_eq!(
		state.diagram.links[0],
		Link::new(ConnectorRef::new("n1", Side::Top), ConnectorRef::new("n1", Side::Bottom))
	);
}

#[test]
fn deleting_node_cascades_only_its_links() {
	let ab = Link::new(ConnectorRef::new("a", Side::Right), ConnectorRef::new("b", Side::Left));
	let bc = Link::new(ConnectorRef::new("b", Side::Bottom), ConnectorRef::new("c", Side::Top));
	let ca = Link::new(ConnectorRef::new("c", Side::Left), ConnectorRef::new("a", Side::Bottom));
	let mut state = editor(
		vec![
			Node::new("a", "A", 0.0, 0.0),
			Node::new("b", "B", 300.0, 0.0),
			Node::new("c", "C", 300.0, 300.0),
		],
		vec![ab, bc.clone(), ca],
	);

	click(&mut state, Point::new(40.0, 30.0));
	assert_eq!(state.selection.node(), Some(&NodeId::from("a")));
	state.key_down("Delete");

	assert_eq!(state.diagram.links, vec![bc]);
	assert!(!state.diagram.contains_node(&NodeId::from("a")));
}

#[test]
fn zoomed_out_view_widens_world_hit_band() {
	let mut state = editor(
		vec![Node::new("a", "A", 0.0, 0.0), Node::new("b", "B", 300.0, 0.0)],
		vec![Link::new(
			ConnectorRef::new("a", Side::Right),
			ConnectorRef::new("b", Side::Left),
		)],
	);
	state.transform.k = 0.5;
	// 12 world units off the line is 6 screen pixels at half zoom.
	let screen = state.transform.world_to_screen(Point::new(200.0, 37.0));
	click(&mut state, screen);
	assert_eq!(state.selection.link(), Some(0));
}

#[test]
fn dragging_node_moves_link_endpoints() {
	let mut state = editor(
		vec![Node::new("a", "A", 0.0, 0.0), Node::new("b", "B", 300.0, 0.0)],
		vec![Link::new(
			ConnectorRef::new("a", Side::Right),
			ConnectorRef::new("b", Side::Left),
		)],
	);
	let redraw = drag(&mut state, Point::new(350.0, 25.0), Point::new(350.0, 125.0));
	assert_eq!(redraw, Redraw::Full);
	let (_, to, _, _) = state.link_geometry(0).unwrap();
	assert_eq!(to, Point::new(300.0, 125.0));
}

#[test]
fn host_supplied_json_is_editable() {
	let json = r#"{
		"nodes": [
			{"id": "s", "label": "Start", "x": 0, "y": 0, "shapeType": "ellipse"},
			{"id": "e", "label": "End", "x": 400, "y": 0, "width": 120, "height": 60}
		],
		"links": [
			{"sourceId": "s", "sourcePosition": "right", "targetId": "e", "targetPosition": "left"}
		]
	}"#;
	let diagram = Diagram::from_json(json).unwrap();
	let state = EditorState::new(diagram, 800.0, 600.0);
	let (from, to, _, _) = state.link_geometry(0).unwrap();
	assert_eq!(from, Point::new(100.0, 25.0));
	assert_eq!(to, Point::new(400.0, 30.0));
}

proptest! {
	#[test]
	fn wheel_keeps_world_point_under_cursor(
		x in -500.0..500.0f64,
		y in -500.0..500.0f64,
		k in MIN_ZOOM..MAX_ZOOM,
		px in 0.0..800.0f64,
		py in 0.0..600.0f64,
		zoom_in in any::<bool>(),
	) {
		let mut state = editor(vec![], vec![]);
		state.transform.x = x;
		state.transform.y = y;
		state.transform.k = k;
		let cursor = Point::new(px, py);
		let world = state.screen_to_world(cursor);

		state.wheel(cursor, if zoom_in { -100.0 } else { 100.0 });

		prop_assert!((MIN_ZOOM..=MAX_ZOOM).contains(&state.transform.k));
		let back = state.transform.world_to_screen(world);
		prop_assert!(back.distance(cursor) < 1e-6);
	}

	#[test]
	fn anchors_sit_on_edge_midpoints_regardless_of_view(
		nx in -1000.0..1000.0f64,
		ny in -1000.0..1000.0f64,
		w in 20.0..300.0f64,
		h in 20.0..300.0f64,
		pan_x in -400.0..400.0f64,
		pan_y in -400.0..400.0f64,
		k in MIN_ZOOM..MAX_ZOOM,
	) {
		let node = Node::new("n", "N", nx, ny).with_size(w, h);
		let mut state = editor(vec![node.clone()], vec![]);
		let before: Vec<Point> = Side::ALL.iter().map(|&s| anchor(&node, s)).collect();

		state.transform.x = pan_x;
		state.transform.y = pan_y;
		state.transform.k = k;
		let after: Vec<Point> = Side::ALL
			.iter()
			.map(|&s| anchor(&state.diagram.nodes[0], s))
			.collect();

		prop_assert_eq!(&before, &after);
		prop_assert_eq!(before[0], Point::new(nx + w / 2.0, ny));
		prop_assert_eq!(before[1], Point::new(nx + w, ny + h / 2.0));
		prop_assert_eq!(before[2], Point::new(nx + w / 2.0, ny + h));
		prop_assert_eq!(before[3], Point::new(nx, ny + h / 2.0));
	}
}
