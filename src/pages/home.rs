use leptos::prelude::*;
use log::{error, info};

use crate::components::flow_editor::{
	ConnectorRef, FlowEditor, FlowEditorHandle, Link, Node, ShapeKind, Side,
};

/// Small process diagram to start from.
fn sample_diagram() -> (Vec<Node>, Vec<Link>) {
	let nodes = vec![
		Node::new("start", "Start", 80.0, 120.0).with_shape(ShapeKind::Ellipse),
		Node::new("check", "Valid?", 280.0, 110.0)
			.with_size(120.0, 70.0)
			.with_shape(ShapeKind::Diamond),
		Node::new("save", "Save", 500.0, 60.0),
		Node::new("retry", "Retry", 500.0, 200.0).with_shape(ShapeKind::Parallelogram),
	];
	let link = |from: &str, from_side, to: &str, to_side| {
		Link::new(ConnectorRef::new(from, from_side), ConnectorRef::new(to, to_side))
	};
	let links = vec![
		link("start", Side::Right, "check", Side::Left),
		link("check", Side::Top, "save", Side::Left),
		link("check", Side::Bottom, "retry", Side::Left),
	];
	(nodes, links)
}

/// Default Home Page
#[component]
pub fn Home() -> impl IntoView {
	let (nodes, links) = sample_diagram();
	let editor = FlowEditorHandle::new(nodes, links);
	let export = editor.clone();

	let log_diagram = move |_| match export.diagram().to_json() {
		Ok(json) => info!("diagram: {json}"),
		Err(err) => error!("diagram export failed: {err}"),
	};

	view! {
		<div class="fullscreen-editor">
			<FlowEditor editor=editor />
			<div class="editor-overlay">
				<h1>"Flow Diagram"</h1>
				<p class="subtitle">
					"Drag from a dot to link. Click a link, then drag its end dot to rewire. Delete removes the selection. Middle-drag pans, wheel zooms."
				</p>
				<button class="btn btn-light btn-sm" on:click=log_diagram>
					"Log JSON"
				</button>
			</div>
		</div>
	}
}
