use std::cell::RefCell;
use std::rc::Rc;

use leptos::prelude::*;
use log::{debug, error, info, warn};
use send_wrapper::SendWrapper;
use wasm_bindgen::prelude::*;
use web_sys::{
	CanvasRenderingContext2d, Element, Event, HtmlCanvasElement, HtmlElement, KeyboardEvent,
	MouseEvent, WheelEvent,
};

use super::config::EditorConfig;
use super::error::{EditorError, Result};
use super::interaction::PointerButton;
use super::minimap::{MINIMAP_HEIGHT, MINIMAP_WIDTH, paint_minimap};
use super::scene::{NodeVisual, Redraw, node_layer, paint_links};
use super::state::{EditorState, Interaction};
use super::types::{Diagram, LineMode, Link, Node, Point};

type RedrawHook = Rc<dyn Fn(Redraw)>;
type Listener = Rc<RefCell<Option<Closure<dyn FnMut(MouseEvent)>>>>;
type WindowListeners = Rc<RefCell<Vec<(&'static str, Closure<dyn FnMut(Event)>)>>>;

/// Host-side handle to one editor mount.
///
/// The host creates it from its initial nodes and links, passes a clone to
/// [`FlowEditor`], and keeps another to drive programmatic changes. Several
/// editors on one page each own their own handle.
#[derive(Clone)]
pub struct FlowEditorHandle {
	state: Rc<RefCell<EditorState>>,
	redraw: Rc<RefCell<Option<RedrawHook>>>,
}

impl FlowEditorHandle {
	pub fn new(nodes: Vec<Node>, links: Vec<Link>) -> Self {
		Self::from_diagram(Diagram::new(nodes, links))
	}

	pub fn from_diagram(diagram: Diagram) -> Self {
		Self {
			state: Rc::new(RefCell::new(EditorState::new(diagram, 0.0, 0.0))),
			redraw: Rc::new(RefCell::new(None)),
		}
	}

	pub fn with_config(self, config: EditorConfig) -> Self {
		self.state.borrow_mut().config = config;
		self
	}

	/// Copy of the current model, e.g. for the host to persist.
	pub fn diagram(&self) -> Diagram {
		self.state.borrow().diagram.clone()
	}

	pub fn config(&self) -> EditorConfig {
		self.state.borrow().config
	}

	/// Applies a host-driven change to the model, re-resolves selection, and rebuilds.
	pub fn update(&self, f: impl FnOnce(&mut Diagram)) {
		self.state.borrow_mut().edit_diagram(f);
		self.redraw_all();
	}

	/// Forces a full rebuild of both layers.
	pub fn redraw_all(&self) {
		self.request(Redraw::Full);
	}

	pub fn set_line_mode(&self, mode: LineMode) {
		self.dispatch(|s| s.set_line_mode(mode));
	}

	pub fn toggle_arrow(&self) {
		self.dispatch(EditorState::toggle_arrow);
	}

	pub fn toggle_dashed(&self) {
		self.dispatch(EditorState::toggle_dashed);
	}

	pub fn add_node(&self) {
		self.dispatch(EditorState::add_node_action);
	}

	fn dispatch(&self, f: impl FnOnce(&mut EditorState) -> Redraw) {
		let redraw = f(&mut self.state.borrow_mut());
		self.request(redraw);
	}

	fn request(&self, redraw: Redraw) {
		let hook = self.redraw.borrow().clone();
		match hook {
			Some(hook) => hook(redraw),
			None => debug!("redraw {redraw:?} before mount ignored"),
		}
	}
}

/// DOM handles of a mounted editor.
struct Surfaces {
	container: HtmlElement,
	viewport: HtmlElement,
	canvas: HtmlCanvasElement,
	links: CanvasRenderingContext2d,
	minimap: CanvasRenderingContext2d,
}

impl Surfaces {
	fn new(
		container: HtmlElement,
		viewport: HtmlElement,
		canvas: HtmlCanvasElement,
		minimap: HtmlCanvasElement,
	) -> Result<Self> {
		Ok(Self {
			links: context_2d(&canvas)?,
			minimap: context_2d(&minimap)?,
			container,
			viewport,
			canvas,
		})
	}

	/// Container-relative pointer position.
	fn pointer(&self, ev: &MouseEvent) -> Point {
		let rect = self.container.get_bounding_client_rect();
		Point::new(
			ev.client_x() as f64 - rect.left(),
			ev.client_y() as f64 - rect.top(),
		)
	}

	/// Resizes the link canvas backing store to the container.
	fn fit(&self) -> (f64, f64) {
		let (w, h) = (
			self.container.client_width() as f64,
			self.container.client_height() as f64,
		);
		self.canvas.set_width(w as u32);
		self.canvas.set_height(h as u32);
		(w, h)
	}

	fn set_cursor(&self, cursor: &str) {
		let _ = self.container.style().set_property("cursor", cursor);
	}

	fn repaint(&mut self, state: &EditorState) {
		let _ = self
			.viewport
			.style()
			.set_property("transform", &state.transform.css());
		paint_links(state, &mut self.links);
		paint_minimap(state, &mut self.minimap);
	}

	/// Moves the dragged node's element without rebuilding the layer.
	fn sync_dragged_node(&self, state: &EditorState) {
		let Interaction::DraggingNode { node_id, .. } = &state.interaction else {
			return;
		};
		let Some(node) = state.diagram.node(node_id) else {
			return;
		};
		let element = elements(&self.viewport, ".flow-node")
			.into_iter()
			.find(|el| el.get_attribute("data-node-id").as_deref() == Some(node_id.as_str()));
		if let Some(el) = element.and_then(|el| el.dyn_into::<HtmlElement>().ok()) {
			let style = el.style();
			let _ = style.set_property("left", &format!("{}px", node.x));
			let _ = style.set_property("top", &format!("{}px", node.y));
		}
	}

	/// Toggles the `nearby` class on dots to match the state's proximity set.
	fn sync_proximity(&self, state: &EditorState) {
		for dot in elements(&self.viewport, ".connector-dot") {
			let connector = dot
				.get_attribute("data-node-id")
				.zip(dot.get_attribute("data-side").and_then(|s| s.parse().ok()))
				.map(|(id, side)| super::types::ConnectorRef::new(id, side));
			let nearby = connector.is_some_and(|c| state.nearby.contains(&c));
			let _ = dot.class_list().toggle_with_force("nearby", nearby);
		}
	}
}

fn context_2d(canvas: &HtmlCanvasElement) -> Result<CanvasRenderingContext2d> {
	canvas
		.get_context("2d")
		.map_err(|e| EditorError::Dom(format!("getContext failed: {e:?}")))?
		.ok_or_else(|| EditorError::Dom("2d context unavailable".into()))?
		.dyn_into()
		.map_err(|_| EditorError::Dom("not a CanvasRenderingContext2d".into()))
}

fn elements(root: &HtmlElement, selector: &str) -> Vec<Element> {
	let Ok(list) = root.query_selector_all(selector) else {
		return Vec::new();
	};
	(0..list.length())
		.filter_map(|i| list.item(i))
		.filter_map(|node| node.dyn_into::<Element>().ok())
		.collect()
}

/// Document-level move/up listeners installed for the duration of one gesture,
/// so a drag that leaves the editor is still tracked and always ends.
#[derive(Clone, Default)]
struct GestureListeners {
	on_move: Listener,
	on_up: Listener,
}

impl GestureListeners {
	fn attach(&self) {
		let Some(document) = web_sys::window().and_then(|w| w.document()) else {
			return;
		};
		for (kind, slot) in [("mousemove", &self.on_move), ("mouseup", &self.on_up)] {
			if let Some(cb) = slot.borrow().as_ref() {
				let _ = document.add_event_listener_with_callback(kind, cb.as_ref().unchecked_ref());
			}
		}
	}

	fn detach(&self) {
		let Some(document) = web_sys::window().and_then(|w| w.document()) else {
			return;
		};
		for (kind, slot) in [("mousemove", &self.on_move), ("mouseup", &self.on_up)] {
			if let Some(cb) = slot.borrow().as_ref() {
				let _ =
					document.remove_event_listener_with_callback(kind, cb.as_ref().unchecked_ref());
			}
		}
	}
}

fn node_view(node: NodeVisual) -> impl IntoView {
	let (class, style) = (node.class_name(), node.style());
	let NodeVisual {
		id,
		label,
		connectors,
		..
	} = node;
	let dots = connectors
		.into_iter()
		.map(|dot| {
			view! {
				<div
					class=dot.class_name()
					style=dot.style()
					data-node-id=id.clone()
					data-side=dot.side.as_str()
				/>
			}
		})
		.collect_view();
	view! {
		<div class=class style=style data-node-id=id>
			{label}
			{dots}
		</div>
	}
}

fn toggle_class(on: bool, extra: &str) -> String {
	let base = if on { "btn btn-info btn-sm" } else { "btn btn-outline-info btn-sm" };
	format!("{base} {extra}").trim_end().to_owned()
}

#[component]
fn Toolbar(editor: FlowEditorHandle) -> impl IntoView {
	let config = RwSignal::new(editor.config());

	let modes = LineMode::ALL
		.into_iter()
		.map(|mode| {
			let editor = editor.clone();
			view! {
				<button
					class=move || {
						if config.get().line_mode == mode {
							"btn btn-secondary btn-sm me-1"
						} else {
							"btn btn-outline-secondary btn-sm me-1"
						}
					}
					on:click=move |_| {
						editor.set_line_mode(mode);
						config.set(editor.config());
					}
				>
					{mode.label()}
				</button>
			}
		})
		.collect_view();

	let (arrow_editor, dashed_editor, add_editor) = (editor.clone(), editor.clone(), editor);

	view! {
		<div
			class="flow-toolbar"
			style="position: absolute; top: 10px; left: 10px; z-index: 10;"
			on:mousedown=|ev: MouseEvent| ev.stop_propagation()
		>
			{modes}
			<button
				class=move || toggle_class(config.get().show_arrow, "me-1")
				on:click=move |_| {
					arrow_editor.toggle_arrow();
					config.set(arrow_editor.config());
				}
			>
				"Toggle Arrow"
			</button>
			<button
				class=move || toggle_class(config.get().show_dashed, "")
				on:click=move |_| {
					dashed_editor.toggle_dashed();
					config.set(dashed_editor.config());
				}
			>
				"Toggle Dotted"
			</button>
			<button class="btn btn-success btn-sm ms-2" on:click=move |_| add_editor.add_node()>
				"+ Add Node"
			</button>
		</div>
	}
}

/// Node-link diagram editor: DOM node layer over a canvas link layer, with
/// toolbar and minimap. Fills its parent element.
#[component]
pub fn FlowEditor(editor: FlowEditorHandle) -> impl IntoView {
	let container_ref = NodeRef::<leptos::html::Div>::new();
	let viewport_ref = NodeRef::<leptos::html::Div>::new();
	let canvas_ref = NodeRef::<leptos::html::Canvas>::new();
	let minimap_ref = NodeRef::<leptos::html::Canvas>::new();

	let state = editor.state.clone();
	let surfaces: Rc<RefCell<Option<Surfaces>>> = Rc::new(RefCell::new(None));
	let gesture = GestureListeners::default();
	let window_listeners: WindowListeners = Rc::new(RefCell::new(Vec::new()));
	let layer = RwSignal::new(Vec::<NodeVisual>::new());

	let apply: RedrawHook = {
		let (state, surfaces) = (state.clone(), surfaces.clone());
		Rc::new(move |redraw: Redraw| {
			if redraw == Redraw::None {
				return;
			}
			let state = state.borrow();
			if redraw == Redraw::Full {
				layer.set(node_layer(&state));
			}
			if let Some(s) = surfaces.borrow_mut().as_mut() {
				s.repaint(&state);
				s.sync_dragged_node(&state);
			}
		})
	};

	let (state_init, surfaces_init, gesture_init, apply_init, redraw_slot, window_listeners_init) = (
		state.clone(),
		surfaces.clone(),
		gesture.clone(),
		apply.clone(),
		editor.redraw.clone(),
		window_listeners.clone(),
	);
	Effect::new(move |_| {
		if surfaces_init.borrow().is_some() {
			return;
		}
		let (Some(container), Some(viewport), Some(canvas), Some(minimap)) = (
			container_ref.get(),
			viewport_ref.get(),
			canvas_ref.get(),
			minimap_ref.get(),
		) else {
			return;
		};
		let mounted = match Surfaces::new(container.into(), viewport.into(), canvas, minimap) {
			Ok(s) => s,
			Err(err) => {
				error!("flow editor not mounted: {err}");
				return;
			}
		};
		let (w, h) = mounted.fit();
		state_init.borrow_mut().resize(w, h);
		*surfaces_init.borrow_mut() = Some(mounted);
		info!("flow editor mounted ({w}x{h})");

		let (state_mm, surfaces_mm, apply_mm) =
			(state_init.clone(), surfaces_init.clone(), apply_init.clone());
		*gesture_init.on_move.borrow_mut() = Some(Closure::new(move |ev: MouseEvent| {
			let Some(point) = surfaces_mm.borrow().as_ref().map(|s| s.pointer(&ev)) else {
				return;
			};
			let redraw = state_mm.borrow_mut().pointer_move(point);
			apply_mm(redraw);
		}));

		let (state_mu, surfaces_mu, apply_mu, gesture_mu) = (
			state_init.clone(),
			surfaces_init.clone(),
			apply_init.clone(),
			gesture_init.clone(),
		);
		*gesture_init.on_up.borrow_mut() = Some(Closure::new(move |ev: MouseEvent| {
			gesture_mu.detach();
			let Some(point) = surfaces_mu.borrow().as_ref().map(|s| s.pointer(&ev)) else {
				return;
			};
			let redraw = state_mu.borrow_mut().pointer_up(point);
			if let Some(s) = surfaces_mu.borrow().as_ref() {
				s.set_cursor("default");
			}
			apply_mu(redraw);
		}));

		let Some(window) = web_sys::window() else {
			warn!("no window; keyboard and resize handling disabled");
			return;
		};

		let (state_kd, apply_kd) = (state_init.clone(), apply_init.clone());
		let keydown = Closure::<dyn FnMut(Event)>::new(move |ev: Event| {
			let Some(ev) = ev.dyn_ref::<KeyboardEvent>() else {
				return;
			};
			let redraw = state_kd.borrow_mut().key_down(&ev.key());
			apply_kd(redraw);
		});

		let (state_rs, surfaces_rs, apply_rs) =
			(state_init.clone(), surfaces_init.clone(), apply_init.clone());
		let resize = Closure::<dyn FnMut(Event)>::new(move |_: Event| {
			let Some((w, h)) = surfaces_rs.borrow().as_ref().map(Surfaces::fit) else {
				return;
			};
			let redraw = state_rs.borrow_mut().resize_viewport(w, h);
			apply_rs(redraw);
		});

		let mut listeners = window_listeners_init.borrow_mut();
		for (kind, cb) in [("keydown", keydown), ("resize", resize)] {
			let _ = window.add_event_listener_with_callback(kind, cb.as_ref().unchecked_ref());
			listeners.push((kind, cb));
		}
		drop(listeners);

		*redraw_slot.borrow_mut() = Some(apply_init.clone());
		apply_init(Redraw::Full);
	});

	let unmount = SendWrapper::new((gesture.clone(), window_listeners, editor.redraw.clone()));
	on_cleanup(move || {
		let (gesture, listeners, redraw_slot) = unmount.take();
		gesture.detach();
		if let Some(window) = web_sys::window() {
			for (kind, cb) in listeners.borrow_mut().drain(..) {
				let _ = window.remove_event_listener_with_callback(kind, cb.as_ref().unchecked_ref());
			}
		}
		redraw_slot.borrow_mut().take();
		debug!("flow editor unmounted");
	});

	let (state_md, surfaces_md, apply_md, gesture_md) =
		(state.clone(), surfaces.clone(), apply.clone(), gesture);
	let on_mousedown = move |ev: MouseEvent| {
		let Some(button) = PointerButton::from_dom(ev.button()) else {
			return;
		};
		let Some(point) = surfaces_md.borrow().as_ref().map(|s| s.pointer(&ev)) else {
			return;
		};
		let redraw = state_md.borrow_mut().pointer_down(point, button);
		let interaction = state_md.borrow().interaction.clone();
		match interaction {
			Interaction::Idle => {}
			Interaction::Panning { .. } => {
				ev.prevent_default();
				if let Some(s) = surfaces_md.borrow().as_ref() {
					s.set_cursor("grabbing");
				}
				gesture_md.attach();
			}
			_ => {
				ev.prevent_default();
				gesture_md.attach();
			}
		}
		apply_md(redraw);
	};

	let (state_hv, surfaces_hv) = (state.clone(), surfaces.clone());
	let on_hover = move |ev: MouseEvent| {
		let surfaces = surfaces_hv.borrow();
		let Some(s) = surfaces.as_ref() else {
			return;
		};
		let mut state = state_hv.borrow_mut();
		if state.interaction.is_idle() && state.update_proximity(s.pointer(&ev)) {
			s.sync_proximity(&state);
		}
	};

	let (state_ml, surfaces_ml) = (state.clone(), surfaces.clone());
	let on_leave = move |_: MouseEvent| {
		let mut state = state_ml.borrow_mut();
		if state.clear_proximity() {
			if let Some(s) = surfaces_ml.borrow().as_ref() {
				s.sync_proximity(&state);
			}
		}
	};

	let (state_wh, surfaces_wh, apply_wh) = (state, surfaces, apply);
	let on_wheel = move |ev: WheelEvent| {
		ev.prevent_default();
		let Some(point) = surfaces_wh.borrow().as_ref().map(|s| s.pointer(&ev)) else {
			return;
		};
		let redraw = state_wh.borrow_mut().wheel(point, ev.delta_y());
		apply_wh(redraw);
	};

	view! {
		<div
			node_ref=container_ref
			class="flow-editor"
			style="position: relative; width: 100%; height: 100%; overflow: hidden; cursor: default;"
			on:mousedown=on_mousedown
			on:mousemove=on_hover
			on:mouseleave=on_leave
			on:wheel=on_wheel
		>
			<Toolbar editor=editor />
			<canvas
				node_ref=canvas_ref
				class="flow-links"
				style="position: absolute; top: 0; left: 0; z-index: 0; pointer-events: none;"
			/>
			<div
				node_ref=viewport_ref
				class="flow-viewport"
				style="position: absolute; top: 0; left: 0; width: 100%; height: 100%; transform-origin: 0 0;"
			>
				{move || layer.get().into_iter().map(node_view).collect_view()}
			</div>
			<div
				class="flow-minimap"
				style="position: absolute; top: 10px; right: 10px; width: 200px; height: 150px; border: 1px solid #ccc; background: #fff; z-index: 50;"
				on:mousedown=|ev: MouseEvent| ev.stop_propagation()
			>
				<canvas
					node_ref=minimap_ref
					width=MINIMAP_WIDTH.to_string()
					height=MINIMAP_HEIGHT.to_string()
					style="width: 100%; height: 100%;"
				/>
			</div>
		</div>
	}
}
