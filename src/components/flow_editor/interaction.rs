//! Pointer, wheel and keyboard handling.
//!
//! Each handler mutates [`EditorState`] completely and then reports which
//! redraw tier the change needs, so a redraw never observes a half-applied
//! update.

use log::{debug, info};

use super::connector::{connector_at, nearby_unconnected};
use super::scene::Redraw;
use super::state::{EditorState, Interaction, MAX_ZOOM, MIN_ZOOM, Selection, ZOOM_STEP};
use super::types::{ConnectorRef, LineMode, Link, Point};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PointerButton {
	Primary,
	Middle,
	Secondary,
}

impl PointerButton {
	/// Maps `MouseEvent.button` values.
	pub fn from_dom(button: i16) -> Option<Self> {
		match button {
			0 => Some(PointerButton::Primary),
			1 => Some(PointerButton::Middle),
			2 => Some(PointerButton::Secondary),
			_ => None,
		}
	}
}

impl EditorState {
	/// Pointer pressed at `screen` (relative to the editor container).
	pub fn pointer_down(&mut self, screen: Point, button: PointerButton) -> Redraw {
		if !self.interaction.is_idle() {
			return Redraw::None;
		}
		match button {
			PointerButton::Middle => {
				self.interaction = Interaction::Panning {
					start: screen,
					pan_start: self.transform.pan(),
				};
				debug!("pan started at {screen:?}");
				Redraw::None
			}
			PointerButton::Secondary => Redraw::None,
			PointerButton::Primary => {
				let world = self.screen_to_world(screen);
				if let Some(connector) = connector_at(&self.diagram, world) {
					self.begin_link_drag(connector, world);
					Redraw::Links
				} else if let Some(node) = self.node_at(world) {
					let node_id = node.id.clone();
					let offset = world - node.origin();
					debug!("dragging node {node_id}");
					let changed = self.set_selection(Selection::Node(node_id.clone()));
					self.interaction = Interaction::DraggingNode { node_id, offset };
					if changed { Redraw::Full } else { Redraw::None }
				} else if self.select_at(world) {
					Redraw::Full
				} else {
					Redraw::None
				}
			}
		}
	}

	/// A press on a dot of the selected link rewires that end; any other dot starts a new link.
	fn begin_link_drag(&mut self, connector: ConnectorRef, world: Point) {
		let rewire = self.selection.link().and_then(|index| {
			let end = self.diagram.links.get(index)?.end_at(&connector)?;
			Some((index, end))
		});
		self.interaction = match rewire {
			Some((link_index, end)) => {
				debug!("rewiring {end:?} of link {link_index}");
				Interaction::RewiringLink {
					link_index,
					end,
					pointer: world,
				}
			}
			None => {
				debug!("creating link from {connector:?}");
				Interaction::CreatingLink {
					from: connector,
					pointer: world,
				}
			}
		};
	}

	pub fn pointer_move(&mut self, screen: Point) -> Redraw {
		let world = self.screen_to_world(screen);
		match &mut self.interaction {
			Interaction::Idle => Redraw::None,
			Interaction::DraggingNode { node_id, offset } => {
				let target = world - *offset;
				match self.diagram.node_mut(node_id) {
					Some(node) => {
						node.x = target.x;
						node.y = target.y;
						Redraw::Links
					}
					None => Redraw::None,
				}
			}
			Interaction::CreatingLink { pointer, .. } | Interaction::RewiringLink { pointer, .. } => {
				*pointer = world;
				Redraw::Links
			}
			Interaction::Panning { start, pan_start } => {
				self.transform.x = pan_start.x + (screen.x - start.x);
				self.transform.y = pan_start.y + (screen.y - start.y);
				Redraw::Links
			}
		}
	}

	/// Ends the current gesture. The gesture state is reset whatever the drop target.
	pub fn pointer_up(&mut self, screen: Point) -> Redraw {
		let world = self.screen_to_world(screen);
		match std::mem::take(&mut self.interaction) {
			Interaction::Idle | Interaction::DraggingNode { .. } | Interaction::Panning { .. } => {
				Redraw::None
			}
			Interaction::CreatingLink { from, .. } => {
				match connector_at(&self.diagram, world) {
					_ if !self.diagram.contains_node(&from.node_id) => {
						debug!("link source {} no longer exists", from.node_id)
					}
					Some(to) if to.node_id != from.node_id => {
						info!("link created {from:?} -> {to:?}");
						self.diagram.links.push(Link::new(from, to));
						self.nearby.clear();
					}
					Some(_) => debug!("discarding self-loop from {from:?}"),
					None => debug!("link creation dropped on empty space"),
				}
				Redraw::Full
			}
			Interaction::RewiringLink { link_index, end, .. } => {
				let target = connector_at(&self.diagram, world);
				match (target, self.diagram.links.get_mut(link_index)) {
					(Some(to), Some(link)) => {
						info!("link {link_index} {end:?} rewired to {to:?}");
						link.set_endpoint(end, to);
						self.nearby.clear();
					}
					_ => debug!("rewire of link {link_index} dropped"),
				}
				Redraw::Full
			}
		}
	}

	/// Wheel zoom anchored at the cursor. Negative `delta_y` zooms in.
	pub fn wheel(&mut self, screen: Point, delta_y: f64) -> Redraw {
		let factor = if delta_y < 0.0 { ZOOM_STEP } else { 1.0 / ZOOM_STEP };
		let new_k = (self.transform.k * factor).clamp(MIN_ZOOM, MAX_ZOOM);
		self.transform.zoom_at(screen, new_k);
		Redraw::Links
	}

	/// Keyboard input. Only `Delete` does anything; it always rebuilds.
	pub fn key_down(&mut self, key: &str) -> Redraw {
		if key != "Delete" {
			return Redraw::None;
		}
		self.delete_selected();
		Redraw::Full
	}

	pub fn add_node_action(&mut self) -> Redraw {
		self.add_node();
		Redraw::Full
	}

	pub fn set_line_mode(&mut self, mode: LineMode) -> Redraw {
		self.config.line_mode = mode;
		Redraw::Links
	}

	pub fn toggle_arrow(&mut self) -> Redraw {
		self.config.show_arrow = !self.config.show_arrow;
		Redraw::Links
	}

	pub fn toggle_dashed(&mut self) -> Redraw {
		self.config.show_dashed = !self.config.show_dashed;
		Redraw::Links
	}

	pub fn resize_viewport(&mut self, width: f64, height: f64) -> Redraw {
		self.resize(width, height);
		Redraw::Links
	}

	/// Recomputes which unconnected dots are near the pointer. Returns whether the set changed.
	pub fn update_proximity(&mut self, screen: Point) -> bool {
		let world = self.screen_to_world(screen);
		let next = nearby_unconnected(&self.diagram, world, self.transform.k)
			.into_iter()
			.collect();
		if next == self.nearby {
			return false;
		}
		self.nearby = next;
		true
	}

	pub fn clear_proximity(&mut self) -> bool {
		let had_any = !self.nearby.is_empty();
		self.nearby.clear();
		had_any
	}
}
