use std::collections::BTreeSet;

use log::{debug, info};

use super::config::EditorConfig;
use super::connector::resolve;
use super::geometry::within_hit_threshold;
use super::path::LinkPath;
use super::types::{ConnectorRef, Diagram, Link, LinkEnd, Node, NodeId, Point};

pub const MIN_ZOOM: f64 = 0.2;
pub const MAX_ZOOM: f64 = 3.0;
pub const ZOOM_STEP: f64 = 1.1;

/// Where "add node" places new nodes, in world coordinates.
pub const NEW_NODE_POSITION: Point = Point::new(200.0, 200.0);
pub const NEW_NODE_LABEL: &str = "New";

/// Pan/zoom applied to both layers: translate by `(x, y)`, then scale by `k`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ViewTransform {
	pub x: f64,
	pub y: f64,
	pub k: f64,
}

impl Default for ViewTransform {
	fn default() -> Self {
		Self {
			x: 0.0,
			y: 0.0,
			k: 1.0,
		}
	}
}

impl ViewTransform {
	pub fn pan(&self) -> Point {
		Point::new(self.x, self.y)
	}

	pub fn screen_to_world(&self, screen: Point) -> Point {
		Point::new((screen.x - self.x) / self.k, (screen.y - self.y) / self.k)
	}

	pub fn world_to_screen(&self, world: Point) -> Point {
		Point::new(world.x * self.k + self.x, world.y * self.k + self.y)
	}

	/// Rescales around `anchor` (screen space) so the world point under it stays put.
	pub fn zoom_at(&mut self, anchor: Point, new_k: f64) {
		let ratio = new_k / self.k;
		self.x = anchor.x - (anchor.x - self.x) * ratio;
		self.y = anchor.y - (anchor.y - self.y) * ratio;
		self.k = new_k;
	}

	/// CSS transform for the retained node layer.
	pub fn css(&self) -> String {
		format!("translate({}px, {}px) scale({})", self.x, self.y, self.k)
	}
}

/// At most one thing is selected. Link selection is by index into the link list.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum Selection {
	#[default]
	None,
	Node(NodeId),
	Link(usize),
}

impl Selection {
	pub fn node(&self) -> Option<&NodeId> {
		match self {
			Selection::Node(id) => Some(id),
			_ => None,
		}
	}

	pub fn link(&self) -> Option<usize> {
		match self {
			Selection::Link(index) => Some(*index),
			_ => None,
		}
	}
}

/// Transient gesture state. Never persisted; always back to `Idle` on pointer-up.
#[derive(Clone, Debug, Default, PartialEq)]
pub enum Interaction {
	#[default]
	Idle,
	DraggingNode {
		node_id: NodeId,
		/// Pointer position relative to the node origin at press time, in world units.
		offset: Point,
	},
	CreatingLink {
		from: ConnectorRef,
		pointer: Point,
	},
	RewiringLink {
		link_index: usize,
		/// The end that follows the pointer; the other end stays fixed.
		end: LinkEnd,
		pointer: Point,
	},
	Panning {
		start: Point,
		pan_start: Point,
	},
}

impl Interaction {
	pub fn is_idle(&self) -> bool {
		matches!(self, Interaction::Idle)
	}
}

/// Everything one editor mount owns: the model, the view and the gesture in flight.
#[derive(Clone, Debug, Default)]
pub struct EditorState {
	pub diagram: Diagram,
	pub transform: ViewTransform,
	pub selection: Selection,
	pub interaction: Interaction,
	pub config: EditorConfig,
	/// Unconnected connectors currently revealed by pointer proximity.
	pub nearby: BTreeSet<ConnectorRef>,
	pub width: f64,
	pub height: f64,
}

impl EditorState {
	pub fn new(diagram: Diagram, width: f64, height: f64) -> Self {
		Self {
			diagram,
			width,
			height,
			..Self::default()
		}
	}

	pub fn with_config(mut self, config: EditorConfig) -> Self {
		self.config = config;
		self
	}

	pub fn screen_to_world(&self, screen: Point) -> Point {
		self.transform.screen_to_world(screen)
	}

	/// Topmost node whose body contains `world`.
	pub fn node_at(&self, world: Point) -> Option<&Node> {
		self.diagram.nodes.iter().rev().find(|n| n.contains(world))
	}

	/// Resolved endpoints and direction hints for link `index`, or `None` if it dangles.
	pub fn link_geometry(&self, index: usize) -> Option<(Point, Point, Point, Point)> {
		let link = self.diagram.links.get(index)?;
		let (p1, d1) = resolve(&self.diagram, &link.endpoint(LinkEnd::Source))?;
		let (p2, d2) = resolve(&self.diagram, &link.endpoint(LinkEnd::Target))?;
		Some((p1, p2, d1, d2))
	}

	/// First link (by index) within the screen-space hit threshold of `world`.
	pub fn link_at(&self, world: Point) -> Option<usize> {
		(0..self.diagram.links.len()).find(|&i| {
			self.link_geometry(i).is_some_and(|(p1, p2, d1, d2)| {
				let path = LinkPath::route(self.config.line_mode, p1, p2, d1, d2);
				within_hit_threshold(path.distance_to(world), self.transform.k)
			})
		})
	}

	/// Click selection: nodes first in model order, then links, else clear.
	/// Returns whether the selection changed.
	pub fn select_at(&mut self, world: Point) -> bool {
		let next = if let Some(node) = self.diagram.nodes.iter().find(|n| n.contains(world)) {
			Selection::Node(node.id.clone())
		} else if let Some(index) = self.link_at(world) {
			Selection::Link(index)
		} else {
			Selection::None
		};
		self.set_selection(next)
	}

	pub fn set_selection(&mut self, selection: Selection) -> bool {
		if self.selection == selection {
			return false;
		}
		debug!("selection {:?} -> {:?}", self.selection, selection);
		self.selection = selection;
		true
	}

	/// Adds a node with a fresh id at the default position.
	pub fn add_node(&mut self) -> NodeId {
		let id = NodeId::generate();
		info!("adding node {id}");
		self.diagram.nodes.push(Node::new(
			id.clone(),
			NEW_NODE_LABEL,
			NEW_NODE_POSITION.x,
			NEW_NODE_POSITION.y,
		));
		id
	}

	/// Removes the selected node (with its links) or the selected link, then clears selection.
	/// A gesture holding a removed node or link is cancelled; a rewire of a surviving
	/// link follows it to its new index. Returns whether anything was removed.
	pub fn delete_selected(&mut self) -> bool {
		let removed_links: Vec<usize> = match std::mem::take(&mut self.selection) {
			Selection::Node(id) => {
				let doomed = self
					.diagram
					.links
					.iter()
					.enumerate()
					.filter(|(_, l)| l.references(&id))
					.map(|(i, _)| i)
					.collect();
				match self.diagram.remove_node(&id) {
					Some(links) => {
						info!("deleted node {id} and {links} link(s)");
						doomed
					}
					None => return false,
				}
			}
			Selection::Link(index) => match self.diagram.remove_link(index) {
				Some(link) => {
					info!("deleted link {index}: {link:?}");
					vec![index]
				}
				None => return false,
			},
			Selection::None => return false,
		};
		self.reindex_rewire(&removed_links);
		self.revalidate();
		true
	}

	/// Shifts an in-flight rewire past the removed link indices, or cancels it if its
	/// own link is among them.
	fn reindex_rewire(&mut self, removed: &[usize]) {
		let Interaction::RewiringLink { link_index, .. } = &mut self.interaction else {
			return;
		};
		if removed.contains(link_index) {
			debug!("link {link_index} removed mid-rewire");
			self.interaction = Interaction::Idle;
			return;
		}
		*link_index -= removed.iter().filter(|&&i| i < *link_index).count();
	}

	/// Runs a mutation the editor did not make itself, then finds the selected and
	/// rewired links again by value. A link that no longer exists drops its
	/// selection or gesture.
	pub fn edit_diagram(&mut self, f: impl FnOnce(&mut Diagram)) {
		let selected = self
			.selection
			.link()
			.and_then(|i| Some((i, self.diagram.links.get(i)?.clone())));
		let rewiring = match &self.interaction {
			Interaction::RewiringLink { link_index, .. } => self
				.diagram
				.links
				.get(*link_index)
				.map(|l| (*link_index, l.clone())),
			_ => None,
		};

		f(&mut self.diagram);

		if let Some((old, link)) = selected {
			self.selection = match self.find_link(old, &link) {
				Some(index) => Selection::Link(index),
				None => Selection::None,
			};
		}
		if let Some((old, link)) = rewiring {
			match self.find_link(old, &link) {
				Some(index) => {
					if let Interaction::RewiringLink { link_index, .. } = &mut self.interaction {
						*link_index = index;
					}
				}
				None => self.interaction = Interaction::Idle,
			}
		}
		self.revalidate();
	}

	/// Index of a link equal to `link`, preferring its previous position.
	fn find_link(&self, previous: usize, link: &Link) -> Option<usize> {
		if self.diagram.links.get(previous) == Some(link) {
			return Some(previous);
		}
		self.diagram.links.iter().position(|l| l == link)
	}

	/// Drops selection and gesture references that no longer point at the model.
	/// Call after any mutation made outside the editor's own handlers.
	pub fn revalidate(&mut self) {
		let stale = match &self.selection {
			Selection::Node(id) => !self.diagram.contains_node(id),
			Selection::Link(index) => *index >= self.diagram.links.len(),
			Selection::None => false,
		};
		if stale {
			debug!("dropping stale selection {:?}", self.selection);
			self.selection = Selection::None;
		}
		let dangling = match &self.interaction {
			Interaction::DraggingNode { node_id, .. } => !self.diagram.contains_node(node_id),
			Interaction::CreatingLink { from, .. } => !self.diagram.contains_node(&from.node_id),
			Interaction::RewiringLink { link_index, .. } => *link_index >= self.diagram.links.len(),
			Interaction::Idle | Interaction::Panning { .. } => false,
		};
		if dangling {
			self.interaction = Interaction::Idle;
		}
		self.retain_nearby();
	}

	fn retain_nearby(&mut self) {
		let diagram = &self.diagram;
		self.nearby
			.retain(|c| diagram.contains_node(&c.node_id) && !diagram.is_connected(c));
	}

	pub fn resize(&mut self, width: f64, height: f64) {
		self.width = width;
		self.height = height;
	}
}
