use std::fmt;
use std::ops::{Add, Mul, Sub};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::error::{EditorError, Result};

pub const DEFAULT_NODE_WIDTH: f64 = 100.0;
pub const DEFAULT_NODE_HEIGHT: f64 = 50.0;

/// A position in world (document) space or screen space; y grows downward.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Point {
	pub x: f64,
	pub y: f64,
}

impl Point {
	pub const ZERO: Point = Point { x: 0.0, y: 0.0 };

	pub const fn new(x: f64, y: f64) -> Self {
		Self { x, y }
	}

	pub fn distance(self, other: Point) -> f64 {
		(self.x - other.x).hypot(self.y - other.y)
	}

	pub fn is_zero(self) -> bool {
		self.x == 0.0 && self.y == 0.0
	}
}

impl Add for Point {
	type Output = Point;

	fn add(self, rhs: Point) -> Point {
		Point::new(self.x + rhs.x, self.y + rhs.y)
	}
}

impl Sub for Point {
	type Output = Point;

	fn sub(self, rhs: Point) -> Point {
		Point::new(self.x - rhs.x, self.y - rhs.y)
	}
}

impl Mul<f64> for Point {
	type Output = Point;

	fn mul(self, rhs: f64) -> Point {
		Point::new(self.x * rhs, self.y * rhs)
	}
}

/// Opaque node identity. Hosts may supply their own; "add node" generates a v4 UUID.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(pub String);

impl NodeId {
	pub fn generate() -> Self {
		Self(uuid::Uuid::new_v4().to_string())
	}

	pub fn as_str(&self) -> &str {
		&self.0
	}
}

impl fmt::Display for NodeId {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(&self.0)
	}
}

impl From<&str> for NodeId {
	fn from(value: &str) -> Self {
		Self(value.to_owned())
	}
}

impl From<String> for NodeId {
	fn from(value: String) -> Self {
		Self(value)
	}
}

/// One of the four connector positions on a node's bounding box.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
	Top,
	Right,
	Bottom,
	Left,
}

impl Side {
	pub const ALL: [Side; 4] = [Side::Top, Side::Right, Side::Bottom, Side::Left];

	/// Outward unit vector used for curve control points and flowchart stubs.
	pub fn direction(self) -> Point {
		match self {
			Side::Top => Point::new(0.0, -1.0),
			Side::Right => Point::new(1.0, 0.0),
			Side::Bottom => Point::new(0.0, 1.0),
			Side::Left => Point::new(-1.0, 0.0),
		}
	}

	pub fn as_str(self) -> &'static str {
		match self {
			Side::Top => "top",
			Side::Right => "right",
			Side::Bottom => "bottom",
			Side::Left => "left",
		}
	}
}

impl fmt::Display for Side {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

impl FromStr for Side {
	type Err = EditorError;

	fn from_str(s: &str) -> Result<Self> {
		Side::ALL
			.into_iter()
			.find(|side| side.as_str() == s)
			.ok_or_else(|| EditorError::UnknownSide(s.to_owned()))
	}
}

/// Visual shape of a node. Unrecognized names fall back to `Rect`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ShapeKind {
	#[default]
	Rect,
	Diamond,
	Ellipse,
	Parallelogram,
}

impl ShapeKind {
	pub fn from_name(name: &str) -> Self {
		match name {
			"diamond" => ShapeKind::Diamond,
			"ellipse" => ShapeKind::Ellipse,
			"parallelogram" => ShapeKind::Parallelogram,
			_ => ShapeKind::Rect,
		}
	}

	pub fn css_class(self) -> &'static str {
		match self {
			ShapeKind::Rect => "rect",
			ShapeKind::Diamond => "diamond",
			ShapeKind::Ellipse => "ellipse",
			ShapeKind::Parallelogram => "parallelogram",
		}
	}
}

impl From<String> for ShapeKind {
	fn from(value: String) -> Self {
		ShapeKind::from_name(&value)
	}
}

impl From<ShapeKind> for String {
	fn from(value: ShapeKind) -> Self {
		value.css_class().to_owned()
	}
}

/// How links are routed and hit-tested.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LineMode {
	#[default]
	Straight,
	Curve,
	Flowchart,
}

impl LineMode {
	pub const ALL: [LineMode; 3] = [LineMode::Straight, LineMode::Curve, LineMode::Flowchart];

	pub fn label(self) -> &'static str {
		match self {
			LineMode::Straight => "Straight",
			LineMode::Curve => "Curve",
			LineMode::Flowchart => "Flowchart",
		}
	}
}

impl FromStr for LineMode {
	type Err = EditorError;

	fn from_str(s: &str) -> Result<Self> {
		LineMode::ALL
			.into_iter()
			.find(|mode| mode.label().eq_ignore_ascii_case(s))
			.ok_or_else(|| EditorError::UnknownLineMode(s.to_owned()))
	}
}

fn default_width() -> f64 {
	DEFAULT_NODE_WIDTH
}

fn default_height() -> f64 {
	DEFAULT_NODE_HEIGHT
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Node {
	pub id: NodeId,
	#[serde(default)]
	pub label: String,
	pub x: f64,
	pub y: f64,
	#[serde(default = "default_width")]
	pub width: f64,
	#[serde(default = "default_height")]
	pub height: f64,
	#[serde(default, rename = "shapeType")]
	pub shape: ShapeKind,
}

impl Node {
	pub fn new(id: impl Into<NodeId>, label: impl Into<String>, x: f64, y: f64) -> Self {
		Self {
			id: id.into(),
			label: label.into(),
			x,
			y,
			width: DEFAULT_NODE_WIDTH,
			height: DEFAULT_NODE_HEIGHT,
			shape: ShapeKind::Rect,
		}
	}

	pub fn with_size(mut self, width: f64, height: f64) -> Self {
		self.width = width;
		self.height = height;
		self
	}

	pub fn with_shape(mut self, shape: ShapeKind) -> Self {
		self.shape = shape;
		self
	}

	pub fn origin(&self) -> Point {
		Point::new(self.x, self.y)
	}

	/// Closed axis-aligned bounding-box test in world space.
	pub fn contains(&self, p: Point) -> bool {
		p.x >= self.x && p.x <= self.x + self.width && p.y >= self.y && p.y <= self.y + self.height
	}
}

/// A node plus one of its sides.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ConnectorRef {
	pub node_id: NodeId,
	pub side: Side,
}

impl ConnectorRef {
	pub fn new(node_id: impl Into<NodeId>, side: Side) -> Self {
		Self {
			node_id: node_id.into(),
			side,
		}
	}
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LinkEnd {
	Source,
	Target,
}

impl LinkEnd {
	pub fn opposite(self) -> Self {
		match self {
			LinkEnd::Source => LinkEnd::Target,
			LinkEnd::Target => LinkEnd::Source,
		}
	}
}

/// A directed connection between two connectors. Links have no identity beyond their index.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Link {
	pub source_id: NodeId,
	pub source_position: Side,
	pub target_id: NodeId,
	pub target_position: Side,
}

impl Link {
	pub fn new(source: ConnectorRef, target: ConnectorRef) -> Self {
		Self {
			source_id: source.node_id,
			source_position: source.side,
			target_id: target.node_id,
			target_position: target.side,
		}
	}

	pub fn endpoint(&self, end: LinkEnd) -> ConnectorRef {
		match end {
			LinkEnd::Source => ConnectorRef::new(self.source_id.clone(), self.source_position),
			LinkEnd::Target => ConnectorRef::new(self.target_id.clone(), self.target_position),
		}
	}

	pub fn set_endpoint(&mut self, end: LinkEnd, connector: ConnectorRef) {
		match end {
			LinkEnd::Source => {
				self.source_id = connector.node_id;
				self.source_position = connector.side;
			}
			LinkEnd::Target => {
				self.target_id = connector.node_id;
				self.target_position = connector.side;
			}
		}
	}

	/// Which end of this link sits on `connector`, source first.
	pub fn end_at(&self, connector: &ConnectorRef) -> Option<LinkEnd> {
		if self.source_id == connector.node_id && self.source_position == connector.side {
			Some(LinkEnd::Source)
		} else if self.target_id == connector.node_id && self.target_position == connector.side {
			Some(LinkEnd::Target)
		} else {
			None
		}
	}

	pub fn touches(&self, connector: &ConnectorRef) -> bool {
		self.end_at(connector).is_some()
	}

	pub fn references(&self, node_id: &NodeId) -> bool {
		&self.source_id == node_id || &self.target_id == node_id
	}
}

/// The editable model: nodes in insertion (stacking) order and links by index.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Diagram {
	#[serde(default)]
	pub nodes: Vec<Node>,
	#[serde(default)]
	pub links: Vec<Link>,
}

impl Diagram {
	pub fn new(nodes: Vec<Node>, links: Vec<Link>) -> Self {
		Self { nodes, links }
	}

	pub fn from_json(json: &str) -> Result<Self> {
		Ok(serde_json::from_str(json)?)
	}

	pub fn to_json(&self) -> Result<String> {
		Ok(serde_json::to_string(self)?)
	}

	pub fn node(&self, id: &NodeId) -> Option<&Node> {
		self.nodes.iter().find(|n| &n.id == id)
	}

	pub fn node_mut(&mut self, id: &NodeId) -> Option<&mut Node> {
		self.nodes.iter_mut().find(|n| &n.id == id)
	}

	pub fn contains_node(&self, id: &NodeId) -> bool {
		self.node(id).is_some()
	}

	/// Removes the node and every link that references it. Returns the number of links removed.
	pub fn remove_node(&mut self, id: &NodeId) -> Option<usize> {
		let pos = self.nodes.iter().position(|n| &n.id == id)?;
		self.nodes.remove(pos);
		let before = self.links.len();
		self.links.retain(|l| !l.references(id));
		Some(before - self.links.len())
	}

	pub fn remove_link(&mut self, index: usize) -> Option<Link> {
		(index < self.links.len()).then(|| self.links.remove(index))
	}

	pub fn is_connected(&self, connector: &ConnectorRef) -> bool {
		self.links.iter().any(|l| l.touches(connector))
	}
}
