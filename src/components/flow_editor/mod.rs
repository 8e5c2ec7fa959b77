//! Flow diagram editor: nodes as positioned DOM elements, links on a canvas
//! beneath them, with pan/zoom, connector gestures and a minimap.
//!
//! Everything except [`component`] is plain Rust over [`EditorState`] and runs
//! natively; the component only translates DOM events and paints.

mod component;
pub mod config;
pub mod connector;
pub mod error;
pub mod geometry;
pub mod interaction;
pub mod minimap;
pub mod path;
pub mod render;
pub mod scene;
pub mod state;
pub mod types;

pub use component::{FlowEditor, FlowEditorHandle};
pub use config::EditorConfig;
pub use error::{EditorError, Result};
pub use interaction::PointerButton;
pub use scene::Redraw;
pub use state::{EditorState, Interaction, Selection, ViewTransform};
pub use types::{ConnectorRef, Diagram, LineMode, Link, LinkEnd, Node, NodeId, Point, ShapeKind, Side};
