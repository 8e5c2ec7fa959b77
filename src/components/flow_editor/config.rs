use serde::{Deserialize, Serialize};

use super::types::LineMode;

/// Diagram-wide display options, toggled at runtime from the toolbar.
///
/// Line mode drives both rendering and hit-testing, so changing it keeps the
/// clickable region in step with what is drawn.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EditorConfig {
	pub line_mode: LineMode,
	pub show_arrow: bool,
	pub show_dashed: bool,
}

impl EditorConfig {
	pub fn from_json(json: &str) -> super::error::Result<Self> {
		Ok(serde_json::from_str(json)?)
	}
}
