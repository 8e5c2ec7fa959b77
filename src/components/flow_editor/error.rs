use thiserror::Error;

/// Errors surfaced at the editor's host-facing edges.
///
/// Interactive operations never fail: dangling references are skipped and
/// invalid drops are discarded. These variants cover parsing host input and
/// acquiring DOM handles at mount time.
#[derive(Debug, Error)]
pub enum EditorError {
	#[error("unknown connector side `{0}`")]
	UnknownSide(String),

	#[error("unknown line mode `{0}`")]
	UnknownLineMode(String),

	#[error("invalid diagram JSON: {0}")]
	Json(#[from] serde_json::Error),

	#[error("DOM error: {0}")]
	Dom(String),
}

pub type Result<T, E = EditorError> = std::result::Result<T, E>;
