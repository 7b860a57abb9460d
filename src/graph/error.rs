use thiserror::Error;

/// Failures surfaced by the graph engine.
///
/// Only `Initialization` and `Export` ever reach the user. The rest are
/// logged by the engine or controller and degrade to a no-op.
#[derive(Debug, Error)]
pub enum GraphError {
	/// The engine could not be constructed on the given surface.
	#[error("cannot initialize graph: {0}")]
	Initialization(String),

	/// A command arrived before the engine was ready.
	#[error("graph is not initialized")]
	Uninitialized,

	/// A required field was empty.
	#[error("{field} must not be empty")]
	Validation {
		/// Name of the offending field.
		field: &'static str,
	},

	/// An id did not resolve to an element.
	#[error("no element `{0}`")]
	NotFound(String),

	/// The raster export could not be produced.
	#[error("export failed: {0}")]
	Export(String),

	/// The data source or document could not be (de)serialized.
	#[error("invalid graph document: {0}")]
	Document(#[from] serde_json::Error),
}
