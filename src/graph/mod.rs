//! The relationship graph core: the live engine, its layouts, exports and
//! the centrality bridge. Nothing in here touches the DOM, so it all runs
//! under plain `cargo test`.

mod centrality;
mod config;
mod engine;
mod error;
mod export;
mod layout;
pub(crate) mod style;
mod types;
mod viewport;

pub use centrality::compute_centrality;
pub use config::{ForceParameters, GraphConfig};
pub use engine::{EdgeView, GraphEngine, NodeId, NodeView};
pub use error::GraphError;
pub use export::{DocumentElements, EdgeElement, GraphDocument, NodeElement};
pub use layout::{LayoutName, UnknownLayout};
pub use style::{Color, EdgeStyle, NodeStyle, Theme};
pub use types::{
	EdgeRecord, ElementDetail, Gender, GraphData, NodeDetail, NodeRecord, Point, RelationshipFilter,
	RelationshipKind,
};
pub use viewport::{Bounds, Surface, ViewTransform, Viewport};
