use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::error::GraphError;

/// Gender tag of a person. Only drives the fill colour.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Gender {
	/// `男`
	#[default]
	#[serde(rename = "男")]
	Male,
	/// `女`
	#[serde(rename = "女")]
	Female,
}

impl Gender {
	/// Both tags, in the order the control panel lists them.
	pub const ALL: [Gender; 2] = [Gender::Male, Gender::Female];

	/// The tag as it appears in data files.
	pub fn as_str(&self) -> &'static str {
		match self {
			Self::Male => "男",
			Self::Female => "女",
		}
	}
}

impl fmt::Display for Gender {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

impl FromStr for Gender {
	type Err = GraphError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		Self::ALL
			.into_iter()
			.find(|g| g.as_str() == s)
			.ok_or(GraphError::Validation { field: "gender" })
	}
}

/// Kind of relationship an edge carries.
///
/// Anything outside the three known tags is kept verbatim as `Other`.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum RelationshipKind {
	/// `CURRENT_PARTNER`
	CurrentPartner,
	/// `EX_PARTNER`
	ExPartner,
	/// `AFFECTION`
	Affection,
	/// Unconstrained tag.
	Other(String),
}

impl RelationshipKind {
	/// The known kinds, in filter menu order.
	pub const KNOWN: [RelationshipKind; 3] = [
		RelationshipKind::CurrentPartner,
		RelationshipKind::ExPartner,
		RelationshipKind::Affection,
	];

	/// The wire tag.
	pub fn as_str(&self) -> &str {
		match self {
			Self::CurrentPartner => "CURRENT_PARTNER",
			Self::ExPartner => "EX_PARTNER",
			Self::Affection => "AFFECTION",
			Self::Other(tag) => tag,
		}
	}
}

impl From<String> for RelationshipKind {
	fn from(tag: String) -> Self {
		match tag.as_str() {
			"CURRENT_PARTNER" => Self::CurrentPartner,
			"EX_PARTNER" => Self::ExPartner,
			"AFFECTION" => Self::Affection,
			_ => Self::Other(tag),
		}
	}
}

impl From<&str> for RelationshipKind {
	fn from(tag: &str) -> Self {
		Self::from(tag.to_string())
	}
}

impl From<RelationshipKind> for String {
	fn from(kind: RelationshipKind) -> Self {
		match kind {
			RelationshipKind::Other(tag) => tag,
			known => known.as_str().to_string(),
		}
	}
}

impl fmt::Display for RelationshipKind {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

/// Which edges stay fully opaque. Empty shows every edge.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RelationshipFilter(Option<RelationshipKind>);

impl RelationshipFilter {
	/// Shows every edge.
	pub fn all() -> Self {
		Self(None)
	}

	/// Shows only edges of `kind`.
	pub fn only(kind: RelationshipKind) -> Self {
		Self(Some(kind))
	}

	/// Parses a select value; the empty string means "all".
	pub fn parse(value: &str) -> Self {
		let value = value.trim();
		if value.is_empty() {
			Self::all()
		} else {
			Self::only(RelationshipKind::from(value))
		}
	}

	/// Whether an edge of `kind` passes.
	pub fn matches(&self, kind: &RelationshipKind) -> bool {
		self.0.as_ref().is_none_or(|wanted| wanted == kind)
	}

	/// Select value for this filter.
	pub fn as_str(&self) -> &str {
		self.0.as_ref().map(RelationshipKind::as_str).unwrap_or("")
	}
}

/// A person.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeRecord {
	/// Unique, stable id; doubles as the display name.
	pub id: String,
	/// Fill colour tag.
	pub gender: Gender,
}

impl NodeRecord {
	/// Creates a node record.
	pub fn new(id: impl Into<String>, gender: Gender) -> Self {
		Self {
			id: id.into(),
			gender,
		}
	}
}

/// A relationship between two people.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EdgeRecord {
	/// Element id. Left empty in source data; the engine derives one.
	#[serde(default, skip_serializing_if = "String::is_empty")]
	pub id: String,
	/// Source node id.
	pub source: String,
	/// Target node id.
	pub target: String,
	/// Relationship tag.
	pub relationship: RelationshipKind,
}

impl EdgeRecord {
	/// Creates an edge record without an id.
	pub fn new(
		source: impl Into<String>,
		target: impl Into<String>,
		relationship: impl Into<RelationshipKind>,
	) -> Self {
		Self {
			id: String::new(),
			source: source.into(),
			target: target.into(),
			relationship: relationship.into(),
		}
	}

	/// Whether `node_id` is one of the endpoints.
	pub fn touches(&self, node_id: &str) -> bool {
		self.source == node_id || self.target == node_id
	}
}

/// The initial data source format.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct GraphData {
	/// People.
	#[serde(default)]
	pub nodes: Vec<NodeRecord>,
	/// Relationships.
	#[serde(default)]
	pub edges: Vec<EdgeRecord>,
}

impl GraphData {
	/// Parses the data source JSON.
	pub fn from_json(json: &str) -> Result<Self, GraphError> {
		Ok(serde_json::from_str(json)?)
	}
}

/// A position in graph space.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Point {
	/// Horizontal coordinate.
	pub x: f64,
	/// Vertical coordinate.
	pub y: f64,
}

impl Point {
	/// Creates a point.
	pub const fn new(x: f64, y: f64) -> Self {
		Self { x, y }
	}

	/// Euclidean distance to `other`.
	pub fn distance(&self, other: Point) -> f64 {
		(self.x - other.x).hypot(self.y - other.y)
	}

	/// Linear interpolation towards `other`.
	pub fn lerp(&self, other: Point, t: f64) -> Point {
		Point::new(
			self.x + (other.x - self.x) * t,
			self.y + (other.y - self.y) * t,
		)
	}

	pub(crate) fn is_finite(&self) -> bool {
		self.x.is_finite() && self.y.is_finite()
	}
}

/// Everything the detail panel shows for a node.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NodeDetail {
	/// The node itself.
	pub node: NodeRecord,
	/// Distinct directly connected people.
	pub connected_nodes: Vec<NodeRecord>,
	/// Every incident relationship, once each.
	pub connected_edges: Vec<EdgeRecord>,
}

/// A point-in-time snapshot of one selected element.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ElementDetail {
	/// A selected person.
	Node(NodeDetail),
	/// A selected relationship.
	Edge(EdgeRecord),
}

impl ElementDetail {
	/// Id of the selected element.
	pub fn id(&self) -> &str {
		match self {
			Self::Node(detail) => &detail.node.id,
			Self::Edge(edge) => &edge.id,
		}
	}

	/// Whether removing `node_id` invalidates this snapshot.
	pub fn involves(&self, node_id: &str) -> bool {
		match self {
			Self::Node(detail) => {
				detail.node.id == node_id
					|| detail.connected_nodes.iter().any(|n| n.id == node_id)
			}
			Self::Edge(edge) => edge.touches(node_id),
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn relationship_tags_round_trip_through_serde() {
		let edge: EdgeRecord = serde_json::from_str(
			r#"{"source":"A","target":"B","relationship":"EX_PARTNER"}"#,
		)
		.unwrap();
		assert_eq!(edge.relationship, RelationshipKind::ExPartner);
		assert!(edge.id.is_empty());

		let other: RelationshipKind = serde_json::from_str(r#""SIBLING""#).unwrap();
		assert_eq!(other, RelationshipKind::Other("SIBLING".into()));
		assert_eq!(serde_json::to_string(&other).unwrap(), r#""SIBLING""#);
	}

	#[test]
	fn gender_uses_chinese_tags() {
		let node: NodeRecord = serde_json::from_str(r#"{"id":"A","gender":"女"}"#).unwrap();
		assert_eq!(node.gender, Gender::Female);
		assert_eq!("男".parse::<Gender>().unwrap(), Gender::Male);
		assert!("x".parse::<Gender>().is_err());
		assert!(serde_json::from_str::<NodeRecord>(r#"{"id":"A","gender":"x"}"#).is_err());
	}

	#[test]
	fn empty_filter_matches_everything() {
		let all = RelationshipFilter::parse("");
		assert!(all.matches(&RelationshipKind::Affection));
		assert!(all.matches(&RelationshipKind::Other("X".into())));
		assert_eq!(all.as_str(), "");

		let ex = RelationshipFilter::parse("EX_PARTNER");
		assert!(ex.matches(&RelationshipKind::ExPartner));
		assert!(!ex.matches(&RelationshipKind::CurrentPartner));
		assert_eq!(ex.as_str(), "EX_PARTNER");
	}

	#[test]
	fn detail_involvement_covers_neighbours() {
		let detail = ElementDetail::Node(NodeDetail {
			node: NodeRecord::new("A", Gender::Male),
			connected_nodes: vec![NodeRecord::new("B", Gender::Female)],
			connected_edges: vec![EdgeRecord::new("A", "B", "AFFECTION")],
		});
		assert!(detail.involves("A"));
		assert!(detail.involves("B"));
		assert!(!detail.involves("C"));
		assert_eq!(detail.id(), "A");
	}
}
