//! Colours and per-element visual state.

use super::types::{Gender, RelationshipKind};

/// An opaque sRGB colour.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Color {
	/// Red.
	pub r: u8,
	/// Green.
	pub g: u8,
	/// Blue.
	pub b: u8,
}

impl Color {
	/// Builds a colour from `0xRRGGBB`.
	pub const fn hex(rgb: u32) -> Self {
		Self {
			r: (rgb >> 16) as u8,
			g: (rgb >> 8) as u8,
			b: rgb as u8,
		}
	}

	/// CSS `#rrggbb` notation.
	pub fn css(&self) -> String {
		format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
	}

	/// CSS `rgba(...)` notation.
	pub fn rgba(&self, alpha: f64) -> String {
		format!("rgba({}, {}, {}, {})", self.r, self.g, self.b, alpha)
	}

	/// Composites this colour at `alpha` over an opaque `background`.
	pub fn over(&self, background: Color, alpha: f64) -> Color {
		let alpha = alpha.clamp(0.0, 1.0);
		let mix = |fg: u8, bg: u8| (fg as f64 * alpha + bg as f64 * (1.0 - alpha)).round() as u8;
		Color {
			r: mix(self.r, background.r),
			g: mix(self.g, background.g),
			b: mix(self.b, background.b),
		}
	}
}

pub const MALE_FILL: Color = Color::hex(0x1976d2);
pub const FEMALE_FILL: Color = Color::hex(0xe91e63);
pub const HIGHLIGHT: Color = Color::hex(0xffd700);
pub const CURRENT_PARTNER: Color = Color::hex(0x4caf50);
pub const EX_PARTNER: Color = Color::hex(0xf44336);
pub const AFFECTION: Color = Color::hex(0xff9800);
pub const OTHER_RELATIONSHIP: Color = Color::hex(0xcccccc);
pub const WHITE: Color = Color::hex(0xffffff);
pub const BLACK: Color = Color::hex(0x000000);

pub fn gender_fill(gender: Gender) -> Color {
	match gender {
		Gender::Male => MALE_FILL,
		Gender::Female => FEMALE_FILL,
	}
}

pub fn relationship_stroke(kind: &RelationshipKind) -> Color {
	match kind {
		RelationshipKind::CurrentPartner => CURRENT_PARTNER,
		RelationshipKind::ExPartner => EX_PARTNER,
		RelationshipKind::Affection => AFFECTION,
		RelationshipKind::Other(_) => OTHER_RELATIONSHIP,
	}
}

pub fn is_dashed(kind: &RelationshipKind) -> bool {
	matches!(kind, RelationshipKind::Affection)
}

/// Light or dark presentation.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Theme {
	/// Light background.
	#[default]
	Light,
	/// Dark background.
	Dark,
}

impl Theme {
	/// The other mode.
	pub fn toggled(self) -> Self {
		match self {
			Self::Light => Self::Dark,
			Self::Dark => Self::Light,
		}
	}

	/// `data-theme` attribute value.
	pub fn as_str(&self) -> &'static str {
		match self {
			Self::Light => "light",
			Self::Dark => "dark",
		}
	}

	/// Canvas background.
	pub fn background(&self) -> Color {
		match self {
			Self::Light => Color::hex(0xfafafa),
			Self::Dark => Color::hex(0x1a1a2e),
		}
	}

	/// Tooltip and legend text.
	pub fn foreground(&self) -> Color {
		match self {
			Self::Light => Color::hex(0x212121),
			Self::Dark => Color::hex(0xeeeeee),
		}
	}
}

/// Visual state of a node.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct NodeStyle {
	/// Highlight border width; zero when not highlighted.
	pub border_width: f64,
	/// On the last computed shortest path.
	pub on_path: bool,
}

/// Visual state of an edge.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EdgeStyle {
	/// Set by the relationship filter.
	pub opacity: f64,
	/// On the last computed shortest path.
	pub on_path: bool,
}

impl Default for EdgeStyle {
	fn default() -> Self {
		Self {
			opacity: 1.0,
			on_path: false,
		}
	}
}

impl EdgeStyle {
	/// Stroke colour after path marking.
	pub fn stroke(&self, kind: &RelationshipKind) -> Color {
		if self.on_path {
			HIGHLIGHT
		} else {
			relationship_stroke(kind)
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn hex_colours_format_as_css() {
		assert_eq!(MALE_FILL.css(), "#1976d2");
		assert_eq!(HIGHLIGHT.rgba(0.5), "rgba(255, 215, 0, 0.5)");
	}

	#[test]
	fn compositing_blends_towards_background() {
		assert_eq!(BLACK.over(WHITE, 0.0), WHITE);
		assert_eq!(BLACK.over(WHITE, 1.0), BLACK);
		assert_eq!(BLACK.over(WHITE, 0.5), Color::hex(0x808080));
	}

	#[test]
	fn path_marking_overrides_relationship_colour() {
		let style = EdgeStyle {
			on_path: true,
			..EdgeStyle::default()
		};
		assert_eq!(style.stroke(&RelationshipKind::ExPartner), HIGHLIGHT);
		assert_eq!(
			EdgeStyle::default().stroke(&RelationshipKind::ExPartner),
			EX_PARTNER
		);
	}
}
