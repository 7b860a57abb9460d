use super::error::GraphError;
use super::types::Point;

const MIN_ZOOM: f64 = 0.1;
const MAX_ZOOM: f64 = 10.0;

/// Size of the drawing surface in CSS pixels.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Surface {
	/// Width.
	pub width: f64,
	/// Height.
	pub height: f64,
}

impl Surface {
	/// Creates a surface.
	pub fn new(width: f64, height: f64) -> Self {
		Self { width, height }
	}

	pub(crate) fn validate(&self) -> Result<(), GraphError> {
		let usable = |v: f64| v.is_finite() && v > 0.0;
		if usable(self.width) && usable(self.height) {
			Ok(())
		} else {
			Err(GraphError::Initialization(format!(
				"surface {}x{} has no drawable area",
				self.width, self.height
			)))
		}
	}

	pub(crate) fn center(&self) -> Point {
		Point::new(self.width / 2.0, self.height / 2.0)
	}
}

/// Axis-aligned bounds in graph space.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Bounds {
	/// Top-left corner.
	pub min: Point,
	/// Bottom-right corner.
	pub max: Point,
}

impl Bounds {
	/// Smallest bounds covering every point, grown by `margin`.
	pub fn around(points: impl IntoIterator<Item = Point>, margin: f64) -> Option<Self> {
		let mut points = points.into_iter();
		let first = points.next()?;
		let (min, max) = points.fold((first, first), |(min, max), p| {
			(
				Point::new(min.x.min(p.x), min.y.min(p.y)),
				Point::new(max.x.max(p.x), max.y.max(p.y)),
			)
		});
		Some(Self {
			min: Point::new(min.x - margin, min.y - margin),
			max: Point::new(max.x + margin, max.y + margin),
		})
	}

	/// Width.
	pub fn width(&self) -> f64 {
		self.max.x - self.min.x
	}

	/// Height.
	pub fn height(&self) -> f64 {
		self.max.y - self.min.y
	}

	/// Center point.
	pub fn center(&self) -> Point {
		self.min.lerp(self.max, 0.5)
	}
}

/// Screen = graph * k + (x, y).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ViewTransform {
	/// Horizontal offset.
	pub x: f64,
	/// Vertical offset.
	pub y: f64,
	/// Zoom factor.
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
	fn lerp(&self, other: &ViewTransform, t: f64) -> ViewTransform {
		ViewTransform {
			x: self.x + (other.x - self.x) * t,
			y: self.y + (other.y - self.y) * t,
			k: self.k + (other.k - self.k) * t,
		}
	}
}

#[derive(Clone, Debug)]
struct FitAnimation {
	from: ViewTransform,
	to: ViewTransform,
	elapsed: f64,
	duration: f64,
}

/// Pan/zoom state plus an optional animated fit.
#[derive(Clone, Debug, Default)]
pub struct Viewport {
	transform: ViewTransform,
	fit: Option<FitAnimation>,
}

impl Viewport {
	/// Current transform.
	pub fn transform(&self) -> ViewTransform {
		self.transform
	}

	/// Converts a screen position to graph space.
	pub fn screen_to_graph(&self, sx: f64, sy: f64) -> Point {
		Point::new(
			(sx - self.transform.x) / self.transform.k,
			(sy - self.transform.y) / self.transform.k,
		)
	}

	/// Converts a graph position to screen space.
	pub fn graph_to_screen(&self, p: Point) -> Point {
		Point::new(
			p.x * self.transform.k + self.transform.x,
			p.y * self.transform.k + self.transform.y,
		)
	}

	/// Drags the view. Cancels any fit in progress.
	pub fn pan_by(&mut self, dx: f64, dy: f64) {
		self.fit = None;
		self.transform.x += dx;
		self.transform.y += dy;
	}

	/// Zooms by `factor` keeping the screen point `(sx, sy)` fixed.
	pub fn zoom_at(&mut self, sx: f64, sy: f64, factor: f64) {
		self.fit = None;
		let t = &mut self.transform;
		let new_k = (t.k * factor).clamp(MIN_ZOOM, MAX_ZOOM);
		let ratio = new_k / t.k;
		t.x = sx - (sx - t.x) * ratio;
		t.y = sy - (sy - t.y) * ratio;
		t.k = new_k;
	}

	/// Transform that frames `bounds` inside `surface`.
	pub fn fitting(bounds: &Bounds, surface: &Surface, padding: f64, max_zoom: f64) -> ViewTransform {
		let avail_w = (surface.width - 2.0 * padding).max(1.0);
		let avail_h = (surface.height - 2.0 * padding).max(1.0);
		let k = (avail_w / bounds.width().max(1.0))
			.min(avail_h / bounds.height().max(1.0))
			.clamp(MIN_ZOOM, max_zoom.max(MIN_ZOOM));
		let c = bounds.center();
		ViewTransform {
			x: surface.width / 2.0 - c.x * k,
			y: surface.height / 2.0 - c.y * k,
			k,
		}
	}

	/// Jumps straight to `target`.
	pub fn set(&mut self, target: ViewTransform) {
		self.fit = None;
		self.transform = target;
	}

	/// Animates towards `target` over `duration` seconds.
	pub fn animate_to(&mut self, target: ViewTransform, duration: f64) {
		if duration <= 0.0 {
			self.set(target);
			return;
		}
		self.fit = Some(FitAnimation {
			from: self.transform,
			to: target,
			elapsed: 0.0,
			duration,
		});
	}

	/// Target of the running fit animation, if any.
	pub fn fit_target(&self) -> Option<ViewTransform> {
		self.fit.as_ref().map(|f| f.to)
	}

	/// Advances the fit animation.
	pub fn tick(&mut self, dt: f64) {
		let Some(fit) = self.fit.as_mut() else {
			return;
		};
		fit.elapsed += dt;
		let t = (fit.elapsed / fit.duration).min(1.0);
		self.transform = fit.from.lerp(&fit.to, ease_out_cubic(t));
		if t >= 1.0 {
			self.fit = None;
		}
	}
}

pub(crate) fn ease_out_cubic(t: f64) -> f64 {
	1.0 - (1.0 - t).powi(3)
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn degenerate_surfaces_are_rejected() {
		assert!(Surface::new(800.0, 600.0).validate().is_ok());
		assert!(Surface::new(0.0, 600.0).validate().is_err());
		assert!(Surface::new(800.0, f64::NAN).validate().is_err());
		assert!(Surface::new(-1.0, 10.0).validate().is_err());
	}

	#[test]
	fn screen_and_graph_coordinates_invert() {
		let mut vp = Viewport::default();
		vp.set(ViewTransform {
			x: 40.0,
			y: -10.0,
			k: 2.0,
		});
		let p = Point::new(3.0, 7.0);
		let s = vp.graph_to_screen(p);
		assert_eq!(vp.screen_to_graph(s.x, s.y), p);
	}

	#[test]
	fn zoom_keeps_anchor_point_fixed() {
		let mut vp = Viewport::default();
		let before = vp.screen_to_graph(100.0, 50.0);
		vp.zoom_at(100.0, 50.0, 1.1);
		let after = vp.screen_to_graph(100.0, 50.0);
		assert!(before.distance(after) < 1e-9);
		vp.zoom_at(0.0, 0.0, 1000.0);
		assert_eq!(vp.transform().k, MAX_ZOOM);
	}

	#[test]
	fn fit_animation_finishes_on_target() {
		let bounds = Bounds::around([Point::new(0.0, 0.0), Point::new(100.0, 100.0)], 0.0).unwrap();
		let surface = Surface::new(400.0, 400.0);
		let target = Viewport::fitting(&bounds, &surface, 50.0, 2.0);
		assert_eq!(target.k, 2.0);

		let mut vp = Viewport::default();
		vp.animate_to(target, 0.5);
		vp.tick(0.25);
		assert_ne!(vp.transform(), target);
		vp.tick(0.3);
		assert_eq!(vp.transform(), target);
		assert!(vp.fit_target().is_none());
	}
}
