//! Geometry projection
//!
//! Places poloidal cross-sections around the torus symmetry axis, moves them
//! into the camera frame and projects them through a pinhole onto the image
//! plane. The image plane is the plane at unit distance from the pinhole, so
//! projected coordinates are tangents of the viewing angles.

mod camera;
pub use camera::{Camera, CameraError};
mod section;
pub use section::{Projector, SectionLimits, Sweep, Toroidal, MAX_SWEEP_ANGLES};
mod topview;
pub use topview::Topview;

/// Physical extent of the image plane
///
/// The image covers `[-h,h]×[-h,h]` with `h = tan(fov/2)`, the same units the
/// pinhole projection produces.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Extent {
    half_width: f64,
}
impl Default for Extent {
    fn default() -> Self {
        Self { half_width: 1f64 }
    }
}
impl Extent {
    /// Extent of a camera with the full field-of-view angle `fov` [rad]
    pub fn from_fov(fov: f64) -> Self {
        Self {
            half_width: (0.5 * fov).tan(),
        }
    }
    pub fn half_width(&self) -> f64 {
        self.half_width
    }
    /// Returns `[x_min, x_max, y_min, y_max]`
    pub fn bounds(&self) -> [f64; 4] {
        let h = self.half_width;
        [-h, h, -h, h]
    }
}

/// Projected path in the image plane
///
/// `None` entries are breaks: points that are masked or have no visible
/// projection. A break splits the path without ending it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Polyline {
    points: Vec<Option<[f64; 2]>>,
}
impl Polyline {
    pub fn new(points: Vec<Option<[f64; 2]>>) -> Self {
        Self { points }
    }
    pub fn push(&mut self, point: Option<[f64; 2]>) {
        self.points.push(point);
    }
    pub fn len(&self) -> usize {
        self.points.len()
    }
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
    pub fn points(&self) -> &[Option<[f64; 2]>] {
        &self.points
    }
    /// Number of breaks in the path
    pub fn breaks(&self) -> usize {
        self.points.iter().filter(|p| p.is_none()).count()
    }
    /// Continuous runs of visible points
    pub fn segments(&self) -> impl Iterator<Item = Vec<[f64; 2]>> + '_ {
        self.points
            .split(|p| p.is_none())
            .filter(|run| !run.is_empty())
            .map(|run| run.iter().flatten().copied().collect())
    }
    /// Checks if the path is unbroken and ends where it starts
    pub fn is_closed(&self, tolerance: f64) -> bool {
        match (self.points.first(), self.points.last()) {
            (Some(Some(a)), Some(Some(b))) if self.breaks() == 0 && self.len() > 2 => {
                (a[0] - b[0]).hypot(a[1] - b[1]) <= tolerance
            }
            _ => false,
        }
    }
}
impl FromIterator<Option<[f64; 2]>> for Polyline {
    fn from_iter<T: IntoIterator<Item = Option<[f64; 2]>>>(iter: T) -> Self {
        Self {
            points: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extent_from_fov() {
        let e = Extent::from_fov(std::f64::consts::FRAC_PI_2);
        assert!((e.half_width() - 1.0).abs() < 1e-12);
        assert_eq!(e.bounds()[0], -e.half_width());
    }

    #[test]
    fn polyline_segments() {
        let p = Polyline::new(vec![
            Some([0.0, 0.0]),
            Some([1.0, 0.0]),
            None,
            None,
            Some([2.0, 1.0]),
        ]);
        let segments: Vec<_> = p.segments().collect();
        assert_eq!(segments.len(), 2);
        assert_eq!(segments[0].len(), 2);
        assert_eq!(segments[1], vec![[2.0, 1.0]]);
        assert_eq!(p.breaks(), 2);
        assert!(!p.is_closed(1e-9));
    }
}
