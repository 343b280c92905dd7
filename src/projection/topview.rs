use std::f64::consts::PI;

use nalgebra::Vector3;

use super::{Extent, Polyline, Toroidal};

// number of segments of the topview circles
const CIRCLE_SEGMENTS: usize = 180;
// arrow head barbs length as a fraction of the arrow length
const BARB: f64 = 0.1;

/// Plan view frame
///
/// Looking down the torus symmetry axis, the world point `(x,y)` maps onto
/// the image point `(s·x, s·y)` where the scale `s` brings the reference
/// radius onto the image half-width.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Topview {
    scale: f64,
    reference: f64,
}
impl Topview {
    /// Creates the frame mapping the radius `reference` onto the extent
    /// half-width
    ///
    /// Returns `None` if the reference radius is not strictly positive.
    pub fn new(extent: Extent, reference: f64) -> Option<Self> {
        (reference > 0f64 && reference.is_finite()).then(|| Self {
            scale: extent.half_width() / reference,
            reference,
        })
    }
    pub fn scale(&self) -> f64 {
        self.scale
    }
    pub fn reference(&self) -> f64 {
        self.reference
    }
    fn to_image(&self, x: f64, y: f64) -> Option<[f64; 2]> {
        Some([self.scale * x, self.scale * y])
    }
    /// Closed circle of radius `r` around the symmetry axis
    pub fn circle(&self, r: f64) -> Polyline {
        (0..=CIRCLE_SEGMENTS)
            .map(|i| {
                let (sin, cos) = (2f64 * PI * i as f64 / CIRCLE_SEGMENTS as f64).sin_cos();
                self.to_image(r * cos, r * sin)
            })
            .collect()
    }
    /// Radial segment from `r_min` to `r_max` at the toroidal position
    /// `toroidal`
    pub fn radial_segment(&self, r_min: f64, r_max: f64, toroidal: Toroidal) -> Polyline {
        [r_min, r_max]
            .into_iter()
            .map(|r| {
                let p = toroidal.place(r, 0f64);
                self.to_image(p.x, p.y)
            })
            .collect()
    }
    /// Arrow from `origin` along the horizontal projection of `direction`
    ///
    /// The arrow is `length` long in world units; the head barbs are
    /// separated from the shaft by path breaks. A vertical direction gives an
    /// empty path.
    pub fn arrow(&self, origin: &Vector3<f64>, direction: &Vector3<f64>, length: f64) -> Polyline {
        let h = direction.x.hypot(direction.y);
        if !(h > f64::EPSILON) {
            return Polyline::default();
        }
        let (ux, uy) = (direction.x / h, direction.y / h);
        let tip = (origin.x + length * ux, origin.y + length * uy);
        let barb = |angle: f64| {
            let (sin, cos) = angle.sin_cos();
            let (bx, by) = (ux * cos - uy * sin, ux * sin + uy * cos);
            self.to_image(tip.0 - BARB * length * bx, tip.1 - BARB * length * by)
        };
        Polyline::new(vec![
            self.to_image(origin.x, origin.y),
            self.to_image(tip.0, tip.1),
            None,
            barb(PI / 6f64),
            self.to_image(tip.0, tip.1),
            barb(-PI / 6f64),
        ])
    }
}
