use nalgebra::Vector3;

use super::{Camera, Polyline};
use crate::geometry::Section;

/// Toroidal position of a poloidal cross-section
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Toroidal {
    /// Toroidal angle [rad]
    Angle(f64),
    /// Precomputed cosine and sine of the toroidal angle
    CosSin(f64, f64),
}
impl Toroidal {
    /// Toroidal position from an angle in degrees
    pub fn degrees(angle: f64) -> Self {
        Toroidal::Angle(angle.to_radians())
    }
    pub fn cos_sin(&self) -> (f64, f64) {
        match *self {
            Toroidal::Angle(angle) => (angle.cos(), angle.sin()),
            Toroidal::CosSin(cos, sin) => (cos, sin),
        }
    }
    /// Places the poloidal point `(r,z)` at this toroidal position
    ///
    /// `(x,y,z) = (r·cosφ, -r·sinφ, z)`
    pub fn place(&self, r: f64, z: f64) -> Vector3<f64> {
        let (cos, sin) = self.cos_sin();
        Vector3::new(r * cos, -r * sin, z)
    }
}

/// Radial and vertical limits on the projected cross-sections
///
/// Each limit is active only when set; points outside are rendered as path
/// breaks.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SectionLimits {
    pub r_max: Option<f64>,
    pub z_max: Option<f64>,
    pub z_min: Option<f64>,
}
impl SectionLimits {
    pub fn contains(&self, r: f64, z: f64) -> bool {
        self.r_max.map_or(true, |r_max| r < r_max)
            && self.z_max.map_or(true, |z_max| z <= z_max)
            && self.z_min.map_or(true, |z_min| z >= z_min)
    }
}

/// Largest number of cross-sections drawn by a sweep
pub const MAX_SWEEP_ANGLES: usize = 3600;

/// Range of toroidal angles [deg] swept by the wall overlay
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sweep {
    pub start: f64,
    pub end: f64,
    pub step: f64,
}
impl Default for Sweep {
    fn default() -> Self {
        Self {
            start: 0f64,
            end: 360f64,
            step: 1f64,
        }
    }
}
impl Sweep {
    /// Angles `start, start+step, ...` strictly below `end`
    ///
    /// At most [MAX_SWEEP_ANGLES] angles are returned.
    pub fn angles(&self) -> impl Iterator<Item = f64> + '_ {
        let n = if self.step > 0f64 && self.end > self.start {
            ((self.end - self.start) / self.step).ceil() as usize
        } else {
            0
        };
        if n > MAX_SWEEP_ANGLES {
            log::warn!("sweep of {} angles truncated to {}", n, MAX_SWEEP_ANGLES);
        }
        let n = n.min(MAX_SWEEP_ANGLES);
        (0..n).map(move |i| self.start + i as f64 * self.step)
    }
}

/// Cross-section projector for a given camera
pub struct Projector<'a> {
    camera: &'a Camera,
    limits: SectionLimits,
}
impl<'a> Projector<'a> {
    pub fn new(camera: &'a Camera) -> Self {
        Self {
            camera,
            limits: SectionLimits::default(),
        }
    }
    /// Sets the limits outside of which section points are masked
    pub fn limits(self, limits: SectionLimits) -> Self {
        Self { limits, ..self }
    }
    /// Projects a cross-section placed at the toroidal position `toroidal`
    pub fn section(&self, section: &Section, toroidal: Toroidal) -> Polyline {
        section
            .iter()
            .map(|(r, z)| {
                if self.limits.contains(r, z) {
                    self.camera.project(&toroidal.place(r, z))
                } else {
                    None
                }
            })
            .collect()
    }
    /// Projects the cross-section that faces the camera
    pub fn orthogonal(&self, section: &Section) -> Polyline {
        self.section(section, self.camera.facing())
    }
    /// Projects the cross-section at every angle of the sweep
    pub fn sweep(&self, section: &Section, sweep: &Sweep) -> Vec<Polyline> {
        sweep
            .angles()
            .map(|angle| self.section(section, Toroidal::degrees(angle)))
            .collect()
    }
}
