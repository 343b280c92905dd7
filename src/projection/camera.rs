use std::f64::consts::PI;

use nalgebra::{Matrix3, Rotation3, Unit, Vector3};

use super::{Extent, Toroidal};

// tolerance on 1+cos(angle) below which the viewing direction is taken as
// anti-parallel to the forward axis
const ANTIPARALLEL_TOLERANCE: f64 = 1e-9;

#[derive(thiserror::Error, Debug, PartialEq)]
pub enum CameraError {
    #[error("the camera viewing direction must be non-zero")]
    ZeroDirection,
    #[error("the camera parameters must be finite")]
    NonFinite,
    #[error("the camera field of view must be within ]0,π[, found {0}")]
    FieldOfView(f64),
}
type Result<T> = std::result::Result<T, CameraError>;

/// Pinhole camera
///
/// The camera frame has its forward (depth) axis along the global `+y`
/// axis: the world to camera rotation maps the viewing direction onto `+y`
/// with the Rodrigues rotation-between-vectors formula. A camera-frame point
/// `(x',y',z')` projects to `(x'/y', z'/y')`.
#[derive(Debug, Clone, PartialEq)]
pub struct Camera {
    position: Vector3<f64>,
    direction: Unit<Vector3<f64>>,
    fov: f64,
    roll: f64,
    // world to camera frame rotation, roll included
    rotation: Matrix3<f64>,
}
impl Camera {
    /// Creates a camera at `position` looking along `direction` with the full
    /// vertical field of view `fov` [rad]
    pub fn new(position: [f64; 3], direction: [f64; 3], fov: f64) -> Result<Self> {
        if position.iter().chain(&direction).any(|x| !x.is_finite()) {
            return Err(CameraError::NonFinite);
        }
        if !(fov > 0f64 && fov < PI) {
            return Err(CameraError::FieldOfView(fov));
        }
        let direction = Unit::try_new(Vector3::from(direction), f64::EPSILON)
            .ok_or(CameraError::ZeroDirection)?;
        Ok(Self {
            position: Vector3::from(position),
            rotation: Self::world_to_camera(&direction, 0f64),
            direction,
            fov,
            roll: 0f64,
        })
    }
    /// Sets the roll angle [rad] around the viewing direction
    pub fn roll(mut self, roll: f64) -> Self {
        self.roll = roll;
        self.rotation = Self::world_to_camera(&self.direction, roll);
        self
    }
    pub fn position(&self) -> &Vector3<f64> {
        &self.position
    }
    /// Unit viewing direction
    pub fn direction(&self) -> &Vector3<f64> {
        self.direction.as_ref()
    }
    pub fn fov(&self) -> f64 {
        self.fov
    }
    pub fn roll_angle(&self) -> f64 {
        self.roll
    }
    /// Image plane extent
    pub fn extent(&self) -> Extent {
        Extent::from_fov(self.fov)
    }
    /// Rotation that maps `direction` onto the forward axis `+y`
    ///
    /// `R = I + [v]ₓ + [v]ₓ²/(1+c)` with `v = d×y` and `c = d·y`. The formula
    /// is singular for `d = -y`, where a half turn around the vertical axis
    /// is used instead.
    fn align_with_forward(direction: &Unit<Vector3<f64>>) -> Matrix3<f64> {
        let forward = Vector3::y();
        let c = direction.dot(&forward);
        if 1f64 + c < ANTIPARALLEL_TOLERANCE {
            return *Rotation3::from_axis_angle(&Vector3::z_axis(), PI).matrix();
        }
        let vx = direction.cross(&forward).cross_matrix();
        Matrix3::identity() + vx + vx * vx / (1f64 + c)
    }
    /// World to camera rotation
    ///
    /// The roll is applied first, around the viewing direction, with the
    /// angle negated so that a positive roll turns the camera clockwise as
    /// seen from behind it.
    fn world_to_camera(direction: &Unit<Vector3<f64>>, roll: f64) -> Matrix3<f64> {
        let align = Self::align_with_forward(direction);
        if roll == 0f64 {
            align
        } else {
            align * Rotation3::from_axis_angle(direction, -roll).matrix()
        }
    }
    /// Transforms a world point into the camera frame
    pub fn to_camera_frame(&self, point: &Vector3<f64>) -> Vector3<f64> {
        self.rotation * (point - self.position)
    }
    /// Transforms a camera frame point back into the world frame
    pub fn from_camera_frame(&self, point: &Vector3<f64>) -> Vector3<f64> {
        self.rotation.transpose() * point + self.position
    }
    /// Pinhole projection of a world point
    ///
    /// Returns `None` for points at or behind the pinhole.
    pub fn project(&self, point: &Vector3<f64>) -> Option<[f64; 2]> {
        let q = self.to_camera_frame(point);
        if !(q.y > 0f64) {
            return None;
        }
        let uv = [q.x / q.y, q.z / q.y];
        uv.iter().all(|x| x.is_finite()).then_some(uv)
    }
    /// World direction of the ray through the image point `(u,v)`
    pub fn ray(&self, u: f64, v: f64) -> Vector3<f64> {
        self.rotation.transpose() * Vector3::new(u, 1f64, v)
    }
    /// Back-projects the image point `(u,v)` onto the poloidal half-plane at
    /// the toroidal position `toroidal`, returning the `(r,z)` coordinates
    ///
    /// Returns `None` if the ray is parallel to the plane or crosses it
    /// behind the camera.
    pub fn back_project(&self, u: f64, v: f64, toroidal: Toroidal) -> Option<(f64, f64)> {
        let (cos, sin) = toroidal.cos_sin();
        let normal = Vector3::new(sin, cos, 0f64);
        let ray = self.ray(u, v);
        let denom = normal.dot(&ray);
        if denom.abs() < f64::EPSILON {
            return None;
        }
        let t = -normal.dot(&self.position) / denom;
        if !(t > 0f64) {
            return None;
        }
        let p = self.position + ray * t;
        Some((p.x * cos - p.y * sin, p.z))
    }
    /// Toroidal position of the cross-section facing the camera
    ///
    /// Derived from the horizontal projection of the viewing direction; a
    /// camera looking straight along the symmetry axis faces the `φ=0` plane.
    pub fn facing(&self) -> Toroidal {
        let d = self.direction();
        let h = d.x.hypot(d.y);
        if h < f64::EPSILON {
            Toroidal::CosSin(1f64, 0f64)
        } else {
            Toroidal::CosSin(d.y / h, d.x / h)
        }
    }
}
