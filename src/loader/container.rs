use std::collections::BTreeMap;

use nalgebra::DMatrix;

use super::{ImageRecord, LoaderError, Result};
use crate::{
    geometry::{FluxSurfaceSet, Section},
    projection::Camera,
    stokes::StokesChannels,
};

/// Named variables container
pub trait Container {
    /// Returns the variable `name` as stored, `None` if it is absent
    fn var(&self, name: &str) -> Result<Option<DMatrix<f64>>>;
    /// Returns the variable `name`, failing if it is absent
    fn required(&self, name: &str) -> Result<DMatrix<f64>> {
        self.var(name)?
            .ok_or_else(|| LoaderError::MissingVariable(name.to_string()))
    }
}

/// In-memory container
#[derive(Debug, Clone, Default)]
pub struct VarMap {
    vars: BTreeMap<String, DMatrix<f64>>,
}
impl VarMap {
    pub fn new() -> Self {
        Default::default()
    }
    pub fn insert(mut self, name: impl Into<String>, value: DMatrix<f64>) -> Self {
        self.vars.insert(name.into(), value);
        self
    }
    /// Inserts a scalar as a 1×1 array
    pub fn scalar(self, name: impl Into<String>, value: f64) -> Self {
        self.insert(name, DMatrix::from_element(1, 1, value))
    }
    /// Inserts a vector as a 1×N array
    pub fn vector(self, name: impl Into<String>, value: &[f64]) -> Self {
        self.insert(name, DMatrix::from_row_slice(1, value.len(), value))
    }
}
impl Container for VarMap {
    fn var(&self, name: &str) -> Result<Option<DMatrix<f64>>> {
        Ok(self.vars.get(name).cloned())
    }
}

// N-vector from a N×1 or a 1×N array
fn vector<const N: usize>(name: &str, m: DMatrix<f64>) -> Result<[f64; N]> {
    match m.shape() {
        (1, n) | (n, 1) if n == N => {
            let mut v = [0f64; N];
            v.iter_mut().zip(m.iter()).for_each(|(v, m)| *v = *m);
            Ok(v)
        }
        shape => Err(LoaderError::Shape {
            name: name.to_string(),
            shape,
            expected: format!("{N}×1 or 1×{N}"),
        }),
    }
}
fn scalar(name: &str, m: DMatrix<f64>) -> Result<f64> {
    vector::<1>(name, m).map(|[x]| x)
}
fn lengths(name: &str, m: DMatrix<f64>) -> Result<Vec<usize>> {
    m.iter()
        .map(|&x| {
            if x >= 0f64 && x.fract() == 0f64 {
                Ok(x as usize)
            } else {
                Err(LoaderError::Value {
                    name: name.to_string(),
                    value: x,
                })
            }
        })
        .collect()
}

impl ImageRecord {
    /// Builds a record from the variables of a container
    ///
    /// The image is either `image` or the four `StokesI/Q/U/V` grids, stored
    /// column-major and transposed on load. The camera needs
    /// `detectorPosition`, `detectorDirection` and `detectorVisang`,
    /// `detectorRoll` is optional. The wall, separatrix and flux surfaces are
    /// optional.
    pub fn from_container<C: Container + ?Sized>(container: &C) -> Result<Self> {
        let record = match container.var("image")? {
            Some(image) => ImageRecord::intensity(image.transpose()),
            None => {
                let grid = |name: &str| container.required(name).map(|m| m.transpose());
                ImageRecord::polarimetric(StokesChannels::new(
                    grid("StokesI")?,
                    grid("StokesQ")?,
                    grid("StokesU")?,
                    grid("StokesV")?,
                )?)
            }
        };
        let position = vector::<3>("detectorPosition", container.required("detectorPosition")?)?;
        let direction =
            vector::<3>("detectorDirection", container.required("detectorDirection")?)?;
        let visang = scalar("detectorVisang", container.required("detectorVisang")?)?;
        let roll = container
            .var("detectorRoll")?
            .map(|m| scalar("detectorRoll", m))
            .transpose()?
            .unwrap_or_default();
        let mut record = record.camera(Camera::new(position, direction, visang)?.roll(roll));

        if let Some(wall) = container.var("wall")? {
            record = record.wall(Section::from_matrix(&wall)?);
        }
        if let Some(separatrix) = container.var("separatrix")? {
            record = record.separatrix(Section::from_matrix(&separatrix)?);
        }
        if let Some(r) = container.var("fluxSurfacesR")? {
            let z = container.required("fluxSurfacesZ")?;
            let n = lengths("fluxSurfacesLength", container.required("fluxSurfacesLength")?)?;
            let labels: Option<Vec<f64>> = container
                .var("fluxSurfacesLabel")?
                .map(|m| m.iter().copied().collect());
            record = record.flux_surfaces(FluxSurfaceSet::from_packed(
                &r,
                &z,
                &n,
                labels.as_deref(),
            )?);
        }
        Ok(record)
    }
}
