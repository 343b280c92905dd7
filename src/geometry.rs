//! Poloidal cross-sections
//!
//! Wall and separatrix contours are ordered sequences of (r,z) pairs in the
//! tokamak poloidal plane. Flux surfaces are a labeled set of such contours
//! delivered packed into rectangular buffers with per-contour lengths.

use itertools::{
    Itertools,
    MinMaxResult::{MinMax, NoElements, OneElement},
};
use nalgebra::DMatrix;

#[derive(thiserror::Error, Debug)]
pub enum GeometryError {
    #[error("a cross-section must be a N×2 or 2×N array, found {0}×{1}")]
    Shape(usize, usize),
    #[error("flux surface buffers shapes differ: R is {0:?}, Z is {1:?}")]
    FluxShape((usize, usize), (usize, usize)),
    #[error("expected {expected} flux surface lengths, found {found}")]
    FluxCount { expected: usize, found: usize },
    #[error("flux surface #{index} length ({length}) exceeds the buffer width ({width})")]
    FluxLength {
        index: usize,
        length: usize,
        width: usize,
    },
}
type Result<T> = std::result::Result<T, GeometryError>;

/// Poloidal cross-section
#[derive(Debug, Clone, PartialEq)]
pub struct Section {
    // the (r,z) contour
    rz: Vec<[f64; 2]>,
    // cached radial range of the contour
    r_min: f64,
    r_max: f64,
}
impl Default for Section {
    fn default() -> Self {
        Self {
            rz: Vec::new(),
            r_min: f64::INFINITY,
            r_max: f64::NEG_INFINITY,
        }
    }
}
impl Section {
    /// Creates a cross-section from (r,z) pairs
    pub fn new(rz: Vec<[f64; 2]>) -> Self {
        let mut this = Self::default();
        this.set(rz);
        this
    }
    /// Creates a cross-section from a N×2 or a 2×N array
    ///
    /// A 2×2 array is read as N×2, i.e. one (r,z) pair per row.
    pub fn from_matrix(m: &DMatrix<f64>) -> Result<Self> {
        let rz = match m.shape() {
            (_, 2) => m.row_iter().map(|row| [row[0], row[1]]).collect(),
            (2, _) => m.column_iter().map(|col| [col[0], col[1]]).collect(),
            (n, p) => return Err(GeometryError::Shape(n, p)),
        };
        Ok(Self::new(rz))
    }
    /// Replaces the contour and refreshes the cached radial range
    pub fn set(&mut self, rz: Vec<[f64; 2]>) {
        (self.r_min, self.r_max) = match rz.iter().map(|p| p[0]).minmax() {
            MinMax(r_min, r_max) => (r_min, r_max),
            OneElement(r) => (r, r),
            NoElements => (f64::INFINITY, f64::NEG_INFINITY),
        };
        self.rz = rz;
    }
    pub fn len(&self) -> usize {
        self.rz.len()
    }
    pub fn is_empty(&self) -> bool {
        self.rz.is_empty()
    }
    /// Smallest radius of the contour
    pub fn r_min(&self) -> f64 {
        self.r_min
    }
    /// Largest radius of the contour
    pub fn r_max(&self) -> f64 {
        self.r_max
    }
    /// Iterator over the (r,z) pairs
    pub fn iter(&self) -> impl Iterator<Item = (f64, f64)> + '_ {
        self.rz.iter().map(|p| (p[0], p[1]))
    }
    /// Returns the contour as a N×2 array
    pub fn to_matrix(&self) -> DMatrix<f64> {
        DMatrix::from_fn(self.rz.len(), 2, |i, j| self.rz[i][j])
    }
}

/// A single flux surface contour
#[derive(Debug, Clone, PartialEq)]
pub struct FluxSurface {
    pub label: Option<f64>,
    pub section: Section,
}

/// Labeled set of flux surface contours
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FluxSurfaceSet {
    surfaces: Vec<FluxSurface>,
}
impl FluxSurfaceSet {
    /// Unpacks the flux surfaces from rectangular buffers
    ///
    /// Row `k` of `r` and `z` holds the contour of surface `k` in its first
    /// `lengths[k]` entries, the remainder of the row is padding.
    pub fn from_packed(
        r: &DMatrix<f64>,
        z: &DMatrix<f64>,
        lengths: &[usize],
        labels: Option<&[f64]>,
    ) -> Result<Self> {
        if r.shape() != z.shape() {
            return Err(GeometryError::FluxShape(r.shape(), z.shape()));
        }
        let (n, width) = r.shape();
        if lengths.len() != n {
            return Err(GeometryError::FluxCount {
                expected: n,
                found: lengths.len(),
            });
        }
        if let Some(labels) = labels {
            if labels.len() != n {
                return Err(GeometryError::FluxCount {
                    expected: n,
                    found: labels.len(),
                });
            }
        }
        let surfaces = lengths
            .iter()
            .enumerate()
            .map(|(index, &length)| {
                if length > width {
                    return Err(GeometryError::FluxLength {
                        index,
                        length,
                        width,
                    });
                }
                Ok(FluxSurface {
                    label: labels.map(|l| l[index]),
                    section: Section::new(
                        (0..length).map(|j| [r[(index, j)], z[(index, j)]]).collect(),
                    ),
                })
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { surfaces })
    }
    pub fn len(&self) -> usize {
        self.surfaces.len()
    }
    pub fn is_empty(&self) -> bool {
        self.surfaces.is_empty()
    }
    pub fn iter(&self) -> impl Iterator<Item = &FluxSurface> {
        self.surfaces.iter()
    }
}
impl FromIterator<FluxSurface> for FluxSurfaceSet {
    fn from_iter<T: IntoIterator<Item = FluxSurface>>(iter: T) -> Self {
        Self {
            surfaces: iter.into_iter().collect(),
        }
    }
}
