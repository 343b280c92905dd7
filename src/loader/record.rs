use nalgebra::DMatrix;

use crate::{
    geometry::{FluxSurfaceSet, Section},
    projection::Camera,
    stokes::{finite_max, Quantity, ResolvedField, StokesChannels},
};

/// Image data of a record
#[derive(Debug, Clone, PartialEq)]
pub enum ImageData {
    /// Plain intensity
    Intensity(DMatrix<f64>),
    /// Stokes parameters
    Stokes(StokesChannels),
}

/// Image and geometry record
///
/// Grids are stored row-major with their origin at the lower-left corner.
/// The camera and each piece of geometry are independently optional.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageRecord {
    data: ImageData,
    camera: Option<Camera>,
    wall: Option<Section>,
    separatrix: Option<Section>,
    flux_surfaces: Option<FluxSurfaceSet>,
}
impl ImageRecord {
    pub fn intensity(image: DMatrix<f64>) -> Self {
        Self::new(ImageData::Intensity(image))
    }
    pub fn polarimetric(stokes: StokesChannels) -> Self {
        Self::new(ImageData::Stokes(stokes))
    }
    fn new(data: ImageData) -> Self {
        Self {
            data,
            camera: None,
            wall: None,
            separatrix: None,
            flux_surfaces: None,
        }
    }
    pub fn camera(self, camera: Camera) -> Self {
        Self {
            camera: Some(camera),
            ..self
        }
    }
    pub fn wall(self, wall: Section) -> Self {
        Self {
            wall: Some(wall),
            ..self
        }
    }
    pub fn separatrix(self, separatrix: Section) -> Self {
        Self {
            separatrix: Some(separatrix),
            ..self
        }
    }
    pub fn flux_surfaces(self, flux_surfaces: FluxSurfaceSet) -> Self {
        Self {
            flux_surfaces: Some(flux_surfaces),
            ..self
        }
    }
    pub fn data(&self) -> &ImageData {
        &self.data
    }
    pub fn is_polarimetric(&self) -> bool {
        matches!(self.data, ImageData::Stokes(_))
    }
    /// Image shape `(rows,columns)`
    pub fn shape(&self) -> (usize, usize) {
        match &self.data {
            ImageData::Intensity(image) => image.shape(),
            ImageData::Stokes(stokes) => stokes.shape(),
        }
    }
    /// Intensity: the plain image or Stokes I
    pub fn intensity_grid(&self) -> &DMatrix<f64> {
        match &self.data {
            ImageData::Intensity(image) => image,
            ImageData::Stokes(stokes) => &stokes.i,
        }
    }
    /// Largest finite intensity
    pub fn max_intensity(&self) -> f64 {
        finite_max(self.intensity_grid())
    }
    pub fn get_camera(&self) -> Option<&Camera> {
        self.camera.as_ref()
    }
    pub fn get_wall(&self) -> Option<&Section> {
        self.wall.as_ref()
    }
    pub fn get_separatrix(&self) -> Option<&Section> {
        self.separatrix.as_ref()
    }
    pub fn get_flux_surfaces(&self) -> Option<&FluxSurfaceSet> {
        self.flux_surfaces.as_ref()
    }
    pub fn has_camera(&self) -> bool {
        self.camera.is_some()
    }
    pub fn has_wall(&self) -> bool {
        self.wall.as_ref().map_or(false, |w| !w.is_empty())
    }
    pub fn has_separatrix(&self) -> bool {
        self.separatrix.as_ref().map_or(false, |s| !s.is_empty())
    }
    pub fn has_flux_surfaces(&self) -> bool {
        self.flux_surfaces.as_ref().map_or(false, |f| !f.is_empty())
    }
    /// Derives the field of `quantity`
    ///
    /// A plain intensity record always resolves to its intensity. A
    /// polarimetric record resolves [Quantity::NotApplicable] to `None`.
    pub fn resolve(&self, quantity: Quantity) -> Option<ResolvedField> {
        match &self.data {
            ImageData::Intensity(image) => {
                if quantity != Quantity::I {
                    log::warn!("{} is not applicable to an intensity image", quantity);
                }
                Some(ResolvedField::intensity(image.clone()))
            }
            ImageData::Stokes(stokes) => stokes.resolve(quantity),
        }
    }
}
