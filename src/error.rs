use crate::{
    colormap::ColormapError, geometry::GeometryError, loader::LoaderError,
    projection::CameraError, render::RenderError, stokes::StokesError,
};

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("Error in the `geometry` module")]
    Geometry(#[from] GeometryError),
    #[error("Error in the `projection` module")]
    Camera(#[from] CameraError),
    #[error("Error in the `stokes` module")]
    Stokes(#[from] StokesError),
    #[error("Error in the `colormap` module")]
    Colormap(#[from] ColormapError),
    #[error("Error in the `loader` module")]
    Loader(#[from] LoaderError),
    #[error("Error in the `render` module")]
    Render(#[from] RenderError),
    #[cfg(feature = "plot")]
    #[error("Error in the `export` module")]
    Export(#[from] crate::render::export::ExportError),
}
pub type Result<T> = std::result::Result<T, Error>;
