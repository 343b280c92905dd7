//! Image assembly
//!
//! The [Assembler] turns a loaded record and the [RenderState] into layers
//! drawn on a [Surface]: the color mapped image, the geometry overlays, the
//! captions, the colorbar and the mask. [Scene] is the in-memory surface,
//! rasterized to file by the `export` module with the `plot` feature.
//! Polarimetric records can also be shown as a grid of panels, see
//! [Assembler::assemble_panels].

mod assembler;
pub use assembler::{Assembler, Phase};
mod colorbar;
pub use colorbar::{native_ticks, relative_ticks, Colorbar, Tick};
mod display;
pub use display::{display_field, linear_ceiling, mask, DisplayField, LOG_DECADES};
mod panels;
pub use panels::{PanelGrid, PanelLabel, PanelScene, MAX_PANELS};
mod scene;
pub use scene::{z_order, Alignment, Layer, LayerId, Raster, Scene, Surface, Text};
mod state;
pub use state::{Caption, IntensitySlider, LineStyle, Overlay, RenderState};
#[cfg(feature = "plot")]
pub mod export;

use crate::{colormap::ColormapError, loader::LoaderError};

#[derive(thiserror::Error, Debug)]
pub enum RenderError {
    #[error("no image loaded")]
    NoRecord,
    #[error("no image plotted")]
    NoImagePlotted,
    #[error("the record has no camera")]
    NoCamera,
    #[error("the {0} overlay requires geometry that is not loaded")]
    MissingGeometry(Overlay),
    #[error("invalid {rows}×{cols} panel grid, expected 1 to 9 rows and columns")]
    PanelGrid { rows: usize, cols: usize },
    #[error("colormap error")]
    Colormap(#[from] ColormapError),
    #[error("failed to load the image")]
    Loader(#[from] LoaderError),
}
pub type Result<T> = std::result::Result<T, RenderError>;
