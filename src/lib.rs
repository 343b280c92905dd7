//! # softviz
//!
//! Visualization of synthetic synchrotron camera images of tokamak plasmas.
//!
//! An image record ([loader::ImageRecord]) carries either a plain intensity
//! grid or the four Stokes channels, and optionally the camera and the
//! tokamak geometry (wall, separatrix, flux surfaces).
//! The [render::Assembler] resolves the displayed [stokes::Quantity],
//! maps it through a [colormap::Colormap] and draws the image together with
//! the geometry projected by [projection::Camera] onto a [render::Surface].
//!
//! ```no_run
//! use softviz::{loader::Loader, render::{Assembler, Overlay, RenderState, Scene}};
//!
//! # fn main() -> anyhow::Result<()> {
//! let state = RenderState::default()
//!     .colormap("viridis", false)
//!     .overlay(Overlay::WallCrossSection);
//! let mut assembler = Assembler::new(state);
//! assembler.load_file(&Loader::default(), "image.mat")?;
//! let mut scene = Scene::default();
//! assembler.assemble(&mut scene)?;
//! # Ok(())
//! # }
//! ```

pub mod colormap;
pub mod error;
pub mod geometry;
pub mod loader;
pub mod projection;
pub mod render;
pub mod stokes;

pub use error::{Error, Result};
