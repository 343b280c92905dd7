use std::path::Path;

use strum::{EnumCount, IntoEnumIterator};

use super::{
    display::{display_field, linear_ceiling, mask},
    scene::{z_order, Alignment, LayerId, Raster, Surface, Text},
    Caption, Colorbar, DisplayField, Overlay, PanelLabel, RenderError, RenderState, Result,
};
use crate::{
    colormap::{Colormap, Colormaps, Rgba},
    geometry::Section,
    loader::{ImageRecord, LoadReport, Loader},
    projection::{Camera, Extent, Polyline, Projector, SectionLimits, Sweep, Topview},
    stokes::{Quantity, ResolvedField},
};

// geometry required by an overlay
fn require(section: Option<&Section>, overlay: Overlay) -> Result<&Section> {
    section.ok_or(RenderError::MissingGeometry(overlay))
}

/// Assembler phases
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// No image loaded
    Empty,
    /// Image loaded, scene not assembled
    Loaded,
    /// Scene assembled
    Rendered,
}

// handles of the layers drawn by the assembler
#[derive(Debug, Default)]
struct Slots {
    image: Option<LayerId>,
    mask: Option<LayerId>,
    colorbar: Option<LayerId>,
    captions: Vec<LayerId>,
    overlays: [Option<LayerId>; Overlay::COUNT],
}

/// Image assembler
///
/// Owns the view configuration and the loaded record, and keeps track of
/// the layers it has drawn on the surface so that each visual element can
/// be rebuilt on its own.
pub struct Assembler {
    state: RenderState,
    colormaps: Colormaps,
    record: Option<ImageRecord>,
    report: Option<LoadReport>,
    field: Option<ResolvedField>,
    slots: Slots,
    phase: Phase,
}
impl Default for Assembler {
    fn default() -> Self {
        Self::new(RenderState::default())
    }
}
impl Assembler {
    pub fn new(state: RenderState) -> Self {
        Self {
            state,
            colormaps: Colormaps::default(),
            record: None,
            report: None,
            field: None,
            slots: Slots::default(),
            phase: Phase::Empty,
        }
    }
    pub fn phase(&self) -> Phase {
        self.phase
    }
    pub fn state(&self) -> &RenderState {
        &self.state
    }
    pub fn colormaps(&self) -> &Colormaps {
        &self.colormaps
    }
    pub fn record(&self) -> Option<&ImageRecord> {
        self.record.as_ref()
    }
    pub fn report(&self) -> Option<&LoadReport> {
        self.report.as_ref()
    }
    /// Field of the selected quantity
    pub fn field(&self) -> Option<&ResolvedField> {
        self.field.as_ref()
    }
    /// Replaces the record, the render state is kept
    pub fn load(&mut self, record: ImageRecord, report: LoadReport) {
        self.field = record.resolve(self.state.quantity);
        self.record = Some(record);
        self.report = Some(report);
        self.phase = Phase::Loaded;
    }
    /// Loads an image file, leaving the assembler unchanged on failure
    pub fn load_file<P: AsRef<Path>>(&mut self, loader: &Loader, path: P) -> Result<LoadReport> {
        let (record, report) = loader.load(path)?;
        self.load(record, report);
        Ok(report)
    }

    pub fn has_image(&self) -> bool {
        self.record.is_some()
    }
    pub fn has_camera(&self) -> bool {
        self.record.as_ref().map_or(false, |r| r.has_camera())
    }
    pub fn has_wall(&self) -> bool {
        self.record.as_ref().map_or(false, |r| r.has_wall())
    }
    pub fn has_separatrix(&self) -> bool {
        self.record.as_ref().map_or(false, |r| r.has_separatrix())
    }
    pub fn has_flux_surfaces(&self) -> bool {
        self.record.as_ref().map_or(false, |r| r.has_flux_surfaces())
    }
    /// Checks if the overlay is drawn
    pub fn has_overlay(&self, overlay: Overlay) -> bool {
        self.slots.overlays[overlay.index()].is_some()
    }
    pub fn has_colorbar(&self) -> bool {
        self.slots.colorbar.is_some()
    }
    pub fn has_mask(&self) -> bool {
        self.slots.mask.is_some()
    }
    pub fn image_plotted(&self) -> bool {
        self.slots.image.is_some()
    }

    pub(super) fn record_or_err(&self) -> Result<&ImageRecord> {
        self.record.as_ref().ok_or(RenderError::NoRecord)
    }
    pub(super) fn colormap(&self) -> Result<&Colormap> {
        Ok(self
            .colormaps
            .get(&self.state.colormap, self.state.inverted)?)
    }
    pub(super) fn extent(&self) -> Extent {
        self.record
            .as_ref()
            .and_then(|r| r.get_camera())
            .map(Camera::extent)
            .unwrap_or_default()
    }

    /// Selects the displayed quantity
    pub fn set_quantity(&mut self, quantity: Quantity) {
        self.state.quantity = quantity;
        self.field = self.record.as_ref().and_then(|r| r.resolve(quantity));
    }
    /// Selects a registered colormap or its reversed twin
    pub fn set_colormap(&mut self, name: &str, inverted: bool) -> Result<()> {
        self.colormaps.get(name, inverted)?;
        self.state.colormap = name.to_string();
        self.state.inverted = inverted;
        Ok(())
    }
    /// Registers GeriMap with the transparency ramp over the `transparency`
    /// bottom fraction of the colormap
    pub fn register_gerimap(&mut self, transparency: Option<f64>) -> Result<()> {
        Ok(self.colormaps.register_gerimap(transparency)?)
    }
    /// Registers a colormap and its reversed twin
    pub fn register_colormap(&mut self, colormap: Colormap) {
        self.colormaps.register(colormap);
    }
    pub fn set_logarithmic(&mut self, logarithmic: bool) {
        self.state.logarithmic = logarithmic;
    }
    pub fn set_colorbar(&mut self, colorbar: bool, relative: bool) {
        self.state.colorbar = colorbar;
        self.state.relative_colorbar = relative;
    }
    pub fn set_captions(&mut self, captions: Vec<Caption>) {
        self.state.captions = captions;
    }
    /// Shows the quantity label on the panels, or hides it with `None`
    pub fn set_panel_label(&mut self, label: Option<PanelLabel>) {
        self.state.panel_label = label;
    }
    pub fn set_limits(&mut self, limits: SectionLimits) {
        self.state.limits = limits;
    }
    pub fn set_sweep(&mut self, sweep: Sweep) {
        self.state.sweep = sweep;
    }

    /// Grid and color limits of the selected quantity
    ///
    /// Returns `None` if nothing is displayed for the selected quantity.
    pub fn display_field(&self) -> Result<Option<DisplayField>> {
        self.record_or_err()?;
        Ok(self
            .field
            .as_ref()
            .map(|f| display_field(f, self.state.ceiling, self.state.logarithmic)))
    }

    /// Rebuilds the whole scene
    ///
    /// Enabled overlays without geometry are skipped.
    pub fn assemble<S: Surface>(&mut self, surface: &mut S) -> Result<()> {
        self.record_or_err()?;
        surface.clear();
        self.slots = Slots::default();
        self.plot_image(surface)?;
        let overlays: Vec<_> = self.state.overlays.iter().copied().collect();
        for overlay in overlays {
            match self.plot_overlay(surface, overlay) {
                Ok(()) => (),
                Err(e @ (RenderError::MissingGeometry(_) | RenderError::NoCamera)) => {
                    log::warn!("{} overlay skipped: {}", overlay, e)
                }
                Err(e) => return Err(e),
            }
        }
        self.plot_captions(surface);
        if self.state.colorbar && self.image_plotted() {
            self.plot_colorbar(surface)?;
        }
        self.phase = Phase::Rendered;
        log::debug!("scene assembled");
        Ok(())
    }
    /// Rebuilds the image, the mask and the colorbar
    pub fn refresh_image<S: Surface>(&mut self, surface: &mut S) -> Result<()> {
        self.plot_image(surface)?;
        self.remove_colorbar(surface);
        if self.state.colorbar && self.image_plotted() {
            self.plot_colorbar(surface)?;
        }
        Ok(())
    }

    /// Draws the image of the selected quantity and its mask
    pub fn plot_image<S: Surface>(&mut self, surface: &mut S) -> Result<()> {
        self.remove_image(surface);
        let Some(display) = self.display_field()? else {
            log::warn!("nothing to display for {}", self.state.quantity);
            return Ok(());
        };
        let raster = Raster {
            grid: display.grid,
            colormap: self.colormap()?.clone(),
            color_min: display.color_min,
            color_max: display.color_max,
            extent: self.extent(),
            visible: None,
        };
        self.slots.image = Some(surface.draw_image(raster, z_order::IMAGE));
        self.plot_mask(surface)
    }
    pub fn remove_image<S: Surface>(&mut self, surface: &mut S) {
        if let Some(id) = self.slots.image.take() {
            surface.remove(id);
        }
        self.remove_mask(surface);
    }

    /// Sets the intensity ceiling and updates the color limits of the image,
    /// the overlays are left untouched
    ///
    /// A relative ceiling is the fraction of the image maximum, an absolute
    /// ceiling is divided by the image maximum.
    pub fn set_intensity_ceiling<S: Surface>(
        &mut self,
        surface: &mut S,
        value: f64,
        relative: bool,
    ) -> Result<()> {
        let image = self.slots.image.ok_or(RenderError::NoImagePlotted)?;
        let field = self.field.as_ref().ok_or(RenderError::NoImagePlotted)?;
        self.state.ceiling = if relative {
            value
        } else if field.max > 0f64 {
            value / field.max
        } else {
            1f64
        };
        let display = display_field(field, self.state.ceiling, self.state.logarithmic);
        surface.set_color_limits(image, display.color_min, display.color_max);
        self.plot_mask(surface)?;
        if self.has_colorbar() {
            self.plot_colorbar(surface)?;
        }
        Ok(())
    }

    /// Sets the mask threshold and redraws the mask over the image
    ///
    /// Pixels at or below the threshold times the color maximum are
    /// transparent, the others are drawn above every other layer.
    pub fn apply_mask<S: Surface>(&mut self, surface: &mut S, threshold: Option<f64>) -> Result<()> {
        self.state.mask = threshold;
        if self.image_plotted() {
            self.plot_mask(surface)
        } else {
            Ok(())
        }
    }
    fn plot_mask<S: Surface>(&mut self, surface: &mut S) -> Result<()> {
        self.remove_mask(surface);
        let (Some(threshold), Some(field)) = (self.state.mask, self.field.as_ref()) else {
            return Ok(());
        };
        let display = display_field(field, self.state.ceiling, self.state.logarithmic);
        let raster = Raster {
            visible: Some(mask(
                field,
                self.state.ceiling,
                self.state.logarithmic,
                threshold,
            )),
            grid: display.grid,
            colormap: self.colormap()?.clone(),
            color_min: display.color_min,
            color_max: display.color_max,
            extent: self.extent(),
        };
        self.slots.mask = Some(surface.draw_image(raster, z_order::MASK));
        Ok(())
    }
    fn remove_mask<S: Surface>(&mut self, surface: &mut S) {
        if let Some(id) = self.slots.mask.take() {
            surface.remove(id);
        }
    }

    /// Enables or disables an overlay
    ///
    /// Enabling an overlay without its geometry fails and leaves the state
    /// unchanged.
    pub fn toggle_overlay<S: Surface>(
        &mut self,
        surface: &mut S,
        overlay: Overlay,
        on: bool,
    ) -> Result<()> {
        if on {
            self.plot_overlay(surface, overlay)?;
        } else {
            self.remove_overlay(surface, overlay);
        }
        self.state.set_overlay(overlay, on);
        Ok(())
    }
    /// Draws an overlay, replacing the one already drawn
    pub fn plot_overlay<S: Surface>(&mut self, surface: &mut S, overlay: Overlay) -> Result<()> {
        let polylines = self.overlay_polylines(overlay)?;
        self.remove_overlay(surface, overlay);
        log::debug!("{} overlay: {} polylines", overlay, polylines.len());
        self.slots.overlays[overlay.index()] =
            Some(surface.draw_polyline(polylines, overlay.style(), z_order::OVERLAY));
        Ok(())
    }
    /// Removes an overlay, doing nothing if it is not drawn
    pub fn remove_overlay<S: Surface>(&mut self, surface: &mut S, overlay: Overlay) {
        if let Some(id) = self.slots.overlays[overlay.index()].take() {
            surface.remove(id);
        }
    }
    /// Removes every overlay
    pub fn remove_overlays<S: Surface>(&mut self, surface: &mut S) {
        Overlay::iter().for_each(|overlay| self.remove_overlay(surface, overlay));
    }

    fn overlay_polylines(&self, overlay: Overlay) -> Result<Vec<Polyline>> {
        let record = self.record_or_err()?;
        let wall = || record.get_wall().filter(|w| !w.is_empty());
        let separatrix = || record.get_separatrix().filter(|s| !s.is_empty());
        let camera = record.get_camera().ok_or(RenderError::NoCamera)?;
        let projector = Projector::new(camera).limits(self.state.limits);
        let topview = || {
            wall()
                .or_else(separatrix)
                .and_then(|section| Topview::new(camera.extent(), section.r_max()))
                .ok_or(RenderError::MissingGeometry(overlay))
        };
        let polylines = match overlay {
            Overlay::WallCrossSection => vec![projector.orthogonal(require(wall(), overlay)?)],
            Overlay::Separatrix => vec![projector.orthogonal(require(separatrix(), overlay)?)],
            Overlay::FluxSurfaces => {
                let flux = record
                    .get_flux_surfaces()
                    .filter(|f| !f.is_empty())
                    .ok_or(RenderError::MissingGeometry(overlay))?;
                flux.iter()
                    .map(|surface| projector.orthogonal(&surface.section))
                    .collect()
            }
            Overlay::WallSweep => projector.sweep(require(wall(), overlay)?, &self.state.sweep),
            Overlay::Topview => {
                let wall = require(wall(), overlay)?;
                let frame = topview()?;
                vec![frame.circle(wall.r_min()), frame.circle(wall.r_max())]
            }
            Overlay::TopviewSeparatrix => {
                let separatrix = require(separatrix(), overlay)?;
                let frame = topview()?;
                vec![
                    frame.circle(separatrix.r_min()),
                    frame.circle(separatrix.r_max()),
                ]
            }
            Overlay::TopviewOrthogonalCrossSection => {
                let wall = require(wall(), overlay)?;
                let frame = topview()?;
                vec![frame.radial_segment(wall.r_min(), wall.r_max(), camera.facing())]
            }
            Overlay::DetectorNormal => {
                let frame = topview()?;
                vec![frame.arrow(camera.position(), camera.direction(), frame.reference())]
            }
        };
        Ok(polylines)
    }

    /// Redraws the captions, removing the previous ones
    pub fn plot_captions<S: Surface>(&mut self, surface: &mut S) {
        self.remove_captions(surface);
        self.slots.captions = self
            .state
            .captions
            .iter()
            .map(|caption| {
                surface.draw_text(
                    Text {
                        x: caption.x,
                        y: caption.y,
                        size: caption.fontsize,
                        text: caption.text.clone(),
                        color: Rgba::white(),
                        alignment: Alignment::Left,
                    },
                    z_order::CAPTION,
                )
            })
            .collect();
    }
    pub fn remove_captions<S: Surface>(&mut self, surface: &mut S) {
        self.slots.captions.drain(..).for_each(|id| {
            surface.remove(id);
        });
    }

    /// Draws the colorbar of the displayed image, replacing the previous one
    ///
    /// A relative colorbar is labelled in percent of the intensity ceiling.
    pub fn plot_colorbar<S: Surface>(&mut self, surface: &mut S) -> Result<()> {
        self.slots.image.ok_or(RenderError::NoImagePlotted)?;
        let display = self
            .display_field()?
            .ok_or(RenderError::NoImagePlotted)?;
        let colormap = self.colormap()?.clone();
        let colorbar = if self.state.relative_colorbar {
            Colorbar::relative(
                colormap,
                display.color_min,
                display.color_max,
                self.state.logarithmic,
            )
        } else {
            Colorbar::native(colormap, display.color_min, display.color_max)
        };
        self.remove_colorbar(surface);
        self.slots.colorbar = Some(surface.add_colorbar(colorbar, z_order::COLORBAR));
        Ok(())
    }
    pub fn remove_colorbar<S: Surface>(&mut self, surface: &mut S) {
        if let Some(id) = self.slots.colorbar.take() {
            surface.remove(id);
        }
    }

    /// Linear color maximum of the displayed image
    pub fn intensity_ceiling(&self) -> Option<f64> {
        self.field
            .as_ref()
            .map(|f| linear_ceiling(f, self.state.ceiling))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        loader::Format,
        render::{Layer, Scene},
    };
    use nalgebra::DMatrix;
    use std::f64::consts::PI;

    fn wall() -> Section {
        Section::new(
            (0..=64)
                .map(|i| {
                    let t = 2. * PI * i as f64 / 64.;
                    [1.0 + 0.3 * t.cos(), 0.5 * t.sin()]
                })
                .collect(),
        )
    }

    fn loaded(record: ImageRecord) -> Assembler {
        let mut assembler = Assembler::default();
        let report = LoadReport::new(Format::Mat, &record);
        assembler.load(record, report);
        assembler
    }

    fn record() -> ImageRecord {
        let camera = Camera::new([0.0, -3.0, 0.0], [0.0, 1.0, 0.0], 0.5).unwrap();
        ImageRecord::intensity(DMatrix::from_fn(4, 4, |i, j| (4 * i + j) as f64 * 100. / 15.))
            .camera(camera)
            .wall(wall())
    }

    #[test]
    fn phases() {
        let mut scene = Scene::default();
        let mut assembler = Assembler::default();
        assert_eq!(assembler.phase(), Phase::Empty);
        assert!(matches!(
            assembler.assemble(&mut scene),
            Err(RenderError::NoRecord)
        ));
        let mut assembler = loaded(record());
        assert_eq!(assembler.phase(), Phase::Loaded);
        assembler.assemble(&mut scene).unwrap();
        assert_eq!(assembler.phase(), Phase::Rendered);
        assert!(scene.image().is_some());
    }

    #[test]
    fn overlay_toggle_is_idempotent() {
        let mut scene = Scene::default();
        let mut assembler = loaded(record());
        assembler.assemble(&mut scene).unwrap();
        let n = scene.len();
        assembler.remove_overlay(&mut scene, Overlay::WallCrossSection);
        for _ in 0..2 {
            assembler
                .toggle_overlay(&mut scene, Overlay::WallCrossSection, true)
                .unwrap();
        }
        assert!(assembler.has_overlay(Overlay::WallCrossSection));
        assert_eq!(scene.len(), n + 1);
        for _ in 0..2 {
            assembler
                .toggle_overlay(&mut scene, Overlay::WallCrossSection, false)
                .unwrap();
        }
        assert!(!assembler.has_overlay(Overlay::WallCrossSection));
        assert!(!assembler.state().is_enabled(Overlay::WallCrossSection));
        assert_eq!(scene.len(), n);
    }

    #[test]
    fn overlay_without_geometry() {
        let mut scene = Scene::default();
        let mut assembler = loaded(record());
        assert!(matches!(
            assembler.toggle_overlay(&mut scene, Overlay::Separatrix, true),
            Err(RenderError::MissingGeometry(Overlay::Separatrix))
        ));
        assert!(!assembler.state().is_enabled(Overlay::Separatrix));
        assert!(matches!(
            assembler.toggle_overlay(&mut scene, Overlay::FluxSurfaces, true),
            Err(RenderError::MissingGeometry(Overlay::FluxSurfaces))
        ));
        let mut assembler = loaded(ImageRecord::intensity(DMatrix::zeros(2, 2)));
        assert!(matches!(
            assembler.toggle_overlay(&mut scene, Overlay::WallCrossSection, true),
            Err(RenderError::NoCamera)
        ));
    }

    #[test]
    fn assemble_skips_missing_geometry() {
        let mut scene = Scene::default();
        let mut assembler = Assembler::new(
            RenderState::default()
                .overlay(Overlay::WallCrossSection)
                .overlay(Overlay::Separatrix)
                .overlay(Overlay::Topview)
                .overlay(Overlay::DetectorNormal),
        );
        let record = record();
        let report = LoadReport::new(Format::Mat, &record);
        assembler.load(record, report);
        assembler.assemble(&mut scene).unwrap();
        assert!(assembler.has_overlay(Overlay::WallCrossSection));
        assert!(assembler.has_overlay(Overlay::Topview));
        assert!(assembler.has_overlay(Overlay::DetectorNormal));
        assert!(!assembler.has_overlay(Overlay::Separatrix));
    }

    #[test]
    fn relative_colorbar_at_half_ceiling() {
        let mut scene = Scene::default();
        let mut assembler = loaded(record());
        assembler.set_colorbar(true, true);
        assembler.assemble(&mut scene).unwrap();
        assembler
            .set_intensity_ceiling(&mut scene, 50.0, false)
            .unwrap();
        let colorbar = scene.colorbar().unwrap();
        let values: Vec<_> = colorbar.ticks.iter().map(|t| t.value).collect();
        assert_eq!(values, vec![0.0, 10.0, 20.0, 30.0, 40.0, 50.0]);
        let labels: Vec<_> = colorbar.ticks.iter().map(|t| t.label.as_str()).collect();
        assert_eq!(labels, vec!["0%", "20%", "40%", "60%", "80%", "100%"]);
        assert_eq!(scene.image().unwrap().color_max, 50.0);
        assert_eq!(scene.len(), 2);
    }

    #[test]
    fn overlays_survive_a_ceiling_change() {
        let mut scene = Scene::default();
        let mut assembler = loaded(record());
        assembler.set_captions(vec![Caption::new(0.0, 0.0, 12.0, "ITER")]);
        assembler.assemble(&mut scene).unwrap();
        assembler
            .toggle_overlay(&mut scene, Overlay::WallCrossSection, true)
            .unwrap();
        let overlay = |scene: &Scene| {
            scene
                .layers()
                .filter_map(|layer| match layer {
                    Layer::Polylines { polylines, .. } => Some(polylines.clone()),
                    _ => None,
                })
                .collect::<Vec<_>>()
        };
        let before = overlay(&scene);
        let n = scene.len();
        assembler
            .set_intensity_ceiling(&mut scene, 0.25, true)
            .unwrap();
        assert_eq!(scene.len(), n);
        assert_eq!(overlay(&scene), before);
        assert_eq!(scene.texts().count(), 1);
        assert!(assembler.has_overlay(Overlay::WallCrossSection));
        assert_eq!(scene.image().unwrap().color_max, 25.0);
    }

    #[test]
    fn relative_ceiling() {
        let mut scene = Scene::default();
        let mut assembler = loaded(record());
        assembler.set_colorbar(true, true);
        assembler.assemble(&mut scene).unwrap();
        assembler
            .set_intensity_ceiling(&mut scene, 0.5, true)
            .unwrap();
        assert_eq!(assembler.state().ceiling, 0.5);
        assert_eq!(assembler.intensity_ceiling(), Some(50.0));
        let image = scene.image().unwrap();
        assert_eq!((image.color_min, image.color_max), (0.0, 50.0));
        let colorbar = scene.colorbar().unwrap();
        let values: Vec<_> = colorbar.ticks.iter().map(|t| t.value).collect();
        assert_eq!(values, vec![0.0, 10.0, 20.0, 30.0, 40.0, 50.0]);
    }

    #[test]
    fn refresh_image_keeps_the_overlays() {
        let mut scene = Scene::default();
        let mut assembler = loaded(record());
        assembler.set_colorbar(true, false);
        assembler.apply_mask(&mut scene, Some(0.5)).unwrap();
        assembler.assemble(&mut scene).unwrap();
        assembler
            .toggle_overlay(&mut scene, Overlay::WallCrossSection, true)
            .unwrap();
        let n = scene.len();
        assembler.set_logarithmic(true);
        assembler.refresh_image(&mut scene).unwrap();
        assert_eq!(scene.len(), n);
        assert!(assembler.has_overlay(Overlay::WallCrossSection));
        assert!(assembler.has_mask());
        let image = scene.image().unwrap();
        assert_eq!(image.color_max, 2.0);
        assert_eq!(image.color_min, -38.0);
        let colorbar = scene.colorbar().unwrap();
        assert_eq!((colorbar.min, colorbar.max), (-38.0, 2.0));
        assert!(matches!(scene.layers().last(), Some(Layer::Image(r)) if r.visible.is_some()));
    }

    #[test]
    fn limits_apply_to_every_cross_section() {
        let mut scene = Scene::default();
        let separatrix = Section::new(
            (0..=64)
                .map(|i| {
                    let t = 2. * PI * i as f64 / 64.;
                    [1.0 + 0.2 * t.cos(), 0.4 * t.sin()]
                })
                .collect(),
        );
        let flux: crate::geometry::FluxSurfaceSet =
            std::iter::once(crate::geometry::FluxSurface {
                label: None,
                section: separatrix.clone(),
            })
            .collect();
        let mut assembler = loaded(record().separatrix(separatrix).flux_surfaces(flux));
        assembler.set_limits(SectionLimits {
            z_max: Some(0.0),
            ..Default::default()
        });
        for overlay in [Overlay::Separatrix, Overlay::FluxSurfaces] {
            let polylines = assembler.overlay_polylines(overlay).unwrap();
            assert_eq!(polylines.len(), 1);
            assert!(polylines[0].breaks() > 0, "{} ignores the limits", overlay);
            assert!(!polylines[0].is_closed(1e-9));
        }
        assembler
            .toggle_overlay(&mut scene, Overlay::Separatrix, true)
            .unwrap();
    }

    #[test]
    fn intensity_before_plot() {
        let mut scene = Scene::default();
        let mut assembler = loaded(record());
        assert!(matches!(
            assembler.set_intensity_ceiling(&mut scene, 0.5, true),
            Err(RenderError::NoImagePlotted)
        ));
        assert!(matches!(
            assembler.plot_colorbar(&mut scene),
            Err(RenderError::NoImagePlotted)
        ));
    }

    #[test]
    fn captions_do_not_accumulate() {
        let mut scene = Scene::default();
        let mut assembler = loaded(record());
        assembler.set_captions(vec![
            Caption::new(0.0, 0.0, 12.0, "a"),
            Caption::new(0.1, 0.1, 12.0, "b"),
        ]);
        assembler.plot_captions(&mut scene);
        assembler.plot_captions(&mut scene);
        assert_eq!(scene.texts().count(), 2);
        assembler.set_captions(vec![Caption::new(0.0, 0.0, 8.0, "c")]);
        assembler.plot_captions(&mut scene);
        let texts: Vec<_> = scene.texts().map(|t| t.text.as_str()).collect();
        assert_eq!(texts, vec!["c"]);
    }

    #[test]
    fn mask_on_top() {
        let mut scene = Scene::default();
        let mut assembler = loaded(record());
        assembler.assemble(&mut scene).unwrap();
        assembler
            .toggle_overlay(&mut scene, Overlay::WallCrossSection, true)
            .unwrap();
        assembler.apply_mask(&mut scene, Some(0.5)).unwrap();
        assert!(assembler.has_mask());
        match scene.layers().last() {
            Some(Layer::Image(raster)) => {
                let visible = raster.visible.as_ref().unwrap();
                assert!(!visible[(0, 0)] && visible[(3, 3)]);
            }
            _ => panic!("the mask is not the top layer"),
        }
        assembler.apply_mask(&mut scene, None).unwrap();
        assert!(!assembler.has_mask());
    }

    #[test]
    fn unknown_colormap() {
        let mut assembler = Assembler::default();
        assert!(assembler.set_colormap("parula", false).is_err());
        assert_eq!(assembler.state().colormap, "GeriMap");
        assembler.set_colormap("afmhot", true).unwrap();
        assert!(assembler.state().inverted);
    }

    #[test]
    fn polarimetric_quantity() {
        let mut scene = Scene::default();
        let g = |x| DMatrix::from_element(3, 3, x);
        let record = ImageRecord::polarimetric(
            crate::stokes::StokesChannels::new(g(2.0), g(0.0), g(0.0), g(0.0)).unwrap(),
        );
        let mut assembler = loaded(record);
        assembler.set_quantity(Quantity::LinPolFrac);
        let display = assembler.display_field().unwrap().unwrap();
        assert!(display.grid.iter().all(|&x| x == 0.0));
        assert_eq!((display.color_min, display.color_max), (0.0, 1.0));
        assembler.set_quantity(Quantity::NotApplicable);
        assembler.assemble(&mut scene).unwrap();
        assert!(scene.image().is_none());
    }
}
