//! Multi-panel view
//!
//! A polarimetric record is shown as a grid of panels, one quantity per
//! panel, sharing the colormap and the color scale settings of the view.
//! A single colorbar keyed to the first panel runs below the grid.

use super::{
    display::display_field,
    scene::{z_order, Alignment, Raster, Surface, Text},
    Assembler, Colorbar, RenderError, Result, Scene,
};
use crate::{colormap::Rgba, stokes::Quantity};

/// Largest number of panel rows or columns
pub const MAX_PANELS: usize = 9;

/// Layout of the multi-panel view
#[derive(Debug, Clone, PartialEq)]
pub struct PanelGrid {
    rows: usize,
    cols: usize,
    quantities: Vec<Quantity>,
}
impl PanelGrid {
    /// Grid of `rows×cols` panels showing `quantities` in row-major order
    ///
    /// Panels past the last quantity are left empty and quantities past the
    /// last panel are ignored.
    pub fn new(rows: usize, cols: usize, quantities: Vec<Quantity>) -> Result<Self> {
        let valid = 1..=MAX_PANELS;
        if !valid.contains(&rows) || !valid.contains(&cols) {
            return Err(RenderError::PanelGrid { rows, cols });
        }
        if quantities.len() > rows * cols {
            log::warn!(
                "{} quantities for {} panels, the last {} are ignored",
                quantities.len(),
                rows * cols,
                quantities.len() - rows * cols
            );
        }
        Ok(Self {
            rows,
            cols,
            quantities,
        })
    }
    pub fn rows(&self) -> usize {
        self.rows
    }
    pub fn cols(&self) -> usize {
        self.cols
    }
    /// Number of panels
    pub fn len(&self) -> usize {
        self.rows * self.cols
    }
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
    /// Quantity of the panel `index`, [Quantity::NotApplicable] if there is none
    pub fn quantity(&self, index: usize) -> Quantity {
        self.quantities
            .get(index)
            .copied()
            .unwrap_or(Quantity::NotApplicable)
    }
}

/// Quantity name written on each panel
///
/// The position is given in fractions of the panel width and height from
/// its lower-left corner.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PanelLabel {
    pub x: f64,
    pub y: f64,
    /// Font size [pt]
    pub fontsize: f64,
    pub alignment: Alignment,
}
impl Default for PanelLabel {
    fn default() -> Self {
        Self {
            x: 0.9,
            y: 0.9,
            fontsize: 22f64,
            alignment: Alignment::Right,
        }
    }
}

/// Panels of the multi-panel view in row-major order
#[derive(Debug, Clone, Default)]
pub struct PanelScene {
    rows: usize,
    cols: usize,
    panels: Vec<Scene>,
    colorbar: Option<Colorbar>,
}
impl PanelScene {
    pub fn rows(&self) -> usize {
        self.rows
    }
    pub fn cols(&self) -> usize {
        self.cols
    }
    pub fn panels(&self) -> &[Scene] {
        &self.panels
    }
    pub fn panel(&self, row: usize, col: usize) -> Option<&Scene> {
        if row < self.rows && col < self.cols {
            self.panels.get(row * self.cols + col)
        } else {
            None
        }
    }
    /// Colorbar of the first panel
    pub fn colorbar(&self) -> Option<&Colorbar> {
        self.colorbar.as_ref()
    }
}

impl Assembler {
    /// Assembles one panel per quantity of the grid
    ///
    /// Empty panels only show the background. The panels are labelled with
    /// their quantity if a panel label is set, and the colorbar, if enabled,
    /// follows the color scale of the first panel.
    pub fn assemble_panels(&self, grid: &PanelGrid) -> Result<PanelScene> {
        let record = self.record_or_err()?;
        let state = self.state();
        let colormap = self.colormap()?;
        let extent = self.extent();
        let [x_min, x_max, y_min, y_max] = extent.bounds();
        let mut panels = Vec::with_capacity(grid.len());
        let mut colorbar = None;
        for index in 0..grid.len() {
            let quantity = grid.quantity(index);
            let mut scene = Scene::new(state.background);
            let field = match quantity {
                Quantity::NotApplicable => None,
                quantity => record.resolve(quantity),
            };
            if let Some(field) = field {
                let display = display_field(&field, state.ceiling, state.logarithmic);
                if index == 0 && state.colorbar {
                    colorbar = Some(if state.relative_colorbar {
                        Colorbar::relative(
                            colormap.clone(),
                            display.color_min,
                            display.color_max,
                            state.logarithmic,
                        )
                    } else {
                        Colorbar::native(colormap.clone(), display.color_min, display.color_max)
                    });
                }
                scene.draw_image(
                    Raster {
                        grid: display.grid,
                        colormap: colormap.clone(),
                        color_min: display.color_min,
                        color_max: display.color_max,
                        extent,
                        visible: None,
                    },
                    z_order::IMAGE,
                );
                if let Some(label) = &state.panel_label {
                    scene.draw_text(
                        Text {
                            x: x_min + label.x * (x_max - x_min),
                            y: y_min + label.y * (y_max - y_min),
                            size: label.fontsize,
                            text: quantity.to_string(),
                            color: Rgba::white(),
                            alignment: label.alignment,
                        },
                        z_order::CAPTION,
                    );
                }
            }
            panels.push(scene);
        }
        log::debug!("{}×{} panels assembled", grid.rows(), grid.cols());
        Ok(PanelScene {
            rows: grid.rows(),
            cols: grid.cols(),
            panels,
            colorbar,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        loader::{Format, ImageRecord, LoadReport},
        projection::Camera,
        stokes::StokesChannels,
    };
    use nalgebra::DMatrix;

    fn loaded() -> Assembler {
        let g = |x| DMatrix::from_element(4, 8, x);
        let camera = Camera::new([0.0, -3.0, 0.0], [0.0, 1.0, 0.0], 0.5).unwrap();
        let record = ImageRecord::polarimetric(
            StokesChannels::new(g(5.0), g(2.5), g(0.0), g(0.0)).unwrap(),
        )
        .camera(camera);
        let report = LoadReport::new(Format::Mat, &record);
        let mut assembler = Assembler::default();
        assembler.load(record, report);
        assembler
    }

    #[test]
    fn grid_size() {
        assert!(PanelGrid::new(9, 9, vec![Quantity::I]).is_ok());
        assert!(matches!(
            PanelGrid::new(10, 1, vec![]),
            Err(RenderError::PanelGrid { rows: 10, cols: 1 })
        ));
        assert!(PanelGrid::new(2, 0, vec![]).is_err());
        let grid = PanelGrid::new(2, 2, vec![Quantity::I, Quantity::PosQ]).unwrap();
        assert_eq!(grid.len(), 4);
        assert_eq!(grid.quantity(1), Quantity::PosQ);
        assert_eq!(grid.quantity(3), Quantity::NotApplicable);
    }

    #[test]
    fn panels_without_record() {
        let grid = PanelGrid::new(1, 1, vec![Quantity::I]).unwrap();
        assert!(matches!(
            Assembler::default().assemble_panels(&grid),
            Err(RenderError::NoRecord)
        ));
    }

    #[test]
    fn polarimetric_panels() {
        let mut assembler = loaded();
        assembler.set_colorbar(true, true);
        assembler.set_panel_label(Some(PanelLabel::default()));
        let grid = PanelGrid::new(
            2,
            2,
            vec![Quantity::I, Quantity::LinPolFrac, Quantity::NotApplicable],
        )
        .unwrap();
        let panels = assembler.assemble_panels(&grid).unwrap();
        assert_eq!((panels.rows(), panels.cols()), (2, 2));
        assert_eq!(panels.panels().len(), 4);

        let first = panels.panel(0, 0).unwrap();
        let image = first.image().unwrap();
        assert_eq!((image.color_min, image.color_max), (0.0, 5.0));
        let linpolfrac = panels.panel(0, 1).unwrap().image().unwrap();
        assert_eq!((linpolfrac.color_min, linpolfrac.color_max), (0.0, 1.0));
        assert!(linpolfrac.grid.iter().all(|&x| (x - 0.5).abs() < 1e-12));
        for (row, col) in [(1, 0), (1, 1)] {
            let empty = panels.panel(row, col).unwrap();
            assert!(empty.is_empty());
        }
        assert!(panels.panel(2, 0).is_none());

        let labels: Vec<_> = panels
            .panels()
            .iter()
            .flat_map(|panel| panel.texts().map(|t| t.text.clone()))
            .collect();
        assert_eq!(labels, vec!["I", "Linear polarization fraction"]);
        let label = first.texts().next().unwrap();
        let [x_min, x_max, y_min, y_max] = image.extent.bounds();
        assert!((label.x - (x_min + 0.9 * (x_max - x_min))).abs() < 1e-12);
        assert!((label.y - (y_min + 0.9 * (y_max - y_min))).abs() < 1e-12);
        assert_eq!(label.alignment, Alignment::Right);
        assert_eq!(label.size, 22.0);

        let colorbar = panels.colorbar().unwrap();
        assert_eq!((colorbar.min, colorbar.max), (0.0, 5.0));
        let ticks: Vec<_> = colorbar.ticks.iter().map(|t| t.value).collect();
        let expected = [0.0, 1.0, 2.0, 3.0, 4.0, 5.0];
        assert!(ticks
            .iter()
            .zip(expected)
            .all(|(tick, expected)| (tick - expected).abs() < 1e-12));
    }

    #[test]
    fn unlabelled_panels_without_colorbar() {
        let assembler = loaded();
        let grid = PanelGrid::new(1, 3, vec![Quantity::PosQ, Quantity::NegQ, Quantity::PolAngle])
            .unwrap();
        let panels = assembler.assemble_panels(&grid).unwrap();
        assert!(panels.colorbar().is_none());
        assert!(panels.panels().iter().all(|p| p.texts().count() == 0));
        // -Q is clipped to zero everywhere
        let neg_q = panels.panel(0, 1).unwrap().image().unwrap();
        assert!(neg_q.grid.iter().all(|&x| x == 0.0));
        assert_eq!(panels.panel(0, 0).unwrap().image().unwrap().color_max, 2.5);
    }
}
