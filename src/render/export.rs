//! Scene rasterization with plotters
//!
//! PNG files are written with the bitmap backend and SVG files with the SVG
//! backend. The image fills the drawing area without margin, the colorbar,
//! if any, is appended on the right. A multi-panel view is drawn as a grid
//! of bordered panels above a horizontal colorbar.

use std::path::Path;

use plotters::{
    coord::{types::RangedCoordf64, Shift},
    prelude::*,
    style::text_anchor::{HPos, Pos, VPos},
};

use super::{Alignment, Colorbar, Layer, PanelScene, Raster, Scene};
use crate::{colormap::Rgba, projection::Extent};

#[derive(thiserror::Error, Debug)]
pub enum ExportError {
    #[error("cannot export to {0:?}, expected a png or svg file")]
    UnsupportedFormat(String),
    #[error("drawing failed: {0}")]
    Drawing(String),
}
type Result<T> = std::result::Result<T, ExportError>;

/// Output size
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ExportOptions {
    /// Dots per inch
    pub dpi: f64,
    /// Image width [inch]
    pub size: f64,
}
impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            dpi: 100f64,
            size: 6f64,
        }
    }
}
impl ExportOptions {
    /// Image width in pixels
    pub fn image_pixels(&self) -> u32 {
        (self.size * self.dpi).round().max(1f64) as u32
    }
    /// Image width and height in pixels
    ///
    /// The height follows the aspect ratio of the image grid, a scene
    /// without image is square.
    pub fn image_size(&self, scene: &Scene) -> (u32, u32) {
        let width = self.image_pixels();
        let height = (width as f64 * aspect_ratio(scene)).round().max(1f64) as u32;
        (width, height)
    }
    /// Colorbar strip width in pixels
    pub fn colorbar_pixels(&self) -> u32 {
        (self.image_pixels() / 6).max(1)
    }
    // points to pixels
    fn pixels(&self, points: f64) -> f64 {
        points * self.dpi / 72f64
    }
}

fn rgb(color: &Rgba) -> RGBAColor {
    let [r, g, b] = color.to_rgb8();
    RGBColor(r, g, b).mix(color.a.clamp(0f64, 1f64))
}

// lowercase file extension
fn extension(path: &Path) -> String {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .unwrap_or_default()
}

// rows per column of the image grid, 1 without image
fn aspect_ratio(scene: &Scene) -> f64 {
    match scene.image().map(|raster| raster.grid.shape()) {
        Some((n_row, n_col)) if n_row > 0 && n_col > 0 => n_row as f64 / n_col as f64,
        _ => 1f64,
    }
}

/// Writes the scene to `path`
pub fn save<P: AsRef<Path>>(scene: &Scene, path: P, options: &ExportOptions) -> Result<()> {
    let path = path.as_ref();
    let extension = extension(path);
    let (width, height) = options.image_size(scene);
    let width = if scene.colorbar().is_some() {
        width + options.colorbar_pixels()
    } else {
        width
    };
    let drawing = |e: String| ExportError::Drawing(e);
    match extension.as_str() {
        "png" => {
            let root = BitMapBackend::new(path, (width, height)).into_drawing_area();
            draw(&root, scene, options).map_err(|e| drawing(e.to_string()))?;
        }
        "svg" => {
            let root = SVGBackend::new(path, (width, height)).into_drawing_area();
            draw(&root, scene, options).map_err(|e| drawing(e.to_string()))?;
        }
        _ => return Err(ExportError::UnsupportedFormat(extension)),
    }
    log::info!("scene saved to {:?}", path);
    Ok(())
}

/// Writes the panels to `path`
///
/// The panels share the image width evenly, the colorbar strip, if any,
/// runs below the grid.
pub fn save_panels<P: AsRef<Path>>(
    panels: &PanelScene,
    path: P,
    options: &ExportOptions,
) -> Result<()> {
    let path = path.as_ref();
    let extension = extension(path);
    let (rows, cols) = (panels.rows().max(1) as u32, panels.cols().max(1) as u32);
    let panel_width = (options.image_pixels() / cols).max(1);
    let aspect = panels
        .panels()
        .iter()
        .find(|panel| panel.image().is_some())
        .map_or(1f64, aspect_ratio);
    let panel_height = (panel_width as f64 * aspect).round().max(1f64) as u32;
    let grid_height = panel_height * rows;
    let width = panel_width * cols;
    let height = if panels.colorbar().is_some() {
        grid_height + options.colorbar_pixels()
    } else {
        grid_height
    };
    let drawing = |e: String| ExportError::Drawing(e);
    match extension.as_str() {
        "png" => {
            let root = BitMapBackend::new(path, (width, height)).into_drawing_area();
            draw_panels(&root, panels, options, grid_height)
                .map_err(|e| drawing(e.to_string()))?;
        }
        "svg" => {
            let root = SVGBackend::new(path, (width, height)).into_drawing_area();
            draw_panels(&root, panels, options, grid_height)
                .map_err(|e| drawing(e.to_string()))?;
        }
        _ => return Err(ExportError::UnsupportedFormat(extension)),
    }
    log::info!(
        "{}×{} panels saved to {:?}",
        panels.rows(),
        panels.cols(),
        path
    );
    Ok(())
}

type DrawResult<DB> =
    std::result::Result<(), DrawingAreaErrorKind<<DB as DrawingBackend>::ErrorType>>;

#[derive(Debug, Clone, Copy, PartialEq)]
enum Orientation {
    Vertical,
    Horizontal,
}

fn draw<DB: DrawingBackend>(
    root: &DrawingArea<DB, Shift>,
    scene: &Scene,
    options: &ExportOptions,
) -> DrawResult<DB> {
    root.fill(&rgb(&scene.background()))?;
    let (image_area, colorbar_area) = root.split_horizontally(options.image_pixels());
    draw_layers(&image_area, scene, options)?;
    if let Some(colorbar) = scene.colorbar() {
        draw_colorbar(&colorbar_area, colorbar, options, Orientation::Vertical)?;
    }
    root.present()?;
    Ok(())
}

fn draw_panels<DB: DrawingBackend>(
    root: &DrawingArea<DB, Shift>,
    panels: &PanelScene,
    options: &ExportOptions,
    grid_height: u32,
) -> DrawResult<DB> {
    let background = panels
        .panels()
        .first()
        .map_or_else(Rgba::black, Scene::background);
    root.fill(&rgb(&background))?;
    let (grid_area, colorbar_area) = root.split_vertically(grid_height);
    let border = rgb(&Rgba::white());
    let areas = grid_area.split_evenly((panels.rows(), panels.cols()));
    for (area, panel) in areas.iter().zip(panels.panels()) {
        draw_layers(area, panel, options)?;
        let (w, h) = area.dim_in_pixel();
        area.draw(&Rectangle::new(
            [(0, 0), (w as i32 - 1, h as i32 - 1)],
            border.stroke_width(1),
        ))?;
    }
    if let Some(colorbar) = panels.colorbar() {
        draw_colorbar(&colorbar_area, colorbar, options, Orientation::Horizontal)?;
    }
    root.present()?;
    Ok(())
}

// every layer but the colorbar, drawn by the caller in its own area
fn draw_layers<DB: DrawingBackend>(
    area: &DrawingArea<DB, Shift>,
    scene: &Scene,
    options: &ExportOptions,
) -> DrawResult<DB> {
    let [x_min, x_max, y_min, y_max] = scene
        .image()
        .map(|raster| raster.extent)
        .unwrap_or_else(Extent::default)
        .bounds();
    let mut chart = ChartBuilder::on(area)
        .margin(0)
        .build_cartesian_2d(x_min..x_max, y_min..y_max)?;
    for layer in scene.layers() {
        match layer {
            Layer::Image(raster) => draw_raster(&mut chart, raster)?,
            Layer::Polylines { polylines, style } => {
                let width = options.pixels(style.width).round().max(1f64) as u32;
                let color = rgb(&style.color);
                for polyline in polylines {
                    for segment in polyline.segments() {
                        chart.draw_series(LineSeries::new(
                            segment.into_iter().map(|p| (p[0], p[1])),
                            color.stroke_width(width),
                        ))?;
                    }
                }
            }
            Layer::Text(text) => {
                let hpos = match text.alignment {
                    Alignment::Left => HPos::Left,
                    Alignment::Center => HPos::Center,
                    Alignment::Right => HPos::Right,
                };
                let font = ("sans-serif", options.pixels(text.size))
                    .into_font()
                    .color(&rgb(&text.color))
                    .pos(Pos::new(hpos, VPos::Top));
                chart.draw_series(std::iter::once(Text::new(
                    text.text.clone(),
                    (text.x, text.y),
                    font,
                )))?;
            }
            Layer::Colorbar(_) => (),
        }
    }
    Ok(())
}

fn draw_raster<DB: DrawingBackend>(
    chart: &mut ChartContext<DB, Cartesian2d<RangedCoordf64, RangedCoordf64>>,
    raster: &Raster,
) -> DrawResult<DB> {
    let (n_row, n_col) = raster.grid.shape();
    if n_row == 0 || n_col == 0 {
        return Ok(());
    }
    let [x_min, x_max, y_min, y_max] = raster.extent.bounds();
    let dx = (x_max - x_min) / n_col as f64;
    let dy = (y_max - y_min) / n_row as f64;
    let cells = (0..n_row).flat_map(|i| (0..n_col).map(move |j| (i, j)));
    chart.draw_series(cells.filter_map(|(i, j)| {
        let color = raster.color(i, j);
        (color.a > 0f64).then(|| {
            let (x, y) = (x_min + j as f64 * dx, y_min + i as f64 * dy);
            Rectangle::new([(x, y), (x + dx, y + dy)], rgb(&color).filled())
        })
    }))?;
    Ok(())
}

fn draw_colorbar<DB: DrawingBackend>(
    area: &DrawingArea<DB, Shift>,
    colorbar: &Colorbar,
    options: &ExportOptions,
    orientation: Orientation,
) -> DrawResult<DB> {
    let span = colorbar.max - colorbar.min;
    if !(span > 0f64) {
        return Ok(());
    }
    let values = colorbar.min..colorbar.max;
    let mut builder = ChartBuilder::on(area);
    let (x_range, y_range) = match orientation {
        Orientation::Vertical => {
            builder.margin_top(10).margin_bottom(10);
            (0f64..1f64, values)
        }
        Orientation::Horizontal => {
            builder.margin_left(10).margin_right(10);
            (values, 0f64..1f64)
        }
    };
    let mut chart = builder.build_cartesian_2d(x_range, y_range)?;
    // (value, offset across the bar) to chart coordinates
    let point = |value: f64, offset: f64| match orientation {
        Orientation::Vertical => (offset, value),
        Orientation::Horizontal => (value, 1f64 - offset),
    };
    let lut = colorbar.colormap.lut();
    let n = lut.len() as f64;
    chart.draw_series(lut.iter().enumerate().map(|(k, color)| {
        let v0 = colorbar.min + span * k as f64 / n;
        let v1 = colorbar.min + span * (k + 1) as f64 / n;
        Rectangle::new([point(v0, 0.05), point(v1, 0.4)], rgb(color).filled())
    }))?;
    let white = rgb(&Rgba::white());
    let pos = match orientation {
        Orientation::Vertical => Pos::new(HPos::Left, VPos::Center),
        Orientation::Horizontal => Pos::new(HPos::Center, VPos::Top),
    };
    let font = ("sans-serif", options.pixels(10f64))
        .into_font()
        .color(&white)
        .pos(pos);
    for tick in &colorbar.ticks {
        chart.draw_series(std::iter::once(PathElement::new(
            vec![point(tick.value, 0.4), point(tick.value, 0.5)],
            white.stroke_width(1),
        )))?;
        chart.draw_series(std::iter::once(Text::new(
            tick.label.clone(),
            point(tick.value, 0.55),
            font.clone(),
        )))?;
    }
    Ok(())
}
