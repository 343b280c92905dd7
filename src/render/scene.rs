use nalgebra::DMatrix;
use strum_macros::{Display, EnumString};

use super::{Colorbar, LineStyle};
use crate::{
    colormap::{Colormap, Rgba},
    projection::{Extent, Polyline},
};

/// Layer stacking order, higher layers are drawn last
pub mod z_order {
    pub const IMAGE: i32 = 0;
    pub const OVERLAY: i32 = 10;
    pub const CAPTION: i32 = 20;
    pub const COLORBAR: i32 = 30;
    pub const MASK: i32 = 40;
}

/// Handle to a layer drawn on a [Surface]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LayerId(u64);

/// Color mapped image
#[derive(Debug, Clone, PartialEq)]
pub struct Raster {
    /// Grid with its origin at the lower-left corner
    pub grid: DMatrix<f64>,
    pub colormap: Colormap,
    pub color_min: f64,
    pub color_max: f64,
    pub extent: Extent,
    /// Visible pixels, all pixels are visible if `None`
    pub visible: Option<DMatrix<bool>>,
}
impl Raster {
    /// Color of the pixel `(row,column)`
    ///
    /// With a visibility mask, hidden pixels are transparent and visible
    /// pixels opaque.
    pub fn color(&self, row: usize, column: usize) -> Rgba {
        let color = self
            .colormap
            .map(self.grid[(row, column)], self.color_min, self.color_max);
        match &self.visible {
            Some(visible) if visible[(row, column)] => Rgba { a: 1f64, ..color },
            Some(_) => Rgba::transparent(),
            None => color,
        }
    }
}

/// Horizontal alignment of a text on its anchor
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Display, EnumString)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum Alignment {
    #[default]
    Left,
    Center,
    Right,
}

/// Text annotation
#[derive(Debug, Clone, PartialEq)]
pub struct Text {
    pub x: f64,
    pub y: f64,
    /// Font size [pt]
    pub size: f64,
    pub text: String,
    pub color: Rgba,
    pub alignment: Alignment,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Layer {
    Image(Raster),
    Polylines {
        polylines: Vec<Polyline>,
        style: LineStyle,
    },
    Text(Text),
    Colorbar(Colorbar),
}

/// Drawing surface
pub trait Surface {
    fn draw_image(&mut self, raster: Raster, z: i32) -> LayerId;
    fn draw_polyline(&mut self, polylines: Vec<Polyline>, style: LineStyle, z: i32) -> LayerId;
    fn draw_text(&mut self, text: Text, z: i32) -> LayerId;
    fn add_colorbar(&mut self, colorbar: Colorbar, z: i32) -> LayerId;
    /// Changes the color limits of an image layer
    ///
    /// Returns false if there is no such image layer.
    fn set_color_limits(&mut self, id: LayerId, min: f64, max: f64) -> bool;
    /// Removes a layer, returns false if there is no such layer
    fn remove(&mut self, id: LayerId) -> bool;
    fn clear(&mut self);
}

/// In-memory display list
#[derive(Debug, Clone, Default)]
pub struct Scene {
    background: Option<Rgba>,
    layers: Vec<(LayerId, i32, Layer)>,
    next_id: u64,
}
impl Scene {
    pub fn new(background: Rgba) -> Self {
        Self {
            background: Some(background),
            ..Default::default()
        }
    }
    pub fn background(&self) -> Rgba {
        self.background.unwrap_or_else(Rgba::black)
    }
    pub fn set_background(&mut self, background: Rgba) {
        self.background = Some(background);
    }
    pub fn len(&self) -> usize {
        self.layers.len()
    }
    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }
    pub fn get(&self, id: LayerId) -> Option<&Layer> {
        self.layers
            .iter()
            .find(|(layer_id, ..)| *layer_id == id)
            .map(|(.., layer)| layer)
    }
    pub fn contains(&self, id: LayerId) -> bool {
        self.get(id).is_some()
    }
    /// Layers in drawing order: increasing z, then insertion order
    pub fn layers(&self) -> impl Iterator<Item = &Layer> {
        let mut layers: Vec<_> = self.layers.iter().collect();
        layers.sort_by_key(|(_, z, _)| *z);
        layers.into_iter().map(|(.., layer)| layer)
    }
    /// The bottom image layer
    pub fn image(&self) -> Option<&Raster> {
        self.layers().find_map(|layer| match layer {
            Layer::Image(raster) => Some(raster),
            _ => None,
        })
    }
    pub fn texts(&self) -> impl Iterator<Item = &Text> {
        self.layers().filter_map(|layer| match layer {
            Layer::Text(text) => Some(text),
            _ => None,
        })
    }
    pub fn colorbar(&self) -> Option<&Colorbar> {
        self.layers().find_map(|layer| match layer {
            Layer::Colorbar(colorbar) => Some(colorbar),
            _ => None,
        })
    }
    fn push(&mut self, layer: Layer, z: i32) -> LayerId {
        let id = LayerId(self.next_id);
        self.next_id += 1;
        self.layers.push((id, z, layer));
        id
    }
}
impl Surface for Scene {
    fn draw_image(&mut self, raster: Raster, z: i32) -> LayerId {
        self.push(Layer::Image(raster), z)
    }
    fn draw_polyline(&mut self, polylines: Vec<Polyline>, style: LineStyle, z: i32) -> LayerId {
        self.push(Layer::Polylines { polylines, style }, z)
    }
    fn draw_text(&mut self, text: Text, z: i32) -> LayerId {
        self.push(Layer::Text(text), z)
    }
    fn add_colorbar(&mut self, colorbar: Colorbar, z: i32) -> LayerId {
        self.push(Layer::Colorbar(colorbar), z)
    }
    fn set_color_limits(&mut self, id: LayerId, min: f64, max: f64) -> bool {
        match self.layers.iter_mut().find(|(layer_id, ..)| *layer_id == id) {
            Some((.., Layer::Image(raster))) => {
                raster.color_min = min;
                raster.color_max = max;
                true
            }
            _ => false,
        }
    }
    fn remove(&mut self, id: LayerId) -> bool {
        let n = self.layers.len();
        self.layers.retain(|(layer_id, ..)| *layer_id != id);
        self.layers.len() < n
    }
    fn clear(&mut self) {
        self.layers.clear();
    }
}
