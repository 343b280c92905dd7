use std::collections::BTreeSet;

use serde::Deserialize;
use strum_macros::{Display, EnumCount, EnumIter, EnumString};

use super::PanelLabel;
use crate::{
    colormap::{Rgba, GERIMAP_NAME},
    projection::{SectionLimits, Sweep},
    stokes::Quantity,
};

/// Geometry overlays
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Display,
    EnumIter,
    EnumString,
    EnumCount,
)]
#[strum(serialize_all = "kebab-case", ascii_case_insensitive)]
pub enum Overlay {
    /// Wall cross-section facing the camera
    #[strum(serialize = "wall")]
    WallCrossSection,
    Separatrix,
    /// Wall radial range seen from above
    Topview,
    TopviewSeparatrix,
    /// Topview of the wall cross-section facing the camera
    TopviewOrthogonalCrossSection,
    FluxSurfaces,
    /// Topview of the detector viewing direction
    DetectorNormal,
    /// Wall cross-sections swept around the torus
    WallSweep,
}
impl Overlay {
    pub(crate) fn index(self) -> usize {
        self as usize
    }
    /// Line style of the overlay
    pub fn style(self) -> LineStyle {
        use Overlay::*;
        match self {
            WallCrossSection | Topview | TopviewOrthogonalCrossSection => LineStyle {
                color: Rgba::white(),
                width: 1f64,
            },
            Separatrix | TopviewSeparatrix => LineStyle {
                color: Rgba::opaque(1f64, 0.25, 0.15),
                width: 1f64,
            },
            FluxSurfaces => LineStyle {
                color: Rgba::opaque(0.9, 0.9, 0.5),
                width: 0.5,
            },
            DetectorNormal => LineStyle {
                color: Rgba::opaque(0.3, 0.6, 1f64),
                width: 1f64,
            },
            WallSweep => LineStyle {
                color: Rgba::white(),
                width: 0.1,
            },
        }
    }
}

/// Polyline color and width [pt]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LineStyle {
    pub color: Rgba,
    pub width: f64,
}

/// Text annotation
///
/// The position is in image plane units, the same as the camera field of
/// view extent.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Caption {
    pub x: f64,
    pub y: f64,
    pub fontsize: f64,
    pub text: String,
}
impl Caption {
    pub fn new(x: f64, y: f64, fontsize: f64, text: impl Into<String>) -> Self {
        Self {
            x,
            y,
            fontsize,
            text: text.into(),
        }
    }
    /// Reads captions from a CSV file with the header `x,y,fontsize,text`
    pub fn from_csv<R: std::io::Read>(reader: R) -> Result<Vec<Self>, csv::Error> {
        csv::Reader::from_reader(reader).deserialize().collect()
    }
}

/// Intensity slider of the viewer
///
/// The slider goes from 0 to 100% of the image maximum; the bright image
/// modifier divides the range by 100.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IntensitySlider {
    pub percent: f64,
    pub bright: bool,
}
impl IntensitySlider {
    /// Ceiling as a fraction of the image maximum
    pub fn fraction(&self) -> f64 {
        let fraction = self.percent / 100f64;
        if self.bright {
            fraction / 100f64
        } else {
            fraction
        }
    }
}

/// View configuration
#[derive(Debug, Clone, PartialEq)]
pub struct RenderState {
    pub quantity: Quantity,
    pub colormap: String,
    pub inverted: bool,
    pub logarithmic: bool,
    /// Intensity ceiling as a fraction of the image maximum
    pub ceiling: f64,
    /// Mask threshold as a fraction of the color maximum
    pub mask: Option<f64>,
    pub overlays: BTreeSet<Overlay>,
    pub colorbar: bool,
    pub relative_colorbar: bool,
    pub captions: Vec<Caption>,
    /// Quantity label of the multi-panel view, hidden if `None`
    pub panel_label: Option<PanelLabel>,
    pub limits: SectionLimits,
    pub sweep: Sweep,
    pub background: Rgba,
}
impl Default for RenderState {
    fn default() -> Self {
        Self {
            quantity: Quantity::I,
            colormap: GERIMAP_NAME.to_string(),
            inverted: false,
            logarithmic: false,
            ceiling: 1f64,
            mask: None,
            overlays: BTreeSet::new(),
            colorbar: false,
            relative_colorbar: true,
            captions: Vec::new(),
            panel_label: None,
            limits: SectionLimits::default(),
            sweep: Sweep::default(),
            background: Rgba::black(),
        }
    }
}
impl RenderState {
    pub fn quantity(self, quantity: Quantity) -> Self {
        Self { quantity, ..self }
    }
    pub fn colormap(self, name: impl Into<String>, inverted: bool) -> Self {
        Self {
            colormap: name.into(),
            inverted,
            ..self
        }
    }
    pub fn logarithmic(self, logarithmic: bool) -> Self {
        Self {
            logarithmic,
            ..self
        }
    }
    pub fn ceiling(self, ceiling: f64) -> Self {
        Self { ceiling, ..self }
    }
    pub fn mask(self, mask: Option<f64>) -> Self {
        Self { mask, ..self }
    }
    pub fn overlay(mut self, overlay: Overlay) -> Self {
        self.overlays.insert(overlay);
        self
    }
    pub fn colorbar(self, colorbar: bool, relative: bool) -> Self {
        Self {
            colorbar,
            relative_colorbar: relative,
            ..self
        }
    }
    pub fn captions(self, captions: Vec<Caption>) -> Self {
        Self { captions, ..self }
    }
    pub fn panel_label(self, panel_label: Option<PanelLabel>) -> Self {
        Self {
            panel_label,
            ..self
        }
    }
    pub fn limits(self, limits: SectionLimits) -> Self {
        Self { limits, ..self }
    }
    pub fn sweep(self, sweep: Sweep) -> Self {
        Self { sweep, ..self }
    }
    pub fn background(self, background: Rgba) -> Self {
        Self { background, ..self }
    }
    pub fn is_enabled(&self, overlay: Overlay) -> bool {
        self.overlays.contains(&overlay)
    }
    pub fn set_overlay(&mut self, overlay: Overlay, on: bool) {
        if on {
            self.overlays.insert(overlay);
        } else {
            self.overlays.remove(&overlay);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strum::{EnumCount, IntoEnumIterator};

    #[test]
    fn overlay_names() {
        assert_eq!(Overlay::COUNT, 8);
        assert_eq!("wall".parse::<Overlay>(), Ok(Overlay::WallCrossSection));
        assert_eq!(
            "topview-orthogonal-cross-section".parse::<Overlay>(),
            Ok(Overlay::TopviewOrthogonalCrossSection)
        );
        assert_eq!(Overlay::FluxSurfaces.to_string(), "flux-surfaces");
        assert!(Overlay::iter().enumerate().all(|(i, o)| o.index() == i));
    }

    #[test]
    fn slider_fraction() {
        let s = IntensitySlider {
            percent: 50.0,
            bright: false,
        };
        assert_eq!(s.fraction(), 0.5);
        let s = IntensitySlider {
            bright: true,
            ..s
        };
        assert_eq!(s.fraction(), 0.005);
    }

    #[test]
    fn captions_from_csv() {
        let csv = "x,y,fontsize,text\n0.1,-0.2,12,ITER\n0,0,8,\"a, b\"\n";
        let captions = Caption::from_csv(csv.as_bytes()).unwrap();
        assert_eq!(captions.len(), 2);
        assert_eq!(captions[0], Caption::new(0.1, -0.2, 12.0, "ITER"));
        assert_eq!(captions[1].text, "a, b");
    }

    #[test]
    fn state_builder() {
        let mut state = RenderState::default()
            .colormap("jet", true)
            .overlay(Overlay::Separatrix);
        assert!(state.is_enabled(Overlay::Separatrix));
        state.set_overlay(Overlay::Separatrix, false);
        state.set_overlay(Overlay::Separatrix, false);
        assert!(state.overlays.is_empty());
        assert!(state.inverted && state.relative_colorbar);
    }
}
