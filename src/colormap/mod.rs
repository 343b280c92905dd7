//! Colormaps
//!
//! Every colormap is a 256 samples lookup table registered under its name
//! together with its reversed twin, the twin name being the base name with
//! the `_r` suffix.

use std::collections::BTreeMap;

mod segmented;
pub use segmented::{afmhot, Segmented, GERIMAP, GRAY};

/// Number of samples of the lookup tables
pub const LUT_SIZE: usize = 256;
/// Suffix of the reversed colormaps name
pub const REVERSED_SUFFIX: &str = "_r";
/// Name of the default colormap
pub const GERIMAP_NAME: &str = "GeriMap";

#[derive(thiserror::Error, Debug, PartialEq)]
pub enum ColormapError {
    #[error("no colormap registered as {0}")]
    Unknown(String),
    #[error("the transparency threshold must be within [0,1], found {0}")]
    Transparency(f64),
}
type Result<T> = std::result::Result<T, ColormapError>;

/// RGBA color with components in `[0,1]`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rgba {
    pub r: f64,
    pub g: f64,
    pub b: f64,
    pub a: f64,
}
impl Rgba {
    pub fn opaque(r: f64, g: f64, b: f64) -> Self {
        Self { r, g, b, a: 1f64 }
    }
    pub fn transparent() -> Self {
        Self {
            r: 0f64,
            g: 0f64,
            b: 0f64,
            a: 0f64,
        }
    }
    pub fn white() -> Self {
        Self::opaque(1f64, 1f64, 1f64)
    }
    pub fn black() -> Self {
        Self::opaque(0f64, 0f64, 0f64)
    }
    pub fn rgb(&self) -> [f64; 3] {
        [self.r, self.g, self.b]
    }
    pub fn to_rgb8(&self) -> [u8; 3] {
        self.rgb().map(|c| (c.clamp(0f64, 1f64) * 255f64).round() as u8)
    }
}
impl From<colorous::Color> for Rgba {
    fn from(c: colorous::Color) -> Self {
        Rgba::opaque(
            c.r as f64 / 255f64,
            c.g as f64 / 255f64,
            c.b as f64 / 255f64,
        )
    }
}

/// Alpha of the transparency ramp at the position `p` in `[0,1]`
///
/// The alpha ramps linearly from 0 to 1 over `[0,threshold]` and stays at 1
/// above; no threshold or a zero threshold leaves the colors opaque.
pub fn alpha_ramp(p: f64, threshold: Option<f64>) -> f64 {
    match threshold {
        Some(t) if t > 0f64 => (p / t).clamp(0f64, 1f64),
        _ => 1f64,
    }
}

/// Colormap lookup table
#[derive(Debug, Clone, PartialEq)]
pub struct Colormap {
    name: String,
    lut: Vec<Rgba>,
}
impl Colormap {
    /// Samples `f` over `[0,1]`
    pub fn from_fn<F: Fn(f64) -> Rgba>(name: impl Into<String>, f: F) -> Self {
        let n = (LUT_SIZE - 1) as f64;
        Self {
            name: name.into(),
            lut: (0..LUT_SIZE).map(|i| f(i as f64 / n)).collect(),
        }
    }
    pub fn segmented(name: impl Into<String>, segmented: &Segmented) -> Self {
        Self::from_fn(name, |x| segmented.eval(x))
    }
    pub fn gradient(name: impl Into<String>, gradient: colorous::Gradient) -> Self {
        Self::from_fn(name, |x| gradient.eval_continuous(x).into())
    }
    pub fn name(&self) -> &str {
        &self.name
    }
    pub fn lut(&self) -> &[Rgba] {
        &self.lut
    }
    /// Reversed twin
    ///
    /// The colors are reversed, the alpha channel is not: a transparency
    /// ramp stays at the bottom of the reversed map.
    pub fn reversed(&self) -> Self {
        let name = match self.name.strip_suffix(REVERSED_SUFFIX) {
            Some(base) => base.to_string(),
            None => format!("{}{}", self.name, REVERSED_SUFFIX),
        };
        let lut = self
            .lut
            .iter()
            .zip(self.lut.iter().rev())
            .map(|(a, c)| Rgba { a: a.a, ..*c })
            .collect();
        Self { name, lut }
    }
    /// Applies the transparency ramp to the alpha channel
    pub fn with_alpha_ramp(mut self, threshold: Option<f64>) -> Self {
        let n = (self.lut.len().max(2) - 1) as f64;
        self.lut
            .iter_mut()
            .enumerate()
            .for_each(|(i, c)| c.a = alpha_ramp(i as f64 / n, threshold));
        self
    }
    /// Color at the position `x` in `[0,1]`
    ///
    /// Positions outside are clipped, NaN is transparent.
    pub fn at(&self, x: f64) -> Rgba {
        if x.is_nan() || self.lut.is_empty() {
            return Rgba::transparent();
        }
        let n = self.lut.len() - 1;
        self.lut[(x.clamp(0f64, 1f64) * n as f64).round() as usize]
    }
    /// Color of `value` on the scale `[min,max]`
    pub fn map(&self, value: f64, min: f64, max: f64) -> Rgba {
        let span = max - min;
        if span > 0f64 {
            self.at((value - min) / span)
        } else {
            self.at(0f64)
        }
    }
}

/// Colormap registry
#[derive(Debug, Clone)]
pub struct Colormaps {
    maps: BTreeMap<String, Colormap>,
}
impl Default for Colormaps {
    /// The palette with an opaque GeriMap
    fn default() -> Self {
        let mut this = Self {
            maps: BTreeMap::new(),
        };
        this.register(Colormap::segmented(
            GERIMAP_NAME,
            &Segmented::from_list(&GERIMAP),
        ));
        this.register(Colormap::from_fn("afmhot", afmhot));
        this.register(Colormap::segmented("gray", &Segmented::from_list(&GRAY)));
        this.register(Colormap::segmented("jet", &Segmented::jet()));
        for (name, gradient) in [
            ("viridis", colorous::VIRIDIS),
            ("inferno", colorous::INFERNO),
            ("magma", colorous::MAGMA),
            ("plasma", colorous::PLASMA),
            ("cividis", colorous::CIVIDIS),
            ("cubehelix", colorous::CUBEHELIX),
            ("turbo", colorous::TURBO),
        ] {
            this.register(Colormap::gradient(name, gradient));
        }
        this
    }
}
impl Colormaps {
    /// Registers a colormap and its reversed twin, replacing any colormaps
    /// with the same names
    pub fn register(&mut self, colormap: Colormap) {
        let reversed = colormap.reversed();
        log::debug!("registering colormaps {} & {}", colormap.name, reversed.name);
        self.maps.insert(reversed.name.clone(), reversed);
        self.maps.insert(colormap.name.clone(), colormap);
    }
    /// Registers GeriMap and GeriMap_r with the transparency ramp over the
    /// `transparency` bottom fraction of the maps
    pub fn register_gerimap(&mut self, transparency: Option<f64>) -> Result<()> {
        if let Some(t) = transparency {
            if !(0f64..=1f64).contains(&t) {
                return Err(ColormapError::Transparency(t));
            }
        }
        self.register(
            Colormap::segmented(GERIMAP_NAME, &Segmented::from_list(&GERIMAP))
                .with_alpha_ramp(transparency),
        );
        Ok(())
    }
    /// Returns the colormap `name` or its reversed twin
    pub fn get(&self, name: &str, inverted: bool) -> Result<&Colormap> {
        let key = if inverted {
            format!("{}{}", name, REVERSED_SUFFIX)
        } else {
            name.to_string()
        };
        self.maps.get(&key).ok_or(ColormapError::Unknown(key))
    }
    /// Registered names, reversed twins excluded
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.maps
            .keys()
            .map(String::as_str)
            .filter(|name| !name.ends_with(REVERSED_SUFFIX))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn palette_with_twins() {
        let cmaps = Colormaps::default();
        assert_eq!(cmaps.names().count(), 11);
        for name in cmaps.names() {
            let cmap = cmaps.get(name, false).unwrap();
            assert_eq!(cmap.lut().len(), LUT_SIZE);
            let twin = cmaps.get(name, true).unwrap();
            assert_eq!(twin.name(), format!("{}_r", name));
            assert_eq!(cmap.lut()[0].rgb(), twin.lut()[LUT_SIZE - 1].rgb());
        }
        assert_eq!(
            cmaps.get("parula", false),
            Err(ColormapError::Unknown("parula".into()))
        );
    }

    #[test]
    fn gerimap_alpha_ramp() {
        let mut cmaps = Colormaps::default();
        cmaps.register_gerimap(Some(0.5)).unwrap();
        for inverted in [false, true] {
            let lut = cmaps.get(GERIMAP_NAME, inverted).unwrap().lut();
            assert_eq!(lut[0].a, 0.0);
            assert!((lut[64].a - 64.0 / 255.0 / 0.5).abs() < 1e-12);
            assert_eq!(lut[128].a, 1.0);
            assert_eq!(lut[255].a, 1.0);
        }
        assert_eq!(
            cmaps.register_gerimap(Some(1.5)),
            Err(ColormapError::Transparency(1.5))
        );
    }

    #[test]
    fn no_transparency() {
        let mut cmaps = Colormaps::default();
        for t in [None, Some(0.0)] {
            cmaps.register_gerimap(t).unwrap();
            let lut = cmaps.get(GERIMAP_NAME, false).unwrap().lut();
            assert!(lut.iter().all(|c| c.a == 1.0));
        }
    }

    #[test]
    fn map_values() {
        let gray = Colormaps::default().get("gray", false).unwrap().clone();
        assert_eq!(gray.map(-1.0, 0.0, 2.0).rgb(), [0.0; 3]);
        assert_eq!(gray.map(5.0, 0.0, 2.0).rgb(), [1.0; 3]);
        assert_eq!(gray.map(f64::NAN, 0.0, 2.0).a, 0.0);
        assert_eq!(gray.map(1.0, 1.0, 1.0).rgb(), [0.0; 3]);
        assert_eq!(gray.reversed().reversed().name(), "gray");
    }

    #[test]
    fn eight_bit_channels() {
        assert_eq!(Rgba::white().to_rgb8(), [255; 3]);
        assert_eq!(Rgba::opaque(0.5, 2.0, -1.0).to_rgb8(), [128, 255, 0]);
    }
}
