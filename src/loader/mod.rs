//! Image loaders
//!
//! The file format is resolved once from the file name, then the decoder
//! registered for that format turns the file into an [ImageRecord].

use std::{
    collections::HashMap,
    path::{Path, PathBuf},
};

use strum_macros::{Display, EnumIter};

use crate::{geometry::GeometryError, projection::CameraError, stokes::StokesError};

mod container;
pub use container::{Container, VarMap};
mod grid;
pub use grid::GridDecoder;
#[cfg(feature = "hdf5")]
mod hdf5;
#[cfg(feature = "hdf5")]
pub use self::hdf5::Hdf5Decoder;
#[cfg(feature = "matio-rs")]
mod mat;
#[cfg(feature = "matio-rs")]
pub use mat::MatDecoder;
mod record;
pub use record::{ImageData, ImageRecord};

#[derive(thiserror::Error, Debug)]
pub enum LoaderError {
    #[error("unrecognized image format: {0:?}")]
    UnrecognizedFormat(PathBuf),
    #[error("no decoder registered for the {0} format")]
    NoDecoder(Format),
    #[error("{0} decompression requires the `bzip2` feature")]
    Compression(Compression),
    #[error("failed to read the image file")]
    Io(#[from] std::io::Error),
    #[error("failed to decode the image file: {0}")]
    Decoder(String),
    #[error("missing variable {0}")]
    MissingVariable(String),
    #[error("variable {name} is {shape:?}, expected {expected}")]
    Shape {
        name: String,
        shape: (usize, usize),
        expected: String,
    },
    #[error("invalid value {value} in {name}")]
    Value { name: String, value: f64 },
    #[error("line {line}: cannot parse {token:?} as a number")]
    Parse { line: usize, token: String },
    #[error("line {line} has {found} values, expected {expected}")]
    Ragged {
        line: usize,
        expected: usize,
        found: usize,
    },
    #[error("invalid camera")]
    Camera(#[from] CameraError),
    #[error("invalid geometry")]
    Geometry(#[from] GeometryError),
    #[error("invalid Stokes parameters")]
    Stokes(#[from] StokesError),
}
pub type Result<T> = std::result::Result<T, LoaderError>;

/// File compression
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum Compression {
    #[strum(to_string = "none")]
    None,
    #[strum(to_string = "gzip")]
    Gzip,
    #[strum(to_string = "bzip2")]
    Bzip2,
}
impl Compression {
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some("gz") => Compression::Gzip,
            Some("bz2") => Compression::Bzip2,
            _ => Compression::None,
        }
    }
}

/// Image file formats
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumIter)]
pub enum Format {
    /// Whitespace delimited grid (`.dat`, `.topview`)
    #[strum(to_string = "legacy grid")]
    LegacyGrid,
    /// MATLAB file (`.mat`)
    #[strum(to_string = "MAT")]
    Mat,
    /// HDF5 file (`.h5`, `.hdf5`)
    #[strum(to_string = "HDF5")]
    Hdf5,
}
impl Format {
    /// Resolves the format from the file name
    ///
    /// A `.gz` or `.bz2` extension is looked through for the legacy grids.
    pub fn from_path(path: &Path) -> Result<Self> {
        let unrecognized = || LoaderError::UnrecognizedFormat(path.to_path_buf());
        let compression = Compression::from_path(path);
        let inner = match compression {
            Compression::None => path.to_path_buf(),
            _ => path.with_extension(""),
        };
        let extension = inner
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase())
            .ok_or_else(unrecognized)?;
        match (extension.as_str(), compression) {
            ("dat" | "topview", _) => Ok(Format::LegacyGrid),
            ("mat", Compression::None) => Ok(Format::Mat),
            ("h5" | "hdf5", Compression::None) => Ok(Format::Hdf5),
            _ => Err(unrecognized()),
        }
    }
}

/// File decoder
pub trait Decoder {
    fn decode(&self, path: &Path) -> Result<ImageRecord>;
}

/// Summary of a loaded record
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LoadReport {
    pub format: Format,
    /// Largest finite intensity
    pub max_value: f64,
    /// True if the image has no positive intensity
    pub zero_content: bool,
}
impl LoadReport {
    pub fn new(format: Format, record: &ImageRecord) -> Self {
        let max_value = record.max_intensity();
        Self {
            format,
            max_value,
            zero_content: !(max_value > 0f64),
        }
    }
}

/// Image loader
pub struct Loader {
    decoders: HashMap<Format, Box<dyn Decoder>>,
}
impl Default for Loader {
    /// Loader with the built-in decoders
    ///
    /// MAT files need the `matio-rs` feature and HDF5 files the `hdf5`
    /// feature, without them loading these formats fails with
    /// [LoaderError::NoDecoder].
    fn default() -> Self {
        let this = Self::empty().decoder(Format::LegacyGrid, GridDecoder);
        #[cfg(feature = "matio-rs")]
        let this = this.decoder(Format::Mat, MatDecoder);
        #[cfg(feature = "hdf5")]
        let this = this.decoder(Format::Hdf5, Hdf5Decoder);
        this
    }
}
impl Loader {
    /// Loader without any decoder
    pub fn empty() -> Self {
        Self {
            decoders: HashMap::new(),
        }
    }
    /// Registers the decoder of a format
    pub fn decoder<D: Decoder + 'static>(mut self, format: Format, decoder: D) -> Self {
        self.decoders.insert(format, Box::new(decoder));
        self
    }
    /// Loads an image file
    pub fn load<P: AsRef<Path>>(&self, path: P) -> Result<(ImageRecord, LoadReport)> {
        let path = path.as_ref();
        let format = Format::from_path(path)?;
        let decoder = self
            .decoders
            .get(&format)
            .ok_or(LoaderError::NoDecoder(format))?;
        let record = decoder.decode(path)?;
        let report = LoadReport::new(format, &record);
        log::info!(
            "loaded {:?} ({}): {:?} {}",
            path,
            format,
            record.shape(),
            if record.is_polarimetric() {
                "polarimetric image"
            } else {
                "intensity image"
            }
        );
        if report.zero_content {
            log::warn!("{:?} has no positive intensity", path);
        }
        Ok((record, report))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::DMatrix;
    use std::f64::consts::PI;

    #[test]
    fn formats() {
        let f = |p: &str| Format::from_path(Path::new(p));
        assert_eq!(f("image.dat").unwrap(), Format::LegacyGrid);
        assert_eq!(f("image.topview.bz2").unwrap(), Format::LegacyGrid);
        assert_eq!(f("image.DAT.gz").unwrap(), Format::LegacyGrid);
        assert_eq!(f("image.mat").unwrap(), Format::Mat);
        assert_eq!(f("image.hdf5").unwrap(), Format::Hdf5);
        assert!(matches!(
            f("image.png"),
            Err(LoaderError::UnrecognizedFormat(_))
        ));
        assert!(f("image").is_err());
        assert!(f("image.mat.gz").is_err());
    }

    struct Scenario;
    impl Decoder for Scenario {
        fn decode(&self, _path: &Path) -> Result<ImageRecord> {
            let n = 65;
            let wall = DMatrix::from_fn(2, n, |i, j| {
                let t = 2. * PI * j as f64 / (n - 1) as f64;
                if i == 0 {
                    1.0
                } else {
                    0.5 * t.sin()
                }
            });
            let vars = VarMap::new()
                .insert("image", DMatrix::from_fn(8, 8, |i, j| (i + j) as f64))
                .vector("detectorPosition", &[0.0, -3.0, 0.0])
                .vector("detectorDirection", &[0.0, 1.0, 0.0])
                .scalar("detectorVisang", 0.5)
                .insert("wall", wall);
            ImageRecord::from_container(&vars)
        }
    }

    #[test]
    fn no_decoder() {
        assert!(matches!(
            Loader::empty().load("image.mat"),
            Err(LoaderError::NoDecoder(Format::Mat))
        ));
    }

    #[cfg(not(feature = "hdf5"))]
    #[test]
    fn hdf5_without_decoder() {
        assert!(matches!(
            Loader::default().load("image.h5"),
            Err(LoaderError::NoDecoder(Format::Hdf5))
        ));
    }

    #[test]
    fn mat_scenario() {
        let loader = Loader::empty().decoder(Format::Mat, Scenario);
        let (record, report) = loader.load("scenario.mat").unwrap();
        assert_eq!(report.format, Format::Mat);
        assert_eq!(report.max_value, 14.0);
        assert!(!report.zero_content);
        let wall = record.get_wall().unwrap();
        assert_eq!(wall.to_matrix().shape(), (65, 2));
        assert!((wall.r_min() - 1.0).abs() < 1e-9 && (wall.r_max() - 1.0).abs() < 1e-9);
        let camera = record.get_camera().unwrap();
        let overlay = crate::projection::Projector::new(camera).orthogonal(wall);
        assert_eq!(overlay.breaks(), 0);
        assert!(overlay.is_closed(1e-9));
    }

    #[test]
    fn zero_content() {
        let record = ImageRecord::intensity(DMatrix::zeros(3, 3));
        let report = LoadReport::new(Format::LegacyGrid, &record);
        assert!(report.zero_content);
        assert_eq!(report.max_value, 0.0);
    }
}
