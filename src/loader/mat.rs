use std::path::Path;

use matio_rs::{MatFile, MatioError};
use nalgebra::DMatrix;

use super::{Container, Decoder, ImageRecord, LoaderError, Result};

/// MATLAB file decoder
///
/// Reads both the legacy and the HDF5 based (v7.3) MAT files.
#[derive(Debug, Default, Clone, Copy)]
pub struct MatDecoder;

struct MatContainer<'a> {
    file: &'a MatFile,
}
impl<'a> Container for MatContainer<'a> {
    fn var(&self, name: &str) -> Result<Option<DMatrix<f64>>> {
        let value: std::result::Result<DMatrix<f64>, _> = self.file.var(name);
        match value {
            Ok(value) => Ok(Some(value)),
            Err(MatioError::NoVar(_)) => {
                log::debug!("variable {} not found", name);
                Ok(None)
            }
            Err(e) => Err(read_error(name, e)),
        }
    }
}

// any failure but a missing variable is a malformed file
fn read_error(name: &str, e: MatioError) -> LoaderError {
    LoaderError::Decoder(format!("{}: {}", name, e))
}

impl Decoder for MatDecoder {
    fn decode(&self, path: &Path) -> Result<ImageRecord> {
        let file = MatFile::load(path).map_err(|e| LoaderError::Decoder(e.to_string()))?;
        ImageRecord::from_container(&MatContainer { file: &file })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn read_errors_name_the_variable() {
        let e = read_error("wall", MatioError::NoVar("wall".into()));
        assert!(matches!(e, LoaderError::Decoder(msg) if msg.starts_with("wall: ")));
    }

    #[test]
    fn missing_file() {
        let path = std::env::temp_dir().join("softviz-missing.mat");
        assert!(matches!(
            MatDecoder.decode(&path),
            Err(LoaderError::Decoder(_))
        ));
    }
}
