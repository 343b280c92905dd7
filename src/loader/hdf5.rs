use std::{path::Path, sync::Once};

use nalgebra::DMatrix;

use super::{Container, Decoder, ImageRecord, LoaderError, Result};

/// HDF5 file decoder
///
/// Datasets are read with the netCDF library, which opens netCDF-4 and
/// plain HDF5 files alike. Datasets are stored row-major: a `d0×d1` dataset
/// becomes a `d0×d1` matrix, a 1-D dataset a row and a scalar a `1×1` matrix.
#[derive(Debug, Default, Clone, Copy)]
pub struct Hdf5Decoder;

// HDF5 prints handled errors, e.g. a missing dataset, to stderr
fn silence_hdf5_errors() {
    static INIT: Once = Once::new();
    INIT.call_once(|| {
        unsafe {
            hdf5_metno_sys::h5e::H5Eset_auto2(
                hdf5_metno_sys::h5e::H5E_DEFAULT,
                None,
                std::ptr::null_mut(),
            );
        }
    });
}

struct Hdf5Container {
    file: netcdf::File,
}
impl Container for Hdf5Container {
    fn var(&self, name: &str) -> Result<Option<DMatrix<f64>>> {
        let Some(var) = self.file.variable(name) else {
            log::debug!("dataset {} not found", name);
            return Ok(None);
        };
        let dims: Vec<usize> = var.dimensions().iter().map(|d| d.len()).collect();
        let values: Vec<f64> = var
            .get_values(..)
            .map_err(|e| LoaderError::Decoder(format!("{}: {}", name, e)))?;
        to_matrix(name, &dims, values).map(Some)
    }
}

fn to_matrix(name: &str, dims: &[usize], values: Vec<f64>) -> Result<DMatrix<f64>> {
    let (n_row, n_col) = match *dims {
        [] => (1, 1),
        [n] => (1, n),
        [n_row, n_col] => (n_row, n_col),
        _ => {
            return Err(LoaderError::Shape {
                name: name.to_string(),
                shape: (dims.len(), values.len()),
                expected: "a dataset of at most 2 dimensions".to_string(),
            })
        }
    };
    if n_row * n_col != values.len() {
        return Err(LoaderError::Decoder(format!(
            "{}: {} values for a {}×{} dataset",
            name,
            values.len(),
            n_row,
            n_col
        )));
    }
    Ok(DMatrix::from_row_slice(n_row, n_col, &values))
}

impl Decoder for Hdf5Decoder {
    fn decode(&self, path: &Path) -> Result<ImageRecord> {
        silence_hdf5_errors();
        let file = netcdf::open(path).map_err(|e| LoaderError::Decoder(e.to_string()))?;
        ImageRecord::from_container(&Hdf5Container { file })
    }
}
