use std::{
    fs::File,
    io::{BufReader, Read},
    path::Path,
};

use nalgebra::DMatrix;

use super::{Compression, Decoder, ImageRecord, LoaderError, Result};

/// Whitespace delimited numeric grid decoder
///
/// One image row per line, blank lines and lines starting with `#` are
/// skipped. Files may be gzip or bzip2 compressed.
#[derive(Debug, Default, Clone, Copy)]
pub struct GridDecoder;

impl GridDecoder {
    /// Reads the, possibly compressed, file contents
    pub fn decompress(path: &Path) -> Result<String> {
        let file = File::open(path)?;
        let mut contents = String::new();
        match Compression::from_path(path) {
            Compression::None => {
                BufReader::new(file).read_to_string(&mut contents)?;
            }
            Compression::Gzip => {
                flate2::read::GzDecoder::new(file).read_to_string(&mut contents)?;
            }
            #[cfg(feature = "bzip2")]
            Compression::Bzip2 => {
                bzip2::bufread::BzDecoder::new(BufReader::new(file))
                    .read_to_string(&mut contents)?;
            }
            #[cfg(not(feature = "bzip2"))]
            Compression::Bzip2 => return Err(LoaderError::Compression(Compression::Bzip2)),
        }
        Ok(contents)
    }
    /// Parses the grid
    pub fn parse(contents: &str) -> Result<DMatrix<f64>> {
        let mut rows: Vec<Vec<f64>> = Vec::new();
        for (i, line) in contents.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let row = line
                .split_whitespace()
                .map(|x| {
                    x.parse::<f64>().map_err(|_| LoaderError::Parse {
                        line: i + 1,
                        token: x.to_string(),
                    })
                })
                .collect::<Result<Vec<f64>>>()?;
            if let Some(first) = rows.first() {
                if first.len() != row.len() {
                    return Err(LoaderError::Ragged {
                        line: i + 1,
                        expected: first.len(),
                        found: row.len(),
                    });
                }
            }
            rows.push(row);
        }
        let n_col = rows.first().map_or(0, |row| row.len());
        Ok(DMatrix::from_row_iterator(
            rows.len(),
            n_col,
            rows.into_iter().flatten(),
        ))
    }
}
impl Decoder for GridDecoder {
    fn decode(&self, path: &Path) -> Result<ImageRecord> {
        let contents = Self::decompress(path)?;
        Ok(ImageRecord::intensity(Self::parse(&contents)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn parse_grid() {
        let m = GridDecoder::parse("# header\n1 2 3\n\n4 5e-1 6\n").unwrap();
        assert_eq!(m.shape(), (2, 3));
        assert_eq!(m[(1, 1)], 0.5);
    }

    #[test]
    fn ragged_grid() {
        assert!(matches!(
            GridDecoder::parse("1 2\n3\n"),
            Err(LoaderError::Ragged { line: 2, .. })
        ));
        assert!(matches!(
            GridDecoder::parse("1 x\n"),
            Err(LoaderError::Parse { line: 1, .. })
        ));
    }

    #[test]
    fn gzipped_grid() {
        let path = std::env::temp_dir().join("softviz-gzipped-grid.dat.gz");
        {
            let file = File::create(&path).unwrap();
            let mut gz = flate2::write::GzEncoder::new(file, flate2::Compression::default());
            gz.write_all(b"0 1\n2 3\n").unwrap();
            gz.finish().unwrap();
        }
        let record = GridDecoder.decode(&path).unwrap();
        assert_eq!(record.shape(), (2, 2));
        assert_eq!(record.max_intensity(), 3.0);
        std::fs::remove_file(path).unwrap();
    }
}
