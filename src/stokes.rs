//! Polarization quantities
//!
//! Derives the scalar image to display from the Stokes channels of a
//! polarimetric record.

use std::f64::consts::FRAC_PI_2;

use nalgebra::DMatrix;
use strum_macros::{AsRefStr, Display, EnumIter, EnumString};

#[derive(thiserror::Error, Debug, PartialEq)]
pub enum StokesError {
    #[error("Stokes {channel} is {found:?}, expected {expected:?} as Stokes I")]
    Shape {
        channel: char,
        found: (usize, usize),
        expected: (usize, usize),
    },
}
type Result<T> = std::result::Result<T, StokesError>;

/// Displayable quantities
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, EnumIter, EnumString, Display, AsRefStr,
)]
#[strum(ascii_case_insensitive)]
pub enum Quantity {
    #[strum(to_string = "N/A", serialize = "na", serialize = "empty")]
    NotApplicable,
    #[default]
    #[strum(to_string = "I", serialize = "intensity")]
    I,
    #[strum(to_string = "Q", serialize = "posq")]
    PosQ,
    #[strum(to_string = "-Q", serialize = "negq")]
    NegQ,
    #[strum(to_string = "U", serialize = "posu")]
    PosU,
    #[strum(to_string = "-U", serialize = "negu")]
    NegU,
    #[strum(to_string = "V", serialize = "posv")]
    PosV,
    #[strum(to_string = "-V", serialize = "negv")]
    NegV,
    #[strum(to_string = "Linear polarization fraction", serialize = "linpolfrac")]
    LinPolFrac,
    #[strum(to_string = "Polarization angle", serialize = "polangle")]
    PolAngle,
    #[strum(to_string = "Horizontal")]
    Horizontal,
    #[strum(to_string = "Vertical")]
    Vertical,
    #[strum(to_string = "Diagonal 1", serialize = "diagonal1")]
    Diagonal1,
    #[strum(to_string = "Diagonal 2", serialize = "diagonal2")]
    Diagonal2,
}

/// Scalar field with its suggested color range
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedField {
    pub field: DMatrix<f64>,
    pub min: f64,
    pub max: f64,
}
impl ResolvedField {
    /// Intensity field with the range `[0,max]`
    pub fn intensity(field: DMatrix<f64>) -> Self {
        let max = finite_max(&field);
        Self {
            field,
            min: 0f64,
            max,
        }
    }
    fn positive(field: DMatrix<f64>) -> Self {
        Self::intensity(field.map(|x| x.max(0f64)))
    }
}

/// Largest finite value of a grid, 0 if there is none
pub fn finite_max(field: &DMatrix<f64>) -> f64 {
    field
        .iter()
        .copied()
        .filter(|x| x.is_finite())
        .reduce(f64::max)
        .unwrap_or_default()
}
/// Smallest finite value of a grid, 0 if there is none
pub fn finite_min(field: &DMatrix<f64>) -> f64 {
    field
        .iter()
        .copied()
        .filter(|x| x.is_finite())
        .reduce(f64::min)
        .unwrap_or_default()
}

// NaN and infinities to 0
fn nan_to_zero(x: f64) -> f64 {
    if x.is_finite() {
        x
    } else {
        0f64
    }
}

/// Stokes I, Q, U and V grids
#[derive(Debug, Clone, PartialEq)]
pub struct StokesChannels {
    pub i: DMatrix<f64>,
    pub q: DMatrix<f64>,
    pub u: DMatrix<f64>,
    pub v: DMatrix<f64>,
}
impl StokesChannels {
    /// Creates the channels, checking that all the grids have the same shape
    pub fn new(
        i: DMatrix<f64>,
        q: DMatrix<f64>,
        u: DMatrix<f64>,
        v: DMatrix<f64>,
    ) -> Result<Self> {
        let expected = i.shape();
        for (channel, grid) in [('Q', &q), ('U', &u), ('V', &v)] {
            if grid.shape() != expected {
                return Err(StokesError::Shape {
                    channel,
                    found: grid.shape(),
                    expected,
                });
            }
        }
        Ok(Self { i, q, u, v })
    }
    pub fn shape(&self) -> (usize, usize) {
        self.i.shape()
    }
    /// Derives the field of `quantity`
    ///
    /// Returns `None` for [Quantity::NotApplicable]. Divisions by zero
    /// resolve to 0.
    pub fn resolve(&self, quantity: Quantity) -> Option<ResolvedField> {
        use Quantity::*;
        let field = match quantity {
            NotApplicable => return None,
            I => ResolvedField::intensity(self.i.clone()),
            PosQ => ResolvedField::positive(self.q.clone()),
            NegQ => ResolvedField::positive(-&self.q),
            PosU => ResolvedField::positive(self.u.clone()),
            NegU => ResolvedField::positive(-&self.u),
            PosV => ResolvedField::positive(self.v.clone()),
            NegV => ResolvedField::positive(-&self.v),
            LinPolFrac => ResolvedField {
                field: self.i.zip_zip_map(&self.q, &self.u, |i, q, u| {
                    nan_to_zero(q.hypot(u) / i)
                }),
                min: 0f64,
                max: 1f64,
            },
            PolAngle => ResolvedField {
                field: self
                    .q
                    .zip_map(&self.u, |q, u| 0.5 * (u / q).atan())
                    .map(|x| if x.is_nan() { 0f64 } else { x }),
                min: -FRAC_PI_2,
                max: FRAC_PI_2,
            },
            Horizontal => ResolvedField::intensity((&self.i + &self.q) * 0.5),
            Vertical => ResolvedField::intensity((&self.i - &self.q) * 0.5),
            Diagonal1 => ResolvedField::intensity((&self.i + &self.u) * 0.5),
            Diagonal2 => ResolvedField::intensity((&self.i - &self.u) * 0.5),
        };
        Some(field)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strum::IntoEnumIterator;

    fn channels(i: f64, q: f64, u: f64, v: f64) -> StokesChannels {
        StokesChannels::new(
            DMatrix::from_element(3, 4, i),
            DMatrix::from_element(3, 4, q),
            DMatrix::from_element(3, 4, u),
            DMatrix::from_element(3, 4, v),
        )
        .unwrap()
    }

    #[test]
    fn quantity_labels() {
        assert_eq!(Quantity::iter().count(), 14);
        assert_eq!(Quantity::NegQ.to_string(), "-Q");
        assert_eq!("LINPOLFRAC".parse::<Quantity>(), Ok(Quantity::LinPolFrac));
        assert_eq!(
            "polarization angle".parse::<Quantity>(),
            Ok(Quantity::PolAngle)
        );
        assert_eq!("n/a".parse::<Quantity>(), Ok(Quantity::NotApplicable));
        assert!("W".parse::<Quantity>().is_err());
    }

    #[test]
    fn mismatched_shapes() {
        let e = StokesChannels::new(
            DMatrix::zeros(2, 2),
            DMatrix::zeros(2, 2),
            DMatrix::zeros(2, 3),
            DMatrix::zeros(2, 2),
        );
        assert!(matches!(e, Err(StokesError::Shape { channel: 'U', .. })));
    }

    #[test]
    fn unpolarized_linear_fraction_is_zero() {
        let r = channels(2.0, 0.0, 0.0, 0.0)
            .resolve(Quantity::LinPolFrac)
            .unwrap();
        assert!(r.field.iter().all(|&x| x == 0.0));
        assert_eq!((r.min, r.max), (0.0, 1.0));
    }

    #[test]
    fn empty_pixel_linear_fraction_is_zero() {
        let mut s = channels(1.0, 0.3, 0.4, 0.0);
        s.i[(1, 1)] = 0.0;
        s.q[(1, 1)] = 0.0;
        s.u[(1, 1)] = 0.0;
        let r = s.resolve(Quantity::LinPolFrac).unwrap();
        assert_eq!(r.field[(1, 1)], 0.0);
        assert!((r.field[(0, 0)] - 0.5).abs() < 1e-12);
        s.i[(1, 1)] = 0.0;
        s.q[(1, 1)] = 1.0;
        let r = s.resolve(Quantity::LinPolFrac).unwrap();
        assert_eq!(r.field[(1, 1)], 0.0);
    }

    #[test]
    fn signed_components_are_clipped() {
        let s = channels(1.0, -0.5, 0.25, 0.0);
        let pos = s.resolve(Quantity::PosQ).unwrap();
        assert!(pos.field.iter().all(|&x| x == 0.0));
        let neg = s.resolve(Quantity::NegQ).unwrap();
        assert_eq!(neg.max, 0.5);
        assert_eq!(neg.min, 0.0);
        assert_eq!(s.resolve(Quantity::PosU).unwrap().max, 0.25);
    }

    #[test]
    fn polarization_angle_of_empty_pixel() {
        let r = channels(0.0, 0.0, 0.0, 0.0)
            .resolve(Quantity::PolAngle)
            .unwrap();
        assert!(r.field.iter().all(|&x| x == 0.0));
        assert_eq!(r.max, FRAC_PI_2);
    }

    #[test]
    fn basis_components() {
        let s = channels(1.0, 0.5, -0.2, 0.0);
        assert_eq!(s.resolve(Quantity::Horizontal).unwrap().max, 0.75);
        assert_eq!(s.resolve(Quantity::Vertical).unwrap().max, 0.25);
        assert!((s.resolve(Quantity::Diagonal2).unwrap().max - 0.6).abs() < 1e-12);
        assert!(s.resolve(Quantity::NotApplicable).is_none());
    }
}
