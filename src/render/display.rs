use nalgebra::DMatrix;

use crate::stokes::{finite_min, ResolvedField};

/// Decades below the color maximum of the logarithmic scale floor
pub const LOG_DECADES: f64 = 40f64;

/// Field ready for display with its color limits
#[derive(Debug, Clone, PartialEq)]
pub struct DisplayField {
    pub grid: DMatrix<f64>,
    pub color_min: f64,
    pub color_max: f64,
}

/// Upper end of the linear color scale: the ceiling fraction of the field
/// maximum
///
/// Falls back to 1 when the field has no positive maximum.
pub fn linear_ceiling(field: &ResolvedField, ceiling: f64) -> f64 {
    let top = ceiling * field.max;
    if top > 0f64 && top.is_finite() {
        top
    } else {
        1f64
    }
}

/// Computes the grid and the color limits to display
///
/// On a logarithmic scale, the color maximum is the logarithm of the
/// ceiling and the minimum sits [LOG_DECADES] below; every value under the
/// minimum, zeros and negatives included, is set to the minimum.
/// On a linear scale, a field with negative values gets a range symmetric
/// around 0.
pub fn display_field(field: &ResolvedField, ceiling: f64, logarithmic: bool) -> DisplayField {
    let top = linear_ceiling(field, ceiling);
    if logarithmic {
        let color_max = top.log10();
        let color_min = color_max - LOG_DECADES;
        let grid = field.field.map(|x| {
            let y = x.log10();
            if y >= color_min {
                y
            } else {
                color_min
            }
        });
        return DisplayField {
            grid,
            color_min,
            color_max,
        };
    }
    let (color_min, color_max) = linear_range(field, ceiling);
    DisplayField {
        grid: field.field.clone(),
        color_min,
        color_max,
    }
}

// color limits of the linear scale
fn linear_range(field: &ResolvedField, ceiling: f64) -> (f64, f64) {
    let top = linear_ceiling(field, ceiling);
    let data_min = finite_min(&field.field);
    if data_min < 0f64 {
        let m = data_min.abs().max(top);
        (-m, m)
    } else if top > field.min {
        (field.min, top)
    } else {
        (field.min, field.min + 1f64)
    }
}

/// Visibility of the mask layer pixels
///
/// A pixel is visible if its value exceeds `threshold` times the color
/// maximum. On a logarithmic scale the comparison is made against the
/// linear ceiling instead of its logarithm.
pub fn mask(
    field: &ResolvedField,
    ceiling: f64,
    logarithmic: bool,
    threshold: f64,
) -> DMatrix<bool> {
    let color_max = if logarithmic {
        linear_ceiling(field, ceiling)
    } else {
        linear_range(field, ceiling).1
    };
    let level = threshold * color_max;
    field.field.map(|x| x > level)
}
