use super::Rgba;

/// GeriMap control points: black, indigo, violet, magenta, red, orange,
/// yellow, pale yellow and white
pub const GERIMAP: [[f64; 3]; 9] = [
    [0.00, 0.00, 0.00],
    [0.15, 0.15, 0.50],
    [0.30, 0.15, 0.75],
    [0.60, 0.20, 0.50],
    [1.00, 0.25, 0.15],
    [0.90, 0.50, 0.00],
    [0.90, 0.75, 0.10],
    [0.90, 0.90, 0.50],
    [1.00, 1.00, 1.00],
];

pub const GRAY: [[f64; 3]; 2] = [[0.; 3], [1.; 3]];

// jet, knots at 0, 1/8, 3/8, 5/8, 7/8 and 1
const JET: [(f64, [f64; 3]); 6] = [
    (0.000, [0.0, 0.0, 0.5]),
    (0.125, [0.0, 0.0, 1.0]),
    (0.375, [0.0, 1.0, 1.0]),
    (0.625, [1.0, 1.0, 0.0]),
    (0.875, [1.0, 0.0, 0.0]),
    (1.000, [0.5, 0.0, 0.0]),
];

/// Piecewise linear colormap through evenly spaced control points
#[derive(Debug, Clone, PartialEq)]
pub struct Segmented {
    knots: Vec<(f64, [f64; 3])>,
}
impl Segmented {
    /// Evenly spaced control points over `[0,1]`
    pub fn from_list(colors: &[[f64; 3]]) -> Self {
        let n = colors.len().saturating_sub(1).max(1) as f64;
        Self {
            knots: colors
                .iter()
                .enumerate()
                .map(|(i, &c)| (i as f64 / n, c))
                .collect(),
        }
    }
    /// Control points at the given positions, sorted in increasing order
    pub fn from_knots(knots: &[(f64, [f64; 3])]) -> Self {
        Self {
            knots: knots.to_vec(),
        }
    }
    pub fn jet() -> Self {
        Self::from_knots(&JET)
    }
    /// Color at `x` in `[0,1]`
    pub fn eval(&self, x: f64) -> Rgba {
        let x = x.clamp(0f64, 1f64);
        let rgb = match self.knots.as_slice() {
            [] => [0f64; 3],
            [(_, c)] => *c,
            knots => {
                let k = knots
                    .windows(2)
                    .position(|w| x <= w[1].0)
                    .unwrap_or(knots.len() - 2);
                let ((x0, c0), (x1, c1)) = (knots[k], knots[k + 1]);
                let w = if x1 > x0 { (x - x0) / (x1 - x0) } else { 0f64 };
                [0, 1, 2].map(|i| c0[i] * (1f64 - w) + c1[i] * w)
            }
        };
        Rgba::opaque(rgb[0], rgb[1], rgb[2])
    }
}

/// The `afmhot` colormap
pub fn afmhot(x: f64) -> Rgba {
    let c = |x: f64| x.clamp(0f64, 1f64);
    Rgba::opaque(c(2. * x), c(2. * x - 0.5), c(2. * x - 1.))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gerimap_control_points() {
        let gm = Segmented::from_list(&GERIMAP);
        assert_eq!(gm.eval(0.0).rgb(), [0.0, 0.0, 0.0]);
        assert_eq!(gm.eval(1.0).rgb(), [1.0, 1.0, 1.0]);
        let red = gm.eval(0.5).rgb();
        assert!((red[0] - 1.0).abs() < 1e-12 && (red[2] - 0.15).abs() < 1e-12);
        let mid = gm.eval(1.0 / 16.0).rgb();
        assert!((mid[2] - 0.25).abs() < 1e-12);
    }

    #[test]
    fn jet_and_afmhot() {
        let jet = Segmented::jet();
        assert_eq!(jet.eval(0.5).rgb(), [0.5, 1.0, 0.5]);
        assert_eq!(afmhot(0.5).rgb(), [1.0, 0.5, 0.0]);
    }
}
