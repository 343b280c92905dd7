use crate::colormap::Colormap;

/// Number of intervals between the relative colorbar ticks
const RELATIVE_INTERVALS: usize = 5;

#[derive(Debug, Clone, PartialEq)]
pub struct Tick {
    pub value: f64,
    pub label: String,
}

/// Colorbar keyed to the displayed image color scale
#[derive(Debug, Clone, PartialEq)]
pub struct Colorbar {
    pub colormap: Colormap,
    pub min: f64,
    pub max: f64,
    pub ticks: Vec<Tick>,
}
impl Colorbar {
    /// Colorbar with ticks every 20% of the color maximum, labelled in percent
    pub fn relative(colormap: Colormap, min: f64, max: f64, logarithmic: bool) -> Self {
        Self {
            ticks: relative_ticks(min, max, logarithmic),
            colormap,
            min,
            max,
        }
    }
    /// Colorbar with round valued ticks
    pub fn native(colormap: Colormap, min: f64, max: f64) -> Self {
        Self {
            ticks: native_ticks(min, max),
            colormap,
            min,
            max,
        }
    }
}

/// Ticks at the fractions `k/5` of the color maximum, labelled `0%` to `100%`
///
/// On a linear scale the ticks sit at `k/5·max` and those below `min` are
/// dropped, so a symmetric range is only ticked on its positive half.
/// On a logarithmic scale `max` is a decade exponent and the ticks sit at
/// `max + log10(k/5)`, raised to `min` when below it; the `0%` tick is
/// `min`.
pub fn relative_ticks(min: f64, max: f64, logarithmic: bool) -> Vec<Tick> {
    (0..=RELATIVE_INTERVALS)
        .map(|k| {
            let n = RELATIVE_INTERVALS as f64;
            let value = if logarithmic {
                (max + (k as f64 / n).log10()).max(min)
            } else {
                k as f64 * max / n
            };
            Tick {
                value,
                label: format!("{}%", k * 100 / RELATIVE_INTERVALS),
            }
        })
        .filter(|tick| tick.value >= min)
        .collect()
}

/// Ticks on multiples of 1, 2 or 5 times a power of 10 within `[min,max]`
pub fn native_ticks(min: f64, max: f64) -> Vec<Tick> {
    let span = max - min;
    if !(span > 0f64 && span.is_finite()) {
        return vec![Tick {
            value: min,
            label: format!("{}", min),
        }];
    }
    let raw = span / RELATIVE_INTERVALS as f64;
    let magnitude = 10f64.powf(raw.log10().floor());
    let step = [1f64, 2f64, 5f64, 10f64]
        .into_iter()
        .map(|m| m * magnitude)
        .find(|&step| step >= raw * (1f64 - 1e-9))
        .unwrap_or(10f64 * magnitude);
    let precision = (-step.log10().floor()).max(0f64) as usize;
    let first = (min / step - 1e-9).ceil() as i64;
    let last = (max / step + 1e-9).floor() as i64;
    (first..=last)
        .map(|i| {
            let value = i as f64 * step;
            Tick {
                value,
                label: format!("{:.*}", precision, value),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn relative_colorbar_at_half_ceiling() {
        let ticks = relative_ticks(0.0, 50.0, false);
        let values: Vec<_> = ticks.iter().map(|t| t.value).collect();
        assert_eq!(values, vec![0.0, 10.0, 20.0, 30.0, 40.0, 50.0]);
        let labels: Vec<_> = ticks.iter().map(|t| t.label.as_str()).collect();
        assert_eq!(labels, vec!["0%", "20%", "40%", "60%", "80%", "100%"]);
    }

    #[test]
    fn relative_ticks_ignore_a_negative_minimum() {
        let values: Vec<_> = relative_ticks(-5.0, 5.0, false)
            .into_iter()
            .map(|t| t.value)
            .collect();
        assert_eq!(values, vec![0.0, 1.0, 2.0, 3.0, 4.0, 5.0]);
        let ticks = relative_ticks(2.0, 10.0, false);
        let values: Vec<_> = ticks.iter().map(|t| t.value).collect();
        assert_eq!(values, vec![2.0, 4.0, 6.0, 8.0, 10.0]);
        assert_eq!(ticks[0].label, "20%");
    }

    #[test]
    fn logarithmic_relative_ticks() {
        let ticks = relative_ticks(-38.0, 2.0, true);
        assert_eq!(ticks[0].value, -38.0);
        assert_eq!(ticks[5].value, 2.0);
        assert!((ticks[1].value - (2.0 + 0.2f64.log10())).abs() < 1e-12);
        assert!((ticks[4].value - (2.0 + 0.8f64.log10())).abs() < 1e-12);
        assert!(ticks.windows(2).all(|w| w[0].value < w[1].value));
        // a narrow range clamps the low ticks onto the minimum
        let ticks = relative_ticks(1.8, 2.0, true);
        assert_eq!(ticks[1].value, 1.8);
        assert_eq!(ticks[5].value, 2.0);
    }

    #[test]
    fn native_steps() {
        let labels = |min, max| -> Vec<String> {
            native_ticks(min, max).into_iter().map(|t| t.label).collect()
        };
        assert_eq!(labels(0.0, 1.0), vec!["0.0", "0.2", "0.4", "0.6", "0.8", "1.0"]);
        assert_eq!(labels(-5.0, 5.0), vec!["-4", "-2", "0", "2", "4"]);
        assert_eq!(labels(-38.0, 2.0), vec!["-30", "-20", "-10", "0"]);
        assert_eq!(native_ticks(3.0, 3.0).len(), 1);
    }
}
