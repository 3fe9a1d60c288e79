//! Value to color mapping for density grids and recommendation markers.

use crate::{GeoError, Result};
use serde::Serialize;

/// Five-band ramp for hexagon density, low to high.
pub const DENSITY_COLORS: [&str; 5] = ["#0571b0", "#6baed6", "#74c476", "#fd8d3c", "#de2d26"];

/// Five-step sequential palette for [`ColorScale`].
pub const SCALE_COLORS: [&str; 5] = ["#ffffb2", "#fecc5c", "#fd8d3c", "#f03b20", "#bd0026"];

/// Band upper bounds (exclusive) for [`DENSITY_COLORS`]; the last band is open.
const DENSITY_THRESHOLDS: [f64; 4] = [0.2, 0.4, 0.6, 0.8];

/// Maps `value / max_value` (clamped to [0, 1]) onto [`DENSITY_COLORS`].
///
/// Infinite values clamp to the end bands. A NaN value has no band and is an
/// [`GeoError::InvalidScale`] error, as is a non-positive or non-finite `max_value`.
///
/// # Example
/// ```
/// use infraplan_geo::color_for_value;
///
/// assert_eq!(color_for_value(0.0, 100.0).unwrap(), "#0571b0");
/// assert_eq!(color_for_value(100.0, 100.0).unwrap(), "#de2d26");
/// assert!(color_for_value(1.0, 0.0).is_err());
/// ```
pub fn color_for_value(value: f64, max_value: f64) -> Result<&'static str> {
    if !max_value.is_finite() || max_value <= 0.0 {
        return Err(GeoError::InvalidScale(format!(
            "max value must be positive, got {max_value}"
        )));
    }

    if value.is_nan() {
        return Err(GeoError::InvalidScale("value is NaN".to_string()));
    }

    let ratio = (value / max_value).clamp(0.0, 1.0);
    let band = DENSITY_THRESHOLDS
        .iter()
        .position(|t| ratio < *t)
        .unwrap_or(DENSITY_THRESHOLDS.len());
    Ok(DENSITY_COLORS[band])
}

/// Linear scale over `[min, max]` onto [`SCALE_COLORS`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ColorScale {
    min: f64,
    max: f64,
}

impl ColorScale {
    pub fn new(min: f64, max: f64) -> Result<Self> {
        if !min.is_finite() || !max.is_finite() {
            return Err(GeoError::InvalidScale(format!(
                "bounds must be finite, got [{min}, {max}]"
            )));
        }
        if min > max {
            return Err(GeoError::InvalidScale(format!(
                "min ({min}) is greater than max ({max})"
            )));
        }
        Ok(Self { min, max })
    }

    pub fn min(&self) -> f64 {
        self.min
    }

    pub fn max(&self) -> f64 {
        self.max
    }

    pub fn color(&self, value: f64) -> &'static str {
        let last = SCALE_COLORS.len() - 1;
        if value <= self.min {
            return SCALE_COLORS[0];
        }
        if value >= self.max {
            return SCALE_COLORS[last];
        }
        let norm = (value - self.min) / (self.max - self.min);
        let idx = (norm * SCALE_COLORS.len() as f64).floor() as usize;
        SCALE_COLORS[idx.min(last)]
    }
}

/// Closure form of [`ColorScale`].
pub fn color_scale(min: f64, max: f64) -> Result<impl Fn(f64) -> &'static str> {
    let scale = ColorScale::new(min, max)?;
    Ok(move |value| scale.color(value))
}

/// Marker color for a recommendation score in [0, 1].
pub fn score_color(score: f64) -> &'static str {
    if score > 0.9 {
        "#4CAF50"
    } else if score > 0.8 {
        "#8BC34A"
    } else if score > 0.7 {
        "#FFC107"
    } else {
        "#FF9800"
    }
}

/// One row of a density legend: `[min, max)` rendered in `color`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LegendEntry {
    pub min: f64,
    pub max: f64,
    pub color: &'static str,
}

/// Population ranges matching the bands of [`color_for_value`].
pub fn legend_breaks(max_value: f64) -> Result<Vec<LegendEntry>> {
    if !max_value.is_finite() || max_value <= 0.0 {
        return Err(GeoError::InvalidScale(format!(
            "max value must be positive, got {max_value}"
        )));
    }

    let mut lower = 0.0;
    Ok(DENSITY_COLORS
        .iter()
        .enumerate()
        .map(|(i, color)| {
            let upper = DENSITY_THRESHOLDS
                .get(i)
                .map_or(max_value, |t| t * max_value);
            let entry = LegendEntry {
                min: lower,
                max: upper,
                color: *color,
            };
            lower = upper;
            entry
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_density_bands() {
        assert_eq!(color_for_value(0.0, 100.0).unwrap(), DENSITY_COLORS[0]);
        assert_eq!(color_for_value(19.9, 100.0).unwrap(), DENSITY_COLORS[0]);
        assert_eq!(color_for_value(20.0, 100.0).unwrap(), DENSITY_COLORS[1]);
        assert_eq!(color_for_value(50.0, 100.0).unwrap(), DENSITY_COLORS[2]);
        assert_eq!(color_for_value(79.9, 100.0).unwrap(), DENSITY_COLORS[3]);
        assert_eq!(color_for_value(100.0, 100.0).unwrap(), DENSITY_COLORS[4]);
    }

    #[test]
    fn test_density_clamps() {
        assert_eq!(color_for_value(-5.0, 100.0).unwrap(), DENSITY_COLORS[0]);
        assert_eq!(color_for_value(500.0, 100.0).unwrap(), DENSITY_COLORS[4]);
        assert_eq!(color_for_value(f64::INFINITY, 100.0).unwrap(), DENSITY_COLORS[4]);
        assert_eq!(color_for_value(f64::NEG_INFINITY, 100.0).unwrap(), DENSITY_COLORS[0]);
    }

    #[test]
    fn test_density_rejects_bad_max() {
        assert!(matches!(
            color_for_value(1.0, 0.0),
            Err(GeoError::InvalidScale(_))
        ));
        assert!(color_for_value(1.0, -1.0).is_err());
        assert!(color_for_value(1.0, f64::INFINITY).is_err());
    }

    #[test]
    fn test_density_rejects_nan_value() {
        assert!(matches!(
            color_for_value(f64::NAN, 100.0),
            Err(GeoError::InvalidScale(_))
        ));
    }

    #[test]
    fn test_scale_endpoints() {
        let scale = ColorScale::new(10.0, 60.0).unwrap();
        assert_eq!(scale.color(0.0), "#ffffb2");
        assert_eq!(scale.color(10.0), "#ffffb2");
        assert_eq!(scale.color(60.0), "#bd0026");
        assert_eq!(scale.color(1e9), "#bd0026");
    }

    #[test]
    fn test_scale_steps() {
        let scale = ColorScale::new(0.0, 100.0).unwrap();
        assert_eq!(scale.color(19.0), SCALE_COLORS[0]);
        assert_eq!(scale.color(21.0), SCALE_COLORS[1]);
        assert_eq!(scale.color(50.0), SCALE_COLORS[2]);
        assert_eq!(scale.color(99.9), SCALE_COLORS[4]);
    }

    #[test]
    fn test_scale_degenerate_range() {
        let scale = ColorScale::new(5.0, 5.0).unwrap();
        assert_eq!(scale.color(4.0), SCALE_COLORS[0]);
        assert_eq!(scale.color(5.0), SCALE_COLORS[0]);
        assert_eq!(scale.color(6.0), SCALE_COLORS[4]);
    }

    #[test]
    fn test_scale_rejects_inverted_bounds() {
        assert!(ColorScale::new(10.0, 1.0).is_err());
        assert!(ColorScale::new(f64::NAN, 1.0).is_err());
        assert!(color_scale(3.0, 2.0).is_err());
    }

    #[test]
    fn test_color_scale_closure() {
        let f = color_scale(0.0, 1.0).unwrap();
        assert_eq!(f(0.0), "#ffffb2");
        assert_eq!(f(1.0), "#bd0026");
    }

    #[test]
    fn test_score_color() {
        assert_eq!(score_color(0.95), "#4CAF50");
        assert_eq!(score_color(0.85), "#8BC34A");
        assert_eq!(score_color(0.75), "#FFC107");
        assert_eq!(score_color(0.7), "#FF9800");
        assert_eq!(score_color(0.1), "#FF9800");
    }

    #[test]
    fn test_legend_breaks() {
        let legend = legend_breaks(1000.0).unwrap();
        assert_eq!(legend.len(), 5);
        assert_eq!(legend[0].min, 0.0);
        assert_eq!(legend[0].max, 200.0);
        assert_eq!(legend[4].min, 800.0);
        assert_eq!(legend[4].max, 1000.0);
        for entry in &legend {
            let mid = (entry.min + entry.max) / 2.0;
            assert_eq!(color_for_value(mid, 1000.0).unwrap(), entry.color);
        }
        assert!(legend_breaks(0.0).is_err());
    }
}
