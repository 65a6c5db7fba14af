//! Persisted board configuration.

use crate::error::CanvasError;
use crate::style::{Palette, PenColor};
use serde::{Deserialize, Serialize};

/// Pen, touch calibration and theme settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BoardSettings {
    pub pen_color: PenColor,
    pub pen_width: f64,
    /// Mean contact size learned by calibration.
    pub calibrated_size: f64,
    pub big_point_factor: f64,
    pub very_big_point_factor: f64,
    pub dark_mode: bool,
}

impl Default for BoardSettings {
    fn default() -> Self {
        Self {
            pen_color: PenColor::Foreground,
            pen_width: 3.0,
            calibrated_size: 1500.0,
            big_point_factor: 3.0,
            very_big_point_factor: 6.0,
            dark_mode: false,
        }
    }
}

impl BoardSettings {
    /// Check ranges. Factors must grow from big to very big.
    pub fn validate(&self) -> Result<(), CanvasError> {
        let positive = [
            ("pen_width", self.pen_width),
            ("calibrated_size", self.calibrated_size),
            ("big_point_factor", self.big_point_factor),
            ("very_big_point_factor", self.very_big_point_factor),
        ];
        for (key, value) in positive {
            if !(value.is_finite() && value > 0.0) {
                return Err(CanvasError::InvalidSetting {
                    key,
                    reason: format!("must be a positive number, got {value}"),
                });
            }
        }
        if self.very_big_point_factor < self.big_point_factor {
            return Err(CanvasError::InvalidSetting {
                key: "very_big_point_factor",
                reason: format!("must not be below big_point_factor ({})", self.big_point_factor),
            });
        }
        Ok(())
    }

    /// Copy with a new calibration result.
    pub fn with_calibrated_size(mut self, mean: f64) -> Self {
        self.calibrated_size = mean;
        self
    }

    pub fn palette(&self) -> Palette {
        if self.dark_mode { Palette::dark() } else { Palette::light() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        assert_eq!(BoardSettings::default().validate(), Ok(()));
    }

    #[test]
    fn test_rejects_bad_values() {
        let settings = BoardSettings {
            pen_width: 0.0,
            ..Default::default()
        };
        assert!(matches!(
            settings.validate(),
            Err(CanvasError::InvalidSetting { key: "pen_width", .. })
        ));

        let settings = BoardSettings {
            very_big_point_factor: 2.0,
            ..Default::default()
        };
        assert!(matches!(
            settings.validate(),
            Err(CanvasError::InvalidSetting {
                key: "very_big_point_factor",
                ..
            })
        ));
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let settings: BoardSettings = serde_json::from_str(r#"{"pen_width": 5.0}"#).unwrap();
        assert!((settings.pen_width - 5.0).abs() < f64::EPSILON);
        assert!((settings.calibrated_size - 1500.0).abs() < f64::EPSILON);
        assert_eq!(settings.pen_color, PenColor::Foreground);
    }
}
