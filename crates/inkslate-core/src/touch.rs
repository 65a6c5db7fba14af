//! Touch contact classification.
//!
//! A stylus tip reports a small, consistent contact ellipse, a resting palm a
//! much larger one. Comparing each contact against a calibrated mean lets one
//! input stream serve both drawing and palm erasing.

use kurbo::Size;
use serde::{Deserialize, Serialize};

/// Number of samples collected during calibration.
pub const CALIBRATION_SAMPLES: u32 = 50;

/// Area-like scalar of a contact ellipse: `width² + height²`.
pub fn point_size(contact: Size) -> f64 {
    contact.width * contact.width + contact.height * contact.height
}

/// Classification of a contact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ContactClass {
    /// A stylus or fingertip.
    Normal,
    /// Larger than `mean * big_factor`: treated as a palm, erases with the small eraser.
    Big,
    /// Larger than `mean * very_big_factor`: erases with the large eraser.
    VeryBig,
}

/// Running-mean calibration of pointer contact size.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TouchClassifier {
    mean_size: f64,
    samples: u32,
    big_factor: f64,
    very_big_factor: f64,
    calibrating: bool,
}

impl TouchClassifier {
    /// Create a classifier seeded with a persisted mean.
    pub fn new(mean_size: f64, big_factor: f64, very_big_factor: f64) -> Self {
        Self {
            mean_size,
            samples: 0,
            big_factor,
            very_big_factor,
            calibrating: false,
        }
    }

    pub fn mean_size(&self) -> f64 {
        self.mean_size
    }

    pub fn sample_count(&self) -> u32 {
        self.samples
    }

    pub fn is_calibrating(&self) -> bool {
        self.calibrating
    }

    /// Reset mean and sample count and start collecting.
    pub fn start_calibration(&mut self) {
        log::info!("Touch calibration started");
        self.calibrating = true;
        self.samples = 0;
        self.mean_size = 0.0;
    }

    /// Feed one contact sample.
    ///
    /// Returns the final mean exactly once, when the last sample completes
    /// calibration. Outside calibration samples are ignored.
    pub fn add_sample(&mut self, size: f64) -> Option<f64> {
        if !self.calibrating {
            return None;
        }
        let count = f64::from(self.samples);
        self.mean_size = (self.mean_size * count + size) / (count + 1.0);
        self.samples += 1;
        if self.samples >= CALIBRATION_SAMPLES {
            self.calibrating = false;
            log::info!("Touch calibration finished: mean contact size {:.1}", self.mean_size);
            return Some(self.mean_size);
        }
        None
    }

    /// Palm heuristic. Always false while calibrating.
    pub fn is_big_point(&self, size: f64) -> bool {
        !self.calibrating && size > self.mean_size * self.big_factor
    }

    /// Always false while calibrating.
    pub fn is_very_big_point(&self, size: f64) -> bool {
        !self.calibrating && size > self.mean_size * self.very_big_factor
    }

    pub fn classify(&self, size: f64) -> ContactClass {
        if self.is_very_big_point(size) {
            ContactClass::VeryBig
        } else if self.is_big_point(size) {
            ContactClass::Big
        } else {
            ContactClass::Normal
        }
    }
}

impl Default for TouchClassifier {
    fn default() -> Self {
        Self::new(1500.0, 3.0, 6.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_point_size() {
        assert!((point_size(Size::new(3.0, 4.0)) - 25.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_thresholds() {
        let classifier = TouchClassifier::new(100.0, 3.0, 6.0);
        assert_eq!(classifier.classify(250.0), ContactClass::Normal);
        assert_eq!(classifier.classify(300.0), ContactClass::Normal);
        assert_eq!(classifier.classify(301.0), ContactClass::Big);
        assert_eq!(classifier.classify(601.0), ContactClass::VeryBig);
    }

    #[test]
    fn test_constant_samples_keep_mean() {
        let mut classifier = TouchClassifier::default();
        classifier.start_calibration();
        for k in 1..CALIBRATION_SAMPLES {
            assert_eq!(classifier.add_sample(42.0), None);
            assert!((classifier.mean_size() - 42.0).abs() < 1e-9, "after {k} samples");
        }
        assert!(classifier.is_calibrating());
    }

    #[test]
    fn test_calibration_finishes_once() {
        let mut classifier = TouchClassifier::default();
        classifier.start_calibration();
        let results: Vec<f64> = (0..CALIBRATION_SAMPLES + 10)
            .filter_map(|i| classifier.add_sample(f64::from(i % 2) * 20.0 + 10.0))
            .collect();
        assert_eq!(results.len(), 1);
        assert!((results[0] - 20.0).abs() < 1e-9);
        assert!(!classifier.is_calibrating());
        assert_eq!(classifier.sample_count(), CALIBRATION_SAMPLES);
    }

    #[test]
    fn test_no_big_points_while_calibrating() {
        let mut classifier = TouchClassifier::new(1.0, 1.0, 1.0);
        classifier.start_calibration();
        for size in [0.0, 10.0, 1e9, f64::MAX] {
            assert!(!classifier.is_big_point(size));
            assert!(!classifier.is_very_big_point(size));
        }
    }
}
