//! Easing functions for animation interpolation.
//!
//! Provides the motion profiles used by the camera loops: linear for
//! zoom and world-coordinate tweening, decelerate for inertial flings,
//! accelerate-decelerate for rotation and pixel panning.

/// Easing function variants for animation curves.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EasingFunction {
    /// Linear interpolation (no easing).
    Linear,
    /// Quadratic ease-out (fast start decaying to zero speed).
    /// Formula: 1 - (1-t)²
    Decelerate,
    /// Symmetric ease-in/ease-out.
    /// Formula: cos((t+1)·π)/2 + 0.5
    AccelerateDecelerate,
}

impl EasingFunction {
    /// Default easing for camera motion: symmetric ease-in/ease-out.
    pub const DEFAULT: EasingFunction = EasingFunction::AccelerateDecelerate;

    /// Evaluate the easing function at time t.
    ///
    /// Input t is clamped to [0.0, 1.0].
    /// Returns the eased value, also in [0.0, 1.0].
    #[inline]
    #[must_use]
    pub fn evaluate(&self, t: f32) -> f32 {
        let t = t.clamp(0.0, 1.0);

        match self {
            EasingFunction::Linear => t,
            EasingFunction::Decelerate => {
                let omt = 1.0 - t;
                1.0 - omt * omt
            }
            EasingFunction::AccelerateDecelerate => {
                ((t + 1.0) * std::f32::consts::PI).cos() / 2.0 + 0.5
            }
        }
    }
}

impl Default for EasingFunction {
    #[inline]
    fn default() -> Self {
        Self::DEFAULT
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_linear_endpoints() {
        let linear = EasingFunction::Linear;
        assert_eq!(linear.evaluate(0.0), 0.0);
        assert_eq!(linear.evaluate(0.5), 0.5);
        assert_eq!(linear.evaluate(1.0), 1.0);
    }

    #[test]
    fn test_decelerate_endpoints() {
        let dec = EasingFunction::Decelerate;
        assert_eq!(dec.evaluate(0.0), 0.0);
        assert_eq!(dec.evaluate(0.5), 0.75); // 1 - (1-0.5)² = 0.75
        assert_eq!(dec.evaluate(1.0), 1.0);
    }

    #[test]
    fn test_decelerate_shape() {
        // Ease-out: early progress should outrun linear
        let dec = EasingFunction::Decelerate;
        let result_at_quarter = dec.evaluate(0.25);
        assert!(
            result_at_quarter > 0.25,
            "Decelerate should have value > 0.25 at t=0.25, got {}",
            result_at_quarter
        );
    }

    #[test]
    fn test_accelerate_decelerate_endpoints() {
        let ad = EasingFunction::AccelerateDecelerate;
        assert!(ad.evaluate(0.0).abs() < 1e-6);
        assert!((ad.evaluate(0.5) - 0.5).abs() < 1e-6);
        assert!((ad.evaluate(1.0) - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_accelerate_decelerate_shape() {
        // Ease-in/out: slow start, slow finish, symmetric about 0.5
        let ad = EasingFunction::AccelerateDecelerate;
        assert!(ad.evaluate(0.25) < 0.25);
        assert!(ad.evaluate(0.75) > 0.75);
        let a = ad.evaluate(0.3);
        let b = 1.0 - ad.evaluate(0.7);
        assert!((a - b).abs() < 1e-6, "curve not symmetric: {} vs {}", a, b);
    }

    #[test]
    fn test_input_clamping() {
        for f in [
            EasingFunction::Linear,
            EasingFunction::Decelerate,
            EasingFunction::AccelerateDecelerate,
        ] {
            assert!(f.evaluate(-0.5).abs() < 1e-6);
            assert!((f.evaluate(1.5) - 1.0).abs() < 1e-6);
        }
    }

    #[test]
    fn test_monotonic() {
        // All curves must be non-decreasing over [0, 1]
        for f in [
            EasingFunction::Linear,
            EasingFunction::Decelerate,
            EasingFunction::AccelerateDecelerate,
        ] {
            let mut prev = 0.0f32;
            for i in 0..=100 {
                let v = f.evaluate(i as f32 / 100.0);
                assert!(v >= prev - 1e-6, "{:?} decreased at step {}", f, i);
                prev = v;
            }
        }
    }

    #[test]
    fn test_default_is_accelerate_decelerate() {
        assert_eq!(
            EasingFunction::default(),
            EasingFunction::AccelerateDecelerate
        );
    }
}
