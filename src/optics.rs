//! Gaussian beam optics.
//!
//! Closed-form steady-state field model: beam waist and relative intensity as
//! a function of axial and radial position. Nothing here integrates over
//! time; the field is evaluated on demand and the same inputs always produce
//! the same outputs.

use crate::error::{Error, Result};

/// A Gaussian beam focused at the origin of its own axis.
///
/// Immutable after construction. Sampling is pure and reentrant, so one beam
/// can drive any number of surface and particle generators.
#[derive(Debug, Clone, Copy)]
pub struct GaussianBeam {
    waist0: f32,
    rayleigh_length: f32,
}

impl GaussianBeam {
    /// Create a beam from its focus waist radius and wavelength.
    ///
    /// Both must be finite and strictly positive.
    pub fn new(waist0: f32, wavelength: f32) -> Result<Self> {
        if !waist0.is_finite() || waist0 <= 0.0 {
            return Err(Error::invalid(format!(
                "beam waist must be finite and > 0, got {waist0}"
            )));
        }
        if !wavelength.is_finite() || wavelength <= 0.0 {
            return Err(Error::invalid(format!(
                "wavelength must be finite and > 0, got {wavelength}"
            )));
        }

        Ok(Self {
            waist0,
            rayleigh_length: std::f32::consts::PI * waist0 * waist0 / wavelength,
        })
    }

    /// Waist radius at the focus.
    pub fn waist0(&self) -> f32 {
        self.waist0
    }

    /// Distance over which the waist grows by a factor of sqrt(2).
    pub fn rayleigh_length(&self) -> f32 {
        self.rayleigh_length
    }

    /// Beam radius at axial position `z`.
    ///
    /// Returns `waist0` exactly at the focus; grows monotonically with `|z|`.
    pub fn waist(&self, z: f32) -> f32 {
        if z == 0.0 {
            return self.waist0;
        }

        let q = z / self.rayleigh_length;
        self.waist0 * (1.0 + q * q).sqrt()
    }

    /// Relative intensity at radial offset `r` and axial position `z`.
    ///
    /// In `(0, 1]`, reaching 1 only on the axis at the focus. Strictly
    /// decreasing in `|r|` for fixed `z`, and in `|z|` for fixed `r > 0`.
    pub fn intensity(&self, r: f32, z: f32) -> f32 {
        let w0 = self.waist(0.0);
        let wz = self.waist(z);

        let ratio = w0 / wz;
        let radial = r / wz;

        ratio * ratio * (-2.0 * radial * radial).exp()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn beam() -> GaussianBeam {
        GaussianBeam::new(2e-2, 1000e-9).unwrap()
    }

    #[test]
    fn test_rejects_non_positive_parameters() {
        assert!(GaussianBeam::new(0.0, 1e-6).is_err());
        assert!(GaussianBeam::new(-1.0, 1e-6).is_err());
        assert!(GaussianBeam::new(1e-2, 0.0).is_err());
        assert!(GaussianBeam::new(1e-2, -1e-9).is_err());
        assert!(GaussianBeam::new(f32::NAN, 1e-6).is_err());
        assert!(GaussianBeam::new(1e-2, f32::INFINITY).is_err());
    }

    #[test]
    fn test_waist_at_focus_is_exact() {
        let b = beam();
        assert_eq!(b.waist(0.0), 2e-2);
    }

    #[test]
    fn test_waist_grows_with_axial_distance() {
        let b = beam();
        let z0 = b.rayleigh_length();

        assert!(b.waist(z0 * 0.5) > b.waist0());
        assert!(b.waist(z0) > b.waist(z0 * 0.5));
        assert!(b.waist(-z0) > b.waist0());

        // One Rayleigh length out, the waist is exactly sqrt(2) larger.
        let expected = b.waist0() * 2.0_f32.sqrt();
        assert!((b.waist(z0) - expected).abs() < 1e-6);
    }

    #[test]
    fn test_intensity_peak_is_exactly_one() {
        let b = beam();
        assert_eq!(b.intensity(0.0, 0.0), 1.0);
    }

    #[test]
    fn test_intensity_decreases_radially() {
        let b = beam();
        let mut prev = b.intensity(0.0, 0.0);

        for i in 1..10 {
            let r = i as f32 * 5e-3;
            let current = b.intensity(r, 0.0);
            assert!(current < prev, "intensity must fall as r grows");
            assert!(current > 0.0);
            prev = current;
        }
    }

    #[test]
    fn test_intensity_decreases_axially_off_axis() {
        let b = beam();
        let r = 1e-2;
        let z0 = b.rayleigh_length();
        let mut prev = b.intensity(r, 0.0);

        for i in 1..10 {
            let z = i as f32 * 0.3 * z0;
            let current = b.intensity(r, z);
            assert!(current < prev, "intensity must fall as |z| grows");
            prev = current;
        }
    }

    #[test]
    fn test_intensity_at_one_waist_radius() {
        // At r = waist0, z = 0 the relative intensity is
        // exp(-2), comfortably below one half.
        let b = beam();
        let i = b.intensity(0.02, 0.0);
        assert!(i < 0.5);
        assert!((i - (-2.0f32).exp()).abs() < 1e-6);
    }
}
