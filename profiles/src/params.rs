//! Accuracy and rendering-fidelity configuration.
//!
//! A single read-only bundle controls every accuracy trade-off in the
//! profile core. Profiles hold it through `Arc`, and the per-family
//! Info caches key on its exact bit pattern: two parameter sets that
//! differ in any bit are different cache keys, while bit-identical sets
//! share Info objects.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::ProfileError;

/// Accuracy parameters shared by every profile depending on them.
///
/// All fields are strictly positive; the thresholds are fractions and
/// must stay below one. See [`AccuracyParams::validate`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AccuracyParams {
    /// Fractional flux allowed to fold past the image edge when the
    /// profile is rendered through an FFT; drives the stepK derivation.
    pub folding_threshold: f64,

    /// Fourier amplitude (relative to total flux) below which high
    /// frequencies are truncated; drives the maxK derivation.
    pub maxk_threshold: f64,

    /// Half-light-radius multiple defining the stepK floor: stepK is
    /// kept at or above π / (stepk_minimum_hlr · half-light radius), so
    /// compact profiles with extended wings do not force arbitrarily
    /// fine Fourier sampling.
    pub stepk_minimum_hlr: f64,

    /// Fractional flux allowed to be missed by photon shooting; sets
    /// the outer radius of the sampling support.
    pub shoot_accuracy: f64,

    /// Target absolute interpolation accuracy for eagerly built lookup
    /// tables (second-kick radial and Fourier tables).
    pub table_accuracy: f64,

    /// Absolute tolerance for flux-radius root finds.
    pub solver_tolerance: f64,
}

impl Default for AccuracyParams {
    fn default() -> Self {
        Self {
            folding_threshold: 5.0e-3,
            maxk_threshold: 1.0e-3,
            stepk_minimum_hlr: 5.0,
            shoot_accuracy: 1.0e-5,
            table_accuracy: 1.0e-5,
            solver_tolerance: 1.0e-9,
        }
    }
}

impl AccuracyParams {
    /// A shared handle to the default parameter set.
    pub fn shared_default() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Check every field for validity.
    ///
    /// Thresholds must lie in (0, 1); the stepK multiplier and the
    /// solver tolerance just need to be positive and finite.
    pub fn validate(&self) -> Result<(), ProfileError> {
        let fractions = [
            ("folding_threshold", self.folding_threshold),
            ("maxk_threshold", self.maxk_threshold),
            ("shoot_accuracy", self.shoot_accuracy),
            ("table_accuracy", self.table_accuracy),
        ];
        for (name, value) in fractions {
            if !(value > 0.0 && value < 1.0) {
                return Err(ProfileError::InvalidAccuracy {
                    name,
                    value,
                    requirement: "a fraction in (0, 1)",
                });
            }
        }
        let positives = [
            ("stepk_minimum_hlr", self.stepk_minimum_hlr),
            ("solver_tolerance", self.solver_tolerance),
        ];
        for (name, value) in positives {
            if !(value > 0.0 && value.is_finite()) {
                return Err(ProfileError::InvalidAccuracy {
                    name,
                    value,
                    requirement: "positive and finite",
                });
            }
        }
        Ok(())
    }

    /// Bit-exact cache key for this parameter set.
    pub fn key(&self) -> ParamsKey {
        ParamsKey([
            self.folding_threshold.to_bits(),
            self.maxk_threshold.to_bits(),
            self.stepk_minimum_hlr.to_bits(),
            self.shoot_accuracy.to_bits(),
            self.table_accuracy.to_bits(),
            self.solver_tolerance.to_bits(),
        ])
    }
}

/// Hashable, bit-exact identity of an [`AccuracyParams`] value.
///
/// Derived from `f64::to_bits` of every field, so cache keys follow the
/// "bit-identical parameters share an Info" contract exactly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ParamsKey([u64; 6]);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_validate() {
        AccuracyParams::default().validate().unwrap();
    }

    #[test]
    fn test_invalid_fraction_rejected() {
        let params = AccuracyParams {
            folding_threshold: 1.5,
            ..Default::default()
        };
        assert!(matches!(
            params.validate(),
            Err(ProfileError::InvalidAccuracy { name: "folding_threshold", .. })
        ));

        let params = AccuracyParams {
            shoot_accuracy: 0.0,
            ..Default::default()
        };
        assert!(params.validate().is_err());
    }

    #[test]
    fn test_invalid_multiplier_rejected() {
        let params = AccuracyParams {
            stepk_minimum_hlr: f64::NAN,
            ..Default::default()
        };
        assert!(params.validate().is_err());
    }

    #[test]
    fn test_key_is_bit_exact() {
        let a = AccuracyParams::default();
        let b = AccuracyParams::default();
        assert_eq!(a.key(), b.key());

        let c = AccuracyParams {
            folding_threshold: 5.0e-3 + 1e-19,
            ..Default::default()
        };
        // Tiny perturbations below f64 resolution collapse to the same key…
        assert_eq!(a.key(), c.key());

        let d = AccuracyParams {
            folding_threshold: 6.0e-3,
            ..Default::default()
        };
        // …while representable differences produce distinct keys.
        assert_ne!(a.key(), d.key());
    }

    #[test]
    fn test_serde_round_trip() {
        let params = AccuracyParams {
            maxk_threshold: 2.0e-4,
            ..Default::default()
        };
        let json = serde_json::to_string(&params).unwrap();
        let back: AccuracyParams = serde_json::from_str(&json).unwrap();
        assert_eq!(params, back);
        assert_eq!(params.key(), back.key());
    }

    #[test]
    fn test_serde_fills_missing_fields() {
        let params: AccuracyParams = serde_json::from_str(r#"{"maxk_threshold": 1e-4}"#).unwrap();
        assert_eq!(params.maxk_threshold, 1e-4);
        assert_eq!(params.folding_threshold, AccuracyParams::default().folding_threshold);
    }
}
