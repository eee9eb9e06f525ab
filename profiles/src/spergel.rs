//! The Spergel surface-brightness profile family.
//!
//! Spergel (2010) profiles have the radial shape
//!
//! ```text
//! I(r) ∝ (r/r0)^ν · K_ν(r/r0)
//! ```
//!
//! with index ν controlling the concentration (ν = 0.5 matches an
//! exponential disc reasonably well; larger ν is steeper in the core)
//! and the closed-form Fourier transform (1 + k²r0²)^(−1−ν), which is
//! what makes the family attractive for fitting and convolution work.
//!
//! [`SpergelInfo`] holds everything that depends only on ν and the
//! accuracy parameters, in scale-radius units: the half-light radius,
//! the Fourier sampling bounds and the photon sampler. Infos are shared
//! through a process-wide LRU cache. [`Spergel`] is the thin instance
//! wrapper applying a physical scale radius and flux.

use std::f64::consts::PI;
use std::fmt;
use std::sync::Arc;

use log::debug;
use once_cell::sync::{Lazy, OnceCell};
use rand::Rng;

use profile_math::{bessel_k, find_root, gamma, Method, OneDimensionalDeviate, PhotonArray};

use crate::cache::InfoCache;
use crate::error::ProfileError;
use crate::params::{AccuracyParams, ParamsKey};

/// Supported Spergel index range. Below -0.85 the central cusp becomes
/// too steep to shoot photons from; above 4 the numerics of the flux
/// bracket have not been validated.
pub const MIN_SPERGEL_NU: f64 = -0.85;
pub const MAX_SPERGEL_NU: f64 = 4.0;

/// Bracket for flux-radius solves, in scale-radius units. Contains
/// every flux radius this module requests (fractions from 0.5 up to
/// 1 − shoot_accuracy) over the whole supported ν range.
const FLUX_RADIUS_BRACKET: (f64, f64) = (1.0e-3, 25.0);

/// Capacity of the shared Info cache.
const MAX_SPERGEL_CACHE: usize = 100;

#[derive(Clone, PartialEq, Eq, Hash)]
struct SpergelKey {
    nu_bits: u64,
    params: ParamsKey,
}

static SPERGEL_CACHE: Lazy<InfoCache<SpergelKey, SpergelInfo>> =
    Lazy::new(|| InfoCache::new(MAX_SPERGEL_CACHE));

/// Fetch the shared Info for `(nu, params)`, constructing at most once.
fn spergel_info(
    nu: f64,
    params: &Arc<AccuracyParams>,
) -> Result<Arc<SpergelInfo>, ProfileError> {
    let key = SpergelKey {
        nu_bits: nu.to_bits(),
        params: params.key(),
    };
    SPERGEL_CACHE.get_or_build(&key, || SpergelInfo::new(nu, params.clone()))
}

/// Shape-parameter-level state of a Spergel profile, in scale-radius
/// units with unit total flux.
///
/// Not cloneable: Infos are owned by the cache and shared by reference
/// through `Arc`. Derived scalars are computed lazily, at most once,
/// and are safe to race on (the underlying computation is a pure
/// function of immutable inputs).
pub struct SpergelInfo {
    nu: f64,
    params: Arc<AccuracyParams>,
    gamma_nup1: f64,
    gamma_nup2: f64,
    hlr: OnceCell<f64>,
    stepk: OnceCell<f64>,
    maxk: OnceCell<f64>,
    sampler: OnceCell<OneDimensionalDeviate>,
}

impl SpergelInfo {
    /// Construct for index `nu`. Validates the index range eagerly.
    fn new(nu: f64, params: Arc<AccuracyParams>) -> Result<Self, ProfileError> {
        if !(MIN_SPERGEL_NU..=MAX_SPERGEL_NU).contains(&nu) {
            return Err(ProfileError::InvalidParameter {
                family: "Spergel",
                parameter: "nu",
                value: nu,
                min: MIN_SPERGEL_NU,
                max: MAX_SPERGEL_NU,
            });
        }
        debug!("building SpergelInfo for nu = {nu}");
        let gamma_nup1 = gamma(nu + 1.0);
        Ok(Self {
            nu,
            params,
            gamma_nup1,
            gamma_nup2: gamma_nup1 * (nu + 1.0),
            hlr: OnceCell::new(),
            stepk: OnceCell::new(),
            maxk: OnceCell::new(),
            sampler: OnceCell::new(),
        })
    }

    /// Spergel index.
    pub fn nu(&self) -> f64 {
        self.nu
    }

    /// Unnormalized radial profile value at `r` (scale-radius units).
    ///
    /// The origin is an explicit closed-form branch: for ν > 0 the
    /// profile peaks at Γ(ν+1)·2^ν/(2ν); for ν ≤ 0 the center diverges
    /// and infinity is returned as the sentinel.
    pub fn x_value(&self, r: f64) -> f64 {
        if r == 0.0 {
            if self.nu > 0.0 {
                self.gamma_nup1 / (2.0 * self.nu) * 2.0_f64.powf(self.nu)
            } else {
                f64::INFINITY
            }
        } else {
            bessel_k(self.nu, r) * r.powf(self.nu)
        }
    }

    /// Fourier-space value at squared frequency `ksq` (units of 1/r0²),
    /// normalized to 1 at k = 0.
    pub fn k_value(&self, ksq: f64) -> f64 {
        (1.0 + ksq).powf(-1.0 - self.nu)
    }

    /// Fraction of total flux enclosed within radius `u` (scale-radius
    /// units): 1 − 2(1+ν)·(u/2)^{ν+1}·K_{ν+1}(u)/Γ(ν+2).
    pub fn enclosed_flux(&self, u: f64) -> f64 {
        let f = (0.5 * u).powf(self.nu + 1.0) * bessel_k(self.nu + 1.0, u) / self.gamma_nup2;
        1.0 - 2.0 * (1.0 + self.nu) * f
    }

    /// Radius enclosing `frac` of total flux, in scale-radius units.
    pub fn radius_for_flux_fraction(&self, frac: f64) -> Result<f64, ProfileError> {
        let (lo, hi) = FLUX_RADIUS_BRACKET;
        find_root(
            |u| self.enclosed_flux(u) - frac,
            lo,
            hi,
            Method::Brent,
            self.params.solver_tolerance,
        )
        .map_err(|source| ProfileError::Solve {
            quantity: "flux radius",
            source,
        })
    }

    /// Half-light radius in scale-radius units.
    pub fn half_light_radius(&self) -> Result<f64, ProfileError> {
        self.hlr
            .get_or_try_init(|| self.radius_for_flux_fraction(0.5))
            .map(|v| *v)
    }

    /// Recommended Fourier sampling step.
    ///
    /// π over the folding radius, with the folding radius capped at
    /// `stepk_minimum_hlr` half-light radii so stepK never drops below
    /// π/(stepk_minimum_hlr·hlr).
    pub fn step_k(&self) -> Result<f64, ProfileError> {
        self.stepk
            .get_or_try_init(|| {
                let hlr = self.half_light_radius()?;
                let r_fold =
                    self.radius_for_flux_fraction(1.0 - self.params.folding_threshold)?;
                let r = r_fold.min(self.params.stepk_minimum_hlr * hlr);
                debug!("Spergel nu = {}: folding radius {r_fold}, stepK radius {r}", self.nu);
                Ok(PI / r)
            })
            .map(|v| *v)
    }

    /// Recommended Fourier truncation frequency.
    ///
    /// Solves (1+k²)^(−1−ν) = maxk_threshold under the k² ≫ 1
    /// approximation (1+k² ≈ k²), which closes the form and
    /// overestimates k slightly.
    pub fn max_k(&self) -> f64 {
        *self.maxk.get_or_init(|| {
            self.params
                .maxk_threshold
                .powf(-1.0 / (2.0 * (1.0 + self.nu)))
        })
    }

    /// Shoot `n` photons from the unit-flux dimensionless profile.
    ///
    /// The sampler is built on first use over the radius enclosing
    /// 1 − shoot_accuracy of flux, then reused by every later call. The
    /// returned photons always total flux 1 exactly.
    pub fn shoot<R: Rng + ?Sized>(
        &self,
        n: usize,
        rng: &mut R,
    ) -> Result<PhotonArray, ProfileError> {
        let sampler = self.sampler.get_or_try_init(|| {
            let r_max = self.radius_for_flux_fraction(1.0 - self.params.shoot_accuracy)?;
            debug!("Spergel nu = {}: shooting support [0, {r_max}]", self.nu);
            OneDimensionalDeviate::new(
                |r| self.x_value(r),
                (0.0, r_max),
                true,
                self.params.shoot_accuracy,
            )
            .map_err(ProfileError::from)
        })?;
        let mut photons = sampler.shoot(n, rng);
        photons.scale_flux(1.0 / sampler.total_flux());
        Ok(photons)
    }
}

/// A Spergel profile instance: shared Info plus physical scale radius
/// and flux.
pub struct Spergel {
    nu: f64,
    r0: f64,
    flux: f64,
    norm: f64,
    info: Arc<SpergelInfo>,
}

impl Spergel {
    /// Create from the scale radius `r0` (the natural size unit of the
    /// profile shape).
    pub fn with_scale_radius(
        nu: f64,
        scale_radius: f64,
        flux: f64,
        params: &Arc<AccuracyParams>,
    ) -> Result<Self, ProfileError> {
        params.validate()?;
        if !(scale_radius > 0.0 && scale_radius.is_finite()) {
            return Err(ProfileError::InvalidParameter {
                family: "Spergel",
                parameter: "scale_radius",
                value: scale_radius,
                min: 0.0,
                max: f64::INFINITY,
            });
        }
        let info = spergel_info(nu, params)?;
        let gamma_nup1 = gamma(nu + 1.0);
        let norm = flux / (scale_radius * scale_radius * gamma_nup1 * 2.0 * PI)
            / 2.0_f64.powf(nu);
        Ok(Self {
            nu,
            r0: scale_radius,
            flux,
            norm,
            info,
        })
    }

    /// Create from the half-light radius instead of the scale radius.
    pub fn with_half_light_radius(
        nu: f64,
        half_light_radius: f64,
        flux: f64,
        params: &Arc<AccuracyParams>,
    ) -> Result<Self, ProfileError> {
        if !(half_light_radius > 0.0 && half_light_radius.is_finite()) {
            return Err(ProfileError::InvalidParameter {
                family: "Spergel",
                parameter: "half_light_radius",
                value: half_light_radius,
                min: 0.0,
                max: f64::INFINITY,
            });
        }
        // The dimensionless hlr is needed up front to convert.
        let info = spergel_info(nu, params)?;
        let scale_radius = half_light_radius / info.half_light_radius()?;
        Self::with_scale_radius(nu, scale_radius, flux, params)
    }

    /// Spergel index.
    pub fn nu(&self) -> f64 {
        self.nu
    }

    /// Scale radius in physical units.
    pub fn scale_radius(&self) -> f64 {
        self.r0
    }

    /// Total flux.
    pub fn flux(&self) -> f64 {
        self.flux
    }

    /// Half-light radius in physical units.
    pub fn half_light_radius(&self) -> Result<f64, ProfileError> {
        Ok(self.info.half_light_radius()? * self.r0)
    }

    /// Surface brightness at `(x, y)` in physical units.
    pub fn x_value(&self, x: f64, y: f64) -> f64 {
        let r = (x * x + y * y).sqrt() / self.r0;
        self.norm * self.info.x_value(r)
    }

    /// Fourier-space value at `(kx, ky)` (real for this axisymmetric
    /// profile), equal to `flux` at the origin.
    pub fn k_value(&self, kx: f64, ky: f64) -> f64 {
        let ksq = (kx * kx + ky * ky) * self.r0 * self.r0;
        self.flux * self.info.k_value(ksq)
    }

    /// Recommended Fourier sampling step in physical frequency units.
    pub fn step_k(&self) -> Result<f64, ProfileError> {
        Ok(self.info.step_k()? / self.r0)
    }

    /// Recommended Fourier truncation frequency in physical units.
    pub fn max_k(&self) -> f64 {
        self.info.max_k() / self.r0
    }

    /// Shoot `n` photons; total flux equals `flux` in expectation
    /// (exactly, for this family) and positions are in physical units.
    pub fn shoot<R: Rng + ?Sized>(
        &self,
        n: usize,
        rng: &mut R,
    ) -> Result<PhotonArray, ProfileError> {
        let mut photons = self.info.shoot(n, rng)?;
        photons.scale_flux(self.flux);
        photons.scale_xy(self.r0);
        Ok(photons)
    }

    #[cfg(test)]
    pub(crate) fn info(&self) -> &Arc<SpergelInfo> {
        &self.info
    }
}

impl fmt::Display for Spergel {
    /// Textual rendering of the constructor parameters, sufficient to
    /// reconstruct an equivalent instance.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Spergel(nu={}, scale_radius={}, flux={})",
            self.nu, self.r0, self.flux
        )
    }
}
