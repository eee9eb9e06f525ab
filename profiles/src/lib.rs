//! Analytic radial light-profile models for astronomical image
//! simulation.
//!
//! This crate renders radially symmetric surface-brightness models into
//! per-point values, pixel grids and Monte-Carlo photon streams. Two
//! families are provided: the Spergel galaxy profile (a Bessel-K radial
//! shape with a closed-form Fourier transform) and the "second kick"
//! atmospheric-scattering profile (the residual high-frequency part of
//! a Kolmogorov turbulence PSF, defined numerically through its
//! structure function).
//!
//! Each family splits into a dimensionless, shape-parameter-only `Info`
//! object holding everything expensive (derived Fourier sampling
//! bounds, lookup tables, the photon sampler) and a thin instance
//! wrapper that applies physical scale radius and flux. Info objects
//! are shared through per-family LRU caches, so constructing many
//! instances with the same shape parameter pays the setup cost once.

pub mod cache;
pub mod error;
pub mod params;
pub mod render;
pub mod second_kick;
pub mod spergel;

// Re-exports for easier access
pub use cache::InfoCache;
pub use error::ProfileError;
pub use params::{AccuracyParams, ParamsKey};
pub use render::{fill_k_image, fill_x_image, RadialProfile};
pub use second_kick::{SecondKick, SkInfo};
pub use spergel::{Spergel, SpergelInfo};
