//! Numerical building blocks for radial light-profile modeling.
//!
//! This crate collects the low-level numerics consumed by the profile
//! layer: special functions (gamma, modified Bessel K), bracketed root
//! finding, one-dimensional quadrature, interpolated lookup tables, and
//! the inverse-CDF photon sampler used for Monte-Carlo image simulation.
//!
//! Everything here is deterministic, synchronous and allocation-light;
//! the only stateful input anywhere is the caller-owned random number
//! generator handed to [`deviate::OneDimensionalDeviate::shoot`].

pub mod bessel;
pub mod deviate;
pub mod gamma;
pub mod integrate;
pub mod lookup_table;
pub mod photon;
pub mod solve;

// Re-exports for easier access
pub use bessel::{bessel_j0, bessel_k};
pub use deviate::{DeviateError, OneDimensionalDeviate};
pub use gamma::gamma;
pub use integrate::{adaptive_simpson, trapezoid};
pub use lookup_table::{LookupError, LookupTable};
pub use photon::PhotonArray;
pub use solve::{find_root, Method, SolveError};
