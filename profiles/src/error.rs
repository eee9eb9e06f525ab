//! Error taxonomy for profile construction and evaluation.
//!
//! Three classes of failure exist, all surfaced synchronously to the
//! caller and never retried (every computation here is deterministic):
//! invalid parameters are rejected eagerly at construction, solver
//! failures propagate from the derived-quantity computation that
//! triggered them, and sampler build failures propagate from the first
//! shoot call.

use profile_math::{DeviateError, SolveError};
use thiserror::Error;

/// Errors raised by the profile layer.
#[derive(Debug, Error)]
pub enum ProfileError {
    /// A shape or scale parameter lies outside the supported range.
    /// Raised at construction, never deferred to first use.
    #[error("{family}: {parameter} = {value} outside supported range [{min}, {max}]")]
    InvalidParameter {
        family: &'static str,
        parameter: &'static str,
        value: f64,
        min: f64,
        max: f64,
    },

    /// An accuracy parameter fails validation.
    #[error("accuracy parameter {name} = {value} must be {requirement}")]
    InvalidAccuracy {
        name: &'static str,
        value: f64,
        requirement: &'static str,
    },

    /// A flux-radius root find failed to bracket or converge.
    #[error("solving for {quantity} failed")]
    Solve {
        quantity: &'static str,
        #[source]
        source: SolveError,
    },

    /// Photon-sampler construction failed.
    #[error(transparent)]
    Deviate(#[from] DeviateError),
}
