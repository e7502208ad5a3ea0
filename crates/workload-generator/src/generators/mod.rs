//! Individual value generators.
//!
//! Each module provides the generator types for one parameter type together
//! with the registry constructors that validate a spec and build them.

pub mod array;
pub mod date;
pub mod format;
pub mod number;
pub mod set;
pub mod string;

use std::fmt;

use workload_core::GeneratedValue;

use crate::WorkloadRng;

/// Produces one value per call.
///
/// Generators are immutable after construction and never fail; all
/// validation happens in the factory.
pub trait Generator: Send + Sync + fmt::Debug {
    /// Generate a value using the caller's randomness source.
    fn generate(&self, rng: &mut WorkloadRng) -> GeneratedValue;
}
