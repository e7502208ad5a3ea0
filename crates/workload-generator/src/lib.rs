//! Random value generators for db-workload.
//!
//! This crate turns declarative [`ParamSpec`]s into [`Generator`] trees. The
//! [`GeneratorFactory`] validates every spec up front, so a generator that was
//! built successfully never fails while generating.
//!
//! # Architecture
//!
//! ```text
//! ParamSpec (YAML / JSON)
//!        │
//!        ▼
//! ┌──────────────────────┐
//! │   GeneratorFactory   │
//! │                      │
//! │  registry:           │
//! │  (type, mode) → ctor │
//! └──────────┬───────────┘
//!            │
//!            ▼
//!    Box<dyn Generator>  ──generate(&mut StdRng)──▶ GeneratedValue
//! ```
//!
//! Randomness is never global: every call receives the caller's RNG, so each
//! worker owns its own source and tests can seed it.
//!
//! # Example
//!
//! ```rust
//! use rand::SeedableRng;
//! use workload_core::ParamSpec;
//! use workload_generator::{GeneratorFactory, WorkloadRng};
//!
//! let spec = ParamSpec::from_yaml(r#"
//! type: string
//! random_mode: number_format
//! format: "user_%d"
//! number_config:
//!   random_mode: uniform
//!   min: 100
//!   max: 100
//! "#).unwrap();
//!
//! let generator = GeneratorFactory::default().build(&spec).unwrap();
//! let mut rng = WorkloadRng::seed_from_u64(42);
//! assert_eq!(generator.generate(&mut rng).as_text(), Some("user_100"));
//! ```
//!
//! # Modes
//!
//! - `number/uniform` - Uniform integers in `[min, max]`
//! - `number/power_law` - Inverse-CDF power law over `[min, max]`
//! - `number/partition_power_law` - Power law inside a uniformly chosen bucket
//! - `string/number_format` - A nested number substituted into a `%d` pattern
//! - `string/set` - Weighted or uniform choice from a fixed set
//! - `date/timestamp_range` - Uniform whole-second instants, formatted
//! - `array/fixed_size` - A fixed number of independently generated elements

pub mod error;
pub mod factory;
pub mod generators;

// Re-exports for convenience
pub use error::ConstructionError;
pub use factory::{Constructor, GeneratorFactory};
pub use generators::Generator;

/// Randomness source handed to every [`Generator::generate`] call.
pub type WorkloadRng = rand::rngs::StdRng;
