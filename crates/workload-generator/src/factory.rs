//! Generator factory: builds generator trees from parameter specs.

use std::collections::HashMap;
use std::fmt;

use workload_core::{ParamSpec, ParamType};

use crate::error::ConstructionError;
use crate::generators::{array, date, number, set, string, Generator};

/// Builds one generator for a spec. Nested specs are built through the factory.
pub type Constructor =
    fn(&GeneratorFactory, &ParamSpec) -> Result<Box<dyn Generator>, ConstructionError>;

/// Registry of generator constructors keyed by `(type, random_mode)`.
///
/// [`GeneratorFactory::default`] registers every built-in mode. Additional
/// modes can be added with [`GeneratorFactory::register`].
pub struct GeneratorFactory {
    registry: HashMap<(ParamType, String), Constructor>,
}

impl GeneratorFactory {
    /// Create a factory with no registered modes.
    pub fn empty() -> Self {
        Self {
            registry: HashMap::new(),
        }
    }

    /// Register (or replace) the constructor for a `(type, random_mode)` pair.
    pub fn register(&mut self, param_type: ParamType, mode: &str, constructor: Constructor) {
        self.registry
            .insert((param_type, mode.to_string()), constructor);
    }

    /// Check whether a `(type, random_mode)` pair is registered.
    pub fn supports(&self, param_type: ParamType, mode: &str) -> bool {
        self.registry
            .contains_key(&(param_type, mode.to_string()))
    }

    /// All registered pairs, sorted by type then mode.
    pub fn modes(&self) -> Vec<(ParamType, &str)> {
        let mut modes: Vec<(ParamType, &str)> = self
            .registry
            .keys()
            .map(|(ty, mode)| (*ty, mode.as_str()))
            .collect();
        modes.sort_by(|a, b| (a.0.as_str(), a.1).cmp(&(b.0.as_str(), b.1)));
        modes
    }

    /// Build a generator from a spec, validating every field the mode needs.
    pub fn build(&self, spec: &ParamSpec) -> Result<Box<dyn Generator>, ConstructionError> {
        let type_name = spec
            .param_type
            .as_deref()
            .ok_or(ConstructionError::MissingType)?;
        let param_type: ParamType = type_name.parse().map_err(ConstructionError::UnknownType)?;

        let mode = match spec.random_mode.as_deref() {
            Some(mode) => mode,
            None => default_mode(param_type).ok_or(ConstructionError::MissingMode(param_type))?,
        };

        let constructor = self
            .registry
            .get(&(param_type, mode.to_string()))
            .ok_or_else(|| ConstructionError::UnknownMode {
                param_type,
                mode: mode.to_string(),
            })?;

        constructor(self, spec)
    }

    /// Build a nested spec with its `type` injected by the parent.
    pub fn build_nested(
        &self,
        field: &'static str,
        spec: &ParamSpec,
        param_type: &str,
    ) -> Result<Box<dyn Generator>, ConstructionError> {
        self.build(&spec.with_type(param_type))
            .map_err(|e| ConstructionError::nested(field, e))
    }
}

impl Default for GeneratorFactory {
    fn default() -> Self {
        let mut factory = Self::empty();
        factory.register(ParamType::Number, "uniform", number::build_uniform);
        factory.register(ParamType::Number, "power_law", number::build_power_law);
        factory.register(
            ParamType::Number,
            "partition_power_law",
            number::build_partitioned_power_law,
        );
        factory.register(ParamType::String, "number_format", string::build_number_format);
        factory.register(ParamType::String, "set", set::build_set);
        factory.register(ParamType::Date, "timestamp_range", date::build_timestamp_range);
        factory.register(ParamType::Array, "fixed_size", array::build_fixed_size);
        factory
    }
}

impl fmt::Debug for GeneratorFactory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GeneratorFactory")
            .field("modes", &self.modes())
            .finish()
    }
}

/// Mode used when a spec omits `random_mode`.
fn default_mode(param_type: ParamType) -> Option<&'static str> {
    match param_type {
        ParamType::Array => Some("fixed_size"),
        _ => None,
    }
}
