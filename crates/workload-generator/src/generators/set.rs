//! Fixed-set string generators.

use rand::Rng;
use workload_core::{GeneratedValue, ParamSpec, SetValues};

use super::Generator;
use crate::error::{require, ConstructionError};
use crate::factory::GeneratorFactory;
use crate::WorkloadRng;

const SET: &str = "string/set";

/// Picks a value with probability proportional to its weight.
#[derive(Debug, Clone)]
pub struct WeightedSetGenerator {
    values: Vec<String>,
    /// Running sum of weights, one entry per value
    cumulative: Vec<f64>,
    total: f64,
}

impl WeightedSetGenerator {
    pub fn new(entries: &[(String, f64)]) -> Result<Self, ConstructionError> {
        if entries.is_empty() {
            return Err(ConstructionError::invalid(SET, "weighted set cannot be empty"));
        }

        let mut values = Vec::with_capacity(entries.len());
        let mut cumulative = Vec::with_capacity(entries.len());
        let mut total = 0.0;
        for (value, weight) in entries {
            if !weight.is_finite() || *weight < 0.0 {
                return Err(ConstructionError::invalid(
                    SET,
                    format!("weight for '{value}' must be a finite non-negative number, got {weight}"),
                ));
            }
            total += weight;
            values.push(value.clone());
            cumulative.push(total);
        }

        if total <= 0.0 || !total.is_finite() {
            return Err(ConstructionError::invalid(
                SET,
                "weights must add up to a positive finite total",
            ));
        }

        Ok(Self {
            values,
            cumulative,
            total,
        })
    }

    pub fn pick(&self, rng: &mut WorkloadRng) -> &str {
        let draw = rng.random::<f64>() * self.total;
        let idx = self
            .cumulative
            .iter()
            .position(|&w| draw < w)
            // Floating-point edge: fall back to the last value.
            .unwrap_or(self.values.len() - 1);
        &self.values[idx]
    }
}

impl Generator for WeightedSetGenerator {
    fn generate(&self, rng: &mut WorkloadRng) -> GeneratedValue {
        GeneratedValue::Text(self.pick(rng).to_string())
    }
}

/// Picks each value with equal probability.
#[derive(Debug, Clone)]
pub struct UniformSetGenerator {
    values: Vec<String>,
}

impl UniformSetGenerator {
    pub fn new(values: Vec<String>) -> Result<Self, ConstructionError> {
        if values.is_empty() {
            return Err(ConstructionError::invalid(SET, "uniform set cannot be empty"));
        }
        Ok(Self { values })
    }
}

impl Generator for UniformSetGenerator {
    fn generate(&self, rng: &mut WorkloadRng) -> GeneratedValue {
        let idx = rng.random_range(0..self.values.len());
        GeneratedValue::Text(self.values[idx].clone())
    }
}

pub(crate) fn build_set(
    _factory: &GeneratorFactory,
    spec: &ParamSpec,
) -> Result<Box<dyn Generator>, ConstructionError> {
    let set_mode = require(&spec.set_mode, SET, "set_mode")?;
    let values = require(&spec.values, SET, "values")?;

    match (set_mode.as_str(), values) {
        ("weighted", SetValues::Weighted(entries)) => {
            Ok(Box::new(WeightedSetGenerator::new(entries)?))
        }
        ("uniform", SetValues::Enumerated(values)) => {
            Ok(Box::new(UniformSetGenerator::new(values.clone())?))
        }
        ("weighted", other) => Err(ConstructionError::invalid(
            SET,
            format!("weighted set values must be a mapping, got a {}", other.shape()),
        )),
        ("uniform", other) => Err(ConstructionError::invalid(
            SET,
            format!("uniform set values must be a list, got a {}", other.shape()),
        )),
        (unknown, _) => Err(ConstructionError::invalid(
            SET,
            format!("unknown set_mode '{unknown}'"),
        )),
    }
}
