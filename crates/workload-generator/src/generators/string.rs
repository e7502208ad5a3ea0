//! Formatted-number string generator.

use workload_core::{GeneratedValue, ParamSpec};

use super::format::IntegerFormat;
use super::Generator;
use crate::error::{require, ConstructionError};
use crate::factory::GeneratorFactory;
use crate::WorkloadRng;

const NUMBER_FORMAT: &str = "string/number_format";

/// Substitutes a nested number generator's output into an integer pattern.
#[derive(Debug)]
pub struct NumberFormatGenerator {
    format: IntegerFormat,
    number: Box<dyn Generator>,
}

impl NumberFormatGenerator {
    pub fn new(format: IntegerFormat, number: Box<dyn Generator>) -> Self {
        Self { format, number }
    }
}

impl Generator for NumberFormatGenerator {
    fn generate(&self, rng: &mut WorkloadRng) -> GeneratedValue {
        match self.number.generate(rng) {
            GeneratedValue::Int(n) => GeneratedValue::Text(self.format.render(n)),
            // number_config is always built as a number generator
            other => GeneratedValue::Text(other.to_string()),
        }
    }
}

pub(crate) fn build_number_format(
    factory: &GeneratorFactory,
    spec: &ParamSpec,
) -> Result<Box<dyn Generator>, ConstructionError> {
    let pattern = require(&spec.format, NUMBER_FORMAT, "format")?;
    let number_config = require(&spec.number_config, NUMBER_FORMAT, "number_config")?;

    let format = IntegerFormat::parse(pattern)
        .map_err(|e| ConstructionError::invalid(NUMBER_FORMAT, format!("format '{pattern}': {e}")))?;
    let number = factory.build_nested("number_config", number_config, "number")?;

    Ok(Box::new(NumberFormatGenerator::new(format, number)))
}
