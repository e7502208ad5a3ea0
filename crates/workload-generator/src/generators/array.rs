//! Array value generators.

use workload_core::{GeneratedValue, ParamSpec, ParamType};

use super::Generator;
use crate::error::{require, ConstructionError};
use crate::factory::GeneratorFactory;
use crate::WorkloadRng;

const FIXED_SIZE: &str = "array/fixed_size";

/// Generate arrays of exactly `size` independently generated elements.
#[derive(Debug)]
pub struct ArrayGenerator {
    size: usize,
    element: Box<dyn Generator>,
}

impl ArrayGenerator {
    pub fn new(size: usize, element: Box<dyn Generator>) -> Self {
        Self { size, element }
    }

    pub fn size(&self) -> usize {
        self.size
    }
}

impl Generator for ArrayGenerator {
    fn generate(&self, rng: &mut WorkloadRng) -> GeneratedValue {
        GeneratedValue::Array((0..self.size).map(|_| self.element.generate(rng)).collect())
    }
}

pub(crate) fn build_fixed_size(
    factory: &GeneratorFactory,
    spec: &ParamSpec,
) -> Result<Box<dyn Generator>, ConstructionError> {
    let array_size = *require(&spec.array_size, FIXED_SIZE, "array_size")?;
    let element_type = require(&spec.element_type, FIXED_SIZE, "element_type")?;
    let element_config = require(&spec.element_config, FIXED_SIZE, "element_config")?;

    if array_size <= 0 {
        return Err(ConstructionError::invalid(
            FIXED_SIZE,
            format!("array_size must be positive, got {array_size}"),
        ));
    }
    let size = usize::try_from(array_size).map_err(|_| {
        ConstructionError::invalid(FIXED_SIZE, format!("array_size {array_size} is too large"))
    })?;

    match element_type.parse::<ParamType>() {
        Ok(ParamType::Array) => {
            return Err(ConstructionError::invalid(
                FIXED_SIZE,
                "element_type cannot be array",
            ))
        }
        Ok(_) => {}
        Err(unknown) => return Err(ConstructionError::UnknownType(unknown)),
    }

    let element = factory.build_nested("element_config", element_config, element_type.as_str())?;
    Ok(Box::new(ArrayGenerator::new(size, element)))
}
