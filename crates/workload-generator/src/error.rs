//! Construction errors.

use workload_core::ParamType;

/// A parameter spec could not be turned into a generator.
#[derive(Debug, thiserror::Error)]
pub enum ConstructionError {
    /// The spec has no `type`
    #[error("missing parameter type")]
    MissingType,

    /// The `type` is not one of number, string, date, array
    #[error("unknown parameter type: {0}")]
    UnknownType(String),

    /// The spec has no `random_mode` and the type has no default
    #[error("missing random_mode for type {0}")]
    MissingMode(ParamType),

    /// No constructor is registered for this `(type, random_mode)` pair
    #[error("unknown random_mode '{mode}' for type {param_type}")]
    UnknownMode { param_type: ParamType, mode: String },

    /// A field required by the mode is absent
    #[error("{mode} requires '{field}'")]
    MissingField {
        mode: &'static str,
        field: &'static str,
    },

    /// Fields are present but their values are unusable
    #[error("invalid {mode} spec: {reason}")]
    Invalid { mode: &'static str, reason: String },

    /// A nested spec failed to build
    #[error("invalid '{field}': {source}")]
    Nested {
        field: &'static str,
        #[source]
        source: Box<ConstructionError>,
    },
}

impl ConstructionError {
    pub(crate) fn invalid(mode: &'static str, reason: impl Into<String>) -> Self {
        Self::Invalid {
            mode,
            reason: reason.into(),
        }
    }

    pub(crate) fn nested(field: &'static str, source: ConstructionError) -> Self {
        Self::Nested {
            field,
            source: Box::new(source),
        }
    }
}

/// Take a required field out of a spec or fail with [`ConstructionError::MissingField`].
pub(crate) fn require<'a, T>(
    value: &'a Option<T>,
    mode: &'static str,
    field: &'static str,
) -> Result<&'a T, ConstructionError> {
    value
        .as_ref()
        .ok_or(ConstructionError::MissingField { mode, field })
}
