//! Error types for injection and converter registration

/// Boxed error returned by converters.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Errors that can occur while populating a record from the environment.
///
/// Injection is fail-fast: the first error aborts the whole operation. Fields
/// populated before the failing one keep their new values.
#[derive(Debug, thiserror::Error)]
pub enum InjectError {
    /// Environment variable is not set and the annotation carries no default.
    #[error("environment variable '{name}' is required but not set")]
    MissingVariable {
        /// Name of the missing environment variable (including any prefix)
        name: String,
    },

    /// Environment variable is set but its value is not valid Unicode.
    #[error("environment variable '{name}' is set but its value is not valid unicode")]
    NotUnicode {
        /// Name of the environment variable (including any prefix)
        name: String,
    },

    /// The field is not a `String` and no converter is registered for its type.
    #[error("no converter registered for field '{field}' of type {type_name}")]
    NoConverter {
        /// Name of the struct field
        field: &'static str,
        /// Fully qualified name of the field type
        type_name: &'static str,
    },

    /// The registered converter rejected the value.
    #[error("failed to convert environment variable '{name}' into {type_name}: {source}")]
    Conversion {
        /// Name of the environment variable being converted
        name: String,
        /// Fully qualified name of the target type
        type_name: &'static str,
        /// Error reported by the converter
        #[source]
        source: BoxError,
    },

    /// The converter registered for the field type produced a value of another type.
    ///
    /// Only reachable with hand-written [`Converter`](crate::Converter)
    /// implementations whose signature does not match what `convert` returns.
    #[error("converter registered for {type_name} produced a value of a different type for field '{field}'")]
    OutputMismatch {
        /// Name of the struct field
        field: &'static str,
        /// Fully qualified name of the field type
        type_name: &'static str,
    },
}

impl InjectError {
    /// Create a missing environment variable error
    pub fn missing(name: impl Into<String>) -> Self {
        Self::MissingVariable { name: name.into() }
    }

    /// Name of the environment variable involved, if the error names one
    pub fn variable(&self) -> Option<&str> {
        match self {
            Self::MissingVariable { name }
            | Self::NotUnicode { name }
            | Self::Conversion { name, .. } => Some(name.as_str()),
            Self::NoConverter { .. } | Self::OutputMismatch { .. } => None,
        }
    }
}

/// Errors raised when a converter with a malformed shape is registered.
///
/// These are programming errors: the converter must be fixed, not retried.
/// A failed registration never mutates the registry.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RegistrationError {
    /// No converter was supplied.
    #[error("cannot register an absent converter")]
    NilConverter,

    /// The converter does not take exactly one string argument.
    #[error("converter must take a single string as an argument, found ({found})")]
    InvalidArgument {
        /// Rendered list of the declared argument types
        found: String,
    },

    /// The converter does not return `T` or `Result<T, E>` with a non-error `T`.
    #[error("converter return type must be T or Result<T, E>: {reason}")]
    InvalidReturnShape {
        /// Which rule the declared outputs violate
        reason: &'static str,
    },
}
