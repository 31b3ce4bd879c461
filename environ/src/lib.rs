//! Typed configuration structs populated from environment variables
//!
//! `environ` fills the fields of a flat struct from environment variables.
//! `String` fields receive the value as-is; every other field type is
//! converted by a converter registered for that type, so the set of supported
//! types is decided by the program rather than by the library.
//!
//! # Example
//!
//! ```rust
//! use environ::{Environ, Record};
//!
//! #[derive(Debug, Default, Environ)]
//! struct Config {
//!     #[environ("APP_HOST")]
//!     pub host: String,
//!
//!     #[environ("APP_PORT, 8080")]
//!     pub port: u16,
//!
//!     // Not annotated: left untouched
//!     pub started_at: Option<u64>,
//! }
//!
//! # fn main() -> anyhow::Result<()> {
//! environ::use_from_str::<u16>()?;
//!
//! #     std::env::set_var("APP_HOST", "localhost");
//! #     std::env::remove_var("APP_PORT");
//! let config = Config::from_env()?;
//! assert_eq!(config.host, "localhost");
//! assert_eq!(config.port, 8080);
//! #     Ok(())
//! # }
//! ```
//!
//! # Annotations
//!
//! ## `#[environ("NAME")]`
//!
//! Binds the field to `NAME`. Injection fails with
//! [`InjectError::MissingVariable`] if the variable is not set.
//!
//! ## `#[environ("NAME, default")]`
//!
//! Falls back to the literal `default` (trimmed) when `NAME` is not set. The
//! default goes through the same converter as an environment value.
//!
//! An annotation with more than two comma-separated parts is ignored and the
//! field is left untouched.
//!
//! ## `#[environ(prefix = "APP_")]`
//!
//! Struct-level prefix prepended to every variable name.
//!
//! ```rust
//! # use environ::Environ;
//! #[derive(Default, Environ)]
//! #[environ(prefix = "APP_")]
//! struct Config {
//!     // Reads APP_DATABASE_URL
//!     #[environ("DATABASE_URL")]
//!     pub database_url: String,
//! }
//! ```
//!
//! # Converters
//!
//! Converters are registered per output type in a [`Registry`]. The free
//! functions of this crate use the process-wide [`registry::global`] registry;
//! an [`Injector`] can be built over any registry and [`Environment`].
//!
//! ```rust
//! use environ::{Environ, Injector, Registry};
//! use std::collections::HashMap;
//! use std::time::Duration;
//!
//! #[derive(Default, Environ)]
//! struct Worker {
//!     #[environ("TIMEOUT_SECS, 30")]
//!     pub timeout: Duration,
//! }
//!
//! let registry = Registry::new();
//! registry
//!     .register_fn(|raw: &str| raw.parse::<u64>().map(Duration::from_secs))
//!     .unwrap();
//!
//! let env: HashMap<String, String> = HashMap::new();
//! let mut worker = Worker::default();
//! Injector::new(&registry, &env).inject(&mut worker).unwrap();
//! assert_eq!(worker.timeout, Duration::from_secs(30));
//! ```

pub mod env;
mod error;
pub mod inject;
pub mod registry;
pub mod tag;

use std::str::FromStr;
use std::sync::Arc;

pub use env::{Environment, ProcessEnv};
pub use environ_derive::Environ;
pub use error::{BoxError, InjectError, RegistrationError};
pub use inject::{FieldDescriptor, Injector, Record};
pub use registry::{Converter, Registry};

/// Populate `target` from the process environment using the global registry.
///
/// # Errors
///
/// Returns the first failure; see [`Injector::inject`].
pub fn inject<R: Record>(target: &mut R) -> Result<(), InjectError> {
    Injector::new(registry::global(), &ProcessEnv).inject(target)
}

/// Register a fallible converter in the global registry.
///
/// Replaces any converter previously registered for `T`. See
/// [`Registry::register_fn`] for which output types are rejected as errors.
pub fn use_converter<T, E, F>(f: F) -> Result<(), RegistrationError>
where
    F: Fn(&str) -> Result<T, E> + Send + Sync + 'static,
    T: Send + 'static,
    E: Into<BoxError> + 'static,
{
    registry::global().register_fn(f)
}

/// Register an infallible converter in the global registry.
///
/// See [`Registry::register_infallible`] for which output types are rejected
/// as errors.
pub fn use_infallible_converter<T, F>(f: F) -> Result<(), RegistrationError>
where
    F: Fn(&str) -> T + Send + Sync + 'static,
    T: Send + 'static,
{
    registry::global().register_infallible(f)
}

/// Register `T::from_str` in the global registry.
pub fn use_from_str<T>() -> Result<(), RegistrationError>
where
    T: FromStr + Send + 'static,
    T::Err: Into<BoxError> + 'static,
{
    registry::global().register_from_str::<T>()
}

/// Register a type-erased converter in the global registry.
pub fn register_converter(converter: Option<Arc<dyn Converter>>) -> Result<(), RegistrationError> {
    registry::global().register_dyn(converter)
}

/// Remove every converter from the global registry.
pub fn reset_converters() {
    registry::global().reset();
}

// Re-exports for macro-generated code
#[doc(hidden)]
pub mod __private {
    pub use std::any::Any;
    pub use std::boxed::Box;
    pub use std::result::Result;
    pub use std::vec::Vec;

    pub use crate::inject::{FieldDescriptor, Record};
}
