//! Registry of string-to-value converters keyed by output type
//!
//! A converter is registered once per output type and is picked up by the
//! injector for every field of that type. Registering a second converter for
//! the same type replaces the first.
//!
//! ```rust
//! use environ::registry::Registry;
//!
//! let registry = Registry::new();
//! registry.register_fn(|raw: &str| raw.parse::<u16>()).unwrap();
//! assert!(registry.contains::<u16>());
//! ```

use crate::error::{BoxError, RegistrationError};
use parking_lot::RwLock;
use std::any::{type_name, Any, TypeId};
use std::collections::HashMap;
use std::fmt;
use std::marker::PhantomData;
use std::str::FromStr;
use std::sync::{Arc, LazyLock};
use tracing::debug;

static GLOBAL: LazyLock<Registry> = LazyLock::new(Registry::new);

/// Process-wide registry used by [`crate::inject`] and the `use_*` helpers.
///
/// Starts empty and is only cleared by an explicit [`Registry::reset`].
pub fn global() -> &'static Registry {
    &GLOBAL
}

/// Coarse classification of a type appearing in a converter signature.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShapeKind {
    /// A string input (`str`, `&str`, `String`, `&String`)
    Str,
    /// An error type
    Error,
    /// Any other value
    Value,
}

/// A type appearing in a converter signature.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TypeShape {
    id: TypeId,
    name: &'static str,
    kind: ShapeKind,
}

impl TypeShape {
    /// Describe `T`, classifying it from its type identity.
    ///
    /// Strings and the error types of `std` and this crate are recognised;
    /// every other type is a plain value. Use [`TypeShape::error`] for error
    /// types outside that set.
    pub fn of<T: ?Sized + 'static>() -> Self {
        let id = TypeId::of::<T>();
        let kind = if string_types().contains(&id) {
            ShapeKind::Str
        } else if error_types().contains(&id) {
            ShapeKind::Error
        } else {
            ShapeKind::Value
        };

        Self {
            id,
            name: type_name::<T>(),
            kind,
        }
    }

    /// Describe `E` as an error type.
    pub fn error<E: ?Sized + 'static>() -> Self {
        Self {
            id: TypeId::of::<E>(),
            name: type_name::<E>(),
            kind: ShapeKind::Error,
        }
    }

    /// Identity of the described type
    pub fn id(&self) -> TypeId {
        self.id
    }

    /// Fully qualified name of the described type
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Classification used by [`Signature::validate`]
    pub fn kind(&self) -> ShapeKind {
        self.kind
    }
}

fn string_types() -> [TypeId; 4] {
    [
        TypeId::of::<str>(),
        TypeId::of::<&'static str>(),
        TypeId::of::<String>(),
        TypeId::of::<&'static String>(),
    ]
}

fn error_types() -> [TypeId; 15] {
    use std::error::Error;

    [
        TypeId::of::<dyn Error>(),
        TypeId::of::<Box<dyn Error>>(),
        TypeId::of::<Box<dyn Error + Send>>(),
        TypeId::of::<Box<dyn Error + Send + Sync>>(),
        TypeId::of::<std::io::Error>(),
        TypeId::of::<fmt::Error>(),
        TypeId::of::<std::num::ParseIntError>(),
        TypeId::of::<std::num::ParseFloatError>(),
        TypeId::of::<std::str::ParseBoolError>(),
        TypeId::of::<std::char::ParseCharError>(),
        TypeId::of::<std::net::AddrParseError>(),
        TypeId::of::<std::str::Utf8Error>(),
        TypeId::of::<std::string::FromUtf8Error>(),
        TypeId::of::<crate::InjectError>(),
        TypeId::of::<RegistrationError>(),
    ]
}

/// Declared shape of a converter: its argument and return types.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Signature {
    pub inputs: Vec<TypeShape>,
    pub outputs: Vec<TypeShape>,
}

impl Signature {
    pub fn new(
        inputs: impl IntoIterator<Item = TypeShape>,
        outputs: impl IntoIterator<Item = TypeShape>,
    ) -> Self {
        Self {
            inputs: inputs.into_iter().collect(),
            outputs: outputs.into_iter().collect(),
        }
    }

    /// Check the shape and return the output type it registers under.
    ///
    /// The rules are applied in order: exactly one string argument, one or
    /// two outputs, an error type in the second output, and a non-error
    /// primary output.
    pub fn validate(&self) -> Result<TypeShape, RegistrationError> {
        if self.inputs.len() != 1 || self.inputs[0].kind != ShapeKind::Str {
            let found = self
                .inputs
                .iter()
                .map(TypeShape::name)
                .collect::<Vec<_>>()
                .join(", ");
            return Err(RegistrationError::InvalidArgument { found });
        }

        let primary = match self.outputs.as_slice() {
            [primary] => primary,
            [primary, error] => {
                if error.kind != ShapeKind::Error {
                    return Err(RegistrationError::InvalidReturnShape {
                        reason: "the second return value must be an error",
                    });
                }
                primary
            }
            _ => {
                return Err(RegistrationError::InvalidReturnShape {
                    reason: "a converter must return one or two values",
                });
            }
        };

        if primary.kind == ShapeKind::Error {
            return Err(RegistrationError::InvalidReturnShape {
                reason: "a converter cannot produce an error type",
            });
        }

        Ok(*primary)
    }
}

/// String-to-value conversion registered for one output type.
///
/// Most converters are built from closures with [`Registry::register_fn`] or
/// [`Registry::register_infallible`]. Implement the trait directly to describe
/// a converter whose shape is only known at run time; the declared
/// [`Signature`] is validated on registration and `convert` must return a
/// value of the primary output type.
pub trait Converter: Send + Sync {
    fn signature(&self) -> Signature;

    fn convert(&self, raw: &str) -> Result<Box<dyn Any + Send>, BoxError>;
}

/// Converter wrapping a fallible `Fn(&str) -> Result<T, E>`.
pub struct FnConverter<F, T, E> {
    f: F,
    _marker: PhantomData<fn() -> Result<T, E>>,
}

impl<F, T, E> FnConverter<F, T, E>
where
    F: Fn(&str) -> Result<T, E>,
{
    pub fn new(f: F) -> Self {
        Self {
            f,
            _marker: PhantomData,
        }
    }
}

impl<F, T, E> Converter for FnConverter<F, T, E>
where
    F: Fn(&str) -> Result<T, E> + Send + Sync,
    T: Send + 'static,
    E: Into<BoxError> + 'static,
{
    fn signature(&self) -> Signature {
        Signature::new(
            [TypeShape::of::<str>()],
            [TypeShape::of::<T>(), TypeShape::error::<E>()],
        )
    }

    fn convert(&self, raw: &str) -> Result<Box<dyn Any + Send>, BoxError> {
        match (self.f)(raw) {
            Ok(value) => Ok(Box::new(value) as Box<dyn Any + Send>),
            Err(e) => Err(e.into()),
        }
    }
}

/// Converter wrapping an infallible `Fn(&str) -> T`.
pub struct InfallibleConverter<F, T> {
    f: F,
    _marker: PhantomData<fn() -> T>,
}

impl<F, T> InfallibleConverter<F, T>
where
    F: Fn(&str) -> T,
{
    pub fn new(f: F) -> Self {
        Self {
            f,
            _marker: PhantomData,
        }
    }
}

impl<F, T> Converter for InfallibleConverter<F, T>
where
    F: Fn(&str) -> T + Send + Sync,
    T: Send + 'static,
{
    fn signature(&self) -> Signature {
        Signature::new([TypeShape::of::<str>()], [TypeShape::of::<T>()])
    }

    fn convert(&self, raw: &str) -> Result<Box<dyn Any + Send>, BoxError> {
        Ok(Box::new((self.f)(raw)) as Box<dyn Any + Send>)
    }
}

struct Entry {
    type_name: &'static str,
    converter: Arc<dyn Converter>,
}

/// Thread-safe map from output type to converter.
///
/// Registration takes the write lock for the insert only; lookups clone one
/// `Arc` under the read lock, so a concurrent registration never exposes a
/// partially written entry.
#[derive(Default)]
pub struct Registry {
    converters: RwLock<HashMap<TypeId, Entry>>,
}

impl Registry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a converter, replacing any converter for the same output type.
    pub fn register<C>(&self, converter: C) -> Result<(), RegistrationError>
    where
        C: Converter + 'static,
    {
        let converter: Arc<dyn Converter> = Arc::new(converter);
        self.register_dyn(Some(converter))
    }

    /// Register a fallible converter function.
    ///
    /// `E` may be any error convertible into a boxed error, including
    /// `String` and `anyhow::Error`.
    ///
    /// The primary output is rejected as an error type only when it is one
    /// of the `std` or `environ` error types known to [`TypeShape::of`].
    /// Other error types, such as `anyhow::Error` or a user-defined
    /// `thiserror` enum, are accepted as plain values; implement
    /// [`Converter`] with [`TypeShape::error`] to have them rejected.
    pub fn register_fn<T, E, F>(&self, f: F) -> Result<(), RegistrationError>
    where
        F: Fn(&str) -> Result<T, E> + Send + Sync + 'static,
        T: Send + 'static,
        E: Into<BoxError> + 'static,
    {
        self.register(FnConverter::new(f))
    }

    /// Register a converter function that cannot fail.
    ///
    /// The primary output is rejected as an error type only when it is one
    /// of the `std` or `environ` error types known to [`TypeShape::of`].
    /// Other error types, such as `anyhow::Error` or a user-defined
    /// `thiserror` enum, are accepted as plain values; implement
    /// [`Converter`] with [`TypeShape::error`] to have them rejected.
    pub fn register_infallible<T, F>(&self, f: F) -> Result<(), RegistrationError>
    where
        F: Fn(&str) -> T + Send + Sync + 'static,
        T: Send + 'static,
    {
        self.register(InfallibleConverter::new(f))
    }

    /// Register `T::from_str` as the converter for `T`.
    pub fn register_from_str<T>(&self) -> Result<(), RegistrationError>
    where
        T: FromStr + Send + 'static,
        T::Err: Into<BoxError> + 'static,
    {
        self.register_fn(|raw: &str| raw.parse::<T>())
    }

    /// Validate and store a type-erased converter.
    ///
    /// `None` is rejected with [`RegistrationError::NilConverter`]. On any
    /// error the registry is left unchanged.
    pub fn register_dyn(
        &self,
        converter: Option<Arc<dyn Converter>>,
    ) -> Result<(), RegistrationError> {
        let converter = converter.ok_or(RegistrationError::NilConverter)?;
        let output = converter.signature().validate()?;

        let entry = Entry {
            type_name: output.name(),
            converter,
        };
        let previous = self.converters.write().insert(output.id(), entry);

        if previous.is_some() {
            debug!(
                type_name = output.name(),
                "replaced previously registered converter"
            );
        } else {
            debug!(type_name = output.name(), "registered converter");
        }

        Ok(())
    }

    /// Converter registered for the type identified by `id`
    pub fn lookup(&self, id: TypeId) -> Option<Arc<dyn Converter>> {
        self.converters
            .read()
            .get(&id)
            .map(|entry| Arc::clone(&entry.converter))
    }

    /// Whether a converter is registered for `T`
    pub fn contains<T: ?Sized + 'static>(&self) -> bool {
        self.converters.read().contains_key(&TypeId::of::<T>())
    }

    /// Number of registered output types
    pub fn len(&self) -> usize {
        self.converters.read().len()
    }

    /// Whether no converter is registered
    pub fn is_empty(&self) -> bool {
        self.converters.read().is_empty()
    }

    /// Remove every registered converter.
    pub fn reset(&self) {
        let mut converters = self.converters.write();
        let cleared = converters.len();
        converters.clear();
        debug!(cleared, "reset converter registry");
    }
}

impl fmt::Debug for Registry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let converters = self.converters.read();
        let mut types: Vec<_> = converters.values().map(|entry| entry.type_name).collect();
        types.sort_unstable();
        f.debug_struct("Registry").field("types", &types).finish()
    }
}
