//! Population of record fields from an environment

use crate::env::Environment;
use crate::error::InjectError;
use crate::registry::Registry;
use crate::tag::Tag;
use std::any::{type_name, Any, TypeId};
use tracing::{debug, trace};

/// Declared field of a [`Record`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldDescriptor {
    /// Field name as written in the struct
    pub name: &'static str,
    /// Fully qualified name of the field type
    pub type_name: &'static str,
    /// Identity of the field type, used to pick a converter
    pub type_id: TypeId,
    /// Raw `#[environ("...")]` annotation, if the field carries one
    pub annotation: Option<&'static str>,
}

impl FieldDescriptor {
    /// Describe a field of type `T`
    pub fn of<T: 'static>(name: &'static str, annotation: Option<&'static str>) -> Self {
        Self {
            name,
            type_name: type_name::<T>(),
            type_id: TypeId::of::<T>(),
            annotation,
        }
    }

    fn is_string(&self) -> bool {
        self.type_id == TypeId::of::<String>()
    }
}

/// A flat struct whose fields can be populated from the environment.
///
/// Implemented by `#[derive(Environ)]`. `fields()` lists every named field in
/// declaration order and `assign(index, value)` moves `value` into the field
/// at that position, handing it back if it has the wrong type.
pub trait Record: Sized {
    /// Prefix prepended to every variable name of the record
    fn prefix() -> &'static str {
        ""
    }

    fn fields() -> Vec<FieldDescriptor>;

    fn assign(&mut self, index: usize, value: Box<dyn Any>) -> Result<(), Box<dyn Any>>;

    /// Build the record from its `Default` value and the process environment
    ///
    /// # Errors
    ///
    /// See [`crate::inject`].
    fn from_env() -> Result<Self, InjectError>
    where
        Self: Default,
    {
        let mut record = Self::default();
        crate::inject(&mut record)?;
        Ok(record)
    }
}

/// Where a field value came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Source {
    Environment,
    Default,
}

/// Populates records using one registry and one environment.
#[derive(Debug)]
pub struct Injector<'a, E: ?Sized> {
    registry: &'a Registry,
    env: &'a E,
}

impl<'a, E> Injector<'a, E>
where
    E: Environment + ?Sized,
{
    pub fn new(registry: &'a Registry, env: &'a E) -> Self {
        Self { registry, env }
    }

    /// Populate the annotated fields of `target` in declaration order.
    ///
    /// Fields without an annotation, or whose annotation does not describe a
    /// binding, keep their current value. `String` fields receive the
    /// resolved string; every other field goes through the converter
    /// registered for its type.
    ///
    /// # Errors
    ///
    /// Stops at the first failing field. Fields before it stay populated.
    /// - [`InjectError::MissingVariable`]: variable not set and no default
    /// - [`InjectError::NotUnicode`]: variable set to a non-Unicode value
    /// - [`InjectError::NoConverter`]: no converter for a non-string field
    /// - [`InjectError::Conversion`]: the converter rejected the value
    /// - [`InjectError::OutputMismatch`]: the converter returned another type
    pub fn inject<R: Record>(&self, target: &mut R) -> Result<(), InjectError> {
        let prefix = R::prefix();

        for (index, field) in R::fields().into_iter().enumerate() {
            let Some(annotation) = field.annotation else {
                trace!(field = field.name, "skipping unannotated field");
                continue;
            };
            let Some(tag) = Tag::parse(annotation) else {
                trace!(field = field.name, annotation, "skipping field without binding");
                continue;
            };

            let variable = format!("{}{}", prefix, tag.variable_name);
            let (raw, source) = self.resolve(&variable, tag.default_value)?;
            debug!(field = field.name, variable = %variable, ?source, "resolved field");

            let value: Box<dyn Any> = if field.is_string() {
                Box::new(raw)
            } else {
                self.convert(&field, &variable, &raw)?
            };

            target
                .assign(index, value)
                .map_err(|_| InjectError::OutputMismatch {
                    field: field.name,
                    type_name: field.type_name,
                })?;
        }

        Ok(())
    }

    fn resolve(
        &self,
        variable: &str,
        default: Option<String>,
    ) -> Result<(String, Source), InjectError> {
        if let Some(value) = self.env.lookup(variable)? {
            return Ok((value, Source::Environment));
        }

        default
            .map(|value| (value, Source::Default))
            .ok_or_else(|| InjectError::missing(variable))
    }

    fn convert(
        &self,
        field: &FieldDescriptor,
        variable: &str,
        raw: &str,
    ) -> Result<Box<dyn Any>, InjectError> {
        let converter = self
            .registry
            .lookup(field.type_id)
            .ok_or(InjectError::NoConverter {
                field: field.name,
                type_name: field.type_name,
            })?;

        match converter.convert(raw) {
            Ok(value) => Ok(value as Box<dyn Any>),
            Err(source) => Err(InjectError::Conversion {
                name: variable.to_string(),
                type_name: field.type_name,
                source,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[derive(Debug, Default)]
    struct Server {
        host: String,
        port: u16,
        label: String,
    }

    impl Record for Server {
        fn fields() -> Vec<FieldDescriptor> {
            vec![
                FieldDescriptor::of::<String>("host", Some("HOST")),
                FieldDescriptor::of::<u16>("port", Some("PORT, 8080")),
                FieldDescriptor::of::<String>("label", None),
            ]
        }

        fn assign(&mut self, index: usize, value: Box<dyn Any>) -> Result<(), Box<dyn Any>> {
            match index {
                0 => self.host = *value.downcast::<String>()?,
                1 => self.port = *value.downcast::<u16>()?,
                2 => self.label = *value.downcast::<String>()?,
                _ => return Err(value),
            }
            Ok(())
        }
    }

    fn vars(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_inject_with_converter() {
        let registry = Registry::new();
        registry.register_from_str::<u16>().unwrap();
        let env = vars(&[("HOST", "localhost"), ("PORT", "9090")]);

        let mut server = Server::default();
        Injector::new(&registry, &env).inject(&mut server).unwrap();

        assert_eq!(server.host, "localhost");
        assert_eq!(server.port, 9090);
        assert_eq!(server.label, "");
    }

    #[test]
    fn test_inject_uses_default() {
        let registry = Registry::new();
        registry.register_from_str::<u16>().unwrap();
        let env = vars(&[("HOST", "localhost")]);

        let mut server = Server::default();
        Injector::new(&registry, &env).inject(&mut server).unwrap();

        assert_eq!(server.port, 8080);
    }

    #[test]
    fn test_inject_missing_variable() {
        let registry = Registry::new();
        let env = vars(&[]);

        let mut server = Server::default();
        let err = Injector::new(&registry, &env)
            .inject(&mut server)
            .unwrap_err();

        assert!(matches!(err, InjectError::MissingVariable { ref name } if name == "HOST"));
        assert_eq!(err.variable(), Some("HOST"));
    }

    #[test]
    fn test_inject_no_converter() {
        let registry = Registry::new();
        let env = vars(&[("HOST", "localhost"), ("PORT", "9090")]);

        let mut server = Server::default();
        let err = Injector::new(&registry, &env)
            .inject(&mut server)
            .unwrap_err();

        assert!(matches!(
            err,
            InjectError::NoConverter { field: "port", type_name: "u16" }
        ));
        assert_eq!(server.host, "localhost");
    }

    #[test]
    fn test_inject_output_mismatch() {
        use crate::registry::{Converter, Signature, TypeShape};
        use crate::BoxError;

        // Declares u16 but hands back an i64
        struct Liar;

        impl Converter for Liar {
            fn signature(&self) -> Signature {
                Signature::new([TypeShape::of::<str>()], [TypeShape::of::<u16>()])
            }

            fn convert(&self, _raw: &str) -> Result<Box<dyn Any + Send>, BoxError> {
                Ok(Box::new(7_i64) as Box<dyn Any + Send>)
            }
        }

        let registry = Registry::new();
        registry.register(Liar).unwrap();
        let env = vars(&[("HOST", "localhost")]);

        let mut server = Server::default();
        let err = Injector::new(&registry, &env)
            .inject(&mut server)
            .unwrap_err();

        assert!(matches!(err, InjectError::OutputMismatch { field: "port", .. }));
        assert_eq!(server.port, 0);
    }
}
