//! Parsing of `#[environ("...")]` field annotations

/// Separator between the variable name and its default.
const SEPARATOR: char = ',';

/// Binding described by a field annotation.
///
/// `"PORT"` binds the field to `PORT` with no fallback, `"PORT, 8080"` falls
/// back to the literal `8080` when `PORT` is not set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tag {
    /// Environment variable name, trimmed
    pub variable_name: String,
    /// Literal default, trimmed
    pub default_value: Option<String>,
}

impl Tag {
    /// Parse a raw annotation.
    ///
    /// Returns `None` when the annotation does not describe a binding: an
    /// empty annotation, or one with more than two comma-separated tokens.
    /// Such fields are skipped by the injector rather than rejected.
    pub fn parse(raw: &str) -> Option<Self> {
        if raw.trim().is_empty() {
            return None;
        }

        let mut tokens = raw.split(SEPARATOR).map(str::trim);
        let variable_name = tokens.next()?.to_string();
        let default_value = tokens.next().map(str::to_string);

        if tokens.next().is_some() {
            return None;
        }

        Some(Self {
            variable_name,
            default_value,
        })
    }
}
