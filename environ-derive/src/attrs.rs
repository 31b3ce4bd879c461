//! Attribute parsing for `#[environ(...)]` annotations.
//!
//! Field annotations are kept verbatim: the variable name and default are
//! split out at run time by `environ::tag::Tag::parse`, so a malformed
//! binding is skipped exactly as a hand-written `Record` implementation
//! would skip it.

use syn::{DeriveInput, Field, LitStr};

const FIELD_USAGE: &str =
    "expected #[environ(\"VAR_NAME\")] or #[environ(\"VAR_NAME, default\")]";

/// Parsed struct-level `#[environ(...)]` attributes.
#[derive(Debug, Default)]
pub struct StructAttrs {
    /// Prefix prepended to every variable name.
    pub prefix: Option<String>,
}

impl StructAttrs {
    /// Extract `#[environ(prefix = "...")]` from the derive input.
    pub fn from_input(input: &DeriveInput) -> syn::Result<Self> {
        let mut attrs = Self::default();

        for attr in &input.attrs {
            if !attr.path().is_ident("environ") {
                continue;
            }

            attr.parse_nested_meta(|meta| {
                // prefix = "..."
                if meta.path.is_ident("prefix") {
                    let value: LitStr = meta.value()?.parse()?;
                    attrs.prefix = Some(value.value());
                    return Ok(());
                }

                Err(meta.error("unsupported struct-level environ attribute"))
            })?;
        }

        Ok(attrs)
    }
}

/// Parsed field-level `#[environ("...")]` attribute.
#[derive(Debug, Default)]
pub struct FieldAttrs {
    /// Raw annotation string, if the field carries one.
    pub annotation: Option<String>,
}

impl FieldAttrs {
    /// Extract the `#[environ("...")]` annotation of a struct field.
    ///
    /// Attributes other than `environ` are left to other macros.
    pub fn from_field(field: &Field) -> syn::Result<Self> {
        let mut attrs = Self::default();

        for attr in &field.attrs {
            if !attr.path().is_ident("environ") {
                continue;
            }

            if attrs.annotation.is_some() {
                return Err(syn::Error::new_spanned(
                    attr,
                    "duplicate #[environ] annotation on field",
                ));
            }

            let lit: LitStr = attr
                .parse_args()
                .map_err(|e| syn::Error::new(e.span(), FIELD_USAGE))?;
            attrs.annotation = Some(lit.value());
        }

        Ok(attrs)
    }
}
