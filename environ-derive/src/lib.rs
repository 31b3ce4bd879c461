//! Derive macro implementation for environ

use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use quote::quote;
use syn::ext::IdentExt;
use syn::punctuated::Punctuated;
use syn::token::Comma;
use syn::{parse_macro_input, Data, DeriveInput, Field, Fields};

mod attrs;

use attrs::{FieldAttrs, StructAttrs};

/// `Environ` derive macro
///
/// Implements `environ::Record` for a struct with named fields, making it a
/// target for `environ::inject` and `Record::from_env`.
///
/// # Supported Attributes
///
/// **Struct-level**:
/// - `#[environ(prefix = "PREFIX_")]`: Add prefix to all env var names
///
/// **Field-level**:
/// - `#[environ("VAR_NAME")]`: Bind the field to `VAR_NAME`
/// - `#[environ("VAR_NAME, default")]`: Use `default` if `VAR_NAME` is not set
///
/// Fields without an annotation are left untouched. Every field type must be
/// `'static`.
///
/// # Example
///
/// See the `environ` crate documentation for usage examples.
#[proc_macro_derive(Environ, attributes(environ))]
pub fn derive_environ(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);

    expand(&input)
        .unwrap_or_else(syn::Error::into_compile_error)
        .into()
}

fn named_fields(input: &DeriveInput) -> syn::Result<&Punctuated<Field, Comma>> {
    match &input.data {
        Data::Struct(data) => match &data.fields {
            Fields::Named(fields) => Ok(&fields.named),
            _ => Err(syn::Error::new_spanned(
                input,
                "Environ only supports structs with named fields",
            )),
        },
        _ => Err(syn::Error::new_spanned(
            input,
            "Environ only supports structs",
        )),
    }
}

fn expand(input: &DeriveInput) -> syn::Result<TokenStream2> {
    let struct_name = &input.ident;
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();

    let prefix = StructAttrs::from_input(input)?.prefix.unwrap_or_default();
    let fields = named_fields(input)?;

    let mut descriptors = Vec::with_capacity(fields.len());
    let mut assign_arms = Vec::with_capacity(fields.len());

    for (index, field) in fields.iter().enumerate() {
        let Some(field_ident) = field.ident.as_ref() else {
            return Err(syn::Error::new_spanned(field, "expected a named field"));
        };
        let field_type = &field.ty;
        let field_name = field_ident.unraw().to_string();

        let annotation = match FieldAttrs::from_field(field)?.annotation {
            Some(raw) => quote! { ::core::option::Option::Some(#raw) },
            None => quote! { ::core::option::Option::None },
        };

        descriptors.push(quote! {
            ::environ::__private::FieldDescriptor::of::<#field_type>(#field_name, #annotation)
        });
        assign_arms.push(quote! {
            #index => self.#field_ident = *value.downcast::<#field_type>()?,
        });
    }

    Ok(quote! {
        impl #impl_generics ::environ::__private::Record for #struct_name #ty_generics #where_clause {
            fn prefix() -> &'static str {
                #prefix
            }

            fn fields() -> ::environ::__private::Vec<::environ::__private::FieldDescriptor> {
                ::environ::__private::Vec::from([#(#descriptors),*])
            }

            #[allow(unreachable_code)]
            fn assign(
                &mut self,
                index: usize,
                value: ::environ::__private::Box<dyn ::environ::__private::Any>,
            ) -> ::environ::__private::Result<(), ::environ::__private::Box<dyn ::environ::__private::Any>> {
                match index {
                    #(#assign_arms)*
                    _ => return ::environ::__private::Result::Err(value),
                }
                ::environ::__private::Result::Ok(())
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use syn::parse_quote;

    #[test]
    fn test_expand_named_struct() {
        let input: DeriveInput = parse_quote! {
            #[environ(prefix = "APP_")]
            struct Config {
                #[environ("HOST")]
                host: String,
                #[environ("PORT, 8080")]
                port: u16,
                started: bool,
            }
        };

        let tokens = expand(&input).unwrap().to_string();
        assert!(tokens.contains("\"APP_\""));
        assert!(tokens.contains("\"PORT, 8080\""));
        assert!(tokens.contains("downcast :: < u16 >"));
        assert!(tokens.contains("\"started\""));
    }

    #[test]
    fn test_expand_raw_identifier() {
        let input: DeriveInput = parse_quote! {
            struct Config {
                #[environ("KIND")]
                r#type: String,
            }
        };

        let tokens = expand(&input).unwrap().to_string();
        assert!(tokens.contains("\"type\""));
    }

    #[test]
    fn test_reject_enum() {
        let input: DeriveInput = parse_quote! {
            enum Config {
                Host(String),
            }
        };

        let err = expand(&input).unwrap_err();
        assert_eq!(err.to_string(), "Environ only supports structs");
    }

    #[test]
    fn test_reject_tuple_struct() {
        let input: DeriveInput = parse_quote! {
            struct Config(#[environ("HOST")] String);
        };

        let err = expand(&input).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Environ only supports structs with named fields"
        );
    }

    #[test]
    fn test_reject_invalid_field_annotation() {
        let input: DeriveInput = parse_quote! {
            struct Config {
                #[environ(HOST)]
                host: String,
            }
        };

        assert!(expand(&input).is_err());
    }
}
