use fxhash::FxHashSet;
use proc_macro2::TokenStream;
use quote::{format_ident, quote};
use syn::{Attribute, Data, DeriveInput, Field, Fields, FieldsNamed, Ident, Type, Variant};

const CONTEXT_FIELD: &str = "context";
const SOURCE_FIELD: &str = "source";

/// What the expansion needs to know about one variant.
struct VariantShape<'a> {
    ident: &'a Ident,
    source: Option<&'a Field>,
    has_context: bool,
    /// `true` when `source` and `context` are the only fields, i.e. the
    /// variant can be built from its source alone.
    source_only: bool,
    cfg_attrs: Vec<Attribute>,
}

pub fn expand(input: DeriveInput) -> TokenStream {
    let name = &input.ident;
    let ext_trait = format_ident!("{name}Ext");

    let Data::Enum(data) = &input.data else {
        return syn::Error::new_spanned(&input.ident, "herald_error can only be applied to enums")
            .to_compile_error();
    };

    let shapes = match data.variants.iter().map(variant_shape).collect::<Result<Vec<_>, _>>() {
        Ok(shapes) => shapes,
        Err(err) => return err.to_compile_error(),
    };

    let derives = missing_derives(&input);
    let ext_impl = context_trait(name, &ext_trait, &shapes);
    let from_impls = shapes.iter().filter(|s| s.source_only).map(|s| source_impl(name, &ext_trait, s));

    quote! {
        #derives
        #input

        #ext_impl
        #(#from_impls)*

        #[allow(dead_code)]
        fn format_context(
            context: &Option<std::borrow::Cow<'static, str>>,
        ) -> std::borrow::Cow<'static, str> {
            context
                .as_ref()
                .map_or(std::borrow::Cow::Borrowed(""), |c| std::borrow::Cow::Owned(format!(" ({c})")))
        }
    }
}

fn variant_shape(variant: &Variant) -> Result<VariantShape<'_>, syn::Error> {
    let Fields::Named(fields) = &variant.fields else {
        return Err(syn::Error::new_spanned(
            variant,
            "herald_error variants must use named fields",
        ));
    };

    let context = context_field(fields)?;
    let source = fields.named.iter().find(|field| is_source(field));

    if source.is_some() && context.is_none() {
        return Err(syn::Error::new_spanned(
            &variant.ident,
            "variants with a source need a `context: Option<Cow<'static, str>>` field",
        ));
    }

    Ok(VariantShape {
        ident: &variant.ident,
        source,
        has_context: context.is_some(),
        source_only: source.is_some() && fields.named.len() == 2,
        cfg_attrs: variant.attrs.iter().filter(|attr| attr.path().is_ident("cfg")).cloned().collect(),
    })
}

fn context_field(fields: &FieldsNamed) -> Result<Option<&Field>, syn::Error> {
    let Some(field) =
        fields.named.iter().find(|f| f.ident.as_ref().is_some_and(|i| i == CONTEXT_FIELD))
    else {
        return Ok(None);
    };

    if is_optional_cow(&field.ty) {
        Ok(Some(field))
    } else {
        Err(syn::Error::new_spanned(&field.ty, "context field must be Option<Cow<'static, str>>"))
    }
}

fn is_source(field: &Field) -> bool {
    field.ident.as_ref().is_some_and(|ident| ident == SOURCE_FIELD)
        || field.attrs.iter().any(|attr| attr.path().is_ident("source"))
}

fn missing_derives(input: &DeriveInput) -> TokenStream {
    let present = derived_traits(input);
    let mut derives = Vec::new();
    if !present.contains("Debug") {
        derives.push(quote! { Debug });
    }
    if !present.contains("Error") {
        derives.push(quote! { ::thiserror::Error });
    }

    if derives.is_empty() { quote! {} } else { quote! { #[derive(#(#derives),*)] } }
}

fn context_trait(name: &Ident, ext_trait: &Ident, shapes: &[VariantShape<'_>]) -> TokenStream {
    let arms = shapes.iter().filter(|s| s.has_context).map(|s| {
        let ident = s.ident;
        let cfg_attrs = &s.cfg_attrs;
        quote! { #(#cfg_attrs)* #name::#ident { context: slot, .. } => *slot = Some(context.into()), }
    });

    quote! {
        /// Attaches human-readable context to a failed result.
        pub trait #ext_trait<T> {
            /// Records `context` on the error, replacing any previous context.
            ///
            /// # Errors
            /// Returns the same error, annotated.
            fn context(self, context: impl Into<std::borrow::Cow<'static, str>>) -> Result<T, #name>;
        }

        #[automatically_derived]
        impl<T> #ext_trait<T> for Result<T, #name> {
            #[inline]
            fn context(self, context: impl Into<std::borrow::Cow<'static, str>>) -> Self {
                self.map_err(|mut err| {
                    match &mut err {
                        #(#arms)*
                        _ => {}
                    }
                    err
                })
            }
        }
    }
}

fn source_impl(name: &Ident, ext_trait: &Ident, shape: &VariantShape<'_>) -> TokenStream {
    let ident = shape.ident;
    let cfg_attrs = &shape.cfg_attrs;
    let Some(source) = shape.source else {
        return quote! {};
    };
    let source_ty = &source.ty;
    let source_name = source.ident.as_ref();

    quote! {
        #(#cfg_attrs)*
        #[automatically_derived]
        impl From<#source_ty> for #name {
            #[inline]
            fn from(#source_name: #source_ty) -> Self {
                Self::#ident { #source_name, context: None }
            }
        }

        #(#cfg_attrs)*
        #[automatically_derived]
        impl<T> #ext_trait<T> for ::std::result::Result<T, #source_ty> {
            #[inline]
            fn context(
                self,
                context: impl Into<std::borrow::Cow<'static, str>>,
            ) -> ::std::result::Result<T, #name> {
                self.map_err(|#source_name| #name::#ident { #source_name, context: Some(context.into()) })
            }
        }
    }
}

fn derived_traits(input: &DeriveInput) -> FxHashSet<String> {
    let mut traits = FxHashSet::default();

    for attr in input.attrs.iter().filter(|attr| attr.path().is_ident("derive")) {
        let _ = attr.parse_nested_meta(|meta| {
            if let Some(segment) = meta.path.segments.last() {
                traits.insert(segment.ident.to_string());
            }
            Ok(())
        });
    }

    traits
}

/// Matches `Option<Cow<'static, str>>` by its last path segments.
fn is_optional_cow(ty: &Type) -> bool {
    let Some(inner) = single_generic(ty, "Option") else {
        return false;
    };
    let Type::Path(path) = inner else {
        return false;
    };
    let Some(cow) = path.path.segments.last().filter(|seg| seg.ident == "Cow") else {
        return false;
    };
    let syn::PathArguments::AngleBracketed(args) = &cow.arguments else {
        return false;
    };

    let mut args = args.args.iter();
    let static_lifetime =
        matches!(args.next(), Some(syn::GenericArgument::Lifetime(lt)) if lt.ident == "static");
    let str_type = matches!(
        args.next(),
        Some(syn::GenericArgument::Type(Type::Path(p)))
            if p.path.segments.last().is_some_and(|seg| seg.ident == "str")
    );

    static_lifetime && str_type
}

fn single_generic<'a>(ty: &'a Type, wrapper: &str) -> Option<&'a Type> {
    let Type::Path(path) = ty else {
        return None;
    };
    let segment = path.path.segments.last().filter(|seg| seg.ident == wrapper)?;
    let syn::PathArguments::AngleBracketed(args) = &segment.arguments else {
        return None;
    };
    match args.args.first() {
        Some(syn::GenericArgument::Type(inner)) => Some(inner),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use syn::parse_quote;

    fn rejected(input: DeriveInput) -> bool {
        expand(input).to_string().contains("compile_error")
    }

    #[test]
    fn accepts_named_variants_with_context() {
        let input: DeriveInput = parse_quote! {
            pub enum DemoError {
                #[error("io")]
                Io { source: std::io::Error, context: Option<Cow<'static, str>> },
                #[error("bad")]
                Bad { message: String, context: Option<std::borrow::Cow<'static, str>> },
            }
        };
        let expanded = expand(input).to_string();

        assert!(!expanded.contains("compile_error"));
        assert!(expanded.contains("DemoErrorExt"));
        assert!(expanded.contains("impl From < std :: io :: Error > for DemoError"));
    }

    #[test]
    fn skips_from_for_variants_with_extra_fields() {
        let input: DeriveInput = parse_quote! {
            pub enum DemoError {
                #[error("step")]
                Step { step: usize, source: std::io::Error, context: Option<Cow<'static, str>> },
            }
        };
        let expanded = expand(input).to_string();

        assert!(!expanded.contains("compile_error"));
        assert!(!expanded.contains("impl From"));
    }

    #[test]
    fn keeps_existing_derives() {
        let input: DeriveInput = parse_quote! {
            #[derive(Debug)]
            pub enum DemoError {
                #[error("bad")]
                Bad { context: Option<Cow<'static, str>> },
            }
        };
        let expanded = expand(input).to_string();

        assert_eq!(expanded.matches("Debug").count(), 1);
        assert!(expanded.contains(":: thiserror :: Error"));
    }

    #[test]
    fn rejects_source_without_context() {
        assert!(rejected(parse_quote! {
            pub enum DemoError {
                #[error("io")]
                Io { #[source] inner: std::io::Error },
            }
        }));
    }

    #[test]
    fn rejects_wrong_context_type() {
        assert!(rejected(parse_quote! {
            pub enum DemoError {
                #[error("io")]
                Io { source: std::io::Error, context: Option<String> },
            }
        }));
    }

    #[test]
    fn rejects_tuple_variants_and_structs() {
        assert!(rejected(parse_quote! {
            pub enum DemoError {
                #[error("io")]
                Io(std::io::Error),
            }
        }));
        assert!(rejected(parse_quote! {
            pub struct DemoError { message: String }
        }));
    }
}
