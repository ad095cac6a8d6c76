//! # Herald macros
//!
//! Procedural macros shared by the workspace crates.
//!
//! ## Usage
//! ```toml
//! [dependencies]
//! herald-derive = { path = "../infra/derive" }
//! thiserror = "2"
//! ```

mod error;

use proc_macro::TokenStream;
use syn::{DeriveInput, parse_macro_input};

/// Turns an enum into a workspace error type.
///
/// # Generated Items
///
/// * `#[derive(Debug, thiserror::Error)]`, unless already derived.
/// * A module-local `format_context` helper for `#[error(...)]` strings.
/// * A `<Name>Ext` trait adding `.context(...)` to `Result<T, Name>`.
/// * For variants whose only fields are `source` and `context`:
///   `From<Source>` and `.context(...)` on `Result<T, Source>`, so `?` converts.
///
/// # Requirements
///
/// 1. Variants use named fields; tuple and unit variants are rejected.
/// 2. A variant with a `source` field (or a `#[source]` field) must also carry
///    `context: Option<Cow<'static, str>>`.
///
/// # Example
///
/// ```rust,ignore
/// use herald_derive::herald_error;
/// use std::borrow::Cow;
///
/// #[herald_error]
/// pub enum LoadError {
///     #[error("I/O failure{}: {source}", format_context(.context))]
///     Io { source: std::io::Error, context: Option<Cow<'static, str>> },
///
///     #[error("Bad value for {key}{}", format_context(.context))]
///     BadValue { key: String, context: Option<Cow<'static, str>> },
/// }
///
/// fn read(path: &str) -> Result<String, LoadError> {
///     std::fs::read_to_string(path).context("reading settings")
/// }
/// ```
#[proc_macro_attribute]
pub fn herald_error(_args: TokenStream, item: TokenStream) -> TokenStream {
    let input = parse_macro_input!(item as DeriveInput);
    error::expand(input).into()
}
