//! Procedural macros for the mango project.
//!
//! # `Record`
//!
//! Derives `mango::record::Record` for a struct with named fields.
//!
//! - **Identifier field**: the field marked `#[record(id)]`, or the field whose serde
//!   key is exactly `_id` (`#[serde(rename = "_id")]`). At most one per struct.
//! - **Identifier key**: the field's serde key, honouring `rename` and the container's
//!   `rename_all`.
//! - **Collection name**: `#[record(collection = "...")]`, defaulting to the lowercased
//!   struct name.
//!
//! ```ignore
//! use mango::Record;
//! use serde::{Serialize, Deserialize};
//!
//! #[derive(Debug, Clone, Default, Serialize, Deserialize, Record)]
//! #[record(collection = "spaces")]
//! pub struct Space {
//!     #[serde(rename = "_id", default)]
//!     pub id: String,
//!     pub name: String,
//! }
//! ```

#[allow(unused_extern_crates)]
extern crate self as mango_macros;

mod record;

use proc_macro::TokenStream;
use syn::{Data, DeriveInput, parse_macro_input};

/// Derives `mango::record::Record`.
///
/// # Attributes
///
/// - `#[record(collection = "name")]` on the struct - default collection name
/// - `#[record(id)]` on a field - marks the identifier field
///
/// # Errors
///
/// Returns a compile error if:
/// - Applied to an enum, a union, a tuple struct or a unit struct
/// - More than one field is marked as the identifier
/// - An attribute is malformed or unknown
#[proc_macro_derive(Record, attributes(record))]
pub fn derive_record(input: TokenStream) -> TokenStream {
    let ast = parse_macro_input!(input as DeriveInput);

    let result = match &ast.data {
        Data::Struct(data) => record::expand(&ast, data),
        Data::Enum(_) => Err(syn::Error::new_spanned(
            &ast.ident,
            "Cannot derive Record for enums. Only structs with named fields are supported.",
        )),
        Data::Union(_) => Err(syn::Error::new_spanned(
            &ast.ident,
            "Cannot derive Record for unions. Only structs with named fields are supported.",
        )),
    };

    result
        .unwrap_or_else(syn::Error::into_compile_error)
        .into()
}
