#![doc = include_str!("../README.md")]

/// Derives `Selection` for a struct with named fields.
///
/// Field attributes: `#[graphql("tag")]`, `#[graphql(embed)]` and
/// `#[graphql(skip)]`. Container attribute: `#[graphql(rename_all = "...")]`.
#[proc_macro_derive(Selection, attributes(graphql))]
pub fn selection(input: proc_macro::TokenStream) -> proc_macro::TokenStream {
    shapeql_macros_impl::derive_selection(input.into()).into()
}
