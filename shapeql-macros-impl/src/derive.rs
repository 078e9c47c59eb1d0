use proc_macro2::TokenStream;
use quote::quote;
use shapeql_core::Tag;

use crate::{PField, PStruct};

/// Entry point of `#[derive(Selection)]`.
pub fn derive_selection(input: TokenStream) -> TokenStream {
    match PStruct::parse(input) {
        Ok(parsed) => emit(&parsed),
        Err(err) => err.to_compile_error(),
    }
}

/// Emits `Selection`, `Reflect` and `ReflectStruct` impls for a parsed struct.
///
/// GraphQL tags are interpreted here, once, so the emitted `Field` constants
/// already carry names, fragment conditions and flags.
pub fn emit(parsed: &PStruct) -> TokenStream {
    let name = &parsed.name;
    let type_identifier = name.to_string();

    let field_defs: Vec<TokenStream> = parsed.fields.iter().map(field_def).collect();
    let fields = if field_defs.is_empty() {
        quote! { &[] }
    } else {
        quote! { &const { [#(#field_defs),*] } }
    };

    let readable: Vec<_> = parsed
        .fields
        .iter()
        .enumerate()
        .filter(|(_, f)| !f.skip)
        .collect();
    let field_arms = readable.iter().map(|(index, f)| {
        let ident = &f.ident;
        quote! { #index => ::core::option::Option::Some(&self.#ident), }
    });
    let field_mut_arms = readable.iter().map(|(index, f)| {
        let ident = &f.ident;
        quote! { #index => ::core::option::Option::Some(&mut self.#ident), }
    });

    quote! {
        #[automatically_derived]
        impl ::shapeql::Selection for #name {
            const SHAPE: &'static ::shapeql::Shape = &const {
                ::shapeql::Shape {
                    type_identifier: #type_identifier,
                    def: ::shapeql::Def::Struct(::shapeql::StructType {
                        fields: #fields,
                    }),
                }
            };
        }

        #[automatically_derived]
        impl ::shapeql::Reflect for #name {
            fn shape(&self) -> &'static ::shapeql::Shape {
                <Self as ::shapeql::Selection>::SHAPE
            }

            fn peek(&self) -> ::shapeql::Peek<'_> {
                ::shapeql::Peek::Struct(self)
            }

            fn poke(&mut self) -> ::shapeql::Poke<'_> {
                ::shapeql::Poke::Struct(self)
            }

            fn reset(&mut self) {
                *self = <Self as ::core::default::Default>::default();
            }
        }

        #[automatically_derived]
        impl ::shapeql::ReflectStruct for #name {
            fn fields(&self) -> &'static [::shapeql::Field] {
                <Self as ::shapeql::Selection>::SHAPE.fields()
            }

            fn field(&self, index: usize) -> ::core::option::Option<&dyn ::shapeql::Reflect> {
                match index {
                    #(#field_arms)*
                    _ => ::core::option::Option::None,
                }
            }

            fn field_mut(
                &mut self,
                index: usize,
            ) -> ::core::option::Option<&mut dyn ::shapeql::Reflect> {
                match index {
                    #(#field_mut_arms)*
                    _ => ::core::option::Option::None,
                }
            }
        }
    }
}

fn field_def(field: &PField) -> TokenStream {
    let name = &field.name;
    let mut def = quote! { ::shapeql::Field::new(#name) };

    if let Some(tag) = &field.tag {
        def = match Tag::parse(tag) {
            Tag::Named(graphql_name) => quote! { #def.graphql_name(#graphql_name) },
            Tag::Typename => quote! { #def.typename() },
            Tag::Fragment { on: Some(on) } => {
                quote! { #def.fragment(::core::option::Option::Some(#on)) }
            }
            Tag::Fragment { on: None } => quote! { #def.fragment(::core::option::Option::None) },
        };
    }
    if field.embedded {
        def = quote! { #def.embedded() };
    }
    if field.skip {
        def = quote! { #def.skip() };
    }
    def
}
