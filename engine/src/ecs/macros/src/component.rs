use proc_macro::TokenStream;
use quote::quote;
use syn::{DeriveInput, parse_macro_input};

pub fn derive_component(input: TokenStream) -> TokenStream {
    let ast = parse_macro_input!(input as DeriveInput);

    let struct_name = &ast.ident;
    let (impl_generics, type_generics, where_clause) = ast.generics.split_for_impl();

    // `::forage_engine` resolves inside the engine crate through `extern crate self as
    // forage_engine;` in its lib.rs, and to the dependency everywhere else.
    TokenStream::from(quote! {
        impl #impl_generics ::forage_engine::ecs::Component for #struct_name #type_generics #where_clause {
        }
    })
}
