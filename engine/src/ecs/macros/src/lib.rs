mod component;

use proc_macro::TokenStream;

/// Derive the `Component` marker trait. The type must also be `Default + Clone`, since the pool
/// default-constructs components in place and clones them when an entity is copied.
#[proc_macro_derive(Component)]
pub fn derive_component(item: TokenStream) -> TokenStream {
    component::derive_component(item)
}
