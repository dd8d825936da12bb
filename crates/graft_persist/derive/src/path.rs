//! Paths into `graft_persist` used by the generated code.

use proc_macro2::TokenStream;
use quote::quote;

/// Access path to the `graft_persist` crate, resolved from the caller's
/// `Cargo.toml`. See `graft_macro_utils::Manifest`.
pub(crate) fn graft_persist() -> syn::Path {
    graft_macro_utils::Manifest::shared(|manifest| manifest.get_crate_path("graft_persist"))
}

#[inline]
pub(crate) fn macro_exports_(graft_persist: &syn::Path) -> TokenStream {
    quote! { #graft_persist::__macro_exports }
}

#[inline]
#[cfg(feature = "auto_register")]
pub(crate) fn auto_register_(graft_persist: &syn::Path) -> TokenStream {
    quote! { #graft_persist::__macro_exports::auto_register }
}

#[inline]
pub(crate) fn info_(graft_persist: &syn::Path) -> TokenStream {
    quote! { #graft_persist::info }
}

#[inline]
pub(crate) fn persist_error_(graft_persist: &syn::Path) -> TokenStream {
    quote! { #graft_persist::PersistError }
}

#[inline]
pub(crate) fn result_(graft_persist: &syn::Path) -> TokenStream {
    quote! { #graft_persist::__macro_exports::Result }
}
