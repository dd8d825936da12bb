//! Code generation for `#[derive(Persist)]`.

// -----------------------------------------------------------------------------
// Modules

mod auto_register;
mod class_info;
mod trait_object;
mod trait_persist;
mod trait_record;

// -----------------------------------------------------------------------------
// Internal API

use proc_macro2::TokenStream;
use quote::quote;

use crate::derive_data::PersistStruct;

pub(crate) fn impl_persist(data: &PersistStruct) -> TokenStream {
    let record = trait_record::impl_trait_record(data);
    let persist = trait_persist::impl_trait_persist(data);
    let object = trait_object::impl_trait_object(data);
    let auto_register = auto_register::get_auto_register_impl(data);

    quote! {
        #record
        #persist
        #object
        #auto_register
    }
}
