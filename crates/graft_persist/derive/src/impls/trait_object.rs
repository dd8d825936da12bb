use proc_macro2::TokenStream;
use quote::quote;

use crate::derive_data::PersistStruct;

pub(crate) fn impl_trait_object(data: &PersistStruct) -> TokenStream {
    let graft_persist = &data.graft_persist;
    let exports_ = crate::path::macro_exports_(graft_persist);
    let persist_error_ = crate::path::persist_error_(graft_persist);
    let result_ = crate::path::result_(graft_persist);
    let ident = &data.ident;

    quote! {
        impl #graft_persist::Object for #ident {
            #[inline]
            fn class(&self) -> &'static #graft_persist::info::ClassInfo {
                <Self as #graft_persist::Record>::class_info()
            }

            #[inline]
            fn as_any(&self) -> &dyn ::core::any::Any {
                self
            }

            #[inline]
            fn as_any_mut(&mut self) -> &mut dyn ::core::any::Any {
                self
            }

            #[inline]
            fn into_any(self: #exports_::Box<Self>) -> #exports_::Box<dyn ::core::any::Any> {
                self
            }

            #[inline]
            fn into_any_arc(
                self: #exports_::Arc<Self>,
            ) -> #exports_::Arc<dyn ::core::any::Any + ::core::marker::Send + ::core::marker::Sync> {
                self
            }

            #[inline]
            fn write_object(&self, ser: &mut #graft_persist::Serializer) {
                ser.write_record(self);
            }

            fn clone_object(
                &self,
                cl: &mut #graft_persist::Cloner<'_>,
            ) -> #result_<#exports_::Box<dyn #graft_persist::Object>, #persist_error_> {
                ::core::result::Result::Ok(#exports_::Box::new(cl.clone_record(self)?))
            }
        }
    }
}
