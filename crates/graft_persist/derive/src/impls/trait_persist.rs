use proc_macro2::TokenStream;
use quote::quote;

use crate::derive_data::PersistStruct;

/// `Persist` and `Nullable`: a record field is a class id followed by a
/// body, and a null is class id 0.
pub(crate) fn impl_trait_persist(data: &PersistStruct) -> TokenStream {
    let graft_persist = &data.graft_persist;
    let persist_error_ = crate::path::persist_error_(graft_persist);
    let result_ = crate::path::result_(graft_persist);
    let info_ = crate::path::info_(graft_persist);
    let ident = &data.ident;

    quote! {
        impl #graft_persist::Persist for #ident {
            #[inline]
            fn shape() -> #info_::Shape {
                #info_::Shape::Record
            }

            #[inline]
            fn write(&self, ser: &mut #graft_persist::Serializer) {
                ser.write_record(self);
            }

            #[inline]
            fn read(de: &mut #graft_persist::Deserializer<'_>) -> #result_<Self, #persist_error_> {
                de.read_record_or_default::<Self>()
            }

            #[inline]
            fn deep_clone(&self, cl: &mut #graft_persist::Cloner<'_>) -> #result_<Self, #persist_error_> {
                cl.clone_record(self)
            }
        }

        impl #graft_persist::Nullable for #ident {
            #[inline]
            fn option_shape() -> #info_::Shape {
                #info_::Shape::Record
            }

            fn write_option(value: ::core::option::Option<&Self>, ser: &mut #graft_persist::Serializer) {
                match value {
                    ::core::option::Option::Some(value) => ser.write_record(value),
                    ::core::option::Option::None => ser.write_null(),
                }
            }

            #[inline]
            fn read_option(
                de: &mut #graft_persist::Deserializer<'_>,
            ) -> #result_<::core::option::Option<Self>, #persist_error_> {
                de.read_record::<Self>()
            }
        }
    }
}
