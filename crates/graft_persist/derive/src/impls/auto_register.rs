use proc_macro2::TokenStream;

use crate::derive_data::PersistStruct;

/// Submits the type to the global registry when `auto_register` is set.
#[cfg(feature = "auto_register")]
pub(crate) fn get_auto_register_impl(data: &PersistStruct) -> TokenStream {
    use quote::quote_spanned;

    let Some(span) = data.attrs.auto_register else {
        return TokenStream::new();
    };
    let auto_register_ = crate::path::auto_register_(&data.graft_persist);
    let ident = &data.ident;

    quote_spanned! { span =>
        #auto_register_::inventory::submit!{
            #auto_register_::__AutoRegisterFunc(
                <#ident as #auto_register_::__RegisterType>::__register
            )
        }
    }
}

#[cfg(not(feature = "auto_register"))]
pub(crate) fn get_auto_register_impl(_: &PersistStruct) -> TokenStream {
    TokenStream::new()
}
