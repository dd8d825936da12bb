use proc_macro2::{Literal, TokenStream};
use quote::quote;

use crate::derive_data::{PersistField, PersistStruct};

/// Writes one field value; `item_if` fields go through `ItemFilter`.
fn write_value(data: &PersistStruct, field: &PersistField) -> TokenStream {
    let graft_persist = &data.graft_persist;
    let ident = &field.ident;
    let ty = &field.ty;
    match &field.attrs.item_if {
        Some(keep) => quote! {
            #graft_persist::ItemFilter::write_filtered(
                &self.#ident,
                ser,
                |__index, __item| #keep(self, __index, __item),
            );
        },
        None => quote! {
            <#ty as #graft_persist::Persist>::write(&self.#ident, ser);
        },
    }
}

fn write_fields(data: &PersistStruct) -> TokenStream {
    let graft_persist = &data.graft_persist;
    let exports_ = crate::path::macro_exports_(graft_persist);
    let ident = &data.ident;

    if data.is_compact() {
        let writes = data.fields.iter().map(|field| write_value(data, field));
        return quote! { #(#writes)* };
    }

    let default = if data.has_member_fields() {
        quote! {
            static __DEFAULT: #exports_::OnceLock<#ident> = #exports_::OnceLock::new();
            let __default = __DEFAULT.get_or_init(<#ident as ::core::default::Default>::default);
        }
    } else {
        TokenStream::new()
    };

    let writes = data.fields.iter().enumerate().map(|(index, field)| {
        let field_ident = &field.ident;
        let ordinal = Literal::i16_unsuffixed(index as i16 + 1);
        let value = write_value(data, field);

        let mut conditions = Vec::new();
        if let Some(keep) = &field.attrs.serialize_if {
            conditions.push(quote!(#keep(self)));
        }
        if field.attrs.member.is_some() {
            conditions.push(quote!(self.#field_ident != __default.#field_ident));
        }

        let body = quote! {
            ser.write_ordinal(#ordinal);
            #value
        };
        if conditions.is_empty() {
            body
        } else {
            quote! {
                if #(#conditions)&&* {
                    #body
                }
            }
        }
    });

    quote! {
        #default
        #(#writes)*
    }
}

fn read_field(data: &PersistStruct) -> TokenStream {
    let graft_persist = &data.graft_persist;
    let persist_error_ = crate::path::persist_error_(graft_persist);

    let arms = data.fields.iter().enumerate().map(|(index, field)| {
        let field_ident = &field.ident;
        let ty = &field.ty;
        quote! {
            #index => self.#field_ident = <#ty as #graft_persist::Persist>::read(de)?,
        }
    });

    quote! {
        match index {
            #(#arms)*
            _ => {
                return ::core::result::Result::Err(#persist_error_::from(
                    #graft_persist::DecodeErrorKind::BadFieldIndex {
                        class: ::core::convert::Into::into(
                            <Self as #graft_persist::Record>::class_info().type_path(),
                        ),
                        index,
                    },
                ));
            }
        }
        ::core::result::Result::Ok(())
    }
}

fn clone_fields(data: &PersistStruct) -> TokenStream {
    let graft_persist = &data.graft_persist;

    if data.attrs.value.is_some() {
        return quote! {
            ::core::result::Result::Ok(::core::clone::Clone::clone(self))
        };
    }

    let fields = data.fields.iter().map(|field| {
        let field_ident = &field.ident;
        let ty = &field.ty;
        let value = match &field.attrs.item_if {
            Some(keep) => quote! {
                #graft_persist::ItemFilter::clone_filtered(
                    &self.#field_ident,
                    cl,
                    |__index, __item| #keep(self, __index, __item),
                )?
            },
            None => quote! {
                <#ty as #graft_persist::Persist>::deep_clone(&self.#field_ident, cl)?
            },
        };
        match &field.attrs.serialize_if {
            Some(keep) => quote! {
                #field_ident: if #keep(self) {
                    #value
                } else {
                    ::core::default::Default::default()
                },
            },
            None => quote! { #field_ident: #value, },
        }
    });
    let skipped = data.skipped.iter().map(|field_ident| {
        quote! { #field_ident: ::core::default::Default::default(), }
    });

    quote! {
        ::core::result::Result::Ok(Self {
            #(#fields)*
            #(#skipped)*
        })
    }
}

fn hooks(data: &PersistStruct) -> TokenStream {
    let attrs = &data.attrs;
    let before = attrs.before_serialization.as_ref().map(|path| {
        quote! {
            fn before_serialization(&self) {
                #path(self)
            }
        }
    });
    let after = attrs.after_serialization.as_ref().map(|path| {
        quote! {
            fn after_serialization(&self) {
                #path(self)
            }
        }
    });
    let after_de = attrs.after_deserialization.as_ref().map(|path| {
        quote! {
            fn after_deserialization(&mut self) {
                #path(self)
            }
        }
    });
    quote! { #before #after #after_de }
}

pub(crate) fn impl_trait_record(data: &PersistStruct) -> TokenStream {
    let graft_persist = &data.graft_persist;
    let persist_error_ = crate::path::persist_error_(graft_persist);
    let result_ = crate::path::result_(graft_persist);
    let ident = &data.ident;

    let class_info = super::class_info::class_info_body(data);
    let write_fields = write_fields(data);
    let read_field = read_field(data);
    let clone_fields = clone_fields(data);
    let hooks = hooks(data);

    quote! {
        impl #graft_persist::Record for #ident {
            fn class_info() -> &'static #graft_persist::info::ClassInfo {
                #class_info
            }

            #[allow(unused_variables)]
            fn write_fields(&self, ser: &mut #graft_persist::Serializer) {
                #write_fields
            }

            #[allow(unreachable_code)]
            fn read_field(
                &mut self,
                index: usize,
                de: &mut #graft_persist::Deserializer<'_>,
            ) -> #result_<(), #persist_error_> {
                #read_field
            }

            #[allow(unused_variables)]
            fn clone_fields(
                &self,
                cl: &mut #graft_persist::Cloner<'_>,
            ) -> #result_<Self, #persist_error_> {
                #clone_fields
            }

            #hooks
        }
    }
}
