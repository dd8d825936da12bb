use proc_macro2::TokenStream;
use quote::quote;

use crate::derive_data::{PersistField, PersistStruct};

fn field_flags(field: &PersistField, info_: &TokenStream) -> TokenStream {
    let attrs = &field.attrs;
    let mut flags = Vec::new();
    if attrs.required.is_some() {
        flags.push(quote!(REQUIRED));
    }
    if attrs.member.is_some() {
        flags.push(quote!(MEMBER));
    }
    if attrs.serialize_if.is_some() {
        flags.push(quote!(CONDITIONAL));
    }
    if attrs.item_if.is_some() {
        flags.push(quote!(ITEM_FILTERED));
    }
    quote! {
        #info_::FieldFlags::empty() #( .union(#info_::FieldFlags::#flags) )*
    }
}

fn class_flags(data: &PersistStruct, info_: &TokenStream) -> TokenStream {
    let mut flags = Vec::new();
    if data.attrs.compact.is_some() {
        flags.push(quote!(COMPACT));
    }
    if data.attrs.resource.is_some() {
        flags.push(quote!(RESOURCE));
    }
    quote! {
        #info_::ClassFlags::empty() #( .union(#info_::ClassFlags::#flags) )*
    }
}

/// Body of `Record::class_info`: a static `ClassInfo` over a static field
/// table in tag order.
pub(crate) fn class_info_body(data: &PersistStruct) -> TokenStream {
    let graft_persist = &data.graft_persist;
    let info_ = crate::path::info_(graft_persist);
    let ident = &data.ident;

    let type_path = match &data.attrs.type_path {
        Some(lit) => quote!(#lit),
        None => quote! {
            ::core::concat!(::core::module_path!(), "::", ::core::stringify!(#ident))
        },
    };
    let kind = if data.attrs.value.is_some() {
        quote!(#info_::ClassKind::Value)
    } else {
        quote!(#info_::ClassKind::Reference)
    };

    let len = data.fields.len();
    let fields = data.fields.iter().map(|field| {
        let name = field.ident.to_string();
        let name = name.strip_prefix("r#").unwrap_or(&name);
        let tag = &field.tag;
        let ty = &field.ty;
        let flags = field_flags(field, &info_);
        quote! {
            #info_::FieldInfo::new(#name, #tag, <#ty as #graft_persist::Persist>::shape)
                .with_flags(#flags)
        }
    });
    let flags = class_flags(data, &info_);

    quote! {
        static FIELDS: [#info_::FieldInfo; #len] = [ #(#fields),* ];
        static INFO: #info_::ClassInfo = #info_::ClassInfo::new(#type_path, &FIELDS)
            .with_kind(#kind)
            .with_flags(#flags);
        &INFO
    }
}
