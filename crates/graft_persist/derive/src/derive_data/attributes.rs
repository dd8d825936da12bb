use proc_macro2::Span;
use syn::meta::ParseNestedMeta;
use syn::spanned::Spanned;
use syn::{Attribute, LitStr, Path};

use crate::PERSIST_ATTRIBUTE_NAME;

fn set_flag(slot: &mut Option<Span>, meta: &ParseNestedMeta<'_>) -> syn::Result<()> {
    if slot.is_some() {
        return Err(meta.error("duplicate attribute"));
    }
    *slot = Some(meta.path.span());
    Ok(())
}

fn set_value<T: syn::parse::Parse>(slot: &mut Option<T>, meta: &ParseNestedMeta<'_>) -> syn::Result<()> {
    if slot.is_some() {
        return Err(meta.error("duplicate attribute"));
    }
    *slot = Some(meta.value()?.parse()?);
    Ok(())
}

// -----------------------------------------------------------------------------
// TypeAttributes

/// Container level `#[persist(...)]` options.
#[derive(Default)]
pub(crate) struct TypeAttributes {
    pub type_path: Option<LitStr>,
    pub value: Option<Span>,
    pub compact: Option<Span>,
    pub resource: Option<Span>,
    pub auto_register: Option<Span>,
    pub before_serialization: Option<Path>,
    pub after_serialization: Option<Path>,
    pub after_deserialization: Option<Path>,
}

impl TypeAttributes {
    pub fn parse_attrs(attrs: &[Attribute]) -> syn::Result<Self> {
        let mut this = Self::default();
        for attr in attrs {
            if !attr.path().is_ident(PERSIST_ATTRIBUTE_NAME) {
                continue;
            }
            attr.parse_nested_meta(|meta| {
                let path = &meta.path;
                if path.is_ident("type_path") {
                    set_value(&mut this.type_path, &meta)
                } else if path.is_ident("value") {
                    set_flag(&mut this.value, &meta)
                } else if path.is_ident("compact") {
                    set_flag(&mut this.compact, &meta)
                } else if path.is_ident("resource") {
                    set_flag(&mut this.resource, &meta)
                } else if path.is_ident("auto_register") {
                    set_flag(&mut this.auto_register, &meta)
                } else if path.is_ident("before_serialization") {
                    set_value(&mut this.before_serialization, &meta)
                } else if path.is_ident("after_serialization") {
                    set_value(&mut this.after_serialization, &meta)
                } else if path.is_ident("after_deserialization") {
                    set_value(&mut this.after_deserialization, &meta)
                } else {
                    Err(meta.error("unsupported type attribute"))
                }
            })?;
        }

        if let Some(lit) = &this.type_path
            && lit.value().is_empty()
        {
            return Err(syn::Error::new(lit.span(), "`type_path` cannot be empty"));
        }
        Ok(this)
    }
}

// -----------------------------------------------------------------------------
// FieldAttributes

/// Field level `#[persist(...)]` options.
#[derive(Default)]
pub(crate) struct FieldAttributes {
    pub rename: Option<LitStr>,
    pub required: Option<Span>,
    pub member: Option<Span>,
    pub serialize_if: Option<Path>,
    pub item_if: Option<Path>,
    pub skip: Option<Span>,
}

impl FieldAttributes {
    pub fn parse_attrs(attrs: &[Attribute]) -> syn::Result<Self> {
        let mut this = Self::default();
        for attr in attrs {
            if !attr.path().is_ident(PERSIST_ATTRIBUTE_NAME) {
                continue;
            }
            attr.parse_nested_meta(|meta| {
                let path = &meta.path;
                if path.is_ident("rename") {
                    set_value(&mut this.rename, &meta)
                } else if path.is_ident("required") {
                    set_flag(&mut this.required, &meta)
                } else if path.is_ident("member") {
                    set_flag(&mut this.member, &meta)
                } else if path.is_ident("serialize_if") {
                    set_value(&mut this.serialize_if, &meta)
                } else if path.is_ident("item_if") {
                    set_value(&mut this.item_if, &meta)
                } else if path.is_ident("skip") {
                    set_flag(&mut this.skip, &meta)
                } else {
                    Err(meta.error("unsupported field attribute"))
                }
            })?;
        }
        this.validate()?;
        Ok(this)
    }

    fn validate(&self) -> syn::Result<()> {
        if let Some(span) = self.skip
            && (self.rename.is_some() || self.required.is_some() || self.is_conditional())
        {
            return Err(syn::Error::new(span, "`skip` cannot be combined with other attributes"));
        }
        if let Some(span) = self.required
            && self.is_conditional()
        {
            return Err(syn::Error::new(
                span,
                "`required` cannot be combined with `member`, `serialize_if` or `item_if`",
            ));
        }
        if let Some(lit) = &self.rename
            && lit.value().is_empty()
        {
            return Err(syn::Error::new(lit.span(), "`rename` cannot be empty"));
        }
        Ok(())
    }

    /// Whether the field may be absent from what was written.
    pub fn is_conditional(&self) -> bool {
        self.member.is_some() || self.serialize_if.is_some() || self.item_if.is_some()
    }
}
