use proc_macro2::Span;
use syn::{Data, DeriveInput, Fields, Ident, LitStr, Type};

use super::{FieldAttributes, TypeAttributes};

// -----------------------------------------------------------------------------
// PersistField

/// A persisted field together with its tag.
pub(crate) struct PersistField {
    pub ident: Ident,
    pub ty: Type,
    pub tag: LitStr,
    pub attrs: FieldAttributes,
}

// -----------------------------------------------------------------------------
// PersistStruct

pub(crate) struct PersistStruct {
    pub ident: Ident,
    pub attrs: TypeAttributes,
    /// Persisted fields, sorted by tag.
    pub fields: Vec<PersistField>,
    /// Fields marked `skip`.
    pub skipped: Vec<Ident>,
    pub graft_persist: syn::Path,
}

impl PersistStruct {
    pub fn from_ast(ast: &DeriveInput) -> syn::Result<Self> {
        if !ast.generics.params.is_empty() || ast.generics.where_clause.is_some() {
            return Err(syn::Error::new_spanned(
                &ast.generics,
                "`Persist` cannot be derived for generic types",
            ));
        }

        let named = match &ast.data {
            Data::Struct(data) => match &data.fields {
                Fields::Named(named) => named,
                _ => {
                    return Err(syn::Error::new(
                        Span::call_site(),
                        "`Persist` requires a struct with named fields",
                    ));
                }
            },
            _ => {
                return Err(syn::Error::new(
                    Span::call_site(),
                    "`Persist` can only be derived for structs",
                ));
            }
        };

        let attrs = TypeAttributes::parse_attrs(&ast.attrs)?;
        let mut fields = Vec::with_capacity(named.named.len());
        let mut skipped = Vec::new();

        for field in &named.named {
            let field_attrs = FieldAttributes::parse_attrs(&field.attrs)?;
            let Some(ident) = field.ident.clone() else {
                continue;
            };
            if field_attrs.skip.is_some() {
                skipped.push(ident);
                continue;
            }
            if let Some(span) = attrs.compact
                && field_attrs.is_conditional()
            {
                let mut err = syn::Error::new_spanned(&ident, "compact classes cannot have conditional fields");
                err.combine(syn::Error::new(span, "class declared compact here"));
                return Err(err);
            }

            let tag = match &field_attrs.rename {
                Some(lit) => lit.clone(),
                None => {
                    let name = ident.to_string();
                    LitStr::new(name.strip_prefix("r#").unwrap_or(&name), ident.span())
                }
            };
            fields.push(PersistField {
                ident,
                ty: field.ty.clone(),
                tag,
                attrs: field_attrs,
            });
        }

        fields.sort_by_cached_key(|field| field.tag.value());
        for pair in fields.windows(2) {
            if pair[0].tag.value() == pair[1].tag.value() {
                let mut err = syn::Error::new(pair[1].tag.span(), "duplicate field tag");
                err.combine(syn::Error::new(pair[0].tag.span(), "first used here"));
                return Err(err);
            }
        }
        if fields.len() > i16::MAX as usize {
            return Err(syn::Error::new(Span::call_site(), "too many persisted fields"));
        }

        Ok(Self {
            ident: ast.ident.clone(),
            attrs,
            fields,
            skipped,
            graft_persist: crate::path::graft_persist(),
        })
    }

    #[inline]
    pub fn is_compact(&self) -> bool {
        self.attrs.compact.is_some()
    }

    /// Whether any field compares against the default instance.
    pub fn has_member_fields(&self) -> bool {
        self.fields.iter().any(|field| field.attrs.member.is_some())
    }
}
