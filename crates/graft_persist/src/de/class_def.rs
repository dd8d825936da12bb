use alloc::string::String;
use alloc::vec;
use alloc::vec::Vec;
use core::any::TypeId;

use crate::error::DecodeErrorKind;
use crate::info::{ClassInfo, Shape};
use crate::object::Object;
use crate::record::Record;
use crate::registry::{TypeEntry, TypeRegistry};

// -----------------------------------------------------------------------------
// FieldDef

/// Where a stored field goes in the local type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldSlot {
    /// Index into the local [`ClassInfo::fields`].
    Known(usize),
    /// Not declared locally; the value is skipped by its shape.
    Unknown,
}

/// One field of a class header, as stored in the stream.
#[derive(Debug, Clone)]
pub struct FieldDef {
    tag: String,
    shape: Shape,
    slot: FieldSlot,
    required: bool,
}

impl FieldDef {
    #[inline]
    pub fn tag(&self) -> &str {
        &self.tag
    }

    #[inline]
    pub fn shape(&self) -> &Shape {
        &self.shape
    }

    #[inline]
    pub fn slot(&self) -> FieldSlot {
        self.slot
    }

    /// Whether the local field this maps to must be present in every body.
    #[inline]
    pub fn is_required(&self) -> bool {
        self.required
    }
}

// -----------------------------------------------------------------------------
// Target

/// The local type a class header is bound to.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Target {
    pub type_id: TypeId,
    pub info: &'static ClassInfo,
    pub entry: Option<TypeEntry>,
}

impl Target {
    pub fn of<T: Record>(registry: &TypeRegistry) -> Self {
        let type_id = TypeId::of::<T>();
        Self {
            type_id,
            info: T::class_info(),
            entry: registry.get(type_id).copied(),
        }
    }

    pub fn of_object(object: &dyn Object, registry: &TypeRegistry) -> Self {
        let type_id = object.object_type_id();
        Self {
            type_id,
            info: object.class(),
            entry: registry.get(type_id).copied(),
        }
    }

    pub fn from_entry(entry: &TypeEntry) -> Self {
        Self {
            type_id: entry.type_id(),
            info: entry.info(),
            entry: Some(*entry),
        }
    }
}

// -----------------------------------------------------------------------------
// ClassDef

/// A class header read from the stream, matched against the local layout.
///
/// Created the first time a class id appears in a read session and shared by
/// every later record of that class. Stored fields are kept in stream order,
/// so the ordinal `n` of a body refers to `fields()[n - 1]`.
#[derive(Debug, Clone)]
pub struct ClassDef {
    type_path: String,
    compact: bool,
    fields: Vec<FieldDef>,
    target: Option<Target>,
}

impl ClassDef {
    /// Matches the stored fields against `target`.
    ///
    /// Without a target every field is [`FieldSlot::Unknown`]; such a class
    /// can only be skipped.
    pub(crate) fn resolve(
        type_path: String,
        compact: bool,
        stored: Vec<(String, Shape)>,
        target: Option<Target>,
        allow_unknown: bool,
    ) -> Result<Self, DecodeErrorKind> {
        let Some(target) = target else {
            let fields = stored
                .into_iter()
                .map(|(tag, shape)| FieldDef {
                    tag,
                    shape,
                    slot: FieldSlot::Unknown,
                    required: false,
                })
                .collect();
            return Ok(Self {
                type_path,
                compact,
                fields,
                target: None,
            });
        };

        let info = target.info;
        if info.is_compact() != compact {
            return Err(DecodeErrorKind::LayoutMismatch { class: type_path });
        }

        let mut seen = vec![false; info.fields().len()];
        let mut fields = Vec::with_capacity(stored.len());
        for (tag, shape) in stored {
            let slot = match info.field_index(&tag) {
                Some(index) if seen[index] => {
                    return Err(DecodeErrorKind::LayoutMismatch { class: type_path });
                }
                Some(index) => {
                    let expected = info.fields()[index].shape();
                    if !expected.accepts(&shape) {
                        return Err(DecodeErrorKind::IncompatibleField {
                            class: type_path,
                            field: tag,
                            expected,
                            found: shape,
                        });
                    }
                    seen[index] = true;
                    FieldSlot::Known(index)
                }
                None if compact => {
                    return Err(DecodeErrorKind::LayoutMismatch { class: type_path });
                }
                None if allow_unknown => FieldSlot::Unknown,
                None => {
                    return Err(DecodeErrorKind::UnknownField {
                        class: type_path,
                        field: tag,
                    });
                }
            };
            let required = match slot {
                FieldSlot::Known(index) => info.fields()[index].is_required(),
                FieldSlot::Unknown => false,
            };
            fields.push(FieldDef {
                tag,
                shape,
                slot,
                required,
            });
        }

        // Compact bodies carry no ordinals, so both sides must agree exactly.
        if compact {
            let in_order = fields.len() == info.fields().len()
                && fields
                    .iter()
                    .enumerate()
                    .all(|(i, field)| field.slot == FieldSlot::Known(i));
            if !in_order {
                return Err(DecodeErrorKind::LayoutMismatch { class: type_path });
            }
        }

        let missing = info
            .fields()
            .iter()
            .zip(&seen)
            .find(|(field, seen)| field.is_required() && !**seen);
        if let Some((field, _)) = missing {
            return Err(DecodeErrorKind::MissingField {
                class: type_path,
                field: field.tag().into(),
            });
        }

        Ok(Self {
            type_path,
            compact,
            fields,
            target: Some(target),
        })
    }

    /// Binds an unresolved definition to `target`.
    pub(crate) fn rebind(&self, target: Target, allow_unknown: bool) -> Result<Self, DecodeErrorKind> {
        let stored = self
            .fields
            .iter()
            .map(|field| (field.tag.clone(), field.shape.clone()))
            .collect();
        Self::resolve(
            self.type_path.clone(),
            self.compact,
            stored,
            Some(target),
            allow_unknown,
        )
    }

    /// The type path written by the producer.
    #[inline]
    pub fn type_path(&self) -> &str {
        &self.type_path
    }

    #[inline]
    pub fn is_compact(&self) -> bool {
        self.compact
    }

    #[inline]
    pub fn fields(&self) -> &[FieldDef] {
        &self.fields
    }

    /// The local type this class was bound to, if any.
    #[inline]
    pub fn type_id(&self) -> Option<TypeId> {
        self.target.map(|target| target.type_id)
    }

    #[inline]
    pub fn info(&self) -> Option<&'static ClassInfo> {
        self.target.map(|target| target.info)
    }

    /// The registered handlers of the bound type.
    #[inline]
    pub fn entry(&self) -> Option<&TypeEntry> {
        self.target.as_ref().and_then(|target| target.entry.as_ref())
    }

    #[inline]
    pub(crate) fn is_resolved(&self) -> bool {
        self.target.is_some()
    }
}

#[cfg(test)]
mod tests {
    use alloc::string::String;
    use alloc::vec;
    use alloc::vec::Vec;

    use super::{ClassDef, FieldSlot, Target};
    use crate::error::DecodeErrorKind;
    use crate::info::Shape;
    use crate::registry::TypeRegistry;
    use crate::Persist;

    #[derive(Persist, Default)]
    #[persist(type_path = "t::Node")]
    struct Node {
        #[persist(required)]
        id: u32,
        name: String,
    }

    #[derive(Persist, Default)]
    #[persist(type_path = "t::Pair", compact)]
    struct Pair {
        a: i32,
        b: i32,
    }

    fn stored(fields: &[(&str, Shape)]) -> Vec<(String, Shape)> {
        fields
            .iter()
            .map(|(tag, shape)| (String::from(*tag), shape.clone()))
            .collect()
    }

    fn resolve<T: crate::Record>(fields: &[(&str, Shape)], allow_unknown: bool) -> Result<ClassDef, DecodeErrorKind> {
        let registry = TypeRegistry::new();
        ClassDef::resolve(
            T::class_info().type_path().into(),
            T::class_info().is_compact(),
            stored(fields),
            Some(Target::of::<T>(&registry)),
            allow_unknown,
        )
    }

    #[test]
    fn maps_stored_fields_by_tag() {
        let def = resolve::<Node>(
            &[("extra", Shape::Bool), ("id", Shape::UInt), ("name", Shape::String)],
            true,
        )
        .unwrap();
        let slots: Vec<_> = def.fields().iter().map(|f| f.slot()).collect();
        assert_eq!(
            slots,
            vec![FieldSlot::Unknown, FieldSlot::Known(0), FieldSlot::Known(1)]
        );
        assert!(def.fields()[1].is_required());
    }

    #[test]
    fn rejects_incompatible_and_unknown_fields() {
        let err = resolve::<Node>(&[("id", Shape::Long)], false).unwrap_err();
        assert!(matches!(err, DecodeErrorKind::IncompatibleField { ref field, .. } if field == "id"));

        let err = resolve::<Node>(&[("id", Shape::UInt), ("extra", Shape::Bool)], false).unwrap_err();
        assert!(matches!(err, DecodeErrorKind::UnknownField { ref field, .. } if field == "extra"));
    }

    #[test]
    fn missing_required_field() {
        let err = resolve::<Node>(&[("name", Shape::String)], false).unwrap_err();
        assert_eq!(
            err,
            DecodeErrorKind::MissingField {
                class: "t::Node".into(),
                field: "id".into(),
            }
        );
    }

    #[test]
    fn compact_layout_must_match() {
        assert!(resolve::<Pair>(&[("a", Shape::Int), ("b", Shape::Int)], true).is_ok());
        let err = resolve::<Pair>(&[("a", Shape::Int)], true).unwrap_err();
        assert!(matches!(err, DecodeErrorKind::LayoutMismatch { .. }));
        let err = resolve::<Pair>(&[("a", Shape::Int), ("c", Shape::Int)], true).unwrap_err();
        assert!(matches!(err, DecodeErrorKind::LayoutMismatch { .. }));
    }

    #[test]
    fn unresolved_until_bound() {
        let def = ClassDef::resolve(
            "t::Node".into(),
            false,
            stored(&[("id", Shape::UInt)]),
            None,
            false,
        )
        .unwrap();
        assert!(def.type_id().is_none());
        assert_eq!(def.fields()[0].slot(), FieldSlot::Unknown);

        let registry = TypeRegistry::new();
        let bound = def.rebind(Target::of::<Node>(&registry), false).unwrap();
        assert_eq!(bound.fields()[0].slot(), FieldSlot::Known(0));
        assert!(bound.entry().is_none());
    }
}
