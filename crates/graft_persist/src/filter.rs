use alloc::vec::Vec;

use crate::clone::Cloner;
use crate::error::PersistError;
use crate::persist::Persist;
use crate::ser::Serializer;

/// A collection field whose elements can be excluded one by one.
///
/// This backs `#[persist(item_if = path)]`: the predicate sees the owning
/// record, the element index and the element, and decides whether the
/// element is written or cloned. Excluded elements are simply absent from
/// the result; reading needs no predicate.
///
/// The predicate is called once per element and must give the same answer
/// for writing and cloning.
///
/// ```
/// use graft_persist::{Cloner, Persist, TypeRegistry};
///
/// #[derive(Persist, Default)]
/// #[persist(type_path = "scene::Group")]
/// struct Group {
///     #[persist(item_if = Group::is_kept)]
///     children: Vec<String>,
/// }
///
/// impl Group {
///     fn is_kept(&self, _index: usize, child: &String) -> bool {
///         !child.starts_with('~')
///     }
/// }
///
/// let group = Group { children: vec!["a".into(), "~tmp".into(), "b".into()] };
/// let registry = TypeRegistry::new();
/// let copy = Cloner::new(&registry).clone_record(&group).unwrap();
/// assert_eq!(copy.children, ["a", "b"]);
/// ```
pub trait ItemFilter: Persist {
    type Item;

    fn write_filtered(&self, ser: &mut Serializer, keep: impl FnMut(usize, &Self::Item) -> bool);

    fn clone_filtered(
        &self,
        cl: &mut Cloner<'_>,
        keep: impl FnMut(usize, &Self::Item) -> bool,
    ) -> Result<Self, PersistError>;
}

fn kept<T>(items: &[T], mut keep: impl FnMut(usize, &T) -> bool) -> Vec<&T> {
    items
        .iter()
        .enumerate()
        .filter(|(index, item)| keep(*index, item))
        .map(|(_, item)| item)
        .collect()
}

impl<T: Persist> ItemFilter for Vec<T> {
    type Item = T;

    fn write_filtered(&self, ser: &mut Serializer, keep: impl FnMut(usize, &T) -> bool) {
        let items = kept(self, keep);
        ser.writer().write_count(Some(items.len()));
        for item in items {
            item.write(ser);
        }
    }

    fn clone_filtered(
        &self,
        cl: &mut Cloner<'_>,
        keep: impl FnMut(usize, &T) -> bool,
    ) -> Result<Self, PersistError> {
        kept(self, keep)
            .into_iter()
            .map(|item| item.deep_clone(cl))
            .collect()
    }
}

impl<T: Persist> ItemFilter for Option<Vec<T>> {
    type Item = T;

    fn write_filtered(&self, ser: &mut Serializer, keep: impl FnMut(usize, &T) -> bool) {
        match self {
            Some(items) => items.write_filtered(ser, keep),
            None => ser.writer().write_count(None),
        }
    }

    fn clone_filtered(
        &self,
        cl: &mut Cloner<'_>,
        keep: impl FnMut(usize, &T) -> bool,
    ) -> Result<Self, PersistError> {
        match self {
            Some(items) => items.clone_filtered(cl, keep).map(Some),
            None => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use alloc::vec;
    use alloc::vec::Vec;

    use super::ItemFilter;
    use crate::{Cloner, Deserializer, Options, Persist, Serializer, TypeRegistry};

    #[test]
    fn filtered_write_reads_back_as_plain_list() {
        let items = vec![10_u8, 11, 12, 13];
        let mut ser = Serializer::new(Options::default());
        items.write_filtered(&mut ser, |index, _| index % 2 == 0);

        let registry = TypeRegistry::new();
        let mut de = Deserializer::new(ser.as_bytes(), &registry, Options::default());
        assert_eq!(Vec::<u8>::read(&mut de).unwrap(), [10, 12]);
    }

    #[test]
    fn filtered_clone() {
        let registry = TypeRegistry::new();
        let mut cl = Cloner::new(&registry);
        let items = Some(vec![1_i32, -2, 3]);
        let copy = items.clone_filtered(&mut cl, |_, item| *item > 0).unwrap();
        assert_eq!(copy, Some(vec![1, 3]));

        let none: Option<Vec<i32>> = None;
        assert_eq!(none.clone_filtered(&mut cl, |_, _| true).unwrap(), None);
    }
}
