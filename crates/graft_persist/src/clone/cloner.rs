use alloc::boxed::Box;
use alloc::sync::Arc;
use core::any::TypeId;

use graft_utils::hash::{FixedHashState, HashMap};

use crate::error::PersistError;
use crate::object::Object;
use crate::persist::Persist;
use crate::record::Record;
use crate::registry::{ClonePolicy, TypeEntry, TypeRegistry};

// -----------------------------------------------------------------------------
// Cloner

/// A clone session.
///
/// Walks a source graph once and builds an independent copy of everything
/// it owns. Shared slots (`Arc`) go through an identity map scoped to the
/// session: every slot that points at the same source instance ends up
/// pointing at the same destination, which is either the source itself
/// ([`ClonePolicy::Share`]) or a single deep copy ([`ClonePolicy::Deep`]).
///
/// ```
/// use std::sync::Arc;
/// use graft_persist::{Cloner, Persist, TypeRegistry};
///
/// #[derive(Persist, Default)]
/// #[persist(type_path = "scene::Texture", resource)]
/// struct Texture {
///     path: String,
/// }
///
/// #[derive(Persist, Default)]
/// #[persist(type_path = "scene::Sprite")]
/// struct Sprite {
///     name: String,
///     texture: Option<Arc<Texture>>,
/// }
///
/// let texture = Arc::new(Texture { path: "hero.png".into() });
/// let sprite = Sprite { name: "hero".into(), texture: Some(texture.clone()) };
///
/// let registry = TypeRegistry::new();
/// let mut cl = Cloner::new(&registry);
/// let copy = cl.clone_record(&sprite).unwrap();
/// assert_eq!(copy.name, "hero");
/// // Resources are shared, not copied.
/// assert!(Arc::ptr_eq(copy.texture.as_ref().unwrap(), &texture));
/// ```
pub struct Cloner<'a> {
    registry: &'a TypeRegistry,
    // Keyed by source address. The source is held so that its address
    // cannot be reused while the session lives.
    identity: HashMap<usize, (Arc<dyn Object>, Arc<dyn Object>)>,
}

impl<'a> Cloner<'a> {
    pub fn new(registry: &'a TypeRegistry) -> Self {
        Self {
            registry,
            identity: HashMap::with_hasher(FixedHashState),
        }
    }

    #[inline]
    pub fn registry(&self) -> &'a TypeRegistry {
        self.registry
    }

    /// Number of distinct shared instances resolved in this session.
    #[inline]
    pub fn shared_count(&self) -> usize {
        self.identity.len()
    }

    /// Forgets the identity map; later shared slots are resolved anew.
    #[inline]
    pub fn reset(&mut self) {
        self.identity.clear();
    }

    /// Clones any persistable value.
    #[inline]
    pub fn clone_value<T: Persist>(&mut self, value: &T) -> Result<T, PersistError> {
        value.deep_clone(self)
    }

    /// Clones a record of static type `T` field by field.
    ///
    /// The lifecycle hooks run as for a write followed by a read:
    /// `before_serialization` and `after_serialization` on the source,
    /// `after_deserialization` on the clone.
    pub fn clone_record<T: Record>(&mut self, src: &T) -> Result<T, PersistError> {
        src.before_serialization();
        let result = src.clone_fields(self);
        src.after_serialization();
        let mut out = result?;
        out.after_deserialization();
        Ok(out)
    }

    /// Clones `src` as a `T` if that is its exact runtime type, and by its
    /// runtime type otherwise.
    ///
    /// The second path keeps the clone of a more specific type exact when it
    /// is reached through a handler written for `T`.
    pub fn clone_as<T: Record>(&mut self, src: &dyn Object) -> Result<Box<dyn Object>, PersistError> {
        match src.downcast_ref::<T>() {
            Some(src) => Ok(Box::new(self.clone_record(src)?)),
            None => {
                log::trace!(
                    "`{}` reached a clone handler of `{}`, cloning by runtime type",
                    src.type_path(),
                    T::class_info().type_path(),
                );
                self.deep_object(src)
            }
        }
    }

    /// Clones a polymorphic record through the registered handler of its
    /// runtime type, falling back to the instance's own implementation.
    pub fn deep_object(&mut self, src: &dyn Object) -> Result<Box<dyn Object>, PersistError> {
        match self.registry.get(src.object_type_id()) {
            Some(entry) => (entry.clone_fn())(self, src),
            None => {
                log::trace!("`{}` is not registered, cloning by its own implementation", src.type_path());
                src.clone_object(self)
            }
        }
    }

    fn resolved(&self, key: usize) -> Option<Arc<dyn Object>> {
        self.identity.get(&key).map(|(_, dest)| Arc::clone(dest))
    }

    fn policy_of(&self, type_id: TypeId, src: &dyn Object) -> ClonePolicy {
        self.registry
            .get(type_id)
            .map_or_else(|| ClonePolicy::for_class(src.class()), TypeEntry::policy)
    }

    /// Resolves a shared slot of static type `T`.
    pub fn clone_shared<T: Record>(&mut self, src: &Arc<T>) -> Result<Arc<T>, PersistError> {
        let key = Arc::as_ptr(src).addr();
        if let Some(dest) = self.resolved(key) {
            return downcast_shared::<T>(dest);
        }

        let dest = match self.policy_of(TypeId::of::<T>(), &**src) {
            ClonePolicy::Share => Arc::clone(src),
            ClonePolicy::Deep => match self.registry.get(TypeId::of::<T>()) {
                Some(entry) => {
                    let copy = (entry.clone_fn())(self, &**src)?;
                    downcast_shared::<T>(Arc::from(copy))?
                }
                None => Arc::new(self.clone_record(&**src)?),
            },
        };

        let source: Arc<dyn Object> = src.clone();
        let shared: Arc<dyn Object> = dest.clone();
        self.identity.insert(key, (source, shared));
        Ok(dest)
    }

    /// Resolves a polymorphic shared slot.
    pub fn clone_shared_object(&mut self, src: &Arc<dyn Object>) -> Result<Arc<dyn Object>, PersistError> {
        let key = Arc::as_ptr(src).cast::<()>().addr();
        if let Some(dest) = self.resolved(key) {
            return Ok(dest);
        }

        let dest = match self.policy_of(src.object_type_id(), &**src) {
            ClonePolicy::Share => Arc::clone(src),
            ClonePolicy::Deep => Arc::from(self.deep_object(&**src)?),
        };

        self.identity.insert(key, (Arc::clone(src), Arc::clone(&dest)));
        Ok(dest)
    }
}

fn downcast_shared<T: Record>(dest: Arc<dyn Object>) -> Result<Arc<T>, PersistError> {
    let found = dest.type_path();
    dest.downcast_arc::<T>().map_err(|_| {
        PersistError::resource(
            T::class_info().type_path(),
            alloc::format!("resolved to an instance of `{found}`"),
        )
    })
}

impl core::fmt::Debug for Cloner<'_> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Cloner")
            .field("shared", &self.identity.len())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use alloc::boxed::Box;
    use alloc::string::String;
    use alloc::sync::Arc;
    use alloc::vec;
    use alloc::vec::Vec;

    use crate::error::PersistError;
    use crate::object::Object;
    use crate::registry::{ClonePolicy, TypeRegistry};
    use crate::{Cloner, Persist};

    #[derive(Persist, Default, Debug, PartialEq)]
    #[persist(type_path = "t::Sample", resource)]
    struct Sample {
        name: String,
    }

    #[derive(Persist, Default, Debug, PartialEq)]
    #[persist(type_path = "t::Curve")]
    struct Curve {
        keys: Vec<f32>,
    }

    #[derive(Persist, Default)]
    #[persist(type_path = "t::Track")]
    struct Track {
        sample: Option<Arc<Sample>>,
        curve: Option<Arc<Curve>>,
    }

    #[derive(Persist, Default, Debug, PartialEq)]
    #[persist(type_path = "t::Outline", after_deserialization = Outline::refresh)]
    struct Outline {
        points: Vec<i32>,
        #[persist(skip)]
        total: i32,
    }

    impl Outline {
        fn refresh(&mut self) {
            self.total = self.points.iter().sum();
        }
    }

    fn curve() -> Arc<Curve> {
        Arc::new(Curve {
            keys: vec![0.0, 0.5, 1.0],
        })
    }

    #[test]
    fn owned_data_is_independent() {
        let src = Outline {
            points: vec![1, 2, 3],
            total: 0,
        };
        let registry = TypeRegistry::new();
        let mut copy = Cloner::new(&registry).clone_record(&src).unwrap();
        copy.points.push(4);
        assert_eq!(src.points, [1, 2, 3]);
        // Recomputed by the hook, not copied.
        assert_eq!(copy.total, 6);
    }

    #[test]
    fn resources_are_shared() {
        let sample = Arc::new(Sample {
            name: "step".into(),
        });
        let tracks = vec![
            Track {
                sample: Some(sample.clone()),
                curve: None,
            },
            Track {
                sample: Some(sample.clone()),
                curve: None,
            },
        ];
        let registry = TypeRegistry::new();
        let mut cl = Cloner::new(&registry);
        let copies = cl.clone_value(&tracks).unwrap();
        for copy in &copies {
            assert!(Arc::ptr_eq(copy.sample.as_ref().unwrap(), &sample));
        }
        assert_eq!(cl.shared_count(), 1);
    }

    #[test]
    fn deep_shared_slots_keep_identity() {
        let curve = curve();
        let tracks = vec![
            Track {
                sample: None,
                curve: Some(curve.clone()),
            },
            Track {
                sample: None,
                curve: Some(curve.clone()),
            },
        ];
        let registry = TypeRegistry::new();
        let copies = Cloner::new(&registry).clone_value(&tracks).unwrap();
        let first = copies[0].curve.as_ref().unwrap();
        let second = copies[1].curve.as_ref().unwrap();
        assert!(!Arc::ptr_eq(first, &curve));
        assert!(Arc::ptr_eq(first, second));
        assert_eq!(**first, *curve);
    }

    #[test]
    fn identity_does_not_outlive_the_session() {
        let track = Track {
            sample: None,
            curve: Some(curve()),
        };
        let registry = TypeRegistry::new();
        let mut cl = Cloner::new(&registry);
        let a = cl.clone_record(&track).unwrap();
        cl.reset();
        let b = cl.clone_record(&track).unwrap();
        assert!(!Arc::ptr_eq(a.curve.as_ref().unwrap(), b.curve.as_ref().unwrap()));
    }

    #[test]
    fn policy_override_and_custom_cloner() {
        let mut registry = TypeRegistry::new();
        registry.set_clone_policy::<Sample>(ClonePolicy::Deep);
        registry.set_cloner::<Sample>(|_, src| {
            Err(PersistError::resource(src.type_path(), "not loaded"))
        });

        let track = Track {
            sample: Some(Arc::new(Sample::default())),
            curve: None,
        };
        match Cloner::new(&registry).clone_record(&track) {
            Err(PersistError::Resource { type_path, reason }) => {
                assert_eq!(type_path, "t::Sample");
                assert_eq!(reason, "not loaded");
            }
            _ => panic!("expected a resource error"),
        }
    }

    #[test]
    fn mismatched_handler_falls_back_to_runtime_type() {
        let src: Box<dyn Object> = Box::new(Curve {
            keys: vec![2.0],
        });
        let registry = TypeRegistry::new();
        let copy = Cloner::new(&registry).clone_as::<Outline>(&*src).unwrap();
        assert_eq!(
            copy.downcast_ref::<Curve>(),
            Some(&Curve { keys: vec![2.0] })
        );
    }

    #[test]
    fn runtime_type_fallback_uses_registered_cloner() {
        let mut registry = TypeRegistry::new();
        registry.set_cloner::<Curve>(|_, _| Ok(Box::new(Curve { keys: vec![9.0] }) as Box<dyn Object>));

        let src: Box<dyn Object> = Box::new(Curve { keys: vec![2.0] });
        let copy = Cloner::new(&registry).clone_as::<Outline>(&*src).unwrap();
        assert_eq!(
            copy.downcast_ref::<Curve>(),
            Some(&Curve { keys: vec![9.0] })
        );
    }

    #[test]
    fn polymorphic_shared_slots() {
        let src: Arc<dyn Object> = Arc::new(Sample {
            name: "kick".into(),
        });
        let registry = TypeRegistry::new();
        let mut cl = Cloner::new(&registry);
        let a = cl.clone_shared_object(&src).unwrap();
        let b = cl.clone_shared_object(&src).unwrap();
        assert!(Arc::ptr_eq(&a, &src));
        assert!(Arc::ptr_eq(&a, &b));

        let src: Arc<dyn Object> = curve();
        let copy = cl.clone_shared_object(&src).unwrap();
        assert!(!Arc::ptr_eq(&copy, &src));
        assert_eq!(copy.downcast_ref::<Curve>(), src.downcast_ref::<Curve>());
    }
}
