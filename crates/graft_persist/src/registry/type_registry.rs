use alloc::sync::Arc;
use core::any::TypeId;
use core::fmt;
use std::sync::OnceLock;

use graft_utils::TypeIdMap;
use graft_utils::hash::{FixedHashState, HashMap};

use crate::record::Record;
use crate::registry::{CloneFn, ClonePolicy, TypeEntry};

// -----------------------------------------------------------------------------
// TypeRegistry

/// The type dispatch table: runtime type to make, read and clone handlers.
///
/// Build a registry once, then share it read-only (`Arc<TypeRegistry>` or
/// [`TypeRegistry::global`]). Lookups take `&self`, so concurrent sessions
/// need no locking.
///
/// Entries are keyed by exact runtime type and indexed by the type path
/// written in class headers, which is how a reader finds the handler for a
/// class it only knows by name.
///
/// # Example
///
/// ```
/// use core::any::TypeId;
/// use graft_persist::{Persist, TypeRegistry};
///
/// #[derive(Persist, Default)]
/// #[persist(type_path = "scene::Sprite")]
/// struct Sprite {
///     frame: u16,
/// }
///
/// let mut registry = TypeRegistry::new();
/// assert!(registry.register::<Sprite>());
/// assert!(!registry.register::<Sprite>());
///
/// let entry = registry.get_with_type_path("scene::Sprite").unwrap();
/// assert_eq!(entry.type_id(), TypeId::of::<Sprite>());
/// ```
pub struct TypeRegistry {
    entries: TypeIdMap<TypeEntry>,
    type_path_to_id: HashMap<&'static str, TypeId>,
}

impl Default for TypeRegistry {
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for TypeRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set()
            .entries(self.entries.values().map(TypeEntry::type_path))
            .finish()
    }
}

impl TypeRegistry {
    /// Creates an empty registry.
    #[inline]
    pub const fn new() -> Self {
        Self {
            entries: TypeIdMap::new(),
            type_path_to_id: HashMap::with_hasher(FixedHashState),
        }
    }

    fn index_type_path(type_path_to_id: &mut HashMap<&'static str, TypeId>, entry: &TypeEntry) {
        let type_path = entry.type_path();
        if type_path_to_id.contains_key(type_path) {
            log::warn!("type path `{type_path}` is registered twice, the later type is reachable by `TypeId` only");
        } else {
            type_path_to_id.insert(type_path, entry.type_id());
            log::debug!("registered `{type_path}`");
        }
    }

    /// Inserts `entry` unless its type is already registered.
    ///
    /// Returns `true` if the entry was inserted.
    pub fn try_insert(&mut self, entry: TypeEntry) -> bool {
        let type_path_to_id = &mut self.type_path_to_id;
        self.entries.try_insert(entry.type_id(), || {
            Self::index_type_path(type_path_to_id, &entry);
            entry
        })
    }

    /// Inserts `entry`, replacing the handlers of an already registered type.
    pub fn insert(&mut self, entry: TypeEntry) {
        if !self.entries.contains(&entry.type_id()) {
            Self::index_type_path(&mut self.type_path_to_id, &entry);
        }
        self.entries.insert(entry.type_id(), entry);
    }

    /// Registers `T` with its default handlers.
    ///
    /// Returns `false` if `T` was already registered; the existing entry is
    /// left untouched.
    pub fn register<T: Record>(&mut self) -> bool {
        #[cfg(all(debug_assertions, feature = "debug"))]
        {
            let info = T::class_info();
            assert!(
                info.has_sorted_tags(),
                "fields of `{}` are not in strictly ascending tag order",
                info.type_path(),
            );
        }
        self.try_insert(TypeEntry::of::<T>())
    }

    /// Sets the clone policy applied to shared `Arc<T>` slots, registering
    /// `T` first if needed.
    pub fn set_clone_policy<T: Record>(&mut self, policy: ClonePolicy) {
        self.register::<T>();
        if let Some(entry) = self.entries.get_mut(&TypeId::of::<T>()) {
            *entry = entry.with_policy(policy);
        }
    }

    /// Replaces the cloner used for `T` in polymorphic and shared slots,
    /// registering `T` first if needed.
    ///
    /// A custom cloner is where resource specific copies are made, and where
    /// [`PersistError::Resource`](crate::PersistError::Resource) originates.
    pub fn set_cloner<T: Record>(&mut self, clone: CloneFn) {
        self.register::<T>();
        if let Some(entry) = self.entries.get_mut(&TypeId::of::<T>()) {
            *entry = entry.with_cloner(clone);
        }
    }

    #[inline]
    pub fn contains(&self, type_id: TypeId) -> bool {
        self.entries.contains(&type_id)
    }

    #[inline]
    pub fn get(&self, type_id: TypeId) -> Option<&TypeEntry> {
        self.entries.get(&type_id)
    }

    /// Looks an entry up by the type path written in class headers.
    pub fn get_with_type_path(&self, type_path: &str) -> Option<&TypeEntry> {
        match self.type_path_to_id.get(type_path) {
            Some(id) => self.get(*id),
            None => None,
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterates over the entries in arbitrary order.
    #[inline]
    pub fn iter(&self) -> impl ExactSizeIterator<Item = &TypeEntry> {
        self.entries.values()
    }

    /// Registers every type declared with `#[persist(auto_register)]`.
    ///
    /// Returns `false` when the `auto_register` feature is disabled, in
    /// which case nothing is registered. Repeated calls are cheap.
    ///
    /// ```no_run
    /// use core::any::TypeId;
    /// use graft_persist::{Persist, TypeRegistry};
    ///
    /// #[derive(Persist, Default)]
    /// #[persist(auto_register)]
    /// struct Tile {
    ///     index: u32,
    /// }
    ///
    /// let mut registry = TypeRegistry::new();
    /// assert!(registry.auto_register());
    /// assert!(registry.contains(TypeId::of::<Tile>()));
    /// ```
    pub fn auto_register(&mut self) -> bool {
        let before = self.len();
        let available = collect_auto_registered(self);
        log::debug!("auto registration added {} type(s)", self.len() - before);
        available
    }

    /// The process-wide registry, built from
    /// [`auto_register`](Self::auto_register) on first use and never
    /// modified afterwards.
    pub fn global() -> Arc<TypeRegistry> {
        static GLOBAL: OnceLock<Arc<TypeRegistry>> = OnceLock::new();

        let registry = GLOBAL.get_or_init(|| {
            let mut registry = TypeRegistry::new();
            registry.auto_register();
            Arc::new(registry)
        });
        Arc::clone(registry)
    }
}

#[cfg(feature = "auto_register")]
#[inline]
fn collect_auto_registered(registry: &mut TypeRegistry) -> bool {
    crate::__macro_exports::auto_register::__register_types(registry);
    true
}

#[cfg(not(feature = "auto_register"))]
#[inline(always)]
fn collect_auto_registered(_: &mut TypeRegistry) -> bool {
    false
}
