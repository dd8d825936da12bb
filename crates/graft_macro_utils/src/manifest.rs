use std::collections::BTreeMap;
use std::env;
use std::path::{Path, PathBuf};
use std::sync::{PoisonError, RwLock};
use std::time::SystemTime;

use toml_edit::{Document, Item, Table};

/// The caller's parsed `Cargo.toml`, used to find how a graft crate is
/// reachable from the crate that invokes a derive.
///
/// # Resolution rules
///
/// For a requested crate such as `graft_persist`:
///
/// 1. listed in `dependencies`: `::graft_persist`;
/// 2. the caller depends on the facade `graft_core`: `::graft_core::persist`;
/// 3. the same two checks against `dev-dependencies`;
/// 4. otherwise `::graft_persist`.
///
/// A crate that derives for its own types must declare
/// `extern crate self as graft_persist;` so rule 4 resolves inside it.
///
/// ```rust
/// # use graft_macro_utils::Manifest;
/// let path: syn::Path = Manifest::shared(|m| m.get_crate_path("graft_persist"));
/// ```
#[derive(Debug)]
pub struct Manifest {
    pub manifest: Document<Box<str>>,
    pub modified_time: SystemTime,
}

const FACADE_NAME: &str = "graft_core";
const CRATE_PREFIX: &str = "graft_";

impl Manifest {
    #[inline(never)]
    fn manifest_path() -> PathBuf {
        let Some(dir) = env::var_os("CARGO_MANIFEST_DIR") else {
            panic!("CARGO_MANIFEST_DIR is not set, graft derives must be expanded by cargo");
        };
        let mut path = PathBuf::from(dir);
        path.push("Cargo.toml");
        assert!(
            path.exists(),
            "Cargo manifest does not exist at path {}",
            path.display(),
        );
        path
    }

    #[inline(never)]
    fn modified_time_of(path: &Path) -> Option<SystemTime> {
        std::fs::metadata(path).and_then(|meta| meta.modified()).ok()
    }

    #[inline(never)]
    fn parse_manifest(path: &Path) -> Document<Box<str>> {
        let Ok(text) = std::fs::read_to_string(path) else {
            panic!("Unable to read cargo manifest: {}", path.display());
        };
        match Document::parse(text.into_boxed_str()) {
            Ok(document) => document,
            Err(err) => panic!("Failed to parse cargo manifest {}: {err}", path.display()),
        }
    }

    fn path_of(text: &str) -> syn::Path {
        match syn::parse_str(text) {
            Ok(path) => path,
            Err(err) => panic!("`{text}` is not a valid path: {err}"),
        }
    }

    fn lookup(deps: &Table, name: &str) -> Option<syn::Path> {
        if deps.contains_key(name) {
            return Some(Self::path_of(&format!("::{name}")));
        }
        let module = name.strip_prefix(CRATE_PREFIX)?;
        if deps.contains_key(FACADE_NAME) {
            return Some(Self::path_of(&format!("::{FACADE_NAME}::{module}")));
        }
        None
    }

    /// Resolves `name` following the rules in the type docs.
    #[inline(never)]
    pub fn get_crate_path(&self, name: &str) -> syn::Path {
        ["dependencies", "dev-dependencies"]
            .into_iter()
            .find_map(|section| match self.manifest.get(section) {
                Some(Item::Table(deps)) => Self::lookup(deps, name),
                _ => None,
            })
            .unwrap_or_else(|| Self::path_of(&format!("::{name}")))
    }

    /// Runs `func` with the caller's manifest.
    ///
    /// Manifests are cached per path and re-read when the file's modified
    /// time changes. Call this once per macro invocation and pass the
    /// resulting path around.
    pub fn shared<R>(func: impl FnOnce(&Self) -> R) -> R {
        static MANIFESTS: RwLock<BTreeMap<PathBuf, Manifest>> = RwLock::new(BTreeMap::new());

        let path = Self::manifest_path();
        let modified_time = Self::modified_time_of(&path).unwrap_or(SystemTime::UNIX_EPOCH);

        {
            let manifests = MANIFESTS.read().unwrap_or_else(PoisonError::into_inner);
            if let Some(manifest) = manifests.get(&path)
                && manifest.modified_time == modified_time
            {
                return func(manifest);
            }
        }

        let manifest = Manifest {
            manifest: Self::parse_manifest(&path),
            modified_time,
        };
        let result = func(&manifest);

        MANIFESTS
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(path, manifest);

        result
    }
}
