//! Items used by the code `#[derive(Persist)]` expands to. Not public API.

pub use alloc::boxed::Box;
pub use alloc::sync::Arc;
pub use core::result::Result;
pub use std::sync::OnceLock;

#[cfg(feature = "auto_register")]
pub mod auto_register {
    pub use inventory;

    use crate::record::Record;
    use crate::registry::TypeRegistry;

    /// A registration function submitted by `#[persist(auto_register)]`.
    pub struct __AutoRegisterFunc(pub fn(&mut TypeRegistry));

    inventory::collect!(__AutoRegisterFunc);

    pub trait __RegisterType {
        fn __register(registry: &mut TypeRegistry);
    }

    impl<T: Record> __RegisterType for T {
        #[inline]
        fn __register(registry: &mut TypeRegistry) {
            registry.register::<T>();
        }
    }

    pub fn __register_types(registry: &mut TypeRegistry) {
        for func in inventory::iter::<__AutoRegisterFunc> {
            (func.0)(registry);
        }
    }
}
