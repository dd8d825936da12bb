#![doc = include_str!("../README.md")]
#![cfg_attr(docsrs, feature(doc_cfg))]

pub use graft_persist as persist;
pub use graft_utils as utils;

#[cfg(all(test, feature = "auto_register"))]
mod tests {
    use core::any::TypeId;

    use graft_persist::{Object, Persist, Persistence};

    #[derive(Persist, Default, Debug, PartialEq)]
    #[persist(type_path = "graft_core::Circle", auto_register)]
    struct Circle {
        radius: f32,
    }

    #[derive(Persist, Default)]
    #[persist(type_path = "graft_core::Scene")]
    struct Scene {
        shapes: Vec<Box<dyn Object>>,
    }

    #[test]
    fn global_registry_reads_auto_registered_types() {
        let persistence = Persistence::global();
        assert!(persistence.registry().contains(TypeId::of::<Circle>()));

        let scene = Scene {
            shapes: vec![Box::new(Circle { radius: 2.0 })],
        };
        let back: Scene = persistence.from_bytes(&persistence.to_bytes(&scene)).unwrap();
        assert_eq!(
            back.shapes[0].downcast_ref::<Circle>(),
            Some(&Circle { radius: 2.0 })
        );

        let copy = persistence.clone(&scene).unwrap();
        assert!(copy.shapes[0].is::<Circle>());
    }
}
