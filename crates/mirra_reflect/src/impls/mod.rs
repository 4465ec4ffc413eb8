//! Declarations for the built-in fundamental set.

use alloc::string::String;

use crate::info::{ScalarCodec, TypeBuilder};
use crate::registry::TypeRegistry;

/// Declares the fundamental set into `registry`: `bool`, `char`, `String`,
/// the fixed-width integers up to 64 bits, `f32`, and `f64` — each under
/// its Rust name, each with its literal codec and a default constructor.
///
/// [`TypeRegistry::new`] calls this; it is exposed for registries built up
/// from [`TypeRegistry::empty`].
pub fn register_fundamentals(registry: &mut TypeRegistry) {
    macro_rules! declare_scalars {
        ($($ty:ty => $name:literal),* $(,)?) => {
            $(
                must_declare(
                    registry,
                    TypeBuilder::fundamental::<$ty>($name, ScalarCodec::display_parse::<$ty>())
                        .constructor(<$ty>::default),
                );
            )*
        };
    }

    declare_scalars! {
        bool => "bool",
        i8 => "i8",
        i16 => "i16",
        i32 => "i32",
        i64 => "i64",
        u8 => "u8",
        u16 => "u16",
        u32 => "u32",
        u64 => "u64",
        f32 => "f32",
        f64 => "f64",
    }

    must_declare(
        registry,
        TypeBuilder::fundamental::<char>("char", ScalarCodec::character())
            .constructor(char::default),
    );
    must_declare(
        registry,
        TypeBuilder::fundamental::<String>("String", ScalarCodec::string())
            .constructor(String::default),
    );
}

fn must_declare(registry: &mut TypeRegistry, builder: TypeBuilder) {
    // Fundamental declarations carry no member types to resolve, so this
    // cannot fail.
    if let Err(err) = registry.declare(builder) {
        panic!("fundamental declaration failed: {err}");
    }
}

#[cfg(test)]
mod tests {
    use crate::registry::TypeRegistry;

    #[test]
    fn the_default_set_is_declared() {
        let registry = TypeRegistry::new();
        for name in [
            "bool", "char", "String", "i8", "i16", "i32", "i64", "u8", "u16", "u32", "u64",
            "f32", "f64",
        ] {
            let descriptor = registry.lookup(name).unwrap();
            assert!(descriptor.is_fundamental(), "{name}");
            assert!(registry.lookup(&alloc::format!("{name}*")).unwrap().is_pointer());
        }
        assert!(TypeRegistry::empty().get("bool").is_none());
    }

    #[test]
    fn fundamentals_default_construct() {
        let registry = TypeRegistry::new();
        let zero = registry.lookup("i32").unwrap().create(&registry).unwrap();
        assert_eq!(zero.take::<i32>().unwrap(), 0);

        let empty = registry.lookup("String").unwrap().create(&registry).unwrap();
        assert_eq!(empty.take::<alloc::string::String>().unwrap(), "");
    }

    #[test]
    fn literal_round_trip_through_descriptors() {
        let registry = TypeRegistry::new();
        let f64_desc = registry.lookup("f64").unwrap();
        let parsed = f64_desc.parse_literal("45").unwrap();
        assert_eq!(parsed.take::<f64>().unwrap(), 45.0);

        let bool_desc = registry.lookup("bool").unwrap();
        assert!(bool_desc.parse_literal("maybe").is_err());
    }
}
