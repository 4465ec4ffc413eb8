//! An explicit, thread-local "current registry" with a defined
//! `init`/`reset` lifecycle.
//!
//! Nothing in the engine requires this module — every operation takes a
//! [`TypeRegistry`] parameter, and tests construct independent registries —
//! but applications that declare their types once at startup can install
//! the registry here instead of threading it through every call site.
//!
//! The context is thread-local rather than process-global: descriptors
//! hold `Rc` handles and non-`Send` closures, so a registry is confined to
//! the thread that built it by construction.
//!
//! # Example
//!
//! ```
//! use mirra_reflect::registry::context;
//!
//! context::init();
//! context::with_mut(|registry| {
//!     // declare types here
//!     assert!(registry.contains("f64"));
//! });
//! context::reset();
//! assert!(!context::is_initialized());
//! ```

use core::cell::RefCell;

use crate::registry::TypeRegistry;

std::thread_local! {
    static CURRENT: RefCell<Option<TypeRegistry>> = const { RefCell::new(None) };
}

/// Installs a fresh [`TypeRegistry::new`] as the current registry,
/// replacing any previous one.
pub fn init() {
    install(TypeRegistry::new());
}

/// Installs `registry` as the current registry, replacing any previous
/// one.
pub fn install(registry: TypeRegistry) {
    CURRENT.with(|current| {
        *current.borrow_mut() = Some(registry);
    });
}

/// Drops the current registry, if any. After a reset the context must be
/// initialized again before use.
pub fn reset() {
    CURRENT.with(|current| {
        *current.borrow_mut() = None;
    });
}

/// `true` between [`init`]/[`install`] and [`reset`].
pub fn is_initialized() -> bool {
    CURRENT.with(|current| current.borrow().is_some())
}

/// Runs `f` with the current registry.
///
/// # Panics
///
/// Panics if the context has not been initialized — a lifecycle error in
/// the hosting application.
pub fn with<R>(f: impl FnOnce(&TypeRegistry) -> R) -> R {
    CURRENT.with(|current| {
        let borrowed = current.borrow();
        match borrowed.as_ref() {
            Some(registry) => f(registry),
            None => panic!("registry context used before `context::init()`"),
        }
    })
}

/// Runs `f` with mutable access to the current registry — the declaration
/// phase.
///
/// # Panics
///
/// Panics if the context has not been initialized.
pub fn with_mut<R>(f: impl FnOnce(&mut TypeRegistry) -> R) -> R {
    CURRENT.with(|current| {
        let mut borrowed = current.borrow_mut();
        match borrowed.as_mut() {
            Some(registry) => f(registry),
            None => panic!("registry context used before `context::init()`"),
        }
    })
}

#[cfg(test)]
mod tests {
    use super::{init, install, is_initialized, reset, with, with_mut};
    use crate::registry::TypeRegistry;

    #[test]
    fn lifecycle() {
        reset();
        assert!(!is_initialized());

        init();
        assert!(is_initialized());
        assert!(with(|registry| registry.contains("String")));

        install(TypeRegistry::empty());
        with_mut(|registry| assert!(registry.is_empty()));

        reset();
        assert!(!is_initialized());
    }
}
