use alloc::boxed::Box;
use alloc::rc::Rc;
use core::any::{Any, TypeId, type_name};
use core::cell::{Ref, RefCell, RefMut};

use crate::ReflectError;

// -----------------------------------------------------------------------------
// Shared

/// A shared, mutable cell — the engine's rendition of a native pointer.
///
/// Cloning a `Shared<T>` produces another handle to the *same* instance, so
/// two properties can alias one target and graphs can contain cycles. The
/// cell's address ([`Rc::as_ptr`]) is the identity the text writer tracks to
/// collapse shared and self-referential structures.
pub type Shared<T> = Rc<RefCell<T>>;

/// Wraps `value` in a fresh [`Shared`] cell.
#[inline]
pub fn shared<T>(value: T) -> Shared<T> {
    Rc::new(RefCell::new(value))
}

// -----------------------------------------------------------------------------
// SharedCell

/// Object-safe erasure of a [`Shared<T>`].
///
/// This is what lets a [`Value`](super::Value) hold a pointer to *some*
/// registered type: identity, borrowing, and stores go through this trait,
/// while typed recovery goes through [`as_any`](SharedCell::as_any), which
/// exposes the `Shared<T>` itself for a safe downcast.
pub(crate) trait SharedCell {
    /// The [`TypeId`] of the pointee.
    fn target_type_id(&self) -> TypeId;

    /// The pointee's native type name, for diagnostics.
    fn target_type_name(&self) -> &'static str;

    /// The pointee address. Stable for the lifetime of the cell.
    fn address(&self) -> usize;

    /// Borrows the pointee as `dyn Any`.
    fn borrow_any(&self) -> Result<Ref<'_, dyn Any>, ReflectError>;

    /// Mutably borrows the pointee as `dyn Any`.
    fn borrow_any_mut(&self) -> Result<RefMut<'_, dyn Any>, ReflectError>;

    /// Replaces the pointee with `value`, which must hold the exact target
    /// type. `native` names the incoming value for error reporting.
    fn store(&self, value: Box<dyn Any>, native: &'static str) -> Result<(), ReflectError>;

    /// The `Shared<T>` itself, for typed recovery by downcast.
    fn as_any(&self) -> &dyn Any;

    /// The `Shared<T>` itself, as an owned erased box.
    fn into_any(self: Box<Self>) -> Box<dyn Any>;

    /// Clones the handle (not the pointee).
    fn clone_cell(&self) -> Box<dyn SharedCell>;
}

impl<T: Any> SharedCell for Shared<T> {
    #[inline]
    fn target_type_id(&self) -> TypeId {
        TypeId::of::<T>()
    }

    #[inline]
    fn target_type_name(&self) -> &'static str {
        type_name::<T>()
    }

    #[inline]
    fn address(&self) -> usize {
        Rc::as_ptr(self) as *const () as usize
    }

    fn borrow_any(&self) -> Result<Ref<'_, dyn Any>, ReflectError> {
        match self.try_borrow() {
            Ok(r) => Ok(Ref::map(r, |t| t as &dyn Any)),
            Err(_) => Err(ReflectError::BorrowConflict),
        }
    }

    fn borrow_any_mut(&self) -> Result<RefMut<'_, dyn Any>, ReflectError> {
        match self.try_borrow_mut() {
            Ok(r) => Ok(RefMut::map(r, |t| t as &mut dyn Any)),
            Err(_) => Err(ReflectError::BorrowConflict),
        }
    }

    fn store(&self, value: Box<dyn Any>, native: &'static str) -> Result<(), ReflectError> {
        let value = value
            .downcast::<T>()
            .map_err(|_| ReflectError::cast(native, type_name::<T>()))?;
        match self.try_borrow_mut() {
            Ok(mut slot) => {
                *slot = *value;
                Ok(())
            }
            Err(_) => Err(ReflectError::BorrowConflict),
        }
    }

    #[inline]
    fn as_any(&self) -> &dyn Any {
        self
    }

    #[inline]
    fn into_any(self: Box<Self>) -> Box<dyn Any> {
        self
    }

    fn clone_cell(&self) -> Box<dyn SharedCell> {
        Box::new(self.clone())
    }
}
