//! The type-erased [`Value`] container all reflective operations exchange
//! data through.

use alloc::boxed::Box;
use core::any::{Any, TypeId, type_name};
use core::fmt;

use crate::ReflectError;

mod cast;
mod shared;

pub use shared::{Shared, shared};

pub(crate) use shared::SharedCell;

// -----------------------------------------------------------------------------
// ValueKind

/// How a [`Value`] holds its content.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueKind {
    /// No content at all — the result of constructing an abstract type or
    /// invoking a void method.
    Empty,
    /// Owns its content directly. Fetching a by-value property yields an
    /// independent copy of the field.
    Value,
    /// Aliases a [`Shared`] cell (possibly null). Mutations through a
    /// pointer value are visible to every other handle on the same cell.
    Pointer,
    /// Aliases a [`Shared`] cell, never null.
    Reference,
}

// -----------------------------------------------------------------------------
// Value

enum Storage {
    Empty,
    Boxed(Box<dyn Any>),
    Cell(Box<dyn SharedCell>),
    /// A null pointer; carries the pointee's type tag.
    Null(TypeId),
}

/// A single value of unknown static type: runtime type tag + storage +
/// kind discriminator.
///
/// Values are created transiently per call — by getters, method returns,
/// literal parsing — and never persisted. Recovering the typed content is
/// always an explicit, checked operation: [`take`](Value::take) for an
/// exact tag match, [`cast`](Value::cast) to additionally permit the
/// documented numeric widenings, [`to_shared`](Value::to_shared) for
/// pointer values.
pub struct Value {
    kind: ValueKind,
    native: &'static str,
    storage: Storage,
}

impl Value {
    /// The empty value.
    #[inline]
    pub const fn empty() -> Self {
        Self {
            kind: ValueKind::Empty,
            native: "(empty)",
            storage: Storage::Empty,
        }
    }

    /// A value owning `value` directly.
    pub fn of<T: Any>(value: T) -> Self {
        Self {
            kind: ValueKind::Value,
            native: type_name::<T>(),
            storage: Storage::Boxed(Box::new(value)),
        }
    }

    /// A pointer value aliasing `cell`.
    pub fn pointer<T: Any>(cell: Shared<T>) -> Self {
        Self {
            kind: ValueKind::Pointer,
            native: type_name::<T>(),
            storage: Storage::Cell(Box::new(cell)),
        }
    }

    /// A reference value aliasing `cell`.
    pub fn reference<T: Any>(cell: Shared<T>) -> Self {
        Self {
            kind: ValueKind::Reference,
            native: type_name::<T>(),
            storage: Storage::Cell(Box::new(cell)),
        }
    }

    /// A null pointer to `T`.
    pub fn null<T: Any>() -> Self {
        Self::null_of(TypeId::of::<T>(), type_name::<T>())
    }

    pub(crate) fn null_of(type_id: TypeId, native: &'static str) -> Self {
        Self {
            kind: ValueKind::Pointer,
            native,
            storage: Storage::Null(type_id),
        }
    }

    // -------------------------------------------------------------------------
    // Queries

    /// The kind discriminator.
    #[inline]
    pub fn kind(&self) -> ValueKind {
        self.kind
    }

    /// `true` for the empty value.
    #[inline]
    pub fn is_empty(&self) -> bool {
        matches!(self.storage, Storage::Empty)
    }

    /// `true` for a null pointer.
    #[inline]
    pub fn is_null(&self) -> bool {
        matches!(self.storage, Storage::Null(_))
    }

    /// The runtime type tag: for pointer and reference values, the tag of
    /// the pointee. `None` for the empty value.
    pub fn type_id(&self) -> Option<TypeId> {
        match &self.storage {
            Storage::Empty => None,
            Storage::Boxed(b) => Some((**b).type_id()),
            Storage::Cell(cell) => Some(cell.target_type_id()),
            Storage::Null(id) => Some(*id),
        }
    }

    /// `true` if the tag matches `T` exactly.
    #[inline]
    pub fn is<T: Any>(&self) -> bool {
        self.type_id() == Some(TypeId::of::<T>())
    }

    /// The native (Rust) name of the content type, for diagnostics.
    #[inline]
    pub fn native_type_name(&self) -> &'static str {
        self.native
    }

    /// The pointee address of a pointer or reference value.
    ///
    /// The address is the identity the text writer uses to collapse shared
    /// and cyclic structures. Null pointers and non-pointer values have no
    /// address.
    pub fn address(&self) -> Option<usize> {
        match &self.storage {
            Storage::Cell(cell) => Some(cell.address()),
            _ => None,
        }
    }

    // -------------------------------------------------------------------------
    // Erased access

    /// Runs `f` over the content as `dyn Any`.
    ///
    /// Pointer and reference values borrow their cell for the duration of
    /// the call; a null or empty value fails with
    /// [`NullInstance`](ReflectError::NullInstance).
    pub fn with_ref<R>(&self, f: impl FnOnce(&dyn Any) -> R) -> Result<R, ReflectError> {
        match &self.storage {
            Storage::Boxed(b) => Ok(f(&**b)),
            Storage::Cell(cell) => {
                let borrowed = cell.borrow_any()?;
                Ok(f(&*borrowed))
            }
            Storage::Null(_) | Storage::Empty => Err(ReflectError::NullInstance),
        }
    }

    /// Runs `f` over the content as `&mut dyn Any`.
    ///
    /// Same failure modes as [`with_ref`](Value::with_ref).
    pub fn with_mut<R>(&mut self, f: impl FnOnce(&mut dyn Any) -> R) -> Result<R, ReflectError> {
        match &mut self.storage {
            Storage::Boxed(b) => Ok(f(&mut **b)),
            Storage::Cell(cell) => {
                let mut borrowed = cell.borrow_any_mut()?;
                Ok(f(&mut *borrowed))
            }
            Storage::Null(_) | Storage::Empty => Err(ReflectError::NullInstance),
        }
    }

    // -------------------------------------------------------------------------
    // Typed recovery

    /// Takes the content out as `T`, requiring an exact tag match.
    ///
    /// For pointer and reference values, `T` is the *handle* type
    /// `Shared<Pointee>`; taking does not consume the pointee, only this
    /// alias of it.
    pub fn take<T: Any>(self) -> Result<T, ReflectError> {
        let native = self.native;
        match self.storage {
            Storage::Boxed(b) => match b.downcast::<T>() {
                Ok(v) => Ok(*v),
                Err(_) => Err(ReflectError::cast(native, type_name::<T>())),
            },
            Storage::Cell(cell) => match cell.into_any().downcast::<T>() {
                Ok(v) => Ok(*v),
                Err(_) => Err(ReflectError::cast(native, type_name::<T>())),
            },
            Storage::Null(_) | Storage::Empty => {
                Err(ReflectError::cast(native, type_name::<T>()))
            }
        }
    }

    /// Like [`take`](Value::take), but additionally permits the numeric
    /// widenings below for by-value content. All other mismatches fail with
    /// [`CastError`](ReflectError::CastError).
    ///
    /// Widening table (target ← sources), every entry value-preserving:
    /// `i16 ← i8,u8` · `i32 ← i8,i16,u8,u16` · `i64 ← i8..i32,u8..u32` ·
    /// `u16 ← u8` · `u32 ← u8,u16` · `u64 ← u8..u32` · `f32 ← i8,i16,u8,u16`
    /// · `f64 ← i8..i32,u8..u32,f32`. Narrowing and sign-crossing are never
    /// implicit.
    pub fn cast<T: Any>(self) -> Result<T, ReflectError> {
        match self.kind {
            ValueKind::Value => {
                if self.is::<T>() {
                    return self.take::<T>();
                }
                let native = self.native;
                if let Storage::Boxed(b) = &self.storage
                    && let Some(widened) = cast::widen::<T>(&**b)
                {
                    return Ok(widened);
                }
                Err(ReflectError::cast(native, type_name::<T>()))
            }
            _ => self.take::<T>(),
        }
    }

    /// Recovers a pointer value as an optional typed handle: a null pointer
    /// to `T` yields `None`, a live pointer to `T` yields `Some`.
    pub fn to_shared<T: Any>(self) -> Result<Option<Shared<T>>, ReflectError> {
        let native = self.native;
        match self.storage {
            Storage::Null(id) if id == TypeId::of::<T>() => Ok(None),
            Storage::Cell(cell) => match cell.into_any().downcast::<Shared<T>>() {
                Ok(cell) => Ok(Some(*cell)),
                Err(_) => Err(ReflectError::cast(native, type_name::<T>())),
            },
            _ => Err(ReflectError::cast(native, type_name::<T>())),
        }
    }

    // -------------------------------------------------------------------------
    // Aliasing and assignment

    /// Clones this value *if* cloning is an aliasing operation: pointer,
    /// reference, null, and empty values clone cheaply; by-value content
    /// cannot be duplicated through erasure and yields `None`.
    pub fn alias(&self) -> Option<Value> {
        let storage = match &self.storage {
            Storage::Empty => Storage::Empty,
            Storage::Cell(cell) => Storage::Cell(cell.clone_cell()),
            Storage::Null(id) => Storage::Null(*id),
            Storage::Boxed(_) => return None,
        };
        Some(Value {
            kind: self.kind,
            native: self.native,
            storage,
        })
    }

    /// Overwrites the content in place with `src`, which must hold the
    /// exact same type by value.
    ///
    /// For pointer and reference targets the *pointee* is overwritten; the
    /// cell identity is preserved.
    pub fn assign(&mut self, src: Value) -> Result<(), ReflectError> {
        match (&mut self.storage, src.storage) {
            (Storage::Boxed(dst), Storage::Boxed(new)) => {
                if (**dst).type_id() == (*new).type_id() {
                    *dst = new;
                    Ok(())
                } else {
                    Err(ReflectError::cast(src.native, self.native))
                }
            }
            (Storage::Cell(cell), Storage::Boxed(new)) => cell.store(new, src.native),
            (Storage::Null(_) | Storage::Empty, _) => Err(ReflectError::NullInstance),
            _ => Err(ReflectError::cast(src.native, self.native)),
        }
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = match &self.storage {
            Storage::Null(_) => " (null)",
            Storage::Empty => return f.write_str("Value::Empty"),
            _ => "",
        };
        write!(f, "Value::{:?}<{}>{state}", self.kind, self.native)
    }
}

#[cfg(test)]
mod tests {
    use super::{Value, ValueKind, shared};
    use crate::ReflectError;
    use alloc::string::String;

    #[test]
    fn by_value_round_trip() {
        let v = Value::of(42i32);
        assert_eq!(v.kind(), ValueKind::Value);
        assert!(v.is::<i32>());
        assert_eq!(v.take::<i32>().unwrap(), 42);
    }

    #[test]
    fn cast_widens_but_never_narrows() {
        assert_eq!(Value::of(42i32).cast::<f64>().unwrap(), 42.0);
        assert_eq!(Value::of(7u8).cast::<i64>().unwrap(), 7);
        assert!(matches!(
            Value::of(1.5f64).cast::<f32>(),
            Err(ReflectError::CastError { .. })
        ));
    }

    #[test]
    fn pointer_values_alias_one_cell() {
        let cell = shared(String::from("hello"));
        let a = Value::pointer(cell.clone());
        let b = a.alias().unwrap();
        assert_eq!(a.address(), b.address());

        b.with_ref(|any| {
            assert_eq!(any.downcast_ref::<String>().unwrap(), "hello");
        })
        .unwrap();

        let recovered = b.to_shared::<String>().unwrap().unwrap();
        recovered.borrow_mut().push_str(" world");
        assert_eq!(*cell.borrow(), "hello world");
    }

    #[test]
    fn null_pointers_have_no_address() {
        let null = Value::null::<i32>();
        assert!(null.is_null());
        assert_eq!(null.kind(), ValueKind::Pointer);
        assert_eq!(null.address(), None);
        assert!(matches!(
            null.with_ref(|_| ()),
            Err(ReflectError::NullInstance)
        ));
        assert_eq!(null.to_shared::<i32>().unwrap(), None);
    }

    #[test]
    fn assign_overwrites_pointee_in_place() {
        let cell = shared(1i32);
        let mut v = Value::pointer(cell.clone());
        let addr = v.address();
        v.assign(Value::of(9i32)).unwrap();
        assert_eq!(*cell.borrow(), 9);
        assert_eq!(v.address(), addr);

        assert!(v.assign(Value::of("wrong")).is_err());
    }

    #[test]
    fn take_recovers_shared_handles() {
        let cell = shared(5u8);
        let v = Value::pointer(cell.clone());
        let handle = v.take::<super::Shared<u8>>().unwrap();
        assert_eq!(*handle.borrow(), 5);
    }
}
