use alloc::boxed::Box;
use alloc::vec::Vec;
use core::any::{Any, type_name};

use crate::ReflectError;
use crate::value::{Shared, Value};

// -----------------------------------------------------------------------------
// CollectionOps

/// The behavior table a collection type descriptor carries: how to walk,
/// refill, and clear one erased instance of the container.
///
/// The element type itself is recorded on the descriptor; these closures
/// only move erased [`Value`]s in and out.
pub struct CollectionOps {
    pub(crate) len: Box<dyn Fn(&dyn Any) -> usize>,
    pub(crate) items: Box<dyn Fn(&dyn Any) -> Result<Vec<Value>, ReflectError>>,
    pub(crate) insert: Box<dyn Fn(&mut dyn Any, Value) -> Result<(), ReflectError>>,
    pub(crate) clear: Box<dyn Fn(&mut dyn Any) -> Result<(), ReflectError>>,
}

impl CollectionOps {
    /// The element count of an erased container instance.
    #[inline]
    pub fn len(&self, container: &dyn Any) -> usize {
        (self.len)(container)
    }

    /// The elements of an erased container instance, in order. By-value
    /// elements come back as copies, shared elements as aliases.
    #[inline]
    pub fn items(&self, container: &dyn Any) -> Result<Vec<Value>, ReflectError> {
        (self.items)(container)
    }

    /// Appends one element, cast to the element type.
    #[inline]
    pub fn insert(&self, container: &mut dyn Any, element: Value) -> Result<(), ReflectError> {
        (self.insert)(container, element)
    }

    /// Removes every element.
    #[inline]
    pub fn clear(&self, container: &mut dyn Any) -> Result<(), ReflectError> {
        (self.clear)(container)
    }

    /// Ops for a `Vec<V>` holding its elements by value.
    ///
    /// Iteration yields copies; insertion accepts any value castable to `V`
    /// (numeric widening included).
    pub fn vec_of<V: Any + Clone>() -> Self {
        Self {
            len: Box::new(|any: &dyn Any| match any.downcast_ref::<Vec<V>>() {
                Some(v) => v.len(),
                None => 0,
            }),
            items: Box::new(|any: &dyn Any| {
                let vec = downcast_vec::<Vec<V>>(any)?;
                Ok(vec.iter().map(|item| Value::of(item.clone())).collect())
            }),
            insert: Box::new(|any: &mut dyn Any, value: Value| {
                let item = value.cast::<V>()?;
                downcast_vec_mut::<Vec<V>>(any)?.push(item);
                Ok(())
            }),
            clear: Box::new(|any: &mut dyn Any| {
                downcast_vec_mut::<Vec<V>>(any)?.clear();
                Ok(())
            }),
        }
    }

    /// Ops for a `Vec<Shared<V>>` holding its elements by pointer.
    ///
    /// Iteration yields aliasing pointer values, so shared elements keep
    /// their identity through serialization. Null pointers cannot be
    /// inserted — the container has no slot for "no element".
    pub fn vec_of_shared<V: Any>() -> Self {
        Self {
            len: Box::new(|any: &dyn Any| match any.downcast_ref::<Vec<Shared<V>>>() {
                Some(v) => v.len(),
                None => 0,
            }),
            items: Box::new(|any: &dyn Any| {
                let vec = downcast_vec::<Vec<Shared<V>>>(any)?;
                Ok(vec.iter().map(|cell| Value::pointer(cell.clone())).collect())
            }),
            insert: Box::new(|any: &mut dyn Any, value: Value| {
                match value.to_shared::<V>()? {
                    Some(cell) => {
                        downcast_vec_mut::<Vec<Shared<V>>>(any)?.push(cell);
                        Ok(())
                    }
                    None => Err(ReflectError::NullInstance),
                }
            }),
            clear: Box::new(|any: &mut dyn Any| {
                downcast_vec_mut::<Vec<Shared<V>>>(any)?.clear();
                Ok(())
            }),
        }
    }
}

impl core::fmt::Debug for CollectionOps {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str("CollectionOps")
    }
}

fn downcast_vec<C: Any>(any: &dyn Any) -> Result<&C, ReflectError> {
    any.downcast_ref::<C>()
        .ok_or_else(|| ReflectError::cast("(instance)", type_name::<C>()))
}

fn downcast_vec_mut<C: Any>(any: &mut dyn Any) -> Result<&mut C, ReflectError> {
    any.downcast_mut::<C>()
        .ok_or_else(|| ReflectError::cast("(instance)", type_name::<C>()))
}

#[cfg(test)]
mod tests {
    use super::CollectionOps;
    use crate::value::{Value, shared};
    use alloc::vec;
    use alloc::vec::Vec;

    #[test]
    fn vec_of_round_trip() {
        let ops = CollectionOps::vec_of::<f64>();
        let mut target: Vec<f64> = vec![1.0, 2.0];

        assert_eq!((ops.len)(&target), 2);
        (ops.clear)(&mut target).unwrap();
        (ops.insert)(&mut target, Value::of(3.5f64)).unwrap();
        // Widening applies on insertion.
        (ops.insert)(&mut target, Value::of(4i32)).unwrap();
        assert_eq!(target, vec![3.5, 4.0]);

        let items = (ops.items)(&target).unwrap();
        assert!(items[0].alias().is_none());
        assert_eq!(items.len(), 2);
    }

    #[test]
    fn vec_of_shared_keeps_identity() {
        let ops = CollectionOps::vec_of_shared::<i32>();
        let cell = shared(7);
        let target: Vec<_> = vec![cell.clone(), cell.clone()];

        let items = (ops.items)(&target).unwrap();
        assert_eq!(items[0].address(), items[1].address());
    }
}
