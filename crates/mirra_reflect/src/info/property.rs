use alloc::boxed::Box;
use core::any::{Any, TypeId, type_name};

use crate::ReflectError;
use crate::info::{Annotations, TypeRef};
use crate::registry::TypeRegistry;
use crate::value::{Shared, Value};

pub(crate) type Getter = Box<dyn Fn(&dyn Any) -> Result<Value, ReflectError>>;
pub(crate) type Setter = Box<dyn Fn(&mut dyn Any, Value) -> Result<(), ReflectError>>;

// -----------------------------------------------------------------------------
// Property (declaration form)

/// A property declaration, produced by one of the factory constructors and
/// handed to [`TypeBuilder::property`](crate::info::TypeBuilder::property).
///
/// Each factory covers one accessor shape; there is no signature probing.
/// The value type is captured from the bound closures and resolved to a
/// canonical name when the declaration enters the registry.
///
/// # Example
///
/// ```
/// use mirra_reflect::info::Property;
///
/// struct Point {
///     x: f64,
///     y: f64,
/// }
///
/// // Read-write field access.
/// let x = Property::read_write("x", |p: &Point| p.x, |p: &mut Point, v| p.x = v);
/// // A getter-only declaration is read-only.
/// let y = Property::read_only("y", |p: &Point| p.y);
/// ```
pub struct Property {
    pub(crate) name: Box<str>,
    pub(crate) owner_id: TypeId,
    pub(crate) owner_native: &'static str,
    pub(crate) ty: TypeRef,
    pub(crate) getter: Option<Getter>,
    pub(crate) setter: Option<Setter>,
    pub(crate) annotations: Annotations,
}

impl Property {
    /// A readable and writable by-value property.
    ///
    /// The getter returns a copy of the field; the setter receives a value
    /// already cast to `V` (numeric widening included).
    pub fn read_write<O, V>(
        name: &str,
        get: impl Fn(&O) -> V + 'static,
        set: impl Fn(&mut O, V) + 'static,
    ) -> Self
    where
        O: Any,
        V: Any,
    {
        Self {
            name: name.into(),
            owner_id: TypeId::of::<O>(),
            owner_native: type_name::<O>(),
            ty: TypeRef::of::<V>(),
            getter: Some(erased_getter(move |owner: &O| Value::of(get(owner)))),
            setter: Some(erased_setter(move |owner: &mut O, value: Value| {
                set(owner, value.cast::<V>()?);
                Ok(())
            })),
            annotations: Annotations::new(),
        }
    }

    /// A read-only by-value property.
    pub fn read_only<O, V>(name: &str, get: impl Fn(&O) -> V + 'static) -> Self
    where
        O: Any,
        V: Any,
    {
        Self {
            name: name.into(),
            owner_id: TypeId::of::<O>(),
            owner_native: type_name::<O>(),
            ty: TypeRef::of::<V>(),
            getter: Some(erased_getter(move |owner: &O| Value::of(get(owner)))),
            setter: None,
            annotations: Annotations::new(),
        }
    }

    /// A readable and writable pointer property over an optional
    /// [`Shared`] field.
    ///
    /// The getter yields an aliasing pointer value (null when the field is
    /// `None`); the setter accepts a pointer to `V` or null.
    pub fn shared<O, V>(
        name: &str,
        get: impl Fn(&O) -> Option<Shared<V>> + 'static,
        set: impl Fn(&mut O, Option<Shared<V>>) + 'static,
    ) -> Self
    where
        O: Any,
        V: Any,
    {
        Self {
            name: name.into(),
            owner_id: TypeId::of::<O>(),
            owner_native: type_name::<O>(),
            ty: TypeRef::pointer_of::<V>(),
            getter: Some(erased_getter(move |owner: &O| match get(owner) {
                Some(cell) => Value::pointer(cell),
                None => Value::null::<V>(),
            })),
            setter: Some(erased_setter(move |owner: &mut O, value: Value| {
                set(owner, value.to_shared::<V>()?);
                Ok(())
            })),
            annotations: Annotations::new(),
        }
    }

    /// A read-only pointer property.
    pub fn shared_read_only<O, V>(
        name: &str,
        get: impl Fn(&O) -> Option<Shared<V>> + 'static,
    ) -> Self
    where
        O: Any,
        V: Any,
    {
        Self {
            name: name.into(),
            owner_id: TypeId::of::<O>(),
            owner_native: type_name::<O>(),
            ty: TypeRef::pointer_of::<V>(),
            getter: Some(erased_getter(move |owner: &O| match get(owner) {
                Some(cell) => Value::pointer(cell),
                None => Value::null::<V>(),
            })),
            setter: None,
            annotations: Annotations::new(),
        }
    }

    /// Attaches an annotation tag to the declaration.
    pub fn annotate<T: Any>(mut self, tag: T) -> Self {
        self.annotations.push(tag);
        self
    }
}

fn erased_getter<O: Any>(get: impl Fn(&O) -> Value + 'static) -> Getter {
    Box::new(move |any: &dyn Any| match any.downcast_ref::<O>() {
        Some(owner) => Ok(get(owner)),
        None => Err(ReflectError::cast("(unrelated instance)", type_name::<O>())),
    })
}

fn erased_setter<O: Any>(
    set: impl Fn(&mut O, Value) -> Result<(), ReflectError> + 'static,
) -> Setter {
    Box::new(
        move |any: &mut dyn Any, value: Value| match any.downcast_mut::<O>() {
            Some(owner) => set(owner, value),
            None => Err(ReflectError::cast("(unrelated instance)", type_name::<O>())),
        },
    )
}

// -----------------------------------------------------------------------------
// PropertyDescriptor

/// A declared property: the registry-owned, resolved form of a
/// [`Property`].
///
/// Descriptors are shared (`Rc`) between a type and the types derived from
/// it; the owner recorded here is always the type that declared the
/// property, and instances of derived types are viewed as the owner through
/// the registered upcast chain before an accessor runs.
pub struct PropertyDescriptor {
    pub(crate) name: Box<str>,
    pub(crate) owner: Box<str>,
    pub(crate) owner_type_id: Option<TypeId>,
    pub(crate) value_type: Box<str>,
    pub(crate) getter: Option<Getter>,
    pub(crate) setter: Option<Setter>,
    pub(crate) annotations: Annotations,
}

impl PropertyDescriptor {
    /// The property name.
    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The canonical name of the declaring type.
    #[inline]
    pub fn owner(&self) -> &str {
        &self.owner
    }

    /// The canonical name of the held type (pointer properties name the
    /// pointer companion, e.g. `"Point*"`).
    #[inline]
    pub fn value_type(&self) -> &str {
        &self.value_type
    }

    /// `true` if a getter was bound.
    #[inline]
    pub fn readable(&self) -> bool {
        self.getter.is_some()
    }

    /// `true` if a setter was bound.
    #[inline]
    pub fn writable(&self) -> bool {
        self.setter.is_some()
    }

    /// The attached annotations.
    #[inline]
    pub fn annotations(&self) -> &Annotations {
        &self.annotations
    }

    /// Returns the first annotation of type `T`, if present.
    pub fn get_annotation<T: Any>(&self) -> Option<&T> {
        self.annotations.get::<T>()
    }

    /// Returns `true` if an annotation of type `T` is attached.
    pub fn has_annotation<T: Any>(&self) -> bool {
        self.annotations.has::<T>()
    }

    /// Reads the property from `instance`.
    ///
    /// By-value properties come back as independent copies; pointer
    /// properties come back aliasing the instance's cell. Fails with
    /// [`NotReadable`](ReflectError::NotReadable) when no getter is bound.
    pub fn get(&self, registry: &TypeRegistry, instance: &Value) -> Result<Value, ReflectError> {
        let Some(getter) = &self.getter else {
            return Err(ReflectError::NotReadable {
                owner: self.owner.clone(),
                name: self.name.clone(),
            });
        };
        instance.with_ref(|any| {
            let view = registry.upcast_view(any, self.owner_type_id)?;
            getter(view)
        })?
    }

    /// Writes `value` into the property on `instance`, casting it to the
    /// declared value type first (numeric widening permitted).
    ///
    /// Fails with [`NotWritable`](ReflectError::NotWritable) when no setter
    /// is bound — a getter-only property is read-only, and writing it is an
    /// error rather than a silent no-op.
    pub fn set(
        &self,
        registry: &TypeRegistry,
        instance: &mut Value,
        value: Value,
    ) -> Result<(), ReflectError> {
        let Some(setter) = &self.setter else {
            return Err(ReflectError::NotWritable {
                owner: self.owner.clone(),
                name: self.name.clone(),
            });
        };
        instance.with_mut(|any| {
            let view = registry.upcast_view_mut(any, self.owner_type_id)?;
            setter(view, value)
        })?
    }
}

impl core::fmt::Debug for PropertyDescriptor {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("PropertyDescriptor")
            .field("name", &self.name)
            .field("owner", &self.owner)
            .field("value_type", &self.value_type)
            .field("readable", &self.readable())
            .field("writable", &self.writable())
            .finish()
    }
}
