use alloc::boxed::Box;
use alloc::rc::Rc;
use alloc::vec::Vec;
use core::any::{Any, TypeId, type_name};

use crate::info::{
    Annotations, CollectionOps, Method, Property, ScalarCodec, TypeDescriptor, TypeKind, TypeRef,
    Upcast,
};
use crate::value::{Value, shared};

// -----------------------------------------------------------------------------
// TypeBuilder

/// A declaration under construction, consumed by
/// [`TypeRegistry::declare`](crate::registry::TypeRegistry::declare).
///
/// The builder captures everything the registry needs to finalize a
/// [`TypeDescriptor`]: the bound Rust type, the kind, constructors,
/// properties, methods, inheritance, and annotations. Member value types
/// are resolved to canonical names at declaration time, so every type a
/// declaration mentions must already be in the registry.
///
/// # Example
///
/// ```
/// use mirra_reflect::info::{Property, TypeBuilder};
/// use mirra_reflect::registry::TypeRegistry;
///
/// #[derive(Default)]
/// struct Point {
///     x: f64,
///     y: f64,
/// }
///
/// let mut registry = TypeRegistry::new();
/// registry
///     .declare(
///         TypeBuilder::object::<Point>("Point")
///             .constructor(Point::default)
///             .property(Property::read_write("x", |p: &Point| p.x, |p: &mut Point, v| p.x = v))
///             .property(Property::read_write("y", |p: &Point| p.y, |p: &mut Point, v| p.y = v)),
///     )
///     .unwrap();
///
/// let point = registry.lookup("Point").unwrap();
/// assert!(point.is_object());
/// assert_eq!(point.property_len(), 2);
/// ```
pub struct TypeBuilder {
    pub(crate) name: Box<str>,
    pub(crate) kind: TypeKind,
    pub(crate) type_id: TypeId,
    pub(crate) native: &'static str,
    pub(crate) is_abstract: bool,
    pub(crate) derives: Option<Box<str>>,
    pub(crate) upcast: Option<Upcast>,
    pub(crate) make: Option<Box<dyn Fn() -> Value>>,
    pub(crate) make_shared: Option<Box<dyn Fn() -> Value>>,
    pub(crate) codec: Option<ScalarCodec>,
    pub(crate) element: Option<TypeRef>,
    pub(crate) collection: Option<CollectionOps>,
    pub(crate) properties: Vec<Property>,
    pub(crate) methods: Vec<Method>,
    pub(crate) annotations: Annotations,
}

impl TypeBuilder {
    fn new<T: Any>(name: &str, kind: TypeKind) -> Self {
        Self {
            name: name.into(),
            kind,
            type_id: TypeId::of::<T>(),
            native: type_name::<T>(),
            is_abstract: false,
            derives: None,
            upcast: None,
            make: None,
            make_shared: None,
            codec: None,
            element: None,
            collection: None,
            properties: Vec::new(),
            methods: Vec::new(),
            annotations: Annotations::new(),
        }
    }

    /// Starts an object declaration binding the Rust type `T` to the
    /// canonical name `name`.
    pub fn object<T: Any>(name: &str) -> Self {
        Self::new::<T>(name, TypeKind::Object)
    }

    /// Starts a fundamental declaration with its literal codec.
    ///
    /// The default fundamental set is pre-declared by
    /// [`TypeRegistry::new`](crate::registry::TypeRegistry::new); this is
    /// the hook for declaring additional scalars.
    pub fn fundamental<T: Any>(name: &str, codec: ScalarCodec) -> Self {
        let mut builder = Self::new::<T>(name, TypeKind::Fundamental);
        builder.codec = Some(codec);
        builder
    }

    /// Starts a collection declaration for container type `C` with
    /// elements of type `V` and the given behavior table.
    ///
    /// For the common cases, see [`vec_of`](Self::vec_of) and
    /// [`vec_of_shared`](Self::vec_of_shared).
    pub fn collection<C: Any, V: Any>(name: &str, ops: CollectionOps) -> Self {
        let mut builder = Self::new::<C>(name, TypeKind::Collection);
        builder.element = Some(TypeRef::of::<V>());
        builder.collection = Some(ops);
        builder
    }

    /// A collection declaration for `Vec<V>` with by-value elements.
    pub fn vec_of<V: Any + Clone>(name: &str) -> Self {
        let mut builder =
            Self::collection::<Vec<V>, V>(name, CollectionOps::vec_of::<V>());
        builder.make = Some(Box::new(|| Value::of(Vec::<V>::new())));
        builder.make_shared = Some(Box::new(|| Value::pointer(shared(Vec::<V>::new()))));
        builder
    }

    /// A collection declaration for `Vec<Shared<V>>` with pointer
    /// elements.
    pub fn vec_of_shared<V: Any>(name: &str) -> Self {
        let mut builder = Self::collection::<Vec<crate::value::Shared<V>>, V>(
            name,
            CollectionOps::vec_of_shared::<V>(),
        );
        builder.element = Some(TypeRef::pointer_of::<V>());
        builder.make = Some(Box::new(|| Value::of(Vec::<crate::value::Shared<V>>::new())));
        builder.make_shared = Some(Box::new(|| {
            Value::pointer(shared(Vec::<crate::value::Shared<V>>::new()))
        }));
        builder
    }

    /// Binds the constructor `create()` dispatches to.
    ///
    /// # Panics
    ///
    /// Panics if `T` is not the type this declaration was started with —
    /// a declaration-time programming error.
    pub fn constructor<T: Any>(mut self, ctor: impl Fn() -> T + 'static) -> Self {
        assert_eq!(
            TypeId::of::<T>(),
            self.type_id,
            "constructor type `{}` does not match declared type `{}`",
            type_name::<T>(),
            self.native,
        );
        let ctor = Rc::new(ctor);
        let by_value = ctor.clone();
        self.make = Some(Box::new(move || Value::of((*by_value)())));
        self.make_shared = Some(Box::new(move || Value::pointer(shared((*ctor)()))));
        self
    }

    /// Marks the type abstract: `create()` yields the empty value.
    pub fn abstract_type(mut self) -> Self {
        self.is_abstract = true;
        self
    }

    /// Declares this type as deriving from `parent`, which must already be
    /// registered when the declaration enters the registry.
    ///
    /// Derivation is expressed over embedding: `T` holds a `P` and the two
    /// closures select it, so that accessors declared on `P` (whose
    /// descriptors this type will share) run against `T` instances. The
    /// parent's property and method entries seed this type's maps, and this
    /// type joins the child-set of the parent and of every ancestor —
    /// including the pointer/reference companions on both sides.
    ///
    /// # Panics
    ///
    /// Panics if `T` is not the type this declaration was started with.
    pub fn derives_from<T: Any, P: Any>(
        mut self,
        parent: &str,
        up: impl Fn(&T) -> &P + 'static,
        up_mut: impl Fn(&mut T) -> &mut P + 'static,
    ) -> Self {
        assert_eq!(
            TypeId::of::<T>(),
            self.type_id,
            "derives_from child type `{}` does not match declared type `{}`",
            type_name::<T>(),
            self.native,
        );
        self.derives = Some(parent.into());
        self.upcast = Some(Upcast {
            by_ref: Box::new(move |any| {
                any.downcast_ref::<T>().map(|t| up(t) as &dyn Any)
            }),
            by_mut: Box::new(move |any| {
                any.downcast_mut::<T>().map(|t| up_mut(t) as &mut dyn Any)
            }),
        });
        self
    }

    /// Adds a property declaration.
    pub fn property(mut self, property: Property) -> Self {
        self.properties.push(property);
        self
    }

    /// Adds a method declaration.
    pub fn method(mut self, method: Method) -> Self {
        self.methods.push(method);
        self
    }

    /// Attaches an annotation tag to the type.
    pub fn annotate<T: Any>(mut self, tag: T) -> Self {
        self.annotations.push(tag);
        self
    }

    pub(crate) fn into_descriptor(self) -> (TypeDescriptor, Vec<Property>, Vec<Method>) {
        let mut descriptor = TypeDescriptor::bare(self.name, self.kind);
        descriptor.type_id = Some(self.type_id);
        descriptor.native = Some(self.native);
        descriptor.is_abstract = self.is_abstract;
        descriptor.parent = self.derives;
        descriptor.upcast = self.upcast;
        descriptor.make = self.make;
        descriptor.make_shared = self.make_shared;
        descriptor.codec = self.codec;
        descriptor.collection = self.collection;
        descriptor.annotations = self.annotations;
        (descriptor, self.properties, self.methods)
    }

    pub(crate) fn element_ref(&self) -> Option<TypeRef> {
        self.element
    }
}
