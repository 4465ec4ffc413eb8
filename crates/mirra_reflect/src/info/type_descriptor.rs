use alloc::boxed::Box;
use alloc::rc::Rc;
use alloc::vec::Vec;
use core::any::{Any, TypeId};

use crate::ReflectError;
use crate::hash::HashMap;
use crate::info::{Annotations, CollectionOps, MethodDescriptor, PropertyDescriptor, ScalarCodec};
use crate::registry::TypeRegistry;
use crate::value::Value;

// -----------------------------------------------------------------------------
// TypeKind

/// The kind discriminant of a [`TypeDescriptor`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeKind {
    /// A scalar with a literal codec: the numeric types, `bool`, `char`,
    /// `String`.
    Fundamental,
    /// A type with properties and methods.
    Object,
    /// The automatically registered `"T*"` companion: wraps a base
    /// descriptor and delegates property/method lookup and creation to it.
    Pointer,
    /// The automatically registered `"T&"` companion.
    Reference,
    /// A sequential container with an element type and a
    /// [`CollectionOps`] behavior table.
    Collection,
}

// -----------------------------------------------------------------------------
// Upcast

/// Views an instance of a derived type as its declared parent.
///
/// Derivation is declared over embedding — the child struct holds the
/// parent struct — and these closures select the embedded parent, so that
/// accessors declared on the parent run against instances of any
/// descendant.
pub(crate) struct Upcast {
    pub(crate) by_ref: Box<dyn Fn(&dyn Any) -> Option<&dyn Any>>,
    pub(crate) by_mut: Box<dyn Fn(&mut dyn Any) -> Option<&mut dyn Any>>,
}

// -----------------------------------------------------------------------------
// TypeDescriptor

/// The runtime description of one declared type.
///
/// One concrete record covers every kind: a [`TypeKind`] discriminant plus
/// per-kind behavior data (constructor closures for objects, a
/// [`ScalarCodec`] for fundamentals, [`CollectionOps`] for collections, a
/// base link for pointer/reference companions).
///
/// Descriptors are created during declaration and owned by the
/// [`TypeRegistry`] for its lifetime. Property and method descriptors are
/// `Rc`-shared with derived types, never deep-copied.
pub struct TypeDescriptor {
    pub(crate) name: Box<str>,
    pub(crate) kind: TypeKind,
    /// The Rust type this descriptor describes (by-value form). `None` for
    /// pointer/reference companions, which are identified by name alone.
    pub(crate) type_id: Option<TypeId>,
    pub(crate) native: Option<&'static str>,
    pub(crate) is_abstract: bool,
    /// Wrapped base type name for pointer/reference companions.
    pub(crate) base: Option<Box<str>>,
    /// Element type name for collections.
    pub(crate) element: Option<Box<str>>,
    pub(crate) parent: Option<Box<str>>,
    pub(crate) children: Vec<Box<str>>,
    pub(crate) properties: Vec<Rc<PropertyDescriptor>>,
    pub(crate) property_index: HashMap<Box<str>, usize>,
    pub(crate) methods: Vec<Rc<MethodDescriptor>>,
    pub(crate) method_index: HashMap<Box<str>, usize>,
    pub(crate) annotations: Annotations,
    pub(crate) make: Option<Box<dyn Fn() -> Value>>,
    pub(crate) make_shared: Option<Box<dyn Fn() -> Value>>,
    pub(crate) codec: Option<ScalarCodec>,
    pub(crate) collection: Option<CollectionOps>,
    pub(crate) upcast: Option<Upcast>,
}

impl TypeDescriptor {
    pub(crate) fn bare(name: Box<str>, kind: TypeKind) -> Self {
        Self {
            name,
            kind,
            type_id: None,
            native: None,
            is_abstract: false,
            base: None,
            element: None,
            parent: None,
            children: Vec::new(),
            properties: Vec::new(),
            property_index: HashMap::default(),
            methods: Vec::new(),
            method_index: HashMap::default(),
            annotations: Annotations::new(),
            make: None,
            make_shared: None,
            codec: None,
            collection: None,
            upcast: None,
        }
    }

    // -------------------------------------------------------------------------
    // Identity and capabilities

    /// The canonical name — the registry key.
    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The kind discriminant.
    #[inline]
    pub fn kind(&self) -> TypeKind {
        self.kind
    }

    #[inline]
    pub fn is_fundamental(&self) -> bool {
        self.kind == TypeKind::Fundamental
    }

    #[inline]
    pub fn is_object(&self) -> bool {
        self.kind == TypeKind::Object
    }

    #[inline]
    pub fn is_pointer(&self) -> bool {
        self.kind == TypeKind::Pointer
    }

    #[inline]
    pub fn is_reference(&self) -> bool {
        self.kind == TypeKind::Reference
    }

    #[inline]
    pub fn is_collection(&self) -> bool {
        self.kind == TypeKind::Collection
    }

    /// `true` for types declared abstract: they describe a shape but cannot
    /// be instantiated.
    #[inline]
    pub fn is_abstract(&self) -> bool {
        self.is_abstract
    }

    /// The [`TypeId`] of the described Rust type; `None` for
    /// pointer/reference companions.
    #[inline]
    pub fn type_id(&self) -> Option<TypeId> {
        self.type_id
    }

    /// The wrapped base type name of a pointer/reference companion.
    #[inline]
    pub fn base_type(&self) -> Option<&str> {
        self.base.as_deref()
    }

    /// The element type name of a collection.
    #[inline]
    pub fn element_type(&self) -> Option<&str> {
        self.element.as_deref()
    }

    // -------------------------------------------------------------------------
    // Inheritance

    /// The canonical name of the declared parent, if any.
    #[inline]
    pub fn parent(&self) -> Option<&str> {
        self.parent.as_deref()
    }

    /// The canonical names of every type transitively derived from this
    /// one, in declaration order.
    pub fn children(&self) -> impl ExactSizeIterator<Item = &str> {
        self.children.iter().map(|s| &**s)
    }

    /// `true` if `name` was declared as deriving from this type, directly
    /// or transitively.
    pub fn has_child(&self, name: &str) -> bool {
        self.children.iter().any(|c| &**c == name)
    }

    // -------------------------------------------------------------------------
    // Members

    /// The property with the given name, if declared (inherited entries
    /// included).
    pub fn property(&self, name: &str) -> Option<&Rc<PropertyDescriptor>> {
        self.property_index
            .get(name)
            .map(|index| &self.properties[*index])
    }

    /// Like [`property`](Self::property), failing with
    /// [`PropertyNotDeclared`](ReflectError::PropertyNotDeclared) on a miss.
    pub fn lookup_property(&self, name: &str) -> Result<&Rc<PropertyDescriptor>, ReflectError> {
        self.property(name)
            .ok_or_else(|| ReflectError::PropertyNotDeclared {
                owner: self.name.clone(),
                name: name.into(),
            })
    }

    /// The declared properties in declaration order, inherited entries
    /// first.
    pub fn properties(&self) -> impl ExactSizeIterator<Item = &Rc<PropertyDescriptor>> {
        self.properties.iter()
    }

    /// The number of declared properties.
    #[inline]
    pub fn property_len(&self) -> usize {
        self.properties.len()
    }

    /// The method with the given name, if declared (inherited entries
    /// included).
    pub fn method(&self, name: &str) -> Option<&Rc<MethodDescriptor>> {
        self.method_index
            .get(name)
            .map(|index| &self.methods[*index])
    }

    /// Like [`method`](Self::method), failing with
    /// [`MethodNotDeclared`](ReflectError::MethodNotDeclared) on a miss.
    pub fn lookup_method(&self, name: &str) -> Result<&Rc<MethodDescriptor>, ReflectError> {
        self.method(name)
            .ok_or_else(|| ReflectError::MethodNotDeclared {
                owner: self.name.clone(),
                name: name.into(),
            })
    }

    /// The declared methods in declaration order, inherited entries first.
    pub fn methods(&self) -> impl ExactSizeIterator<Item = &Rc<MethodDescriptor>> {
        self.methods.iter()
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

    // -------------------------------------------------------------------------
    // Behavior

    /// Creates a fresh by-value instance.
    ///
    /// Abstract types — and types declared without a constructor — yield
    /// the empty value. Pointer/reference companions delegate to their base
    /// descriptor.
    pub fn create(&self, registry: &TypeRegistry) -> Result<Value, ReflectError> {
        match self.kind {
            TypeKind::Pointer | TypeKind::Reference => {
                self.wrapped_base(registry)?.create(registry)
            }
            _ => match (&self.make, self.is_abstract) {
                (Some(make), false) => Ok(make()),
                _ => Ok(Value::empty()),
            },
        }
    }

    /// Creates a fresh instance inside a shared cell, yielding a pointer
    /// value — the allocation path for pointer-typed property targets.
    ///
    /// Same abstract/constructor rules as [`create`](Self::create).
    pub fn create_shared(&self, registry: &TypeRegistry) -> Result<Value, ReflectError> {
        match self.kind {
            TypeKind::Pointer | TypeKind::Reference => {
                self.wrapped_base(registry)?.create_shared(registry)
            }
            _ => match (&self.make_shared, self.is_abstract) {
                (Some(make), false) => Ok(make()),
                _ => Ok(Value::empty()),
            },
        }
    }

    /// A null pointer value typed to this pointer/reference companion's
    /// base.
    pub fn null_value(&self, registry: &TypeRegistry) -> Result<Value, ReflectError> {
        let base = self.wrapped_base(registry)?;
        match (base.type_id, base.native) {
            (Some(id), Some(native)) => Ok(Value::null_of(id, native)),
            _ => Err(ReflectError::TypeNotDeclared {
                name: base.name.clone(),
            }),
        }
    }

    /// Resolves pointer/reference companions to the descriptor they wrap;
    /// other kinds resolve to themselves.
    pub fn deref_target<'r>(
        &'r self,
        registry: &'r TypeRegistry,
    ) -> Result<&'r TypeDescriptor, ReflectError> {
        match self.kind {
            TypeKind::Pointer | TypeKind::Reference => self.wrapped_base(registry),
            _ => Ok(self),
        }
    }

    fn wrapped_base<'r>(
        &'r self,
        registry: &'r TypeRegistry,
    ) -> Result<&'r TypeDescriptor, ReflectError> {
        match self.base.as_deref() {
            Some(base) => registry.lookup(base),
            None => Err(ReflectError::TypeNotDeclared {
                name: self.name.clone(),
            }),
        }
    }

    /// The literal codec of a fundamental type.
    #[inline]
    pub fn scalar_codec(&self) -> Option<&ScalarCodec> {
        self.codec.as_ref()
    }

    /// Parses one literal of this fundamental type.
    pub fn parse_literal(&self, literal: &str) -> Result<Value, ReflectError> {
        match &self.codec {
            Some(codec) => codec.parse(literal),
            None => Err(ReflectError::InvalidLiteral {
                type_name: self.name.clone(),
                literal: literal.into(),
            }),
        }
    }

    /// The behavior table of a collection type.
    #[inline]
    pub fn collection_ops(&self) -> Option<&CollectionOps> {
        self.collection.as_ref()
    }
}

impl core::fmt::Debug for TypeDescriptor {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("TypeDescriptor")
            .field("name", &self.name)
            .field("kind", &self.kind)
            .field("is_abstract", &self.is_abstract)
            .field("parent", &self.parent)
            .field("properties", &self.properties.len())
            .field("methods", &self.methods.len())
            .finish()
    }
}
