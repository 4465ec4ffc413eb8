use alloc::borrow::Cow;
use alloc::boxed::Box;
use alloc::format;
use alloc::rc::Rc;
use alloc::string::ToString;
use alloc::vec::Vec;
use core::any::{Any, TypeId, type_name};

use crate::ReflectError;
use crate::hash::{HashMap, TypeIdMap};
use crate::info::{
    MethodDescriptor, PropertyDescriptor, TypeBuilder, TypeDescriptor, TypeKind, TypeRef,
};
use crate::registry::DemangleTable;
use crate::value::{Value, ValueKind};

// -----------------------------------------------------------------------------
// TypeRegistry

/// The store mapping canonical type names to [`TypeDescriptor`]s.
///
/// A registry is populated once during initialization by
/// [`declare`](TypeRegistry::declare)-ing every reflectable type, and is
/// treated as read-only afterwards. It owns every descriptor for its own
/// lifetime; property and method descriptors are `Rc`-shared between a type
/// and its descendants, never deep-copied.
///
/// Declaring a type automatically registers its pointer (`"T*"`) and
/// reference (`"T&"`) companion descriptors. Lookups fall back through the
/// alias table and the [`DemangleTable`].
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
/// // The companions were registered alongside.
/// assert!(registry.lookup("Point*").unwrap().is_pointer());
/// assert!(registry.lookup("Point&").unwrap().is_reference());
///
/// // Create an instance and read a property, by name alone.
/// let instance = registry.lookup("Point").unwrap().create(&registry).unwrap();
/// let x = registry.lookup("Point").unwrap().property("x").unwrap();
/// assert_eq!(x.get(&registry, &instance).unwrap().take::<f64>().unwrap(), 0.0);
/// ```
pub struct TypeRegistry {
    types: HashMap<Box<str>, TypeDescriptor>,
    /// Declaration order, for deterministic iteration.
    order: Vec<Box<str>>,
    aliases: HashMap<Box<str>, Box<str>>,
    /// Rust type → canonical name, used to resolve the value types bound
    /// into property/method declarations.
    ids: TypeIdMap<Box<str>>,
    demangle: DemangleTable,
}

impl Default for TypeRegistry {
    /// See [`TypeRegistry::new`].
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}

impl TypeRegistry {
    /// Creates a registry with no declarations at all.
    pub fn empty() -> Self {
        Self {
            types: HashMap::default(),
            order: Vec::new(),
            aliases: HashMap::default(),
            ids: TypeIdMap::new(),
            demangle: DemangleTable::default(),
        }
    }

    /// Creates a registry with the fundamental set pre-declared:
    /// `bool`, `char`, `String`, `i8`–`i64`, `u8`–`u64`, `f32`, `f64`.
    pub fn new() -> Self {
        let mut registry = Self::empty();
        crate::impls::register_fundamentals(&mut registry);
        registry
    }

    // -------------------------------------------------------------------------
    // Declaration

    /// Declares a type.
    ///
    /// If the canonical name is already registered, the existing descriptor
    /// is returned unchanged and the new declaration is discarded —
    /// declaration is idempotent, never a merge. Otherwise the builder is
    /// finalized (resolving every bound member type through the registry),
    /// stored, and the `"T*"`/`"T&"` companions are registered alongside.
    ///
    /// Fails with [`TypeNotDeclared`](ReflectError::TypeNotDeclared) when a
    /// declared parent, or the value type of a property, method, or
    /// collection element, is not yet registered.
    pub fn declare(&mut self, builder: TypeBuilder) -> Result<&TypeDescriptor, ReflectError> {
        let name = builder.name.clone();
        if self.types.contains_key(&*name) {
            log::trace!("type `{name}` already declared, keeping the existing descriptor");
            return self.lookup(&name);
        }

        // Resolve everything that can fail before touching the store.
        let parent = match &builder.derives {
            Some(parent) => match self.types.get(&**parent) {
                Some(desc) => Some((
                    desc.name.clone(),
                    desc.properties.clone(),
                    desc.methods.clone(),
                )),
                None => {
                    return Err(ReflectError::TypeNotDeclared {
                        name: parent.clone(),
                    });
                }
            },
            None => None,
        };
        let element = match builder.element_ref() {
            Some(type_ref) => Some(self.resolve_type_ref(&type_ref)?),
            None => None,
        };

        let (mut descriptor, properties, methods) = builder.into_descriptor();
        descriptor.element = element;

        // Seed the member maps with the parent's entries: shared
        // descriptors, so later annotation queries through either type see
        // the same objects.
        if let Some((_, parent_properties, parent_methods)) = &parent {
            for property in parent_properties {
                insert_property(&mut descriptor, property.clone());
            }
            for method in parent_methods {
                insert_method(&mut descriptor, method.clone());
            }
        }

        for property in properties {
            assert_eq!(
                Some(property.owner_id),
                descriptor.type_id,
                "property `{}` is bound to `{}`, not to the declared type",
                property.name,
                property.owner_native,
            );
            let value_type = self.resolve_type_ref(&property.ty)?;
            let owner = descriptor.name.clone();
            let owner_type_id = descriptor.type_id;
            insert_property(
                &mut descriptor,
                Rc::new(PropertyDescriptor {
                    name: property.name,
                    owner,
                    owner_type_id,
                    value_type,
                    getter: property.getter,
                    setter: property.setter,
                    annotations: property.annotations,
                }),
            );
        }
        for method in methods {
            assert_eq!(
                Some(method.owner_id),
                descriptor.type_id,
                "method `{}` is bound to `{}`, not to the declared type",
                method.name,
                method.owner_native,
            );
            let return_type = match &method.ret {
                Some(type_ref) => Some(self.resolve_type_ref(type_ref)?),
                None => None,
            };
            let param_types = method
                .params
                .iter()
                .map(|type_ref| self.resolve_type_ref(type_ref))
                .collect::<Result<Box<[_]>, _>>()?;
            let owner = descriptor.name.clone();
            let owner_type_id = descriptor.type_id;
            insert_method(
                &mut descriptor,
                Rc::new(MethodDescriptor {
                    name: method.name,
                    owner,
                    owner_type_id,
                    return_type,
                    param_types,
                    invoker: method.invoker,
                    annotations: method.annotations,
                }),
            );
        }

        log::trace!(
            "declaring type `{name}` ({:?}, {} properties, {} methods)",
            descriptor.kind,
            descriptor.properties.len(),
            descriptor.methods.len(),
        );

        if let Some(type_id) = descriptor.type_id
            && !self.ids.contains(&type_id)
        {
            self.ids.insert(type_id, name.clone());
        }
        self.insert(descriptor);

        let parent_base = parent.as_ref().map(|(p, _, _)| p.clone());
        if let Some(parent_name) = &parent_base {
            self.link_child(&name, parent_name);
        }

        // The automatic companions, linked into the parallel pointer and
        // reference hierarchies.
        self.register_companion(&name, TypeKind::Pointer, '*', parent_base.as_deref());
        self.register_companion(&name, TypeKind::Reference, '&', parent_base.as_deref());

        self.lookup(&name)
    }

    /// Registers `native` as an alternate lookup name for the declared
    /// `canonical` type.
    pub fn alias(&mut self, native: &str, canonical: &str) -> Result<(), ReflectError> {
        if !self.types.contains_key(canonical) {
            return Err(ReflectError::TypeNotDeclared {
                name: canonical.into(),
            });
        }
        log::trace!("alias `{native}` -> `{canonical}`");
        self.aliases.insert(native.into(), canonical.into());
        Ok(())
    }

    /// Registers the native Rust path of `T` (as produced by
    /// [`core::any::type_name`]) as an alias for `canonical`.
    pub fn alias_of<T: Any>(&mut self, canonical: &str) -> Result<(), ReflectError> {
        self.alias(type_name::<T>(), canonical)
    }

    // -------------------------------------------------------------------------
    // Lookup

    /// Returns the descriptor registered under `name`, falling back
    /// through the alias table and the demangle table. `None` on a miss.
    pub fn get(&self, name: &str) -> Option<&TypeDescriptor> {
        if let Some(descriptor) = self.types.get(name) {
            return Some(descriptor);
        }
        if let Some(canonical) = self.aliases.get(name) {
            return self.types.get(&**canonical);
        }
        let stripped = self.demangle.apply(name);
        if stripped != name {
            if let Some(descriptor) = self.types.get(stripped) {
                return Some(descriptor);
            }
            if let Some(canonical) = self.aliases.get(stripped) {
                return self.types.get(&**canonical);
            }
        }
        None
    }

    /// Like [`get`](TypeRegistry::get), failing with
    /// [`TypeNotDeclared`](ReflectError::TypeNotDeclared) on a miss.
    pub fn lookup(&self, name: &str) -> Result<&TypeDescriptor, ReflectError> {
        match self.get(name) {
            Some(descriptor) => Ok(descriptor),
            None => Err(ReflectError::TypeNotDeclared { name: name.into() }),
        }
    }

    /// Whether `name` resolves to a declared type.
    #[inline]
    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// The canonical name bound to the Rust type with the given [`TypeId`].
    pub fn name_of_id(&self, type_id: TypeId) -> Option<&str> {
        self.ids.get(&type_id).map(|name| &**name)
    }

    /// The canonical name bound to the Rust type `T`.
    #[inline]
    pub fn name_of<T: Any>(&self) -> Option<&str> {
        self.name_of_id(TypeId::of::<T>())
    }

    /// Resolves the descriptor describing `value`: by-value content
    /// resolves to the declared type, pointer/reference content to the
    /// matching companion.
    pub fn descriptor_of(&self, value: &Value) -> Result<&TypeDescriptor, ReflectError> {
        let type_id = value.type_id().ok_or(ReflectError::NullInstance)?;
        let base = self.ids.get(&type_id).ok_or_else(|| {
            ReflectError::TypeNotDeclared {
                name: value.native_type_name().into(),
            }
        })?;
        match value.kind() {
            ValueKind::Value => self.lookup(base),
            ValueKind::Pointer => self.lookup(&format!("{base}*")),
            ValueKind::Reference => self.lookup(&format!("{base}&")),
            ValueKind::Empty => Err(ReflectError::NullInstance),
        }
    }

    /// `true` if `child` was declared as deriving from `parent`, directly
    /// or transitively. Both names resolve through the usual fallbacks.
    pub fn is_derived_from(&self, child: &str, parent: &str) -> bool {
        let Some(target) = self.get(parent).map(TypeDescriptor::name) else {
            return false;
        };
        let mut current = self.get(child);
        while let Some(descriptor) = current {
            match descriptor.parent() {
                Some(p) if p == target => return true,
                Some(p) => current = self.get(p),
                None => return false,
            }
        }
        false
    }

    /// The demangle table used by lookups.
    #[inline]
    pub fn demangle_table(&self) -> &DemangleTable {
        &self.demangle
    }

    /// Mutable access to the demangle table, for registering additional
    /// prefix decorations.
    #[inline]
    pub fn demangle_table_mut(&mut self) -> &mut DemangleTable {
        &mut self.demangle
    }

    /// Normalizes a raw native name through the demangle table.
    #[inline]
    pub fn demangle<'a>(&self, raw: &'a str) -> &'a str {
        self.demangle.apply(raw)
    }

    /// Iterates over every descriptor in declaration order (companions
    /// included).
    pub fn iter(&self) -> impl Iterator<Item = &TypeDescriptor> {
        self.order.iter().filter_map(|name| self.types.get(name))
    }

    /// The number of registered descriptors (companions included).
    #[inline]
    pub fn len(&self) -> usize {
        self.types.len()
    }

    /// `true` if nothing has been declared.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    // -------------------------------------------------------------------------
    // Internals

    fn insert(&mut self, descriptor: TypeDescriptor) {
        let name = descriptor.name.clone();
        self.types.insert(name.clone(), descriptor);
        self.order.push(name);
    }

    fn resolve_type_ref(&self, type_ref: &TypeRef) -> Result<Box<str>, ReflectError> {
        let base = self.ids.get(&type_ref.id).ok_or_else(|| {
            ReflectError::TypeNotDeclared {
                name: type_ref.native.into(),
            }
        })?;
        if type_ref.pointer {
            Ok(format!("{base}*").into_boxed_str())
        } else {
            Ok(base.clone())
        }
    }

    fn register_companion(
        &mut self,
        base: &str,
        kind: TypeKind,
        suffix: char,
        parent_base: Option<&str>,
    ) {
        let name: Box<str> = format!("{base}{suffix}").into();
        if self.types.contains_key(&*name) {
            return;
        }
        let mut descriptor = TypeDescriptor::bare(name.clone(), kind);
        descriptor.base = Some(base.into());
        descriptor.parent = parent_base.map(|parent| format!("{parent}{suffix}").into());
        self.insert(descriptor);
        if let Some(parent) = parent_base {
            let parent_companion = format!("{parent}{suffix}");
            self.link_child(&name, &parent_companion);
        }
    }

    /// Adds `child` to the child-set of `parent` and of every ancestor of
    /// `parent`.
    fn link_child(&mut self, child: &str, parent: &str) {
        let mut current = Some(Box::<str>::from(parent));
        while let Some(name) = current {
            let Some(descriptor) = self.types.get_mut(&*name) else {
                break;
            };
            if !descriptor.has_child(child) {
                descriptor.children.push(child.into());
            }
            current = descriptor.parent.clone();
        }
    }

    fn descriptor_by_id(&self, type_id: TypeId) -> Option<&TypeDescriptor> {
        self.ids
            .get(&type_id)
            .and_then(|name| self.types.get(&**name))
    }

    fn view_error(&self, from: TypeId, to: Option<TypeId>) -> ReflectError {
        let describe = |id: Option<TypeId>| -> Cow<'static, str> {
            match id.and_then(|id| self.name_of_id(id)) {
                Some(name) => Cow::Owned(name.to_string()),
                None => Cow::Borrowed("(instance)"),
            }
        };
        ReflectError::CastError {
            from: describe(Some(from)),
            to: describe(to),
        }
    }

    /// Views `any` as the type with `target` id, walking the registered
    /// upcast chain for derived instances. `None` means no view change.
    pub(crate) fn upcast_view<'a>(
        &self,
        any: &'a dyn Any,
        target: Option<TypeId>,
    ) -> Result<&'a dyn Any, ReflectError> {
        let Some(target) = target else {
            return Ok(any);
        };
        let from = any.type_id();
        let mut current = any;
        loop {
            if current.type_id() == target {
                return Ok(current);
            }
            let next = self
                .descriptor_by_id(current.type_id())
                .and_then(|descriptor| descriptor.upcast.as_ref())
                .and_then(|upcast| (upcast.by_ref)(current));
            match next {
                Some(parent) => current = parent,
                None => return Err(self.view_error(from, Some(target))),
            }
        }
    }

    /// Mutable form of [`upcast_view`](TypeRegistry::upcast_view).
    pub(crate) fn upcast_view_mut<'a>(
        &self,
        any: &'a mut dyn Any,
        target: Option<TypeId>,
    ) -> Result<&'a mut dyn Any, ReflectError> {
        let Some(target) = target else {
            return Ok(any);
        };
        let from = (*any).type_id();
        let mut current = any;
        loop {
            if (*current).type_id() == target {
                return Ok(current);
            }
            let upcast = self
                .descriptor_by_id((*current).type_id())
                .and_then(|descriptor| descriptor.upcast.as_ref());
            let Some(upcast) = upcast else {
                return Err(self.view_error(from, Some(target)));
            };
            match (upcast.by_mut)(current) {
                Some(parent) => current = parent,
                None => return Err(self.view_error(from, Some(target))),
            }
        }
    }
}

impl core::fmt::Debug for TypeRegistry {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_list().entries(self.order.iter()).finish()
    }
}

fn insert_property(descriptor: &mut TypeDescriptor, property: Rc<PropertyDescriptor>) {
    match descriptor.property_index.get(&property.name) {
        Some(index) => descriptor.properties[*index] = property,
        None => {
            descriptor
                .property_index
                .insert(property.name.clone(), descriptor.properties.len());
            descriptor.properties.push(property);
        }
    }
}

fn insert_method(descriptor: &mut TypeDescriptor, method: Rc<MethodDescriptor>) {
    match descriptor.method_index.get(&method.name) {
        Some(index) => descriptor.methods[*index] = method,
        None => {
            descriptor
                .method_index
                .insert(method.name.clone(), descriptor.methods.len());
            descriptor.methods.push(method);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::TypeRegistry;
    use crate::ReflectError;
    use crate::info::{Doc, Method, Property, TypeBuilder};
    use crate::value::{Shared, Value, shared};
    use alloc::vec;

    #[derive(Default)]
    struct Point {
        x: f64,
        y: f64,
    }

    fn declare_point(registry: &mut TypeRegistry) {
        registry
            .declare(
                TypeBuilder::object::<Point>("Point")
                    .constructor(Point::default)
                    .property(Property::read_write(
                        "x",
                        |p: &Point| p.x,
                        |p: &mut Point, v| p.x = v,
                    ))
                    .property(Property::read_write(
                        "y",
                        |p: &Point| p.y,
                        |p: &mut Point, v| p.y = v,
                    )),
            )
            .unwrap();
    }

    #[test]
    fn declaration_is_idempotent() {
        let mut registry = TypeRegistry::new();
        declare_point(&mut registry);
        let count = registry.len();

        // A second declaration under the same name is discarded.
        registry
            .declare(TypeBuilder::object::<Point>("Point").abstract_type())
            .unwrap();
        assert_eq!(registry.len(), count);
        assert!(!registry.lookup("Point").unwrap().is_abstract());
    }

    #[test]
    fn companions_are_registered_automatically() {
        let mut registry = TypeRegistry::new();
        declare_point(&mut registry);

        let pointer = registry.lookup("Point*").unwrap();
        assert!(pointer.is_pointer());
        assert_eq!(pointer.base_type(), Some("Point"));
        assert!(registry.lookup("Point&").unwrap().is_reference());

        // Delegated creation goes through the base constructor.
        let created = pointer.create(&registry).unwrap();
        assert!(created.is::<Point>());
    }

    #[test]
    fn lookup_falls_back_through_alias_and_demangle() {
        let mut registry = TypeRegistry::new();
        declare_point(&mut registry);
        registry.alias("Vec2", "Point").unwrap();
        registry.alias_of::<Point>("Point").unwrap();

        assert_eq!(registry.lookup("Vec2").unwrap().name(), "Point");
        assert_eq!(registry.lookup("class Point").unwrap().name(), "Point");
        assert_eq!(
            registry
                .lookup(core::any::type_name::<Point>())
                .unwrap()
                .name(),
            "Point"
        );
        assert!(matches!(
            registry.lookup("Missing"),
            Err(ReflectError::TypeNotDeclared { .. })
        ));
        assert!(registry.alias("Broken", "Missing").is_err());
    }

    #[test]
    fn property_value_types_must_be_declared_first() {
        let mut registry = TypeRegistry::new();
        struct Holder {
            point: Point,
        }
        let result = registry.declare(
            TypeBuilder::object::<Holder>("Holder").property(Property::read_only(
                "point",
                |_h: &Holder| Point::default(),
            )),
        );
        assert!(matches!(
            result,
            Err(ReflectError::TypeNotDeclared { .. })
        ));
    }

    #[derive(Default)]
    struct Base {
        id: i64,
    }

    #[derive(Default)]
    struct Derived {
        base: Base,
        extra: i64,
    }

    fn declare_hierarchy(registry: &mut TypeRegistry) {
        registry
            .declare(
                TypeBuilder::object::<Base>("Base")
                    .constructor(Base::default)
                    .property(Property::read_write(
                        "id",
                        |b: &Base| b.id,
                        |b: &mut Base, v| b.id = v,
                    ))
                    .method(Method::func0("describe", |b: &mut Base| b.id * 10)),
            )
            .unwrap();
        registry
            .declare(
                TypeBuilder::object::<Derived>("Derived")
                    .constructor(Derived::default)
                    .derives_from("Base", |d: &Derived| &d.base, |d: &mut Derived| {
                        &mut d.base
                    })
                    .property(Property::read_write(
                        "extra",
                        |d: &Derived| d.extra,
                        |d: &mut Derived, v| d.extra = v,
                    )),
            )
            .unwrap();
    }

    #[test]
    fn derivation_shares_parent_descriptors() {
        let mut registry = TypeRegistry::new();
        declare_hierarchy(&mut registry);

        let base = registry.lookup("Base").unwrap();
        let derived = registry.lookup("Derived").unwrap();

        // Seeded entries are the same descriptor objects, not copies.
        let inherited = derived.property("id").unwrap();
        assert!(alloc::rc::Rc::ptr_eq(base.property("id").unwrap(), inherited));
        assert_eq!(inherited.owner(), "Base");

        // Inherited entries come first, own entries after.
        let names: vec::Vec<_> = derived.properties().map(|p| p.name()).collect();
        assert_eq!(names, ["id", "extra"]);

        assert!(base.has_child("Derived"));
        assert!(registry.is_derived_from("Derived", "Base"));
        assert!(!registry.is_derived_from("Base", "Derived"));

        // The pointer companions are linked too.
        assert_eq!(registry.lookup("Derived*").unwrap().parent(), Some("Base*"));
        assert!(registry.lookup("Base*").unwrap().has_child("Derived*"));
        assert!(registry.is_derived_from("Derived*", "Base*"));
    }

    #[test]
    fn inherited_accessors_run_on_derived_instances() {
        let mut registry = TypeRegistry::new();
        declare_hierarchy(&mut registry);

        let mut instance = Value::of(Derived {
            base: Base { id: 7 },
            extra: 1,
        });
        let derived = registry.lookup("Derived").unwrap();

        let id = derived.property("id").unwrap();
        assert_eq!(id.get(&registry, &instance).unwrap().take::<i64>().unwrap(), 7);
        id.set(&registry, &mut instance, Value::of(9i64)).unwrap();

        let describe = derived.method("describe").unwrap();
        let out = describe.call(&registry, &mut instance, vec![]).unwrap();
        assert_eq!(out.take::<i64>().unwrap(), 90);
    }

    #[test]
    fn derivation_requires_registered_parent() {
        let mut registry = TypeRegistry::new();
        let result = registry.declare(
            TypeBuilder::object::<Derived>("Derived")
                .derives_from("Base", |d: &Derived| &d.base, |d: &mut Derived| {
                    &mut d.base
                }),
        );
        assert!(matches!(
            result,
            Err(ReflectError::TypeNotDeclared { .. })
        ));
    }

    #[test]
    fn abstract_types_create_empty_values() {
        let mut registry = TypeRegistry::new();
        struct Shape;
        registry
            .declare(TypeBuilder::object::<Shape>("Shape").abstract_type())
            .unwrap();

        let shape = registry.lookup("Shape").unwrap();
        assert!(shape.is_abstract());
        assert!(shape.create(&registry).unwrap().is_empty());
        assert!(shape.create_shared(&registry).unwrap().is_empty());
    }

    #[test]
    fn descriptor_of_resolves_value_kinds() {
        let mut registry = TypeRegistry::new();
        declare_point(&mut registry);

        let by_value = Value::of(Point::default());
        assert_eq!(registry.descriptor_of(&by_value).unwrap().name(), "Point");

        let cell: Shared<Point> = shared(Point::default());
        let pointer = Value::pointer(cell.clone());
        assert_eq!(registry.descriptor_of(&pointer).unwrap().name(), "Point*");
        let reference = Value::reference(cell);
        assert_eq!(registry.descriptor_of(&reference).unwrap().name(), "Point&");

        let null = registry
            .lookup("Point*")
            .unwrap()
            .null_value(&registry)
            .unwrap();
        assert_eq!(registry.descriptor_of(&null).unwrap().name(), "Point*");
    }

    #[test]
    fn annotations_attach_to_declarations() {
        let mut registry = TypeRegistry::new();
        struct Tagged;
        registry
            .declare(
                TypeBuilder::object::<Tagged>("Tagged")
                    .abstract_type()
                    .annotate(Doc::new("a tagged type")),
            )
            .unwrap();
        let tagged = registry.lookup("Tagged").unwrap();
        assert_eq!(tagged.get_annotation::<Doc>().unwrap().text(), "a tagged type");
        assert!(!tagged.has_annotation::<u32>());
    }
}
