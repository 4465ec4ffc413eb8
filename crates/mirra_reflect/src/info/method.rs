use alloc::boxed::Box;
use alloc::string::String;
use alloc::vec::Vec;
use core::any::{Any, TypeId, type_name};

use crate::ReflectError;
use crate::info::{Annotations, TypeRef};
use crate::registry::TypeRegistry;
use crate::value::Value;

pub(crate) type Invoker = Box<dyn Fn(&mut dyn Any, Vec<Value>) -> Result<Value, ReflectError>>;

// -----------------------------------------------------------------------------
// Method (declaration form)

/// A method declaration, produced by one of the factory constructors and
/// handed to [`TypeBuilder::method`](crate::info::TypeBuilder::method).
///
/// One factory per shape: `func0`/`func1`/`func2` for value-returning
/// methods with zero to two parameters, `action0`/`action1`/`action2` for
/// void ones. Parameters and returns are by value; parameter and return
/// types resolve to canonical names when the declaration enters the
/// registry.
///
/// # Example
///
/// ```
/// use mirra_reflect::info::Method;
///
/// #[derive(Default)]
/// struct Counter {
///     count: i64,
/// }
///
/// let bump = Method::action1("bump", |c: &mut Counter, by: i64| c.count += by);
/// let total = Method::func0("total", |c: &mut Counter| c.count);
/// ```
pub struct Method {
    pub(crate) name: Box<str>,
    pub(crate) owner_id: TypeId,
    pub(crate) owner_native: &'static str,
    pub(crate) ret: Option<TypeRef>,
    pub(crate) params: Vec<TypeRef>,
    pub(crate) invoker: Invoker,
    pub(crate) annotations: Annotations,
}

macro_rules! check_arity {
    ($name:ident, $args:ident, $expected:literal) => {
        if $args.len() != $expected {
            return Err(ReflectError::BadArgumentCount {
                method: $name.as_str().into(),
                expected: $expected,
                found: $args.len(),
            });
        }
    };
}

impl Method {
    /// A value-returning method with no parameters.
    pub fn func0<O, R>(name: &str, f: impl Fn(&mut O) -> R + 'static) -> Self
    where
        O: Any,
        R: Any,
    {
        let owned = String::from(name);
        Self {
            name: name.into(),
            owner_id: TypeId::of::<O>(),
            owner_native: type_name::<O>(),
            ret: Some(TypeRef::of::<R>()),
            params: Vec::new(),
            invoker: erased_invoker(move |owner: &mut O, args| {
                check_arity!(owned, args, 0);
                Ok(Value::of(f(owner)))
            }),
            annotations: Annotations::new(),
        }
    }

    /// A value-returning method with one parameter.
    pub fn func1<O, A, R>(name: &str, f: impl Fn(&mut O, A) -> R + 'static) -> Self
    where
        O: Any,
        A: Any,
        R: Any,
    {
        let owned = String::from(name);
        Self {
            name: name.into(),
            owner_id: TypeId::of::<O>(),
            owner_native: type_name::<O>(),
            ret: Some(TypeRef::of::<R>()),
            params: alloc::vec![TypeRef::of::<A>()],
            invoker: erased_invoker(move |owner: &mut O, args| {
                check_arity!(owned, args, 1);
                let mut args = args.into_iter();
                let a = next_arg::<A>(&mut args)?;
                Ok(Value::of(f(owner, a)))
            }),
            annotations: Annotations::new(),
        }
    }

    /// A value-returning method with two parameters.
    pub fn func2<O, A, B, R>(name: &str, f: impl Fn(&mut O, A, B) -> R + 'static) -> Self
    where
        O: Any,
        A: Any,
        B: Any,
        R: Any,
    {
        let owned = String::from(name);
        Self {
            name: name.into(),
            owner_id: TypeId::of::<O>(),
            owner_native: type_name::<O>(),
            ret: Some(TypeRef::of::<R>()),
            params: alloc::vec![TypeRef::of::<A>(), TypeRef::of::<B>()],
            invoker: erased_invoker(move |owner: &mut O, args| {
                check_arity!(owned, args, 2);
                let mut args = args.into_iter();
                let a = next_arg::<A>(&mut args)?;
                let b = next_arg::<B>(&mut args)?;
                Ok(Value::of(f(owner, a, b)))
            }),
            annotations: Annotations::new(),
        }
    }

    /// A void method with no parameters. Invocation yields the empty value.
    pub fn action0<O>(name: &str, f: impl Fn(&mut O) + 'static) -> Self
    where
        O: Any,
    {
        let owned = String::from(name);
        Self {
            name: name.into(),
            owner_id: TypeId::of::<O>(),
            owner_native: type_name::<O>(),
            ret: None,
            params: Vec::new(),
            invoker: erased_invoker(move |owner: &mut O, args| {
                check_arity!(owned, args, 0);
                f(owner);
                Ok(Value::empty())
            }),
            annotations: Annotations::new(),
        }
    }

    /// A void method with one parameter.
    pub fn action1<O, A>(name: &str, f: impl Fn(&mut O, A) + 'static) -> Self
    where
        O: Any,
        A: Any,
    {
        let owned = String::from(name);
        Self {
            name: name.into(),
            owner_id: TypeId::of::<O>(),
            owner_native: type_name::<O>(),
            ret: None,
            params: alloc::vec![TypeRef::of::<A>()],
            invoker: erased_invoker(move |owner: &mut O, args| {
                check_arity!(owned, args, 1);
                let mut args = args.into_iter();
                let a = next_arg::<A>(&mut args)?;
                f(owner, a);
                Ok(Value::empty())
            }),
            annotations: Annotations::new(),
        }
    }

    /// A void method with two parameters.
    pub fn action2<O, A, B>(name: &str, f: impl Fn(&mut O, A, B) + 'static) -> Self
    where
        O: Any,
        A: Any,
        B: Any,
    {
        let owned = String::from(name);
        Self {
            name: name.into(),
            owner_id: TypeId::of::<O>(),
            owner_native: type_name::<O>(),
            ret: None,
            params: alloc::vec![TypeRef::of::<A>(), TypeRef::of::<B>()],
            invoker: erased_invoker(move |owner: &mut O, args| {
                check_arity!(owned, args, 2);
                let mut args = args.into_iter();
                let a = next_arg::<A>(&mut args)?;
                let b = next_arg::<B>(&mut args)?;
                f(owner, a, b);
                Ok(Value::empty())
            }),
            annotations: Annotations::new(),
        }
    }

    /// Attaches an annotation tag to the declaration.
    pub fn annotate<T: Any>(mut self, tag: T) -> Self {
        self.annotations.push(tag);
        self
    }
}

fn erased_invoker<O: Any>(
    f: impl Fn(&mut O, Vec<Value>) -> Result<Value, ReflectError> + 'static,
) -> Invoker {
    Box::new(
        move |any: &mut dyn Any, args: Vec<Value>| match any.downcast_mut::<O>() {
            Some(owner) => f(owner, args),
            None => Err(ReflectError::cast("(unrelated instance)", type_name::<O>())),
        },
    )
}

fn next_arg<A: Any>(args: &mut impl Iterator<Item = Value>) -> Result<A, ReflectError> {
    match args.next() {
        Some(value) => value.cast::<A>(),
        // Arity was checked up front; an exhausted iterator cannot happen.
        None => Err(ReflectError::cast("(missing argument)", type_name::<A>())),
    }
}

// -----------------------------------------------------------------------------
// MethodDescriptor

/// A declared method: the registry-owned, resolved form of a [`Method`].
pub struct MethodDescriptor {
    pub(crate) name: Box<str>,
    pub(crate) owner: Box<str>,
    pub(crate) owner_type_id: Option<TypeId>,
    pub(crate) return_type: Option<Box<str>>,
    pub(crate) param_types: Box<[Box<str>]>,
    pub(crate) invoker: Invoker,
    pub(crate) annotations: Annotations,
}

impl MethodDescriptor {
    /// The method name.
    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The canonical name of the declaring type.
    #[inline]
    pub fn owner(&self) -> &str {
        &self.owner
    }

    /// The canonical return type name; `None` for void methods.
    #[inline]
    pub fn return_type(&self) -> Option<&str> {
        self.return_type.as_deref()
    }

    /// The canonical parameter type names, in declaration order.
    pub fn param_types(&self) -> impl ExactSizeIterator<Item = &str> {
        self.param_types.iter().map(|s| &**s)
    }

    /// The attached annotations.
    #[inline]
    pub fn annotations(&self) -> &Annotations {
        &self.annotations
    }

    /// Invokes the method on `instance` with the given positional
    /// arguments.
    ///
    /// Each argument is cast to the declared parameter type (numeric
    /// widening permitted); a void return yields the empty value.
    pub fn call(
        &self,
        registry: &TypeRegistry,
        instance: &mut Value,
        args: Vec<Value>,
    ) -> Result<Value, ReflectError> {
        instance.with_mut(|any| {
            let view = registry.upcast_view_mut(any, self.owner_type_id)?;
            (self.invoker)(view, args)
        })?
    }
}

impl core::fmt::Debug for MethodDescriptor {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("MethodDescriptor")
            .field("name", &self.name)
            .field("owner", &self.owner)
            .field("return_type", &self.return_type)
            .field("param_types", &self.param_types)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::Method;
    use crate::ReflectError;
    use crate::info::TypeBuilder;
    use crate::registry::TypeRegistry;
    use crate::value::Value;
    use alloc::vec;

    #[derive(Default)]
    struct Counter {
        count: i64,
    }

    fn registry() -> TypeRegistry {
        let mut registry = TypeRegistry::new();
        registry
            .declare(
                TypeBuilder::object::<Counter>("Counter")
                    .constructor(Counter::default)
                    .method(Method::action1("bump", |c: &mut Counter, by: i64| {
                        c.count += by;
                    }))
                    .method(Method::func2("combine", |c: &mut Counter, a: i64, b: f64| {
                        c.count + a + b as i64
                    }))
                    .method(Method::func0("total", |c: &mut Counter| c.count)),
            )
            .unwrap();
        registry
    }

    #[test]
    fn invocation_casts_arguments_and_returns() {
        let registry = registry();
        let counter = registry.lookup("Counter").unwrap();
        let mut instance = counter.create(&registry).unwrap();

        let bump = counter.lookup_method("bump").unwrap();
        // Void methods yield the empty value; i32 widens to the declared i64.
        let out = bump
            .call(&registry, &mut instance, vec![Value::of(5i32)])
            .unwrap();
        assert!(out.is_empty());
        assert!(bump.return_type().is_none());

        let total = counter.lookup_method("total").unwrap();
        let out = total.call(&registry, &mut instance, vec![]).unwrap();
        assert_eq!(out.take::<i64>().unwrap(), 5);

        let combine = counter.lookup_method("combine").unwrap();
        assert_eq!(
            combine.param_types().collect::<vec::Vec<_>>(),
            ["i64", "f64"]
        );
        assert_eq!(combine.return_type(), Some("i64"));
        let out = combine
            .call(&registry, &mut instance, vec![Value::of(1i64), Value::of(2.0f64)])
            .unwrap();
        assert_eq!(out.take::<i64>().unwrap(), 8);
    }

    #[test]
    fn arity_and_argument_types_are_checked() {
        let registry = registry();
        let counter = registry.lookup("Counter").unwrap();
        let mut instance = counter.create(&registry).unwrap();

        let bump = counter.lookup_method("bump").unwrap();
        assert!(matches!(
            bump.call(&registry, &mut instance, vec![]),
            Err(ReflectError::BadArgumentCount {
                expected: 1,
                found: 0,
                ..
            })
        ));
        assert!(matches!(
            bump.call(&registry, &mut instance, vec![Value::of("nope")]),
            Err(ReflectError::CastError { .. })
        ));

        assert!(matches!(
            counter.lookup_method("missing"),
            Err(ReflectError::MethodNotDeclared { .. })
        ));
    }
}
