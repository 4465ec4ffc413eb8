//! Recursive-descent evaluation and mutation of dotted property paths.

use core::any::Any;
use core::fmt;

use crate::ReflectError;
use crate::access::path::{ParseError, split_segments};
use crate::registry::TypeRegistry;
use crate::value::{Value, ValueKind};

// -----------------------------------------------------------------------------
// AccessError

/// An error returned from a failed path access.
#[derive(Debug)]
pub enum AccessError<'a> {
    /// The path string could not be parsed. See [`ParseError`].
    Parse(ParseError<'a>),
    /// Access failed after parsing, at the named segment.
    Reflect {
        path: &'a str,
        segment: &'a str,
        source: ReflectError,
    },
}

impl fmt::Display for AccessError<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Parse(err) => fmt::Display::fmt(err, f),
            Self::Reflect {
                path,
                segment,
                source,
            } => {
                write!(f, "at segment `{segment}` of `{path}`: {source}")
            }
        }
    }
}

impl core::error::Error for AccessError<'_> {
    fn source(&self) -> Option<&(dyn core::error::Error + 'static)> {
        match self {
            Self::Parse(_) => None,
            Self::Reflect { source, .. } => Some(source),
        }
    }
}

impl<'a> From<ParseError<'a>> for AccessError<'a> {
    #[inline]
    fn from(value: ParseError<'a>) -> Self {
        Self::Parse(value)
    }
}

// -----------------------------------------------------------------------------
// eval

/// Evaluates the dotted path `"a.b.c"` against `instance` and returns the
/// leaf value.
///
/// Each segment looks the property up on the current descriptor
/// (dereferencing pointer and reference values to their target type) and
/// fetches it; the remainder recurses into the fetched value. A null
/// pointer anywhere along the way fails with
/// [`NullInstance`](ReflectError::NullInstance).
///
/// # Example
///
/// ```
/// use mirra_reflect::access::eval;
/// use mirra_reflect::info::{Property, TypeBuilder};
/// use mirra_reflect::registry::TypeRegistry;
/// use mirra_reflect::value::Value;
///
/// #[derive(Default)]
/// struct Inner { x: f64 }
/// #[derive(Default)]
/// struct Outer { inner: Inner }
///
/// let mut registry = TypeRegistry::new();
/// registry.declare(
///     TypeBuilder::object::<Inner>("Inner")
///         .constructor(Inner::default)
///         .property(Property::read_write("x", |v: &Inner| v.x, |v: &mut Inner, x| v.x = x)),
/// ).unwrap();
/// registry.declare(
///     TypeBuilder::object::<Outer>("Outer")
///         .constructor(Outer::default)
///         .property(Property::read_write(
///             "inner",
///             |v: &Outer| Inner { x: v.inner.x },
///             |v: &mut Outer, inner| v.inner = inner,
///         )),
/// ).unwrap();
///
/// let outer = Value::of(Outer { inner: Inner { x: 9.5 } });
/// let x = eval(&registry, &outer, "inner.x").unwrap();
/// assert_eq!(x.take::<f64>().unwrap(), 9.5);
/// ```
pub fn eval<'a>(
    registry: &TypeRegistry,
    instance: &Value,
    path: &'a str,
) -> Result<Value, AccessError<'a>> {
    let segments = split_segments(path)?;
    eval_segments(registry, instance, &segments).map_err(|(segment, source)| {
        AccessError::Reflect {
            path,
            segment,
            source,
        }
    })
}

/// [`eval`], then a checked cast of the leaf (numeric widening permitted).
pub fn eval_as<'a, T: Any>(
    registry: &TypeRegistry,
    instance: &Value,
    path: &'a str,
) -> Result<T, AccessError<'a>> {
    let segments = split_segments(path)?;
    let last = segments[segments.len() - 1];
    let into_error = |(segment, source)| AccessError::Reflect {
        path,
        segment,
        source,
    };
    let value = eval_segments(registry, instance, &segments).map_err(into_error)?;
    value.cast::<T>().map_err(|source| into_error((last, source)))
}

fn eval_segments<'s>(
    registry: &TypeRegistry,
    instance: &Value,
    segments: &[&'s str],
) -> Result<Value, (&'s str, ReflectError)> {
    let (head, rest) = match segments.split_first() {
        Some(split) => split,
        None => return Err(("", ReflectError::NullInstance)),
    };
    let fail = |source: ReflectError| (*head, source);

    let descriptor = registry.descriptor_of(instance).map_err(fail)?;
    let target = descriptor.deref_target(registry).map_err(fail)?;
    let property = target.lookup_property(head).map_err(fail)?;

    let value = property.get(registry, instance).map_err(fail)?;
    if rest.is_empty() {
        Ok(value)
    } else {
        eval_segments(registry, &value, rest)
    }
}

// -----------------------------------------------------------------------------
// apply

/// Mirrors [`eval`] but writes `value` at the leaf of the path.
///
/// When a segment holds its child **by value**, the nested value fetched
/// for recursion is a copy; after the recursive apply completes, the
/// mutated copy is written back into its owner through the property
/// setter. Pointer- and reference-held children are mutated through the
/// shared cell directly and need no write-back.
///
/// There is no atomicity across segments: if a nested write fails partway,
/// value-typed copies already written back stay written, and the caller
/// observes a partially applied path. Callers needing all-or-nothing
/// semantics must snapshot and restore around the call.
pub fn apply<'a>(
    registry: &TypeRegistry,
    instance: &mut Value,
    path: &'a str,
    value: Value,
) -> Result<(), AccessError<'a>> {
    let segments = split_segments(path)?;
    apply_segments(registry, instance, &segments, value).map_err(|(segment, source)| {
        AccessError::Reflect {
            path,
            segment,
            source,
        }
    })
}

fn apply_segments<'s>(
    registry: &TypeRegistry,
    instance: &mut Value,
    segments: &[&'s str],
    value: Value,
) -> Result<(), (&'s str, ReflectError)> {
    let (head, rest) = match segments.split_first() {
        Some(split) => split,
        None => return Err(("", ReflectError::NullInstance)),
    };
    let fail = |source: ReflectError| (*head, source);

    let descriptor = registry.descriptor_of(instance).map_err(fail)?;
    let target = descriptor.deref_target(registry).map_err(fail)?;
    let property = target.lookup_property(head).map_err(fail)?.clone();

    if rest.is_empty() {
        return property.set(registry, instance, value).map_err(fail);
    }

    let mut nested = property.get(registry, instance).map_err(fail)?;
    let held_by_value = nested.kind() == ValueKind::Value;
    apply_segments(registry, &mut nested, rest, value)?;
    if held_by_value {
        // The recursion mutated a copy; without this write-back the
        // mutation would be lost.
        property.set(registry, instance, nested).map_err(fail)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{AccessError, apply, eval, eval_as};
    use crate::ReflectError;
    use crate::info::{Property, TypeBuilder};
    use crate::registry::TypeRegistry;
    use crate::value::{Shared, Value, shared};

    #[derive(Default, Clone)]
    struct Place {
        x: f64,
        y: f64,
    }

    #[derive(Default, Clone)]
    struct Date {
        day: i32,
        place: Place,
    }

    #[derive(Default)]
    struct Sample {
        date: Date,
        point: Option<Shared<Place>>,
    }

    fn registry() -> TypeRegistry {
        let mut registry = TypeRegistry::new();
        registry
            .declare(
                TypeBuilder::object::<Place>("Place")
                    .constructor(Place::default)
                    .property(Property::read_write(
                        "x",
                        |p: &Place| p.x,
                        |p: &mut Place, v| p.x = v,
                    ))
                    .property(Property::read_only("y", |p: &Place| p.y)),
            )
            .unwrap();
        registry
            .declare(
                TypeBuilder::object::<Date>("Date")
                    .constructor(Date::default)
                    .property(Property::read_write(
                        "day",
                        |d: &Date| d.day,
                        |d: &mut Date, v| d.day = v,
                    ))
                    .property(Property::read_write(
                        "place",
                        |d: &Date| d.place.clone(),
                        |d: &mut Date, v| d.place = v,
                    )),
            )
            .unwrap();
        registry
            .declare(
                TypeBuilder::object::<Sample>("Sample")
                    .constructor(Sample::default)
                    .property(Property::read_write(
                        "date",
                        |s: &Sample| s.date.clone(),
                        |s: &mut Sample, v| s.date = v,
                    ))
                    .property(Property::shared(
                        "point",
                        |s: &Sample| s.point.clone(),
                        |s: &mut Sample, v| s.point = v,
                    )),
            )
            .unwrap();
        registry
    }

    #[test]
    fn apply_then_eval_is_exact() {
        let registry = registry();
        let mut sample = Value::of(Sample::default());

        apply(&registry, &mut sample, "date.place.x", Value::of(98.5f64)).unwrap();
        assert_eq!(
            eval_as::<f64>(&registry, &sample, "date.place.x").unwrap(),
            98.5
        );

        // The write-back reached the native instance, not just a copy.
        let native = sample.take::<Sample>().unwrap();
        assert_eq!(native.date.place.x, 98.5);
    }

    #[test]
    fn pointer_held_children_mutate_the_shared_target() {
        let registry = registry();
        let target = shared(Place { x: 1.0, y: 2.0 });
        let mut sample = Value::of(Sample {
            date: Date::default(),
            point: Some(target.clone()),
        });

        apply(&registry, &mut sample, "point.x", Value::of(45.0f64)).unwrap();
        // No write-back involved: the pointee itself changed.
        assert_eq!(target.borrow().x, 45.0);
        assert_eq!(eval_as::<f64>(&registry, &sample, "point.x").unwrap(), 45.0);
    }

    #[test]
    fn widening_applies_at_the_leaf() {
        let registry = registry();
        let mut sample = Value::of(Sample::default());
        apply(&registry, &mut sample, "date.place.x", Value::of(45i32)).unwrap();
        assert_eq!(
            eval_as::<f64>(&registry, &sample, "date.place.x").unwrap(),
            45.0
        );
    }

    #[test]
    fn null_pointer_mid_path_fails() {
        let registry = registry();
        let sample = Value::of(Sample::default());
        let err = eval(&registry, &sample, "point.x").unwrap_err();
        assert!(matches!(
            err,
            AccessError::Reflect {
                segment: "x",
                source: ReflectError::NullInstance,
                ..
            }
        ));
    }

    #[test]
    fn read_only_leaves_reject_apply() {
        let registry = registry();
        let mut sample = Value::of(Sample::default());
        let err = apply(&registry, &mut sample, "date.place.y", Value::of(1.0f64)).unwrap_err();
        assert!(matches!(
            err,
            AccessError::Reflect {
                source: ReflectError::NotWritable { .. },
                ..
            }
        ));
    }

    #[test]
    fn unknown_segments_and_bad_paths() {
        let registry = registry();
        let sample = Value::of(Sample::default());
        assert!(matches!(
            eval(&registry, &sample, "date.nowhere").unwrap_err(),
            AccessError::Reflect {
                source: ReflectError::PropertyNotDeclared { .. },
                ..
            }
        ));
        assert!(matches!(
            eval(&registry, &sample, "date..day").unwrap_err(),
            AccessError::Parse(_)
        ));
    }
}
