use alloc::borrow::Cow;
use alloc::boxed::Box;
use core::{error, fmt};

// -----------------------------------------------------------------------------
// ReflectError

/// An enumeration of every failure a reflective operation can surface.
///
/// All failures are synchronous and fail-fast; nothing is retried or
/// recovered internally. The variants map one-to-one onto the ways a
/// name-driven operation can go wrong: the name is unknown, the value does
/// not fit, or the instance cannot be dereferenced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReflectError {
    /// A type name was not found in the registry.
    TypeNotDeclared { name: Box<str> },
    /// A property name was not found on an otherwise known type.
    PropertyNotDeclared { owner: Box<str>, name: Box<str> },
    /// A method name was not found on an otherwise known type.
    MethodNotDeclared { owner: Box<str>, name: Box<str> },
    /// A value does not hold the requested type and no numeric widening
    /// applies. See [`Value::cast`](crate::value::Value::cast) for the
    /// widening table.
    CastError {
        from: Cow<'static, str>,
        to: Cow<'static, str>,
    },
    /// `get` was called on a property declared without a getter.
    NotReadable { owner: Box<str>, name: Box<str> },
    /// `set` was called on a property declared without a setter.
    NotWritable { owner: Box<str>, name: Box<str> },
    /// A null pointer or empty value was dereferenced mid-operation.
    NullInstance,
    /// A shared cell was already mutably borrowed by the same call chain.
    BorrowConflict,
    /// A scalar literal could not be parsed as the requested type.
    InvalidLiteral {
        type_name: Box<str>,
        literal: Box<str>,
    },
    /// A method was invoked with the wrong number of arguments.
    BadArgumentCount {
        method: Box<str>,
        expected: usize,
        found: usize,
    },
}

impl fmt::Display for ReflectError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TypeNotDeclared { name } => {
                write!(f, "type `{name}` has not been declared")
            }
            Self::PropertyNotDeclared { owner, name } => {
                write!(f, "type `{owner}` has no property `{name}`")
            }
            Self::MethodNotDeclared { owner, name } => {
                write!(f, "type `{owner}` has no method `{name}`")
            }
            Self::CastError { from, to } => {
                write!(f, "cannot cast a value of type `{from}` to `{to}`")
            }
            Self::NotReadable { owner, name } => {
                write!(f, "property `{owner}.{name}` is not readable")
            }
            Self::NotWritable { owner, name } => {
                write!(f, "property `{owner}.{name}` is not writable")
            }
            Self::NullInstance => f.write_str("attempted to dereference a null instance"),
            Self::BorrowConflict => {
                f.write_str("instance is already mutably borrowed by this operation")
            }
            Self::InvalidLiteral { type_name, literal } => {
                write!(f, "`{literal}` is not a valid `{type_name}` literal")
            }
            Self::BadArgumentCount {
                method,
                expected,
                found,
            } => {
                write!(
                    f,
                    "method `{method}` takes {expected} argument(s), {found} supplied"
                )
            }
        }
    }
}

impl error::Error for ReflectError {}

impl ReflectError {
    /// Shorthand for a [`CastError`](Self::CastError) between two statically
    /// known type names.
    #[inline]
    pub(crate) fn cast(from: &'static str, to: &'static str) -> Self {
        Self::CastError {
            from: Cow::Borrowed(from),
            to: Cow::Borrowed(to),
        }
    }
}
