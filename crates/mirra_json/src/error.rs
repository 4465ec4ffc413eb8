use alloc::borrow::Cow;
use core::{error, fmt};

use mirra_reflect::ReflectError;

// -----------------------------------------------------------------------------
// JsonError

/// An error produced while writing or reading the text form.
#[derive(Debug)]
pub enum JsonError {
    /// The input text is not well-formed: unexpected end of stream, a bad
    /// literal, a `$ref` to an unknown id, or a missing required key.
    MalformedInput {
        /// Byte offset into the input where the problem was detected.
        offset: usize,
        message: Cow<'static, str>,
    },
    /// A reflective operation failed while walking the graph.
    Reflect(ReflectError),
    /// The output stream refused a write.
    Stream(fmt::Error),
}

impl fmt::Display for JsonError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MalformedInput { offset, message } => {
                write!(f, "malformed input at offset {offset}: {message}")
            }
            Self::Reflect(err) => fmt::Display::fmt(err, f),
            Self::Stream(_) => f.write_str("the output stream refused a write"),
        }
    }
}

impl error::Error for JsonError {
    fn source(&self) -> Option<&(dyn error::Error + 'static)> {
        match self {
            Self::MalformedInput { .. } => None,
            Self::Reflect(err) => Some(err),
            Self::Stream(err) => Some(err),
        }
    }
}

impl From<ReflectError> for JsonError {
    #[inline]
    fn from(value: ReflectError) -> Self {
        Self::Reflect(value)
    }
}

impl From<fmt::Error> for JsonError {
    #[inline]
    fn from(value: fmt::Error) -> Self {
        Self::Stream(value)
    }
}

impl JsonError {
    pub(crate) fn malformed(offset: usize, message: &'static str) -> Self {
        Self::MalformedInput {
            offset,
            message: Cow::Borrowed(message),
        }
    }
}
