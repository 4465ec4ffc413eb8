//! Dotted property-path parsing.

use alloc::borrow::Cow;
use alloc::vec::Vec;
use core::fmt;

// -----------------------------------------------------------------------------
// ParseError

/// An error produced while parsing a property path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseError<'a> {
    /// Position in `path`.
    pub offset: usize,
    /// The path that the error occurred in.
    pub path: &'a str,
    /// The underlying error.
    pub error: Cow<'static, str>,
}

impl fmt::Display for ParseError<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "encountered an error at offset {} while parsing `{}`: {}",
            self.offset, self.path, self.error,
        )
    }
}

impl core::error::Error for ParseError<'_> {}

// -----------------------------------------------------------------------------
// Segmentation

/// Splits `path` on `.` into property-name segments.
///
/// The syntax is names only — `"date.place.x"` — with no indexing forms.
/// Empty paths and empty segments (leading, trailing, or doubled dots) are
/// parse errors.
pub(crate) fn split_segments(path: &str) -> Result<Vec<&str>, ParseError<'_>> {
    if path.is_empty() {
        return Err(ParseError {
            offset: 0,
            path,
            error: Cow::Borrowed("empty property path"),
        });
    }

    let mut segments = Vec::new();
    let mut offset = 0;
    for segment in path.split('.') {
        if segment.is_empty() {
            return Err(ParseError {
                offset,
                path,
                error: Cow::Borrowed("empty path segment"),
            });
        }
        segments.push(segment);
        offset += segment.len() + 1;
    }
    Ok(segments)
}

#[cfg(test)]
mod tests {
    use super::split_segments;

    #[test]
    fn splits_on_dots() {
        assert_eq!(split_segments("date.place.x").unwrap(), ["date", "place", "x"]);
        assert_eq!(split_segments("x").unwrap(), ["x"]);
    }

    #[test]
    fn rejects_empty_segments() {
        assert!(split_segments("").is_err());
        assert_eq!(split_segments(".x").unwrap_err().offset, 0);
        assert_eq!(split_segments("a..b").unwrap_err().offset, 2);
        assert_eq!(split_segments("a.").unwrap_err().offset, 2);
    }
}
