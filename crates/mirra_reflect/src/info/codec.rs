use alloc::boxed::Box;
use alloc::format;
use core::any::{Any, type_name};
use core::fmt;
use core::str::FromStr;

use crate::ReflectError;
use crate::text;
use crate::value::Value;

// -----------------------------------------------------------------------------
// ScalarCodec

/// The literal codec a fundamental type descriptor owns: how one value of
/// that type renders to text and parses back.
///
/// Numeric codecs use plain decimal through `Display`/`FromStr`, which are
/// locale-independent in Rust. The string codec renders quoted with JSON
/// escaping and parses by reversing the same table (see [`crate::text`]).
pub struct ScalarCodec {
    /// Renders the erased value. The value is assumed to hold the codec's
    /// type — dispatch goes through the descriptor resolved from the
    /// value's own tag — so a mismatch is reported as `fmt::Error`.
    pub(crate) render: Box<dyn Fn(&dyn Any, &mut dyn fmt::Write) -> fmt::Result>,
    /// Parses one raw literal (for strings: still quoted and escaped).
    pub(crate) parse: Box<dyn Fn(&str) -> Result<Value, ReflectError>>,
}

impl ScalarCodec {
    /// Renders the erased value as one literal.
    #[inline]
    pub fn render(&self, value: &dyn Any, out: &mut dyn fmt::Write) -> fmt::Result {
        (self.render)(value, out)
    }

    /// Parses one raw literal back into a value.
    #[inline]
    pub fn parse(&self, literal: &str) -> Result<Value, ReflectError> {
        (self.parse)(literal)
    }

    /// A codec for any type whose literal form is its `Display` output:
    /// the numeric types and `bool`.
    pub fn display_parse<T>() -> Self
    where
        T: Any + fmt::Display + FromStr,
    {
        Self {
            render: Box::new(|any: &dyn Any, out: &mut dyn fmt::Write| match any.downcast_ref::<T>() {
                Some(v) => write!(out, "{v}"),
                None => Err(fmt::Error),
            }),
            parse: Box::new(|literal: &str| match literal.parse::<T>() {
                Ok(v) => Ok(Value::of(v)),
                Err(_) => Err(invalid_literal::<T>(literal)),
            }),
        }
    }

    /// The `String` codec: quoted, JSON-escaped.
    pub fn string() -> Self {
        Self {
            render: Box::new(|any: &dyn Any, out: &mut dyn fmt::Write| match any.downcast_ref::<alloc::string::String>() {
                Some(v) => {
                    out.write_char('"')?;
                    text::escape_into(v, out)?;
                    out.write_char('"')
                }
                None => Err(fmt::Error),
            }),
            parse: Box::new(|literal: &str| {
                let inner = unquote::<alloc::string::String>(literal)?;
                match text::unescape(inner) {
                    Ok(s) => Ok(Value::of(s)),
                    Err(_) => Err(invalid_literal::<alloc::string::String>(literal)),
                }
            }),
        }
    }

    /// The `char` codec: a quoted single-character string.
    pub fn character() -> Self {
        Self {
            render: Box::new(|any: &dyn Any, out: &mut dyn fmt::Write| match any.downcast_ref::<char>() {
                Some(v) => {
                    let mut buf = [0u8; 4];
                    out.write_char('"')?;
                    text::escape_into(v.encode_utf8(&mut buf), out)?;
                    out.write_char('"')
                }
                None => Err(fmt::Error),
            }),
            parse: Box::new(|literal: &str| {
                let inner = unquote::<char>(literal)?;
                let decoded = match text::unescape(inner) {
                    Ok(s) => s,
                    Err(_) => return Err(invalid_literal::<char>(literal)),
                };
                let mut chars = decoded.chars();
                match (chars.next(), chars.next()) {
                    (Some(c), None) => Ok(Value::of(c)),
                    _ => Err(invalid_literal::<char>(literal)),
                }
            }),
        }
    }
}

impl fmt::Debug for ScalarCodec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ScalarCodec")
    }
}

fn invalid_literal<T>(literal: &str) -> ReflectError {
    ReflectError::InvalidLiteral {
        type_name: type_name::<T>().into(),
        literal: truncated(literal),
    }
}

fn unquote<T>(literal: &str) -> Result<&str, ReflectError> {
    literal
        .strip_prefix('"')
        .and_then(|s| s.strip_suffix('"'))
        .ok_or_else(|| invalid_literal::<T>(literal))
}

/// Bounds the literal echoed back in error messages.
fn truncated(literal: &str) -> Box<str> {
    const LIMIT: usize = 64;
    if literal.len() <= LIMIT {
        literal.into()
    } else {
        let end = (0..=LIMIT).rev().find(|i| literal.is_char_boundary(*i));
        format!("{}...", &literal[..end.unwrap_or(0)]).into_boxed_str()
    }
}

#[cfg(test)]
mod tests {
    use super::ScalarCodec;
    use crate::ReflectError;
    use alloc::string::String;

    fn rendered(codec: &ScalarCodec, value: &dyn core::any::Any) -> String {
        let mut out = String::new();
        (codec.render)(value, &mut out).unwrap();
        out
    }

    #[test]
    fn numeric_codecs() {
        let codec = ScalarCodec::display_parse::<i32>();
        assert_eq!(rendered(&codec, &-17i32), "-17");
        assert_eq!((codec.parse)("-17").unwrap().take::<i32>().unwrap(), -17);
        assert!(matches!(
            (codec.parse)("x"),
            Err(ReflectError::InvalidLiteral { .. })
        ));

        let codec = ScalarCodec::display_parse::<f64>();
        assert_eq!(rendered(&codec, &45.0f64), "45");
        assert_eq!((codec.parse)("45").unwrap().take::<f64>().unwrap(), 45.0);

        let codec = ScalarCodec::display_parse::<bool>();
        assert_eq!(rendered(&codec, &true), "true");
        assert!((codec.parse)("true").unwrap().take::<bool>().unwrap());
    }

    #[test]
    fn string_codec_escapes() {
        let codec = ScalarCodec::string();
        let original = String::from("a\"b\nc");
        assert_eq!(rendered(&codec, &original), "\"a\\\"b\\nc\"");
        let back = (codec.parse)("\"a\\\"b\\nc\"").unwrap();
        assert_eq!(back.take::<String>().unwrap(), original);

        assert!((codec.parse)("missing quotes").is_err());
    }

    #[test]
    fn char_codec_single_character_only() {
        let codec = ScalarCodec::character();
        assert_eq!(rendered(&codec, &'\n'), "\"\\n\"");
        assert_eq!((codec.parse)("\"x\"").unwrap().take::<char>().unwrap(), 'x');
        assert!((codec.parse)("\"xy\"").is_err());
        assert!((codec.parse)("\"\"").is_err());
    }
}
