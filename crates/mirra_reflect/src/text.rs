//! JSON-style string escaping shared by the scalar codecs and the text
//! readers/writers.

use alloc::string::String;
use core::{error, fmt};

// -----------------------------------------------------------------------------
// Escaping

/// Writes `s` with JSON escaping, without surrounding quotes.
///
/// Escaped forms: `\"`, `\\`, `\/`, `\b`, `\f`, `\n`, `\r`, `\t`; any other
/// control character below `0x20` becomes `\u00XX`. Everything else is
/// written through unchanged.
pub fn escape_into(s: &str, out: &mut dyn fmt::Write) -> fmt::Result {
    for c in s.chars() {
        escape_char(c, out)?;
    }
    Ok(())
}

fn escape_char(c: char, out: &mut dyn fmt::Write) -> fmt::Result {
    match c {
        '"' => out.write_str("\\\""),
        '\\' => out.write_str("\\\\"),
        '/' => out.write_str("\\/"),
        '\u{08}' => out.write_str("\\b"),
        '\u{0C}' => out.write_str("\\f"),
        '\n' => out.write_str("\\n"),
        '\r' => out.write_str("\\r"),
        '\t' => out.write_str("\\t"),
        c if (c as u32) < 0x20 => write!(out, "\\u{:04x}", c as u32),
        c => out.write_char(c),
    }
}

// -----------------------------------------------------------------------------
// Unescaping

/// An error produced while reversing the escape table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EscapeError {
    /// Byte offset into the escaped input.
    pub offset: usize,
    /// What went wrong.
    pub message: &'static str,
}

impl fmt::Display for EscapeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} at offset {}", self.message, self.offset)
    }
}

impl error::Error for EscapeError {}

/// Reverses [`escape_into`]: decodes every backslash escape in `s`,
/// including 4-hex-digit `\uXXXX` sequences (and UTF-16 surrogate pairs).
///
/// `s` is the string *content*, without surrounding quotes.
pub fn unescape(s: &str) -> Result<String, EscapeError> {
    let bytes = s.as_bytes();
    let mut out = String::with_capacity(s.len());
    let mut i = 0;

    while i < bytes.len() {
        if bytes[i] != b'\\' {
            // Copy the longest escape-free run in one go.
            let start = i;
            while i < bytes.len() && bytes[i] != b'\\' {
                i += 1;
            }
            out.push_str(&s[start..i]);
            continue;
        }

        let escape_at = i;
        i += 1;
        let Some(&code) = bytes.get(i) else {
            return Err(EscapeError {
                offset: escape_at,
                message: "unterminated escape sequence",
            });
        };
        i += 1;

        match code {
            b'"' => out.push('"'),
            b'\\' => out.push('\\'),
            b'/' => out.push('/'),
            b'b' => out.push('\u{08}'),
            b'f' => out.push('\u{0C}'),
            b'n' => out.push('\n'),
            b'r' => out.push('\r'),
            b't' => out.push('\t'),
            b'u' => {
                let unit = read_hex4(s, &mut i, escape_at)?;
                let code_point = if (0xD800..=0xDBFF).contains(&unit) {
                    // High surrogate: a `\uXXXX` low surrogate must follow.
                    if bytes.get(i) != Some(&b'\\') || bytes.get(i + 1) != Some(&b'u') {
                        return Err(EscapeError {
                            offset: escape_at,
                            message: "unpaired high surrogate",
                        });
                    }
                    i += 2;
                    let low = read_hex4(s, &mut i, escape_at)?;
                    if !(0xDC00..=0xDFFF).contains(&low) {
                        return Err(EscapeError {
                            offset: escape_at,
                            message: "invalid low surrogate",
                        });
                    }
                    0x10000 + ((unit - 0xD800) << 10) + (low - 0xDC00)
                } else if (0xDC00..=0xDFFF).contains(&unit) {
                    return Err(EscapeError {
                        offset: escape_at,
                        message: "unpaired low surrogate",
                    });
                } else {
                    unit
                };

                match char::from_u32(code_point) {
                    Some(c) => out.push(c),
                    None => {
                        return Err(EscapeError {
                            offset: escape_at,
                            message: "escape is not a valid code point",
                        });
                    }
                }
            }
            _ => {
                return Err(EscapeError {
                    offset: escape_at,
                    message: "unknown escape sequence",
                });
            }
        }
    }

    Ok(out)
}

fn read_hex4(s: &str, i: &mut usize, escape_at: usize) -> Result<u32, EscapeError> {
    let hex = s.get(*i..*i + 4).ok_or(EscapeError {
        offset: escape_at,
        message: "truncated \\u escape",
    })?;
    let unit = u32::from_str_radix(hex, 16).map_err(|_| EscapeError {
        offset: escape_at,
        message: "invalid hex digits in \\u escape",
    })?;
    *i += 4;
    Ok(unit)
}

#[cfg(test)]
mod tests {
    use super::{escape_into, unescape};
    use alloc::string::String;

    fn escaped(s: &str) -> String {
        let mut out = String::new();
        escape_into(s, &mut out).unwrap();
        out
    }

    #[test]
    fn escape_table() {
        assert_eq!(escaped("plain"), "plain");
        assert_eq!(
            escaped("Hello, \"world\"!\nLine2\u{11}"),
            "Hello, \\\"world\\\"!\\nLine2\\u0011"
        );
        assert_eq!(escaped("a/b\\c"), "a\\/b\\\\c");
    }

    #[test]
    fn unescape_reverses_escape() {
        let original = "Hello, \"world\"!\nLine2\u{11}\t\u{08}\u{0C}\réé";
        assert_eq!(unescape(&escaped(original)).unwrap(), original);
    }

    #[test]
    fn unescape_hex_and_surrogates() {
        assert_eq!(unescape("\\u0048i").unwrap(), "Hi");
        // U+1F600 as a surrogate pair.
        assert_eq!(unescape("\\ud83d\\ude00").unwrap(), "\u{1F600}");
        assert!(unescape("\\ud83d").is_err());
        assert!(unescape("\\uzzzz").is_err());
        assert!(unescape("trailing\\").is_err());
    }
}
