use alloc::boxed::Box;
use alloc::vec::Vec;

// -----------------------------------------------------------------------------
// DemangleTable

/// A configurable prefix-strip table normalizing native type-name output
/// into portable canonical names.
///
/// Different toolchains decorate type names differently (`"struct Point"`,
/// `"class Point"`); the table removes every known decoration from the
/// front of a raw name. Names with no matching prefix come back unchanged —
/// an explicit limitation, not an error — and can instead be mapped with
/// [`TypeRegistry::alias`](crate::registry::TypeRegistry::alias).
#[derive(Debug, Clone)]
pub struct DemangleTable {
    prefixes: Vec<Box<str>>,
}

impl Default for DemangleTable {
    /// The default decorations: `"struct "`, `"class "`, `"enum "`.
    fn default() -> Self {
        Self {
            prefixes: ["struct ", "class ", "enum "]
                .into_iter()
                .map(Box::from)
                .collect(),
        }
    }
}

impl DemangleTable {
    /// A table with no prefixes: every name comes back unchanged.
    pub const fn empty() -> Self {
        Self {
            prefixes: Vec::new(),
        }
    }

    /// Adds a prefix decoration to strip.
    pub fn add_prefix(&mut self, prefix: &str) {
        self.prefixes.push(prefix.into());
    }

    /// The registered prefixes.
    pub fn prefixes(&self) -> impl ExactSizeIterator<Item = &str> {
        self.prefixes.iter().map(|p| &**p)
    }

    /// Strips every matching prefix decoration from the front of `raw`.
    pub fn apply<'a>(&self, raw: &'a str) -> &'a str {
        let mut name = raw;
        loop {
            let mut stripped = false;
            for prefix in &self.prefixes {
                if let Some(rest) = name.strip_prefix(&**prefix) {
                    name = rest;
                    stripped = true;
                }
            }
            if !stripped {
                return name;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::DemangleTable;

    #[test]
    fn strips_known_decorations() {
        let table = DemangleTable::default();
        assert_eq!(table.apply("class Point"), "Point");
        assert_eq!(table.apply("struct Date"), "Date");
        assert_eq!(table.apply("enum Mode"), "Mode");
    }

    #[test]
    fn unknown_shapes_come_back_unchanged() {
        let table = DemangleTable::default();
        assert_eq!(table.apply("Point"), "Point");
        assert_eq!(table.apply("my::module::Point"), "my::module::Point");
        assert_eq!(table.apply(""), "");
    }

    #[test]
    fn custom_prefixes() {
        let mut table = DemangleTable::empty();
        assert_eq!(table.apply("class Point"), "class Point");
        table.add_prefix("const ");
        table.add_prefix("class ");
        assert_eq!(table.apply("const class Point"), "Point");
    }
}
