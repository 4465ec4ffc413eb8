use alloc::boxed::Box;
use alloc::string::String;
use alloc::vec::Vec;
use core::any::Any;

// -----------------------------------------------------------------------------
// Annotations

/// A collection of typed metadata tags attached to one type, property, or
/// method descriptor.
///
/// A tag is any `'static` value; it is queried back by its type. Unlike a
/// map keyed by `TypeId`, several tags of the same type may coexist —
/// [`get`](Annotations::get) returns the first match in attachment order,
/// [`get_all`](Annotations::get_all) returns every match.
///
/// # Example
///
/// ```
/// use mirra_reflect::info::{Annotations, Doc, SkipSerialize};
///
/// let annotations = Annotations::new()
///     .with(SkipSerialize)
///     .with(Doc::new("internal bookkeeping"));
///
/// assert!(annotations.has::<SkipSerialize>());
/// assert_eq!(annotations.get::<Doc>().unwrap().text(), "internal bookkeeping");
/// assert_eq!(annotations.get_all::<Doc>().count(), 1);
/// ```
#[derive(Default)]
pub struct Annotations {
    entries: Vec<Box<dyn Any>>,
}

impl Annotations {
    /// Creates an empty collection.
    #[inline]
    pub const fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Attaches a tag, builder-style.
    #[inline]
    pub fn with<T: Any>(mut self, tag: T) -> Self {
        self.push(tag);
        self
    }

    /// Attaches a tag.
    #[inline]
    pub fn push<T: Any>(&mut self, tag: T) {
        self.entries.push(Box::new(tag));
    }

    /// Returns the first tag of type `T` in attachment order, if any.
    pub fn get<T: Any>(&self) -> Option<&T> {
        self.entries.iter().find_map(|e| e.downcast_ref::<T>())
    }

    /// Returns every tag of type `T` in attachment order.
    pub fn get_all<T: Any>(&self) -> impl Iterator<Item = &T> {
        self.entries.iter().filter_map(|e| e.downcast_ref::<T>())
    }

    /// Returns `true` if a tag of type `T` is attached.
    #[inline]
    pub fn has<T: Any>(&self) -> bool {
        self.get::<T>().is_some()
    }

    /// Returns the number of attached tags.
    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if no tags are attached.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl core::fmt::Debug for Annotations {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "Annotations({} tags)", self.entries.len())
    }
}

// -----------------------------------------------------------------------------
// Built-in tags

/// Marks a property as excluded from text serialization.
///
/// The writer checks for this tag on every property it is about to expand
/// and silently skips tagged ones; the check itself never fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SkipSerialize;

/// A human-readable description of a type, property, or method — the kind
/// of metadata an editor or inspector surfaces as a tooltip.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Doc(Box<str>);

impl Doc {
    /// Creates a description tag.
    pub fn new(text: impl Into<String>) -> Self {
        Self(text.into().into_boxed_str())
    }

    /// The description text.
    #[inline]
    pub fn text(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::{Annotations, Doc, SkipSerialize};

    #[test]
    fn first_match_and_all_matches() {
        let annotations = Annotations::new()
            .with(Doc::new("first"))
            .with(SkipSerialize)
            .with(Doc::new("second"));

        assert_eq!(annotations.len(), 3);
        assert_eq!(annotations.get::<Doc>().unwrap().text(), "first");

        let all: alloc::vec::Vec<_> = annotations.get_all::<Doc>().map(Doc::text).collect();
        assert_eq!(all, ["first", "second"]);

        assert!(annotations.has::<SkipSerialize>());
        assert!(!annotations.has::<u32>());
    }
}
