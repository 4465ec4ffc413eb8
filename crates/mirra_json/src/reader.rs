//! The identity-tracking recursive-descent reader.

use alloc::borrow::Cow;
use alloc::format;
use alloc::rc::Rc;
use alloc::string::String;

use mirra_reflect::ReflectError;
use mirra_reflect::info::{PropertyDescriptor, TypeDescriptor, TypeKind};
use mirra_reflect::registry::TypeRegistry;
use mirra_reflect::text::unescape;
use mirra_reflect::value::Value;

use crate::error::JsonError;
use crate::identity::ReaderIdentity;

// -----------------------------------------------------------------------------
// Entry point

/// Deserializes `text` into the existing instance behind `target`.
///
/// This is one top-level call: the identity map starts empty and is
/// discarded when the call returns. On `"$id"` the current target — when
/// it is a shared instance — is registered *before* its properties parse,
/// so a later `{"$ref":"<id>"}` (including one inside the object itself)
/// binds the exact same cell instead of allocating. Preserving identity
/// therefore requires reading into shared targets; a `$ref` to an id that
/// was never registered fails fast.
///
/// Pointer-typed properties allocate through their *declared* value type.
/// Declared-but-unwritable keys are skipped; undeclared keys fail with
/// [`PropertyNotDeclared`](ReflectError::PropertyNotDeclared). Collections
/// are cleared, then refilled in array order.
pub fn from_text(
    registry: &TypeRegistry,
    target: &mut Value,
    text: &str,
) -> Result<(), JsonError> {
    log::trace!("deserializing into a `{}` value", target.native_type_name());
    let mut reader = Reader {
        registry,
        scanner: Scanner::new(text),
        identity: ReaderIdentity::default(),
    };
    reader.identity.clear();
    reader.read_into(target)?;
    reader.scanner.expect_end()
}

// -----------------------------------------------------------------------------
// Scanner

/// A simple cursor over the input: whitespace and commas are separators,
/// strings are quote-delimited with backslash escapes, everything else is
/// a bare token.
struct Scanner<'t> {
    text: &'t str,
    pos: usize,
}

impl<'t> Scanner<'t> {
    fn new(text: &'t str) -> Self {
        Self { text, pos: 0 }
    }

    #[inline]
    fn offset(&self) -> usize {
        self.pos
    }

    fn skip_separators(&mut self) {
        let bytes = self.text.as_bytes();
        while let Some(b) = bytes.get(self.pos) {
            if b.is_ascii_whitespace() || *b == b',' {
                self.pos += 1;
            } else {
                break;
            }
        }
    }

    /// The next content byte, separators skipped, cursor not advanced.
    fn peek(&mut self) -> Option<u8> {
        self.skip_separators();
        self.text.as_bytes().get(self.pos).copied()
    }

    fn expect(&mut self, byte: u8) -> Result<(), JsonError> {
        match self.peek() {
            Some(b) if b == byte => {
                self.pos += 1;
                Ok(())
            }
            Some(_) => Err(JsonError::MalformedInput {
                offset: self.pos,
                message: Cow::Owned(format!("expected `{}`", byte as char)),
            }),
            None => Err(JsonError::malformed(self.pos, "unexpected end of input")),
        }
    }

    /// A quote-delimited string; returns the raw content between the
    /// quotes, escapes unprocessed.
    fn string_token(&mut self) -> Result<&'t str, JsonError> {
        if self.peek() != Some(b'"') {
            return Err(JsonError::malformed(self.pos, "expected a string"));
        }
        self.pos += 1;
        let start = self.pos;
        let bytes = self.text.as_bytes();
        while self.pos < bytes.len() {
            match bytes[self.pos] {
                b'"' => {
                    let content = &self.text[start..self.pos];
                    self.pos += 1;
                    return Ok(content);
                }
                b'\\' => self.pos += 2,
                _ => self.pos += 1,
            }
        }
        Err(JsonError::malformed(start, "unterminated string"))
    }

    /// One raw literal: a quoted string (returned with its quotes, ready
    /// for a scalar codec) or a bare token such as `45`, `true`, `NULL`.
    fn scalar_token(&mut self) -> Result<&'t str, JsonError> {
        match self.peek() {
            None => Err(JsonError::malformed(self.pos, "unexpected end of input")),
            Some(b'"') => {
                let start = self.pos;
                self.string_token()?;
                Ok(&self.text[start..self.pos])
            }
            Some(b'{' | b'}' | b'[' | b']' | b':') => {
                Err(JsonError::malformed(self.pos, "expected a literal"))
            }
            Some(_) => {
                let start = self.pos;
                let bytes = self.text.as_bytes();
                while let Some(b) = bytes.get(self.pos) {
                    if b.is_ascii_whitespace() || matches!(b, b',' | b':' | b'{' | b'}' | b'[' | b']' | b'"') {
                        break;
                    }
                    self.pos += 1;
                }
                Ok(&self.text[start..self.pos])
            }
        }
    }

    /// Skips one whole value, matching braces and brackets with a nesting
    /// counter and jumping over strings.
    fn skip_value(&mut self) -> Result<(), JsonError> {
        match self.peek() {
            None => Err(JsonError::malformed(self.pos, "unexpected end of input")),
            Some(b'"') => self.string_token().map(|_| ()),
            Some(b'{' | b'[') => {
                let mut depth = 0usize;
                let bytes = self.text.as_bytes();
                loop {
                    match bytes.get(self.pos) {
                        None => {
                            return Err(JsonError::malformed(
                                self.pos,
                                "unexpected end of input inside a skipped value",
                            ));
                        }
                        Some(b'"') => {
                            self.string_token()?;
                        }
                        Some(b'{' | b'[') => {
                            depth += 1;
                            self.pos += 1;
                        }
                        Some(b'}' | b']') => {
                            depth -= 1;
                            self.pos += 1;
                            if depth == 0 {
                                return Ok(());
                            }
                        }
                        Some(_) => self.pos += 1,
                    }
                }
            }
            Some(_) => self.scalar_token().map(|_| ()),
        }
    }

    /// Verifies only separators remain.
    fn expect_end(&mut self) -> Result<(), JsonError> {
        self.skip_separators();
        if self.pos < self.text.len() {
            return Err(JsonError::malformed(
                self.pos,
                "trailing content after the top-level value",
            ));
        }
        Ok(())
    }
}

// -----------------------------------------------------------------------------
// Reader

struct Reader<'a, 't> {
    registry: &'a TypeRegistry,
    scanner: Scanner<'t>,
    identity: ReaderIdentity,
}

impl Reader<'_, '_> {
    fn read_into(&mut self, target: &mut Value) -> Result<(), JsonError> {
        let descriptor = self.registry.descriptor_of(target)?;
        match descriptor.kind() {
            TypeKind::Fundamental => self.read_scalar_into(target, descriptor),
            TypeKind::Object => self.read_object(target, descriptor),
            TypeKind::Collection => self.read_array(target, descriptor),
            TypeKind::Pointer | TypeKind::Reference => {
                if target.is_null() {
                    return Err(JsonError::Reflect(ReflectError::NullInstance));
                }
                let base = descriptor.deref_target(self.registry)?;
                match base.kind() {
                    TypeKind::Fundamental => self.read_scalar_into(target, base),
                    TypeKind::Collection => self.read_array(target, base),
                    _ => self.read_object(target, base),
                }
            }
        }
    }

    fn read_scalar_into(
        &mut self,
        target: &mut Value,
        descriptor: &TypeDescriptor,
    ) -> Result<(), JsonError> {
        let parsed = self.parse_scalar(descriptor)?;
        target.assign(parsed)?;
        Ok(())
    }

    fn parse_scalar(&mut self, descriptor: &TypeDescriptor) -> Result<Value, JsonError> {
        self.scanner.skip_separators();
        let offset = self.scanner.offset();
        let raw = self.scanner.scalar_token()?;
        descriptor
            .parse_literal(raw)
            .map_err(|err| malformed_at(offset, &err))
    }

    fn read_object(
        &mut self,
        target: &mut Value,
        descriptor: &TypeDescriptor,
    ) -> Result<(), JsonError> {
        self.scanner.expect(b'{')?;
        self.read_object_body(target, descriptor, None)
    }

    /// Parses the key/value entries of an already-opened object, starting
    /// with `pending` when the caller consumed the first key deciding
    /// between `$ref` and inline expansion.
    fn read_object_body(
        &mut self,
        target: &mut Value,
        descriptor: &TypeDescriptor,
        mut pending: Option<String>,
    ) -> Result<(), JsonError> {
        loop {
            let key = match pending.take() {
                Some(key) => key,
                None => {
                    if self.scanner.peek() == Some(b'}') {
                        self.scanner.pos += 1;
                        return Ok(());
                    }
                    self.read_key()?
                }
            };

            match key.as_str() {
                "$type" => {
                    let offset = self.scanner.offset();
                    let name = self.read_string_value()?;
                    if name != descriptor.name()
                        && !self.registry.is_derived_from(&name, descriptor.name())
                    {
                        return Err(JsonError::MalformedInput {
                            offset,
                            message: Cow::Owned(format!(
                                "$type `{name}` does not match the declared type `{}`",
                                descriptor.name(),
                            )),
                        });
                    }
                }
                "$id" => {
                    let id = self.read_id_value()?;
                    // Only shared targets register: a later $ref can only
                    // alias a cell. Registration precedes the remaining
                    // entries, so a self-referential property resolves.
                    if let Some(alias) = target.alias()
                        && alias.address().is_some()
                    {
                        self.identity.register(id, alias);
                    }
                }
                "$ref" => {
                    return Err(JsonError::malformed(
                        self.scanner.offset(),
                        "$ref cannot rebind an existing instance",
                    ));
                }
                _ => {
                    let Some(property) = descriptor.property(&key).map(Rc::clone) else {
                        return Err(JsonError::Reflect(ReflectError::PropertyNotDeclared {
                            owner: descriptor.name().into(),
                            name: key.into(),
                        }));
                    };
                    if !property.writable() {
                        log::trace!(
                            "skipping read-only property `{}.{}`",
                            property.owner(),
                            property.name(),
                        );
                        self.scanner.skip_value()?;
                        continue;
                    }
                    self.read_property(target, &property)?;
                }
            }
        }
    }

    fn read_property(
        &mut self,
        owner: &mut Value,
        property: &PropertyDescriptor,
    ) -> Result<(), JsonError> {
        let value_descriptor = self.registry.lookup(property.value_type())?;
        match value_descriptor.kind() {
            TypeKind::Fundamental => {
                let parsed = self.parse_scalar(value_descriptor)?;
                property.set(self.registry, owner, parsed)?;
            }
            TypeKind::Object => {
                let mut current = self.current_or_fresh(owner, property, value_descriptor)?;
                self.read_object(&mut current, value_descriptor)?;
                property.set(self.registry, owner, current)?;
            }
            TypeKind::Collection => {
                let mut current = self.current_or_fresh(owner, property, value_descriptor)?;
                self.read_array(&mut current, value_descriptor)?;
                property.set(self.registry, owner, current)?;
            }
            TypeKind::Pointer | TypeKind::Reference => {
                let bound = self.read_pointer_value(value_descriptor)?;
                property.set(self.registry, owner, bound)?;
            }
        }
        Ok(())
    }

    /// The in-place deserialization target for a value-held member: the
    /// current content when the property is readable, a fresh instance
    /// otherwise.
    fn current_or_fresh(
        &mut self,
        owner: &mut Value,
        property: &PropertyDescriptor,
        value_descriptor: &TypeDescriptor,
    ) -> Result<Value, JsonError> {
        let current = if property.readable() {
            property.get(self.registry, owner)?
        } else {
            value_descriptor.create(self.registry)?
        };
        if current.is_empty() {
            return Err(JsonError::MalformedInput {
                offset: self.scanner.offset(),
                message: Cow::Owned(format!(
                    "cannot instantiate `{}`",
                    value_descriptor.name(),
                )),
            });
        }
        Ok(current)
    }

    /// One pointer-typed value: `NULL`, `{"$ref":"<id>"}`, an inline
    /// object expansion (allocated through the declared type), or a bare
    /// scalar for fundamental pointees.
    fn read_pointer_value(
        &mut self,
        pointer_descriptor: &TypeDescriptor,
    ) -> Result<Value, JsonError> {
        if self.scanner.peek() == Some(b'{') {
            self.scanner.pos += 1;
            if self.scanner.peek() == Some(b'}') {
                self.scanner.pos += 1;
                return self.allocate(pointer_descriptor);
            }
            let first_key = self.read_key()?;
            if first_key == "$ref" {
                let offset = self.scanner.offset();
                let id = self.read_id_value()?;
                let Some(resolved) = self.identity.resolve(id) else {
                    return Err(JsonError::MalformedInput {
                        offset,
                        message: Cow::Owned(format!("$ref to unknown id `{id}`")),
                    });
                };
                log::trace!("$ref {id} resolved to a previously read instance");
                self.scanner.expect(b'}')?;
                return Ok(resolved);
            }

            let base = pointer_descriptor.deref_target(self.registry)?;
            let mut fresh = self.allocate(pointer_descriptor)?;
            self.read_object_body(&mut fresh, base, Some(first_key))?;
            return Ok(fresh);
        }

        self.scanner.skip_separators();
        let offset = self.scanner.offset();
        let raw = self.scanner.scalar_token()?;
        if raw == "NULL" {
            return Ok(pointer_descriptor.null_value(self.registry)?);
        }
        let base = pointer_descriptor.deref_target(self.registry)?;
        if base.is_fundamental() {
            let parsed = base
                .parse_literal(raw)
                .map_err(|err| malformed_at(offset, &err))?;
            let mut fresh = self.allocate(pointer_descriptor)?;
            fresh.assign(parsed)?;
            return Ok(fresh);
        }
        Err(JsonError::malformed(
            offset,
            "expected an object, a $ref, or NULL",
        ))
    }

    fn allocate(&self, pointer_descriptor: &TypeDescriptor) -> Result<Value, JsonError> {
        let fresh = pointer_descriptor.create_shared(self.registry)?;
        if fresh.is_empty() {
            return Err(JsonError::MalformedInput {
                offset: self.scanner.offset(),
                message: Cow::Owned(format!(
                    "cannot instantiate `{}`",
                    pointer_descriptor.name(),
                )),
            });
        }
        Ok(fresh)
    }

    fn read_array(
        &mut self,
        target: &mut Value,
        descriptor: &TypeDescriptor,
    ) -> Result<(), JsonError> {
        let ops = descriptor.collection_ops().ok_or_else(|| {
            JsonError::Reflect(ReflectError::TypeNotDeclared {
                name: descriptor.name().into(),
            })
        })?;
        let element_name = descriptor.element_type().ok_or_else(|| {
            JsonError::Reflect(ReflectError::TypeNotDeclared {
                name: descriptor.name().into(),
            })
        })?;
        let element_descriptor = self.registry.lookup(element_name)?;

        // The wire form replaces the whole container.
        target.with_mut(|any| ops.clear(any))??;

        self.scanner.expect(b'[')?;
        loop {
            if self.scanner.peek() == Some(b']') {
                self.scanner.pos += 1;
                return Ok(());
            }
            let element = self.read_element(element_descriptor)?;
            target.with_mut(|any| ops.insert(any, element))??;
        }
    }

    fn read_element(
        &mut self,
        element_descriptor: &TypeDescriptor,
    ) -> Result<Value, JsonError> {
        match element_descriptor.kind() {
            TypeKind::Fundamental => self.parse_scalar(element_descriptor),
            TypeKind::Pointer | TypeKind::Reference => {
                self.read_pointer_value(element_descriptor)
            }
            TypeKind::Object | TypeKind::Collection => {
                let mut fresh = element_descriptor.create(self.registry)?;
                if fresh.is_empty() {
                    return Err(JsonError::MalformedInput {
                        offset: self.scanner.offset(),
                        message: Cow::Owned(format!(
                            "cannot instantiate `{}`",
                            element_descriptor.name(),
                        )),
                    });
                }
                self.read_into(&mut fresh)?;
                Ok(fresh)
            }
        }
    }

    // -------------------------------------------------------------------------
    // Key and marker parsing

    /// One `"key":` pair opener; returns the unescaped key.
    fn read_key(&mut self) -> Result<String, JsonError> {
        let offset = self.scanner.offset();
        let raw = self.scanner.string_token()?;
        let key = unescape(raw).map_err(|err| malformed_at(offset, &err))?;
        self.scanner.expect(b':')?;
        Ok(key)
    }

    fn read_string_value(&mut self) -> Result<String, JsonError> {
        let offset = self.scanner.offset();
        let raw = self.scanner.string_token()?;
        unescape(raw).map_err(|err| malformed_at(offset, &err))
    }

    /// An identity id: a quoted or bare non-negative integer.
    fn read_id_value(&mut self) -> Result<u64, JsonError> {
        self.scanner.skip_separators();
        let offset = self.scanner.offset();
        let raw = self.scanner.scalar_token()?;
        let digits = raw
            .strip_prefix('"')
            .and_then(|s| s.strip_suffix('"'))
            .unwrap_or(raw);
        digits
            .parse::<u64>()
            .map_err(|_| JsonError::malformed(offset, "expected an integer id"))
    }
}

fn malformed_at(offset: usize, err: &dyn core::fmt::Display) -> JsonError {
    JsonError::MalformedInput {
        offset,
        message: Cow::Owned(format!("{err}")),
    }
}
