//! The identity-tracking text writer.

use alloc::string::String;
use core::fmt;

use mirra_reflect::ReflectError;
use mirra_reflect::info::{SkipSerialize, TypeDescriptor, TypeKind};
use mirra_reflect::registry::TypeRegistry;
use mirra_reflect::text::escape_into;
use mirra_reflect::value::Value;

use crate::error::JsonError;
use crate::identity::WriterIdentity;

// -----------------------------------------------------------------------------
// WriteOptions

/// Streaming-mode knobs for the writer.
#[derive(Debug, Clone)]
pub struct WriteOptions {
    /// Emit newlines and two-space indentation.
    pub pretty: bool,
    /// Emit a `"$type"` discriminator on every object expansion.
    pub type_tags: bool,
}

impl Default for WriteOptions {
    fn default() -> Self {
        Self {
            pretty: false,
            type_tags: true,
        }
    }
}

// -----------------------------------------------------------------------------
// Entry points

/// Serializes `value` to a compact string with default options.
pub fn to_text(registry: &TypeRegistry, value: &Value) -> Result<String, JsonError> {
    to_text_with(registry, value, &WriteOptions::default())
}

/// Serializes `value` to a string with the given options.
pub fn to_text_with(
    registry: &TypeRegistry,
    value: &Value,
    options: &WriteOptions,
) -> Result<String, JsonError> {
    let mut out = String::new();
    write_text(registry, value, &mut out, options)?;
    Ok(out)
}

/// Serializes `value` into the caller-supplied stream.
///
/// This is one top-level call: the identity map starts empty, fills during
/// the traversal, and is discarded when the call returns. A shared
/// instance expands inline with a fresh `"$id"` the first time it is
/// visited; every later visit of the same address — aliased or cyclic —
/// emits only `{"$ref":"<id>"}`, which is what bounds the output on
/// self-referential graphs.
///
/// Pointer-typed properties expand through their *declared* value type,
/// never the pointee's runtime type; a pointee of a derived type
/// serializes only its declared-type properties. Properties annotated
/// [`SkipSerialize`] and properties without a getter are skipped, never
/// errors.
pub fn write_text<W: fmt::Write>(
    registry: &TypeRegistry,
    value: &Value,
    out: &mut W,
    options: &WriteOptions,
) -> Result<(), JsonError> {
    log::trace!("serializing a `{}` value", value.native_type_name());
    let mut writer = Writer {
        registry,
        options,
        identity: WriterIdentity::default(),
        out,
        depth: 0,
    };
    writer.identity.clear();
    writer.write_value(value)
}

// -----------------------------------------------------------------------------
// Writer

struct Writer<'a> {
    registry: &'a TypeRegistry,
    options: &'a WriteOptions,
    identity: WriterIdentity,
    out: &'a mut dyn fmt::Write,
    depth: usize,
}

impl Writer<'_> {
    fn write_value(&mut self, value: &Value) -> Result<(), JsonError> {
        let descriptor = self.registry.descriptor_of(value)?;
        match descriptor.kind() {
            TypeKind::Fundamental => self.write_scalar(value, descriptor),
            TypeKind::Object => {
                let id = self.identity.fresh();
                self.write_object(value, descriptor, id)
            }
            TypeKind::Pointer | TypeKind::Reference => self.write_pointer(value, descriptor),
            TypeKind::Collection => self.write_array(value, descriptor),
        }
    }

    fn write_scalar(
        &mut self,
        value: &Value,
        descriptor: &TypeDescriptor,
    ) -> Result<(), JsonError> {
        let codec = descriptor.scalar_codec().ok_or_else(|| {
            JsonError::Reflect(ReflectError::InvalidLiteral {
                type_name: descriptor.name().into(),
                literal: "(no codec)".into(),
            })
        })?;
        value
            .with_ref(|any| codec.render(any, self.out))?
            .map_err(JsonError::Stream)
    }

    fn write_pointer(
        &mut self,
        value: &Value,
        descriptor: &TypeDescriptor,
    ) -> Result<(), JsonError> {
        if value.is_null() {
            return self.raw("NULL");
        }
        let target = descriptor.deref_target(self.registry)?;
        if target.is_fundamental() {
            // Scalar pointees render inline; identity is only tracked for
            // object expansions.
            return self.write_scalar(value, target);
        }
        if target.is_collection() {
            return self.write_array(value, target);
        }

        // The address is present on every non-null pointer value.
        let address = value.address().ok_or(ReflectError::NullInstance)?;
        if let Some(id) = self.identity.get(address) {
            log::trace!("address {address:#x} already visited, emitting $ref {id}");
            let mut first = true;
            self.open('{')?;
            self.key("$ref", &mut first)?;
            self.raw_id(id)?;
            return self.close('}');
        }

        let guard = value.alias().ok_or(ReflectError::NullInstance)?;
        let id = self.identity.assign(address, guard);
        self.write_object(value, target, id)
    }

    fn write_object(
        &mut self,
        value: &Value,
        descriptor: &TypeDescriptor,
        id: u64,
    ) -> Result<(), JsonError> {
        let mut first = true;
        self.open('{')?;
        if self.options.type_tags {
            self.key("$type", &mut first)?;
            self.quoted(descriptor.name())?;
        }
        self.key("$id", &mut first)?;
        self.raw_id(id)?;

        for property in descriptor.properties() {
            if !property.readable() || property.has_annotation::<SkipSerialize>() {
                continue;
            }
            let nested = property.get(self.registry, value)?;
            self.key(property.name(), &mut first)?;
            self.write_value(&nested)?;
        }
        self.close('}')
    }

    fn write_array(
        &mut self,
        value: &Value,
        descriptor: &TypeDescriptor,
    ) -> Result<(), JsonError> {
        let ops = descriptor.collection_ops().ok_or_else(|| {
            JsonError::Reflect(ReflectError::TypeNotDeclared {
                name: descriptor.name().into(),
            })
        })?;
        let items = value.with_ref(|any| ops.items(any))??;

        let mut first = true;
        self.open('[')?;
        for item in &items {
            self.separate(&mut first)?;
            self.write_value(item)?;
        }
        self.close(']')
    }

    // -------------------------------------------------------------------------
    // Formatting

    fn open(&mut self, c: char) -> Result<(), JsonError> {
        self.depth += 1;
        self.out.write_char(c).map_err(JsonError::Stream)
    }

    fn close(&mut self, c: char) -> Result<(), JsonError> {
        self.depth -= 1;
        if self.options.pretty {
            self.newline()?;
        }
        self.out.write_char(c).map_err(JsonError::Stream)
    }

    fn separate(&mut self, first: &mut bool) -> Result<(), JsonError> {
        if !*first {
            self.out.write_char(',').map_err(JsonError::Stream)?;
        }
        *first = false;
        if self.options.pretty {
            self.newline()?;
        }
        Ok(())
    }

    fn key(&mut self, name: &str, first: &mut bool) -> Result<(), JsonError> {
        self.separate(first)?;
        self.quoted(name)?;
        self.raw(if self.options.pretty { ": " } else { ":" })
    }

    fn quoted(&mut self, s: &str) -> Result<(), JsonError> {
        self.out.write_char('"').map_err(JsonError::Stream)?;
        escape_into(s, self.out).map_err(JsonError::Stream)?;
        self.out.write_char('"').map_err(JsonError::Stream)
    }

    fn raw(&mut self, s: &str) -> Result<(), JsonError> {
        self.out.write_str(s).map_err(JsonError::Stream)
    }

    fn raw_id(&mut self, id: u64) -> Result<(), JsonError> {
        write!(self.out, "\"{id}\"").map_err(JsonError::Stream)
    }

    fn newline(&mut self) -> Result<(), JsonError> {
        self.out.write_char('\n').map_err(JsonError::Stream)?;
        for _ in 0..self.depth {
            self.out.write_str("  ").map_err(JsonError::Stream)?;
        }
        Ok(())
    }
}
