//! JVM field and method descriptors (`I`, `[Ljava/lang/Object;`, `(II)V`).
//!
//! Entity names arrive as `name.descriptor`; this turns the descriptor part
//! into the [`Ty`] shapes the mangler encodes. Object types become pointers
//! to classes and arrays become pointers to their element type.

use std::fmt;

use crate::primitives::PrimitiveRegistry;
use crate::types::{Allocation, ClassType, Entity, MethodTy, Ty};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DescriptorError {
    pub descriptor: String,
    pub offset: usize,
    pub message: String,
}

impl DescriptorError {
    pub(crate) fn new(descriptor: &str, offset: usize, message: impl Into<String>) -> Self {
        Self {
            descriptor: descriptor.to_string(),
            offset,
            message: message.into(),
        }
    }
}

impl fmt::Display for DescriptorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} at offset {} in `{}`",
            self.message, self.offset, self.descriptor
        )
    }
}

impl std::error::Error for DescriptorError {}

/// Parse a field descriptor such as `J` or `[[Ljava/lang/String;`.
pub fn parse_field_descriptor(
    descriptor: &str,
    primitives: &PrimitiveRegistry,
) -> Result<Ty, DescriptorError> {
    let mut parser = Parser::new(descriptor, primitives);
    let ty = parser.value_type()?;
    parser.expect_end()?;
    Ok(ty)
}

/// Parse a method descriptor such as `(ILjava/lang/Object;)V`.
///
/// The receiver is not part of a descriptor; see [`entity_from_descriptor`].
pub fn parse_method_descriptor(
    descriptor: &str,
    primitives: &PrimitiveRegistry,
) -> Result<MethodTy, DescriptorError> {
    let mut parser = Parser::new(descriptor, primitives);
    parser.expect(b'(')?;
    let mut params = Vec::new();
    while parser.peek() != Some(b')') {
        if parser.peek().is_none() {
            return Err(parser.error("unterminated parameter list"));
        }
        params.push(parser.value_type()?);
    }
    parser.expect(b')')?;
    let result = if parser.peek() == Some(b'V') {
        parser.pos += 1;
        None
    } else {
        Some(parser.value_type()?)
    };
    parser.expect_end()?;
    Ok(MethodTy::new(params, result))
}

/// The descriptor half of a raw entity name such as `equals.(Ljava/lang/Object;)Z`.
#[must_use]
pub fn embedded_descriptor(raw_name: &str) -> Option<&str> {
    raw_name
        .split_once('.')
        .map(|(_, descriptor)| descriptor)
        .filter(|descriptor| !descriptor.is_empty())
}

/// Build an entity from `owner`, its raw name and a descriptor.
///
/// Method descriptors (starting with `(`) produce method entities; instance
/// methods get a reference to `owner` prepended as the receiver parameter.
/// Anything else is a field descriptor.
pub fn entity_from_descriptor(
    owner: ClassType,
    name: &str,
    descriptor: &str,
    allocation: Allocation,
    primitives: &PrimitiveRegistry,
) -> Result<Entity, DescriptorError> {
    let ty = if descriptor.starts_with('(') {
        let mut method = parse_method_descriptor(descriptor, primitives)?;
        if allocation == Allocation::Instance {
            method.params.insert(0, Ty::class_ref(owner.clone()));
        }
        Ty::Method(method)
    } else {
        parse_field_descriptor(descriptor, primitives)?
    };
    Ok(Entity::new(owner, name, ty, allocation))
}

struct Parser<'a> {
    text: &'a str,
    pos: usize,
    primitives: &'a PrimitiveRegistry,
}

impl<'a> Parser<'a> {
    fn new(text: &'a str, primitives: &'a PrimitiveRegistry) -> Self {
        Self {
            text,
            pos: 0,
            primitives,
        }
    }

    fn peek(&self) -> Option<u8> {
        self.text.as_bytes().get(self.pos).copied()
    }

    fn error(&self, message: impl Into<String>) -> DescriptorError {
        DescriptorError::new(self.text, self.pos, message)
    }

    fn expect(&mut self, byte: u8) -> Result<(), DescriptorError> {
        if self.peek() == Some(byte) {
            self.pos += 1;
            Ok(())
        } else {
            Err(self.error(format!("expected `{}`", char::from(byte))))
        }
    }

    fn expect_end(&self) -> Result<(), DescriptorError> {
        if self.pos == self.text.len() {
            Ok(())
        } else {
            Err(self.error("trailing characters"))
        }
    }

    fn value_type(&mut self) -> Result<Ty, DescriptorError> {
        let Some(code) = self.peek() else {
            return Err(self.error("missing type"));
        };
        match code {
            b'[' => {
                self.pos += 1;
                Ok(Ty::array_of(self.value_type()?))
            }
            b'L' => {
                let start = self.pos + 1;
                let Some(len) = self.text[start..].find(';') else {
                    return Err(self.error("unterminated class name"));
                };
                if len == 0 {
                    return Err(self.error("empty class name"));
                }
                let name = &self.text[start..start + len];
                self.pos = start + len + 1;
                Ok(Ty::class_ref(ClassType::new(name)))
            }
            b'V' => Err(self.error("`V` is only valid as a method result")),
            _ => {
                let id = self
                    .primitives
                    .lookup_by_code(char::from(code))
                    .ok_or_else(|| {
                        self.error(format!("unknown type code `{}`", char::from(code)))
                    })?;
                self.pos += 1;
                Ok(Ty::Primitive(id))
            }
        }
    }
}
