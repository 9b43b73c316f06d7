//! Type-system surface consumed by the mangler.
//!
//! These are plain values owned by the caller; the mangler only reads them.

use std::fmt;
use std::sync::Arc;

use crate::primitives::PrimitiveId;

/// Class-like type with a slash-qualified name such as `java/lang/Object`.
///
/// The global (root) class owns free-standing entities and has no name.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ClassType {
    name: Arc<str>,
    global: bool,
}

impl ClassType {
    #[must_use]
    pub fn new(name: impl Into<Arc<str>>) -> Self {
        Self {
            name: name.into(),
            global: false,
        }
    }

    /// The distinguished root class. Mangles to an empty qualification.
    #[must_use]
    pub fn global() -> Self {
        Self {
            name: Arc::from(""),
            global: true,
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn is_global(&self) -> bool {
        self.global
    }
}

impl fmt::Display for ClassType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.global {
            f.write_str("<global>")
        } else {
            f.write_str(&self.name)
        }
    }
}

/// Method signature: ordered parameters and at most one result.
///
/// For instance methods parameter 0 is the implicit receiver.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct MethodTy {
    pub params: Vec<Ty>,
    pub result: Option<Box<Ty>>,
}

impl MethodTy {
    #[must_use]
    pub fn new(params: Vec<Ty>, result: Option<Ty>) -> Self {
        Self {
            params,
            result: result.map(Box::new),
        }
    }

    #[must_use]
    pub fn result(&self) -> Option<&Ty> {
        self.result.as_deref()
    }
}

/// Closed set of type shapes the mangler knows how to encode.
///
/// A pointer to anything other than a class stands for a Java array whose
/// element type is the pointee.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Ty {
    Primitive(PrimitiveId),
    Pointer(Box<Ty>),
    Class(ClassType),
    Method(MethodTy),
}

impl Ty {
    #[must_use]
    pub fn pointer_to(pointee: Ty) -> Self {
        Ty::Pointer(Box::new(pointee))
    }

    /// Reference to an instance of `class`.
    #[must_use]
    pub fn class_ref(class: ClassType) -> Self {
        Ty::pointer_to(Ty::Class(class))
    }

    /// Java array of `element`, e.g. `int[]` or `Object[]`.
    #[must_use]
    pub fn array_of(element: Ty) -> Self {
        Ty::pointer_to(element)
    }

    #[must_use]
    pub fn is_method(&self) -> bool {
        matches!(self, Ty::Method(_))
    }

    #[must_use]
    pub fn as_method(&self) -> Option<&MethodTy> {
        match self {
            Ty::Method(method) => Some(method),
            _ => None,
        }
    }
}

/// Whether an entity has an implicit receiver.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Allocation {
    Static,
    #[default]
    Instance,
}

/// A named member (field or method) of a class.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entity {
    pub owner: ClassType,
    pub ty: Ty,
    /// Raw name, possibly followed by `.` and a signature suffix.
    pub name: String,
    pub allocation: Allocation,
}

impl Entity {
    #[must_use]
    pub fn new(owner: ClassType, name: impl Into<String>, ty: Ty, allocation: Allocation) -> Self {
        Self {
            owner,
            ty,
            name: name.into(),
            allocation,
        }
    }

    /// The name with any signature suffix removed.
    #[must_use]
    pub fn plain_name(&self) -> &str {
        plain_name(&self.name)
    }

    #[must_use]
    pub fn is_static(&self) -> bool {
        self.allocation == Allocation::Static
    }
}

/// Strip everything from the first `.` onwards.
#[must_use]
pub fn plain_name(raw: &str) -> &str {
    raw.split_once('.').map_or(raw, |(name, _)| name)
}
