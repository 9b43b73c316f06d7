//! Itanium C++ ABI symbol names for classes, members and vtables.
//!
//! Symbols produced here demangle with `c++filt`, e.g. the static method
//! `java/lang/ClassLoader.putDeclaredAnnotations` taking
//! `(Class, int, int, int, Object[])` and returning `Object[]` becomes
//!
//! ```text
//! _ZN4java4lang11ClassLoader22putDeclaredAnnotationsEJP6JArrayIPNS0_6ObjectEEPNS0_5ClassEiiiS6_
//! ```
//!
//! with the compression table ending up as
//!
//! | token | fragment                     |
//! |-------|------------------------------|
//! | `S_`  | `java`                       |
//! | `S0_` | `java/lang`                  |
//! | `S1_` | `java/lang/ClassLoader`      |
//! | `S2_` | `JArray`                     |
//! | `S3_` | `java/lang/Object`           |
//! | `S4_` | `Pjava/lang/Object`          |
//! | `S5_` | `JArray<Pjava/lang/Object>`  |
//! | `S6_` | `PJArray<Pjava/lang/Object>` |

mod class_name;
pub mod compression;
mod session;
pub mod substitutions;
mod ty;

use std::collections::HashMap;
use std::fmt::Write;

use tracing::{debug, trace};

use crate::error::{ContractViolation, Result};
use crate::ident::{Ident, IdentTable};
use crate::primitives::{PrimitiveId, PrimitiveRegistry};
use crate::types::{ClassType, Entity, Ty};

pub use self::substitutions::NameSubstitutions;
pub use self::ty::JARRAY;
pub(crate) use session::MangleSession;

/// Plain name of instance constructors. Their symbols carry no return type.
pub const CONSTRUCTOR_NAME: &str = "<init>";

/// Process-wide mangling configuration.
///
/// Populate it during setup (primitive tags, fixed name spellings), then share
/// it read-only with every [`Mangler`].
#[derive(Debug, Clone, Default)]
pub struct ManglerTables {
    primitives: PrimitiveRegistry,
    primitive_tags: HashMap<PrimitiveId, String>,
    substitutions: NameSubstitutions,
}

impl ManglerTables {
    /// Empty tables over `primitives`; no primitive has a tag yet.
    #[must_use]
    pub fn new(primitives: PrimitiveRegistry) -> Self {
        Self {
            primitives,
            primitive_tags: HashMap::new(),
            substitutions: NameSubstitutions::new(),
        }
    }

    #[must_use]
    pub fn primitives(&self) -> &PrimitiveRegistry {
        &self.primitives
    }

    /// Attach the mangled tag for primitive `id`. Re-attaching the same tag is
    /// a no-op, a different one is rejected.
    pub fn set_primitive_type_name(
        &mut self,
        id: PrimitiveId,
        tag: impl Into<String>,
    ) -> std::result::Result<(), ContractViolation> {
        let tag = tag.into();
        if let Some(existing) = self.primitive_tags.get(&id) {
            if *existing == tag {
                return Ok(());
            }
            return Err(ContractViolation::ConflictingPrimitiveTag {
                primitive: self.primitives.display_name(id),
                existing: existing.clone(),
                requested: tag,
            });
        }
        debug!(
            target: "mangle",
            primitive = %self.primitives.display_name(id),
            tag = %tag,
            "primitive tag"
        );
        self.primitive_tags.insert(id, tag);
        Ok(())
    }

    #[must_use]
    pub fn primitive_tag(&self, id: PrimitiveId) -> Option<&str> {
        self.primitive_tags.get(&id).map(String::as_str)
    }

    /// Pin the mangled spelling of plain entity name `name`.
    pub fn add_name_substitution(
        &mut self,
        name: impl Into<String>,
        mangled: impl Into<String>,
    ) -> std::result::Result<(), ContractViolation> {
        self.substitutions.insert(name, mangled)
    }

    #[must_use]
    pub fn name_substitution(&self, name: &str) -> Option<&str> {
        self.substitutions.get(name)
    }

    #[must_use]
    pub fn substitutions(&self) -> &NameSubstitutions {
        &self.substitutions
    }
}

/// Produces symbol names one at a time.
///
/// Each call starts from an empty compression table; nothing leaks between
/// calls. Use one `Mangler` per thread.
#[derive(Debug)]
pub struct Mangler<'t> {
    session: MangleSession<'t>,
    idents: IdentTable,
}

impl<'t> Mangler<'t> {
    #[must_use]
    pub fn new(tables: &'t ManglerTables) -> Self {
        Self::with_idents(tables, IdentTable::new())
    }

    #[must_use]
    pub fn with_idents(tables: &'t ManglerTables, idents: IdentTable) -> Self {
        Self {
            session: MangleSession::new(tables),
            idents,
        }
    }

    #[must_use]
    pub fn tables(&self) -> &'t ManglerTables {
        self.session.tables
    }

    #[must_use]
    pub fn idents(&self) -> &IdentTable {
        &self.idents
    }

    #[must_use]
    pub fn into_idents(self) -> IdentTable {
        self.idents
    }

    /// Symbol for a field or method.
    ///
    /// Instance methods carry their receiver as parameter 0, which is not part
    /// of the symbol. Constructors (`<init>`) have no return type segment.
    pub fn mangle_entity_name(&mut self, entity: &Entity) -> Result<Ident> {
        let session = &mut self.session;
        session.begin("_Z");

        session.mangle_qualified_class_name(&entity.owner, false)?;

        let name = entity.plain_name();
        match session.tables.name_substitution(name) {
            Some(mangled) => session.out.push_str(mangled),
            None => {
                let _ = write!(session.out, "{}{name}", name.len());
            }
        }
        session.out.push('E');

        if let Ty::Method(method) = &entity.ty {
            if name != CONSTRUCTOR_NAME {
                session.out.push('J');
                match method.result() {
                    Some(result) => session.mangle_type(result)?,
                    None => session.out.push('v'),
                }
            }

            let skip = usize::from(!entity.is_static());
            let params = method.params.get(skip..).unwrap_or_default();
            if params.is_empty() {
                session.out.push('v');
            }
            for param in params {
                session.mangle_type(param)?;
            }
        }

        trace!(
            target: "mangle",
            owner = %entity.owner,
            entity = %entity.name,
            fragments = session.compression.len(),
            "entity mangled"
        );
        Ok(self.finish())
    }

    /// Symbol for the virtual table of `class`: `_ZTV` + nested name.
    pub fn mangle_vtable_name(&mut self, class: &ClassType) -> Result<Ident> {
        let session = &mut self.session;
        session.begin("_ZTV");

        if !session.mangle_qualified_class_name(class, false)? {
            return Err(ContractViolation::VtableWithoutComposite {
                class: class.to_string(),
            }
            .into());
        }
        session.out.push('E');

        trace!(target: "mangle", class = %class, "vtable mangled");
        Ok(self.finish())
    }

    fn finish(&mut self) -> Ident {
        let ident = self.idents.intern(self.session.output());
        self.session.out.clear();
        debug!(target: "mangle", symbol = %ident, "symbol");
        ident
    }
}

#[cfg(test)]
mod tests;
