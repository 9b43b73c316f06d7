use super::ManglerTables;
use super::compression::emit_substitution;
use super::session::MangleSession;
use crate::error::ContractViolation;
use crate::primitives::PrimitiveId;
use crate::types::Ty;

/// Template name used for Java arrays, `JArray<T>`.
pub const JARRAY: &str = "JArray";

impl MangleSession<'_> {
    pub(crate) fn mangle_type(&mut self, ty: &Ty) -> Result<(), ContractViolation> {
        match ty {
            Ty::Primitive(id) => {
                let tag = primitive_tag(self.tables, *id)?;
                self.out.push_str(tag);
            }
            Ty::Pointer(pointee) => match pointee.as_ref() {
                Ty::Class(class) => {
                    if self.mangle_qualified_class_name(class, true)? {
                        self.out.push('E');
                    }
                }
                element => self.mangle_array_type(element)?,
            },
            Ty::Class(class) => {
                if self.mangle_qualified_class_name(class, false)? {
                    self.out.push('E');
                }
            }
            Ty::Method(_) => return Err(ContractViolation::MethodTypeAsValue),
        }
        Ok(())
    }

    /// Encode a pointer to `JArray<element>`.
    ///
    /// The complete spelling is looked up before anything inside it is
    /// recorded, so it is built once without touching the table.
    fn mangle_array_type(&mut self, element: &Ty) -> Result<(), ContractViolation> {
        let mut unsubstituted = String::from("PJArray<");
        spell_unsubstituted(self.tables, element, &mut unsubstituted)?;
        unsubstituted.push('>');

        if let Some(index) = self.compression.find(&unsubstituted) {
            emit_substitution(index, &mut self.out);
            return Ok(());
        }

        self.out.push('P');
        match self.compression.find(JARRAY) {
            Some(index) => emit_substitution(index, &mut self.out),
            None => {
                self.out.push_str("6JArray");
                self.compression.insert(JARRAY)?;
            }
        }
        self.out.push('I');
        self.mangle_type(element)?;
        self.out.push('E');

        self.compression.insert(&unsubstituted[1..])?;
        self.compression.insert(&unsubstituted)?;
        Ok(())
    }
}

fn primitive_tag(tables: &ManglerTables, id: PrimitiveId) -> Result<&str, ContractViolation> {
    tables
        .primitive_tag(id)
        .ok_or_else(|| ContractViolation::MissingPrimitiveTag {
            primitive: tables.primitives().display_name(id),
        })
}

/// Canonical spelling of `ty` with no back-references, as used for
/// compression candidates: `Pjava/lang/Object`, `JArray<i>`.
fn spell_unsubstituted(
    tables: &ManglerTables,
    ty: &Ty,
    out: &mut String,
) -> Result<(), ContractViolation> {
    match ty {
        Ty::Primitive(id) => out.push_str(primitive_tag(tables, *id)?),
        Ty::Pointer(pointee) => match pointee.as_ref() {
            Ty::Class(class) => {
                out.push('P');
                out.push_str(class.name());
            }
            element => {
                out.push_str("JArray<");
                spell_unsubstituted(tables, element, out)?;
                out.push('>');
            }
        },
        Ty::Class(class) => out.push_str(class.name()),
        Ty::Method(_) => return Err(ContractViolation::MethodTypeAsValue),
    }
    Ok(())
}
