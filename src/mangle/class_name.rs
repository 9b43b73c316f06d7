use std::fmt::Write;

use super::compression::emit_substitution;
use super::session::MangleSession;
use crate::error::ContractViolation;
use crate::types::ClassType;

impl MangleSession<'_> {
    /// Encode the slash-qualified name of `class`, as a pointer to it when
    /// `pointer` is set.
    ///
    /// Returns whether a nested name (`N`) was opened; the caller emits the
    /// closing `E`. Whole-name substitutions never open one.
    pub(crate) fn mangle_qualified_class_name(
        &mut self,
        class: &ClassType,
        pointer: bool,
    ) -> Result<bool, ContractViolation> {
        if class.is_global() {
            return Ok(false);
        }

        let name = class.name();
        let pointer_fragment = pointer.then(|| format!("P{name}"));

        if let Some(index) = pointer_fragment
            .as_deref()
            .and_then(|fragment| self.compression.find(fragment))
        {
            emit_substitution(index, &mut self.out);
            return Ok(false);
        }

        if let Some(index) = self.compression.find(name) {
            if let Some(fragment) = pointer_fragment.as_deref() {
                self.compression.insert(fragment)?;
                self.out.push('P');
            }
            emit_substitution(index, &mut self.out);
            return Ok(false);
        }

        if pointer {
            self.out.push('P');
        }
        self.out.push('N');

        // Candidates are cumulative prefixes (`java`, `java/lang`, ...). A known
        // prefix is held back until the first unknown component shows up.
        let bytes = name.as_bytes();
        let mut pos = 0;
        let mut pending = None;
        while pos < bytes.len() {
            while pos < bytes.len() && bytes[pos] == b'/' {
                pos += 1;
            }
            let start = pos;
            while pos < bytes.len() && bytes[pos] != b'/' {
                pos += 1;
            }
            let component = &name[start..pos];
            let prefix = &name[..pos];

            if let Some(index) = self.compression.find(prefix) {
                pending = Some(index);
                continue;
            }
            self.compression.insert(prefix)?;
            if let Some(index) = pending.take() {
                emit_substitution(index, &mut self.out);
            }
            let _ = write!(self.out, "{}{component}", component.len());
        }
        if let Some(index) = pending {
            emit_substitution(index, &mut self.out);
        }

        if let Some(fragment) = pointer_fragment.as_deref() {
            // The bare class entry was recorded above; the pointer entry goes after it.
            debug_assert!(self.compression.find(fragment).is_none());
            self.compression.insert(fragment)?;
        }

        Ok(true)
    }
}
