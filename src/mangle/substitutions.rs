use std::collections::HashMap;

use tracing::debug;

use crate::error::ContractViolation;

/// Fixed mangled spellings for plain entity names, e.g. `<init>` → `C1`.
///
/// At most one spelling per name. Entries live as long as the registry.
#[derive(Debug, Clone, Default)]
pub struct NameSubstitutions {
    entries: HashMap<String, String>,
}

impl NameSubstitutions {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Pin `name` to `mangled`. A second registration for the same name fails,
    /// whatever its spelling.
    pub fn insert(
        &mut self,
        name: impl Into<String>,
        mangled: impl Into<String>,
    ) -> Result<(), ContractViolation> {
        let name = name.into();
        if self.entries.contains_key(&name) {
            return Err(ContractViolation::DuplicateNameSubstitution { name });
        }
        let mangled = mangled.into();
        debug!(target: "mangle", name = %name, mangled = %mangled, "name substitution");
        self.entries.insert(name, mangled);
        Ok(())
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries.get(name).map(String::as_str)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
