//! Interned identifiers for finished symbol names.

use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

/// Immutable, deduplicated symbol name.
///
/// Two idents produced by the same [`IdentTable`] for the same bytes share
/// one allocation.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Ident(Arc<str>);

impl Ident {
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[must_use]
    pub fn ptr_eq(&self, other: &Ident) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl fmt::Debug for Ident {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Ident({:?})", &*self.0)
    }
}

impl fmt::Display for Ident {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Ident {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl PartialEq<str> for Ident {
    fn eq(&self, other: &str) -> bool {
        &*self.0 == other
    }
}

impl PartialEq<&str> for Ident {
    fn eq(&self, other: &&str) -> bool {
        &*self.0 == *other
    }
}

#[derive(Debug, Default)]
pub struct IdentTable {
    idents: HashSet<Arc<str>>,
}

impl IdentTable {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn intern(&mut self, text: &str) -> Ident {
        if let Some(existing) = self.idents.get(text) {
            return Ident(Arc::clone(existing));
        }
        let stored: Arc<str> = Arc::from(text);
        self.idents.insert(Arc::clone(&stored));
        Ident(stored)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.idents.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.idents.is_empty()
    }
}
