use super::ManglerTables;
use super::compression::CompressionTable;

/// State for one top-level mangle call: the substitution candidates seen so
/// far and the symbol being built. Recursive encoders share it by `&mut`.
#[derive(Debug)]
pub(crate) struct MangleSession<'t> {
    pub(super) tables: &'t ManglerTables,
    pub(super) compression: CompressionTable,
    pub(super) out: String,
}

impl<'t> MangleSession<'t> {
    pub(crate) fn new(tables: &'t ManglerTables) -> Self {
        Self {
            tables,
            compression: CompressionTable::new(),
            out: String::with_capacity(128),
        }
    }

    /// Start a new symbol. Nothing from an earlier call survives.
    pub(super) fn begin(&mut self, prologue: &str) {
        self.compression.reset();
        self.out.clear();
        self.out.push_str(prologue);
    }

    pub(crate) fn output(&self) -> &str {
        &self.out
    }

    #[cfg(test)]
    pub(crate) fn fragments(&self) -> &[String] {
        self.compression.entries()
    }
}
