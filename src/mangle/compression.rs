//! Substitution candidates for one mangling session.
//!
//! The Itanium ABI compresses names structurally: the first occurrence of a
//! fragment is spelled out and recorded, later occurrences are replaced by a
//! back-reference to its position. Insertion order and lookup order therefore
//! have to match a reference encoder exactly.

use tracing::trace;

use crate::error::ContractViolation;

/// Digits used for back-reference indices.
const BASE36: &[u8; 36] = b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZ";

/// Number of fragments one session may record. Matches the range of the
/// one-digit back-reference encoding, so every recorded index is emittable.
pub const CAPACITY: usize = 36;

/// Ordered, append-only list of emitted fragments.
#[derive(Debug, Default)]
pub struct CompressionTable {
    entries: Vec<String>,
}

impl CompressionTable {
    #[must_use]
    pub fn new() -> Self {
        Self {
            entries: Vec::with_capacity(CAPACITY),
        }
    }

    pub fn reset(&mut self) {
        trace!(target: "mangle", discarded = self.entries.len(), "compression table reset");
        self.entries.clear();
    }

    /// Oldest index whose fragment equals `fragment`.
    #[must_use]
    pub fn find(&self, fragment: &str) -> Option<usize> {
        self.entries.iter().position(|entry| entry == fragment)
    }

    pub fn insert(&mut self, fragment: &str) -> Result<usize, ContractViolation> {
        if self.entries.len() >= CAPACITY {
            return Err(ContractViolation::CompressionTableOverflow {
                fragment: fragment.to_string(),
                capacity: CAPACITY,
            });
        }
        let index = self.entries.len();
        trace!(target: "mangle", index, fragment, "compression entry");
        self.entries.push(fragment.to_string());
        Ok(index)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[must_use]
    pub fn entries(&self) -> &[String] {
        &self.entries
    }
}

/// Append the back-reference for table position `index`: `S_` for the first
/// entry, `S<base36(index - 1)>_` after that.
///
/// Only indices below [`CAPACITY`] are encodable with one digit, and the
/// table never hands out larger ones.
pub fn emit_substitution(index: usize, out: &mut String) {
    debug_assert!(index < CAPACITY, "substitution index {index} not encodable");
    trace!(target: "mangle", index, "substitution");
    out.push('S');
    if index > 0 {
        out.push(char::from(BASE36[index - 1]));
    }
    out.push('_');
}

#[cfg(test)]
mod tests {
    use std::io;
    use std::sync::{Arc, Mutex};

    use super::*;

    #[derive(Clone, Default)]
    struct CapturedLog(Arc<Mutex<Vec<u8>>>);

    impl io::Write for CapturedLog {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0
                .lock()
                .unwrap_or_else(|poisoned| poisoned.into_inner())
                .extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    impl CapturedLog {
        fn contents(&self) -> String {
            let bytes = self.0.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
            String::from_utf8_lossy(&bytes).into_owned()
        }
    }

    fn substitution(index: usize) -> String {
        let mut out = String::new();
        emit_substitution(index, &mut out);
        out
    }

    #[test]
    fn back_references_use_base36_offsets() {
        assert_eq!(substitution(0), "S_");
        assert_eq!(substitution(1), "S0_");
        assert_eq!(substitution(10), "S9_");
        assert_eq!(substitution(11), "SA_");
        assert_eq!(substitution(35), "SY_");
    }

    #[test]
    fn find_returns_oldest_match() {
        let mut table = CompressionTable::new();
        table.insert("java").unwrap();
        table.insert("java/lang").unwrap();
        table.insert("java").unwrap();
        assert_eq!(table.find("java"), Some(0));
        assert_eq!(table.find("java/lang"), Some(1));
        assert_eq!(table.find("java/lan"), None);
    }

    #[test]
    fn reset_clears_everything() {
        let mut table = CompressionTable::new();
        table.insert("JArray").unwrap();
        table.reset();
        assert!(table.is_empty());
        assert_eq!(table.find("JArray"), None);
        assert_eq!(table.insert("java").unwrap(), 0);
    }

    #[test]
    fn insert_past_capacity_is_a_contract_violation() {
        let mut table = CompressionTable::new();
        for index in 0..CAPACITY {
            assert_eq!(table.insert(&format!("c{index}")).unwrap(), index);
        }
        let err = table.insert("overflow").unwrap_err();
        assert_eq!(
            err,
            ContractViolation::CompressionTableOverflow {
                fragment: "overflow".into(),
                capacity: CAPACITY,
            }
        );
        assert_eq!(table.len(), CAPACITY);
    }

    #[test]
    fn reset_and_emission_are_traced() {
        let log = CapturedLog::default();
        let writer = log.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_max_level(tracing::Level::TRACE)
            .with_ansi(false)
            .with_writer(move || writer.clone())
            .finish();

        tracing::subscriber::with_default(subscriber, || {
            let mut table = CompressionTable::new();
            table.insert("java").unwrap();
            table.reset();
            let mut out = String::new();
            emit_substitution(2, &mut out);
            assert_eq!(out, "S1_");
        });

        let output = log.contents();
        assert!(output.contains("compression entry"), "{output}");
        assert!(output.contains("compression table reset"), "{output}");
        assert!(output.contains("discarded=1"), "{output}");
        assert!(output.contains("substitution index=2"), "{output}");
    }
}
