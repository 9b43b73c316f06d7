//! Batch manifests: a YAML list of entities and vtables to mangle in one run.
//!
//! ```yaml
//! entities:
//!   - owner: java/lang/Object
//!     name: equals.(Ljava/lang/Object;)Z
//!   - owner: java/lang/Integer
//!     name: MAX_VALUE
//!     descriptor: I
//!     static: true
//! vtables:
//!   - java/lang/Object
//! ```

use std::fs;
use std::path::Path;

use serde::Deserialize;
use tracing::{debug, info_span};

use crate::descriptor::{DescriptorError, embedded_descriptor, entity_from_descriptor};
use crate::error::{Error, Result};
use crate::ident::Ident;
use crate::mangle::Mangler;
use crate::primitives::PrimitiveRegistry;
use crate::types::{Allocation, ClassType, Entity};

/// Spelling of the root class in manifests and on the command line.
pub const GLOBAL_OWNER: &str = "<global>";

/// Resolve an owner string to a class; `<global>` and the empty string name
/// the root class.
#[must_use]
pub fn owner_class(owner: &str) -> ClassType {
    if owner.is_empty() || owner == GLOBAL_OWNER {
        ClassType::global()
    } else {
        ClassType::new(owner)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EntityEntry {
    pub owner: String,
    pub name: String,
    #[serde(default)]
    pub descriptor: Option<String>,
    #[serde(default, rename = "static")]
    pub is_static: bool,
}

impl EntityEntry {
    fn allocation(&self) -> Allocation {
        if self.is_static {
            Allocation::Static
        } else {
            Allocation::Instance
        }
    }

    /// Build the entity; an explicit `descriptor` wins over one embedded in
    /// `name`.
    pub fn to_entity(&self, primitives: &PrimitiveRegistry) -> Result<Entity> {
        let descriptor = self
            .descriptor
            .as_deref()
            .or_else(|| embedded_descriptor(&self.name))
            .ok_or_else(|| {
                DescriptorError::new(&self.name, self.name.len(), "missing descriptor")
            })?;
        let entity = entity_from_descriptor(
            owner_class(&self.owner),
            &self.name,
            descriptor,
            self.allocation(),
            primitives,
        )?;
        Ok(entity)
    }

    fn describe(&self) -> String {
        let owner = if self.owner.is_empty() {
            GLOBAL_OWNER
        } else {
            self.owner.as_str()
        };
        let mut text = format!("{owner}.{}", self.name);
        if let Some(descriptor) = &self.descriptor {
            text.push(' ');
            text.push_str(descriptor);
        }
        if self.is_static {
            text.push_str(" (static)");
        }
        text
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BatchManifest {
    #[serde(default)]
    pub entities: Vec<EntityEntry>,
    #[serde(default)]
    pub vtables: Vec<String>,
}

/// One mangled manifest entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchSymbol {
    pub symbol: Ident,
    pub description: String,
}

impl BatchManifest {
    pub fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path).map_err(|err| {
            Error::config(format!(
                "failed to read manifest `{}`: {err}",
                path.display()
            ))
        })?;
        Self::from_yaml_str(&contents).map_err(|err| match err {
            Error::Config { message } => {
                Error::config(format!("{message} (in `{}`)", path.display()))
            }
            other => other,
        })
    }

    pub fn from_yaml_str(contents: &str) -> Result<Self> {
        if contents.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(contents)
            .map_err(|err| Error::config(format!("failed to parse manifest: {err}")))
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entities.is_empty() && self.vtables.is_empty()
    }

    /// Mangle entities first, then vtables, in document order. Stops at the
    /// first error.
    pub fn mangle_all(&self, mangler: &mut Mangler<'_>) -> Result<Vec<BatchSymbol>> {
        let span = info_span!(
            target: "mangle",
            "batch",
            entities = self.entities.len(),
            vtables = self.vtables.len()
        );
        let _guard = span.enter();

        let mut symbols = Vec::with_capacity(self.entities.len() + self.vtables.len());
        for entry in &self.entities {
            let entity = entry.to_entity(mangler.tables().primitives())?;
            symbols.push(BatchSymbol {
                symbol: mangler.mangle_entity_name(&entity)?,
                description: entry.describe(),
            });
        }
        for class in &self.vtables {
            symbols.push(BatchSymbol {
                symbol: mangler.mangle_vtable_name(&owner_class(class))?,
                description: format!("vtable for {class}"),
            });
        }
        debug!(target: "mangle", symbols = symbols.len(), "batch complete");
        Ok(symbols)
    }
}

#[cfg(test)]
mod tests {
    use expect_test::expect;

    use super::*;
    use crate::config::ManglerConfig;
    use crate::error::ContractViolation;

    const SAMPLE: &str = r"
entities:
  - owner: java/lang/Object
    name: equals.(Ljava/lang/Object;)Z
  - owner: java/lang/Integer
    name: MAX_VALUE
    descriptor: I
    static: true
  - owner: <global>
    name: main
    descriptor: ([Ljava/lang/String;)V
    static: true
vtables:
  - java/lang/Object
";

    #[test]
    fn parses_entities_and_vtables() {
        let manifest = BatchManifest::from_yaml_str(SAMPLE).unwrap();
        assert_eq!(manifest.entities.len(), 3);
        assert!(manifest.entities[1].is_static);
        assert_eq!(manifest.entities[1].descriptor.as_deref(), Some("I"));
        assert_eq!(manifest.vtables, vec!["java/lang/Object".to_string()]);
    }

    #[test]
    fn mangles_in_document_order() {
        let tables = ManglerConfig::java_defaults()
            .build_tables(PrimitiveRegistry::with_builtins())
            .unwrap();
        let mut mangler = Mangler::new(&tables);
        let manifest = BatchManifest::from_yaml_str(SAMPLE).unwrap();
        let rendered = manifest
            .mangle_all(&mut mangler)
            .unwrap()
            .iter()
            .map(|entry| format!("{}\t{}", entry.symbol, entry.description))
            .collect::<Vec<_>>()
            .join("\n");
        expect![[r#"
            _ZN4java4lang6Object6equalsEJbPS1_	java/lang/Object.equals.(Ljava/lang/Object;)Z
            _ZN4java4lang7Integer9MAX_VALUEE	java/lang/Integer.MAX_VALUE I (static)
            _Z4mainEJvP6JArrayIPN4java4lang6StringEE	<global>.main ([Ljava/lang/String;)V (static)
            _ZTVN4java4lang6ObjectE	vtable for java/lang/Object"#]]
        .assert_eq(&rendered);
    }

    #[test]
    fn entity_without_descriptor_is_rejected() {
        let manifest =
            BatchManifest::from_yaml_str("entities:\n  - owner: A\n    name: count\n").unwrap();
        let err = manifest.entities[0]
            .to_entity(&PrimitiveRegistry::with_builtins())
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "descriptor error: missing descriptor at offset 5 in `count`"
        );
    }

    #[test]
    fn global_vtable_fails_the_batch() {
        let tables = ManglerConfig::java_defaults()
            .build_tables(PrimitiveRegistry::with_builtins())
            .unwrap();
        let mut mangler = Mangler::new(&tables);
        let manifest = BatchManifest::from_yaml_str("vtables: [\"<global>\"]\n").unwrap();
        let err = manifest.mangle_all(&mut mangler).unwrap_err();
        assert!(matches!(
            err.violation(),
            Some(ContractViolation::VtableWithoutComposite { .. })
        ));
    }

    #[test]
    fn empty_document_is_an_empty_manifest() {
        assert!(BatchManifest::from_yaml_str("  \n").unwrap().is_empty());
    }

    #[test]
    fn unknown_fields_are_config_errors() {
        let err = BatchManifest::from_yaml_str("entites: []\n").unwrap_err();
        assert!(matches!(err, Error::Config { .. }), "got {err}");
    }
}
