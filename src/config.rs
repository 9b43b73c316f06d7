use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde::Deserialize;
use tracing::debug;

use crate::error::{Error, Result};
use crate::mangle::{CONSTRUCTOR_NAME, ManglerTables};
use crate::primitives::PrimitiveRegistry;

/// Setup-time mangling configuration: primitive tags and pinned name spellings.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ManglerConfig {
    pub primitives: BTreeMap<String, String>,
    pub substitutions: Vec<(String, String)>,
}

impl ManglerConfig {
    /// Tags matching the C++ side of the Java runtime (`jint` is `i`, `jlong`
    /// is `x`, ...), with constructors spelled as complete-object ctors.
    #[must_use]
    pub fn java_defaults() -> Self {
        let primitives = [
            ("boolean", "b"),
            ("byte", "c"),
            ("char", "w"),
            ("short", "s"),
            ("int", "i"),
            ("long", "x"),
            ("float", "f"),
            ("double", "d"),
        ]
        .into_iter()
        .map(|(name, tag)| (name.to_string(), tag.to_string()))
        .collect();
        Self {
            primitives,
            substitutions: vec![(CONSTRUCTOR_NAME.to_string(), "C1".to_string())],
        }
    }

    /// Read a YAML configuration file layered over the Java defaults.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path).map_err(|err| {
            Error::config(format!(
                "failed to read mangler config `{}`: {err}",
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
        let yaml: serde_yaml::Value = serde_yaml::from_str(contents)
            .map_err(|err| Error::config(format!("failed to parse mangler config: {err}")))?;
        let section = match yaml {
            serde_yaml::Value::Mapping(ref mapping)
                if mapping.contains_key(&serde_yaml::Value::String("mangle".into())) =>
            {
                mapping
                    .get(&serde_yaml::Value::String("mangle".into()))
                    .cloned()
            }
            serde_yaml::Value::Mapping(_) => Some(yaml.clone()),
            serde_yaml::Value::Null => None,
            _ => {
                return Err(Error::config(
                    "mangler config must be a mapping of settings",
                ));
            }
        };
        let raw: RawConfigDocument = match section {
            Some(section) => serde_yaml::from_value(section).map_err(|err| {
                Error::config(format!("failed to parse mangler settings: {err}"))
            })?,
            None => RawConfigDocument::default(),
        };

        let mut config = if raw.inherit_defaults.unwrap_or(true) {
            Self::java_defaults()
        } else {
            Self::default()
        };
        config.primitives.extend(raw.primitives);
        for (name, mangled) in raw.substitutions {
            config.substitutions.push((name, mangled));
        }
        Ok(config)
    }

    /// Perform the setup calls: attach every primitive tag, register every
    /// substitution. A name listed twice is a contract violation.
    pub fn build_tables(&self, primitives: PrimitiveRegistry) -> Result<ManglerTables> {
        let mut tables = ManglerTables::new(primitives);
        for (name, tag) in &self.primitives {
            let id = tables
                .primitives()
                .lookup_by_name(name)
                .ok_or_else(|| Error::config(format!("unknown primitive type `{name}`")))?;
            if tag.is_empty() {
                return Err(Error::config(format!(
                    "primitive type `{name}` needs a non-empty tag"
                )));
            }
            tables.set_primitive_type_name(id, tag.as_str())?;
        }
        for (name, mangled) in &self.substitutions {
            tables.add_name_substitution(name.as_str(), mangled.as_str())?;
        }
        debug!(
            target: "mangle",
            primitives = self.primitives.len(),
            substitutions = self.substitutions.len(),
            "mangler tables ready"
        );
        Ok(tables)
    }
}

#[derive(Debug, Deserialize, Default)]
#[serde(deny_unknown_fields)]
struct RawConfigDocument {
    #[serde(default, alias = "inherit-defaults")]
    inherit_defaults: Option<bool>,
    #[serde(default)]
    primitives: BTreeMap<String, String>,
    #[serde(default)]
    substitutions: Vec<(String, String)>,
}
