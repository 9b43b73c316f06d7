use std::collections::{HashMap, HashSet};

pub type PrimitiveId = usize;

/// Descriptor recorded in the primitive registry.
#[derive(Clone, Debug)]
pub struct PrimitiveDescriptor {
    pub primitive_name: String,
    pub aliases: Vec<String>,
    /// Single-letter JVM descriptor code (`I` for `int`), when the type has one.
    pub descriptor_code: Option<char>,
}

/// Registration failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrimitiveRegistrationError {
    pub message: String,
}

impl PrimitiveRegistrationError {
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl std::fmt::Display for PrimitiveRegistrationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for PrimitiveRegistrationError {}

/// The primitive types known to the type system, addressable by name, alias,
/// or descriptor code.
#[derive(Clone, Debug, Default)]
pub struct PrimitiveRegistry {
    descriptors: Vec<PrimitiveDescriptor>,
    lookup: HashMap<String, PrimitiveId>,
    by_code: HashMap<char, PrimitiveId>,
}

impl PrimitiveRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry pre-populated with the eight Java primitive types.
    #[must_use]
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        for builtin in builtin_descriptors() {
            let _ = registry.register(builtin);
        }
        registry
    }

    #[must_use]
    pub fn descriptors(&self) -> &[PrimitiveDescriptor] {
        &self.descriptors
    }

    pub fn register(
        &mut self,
        mut desc: PrimitiveDescriptor,
    ) -> Result<PrimitiveId, PrimitiveRegistrationError> {
        desc.primitive_name = normalize_name(&desc.primitive_name).ok_or_else(|| {
            PrimitiveRegistrationError::new("primitive name must not be empty")
        })?;

        let mut all_aliases = HashSet::new();
        all_aliases.insert(desc.primitive_name.clone());
        for alias in &desc.aliases {
            if let Some(normalized) = normalize_name(alias) {
                all_aliases.insert(normalized);
            }
        }

        for alias in &all_aliases {
            if self.lookup.contains_key(alias) {
                return Err(PrimitiveRegistrationError::new(format!(
                    "duplicate primitive alias `{alias}`"
                )));
            }
        }
        if let Some(code) = desc.descriptor_code {
            if let Some(existing) = self.by_code.get(&code) {
                let owner = self
                    .descriptors
                    .get(*existing)
                    .map_or("<unknown>", |existing| existing.primitive_name.as_str());
                return Err(PrimitiveRegistrationError::new(format!(
                    "descriptor code `{code}` already belongs to `{owner}`"
                )));
            }
        }

        let id = self.descriptors.len();
        if let Some(code) = desc.descriptor_code {
            self.by_code.insert(code, id);
        }
        let mut aliases: Vec<String> = all_aliases.into_iter().collect();
        aliases.sort();
        for alias in &aliases {
            self.lookup.insert(alias.clone(), id);
        }
        desc.aliases = aliases;
        self.descriptors.push(desc);
        Ok(id)
    }

    #[must_use]
    pub fn lookup_by_name(&self, name: &str) -> Option<PrimitiveId> {
        let normalized = normalize_name(name)?;
        self.lookup.get(&normalized).copied()
    }

    #[must_use]
    pub fn lookup_by_code(&self, code: char) -> Option<PrimitiveId> {
        self.by_code.get(&code).copied()
    }

    #[must_use]
    pub fn descriptor(&self, id: PrimitiveId) -> Option<&PrimitiveDescriptor> {
        self.descriptors.get(id)
    }

    /// Canonical name of `id`, or a placeholder for ids this registry never issued.
    #[must_use]
    pub fn display_name(&self, id: PrimitiveId) -> String {
        self.descriptor(id).map_or_else(
            || format!("<primitive #{id}>"),
            |desc| desc.primitive_name.clone(),
        )
    }
}

/// Normalise a primitive name or alias.
#[must_use]
pub fn normalize_name(name: &str) -> Option<String> {
    let trimmed = name.trim();
    if trimmed.is_empty() || trimmed.contains(['*', '/', '[']) {
        return None;
    }
    let lowered = trimmed.to_ascii_lowercase();
    let last = lowered.rsplit('.').next()?;
    if last.is_empty() {
        return None;
    }
    Some(last.to_string())
}

fn builtin_descriptors() -> Vec<PrimitiveDescriptor> {
    vec![
        PrimitiveDescriptor {
            primitive_name: "boolean".into(),
            aliases: vec!["bool".into(), "jboolean".into()],
            descriptor_code: Some('Z'),
        },
        PrimitiveDescriptor {
            primitive_name: "byte".into(),
            aliases: vec!["jbyte".into(), "i8".into()],
            descriptor_code: Some('B'),
        },
        PrimitiveDescriptor {
            primitive_name: "char".into(),
            aliases: vec!["jchar".into()],
            descriptor_code: Some('C'),
        },
        PrimitiveDescriptor {
            primitive_name: "short".into(),
            aliases: vec!["jshort".into(), "i16".into()],
            descriptor_code: Some('S'),
        },
        PrimitiveDescriptor {
            primitive_name: "int".into(),
            aliases: vec!["jint".into(), "i32".into()],
            descriptor_code: Some('I'),
        },
        PrimitiveDescriptor {
            primitive_name: "long".into(),
            aliases: vec!["jlong".into(), "i64".into()],
            descriptor_code: Some('J'),
        },
        PrimitiveDescriptor {
            primitive_name: "float".into(),
            aliases: vec!["jfloat".into(), "f32".into()],
            descriptor_code: Some('F'),
        },
        PrimitiveDescriptor {
            primitive_name: "double".into(),
            aliases: vec!["jdouble".into(), "f64".into()],
            descriptor_code: Some('D'),
        },
    ]
}
