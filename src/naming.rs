//! Naming-convention engine.
//!
//! Raw names arrive as space-separated lowercase words (the schema parser's
//! normalized form). Each target configures six independent slots — file,
//! class, member, reader, writer, parameter — as a case rule plus optional
//! fixed prefix/suffix. Reserved-word handling is data: a substitution
//! table supplied by the backend, consulted uniformly after formatting.

use crate::error::GenError;
use convert_case::{Case, Casing};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Case conversion applied by a naming slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CaseRule {
    LowerSnake,
    UpperSnake,
    LowerCamel,
    UpperCamel,
    Kebab,
    Flat,
}

impl CaseRule {
    pub fn apply(&self, raw: &str) -> String {
        let case = match self {
            CaseRule::LowerSnake => Case::Snake,
            CaseRule::UpperSnake => Case::UpperSnake,
            CaseRule::LowerCamel => Case::Camel,
            CaseRule::UpperCamel => Case::Pascal,
            CaseRule::Kebab => Case::Kebab,
            CaseRule::Flat => Case::Flat,
        };
        raw.to_case(case)
    }
}

/// One naming slot: case rule plus optional fixed prefix/suffix.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NamingSlot {
    pub case: CaseRule,
    #[serde(default)]
    pub prefix: Option<String>,
    #[serde(default)]
    pub suffix: Option<String>,
}

impl NamingSlot {
    pub fn new(case: CaseRule) -> NamingSlot {
        NamingSlot { case, prefix: None, suffix: None }
    }

    pub fn with_prefix(mut self, prefix: &str) -> NamingSlot {
        self.prefix = Some(prefix.to_string());
        self
    }

    pub fn with_suffix(mut self, suffix: &str) -> NamingSlot {
        self.suffix = Some(suffix.to_string());
        self
    }

    fn format(&self, raw: &str) -> String {
        let mut out = String::new();
        if let Some(ref prefix) = self.prefix {
            out.push_str(prefix);
        }
        out.push_str(&self.case.apply(raw));
        if let Some(ref suffix) = self.suffix {
            out.push_str(suffix);
        }
        out
    }
}

/// Per-target naming configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NamingConfig {
    pub file: NamingSlot,
    pub class: NamingSlot,
    pub member: NamingSlot,
    pub reader: NamingSlot,
    pub writer: NamingSlot,
    pub parameter: NamingSlot,
    /// Reserved words for the target, each with its deterministic
    /// substitute. Disambiguation data, not algorithmic logic.
    #[serde(default)]
    pub reserved: IndexMap<String, String>,
}

impl NamingConfig {
    /// File names are paths, not identifiers: no reserved-word lookup.
    pub fn file_name(&self, raw: &str) -> String {
        self.file.format(raw)
    }

    pub fn class_name(&self, raw: &str) -> Result<String, GenError> {
        self.resolve(self.class.format(raw))
    }

    pub fn member_name(&self, raw: &str) -> Result<String, GenError> {
        self.resolve(self.member.format(raw))
    }

    pub fn reader_name(&self, raw: &str) -> Result<String, GenError> {
        self.resolve(self.reader.format(raw))
    }

    pub fn writer_name(&self, raw: &str) -> Result<String, GenError> {
        self.resolve(self.writer.format(raw))
    }

    pub fn parameter_name(&self, raw: &str) -> Result<String, GenError> {
        self.resolve(self.parameter.format(raw))
    }

    /// Apply the reserved-word table. A formatted name that matches a
    /// reserved word is replaced by its substitute; a substitute that is
    /// itself reserved has no resolution.
    fn resolve(&self, name: String) -> Result<String, GenError> {
        match self.reserved.get(&name) {
            None => Ok(name),
            Some(substitute) => {
                if self.reserved.contains_key(substitute) {
                    Err(GenError::NamingCollision { name })
                } else {
                    Ok(substitute.clone())
                }
            }
        }
    }
}

/// Self-reference rule: a member-level name that equals its enclosing
/// class name gets a trailing underscore. Backends apply this where their
/// target forbids the collision, and decide whether the comparison is
/// case-sensitive (C++ only clashes on the exact constructor name; C#-like
/// conventions clash case-insensitively).
pub fn avoid_self_collision(name: &str, class_name: &str, ignore_case: bool) -> String {
    let collides = if ignore_case {
        name.eq_ignore_ascii_case(class_name)
    } else {
        name == class_name
    };
    if collides {
        format!("{}_", name)
    } else {
        name.to_string()
    }
}
