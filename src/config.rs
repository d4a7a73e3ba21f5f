//! Per-backend configuration surface.
//!
//! Everything a backend needs beyond syntax templates is data: the naming
//! slots, the semantic-type mapping table, and file extensions. Configs are
//! plain serde structures, so a target can be retuned from YAML without
//! touching code, and tests can construct isolated configs.

use crate::error::GenError;
use crate::naming::NamingConfig;
use crate::types::ColumnType;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// One row of a backend's type-mapping table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TypeEntry {
    /// Target-language type name.
    #[serde(rename = "type")]
    pub target_type: String,
    /// Default value literal, where the target needs one.
    #[serde(default)]
    pub default: Option<String>,
    /// Positional ORM read accessor.
    #[serde(default)]
    pub read: Option<String>,
    /// Text-to-value conversion for delimited-text ingestion.
    #[serde(default)]
    pub convert: Option<String>,
}

impl TypeEntry {
    pub fn new(target_type: &str) -> TypeEntry {
        TypeEntry {
            target_type: target_type.to_string(),
            default: None,
            read: None,
            convert: None,
        }
    }

    pub fn with_default(mut self, default: &str) -> TypeEntry {
        self.default = Some(default.to_string());
        self
    }

    pub fn with_read(mut self, read: &str) -> TypeEntry {
        self.read = Some(read.to_string());
        self
    }

    pub fn with_convert(mut self, convert: &str) -> TypeEntry {
        self.convert = Some(convert.to_string());
        self
    }
}

/// Exhaustive mapping from semantic type (and parameters) to target
/// entries. Missing entries surface as mapping errors, never as silent
/// defaults.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TypeMap {
    /// Keyed by bit width. Lookup picks the exact width or the next larger
    /// one present; there is no other widening.
    #[serde(default)]
    pub integer: IndexMap<u8, TypeEntry>,
    /// Keyed by `single` / `double`, mapped 1:1.
    #[serde(default)]
    pub float: IndexMap<String, TypeEntry>,
    #[serde(default)]
    pub text: Option<TypeEntry>,
    #[serde(default)]
    pub datetime: Option<TypeEntry>,
    #[serde(default)]
    pub boolean: Option<TypeEntry>,
    #[serde(default)]
    pub currency: Option<TypeEntry>,
}

impl TypeMap {
    /// Look up the entry for a semantic type.
    ///
    /// `ClassRef` is deliberately absent from the table: referenced classes
    /// resolve through the naming engine, and a backend that asks the table
    /// for one gets a mapping error.
    pub fn entry(&self, backend: &str, ty: &ColumnType) -> Result<&TypeEntry, GenError> {
        let missing = || GenError::MissingTypeMapping {
            backend: backend.to_string(),
            ty: ty.to_string(),
        };
        match ty {
            ColumnType::Integer { width } => {
                let bits = width.bits();
                if let Some(entry) = self.integer.get(&bits) {
                    return Ok(entry);
                }
                // Next-larger native integer of matching signedness.
                let mut widths: Vec<u8> = self.integer.keys().copied().collect();
                widths.sort_unstable();
                widths
                    .into_iter()
                    .find(|w| *w > bits)
                    .and_then(|w| self.integer.get(&w))
                    .ok_or_else(missing)
            }
            ColumnType::Float { precision } => {
                self.float.get(precision.key()).ok_or_else(missing)
            }
            ColumnType::Text { .. } => self.text.as_ref().ok_or_else(missing),
            ColumnType::DateTime => self.datetime.as_ref().ok_or_else(missing),
            ColumnType::Boolean => self.boolean.as_ref().ok_or_else(missing),
            ColumnType::Currency => self.currency.as_ref().ok_or_else(missing),
            ColumnType::ClassRef { .. } => Err(missing()),
        }
    }

    /// The positional read accessor for a type; absence is a mapping error
    /// for persistence-capable backends.
    pub fn read_accessor(&self, backend: &str, ty: &ColumnType) -> Result<&str, GenError> {
        let entry = self.entry(backend, ty)?;
        entry.read.as_deref().ok_or_else(|| GenError::MissingTypeMapping {
            backend: backend.to_string(),
            ty: format!("{} (read accessor)", ty),
        })
    }
}

/// Full configuration for one backend invocation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackendConfig {
    pub naming: NamingConfig,
    pub types: TypeMap,
    /// Extension for header-style artifacts, where the target has them.
    #[serde(default)]
    pub header_ext: Option<String>,
    pub source_ext: String,
}

impl BackendConfig {
    /// Load a backend configuration from YAML text.
    pub fn from_yaml(yaml: &str) -> Result<BackendConfig, serde_yaml::Error> {
        serde_yaml::from_str(yaml)
    }

    pub fn to_yaml(&self) -> Result<String, serde_yaml::Error> {
        serde_yaml::to_string(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{ColumnType, FloatPrecision, IntWidth};

    fn table() -> TypeMap {
        let mut integer = IndexMap::new();
        integer.insert(16, TypeEntry::new("short").with_read("GetShort"));
        integer.insert(64, TypeEntry::new("long").with_read("GetLong"));
        let mut float = IndexMap::new();
        float.insert("double".to_string(), TypeEntry::new("double"));
        TypeMap {
            integer,
            float,
            text: Some(TypeEntry::new("string").with_read("GetText")),
            datetime: None,
            boolean: Some(TypeEntry::new("bool")),
            currency: None,
        }
    }

    #[test]
    fn test_exact_integer_lookup() {
        let map = table();
        let entry = map.entry("t", &ColumnType::integer(IntWidth::W16)).unwrap();
        assert_eq!(entry.target_type, "short");
    }

    #[test]
    fn test_next_larger_integer_width() {
        let map = table();
        // No 32-bit entry: the 64-bit one is the next larger native width.
        let entry = map.entry("t", &ColumnType::integer(IntWidth::W32)).unwrap();
        assert_eq!(entry.target_type, "long");
    }

    #[test]
    fn test_missing_entry_is_mapping_error() {
        let map = table();
        assert!(matches!(
            map.entry("t", &ColumnType::DateTime),
            Err(GenError::MissingTypeMapping { .. })
        ));
        assert!(matches!(
            map.entry("t", &ColumnType::float(FloatPrecision::Single)),
            Err(GenError::MissingTypeMapping { .. })
        ));
    }

    #[test]
    fn test_class_ref_never_maps_through_table() {
        let map = table();
        let ty = ColumnType::ClassRef { class_name: "Team".to_string() };
        assert!(map.entry("t", &ty).is_err());
    }

    #[test]
    fn test_missing_read_accessor() {
        let map = table();
        assert_eq!(map.read_accessor("t", &ColumnType::text(None)).unwrap(), "GetText");
        assert!(map.read_accessor("t", &ColumnType::Boolean).is_err());
    }

    #[test]
    fn test_type_map_round_trips_through_yaml() {
        let map = table();
        let yaml = serde_yaml::to_string(&map).unwrap();
        let back: TypeMap = serde_yaml::from_str(&yaml).unwrap();
        let entry = back.entry("t", &ColumnType::integer(IntWidth::W64)).unwrap();
        assert_eq!(entry.read.as_deref(), Some("GetLong"));
    }
}
