//! Python backend.
//!
//! Emits one module per class: a `@dataclass` whose fields sit in column
//! order, each carrying the raw column name in its field metadata, plus a
//! `from_row` classmethod that performs the positional reads. Row access is
//! 0-based; one access per member, in order.

use crate::backend::{package_dir, Backend, GeneratedFile};
use crate::config::{BackendConfig, TypeEntry};
use crate::error::GenError;
use crate::model::{Clss, Member};
use crate::naming::{CaseRule, NamingConfig, NamingSlot};
use crate::types::ColumnType;
use indexmap::IndexMap;

/// Default Python backend configuration: snake_case throughout, keyword
/// escapes with a trailing underscore, builtin constructors as converters.
pub fn default_config() -> BackendConfig {
    let mut reserved = IndexMap::new();
    for word in [
        "and", "as", "assert", "break", "class", "continue", "def", "del", "elif", "else",
        "except", "finally", "for", "from", "global", "if", "import", "in", "is", "lambda",
        "nonlocal", "not", "or", "pass", "raise", "return", "try", "while", "with", "yield",
    ] {
        reserved.insert(word.to_string(), format!("{}_", word));
    }

    let naming = NamingConfig {
        file: NamingSlot::new(CaseRule::LowerSnake),
        class: NamingSlot::new(CaseRule::UpperCamel),
        member: NamingSlot::new(CaseRule::LowerSnake),
        reader: NamingSlot::new(CaseRule::LowerSnake),
        writer: NamingSlot::new(CaseRule::LowerSnake).with_prefix("set_"),
        parameter: NamingSlot::new(CaseRule::LowerSnake),
        reserved,
    };

    let mut integer = IndexMap::new();
    // One native width; every declared width funnels into it.
    integer.insert(64, TypeEntry::new("int").with_convert("int"));
    let mut float = IndexMap::new();
    float.insert("single".to_string(), TypeEntry::new("float").with_convert("float"));
    float.insert("double".to_string(), TypeEntry::new("float").with_convert("float"));

    let types = crate::config::TypeMap {
        integer,
        float,
        text: Some(TypeEntry::new("str").with_convert("str")),
        // Drivers hand datetimes over already constructed.
        datetime: Some(TypeEntry::new("datetime")),
        boolean: Some(TypeEntry::new("bool").with_convert("bool")),
        currency: Some(TypeEntry::new("int").with_convert("int")),
    };

    BackendConfig { naming, types, header_ext: None, source_ext: "py".to_string() }
}

pub struct PythonBackend {
    config: BackendConfig,
}

impl PythonBackend {
    pub fn new(config: BackendConfig) -> PythonBackend {
        PythonBackend { config }
    }

    /// Python identifiers cannot start with a digit; such class names get a
    /// `T` prefix.
    fn class_name(&self, clss: &Clss) -> Result<String, GenError> {
        let name = self.config.naming.class_name(clss.class_name())?;
        if name.chars().next().is_some_and(|c| c.is_ascii_digit()) {
            Ok(format!("T{}", name))
        } else {
            Ok(name)
        }
    }

    /// Dataclass field name; private members are underscore-prefixed and
    /// exposed through a property.
    fn field_name(&self, member: &Member) -> Result<String, GenError> {
        let name = self.config.naming.member_name(member.member_name())?;
        if member.private() {
            Ok(format!("_{}", name))
        } else {
            Ok(name)
        }
    }

    fn annotation(&self, member: &Member) -> Result<String, GenError> {
        let base = match member.ty() {
            ColumnType::ClassRef { class_name } => self.config.naming.class_name(class_name)?,
            ty => self.config.types.entry(self.id(), ty)?.target_type.clone(),
        };
        if member.optional() {
            Ok(format!("Optional[{}]", base))
        } else {
            Ok(base)
        }
    }

    /// One positional read: `row[<index>]`, run through the type's
    /// converter, null-checked only for optional members.
    fn row_read(&self, member: &Member, index: usize) -> Result<String, GenError> {
        let cell = format!("row[{}]", index);
        let convert = self.config.types.entry(self.id(), member.ty())?.convert.as_deref();
        let value = match convert {
            Some(func) => format!("{}({})", func, cell),
            None => cell.clone(),
        };
        if member.optional() {
            Ok(format!("{} if {} is not None else None", value, cell))
        } else {
            Ok(value)
        }
    }

    fn module(&self, clss: &Clss, class_name: &str) -> Result<String, GenError> {
        let naming = &self.config.naming;
        let members = clss.members();
        let has_optional = members.iter().any(|m| m.optional());
        let has_datetime = members.iter().any(|m| matches!(m.ty(), ColumnType::DateTime));

        let mut out: Vec<String> = Vec::new();
        out.push("from dataclasses import dataclass, field".to_string());
        if has_datetime {
            out.push("from datetime import datetime".to_string());
        }
        if has_optional {
            out.push("from typing import Optional".to_string());
        }
        out.push(String::new());
        let comment = clss.schema_comment("#");
        if !comment.is_empty() {
            out.push(comment);
            out.push(String::new());
        }
        out.push(String::new());
        out.push("@dataclass".to_string());
        out.push(format!("class {}:", class_name));
        for member in members {
            out.push(format!(
                "    {}: {} = field(metadata={{\"column\": \"{}\"}})",
                self.field_name(member)?,
                self.annotation(member)?,
                member.column_name()
            ));
        }

        for member in members.iter().filter(|m| m.private()) {
            let prop = naming.reader_name(member.member_name())?;
            let store = self.field_name(member)?;
            out.push(String::new());
            out.push("    @property".to_string());
            out.push(format!("    def {}(self):", prop));
            out.push(format!("        return self.{}", store));
            out.push(String::new());
            out.push(format!("    @{}.setter", prop));
            out.push(format!("    def {}(self, value):", prop));
            out.push(format!("        self.{} = value", store));
        }

        out.push(String::new());
        out.push("    @classmethod".to_string());
        out.push(format!("    def from_row(cls, row) -> \"{}\":", class_name));
        for (i, member) in members.iter().enumerate() {
            let local = naming.parameter_name(member.member_name())?;
            out.push(format!("        {} = {}", local, self.row_read(member, i)?));
        }
        let args = members
            .iter()
            .map(|m| {
                let field = self.field_name(m)?;
                let local = naming.parameter_name(m.member_name())?;
                Ok(format!("{}={}", field, local))
            })
            .collect::<Result<Vec<_>, GenError>>()?
            .join(", ");
        out.push(format!("        return cls({})", args));

        out.push(String::new());
        out.push("    @classmethod".to_string());
        out.push(format!("    def load_list(cls, rows) -> list[\"{}\"]:", class_name));
        out.push("        return [cls.from_row(row) for row in rows]".to_string());

        if let Some(key) = clss.key_member() {
            let key_field = self.field_name(key)?;
            out.push(String::new());
            out.push("    @classmethod".to_string());
            out.push("    def load_map(cls, rows) -> dict:".to_string());
            out.push(format!(
                "        return {{obj.{}: obj for obj in cls.load_list(rows)}}",
                key_field
            ));
        }
        out.push(String::new());
        Ok(out.join("\n"))
    }
}

impl Backend for PythonBackend {
    fn id(&self) -> &'static str {
        "python"
    }

    fn naming(&self) -> &NamingConfig {
        &self.config.naming
    }

    fn generate(&self, clss: &Clss) -> Result<Vec<GeneratedFile>, GenError> {
        let class_name = self.class_name(clss)?;
        let file_stem = self.config.naming.file_name(clss.class_name());
        let path = format!("{}{}.{}", package_dir(clss), file_stem, self.config.source_ext);
        Ok(vec![GeneratedFile::new(path, self.module(clss, &class_name)?)])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Access, Member};
    use crate::types::{ColumnType, IntWidth};

    fn athlete() -> Clss {
        Clss::new(
            "Athlete",
            "Athlete",
            vec![
                Member::new(
                    "Athlete",
                    "athlete",
                    ColumnType::integer(IntWidth::W64),
                    true,
                    Access::Public,
                    true,
                ),
                Member::new(
                    "Age",
                    "age",
                    ColumnType::integer(IntWidth::W16),
                    false,
                    Access::Public,
                    false,
                ),
                Member::new(
                    "Birth Date",
                    "birth date",
                    ColumnType::DateTime,
                    false,
                    Access::Public,
                    false,
                ),
                Member::new(
                    "Inactive",
                    "inactive",
                    ColumnType::Boolean,
                    false,
                    Access::Public,
                    true,
                ),
            ],
            vec!["Athlete".to_string()],
            vec!["swim".to_string()],
            "CREATE TABLE [Athlete]",
        )
    }

    #[test]
    fn test_single_module_path() {
        let backend = PythonBackend::new(default_config());
        let files = backend.generate(&athlete()).unwrap();
        assert_eq!(files.len(), 1);
        assert_eq!(files[0].path, "swim/athlete.py");
    }

    #[test]
    fn test_dataclass_fields_in_order() {
        let backend = PythonBackend::new(default_config());
        let files = backend.generate(&athlete()).unwrap();
        let src = &files[0].content;
        assert!(src.contains("@dataclass"));
        assert!(src.contains("class Athlete:"));
        assert!(src.contains("# CREATE TABLE [Athlete]"));
        let fields = [
            "    athlete: int = field(metadata={\"column\": \"Athlete\"})",
            "    age: Optional[int] = field(metadata={\"column\": \"Age\"})",
            "    birth_date: Optional[datetime] = field(metadata={\"column\": \"Birth Date\"})",
            "    inactive: bool = field(metadata={\"column\": \"Inactive\"})",
        ];
        let offsets: Vec<usize> = fields.iter().map(|f| src.find(f).unwrap()).collect();
        assert!(offsets.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn test_positional_reads_zero_based_in_order() {
        let backend = PythonBackend::new(default_config());
        let files = backend.generate(&athlete()).unwrap();
        let src = &files[0].content;
        // Key member reads without a null check; optional members with one.
        assert!(src.contains("        athlete = int(row[0])\n"));
        assert!(src.contains("        age = int(row[1]) if row[1] is not None else None"));
        assert!(src.contains("        birth_date = row[2] if row[2] is not None else None"));
        assert!(src.contains("        inactive = bool(row[3])\n"));
        assert!(src.contains("return cls(athlete=athlete, age=age, birth_date=birth_date, inactive=inactive)"));
    }

    #[test]
    fn test_keyed_class_gets_load_map() {
        let backend = PythonBackend::new(default_config());
        let files = backend.generate(&athlete()).unwrap();
        let src = &files[0].content;
        assert!(src.contains("def load_list(cls, rows)"));
        assert!(src.contains("def load_map(cls, rows)"));
        assert!(src.contains("{obj.athlete: obj for obj in cls.load_list(rows)}"));
    }

    #[test]
    fn test_unkeyed_class_has_no_load_map() {
        let backend = PythonBackend::new(default_config());
        let clss = Clss::new(
            "Entry",
            "Entry",
            vec![Member::new(
                "Meet",
                "meet",
                ColumnType::integer(IntWidth::W64),
                false,
                Access::Public,
                true,
            )],
            vec![],
            vec![],
            "",
        );
        let files = backend.generate(&clss).unwrap();
        let src = &files[0].content;
        assert!(src.contains("def load_list"));
        assert!(!src.contains("def load_map"));
    }

    #[test]
    fn test_digit_leading_class_gets_t_prefix() {
        let backend = PythonBackend::new(default_config());
        let clss = Clss::new(
            "2country",
            "2country",
            vec![Member::new(
                "Code",
                "code",
                ColumnType::text(Some(3)),
                false,
                Access::Public,
                true,
            )],
            vec![],
            vec![],
            "",
        );
        let files = backend.generate(&clss).unwrap();
        assert!(files[0].content.contains("class T2country:"));
        // File name keeps the raw stem.
        assert_eq!(files[0].path, "2country.py");
    }

    #[test]
    fn test_keyword_member_is_escaped() {
        let backend = PythonBackend::new(default_config());
        let clss = Clss::new(
            "Athlete",
            "Athlete",
            vec![Member::new(
                "Class",
                "class",
                ColumnType::text(Some(6)),
                false,
                Access::Public,
                false,
            )],
            vec![],
            vec![],
            "",
        );
        let files = backend.generate(&clss).unwrap();
        let src = &files[0].content;
        assert!(src.contains("    class_: Optional[str]"));
        assert!(!src.contains("    class:"));
    }

    #[test]
    fn test_private_member_gets_property() {
        let backend = PythonBackend::new(default_config());
        let clss = Clss::new(
            "Athlete",
            "Athlete",
            vec![Member::new(
                "Notes",
                "notes",
                ColumnType::text(None),
                false,
                Access::Private,
                false,
            )],
            vec![],
            vec![],
            "",
        );
        let files = backend.generate(&clss).unwrap();
        let src = &files[0].content;
        assert!(src.contains("    _notes: Optional[str]"));
        assert!(src.contains("    def notes(self):"));
        assert!(src.contains("        return self._notes"));
        assert!(src.contains("    @notes.setter"));
    }

    #[test]
    fn test_determinism() {
        let backend = PythonBackend::new(default_config());
        let a = backend.generate(&athlete()).unwrap();
        let b = backend.generate(&athlete()).unwrap();
        assert_eq!(a, b);
    }
}
