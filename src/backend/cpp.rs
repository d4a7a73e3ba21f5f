//! C++ backend.
//!
//! Emits, per class: an immutable value class header, a DAO header with
//! container aliases and fetch methods, and a DAO source with the
//! positional ODBC read routine. The read routine is the order-critical
//! part: one accessor call per member, 1-based field numbers in physical
//! column order.

use crate::backend::{package_dir, Backend, GeneratedFile};
use crate::config::{BackendConfig, TypeEntry};
use crate::error::GenError;
use crate::model::{Clss, Member};
use crate::naming::{avoid_self_collision, CaseRule, NamingConfig, NamingSlot};
use crate::types::ColumnType;
use indexmap::IndexMap;

/// Default C++ backend configuration: snake_case files, PascalCase
/// classes, camelCase members with a trailing underscore, `int<N>_t`
/// integer mapping, ODBC accessor table.
pub fn default_config() -> BackendConfig {
    let mut reserved = IndexMap::new();
    reserved.insert("class".to_string(), "cclass".to_string());
    reserved.insert("export".to_string(), "cexport".to_string());
    reserved.insert("short".to_string(), "cshort".to_string());

    let naming = NamingConfig {
        file: NamingSlot::new(CaseRule::LowerSnake),
        class: NamingSlot::new(CaseRule::UpperCamel),
        member: NamingSlot::new(CaseRule::LowerCamel).with_suffix("_"),
        reader: NamingSlot::new(CaseRule::LowerCamel),
        writer: NamingSlot::new(CaseRule::UpperCamel).with_prefix("set"),
        parameter: NamingSlot::new(CaseRule::LowerCamel),
        reserved,
    };

    let mut integer = IndexMap::new();
    integer.insert(
        8,
        TypeEntry::new("int8_t").with_default("0").with_read("GetChar").with_convert("std::stoi"),
    );
    integer.insert(
        16,
        TypeEntry::new("int16_t").with_default("0").with_read("GetShort").with_convert("std::stoi"),
    );
    integer.insert(
        32,
        TypeEntry::new("int32_t").with_default("0").with_read("GetInt").with_convert("std::stoi"),
    );
    integer.insert(
        64,
        TypeEntry::new("int64_t").with_default("0").with_read("GetLong").with_convert("std::stoll"),
    );
    let mut float = IndexMap::new();
    float.insert(
        "single".to_string(),
        TypeEntry::new("float").with_default("0.0F").with_read("GetFloat").with_convert("std::stof"),
    );
    float.insert(
        "double".to_string(),
        TypeEntry::new("double").with_default("0.0").with_read("GetDouble").with_convert("std::stod"),
    );

    let types = crate::config::TypeMap {
        integer,
        float,
        text: Some(TypeEntry::new("std::string").with_default("\"\"").with_read("GetText")),
        datetime: Some(
            TypeEntry::new("std::chrono::system_clock::time_point")
                .with_default("{}")
                .with_read("GetTimePoint"),
        ),
        boolean: Some(
            TypeEntry::new("bool").with_default("false").with_read("GetBool").with_convert("ToBool"),
        ),
        // Scaled integer; the runtime converts from SQL_C_NUMERIC.
        currency: Some(
            TypeEntry::new("int64_t").with_default("0").with_read("GetCurrency").with_convert("std::stoll"),
        ),
    };

    BackendConfig {
        naming,
        types,
        header_ext: Some("h".to_string()),
        source_ext: "cpp".to_string(),
    }
}

pub struct CppBackend {
    config: BackendConfig,
    /// Namespace of the ODBC helper library the generated code calls into.
    runtime_ns: String,
}

impl CppBackend {
    pub fn new(config: BackendConfig) -> CppBackend {
        CppBackend { config, runtime_ns: "dbutil".to_string() }
    }

    pub fn with_runtime_ns(mut self, ns: &str) -> CppBackend {
        self.runtime_ns = ns.to_string();
        self
    }

    /// Declared type of a member: the mapped target type, wrapped in
    /// `std::optional` for optional members. The key member is always
    /// plain.
    fn member_type(&self, member: &Member) -> Result<String, GenError> {
        let base = match member.ty() {
            ColumnType::ClassRef { class_name } => self.config.naming.class_name(class_name)?,
            ty => self.config.types.entry(self.id(), ty)?.target_type.clone(),
        };
        if member.optional() && !member.unique() {
            Ok(format!("std::optional<{}>", base))
        } else {
            Ok(base)
        }
    }

    fn header(&self, clss: &Clss, class_name: &str, namespace: &str) -> Result<String, GenError> {
        let naming = &self.config.naming;
        let members = clss.members();
        let has_optional = members.iter().any(|m| m.optional() && !m.unique());

        let mut out: Vec<String> = Vec::new();
        out.push("#pragma once".to_string());
        out.push(String::new());
        out.push("#include <chrono>".to_string());
        out.push("#include <cstdint>".to_string());
        if has_optional {
            out.push("#include <optional>".to_string());
        }
        out.push("#include <string>".to_string());
        out.push(String::new());
        out.push(format!("namespace {}", namespace));
        out.push("{".to_string());
        out.push(String::new());
        out.push(format!("class {}", class_name));
        out.push("{".to_string());
        out.push("public:".to_string());
        out.push(format!("    {}() = delete;", class_name));
        out.push(String::new());

        // Aggregate taken by the named-initializer factory.
        out.push("    struct Init".to_string());
        out.push("    {".to_string());
        for member in members {
            let ty = self.member_type(member)?;
            let param = naming.parameter_name(member.member_name())?;
            out.push(format!("        {} {};", ty, param));
        }
        out.push("    };".to_string());
        out.push(String::new());
        out.push(format!("    static auto from(Init init) -> {}", class_name));
        out.push("    {".to_string());
        out.push(format!("        return {}{{std::move(init)}};", class_name));
        out.push("    }".to_string());
        out.push(String::new());

        for member in members {
            let ty = self.member_type(member)?;
            let field = naming.member_name(member.member_name())?;
            let reader =
                avoid_self_collision(&naming.reader_name(member.member_name())?, class_name, false);
            if ty.contains("string") {
                out.push(format!(
                    "    [[nodiscard]] auto {}() const noexcept -> const {}& {{ return {}; }}",
                    reader, ty, field
                ));
            } else {
                out.push(format!(
                    "    [[nodiscard]] auto {}() const noexcept {{ return {}; }}",
                    reader, field
                ));
            }
        }

        if let Some(key) = clss.key_member() {
            let key_type = self.member_type(key)?;
            let key_reader =
                avoid_self_collision(&naming.reader_name(key.member_name())?, class_name, false);
            out.push(String::new());
            out.push(format!(
                "    [[nodiscard]] auto getKey() const -> {} {{ return {}(); }}",
                key_type, key_reader
            ));
        }

        out.push(String::new());
        out.push("private:".to_string());
        let mut inits = Vec::new();
        for member in members {
            let ty = self.member_type(member)?;
            let field = naming.member_name(member.member_name())?;
            let param = naming.parameter_name(member.member_name())?;
            if ty.contains("string") {
                inits.push(format!("{}(std::move(init.{}))", field, param));
            } else {
                inits.push(format!("{}(init.{})", field, param));
            }
        }
        if inits.is_empty() {
            out.push(format!("    explicit {}(Init)", class_name));
        } else {
            out.push(format!(
                "    explicit {}(Init init) : {}",
                class_name,
                inits.join(", ")
            ));
        }
        out.push("    {".to_string());
        out.push("    }".to_string());
        out.push(String::new());
        for member in members {
            let ty = self.member_type(member)?;
            let field = naming.member_name(member.member_name())?;
            out.push(format!("    {} {};", ty, field));
        }
        out.push("};".to_string());
        out.push(String::new());
        out.push(format!("}} // namespace {}", namespace));
        out.push(String::new());
        Ok(out.join("\n"))
    }

    fn dao_source(
        &self,
        clss: &Clss,
        class_name: &str,
        namespace: &str,
        hdr_path: &str,
    ) -> Result<String, GenError> {
        let naming = &self.config.naming;
        let rt = &self.runtime_ns;
        let members = clss.members();
        let qualified = format!("{}::{}", namespace, class_name);

        let mut out: Vec<String> = Vec::new();
        out.push(format!("#include \"{}\"", hdr_path));
        out.push(String::new());
        out.push("#include <memory>".to_string());
        out.push(String::new());
        out.push("#include <sqltypes.h>".to_string());
        out.push(String::new());
        out.push(format!("#include \"{}/util.h\"", rt));
        out.push(String::new());

        // 1-based field numbers, one per member, in column order.
        out.push("namespace".to_string());
        out.push("{".to_string());
        for (i, member) in members.iter().enumerate() {
            let base = naming.parameter_name(member.member_name())?;
            out.push(format!("constexpr uint16_t {}FieldNum = {};", base, i + 1));
            if let ColumnType::Text { max_len: Some(len) } = member.ty() {
                out.push(format!("constexpr int {}FieldLength = {};", base, len));
            }
        }
        out.push("} // namespace".to_string());
        out.push(String::new());

        out.push("template<>".to_string());
        out.push(format!("auto {}::ReadObj(const SQLHANDLE& stmt) -> {}", rt, qualified));
        out.push("{".to_string());
        for member in members {
            let base = naming.parameter_name(member.member_name())?;
            let accessor = self.config.types.read_accessor(self.id(), member.ty())?;
            let mut call = format!("    auto {} = {}::{}(stmt, {}FieldNum", base, rt, accessor, base);
            if matches!(member.ty(), ColumnType::Text { max_len: Some(_) }) {
                call.push_str(&format!(", {}FieldLength", base));
            }
            call.push_str(");");
            out.push(call);
        }
        let init_fields = members
            .iter()
            .map(|m| {
                let param = naming.parameter_name(m.member_name())?;
                Ok(format!(".{} = {}", param, param))
            })
            .collect::<Result<Vec<_>, GenError>>()?
            .join(", ");
        out.push(format!("    return {}::from({{{}}});", qualified, init_fields));
        out.push("}".to_string());
        out.push(String::new());

        out.push("template<>".to_string());
        out.push(format!(
            "auto {}::ReadUniquePtr(const SQLHANDLE& stmt) -> std::unique_ptr<{}>",
            rt, qualified
        ));
        out.push("{".to_string());
        out.push(format!(
            "    return std::make_unique<{}>(ReadObj<{}>(stmt));",
            qualified, qualified
        ));
        out.push("}".to_string());
        out.push(String::new());
        Ok(out.join("\n"))
    }

    fn dao_header(
        &self,
        clss: &Clss,
        class_name: &str,
        namespace: &str,
        hdr_path: &str,
    ) -> Result<String, GenError> {
        let rt = &self.runtime_ns;
        let keyed = clss.is_keyed();

        let mut out: Vec<String> = Vec::new();
        out.push("#pragma once".to_string());
        out.push(String::new());
        let comment = clss.schema_comment("//");
        if !comment.is_empty() {
            out.push(comment);
            out.push(String::new());
        }
        out.push("#include <sqltypes.h>".to_string());
        out.push(String::new());
        out.push("#include <memory>".to_string());
        if keyed {
            out.push("#include <unordered_map>".to_string());
        }
        out.push("#include <vector>".to_string());
        out.push(String::new());
        out.push(format!("#include \"{}\"", hdr_path));
        out.push(format!("#include \"{}/util.h\"", rt));
        out.push(String::new());
        out.push(format!("namespace {}", namespace));
        out.push("{".to_string());
        out.push(String::new());
        out.push(format!(
            "using {}Vec = std::vector<std::unique_ptr<{}>>;",
            class_name, class_name
        ));
        if keyed {
            // Key type comes from the first unique member.
            let key = clss.key_member().ok_or_else(|| GenError::MalformedTable {
                detail: format!("class '{}' marked keyed without a key member", class_name),
            })?;
            let key_type = self.member_type(key)?;
            out.push(format!(
                "using {}UniqueMap = std::unordered_map<{}, std::unique_ptr<{}>>;",
                class_name, key_type, class_name
            ));
            out.push(format!(
                "using {}ObjMap = std::unordered_map<{}, {}>;",
                class_name, key_type, class_name
            ));
        }
        out.push(String::new());
        out.push(format!("class {}Dao", class_name));
        out.push("{".to_string());
        out.push("public:".to_string());
        out.push("    [[nodiscard]]".to_string());
        out.push("    static auto getVec(const SQLHANDLE& conn)".to_string());
        out.push("    {".to_string());
        out.push(format!(
            "        return {}::FetchRows<{}Vec, {}>(conn, query);",
            rt, class_name, class_name
        ));
        out.push("    }".to_string());
        if keyed {
            for (method, fetch, map) in [
                ("getMap", "FetchRows", "UniqueMap"),
                ("getObjMap", "FetchRowsObj", "ObjMap"),
                ("getUniqueMap", "FetchRowsUnique", "UniqueMap"),
                ("getObjMapUnique", "FetchRowsObjUnique", "ObjMap"),
            ] {
                out.push(String::new());
                out.push("    [[nodiscard]]".to_string());
                out.push(format!("    static auto {}(const SQLHANDLE& conn)", method));
                out.push("    {".to_string());
                out.push(format!(
                    "        return {}::{}<{}{}, {}>(conn, query);",
                    rt, fetch, class_name, map, class_name
                ));
                out.push("    }".to_string());
            }
        }
        out.push(String::new());
        out.push("private:".to_string());
        out.push(format!(
            "    static constexpr char query[] = R\"lit(select {} from {})lit\";",
            clss.select_columns(),
            clss.table_name()
        ));
        out.push("};".to_string());
        out.push(String::new());
        out.push(format!("}} // namespace {}", namespace));
        out.push(String::new());
        Ok(out.join("\n"))
    }
}

impl Backend for CppBackend {
    fn id(&self) -> &'static str {
        "cpp"
    }

    fn naming(&self) -> &NamingConfig {
        &self.config.naming
    }

    fn generate(&self, clss: &Clss) -> Result<Vec<GeneratedFile>, GenError> {
        let naming = &self.config.naming;
        let class_name = naming.class_name(clss.class_name())?;
        let file_stem = naming.file_name(clss.class_name());
        let namespace = clss
            .package()
            .iter()
            .map(|s| s.trim().to_string())
            .collect::<Vec<_>>()
            .join("::");
        let namespace = if namespace.is_empty() { "db".to_string() } else { namespace };

        let dir = package_dir(clss);
        let hdr_ext = self.config.header_ext.as_deref().unwrap_or("h");
        let hdr_path = format!("{}{}.{}", dir, file_stem, hdr_ext);
        let dao_src_path = format!("{}{}_dao.{}", dir, file_stem, self.config.source_ext);
        let dao_hdr_path = format!("{}{}_dao.{}", dir, file_stem, hdr_ext);

        Ok(vec![
            GeneratedFile::new(hdr_path.clone(), self.header(clss, &class_name, &namespace)?),
            GeneratedFile::new(
                dao_src_path,
                self.dao_source(clss, &class_name, &namespace, &hdr_path)?,
            ),
            GeneratedFile::new(
                dao_hdr_path,
                self.dao_header(clss, &class_name, &namespace, &hdr_path)?,
            ),
        ])
    }
}
