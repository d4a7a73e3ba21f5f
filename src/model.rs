//! Class model: the intermediate representation shared by all backends.
//!
//! A [`Clss`] is one table turned into one flat class; a [`Member`] is one
//! column. Both are constructed once (by the schema parser or an external
//! ingestion path) and read-only afterwards. Member order mirrors physical
//! column order and is semantically significant: persistence backends bind
//! columns by position, so every transformation must preserve it.

use crate::types::ColumnType;
use serde::{Deserialize, Serialize};

/// Member visibility in generated code.
///
/// The schema parser always produces `Public`; external ingestion paths may
/// supply `Private`, which some backends render as accessor wrappers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Access {
    Public,
    Private,
}

/// One column of a table, with its derived member identity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Member {
    column_name: String,
    member_name: String,
    ty: ColumnType,
    unique: bool,
    access: Access,
    required: bool,
}

impl Member {
    /// Build a member. A unique member is forced to `required = true`: the
    /// single-column natural key is never optional.
    pub fn new(
        column_name: impl Into<String>,
        member_name: impl Into<String>,
        ty: ColumnType,
        unique: bool,
        access: Access,
        required: bool,
    ) -> Member {
        Member {
            column_name: column_name.into(),
            member_name: member_name.into(),
            ty,
            unique,
            access,
            required: required || unique,
        }
    }

    /// Raw column name as it appears in the schema.
    pub fn column_name(&self) -> &str {
        &self.column_name
    }

    /// Normalized member name: lowercase words separated by spaces, ready
    /// for the naming engine's case rules.
    pub fn member_name(&self) -> &str {
        &self.member_name
    }

    pub fn ty(&self) -> &ColumnType {
        &self.ty
    }

    pub fn unique(&self) -> bool {
        self.unique
    }

    pub fn access(&self) -> Access {
        self.access
    }

    pub fn required(&self) -> bool {
        self.required
    }

    pub fn optional(&self) -> bool {
        !self.required
    }

    pub fn private(&self) -> bool {
        self.access == Access::Private
    }
}

/// One table as a flat class definition.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Clss {
    table_name: String,
    class_name: String,
    members: Vec<Member>,
    uniques: Vec<String>,
    package: Vec<String>,
    schema_text: String,
}

impl Clss {
    /// Construct a class definition. This is the integration point for
    /// external producers that bypass the schema parser; such producers are
    /// responsible for supplying members in physical column order.
    pub fn new(
        table_name: impl Into<String>,
        class_name: impl Into<String>,
        members: Vec<Member>,
        uniques: Vec<String>,
        package: Vec<String>,
        schema_text: impl Into<String>,
    ) -> Clss {
        Clss {
            table_name: table_name.into(),
            class_name: class_name.into(),
            members,
            uniques,
            package,
            schema_text: schema_text.into(),
        }
    }

    pub fn table_name(&self) -> &str {
        &self.table_name
    }

    pub fn class_name(&self) -> &str {
        &self.class_name
    }

    /// Members in physical column order.
    pub fn members(&self) -> &[Member] {
        &self.members
    }

    /// Column names flagged as natural keys at parse time.
    pub fn uniques(&self) -> &[String] {
        &self.uniques
    }

    /// Namespace segments for generated artifacts.
    pub fn package(&self) -> &[String] {
        &self.package
    }

    /// Raw embedded schema commentary.
    pub fn schema_text(&self) -> &str {
        &self.schema_text
    }

    /// Whether generated code gets a keyed accessor at all.
    pub fn is_keyed(&self) -> bool {
        !self.uniques.is_empty()
    }

    /// The member that drives the keyed accessor: first unique member in
    /// column order. Composite keys are out of scope; additional uniques
    /// are carried but not consumed.
    pub fn key_member(&self) -> Option<&Member> {
        self.members.iter().find(|m| m.unique())
    }

    pub fn private_members(&self) -> Vec<&Member> {
        self.members.iter().filter(|m| m.private()).collect()
    }

    /// Schema commentary rendered as a comment block, one line per schema
    /// line, skipping `---` separator lines.
    pub fn schema_comment(&self, prefix: &str) -> String {
        self.schema_text
            .lines()
            .filter(|l| !l.trim_start().starts_with("---"))
            .map(|l| format!("{} {}", prefix, squish(l)).trim_end().to_string())
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// SQL select list in column order. Column names containing `(` need
    /// quoting (e.g. the `ATH(1)`..`ATH(8)` relay columns).
    pub fn select_columns(&self) -> String {
        self.members
            .iter()
            .map(|m| {
                if m.column_name().contains('(') {
                    format!("\"{}\"", m.column_name())
                } else {
                    m.column_name().to_string()
                }
            })
            .collect::<Vec<_>>()
            .join(",")
    }
}

/// Collapse runs of whitespace and trim, like the schema dumps need.
pub fn squish(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}
