//! Semantic column type system.
//!
//! Every column in the class model carries one of these closed, tagged
//! values. Backends never inspect raw schema text; they map a `ColumnType`
//! through their own mapping table to a target type name, a positional ORM
//! accessor, and a text-to-value conversion.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Native integer widths supported by the schema sources.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum IntWidth {
    W8,
    W16,
    W32,
    W64,
}

impl IntWidth {
    /// Width in bits.
    pub fn bits(&self) -> u8 {
        match self {
            IntWidth::W8 => 8,
            IntWidth::W16 => 16,
            IntWidth::W32 => 32,
            IntWidth::W64 => 64,
        }
    }

    pub fn from_bits(bits: u8) -> Option<IntWidth> {
        match bits {
            8 => Some(IntWidth::W8),
            16 => Some(IntWidth::W16),
            32 => Some(IntWidth::W32),
            64 => Some(IntWidth::W64),
            _ => None,
        }
    }
}

/// Floating-point precision, mapped 1:1 to single/double native floats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FloatPrecision {
    Single,
    Double,
}

impl FloatPrecision {
    /// Key used by serialized type-mapping tables.
    pub fn key(&self) -> &'static str {
        match self {
            FloatPrecision::Single => "single",
            FloatPrecision::Double => "double",
        }
    }
}

/// A column type, independent of any target language.
///
/// The set is closed: backends match exhaustively and a missing mapping
/// entry is a reportable error, never a silent fallback.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColumnType {
    Integer { width: IntWidth },
    Float { precision: FloatPrecision },
    /// Declared maximum length is advisory metadata, not validated.
    Text { max_len: Option<u32> },
    DateTime,
    Boolean,
    Currency,
    /// Reference to another generated class. Produced only by external
    /// ingestion paths, never by the schema parser.
    ClassRef { class_name: String },
}

impl ColumnType {
    pub fn integer(width: IntWidth) -> ColumnType {
        ColumnType::Integer { width }
    }

    pub fn float(precision: FloatPrecision) -> ColumnType {
        ColumnType::Float { precision }
    }

    pub fn text(max_len: Option<u32>) -> ColumnType {
        ColumnType::Text { max_len }
    }

    pub fn is_text(&self) -> bool {
        matches!(self, ColumnType::Text { .. })
    }
}

impl fmt::Display for ColumnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ColumnType::Integer { width } => write!(f, "Integer({})", width.bits()),
            ColumnType::Float { precision } => write!(f, "Float({})", precision.key()),
            ColumnType::Text { max_len: Some(n) } => write!(f, "Text({})", n),
            ColumnType::Text { max_len: None } => write!(f, "Text"),
            ColumnType::DateTime => write!(f, "DateTime"),
            ColumnType::Boolean => write!(f, "Boolean"),
            ColumnType::Currency => write!(f, "Currency"),
            ColumnType::ClassRef { class_name } => write!(f, "ClassRef({})", class_name),
        }
    }
}
