//! Error taxonomy and attributable failure records.
//!
//! Generation is fail-soft by default: one bad column, class, or backend
//! never aborts the rest of the run. Every recorded failure names the
//! (table, member, backend) it belongs to so a report line is actionable.

use serde::Serialize;
use std::fmt;

/// Everything that can go wrong between schema text and emitted files.
#[derive(Debug, Clone, PartialEq)]
pub enum GenError {
    /// A column used a type keyword outside the closed dispatch table.
    UnknownTypeKeyword { column: String, keyword: String },
    /// A column entry did not have the `[Name] Type ...` shape.
    MalformedColumn { entry: String },
    /// A table header was recognizable but unusable.
    MalformedTable { detail: String },
    /// A backend's type table has no entry for this type.
    MissingTypeMapping { backend: String, ty: String },
    /// No disambiguation rule resolves this reserved-word collision.
    NamingCollision { name: String },
    /// Destination I/O failure while materializing one artifact.
    Write { path: String, detail: String },
}

impl fmt::Display for GenError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GenError::UnknownTypeKeyword { column, keyword } => {
                write!(f, "unknown type keyword '{}' for column [{}]", keyword, column)
            }
            GenError::MalformedColumn { entry } => {
                write!(f, "malformed column entry: '{}'", entry)
            }
            GenError::MalformedTable { detail } => {
                write!(f, "malformed table definition: {}", detail)
            }
            GenError::MissingTypeMapping { backend, ty } => {
                write!(f, "backend '{}' has no type mapping for {}", backend, ty)
            }
            GenError::NamingCollision { name } => {
                write!(f, "no disambiguation rule resolves reserved name '{}'", name)
            }
            GenError::Write { path, detail } => {
                write!(f, "failed to write '{}': {}", path, detail)
            }
        }
    }
}

impl std::error::Error for GenError {}

impl GenError {
    /// Coarse classification used by reports.
    pub fn kind(&self) -> FailureKind {
        match self {
            GenError::UnknownTypeKeyword { .. }
            | GenError::MalformedColumn { .. }
            | GenError::MalformedTable { .. } => FailureKind::Parse,
            GenError::MissingTypeMapping { .. } => FailureKind::Mapping,
            GenError::NamingCollision { .. } => FailureKind::Naming,
            GenError::Write { .. } => FailureKind::Write,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    Parse,
    Mapping,
    Naming,
    Write,
}

/// One recorded failure, attributable to a (table, member, backend) triple.
#[derive(Debug, Clone, Serialize)]
pub struct Failure {
    pub table: Option<String>,
    pub member: Option<String>,
    pub backend: Option<String>,
    pub kind: FailureKind,
    pub message: String,
}

impl Failure {
    pub fn new(
        table: Option<String>,
        member: Option<String>,
        backend: Option<String>,
        error: &GenError,
    ) -> Failure {
        Failure {
            table,
            member,
            backend,
            kind: error.kind(),
            message: error.to_string(),
        }
    }
}

impl fmt::Display for Failure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let table = self.table.as_deref().unwrap_or("-");
        let member = self.member.as_deref().unwrap_or("-");
        let backend = self.backend.as_deref().unwrap_or("-");
        write!(
            f,
            "[{}/{}/{}] {:?}: {}",
            table, member, backend, self.kind, self.message
        )
    }
}

impl std::error::Error for Failure {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_classification() {
        let err = GenError::UnknownTypeKeyword {
            column: "Fee".to_string(),
            keyword: "Money".to_string(),
        };
        assert_eq!(err.kind(), FailureKind::Parse);
        assert!(err.to_string().contains("Money"));

        let err = GenError::MissingTypeMapping {
            backend: "cpp".to_string(),
            ty: "Currency".to_string(),
        };
        assert_eq!(err.kind(), FailureKind::Mapping);
    }

    #[test]
    fn test_failure_attribution() {
        let err = GenError::NamingCollision { name: "class".to_string() };
        let failure = Failure::new(
            Some("Athlete".to_string()),
            Some("Class".to_string()),
            Some("cpp".to_string()),
            &err,
        );
        let line = failure.to_string();
        assert!(line.contains("Athlete"));
        assert!(line.contains("cpp"));
    }

    #[test]
    fn test_failure_serializes() {
        let err = GenError::MalformedColumn { entry: "oops".to_string() };
        let failure = Failure::new(Some("T".to_string()), None, None, &err);
        let json = serde_json::to_string(&failure).unwrap();
        assert!(json.contains("\"kind\":\"parse\""));
    }
}
