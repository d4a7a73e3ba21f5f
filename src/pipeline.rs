//! Generation pipeline: schema text in, per-backend file sets out.
//!
//! The pipeline owns a parser and an ordered list of backends and runs
//! every (class, backend) pair. Failure handling is fail-soft by default:
//! a failure is recorded against its (table, member, backend) triple and
//! the remaining pairs still run. `strict(true)` turns the first failure
//! into an error instead. Backends are pure, so the products are identical
//! whatever order the pairs run in.

use crate::backend::{Backend, GeneratedFile};
use crate::error::Failure;
use crate::model::Clss;
use crate::parser::SchemaParser;
use indexmap::IndexMap;

/// Everything one run produced: files grouped by backend id (paths
/// relative to that backend's root), the classes that parsed, and every
/// recorded failure.
#[derive(Debug, Default)]
pub struct Generation {
    pub files: IndexMap<String, Vec<GeneratedFile>>,
    pub classes: Vec<Clss>,
    pub failures: Vec<Failure>,
}

impl Generation {
    pub fn file_count(&self) -> usize {
        self.files.values().map(|v| v.len()).sum()
    }
}

pub struct Pipeline {
    parser: SchemaParser,
    backends: Vec<Box<dyn Backend>>,
    strict: bool,
}

impl Pipeline {
    pub fn new(parser: SchemaParser) -> Pipeline {
        Pipeline { parser, backends: Vec::new(), strict: false }
    }

    pub fn backend(mut self, backend: Box<dyn Backend>) -> Pipeline {
        self.backends.push(backend);
        self
    }

    /// In strict mode the first failure aborts the run.
    pub fn strict(mut self, strict: bool) -> Pipeline {
        self.strict = strict;
        self
    }

    /// Parse schema text, then generate for every (class, backend) pair.
    pub fn run_text(&self, text: &str, package: &[String]) -> Result<Generation, Failure> {
        let parsed = self.parser.parse(text, package);
        tracing::info!(
            classes = parsed.classes.len(),
            parse_failures = parsed.failures.len(),
            "schema parsed"
        );
        if self.strict {
            if let Some(failure) = parsed.failures.first() {
                return Err(failure.clone());
            }
        }
        self.generate(parsed.classes, parsed.failures)
    }

    /// Alternate ingestion: run backends over classes built elsewhere.
    pub fn run_classes(&self, classes: Vec<Clss>) -> Result<Generation, Failure> {
        self.generate(classes, Vec::new())
    }

    fn generate(
        &self,
        classes: Vec<Clss>,
        mut failures: Vec<Failure>,
    ) -> Result<Generation, Failure> {
        let mut files: IndexMap<String, Vec<GeneratedFile>> = IndexMap::new();
        for backend in &self.backends {
            files.entry(backend.id().to_string()).or_default();
        }

        for backend in &self.backends {
            for clss in &classes {
                match backend.generate(clss) {
                    Ok(generated) => {
                        tracing::debug!(
                            backend = backend.id(),
                            class = clss.class_name(),
                            files = generated.len(),
                            "generated"
                        );
                        files.entry(backend.id().to_string()).or_default().extend(generated);
                    }
                    Err(err) => {
                        let failure = Failure::new(
                            Some(clss.table_name().to_string()),
                            None,
                            Some(backend.id().to_string()),
                            &err,
                        );
                        tracing::warn!(%failure, "generation failed");
                        if self.strict {
                            return Err(failure);
                        }
                        failures.push(failure);
                    }
                }
            }
        }

        Ok(Generation { files, classes, failures })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend;
    use crate::error::FailureKind;

    const SCHEMA: &str = "\
CREATE TABLE [Athlete]
 (
\t[Athlete]\t\t\tLong Integer,
\t[Age]\t\t\tInteger,
\t[Sex]\t\t\tText (2)
);

CREATE TABLE [Entry]
 (
\t[Meet]\t\t\tLong Integer,
\t[Fee]\t\t\tMoney,
\t[Score]\t\t\tDouble
);
";

    fn pipeline() -> Pipeline {
        Pipeline::new(SchemaParser::new())
            .backend(backend::by_id("cpp").unwrap())
            .backend(backend::by_id("python").unwrap())
    }

    #[test]
    fn test_outputs_grouped_by_backend() {
        let gen = pipeline().run_text(SCHEMA, &[]).unwrap();
        assert_eq!(gen.classes.len(), 2);
        // Three C++ artifacts per class, one Python module per class.
        assert_eq!(gen.files["cpp"].len(), 6);
        assert_eq!(gen.files["python"].len(), 2);
        assert_eq!(gen.file_count(), 8);
    }

    #[test]
    fn test_bad_column_is_fail_soft() {
        let gen = pipeline().run_text(SCHEMA, &[]).unwrap();
        // The Money column fails but Entry survives with its other members.
        assert_eq!(gen.failures.len(), 1);
        assert_eq!(gen.failures[0].kind, FailureKind::Parse);
        assert_eq!(gen.failures[0].table.as_deref(), Some("Entry"));
        let entry = gen.classes.iter().find(|c| c.class_name() == "Entry").unwrap();
        assert_eq!(entry.members().len(), 2);
    }

    #[test]
    fn test_strict_aborts_on_parse_failure() {
        let err = pipeline().strict(true).run_text(SCHEMA, &[]).unwrap_err();
        assert_eq!(err.kind, FailureKind::Parse);
        assert_eq!(err.table.as_deref(), Some("Entry"));
    }

    #[test]
    fn test_run_classes_alternate_ingestion() {
        use crate::model::{Access, Member};
        use crate::types::{ColumnType, IntWidth};

        let clss = Clss::new(
            "Club",
            "Club",
            vec![Member::new(
                "Club",
                "club",
                ColumnType::integer(IntWidth::W64),
                true,
                Access::Public,
                true,
            )],
            vec!["Club".to_string()],
            vec![],
            "",
        );
        let gen = pipeline().run_classes(vec![clss]).unwrap();
        assert!(gen.failures.is_empty());
        assert_eq!(gen.files["cpp"].len(), 3);
        assert_eq!(gen.files["python"].len(), 1);
    }

    #[test]
    fn test_repeat_runs_are_identical() {
        let a = pipeline().run_text(SCHEMA, &[]).unwrap();
        let b = pipeline().run_text(SCHEMA, &[]).unwrap();
        assert_eq!(a.files, b.files);
    }
}
