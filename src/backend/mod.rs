//! Backend contract: pure generators from class model to emitted files.
//!
//! A backend is constructed once with its explicit [`BackendConfig`] and
//! turns one [`Clss`] into an ordered list of (relative path, content)
//! pairs. Identical inputs must produce byte-identical output; backends
//! read no ambient state, so independent classes and backends can run in
//! any order or in parallel.

pub mod cpp;
pub mod python;

use crate::error::GenError;
use crate::model::Clss;
use crate::naming::NamingConfig;

pub use cpp::CppBackend;
pub use python::PythonBackend;

/// One emitted artifact. The path is relative and `/`-separated; the
/// caller decides where (and whether) it lands on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedFile {
    pub path: String,
    pub content: String,
}

impl GeneratedFile {
    pub fn new(path: String, content: String) -> GeneratedFile {
        GeneratedFile { path, content }
    }
}

/// Contract every per-target emitter satisfies.
///
/// Requirements beyond the signature:
/// - deterministic: no clocks, no randomness, no ambient reads;
/// - positional reads: a persistence-capable backend emits exactly one ORM
///   accessor call per member, in member order, at that member's column
///   index;
/// - a keyed accessor is emitted iff the class has a unique member, keyed
///   by the first one in member order;
/// - optional members use the target's nullable idiom; the key member is
///   always plain.
pub trait Backend {
    /// Stable identifier, used in output paths and failure reports.
    fn id(&self) -> &'static str;

    /// The backend's naming configuration (for callers that derive names
    /// consistently with the generated code).
    fn naming(&self) -> &NamingConfig;

    /// Generate all artifacts for one class.
    fn generate(&self, clss: &Clss) -> Result<Vec<GeneratedFile>, GenError>;
}

/// Join package segments into a relative directory prefix, empty package
/// meaning the backend root.
pub fn package_dir(clss: &Clss) -> String {
    if clss.package().is_empty() {
        String::new()
    } else {
        format!("{}/", clss.package().join("/"))
    }
}

/// Build a built-in backend (with its default configuration) by
/// identifier.
pub fn by_id(id: &str) -> Option<Box<dyn Backend>> {
    match id {
        "cpp" => Some(Box::new(CppBackend::new(cpp::default_config()))),
        "python" => Some(Box::new(PythonBackend::new(python::default_config()))),
        _ => None,
    }
}
