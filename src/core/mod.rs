pub mod entity;
pub mod errors;
pub mod scanner;

pub use entity::{java_to_hr, query_string_filename, remove_generics, Entity};
pub use errors::{AnalysisError, Result};
pub use scanner::{DependencyRecord, DependencyScanner};
