pub mod ast;
pub mod diagnostic;
pub mod parser;
pub mod token;
pub mod visitor;

// Snapshots, debounced re-analysis and cross-file lookup
pub mod workspace;

pub use diagnostic::{Diagnostic, ErrorCode, Severity};
pub use workspace::{DocumentSnapshot, IndexConfig, IndexEvent, WorkspaceIndex};
