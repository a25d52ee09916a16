pub mod backend;
pub mod document;
pub mod pipeline;
pub mod rust_ty;
pub mod sql;
pub mod unit;

pub use backend::{Backend, CodeFragment, EmitError, UnitScaffold};
pub use document::DocumentBackend;
pub use pipeline::{RunReport, generate};
pub use sql::SqlBackend;
pub use unit::GeneratedUnit;
