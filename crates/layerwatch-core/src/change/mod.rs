//! Change records: the output unit of a detection pass.

pub mod human_summary;
pub mod model;

pub use human_summary::render_human_summary;
pub use model::{serialize_changes, ChangeRecord, ChangeType};
