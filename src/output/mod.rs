pub mod project;
pub mod write;

pub use project::{sort_records, OutputColumn, Projection};
pub use write::{render_csv, render_json, write_outputs};
