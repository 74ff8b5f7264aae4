// src/process/mod.rs
pub mod normalize;
pub mod parse;
pub mod raw_table;
pub mod record;
pub mod sniff;

pub use normalize::{cell_number, filter_records, to_number};
pub use parse::read_table;
pub use raw_table::{Cell, RawTable};
pub use record::ProductRecord;
pub use sniff::{guess_format, FeedFormat};
