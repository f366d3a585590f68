pub mod tag_parser;

pub use tag_parser::{extract_tags, highlight_tags};
