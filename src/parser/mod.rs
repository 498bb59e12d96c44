pub mod duration;
pub mod sample_line;

pub use duration::{format_duration, parse_duration};
pub use sample_line::{format_iso8601, parse_iso8601, parse_sample_line};
