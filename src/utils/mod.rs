pub mod colors;
pub mod date;
pub mod path;
pub mod time;

pub use time::{format_hms, parse_hms};
