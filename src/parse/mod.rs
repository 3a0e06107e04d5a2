pub mod date_parser;
pub mod time_parser;

pub use date_parser::{
    month_from_prefix, parse_date_marker, parse_header_day, parse_heading_date, parse_label_date,
    parse_location_date,
};
pub use time_parser::{parse_single_time, parse_time, parse_time_range};
