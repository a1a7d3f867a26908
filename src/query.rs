//! InfluxQL text for query configs, in both directions.

mod build;
mod parse;
mod split;

pub use self::build::build_query;
pub use self::parse::{parse_query, substitute_templates};
