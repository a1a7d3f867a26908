//! Value types shared by the editor, the parse client, and the parse server.

mod cell;
mod draft;
mod ids;
mod query;
mod source;

pub use self::cell::*;
pub use self::draft::*;
pub use self::ids::*;
pub use self::query::*;
pub use self::source::*;
