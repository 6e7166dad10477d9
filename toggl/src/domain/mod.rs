mod time_entry;
mod workspace;

pub use time_entry::*;
pub use workspace::*;
