//! Collection file I/O.
//!
//! A collection lives in `<root>/<name>.json` as one pretty-printed JSON
//! object holding its unique indexes and documents.

mod load;
mod save;

pub(crate) use load::load_collection;
pub(crate) use save::save_collection;
