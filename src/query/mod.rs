// Submodules for separation of concerns
mod eval;
mod exec;
mod parse;
mod types;

pub use eval::{apply_projection, compare_bson, compare_docs, eval_filter, get_path, loose_eq};
pub(crate) use eval::set_path;
pub use exec::{count_docs, find_docs};
pub use parse::{FilterLimits, parse_filter_json, parse_filter_object, parse_filter_value};
pub use types::{CmpOp, Filter, FindOptions, Order, Populate, Projection, SortSpec};
pub(crate) use types::{MAX_IN_SET, MAX_LIMIT, MAX_PATH_DEPTH, MAX_PROJECTION_FIELDS, MAX_SORT_FIELDS};
