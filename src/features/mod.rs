//! The list-query engine: descriptor parsing, planning and the result envelope.

pub mod descriptor;
pub mod envelope;
pub mod pagination;
pub mod select;
pub mod sort;
pub mod translator;

pub use descriptor::{QueryDescriptor, RESERVED_KEYS};
pub use envelope::ResultSet;
pub use pagination::{PageMetadata, PaginationState};
pub use select::parse_select;
pub use sort::parse_sort;
pub use translator::{QueryPlan, QueryTranslator};
