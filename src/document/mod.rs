mod core;
mod types;

pub use self::core::{Document, ID_FIELD};
pub use self::types::Metadata;
