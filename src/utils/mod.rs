//! Utility modules: developer logging, JSON/BSON conversion, numeric helpers.
pub mod devlog;
pub mod json;
pub mod num;
