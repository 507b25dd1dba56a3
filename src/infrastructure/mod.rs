// Infrastructure: logging setup and file access

pub mod files;
pub mod logging;

pub use files::{read_json, write_json, DatasetSource};
