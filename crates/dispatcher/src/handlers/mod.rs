//! Shipped destination handlers

mod file;
mod log;

pub use file::{list_operation_files, FileSystemHandler, FileSystemHandlerConfig};
pub use log::LogHandler;
