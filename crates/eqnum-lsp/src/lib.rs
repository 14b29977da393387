pub mod config;
pub mod document;
pub mod error;
pub mod handlers;
pub mod server;
mod test_utils;

// Re-export commonly used types
pub use error::{LspError, Result};
pub use server::Backend;
